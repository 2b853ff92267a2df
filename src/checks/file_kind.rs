//! Extension-based file classification shared by the checks.

use crate::tree::Node;

/// Extensions the corrupt-file check verifies as images.
pub const VERIFIABLE_IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".bmp", ".gif"];

/// Extensions the quality check analyzes as images.
pub const QUALITY_IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".bmp", ".tiff"];

/// Extensions the quality check analyzes as text.
pub const TEXT_EXTENSIONS: &[&str] = &[".txt", ".csv", ".json"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityKind {
    Image,
    Text,
}

fn has_extension(node: &Node, set: &[&str]) -> bool {
    node.extension()
        .is_some_and(|ext| set.contains(&ext.as_str()))
}

pub fn is_verifiable_image(node: &Node) -> bool {
    has_extension(node, VERIFIABLE_IMAGE_EXTENSIONS)
}

/// Two-way partition for the quality check; everything else is skipped.
pub fn quality_kind(node: &Node) -> Option<QualityKind> {
    if has_extension(node, QUALITY_IMAGE_EXTENSIONS) {
        Some(QualityKind::Image)
    } else if has_extension(node, TEXT_EXTENSIONS) {
        Some(QualityKind::Text)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verifiable_images() {
        assert!(is_verifiable_image(&Node::file("a.PNG", "a.PNG")));
        assert!(is_verifiable_image(&Node::file("a.gif", "a.gif")));
        assert!(!is_verifiable_image(&Node::file("a.tiff", "a.tiff")));
        assert!(!is_verifiable_image(&Node::file("a.txt", "a.txt")));
    }

    #[test]
    fn test_quality_kind() {
        assert_eq!(quality_kind(&Node::file("a.tiff", "a.tiff")), Some(QualityKind::Image));
        assert_eq!(quality_kind(&Node::file("a.Json", "a.Json")), Some(QualityKind::Text));
        assert_eq!(quality_kind(&Node::file("a.gif", "a.gif")), None);
        assert_eq!(quality_kind(&Node::file("noext", "noext")), None);
    }
}
