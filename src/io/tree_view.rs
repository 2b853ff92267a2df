//! Directory-only rendering of a dataset tree.
//!
//! Folders that directly hold files are shown but not expanded, so a dataset
//! of a few classes with thousands of images still renders in a few lines.

use crate::tree::{DatasetTree, Node};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Render `tree` as indented lines, one per directory.
pub fn render_tree(tree: &DatasetTree) -> String {
    let root = tree.root();
    let mut out = String::new();
    out.push_str(&root.name);
    out.push('\n');
    if !holds_files(root) {
        render_children(root, "", &mut out);
    }
    out
}

fn render_children(node: &Node, prefix: &str, out: &mut String) {
    let dirs: Vec<&Node> = node.subdirectories().collect();
    let last = dirs.len().saturating_sub(1);

    for (i, dir) in dirs.into_iter().enumerate() {
        let (connector, indent) = if i == last {
            (LAST_BRANCH, SPACE)
        } else {
            (BRANCH, PIPE)
        };
        out.push_str(prefix);
        out.push_str(connector);
        out.push_str(&dir.name);
        out.push('\n');

        if !holds_files(dir) {
            render_children(dir, &format!("{prefix}{indent}"), out);
        }
    }
}

fn holds_files(node: &Node) -> bool {
    node.children.iter().any(|c| c.is_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dir(name: &str, children: Vec<Node>) -> Node {
        Node::directory(name, format!("/{name}"), children)
    }

    fn file(name: &str) -> Node {
        Node::file(name, format!("/{name}"))
    }

    #[test]
    fn test_folders_with_files_are_not_expanded() {
        let root = dir(
            "data",
            vec![
                dir(
                    "train",
                    vec![
                        dir("cats", vec![file("1.png"), dir("hidden", vec![])]),
                        dir("dogs", vec![file("2.png")]),
                    ],
                ),
                dir("test", vec![file("3.png")]),
            ],
        );
        let tree = DatasetTree::from_root(root).unwrap();

        assert_eq!(
            render_tree(&tree),
            "data\n├── train\n│   ├── cats\n│   └── dogs\n└── test\n"
        );
    }

    #[test]
    fn test_root_with_files_shows_only_root() {
        let tree = DatasetTree::from_root(dir("flat", vec![file("a.txt"), dir("sub", vec![])]))
            .unwrap();
        assert_eq!(render_tree(&tree), "flat\n");
    }
}
