use super::Node;
use std::collections::VecDeque;

/// Breadth-first iterator over a subtree, yielding the start node first.
///
/// Children are visited in stored order, so the sequence is deterministic
/// for a given tree.
pub struct BreadthFirst<'a> {
    queue: VecDeque<&'a Node>,
}

impl<'a> BreadthFirst<'a> {
    pub fn new(start: &'a Node) -> Self {
        Self {
            queue: VecDeque::from([start]),
        }
    }
}

impl<'a> Iterator for BreadthFirst<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.queue.pop_front()?;
        self.queue.extend(node.children.iter());
        Some(node)
    }
}

/// File nodes in breadth-first discovery order.
///
/// This order decides which copy of a duplicate group is kept.
pub struct FilesBreadthFirst<'a> {
    inner: BreadthFirst<'a>,
}

impl<'a> FilesBreadthFirst<'a> {
    pub fn new(start: &'a Node) -> Self {
        Self {
            inner: BreadthFirst::new(start),
        }
    }
}

impl<'a> Iterator for FilesBreadthFirst<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().find(|n| n.is_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        Node::directory(
            "root",
            "root",
            vec![
                Node::directory(
                    "x",
                    "root/x",
                    vec![
                        Node::file("1.png", "root/x/1.png"),
                        Node::directory("inner", "root/x/inner", vec![Node::file("3.png", "root/x/inner/3.png")]),
                    ],
                ),
                Node::file("top.txt", "root/top.txt"),
                Node::directory("y", "root/y", vec![Node::file("1.png", "root/y/1.png")]),
            ],
        )
    }

    #[test]
    fn test_bfs_order() {
        let root = sample();
        let names: Vec<_> = BreadthFirst::new(&root).map(|n| n.path.to_str().unwrap()).collect();
        assert_eq!(
            names,
            vec![
                "root",
                "root/x",
                "root/top.txt",
                "root/y",
                "root/x/1.png",
                "root/x/inner",
                "root/y/1.png",
                "root/x/inner/3.png",
            ]
        );
    }

    #[test]
    fn test_files_bfs_order() {
        let root = sample();
        let files: Vec<_> = FilesBreadthFirst::new(&root)
            .map(|n| n.path.to_str().unwrap())
            .collect();
        assert_eq!(
            files,
            vec!["root/top.txt", "root/x/1.png", "root/y/1.png", "root/x/inner/3.png"]
        );
    }

    #[test]
    fn test_single_file_start() {
        let file = Node::file("a", "a");
        assert_eq!(BreadthFirst::new(&file).count(), 1);
        assert_eq!(FilesBreadthFirst::new(&file).count(), 1);
    }
}
