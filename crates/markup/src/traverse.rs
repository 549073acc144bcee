use crate::types::Node;

/// Forward cursor over a node's children.
///
/// Renderers walk text and markup children left to right with a notion of a
/// current child; `advance` moves on and returns the new current child.
#[derive(Clone, Debug)]
pub struct Children<'a> {
    nodes: &'a [Node],
    position: usize,
}

impl<'a> Children<'a> {
    pub fn new(nodes: &'a [Node]) -> Self {
        Self { nodes, position: 0 }
    }

    pub fn current(&self) -> Option<&'a Node> {
        self.nodes.get(self.position)
    }

    pub fn advance(&mut self) -> Option<&'a Node> {
        if self.position < self.nodes.len() {
            self.position += 1;
        }
        self.current()
    }

    pub fn rewind(&mut self) {
        self.position = 0;
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_done(&self) -> bool {
        self.position >= self.nodes.len()
    }
}

impl<'a> Iterator for Children<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.current()?;
        self.position += 1;
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.nodes.len().saturating_sub(self.position);
        (left, Some(left))
    }
}

impl ExactSizeIterator for Children<'_> {}

/// Depth-first, pre-order walk over a subtree (the starting node included).
#[derive(Clone, Debug)]
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

impl Node {
    pub fn children_cursor(&self) -> Children<'_> {
        Children::new(self.children())
    }

    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Concatenated content of every plain-text node in the subtree.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for node in self.descendants().filter(|n| n.is_text()) {
            out.push_str(node.content());
        }
        out
    }

    /// Reconstructs the source this subtree was built from: opening text,
    /// children, then the stopper when one was found.
    pub fn to_source(&self) -> String {
        enum Step<'a> {
            Enter(&'a Node),
            Stopper(&'a str),
        }

        let mut out = String::new();
        let mut stack = vec![Step::Enter(self)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(node) => {
                    out.push_str(node.content());
                    if let Some(stopper) = node.stopper() {
                        stack.push(Step::Stopper(stopper));
                    }
                    for child in node.children().iter().rev() {
                        stack.push(Step::Enter(child));
                    }
                }
                Step::Stopper(stopper) => out.push_str(stopper),
            }
        }
        out
    }
}

/// First markup node named `name` in pre-order.
pub fn find_first<'a>(root: &'a Node, name: &str) -> Option<&'a Node> {
    let mut nodes = root.descendants();
    nodes.find(|node| node.is_markup() && node.name() == name)
}

pub fn count_markup_nodes(root: &Node) -> usize {
    root.descendants().filter(|node| node.is_markup()).count()
}
