use crate::types::{Node, NodeKind};
use std::fmt::{self, Write};
use std::sync::OnceLock;

/// Deterministic tree serialization and equality rules for golden tests.
/// Not a stable public format.
///
/// Equivalence rules:
/// - Node kinds must match.
/// - Markup names, opening text, stoppers and single-tag flags must match.
/// - Attribute order is significant; names and values must match.
/// - Text nodes must match exactly.
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeSnapshotOptions {
    /// Print the raw opening text of markup nodes next to their name.
    pub include_content: bool,
}

#[derive(Debug)]
pub struct TreeSnapshot {
    lines: Vec<String>,
}

impl TreeSnapshot {
    pub fn new(root: &Node, options: TreeSnapshotOptions) -> Self {
        const INDENT_STEP: usize = 2;
        let mut lines = Vec::new();
        let mut stack: Vec<(&Node, usize)> = vec![(root, 0)];
        while let Some((node, depth)) = stack.pop() {
            let mut line = " ".repeat(depth.saturating_mul(INDENT_STEP));
            write_node_line(&mut line, node, &options);
            lines.push(line);
            for child in node.children().iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        Self { lines }
    }

    pub fn as_lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for TreeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i != 0 {
                f.write_str("\n")?;
            }
            f.write_str(line)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct TreeMismatch<'a> {
    path: String,
    detail: String,
    expected: String,
    actual: String,
    expected_node: &'a Node,
    actual_node: &'a Node,
    options: TreeSnapshotOptions,
    expected_subtree: OnceLock<String>,
    actual_subtree: OnceLock<String>,
}

impl TreeMismatch<'_> {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl fmt::Display for TreeMismatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expected_subtree = self
            .expected_subtree
            .get_or_init(|| TreeSnapshot::new(self.expected_node, self.options).render());
        let actual_subtree = self
            .actual_subtree
            .get_or_init(|| TreeSnapshot::new(self.actual_node, self.options).render());
        writeln!(f, "tree mismatch at {}: {}", self.path, self.detail)?;
        writeln!(f, "expected: {}", self.expected)?;
        writeln!(f, "actual:   {}", self.actual)?;
        writeln!(f, "expected subtree:\n{}", expected_subtree)?;
        writeln!(f, "actual subtree:\n{}", actual_subtree)?;
        Ok(())
    }
}

impl std::error::Error for TreeMismatch<'_> {}

pub fn assert_tree_eq(expected: &Node, actual: &Node, options: TreeSnapshotOptions) {
    if let Err(mismatch) = compare_tree(expected, actual, options) {
        panic!("{mismatch}");
    }
}

pub fn compare_tree<'a>(
    expected: &'a Node,
    actual: &'a Node,
    options: TreeSnapshotOptions,
) -> Result<(), Box<TreeMismatch<'a>>> {
    // Pre-order walk over node pairs. Each entry carries its depth so `path`
    // can be cut back to the entry's parent before the entry's label is pushed.
    let mut path: Vec<String> = Vec::new();
    let mut stack: Vec<(&'a Node, &'a Node, usize, String)> =
        vec![(expected, actual, 0, node_label(expected))];
    while let Some((expected, actual, depth, label)) = stack.pop() {
        path.truncate(depth);
        path.push(label);
        compare_node(expected, actual, &options, &path)?;

        let expected_children = expected.children();
        let actual_children = actual.children();
        if expected_children.len() != actual_children.len() {
            return Err(Box::new(mismatch(
                &path,
                &format!(
                    "child count (expected {}, actual {})",
                    expected_children.len(),
                    actual_children.len()
                ),
                expected,
                actual,
                &options,
            )));
        }
        let pairs = expected_children.iter().zip(actual_children.iter());
        for (idx, (exp, act)) in pairs.enumerate().rev() {
            let label = format!("{}[{}]", node_label(exp), idx);
            stack.push((exp, act, depth + 1, label));
        }
    }
    Ok(())
}

/// Compares one node pair, children excluded.
fn compare_node<'a>(
    expected: &'a Node,
    actual: &'a Node,
    options: &TreeSnapshotOptions,
    path: &[String],
) -> Result<(), Box<TreeMismatch<'a>>> {
    let fail = |detail: &str| -> Result<(), Box<TreeMismatch<'a>>> {
        Err(Box::new(mismatch(path, detail, expected, actual, options)))
    };
    if expected.kind() != actual.kind() {
        return fail("node kind");
    }
    match expected.kind() {
        NodeKind::PlainText => {
            if expected.content() != actual.content() {
                return fail("text");
            }
            Ok(())
        }
        NodeKind::Root | NodeKind::Markup => {
            if expected.name() != actual.name() {
                return fail("markup name");
            }
            if expected.content() != actual.content() {
                return fail("opening text");
            }
            if expected.is_single() != actual.is_single() {
                return fail("single tag");
            }
            if expected.stopper() != actual.stopper() {
                return fail("stopper");
            }
            if expected.attributes().len() != actual.attributes().len() {
                return fail("attribute count");
            }
            let pairs = expected.attributes().iter().zip(actual.attributes().iter());
            for (i, (exp, act)) in pairs.enumerate() {
                if exp.0 != act.0 {
                    return fail(&format!("attribute name at index {i}"));
                }
                if exp.1 != act.1 {
                    return fail(&format!("attribute value at index {i}"));
                }
            }
            Ok(())
        }
    }
}

fn mismatch<'a>(
    path: &[String],
    detail: &str,
    expected: &'a Node,
    actual: &'a Node,
    options: &TreeSnapshotOptions,
) -> TreeMismatch<'a> {
    let path = format!("/{}", path.join("/"));
    let expected_line = format_node_line(expected, options);
    let actual_line = format_node_line(actual, options);
    TreeMismatch {
        path,
        detail: detail.to_string(),
        expected: truncate_line(expected_line, 160),
        actual: truncate_line(actual_line, 160),
        expected_node: expected,
        actual_node: actual,
        options: *options,
        expected_subtree: OnceLock::new(),
        actual_subtree: OnceLock::new(),
    }
}

fn node_label(node: &Node) -> String {
    match node.kind() {
        NodeKind::Root => node.name().to_string(),
        NodeKind::Markup => node.name().to_string(),
        NodeKind::PlainText => "#text".to_string(),
    }
}

fn truncate_line(mut line: String, max_len: usize) -> String {
    if line.len() > max_len {
        let mut cut = max_len.saturating_sub(3);
        while !line.is_char_boundary(cut) {
            cut -= 1;
        }
        line.truncate(cut);
        line.push_str("...");
    }
    line
}

fn format_node_line(node: &Node, options: &TreeSnapshotOptions) -> String {
    let mut line = String::new();
    write_node_line(&mut line, node, options);
    line
}

fn write_node_line(out: &mut String, node: &Node, options: &TreeSnapshotOptions) {
    match node.kind() {
        NodeKind::Root => out.push_str(node.name()),
        NodeKind::Markup => {
            out.push('<');
            out.push_str(node.name());
            for (attr, value) in node.attributes().iter() {
                out.push(' ');
                out.push_str(attr);
                out.push_str("=\"");
                write_escaped(out, value);
                out.push('"');
            }
            out.push('>');
            if options.include_content {
                out.push_str(" content=\"");
                write_escaped(out, node.content());
                out.push('"');
            }
            match node.stopper() {
                Some(stopper) => {
                    out.push_str(" stopper=\"");
                    write_escaped(out, stopper);
                    out.push('"');
                }
                None if node.is_single() => out.push_str(" single"),
                None => out.push_str(" unterminated"),
            }
        }
        NodeKind::PlainText => {
            out.push('"');
            write_escaped(out, node.content());
            out.push('"');
        }
    }
}

fn write_escaped(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ if ch.is_ascii() => out.push(ch),
            _ => {
                let _ = write!(out, "\\u{{{:X}}}", ch as u32);
            }
        }
    }
}
