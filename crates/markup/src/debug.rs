use crate::types::{Node, NodeKind};
use std::fmt::Write;

/// First few attributes of a node as `key=value` pairs, for outlines.
pub fn first_attributes(node: &Node) -> String {
    let mut out = String::new();
    for (i, (k, v)) in node.attributes().iter().take(3).enumerate() {
        if i != 0 {
            out.push(' ');
        }
        let _ = write!(&mut out, r#"{k}="{v}""#);
    }
    out
}

/// Human-readable outline of at most `cap` nodes. Whitespace-only text is
/// skipped and long text is truncated.
pub fn outline_from_tree(root: &Node, cap: usize) -> Vec<String> {
    fn trimmed_nonempty_slice(s: &str) -> Option<&str> {
        let trimmed = s.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    fn push_preview_replace_newlines(out: &mut String, s: &str, max_chars: usize) {
        let mut truncated = false;
        for (i, ch) in s.chars().enumerate() {
            if i == max_chars {
                truncated = true;
                break;
            }
            out.push(if ch == '\n' { ' ' } else { ch });
        }
        if truncated {
            out.push('…');
        }
    }

    const INDENT_STEP: &str = "  ";
    const PREVIEW_CHARS: usize = 40;

    let mut out = Vec::new();
    let mut left = cap;
    let mut stack: Vec<(&Node, usize)> = vec![(root, 0)];
    while let Some((node, depth)) = stack.pop() {
        if left == 0 {
            break;
        }
        left -= 1;
        let indent = INDENT_STEP.repeat(depth);
        match node.kind() {
            NodeKind::Root => out.push(format!("{indent}{}", node.name())),
            NodeKind::Markup => {
                let mut line = String::with_capacity(indent.len() + 64);
                line.push_str(&indent);
                line.push('[');
                line.push_str(node.name());
                let attrs = first_attributes(node);
                if !attrs.is_empty() {
                    line.push(' ');
                    line.push_str(&attrs);
                }
                line.push(']');
                if node.stopper().is_none() && !node.is_single() {
                    line.push_str("  /* unterminated */");
                }
                out.push(line);
            }
            NodeKind::PlainText => {
                if let Some(trimmed) = trimmed_nonempty_slice(node.content()) {
                    let mut line = String::with_capacity(indent.len() + 64);
                    line.push_str(&indent);
                    line.push('"');
                    push_preview_replace_newlines(&mut line, trimmed, PREVIEW_CHARS);
                    line.push('"');
                    out.push(line);
                }
            }
        }
        for child in node.children().iter().rev() {
            stack.push((child, depth + 1));
        }
    }
    out
}
