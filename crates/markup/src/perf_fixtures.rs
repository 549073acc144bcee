pub const BLOCK_TEMPLATE: &str =
    "[quote name=\"someone\"]hello [b]bold [i]both[/i][/b] [url=http://example.com]x[/url][/quote]";

pub const VERBATIM_TEMPLATE: &str = "[code][b]not bold[/b] [i]nor this[/code]";

pub fn make_blocks(blocks: usize) -> String {
    let mut out = String::with_capacity(BLOCK_TEMPLATE.len() * blocks);
    for _ in 0..blocks {
        out.push_str(BLOCK_TEMPLATE);
    }
    out
}

pub fn make_verbatim_blocks(blocks: usize) -> String {
    let mut out = String::with_capacity(VERBATIM_TEMPLATE.len() * blocks);
    for _ in 0..blocks {
        out.push_str(VERBATIM_TEMPLATE);
    }
    out
}

/// An opener that never closes, whose quoted values each hold a `[`. Every one
/// of those brackets starts another candidate construct.
pub fn make_unclosed_quoted_brackets(clauses: usize) -> String {
    const CLAUSE: &str = " x=\"[\"";
    let mut out = String::with_capacity(2 + CLAUSE.len() * clauses);
    out.push_str("[a");
    for _ in 0..clauses {
        out.push_str(CLAUSE);
    }
    out
}
