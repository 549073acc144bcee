use crate::escape_text;
use markup::{Token, TokenKind};

/// One deterministic line per token:
/// `TEXT raw="..."` or `MARKUP name=b attrs=[k="v"] raw="[b k=v]"`.
/// Attribute order is preserved.
pub fn format_token(token: &Token) -> String {
    match token.kind() {
        TokenKind::PlainText => format!("TEXT raw=\"{}\"", escape_text(token.raw())),
        TokenKind::Markup => {
            let mut out = String::new();
            out.push_str("MARKUP name=");
            out.push_str(token.name());
            out.push_str(" attrs=[");
            for (i, (key, value)) in token.attributes().iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                out.push_str(key);
                out.push_str("=\"");
                out.push_str(&escape_text(value));
                out.push('"');
            }
            out.push_str("] raw=\"");
            out.push_str(&escape_text(token.raw()));
            out.push('"');
            out
        }
    }
}

pub fn format_tokens<'a>(tokens: impl IntoIterator<Item = &'a Token>) -> Vec<String> {
    tokens.into_iter().map(format_token).collect()
}
