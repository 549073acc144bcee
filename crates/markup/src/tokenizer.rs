//! Bracket markup tokenizer.
//!
//! Splits the input into plain-text runs and `[...]` constructs. Closers are
//! recognized purely lexically; pairing openers with closers is left to the
//! tree builder.
//!
//! Invariant: concatenating the `raw` text of every emitted token reproduces
//! the input exactly. A `[` that does not start a well-formed construct stays
//! part of the surrounding plain text.
use crate::attributes::ConstructScanner;
use crate::types::{Span, Token, TokenList};
use memchr::memchr;

/// Tokenizes `input` into plain-text and markup tokens, in source order.
pub fn tokenize(input: &str) -> TokenList {
    let bytes = input.as_bytes();
    let mut scanner = ConstructScanner::new(input);
    let mut out = Vec::new();
    let mut text_start = 0;
    let mut i = 0;
    // `[` is ASCII and never appears inside a UTF-8 continuation byte, so every
    // cut below lands on a char boundary.
    while i < bytes.len() {
        let Some(rel) = memchr(b'[', &bytes[i..]) else {
            break;
        };
        let open = i + rel;
        let Some(tag) = scanner.scan(open) else {
            // Malformed construct: the bracket is literal text.
            i = open + 1;
            continue;
        };
        if text_start < open {
            push_text(&mut out, input, text_start, open);
        }
        debug_assert!(input.is_char_boundary(tag.end));
        let token = Token::markup(
            &input[open..tag.end],
            tag.name,
            tag.attributes,
            Span::new(open, tag.end),
        );
        log::trace!(target: "markup.tokenizer", "emit token: {token:?}");
        out.push(token);
        i = tag.end;
        text_start = i;
    }
    if text_start < bytes.len() {
        push_text(&mut out, input, text_start, bytes.len());
    }
    TokenList::new(out)
}

fn push_text(out: &mut Vec<Token>, input: &str, start: usize, end: usize) {
    debug_assert!(input.is_char_boundary(start));
    debug_assert!(input.is_char_boundary(end));
    let token = Token::plain_text(&input[start..end], Span::new(start, end));
    log::trace!(target: "markup.tokenizer", "emit token: {token:?}");
    out.push(token);
}
