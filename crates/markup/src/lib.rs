//! Bracket markup (`[b]bold[/b]`, `[url=...]`) tokenizer and tree builder.
//!
//! Parsing is two passes: [`tokenize`] turns the input into a flat
//! [`TokenList`], then [`build_tree`] nests the tokens under a synthetic root,
//! consulting a [`GroupRegistry`] for which tags may contain which. Neither
//! pass fails: markup that cannot be placed degrades to literal text.
pub mod debug;
pub mod perf_fixtures;
pub mod snapshot;
pub mod traverse;

mod attributes;
mod groups;
mod parser;
mod tokenizer;
mod tree_builder;
mod types;

pub use crate::attributes::scan_tag;
pub use crate::groups::{GroupConfig, GroupConfigError, GroupRegistry, TagConfig};
pub use crate::parser::Parser;
pub use crate::tokenizer::tokenize;
pub use crate::traverse::{Children, Descendants, count_markup_nodes, find_first};
pub use crate::tree_builder::{TreeBuilderConfig, build_tree, build_tree_with_config};
pub use crate::types::{
    Attributes, CLOSER_MARKER, Node, NodeKind, ROOT_NAME, Span, Token, TokenKind, TokenList,
};
