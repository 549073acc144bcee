use crate::groups::{GroupConfig, GroupConfigError, GroupRegistry};
use crate::tokenizer::tokenize;
use crate::tree_builder::{TreeBuilderConfig, build_tree_with_config};
use crate::types::{Node, TokenList};

/// Tokenizer and tree builder bound to one validated group registry.
///
/// A `Parser` holds no per-parse state; one instance can serve any number of
/// inputs, from any number of threads.
#[derive(Clone, Debug)]
pub struct Parser {
    registry: GroupRegistry,
    config: TreeBuilderConfig,
}

impl Parser {
    pub fn new(config: GroupConfig) -> Result<Self, GroupConfigError> {
        Ok(Self::with_registry(GroupRegistry::new(config)?))
    }

    pub fn with_registry(registry: GroupRegistry) -> Self {
        Self {
            registry,
            config: TreeBuilderConfig::default(),
        }
    }

    /// Parser for the standard block/inline configuration with a verbatim
    /// `code` tag.
    pub fn bbcode() -> Self {
        let registry = GroupRegistry::new(GroupConfig::bbcode())
            .unwrap_or_else(|err| unreachable!("built-in bbcode config is valid: {err}"));
        Self::with_registry(registry)
    }

    pub fn with_tree_builder_config(mut self, config: TreeBuilderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &GroupRegistry {
        &self.registry
    }

    pub fn tokenize(&self, input: &str) -> TokenList {
        tokenize(input)
    }

    pub fn build_tree(&self, tokens: &TokenList) -> Node {
        build_tree_with_config(tokens, &self.registry, &self.config)
    }

    pub fn parse(&self, input: &str) -> Node {
        self.build_tree(&self.tokenize(input))
    }
}
