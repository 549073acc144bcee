//! Token list -> tree.
//!
//! The builder keeps an explicit stack of open contexts (arena index plus the
//! effective group of that node) instead of recursing, so nesting depth is
//! bounded only by memory. Nodes are collected in an arena and converted into
//! the owned [`Node`] tree in one iterative post-order pass at the end.
//!
//! Policy:
//! - an opener whose group the current context does not permit, and a closer
//!   that does not match the current context, degrade to plain text;
//! - inside a verbatim context every token is literal until the closer for
//!   that context's tag shows up;
//! - contexts still open at end of input are left without a stopper.
use crate::groups::GroupRegistry;
use crate::types::{Attributes, Node, NodeKind, ROOT_NAME, Token, TokenList};

#[derive(Clone, Debug, Default)]
pub struct TreeBuilderConfig {
    /// Merge everything absorbed by a verbatim context into a single text
    /// child. When unset each absorbed token becomes its own text child.
    pub coalesce_verbatim: bool,
}

/// Builds a tree from `tokens` using the default builder configuration.
pub fn build_tree(tokens: &TokenList, registry: &GroupRegistry) -> Node {
    build_tree_with_config(tokens, registry, &TreeBuilderConfig::default())
}

pub fn build_tree_with_config(
    tokens: &TokenList,
    registry: &GroupRegistry,
    config: &TreeBuilderConfig,
) -> Node {
    let mut builder = TreeBuilder::new(registry, config);
    for token in tokens {
        builder.push_token(token);
    }
    builder.finish()
}

/// Entry in the stack of open contexts.
#[derive(Debug)]
struct OpenContext<'r> {
    index: usize,
    group: &'r str,
    verbatim: bool,
    /// Accumulated literal text while `coalesce_verbatim` is set.
    pending: String,
}

struct TreeBuilder<'r> {
    registry: &'r GroupRegistry,
    coalesce_verbatim: bool,
    arena: NodeArena,
    open: Vec<OpenContext<'r>>,
}

impl<'r> TreeBuilder<'r> {
    fn new(registry: &'r GroupRegistry, config: &TreeBuilderConfig) -> Self {
        let mut arena = NodeArena::new();
        let root = arena.push(ArenaNode::new(NodeKind::Root, ROOT_NAME, String::new()));
        let group = registry.initial_group();
        Self {
            registry,
            coalesce_verbatim: config.coalesce_verbatim,
            arena,
            open: vec![OpenContext {
                index: root,
                group,
                verbatim: registry.is_verbatim(group),
                pending: String::new(),
            }],
        }
    }

    fn current(&mut self) -> &mut OpenContext<'r> {
        self.open
            .last_mut()
            .unwrap_or_else(|| unreachable!("root context is never popped"))
    }

    fn is_root(&self) -> bool {
        self.open.len() == 1
    }

    fn push_token(&mut self, token: &Token) {
        if self.current().verbatim {
            self.push_verbatim(token);
            return;
        }
        if !token.is_markup() {
            let parent = self.current().index;
            self.arena.add_text(parent, token.raw());
            return;
        }
        if token.is_closer() {
            self.push_closer(token);
        } else {
            self.push_opener(token);
        }
    }

    fn push_verbatim(&mut self, token: &Token) {
        if self.closes_current(token) {
            self.close_current(token);
            return;
        }
        let coalesce = self.coalesce_verbatim;
        let context = self.current();
        if coalesce {
            context.pending.push_str(token.raw());
        } else {
            let parent = context.index;
            self.arena.add_text(parent, token.raw());
        }
    }

    fn push_closer(&mut self, token: &Token) {
        if self.closes_current(token) {
            self.close_current(token);
            return;
        }
        log::debug!(
            target: "markup.tree_builder",
            "unmatched closer '{}' kept as text",
            token.raw()
        );
        let parent = self.current().index;
        self.arena.add_text(parent, token.raw());
    }

    fn push_opener(&mut self, token: &Token) {
        let registry = self.registry;
        let group = registry.group_of(token.name());
        let context = self.current();
        let parent = context.index;
        if !registry.permits(context.group, group) {
            log::debug!(
                target: "markup.tree_builder",
                "opener '{}' (group '{group}') not permitted in group '{}', kept as text",
                token.raw(),
                context.group
            );
            self.arena.add_text(parent, token.raw());
            return;
        }

        let mut node = ArenaNode::new(NodeKind::Markup, token.name(), token.raw().to_string());
        node.attributes = token.attributes().clone();
        node.single = registry.is_single(token.name());
        let single = node.single;
        let index = self.arena.add_child(parent, node);
        if single {
            return;
        }
        self.open.push(OpenContext {
            index,
            group,
            verbatim: registry.is_verbatim(group),
            pending: String::new(),
        });
    }

    /// Whether `token` is the closer of the innermost open tag. The root is
    /// never closed.
    fn closes_current(&self, token: &Token) -> bool {
        if self.is_root() {
            return false;
        }
        let Some(closed) = token.closed_name() else {
            return false;
        };
        self.open
            .last()
            .is_some_and(|context| self.arena.is_markup_named(context.index, closed))
    }

    fn close_current(&mut self, token: &Token) {
        if let Some(context) = self.open.pop() {
            self.flush_pending(context.index, context.pending);
            self.arena.set_stopper(context.index, token.raw().to_string());
        }
    }

    fn flush_pending(&mut self, index: usize, pending: String) {
        if !pending.is_empty() {
            self.arena.add_child(index, ArenaNode::text(pending));
        }
    }

    fn finish(mut self) -> Node {
        while let Some(context) = self.open.pop() {
            if !self.open.is_empty() {
                log::debug!(
                    target: "markup.tree_builder",
                    "tag '{}' left open at end of input",
                    self.arena.nodes[context.index].name
                );
            }
            self.flush_pending(context.index, context.pending);
        }
        self.arena.into_tree(0)
    }
}

#[derive(Debug)]
struct ArenaNode {
    kind: NodeKind,
    name: String,
    content: String,
    stopper: Option<String>,
    attributes: Attributes,
    children: Vec<usize>,
    single: bool,
}

impl ArenaNode {
    fn new(kind: NodeKind, name: &str, content: String) -> Self {
        Self {
            kind,
            name: name.to_string(),
            content,
            stopper: None,
            attributes: Attributes::new(),
            children: Vec::new(),
            single: false,
        }
    }

    fn text(content: String) -> Self {
        Self::new(NodeKind::PlainText, "", content)
    }
}

#[derive(Debug)]
struct NodeArena {
    nodes: Vec<ArenaNode>,
}

impl NodeArena {
    fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    fn push(&mut self, node: ArenaNode) -> usize {
        let index = self.nodes.len();
        self.nodes.push(node);
        index
    }

    fn add_child(&mut self, parent_index: usize, child: ArenaNode) -> usize {
        debug_assert!(
            self.nodes[parent_index].kind != NodeKind::PlainText,
            "tree builder parent cannot be text"
        );
        let child_index = self.push(child);
        self.nodes[parent_index].children.push(child_index);
        child_index
    }

    fn add_text(&mut self, parent_index: usize, text: &str) {
        if !text.is_empty() {
            self.add_child(parent_index, ArenaNode::text(text.to_string()));
        }
    }

    fn set_stopper(&mut self, node_index: usize, stopper: String) {
        self.nodes[node_index].stopper = Some(stopper);
    }

    fn is_markup_named(&self, node_index: usize, target: &str) -> bool {
        let node = &self.nodes[node_index];
        node.kind == NodeKind::Markup && node.name == target
    }

    fn into_tree(self, root_index: usize) -> Node {
        let mut nodes = self.nodes;
        let mut built_nodes: Vec<Node> = Vec::with_capacity(nodes.len());

        fn take_children(n: usize, built: &mut Vec<Node>) -> Vec<Node> {
            let start = built.len() - n;
            built.split_off(start)
        }

        // Iterative post-order: a node is first scheduled (visited=false), its
        // children are visited in source order, and on the second visit its
        // direct children are the last `children.len()` entries of
        // `built_nodes`.
        let mut stack: Vec<(usize, bool)> = vec![(root_index, false)];

        while let Some((node_index, visited)) = stack.pop() {
            if !visited {
                stack.push((node_index, true));
                for &child_index in nodes[node_index].children.iter().rev() {
                    stack.push((child_index, false));
                }
                continue;
            }

            let arena_node = &mut nodes[node_index];
            let child_count = arena_node.children.len();
            let node = Node {
                kind: arena_node.kind,
                name: std::mem::take(&mut arena_node.name),
                content: std::mem::take(&mut arena_node.content),
                stopper: arena_node.stopper.take(),
                attributes: std::mem::take(&mut arena_node.attributes),
                children: take_children(child_count, &mut built_nodes),
                single: arena_node.single,
            };
            built_nodes.push(node);
        }

        debug_assert_eq!(
            built_nodes.len(),
            1,
            "tree builder should build exactly one root node"
        );
        built_nodes.pop().unwrap_or_else(|| Node::root(Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::GroupConfig;
    use crate::tokenizer::tokenize;
    use crate::types::{Span, TokenKind};

    fn bbcode() -> GroupRegistry {
        GroupRegistry::new(GroupConfig::bbcode()).expect("bbcode config is valid")
    }

    fn parse(input: &str) -> Node {
        build_tree(&tokenize(input), &bbcode())
    }

    fn markup_token(raw: &str, name: &str) -> Token {
        Token::markup(raw, name, Attributes::new(), Span::default())
    }

    fn text_token(raw: &str) -> Token {
        Token::plain_text(raw, Span::default())
    }

    #[test]
    fn build_tree_simple() {
        let tokens = TokenList::new(vec![
            text_token("foo"),
            markup_token("[b]", "b"),
            text_token("bar"),
            markup_token("[/b]", "/b"),
        ]);
        let root = build_tree(&tokens, &bbcode());

        assert_eq!(root.kind(), NodeKind::Root);
        assert_eq!(root.name(), ROOT_NAME);
        assert_eq!(root.stopper(), None);
        assert!(root.attributes().is_empty());

        let children = root.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].content(), "foo");
        assert_eq!(children[0].kind(), NodeKind::PlainText);

        let b = &children[1];
        assert_eq!(b.name(), "b");
        assert_eq!(b.content(), "[b]");
        assert_eq!(b.stopper(), Some("[/b]"));
        assert!(b.attributes().is_empty());
        assert_eq!(b.kind(), NodeKind::Markup);
        assert_eq!(b.children().len(), 1);
        assert_eq!(b.children()[0].content(), "bar");
        assert_eq!(b.children()[0].kind(), NodeKind::PlainText);
    }

    #[test]
    fn build_tree_deep_nesting_scopes_text() {
        let root = parse("foo[b]bar[i]baz[abc]caz[/abc]naz[/i]booh[/b]");
        let top = root.children();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].content(), "foo");

        let b = &top[1];
        assert_eq!(b.stopper(), Some("[/b]"));
        let b_children: Vec<_> = b.children().iter().map(Node::content).collect();
        assert_eq!(b_children, vec!["bar", "[i]", "booh"]);

        let i = &b.children()[1];
        assert_eq!(i.name(), "i");
        assert_eq!(i.stopper(), Some("[/i]"));
        let i_children: Vec<_> = i.children().iter().map(Node::content).collect();
        assert_eq!(i_children, vec!["baz", "[abc]", "naz"]);

        let abc = &i.children()[1];
        assert_eq!(abc.name(), "abc");
        assert_eq!(abc.stopper(), Some("[/abc]"));
        assert_eq!(abc.children().len(), 1);
        assert_eq!(abc.children()[0].content(), "caz");
    }

    #[test]
    fn verbatim_group_keeps_tokens_literal() {
        let root = parse("[code][b]bar[/b][/code]");
        let code = &root.children()[0];
        assert_eq!(code.name(), "code");
        assert_eq!(code.content(), "[code]");
        assert_eq!(code.stopper(), Some("[/code]"));
        assert!(code.attributes().is_empty());
        assert_eq!(code.kind(), NodeKind::Markup);

        let children: Vec<_> = code
            .children()
            .iter()
            .map(|c| (c.kind(), c.content()))
            .collect();
        assert_eq!(
            children,
            vec![
                (NodeKind::PlainText, "[b]"),
                (NodeKind::PlainText, "bar"),
                (NodeKind::PlainText, "[/b]"),
            ]
        );
    }

    #[test]
    fn verbatim_group_coalesces_when_configured() {
        let config = TreeBuilderConfig {
            coalesce_verbatim: true,
        };
        let root = build_tree_with_config(
            &tokenize("[code][code]x[/b] y[/code]after"),
            &bbcode(),
            &config,
        );
        let top = root.children();
        assert_eq!(top.len(), 2);
        let code = &top[0];
        assert_eq!(code.children().len(), 1);
        assert_eq!(code.children()[0].content(), "[code]x[/b] y");
        assert_eq!(code.stopper(), Some("[/code]"));
        assert_eq!(top[1].content(), "after");
    }

    #[test]
    fn verbatim_absorbs_same_named_opener() {
        let root = parse("[code][code][/code]tail");
        let code = &root.children()[0];
        assert_eq!(code.children().len(), 1);
        assert_eq!(code.children()[0].content(), "[code]");
        assert_eq!(root.children()[1].content(), "tail");
    }

    #[test]
    fn unmatched_closer_degrades_to_text() {
        let root = parse("a[/i]b");
        let children: Vec<_> = root
            .children()
            .iter()
            .map(|c| (c.kind(), c.content()))
            .collect();
        assert_eq!(
            children,
            vec![
                (NodeKind::PlainText, "a"),
                (NodeKind::PlainText, "[/i]"),
                (NodeKind::PlainText, "b"),
            ]
        );
    }

    #[test]
    fn mismatched_closer_does_not_close_ancestor() {
        let root = parse("[b][i]x[/b]y[/i]z[/b]");
        let b = &root.children()[0];
        assert_eq!(b.stopper(), Some("[/b]"));
        let i = &b.children()[0];
        assert_eq!(i.stopper(), Some("[/i]"));
        let inner: Vec<_> = i.children().iter().map(Node::content).collect();
        assert_eq!(inner, vec!["x", "[/b]", "y"]);
        assert_eq!(b.children()[1].content(), "z");
    }

    #[test]
    fn group_forbidden_opener_degrades_to_text() {
        let registry = GroupRegistry::new(GroupConfig::bbcode().tag("i", "inline"))
            .expect("valid config");
        let root = build_tree(&tokenize("[i][quote]x[/quote][/i]"), &registry);
        let i = &root.children()[0];
        assert_eq!(i.name(), "i");
        let children: Vec<_> = i
            .children()
            .iter()
            .map(|c| (c.kind(), c.content()))
            .collect();
        assert_eq!(
            children,
            vec![
                (NodeKind::PlainText, "[quote]"),
                (NodeKind::PlainText, "x"),
                (NodeKind::PlainText, "[/quote]"),
            ]
        );
        assert_eq!(i.stopper(), Some("[/i]"));
    }

    #[test]
    fn unterminated_openers_are_tolerated() {
        let root = parse("[b]bold[i]both");
        let b = &root.children()[0];
        assert_eq!(b.stopper(), None);
        let i = &b.children()[1];
        assert_eq!(i.name(), "i");
        assert_eq!(i.stopper(), None);
        assert_eq!(i.children()[0].content(), "both");
    }

    #[test]
    fn unterminated_verbatim_flushes_pending_text() {
        let config = TreeBuilderConfig {
            coalesce_verbatim: true,
        };
        let root = build_tree_with_config(&tokenize("[code]x[b]y"), &bbcode(), &config);
        let code = &root.children()[0];
        assert_eq!(code.stopper(), None);
        assert_eq!(code.children().len(), 1);
        assert_eq!(code.children()[0].content(), "x[b]y");
    }

    #[test]
    fn single_tags_do_not_open_contexts() {
        let registry =
            GroupRegistry::new(GroupConfig::bbcode().single_tag("hr")).expect("valid config");
        let root = build_tree(&tokenize("[b]a[hr]b[/b]"), &registry);
        let b = &root.children()[0];
        let children: Vec<_> = b.children().iter().map(|c| (c.kind(), c.content())).collect();
        assert_eq!(
            children,
            vec![
                (NodeKind::PlainText, "a"),
                (NodeKind::Markup, "[hr]"),
                (NodeKind::PlainText, "b"),
            ]
        );
        assert_eq!(b.children()[1].stopper(), None);
        assert!(b.children()[1].is_single());
        assert_eq!(b.stopper(), Some("[/b]"));
        assert!(!b.is_single());
    }

    #[test]
    fn root_closer_is_never_matched() {
        let root = parse("[/#root]x");
        assert_eq!(root.children().len(), 2);
        assert!(root.children().iter().all(Node::is_text));
    }

    #[test]
    fn verbatim_initial_group_treats_everything_as_text() {
        let registry = GroupRegistry::new(
            GroupConfig::new()
                .group("raw", Vec::<String>::new())
                .default_group("raw")
                .initial_group("raw"),
        )
        .expect("valid config");
        let root = build_tree(&tokenize("[b]x[/b]"), &registry);
        assert_eq!(root.children().len(), 3);
        assert!(root.children().iter().all(Node::is_text));
    }

    #[test]
    fn attributes_are_carried_onto_nodes() {
        let root = parse("[url=http://example.com title='x y']link[/url]");
        let url = &root.children()[0];
        assert_eq!(url.attr("url"), Some("http://example.com"));
        assert_eq!(url.attr("title"), Some("x y"));
    }

    #[test]
    fn empty_token_list_builds_empty_root() {
        let root = build_tree(&TokenList::default(), &bbcode());
        assert_eq!(root.kind(), NodeKind::Root);
        assert!(root.children().is_empty());
    }

    #[test]
    fn build_tree_stress_deep_nesting() {
        let depth: usize = 10_000;
        let mut tokens = Vec::with_capacity(depth * 2);
        for _ in 0..depth {
            tokens.push(markup_token("[q]", "q"));
        }
        for _ in 0..depth {
            tokens.push(markup_token("[/q]", "/q"));
        }

        let root = build_tree(&TokenList::new(tokens), &bbcode());

        let mut current = &root;
        let mut seen = 0usize;
        loop {
            match current.kind() {
                NodeKind::Root => {
                    assert_eq!(current.children().len(), 1);
                    current = &current.children()[0];
                }
                NodeKind::Markup => {
                    assert_eq!(current.name(), "q");
                    assert_eq!(current.stopper(), Some("[/q]"));
                    seen += 1;
                    if seen == depth {
                        assert!(current.children().is_empty());
                        break;
                    }
                    assert_eq!(current.children().len(), 1);
                    current = &current.children()[0];
                }
                NodeKind::PlainText => panic!("unexpected text before reaching depth"),
            }
        }
    }

    #[test]
    fn very_deep_tree_is_built_and_dropped_without_recursion() {
        let depth = 1_000_000;
        let root = build_tree(&tokenize(&"[b]".repeat(depth)), &bbcode());
        let mut current = &root;
        let mut seen = 0usize;
        while let Some(child) = current.children().first() {
            current = child;
            seen += 1;
        }
        assert_eq!(seen, depth);
        assert_eq!(current.stopper(), None);
        drop(root);
    }

    #[test]
    fn text_token_kinds_survive_into_tree() {
        let tokens = tokenize("x[b]y");
        assert_eq!(tokens.tokens()[0].kind(), TokenKind::PlainText);
        let root = build_tree(&tokens, &bbcode());
        assert!(root.children()[0].is_text());
        assert!(root.children()[1].is_markup());
    }
}
