use std::ops::Range;

/// Name carried by the synthetic node at the top of every tree.
pub const ROOT_NAME: &str = "#root";

/// Leading marker that turns a tag name into a closer (`/b`).
pub const CLOSER_MARKER: char = '/';

/// Byte span into the tokenized input.
///
/// Invariant: both ends sit on UTF-8 char boundaries of the input the span was
/// produced from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start must be <= end");
        Self { start, end }
    }

    pub fn range(self) -> Range<usize> {
        self.start..self.end
    }
}

/// Ordered attribute map.
///
/// Keys keep the position of their first occurrence; inserting an existing key
/// replaces its value in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (k, v) in iter {
            attributes.insert(k, v);
        }
        attributes
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    PlainText,
    Markup,
}

/// One lexical unit of the input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    raw: String,
    name: String,
    attributes: Attributes,
    span: Span,
}

impl Token {
    pub fn plain_text(raw: impl Into<String>, span: Span) -> Self {
        Self {
            kind: TokenKind::PlainText,
            raw: raw.into(),
            name: String::new(),
            attributes: Attributes::new(),
            span,
        }
    }

    pub fn markup(
        raw: impl Into<String>,
        name: impl Into<String>,
        attributes: Attributes,
        span: Span,
    ) -> Self {
        Self {
            kind: TokenKind::Markup,
            raw: raw.into(),
            name: name.into(),
            attributes,
            span,
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Tag name, including the closer marker for closers. Empty for plain text.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn is_markup(&self) -> bool {
        self.kind == TokenKind::Markup
    }

    pub fn is_closer(&self) -> bool {
        self.is_markup() && self.name.starts_with(CLOSER_MARKER)
    }

    pub fn is_opener(&self) -> bool {
        self.is_markup() && !self.name.starts_with(CLOSER_MARKER)
    }

    /// Name of the tag this closer refers to (`/b` -> `b`).
    pub fn closed_name(&self) -> Option<&str> {
        if !self.is_markup() {
            return None;
        }
        self.name.strip_prefix(CLOSER_MARKER)
    }
}

/// Token sequence produced by a single `tokenize` call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenList {
    tokens: Vec<Token>,
}

impl TokenList {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Concatenated raw text of every token, i.e. the tokenized input.
    pub fn to_source(&self) -> String {
        let mut out = String::with_capacity(self.tokens.iter().map(|t| t.raw.len()).sum());
        for token in &self.tokens {
            out.push_str(&token.raw);
        }
        out
    }
}

impl<'a> IntoIterator for &'a TokenList {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

impl From<Vec<Token>> for TokenList {
    fn from(tokens: Vec<Token>) -> Self {
        Self::new(tokens)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    PlainText,
    Markup,
    Root,
}

/// Tree element. Children are owned exclusively by their parent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) name: String,
    pub(crate) content: String,
    pub(crate) stopper: Option<String>,
    pub(crate) attributes: Attributes,
    pub(crate) children: Vec<Node>,
    /// Configured single tag: complete without a closer, never has children.
    pub(crate) single: bool,
}

impl Node {
    pub fn root(children: Vec<Node>) -> Self {
        Self {
            kind: NodeKind::Root,
            name: ROOT_NAME.to_string(),
            content: String::new(),
            stopper: None,
            attributes: Attributes::new(),
            children,
            single: false,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::PlainText,
            name: String::new(),
            content: content.into(),
            stopper: None,
            attributes: Attributes::new(),
            children: Vec::new(),
            single: false,
        }
    }

    pub fn markup(
        name: impl Into<String>,
        content: impl Into<String>,
        attributes: Attributes,
        stopper: Option<String>,
        children: Vec<Node>,
    ) -> Self {
        Self {
            kind: NodeKind::Markup,
            name: name.into(),
            content: content.into(),
            stopper,
            attributes,
            children,
            single: false,
        }
    }

    pub fn single_tag(
        name: impl Into<String>,
        content: impl Into<String>,
        attributes: Attributes,
    ) -> Self {
        Self {
            kind: NodeKind::Markup,
            name: name.into(),
            content: content.into(),
            stopper: None,
            attributes,
            children: Vec::new(),
            single: true,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw opening-tag text for markup, the text itself for plain text.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn stopper(&self) -> Option<&str> {
        self.stopper.as_deref()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.kind == NodeKind::Root
    }

    pub fn is_markup(&self) -> bool {
        self.kind == NodeKind::Markup
    }

    pub fn is_text(&self) -> bool {
        self.kind == NodeKind::PlainText
    }

    pub fn is_single(&self) -> bool {
        self.single
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        // Detach descendants onto a heap stack so nesting depth never turns
        // into call depth.
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_keep_first_position_and_last_value() {
        let mut attrs = Attributes::new();
        attrs.insert("a", "1");
        attrs.insert("b", "2");
        attrs.insert("a", "3");
        let collected: Vec<_> = attrs.iter().collect();
        assert_eq!(collected, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn closer_tokens_expose_closed_name() {
        let closer = Token::markup("[/b]", "/b", Attributes::new(), Span::new(0, 4));
        assert!(closer.is_closer());
        assert!(!closer.is_opener());
        assert_eq!(closer.closed_name(), Some("b"));

        let opener = Token::markup("[b]", "b", Attributes::new(), Span::new(0, 3));
        assert!(opener.is_opener());
        assert_eq!(opener.closed_name(), None);

        let text = Token::plain_text("/b", Span::new(0, 2));
        assert!(!text.is_closer());
        assert_eq!(text.closed_name(), None);
    }

    #[test]
    fn token_list_to_source_concatenates_raw_text() {
        let list = TokenList::new(vec![
            Token::plain_text("foo", Span::new(0, 3)),
            Token::markup("[b]", "b", Attributes::new(), Span::new(3, 6)),
        ]);
        assert_eq!(list.to_source(), "foo[b]");
        assert_eq!(list.len(), 2);
    }
}
