use std::ops::Range;

use pulldown_cmark::{CowStr, Event, Options, Tag, TagEnd};
use tracing::trace;

use crate::ast::{Delimiter, Node, NodeKind, push_node};
use crate::config::DEFAULT_MAX_DEPTH;
use crate::syntax::{self, InlineSyntax};

/// Builds a [`Parser`] from a set of inline syntax extensions.
#[derive(Debug)]
pub struct ParserBuilder {
    extensions: Vec<Box<dyn InlineSyntax>>,
    max_depth: usize,
}

impl Default for ParserBuilder {
    fn default() -> Self {
        Self {
            extensions: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParserBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extension(mut self, extension: impl InlineSyntax + 'static) -> Self {
        self.add_extension(extension);
        self
    }

    pub fn add_extension(&mut self, extension: impl InlineSyntax + 'static) -> &mut Self {
        self.extensions.push(Box::new(extension));
        self
    }

    /// Deepest level any node of a parsed tree may sit at, the document being
    /// level 0. Containers that would push content further down are dropped
    /// or flattened; their text is kept.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.set_max_depth(max_depth);
        self
    }

    pub fn set_max_depth(&mut self, max_depth: usize) -> &mut Self {
        self.max_depth = max_depth;
        self
    }

    pub fn build(self) -> Parser {
        let options = self
            .extensions
            .iter()
            .fold(Options::empty(), |options, extension| options | extension.options());
        Parser {
            options,
            extensions: self.extensions,
            max_depth: self.max_depth,
        }
    }
}

/// Parses chat markdown into a [`Node`] tree.
///
/// Only inline syntax is recognised. Block markup such as headings, list
/// bullets, quotes and fences is kept as literal text, and paragraph breaks
/// survive as newlines.
#[derive(Debug)]
pub struct Parser {
    options: Options,
    extensions: Vec<Box<dyn InlineSyntax>>,
    max_depth: usize,
}

impl Parser {
    pub fn builder() -> ParserBuilder {
        ParserBuilder::new()
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(|extension| extension.name())
    }

    pub fn parse(&self, markdown: &str) -> Node {
        let parser = pulldown_cmark::Parser::new_ext(markdown, self.options);
        let mut state = ParseState::new(markdown, self.max_depth);

        for (event, range) in parser.into_offset_iter() {
            process_event(event, range, &mut state);
        }

        let mut document = state.finish();
        for extension in &self.extensions {
            document = syntax::rewrite_tree(document, extension.as_ref());
        }
        document = syntax::rewrite_tree(document, &Unverbatim);
        clamp_depth(&mut document, 0, self.max_depth);
        document
    }
}

/// Folds [`NodeKind::Verbatim`] back into plain text.
struct Unverbatim;

impl InlineSyntax for Unverbatim {
    fn name(&self) -> &'static str {
        "verbatim"
    }

    fn rewrite(&self, nodes: Vec<Node>, _scope: syntax::Scope) -> Vec<Node> {
        nodes
            .into_iter()
            .map(|node| match node.kind {
                NodeKind::Verbatim(literal) => Node::text(literal),
                kind => Node::with_children(kind, node.children),
            })
            .collect()
    }
}

/// Extensions may wrap content in new containers, so the depth limit is
/// enforced again on the finished tree.
fn clamp_depth(node: &mut Node, depth: usize, max_depth: usize) {
    if depth + 1 < max_depth {
        for child in &mut node.children {
            clamp_depth(child, depth + 1, max_depth);
        }
        return;
    }

    // Children sit at the limit and must be leaves.
    if node.children.iter().all(|child| child.children.is_empty()) {
        return;
    }
    trace!(depth, "flattening containers at the depth limit");
    for child in std::mem::take(&mut node.children) {
        let child = if child.children.is_empty() {
            child
        } else {
            Node::text(child.plain_text())
        };
        push_node(&mut node.children, child);
    }
}

struct ParseState<'a> {
    source: &'a str,
    // Open inline containers; the bottom entry is the document.
    stack: Vec<Node>,
    // Containers opened past the depth limit, which were not pushed.
    dropped: usize,
    max_depth: usize,

    // End of the last inline content consumed from the source.
    cursor: usize,
    // A block boundary was crossed since the last inline content.
    block_gap: bool,
    // Whether anything has been emitted yet.
    started: bool,
}

fn process_event(event: Event<'_>, range: Range<usize>, state: &mut ParseState<'_>) {
    match event {
        Event::Start(tag) => match inline_container(tag, &range, state.source) {
            Some(kind) => {
                state.before_inline(&range, false);
                state.open(kind);
                state.cursor = state.cursor.max(range.start);
            }
            None => state.block_gap = true,
        },
        Event::End(tag) => {
            if is_inline_end(tag) {
                state.close();
                state.cursor = state.cursor.max(range.end);
            } else {
                state.block_gap = true;
            }
        }

        Event::Text(text) => state.text(&range, text),
        // Inline HTML is not rendered, so it stays as typed
        Event::Html(html) | Event::InlineHtml(html) => {
            state.leaf(&range, Node::text(html.into_string()));
        }
        Event::Code(code) => {
            state.leaf(&range, Node::code(code.into_string()));
        }
        Event::SoftBreak => {
            state.leaf(&range, Node::new(NodeKind::SoftBreak));
        }
        Event::HardBreak => {
            state.leaf(&range, Node::new(NodeKind::HardBreak));
        }

        // Rules and the like carry no inline content; the source slice is
        // picked up as a gap.
        _ => state.block_gap = true,
    }
}

fn inline_container(tag: Tag<'_>, range: &Range<usize>, source: &str) -> Option<NodeKind> {
    let kind = match tag {
        Tag::Emphasis => NodeKind::Emphasis {
            delimiter: delimiter_at(source, range),
        },
        Tag::Strong => NodeKind::StrongEmphasis {
            delimiter: delimiter_at(source, range),
        },
        Tag::Strikethrough => NodeKind::Strikethrough,
        Tag::Link {
            dest_url, title, ..
        } => NodeKind::Link {
            destination: dest_url.into_string(),
            title: non_empty(title),
        },
        Tag::Image {
            dest_url, title, ..
        } => NodeKind::Image {
            destination: dest_url.into_string(),
            title: non_empty(title),
        },
        _ => return None,
    };
    Some(kind)
}

fn is_inline_end(tag: TagEnd) -> bool {
    matches!(
        tag,
        TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link | TagEnd::Image
    )
}

/// Recovers which character opened an emphasis run from the source.
fn delimiter_at(source: &str, range: &Range<usize>) -> Delimiter {
    source
        .get(range.start..)
        .and_then(|rest| rest.chars().next())
        .and_then(Delimiter::from_char)
        .unwrap_or(Delimiter::Asterisk)
}

fn non_empty(value: CowStr<'_>) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.into_string())
    }
}

impl<'a> ParseState<'a> {
    fn new(source: &'a str, max_depth: usize) -> Self {
        Self {
            source,
            stack: vec![Node::new(NodeKind::Document)],
            dropped: 0,
            max_depth,
            cursor: 0,
            block_gap: true,
            started: false,
        }
    }

    fn leaf(&mut self, range: &Range<usize>, node: Node) {
        self.before_inline(range, false);
        self.push(node);
        self.cursor = self.cursor.max(range.end);
    }

    /// Pushes a text event. Characters pulldown-cmark decoded from an escape
    /// or a character reference become verbatim so no inline syntax
    /// extension reinterprets them.
    fn text(&mut self, range: &Range<usize>, text: CowStr<'_>) {
        let escaped = self.is_escape(range, &text);
        self.before_inline(range, escaped);

        let source = self.source.get(range.clone()).unwrap_or_default();
        if escaped {
            let split = text.chars().next().map_or(0, char::len_utf8);
            self.push(Node::verbatim(&text[..split]));
            self.push(Node::text(&text[split..]));
        } else if source != &*text && source.contains('&') {
            self.push(Node::verbatim(text.into_string()));
        } else {
            self.push(Node::text(text.into_string()));
        }
        self.cursor = self.cursor.max(range.end);
    }

    /// pulldown-cmark starts the text of a backslash escape after the
    /// backslash, leaving it outside every event range.
    fn is_escape(&self, range: &Range<usize>, text: &str) -> bool {
        range.start > self.cursor
            && self.source[..range.start].ends_with('\\')
            && text.starts_with(|c: char| c.is_ascii_punctuation())
    }

    /// Emits block markup skipped since the last inline content as text.
    /// `escaped` drops the backslash of an escape that ends the gap.
    fn before_inline(&mut self, range: &Range<usize>, escaped: bool) {
        if self.block_gap && range.start > self.cursor {
            let gap = &self.source[self.cursor..range.start];
            let gap = if escaped {
                gap.strip_suffix('\\').unwrap_or(gap)
            } else {
                gap
            };
            let gap = if self.started { gap } else { gap.trim_start() };
            if !gap.is_empty() {
                self.push(Node::text(gap));
            }
        }
        self.block_gap = false;
    }

    fn push(&mut self, node: Node) {
        self.started = true;
        if let Some(parent) = self.stack.last_mut() {
            push_node(&mut parent.children, node);
        }
    }

    fn open(&mut self, kind: NodeKind) {
        // A container pushed now sits at level `stack.len()`; its content
        // one below that.
        if self.dropped > 0 || self.stack.len() >= self.max_depth {
            trace!(depth = self.stack.len(), "dropping nested inline container");
            self.dropped += 1;
        } else {
            self.stack.push(Node::new(kind));
        }
    }

    fn close(&mut self) {
        if self.dropped > 0 {
            self.dropped -= 1;
            return;
        }
        if self.stack.len() > 1 {
            if let Some(node) = self.stack.pop() {
                self.push(node);
            }
        }
    }

    fn finish(mut self) -> Node {
        let tail = self.source.get(self.cursor..).unwrap_or_default();
        let tail = if self.started { tail } else { tail.trim_start() };
        let tail = tail.trim_end();
        if !tail.is_empty() {
            self.push(Node::text(tail));
        }

        while self.stack.len() > 1 {
            self.close();
        }
        self.stack.pop().unwrap_or_else(|| Node::new(NodeKind::Document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{Autolink, Colored, Spoiler, Strikethrough};
    use crate::text::Formatting;

    fn parse(markdown: &str) -> Node {
        Parser::builder()
            .extension(Strikethrough)
            .extension(Autolink)
            .extension(Spoiler)
            .extension(Colored)
            .build()
            .parse(markdown)
    }

    fn emphasis(delimiter: Delimiter, children: Vec<Node>) -> Node {
        Node::with_children(NodeKind::Emphasis { delimiter }, children)
    }

    fn strong(delimiter: Delimiter, children: Vec<Node>) -> Node {
        Node::with_children(NodeKind::StrongEmphasis { delimiter }, children)
    }

    #[test]
    fn plain_text() {
        assert_eq!(parse("hello world"), Node::document(vec![Node::text("hello world")]));
    }

    #[test]
    fn whitespace_only_is_empty() {
        assert_eq!(parse(""), Node::document(vec![]));
        assert_eq!(parse("  \n\n \t "), Node::document(vec![]));
    }

    #[test]
    fn emphasis_delimiters() {
        assert_eq!(
            parse("*a* _b_ **c** __d__"),
            Node::document(vec![
                emphasis(Delimiter::Asterisk, vec![Node::text("a")]),
                Node::text(" "),
                emphasis(Delimiter::Underscore, vec![Node::text("b")]),
                Node::text(" "),
                strong(Delimiter::Asterisk, vec![Node::text("c")]),
                Node::text(" "),
                strong(Delimiter::Underscore, vec![Node::text("d")]),
            ])
        );
    }

    #[test]
    fn code_and_link() {
        assert_eq!(
            parse("`/tp` [site](http://example.com \"Title\")"),
            Node::document(vec![
                Node::code("/tp"),
                Node::text(" "),
                Node::link(
                    "http://example.com",
                    Some("Title".to_string()),
                    vec![Node::text("site")]
                ),
            ])
        );
    }

    #[test]
    fn strikethrough_requires_extension() {
        assert_eq!(
            parse("~~gone~~"),
            Node::document(vec![Node::with_children(
                NodeKind::Strikethrough,
                vec![Node::text("gone")]
            )])
        );
        assert_eq!(
            Parser::builder().build().parse("~~gone~~"),
            Node::document(vec![Node::text("~~gone~~")])
        );
    }

    #[test]
    fn headings_stay_literal() {
        assert_eq!(parse("# Title"), Node::document(vec![Node::text("# Title")]));
    }

    #[test]
    fn list_markers_stay_literal() {
        assert_eq!(parse("- a\n- b"), Node::document(vec![Node::text("- a\n- b")]));
    }

    #[test]
    fn paragraphs_keep_their_break() {
        assert_eq!(parse("a\n\nb"), Node::document(vec![Node::text("a\n\nb")]));
    }

    #[test]
    fn thematic_break_stays_literal() {
        assert_eq!(parse("---"), Node::document(vec![Node::text("---")]));
    }

    #[test]
    fn line_breaks() {
        assert_eq!(
            parse("a\nb"),
            Node::document(vec![
                Node::text("a"),
                Node::new(NodeKind::SoftBreak),
                Node::text("b"),
            ])
        );
    }

    #[test]
    fn extensions_compose() {
        assert_eq!(
            parse("||&csecret||"),
            Node::document(vec![Node::spoiler(vec![Node::formatted(
                vec![Formatting::RED],
                vec![Node::text("secret")]
            )])])
        );
    }

    #[test]
    fn autolink_bare_url() {
        assert_eq!(
            parse("go to https://example.com now"),
            Node::document(vec![
                Node::text("go to "),
                Node::link(
                    "https://example.com",
                    None,
                    vec![Node::text("https://example.com")]
                ),
                Node::text(" now"),
            ])
        );
    }

    #[test]
    fn deep_nesting_is_capped() {
        let depth = 5;
        let parser = Parser::builder().max_depth(depth).build();
        let markdown = format!("{}x{}", "*_".repeat(100), "_*".repeat(100));
        let document = parser.parse(&markdown);
        assert!(document.depth() <= depth);
        assert!(document.depth() > 0);
        assert!(
            !document.children.is_empty(),
            "text inside dropped containers is kept"
        );
    }

    #[test]
    fn backslash_escapes_drop_the_backslash() {
        assert_eq!(parse("\\*a*"), Node::document(vec![Node::text("*a*")]));
        assert_eq!(parse("# \\*a*"), Node::document(vec![Node::text("# *a*")]));
        assert_eq!(parse("x \\*a*"), Node::document(vec![Node::text("x *a*")]));
    }

    #[test]
    fn escaped_markers_are_not_syntax() {
        assert_eq!(parse("\\&cred"), Node::document(vec![Node::text("&cred")]));
        assert_eq!(parse("&amp;cred"), Node::document(vec![Node::text("&cred")]));
        assert_eq!(parse("\\||a||"), Node::document(vec![Node::text("||a||")]));
    }

    #[test]
    fn escaped_backslash_keeps_following_code() {
        assert_eq!(
            parse("\\\\&cred"),
            Node::document(vec![
                Node::text("\\"),
                Node::formatted(vec![Formatting::RED], vec![Node::text("red")]),
            ])
        );
    }

    #[test]
    fn autolinked_urls_keep_ampersands() {
        let url = "https://example.com/search?q=1&b=2";
        assert_eq!(
            parse(&format!("see {url}")),
            Node::document(vec![
                Node::text("see "),
                Node::link(url, None, vec![Node::text(url)]),
            ])
        );
    }

    #[test]
    fn content_at_the_depth_limit_is_kept() {
        let parser = Parser::builder().max_depth(3).build();
        assert_eq!(
            parser.parse("*a _b_*"),
            Node::document(vec![emphasis(
                Delimiter::Asterisk,
                vec![
                    Node::text("a "),
                    emphasis(Delimiter::Underscore, vec![Node::text("b")]),
                ]
            )])
        );
        assert_eq!(
            parser.parse("*a _b *c*_*"),
            Node::document(vec![emphasis(
                Delimiter::Asterisk,
                vec![
                    Node::text("a "),
                    emphasis(Delimiter::Underscore, vec![Node::text("b c")]),
                ]
            )])
        );
    }

    #[test]
    fn extension_containers_respect_the_depth_limit() {
        let parser = Parser::builder()
            .extension(Spoiler)
            .extension(Colored)
            .max_depth(3)
            .build();
        let document = parser.parse("*a _b ||&cx|| c_*");
        assert_eq!(
            document,
            Node::document(vec![emphasis(
                Delimiter::Asterisk,
                vec![
                    Node::text("a "),
                    emphasis(Delimiter::Underscore, vec![Node::text("b x c")]),
                ]
            )])
        );
        assert_eq!(document.depth(), 3);
    }
}
