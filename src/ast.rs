use crate::text::Formatting;

/// The character an emphasis run was opened with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    /// `*` or `**`
    Asterisk,
    /// `_` or `__`
    Underscore,
}

impl Delimiter {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '*' => Some(Delimiter::Asterisk),
            '_' => Some(Delimiter::Underscore),
            _ => None,
        }
    }
}

/// Inline node kinds parsed from chat markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NodeKind {
    Document,
    Text(String),
    /// Text taken verbatim from a backslash escape, a character reference or
    /// an autolinked URL. Inline syntax extensions leave it alone, and
    /// [`Parser::parse`](crate::Parser::parse) folds it back into `Text` once
    /// every extension has run.
    Verbatim(String),
    Code(String),
    Emphasis {
        delimiter: Delimiter,
    },
    StrongEmphasis {
        delimiter: Delimiter,
    },
    Strikethrough,
    Link {
        destination: String,
        title: Option<String>,
    },
    Image {
        destination: String,
        title: Option<String>,
    },
    SoftBreak,
    HardBreak,
    /// Added by the `&` color syntax.
    Formatted(Vec<Formatting>),
    /// Added by the `||spoiler||` syntax.
    Spoiler,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    pub fn with_children(kind: NodeKind, children: Vec<Node>) -> Self {
        Self { kind, children }
    }

    pub fn document(children: Vec<Node>) -> Self {
        Self::with_children(NodeKind::Document, children)
    }

    pub fn text(literal: impl Into<String>) -> Self {
        Self::new(NodeKind::Text(literal.into()))
    }

    pub fn verbatim(literal: impl Into<String>) -> Self {
        Self::new(NodeKind::Verbatim(literal.into()))
    }

    pub fn code(literal: impl Into<String>) -> Self {
        Self::new(NodeKind::Code(literal.into()))
    }

    pub fn link(destination: impl Into<String>, title: Option<String>, children: Vec<Node>) -> Self {
        Self::with_children(
            NodeKind::Link {
                destination: destination.into(),
                title,
            },
            children,
        )
    }

    pub fn spoiler(children: Vec<Node>) -> Self {
        Self::with_children(NodeKind::Spoiler, children)
    }

    pub fn formatted(formatting: Vec<Formatting>, children: Vec<Node>) -> Self {
        Self::with_children(NodeKind::Formatted(formatting), children)
    }

    /// The text content of the subtree, with line breaks as whitespace.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match &node.kind {
                NodeKind::Text(literal) | NodeKind::Verbatim(literal) | NodeKind::Code(literal) => {
                    out.push_str(literal)
                }
                NodeKind::SoftBreak => out.push(' '),
                NodeKind::HardBreak => out.push('\n'),
                _ => {}
            }
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Depth of the deepest descendant; a leaf has depth 0.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            max = max.max(depth);
            stack.extend(node.children.iter().map(|child| (child, depth + 1)));
        }
        max
    }
}

/// Appends `node` to `nodes`, merging adjacent text.
pub(crate) fn push_node(nodes: &mut Vec<Node>, node: Node) {
    if let NodeKind::Text(literal) = &node.kind {
        if literal.is_empty() {
            return;
        }
        if let Some(NodeKind::Text(last)) = nodes.last_mut().map(|n| &mut n.kind) {
            last.push_str(literal);
            return;
        }
    }
    nodes.push(node);
}

/// Merges adjacent text nodes and drops empty ones.
pub(crate) fn merge(nodes: Vec<Node>) -> Vec<Node> {
    let mut merged = Vec::with_capacity(nodes.len());
    for node in nodes {
        push_node(&mut merged, node);
    }
    merged
}

pub(crate) fn push_text(nodes: &mut Vec<Node>, literal: &str) {
    if !literal.is_empty() {
        push_node(nodes, Node::text(literal));
    }
}
