//! Inline syntax extensions.
//!
//! pulldown-cmark has no hook for custom inline syntax, so extensions work on
//! the parsed tree instead: each one rewrites every sibling list, children
//! before parents, in one pass over the whole document. Passes run in
//! registration order, so a later extension sees the nodes an earlier one
//! created.

mod autolink;
mod colored;
mod spoiler;
mod strikethrough;

pub use autolink::Autolink;
pub use colored::Colored;
pub use spoiler::Spoiler;
pub use strikethrough::Strikethrough;

use pulldown_cmark::Options;

use crate::ast::{Node, NodeKind, merge};

/// Where a sibling list sits in the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scope {
    /// Some ancestor is a link or image.
    pub in_link: bool,
}

pub trait InlineSyntax: Send + Sync {
    fn name(&self) -> &'static str;

    /// pulldown-cmark options this syntax needs.
    fn options(&self) -> Options {
        Options::empty()
    }

    /// Rewrites one list of siblings. The default leaves it untouched.
    fn rewrite(&self, nodes: Vec<Node>, _scope: Scope) -> Vec<Node> {
        nodes
    }
}

impl std::fmt::Debug for dyn InlineSyntax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub(crate) fn rewrite_tree(node: Node, syntax: &dyn InlineSyntax) -> Node {
    rewrite_node(node, syntax, Scope::default())
}

fn rewrite_node(node: Node, syntax: &dyn InlineSyntax, scope: Scope) -> Node {
    let Node { kind, children } = node;
    if children.is_empty() {
        return Node { kind, children };
    }

    let child_scope = Scope {
        in_link: scope.in_link || matches!(kind, NodeKind::Link { .. } | NodeKind::Image { .. }),
    };
    let children = children
        .into_iter()
        .map(|child| rewrite_node(child, syntax, child_scope))
        .collect();

    Node {
        kind,
        children: merge(syntax.rewrite(children, child_scope)),
    }
}
