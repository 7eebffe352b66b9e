use super::{InlineSyntax, Scope};
use crate::ast::{Node, NodeKind, merge};

const DELIMITER: &str = "||";

/// `||hidden||` text, paired left to right within one sibling list.
#[derive(Debug, Clone, Copy, Default)]
pub struct Spoiler;

impl InlineSyntax for Spoiler {
    fn name(&self) -> &'static str {
        "spoiler"
    }

    fn rewrite(&self, nodes: Vec<Node>, _scope: Scope) -> Vec<Node> {
        // Text is pushed unmerged so that `open` keeps pointing at the first
        // node after the opening delimiter.
        let mut out = Vec::with_capacity(nodes.len());
        let mut open: Option<usize> = None;

        for node in nodes {
            let NodeKind::Text(literal) = &node.kind else {
                out.push(node);
                continue;
            };

            let mut rest = literal.as_str();
            while let Some(pos) = rest.find(DELIMITER) {
                push_literal(&mut out, &rest[..pos]);
                match open.take() {
                    None => open = Some(out.len()),
                    Some(start) => {
                        let inner = merge(out.split_off(start));
                        out.push(Node::spoiler(visible(inner)));
                    }
                }
                rest = &rest[pos + DELIMITER.len()..];
            }
            push_literal(&mut out, rest);
        }

        if let Some(start) = open {
            out.insert(start, Node::text(DELIMITER));
        }
        merge(out)
    }
}

fn push_literal(out: &mut Vec<Node>, literal: &str) {
    if !literal.is_empty() {
        out.push(Node::text(literal));
    }
}

/// Spoiler content that is only whitespace hides nothing.
fn visible(inner: Vec<Node>) -> Vec<Node> {
    let blank = inner.iter().all(|node| match &node.kind {
        NodeKind::Text(literal) | NodeKind::Verbatim(literal) => literal.trim().is_empty(),
        NodeKind::SoftBreak | NodeKind::HardBreak => true,
        _ => false,
    });
    if blank { Vec::new() } else { inner }
}
