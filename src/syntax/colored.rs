use super::{InlineSyntax, Scope};
use crate::ast::{Node, NodeKind, merge};
use crate::text::Formatting;

const MARKER: char = '&';

/// `&c`-style formatting codes.
///
/// A code applies to the rest of its sibling list: a color replaces whatever
/// was active, a modifier adds to it and `&r` clears it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Colored;

impl InlineSyntax for Colored {
    fn name(&self) -> &'static str {
        "colors"
    }

    fn rewrite(&self, nodes: Vec<Node>, _scope: Scope) -> Vec<Node> {
        let mut runs = Runs::default();

        for node in nodes {
            let NodeKind::Text(literal) = &node.kind else {
                runs.segment.push(node);
                continue;
            };

            let mut last = 0;
            let mut search = 0;
            while let Some(offset) = literal[search..].find(MARKER) {
                let at = search + offset;
                let code_at = at + MARKER.len_utf8();
                let code = literal[code_at..].chars().next();
                match code.and_then(Formatting::from_code) {
                    Some(formatting) => {
                        runs.push_text(&literal[last..at]);
                        runs.apply(formatting);
                        last = code_at + code.map_or(0, char::len_utf8);
                        search = last;
                    }
                    None => search = code_at,
                }
            }
            runs.push_text(&literal[last..]);
        }

        runs.finish()
    }
}

#[derive(Default)]
struct Runs {
    out: Vec<Node>,
    segment: Vec<Node>,
    active: Vec<Formatting>,
}

impl Runs {
    fn push_text(&mut self, literal: &str) {
        if !literal.is_empty() {
            self.segment.push(Node::text(literal));
        }
    }

    fn apply(&mut self, formatting: Formatting) {
        self.flush();
        match formatting {
            Formatting::Reset => self.active.clear(),
            formatting if formatting.is_color() => self.active = vec![formatting],
            _ => {
                if !self.active.contains(&formatting) {
                    self.active.push(formatting);
                }
            }
        }
    }

    fn flush(&mut self) {
        let segment = merge(std::mem::take(&mut self.segment));
        if segment.is_empty() {
            return;
        }
        if self.active.is_empty() {
            self.out.extend(segment);
        } else {
            self.out.push(Node::formatted(self.active.clone(), segment));
        }
    }

    fn finish(mut self) -> Vec<Node> {
        self.flush();
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::test_util::rewrite;

    #[test]
    fn color_applies_to_rest_of_list() {
        let nodes = rewrite(&Colored, vec![Node::text("plain &cred"), Node::code("x")]);
        assert_eq!(
            nodes,
            vec![
                Node::text("plain "),
                Node::formatted(vec![Formatting::RED], vec![Node::text("red"), Node::code("x")]),
            ]
        );
    }

    #[test]
    fn modifiers_stack_and_color_replaces() {
        let nodes = rewrite(&Colored, vec![Node::text("&ca&Lb&7c")]);
        assert_eq!(
            nodes,
            vec![
                Node::formatted(vec![Formatting::RED], vec![Node::text("a")]),
                Node::formatted(vec![Formatting::RED, Formatting::Bold], vec![Node::text("b")]),
                Node::formatted(vec![Formatting::GRAY], vec![Node::text("c")]),
            ]
        );
    }

    #[test]
    fn reset_returns_to_plain() {
        let nodes = rewrite(&Colored, vec![Node::text("&lbold&r plain")]);
        assert_eq!(
            nodes,
            vec![
                Node::formatted(vec![Formatting::Bold], vec![Node::text("bold")]),
                Node::text(" plain"),
            ]
        );
    }

    #[test]
    fn unknown_codes_stay_literal() {
        let nodes = rewrite(&Colored, vec![Node::text("fish & chips &z &")]);
        assert_eq!(nodes, vec![Node::text("fish & chips &z &")]);
    }

    #[test]
    fn verbatim_text_is_left_alone() {
        let nodes = rewrite(
            &Colored,
            vec![Node::verbatim("&c"), Node::text("x&l"), Node::verbatim("&r")],
        );
        assert_eq!(
            nodes,
            vec![Node::verbatim("&c"), Node::text("x"), Node::verbatim("&r")]
        );
    }

    #[test]
    fn trailing_code_wraps_nothing() {
        let nodes = rewrite(&Colored, vec![Node::text("end&c")]);
        assert_eq!(nodes, vec![Node::text("end")]);
    }
}
