use once_cell::sync::Lazy;
use regex::Regex;

use super::{InlineSyntax, Scope};
use crate::ast::{Node, NodeKind, push_node, push_text};

static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)[^\s<]+").expect("url pattern is valid"));

/// Turns bare URLs in text into links. The link text is verbatim, so later
/// extensions do not reinterpret characters of the URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct Autolink;

impl InlineSyntax for Autolink {
    fn name(&self) -> &'static str {
        "autolink"
    }

    fn rewrite(&self, nodes: Vec<Node>, scope: Scope) -> Vec<Node> {
        if scope.in_link {
            return nodes;
        }

        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node.kind {
                NodeKind::Text(literal) => linkify(&literal, &mut out),
                kind => push_node(
                    &mut out,
                    Node {
                        kind,
                        children: node.children,
                    },
                ),
            }
        }
        out
    }
}

fn linkify(literal: &str, out: &mut Vec<Node>) {
    let mut last = 0;
    for found in URL.find_iter(literal) {
        let url = trim_trailing(found.as_str());
        let www = url.len() >= 4 && url[..4].eq_ignore_ascii_case("www.");
        let prefix = if www {
            4
        } else {
            url.find("://").map_or(url.len(), |i| i + 3)
        };
        if url.len() <= prefix {
            continue;
        }
        let start = found.start();
        push_text(out, &literal[last..start]);

        let destination = if www {
            format!("http://{url}")
        } else {
            url.to_string()
        };
        out.push(Node::link(destination, None, vec![Node::verbatim(url)]));
        last = start + url.len();
    }
    push_text(out, &literal[last..]);
}

/// Drops trailing punctuation and unbalanced closing parentheses, the way
/// extended autolinks do.
fn trim_trailing(url: &str) -> &str {
    let mut url = url;
    loop {
        let Some(last) = url.chars().last() else {
            return url;
        };
        let trimmed = match last {
            '?' | '!' | '.' | ',' | ':' | '*' | '_' | '~' | '\'' | '"' | ';' => true,
            ')' => url.matches(')').count() > url.matches('(').count(),
            _ => false,
        };
        if !trimmed {
            return url;
        }
        url = &url[..url.len() - last.len_utf8()];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::test_util::rewrite;

    #[test]
    fn links_bare_url() {
        let nodes = rewrite(&Autolink, vec![Node::text("see https://example.com/a, ok")]);
        assert_eq!(
            nodes,
            vec![
                Node::text("see "),
                Node::link(
                    "https://example.com/a",
                    None,
                    vec![Node::verbatim("https://example.com/a")]
                ),
                Node::text(", ok"),
            ]
        );
    }

    #[test]
    fn www_gets_scheme() {
        let nodes = rewrite(&Autolink, vec![Node::text("www.example.com.")]);
        assert_eq!(
            nodes,
            vec![
                Node::link(
                    "http://www.example.com",
                    None,
                    vec![Node::verbatim("www.example.com")]
                ),
                Node::text("."),
            ]
        );
    }

    #[test]
    fn keeps_balanced_parentheses() {
        let nodes = rewrite(&Autolink, vec![Node::text("(http://a.b/x_(y))")]);
        assert_eq!(nodes[1], Node::link("http://a.b/x_(y)", None, vec![Node::verbatim("http://a.b/x_(y)")]));
        assert_eq!(nodes[2], Node::text(")"));
    }

    #[test]
    fn bare_scheme_is_not_a_link() {
        let nodes = rewrite(&Autolink, vec![Node::text("http:// nothing")]);
        assert_eq!(nodes, vec![Node::text("http:// nothing")]);
    }

    #[test]
    fn skips_text_inside_links() {
        let nodes = vec![Node::text("http://example.com")];
        let scope = Scope { in_link: true };
        assert_eq!(Autolink.rewrite(nodes.clone(), scope), nodes);
    }
}
