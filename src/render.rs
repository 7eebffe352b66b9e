use tracing::trace;

use crate::ast::{Delimiter, Node, NodeKind};
use crate::chain::{Outcome, StylerChain};
use crate::config::DEFAULT_MAX_DEPTH;
use crate::text::{ClickEvent, Formatting, HoverEvent, Style, Text};

const CONSOLE_HINT: &str = "Click to Copy to Console";
const CLIPBOARD_KEY: &str = "chat.copy.click";
const CLIPBOARD_FALLBACK: &str = "Click to Copy to Clipboard";

/// Renders a [`Node`] tree into styled [`Text`], consulting a
/// [`StylerChain`] at every node before applying the built-in rules.
///
/// `None` means the node has no visible content. Wrapping rules never turn
/// `None` into an empty run.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    chain: &'a StylerChain,
    max_depth: usize,
    command_prefix: &'a str,
}

impl<'a> Renderer<'a> {
    pub fn new(chain: &'a StylerChain) -> Self {
        Self {
            chain,
            max_depth: DEFAULT_MAX_DEPTH,
            command_prefix: "/",
        }
    }

    /// Nodes deeper than this are flattened to plain text without consulting
    /// the chain. Trees from a [`Parser`](crate::Parser) with the same limit
    /// never reach it.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Inline code starting with this prefix is offered as a console command.
    pub fn command_prefix(mut self, prefix: &'a str) -> Self {
        self.command_prefix = prefix;
        self
    }

    pub fn render(&self, node: &Node) -> Option<Text> {
        self.render_node(node, 0)
    }

    fn render_node(&self, node: &Node, depth: usize) -> Option<Text> {
        if depth > self.max_depth {
            trace!(depth, "flattening deeply nested node");
            return flatten(node);
        }

        let children = || self.children_of(node, depth);
        if let Outcome::Rendered(text) = self.chain.invoke(node, &children) {
            return text;
        }

        match &node.kind {
            NodeKind::Text(literal) | NodeKind::Verbatim(literal) => literal_text(literal),
            NodeKind::Code(literal) => self.render_code(literal),
            NodeKind::StrongEmphasis { delimiter } => {
                let formatting = match delimiter {
                    Delimiter::Underscore => Formatting::Underline,
                    Delimiter::Asterisk => Formatting::Bold,
                };
                self.render_emphasis(node, depth, formatting)
            }
            NodeKind::Emphasis { .. } => self.render_emphasis(node, depth, Formatting::Italic),
            NodeKind::Strikethrough => {
                self.render_emphasis(node, depth, Formatting::Strikethrough)
            }
            NodeKind::Link { destination, title } => {
                self.render_link(node, depth, destination, title.as_deref())
            }
            NodeKind::Formatted(formatting) => self
                .children_of(node, depth)
                .map(|text| text.formatted_all(formatting)),
            NodeKind::Spoiler => self.children_of(node, depth).map(spoiler),
            NodeKind::SoftBreak => Some(Text::literal(" ")),
            NodeKind::HardBreak => Some(Text::literal("\n")),
            NodeKind::Document | NodeKind::Image { .. } => self.children_of(node, depth),
        }
    }

    /// Renders each child in order and appends the visible ones to an empty
    /// root. `None` when no child is visible.
    pub fn render_children(&self, node: &Node) -> Option<Text> {
        self.children_of(node, 0)
    }

    fn children_of(&self, node: &Node, depth: usize) -> Option<Text> {
        let mut result: Option<Text> = None;
        for child in &node.children {
            if let Some(text) = self.render_node(child, depth + 1) {
                result.get_or_insert_with(Text::empty).push(text);
            }
        }
        result
    }

    fn render_code(&self, literal: &str) -> Option<Text> {
        if literal.is_empty() {
            return None;
        }

        let text = Text::literal(literal).formatted(Formatting::GRAY);
        let is_command =
            !self.command_prefix.is_empty() && literal.starts_with(self.command_prefix);
        let styled = if is_command {
            text.styled(|style| {
                style
                    .with_hover_event(HoverEvent::show_text(Text::literal(CONSOLE_HINT)))
                    .with_click_event(ClickEvent::suggest_command(literal))
            })
        } else {
            text.styled(|style| {
                style
                    .with_hover_event(HoverEvent::show_text(Text::translatable(
                        CLIPBOARD_KEY,
                        Some(CLIPBOARD_FALLBACK.to_string()),
                    )))
                    .with_click_event(ClickEvent::copy_to_clipboard(literal))
            })
        };
        Some(styled)
    }

    fn render_emphasis(&self, node: &Node, depth: usize, formatting: Formatting) -> Option<Text> {
        self.children_of(node, depth)
            .map(|text| text.formatted(formatting))
    }

    fn render_link(
        &self,
        node: &Node,
        depth: usize,
        destination: &str,
        title: Option<&str>,
    ) -> Option<Text> {
        let text = match self.children_of(node, depth) {
            Some(text) => text,
            None if destination.is_empty() => return None,
            None => Text::literal(destination),
        };

        let goes_to = Text::literal("Goes to ")
            .append(
                Text::literal(destination)
                    .formatted(Formatting::AQUA)
                    .formatted(Formatting::Underline),
            )
            .formatted(Formatting::GRAY)
            .formatted(Formatting::Italic);

        let hover = match title {
            Some(title) => Text::literal(title)
                .append(Text::literal("\n\n"))
                .append(goes_to),
            None => goes_to,
        };

        Some(text.with_style(link_style(destination, hover)))
    }
}

fn literal_text(literal: &str) -> Option<Text> {
    if literal.is_empty() {
        None
    } else {
        Some(Text::literal(literal))
    }
}

fn link_style(url: &str, hover: Text) -> Style {
    Style::EMPTY
        .with_formatting(Formatting::AQUA)
        .with_formatting(Formatting::Underline)
        .with_click_event(ClickEvent::open_url(url))
        .with_hover_event(HoverEvent::show_text(hover))
}

/// Obfuscates the text, revealing the original on hover.
fn spoiler(text: Text) -> Text {
    let hover = text.clone();
    text.with_style(
        Style::EMPTY
            .with_formatting(Formatting::DARK_GRAY)
            .with_formatting(Formatting::Obfuscated)
            .with_hover_event(HoverEvent::show_text(hover)),
    )
}

fn flatten(node: &Node) -> Option<Text> {
    literal_text(&node.plain_text())
}
