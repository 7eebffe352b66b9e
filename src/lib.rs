mod ast;
mod bootstrap;
mod chain;
mod config;
mod error;
mod parser;
mod render;
pub mod syntax;
pub mod terminal;
mod text;

pub use ast::{Delimiter, Node, NodeKind};
pub use bootstrap::{StylerBootstrap, TextStyler, TextStylerBuilder};
pub use chain::{Children, NodeStyler, Outcome, StylerChain, StylerChainBuilder};
pub use config::{Config, ExtensionsConfig, RenderConfig};
pub use error::{ConfigError, Error, Result};
pub use parser::{Parser, ParserBuilder};
pub use render::Renderer;
pub use text::{ClickAction, ClickEvent, Color, Content, Formatting, HoverEvent, Style, Text};

/// Parse chat markdown into a node tree using the global styler's parser.
pub fn parse(markdown: &str) -> Node {
    TextStyler::global().parse(markdown)
}

/// Render chat markdown into styled text using the global styler.
///
/// Returns `None` when the input has no visible content.
pub fn apply(markdown: &str) -> Option<Text> {
    TextStyler::global().apply(markdown)
}

/// Render chat markdown into the JSON text component form.
pub fn markdown_to_json(markdown: &str) -> Result<String> {
    Ok(serde_json::to_string(&apply(markdown))?)
}
