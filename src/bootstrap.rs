use once_cell::sync::Lazy;
use tracing::debug;

use crate::ast::Node;
use crate::chain::{Children, NodeStyler, Outcome, StylerChain, StylerChainBuilder};
use crate::config::{Config, DEFAULT_MAX_DEPTH};
use crate::parser::{Parser, ParserBuilder};
use crate::render::Renderer;
use crate::syntax::{Autolink, Colored, InlineSyntax, Spoiler, Strikethrough};
use crate::text::Text;

static GLOBAL: Lazy<TextStyler> = Lazy::new(|| TextStyler::from_config(&Config::compiled_default()));

/// A contribution that extends the parser and registers stylers.
pub trait StylerBootstrap {
    fn bootstrap(&self, parser: &mut ParserBuilder, stylers: &mut StylerChainBuilder);
}

impl<F> StylerBootstrap for F
where
    F: Fn(&mut ParserBuilder, &mut StylerChainBuilder),
{
    fn bootstrap(&self, parser: &mut ParserBuilder, stylers: &mut StylerChainBuilder) {
        self(parser, stylers)
    }
}

/// Turns chat markdown into styled [`Text`].
///
/// Holds a frozen parser and styler chain; build one with
/// [`TextStyler::builder`] or use the shared [`TextStyler::global`] instance.
#[derive(Debug)]
pub struct TextStyler {
    parser: Parser,
    chain: StylerChain,
    max_depth: usize,
    command_prefix: String,
}

impl TextStyler {
    pub fn builder() -> TextStylerBuilder {
        TextStylerBuilder::default()
    }

    /// Uses an already built parser and chain.
    pub fn new(parser: Parser, chain: StylerChain) -> Self {
        Self {
            parser,
            chain,
            max_depth: DEFAULT_MAX_DEPTH,
            command_prefix: "/".to_string(),
        }
    }

    /// The extensions and limits named by `config`, with no stylers.
    pub fn from_config(config: &Config) -> Self {
        Self::builder().config(config).build()
    }

    /// The default instance, built on first use.
    pub fn global() -> &'static TextStyler {
        &GLOBAL
    }

    /// Parses and renders `markdown`. `None` when nothing visible remains.
    pub fn apply(&self, markdown: &str) -> Option<Text> {
        let document = self.parser.parse(markdown);
        self.render(&document)
    }

    pub fn render(&self, node: &Node) -> Option<Text> {
        self.renderer().render(node)
    }

    pub fn parse(&self, markdown: &str) -> Node {
        self.parser.parse(markdown)
    }

    pub fn renderer(&self) -> Renderer<'_> {
        Renderer::new(&self.chain)
            .max_depth(self.max_depth)
            .command_prefix(&self.command_prefix)
    }

    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    pub fn chain(&self) -> &StylerChain {
        &self.chain
    }
}

#[derive(Debug)]
pub struct TextStylerBuilder {
    parser: ParserBuilder,
    stylers: StylerChainBuilder,
    max_depth: usize,
    command_prefix: String,
}

impl Default for TextStylerBuilder {
    fn default() -> Self {
        Self {
            parser: ParserBuilder::new(),
            stylers: StylerChainBuilder::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            command_prefix: "/".to_string(),
        }
    }
}

impl TextStylerBuilder {
    /// Adds the standard extensions enabled in `config` and takes its limits.
    pub fn config(mut self, config: &Config) -> Self {
        let extensions = &config.extensions;
        if extensions.strikethrough {
            self.parser.add_extension(Strikethrough);
        }
        if extensions.autolink {
            self.parser.add_extension(Autolink);
        }
        if extensions.spoiler {
            self.parser.add_extension(Spoiler);
        }
        if extensions.colors {
            self.parser.add_extension(Colored);
        }
        self.max_depth(config.render.max_depth)
            .command_prefix(&config.render.command_prefix)
    }

    /// Strikethrough, autolinks, spoilers and color codes.
    pub fn default_extensions(self) -> Self {
        self.config(&Config::default())
    }

    pub fn extension(mut self, extension: impl InlineSyntax + 'static) -> Self {
        self.parser.add_extension(extension);
        self
    }

    pub fn styler(mut self, styler: impl NodeStyler + 'static) -> Self {
        self.stylers.register(styler);
        self
    }

    pub fn styler_with_priority(mut self, priority: i32, styler: impl NodeStyler + 'static) -> Self {
        self.stylers.register_with_priority(priority, styler);
        self
    }

    pub fn styler_fn<F>(mut self, styler: F) -> Self
    where
        F: Fn(&Node, Children<'_>) -> Outcome + Send + Sync + 'static,
    {
        self.stylers.register_fn(styler);
        self
    }

    /// Runs a contribution against this builder.
    pub fn bootstrap(mut self, bootstrap: &dyn StylerBootstrap) -> Self {
        let before = self.stylers.len();
        bootstrap.bootstrap(&mut self.parser, &mut self.stylers);
        debug!(
            stylers = self.stylers.len() - before,
            "ran styler bootstrap"
        );
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self.parser.set_max_depth(max_depth);
        self
    }

    pub fn command_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.command_prefix = prefix.into();
        self
    }

    pub fn build(self) -> TextStyler {
        let parser = self.parser.build();
        let chain = self.stylers.build();
        debug!(
            extensions = ?parser.extensions().collect::<Vec<_>>(),
            stylers = chain.len(),
            "built text styler"
        );
        TextStyler {
            parser,
            chain,
            max_depth: self.max_depth,
            command_prefix: self.command_prefix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn text_styler_is_shareable() {
        assert_send_sync::<TextStyler>();
    }

    #[test]
    fn bootstrap_registers_extensions_and_stylers() {
        let contribution = |parser: &mut ParserBuilder, stylers: &mut StylerChainBuilder| {
            parser.add_extension(Spoiler);
            stylers.register_fn(|node, _| match node.kind {
                NodeKind::Spoiler => Outcome::text(Text::literal("[hidden]")),
                _ => Outcome::Declined,
            });
        };
        let styler = TextStyler::builder().bootstrap(&contribution).build();

        assert_eq!(styler.chain().len(), 1);
        assert_eq!(styler.parser().extensions().collect::<Vec<_>>(), ["spoiler"]);
        assert_eq!(
            styler.apply("a ||b||").map(|text| text.to_plain_string()),
            Some("a [hidden]".to_string())
        );
    }

    #[test]
    fn config_selects_extensions() {
        let mut config = Config::default();
        config.extensions.spoiler = false;
        config.extensions.autolink = false;
        let styler = TextStyler::from_config(&config);
        assert_eq!(
            styler.parser().extensions().collect::<Vec<_>>(),
            ["strikethrough", "colors"]
        );
    }

    #[test]
    fn local_construction() {
        let styler = TextStyler::new(Parser::builder().build(), StylerChain::empty());
        assert_eq!(
            styler.apply("||x||").map(|text| text.to_plain_string()),
            Some("||x||".to_string())
        );
    }

    #[test]
    fn global_has_default_extensions() {
        let names: Vec<_> = TextStyler::global().parser().extensions().collect();
        assert_eq!(names, ["strikethrough", "autolink", "spoiler", "colors"]);
    }
}
