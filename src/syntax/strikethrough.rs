use pulldown_cmark::Options;

use super::InlineSyntax;

/// `~~struck~~` text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Strikethrough;

impl InlineSyntax for Strikethrough {
    fn name(&self) -> &'static str {
        "strikethrough"
    }

    fn options(&self) -> Options {
        Options::ENABLE_STRIKETHROUGH
    }
}
