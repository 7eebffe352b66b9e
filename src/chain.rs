//! The styler chain.
//!
//! Stylers get first refusal on every node before the built-in rules run.
//! Each one sees the node and a thunk that renders the node's children on
//! demand, and either declines or produces the result for that node.

use tracing::trace;

use crate::ast::Node;
use crate::text::Text;

/// Renders the children of the node being styled. Evaluated only when called.
pub type Children<'a> = &'a dyn Fn() -> Option<Text>;

/// What a styler decided about a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No opinion; the next styler, or the built-in rule, handles the node.
    Declined,
    /// The node renders to this, which may be nothing at all.
    Rendered(Option<Text>),
}

impl Outcome {
    pub fn text(text: Text) -> Self {
        Outcome::Rendered(Some(text))
    }

    /// The node renders to nothing and no one else gets to render it.
    pub fn absent() -> Self {
        Outcome::Rendered(None)
    }

    pub fn is_declined(&self) -> bool {
        matches!(self, Outcome::Declined)
    }

    pub fn into_rendered(self) -> Option<Option<Text>> {
        match self {
            Outcome::Declined => None,
            Outcome::Rendered(text) => Some(text),
        }
    }
}

impl From<Option<Text>> for Outcome {
    fn from(text: Option<Text>) -> Self {
        Outcome::Rendered(text)
    }
}

pub trait NodeStyler: Send + Sync {
    /// Styles `node`, calling `children` only if the child text is needed.
    fn style(&self, node: &Node, children: Children<'_>) -> Outcome;
}

impl<F> NodeStyler for F
where
    F: Fn(&Node, Children<'_>) -> Outcome + Send + Sync,
{
    fn style(&self, node: &Node, children: Children<'_>) -> Outcome {
        self(node, children)
    }
}

struct Entry {
    priority: i32,
    styler: Box<dyn NodeStyler>,
}

/// Collects stylers during bootstrap.
#[derive(Default)]
pub struct StylerChainBuilder {
    entries: Vec<Entry>,
}

impl std::fmt::Debug for StylerChainBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StylerChainBuilder")
            .field("stylers", &self.entries.len())
            .finish()
    }
}

impl StylerChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a styler with priority 0.
    pub fn register(&mut self, styler: impl NodeStyler + 'static) -> &mut Self {
        self.register_with_priority(0, styler)
    }

    /// Registers a styler. Higher priorities run first; equal priorities run
    /// in registration order.
    pub fn register_with_priority(
        &mut self,
        priority: i32,
        styler: impl NodeStyler + 'static,
    ) -> &mut Self {
        self.entries.push(Entry {
            priority,
            styler: Box::new(styler),
        });
        self
    }

    /// Registers a closure. Gives the closure its signature, which a bare
    /// closure passed to [`register`](Self::register) cannot infer.
    pub fn register_fn<F>(&mut self, styler: F) -> &mut Self
    where
        F: Fn(&Node, Children<'_>) -> Outcome + Send + Sync + 'static,
    {
        self.register(styler)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn build(mut self) -> StylerChain {
        self.entries.sort_by_key(|entry| std::cmp::Reverse(entry.priority));
        StylerChain {
            stylers: self.entries.into_iter().map(|entry| entry.styler).collect(),
        }
    }
}

/// A frozen, ordered list of stylers.
#[derive(Default)]
pub struct StylerChain {
    stylers: Vec<Box<dyn NodeStyler>>,
}

impl std::fmt::Debug for StylerChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StylerChain")
            .field("stylers", &self.stylers.len())
            .finish()
    }
}

impl StylerChain {
    pub fn builder() -> StylerChainBuilder {
        StylerChainBuilder::new()
    }

    /// A chain that declines everything.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.stylers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stylers.is_empty()
    }

    /// Offers `node` to each styler in order and returns the first answer.
    pub fn invoke(&self, node: &Node, children: Children<'_>) -> Outcome {
        for (index, styler) in self.stylers.iter().enumerate() {
            let outcome = styler.style(node, children);
            if !outcome.is_declined() {
                trace!(styler = index, "styler claimed node");
                return outcome;
            }
        }
        Outcome::Declined
    }
}
