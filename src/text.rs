//! Styled chat text.
//!
//! A [`Text`] is a tree of runs: each run has content, a [`Style`] and child
//! runs appended after its content. Children inherit the style of their parent
//! unless they set something themselves. The serialized form is the JSON text
//! component shape chat clients consume.

use serde::Serialize;

/// The sixteen named chat colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
}

/// A formatting instruction: a color, a text modifier, or a reset.
///
/// Each has a single-character code, as used by the `&` color syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Formatting {
    Color(Color),
    Obfuscated,
    Bold,
    Strikethrough,
    Underline,
    Italic,
    Reset,
}

impl Formatting {
    pub const GRAY: Formatting = Formatting::Color(Color::Gray);
    pub const DARK_GRAY: Formatting = Formatting::Color(Color::DarkGray);
    pub const AQUA: Formatting = Formatting::Color(Color::Aqua);
    pub const RED: Formatting = Formatting::Color(Color::Red);

    /// Looks up a formatting code, case-insensitively.
    pub fn from_code(code: char) -> Option<Formatting> {
        let formatting = match code.to_ascii_lowercase() {
            '0' => Formatting::Color(Color::Black),
            '1' => Formatting::Color(Color::DarkBlue),
            '2' => Formatting::Color(Color::DarkGreen),
            '3' => Formatting::Color(Color::DarkAqua),
            '4' => Formatting::Color(Color::DarkRed),
            '5' => Formatting::Color(Color::DarkPurple),
            '6' => Formatting::Color(Color::Gold),
            '7' => Formatting::Color(Color::Gray),
            '8' => Formatting::Color(Color::DarkGray),
            '9' => Formatting::Color(Color::Blue),
            'a' => Formatting::Color(Color::Green),
            'b' => Formatting::Color(Color::Aqua),
            'c' => Formatting::Color(Color::Red),
            'd' => Formatting::Color(Color::LightPurple),
            'e' => Formatting::Color(Color::Yellow),
            'f' => Formatting::Color(Color::White),
            'k' => Formatting::Obfuscated,
            'l' => Formatting::Bold,
            'm' => Formatting::Strikethrough,
            'n' => Formatting::Underline,
            'o' => Formatting::Italic,
            'r' => Formatting::Reset,
            _ => return None,
        };
        Some(formatting)
    }

    pub fn code(self) -> char {
        match self {
            Formatting::Color(color) => match color {
                Color::Black => '0',
                Color::DarkBlue => '1',
                Color::DarkGreen => '2',
                Color::DarkAqua => '3',
                Color::DarkRed => '4',
                Color::DarkPurple => '5',
                Color::Gold => '6',
                Color::Gray => '7',
                Color::DarkGray => '8',
                Color::Blue => '9',
                Color::Green => 'a',
                Color::Aqua => 'b',
                Color::Red => 'c',
                Color::LightPurple => 'd',
                Color::Yellow => 'e',
                Color::White => 'f',
            },
            Formatting::Obfuscated => 'k',
            Formatting::Bold => 'l',
            Formatting::Strikethrough => 'm',
            Formatting::Underline => 'n',
            Formatting::Italic => 'o',
            Formatting::Reset => 'r',
        }
    }

    pub fn is_color(self) -> bool {
        matches!(self, Formatting::Color(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickAction {
    OpenUrl,
    SuggestCommand,
    CopyToClipboard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClickEvent {
    pub action: ClickAction,
    pub value: String,
}

impl ClickEvent {
    pub fn new(action: ClickAction, value: impl Into<String>) -> Self {
        Self {
            action,
            value: value.into(),
        }
    }

    pub fn open_url(url: impl Into<String>) -> Self {
        Self::new(ClickAction::OpenUrl, url)
    }

    pub fn suggest_command(command: impl Into<String>) -> Self {
        Self::new(ClickAction::SuggestCommand, command)
    }

    pub fn copy_to_clipboard(value: impl Into<String>) -> Self {
        Self::new(ClickAction::CopyToClipboard, value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "contents", rename_all = "snake_case")]
pub enum HoverEvent {
    ShowText(Box<Text>),
}

impl HoverEvent {
    pub fn show_text(text: Text) -> Self {
        HoverEvent::ShowText(Box::new(text))
    }

    pub fn text(&self) -> &Text {
        match self {
            HoverEvent::ShowText(text) => text,
        }
    }
}

/// Style of a single run. Unset fields are inherited from the parent run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Style {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub underlined: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub strikethrough: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub obfuscated: bool,
    #[serde(rename = "clickEvent", skip_serializing_if = "Option::is_none")]
    pub click_event: Option<ClickEvent>,
    #[serde(rename = "hoverEvent", skip_serializing_if = "Option::is_none")]
    pub hover_event: Option<HoverEvent>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Style {
    pub const EMPTY: Style = Style {
        color: None,
        bold: false,
        italic: false,
        underlined: false,
        strikethrough: false,
        obfuscated: false,
        click_event: None,
        hover_event: None,
    };

    /// Applies one formatting instruction. A reset clears everything.
    pub fn with_formatting(mut self, formatting: Formatting) -> Self {
        match formatting {
            Formatting::Color(color) => self.color = Some(color),
            Formatting::Obfuscated => self.obfuscated = true,
            Formatting::Bold => self.bold = true,
            Formatting::Strikethrough => self.strikethrough = true,
            Formatting::Underline => self.underlined = true,
            Formatting::Italic => self.italic = true,
            Formatting::Reset => return Style::EMPTY,
        }
        self
    }

    pub fn with_click_event(mut self, event: ClickEvent) -> Self {
        self.click_event = Some(event);
        self
    }

    pub fn with_hover_event(mut self, event: HoverEvent) -> Self {
        self.hover_event = Some(event);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Style::EMPTY
    }

    /// Resolves this style against the effective style of its parent.
    pub fn inherit(&self, parent: &Style) -> Style {
        Style {
            color: self.color.or(parent.color),
            bold: self.bold || parent.bold,
            italic: self.italic || parent.italic,
            underlined: self.underlined || parent.underlined,
            strikethrough: self.strikethrough || parent.strikethrough,
            obfuscated: self.obfuscated || parent.obfuscated,
            click_event: self.click_event.clone().or_else(|| parent.click_event.clone()),
            hover_event: self.hover_event.clone().or_else(|| parent.hover_event.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Content {
    Literal {
        text: String,
    },
    Translatable {
        translate: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        fallback: Option<String>,
    },
}

impl Content {
    /// The text shown when no translation table is available.
    pub fn display(&self) -> &str {
        match self {
            Content::Literal { text } => text,
            Content::Translatable {
                translate,
                fallback,
            } => fallback.as_deref().unwrap_or(translate),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Text {
    #[serde(flatten)]
    content: Content,
    #[serde(flatten)]
    style: Style,
    #[serde(rename = "extra", skip_serializing_if = "Vec::is_empty")]
    siblings: Vec<Text>,
}

impl Text {
    pub fn literal(text: impl Into<String>) -> Self {
        Self::with_content(Content::Literal { text: text.into() })
    }

    /// An empty literal run, used as the root that children are appended to.
    pub fn empty() -> Self {
        Self::literal("")
    }

    pub fn translatable(key: impl Into<String>, fallback: Option<String>) -> Self {
        Self::with_content(Content::Translatable {
            translate: key.into(),
            fallback,
        })
    }

    fn with_content(content: Content) -> Self {
        Self {
            content,
            style: Style::EMPTY,
            siblings: Vec::new(),
        }
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn siblings(&self) -> &[Text] {
        &self.siblings
    }

    pub fn append(mut self, text: Text) -> Self {
        self.siblings.push(text);
        self
    }

    pub fn push(&mut self, text: Text) {
        self.siblings.push(text);
    }

    pub fn formatted(mut self, formatting: Formatting) -> Self {
        self.style = self.style.with_formatting(formatting);
        self
    }

    pub fn formatted_all(self, formatting: &[Formatting]) -> Self {
        formatting.iter().fold(self, |text, f| text.formatted(*f))
    }

    pub fn styled(mut self, f: impl FnOnce(Style) -> Style) -> Self {
        self.style = f(self.style);
        self
    }

    /// Replaces the style of this run, keeping content and children.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Concatenated display text of this run and its children.
    pub fn to_plain_string(&self) -> String {
        let mut out = String::new();
        self.visit(&Style::EMPTY, &mut |content, _| out.push_str(content.display()));
        out
    }

    /// True when no run in this tree carries any display text.
    pub fn is_blank(&self) -> bool {
        self.content.display().is_empty() && self.siblings.iter().all(Text::is_blank)
    }

    /// Walks the tree in display order, yielding each run's content with its
    /// effective (inherited) style.
    pub fn visit<F>(&self, parent: &Style, f: &mut F)
    where
        F: FnMut(&Content, &Style),
    {
        let style = self.style.inherit(parent);
        f(&self.content, &style);
        for sibling in &self.siblings {
            sibling.visit(&style, f);
        }
    }
}
