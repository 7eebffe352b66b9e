//! ANSI rendering of styled text for terminal previews.
//!
//! Hover and click events have no terminal equivalent and are dropped.
//! Obfuscated runs are masked.

use console::Style as AnsiStyle;

use crate::text::{Color, Style, Text};

const MASK: char = '▒';

/// Renders `text` with ANSI escapes. With `force` unset, styling follows
/// console's own terminal detection.
pub fn to_ansi(text: &Text, force: Option<bool>) -> String {
    let mut out = String::new();
    text.visit(&Style::EMPTY, &mut |content, style| {
        let display = content.display();
        if display.is_empty() {
            return;
        }
        let ansi = ansi_style(style, force);
        if style.obfuscated {
            out.push_str(&ansi.apply_to(mask(display)).to_string());
        } else {
            out.push_str(&ansi.apply_to(display).to_string());
        }
    });
    out
}

fn mask(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_whitespace() { c } else { MASK })
        .collect()
}

fn ansi_style(style: &Style, force: Option<bool>) -> AnsiStyle {
    let mut ansi = AnsiStyle::new();
    if let Some(force) = force {
        ansi = ansi.force_styling(force);
    }
    if let Some(color) = style.color {
        ansi = apply_color(ansi, color);
    }
    if style.bold {
        ansi = ansi.bold();
    }
    if style.italic {
        ansi = ansi.italic();
    }
    if style.underlined {
        ansi = ansi.underlined();
    }
    if style.strikethrough {
        ansi = ansi.strikethrough();
    }
    ansi
}

fn apply_color(ansi: AnsiStyle, color: Color) -> AnsiStyle {
    match color {
        Color::Black => ansi.black(),
        Color::DarkBlue => ansi.blue(),
        Color::DarkGreen => ansi.green(),
        Color::DarkAqua => ansi.cyan(),
        Color::DarkRed => ansi.red(),
        Color::DarkPurple => ansi.magenta(),
        Color::Gold => ansi.yellow(),
        Color::Gray => ansi.white(),
        Color::DarkGray => ansi.black().bright(),
        Color::Blue => ansi.blue().bright(),
        Color::Green => ansi.green().bright(),
        Color::Aqua => ansi.cyan().bright(),
        Color::Red => ansi.red().bright(),
        Color::LightPurple => ansi.magenta().bright(),
        Color::Yellow => ansi.yellow().bright(),
        Color::White => ansi.white().bright(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Formatting;

    #[test]
    fn unstyled_output_is_plain() {
        let text = Text::empty()
            .append(Text::literal("a").formatted(Formatting::Bold))
            .append(Text::literal("b"));
        assert_eq!(to_ansi(&text, Some(false)), "ab");
    }

    #[test]
    fn obfuscated_text_is_masked() {
        let text = Text::literal("no peek").formatted(Formatting::Obfuscated);
        assert_eq!(to_ansi(&text, Some(false)), "▒▒ ▒▒▒▒");
    }

    #[test]
    fn forced_styling_emits_escapes() {
        let text = Text::literal("x").formatted(Formatting::Bold);
        let out = to_ansi(&text, Some(true));
        assert!(out.contains("\u{1b}["));
        assert!(out.contains('x'));
    }
}
