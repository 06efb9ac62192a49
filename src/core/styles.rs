//! Style roles mapping logical output elements to `colored::Color`.
//!
//! Coloring is applied only when the `enabled` flag passed to `paint()` is
//! true, so callers decide once (TTY, `--no-color`) and pass it down.
//!
//! ```
//! use adpipeline::core::styles::StyleRole;
//! assert_eq!(StyleRole::Header.paint("Pipeline", false), "Pipeline");
//! assert!(StyleRole::Header.paint("Pipeline", true).starts_with("\x1b["));
//! ```

use clap::builder::styling::AnsiColor;
use colored::Color;

macro_rules! style {
    ( $( $variant:ident => $color:expr ),+ $(,)? ) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub enum StyleRole { $( $variant ),+ }

        impl StyleRole {
            pub fn color(self) -> Option<Color> {
                match self { $( StyleRole::$variant => $color ),+ }
            }
        }
    }
}

style! {
    Header      => Some(Color::Yellow),
    Literal     => Some(Color::Cyan),
    Placeholder => Some(Color::Green),
    Valid       => Some(Color::Green),
    Invalid     => Some(Color::Red),
    Error       => Some(Color::BrightRed),
    Key         => Some(Color::BrightGreen),
    Value       => None,
    Dim         => Some(Color::BrightBlack),
}

impl StyleRole {
    pub fn ansi_code(self) -> Option<&'static str> {
        ansi_code(self.color()?)
    }

    pub fn paint(self, text: &str, enabled: bool) -> String {
        match self.ansi_code() {
            Some(code) if enabled => format!("\x1b[{code}m{text}\x1b[0m"),
            _ => text.to_string(),
        }
    }

    /// Foreground spec for a prettytable cell (`"Fy"`), `None` when uncolored
    pub fn cell_spec(self, enabled: bool) -> Option<&'static str> {
        if !enabled {
            return None;
        }
        Some(match self.color()? {
            Color::Red => "Fr",
            Color::Green => "Fg",
            Color::Yellow => "Fy",
            Color::Cyan => "Fc",
            Color::BrightRed => "FR",
            Color::BrightGreen => "FG",
            Color::BrightBlack => "FK",
            _ => return None,
        })
    }
}

fn ansi_code(color: Color) -> Option<&'static str> {
    Some(match color {
        Color::Red => "31",
        Color::Green => "32",
        Color::Yellow => "33",
        Color::Cyan => "36",
        Color::BrightBlack => "90",
        Color::BrightRed => "91",
        Color::BrightGreen => "92",
        _ => return None,
    })
}

fn clap_color(color: Color) -> Option<AnsiColor> {
    Some(match color {
        Color::Red => AnsiColor::Red,
        Color::Green => AnsiColor::Green,
        Color::Yellow => AnsiColor::Yellow,
        Color::Cyan => AnsiColor::Cyan,
        Color::BrightBlack => AnsiColor::BrightBlack,
        Color::BrightRed => AnsiColor::BrightRed,
        Color::BrightGreen => AnsiColor::BrightGreen,
        _ => return None,
    })
}

/// Clap help styles built from the same roles
pub fn palette_to_clap(enabled: bool) -> clap::builder::Styles {
    use clap::builder::styling::{Color as ClapColor, Style};
    if !enabled {
        return clap::builder::Styles::plain();
    }

    let style = |role: StyleRole, bold: bool| {
        let mut s = Style::new();
        if let Some(col) = role.color().and_then(clap_color) {
            s = s.fg_color(Some(ClapColor::Ansi(col)));
        }
        if bold {
            s = s.bold();
        }
        s
    };

    clap::builder::Styles::styled()
        .header(style(StyleRole::Header, true))
        .usage(style(StyleRole::Header, true))
        .literal(style(StyleRole::Literal, false))
        .placeholder(style(StyleRole::Placeholder, false))
        .valid(style(StyleRole::Valid, false))
        .invalid(style(StyleRole::Invalid, false))
        .error(style(StyleRole::Error, false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_enabled_and_disabled() {
        let colored = StyleRole::Invalid.paint("confirmed-bad", true);
        assert_eq!(colored, "\x1b[31mconfirmed-bad\x1b[0m");
        assert_eq!(StyleRole::Invalid.paint("confirmed-bad", false), "confirmed-bad");
        assert_eq!(StyleRole::Value.paint("plain", true), "plain");
    }

    #[test]
    fn test_cell_spec() {
        assert_eq!(StyleRole::Header.cell_spec(true), Some("Fy"));
        assert_eq!(StyleRole::Header.cell_spec(false), None);
        assert_eq!(StyleRole::Value.cell_spec(true), None);
    }

    #[test]
    fn test_palette_to_clap_differs_when_enabled() {
        let plain = format!("{:?}", palette_to_clap(false));
        let styled = format!("{:?}", palette_to_clap(true));
        assert_ne!(plain, styled);
    }
}
