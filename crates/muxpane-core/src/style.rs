//! Cell styles and the inline style mini-language.
//!
//! A [`Style`] is the classic terminal triple — foreground index, background
//! index, attribute bitmask — plus two flag bits recording whether each colour
//! index addresses the 256-colour palette. [`parse_style`] applies directives
//! of the form `fg=red,bg=colour240,bold,noreverse` as a delta on top of an
//! existing style; any unrecognized token aborts the whole directive and
//! leaves the target untouched.

use bitflags::bitflags;
use tracing::trace;

/// Colour index meaning "use the default colour" (SGR 39/49).
pub const COLOUR_DEFAULT: u8 = 8;

/// Bit set on a resolved colour value to mark it as a 256-palette index.
///
/// Stripped before the index is stored; the information moves into
/// [`StyleFlags::FG256`] / [`StyleFlags::BG256`].
const COLOUR_256: u16 = 0x100;

/// Longest style token the parser accepts.
const TOKEN_MAX: usize = 31;

bitflags! {
    /// Text attribute bitmask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attrs: u8 {
        const BRIGHT     = 0x01;
        const DIM        = 0x02;
        const UNDERSCORE = 0x04;
        const BLINK      = 0x08;
        const REVERSE    = 0x10;
        const HIDDEN     = 0x20;
        const ITALICS    = 0x40;
        /// Draw through the alternate (line-drawing) character set.
        const CHARSET    = 0x80;
    }
}

bitflags! {
    /// Style encoding flags, orthogonal to the attribute bitmask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        /// Foreground index addresses the 256-colour palette.
        const FG256 = 0x01;
        /// Background index addresses the 256-colour palette.
        const BG256 = 0x02;
    }
}

/// Foreground, background, and attributes for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Style {
    pub fg: u8,
    pub bg: u8,
    pub attrs: Attrs,
    pub flags: StyleFlags,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fg: COLOUR_DEFAULT,
            bg: COLOUR_DEFAULT,
            attrs: Attrs::empty(),
            flags: StyleFlags::empty(),
        }
    }
}

/// Resolve a colour name to its index.
///
/// The eight ANSI names map to 0-7, `default` to the sentinel index 8, and
/// `colourN` (N in 0-255) to N with [`COLOUR_256`] set so the caller can
/// record the palette in the style flags.
#[must_use]
pub fn colour_from_name(name: &str) -> Option<u16> {
    if name.len() > "colour".len() && name.as_bytes()[..6].eq_ignore_ascii_case(b"colour") {
        let n: u16 = name["colour".len()..].parse().ok()?;
        if n > 255 {
            return None;
        }
        return Some(n | COLOUR_256);
    }
    let index = match name.to_ascii_lowercase().as_str() {
        "black" => 0,
        "red" => 1,
        "green" => 2,
        "yellow" => 3,
        "blue" => 4,
        "magenta" => 5,
        "cyan" => 6,
        "white" => 7,
        "default" => u16::from(COLOUR_DEFAULT),
        _ => return None,
    };
    Some(index)
}

/// Resolve an attribute name to its bit.
#[must_use]
pub fn attribute_from_name(name: &str) -> Option<Attrs> {
    let attr = match name.to_ascii_lowercase().as_str() {
        "bright" | "bold" => Attrs::BRIGHT,
        "dim" => Attrs::DIM,
        "underscore" => Attrs::UNDERSCORE,
        "blink" => Attrs::BLINK,
        "reverse" => Attrs::REVERSE,
        "hidden" => Attrs::HIDDEN,
        "italics" => Attrs::ITALICS,
        _ => return None,
    };
    Some(attr)
}

/// Parse an inline style directive and apply it to `target`.
///
/// Tokens are separated by spaces or commas:
///
/// - `default` — reset fg/bg/attrs to `default_style`, carrying over its
///   palette flags.
/// - `fg=<colour>` / `bg=<colour>` — set one channel; colour index 8 means
///   "use the default channel".
/// - `<attr>` / `no<attr>` — set or clear one attribute bit.
///
/// The grammar is fail-closed: a malformed directive (trailing separator,
/// oversized token, unknown colour or attribute name) leaves `target`
/// completely unchanged.
pub fn parse_style(default_style: &Style, target: &mut Style, input: &str) {
    if input.is_empty() {
        return;
    }
    if input.ends_with([' ', ',']) {
        trace!(input, "style directive has trailing separator, ignored");
        return;
    }

    // Work on a scratch copy; commit only if every token resolves.
    let mut style = *target;
    for token in input.split([' ', ',']).filter(|t| !t.is_empty()) {
        if token.len() > TOKEN_MAX {
            trace!(token, "style token too long, directive ignored");
            return;
        }
        if token.eq_ignore_ascii_case("default") {
            style.fg = default_style.fg;
            style.bg = default_style.bg;
            style.attrs = default_style.attrs;
            style.flags -= StyleFlags::FG256 | StyleFlags::BG256;
            style.flags |= default_style.flags & (StyleFlags::FG256 | StyleFlags::BG256);
        } else if token.len() > 3 && token.as_bytes()[1..3].eq_ignore_ascii_case(b"g=") {
            let Some(value) = colour_from_name(&token[3..]) else {
                trace!(token, "unknown colour name, directive ignored");
                return;
            };
            let (channel, palette_flag, default_channel) = match token.as_bytes()[0] {
                b'f' | b'F' => (&mut style.fg, StyleFlags::FG256, default_style.fg),
                b'b' | b'B' => (&mut style.bg, StyleFlags::BG256, default_style.bg),
                _ => return,
            };
            if value == u16::from(COLOUR_DEFAULT) {
                *channel = default_channel;
                style.flags -= palette_flag;
                style.flags |= default_style.flags & palette_flag;
            } else if value & COLOUR_256 != 0 {
                *channel = (value & !COLOUR_256) as u8;
                style.flags |= palette_flag;
            } else {
                *channel = value as u8;
                style.flags -= palette_flag;
            }
        } else if token.len() > 2 && token.as_bytes()[..2].eq_ignore_ascii_case(b"no") {
            let Some(attr) = attribute_from_name(&token[2..]) else {
                trace!(token, "unknown attribute name, directive ignored");
                return;
            };
            style.attrs -= attr;
        } else {
            let Some(attr) = attribute_from_name(token) else {
                trace!(token, "unknown attribute name, directive ignored");
                return;
            };
            style.attrs |= attr;
        }
    }
    *target = style;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colour_names_resolve() {
        assert_eq!(colour_from_name("black"), Some(0));
        assert_eq!(colour_from_name("RED"), Some(1));
        assert_eq!(colour_from_name("white"), Some(7));
        assert_eq!(colour_from_name("default"), Some(8));
        assert_eq!(colour_from_name("colour0"), Some(0x100));
        assert_eq!(colour_from_name("Colour255"), Some(0x100 | 255));
        assert_eq!(colour_from_name("colour256"), None);
        assert_eq!(colour_from_name("mauve"), None);
    }

    #[test]
    fn attribute_names_resolve() {
        assert_eq!(attribute_from_name("bold"), Some(Attrs::BRIGHT));
        assert_eq!(attribute_from_name("bright"), Some(Attrs::BRIGHT));
        assert_eq!(attribute_from_name("Reverse"), Some(Attrs::REVERSE));
        assert_eq!(attribute_from_name("shiny"), None);
    }

    #[test]
    fn parse_fg_and_attr() {
        let default = Style::default();
        let mut style = Style::default();
        parse_style(&default, &mut style, "fg=red,bold");
        assert_eq!(style.fg, 1);
        assert_eq!(style.bg, COLOUR_DEFAULT);
        assert!(style.attrs.contains(Attrs::BRIGHT));
        assert!(!style.flags.contains(StyleFlags::FG256));
    }

    #[test]
    fn parse_256_colour_sets_flag() {
        let default = Style::default();
        let mut style = Style::default();
        parse_style(&default, &mut style, "bg=colour240");
        assert_eq!(style.bg, 240);
        assert!(style.flags.contains(StyleFlags::BG256));
        assert!(!style.flags.contains(StyleFlags::FG256));
    }

    #[test]
    fn unknown_colour_aborts_whole_directive() {
        let default = Style::default();
        let mut style = Style::default();
        parse_style(&default, &mut style, "bold,fg=doesnotexist");
        assert_eq!(style, Style::default());
    }

    #[test]
    fn trailing_separator_is_an_error() {
        let default = Style::default();
        let mut style = Style::default();
        parse_style(&default, &mut style, "bold,");
        assert_eq!(style, Style::default());
    }

    #[test]
    fn no_prefix_clears_attribute() {
        let default = Style::default();
        let mut style = Style {
            attrs: Attrs::BRIGHT | Attrs::REVERSE,
            ..Style::default()
        };
        parse_style(&default, &mut style, "noreverse");
        assert_eq!(style.attrs, Attrs::BRIGHT);
    }

    #[test]
    fn fg_default_sentinel_restores_default_channel() {
        let default = Style {
            fg: 250,
            flags: StyleFlags::FG256,
            ..Style::default()
        };
        let mut style = Style {
            fg: 2,
            ..Style::default()
        };
        parse_style(&default, &mut style, "fg=default");
        assert_eq!(style.fg, 250);
        assert!(style.flags.contains(StyleFlags::FG256));
    }

    #[test]
    fn default_token_restores_everything() {
        let default = Style {
            fg: 3,
            bg: 100,
            attrs: Attrs::DIM,
            flags: StyleFlags::BG256,
        };
        let mut style = Style {
            fg: 1,
            bg: 2,
            attrs: Attrs::BRIGHT | Attrs::BLINK,
            flags: StyleFlags::FG256,
        };
        parse_style(&default, &mut style, "default");
        assert_eq!(style.fg, 3);
        assert_eq!(style.bg, 100);
        assert_eq!(style.attrs, Attrs::DIM);
        assert_eq!(style.flags, StyleFlags::BG256);
    }

    #[test]
    fn oversized_token_aborts() {
        let default = Style::default();
        let mut style = Style::default();
        let long = "x".repeat(40);
        parse_style(&default, &mut style, &format!("bold,{long}"));
        assert_eq!(style, Style::default());
    }

    #[test]
    fn case_insensitive_prefixes() {
        let default = Style::default();
        let mut style = Style::default();
        parse_style(&default, &mut style, "Fg=Cyan BG=Yellow");
        assert_eq!(style.fg, 6);
        assert_eq!(style.bg, 3);
    }

    #[test]
    fn empty_input_is_a_noop() {
        let default = Style::default();
        let mut style = Style {
            fg: 5,
            ..Style::default()
        };
        parse_style(&default, &mut style, "");
        assert_eq!(style.fg, 5);
    }
}
