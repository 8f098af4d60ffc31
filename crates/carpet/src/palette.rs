//! Color Tokens and Palettes
//!
//! The renderer never produces escape sequences itself. It asks a
//! [`Palette`] for the bytes of a [`ColorToken`] and splices them in as-is.
//!
//! - [`AnsiPalette`]: terminal escape sequences (feature `ansi`)
//! - [`PlainPalette`]: empty tokens, output equals the source text

use crate::shade::{Shade, SHADE_COUNT};
use std::borrow::Cow;

/// Named color in the renderer's vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorToken {
    /// Executed code
    Green,
    /// Code that never ran
    Red,
    /// Back to the terminal default
    Reset,
    /// File headers and the footer
    Yellow,
    /// Header underline ("black+h")
    BrightBlack,
    /// Executed code, shaded by frequency
    Shade(Shade),
}

impl ColorToken {
    /// Conventional name of the token
    #[must_use]
    pub fn name(&self) -> Cow<'static, str> {
        match self {
            Self::Green => Cow::Borrowed("green"),
            Self::Red => Cow::Borrowed("red"),
            Self::Reset => Cow::Borrowed("reset"),
            Self::Yellow => Cow::Borrowed("yellow"),
            Self::BrightBlack => Cow::Borrowed("black+h"),
            Self::Shade(shade) => Cow::Owned(shade.color_value().to_string()),
        }
    }

    /// Whether this token ends a colored span
    #[inline]
    #[must_use]
    pub const fn is_reset(&self) -> bool {
        matches!(self, Self::Reset)
    }
}

/// Provider of the bytes for each color token
pub trait Palette {
    /// Bytes to splice into the output for `token`
    fn paint(&self, token: ColorToken) -> &[u8];
}

impl<P: Palette + ?Sized> Palette for &P {
    fn paint(&self, token: ColorToken) -> &[u8] {
        (**self).paint(token)
    }
}

/// Palette whose tokens are all empty
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainPalette;

impl Palette for PlainPalette {
    fn paint(&self, _token: ColorToken) -> &[u8] {
        &[]
    }
}

/// Terminal escape sequences rendered through crossterm
#[cfg(feature = "ansi")]
#[derive(Debug, Clone)]
pub struct AnsiPalette {
    green: Vec<u8>,
    red: Vec<u8>,
    reset: Vec<u8>,
    yellow: Vec<u8>,
    bright_black: Vec<u8>,
    shades: [Vec<u8>; SHADE_COUNT],
}

#[cfg(feature = "ansi")]
impl AnsiPalette {
    /// Build all escape sequences up front
    #[must_use]
    pub fn new() -> Self {
        use crossterm::style::{Color, ResetColor, SetForegroundColor};

        let fg = |color: Color| ansi_bytes(SetForegroundColor(color));
        Self {
            green: fg(Color::DarkGreen),
            red: fg(Color::DarkRed),
            reset: ansi_bytes(ResetColor),
            yellow: fg(Color::DarkYellow),
            bright_black: fg(Color::DarkGrey),
            shades: std::array::from_fn(|i| fg(Color::AnsiValue(Shade::new(i).color_value()))),
        }
    }
}

#[cfg(feature = "ansi")]
impl Default for AnsiPalette {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "ansi")]
impl Palette for AnsiPalette {
    fn paint(&self, token: ColorToken) -> &[u8] {
        match token {
            ColorToken::Green => &self.green,
            ColorToken::Red => &self.red,
            ColorToken::Reset => &self.reset,
            ColorToken::Yellow => &self.yellow,
            ColorToken::BrightBlack => &self.bright_black,
            ColorToken::Shade(shade) => &self.shades[shade.index()],
        }
    }
}

#[cfg(feature = "ansi")]
fn ansi_bytes(command: impl crossterm::Command) -> Vec<u8> {
    let mut sequence = String::new();
    match command.write_ansi(&mut sequence) {
        Ok(()) => sequence.into_bytes(),
        // An unwritable command degrades to an empty token
        Err(_) => Vec::new(),
    }
}
