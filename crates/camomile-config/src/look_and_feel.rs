//! Editor look-and-feel.
//!
//! A [`LookAndFeel`] is plain configuration handed to the editor when it is
//! constructed. There is no process-wide default instance.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 24-bit RGB colour, written as `#rrggbb` in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red component.
    pub r: u8,
    /// Green component.
    pub g: u8,
    /// Blue component.
    pub b: u8,
}

impl Color {
    /// Build a colour from its components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Color {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.is_ascii())
            .ok_or_else(|| ConfigError::InvalidColor(s.to_string()))?;
        let component = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| ConfigError::InvalidColor(s.to_string()))
        };
        Ok(Self {
            r: component(0..2)?,
            g: component(2..4)?,
            b: component(4..6)?,
        })
    }
}

impl TryFrom<String> for Color {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Colours and grid metrics used by the patch editor.
///
/// Widgets are laid out left to right on a grid of `columns` cells, each
/// `widget_width` × `widget_height` pixels, separated by `margin`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LookAndFeel {
    /// Editor background.
    pub background: Color,
    /// Text and outline colour.
    pub foreground: Color,
    /// Value indicator colour.
    pub accent: Color,
    /// Label font size in points.
    pub font_size: f32,
    /// Width of one parameter widget in pixels.
    pub widget_width: u32,
    /// Height of one parameter widget in pixels.
    pub widget_height: u32,
    /// Number of widgets per row.
    pub columns: u32,
    /// Gap between widgets and around the grid, in pixels.
    pub margin: u32,
}

impl Default for LookAndFeel {
    fn default() -> Self {
        Self {
            background: Color::rgb(0xff, 0xff, 0xff),
            foreground: Color::rgb(0x00, 0x00, 0x00),
            accent: Color::rgb(0x41, 0x69, 0xe1),
            font_size: 12.0,
            widget_width: 120,
            widget_height: 40,
            columns: 4,
            margin: 8,
        }
    }
}

impl LookAndFeel {
    /// Check every field against its accepted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 {
            return Err(ConfigError::invalid("editor.columns", "must be at least 1"));
        }
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(ConfigError::invalid(
                "editor.font_size",
                format!("{} is not a positive size", self.font_size),
            ));
        }
        if self.widget_width == 0 || self.widget_height == 0 {
            return Err(ConfigError::invalid(
                "editor.widget_width",
                "widget dimensions must be non-zero",
            ));
        }
        Ok(())
    }

    /// Pixel bounds `(x, y, width, height)` of the widget at grid position `index`.
    pub fn cell_bounds(&self, index: usize) -> (u32, u32, u32, u32) {
        let columns = self.columns.max(1) as usize;
        let col = (index % columns) as u32;
        let row = (index / columns) as u32;
        let x = self.margin + col * (self.widget_width + self.margin);
        let y = self.margin + row * (self.widget_height + self.margin);
        (x, y, self.widget_width, self.widget_height)
    }

    /// Total editor size `(width, height)` needed for `count` widgets.
    pub fn editor_size(&self, count: usize) -> (u32, u32) {
        let columns = self.columns.max(1) as usize;
        let rows = count.div_ceil(columns).max(1) as u32;
        let used_columns = count.clamp(1, columns) as u32;
        (
            self.margin + used_columns * (self.widget_width + self.margin),
            self.margin + rows * (self.widget_height + self.margin),
        )
    }
}
