//! Tools, colors and per-object paint styles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CanvasError;

/// Alpha applied to marker strokes.
pub const MARKER_ALPHA: u8 = 100;

/// Text font size per unit of stroke width.
pub const TEXT_SIZE_PER_WIDTH: f32 = 5.0;

/// The active drawing tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// Opaque freehand stroke.
    #[default]
    Pen,
    /// Translucent, darkening freehand stroke.
    Marker,
    /// Deletes the topmost object under the pointer.
    Eraser,
    /// Text tool. Freehand input draws with text styling.
    Text,
    /// Selects, moves, scales and rotates objects.
    Select,
    /// Drags out the current shape kind.
    Shape,
}

/// Geometric shape kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Axis-aligned rectangle.
    #[default]
    Rectangle,
    /// Ellipse inscribed in the corner rectangle.
    Oval,
    /// Straight line between the corners.
    Line,
    /// Line with an arrow head at the end corner.
    Arrow,
}

/// Whether geometry is stroked or filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaintMode {
    /// Outline only.
    #[default]
    Stroke,
    /// Solid interior.
    Fill,
}

/// How an object's pixels combine with what is underneath.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Blend {
    /// Source-over.
    #[default]
    Normal,
    /// Keep the darker of source and destination.
    Darken,
}

/// An RGBA color with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    /// Opaque red.
    pub const RED: Color = Color::rgb(255, 0, 0);
    /// Opaque green.
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    /// Opaque blue.
    pub const BLUE: Color = Color::rgb(0, 0, 255);

    /// Opaque color from RGB channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color from RGBA channels.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parse `#RRGGBB` or `#AARRGGBB`.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidColor`] for anything else.
    pub fn from_hex(s: &str) -> Result<Self, CanvasError> {
        let invalid = || CanvasError::InvalidColor(s.to_string());
        let digits = s.strip_prefix('#').ok_or_else(invalid)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let value = u32::from_str_radix(digits, 16).map_err(|_| invalid())?;
        let [b3, b2, b1, b0] = value.to_be_bytes();
        match digits.len() {
            6 => Ok(Self::rgb(b2, b1, b0)),
            8 => Ok(Self::rgba(b2, b1, b0, b3)),
            _ => Err(invalid()),
        }
    }

    /// Packed `0xAARRGGBB` value.
    #[must_use]
    pub fn to_argb(self) -> u32 {
        u32::from_be_bytes([self.a, self.r, self.g, self.b])
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl FromStr for Color {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:08X}", self.to_argb())
        }
    }
}

/// Default color palette offered by pickers.
pub const DEFAULT_PALETTE: [Color; 4] = [Color::BLACK, Color::RED, Color::BLUE, Color::GREEN];

/// Paint attributes carried by every drawing object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// Base color. The alpha channel already includes any tool translucency.
    pub color: Color,
    /// Stroke width in canvas units.
    pub width: f32,
    /// Stroke or fill.
    pub mode: PaintMode,
    /// Compositing mode.
    pub blend: Blend,
    /// Font size for text, in canvas units.
    pub font_size: f32,
}

impl Style {
    /// Style a tool applies to the content it creates.
    #[must_use]
    pub fn for_tool(tool: ToolKind, color: Color, width: f32) -> Self {
        let base = Self {
            color,
            width,
            mode: PaintMode::Stroke,
            blend: Blend::Normal,
            font_size: 0.0,
        };
        match tool {
            ToolKind::Marker => Self {
                color: color.with_alpha(MARKER_ALPHA),
                blend: Blend::Darken,
                ..base
            },
            ToolKind::Text => Self {
                mode: PaintMode::Fill,
                font_size: width * TEXT_SIZE_PER_WIDTH,
                ..base
            },
            ToolKind::Pen | ToolKind::Eraser | ToolKind::Select | ToolKind::Shape => base,
        }
    }

    /// Style for a shape, stroked or filled.
    #[must_use]
    pub fn for_shape(color: Color, width: f32, filled: bool) -> Self {
        Self {
            color,
            width,
            mode: if filled { PaintMode::Fill } else { PaintMode::Stroke },
            blend: Blend::Normal,
            font_size: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Color::from_hex("#FF0000").expect("rgb"), Color::RED);
        assert_eq!(
            Color::from_hex("#80FF0000").expect("argb"),
            Color::rgba(255, 0, 0, 0x80)
        );
        assert!(Color::from_hex("FF0000").is_err());
        assert!(Color::from_hex("#FF00").is_err());
        assert!(Color::from_hex("#GG0000").is_err());
        assert!(Color::from_hex("#+F0000").is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for c in [Color::rgb(0x4F, 0x37, 0x8B), Color::rgba(1, 2, 3, 4)] {
            assert_eq!(c.to_string().parse::<Color>().expect("parse"), c);
        }
    }

    #[test]
    fn test_marker_is_translucent_darken() {
        let style = Style::for_tool(ToolKind::Marker, Color::BLUE, 12.0);
        assert_eq!(style.color.a, MARKER_ALPHA);
        assert_eq!(style.blend, Blend::Darken);
        assert_eq!(style.mode, PaintMode::Stroke);
    }

    #[test]
    fn test_text_font_size_follows_width() {
        let style = Style::for_tool(ToolKind::Text, Color::BLACK, 10.0);
        assert!((style.font_size - 50.0).abs() < f32::EPSILON);
        assert_eq!(style.mode, PaintMode::Fill);
    }

    #[test]
    fn test_shape_fill_flag() {
        assert_eq!(Style::for_shape(Color::RED, 4.0, true).mode, PaintMode::Fill);
        assert_eq!(Style::for_shape(Color::RED, 4.0, false).mode, PaintMode::Stroke);
    }
}
