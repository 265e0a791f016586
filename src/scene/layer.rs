use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::assets::color::Color;
use crate::foundation::core::{LayerId, Point};
use crate::foundation::error::PosterError;

const MIN_SCALE: f64 = 0.01;
const MIN_FONT_SIZE: f64 = 1.0;
const MIN_LINE_HEIGHT: f64 = 0.1;

/// Upright or slanted glyphs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    /// Upright.
    #[default]
    Normal,
    /// Italic or oblique.
    Italic,
}

/// Line drawn with the text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextDecoration {
    /// Plain text.
    #[default]
    None,
    /// Line under the baseline.
    Underline,
    /// Line through the middle of the x-height.
    LineThrough,
}

/// Horizontal alignment of lines inside the layer box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    /// Flush left.
    Left,
    /// Centered.
    #[default]
    Center,
    /// Flush right.
    Right,
}

/// Largest shadow blur length in pixels. Longer blurs are clamped to it.
pub const MAX_SHADOW_BLUR: f64 = 250.0;

/// Drop shadow under a layer's glyphs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shadow {
    /// Shadow color; transparent disables the shadow.
    pub color: Color,
    /// Blur length in pixels, `0..=MAX_SHADOW_BLUR`.
    pub blur: f64,
    /// Horizontal offset in pixels.
    pub offset_x: f64,
    /// Vertical offset in pixels.
    pub offset_y: f64,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            color: Color::TRANSPARENT,
            blur: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl Shadow {
    /// Return `true` when the shadow paints something.
    pub fn is_visible(&self) -> bool {
        !self.color.is_transparent()
    }
}

/// Position, rotation and scale of a layer, written as one unit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerGeometry {
    /// Center x in canvas pixels.
    pub x: f64,
    /// Center y in canvas pixels.
    pub y: f64,
    /// Rotation in degrees, clockwise, interpreted mod 360.
    pub rotation_deg: f64,
    /// Horizontal scale, > 0.
    pub scale_x: f64,
    /// Vertical scale, > 0.
    pub scale_y: f64,
}

impl LayerGeometry {
    /// Center point.
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// One positioned, styled text element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextLayer {
    /// Identity, assigned by the scene.
    pub id: LayerId,
    /// Center x in canvas pixels.
    pub x: f64,
    /// Center y in canvas pixels.
    pub y: f64,
    /// Rotation in degrees, clockwise, interpreted mod 360.
    pub rotation_deg: f64,
    /// Horizontal scale, > 0.
    pub scale_x: f64,
    /// Vertical scale, > 0.
    pub scale_y: f64,
    /// Content; may be empty and may contain newlines.
    pub text: String,
    /// Requested font family.
    pub font_family: String,
    /// Font size in pixels, > 0.
    pub font_size: f64,
    /// CSS weight, 1..=1000.
    pub font_weight: u16,
    /// Upright or italic.
    pub font_style: FontStyle,
    /// Decoration line.
    pub decoration: TextDecoration,
    /// Horizontal alignment.
    pub align: TextAlign,
    /// Glyph fill.
    pub fill: Color,
    /// Outline color.
    pub stroke_color: Color,
    /// Outline width in pixels; 0 disables the outline.
    pub stroke_width: f64,
    /// Extra advance between glyphs in pixels.
    pub letter_spacing: f64,
    /// Line height as a multiple of the font size.
    pub line_height: f64,
    /// Layer opacity, 0..=1.
    pub opacity: f64,
    /// Drop shadow.
    pub shadow: Shadow,
    /// Hidden layers stay in the scene but are not drawn.
    pub visible: bool,
}

impl Default for TextLayer {
    fn default() -> Self {
        Self {
            id: LayerId(0),
            x: 0.0,
            y: 0.0,
            rotation_deg: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            text: String::new(),
            font_family: "Inter".to_owned(),
            font_size: 32.0,
            font_weight: 400,
            font_style: FontStyle::Normal,
            decoration: TextDecoration::None,
            align: TextAlign::Center,
            fill: Color::WHITE,
            stroke_color: Color::BLACK,
            stroke_width: 0.0,
            letter_spacing: 0.0,
            line_height: 1.2,
            opacity: 1.0,
            shadow: Shadow::default(),
            visible: true,
        }
    }
}

impl TextLayer {
    /// Current geometry.
    pub fn geometry(&self) -> LayerGeometry {
        LayerGeometry {
            x: self.x,
            y: self.y,
            rotation_deg: self.rotation_deg,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
        }
    }

    /// Overwrite position, rotation and scale together.
    pub fn set_geometry(&mut self, g: LayerGeometry) {
        self.apply(&LayerPatch::from(g));
    }

    /// Merge `patch`, clamping values into their valid ranges.
    ///
    /// Non-finite numbers are ignored.
    pub fn apply(&mut self, patch: &LayerPatch) {
        fn finite(v: Option<f64>) -> Option<f64> {
            v.filter(|v| v.is_finite())
        }

        if let Some(v) = finite(patch.x) {
            self.x = v;
        }
        if let Some(v) = finite(patch.y) {
            self.y = v;
        }
        if let Some(v) = finite(patch.rotation_deg) {
            self.rotation_deg = v;
        }
        if let Some(v) = finite(patch.scale_x) {
            self.scale_x = v.max(MIN_SCALE);
        }
        if let Some(v) = finite(patch.scale_y) {
            self.scale_y = v.max(MIN_SCALE);
        }
        if let Some(v) = &patch.text {
            self.text.clone_from(v);
        }
        if let Some(v) = &patch.font_family {
            self.font_family.clone_from(v);
        }
        if let Some(v) = finite(patch.font_size) {
            self.font_size = v.max(MIN_FONT_SIZE);
        }
        if let Some(v) = patch.font_weight {
            self.font_weight = v.clamp(1, 1000);
        }
        if let Some(v) = patch.font_style {
            self.font_style = v;
        }
        if let Some(v) = patch.decoration {
            self.decoration = v;
        }
        if let Some(v) = patch.align {
            self.align = v;
        }
        if let Some(v) = patch.fill {
            self.fill = v;
        }
        if let Some(v) = patch.stroke_color {
            self.stroke_color = v;
        }
        if let Some(v) = finite(patch.stroke_width) {
            self.stroke_width = v.max(0.0);
        }
        if let Some(v) = finite(patch.letter_spacing) {
            self.letter_spacing = v;
        }
        if let Some(v) = finite(patch.line_height) {
            self.line_height = v.max(MIN_LINE_HEIGHT);
        }
        if let Some(v) = finite(patch.opacity) {
            self.opacity = v.clamp(0.0, 1.0);
        }
        if let Some(s) = patch.shadow {
            let prev = self.shadow;
            self.shadow = Shadow {
                color: s.color,
                blur: finite(Some(s.blur)).map_or(prev.blur, |b| b.clamp(0.0, MAX_SHADOW_BLUR)),
                offset_x: finite(Some(s.offset_x)).unwrap_or(prev.offset_x),
                offset_y: finite(Some(s.offset_y)).unwrap_or(prev.offset_y),
            };
        }
        if let Some(v) = patch.visible {
            self.visible = v;
        }
    }

    /// Clamp every field into its valid range. Used on layers loaded from documents.
    pub fn sanitize(&mut self) {
        fn or(v: f64, fallback: f64) -> f64 {
            if v.is_finite() { v } else { fallback }
        }

        self.x = or(self.x, 0.0);
        self.y = or(self.y, 0.0);
        self.rotation_deg = or(self.rotation_deg, 0.0);
        self.scale_x = or(self.scale_x, 1.0).max(MIN_SCALE);
        self.scale_y = or(self.scale_y, 1.0).max(MIN_SCALE);
        self.font_size = or(self.font_size, 32.0).max(MIN_FONT_SIZE);
        self.font_weight = self.font_weight.clamp(1, 1000);
        self.stroke_width = or(self.stroke_width, 0.0).max(0.0);
        self.letter_spacing = or(self.letter_spacing, 0.0);
        self.line_height = or(self.line_height, 1.2).max(MIN_LINE_HEIGHT);
        self.opacity = or(self.opacity, 1.0).clamp(0.0, 1.0);
        self.shadow.blur = or(self.shadow.blur, 0.0).clamp(0.0, MAX_SHADOW_BLUR);
        self.shadow.offset_x = or(self.shadow.offset_x, 0.0);
        self.shadow.offset_y = or(self.shadow.offset_y, 0.0);
    }
}

/// Partial layer update; `None` leaves a field untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerPatch {
    /// New center x.
    pub x: Option<f64>,
    /// New center y.
    pub y: Option<f64>,
    /// New rotation in degrees.
    pub rotation_deg: Option<f64>,
    /// New horizontal scale.
    pub scale_x: Option<f64>,
    /// New vertical scale.
    pub scale_y: Option<f64>,
    /// New content.
    pub text: Option<String>,
    /// New font family.
    pub font_family: Option<String>,
    /// New font size.
    pub font_size: Option<f64>,
    /// New weight.
    pub font_weight: Option<u16>,
    /// New style.
    pub font_style: Option<FontStyle>,
    /// New decoration.
    pub decoration: Option<TextDecoration>,
    /// New alignment.
    pub align: Option<TextAlign>,
    /// New fill.
    pub fill: Option<Color>,
    /// New outline color.
    pub stroke_color: Option<Color>,
    /// New outline width.
    pub stroke_width: Option<f64>,
    /// New letter spacing.
    pub letter_spacing: Option<f64>,
    /// New line height multiplier.
    pub line_height: Option<f64>,
    /// New opacity.
    pub opacity: Option<f64>,
    /// New shadow.
    pub shadow: Option<Shadow>,
    /// New visibility.
    pub visible: Option<bool>,
}

impl From<LayerGeometry> for LayerPatch {
    fn from(g: LayerGeometry) -> Self {
        Self {
            x: Some(g.x),
            y: Some(g.y),
            rotation_deg: Some(g.rotation_deg),
            scale_x: Some(g.scale_x),
            scale_y: Some(g.scale_y),
            ..Self::default()
        }
    }
}

/// Content presets for new layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerPreset {
    /// Large bold headline.
    Headline,
    /// Secondary line.
    Subheading,
    /// Body copy.
    Body,
    /// Call to action, seeded from campaign metadata.
    CallToAction,
}

impl LayerPreset {
    /// Placeholder content when the campaign supplies nothing.
    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Headline => "Your Headline Here",
            Self::Subheading => "Add a subheading",
            Self::Body => "Add some body text",
            Self::CallToAction => "Shop Now",
        }
    }

    /// Font size in pixels.
    pub fn font_size(self) -> f64 {
        match self {
            Self::Headline => 72.0,
            Self::Subheading => 48.0,
            Self::Body => 32.0,
            Self::CallToAction => 40.0,
        }
    }

    /// CSS weight.
    pub fn font_weight(self) -> u16 {
        match self {
            Self::Headline | Self::CallToAction => 700,
            Self::Subheading => 600,
            Self::Body => 400,
        }
    }
}

impl FromStr for LayerPreset {
    type Err = PosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "headline" => Ok(Self::Headline),
            "subheading" => Ok(Self::Subheading),
            "body" => Ok(Self::Body),
            "call_to_action" | "cta" => Ok(Self::CallToAction),
            other => Err(PosterError::validation(format!(
                "unknown layer preset '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/layer.rs"]
mod tests;
