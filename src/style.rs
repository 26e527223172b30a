//! Render style resolution: ByLayer inheritance, lineweight-to-pixel
//! conversion, and the highlight/selection overrides.

/// Straight-alpha RGBA color, components in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Lineweight in drawing units, converted to device pixels by a fixed lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineWeight {
    Hairline,
    Default,
    /// Numeric weight in hundredths of a millimeter (DXF-style).
    Value(f32),
}

impl LineWeight {
    pub fn to_pixels(self) -> f32 {
        match self {
            LineWeight::Hairline => 0.5,
            LineWeight::Default => 2.5,
            LineWeight::Value(v) => (v / 10.0).clamp(0.5, 10.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DashPattern {
    Continuous,
    Dashed,
    Dotted,
    DashDot,
    DashDotDot,
    Center,
    Hidden,
    Phantom,
    Selected,
}

impl DashPattern {
    pub const ALL: [DashPattern; 9] = [
        DashPattern::Continuous,
        DashPattern::Dashed,
        DashPattern::Dotted,
        DashPattern::DashDot,
        DashPattern::DashDotDot,
        DashPattern::Center,
        DashPattern::Hidden,
        DashPattern::Phantom,
        DashPattern::Selected,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DashPattern::Continuous => "Continuous",
            DashPattern::Dashed => "Dashed",
            DashPattern::Dotted => "Dotted",
            DashPattern::DashDot => "Dash-dot",
            DashPattern::DashDotDot => "Dash-dot-dot",
            DashPattern::Center => "Center",
            DashPattern::Hidden => "Hidden",
            DashPattern::Phantom => "Phantom",
            DashPattern::Selected => "Selected",
        }
    }
}

impl std::fmt::Display for DashPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Dash override on an object. `ByLayer` is an explicit sentinel, distinct
/// from leaving the override unset (`None` on [`ObjectStyle::dash`]); both
/// resolve to the layer pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashOverride {
    ByLayer,
    Pattern(DashPattern),
}

/// Layer defaults an object falls back to for any attribute it does not
/// override.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layer {
    pub color: Rgba,
    pub weight: LineWeight,
    pub dash: DashPattern,
}

impl Default for Layer {
    fn default() -> Self {
        Self {
            color: Rgba::WHITE,
            weight: LineWeight::Default,
            dash: DashPattern::Continuous,
        }
    }
}

/// Per-object style attributes plus interaction flags.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ObjectStyle {
    pub color: Option<Rgba>,
    pub weight: Option<LineWeight>,
    pub dash: Option<DashOverride>,
    pub selected: bool,
    pub highlighted: bool,
}

/// Fully resolved drawing state for one object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedStyle {
    pub color: Rgba,
    pub width_px: f32,
    pub dash: DashPattern,
}

/// Resolve an object's effective style against its owning layer.
///
/// Selection takes precedence over highlight; the two paths are mutually
/// exclusive. A selected object draws with the Selected pattern at a minimum
/// 2 px width; a highlighted one keeps its pattern at half alpha, also at a
/// minimum 2 px width.
pub fn resolve_style(object: &ObjectStyle, layer: &Layer) -> ResolvedStyle {
    let color = object.color.unwrap_or(layer.color);
    let width_px = object.weight.unwrap_or(layer.weight).to_pixels();
    let dash = match object.dash {
        Some(DashOverride::Pattern(pattern)) => pattern,
        Some(DashOverride::ByLayer) | None => layer.dash,
    };

    if object.selected {
        ResolvedStyle {
            color,
            width_px: width_px.max(2.0),
            dash: DashPattern::Selected,
        }
    } else if object.highlighted {
        ResolvedStyle {
            color: color.with_alpha(color.a * 0.5),
            width_px: width_px.max(2.0),
            dash,
        }
    } else {
        ResolvedStyle {
            color,
            width_px,
            dash,
        }
    }
}
