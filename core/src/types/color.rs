use super::geometry::Color;

/// Capability of mapping a scalar value to a color and an opacity
pub trait ColorLookup {
    /// RGB color for `value` (alpha is ignored by callers)
    fn color(&self, value: f64) -> Color;

    /// Opacity for `value`
    fn opacity(&self, value: f64) -> f64;
}

/// Named color entry of a [`ColorTable`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ColorEntry {
    pub name: String,
    pub color: Color,
}

/// Indexed table of named colors
///
/// As a [`ColorLookup`], values are mapped linearly from `range` onto the
/// entries and clamped at both ends.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ColorTable {
    pub name: String,
    pub entries: Vec<ColorEntry>,
    pub range: (f64, f64),
}

impl ColorTable {
    /// Creates an empty table
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            range: (0.0, 1.0),
        }
    }

    /// Appends a named color
    pub fn add_color(&mut self, name: impl Into<String>, color: Color) {
        self.entries.push(ColorEntry {
            name: name.into(),
            color,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, index: usize) -> Option<&ColorEntry> {
        self.entries.get(index)
    }

    /// Index of the entry a value maps to, `None` for an empty table
    pub fn index_for(&self, value: f64) -> Option<usize> {
        let n = self.entries.len();
        if n == 0 {
            return None;
        }
        let (min, max) = self.range;
        if max <= min || value.is_nan() {
            return Some(0);
        }
        let scaled = ((value - min) * (n as f64 / (max - min))).floor();
        Some(scaled.clamp(0.0, (n - 1) as f64) as usize)
    }
}

impl ColorLookup for ColorTable {
    fn color(&self, value: f64) -> Color {
        self.index_for(value)
            .and_then(|i| self.entry(i))
            .map(|e| e.color.with_alpha(1.0))
            .unwrap_or(Color::WHITE)
    }

    fn opacity(&self, value: f64) -> f64 {
        self.index_for(value)
            .and_then(|i| self.entry(i))
            .map(|e| e.color.a)
            .unwrap_or(1.0)
    }
}

/// Procedural color mapping attached to a scalar volume
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub enum ColorMap {
    /// Hue ramp from blue at `min` to red at `max`
    Rainbow { min: f64, max: f64 },
}

impl ColorMap {
    /// Rainbow mapping over the given value range
    pub fn rainbow(range: (f64, f64)) -> Self {
        ColorMap::Rainbow {
            min: range.0,
            max: range.1,
        }
    }

    pub fn simple_name(&self) -> &'static str {
        match self {
            ColorMap::Rainbow { .. } => "rainbow",
        }
    }
}

impl ColorLookup for ColorMap {
    fn color(&self, value: f64) -> Color {
        match *self {
            ColorMap::Rainbow { min, max } => {
                let t = if max > min {
                    ((value - min) / (max - min)).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                hsv_to_rgb((1.0 - t) * 2.0 / 3.0, 1.0, 1.0)
            }
        }
    }

    fn opacity(&self, _value: f64) -> f64 {
        1.0
    }
}

/// Converts HSV (all components in `[0, 1]`) to an opaque RGB color
fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Color {
    let h6 = (h.rem_euclid(1.0)) * 6.0;
    let sector = h6.floor();
    let f = h6 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match sector as u8 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    Color::rgb(r, g, b)
}
