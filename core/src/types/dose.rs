use super::color::ColorMap;
use super::geometry::{Point3, Vector3};
use super::pixel_spacing::PixelSpacing;
use std::collections::BTreeMap;

/// Attribute holding the dose unit string (e.g. "GY")
pub const DOSE_UNIT_NAME_ATTRIBUTE: &str = "DoseUnitName";

/// Attribute holding the dose grid scaling as received (decimal string)
pub const DOSE_UNIT_VALUE_ATTRIBUTE: &str = "DoseUnitValue";

/// Parsed RT dose metadata
#[derive(Debug, Clone, PartialEq)]
pub struct DoseObject {
    /// Pixel Spacing of the dose grid
    pub pixel_spacing: PixelSpacing,
    /// Dose Grid Scaling, kept as the decimal string found in the file
    pub dose_grid_scaling: String,
    /// Dose Units
    pub dose_units: String,
}

impl DoseObject {
    /// Parses the dose grid scaling factor
    ///
    /// Parsing does not depend on the process locale; surrounding blanks and
    /// NUL padding are ignored.
    pub fn grid_scaling(&self) -> Result<f64, String> {
        let trimmed = self.dose_grid_scaling.trim_matches(|c: char| c == '\0' || c.is_whitespace());
        trimmed.parse::<f64>().map_err(|e| {
            format!(
                "Failed to parse dose grid scaling '{}': {}",
                self.dose_grid_scaling, e
            )
        })
    }
}

/// Samples as stored by the volume loader, before calibration
#[derive(Debug, Clone, PartialEq)]
pub enum RawSamples {
    U8(Vec<u8>),
    U16(Vec<u16>),
    I16(Vec<i16>),
    U32(Vec<u32>),
    I32(Vec<i32>),
    F32(Vec<f32>),
}

impl RawSamples {
    pub fn len(&self) -> usize {
        match self {
            RawSamples::U8(v) => v.len(),
            RawSamples::U16(v) => v.len(),
            RawSamples::I16(v) => v.len(),
            RawSamples::U32(v) => v.len(),
            RawSamples::I32(v) => v.len(),
            RawSamples::F32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Converts the samples to double precision, multiplying by `scale`
    fn scaled(&self, scale: f64) -> Vec<f32> {
        fn apply<T: Copy + Into<f64>>(values: &[T], scale: f64) -> Vec<f32> {
            values
                .iter()
                .map(|&v| (v.into() * scale) as f32)
                .collect()
        }
        match self {
            RawSamples::U8(v) => apply(v, scale),
            RawSamples::U16(v) => apply(v, scale),
            RawSamples::I16(v) => apply(v, scale),
            RawSamples::U32(v) => apply(v, scale),
            RawSamples::I32(v) => apply(v, scale),
            RawSamples::F32(v) => apply(v, scale),
        }
    }
}

/// Volume as produced by the generic volume loader
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedVolume {
    /// Grid dimensions (columns, rows, frames)
    pub dims: [usize; 3],
    pub samples: RawSamples,
    pub spacing: Vector3,
    pub origin: Point3,
}

/// Floating point scalar grid, x varies fastest
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarGrid {
    pub dims: [usize; 3],
    pub values: Vec<f32>,
}

impl ScalarGrid {
    /// Creates a grid; fails when `values` does not match `dims`
    pub fn new(dims: [usize; 3], values: Vec<f32>) -> Result<Self, String> {
        let expected = dims[0] * dims[1] * dims[2];
        if values.len() != expected {
            return Err(format!(
                "Grid of {}x{}x{} needs {} samples, found {}",
                dims[0],
                dims[1],
                dims[2],
                expected,
                values.len()
            ));
        }
        Ok(Self { dims, values })
    }

    /// Calibrates raw loader samples into a floating point grid
    pub fn from_raw(dims: [usize; 3], samples: &RawSamples, scale: f64) -> Result<Self, String> {
        Self::new(dims, samples.scaled(scale))
    }

    #[inline]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        i + self.dims[0] * (j + self.dims[1] * k)
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> f32 {
        self.values[self.index(i, j, k)]
    }

    /// Minimum and maximum sample, `None` for an empty grid
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.values.iter().copied().filter(|v| !v.is_nan());
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Some((f64::from(min), f64::from(max)))
    }
}

/// Calibrated dose volume
///
/// Sample values are already multiplied by `dose_grid_scaling`; consumers
/// must not rescale them.
#[derive(Debug, Clone, PartialEq)]
pub struct DoseVolume {
    pub name: String,
    pub grid: ScalarGrid,
    pub spacing: Vector3,
    pub origin: Point3,
    pub dose_unit: String,
    pub dose_grid_scaling: f64,
    /// String metadata for downstream consumers
    pub attributes: BTreeMap<String, String>,
    pub color_map: ColorMap,
}

impl DoseVolume {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Whether the volume carries dose metadata
    pub fn contains_dose(&self) -> bool {
        self.attribute(DOSE_UNIT_NAME_ATTRIBUTE).is_some()
    }

    /// World position of grid index `(i, j, k)` using the given spacing
    pub fn position_with_spacing(&self, spacing: &Vector3, i: usize, j: usize, k: usize) -> Point3 {
        Point3::new(
            self.origin.x + i as f64 * spacing.x,
            self.origin.y + j as f64 * spacing.y,
            self.origin.z + k as f64 * spacing.z,
        )
    }
}
