use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Pixel spacing in millimeters (row, column)
///
/// Follows the DICOM Pixel Spacing convention: `row` is the distance between
/// adjacent rows (the y step of the grid) and `col` the distance between
/// adjacent columns (the x step).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelSpacing {
    pub row: f64,
    pub col: f64,
}

impl PixelSpacing {
    /// Creates a new PixelSpacing
    pub fn new(row: f64, col: f64) -> Self {
        Self { row, col }
    }

    /// Spacing along the grid x axis (between columns)
    pub fn x(&self) -> f64 {
        self.col
    }

    /// Spacing along the grid y axis (between rows)
    pub fn y(&self) -> f64 {
        self.row
    }

    /// Builds pixel spacing from a decoded multi-valued DS element
    pub fn from_values(values: &[f64]) -> Result<Self, String> {
        match values {
            [row, col, ..] => Ok(Self::new(*row, *col)),
            _ => Err(format!(
                "PixelSpacing needs two values, found {}",
                values.len()
            )),
        }
    }

    /// Parses pixel spacing from string
    ///
    /// Accepts formats like:
    /// - "0.1\\0.1"
    /// - "0.1 0.1"
    /// - "[0.1, 0.1]"
    /// - Exponential notation: "1.5e-4 1.5e-4"
    ///
    /// # Errors
    ///
    /// Returns an error if the string cannot be parsed
    pub fn parse(s: &str) -> Result<Self, String> {
        static REGEX: OnceLock<Regex> = OnceLock::new();
        let re = REGEX.get_or_init(|| {
            Regex::new(r"[-+]?\d*\.?\d+(?:[eE][-+]?\d+)?").expect("Failed to compile regex")
        });

        let mut numbers = re.find_iter(s).map(|m| m.as_str());
        let row_str = numbers
            .next()
            .ok_or_else(|| format!("Failed to parse PixelSpacing from '{}'", s))?;
        let col_str = numbers
            .next()
            .ok_or_else(|| format!("Failed to parse PixelSpacing from '{}'", s))?;

        let row: f64 = row_str
            .parse()
            .map_err(|e| format!("Failed to parse row value: {}", e))?;

        let col: f64 = col_str
            .parse()
            .map_err(|e| format!("Failed to parse col value: {}", e))?;

        Ok(PixelSpacing { row, col })
    }
}

impl fmt::Display for PixelSpacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {} mm", self.row, self.col)
    }
}
