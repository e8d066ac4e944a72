/// Options for importing an RT series into a scene
///
/// # Example
///
/// ```
/// use rtscene_core::ImportOptions;
///
/// let options = ImportOptions::default()
///     .auto_contour_opacity(false)
///     .with_ribbon_thickness(2.0);
///
/// assert!(!options.auto_contour_opacity);
/// assert_eq!(options.ribbon_thickness, Some(2.0));
/// assert!(options.select_dose_as_active);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct ImportOptions {
    /// Derive structure opacities from their nesting depth
    pub auto_contour_opacity: bool,

    /// Width of the structure ribbons in millimeters
    /// If None, the smallest slice spacing of the structure set is used.
    pub ribbon_thickness: Option<f64>,

    /// Make an imported dose volume the active volume when the scene supports it
    pub select_dose_as_active: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            auto_contour_opacity: true,
            ribbon_thickness: None,
            select_dose_as_active: true,
        }
    }
}

impl ImportOptions {
    /// Builder: Enable or disable automatic structure opacity
    pub fn auto_contour_opacity(mut self, enabled: bool) -> Self {
        self.auto_contour_opacity = enabled;
        self
    }

    /// Builder: Set a fixed ribbon thickness
    pub fn with_ribbon_thickness(mut self, thickness: f64) -> Self {
        self.ribbon_thickness = Some(thickness);
        self
    }

    /// Builder: Enable or disable active volume selection for dose
    pub fn select_dose_as_active(mut self, enabled: bool) -> Self {
        self.select_dose_as_active = enabled;
        self
    }
}

/// Options for the isodose surface pipeline
///
/// # Example
///
/// ```
/// use rtscene_core::IsodoseOptions;
///
/// let options = IsodoseOptions::default();
/// assert_eq!(options.target_reduction, 0.9);
/// assert_eq!(options.feature_angle_degrees, 45.0);
/// assert!(options.preserve_topology);
///
/// let exact = IsodoseOptions::default().with_target_reduction(0.0);
/// assert_eq!(exact.target_reduction, 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct IsodoseOptions {
    /// Fraction of triangles removed by decimation, in `[0, 1)`
    pub target_reduction: f64,

    /// Edges sharper than this angle keep split normals
    pub feature_angle_degrees: f64,

    /// Forbid collapses that change the surface topology
    pub preserve_topology: bool,
}

impl Default for IsodoseOptions {
    fn default() -> Self {
        Self {
            target_reduction: 0.9,
            feature_angle_degrees: 45.0,
            preserve_topology: true,
        }
    }
}

impl IsodoseOptions {
    /// Builder: Set the decimation target reduction (clamped to `[0, 1)`)
    pub fn with_target_reduction(mut self, reduction: f64) -> Self {
        self.target_reduction = reduction.clamp(0.0, 0.999);
        self
    }

    /// Builder: Set the normal feature angle
    pub fn with_feature_angle(mut self, degrees: f64) -> Self {
        self.feature_angle_degrees = degrees;
        self
    }

    /// Builder: Allow or forbid topology changes during decimation
    pub fn preserve_topology(mut self, preserve: bool) -> Self {
        self.preserve_topology = preserve;
        self
    }
}
