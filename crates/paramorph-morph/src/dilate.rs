//! Binary dilation by circles, spheres and boxes using parabolic transforms
//!
//! Dilating a binary image by a disc of radius r gives the same result as
//! thresholding the distance to the foreground at r. [`BinaryDilatePara`]
//! computes that distance with a separable transform
//! ([`ScalarDistanceTransform`]) and thresholds it ([`ThresholdCast`]), so
//! the cost per pixel does not grow with the radius.
//!
//! Two structuring elements are available:
//!
//! - circular (default): discs, spheres, and ellipsoids when the radius
//!   differs between axes
//! - rectangular: axis-aligned boxes extending `radius[a]` on either side
//!   along axis `a`
//!
//! A pixel belongs to the output when its centre lies within the radius of
//! a foreground pixel's centre. This is not a Bresenham circle: a pixel
//! that only partly overlaps the disc is not included.
//!
//! The input must hold 0 for background and 1 (or any non-zero value) for
//! foreground. Other encodings are not detected.
//!
//! # Examples
//!
//! ```
//! use paramorph_core::BinaryImage;
//! use paramorph_morph::BinaryDilatePara;
//!
//! let mut image = BinaryImage::new(&[9, 9]).unwrap();
//! image.set(&[4, 4], 1).unwrap();
//!
//! let mut filter = BinaryDilatePara::new(2);
//! filter.set_radius(2.0);
//! let disc = filter.execute(&image).unwrap();
//! assert_eq!(disc.count_foreground(), 13);
//!
//! filter.set_circular(false);
//! let square = filter.execute(&image).unwrap();
//! assert_eq!(square.count_foreground(), 25);
//! ```

use std::fmt;

use crate::threshold::ThresholdCast;
use crate::transform::{AxisCombination, ScalarDistanceTransform};
use crate::{MorphError, MorphResult};
use paramorph_core::{BinaryImage, TimeStamp};
use tracing::debug;

/// Relative slack on the upper threshold, so that pixels whose centre lies
/// exactly on the radius survive rounding in the transform. A few `f64`
/// ulps: a radius any measurable amount below a lattice distance still
/// excludes that lattice point.
const BOUND_TOLERANCE: f64 = 64.0 * f64::EPSILON;

/// Interval fed to the active threshold stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdBounds {
    pub lower: f64,
    pub upper: f64,
}

/// Options for [`dilate_para`]
#[derive(Debug, Clone)]
pub struct DilateParaOptions {
    /// Radius on every axis
    pub radius: f64,
    /// Disc/sphere (`true`) or box (`false`)
    pub circular: bool,
    /// Interpret the radius in physical units
    pub use_image_spacing: bool,
}

impl Default for DilateParaOptions {
    fn default() -> Self {
        Self {
            radius: 1.0,
            circular: true,
            use_image_spacing: false,
        }
    }
}

/// Binary dilation by a disc/sphere or box of per-axis radius
///
/// Holds two complete pipelines, one per structuring element, and runs the
/// one selected by [`set_circular`](Self::set_circular). Switching leaves
/// the other pipeline, including its cached transform, untouched.
///
/// Radius components that are zero, negative or not finite disable
/// dilation along that axis; they are not errors.
///
/// The radius setters derive each stage's scale and threshold bounds.
/// Changes made afterwards through the `_mut` stage accessors are kept
/// until the radius changes again.
#[derive(Debug, Clone)]
pub struct BinaryDilatePara {
    radius: Vec<f64>,
    circular: bool,
    circ_para: ScalarDistanceTransform,
    circ_cast: ThresholdCast,
    rect_para: ScalarDistanceTransform,
    rect_cast: ThresholdCast,
    mtime: TimeStamp,
}

impl BinaryDilatePara {
    /// Create a circular dilation of radius 1 for `dimension`-dimensional
    /// images, with image spacing ignored
    pub fn new(dimension: usize) -> Self {
        let mut filter = Self {
            radius: vec![1.0; dimension],
            circular: true,
            circ_para: ScalarDistanceTransform::new(AxisCombination::Quadratic),
            circ_cast: ThresholdCast::new(),
            rect_para: ScalarDistanceTransform::new(AxisCombination::Box),
            rect_cast: ThresholdCast::new(),
            mtime: TimeStamp::now(),
        };
        filter.configure_stages();
        filter
    }

    /// Create a dilation configured from `options`
    pub fn with_options(dimension: usize, options: &DilateParaOptions) -> Self {
        let mut filter = Self::new(dimension);
        filter.set_radius(options.radius);
        filter.set_circular(options.circular);
        filter.set_use_image_spacing(options.use_image_spacing);
        filter
    }

    /// Number of axes the radius covers
    pub fn dimension(&self) -> usize {
        self.radius.len()
    }

    /// Set the same radius on every axis
    pub fn set_radius(&mut self, radius: f64) {
        let radius = vec![radius; self.radius.len()];
        self.set_radius_per_axis(&radius);
    }

    /// Set the radius per axis
    ///
    /// The number of components is the number of axes
    /// [`execute`](Self::execute) expects.
    pub fn set_radius_per_axis(&mut self, radius: &[f64]) {
        if self.radius != radius {
            self.radius = radius.to_vec();
            self.mtime.modified();
            self.configure_stages();
        }
    }

    pub fn radius(&self) -> &[f64] {
        &self.radius
    }

    /// Select a disc/sphere (`true`) or box (`false`)
    pub fn set_circular(&mut self, circular: bool) {
        if self.circular != circular {
            self.circular = circular;
            self.mtime.modified();
        }
    }

    pub fn circular(&self) -> bool {
        self.circular
    }

    pub fn circular_on(&mut self) {
        self.set_circular(true);
    }

    pub fn circular_off(&mut self) {
        self.set_circular(false);
    }

    /// Interpret the radius in physical units (`true`) or pixels (`false`)
    ///
    /// Applied to both pipelines, whichever is active.
    pub fn set_use_image_spacing(&mut self, use_image_spacing: bool) {
        self.circ_para.set_use_image_spacing(use_image_spacing);
        self.rect_para.set_use_image_spacing(use_image_spacing);
    }

    /// Spacing usage of the active pipeline's transform
    pub fn use_image_spacing(&self) -> bool {
        if self.circular {
            self.circ_para.use_image_spacing()
        } else {
            self.rect_para.use_image_spacing()
        }
    }

    /// Threshold interval of the active pipeline's cast
    pub fn threshold_bounds(&self) -> ThresholdBounds {
        let cast = if self.circular {
            &self.circ_cast
        } else {
            &self.rect_cast
        };
        let (lower, upper) = cast.bounds();
        ThresholdBounds { lower, upper }
    }

    /// Last change to this filter or any of its stages
    pub fn mtime(&self) -> TimeStamp {
        TimeStamp::latest([
            self.mtime,
            self.circ_para.mtime(),
            self.circ_cast.mtime(),
            self.rect_para.mtime(),
            self.rect_cast.mtime(),
        ])
    }

    pub fn circular_transform(&self) -> &ScalarDistanceTransform {
        &self.circ_para
    }

    pub fn circular_transform_mut(&mut self) -> &mut ScalarDistanceTransform {
        &mut self.circ_para
    }

    pub fn rectangular_transform(&self) -> &ScalarDistanceTransform {
        &self.rect_para
    }

    pub fn rectangular_transform_mut(&mut self) -> &mut ScalarDistanceTransform {
        &mut self.rect_para
    }

    pub fn circular_cast(&self) -> &ThresholdCast {
        &self.circ_cast
    }

    pub fn circular_cast_mut(&mut self) -> &mut ThresholdCast {
        &mut self.circ_cast
    }

    pub fn rectangular_cast(&self) -> &ThresholdCast {
        &self.rect_cast
    }

    pub fn rectangular_cast_mut(&mut self) -> &mut ThresholdCast {
        &mut self.rect_cast
    }

    /// Dilate `input`
    ///
    /// The output has the same size, spacing and origin as `input`.
    ///
    /// # Errors
    ///
    /// Returns `MorphError::DimensionMismatch` if the radius does not have
    /// one component per image axis.
    pub fn execute(&mut self, input: &BinaryImage) -> MorphResult<BinaryImage> {
        if input.dimension() != self.radius.len() {
            return Err(MorphError::DimensionMismatch {
                expected: self.radius.len(),
                actual: input.dimension(),
            });
        }

        debug!(
            circular = self.circular,
            radius = ?self.radius,
            use_image_spacing = self.use_image_spacing(),
            size = ?input.size(),
            "binary parabolic dilation"
        );

        if self.circular {
            let distances = self.circ_para.update(input)?;
            self.circ_cast.apply(distances)
        } else {
            let distances = self.rect_para.update(input)?;
            self.rect_cast.apply(distances)
        }
    }

    /// Push scale and bounds derived from the radius into both pipelines
    fn configure_stages(&mut self) {
        let scale = transform_scale(&self.radius);
        self.circ_para.set_scale(&scale);
        self.rect_para.set_scale(&scale);

        let circ = threshold_bounds(&self.radius, true);
        self.circ_cast.set_bounds(circ.lower, circ.upper);
        let rect = threshold_bounds(&self.radius, false);
        self.rect_cast.set_bounds(rect.lower, rect.upper);
    }
}

impl fmt::Display for BinaryDilatePara {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bounds = self.threshold_bounds();
        writeln!(f, "BinaryDilatePara")?;
        writeln!(f, "  Radius: {:?}", self.radius)?;
        writeln!(f, "  Circular: {}", self.circular)?;
        writeln!(f, "  UseImageSpacing: {}", self.use_image_spacing())?;
        writeln!(f, "  Threshold: [{}, {}]", bounds.lower, bounds.upper)?;
        write!(f, "  Modified: {}", self.mtime().value())
    }
}

/// Dilate `image` by a disc/sphere or box of the same radius on every axis
///
/// # Errors
///
/// See [`BinaryDilatePara::execute`].
pub fn dilate_para(image: &BinaryImage, options: &DilateParaOptions) -> MorphResult<BinaryImage> {
    BinaryDilatePara::with_options(image.dimension(), options).execute(image)
}

/// Largest usable radius component, 0 if there is none
fn max_radius(radius: &[f64]) -> f64 {
    radius
        .iter()
        .copied()
        .filter(|r| *r > 0.0 && r.is_finite())
        .fold(0.0, f64::max)
}

/// Per-axis transform scale: the radius relative to the largest one
///
/// With this scale an offset of `radius[a]` along axis `a` measures the
/// same as an offset of the largest radius along its own axis. Unusable
/// components map to 0, which the transform treats as "do not propagate".
fn transform_scale(radius: &[f64]) -> Vec<f64> {
    let r_max = max_radius(radius);
    radius
        .iter()
        .map(|&r| {
            if r > 0.0 && r.is_finite() && r_max > 0.0 {
                r / r_max
            } else {
                0.0
            }
        })
        .collect()
}

/// Threshold interval for the given radius and structuring element
///
/// The quadratic transform holds squared distances normalized to the
/// largest radius, the box transform plain distances; both are 0 on the
/// foreground itself.
fn threshold_bounds(radius: &[f64], circular: bool) -> ThresholdBounds {
    let r_max = max_radius(radius);
    let upper = if circular { r_max * r_max } else { r_max };
    ThresholdBounds {
        lower: 0.0,
        upper: upper * (1.0 + BOUND_TOLERANCE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn center_point(size: &[usize]) -> BinaryImage {
        let mut image = BinaryImage::new(size).unwrap();
        let center: Vec<usize> = size.iter().map(|s| s / 2).collect();
        image.set(&center, 1).unwrap();
        image
    }

    #[test]
    fn test_defaults() {
        let filter = BinaryDilatePara::new(3);
        assert_eq!(filter.radius(), &[1.0, 1.0, 1.0]);
        assert!(filter.circular());
        assert!(!filter.use_image_spacing());
        assert_eq!(filter.circular_transform().scale(), &[1.0, 1.0, 1.0]);
        assert_eq!(
            filter.circular_transform().combination(),
            AxisCombination::Quadratic
        );
        assert_eq!(
            filter.rectangular_transform().combination(),
            AxisCombination::Box
        );
    }

    #[test]
    fn test_scalar_radius_broadcast() {
        let mut filter = BinaryDilatePara::new(2);
        filter.set_radius(3.5);
        assert_eq!(filter.radius(), &[3.5, 3.5]);
    }

    #[test]
    fn test_threshold_bounds() {
        let mut filter = BinaryDilatePara::new(2);
        filter.set_radius_per_axis(&[2.0, 1.0]);

        let circ = filter.threshold_bounds();
        assert_eq!(circ.lower, 0.0);
        assert!((circ.upper - 4.0).abs() < 1e-3 && circ.upper >= 4.0);

        filter.circular_off();
        let rect = filter.threshold_bounds();
        assert_eq!(rect.lower, 0.0);
        assert!((rect.upper - 2.0).abs() < 1e-3 && rect.upper >= 2.0);

        assert_eq!(filter.circular_transform().scale(), &[1.0, 0.5]);
        assert_eq!(filter.rectangular_transform().scale(), &[1.0, 0.5]);
    }

    #[test]
    fn test_degenerate_radius_bounds() {
        assert_eq!(transform_scale(&[0.0, -1.0]), vec![0.0, 0.0]);
        assert_eq!(threshold_bounds(&[0.0, -1.0], true).upper, 0.0);
        assert_eq!(transform_scale(&[f64::NAN, 2.0]), vec![0.0, 1.0]);
    }

    #[test]
    fn test_setters_mark_modified() {
        let mut filter = BinaryDilatePara::new(2);
        let t0 = filter.mtime();

        filter.set_radius(2.0);
        let t1 = filter.mtime();
        assert!(t1 > t0);

        filter.set_circular(false);
        let t2 = filter.mtime();
        assert!(t2 > t1);

        filter.set_use_image_spacing(true);
        let t3 = filter.mtime();
        assert!(t3 > t2);

        // Unchanged values leave the stamp alone
        filter.set_radius(2.0);
        filter.set_circular(false);
        filter.set_use_image_spacing(true);
        assert_eq!(filter.mtime(), t3);
    }

    #[test]
    fn test_stage_changes_mark_modified() {
        let mut filter = BinaryDilatePara::new(2);
        let t0 = filter.mtime();
        filter.rectangular_cast_mut().set_inside_value(255);
        assert!(filter.mtime() > t0);

        let t1 = filter.mtime();
        filter.circular_transform_mut().set_use_image_spacing(true);
        assert!(filter.mtime() > t1);
    }

    #[test]
    fn test_stage_overrides_survive_execute() {
        let mut filter = BinaryDilatePara::new(2);
        filter.set_radius(2.0);
        filter.circular_cast_mut().set_bounds(0.0, 1.0);
        let before = filter.mtime();

        let out = filter.execute(&center_point(&[9, 9])).unwrap();
        assert_eq!(out.count_foreground(), 5);
        assert_eq!(filter.circular_cast().bounds(), (0.0, 1.0));
        assert_eq!(filter.threshold_bounds().upper, 1.0);
        assert_eq!(filter.mtime(), before);

        // A new radius derives the stages again
        filter.set_radius(3.0);
        assert!(filter.circular_cast().bounds().1 >= 9.0);
    }

    #[test]
    fn test_transform_override_survives_execute() {
        let mut filter = BinaryDilatePara::new(2);
        filter.set_radius(2.0);
        filter.circular_transform_mut().set_scale(&[1.0, 0.0]);
        let out = filter.execute(&center_point(&[9, 9])).unwrap();
        assert_eq!(out.count_foreground(), 5);
        assert_eq!(out.get(&[4, 3]).unwrap(), 0);
        assert_eq!(out.get(&[6, 4]).unwrap(), 1);
    }

    #[test]
    fn test_use_image_spacing_follows_active_pipeline() {
        let mut filter = BinaryDilatePara::new(2);
        filter.circular_transform_mut().set_use_image_spacing(true);
        assert!(filter.use_image_spacing());
        assert!(filter.to_string().contains("UseImageSpacing: true"));

        filter.circular_off();
        assert!(!filter.use_image_spacing());
        assert!(filter.to_string().contains("UseImageSpacing: false"));
    }

    #[test]
    fn test_bound_tolerance_is_tight() {
        // sqrt(5) = 2.2360679..., sqrt(8) = 2.8284271...
        let mut filter = BinaryDilatePara::new(2);
        filter.set_radius(2.23606);
        assert_eq!(filter.execute(&center_point(&[11, 11])).unwrap().count_foreground(), 13);
        filter.set_radius(5.0f64.sqrt());
        assert_eq!(filter.execute(&center_point(&[11, 11])).unwrap().count_foreground(), 21);
        filter.set_radius(2.82842);
        assert_eq!(filter.execute(&center_point(&[11, 11])).unwrap().count_foreground(), 21);

        let upper = threshold_bounds(&[2.0, 2.0], true).upper;
        assert!(upper >= 4.0 && upper < 4.0 + 1e-12);
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut filter = BinaryDilatePara::new(3);
        let image = center_point(&[5, 5]);
        assert!(matches!(
            filter.execute(&image),
            Err(MorphError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_inside_value_override() {
        let mut filter = BinaryDilatePara::new(2);
        filter.circular_cast_mut().set_inside_value(255);
        let out = filter.execute(&center_point(&[5, 5])).unwrap();
        assert_eq!(out.get(&[2, 2]).unwrap(), 255);
        assert_eq!(out.get(&[2, 1]).unwrap(), 255);
        assert_eq!(out.get(&[1, 1]).unwrap(), 0);
    }

    #[test]
    fn test_display() {
        let mut filter = BinaryDilatePara::new(2);
        filter.set_radius_per_axis(&[2.0, 1.0]);
        let text = filter.to_string();
        assert!(text.contains("Radius: [2.0, 1.0]"));
        assert!(text.contains("Circular: true"));
        assert!(text.contains("UseImageSpacing: false"));
    }

    #[test]
    fn test_dilate_para_function() {
        let image = center_point(&[7, 7]);
        let options = DilateParaOptions {
            radius: 1.0,
            ..Default::default()
        };
        let out = dilate_para(&image, &options).unwrap();
        assert_eq!(out.count_foreground(), 5);

        let options = DilateParaOptions {
            radius: 1.0,
            circular: false,
            ..Default::default()
        };
        let out = dilate_para(&image, &options).unwrap();
        assert_eq!(out.count_foreground(), 9);
    }
}
