//! Separable scalar distance transforms
//!
//! Computes, for every pixel of a binary image, a monotone function of the
//! offset to the nearest foreground pixel. The transform runs one 1D pass
//! per axis; each pass only looks along lines of that axis, so the cost per
//! pixel grows with the number of axes, not with the size of the
//! neighbourhood.
//!
//! Two ways of combining the per-axis offsets `d_a` are supported, each
//! normalized by a per-axis scale `s_a`:
//!
//! - [`AxisCombination::Quadratic`]: `sum_a (d_a / s_a)^2`, the lower
//!   envelope of parabolas (Felzenszwalb & Huttenlocher, "Distance
//!   Transforms of Sampled Functions", 2012). Thresholding it gives discs,
//!   spheres and ellipsoids.
//! - [`AxisCombination::Box`]: `max_a |d_a| / s_a`, the limit of the
//!   parabolic structuring function as it flattens into a segment on each
//!   axis. Thresholding it gives axis-aligned boxes.
//!
//! Offsets are in index units, or in physical units when image spacing is
//! used. Foreground pixels get 0. Pixels no foreground pixel can reach get
//! [`UNREACHABLE`], and no result is ever larger.

use crate::{MorphError, MorphResult};
use paramorph_core::{BinaryImage, Image, RealImage, TimeStamp};
use tracing::{debug, trace};

/// Value of pixels that no foreground pixel reaches
///
/// A quarter of `f64::MAX`, so a pass can add its largest increment to it
/// without overflowing.
pub const UNREACHABLE: f64 = f64::MAX / 4.0;

const FAR: f64 = UNREACHABLE;

/// How per-axis offsets are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisCombination {
    /// Sum of squared normalized offsets (circles, spheres)
    Quadratic,
    /// Largest normalized offset (boxes)
    Box,
}

#[derive(Debug, Clone)]
struct CachedOutput {
    input_mtime: TimeStamp,
    params_mtime: TimeStamp,
    output: RealImage,
}

/// Separable distance transform of a binary image
///
/// [`update`](Self::update) keeps the last result and returns it again as
/// long as neither the input image nor the transform's parameters have been
/// modified since.
#[derive(Debug, Clone)]
pub struct ScalarDistanceTransform {
    combination: AxisCombination,
    scale: Vec<f64>,
    use_image_spacing: bool,
    mtime: TimeStamp,
    cache: Option<CachedOutput>,
}

impl ScalarDistanceTransform {
    /// Create a transform with no scale set and image spacing ignored
    pub fn new(combination: AxisCombination) -> Self {
        Self {
            combination,
            scale: Vec::new(),
            use_image_spacing: false,
            mtime: TimeStamp::now(),
            cache: None,
        }
    }

    /// How per-axis offsets are combined
    pub fn combination(&self) -> AxisCombination {
        self.combination
    }

    /// Per-axis scale
    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    /// Set the per-axis scale
    ///
    /// An offset of `s_a` along axis `a` contributes 1 to the result. Axes
    /// whose scale is not a positive finite number are degenerate: values
    /// are not propagated along them at all. The same holds for an axis
    /// whose scale is so small that one line's worth of offsets overflows
    /// `f64`; every step along it would cost more than [`UNREACHABLE`].
    pub fn set_scale(&mut self, scale: &[f64]) {
        if self.scale != scale {
            self.scale = scale.to_vec();
            self.mtime.modified();
        }
    }

    /// Whether offsets are measured in physical units
    pub fn use_image_spacing(&self) -> bool {
        self.use_image_spacing
    }

    /// Measure offsets in physical units (`true`) or index units (`false`)
    pub fn set_use_image_spacing(&mut self, use_image_spacing: bool) {
        if self.use_image_spacing != use_image_spacing {
            self.use_image_spacing = use_image_spacing;
            self.mtime.modified();
        }
    }

    /// Last parameter change
    pub fn mtime(&self) -> TimeStamp {
        self.mtime
    }

    /// Whether [`update`](Self::update) would reuse its last result for `input`
    pub fn has_cached_output_for(&self, input: &BinaryImage) -> bool {
        self.cache.as_ref().is_some_and(|cached| {
            cached.input_mtime == input.mtime() && cached.params_mtime == self.mtime
        })
    }

    /// Transform `input`, reusing the previous result when it is still valid
    pub fn update(&mut self, input: &BinaryImage) -> MorphResult<&RealImage> {
        let cached = match self.cache.take() {
            Some(cached)
                if cached.input_mtime == input.mtime() && cached.params_mtime == self.mtime =>
            {
                debug!(combination = ?self.combination, "distance transform: cached");
                cached
            }
            _ => CachedOutput {
                input_mtime: input.mtime(),
                params_mtime: self.mtime,
                output: self.compute(input)?,
            },
        };
        Ok(&self.cache.insert(cached).output)
    }

    /// Transform `input`
    ///
    /// # Errors
    ///
    /// Returns `MorphError::DimensionMismatch` if the scale does not have
    /// one component per image axis.
    pub fn compute(&self, input: &BinaryImage) -> MorphResult<RealImage> {
        if self.scale.len() != input.dimension() {
            return Err(MorphError::DimensionMismatch {
                expected: self.scale.len(),
                actual: input.dimension(),
            });
        }

        debug!(
            combination = ?self.combination,
            size = ?input.size(),
            scale = ?self.scale,
            use_image_spacing = self.use_image_spacing,
            "distance transform"
        );

        let geometry = input.geometry();
        let mut values: Vec<f64> = input
            .data()
            .iter()
            .map(|&v| if v != 0 { 0.0 } else { FAR })
            .collect();

        let max_len = geometry.size().iter().copied().max().unwrap_or(0);
        let mut envelope = Envelope::new(max_len);
        let mut line = vec![0.0f64; max_len];
        let mut out = vec![0.0f64; max_len];

        for axis in 0..geometry.dimension() {
            let s = self.scale[axis];
            let len = geometry.size()[axis];
            if !(s > 0.0 && s.is_finite()) {
                trace!(axis, scale = s, "degenerate axis skipped");
                continue;
            }
            if len < 2 {
                continue;
            }

            let step = if self.use_image_spacing {
                geometry.spacing()[axis]
            } else {
                1.0
            };
            // Contribution of one index step along this axis
            let unit = step / s;
            let span = (len - 1) as f64;
            let largest = match self.combination {
                AxisCombination::Quadratic => 2.0 * unit * unit * span * span,
                AxisCombination::Box => unit * span,
            };
            if !largest.is_finite() {
                trace!(axis, unit, "step overflows, axis skipped");
                continue;
            }
            let stride = geometry.strides()[axis];
            trace!(axis, unit, "transform pass");

            for start in geometry.line_starts(axis) {
                let mut reached = false;
                for (i, slot) in line[..len].iter_mut().enumerate() {
                    *slot = values[start + i * stride];
                    reached |= *slot < FAR;
                }
                if !reached {
                    continue;
                }

                match self.combination {
                    AxisCombination::Quadratic => {
                        envelope.parabolic(&line[..len], unit * unit, &mut out[..len])
                    }
                    AxisCombination::Box => envelope.boxed(&line[..len], unit, &mut out[..len]),
                }

                for (i, &v) in out[..len].iter().enumerate() {
                    values[start + i * stride] = v.min(FAR);
                }
            }
        }

        let mut output = Image::with_geometry(geometry, 0.0);
        output.data_mut().copy_from_slice(&values);
        Ok(output)
    }
}

/// Scratch buffers for the 1D passes
struct Envelope {
    /// Parabola vertices, or candidate positions for the box pass
    v: Vec<usize>,
    /// Boundaries between parabolas
    z: Vec<f64>,
}

impl Envelope {
    fn new(max_len: usize) -> Self {
        Self {
            v: Vec::with_capacity(max_len),
            z: Vec::with_capacity(max_len + 1),
        }
    }

    /// `d[q] = min_p f[p] + weight * (q - p)^2`
    fn parabolic(&mut self, f: &[f64], weight: f64, d: &mut [f64]) {
        let n = f.len();
        if weight == 0.0 {
            // Steps too small to register: every position sees the line minimum
            let min = f.iter().copied().fold(FAR, f64::min);
            d.fill(min);
            return;
        }
        let v = &mut self.v;
        let z = &mut self.z;
        v.clear();
        v.resize(n, 0);
        z.clear();
        z.resize(n + 1, 0.0);

        let sq = |x: usize| (x * x) as f64;
        let intersection = |p: usize, q: usize| {
            ((f[q] + weight * sq(q)) - (f[p] + weight * sq(p))) / (2.0 * weight * (q - p) as f64)
        };

        let mut k = 0usize;
        v[0] = 0;
        z[0] = f64::NEG_INFINITY;
        z[1] = f64::INFINITY;

        for q in 1..n {
            // z[0] is -inf and s is finite, so k never goes below 0
            let mut s = intersection(v[k], q);
            while s <= z[k] {
                k -= 1;
                s = intersection(v[k], q);
            }
            k += 1;
            v[k] = q;
            z[k] = s;
            z[k + 1] = f64::INFINITY;
        }

        k = 0;
        for (q, dq) in d.iter_mut().enumerate() {
            while z[k + 1] < q as f64 {
                k += 1;
            }
            let p = v[k];
            *dq = weight * sq(q.abs_diff(p)) + f[p];
        }
    }

    /// `d[q] = min_p max(f[p], unit * |q - p|)`
    ///
    /// One sweep in each direction. During a sweep the candidate stack
    /// holds positions with strictly increasing values and decreasing
    /// distance to the current position, so the best candidate sits where
    /// the two cross and is found by binary search.
    fn boxed(&mut self, f: &[f64], unit: f64, d: &mut [f64]) {
        let n = f.len();
        let stack = &mut self.v;

        stack.clear();
        for q in 0..n {
            push_candidate(stack, f, q);
            d[q] = best_candidate(stack, f, unit, q);
        }

        stack.clear();
        for q in (0..n).rev() {
            push_candidate(stack, f, q);
            d[q] = d[q].min(best_candidate(stack, f, unit, q));
        }
    }
}

fn push_candidate(stack: &mut Vec<usize>, f: &[f64], q: usize) {
    while stack.last().is_some_and(|&top| f[top] >= f[q]) {
        stack.pop();
    }
    stack.push(q);
}

fn best_candidate(stack: &[usize], f: &[f64], unit: f64, q: usize) -> f64 {
    let reach = |p: usize| unit * q.abs_diff(p) as f64;
    let i = stack.partition_point(|&p| f[p] < reach(p));
    let mut best = f64::INFINITY;
    if i < stack.len() {
        best = f[stack[i]];
    }
    if i > 0 {
        best = best.min(reach(stack[i - 1]));
    }
    best
}
