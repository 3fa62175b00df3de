//! Threshold cast from real-valued to binary images

use crate::{MorphError, MorphResult};
use paramorph_core::{BinaryImage, RealImage, TimeStamp};

/// Converts a real-valued image to a binary one by a closed interval
///
/// A pixel becomes the inside value when `lower <= value <= upper`, and the
/// outside value otherwise. The default interval accepts every finite
/// value; the default inside and outside values are 1 and 0.
#[derive(Debug, Clone)]
pub struct ThresholdCast {
    lower: f64,
    upper: f64,
    inside: u8,
    outside: u8,
    mtime: TimeStamp,
}

impl Default for ThresholdCast {
    fn default() -> Self {
        Self::new()
    }
}

impl ThresholdCast {
    pub fn new() -> Self {
        Self {
            lower: f64::MIN,
            upper: f64::MAX,
            inside: 1,
            outside: 0,
            mtime: TimeStamp::now(),
        }
    }

    /// Current `(lower, upper)` interval
    pub fn bounds(&self) -> (f64, f64) {
        (self.lower, self.upper)
    }

    /// Set the interval
    ///
    /// Not validated here; [`apply`](Self::apply) rejects an empty interval.
    pub fn set_bounds(&mut self, lower: f64, upper: f64) {
        if self.lower != lower || self.upper != upper {
            self.lower = lower;
            self.upper = upper;
            self.mtime.modified();
        }
    }

    pub fn inside_value(&self) -> u8 {
        self.inside
    }

    pub fn set_inside_value(&mut self, value: u8) {
        if self.inside != value {
            self.inside = value;
            self.mtime.modified();
        }
    }

    pub fn outside_value(&self) -> u8 {
        self.outside
    }

    pub fn set_outside_value(&mut self, value: u8) {
        if self.outside != value {
            self.outside = value;
            self.mtime.modified();
        }
    }

    /// Last parameter change
    pub fn mtime(&self) -> TimeStamp {
        self.mtime
    }

    /// Threshold `input`; the output has the same geometry
    ///
    /// # Errors
    ///
    /// Returns `MorphError::InvalidParameters` if either bound is NaN or
    /// `lower > upper`.
    pub fn apply(&self, input: &RealImage) -> MorphResult<BinaryImage> {
        let (lower, upper) = (self.lower, self.upper);
        if lower.is_nan() || upper.is_nan() || lower > upper {
            return Err(MorphError::InvalidParameters(format!(
                "threshold bounds [{lower}, {upper}] are empty"
            )));
        }

        let (inside, outside) = (self.inside, self.outside);
        Ok(input.map(|v| {
            if v >= lower && v <= upper {
                inside
            } else {
                outside
            }
        }))
    }
}
