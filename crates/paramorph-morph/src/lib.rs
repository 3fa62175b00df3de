//! paramorph-morph - Binary morphology by parabolic transforms
//!
//! This crate provides:
//!
//! - Separable distance transforms with quadratic (parabolic) and box
//!   combination of the per-axis offsets
//! - Threshold casting of real-valued images to binary images
//! - Binary dilation by discs, spheres and boxes of arbitrary per-axis
//!   radius, built from the two stages above

pub mod dilate;
mod error;
pub mod threshold;
pub mod transform;

pub use error::{MorphError, MorphResult};

pub use dilate::{BinaryDilatePara, DilateParaOptions, ThresholdBounds, dilate_para};
pub use threshold::ThresholdCast;
pub use transform::{AxisCombination, ScalarDistanceTransform, UNREACHABLE};
