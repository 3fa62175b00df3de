//! paramorph core - Basic data structures for N-dimensional morphology
//!
//! This crate provides the fundamental data structures used throughout
//! the workspace:
//!
//! - [`Image`] - N-dimensional pixel grid, with the [`BinaryImage`] and
//!   [`RealImage`] instantiations
//! - [`ImageGeometry`] - size, spacing and origin of a grid
//! - [`TimeStamp`] - global modification order, used to invalidate cached
//!   results

pub mod error;
pub mod image;
pub mod mtime;

pub use error::{Error, Result};
pub use image::{BinaryImage, Image, ImageGeometry, RealImage};
pub use mtime::TimeStamp;
