//! paramorph - Binary morphology by parabolic structuring functions
//!
//! Dilation of binary images of any dimension by discs, spheres and
//! axis-aligned boxes, computed with separable distance transforms so that
//! the cost per pixel does not depend on the radius.
//!
//! # Example
//!
//! ```
//! use paramorph::BinaryImage;
//! use paramorph::morph::{DilateParaOptions, dilate_para};
//!
//! let mut image = BinaryImage::new(&[32, 32, 32]).unwrap();
//! image.set(&[16, 16, 16], 1).unwrap();
//!
//! let options = DilateParaOptions {
//!     radius: 5.0,
//!     ..Default::default()
//! };
//! let sphere = dilate_para(&image, &options).unwrap();
//! assert_eq!(sphere.size(), image.size());
//! assert!(sphere.get(&[21, 16, 16]).unwrap() == 1);
//! assert!(sphere.get(&[20, 20, 16]).unwrap() == 0);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use paramorph_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use paramorph_morph as morph;
