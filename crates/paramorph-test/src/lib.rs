//! paramorph-test - Regression harness shared by the workspace crates
//!
//! Each `tests/*_reg.rs` file opens a [`RegParams`], runs numbered checks
//! against it and asserts on [`RegParams::cleanup`].
//!
//! ```ignore
//! use paramorph_test::RegParams;
//!
//! let mut rp = RegParams::new("dilatepara");
//! rp.compare_values(13.0, disc.count_foreground() as f64, 0.0);
//! assert!(rp.cleanup());
//! ```

mod params;

pub use params::RegParams;

use paramorph_core::BinaryImage;

/// Build a binary image with foreground at the listed indices
///
/// # Panics
///
/// Panics if the size is invalid or an index lies outside the grid.
pub fn binary_image_with(size: &[usize], foreground: &[&[usize]]) -> BinaryImage {
    let mut image = BinaryImage::new(size).expect("valid test image size");
    for index in foreground {
        image.set(index, 1).expect("foreground index inside the grid");
    }
    image
}

/// Indices of all foreground pixels, in buffer order
pub fn foreground_indices(image: &BinaryImage) -> Vec<Vec<usize>> {
    image
        .data()
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v != 0)
        .map(|(offset, _)| image.geometry().index(offset))
        .collect()
}
