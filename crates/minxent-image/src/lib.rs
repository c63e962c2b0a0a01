#![deny(missing_docs)]
//! Image container types for the minxent thresholding crates

/// image representation for thresholding purposes.
pub mod image;

/// Error types for the image module.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageDtype, ImageSize};
