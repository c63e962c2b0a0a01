#![deny(missing_docs)]
//! Minimum cross-entropy image thresholding.
//!
//! The [`imgproc`] crate holds the algorithms; the [`image`] crate holds the
//! container types they operate on.

#[doc(inline)]
pub use minxent_image as image;

#[doc(inline)]
pub use minxent_imgproc as imgproc;
