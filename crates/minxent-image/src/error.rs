/// An error type for the image module.
#[derive(thiserror::Error, Debug)]
pub enum ImageError {
    /// Error when channel and shape are not valid.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when two images are expected to have the same size.
    #[error("Image size ({0}, {1}) does not match the expected size ({2}, {3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when the image contains no pixel data.
    #[error("Image data is not initialized")]
    ImageDataNotInitialized,

    /// Error when a pixel coordinate is out of bounds.
    #[error("Pixel index (x: {0}, y: {1}, ch: {2}) is out of bounds")]
    PixelIndexOutOfBounds(usize, usize, usize),

    /// Error when the number of histogram bins is invalid.
    #[error("Invalid number of histogram bins ({0})")]
    InvalidHistogramBins(usize),

    /// Error when the histogram bin width is invalid.
    #[error("Invalid histogram bin width ({0})")]
    InvalidBinWidth(f64),

    /// Error when histogram bin edges are not strictly increasing.
    #[error("Histogram bin edges must be strictly increasing with at least two entries")]
    InvalidHistogramEdges,

    /// Error when no image value falls within the histogram range.
    #[error("No image value falls within the histogram range")]
    EmptyHistogram,
}
