use minxent_image::{Image, ImageDtype, ImageError};

/// Compute the mean of all samples in an image.
///
/// The mean is accumulated in `f64` over every channel of every pixel
/// in one pass.
///
/// # Arguments
///
/// * `image` - The input image to compute the mean.
///
/// # Returns
///
/// The mean of all samples as `f64`.
///
/// # Errors
///
/// Returns an error if the image contains no data.
///
/// # Example
///
/// ```
/// use minxent_image::{Image, ImageSize};
/// use minxent_imgproc::core::mean;
///
/// let image = Image::<u8, 1>::new(
///    ImageSize {
///      width: 2,
///      height: 2,
///  },
/// vec![0, 1, 2, 3],
/// ).unwrap();
///
/// assert_eq!(mean(&image).unwrap(), 1.5);
/// ```
pub fn mean<T, const C: usize>(image: &Image<T, C>) -> Result<f64, ImageError>
where
    T: ImageDtype,
{
    let data = image.as_slice();
    if data.is_empty() {
        return Err(ImageError::ImageDataNotInitialized);
    }

    let sum = data.iter().fold(0.0f64, |acc, &val| acc + val.into());

    Ok(sum / data.len() as f64)
}

/// Find the minimum and maximum values in an image.
///
/// # Arguments
///
/// * `image` - The input image of shape (height, width, channels).
///
/// # Returns
///
/// A tuple containing the minimum and maximum values in the image.
///
/// # Errors
///
/// If the image data is not initialized, an error is returned.
///
/// # Example
///
/// ```
/// use minxent_image::{Image, ImageSize};
/// use minxent_imgproc::core::find_min_max;
///
/// let image_data = vec![0u8, 1, 0, 1, 2, 3, 0, 1, 0, 1, 2, 3];
/// let image = Image::<u8, 3>::new(
///   ImageSize {
///     width: 2,
///     height: 2,
///   },
///   image_data,
/// )
/// .unwrap();
///
/// let (min, max) = find_min_max(&image).unwrap();
/// assert_eq!(min, 0);
/// assert_eq!(max, 3);
/// ```
pub fn find_min_max<T, const C: usize>(image: &Image<T, C>) -> Result<(T, T), ImageError>
where
    T: Copy + PartialOrd,
{
    // get the first element in the image
    let first_element = match image.as_slice().iter().next() {
        Some(x) => x,
        None => return Err(ImageError::ImageDataNotInitialized),
    };

    let mut min = first_element;
    let mut max = first_element;

    for x in image.as_slice().iter() {
        if x < min {
            min = x;
        }
        if x > max {
            max = x;
        }
    }

    Ok((*min, *max))
}
