use num_traits::Zero;
use std::cmp::PartialOrd;

use minxent_image::{Image, ImageDtype, ImageError};

use crate::core;
use crate::histogram::{self, BinSpec};
use crate::parallel;

/// Maximum number of fixed-point iterations before reporting non-convergence.
pub const MAX_ITERATIONS: usize = 10_000;

/// Errors that can occur during threshold estimation.
#[derive(thiserror::Error, Debug)]
pub enum ThresholdError {
    /// The input image has no elements.
    #[error("Image contains no pixel data")]
    EmptyImage,

    /// The supplied convergence tolerance is NaN or infinite.
    #[error("Tolerance must be finite, got {0}")]
    InvalidTolerance(f64),

    /// The image mean is not finite; the input contains NaN or infinite samples.
    #[error("Image mean is not finite ({0})")]
    NonFiniteMean(f64),

    /// The foreground or background population is empty, or its mean has no
    /// real logarithm.
    #[error("Degenerate foreground/background split at threshold {threshold}")]
    DegenerateSplit {
        /// The threshold at which the split degenerated.
        threshold: f64,
    },

    /// The iteration cap was reached before the tolerance criterion was met.
    #[error("No convergence after {iterations} iterations, last estimate {threshold}")]
    NonConvergence {
        /// The number of iterations performed.
        iterations: usize,
        /// The last threshold estimate.
        threshold: f64,
    },

    /// The candidate threshold lies at or above every histogram bin center.
    #[error("Threshold {0} lies above every histogram bin center")]
    ThresholdOutOfRange(f64),

    /// Error from the image container.
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Compute a threshold by Li's iterative minimum cross-entropy method.
///
/// Starting from the image mean, the estimate is refined by the closed-form
/// cross-entropy minimizer of the current foreground/background partition
/// until two consecutive estimates differ by at most `tolerance`. All pixels
/// with an intensity strictly higher than the returned value are assumed to
/// be foreground.
///
/// # Arguments
///
/// * `src` - The input image of an arbitrary number of channels and type.
/// * `tolerance` - Finish the computation when the change in the threshold in
///   an iteration is less than this value. By default, this is half of the
///   range of the input image, divided by 256.
///
/// # Returns
///
/// The estimated threshold as `f64`.
///
/// # Errors
///
/// Returns an error if the image is empty, contains non-finite samples, has a
/// zero value range, if some iteration produces an empty or log-undefined
/// partition, or if the iteration cap is reached before convergence.
///
/// # Examples
///
/// ```
/// use minxent_image::{Image, ImageSize};
/// use minxent_imgproc::threshold::threshold_li;
///
/// let data = vec![50u8, 55, 60, 200, 205, 210];
/// let image = Image::<_, 1>::new(ImageSize { width: 2, height: 3 }, data).unwrap();
///
/// let threshold = threshold_li(&image, None).unwrap();
/// assert!(threshold > 60.0 && threshold < 200.0);
/// ```
pub fn threshold_li<T, const C: usize>(
    src: &Image<T, C>,
    tolerance: Option<f64>,
) -> Result<f64, ThresholdError>
where
    T: ImageDtype + PartialOrd,
{
    let data = src.as_slice();
    if data.is_empty() {
        return Err(ThresholdError::EmptyImage);
    }

    let (min_val, max_val) = core::find_min_max(src)?;
    let (min_val, max_val): (f64, f64) = (min_val.into(), max_val.into());

    let mean = core::mean(src)?;
    if !mean.is_finite() {
        return Err(ThresholdError::NonFiniteMean(mean));
    }

    // a zero value range cannot be split into two non-empty populations
    if min_val == max_val {
        return Err(ThresholdError::DegenerateSplit { threshold: mean });
    }

    let tolerance = match tolerance {
        Some(tol) if !tol.is_finite() => return Err(ThresholdError::InvalidTolerance(tol)),
        Some(tol) => tol,
        None => 0.5 * (max_val - min_val) / 256.0,
    };

    // initial estimate; the offset guarantees at least one iteration
    let mut t_curr = mean;
    let mut t_next = t_curr + 2.0 * tolerance;

    let mut iterations = 0;
    while (t_next - t_curr).abs() > tolerance {
        iterations += 1;
        if iterations > MAX_ITERATIONS {
            return Err(ThresholdError::NonConvergence {
                iterations: MAX_ITERATIONS,
                threshold: t_next,
            });
        }

        t_curr = t_next;

        let mut sum_fore = 0.0f64;
        let mut num_fore = 0usize;
        let mut sum_back = 0.0f64;
        let mut num_back = 0usize;
        for &val in data {
            let val: f64 = val.into();
            if val > t_curr {
                sum_fore += val;
                num_fore += 1;
            } else {
                sum_back += val;
                num_back += 1;
            }
        }

        if num_fore == 0 || num_back == 0 {
            return Err(ThresholdError::DegenerateSplit { threshold: t_curr });
        }

        let mean_fore = sum_fore / num_fore as f64;
        let mean_back = sum_back / num_back as f64;

        // closed-form minimizer for the current partition; with an all-zero
        // background ln(0) = -inf and the estimate lands on exactly 0.0
        t_next = (mean_back - mean_fore) / (mean_back.ln() - mean_fore.ln());

        if t_next.is_nan() {
            return Err(ThresholdError::DegenerateSplit { threshold: t_curr });
        }

        log::debug!(
            "iteration {}: threshold {} -> {}",
            iterations,
            t_curr,
            t_next
        );
    }

    Ok(t_next)
}

/// Compute the cross-entropy between the populations above and below a threshold.
///
/// This is the objective function [`threshold_li`] minimizes, evaluated on a
/// density histogram of the image. It is mainly useful to validate a computed
/// threshold against nearby candidates.
///
/// # Arguments
///
/// * `src` - The input image of an arbitrary number of channels and type.
/// * `threshold` - The value dividing the foreground and background.
/// * `bins` - The histogram binning strategy. For an exact calculation each
///   unique value should have its own bin; the default [`BinSpec`] handles
///   8-bit samples exactly.
///
/// # Returns
///
/// The cross-entropy value as `f64`.
///
/// # Errors
///
/// Returns an error if the histogram cannot be built, if the threshold lies
/// above every bin center, or if either side of the split carries no mass or
/// has a log-undefined mean.
///
/// # Examples
///
/// ```
/// use minxent_image::{Image, ImageSize};
/// use minxent_imgproc::histogram::BinSpec;
/// use minxent_imgproc::threshold::cross_entropy;
///
/// let data = vec![50u8, 55, 60, 200, 205, 210];
/// let image = Image::<_, 1>::new(ImageSize { width: 2, height: 3 }, data).unwrap();
///
/// let nu = cross_entropy(&image, 114.0, &BinSpec::default()).unwrap();
/// assert!(nu.is_finite());
/// ```
pub fn cross_entropy<T, const C: usize>(
    src: &Image<T, C>,
    threshold: f64,
    bins: &BinSpec,
) -> Result<f64, ThresholdError>
where
    T: ImageDtype + PartialOrd,
{
    let (density, centers) = histogram::histogram_density(src, bins)?;

    // the first bin center strictly above the threshold splits the histogram
    let split = centers
        .iter()
        .position(|&center| center > threshold)
        .ok_or(ThresholdError::ThresholdOutOfRange(threshold))?;

    // zeroth and first moments on each side of the split
    let m0a: f64 = density[..split].iter().sum();
    let m0b: f64 = density[split..].iter().sum();
    let m1a: f64 = density[..split]
        .iter()
        .zip(&centers[..split])
        .map(|(d, c)| d * c)
        .sum();
    let m1b: f64 = density[split..]
        .iter()
        .zip(&centers[split..])
        .map(|(d, c)| d * c)
        .sum();

    if m0a <= 0.0 || m0b <= 0.0 {
        return Err(ThresholdError::DegenerateSplit { threshold });
    }

    // mean value on each side
    let mua = m1a / m0a;
    let mub = m1b / m0b;

    if mua <= 0.0 || mub <= 0.0 {
        return Err(ThresholdError::DegenerateSplit { threshold });
    }

    Ok(-m1a * mua.ln() - m1b * mub.ln())
}

/// Apply a binary threshold to an image.
///
/// # Arguments
///
/// * `src` - The input image of an arbitrary number of channels and type.
/// * `dst` - The output image of an arbitrary number of channels and type.
/// * `threshold` - The threshold value. Must be the same type as the image.
/// * `max_value` - The maximum value to use when the input value is greater than the threshold.
///
/// # Returns
///
/// The thresholded image with the same number of channels as the input image.
///
/// # Examples
///
/// ```
/// use minxent_image::{Image, ImageSize};
/// use minxent_imgproc::threshold::threshold_binary;
///
/// let data = vec![100u8, 200, 50, 150, 200, 250];
/// let image = Image::<_, 1>::new(ImageSize { width: 2, height: 3 }, data).unwrap();
///
/// let mut thresholded = Image::<_, 1>::from_size_val(image.size(), 0).unwrap();
///
/// threshold_binary(&image, &mut thresholded, 100, 255).unwrap();
/// assert_eq!(thresholded.as_slice(), [0, 255, 0, 255, 255, 255]);
/// ```
pub fn threshold_binary<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    threshold: T,
    max_value: T,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync + PartialOrd + Zero,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    // run the thresholding operation in parallel
    parallel::par_iter_rows_val(src, dst, |src_pixel, dst_pixel| {
        *dst_pixel = if *src_pixel > threshold {
            max_value
        } else {
            T::zero()
        };
    });

    Ok(())
}

/// Apply Li's minimum cross-entropy thresholding to an image.
///
/// Computes the threshold with [`threshold_li`] and binarizes the image at
/// the computed value rounded into the image dtype.
///
/// # Arguments
///
/// * `src` - The input image of an arbitrary number of channels and type.
/// * `dst` - The output image of an arbitrary number of channels and type.
/// * `max_value` - The maximum value to use when the input value is greater than the threshold.
/// * `tolerance` - Convergence tolerance forwarded to [`threshold_li`].
///
/// # Returns
///
/// The computed threshold.
///
/// # Examples
///
/// ```
/// use minxent_image::{Image, ImageSize};
/// use minxent_imgproc::threshold::li_threshold_binary;
///
/// let data = vec![50u8, 55, 60, 200, 205, 210];
/// let image = Image::<_, 1>::new(ImageSize { width: 2, height: 3 }, data).unwrap();
///
/// let mut thresholded = Image::<_, 1>::from_size_val(image.size(), 0).unwrap();
///
/// let threshold = li_threshold_binary(&image, &mut thresholded, 255, None).unwrap();
/// assert!(threshold > 60.0 && threshold < 200.0);
/// assert_eq!(thresholded.as_slice(), [0, 0, 0, 255, 255, 255]);
/// ```
pub fn li_threshold_binary<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    max_value: T,
    tolerance: Option<f64>,
) -> Result<f64, ThresholdError>
where
    T: ImageDtype + PartialOrd + Zero,
{
    let threshold = threshold_li(src, tolerance)?;
    threshold_binary(src, dst, T::from_f64(threshold), max_value)?;
    Ok(threshold)
}
