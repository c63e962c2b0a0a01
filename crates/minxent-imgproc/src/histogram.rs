use minxent_image::{Image, ImageDtype, ImageError};

use crate::core;

/// Strategy to build histogram bin edges.
///
/// For an exact histogram, each discrete value should get its own bin;
/// [`BinSpec::byte_range`] does this for 8-bit samples. A plain bin count
/// over the value range aliases discretely-valued data whenever the
/// resulting bin width is not exactly 1.
#[derive(Debug, Clone, PartialEq)]
pub enum BinSpec {
    /// A fixed number of equal-width bins spanning the image value range.
    Count(usize),
    /// Equal-width bins of the given width, starting at the image minimum.
    Width(f64),
    /// Explicit, strictly increasing bin edges.
    Edges(Vec<f64>),
}

impl BinSpec {
    /// One bin per integer value over `[-0.5, 255.5]`.
    ///
    /// # Example
    ///
    /// ```
    /// use minxent_imgproc::histogram::BinSpec;
    ///
    /// let edges = match BinSpec::byte_range() {
    ///     BinSpec::Edges(edges) => edges,
    ///     _ => unreachable!(),
    /// };
    /// assert_eq!(edges.len(), 257);
    /// assert_eq!(edges[0], -0.5);
    /// assert_eq!(edges[256], 255.5);
    /// ```
    pub fn byte_range() -> Self {
        Self::Edges((0..=256).map(|i| i as f64 - 0.5).collect())
    }

    /// Resolve the strategy into a list of bin edges for the given value range.
    ///
    /// A zero-width value range is padded by half a unit on each side so that
    /// the single value still falls inside a bin.
    ///
    /// # Errors
    ///
    /// Returns an error if the strategy is not a valid binning configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use minxent_imgproc::histogram::BinSpec;
    ///
    /// let edges = BinSpec::Count(4).edges(0.0, 4.0).unwrap();
    /// assert_eq!(edges, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    /// ```
    pub fn edges(&self, min_val: f64, max_val: f64) -> Result<Vec<f64>, ImageError> {
        let (min_val, max_val) = if min_val == max_val {
            (min_val - 0.5, max_val + 0.5)
        } else {
            (min_val, max_val)
        };

        let edges = match self {
            Self::Count(num_bins) => {
                if *num_bins == 0 {
                    return Err(ImageError::InvalidHistogramBins(*num_bins));
                }
                let width = (max_val - min_val) / *num_bins as f64;
                (0..=*num_bins).map(|i| min_val + i as f64 * width).collect()
            }
            Self::Width(width) => {
                if !width.is_finite() || *width <= 0.0 {
                    return Err(ImageError::InvalidBinWidth(*width));
                }
                let num_bins = (((max_val - min_val) / width).ceil() as usize).max(1);
                (0..=num_bins).map(|i| min_val + i as f64 * width).collect()
            }
            Self::Edges(edges) => {
                if edges.len() < 2 || edges.windows(2).any(|pair| !(pair[1] > pair[0])) {
                    return Err(ImageError::InvalidHistogramEdges);
                }
                edges.clone()
            }
        };

        Ok(edges)
    }
}

impl Default for BinSpec {
    fn default() -> Self {
        Self::byte_range()
    }
}

/// Compute a density histogram of an image over the given binning strategy.
///
/// The density of each bin is its sample count divided by the total in-range
/// sample count times the bin width, so the integral over the histogram range
/// is 1. Samples outside the bin range are not counted; the last bin includes
/// its right edge.
///
/// # Arguments
///
/// * `src` - The input image to compute the histogram.
/// * `bins` - The binning strategy.
///
/// # Returns
///
/// A tuple containing the per-bin densities and the bin centers.
///
/// # Errors
///
/// Returns an error if the image is empty, the binning configuration is
/// invalid, or no sample falls within the bin range.
///
/// # Example
///
/// ```
/// use minxent_image::{Image, ImageSize};
/// use minxent_imgproc::histogram::{histogram_density, BinSpec};
///
/// let image = Image::<u8, 1>::new(
///   ImageSize {
///     width: 3,
///     height: 3,
///   },
///   vec![0, 2, 4, 128, 130, 132, 254, 255, 255],
/// ).unwrap();
///
/// let (density, centers) = histogram_density(&image, &BinSpec::default()).unwrap();
/// assert_eq!(density.len(), 256);
/// assert_eq!(centers[0], 0.0);
/// assert_eq!(density[255], 2.0 / 9.0);
/// ```
pub fn histogram_density<T, const C: usize>(
    src: &Image<T, C>,
    bins: &BinSpec,
) -> Result<(Vec<f64>, Vec<f64>), ImageError>
where
    T: ImageDtype + PartialOrd,
{
    let data = src.as_slice();
    if data.is_empty() {
        return Err(ImageError::ImageDataNotInitialized);
    }

    let (min_val, max_val) = core::find_min_max(src)?;
    let edges = bins.edges(min_val.into(), max_val.into())?;

    let num_bins = edges.len() - 1;
    let first = edges[0];
    let last = edges[num_bins];

    let mut counts = vec![0usize; num_bins];
    let mut total = 0usize;
    for &val in data {
        let val: f64 = val.into();
        if val < first || val > last {
            continue;
        }
        let idx = (edges.partition_point(|&e| e <= val) - 1).min(num_bins - 1);
        counts[idx] += 1;
        total += 1;
    }

    if total == 0 {
        return Err(ImageError::EmptyHistogram);
    }

    let centers = edges.windows(2).map(|pair| 0.5 * (pair[0] + pair[1])).collect();
    let density = counts
        .iter()
        .zip(edges.windows(2))
        .map(|(&count, pair)| count as f64 / (total as f64 * (pair[1] - pair[0])))
        .collect();

    Ok((density, centers))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use minxent_image::{Image, ImageError, ImageSize};

    use super::BinSpec;

    #[test]
    fn test_byte_range_one_bin_per_value() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new(
            ImageSize {
                width: 3,
                height: 3,
            },
            vec![0, 2, 4, 128, 130, 132, 254, 255, 255],
        )?;

        let (density, centers) = super::histogram_density(&image, &BinSpec::default())?;

        assert_eq!(density.len(), 256);
        assert_eq!(centers.len(), 256);
        assert_eq!(centers[0], 0.0);
        assert_eq!(centers[255], 255.0);

        // every sample lands in the bin centered on its own value
        for val in [0usize, 2, 4, 128, 130, 132, 254] {
            assert_relative_eq!(density[val], 1.0 / 9.0);
        }
        assert_relative_eq!(density[255], 2.0 / 9.0);
        assert_relative_eq!(density.iter().sum::<f64>(), 1.0, epsilon = 1e-12);

        Ok(())
    }

    #[test]
    fn test_count_bins() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 4,
                height: 1,
            },
            vec![0.0, 1.0, 3.0, 4.0],
        )?;

        let (density, centers) = super::histogram_density(&image, &BinSpec::Count(4))?;

        assert_eq!(centers, vec![0.5, 1.5, 2.5, 3.5]);
        // integral over the range is 1, the right edge falls into the last bin
        assert_relative_eq!(density.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(density[3], 0.5);

        Ok(())
    }

    #[test]
    fn test_width_bins() -> Result<(), ImageError> {
        let edges = BinSpec::Width(0.5).edges(0.0, 2.0)?;
        assert_eq!(edges.len(), 5);
        assert_relative_eq!(edges[4], 2.0);
        Ok(())
    }

    #[test]
    fn test_invalid_bins() {
        assert!(matches!(
            BinSpec::Count(0).edges(0.0, 1.0),
            Err(ImageError::InvalidHistogramBins(0))
        ));
        assert!(matches!(
            BinSpec::Width(0.0).edges(0.0, 1.0),
            Err(ImageError::InvalidBinWidth(_))
        ));
        assert!(matches!(
            BinSpec::Edges(vec![0.0, 0.0]).edges(0.0, 1.0),
            Err(ImageError::InvalidHistogramEdges)
        ));
        assert!(matches!(
            BinSpec::Edges(vec![1.0]).edges(0.0, 1.0),
            Err(ImageError::InvalidHistogramEdges)
        ));
    }

    #[test]
    fn test_out_of_range_samples() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 2,
                height: 1,
            },
            vec![1000.0, 2000.0],
        )?;

        // explicit byte-range edges do not cover the data
        assert!(matches!(
            super::histogram_density(&image, &BinSpec::byte_range()),
            Err(ImageError::EmptyHistogram)
        ));

        Ok(())
    }

    #[test]
    fn test_constant_image_padded_range() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 2,
                height: 2,
            },
            7.0,
        )?;

        let (density, centers) = super::histogram_density(&image, &BinSpec::Count(1))?;

        assert_eq!(centers, vec![7.0]);
        assert_relative_eq!(density[0], 1.0);

        Ok(())
    }
}
