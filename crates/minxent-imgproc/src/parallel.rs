use rayon::prelude::*;

use minxent_image::Image;

/// Apply a function to each pixel in the image in parallel with a value.
pub fn par_iter_rows_val<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &mut Image<T2, C2>,
    f: impl Fn(&T1, &mut T2) + Send + Sync,
) where
    T1: Clone + Send + Sync,
    T2: Clone + Send + Sync,
{
    let cols = src.cols();
    src.as_slice()
        .par_chunks_exact(C1 * cols)
        .zip(dst.as_slice_mut().par_chunks_exact_mut(C2 * cols))
        .for_each(|(src_chunk, dst_chunk)| {
            src_chunk
                .iter()
                .zip(dst_chunk.iter_mut())
                .for_each(|(src_pixel, dst_pixel)| {
                    f(src_pixel, dst_pixel);
                });
        });
}

#[cfg(test)]
mod tests {
    use minxent_image::{Image, ImageError, ImageSize};

    #[test]
    fn test_par_iter_rows_val() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![1, 2, 3, 4],
        )?;

        let mut doubled = Image::<u8, 1>::from_size_val(image.size(), 0)?;

        super::par_iter_rows_val(&image, &mut doubled, |src_pixel, dst_pixel| {
            *dst_pixel = *src_pixel * 2;
        });

        assert_eq!(doubled.as_slice(), [2, 4, 6, 8]);

        Ok(())
    }
}
