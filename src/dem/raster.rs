//! Row-major rasters and the 3x3 convolution engine.
//!
//! Only interior cells are computed: a `w x h` input yields a
//! `(w - 2) x (h - 2)` output. Edges are the caller's business; the
//! assembler pads tiles with their neighbors so that the interior of the
//! padded raster is exactly the tile.

use crate::error::RasterError;

/// Neighborhood offsets in NW, N, NE, W, C, E, SW, S, SE order.
const NEIGHBORHOOD: [(isize, isize); 9] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (0, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// An immutable row-major grid of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T> {
    width: usize,
    height: usize,
    samples: Vec<T>,
}

impl<T> Raster<T> {
    /// Wrap `samples` as a `width x height` raster.
    pub fn new(width: usize, height: usize, samples: Vec<T>) -> Result<Self, RasterError> {
        let expected = width * height;
        if samples.len() != expected {
            return Err(RasterError::SizeMismatch {
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Build a raster by evaluating `f(x, y)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut samples = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                samples.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            samples,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn samples(&self) -> &[T] {
        &self.samples
    }

    /// Sample at `(x, y)`, or `None` outside the raster.
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x < self.width && y < self.height {
            self.samples.get(y * self.width + x)
        } else {
            None
        }
    }

    /// Produce a same-sized raster by mapping every sample.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Raster<U> {
        Raster {
            width: self.width,
            height: self.height,
            samples: self.samples.iter().map(f).collect(),
        }
    }
}

impl<T: Copy> Raster<T> {
    /// Evaluate `f` over the 3x3 neighborhood of every interior cell.
    ///
    /// The neighborhood is passed in NW, N, NE, W, C, E, SW, S, SE order.
    pub fn apply_function<U>(
        &self,
        mut f: impl FnMut(&[T; 9]) -> U,
    ) -> Result<Raster<U>, RasterError> {
        if self.width < 3 || self.height < 3 {
            return Err(RasterError::TooSmall {
                width: self.width,
                height: self.height,
            });
        }

        let w = self.width;
        let out_w = w - 2;
        let out_h = self.height - 2;
        let mut samples = Vec::with_capacity(out_w * out_h);

        for y in 1..self.height - 1 {
            for x in 1..w - 1 {
                let neighbors = NEIGHBORHOOD.map(|(dx, dy)| {
                    let nx = x.wrapping_add_signed(dx);
                    let ny = y.wrapping_add_signed(dy);
                    self.samples[ny * w + nx]
                });
                samples.push(f(&neighbors));
            }
        }

        Ok(Raster {
            width: out_w,
            height: out_h,
            samples,
        })
    }
}

impl Raster<f64> {
    /// Convolve with a 3x3 kernel given in NW..SE order.
    ///
    /// No-data (NaN) anywhere in a neighborhood with a non-zero weight
    /// makes the output cell NaN. A NaN under a zero weight also does,
    /// since `NaN * 0.0` is NaN.
    pub fn apply_kernel(&self, weights: &[f64; 9]) -> Result<Raster<f64>, RasterError> {
        self.apply_function(|neighbors| {
            neighbors
                .iter()
                .zip(weights)
                .map(|(value, weight)| value * weight)
                .sum()
        })
    }
}
