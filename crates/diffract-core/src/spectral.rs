//! Quadrant swaps that move the zero-frequency (or zero-origin) sample
//! between the array corner and the array centre.
//!
//! [`shift`] moves index 0 of each axis to index `len / 2`; [`unshift`] is
//! its exact inverse for both even and odd lengths.

use ndarray::Array2;

/// Centre the zero-frequency component (`fftshift` over both axes).
pub fn shift<T: Clone>(data: &Array2<T>) -> Array2<T> {
    let (rows, cols) = data.dim();
    roll_by(data, rows / 2, cols / 2)
}

/// Move the centred zero-frequency component back to the corner
/// (`ifftshift` over both axes).
pub fn unshift<T: Clone>(data: &Array2<T>) -> Array2<T> {
    let (rows, cols) = data.dim();
    roll_by(data, (rows + 1) / 2, (cols + 1) / 2)
}

/// Cyclically roll both axes: element `(i, j)` lands at
/// `((i + offset_rows) % rows, (j + offset_cols) % cols)`.
fn roll_by<T: Clone>(data: &Array2<T>, offset_rows: usize, offset_cols: usize) -> Array2<T> {
    let (rows, cols) = data.dim();
    if rows == 0 || cols == 0 {
        return data.clone();
    }
    Array2::from_shape_fn((rows, cols), |(i, j)| {
        data[[(i + rows - offset_rows) % rows, (j + cols - offset_cols) % cols]].clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_shift_matches_numpy_even() {
        let a = array![[0, 1, 2, 3], [4, 5, 6, 7]];
        let shifted = shift(&a);
        assert_eq!(shifted, array![[6, 7, 4, 5], [2, 3, 0, 1]]);
    }

    #[test]
    fn test_shift_matches_numpy_odd() {
        // numpy.fft.fftshift(np.arange(5)) == [3, 4, 0, 1, 2]
        let a = array![[0, 1, 2, 3, 4]];
        assert_eq!(shift(&a), array![[3, 4, 0, 1, 2]]);
        // numpy.fft.ifftshift(np.arange(5)) == [2, 3, 4, 0, 1]
        assert_eq!(unshift(&a), array![[2, 3, 4, 0, 1]]);
    }

    #[test]
    fn test_origin_moves_to_centre() {
        let mut a = Array2::<i32>::zeros((7, 6));
        a[[0, 0]] = 1;
        let shifted = shift(&a);
        assert_eq!(shifted[[3, 3]], 1);
        assert_eq!(shifted.sum(), 1);
    }

    #[test]
    fn test_unshift_inverts_shift() {
        for &(rows, cols) in &[(4, 4), (5, 5), (4, 7), (9, 2), (1, 3)] {
            let a = Array2::from_shape_fn((rows, cols), |(i, j)| i * 100 + j);
            assert_eq!(unshift(&shift(&a)), a, "shape ({}, {})", rows, cols);
            assert_eq!(shift(&unshift(&a)), a, "shape ({}, {})", rows, cols);
        }
    }
}
