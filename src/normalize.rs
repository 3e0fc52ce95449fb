//! Attention standardization across the output-time axis.

use ndarray::prelude::*;

use crate::error::{ExtractError, Result};

/// Standardize attention weights to zero mean and unit variance across the
/// output-time axis, independently per (head, input position).
///
/// The standard deviation is the population form (no sample correction).
/// The result is a freshly allocated stack of the same
/// `[heads, output_length, input_length]` shape; the input stays untouched.
///
/// # Errors
///
/// Fails with [`ExtractError::DegenerateAttention`] when a (head, input
/// position) column is constant across the output axis, which leaves the
/// standardized value undefined.
pub fn standardize(weights: ArrayView3<f32>) -> Result<Array3<f32>> {
    let output_length = weights.len_of(Axis(1));
    if output_length == 0 {
        return Ok(weights.to_owned());
    }

    let mean = weights.sum_axis(Axis(1)) / output_length as f32;
    let std = weights.std_axis(Axis(1), 0.0);

    for ((head, input_position), &deviation) in std.indexed_iter() {
        if deviation == 0.0 {
            return Err(ExtractError::DegenerateAttention {
                head,
                input_position,
            }
            .into());
        }
    }

    let standardized =
        (&weights - &mean.insert_axis(Axis(1))) / &std.insert_axis(Axis(1));

    Ok(standardized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn two_row_columns_standardize_exactly() {
        // Each column holds two values, so mean = (a + b) / 2 and the
        // population std = |a - b| / 2, putting every value at exactly -1/+1.
        let weights = ndarray::array![[[1.0, 4.0, 2.0], [3.0, 8.0, 6.0]]];

        let standardized = standardize(weights.view()).unwrap();

        assert_eq!(
            standardized,
            ndarray::array![[[-1.0, -1.0, -1.0], [1.0, 1.0, 1.0]]]
        );
    }

    #[test]
    fn uses_population_standard_deviation() {
        let weights = ndarray::array![[[0.0, 3.0], [3.0, 4.0], [6.0, 8.0]]];

        let standardized = standardize(weights.view()).unwrap();

        let expected = [
            [-1.2247449, -0.9258201],
            [0.0, -0.46291],
            [1.2247449, 1.3887301],
        ];
        for i in 0..3 {
            for j in 0..2 {
                assert!(
                    (standardized[[0, i, j]] - expected[i][j]).abs() < 1e-5,
                    "({i}, {j}): {} vs {}",
                    standardized[[0, i, j]],
                    expected[i][j]
                );
            }
        }
    }

    #[test]
    fn heads_standardize_independently() {
        let weights = ndarray::array![[[1.0], [3.0]], [[10.0], [30.0]]];

        let standardized = standardize(weights.view()).unwrap();

        assert_eq!(
            standardized,
            ndarray::array![[[-1.0], [1.0]], [[-1.0], [1.0]]]
        );
    }

    #[test]
    fn constant_column_is_degenerate() {
        let weights = ndarray::array![[[1.0, 7.0], [3.0, 7.0]]];

        let result = standardize(weights.view());

        assert!(matches!(
            result,
            Err(Error::Extract(ExtractError::DegenerateAttention {
                head: 0,
                input_position: 1,
            }))
        ));
    }

    #[test]
    fn input_is_left_untouched() {
        let weights = ndarray::array![[[1.0, 4.0], [3.0, 8.0]]];
        let snapshot = weights.clone();

        standardize(weights.view()).unwrap();

        assert_eq!(weights, snapshot);
    }

    #[test]
    fn empty_output_axis_is_identity() {
        let weights = Array3::<f32>::zeros((2, 0, 4));

        let standardized = standardize(weights.view()).unwrap();

        assert_eq!(standardized.dim(), (2, 0, 4));
    }
}
