//! 1D median filtering with reflective boundary extension.

use crate::error::{ConfigError, Result};

/// Smooth a sequence with a sliding median of `width` values centered on
/// each position.
///
/// Window indices past either end reflect back into the sequence: index
/// `-k` reads position `k`, and index `len - 1 + k` reads position
/// `len - 1 - k`. The output always has the input's length. A width of 1 is
/// the identity, and sequences too short to reflect into (length at most
/// `width / 2`) pass through unchanged.
///
/// # Errors
///
/// Fails with [`ConfigError::InvalidMedianWidth`] unless `width` is a
/// positive odd integer; nothing is computed on failure.
pub fn median_filter(sequence: &[f32], width: usize) -> Result<Vec<f32>> {
    if width == 0 || width % 2 == 0 {
        return Err(ConfigError::InvalidMedianWidth { width }.into());
    }

    let len = sequence.len();
    if len <= width / 2 {
        return Ok(sequence.to_vec());
    }

    let half = (width / 2) as isize;
    let mut window = vec![0.0f32; width];
    let mut filtered = Vec::with_capacity(len);

    for center in 0..len as isize {
        for (slot, position) in window.iter_mut().zip(center - half..=center + half) {
            let mut index = position;
            if index < 0 {
                index = -index;
            }
            if index >= len as isize {
                index = 2 * (len as isize - 1) - index;
            }
            *slot = sequence[index as usize];
        }

        window.sort_unstable_by(f32::total_cmp);
        filtered.push(window[width / 2]);
    }

    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn window_of_one_is_identity() {
        let sequence = [3.0, -1.0, 7.0];

        let filtered = median_filter(&sequence, 1).unwrap();

        assert_eq!(filtered, sequence);
    }

    #[test]
    fn constant_sequence_is_unchanged() {
        let sequence = [2.5; 6];

        let filtered = median_filter(&sequence, 3).unwrap();

        assert_eq!(filtered, sequence);
    }

    #[test]
    fn boundary_reflection_matches_manual_table() {
        // Position 0 reads indices [-1, 0, 1] -> [1, 0, 1] -> [1, 5, 1]
        // Position 2 reads indices [1, 2, 3] -> [1, 2, 1] -> [1, 3, 1]
        let filtered = median_filter(&[5.0, 1.0, 3.0], 3).unwrap();

        assert_eq!(filtered, vec![1.0, 3.0, 1.0]);
    }

    #[test]
    fn smooths_isolated_spike() {
        let filtered = median_filter(&[1.0, 1.0, 9.0, 1.0, 1.0], 3).unwrap();

        assert_eq!(filtered, vec![1.0; 5]);
    }

    #[test]
    fn wider_window_spans_more_neighbors() {
        let filtered = median_filter(&[4.0, 2.0, 8.0, 6.0, 0.0, 10.0], 5).unwrap();

        assert_eq!(filtered, vec![4.0, 4.0, 4.0, 6.0, 6.0, 6.0]);
    }

    #[test]
    fn output_length_matches_input_length() {
        let sequence: Vec<f32> = (0..17).map(|v| v as f32).collect();

        for width in [1, 3, 5, 7] {
            let filtered = median_filter(&sequence, width).unwrap();
            assert_eq!(filtered.len(), sequence.len());
        }
    }

    #[test]
    fn short_sequence_passes_through() {
        let filtered = median_filter(&[8.0, -3.0], 7).unwrap();

        assert_eq!(filtered, vec![8.0, -3.0]);
    }

    #[test]
    fn empty_sequence_stays_empty() {
        let filtered = median_filter(&[], 3).unwrap();

        assert!(filtered.is_empty());
    }

    #[test]
    fn even_width_rejected() {
        let result = median_filter(&[1.0, 2.0, 3.0], 4);

        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidMedianWidth { width: 4 }))
        ));
    }

    #[test]
    fn zero_width_rejected() {
        let result = median_filter(&[1.0, 2.0, 3.0], 0);

        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidMedianWidth { width: 0 }))
        ));
    }
}
