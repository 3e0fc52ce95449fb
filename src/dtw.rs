//! Dynamic time warping between decoded tokens and audio frames.

use ndarray::prelude::*;

/// Backward move recorded for every cell during the cost fill.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Move {
    /// Consume one token and one frame
    Diagonal,
    /// Consume one token
    Up,
    /// Consume one frame
    Left,
}

/// Monotonic alignment between token positions and audio frames.
///
/// Both sequences have the same length; step `k` of the path visits token
/// row `text_indices[k]` and frame column `time_indices[k]`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AlignmentPath {
    /// Token row visited at each step, non-decreasing
    pub text_indices: Vec<usize>,
    /// Frame column visited at each step, non-decreasing
    pub time_indices: Vec<usize>,
}

impl AlignmentPath {
    /// Number of steps in the path.
    pub fn len(&self) -> usize {
        self.text_indices.len()
    }

    /// Whether the path has no steps.
    pub fn is_empty(&self) -> bool {
        self.text_indices.is_empty()
    }
}

/// Find the minimum-cost monotonic path through `matrix` from the top-left
/// to the bottom-right corner.
///
/// Rows are output tokens and columns are input frames; lower values mean
/// better alignment, so callers negate similarity scores first. Every cell
/// extends the cheapest of its diagonal, upper, and left predecessors. The
/// choice is strict: the diagonal is taken only when strictly cheaper than
/// both alternatives, the upward move only when strictly cheaper than the
/// leftward one, and remaining ties consume a frame.
///
/// An empty matrix (either dimension zero) produces an empty path. Matrix
/// values must be finite; the standardized attention weights this crate
/// feeds in always are.
pub fn dynamic_time_warping(matrix: ArrayView2<f32>) -> AlignmentPath {
    let (output_length, input_length) = matrix.dim();
    if output_length == 0 || input_length == 0 {
        return AlignmentPath::default();
    }

    let mut cost = Array2::from_elem((output_length + 1, input_length + 1), f32::INFINITY);
    let mut trace = Array2::from_elem((output_length + 1, input_length + 1), Move::Left);
    cost[[0, 0]] = 0.0;

    for j in 1..=input_length {
        for i in 1..=output_length {
            let c0 = cost[[i - 1, j - 1]];
            let c1 = cost[[i - 1, j]];
            let c2 = cost[[i, j - 1]];

            let (cheapest, step) = if c0 < c1 && c0 < c2 {
                (c0, Move::Diagonal)
            } else if c1 < c0 && c1 < c2 {
                (c1, Move::Up)
            } else {
                (c2, Move::Left)
            };

            cost[[i, j]] = matrix[[i - 1, j - 1]] + cheapest;
            trace[[i, j]] = step;
        }
    }

    // Boundary convention: the top row only consumes frames and the left
    // column only consumes tokens, whatever the fill pass recorded there.
    trace.row_mut(0).fill(Move::Left);
    trace.column_mut(0).fill(Move::Up);

    let mut text_indices = Vec::new();
    let mut time_indices = Vec::new();
    let (mut i, mut j) = (output_length, input_length);

    while i > 0 || j > 0 {
        text_indices.push(i - 1);
        time_indices.push(j - 1);

        match trace[[i, j]] {
            Move::Diagonal => {
                i -= 1;
                j -= 1;
            }
            Move::Up => i -= 1,
            Move::Left => j -= 1,
        }
    }

    text_indices.reverse();
    time_indices.reverse();

    AlignmentPath {
        text_indices,
        time_indices,
    }
}
