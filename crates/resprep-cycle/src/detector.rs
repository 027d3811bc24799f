// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

/// Positions where the reference value decreases relative to its predecessor,
/// i.e. where the periodic schedule resets.
///
/// Side-effect free; a series without any decrease yields an empty vector and
/// the caller decides whether that means "nothing to repair" or an error.
pub fn detect_boundaries(values: &[f64]) -> Vec<usize> {
    values
        .windows(2)
        .enumerate()
        .filter_map(|(i, pair)| (pair[1] < pair[0]).then_some(i + 1))
        .collect()
}

/// Row counts between consecutive boundaries; the first cycle's length equals
/// the first boundary's position.
pub fn cycle_lengths(boundaries: &[usize]) -> Vec<usize> {
    let mut lengths = Vec::with_capacity(boundaries.len());
    let mut previous = 0usize;
    for &boundary in boundaries {
        lengths.push(boundary - previous);
        previous = boundary;
    }
    lengths
}

#[cfg(test)]
mod tests {
    use super::{cycle_lengths, detect_boundaries};

    #[test]
    fn finds_every_schedule_reset() {
        let values = [0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        assert_eq!(detect_boundaries(&values), vec![4, 7, 10]);
    }

    #[test]
    fn lengths_start_at_the_first_boundary_position() {
        assert_eq!(cycle_lengths(&[4, 7, 10]), vec![4, 3, 3]);
        assert_eq!(cycle_lengths(&[]), Vec::<usize>::new());
    }

    #[test]
    fn monotone_series_has_no_boundaries() {
        let values = [0.0, 0.0, 1.0, 1.0, 2.0, 5.0];
        assert!(detect_boundaries(&values).is_empty());
    }

    #[test]
    fn nan_never_registers_as_a_decrease() {
        let values = [1.0, f64::NAN, 0.0, 1.0, 0.0];
        // NAN comparisons are false, so only the final 1.0 -> 0.0 drop counts.
        assert_eq!(detect_boundaries(&values), vec![4]);
    }

    #[test]
    fn short_inputs_yield_nothing() {
        assert!(detect_boundaries(&[]).is_empty());
        assert!(detect_boundaries(&[3.0]).is_empty());
    }
}
