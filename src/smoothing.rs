//! Centered moving average for per-category yearly series.

/// Neighbours on each side included in the window.
pub const SMOOTHING_RADIUS: usize = 2;

/// Average of every existing value within `radius` of each index.
///
/// Windows shrink at the series edges instead of padding with zeros, so the
/// first point of a length ≥ 3 series averages three values, not five.
pub fn centered_moving_average(values: &[f64], radius: usize) -> Vec<f64> {
    let n = values.len();
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(radius);
            let hi = (i + radius).min(n - 1);
            let window = &values[lo..=hi];
            window.iter().sum::<f64>() / window.len() as f64
        })
        .collect()
}

/// Smooth a series already sorted by position, keeping each point's payload.
pub fn smooth_series<T>(points: &[T], value: impl Fn(&T) -> f64) -> Vec<f64> {
    let raw: Vec<f64> = points.iter().map(value).collect();
    centered_moving_average(&raw, SMOOTHING_RADIUS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_point_is_unchanged() {
        assert_eq!(centered_moving_average(&[42.0], SMOOTHING_RADIUS), vec![42.0]);
    }

    #[test]
    fn empty_series() {
        assert!(centered_moving_average(&[], SMOOTHING_RADIUS).is_empty());
    }

    #[test]
    fn interior_point_averages_five() {
        let values = [1.0, 2.0, 3.0, 4.0, 100.0, 6.0, 7.0];
        let out = centered_moving_average(&values, SMOOTHING_RADIUS);
        assert_eq!(out[3], (2.0 + 3.0 + 4.0 + 100.0 + 6.0) / 5.0);
    }

    #[test]
    fn edges_average_fewer_neighbours() {
        let values = [10.0, 20.0, 30.0, 40.0, 50.0];
        let out = centered_moving_average(&values, SMOOTHING_RADIUS);
        assert_eq!(out[0], 20.0); // (10 + 20 + 30) / 3
        assert_eq!(out[1], 25.0); // (10 + 20 + 30 + 40) / 4
        assert_eq!(out[4], 40.0); // (30 + 40 + 50) / 3
    }

    #[test]
    fn smooth_series_reads_payload() {
        let points = [(2000, 1.0), (2001, 3.0)];
        assert_eq!(smooth_series(&points, |p| p.1), vec![2.0, 2.0]);
    }
}
