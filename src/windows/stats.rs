use super::Window;

/// Descriptive statistics of the weighted FST column.
///
/// NaN windows are left out of every statistic, including `count`.
#[derive(Debug, Clone, PartialEq)]
pub struct FstSummary {
    /// Number of windows with a defined FST value.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: Option<f64>,
    /// Sample standard deviation (n − 1 denominator); needs two values.
    pub std_dev: Option<f64>,
    /// Smallest value.
    pub min: Option<f64>,
    /// First quartile.
    pub q25: Option<f64>,
    /// Median.
    pub median: Option<f64>,
    /// Third quartile.
    pub q75: Option<f64>,
    /// Largest value.
    pub max: Option<f64>,
}

impl FstSummary {
    /// Summarise the weighted FST of `windows`.
    pub fn from_windows(windows: &[Window]) -> Self {
        let mut values: Vec<f64> = windows
            .iter()
            .map(|window| window.weighted_fst)
            .filter(|value| !value.is_nan())
            .collect();
        values.sort_by(f64::total_cmp);

        let count = values.len();
        let mean = (count > 0).then(|| values.iter().sum::<f64>() / count as f64);
        let std_dev = mean.filter(|_| count > 1).map(|mean| {
            let squares: f64 = values.iter().map(|value| (value - mean).powi(2)).sum();
            (squares / (count - 1) as f64).sqrt()
        });

        Self {
            count,
            mean,
            std_dev,
            min: values.first().copied(),
            q25: quantile(&values, 0.25),
            median: quantile(&values, 0.5),
            q75: quantile(&values, 0.75),
            max: values.last().copied(),
        }
    }
}

// Linear interpolation between closest ranks; `sorted` must be ascending.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn windows(values: &[f64]) -> Vec<Window> {
        values
            .iter()
            .enumerate()
            .map(|(idx, &fst)| Window::new("1", idx as u64 * 10, idx as u64 * 10 + 9, fst))
            .collect()
    }

    #[test]
    fn summary_matches_hand_computed_values() {
        let summary = FstSummary::from_windows(&windows(&[0.4, 0.1, f64::NAN, 0.2, 0.3]));
        assert_eq!(summary.count, 4);
        assert!((summary.mean.unwrap() - 0.25).abs() < 1e-12);
        assert_eq!(summary.min, Some(0.1));
        assert_eq!(summary.max, Some(0.4));
        assert!((summary.median.unwrap() - 0.25).abs() < 1e-12);
        assert!((summary.q25.unwrap() - 0.175).abs() < 1e-12);
        assert!((summary.q75.unwrap() - 0.325).abs() < 1e-12);
        // sample variance of {0.1,0.2,0.3,0.4} is 0.05/3
        assert!((summary.std_dev.unwrap() - (0.05f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn single_value_has_no_spread() {
        let summary = FstSummary::from_windows(&windows(&[0.07]));
        assert_eq!(summary.count, 1);
        assert_eq!(summary.median, Some(0.07));
        assert_eq!(summary.std_dev, None);
    }

    #[test]
    fn all_nan_table_is_empty() {
        let summary = FstSummary::from_windows(&windows(&[f64::NAN, f64::NAN]));
        assert_eq!(summary.count, 0);
        assert_eq!(summary.mean, None);
        assert_eq!(summary.max, None);
    }
}
