//! Numeric summaries with defined results on empty and degenerate input.

/// The single test for "usable in a statistic": finite values only.
pub fn is_usable(x: f64) -> bool {
    x.is_finite()
}

/// Keep only usable values.
pub fn usable<I>(values: I) -> Vec<f64>
where
    I: IntoIterator<Item = f64>,
{
    values.into_iter().filter(|x| is_usable(*x)).collect()
}

/// Index-aligned pairs where both sides are usable.
pub fn usable_pairs<I>(pairs: I) -> (Vec<f64>, Vec<f64>)
where
    I: IntoIterator<Item = (f64, f64)>,
{
    pairs
        .into_iter()
        .filter(|(x, y)| is_usable(*x) && is_usable(*y))
        .unzip()
}

/// Replace a NaN summary with zero for views that must stay finite.
pub fn or_zero(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x
    }
}

/// Arithmetic mean; NaN for empty input.
pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Population standard deviation (divides by n); NaN for empty input.
pub fn stddev(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    let m = mean(xs);
    let ss: f64 = xs.iter().map(|x| (x - m) * (x - m)).sum();
    (ss / xs.len() as f64).sqrt()
}

/// Pearson correlation over the common prefix of `xs` and `ys`.
///
/// Callers pair values and drop non-finite pairs first (see
/// [`usable_pairs`]). Returns 0 when either side has zero variance,
/// including the empty case.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return 0.0;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let (mx, my) = (mean(xs), mean(ys));

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mx, y - my);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        0.0
    } else {
        cov / denom
    }
}
