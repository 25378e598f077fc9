//! Summary statistics with the NaN conventions the report relies on.
//!
//! `mean` and `sum` skip NaN members, `median` and `total` propagate them.

/// Arithmetic mean of the non-NaN members, NaN when there are none.
pub fn mean(values: &[f64]) -> f64 {
    let (total, count) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(total, count), v| (total + v, count + 1));
    if count == 0 {
        return f64::NAN;
    }
    total / count as f64
}

/// Median, averaging the two middle values for even lengths.
/// Empty input or any NaN member yields NaN.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() || values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Sum of the non-NaN members, positive zero for empty input.
pub fn sum(values: impl IntoIterator<Item = f64>) -> f64 {
    values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold(0.0, |acc, v| acc + v)
}

/// Plain running sum from positive zero. A NaN member makes the result NaN.
pub fn total(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().fold(0.0, |acc, v| acc + v)
}

/// `part / whole`, NaN when `whole` is zero.
pub fn rate(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        f64::NAN
    } else {
        part as f64 / whole as f64
    }
}
