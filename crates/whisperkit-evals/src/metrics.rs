use crate::errors::{ReportError, ReportResult};
use crate::records::ExampleResult;
use serde::Serialize;

/// Quality-of-Inference certification for one optimized model
///
/// - `no_regression`: percentage of examples that did not regress
/// - `improved`: percentage of examples that improved (incidentally)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityOfInference {
    pub no_regression: f64,
    pub improved: f64,
}

/// Round to `digits` decimal places, exact halves to even
fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round_ties_even() / scale
}

/// Rounds the fraction to 3 places and only then scales it to a percentage.
fn percentage(count: usize, total: usize) -> f64 {
    round_to(count as f64 / total as f64, 3) * 100.
}

/// Compute QoI of `optimized` against `reference` for the given per-example metric.
///
/// Examples are paired by position. Lower metric values are better.
pub fn compute_quality_of_inference(
    reference: &[ExampleResult],
    optimized: &[ExampleResult],
    metric: &str,
) -> ReportResult<QualityOfInference> {
    if reference.len() != optimized.len() {
        tracing::debug!(
            "Pairing {} reference examples with {} optimized examples by position",
            reference.len(),
            optimized.len()
        );
    }

    let mut no_regression = 0;
    let mut improved = 0;
    let mut count = 0;

    for (r, o) in reference.iter().zip(optimized) {
        let (r, o) = (r.metric(metric)?, o.metric(metric)?);
        if o <= r {
            no_regression += 1;
        }
        if o < r {
            improved += 1;
        }
        count += 1;
    }

    if count == 0 {
        return Err(ReportError::EmptyResults("quality of inference"));
    }

    Ok(QualityOfInference {
        no_regression: percentage(no_regression, count),
        improved: percentage(improved, count),
    })
}

/// Corpus-level word error rate over all examples, as a percentage rounded to 2 places
pub fn compute_average_wer(results: &[ExampleResult]) -> ReportResult<f64> {
    let mut edits = 0usize;
    let mut reference_words = 0usize;

    for result in results {
        let reference: Vec<&str> = result.reference.split_whitespace().collect();
        let prediction: Vec<&str> = result.prediction.split_whitespace().collect();
        edits += word_edit_distance(&reference, &prediction);
        reference_words += reference.len();
    }

    if reference_words == 0 {
        return Err(ReportError::EmptyResults("word error rate"));
    }

    Ok(round_to(edits as f64 / reference_words as f64 * 100., 2))
}

/// Levenshtein distance between two word sequences (substitutions + deletions + insertions)
fn word_edit_distance<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev = (0..=b.len()).collect::<Vec<_>>();
    let mut curr = vec![0; b.len() + 1];

    for (i, x) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, y) in b.iter().enumerate() {
            let cost = usize::from(x != y);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
