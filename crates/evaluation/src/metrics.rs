//! Ranking quality metrics.
//!
//! All functions take a relevance vector (`y_true`, nonzero = relevant) and
//! a parallel score vector (`y_score`) indexed by dense destination index.
//! Ties in scores rank by index ascending so every metric is deterministic.

/// Indices of `scores` sorted by value descending, ties by index ascending.
fn argsort_descending(scores: &[f32]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then_with(|| a.cmp(&b)));
    indices
}

/// Fraction of the top-k predictions that are relevant.
pub fn precision_at_k(y_true: &[f32], y_score: &[f32], k: usize) -> f32 {
    if y_true.is_empty() || k == 0 {
        return 0.0;
    }
    let hits = argsort_descending(y_score)
        .into_iter()
        .take(k)
        .filter(|&i| y_true[i] > 0.0)
        .count();
    hits as f32 / k as f32
}

/// Fraction of all relevant items that appear in the top-k predictions.
pub fn recall_at_k(y_true: &[f32], y_score: &[f32], k: usize) -> f32 {
    let total_relevant = y_true.iter().filter(|&&v| v > 0.0).count();
    if y_true.is_empty() || total_relevant == 0 || k == 0 {
        return 0.0;
    }
    let hits = argsort_descending(y_score)
        .into_iter()
        .take(k)
        .filter(|&i| y_true[i] > 0.0)
        .count();
    hits as f32 / total_relevant as f32
}

/// Normalized discounted cumulative gain at k.
///
/// A hit at rank r (1-based) contributes `relevance / log2(r + 1)`; the
/// ideal DCG ranks the ground truth by relevance descending. Always in
/// [0, 1], and exactly 1 when the predicted ordering matches the ideal one.
pub fn ndcg_at_k(y_true: &[f32], y_score: &[f32], k: usize) -> f32 {
    if y_true.is_empty() || k == 0 {
        return 0.0;
    }

    let discounted_gain = |ranked: &[usize]| -> f32 {
        ranked
            .iter()
            .take(k)
            .enumerate()
            .map(|(rank, &i)| y_true[i] / ((rank as f32 + 2.0).log2()))
            .sum()
    };

    let dcg = discounted_gain(&argsort_descending(y_score));
    let idcg = discounted_gain(&argsort_descending(y_true));

    if idcg == 0.0 { 0.0 } else { dcg / idcg }
}

/// Fraction of recommended destinations with distinct countries, in (0, 1].
pub fn diversity_score(countries: &[&str]) -> f32 {
    if countries.is_empty() {
        return 0.0;
    }
    let unique: std::collections::HashSet<&str> = countries.iter().copied().collect();
    unique.len() as f32 / countries.len() as f32
}

/// Arithmetic mean of a slice of sustainability scores; 0 when empty.
pub fn mean_sustainability(scores: &[f32]) -> f32 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f32>() / scores.len() as f32
}
