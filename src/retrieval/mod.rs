
use tracing::debug;

/// Cosine similarity of two vectors in [-1, 1]. Zero-norm vectors (either
/// side) score 0.0 rather than dividing by zero.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Rank matrix rows by cosine similarity to the query vector and return the
/// indices of the `top_k` most similar rows, most similar first. Returns all
/// indices when `top_k` exceeds the row count. Equal scores break toward the
/// lower row index, keeping results deterministic.
#[inline]
pub fn rank(query: &[f32], matrix: &[Vec<f32>], top_k: usize) -> Vec<usize> {
    let mut scored: Vec<(usize, f32)> = matrix
        .iter()
        .enumerate()
        .map(|(i, row)| (i, cosine_similarity(row, query)))
        .collect();

    scored.sort_by(|(i, a), (j, b)| b.total_cmp(a).then_with(|| i.cmp(j)));
    scored.truncate(top_k);

    debug!(
        "Ranked {} rows, returning top {}",
        matrix.len(),
        scored.len()
    );
    scored.into_iter().map(|(i, _)| i).collect()
}
