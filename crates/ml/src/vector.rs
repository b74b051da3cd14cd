use studio_core::{Intent, IntentScore};

pub(crate) fn normalize(values: &mut [f32]) {
    let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in values.iter_mut() {
            *value /= norm;
        }
    }
}

pub(crate) fn centroid(vectors: &[Vec<f32>]) -> Vec<f32> {
    let dims = vectors.first().map(Vec::len).unwrap_or(0);
    let mut acc = vec![0.0_f32; dims];

    for vector in vectors {
        for (idx, value) in vector.iter().enumerate() {
            acc[idx] += value;
        }
    }

    for value in &mut acc {
        *value /= vectors.len() as f32;
    }
    normalize(&mut acc);
    acc
}

pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0;
    let mut a_norm = 0.0;
    let mut b_norm = 0.0;
    for (lhs, rhs) in a.iter().zip(b.iter()) {
        dot += lhs * rhs;
        a_norm += lhs * lhs;
        b_norm += rhs * rhs;
    }

    if a_norm == 0.0 || b_norm == 0.0 {
        0.0
    } else {
        dot / (a_norm.sqrt() * b_norm.sqrt())
    }
}

/// Softmax over raw similarities, sorted best first. Ties keep label order.
pub(crate) fn rank(raw: Vec<(Intent, f32)>, temperature: f32) -> Vec<IntentScore> {
    if raw.is_empty() {
        return Vec::new();
    }

    let max = raw
        .iter()
        .map(|(_, score)| *score)
        .fold(f32::NEG_INFINITY, f32::max);
    let exps = raw
        .iter()
        .map(|(intent, score)| (*intent, ((score - max) * temperature).exp()))
        .collect::<Vec<_>>();
    let total = exps.iter().map(|(_, value)| value).sum::<f32>();

    let mut ranked = exps
        .into_iter()
        .map(|(intent, value)| IntentScore {
            intent,
            score: value / total,
        })
        .collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranking_sums_to_one_and_is_sorted() {
        let ranked = rank(
            vec![
                (Intent::GetRevenueMetrics, 0.2),
                (Intent::GetAttendanceReport, 0.9),
                (Intent::GetOutstandingPayment, 0.5),
            ],
            8.0,
        );
        assert_eq!(ranked[0].intent, Intent::GetAttendanceReport);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
        let total = ranked.iter().map(|s| s.score).sum::<f32>();
        assert!((total - 1.0).abs() < 1e-4);
    }

    #[test]
    fn mismatched_lengths_have_zero_similarity() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }
}
