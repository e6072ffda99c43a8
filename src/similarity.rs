//! Cosine similarity over embedding vectors.
//!
//! Diagnostic utilities for comparing embeddings offline; nothing here is
//! wired into the ingestion path.

use crate::embeddings::EmbeddingProvider;
use crate::types::IngestError;

/// Cosine similarity between two vectors, in `[-1, 1]`.
///
/// Accumulates in `f64` to keep long vectors numerically stable. A
/// zero-magnitude input yields `0.0` rather than dividing by zero; the
/// result is symmetric in its arguments.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let x = f64::from(x);
        let y = f64::from(y);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f64::EPSILON {
        return 0.0;
    }
    (dot / denom) as f32
}

/// Embeds two texts independently (one batch of one each) and compares them.
pub async fn compare_texts(
    provider: &dyn EmbeddingProvider,
    first: &str,
    second: &str,
) -> Result<f32, IngestError> {
    let a = provider.embed_batch(&[first.to_string()]).await?;
    let b = provider.embed_batch(&[second.to_string()]).await?;
    match (a.first(), b.first()) {
        (Some(a), Some(b)) => Ok(cosine_similarity(a, b)),
        _ => Err(IngestError::Embedding(
            "provider returned no vector for a non-empty input".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::MockEmbeddingProvider;

    #[test]
    fn identical_vectors_score_one() {
        let v = vec![0.3, -1.2, 4.5, 0.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn opposite_vectors_score_negative_one() {
        let v = vec![0.5f32, 2.0, -3.0];
        let neg: Vec<f32> = v.iter().map(|x| -x).collect();
        assert!((cosine_similarity(&v, &neg) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_scores_zero() {
        let zero = vec![0.0f32; 4];
        let v = vec![1.0f32, 2.0, 3.0, 4.0];
        assert_eq!(cosine_similarity(&zero, &v), 0.0);
        assert_eq!(cosine_similarity(&v, &zero), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn similarity_is_symmetric() {
        let a = vec![0.1f32, 0.9, -0.4, 2.2];
        let b = vec![1.3f32, -0.2, 0.8, 0.5];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        let a = vec![1.0f32, 0.0];
        let b = vec![0.0f32, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[tokio::test]
    async fn compare_texts_self_similarity() {
        let provider = MockEmbeddingProvider::with_dimensions(32);
        let score = compare_texts(&provider, "same text", "same text")
            .await
            .unwrap();
        assert!((score - 1.0).abs() < 1e-6);

        let other = compare_texts(&provider, "same text", "different text")
            .await
            .unwrap();
        assert!(other < 1.0);
    }
}
