//! Vector helpers for the neighbor search

use ndarray::ArrayView1;

/// Cosine similarity; 0.0 when either vector has zero norm
pub fn cosine_similarity(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot = a.dot(&b);
    let norm_a = a.dot(&a).sqrt();
    let norm_b = b.dot(&b).sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_cosine_similarity() {
        let a = array![1.0, 0.0, 0.0];
        let b = array![1.0, 0.0, 0.0];
        assert!((cosine_similarity(a.view(), b.view()) - 1.0).abs() < 1e-12);

        let c = array![1.0, 0.0, 0.0];
        let d = array![0.0, 1.0, 0.0];
        assert!(cosine_similarity(c.view(), d.view()).abs() < 1e-12);

        let zero = array![0.0, 0.0, 0.0];
        assert_eq!(cosine_similarity(a.view(), zero.view()), 0.0);
    }
}
