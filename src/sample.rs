//! Deterministic sample data for the walkthrough.

use pinecone_client::{Metadata, Vector};

use crate::config::{NAMESPACE_1, NAMESPACE_2};

/// `dimension` copies of `value`.
pub fn constant_vector(dimension: usize, value: f32) -> Vec<f32> {
    vec![value; dimension]
}

/// Id of the 1-based sample `n`.
pub fn sample_id(n: usize) -> String {
    format!("vec{n}")
}

/// Sample `i` (0-based) is the constant vector `(i + 1) * 0.1`.
pub fn sample_vectors(count: usize, dimension: usize) -> Vec<Vec<f32>> {
    (0..count)
        .map(|i| constant_vector(dimension, (i + 1) as f32 * 0.1))
        .collect()
}

pub fn sample_metadata(n: usize) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("category".to_string(), format!("category-{n}"));
    metadata.insert("description".to_string(), format!("Sample vector {n}"));
    metadata
}

/// First half of the samples (rounded up) land in `ns1`, the rest in `ns2`.
pub fn namespace_for(index: usize, count: usize) -> &'static str {
    if index < count.div_ceil(2) {
        NAMESPACE_1
    } else {
        NAMESPACE_2
    }
}

/// Every sample paired with the namespace it is written to.
pub fn sample_records(count: usize, dimension: usize) -> Vec<(&'static str, Vector)> {
    sample_vectors(count, dimension)
        .into_iter()
        .enumerate()
        .map(|(i, values)| {
            let n = i + 1;
            let vector = Vector::new(sample_id(n), values).with_metadata(sample_metadata(n));
            (namespace_for(i, count), vector)
        })
        .collect()
}
