use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A named, shaped array of numeric data.
///
/// Feature bundles and raw prediction results are exchanged between pipeline
/// stages as flat collections of these. The data is stored row-major; the
/// shape is advisory metadata that consumers validate against their own
/// expectations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dtype", rename_all = "snake_case")]
pub enum Tensor {
    Float { shape: Vec<usize>, data: Vec<f64> },
    Int { shape: Vec<usize>, data: Vec<i64> },
}

impl Tensor {
    pub fn float(shape: Vec<usize>, data: Vec<f64>) -> Self {
        Tensor::Float { shape, data }
    }

    pub fn int(shape: Vec<usize>, data: Vec<i64>) -> Self {
        Tensor::Int { shape, data }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            Tensor::Float { shape, .. } => shape,
            Tensor::Int { shape, .. } => shape,
        }
    }

    /// Number of scalar elements actually stored.
    pub fn len(&self) -> usize {
        match self {
            Tensor::Float { data, .. } => data.len(),
            Tensor::Int { data, .. } => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_float(&self) -> Option<&[f64]> {
        match self {
            Tensor::Float { data, .. } => Some(data),
            Tensor::Int { .. } => None,
        }
    }

    pub fn as_int(&self) -> Option<&[i64]> {
        match self {
            Tensor::Int { data, .. } => Some(data),
            Tensor::Float { .. } => None,
        }
    }
}

/// An insertion-ordered collection of named tensors.
///
/// This is the opaque intermediate representation produced once per sequence
/// by the feature-extraction pipeline and consumed (read-only) by every
/// configured model. Model runners also return their per-model processed
/// view of the features as a bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureBundle {
    tensors: IndexMap<String, Tensor>,
}

impl FeatureBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, tensor: Tensor) {
        self.tensors.insert(name.into(), tensor);
    }

    pub fn get(&self, name: &str) -> Option<&Tensor> {
        self.tensors.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tensors.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tensor)> {
        self.tensors.iter().map(|(name, t)| (name.as_str(), t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tensor_accessors_match_variant() {
        let f = Tensor::float(vec![2], vec![1.0, 2.0]);
        assert_eq!(f.as_float(), Some(&[1.0, 2.0][..]));
        assert!(f.as_int().is_none());
        assert_eq!(f.shape(), &[2]);
        assert_eq!(f.len(), 2);

        let i = Tensor::int(vec![1], vec![7]);
        assert_eq!(i.as_int(), Some(&[7][..]));
        assert!(i.as_float().is_none());
    }

    #[test]
    fn bundle_preserves_insertion_order() {
        let mut bundle = FeatureBundle::new();
        bundle.insert("zeta", Tensor::int(vec![1], vec![1]));
        bundle.insert("alpha", Tensor::int(vec![1], vec![2]));
        bundle.insert("mid", Tensor::int(vec![1], vec![3]));

        let names: Vec<_> = bundle.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn bundle_round_trips_through_json() {
        let mut bundle = FeatureBundle::new();
        bundle.insert("aatype", Tensor::int(vec![3], vec![0, 4, 19]));
        bundle.insert("plddt_bins", Tensor::float(vec![2], vec![0.5, 0.75]));

        let text = serde_json::to_string(&bundle).unwrap();
        let back: FeatureBundle = serde_json::from_str(&text).unwrap();
        assert_eq!(back, bundle);

        let names: Vec<_> = back.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["aatype", "plddt_bins"]);
    }
}
