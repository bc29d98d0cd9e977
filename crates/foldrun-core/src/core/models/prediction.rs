use super::features::FeatureBundle;
use serde::{Deserialize, Serialize};

/// The raw result of one model's inference call.
///
/// `plddt` holds the per-residue confidence estimate (0-100 scale); every
/// other output tensor travels in `tensors` so downstream consumers that
/// need raw values never have to re-parse structure text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    pub plddt: Vec<f64>,
    #[serde(default)]
    pub tensors: FeatureBundle,
}

impl ModelOutput {
    pub fn new(plddt: Vec<f64>) -> Self {
        Self {
            plddt,
            tensors: FeatureBundle::new(),
        }
    }

    /// Arithmetic mean of the per-residue confidence array, the basis for
    /// model ranking. `None` if the model produced no confidence values.
    pub fn mean_plddt(&self) -> Option<f64> {
        if self.plddt.is_empty() {
            return None;
        }
        Some(self.plddt.iter().sum::<f64>() / self.plddt.len() as f64)
    }
}
