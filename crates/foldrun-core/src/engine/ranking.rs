use indexmap::IndexMap;
use serde::Serialize;
use std::cmp::Ordering;

/// The total order over model names within one sequence job.
///
/// `plddts` keeps the model-set iteration order; `order` lists model names
/// by descending mean confidence. Serializes to the `ranking_debug` artifact
/// layout: `{"plddts": {...}, "order": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    pub plddts: IndexMap<String, f64>,
    pub order: Vec<String>,
}

impl Ranking {
    /// Mean confidence of the top-ranked model.
    pub fn best(&self) -> Option<(&str, f64)> {
        let name = self.order.first()?;
        let plddt = self.plddts.get(name).copied()?;
        Some((name.as_str(), plddt))
    }
}

/// Ranks models by descending mean confidence.
///
/// The sort is stable: models with equal confidence keep their relative
/// order from the model configuration set (the insertion order of
/// `plddts`). Incomparable values (NaN) are treated as ties.
pub fn rank_models(plddts: &IndexMap<String, f64>) -> Ranking {
    let mut entries: Vec<(&String, f64)> = plddts.iter().map(|(name, v)| (name, *v)).collect();
    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    Ranking {
        plddts: plddts.clone(),
        order: entries.into_iter().map(|(name, _)| name.clone()).collect(),
    }
}
