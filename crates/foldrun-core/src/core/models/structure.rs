use super::features::FeatureBundle;
use super::prediction::ModelOutput;
use thiserror::Error;

/// Number of heavy-atom slots in the fixed per-residue atom layout used by
/// the inference models' coordinate output.
pub const ATOM_TYPE_NUM: usize = 37;

/// Heavy-atom names, in slot order.
pub const ATOM_TYPES: [&str; ATOM_TYPE_NUM] = [
    "N", "CA", "C", "CB", "O", "CG", "CG1", "CG2", "OG", "OG1", "SG", "CD", "CD1", "CD2", "ND1",
    "ND2", "OD1", "OD2", "SD", "CE", "CE1", "CE2", "CE3", "NE", "NE1", "NE2", "OE1", "OE2", "CH2",
    "NH1", "NH2", "OH", "CZ", "CZ2", "CZ3", "NZ", "OXT",
];

/// Three-letter residue names indexed by residue type id; index 20 is the
/// unknown-residue fallback.
pub const RESTYPES_3: [&str; 21] = [
    "ALA", "ARG", "ASN", "ASP", "CYS", "GLN", "GLU", "GLY", "HIS", "ILE", "LEU", "LYS", "MET",
    "PHE", "PRO", "SER", "THR", "TRP", "TYR", "VAL", "UNK",
];

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormatError {
    #[error("Missing tensor '{0}' in prediction inputs")]
    MissingTensor(&'static str),

    #[error("Tensor '{name}' has unexpected layout: expected {expected}")]
    BadShape { name: &'static str, expected: String },
}

/// One atom of a formatted structure record.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureAtom {
    pub name: &'static str,
    pub residue_name: &'static str,
    pub chain_id: char,
    pub residue_seq: i64,
    pub position: [f64; 3],
    pub b_factor: f64,
}

/// A canonical atomic-coordinate record, ready for text serialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructureModel {
    pub atoms: Vec<StructureAtom>,
}

impl StructureModel {
    /// Builds a structure record from a processed feature bundle, a raw
    /// prediction result, and per-atom confidence values destined for the
    /// b-factor column.
    ///
    /// Expects `aatype` and `residue_index` in the features, and
    /// `final_atom_positions` / `final_atom_mask` in the result tensors.
    /// Atom slots with mask below 0.5 are absent from the output.
    pub fn from_prediction(
        features: &FeatureBundle,
        result: &ModelOutput,
        b_factors: &[f64],
    ) -> Result<Self, FormatError> {
        let aatype = features
            .get("aatype")
            .ok_or(FormatError::MissingTensor("aatype"))?
            .as_int()
            .ok_or_else(|| bad_shape("aatype", "int tensor of rank 1"))?;
        let residue_index = features
            .get("residue_index")
            .ok_or(FormatError::MissingTensor("residue_index"))?
            .as_int()
            .ok_or_else(|| bad_shape("residue_index", "int tensor of rank 1"))?;
        let positions = result
            .tensors
            .get("final_atom_positions")
            .ok_or(FormatError::MissingTensor("final_atom_positions"))?
            .as_float()
            .ok_or_else(|| bad_shape("final_atom_positions", "float tensor"))?;
        let mask = result
            .tensors
            .get("final_atom_mask")
            .ok_or(FormatError::MissingTensor("final_atom_mask"))?
            .as_float()
            .ok_or_else(|| bad_shape("final_atom_mask", "float tensor"))?;

        let num_residues = aatype.len();
        if residue_index.len() != num_residues {
            return Err(bad_shape("residue_index", format!("{num_residues} entries")));
        }
        if mask.len() != num_residues * ATOM_TYPE_NUM {
            return Err(bad_shape(
                "final_atom_mask",
                format!("{num_residues} x {ATOM_TYPE_NUM}"),
            ));
        }
        if positions.len() != num_residues * ATOM_TYPE_NUM * 3 {
            return Err(bad_shape(
                "final_atom_positions",
                format!("{num_residues} x {ATOM_TYPE_NUM} x 3"),
            ));
        }
        if b_factors.len() != num_residues * ATOM_TYPE_NUM {
            return Err(bad_shape(
                "b_factors",
                format!("{num_residues} x {ATOM_TYPE_NUM}"),
            ));
        }

        let mut atoms = Vec::new();
        for res in 0..num_residues {
            let residue_name = residue_name_for(aatype[res]);
            for slot in 0..ATOM_TYPE_NUM {
                let flat = res * ATOM_TYPE_NUM + slot;
                if mask[flat] < 0.5 {
                    continue;
                }
                atoms.push(StructureAtom {
                    name: ATOM_TYPES[slot],
                    residue_name,
                    chain_id: 'A',
                    residue_seq: residue_index[res] + 1,
                    position: [
                        positions[flat * 3],
                        positions[flat * 3 + 1],
                        positions[flat * 3 + 2],
                    ],
                    b_factor: b_factors[flat],
                });
            }
        }

        Ok(StructureModel { atoms })
    }
}

/// Repeats each residue's confidence value across every atom slot of that
/// residue, producing the flat per-atom array consumed by
/// [`StructureModel::from_prediction`].
pub fn broadcast_per_atom(plddt: &[f64]) -> Vec<f64> {
    let mut values = Vec::with_capacity(plddt.len() * ATOM_TYPE_NUM);
    for &value in plddt {
        for _ in 0..ATOM_TYPE_NUM {
            values.push(value);
        }
    }
    values
}

fn residue_name_for(aatype: i64) -> &'static str {
    let index = usize::try_from(aatype).unwrap_or(RESTYPES_3.len() - 1);
    RESTYPES_3
        .get(index)
        .copied()
        .unwrap_or(RESTYPES_3[RESTYPES_3.len() - 1])
}

fn bad_shape(name: &'static str, expected: impl Into<String>) -> FormatError {
    FormatError::BadShape {
        name,
        expected: expected.into(),
    }
}
