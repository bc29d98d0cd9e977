use crate::core::models::structure::StructureModel;
use std::io::{self, Write};

/// Serializes a structure record to PDB-format text.
///
/// Produces a single `MODEL 1` block with fixed-column `ATOM` records, a
/// chain-terminating `TER` record, `ENDMDL`, and `END`. Atom serial numbers
/// are assigned sequentially starting at 1.
pub fn to_pdb_string(model: &StructureModel) -> String {
    let mut out = String::new();
    out.push_str("MODEL     1\n");

    let mut serial = 0usize;
    for atom in &model.atoms {
        serial += 1;
        // Atom names shorter than four characters are right-shifted by one
        // column, per the PDB convention for single-letter elements.
        let name = if atom.name.len() == 4 {
            atom.name.to_string()
        } else {
            format!(" {}", atom.name)
        };
        let element = atom.name.chars().next().unwrap_or(' ');
        out.push_str(&format!(
            "ATOM  {serial:>5} {name:<4}{altloc:>1}{res:>3} {chain:>1}{seq:>4}{icode:>1}   \
             {x:>8.3}{y:>8.3}{z:>8.3}{occupancy:>6.2}{b:>6.2}          {element:>2}{charge:>2}\n",
            altloc = "",
            res = atom.residue_name,
            chain = atom.chain_id,
            seq = atom.residue_seq,
            icode = "",
            x = atom.position[0],
            y = atom.position[1],
            z = atom.position[2],
            occupancy = 1.00,
            b = atom.b_factor,
            charge = "",
        ));
    }

    if let Some(last) = model.atoms.last() {
        out.push_str(&format!(
            "TER   {serial:>5}      {res:>3} {chain:>1}{seq:>4}\n",
            serial = serial + 1,
            res = last.residue_name,
            chain = last.chain_id,
            seq = last.residue_seq,
        ));
    }

    out.push_str("ENDMDL\n");
    out.push_str("END\n");
    out
}

pub fn write_pdb(model: &StructureModel, writer: &mut impl Write) -> io::Result<()> {
    writer.write_all(to_pdb_string(model).as_bytes())
}
