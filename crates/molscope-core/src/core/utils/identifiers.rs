use phf::{Map, Set, phf_map, phf_set};

static AMINO_ACID_NAMES: Set<&'static str> = phf_set! {
    "ALA", "ARG", "ASN", "ASP", "CYS", "GLN", "GLU", "GLY", "HIS", "ILE",
    "LEU", "LYS", "MET", "PHE", "PRO", "SER", "THR", "TRP", "TYR", "VAL",
    "HID", "HIE", "HIP", "HSD", "HSE", "HSP", "CYX", "ASH", "GLH", "LYN",
    "MSE", "SEC", "PYL",
};

static NUCLEOTIDE_NAMES: Set<&'static str> = phf_set! {
    "A", "C", "G", "U", "T", "I", "DA", "DC", "DG", "DT", "DU", "DI",
};

static WATER_NAMES: Set<&'static str> = phf_set! {
    "HOH", "WAT", "H2O", "DOD", "TIP", "TIP3", "TIP4", "SOL",
};

static PROTEIN_BACKBONE_ATOM_NAMES: Set<&'static str> = phf_set! {
    "N", "H", "HN", "CA", "HA", "C", "O", "OXT", "H1", "H2", "H3", "NT",
    "HT1", "HT2", "HT3", "OT1", "OT2", "HC", "HOXT", "HA1", "HA2", "HA3", "1HA", "2HA",
};

static NUCLEIC_BACKBONE_ATOM_NAMES: Set<&'static str> = phf_set! {
    "P", "OP1", "OP2", "OP3", "O1P", "O2P", "O3P", "O5'", "C5'", "C4'", "O4'",
    "C3'", "O3'", "C2'", "O2'", "C1'", "H5'", "H5''", "H4'", "H3'", "H2'",
    "H2''", "H1'", "HO2'", "HO3'", "HO5'",
};

/// Side-chain (or base) heavy atoms that carry a hydrogen in their standard
/// protonation state.
static DONOR_ATOMS: Map<&'static str, &'static [&'static str]> = phf_map! {
    "ARG" => &["NE", "NH1", "NH2"],
    "ASN" => &["ND2"],
    "GLN" => &["NE2"],
    "HIS" => &["ND1", "NE2"],
    "HID" => &["ND1"],
    "HIE" => &["NE2"],
    "HIP" => &["ND1", "NE2"],
    "HSD" => &["ND1"],
    "HSE" => &["NE2"],
    "HSP" => &["ND1", "NE2"],
    "LYS" => &["NZ"],
    "SER" => &["OG"],
    "THR" => &["OG1"],
    "TYR" => &["OH"],
    "TRP" => &["NE1"],
    "A" => &["N6"],
    "C" => &["N4"],
    "G" => &["N1", "N2"],
    "U" => &["N3"],
    "T" => &["N3"],
    "I" => &["N1"],
};

/// Nitrogen and sulfur atoms with an available lone pair. Every oxygen is an
/// acceptor and is not listed here.
static ACCEPTOR_ATOMS: Map<&'static str, &'static [&'static str]> = phf_map! {
    "HIS" => &["ND1", "NE2"],
    "HID" => &["NE2"],
    "HIE" => &["ND1"],
    "HSD" => &["NE2"],
    "HSE" => &["ND1"],
    "MET" => &["SD"],
    "CYS" => &["SG"],
    "A" => &["N1", "N3", "N7"],
    "G" => &["N3", "N7"],
    "C" => &["N3"],
    "I" => &["N3", "N7"],
};

static CATIONIC_ATOMS: Map<&'static str, &'static [&'static str]> = phf_map! {
    "ARG" => &["NE", "NH1", "NH2"],
    "LYS" => &["NZ"],
    "HIS" => &["ND1", "NE2"],
    "HIP" => &["ND1", "NE2"],
    "HSP" => &["ND1", "NE2"],
};

static ANIONIC_ATOMS: Map<&'static str, &'static [&'static str]> = phf_map! {
    "ASP" => &["OD1", "OD2"],
    "GLU" => &["OE1", "OE2"],
};

static NUCLEIC_ANIONIC_ATOM_NAMES: Set<&'static str> = phf_set! {
    "OP1", "OP2", "O1P", "O2P",
};

/// Atoms whose position represents the delocalized positive charge in
/// cation-pi interactions.
static CATION_CENTER_ATOMS: Map<&'static str, &'static [&'static str]> = phf_map! {
    "LYS" => &["NZ"],
    "ARG" => &["CZ"],
};

static HYDROPHOBIC_ATOMS: Map<&'static str, &'static [&'static str]> = phf_map! {
    "ALA" => &["CB"],
    "VAL" => &["CB", "CG1", "CG2"],
    "LEU" => &["CB", "CG", "CD1", "CD2"],
    "ILE" => &["CB", "CG1", "CG2", "CD1", "CD"],
    "MET" => &["CB", "CG", "SD", "CE"],
    "MSE" => &["CB", "CG", "CE"],
    "PHE" => &["CB", "CG", "CD1", "CD2", "CE1", "CE2", "CZ"],
    "TRP" => &["CB", "CG", "CD2", "CE3", "CZ2", "CZ3", "CH2"],
    "PRO" => &["CB", "CG"],
    "TYR" => &["CB", "CG", "CD1", "CD2", "CE1", "CE2"],
};

/// Ring atoms listed in bonded (cyclic) order.
static AROMATIC_RINGS: Map<&'static str, &'static [&'static [&'static str]]> = phf_map! {
    "PHE" => &[&["CG", "CD1", "CE1", "CZ", "CE2", "CD2"]],
    "TYR" => &[&["CG", "CD1", "CE1", "CZ", "CE2", "CD2"]],
    "TRP" => &[
        &["CG", "CD1", "NE1", "CE2", "CD2"],
        &["CD2", "CE2", "CZ2", "CH2", "CZ3", "CE3"],
    ],
    "HIS" => &[&["CG", "ND1", "CE1", "NE2", "CD2"]],
    "HID" => &[&["CG", "ND1", "CE1", "NE2", "CD2"]],
    "HIE" => &[&["CG", "ND1", "CE1", "NE2", "CD2"]],
    "HIP" => &[&["CG", "ND1", "CE1", "NE2", "CD2"]],
    "A" => &[&["N1", "C2", "N3", "C4", "C5", "C6"], &["C4", "C5", "N7", "C8", "N9"]],
    "G" => &[&["N1", "C2", "N3", "C4", "C5", "C6"], &["C4", "C5", "N7", "C8", "N9"]],
    "I" => &[&["N1", "C2", "N3", "C4", "C5", "C6"], &["C4", "C5", "N7", "C8", "N9"]],
    "C" => &[&["N1", "C2", "N3", "C4", "C5", "C6"]],
    "U" => &[&["N1", "C2", "N3", "C4", "C5", "C6"]],
    "T" => &[&["N1", "C2", "N3", "C4", "C5", "C6"]],
};

/// Maps DNA residue names onto their RNA counterparts (`"DA"` → `"A"`).
fn nucleotide_key(residue_name: &str) -> &str {
    match residue_name {
        "DA" => "A",
        "DC" => "C",
        "DG" => "G",
        "DT" => "T",
        "DU" => "U",
        "DI" => "I",
        other => other,
    }
}

fn table_contains(
    table: &Map<&'static str, &'static [&'static str]>,
    residue_name: &str,
    atom_name: &str,
) -> bool {
    let atom_name = atom_name.trim();
    table
        .get(nucleotide_key(residue_name.trim()))
        .is_some_and(|names| names.iter().any(|&name| name == atom_name))
}

pub fn is_amino_acid(residue_name: &str) -> bool {
    AMINO_ACID_NAMES.contains(residue_name.trim())
}

pub fn is_nucleotide(residue_name: &str) -> bool {
    NUCLEOTIDE_NAMES.contains(residue_name.trim())
}

pub fn is_water(residue_name: &str) -> bool {
    WATER_NAMES.contains(residue_name.trim())
}

pub fn is_backbone_atom(atom_name: &str) -> bool {
    PROTEIN_BACKBONE_ATOM_NAMES.contains(atom_name.trim())
}

pub fn is_nucleic_backbone_atom(atom_name: &str) -> bool {
    let name = atom_name.trim();
    NUCLEIC_BACKBONE_ATOM_NAMES.contains(name)
        || NUCLEIC_BACKBONE_ATOM_NAMES.contains(name.replace('*', "'").as_str())
}

pub fn is_standard_donor(residue_name: &str, atom_name: &str) -> bool {
    table_contains(&DONOR_ATOMS, residue_name, atom_name)
}

pub fn is_standard_acceptor(residue_name: &str, atom_name: &str) -> bool {
    table_contains(&ACCEPTOR_ATOMS, residue_name, atom_name)
}

pub fn is_cationic_atom(residue_name: &str, atom_name: &str) -> bool {
    table_contains(&CATIONIC_ATOMS, residue_name, atom_name)
}

pub fn is_anionic_atom(residue_name: &str, atom_name: &str) -> bool {
    let atom_name = atom_name.trim();
    table_contains(&ANIONIC_ATOMS, residue_name, atom_name)
        || (is_amino_acid(residue_name) && matches!(atom_name, "OXT" | "OT2"))
        || (is_nucleotide(residue_name) && NUCLEIC_ANIONIC_ATOM_NAMES.contains(atom_name))
}

pub fn is_cation_center(residue_name: &str, atom_name: &str) -> bool {
    table_contains(&CATION_CENTER_ATOMS, residue_name, atom_name)
}

pub fn is_hydrophobic_atom(residue_name: &str, atom_name: &str) -> bool {
    table_contains(&HYDROPHOBIC_ATOMS, residue_name, atom_name)
}

/// Returns the atom names of every aromatic ring of a standard residue.
pub fn aromatic_rings(residue_name: &str) -> &'static [&'static [&'static str]] {
    AROMATIC_RINGS
        .get(nucleotide_key(residue_name.trim()))
        .copied()
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn residue_classes_are_recognized() {
        assert!(is_amino_acid("ALA"));
        assert!(is_amino_acid(" HIE "));
        assert!(!is_amino_acid("HOH"));
        assert!(is_nucleotide("DG"));
        assert!(is_nucleotide("U"));
        assert!(is_water("HOH"));
        assert!(is_water("WAT"));
        assert!(!is_water("ALA"));
    }

    #[test]
    fn is_backbone_atom_recognizes_standard_backbone_atoms() {
        assert!(is_backbone_atom("N"));
        assert!(is_backbone_atom("CA"));
        assert!(is_backbone_atom(" O "));
        assert!(is_backbone_atom("OXT"));
        assert!(!is_backbone_atom("CB"));
        assert!(!is_backbone_atom("ca"));
    }

    #[test]
    fn nucleic_backbone_accepts_legacy_star_names() {
        assert!(is_nucleic_backbone_atom("O2'"));
        assert!(is_nucleic_backbone_atom("O2*"));
        assert!(is_nucleic_backbone_atom("P"));
        assert!(!is_nucleic_backbone_atom("N1"));
    }

    #[test]
    fn donor_and_acceptor_tables_follow_protonation_states() {
        assert!(is_standard_donor("SER", "OG"));
        assert!(is_standard_donor("LYS", "NZ"));
        assert!(is_standard_donor("DG", "N1"));
        assert!(!is_standard_donor("ASP", "OD1"));
        assert!(is_standard_acceptor("HIE", "ND1"));
        assert!(!is_standard_acceptor("HIE", "NE2"));
        assert!(is_standard_acceptor("DA", "N7"));
    }

    #[test]
    fn charged_atoms_include_termini_and_phosphates() {
        assert!(is_cationic_atom("ARG", "NH1"));
        assert!(is_anionic_atom("GLU", "OE2"));
        assert!(is_anionic_atom("GLY", "OXT"));
        assert!(is_anionic_atom("DC", "OP1"));
        assert!(!is_anionic_atom("HOH", "O"));
    }

    #[test]
    fn aromatic_rings_cover_protein_and_nucleic_residues() {
        assert_eq!(aromatic_rings("PHE").len(), 1);
        assert_eq!(aromatic_rings("TRP").len(), 2);
        assert_eq!(aromatic_rings("DA").len(), 2);
        assert_eq!(aromatic_rings("DT")[0].len(), 6);
        assert!(aromatic_rings("ALA").is_empty());
    }

    #[test]
    fn hydrophobic_atoms_exclude_polar_positions() {
        assert!(is_hydrophobic_atom("LEU", "CD1"));
        assert!(is_hydrophobic_atom("MET", "SD"));
        assert!(!is_hydrophobic_atom("TYR", "CZ"));
        assert!(!is_hydrophobic_atom("SER", "CB"));
        assert!(is_cation_center("ARG", "CZ"));
    }
}
