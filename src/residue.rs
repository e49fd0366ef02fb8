use std::fmt;

use crate::error::{ConsensusError, Result};

/// Protonation-state and non-canonical residue names used by AMBER,
/// with the standard residue they stand for
static AMBER_NONCANONICAL: [(&str, &str); 11] = [
    ("ASH", "ASP"),
    ("GLH", "GLU"),
    ("CYX", "CYS"),
    ("HID", "HIS"),
    ("HIE", "HIS"),
    ("HIP", "HIS"),
    ("LYN", "LYS"),
    ("CYM", "CYS"),
    ("CYF", "CYS"),
    ("CYR", "CYS"),
    ("CYT", "CYS"),
];

static THREE_TO_ONE: [(&str, char); 21] = [
    ("ALA", 'A'),
    ("ARG", 'R'),
    ("ASN", 'N'),
    ("ASP", 'D'),
    ("CYS", 'C'),
    ("GLU", 'E'),
    ("GLY", 'G'),
    ("HIS", 'H'),
    ("ILE", 'I'),
    ("LEU", 'L'),
    ("LYS", 'K'),
    ("MET", 'M'),
    ("PHE", 'F'),
    ("PRO", 'P'),
    ("GLN", 'Q'),
    ("SER", 'S'),
    ("SEC", 'U'),
    ("THR", 'T'),
    ("TRP", 'W'),
    ("TYR", 'Y'),
    ("VAL", 'V'),
];

/// Map a three-letter residue name to its standard form
pub fn normalize_residue_name(name: &str) -> Result<&'static str> {
    if let Some((_, standard)) = AMBER_NONCANONICAL.iter().find(|(alias, _)| *alias == name) {
        return Ok(*standard);
    }
    THREE_TO_ONE
        .iter()
        .find(|(code, _)| *code == name)
        .map(|(code, _)| *code)
        .ok_or_else(|| ConsensusError::UnknownResidue(name.to_string()))
}

/// One-letter code of a residue name, after normalization
pub fn one_letter_code(name: &str) -> Result<char> {
    let standard = normalize_residue_name(name)?;
    THREE_TO_ONE
        .iter()
        .find(|(code, _)| *code == standard)
        .map(|(_, letter)| *letter)
        .ok_or_else(|| ConsensusError::UnknownResidue(name.to_string()))
}

/// Three-letter name of a one-letter code
pub fn three_letter_code(letter: char) -> Result<&'static str> {
    THREE_TO_ONE
        .iter()
        .find(|(_, l)| *l == letter)
        .map(|(code, _)| *code)
        .ok_or_else(|| ConsensusError::UnknownResidue(letter.to_string()))
}

/// A simulation residue identifier, `<chain>:<RES>:<number>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidueId {
    pub chain: String,
    pub name: String,
    pub number: i32,
}

impl ResidueId {
    pub fn parse(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.split(':').collect();
        if parts.len() != 3 {
            return Err(ConsensusError::malformed(
                raw,
                "residue identifier must look like <chain>:<RES>:<number>",
            ));
        }
        let number = parts[2].trim().parse::<i32>().map_err(|e| {
            ConsensusError::malformed(raw, format!("invalid residue number '{}': {}", parts[2], e))
        })?;

        Ok(Self {
            chain: parts[0].to_string(),
            name: parts[1].to_string(),
            number,
        })
    }

    /// Same residue with its name normalized to the standard vocabulary
    pub fn normalized(&self) -> Result<Self> {
        Ok(Self {
            chain: self.chain.clone(),
            name: normalize_residue_name(&self.name)?.to_string(),
            number: self.number,
        })
    }

    /// Sequence separation between two residues
    pub fn separation(&self, other: &ResidueId) -> u32 {
        self.number.abs_diff(other.number)
    }
}

impl fmt::Display for ResidueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.chain, self.name, self.number)
    }
}
