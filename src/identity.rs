use std::fmt;

/// Orientation-independent identity of a residue-pair contact.
///
/// The two raw identifiers are stored sorted, so `(a, b)` and `(b, a)`
/// produce equal keys. Self-pairs are kept as a degenerate identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey {
    lo: String,
    hi: String,
}

impl IdentityKey {
    pub fn new(residue_1: &str, residue_2: &str) -> Self {
        let (lo, hi) = if residue_1 <= residue_2 {
            (residue_1, residue_2)
        } else {
            (residue_2, residue_1)
        };
        Self {
            lo: lo.to_string(),
            hi: hi.to_string(),
        }
    }

    pub fn residues(&self) -> (&str, &str) {
        (&self.lo, &self.hi)
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "['{}', '{}']", self.lo, self.hi)
    }
}

/// Canonical string form of the identity of a residue pair
pub fn canonicalize(residue_1: &str, residue_2: &str) -> String {
    IdentityKey::new(residue_1, residue_2).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_is_commutative() {
        let pairs = [
            ("X:ALA:1", "X:GLY:2"),
            ("A:ARG:100", "A:ARG:20"),
            ("B:TRP:7", "A:TRP:7"),
            ("", "A:LYS:3"),
        ];
        for (a, b) in pairs {
            assert_eq!(canonicalize(a, b), canonicalize(b, a));
            assert_eq!(IdentityKey::new(a, b), IdentityKey::new(b, a));
        }
    }

    #[test]
    fn test_canonical_rendering_is_sorted() {
        assert_eq!(canonicalize("X:GLY:2", "X:ALA:1"), "['X:ALA:1', 'X:GLY:2']");
    }

    #[test]
    fn test_self_pair_is_valid_identity() {
        let key = IdentityKey::new("A:CYS:5", "A:CYS:5");
        assert_eq!(key.residues(), ("A:CYS:5", "A:CYS:5"));
        assert_eq!(key.to_string(), "['A:CYS:5', 'A:CYS:5']");
    }

    #[test]
    fn test_distinct_pairs_stay_distinct() {
        assert_ne!(
            IdentityKey::new("A:ALA:1", "A:GLY:2"),
            IdentityKey::new("A:ALA:1", "A:GLY:3")
        );
    }
}
