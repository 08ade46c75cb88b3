//! Relative Distinguished Name: an ordered set of [`Ava`]s joined by `+`.

use super::ava::Ava;

/// One or more AVAs forming a single RDN component of a [`super::Dn`].
///
/// Two RDNs compare equal iff their AVA *sets* compare equal (spec §3);
/// `PartialEq` therefore compares the AVAs sorted by normalized type
/// rather than by user-provided order, while the user-provided order is
/// preserved in `avas` for display.
#[derive(Debug, Clone)]
pub struct Rdn {
    pub avas: Vec<Ava>,
}

impl Rdn {
    pub fn new(avas: Vec<Ava>) -> Self {
        Rdn { avas }
    }

    pub fn is_multivalued(&self) -> bool {
        self.avas.len() > 1
    }

    pub fn to_user_string(&self) -> String {
        self.avas
            .iter()
            .map(Ava::to_user_string)
            .collect::<Vec<_>>()
            .join("+")
    }

    /// Normalized form: AVAs sorted by normalized attribute type, joined
    /// with `+` (spec §4.5: "RDNs sort their AVAs by normalized attribute
    /// OID").
    pub fn to_normalized_string(&self) -> String {
        let mut sorted: Vec<&Ava> = self.avas.iter().collect();
        sorted.sort_by(|a, b| a.normalized_type.cmp(&b.normalized_type));
        sorted
            .iter()
            .map(|a| a.to_normalized_string())
            .collect::<Vec<_>>()
            .join("+")
    }

    fn sorted_avas(&self) -> Vec<&Ava> {
        let mut v: Vec<&Ava> = self.avas.iter().collect();
        v.sort_by(|a, b| {
            a.normalized_type
                .cmp(&b.normalized_type)
                .then_with(|| a.normalized_value.cmp(&b.normalized_value))
        });
        v
    }
}

impl PartialEq for Rdn {
    fn eq(&self, other: &Self) -> bool {
        if self.avas.len() != other.avas.len() {
            return false;
        }
        self.sorted_avas() == other.sorted_avas()
    }
}
impl Eq for Rdn {}

impl PartialOrd for Rdn {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rdn {
    /// Lexicographic on the normalized string form, used as the ordering
    /// matching-rule fallback (spec §4.5: "or lexicographic on normalized
    /// form if absent").
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.to_normalized_string().cmp(&other.to_normalized_string())
    }
}
