//! Static French synonym table
//!
//! Lookup is bidirectional within a group: any member maps to all the other
//! members, whether it is the head word or not. Expanded terms score at
//! [`SYNONYM_WEIGHT`] instead of the original term's full weight.

/// Weight assigned to synonym-expanded query terms
pub const SYNONYM_WEIGHT: f64 = 0.7;

/// Synonym groups, head word first
const SYNONYM_GROUPS: &[&[&str]] = &[
    &["recherche", "rechercher", "chercher", "trouver", "quête"],
    &["ordinateur", "pc", "computer", "machine"],
    &["internet", "web", "net", "toile"],
    &["téléphone", "mobile", "portable", "smartphone"],
    &["voiture", "auto", "automobile", "véhicule"],
    &["maison", "domicile", "habitation", "logement"],
    &["travail", "boulot", "emploi", "job", "métier"],
];

/// Returns the other members of the word's synonym group
///
/// The word itself is never included. Words outside every group return an
/// empty list.
pub fn synonyms_for(word: &str) -> Vec<String> {
    let lower = word.to_lowercase();

    for group in SYNONYM_GROUPS {
        if group.iter().any(|member| *member == lower) {
            return group
                .iter()
                .filter(|member| **member != lower)
                .map(|member| (*member).to_string())
                .collect();
        }
    }

    Vec::new()
}
