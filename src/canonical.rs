//! Reconciles region names from the transaction reports with the names used
//! by the boundary reference.
//!
//! Both taxonomies are maintained independently, so some regions are spelled
//! differently. Known differences live in [`BUILTIN_NAME_MAPPING`]; everything
//! else is matched after [`normalize`].

use std::collections::HashMap;

/// Report spelling (after title-casing) → boundary spelling
pub const BUILTIN_NAME_MAPPING: &[(&str, &str)] = &[
    ("Andaman And Nicobar Islands", "Andaman & Nicobar Islands"),
    (
        "Dadara And Nagar Havelli And Daman And Diu",
        "Dadra & Nagar Haveli & Daman & Diu",
    ),
    ("Jammu And Kashmir", "Jammu & Kashmir"),
    ("Nct Of Delhi", "Delhi"),
    ("Telengana", "Telangana"),
];

/// Join-key normalization shared by both sides of the region join
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Maps report region names to boundary join keys
#[derive(Debug, Clone)]
pub struct NameCanonicalizer {
    mapping: HashMap<String, String>,
}

impl Default for NameCanonicalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl NameCanonicalizer {
    /// Canonicalizer with the built-in mapping only
    pub fn new() -> Self {
        let mapping = BUILTIN_NAME_MAPPING
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();
        Self { mapping }
    }

    /// Add mappings on top of the built-in table. An entry whose key is
    /// already known replaces its target; entries are never removed.
    pub fn with_extra<I, K, V>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (from, to) in extra {
            self.mapping.insert(from.into(), to.into());
        }
        self
    }

    /// Boundary join key for a region name produced by the extractor
    pub fn canonicalize(&self, region: &str) -> String {
        let name = self
            .mapping
            .get(region)
            .map(String::as_str)
            .unwrap_or(region);
        normalize(name)
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_mismatches() {
        let c = NameCanonicalizer::new();
        assert_eq!(c.canonicalize("Nct Of Delhi"), "delhi");
        assert_eq!(
            c.canonicalize("Andaman And Nicobar Islands"),
            "andaman & nicobar islands"
        );
        assert_eq!(
            c.canonicalize("Dadara And Nagar Havelli And Daman And Diu"),
            "dadra & nagar haveli & daman & diu"
        );
        assert_eq!(c.canonicalize("Jammu And Kashmir"), "jammu & kashmir");
        assert_eq!(c.canonicalize("Telengana"), "telangana");
    }

    #[test]
    fn test_unmapped_names_are_normalized() {
        let c = NameCanonicalizer::new();
        assert_eq!(c.canonicalize("Tamil Nadu"), "tamil nadu");
        assert_eq!(c.canonicalize("  Goa "), "goa");
    }

    #[test]
    fn test_mapping_requires_exact_match() {
        let c = NameCanonicalizer::new();
        assert_eq!(c.canonicalize("nct of delhi"), "nct of delhi");
    }

    #[test]
    fn test_pure() {
        let c = NameCanonicalizer::new();
        assert_eq!(c.canonicalize("Nct Of Delhi"), c.canonicalize("Nct Of Delhi"));
    }

    #[test]
    fn test_extra_mapping_extends_and_overrides() {
        let c = NameCanonicalizer::new().with_extra([
            ("Orissa", "Odisha"),
            ("Telengana", "Telangana State"),
        ]);
        assert_eq!(c.len(), BUILTIN_NAME_MAPPING.len() + 1);
        assert_eq!(c.canonicalize("Orissa"), "odisha");
        assert_eq!(c.canonicalize("Telengana"), "telangana state");
        assert_eq!(c.canonicalize("Nct Of Delhi"), "delhi");
    }

    #[test]
    fn test_normalize_matches_boundary_side() {
        assert_eq!(normalize(" Andaman & Nicobar Islands"), "andaman & nicobar islands");
    }
}
