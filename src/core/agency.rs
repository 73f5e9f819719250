use std::collections::HashSet;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};
use crate::config::AgencySettings;
use crate::models::Classification;

/// Default substrings that identify a private seller in a normalized name
pub const DEFAULT_PRIVATE_MARKERS: [&str; 5] = [
    "privato",
    "privata",
    "venditaprivata",
    "proprietario",
    "proprietaria",
];

/// Normalize an agency name for comparison
///
/// trim → lowercase → NFD → drop combining marks → keep alphanumerics only.
/// `"RE/MAX"`, `"re max"` and `" Re-Max "` all become `"remax"`.
/// Idempotent.
pub fn normalize_agency_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Classifies a property from the names of everyone advertising it
#[derive(Debug, Clone)]
pub struct AgencyClassifier {
    private_markers: Vec<String>,
}

impl AgencyClassifier {
    pub fn new(private_markers: Vec<String>) -> Self {
        // Markers are compared against normalized names, so normalize them too
        let private_markers = private_markers
            .iter()
            .map(|m| normalize_agency_name(m))
            .filter(|m| !m.is_empty())
            .collect();

        Self { private_markers }
    }

    pub fn from_settings(settings: &AgencySettings) -> Self {
        Self::new(settings.private_markers.clone())
    }

    /// Whether an already normalized name denotes a private seller
    pub fn is_private_marker(&self, normalized: &str) -> bool {
        self.private_markers
            .iter()
            .any(|marker| normalized.contains(marker.as_str()))
    }

    /// One representative (first seen original spelling) per normalized name
    pub fn distinct_agencies<S: AsRef<str>>(&self, names: &[S]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut distinct = Vec::new();
        for name in names {
            let name: &str = name.as_ref();
            let normalized = normalize_agency_name(name);
            if !normalized.is_empty() && seen.insert(normalized) {
                distinct.push(name.to_string());
            }
        }
        distinct
    }

    /// Derive the classification from the current set of agency names
    ///
    /// 1. No names (blank or punctuation-only names do not count): private
    /// 2. Any private marker: private, whatever else is present
    /// 3. Two or more distinct names: multiagency
    /// 4. Otherwise: single agency
    ///
    /// Depends only on the set of names, never on the order they arrived in.
    pub fn compute_classification<S: AsRef<str>>(&self, names: &[S]) -> Classification {
        let normalized: HashSet<String> = names
            .iter()
            .map(|name| normalize_agency_name(name.as_ref()))
            .filter(|name| !name.is_empty())
            .collect();

        if normalized.is_empty() {
            return Classification::Private;
        }

        if normalized.iter().any(|name| self.is_private_marker(name)) {
            return Classification::Private;
        }

        if normalized.len() >= 2 {
            Classification::Multiagency
        } else {
            Classification::SingleAgency
        }
    }
}

impl Default for AgencyClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_PRIVATE_MARKERS.iter().map(|m| m.to_string()).collect())
    }
}
