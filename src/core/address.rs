use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use crate::config::AddressSettings;
use crate::error::EngineError;
use crate::models::SharedProperty;

/// Street-type words that open a street name
pub const DEFAULT_STREET_KEYWORDS: [&str; 4] = ["via", "viale", "piazza", "corso"];

/// Cities recognized inside free text
pub const DEFAULT_KNOWN_CITIES: [&str; 12] = [
    "Milano", "Roma", "Torino", "Napoli", "Bologna", "Firenze",
    "Genova", "Venezia", "Verona", "Bergamo", "Monza", "Brescia",
];

/// Matching components needed before two addresses are considered the same
const MIN_COMPONENT_MATCHES: usize = 2;

static LISTING_URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"annunci/(\d+)/").unwrap());
static LISTING_CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:annuncio|codice|id)\s*:?\s*(\d{8,9})\b").unwrap());
static NUMBER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d+)\b").unwrap());

/// Street, civic number and city pulled out of an address or free text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressComponents {
    pub street: Option<String>,
    pub number: Option<String>,
    pub city: Option<String>,
}

impl AddressComponents {
    fn iter(&self) -> impl Iterator<Item = &str> {
        [&self.street, &self.number, &self.city]
            .into_iter()
            .filter_map(|c| c.as_deref())
    }
}

/// Extract the portal listing id from a URL or free text
///
/// `.../annunci/<digits>/` wins; otherwise `annuncio|codice|id` followed by an
/// 8 or 9 digit code.
pub fn extract_listing_id(text: &str) -> Option<String> {
    LISTING_URL_PATTERN
        .captures(text)
        .or_else(|| LISTING_CODE_PATTERN.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Single source of address heuristics for every caller
///
/// Street keywords and known cities come from configuration so the
/// normalizer can run against synthetic data.
#[derive(Debug, Clone)]
pub struct AddressNormalizer {
    street: Regex,
    city: Regex,
}

impl AddressNormalizer {
    pub fn new<S: AsRef<str>>(street_keywords: &[S], known_cities: &[S]) -> Result<Self, EngineError> {
        if street_keywords.is_empty() {
            return Err(EngineError::EmptyList("street keyword"));
        }
        if known_cities.is_empty() {
            return Err(EngineError::EmptyList("known city"));
        }

        // Keyword, then everything up to a comma or a digit
        let street = format!(r"\b(?:{})\b[^,\d]*", alternation(street_keywords));
        let city = format!(r"\b(?:{})\b", alternation(known_cities));

        Ok(Self {
            street: case_insensitive(&street, "street keywords")?,
            city: case_insensitive(&city, "known cities")?,
        })
    }

    pub fn from_settings(settings: &AddressSettings) -> Result<Self, EngineError> {
        Self::new(&settings.street_keywords, &settings.known_cities)
    }

    pub fn extract_components(&self, address: &str) -> AddressComponents {
        let street_match = self.street.find(address);
        let street = street_match
            .map(|m| collapse_whitespace(m.as_str()))
            .filter(|s| !s.is_empty());

        let number = NUMBER_PATTERN
            .captures(address)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());

        // "Via Roma, 45, Milano" is in Milano: skip city names inside the street
        let street_span = street_match.map(|m| m.range()).unwrap_or(0..0);
        let city = self
            .city
            .find_iter(address)
            .find(|m| m.start() >= street_span.end || m.end() <= street_span.start)
            .map(|m| m.as_str().to_string());

        AddressComponents { street, number, city }
    }

    /// Lowercase `street|number|city` key identifying a physical address
    ///
    /// Falls back to the collapsed raw address when no street is recognized,
    /// so unparseable addresses never collide with each other.
    pub fn address_key(&self, address: &str, city: &str) -> String {
        let components = self.extract_components(&format!("{}, {}", address, city));

        let street = match components.street {
            Some(street) => street,
            None => collapse_whitespace(address),
        };
        // The structured city field wins over whatever the text mentions
        let city = match city.trim() {
            "" => components.city.unwrap_or_default(),
            city => city.to_string(),
        };

        format!(
            "{}|{}|{}",
            street.to_lowercase(),
            components.number.unwrap_or_default(),
            city.to_lowercase()
        )
    }

    /// Decide whether `text` describes `property`
    ///
    /// A listing id matching one already stored on the property is decisive.
    /// Otherwise at least two of street, number and city extracted from the
    /// text must appear in the stored address. A single matching component is
    /// never enough.
    pub fn is_same_property(&self, text: &str, property: &SharedProperty) -> bool {
        if let Some(id) = extract_listing_id(text) {
            if property.source_ids().any(|source| source == id) {
                tracing::trace!("Listing id {} links to {}", id, property.id);
                return true;
            }
        }

        let stored = format!("{} {}", property.address, property.city).to_lowercase();
        let components = self.extract_components(text);

        let matches = components
            .iter()
            .filter(|component| stored.contains(&component.to_lowercase()))
            .count();

        matches >= MIN_COMPONENT_MATCHES
    }
}

impl Default for AddressNormalizer {
    fn default() -> Self {
        Self::new(&DEFAULT_STREET_KEYWORDS, &DEFAULT_KNOWN_CITIES)
            .expect("built-in address lists compile")
    }
}

fn alternation<S: AsRef<str>>(words: &[S]) -> String {
    words
        .iter()
        .map(|w| regex::escape(w.as_ref().trim()))
        .collect::<Vec<_>>()
        .join("|")
}

fn case_insensitive(pattern: &str, context: &'static str) -> Result<Regex, EngineError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| EngineError::Pattern { context, source })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
