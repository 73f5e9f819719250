use validator::Validate;
use crate::config::Settings;
use crate::core::{AddressNormalizer, AgencyClassifier, Deduper, Matcher, PropertyLinker};
use crate::error::EngineError;
use crate::models::{BatchRequest, BatchResponse, BatchStats, Property};

/// Wires the engine components from configuration and runs batches
#[derive(Debug, Clone)]
pub struct Engine {
    deduper: Deduper,
    matcher: Matcher,
    default_limit: usize,
    max_limit: usize,
}

impl Engine {
    pub fn from_settings(settings: &Settings) -> Result<Self, EngineError> {
        let normalizer = AddressNormalizer::from_settings(&settings.address)?;
        let classifier = AgencyClassifier::from_settings(&settings.agency);

        Ok(Self {
            deduper: Deduper::new(PropertyLinker::new(normalizer, classifier)),
            matcher: Matcher::new(settings.weights(), settings.matching.min_score),
            default_limit: settings.matching.default_limit,
            max_limit: settings.matching.max_limit,
        })
    }

    pub fn deduper(&self) -> &Deduper {
        &self.deduper
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Deduplicate the batch's listings, then match every buyer against the result
    pub fn run(&self, request: &BatchRequest) -> Result<BatchResponse, EngineError> {
        request.validate()?;

        let properties = self.deduper.dedupe(&request.listings);
        let candidates: Vec<Property> = properties.iter().map(|p| p.to_property()).collect();

        // Cap limit to prevent oversized result sets
        let limit = request
            .limit
            .unwrap_or(self.default_limit)
            .min(self.max_limit);

        let matches: Vec<_> = request
            .buyers
            .iter()
            .flat_map(|buyer| self.matcher.find_matches(buyer, &candidates, limit))
            .collect();

        let stats = BatchStats {
            listings: request.listings.len(),
            properties: properties.len(),
            buyers: request.buyers.len(),
            matches: matches.len(),
        };

        tracing::info!(
            "Batch done: {} listings -> {} properties, {} matches for {} buyers",
            stats.listings,
            stats.properties,
            stats.matches,
            stats.buyers
        );

        Ok(BatchResponse {
            properties,
            matches,
            stats,
        })
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            deduper: Deduper::default(),
            matcher: Matcher::default(),
            default_limit: 20,
            max_limit: 100,
        }
    }
}
