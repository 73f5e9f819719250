use crate::models::{Buyer, MatchResult, Property, ScoringWeights};
use crate::core::{
    geometry::{centroid, contains, haversine_distance},
    scoring::calculate_match_percentage,
};

/// Main matching orchestrator for one buyer against candidate properties
///
/// # Pipeline Stages
/// 1. Search-area containment gate (properties without coordinates fail it)
/// 2. Criteria scoring
/// 3. Minimum score threshold
/// 4. Ranking by score, then distance from the area's centre
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
    min_score: u8,
}

impl Matcher {
    pub fn new(weights: ScoringWeights, min_score: u8) -> Self {
        Self { weights, min_score }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
            min_score: 0,
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Containment gate: a buyer without a search area accepts everything
    ///
    /// An invalid area contains nothing.
    pub fn passes_area_gate(&self, buyer: &Buyer, property: &Property) -> bool {
        match (&buyer.criteria.search_area, &property.location) {
            (None, _) => true,
            (Some(area), Some(location)) => contains(area, location),
            (Some(_), None) => false,
        }
    }

    /// Score a single property for a buyer, `None` when gated out
    pub fn score(&self, buyer: &Buyer, property: &Property) -> Option<u8> {
        if !self.passes_area_gate(buyer, property) {
            return None;
        }

        Some(calculate_match_percentage(property, &buyer.criteria, &self.weights))
    }

    /// Find the best properties for a buyer
    ///
    /// # Arguments
    /// * `buyer` - The client and their criteria
    /// * `candidates` - Canonical properties to consider
    /// * `limit` - Maximum number of matches to return
    pub fn find_matches(&self, buyer: &Buyer, candidates: &[Property], limit: usize) -> Vec<MatchResult> {
        let center = buyer.criteria.search_area.as_ref().and_then(centroid);

        let mut matches: Vec<MatchResult> = candidates
            .iter()
            // Stage 1 & 2: gate and score
            .filter_map(|property| self.score(buyer, property).map(|score| (property, score)))
            // Stage 3: threshold
            .filter(|(_, score)| *score >= self.min_score)
            .map(|(property, score)| MatchResult {
                property_id: property.id.clone(),
                client_id: buyer.client_id.clone(),
                score,
                distance_m: match (&center, &property.location) {
                    (Some(center), Some(location)) => Some(haversine_distance(center, location)),
                    _ => None,
                },
            })
            .collect();

        // Stage 4: score descending, then nearest first, then id for stable output
        matches.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| {
                    let a_distance = a.distance_m.unwrap_or(f64::INFINITY);
                    let b_distance = b.distance_m.unwrap_or(f64::INFINITY);
                    a_distance
                        .partial_cmp(&b_distance)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| a.property_id.cmp(&b.property_id))
        });

        matches.truncate(limit);

        tracing::debug!(
            "Buyer {}: {} of {} candidates matched",
            buyer.client_id,
            matches.len(),
            candidates.len()
        );

        matches
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}
