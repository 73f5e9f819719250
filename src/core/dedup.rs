use uuid::Uuid;
use crate::core::address::AddressNormalizer;
use crate::core::agency::{normalize_agency_name, AgencyClassifier};
use crate::models::{Agency, LinkState, Listing, SharedProperty};

/// Union of two agency lists keyed by normalized name
///
/// The first spelling seen for a name is the display name for the whole
/// group. Entries are never dropped: an incoming entry that brings a source
/// link or listing id the group does not have yet is kept (under the group's
/// display name), or fills in an existing entry that had neither. Names with
/// nothing left after normalization (`"-"`) identify no one and are skipped.
pub fn merge_agencies(existing: &[Agency], incoming: &[Agency]) -> Vec<Agency> {
    let mut merged: Vec<Agency> = Vec::with_capacity(existing.len() + incoming.len());

    for agency in existing.iter().chain(incoming) {
        let key = normalize_agency_name(&agency.name);
        if key.is_empty() {
            continue;
        }

        let display = merged
            .iter()
            .find(|a| normalize_agency_name(&a.name) == key)
            .map(|a| a.name.clone());

        let Some(display) = display else {
            merged.push(agency.clone());
            continue;
        };

        let already_known = merged.iter().any(|a| {
            normalize_agency_name(&a.name) == key
                && a.link == agency.link
                && a.listing_id == agency.listing_id
        });
        if already_known {
            continue;
        }

        if agency.link.is_none() && agency.listing_id.is_none() {
            // A bare name adds nothing the group lacks
            continue;
        }

        let bare = merged.iter_mut().find(|a| {
            normalize_agency_name(&a.name) == key && a.link.is_none() && a.listing_id.is_none()
        });
        match bare {
            Some(entry) => {
                entry.link = agency.link.clone();
                entry.listing_id = agency.listing_id.clone();
            }
            None => merged.push(Agency {
                name: display,
                link: agency.link.clone(),
                listing_id: agency.listing_id.clone(),
            }),
        }
    }

    merged
}

/// Links raw listings to canonical shared properties
///
/// Every operation is a pure `(existing, incoming) -> new state` step; the
/// caller owns storage and must serialize updates to the same record.
#[derive(Debug, Clone, Default)]
pub struct PropertyLinker {
    normalizer: AddressNormalizer,
    classifier: AgencyClassifier,
}

impl PropertyLinker {
    pub fn new(normalizer: AddressNormalizer, classifier: AgencyClassifier) -> Self {
        Self { normalizer, classifier }
    }

    pub fn normalizer(&self) -> &AddressNormalizer {
        &self.normalizer
    }

    pub fn classifier(&self) -> &AgencyClassifier {
        &self.classifier
    }

    /// Canonical key for the physical address a listing describes
    pub fn address_key(&self, listing: &Listing) -> String {
        self.normalizer.address_key(&listing.address, &listing.city)
    }

    /// Deterministic record id derived from the address key
    pub fn property_id(address_key: &str) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_URL, address_key.as_bytes())
    }

    /// Whether `listing` describes `property`
    ///
    /// A shared listing id links outright. Otherwise the address heuristic
    /// decides, except that two recognized streets that differ, or two
    /// different civic numbers, are never the same property.
    pub fn matches(&self, listing: &Listing, property: &SharedProperty) -> bool {
        let text = listing.linking_text();

        if let Some(id) = listing.agency_entry().listing_id {
            if property.source_ids().any(|source| source == id) {
                return true;
            }
        }

        let streets = (
            self.street(&listing.address, &listing.city),
            self.street(&property.address, &property.city),
        );
        if let (Some(a), Some(b)) = streets {
            if a != b {
                return false;
            }
        }

        let key = self.address_key(listing);
        match (civic_number(&key), civic_number(&property.address_key)) {
            (Some(a), Some(b)) if a != b => false,
            _ => self.normalizer.is_same_property(&text, property),
        }
    }

    fn street(&self, address: &str, city: &str) -> Option<String> {
        self.normalizer
            .extract_components(&format!("{}, {}", address, city))
            .street
            .map(|street| street.to_lowercase())
    }

    /// Fold a listing into the record for its address
    ///
    /// `None` creates the record (Unlinked -> Linked). A listing that changes
    /// the agency set moves the record to Relinked and reclassifies it from
    /// the merged names. A listing already reflected returns the record
    /// unchanged.
    pub fn link(&self, existing: Option<&SharedProperty>, listing: &Listing) -> SharedProperty {
        let Some(existing) = existing else {
            return self.create(listing);
        };

        let agencies = merge_agencies(&existing.agencies, &[listing.agency_entry()]);
        if agencies == existing.agencies {
            tracing::trace!("Listing already reflected in {}", existing.id);
            return existing.clone();
        }

        let mut updated = existing.clone();
        updated.classification = self.classifier.compute_classification(names(&agencies).as_slice());
        updated.agencies = agencies;
        updated.link_state = LinkState::Relinked;
        fill_missing_details(&mut updated, listing);

        if listing.observed_at < updated.first_seen_at {
            updated.first_seen_at = listing.observed_at;
        }
        if listing.observed_at > updated.last_updated_at {
            updated.last_updated_at = listing.observed_at;
        }

        tracing::debug!(
            "Relinked {} ({} agencies, {:?})",
            updated.id,
            updated.agencies.len(),
            updated.classification
        );

        updated
    }

    fn create(&self, listing: &Listing) -> SharedProperty {
        let address_key = self.address_key(listing);
        let agencies = merge_agencies(&[], &[listing.agency_entry()]);
        let classification = self.classifier.compute_classification(names(&agencies).as_slice());
        let id = Self::property_id(&address_key);

        tracing::debug!("Linked new property {} at {}", id, address_key);

        SharedProperty {
            id,
            address_key,
            address: listing.address.trim().to_string(),
            city: listing.city.trim().to_string(),
            price: listing.price,
            size: listing.size,
            bedrooms: listing.bedrooms,
            bathrooms: listing.bathrooms,
            property_type: listing.property_type.clone(),
            location: listing.location,
            agencies,
            classification,
            link_state: LinkState::Linked,
            first_seen_at: listing.observed_at,
            last_updated_at: listing.observed_at,
        }
    }
}

/// Groups a batch of listings into canonical properties
#[derive(Debug, Clone, Default)]
pub struct Deduper {
    linker: PropertyLinker,
}

impl Deduper {
    pub fn new(linker: PropertyLinker) -> Self {
        Self { linker }
    }

    pub fn linker(&self) -> &PropertyLinker {
        &self.linker
    }

    /// Deduplicate listings into shared properties, in first-seen order
    ///
    /// A listing joins the first record whose address key equals its own or
    /// that the address normalizer recognizes as the same property.
    pub fn dedupe(&self, listings: &[Listing]) -> Vec<SharedProperty> {
        let mut properties: Vec<SharedProperty> = Vec::new();

        for listing in listings {
            let key = self.linker.address_key(listing);
            let position = properties
                .iter()
                .position(|p| p.address_key == key || self.linker.matches(listing, p));

            match position {
                Some(index) => {
                    let updated = self.linker.link(Some(&properties[index]), listing);
                    properties[index] = updated;
                }
                None => properties.push(self.linker.link(None, listing)),
            }
        }

        tracing::debug!(
            "Deduplicated {} listings into {} properties",
            listings.len(),
            properties.len()
        );

        properties
    }
}

/// Middle segment of a `street|number|city` key, if any
fn civic_number(address_key: &str) -> Option<&str> {
    address_key.split('|').nth(1).filter(|n| !n.is_empty())
}

fn names(agencies: &[Agency]) -> Vec<&str> {
    agencies.iter().map(|a| a.name.as_str()).collect()
}

/// Later listings may know details the first one lacked
fn fill_missing_details(property: &mut SharedProperty, listing: &Listing) {
    if property.bedrooms.is_none() {
        property.bedrooms = listing.bedrooms;
    }
    if property.bathrooms.is_none() {
        property.bathrooms = listing.bathrooms;
    }
    if property.property_type.is_none() {
        property.property_type = listing.property_type.clone();
    }
    if property.location.is_none() {
        property.location = listing.location;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use crate::models::Classification;

    fn create_listing(address: &str, agency: &str, link: Option<&str>, day: u32) -> Listing {
        Listing {
            listing_id: None,
            address: address.to_string(),
            city: "Milano".to_string(),
            price: 320_000.0,
            size: 85.0,
            bedrooms: None,
            bathrooms: None,
            property_type: Some("apartment".to_string()),
            location: None,
            agency: agency.to_string(),
            link: link.map(str::to_string),
            text: None,
            observed_at: Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap(),
        }
    }

    fn agency(name: &str, link: Option<&str>) -> Agency {
        Agency {
            name: name.to_string(),
            link: link.map(str::to_string),
            listing_id: None,
        }
    }

    #[test]
    fn test_merge_keeps_first_spelling() {
        let merged = merge_agencies(&[agency("RE/MAX Milano", None)], &[agency("re max milano", None)]);

        assert_eq!(merged, vec![agency("RE/MAX Milano", None)]);
    }

    #[test]
    fn test_merge_retains_every_distinct_link() {
        let existing = [agency("Tecnocasa", Some("https://a.example/1"))];
        let incoming = [
            agency("TECNOCASA", Some("https://b.example/2")),
            agency("tecnocasa", Some("https://a.example/1")),
        ];

        let merged = merge_agencies(&existing, &incoming);

        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(|a| a.name == "Tecnocasa"));
        assert_eq!(merged[1].link.as_deref(), Some("https://b.example/2"));
    }

    #[test]
    fn test_merge_fills_bare_entry() {
        let merged = merge_agencies(&[agency("Casa&Co", None)], &[agency("casa co", Some("https://x.example"))]);

        assert_eq!(merged, vec![agency("Casa&Co", Some("https://x.example"))]);
    }

    #[test]
    fn test_merge_is_a_union() {
        let merged = merge_agencies(&[agency("A", None)], &[agency("B", None)]);
        assert_eq!(merged.len(), 2);

        let empty: [Agency; 0] = [];
        assert_eq!(merge_agencies(&empty, &empty), Vec::<Agency>::new());
    }

    #[test]
    fn test_merge_skips_names_without_letters() {
        let merged = merge_agencies(&[agency("-", Some("https://x.example"))], &[agency("Tecnocasa", None)]);

        assert_eq!(merged, vec![agency("Tecnocasa", None)]);
    }

    #[test]
    fn test_link_lifecycle() {
        let linker = PropertyLinker::default();
        let first = create_listing("Via Roma, 45", "Agenzia Garibaldi", None, 1);
        let second = create_listing("Via Roma 45", "Tecnocasa", None, 2);

        let created = linker.link(None, &first);
        assert_eq!(created.link_state, LinkState::Linked);
        assert_eq!(created.classification, Classification::SingleAgency);

        let relinked = linker.link(Some(&created), &second);
        assert_eq!(relinked.link_state, LinkState::Relinked);
        assert_eq!(relinked.classification, Classification::Multiagency);
        assert_eq!(relinked.last_updated_at, second.observed_at);
        assert_eq!(relinked.id, created.id);

        // Re-applying is a no-op
        let again = linker.link(Some(&relinked), &second);
        assert_eq!(again.agencies, relinked.agencies);
        assert_eq!(again.last_updated_at, relinked.last_updated_at);

        let again = linker.link(Some(&created), &first);
        assert_eq!(again.link_state, LinkState::Linked);
    }

    #[test]
    fn test_different_civic_numbers_never_link() {
        let linker = PropertyLinker::default();
        let one = linker.link(None, &create_listing("Via Verdi 1", "Tecnocasa", None, 1));

        assert!(!linker.matches(&create_listing("Via Verdi 10", "Tecnocasa", None, 2), &one));
        assert!(linker.matches(&create_listing("Via Verdi, 1", "Gabetti", None, 2), &one));

        let mut by_id = create_listing("Via Verdi 10", "Tecnocasa", None, 2);
        by_id.text = Some("codice 87654321".to_string());
        let mut tagged = one.clone();
        tagged.agencies[0].listing_id = Some("87654321".to_string());
        assert!(linker.matches(&by_id, &tagged));
    }

    #[test]
    fn test_different_streets_never_link() {
        let linker = PropertyLinker::default();
        let roma = linker.link(None, &create_listing("Via Roma 45", "Tecnocasa", None, 1));

        // Same number and city, other street
        assert!(!linker.matches(&create_listing("Via Verdi 45", "Gabetti", None, 2), &roma));
        assert!(linker.matches(&create_listing("via roma", "Gabetti", None, 2), &roma));
    }

    #[test]
    fn test_dedupe_grouping_ignores_arrival_order() {
        let deduper = Deduper::default();
        let listings = vec![
            create_listing("Via Roma 45", "Agenzia X", None, 1),
            create_listing("Via Verdi 45", "Agenzia Y", None, 2),
            create_listing("Via Verdi", "Agenzia Z", None, 3),
        ];

        let groups = |properties: Vec<SharedProperty>| {
            let mut groups: Vec<(Vec<String>, Classification)> = properties
                .into_iter()
                .map(|p| {
                    let mut names: Vec<String> = p.agencies.into_iter().map(|a| a.name).collect();
                    names.sort();
                    (names, p.classification)
                })
                .collect();
            groups.sort_by(|a, b| a.0.cmp(&b.0));
            groups
        };

        let forward = groups(deduper.dedupe(&listings));
        let mut reversed_input = listings.clone();
        reversed_input.reverse();
        let backward = groups(deduper.dedupe(&reversed_input));

        assert_eq!(forward, backward);
        assert_eq!(
            forward,
            vec![
                (vec!["Agenzia X".to_string()], Classification::SingleAgency),
                (vec!["Agenzia Y".to_string(), "Agenzia Z".to_string()], Classification::Multiagency),
            ]
        );
    }

    #[test]
    fn test_property_id_is_deterministic() {
        let linker = PropertyLinker::default();
        let a = linker.link(None, &create_listing("Via Roma, 45", "A", None, 1));
        let b = linker.link(None, &create_listing("via roma 45", "B", None, 5));

        assert_eq!(a.address_key, b.address_key);
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn test_dedupe_order_independent() {
        let deduper = Deduper::default();
        let listings = vec![
            create_listing("Via Roma, 45", "Agenzia Garibaldi", None, 1),
            create_listing("Via Roma 45", "Privato", None, 2),
            create_listing("Corso Como 10", "Tecnocasa", None, 3),
            create_listing("Via Roma 45", "RE/MAX", Some("https://remax.example/45"), 4),
        ];

        let forward = deduper.dedupe(&listings);
        let mut reversed_input = listings.clone();
        reversed_input.reverse();
        let backward = deduper.dedupe(&reversed_input);

        assert_eq!(forward.len(), 2);
        assert_eq!(backward.len(), 2);

        for property in &forward {
            let twin = backward
                .iter()
                .find(|p| p.id == property.id)
                .expect("same records either way");
            assert_eq!(twin.classification, property.classification);
            assert_eq!(twin.agencies.len(), property.agencies.len());
        }

        let roma = forward.iter().find(|p| p.address_key.starts_with("via roma")).unwrap();
        assert_eq!(roma.agencies.len(), 3);
        assert_eq!(roma.classification, Classification::Private);
        assert_eq!(roma.first_seen_at, listings[0].observed_at);
    }
}
