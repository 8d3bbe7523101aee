use std::collections::HashMap;

use crate::core::distance::haversine_distance;
use crate::models::{LocationGroup, LocationId, OfferRecord, Posting, PostingId};

/// Why a record was left out of an aggregation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    MissingLocation,
    InvalidCoordinates,
    DuplicatePosting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludedRecord {
    pub posting_id: PostingId,
    pub reason: ExclusionReason,
}

/// Display order for location groups
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroupOrder {
    /// Newest first posting first, the store's ordering
    Recency,
    LocationId,
    /// Closest first, ties broken by location id
    DistanceFrom { latitude: f64, longitude: f64 },
}

/// Postings grouped by location for one snapshot of the store
///
/// The mapping has no meaningful iteration order; use [`Aggregation::ordered`]
/// for anything displayed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    groups: HashMap<LocationId, LocationGroup>,
    posting_index: HashMap<PostingId, LocationId>,
    excluded: Vec<ExcludedRecord>,
}

impl Aggregation {
    pub fn group(&self, location_id: &str) -> Option<&LocationGroup> {
        self.groups.get(location_id)
    }

    /// Group owning the given posting
    pub fn group_of(&self, posting_id: &str) -> Option<&LocationGroup> {
        self.posting_index
            .get(posting_id)
            .and_then(|location_id| self.groups.get(location_id))
    }

    pub fn posting(&self, posting_id: &str) -> Option<&Posting> {
        self.group_of(posting_id)?
            .postings
            .iter()
            .find(|p| p.id == posting_id)
    }

    pub fn contains_posting(&self, posting_id: &str) -> bool {
        self.posting_index.contains_key(posting_id)
    }

    pub fn groups(&self) -> impl Iterator<Item = &LocationGroup> {
        self.groups.values()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn posting_count(&self) -> usize {
        self.posting_index.len()
    }

    pub fn excluded(&self) -> &[ExcludedRecord] {
        &self.excluded
    }

    /// Groups sorted for display
    pub fn ordered(&self, order: GroupOrder) -> Vec<&LocationGroup> {
        let mut groups: Vec<&LocationGroup> = self.groups.values().collect();

        match order {
            GroupOrder::Recency => groups.sort_by_key(|g| g.rank),
            GroupOrder::LocationId => groups.sort_by(|a, b| a.location.id.cmp(&b.location.id)),
            GroupOrder::DistanceFrom { latitude, longitude } => {
                let distance = |g: &LocationGroup| {
                    haversine_distance(latitude, longitude, g.location.latitude, g.location.longitude)
                };
                groups.sort_by(|a, b| {
                    distance(a)
                        .partial_cmp(&distance(b))
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then_with(|| a.location.id.cmp(&b.location.id))
                });
            }
        }

        groups
    }
}

/// Group active offers by their location
///
/// Pure apart from logging: the same input always yields the same groups with
/// the same per-group ordering. Records without a usable location, and
/// repeated posting ids, are excluded with one warning each.
pub fn aggregate(records: &[OfferRecord]) -> Aggregation {
    records
        .iter()
        .enumerate()
        .fold(Aggregation::default(), |mut acc, (rank, record)| {
            let reason = match &record.location {
                None => Some(ExclusionReason::MissingLocation),
                Some(location) if !location.has_valid_coordinates() => {
                    Some(ExclusionReason::InvalidCoordinates)
                }
                Some(_) if acc.posting_index.contains_key(&record.id) => {
                    Some(ExclusionReason::DuplicatePosting)
                }
                Some(_) => None,
            };

            if let Some(reason) = reason {
                tracing::warn!(
                    posting_id = %record.id,
                    ?reason,
                    "Excluding offer from map aggregation"
                );
                acc.excluded.push(ExcludedRecord {
                    posting_id: record.id.clone(),
                    reason,
                });
                return acc;
            }

            let (posting, location) = record.clone().into_parts();
            let Some(location) = location else {
                return acc;
            };

            if posting.has_inverted_compensation() {
                tracing::warn!(
                    posting_id = %posting.id,
                    salary_min = ?posting.salary_min,
                    salary_max = ?posting.salary_max,
                    "Offer has minimum compensation above maximum"
                );
            }

            acc.posting_index
                .insert(posting.id.clone(), location.id.clone());
            acc.groups
                .entry(location.id.clone())
                .or_insert_with(|| LocationGroup {
                    location,
                    postings: Vec::new(),
                    rank,
                })
                .postings
                .push(posting);

            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContractType, Location};

    fn location(id: &str, lat: f64, lon: f64) -> Location {
        Location {
            id: id.to_string(),
            name: format!("Structure {}", id),
            city: "Paris".to_string(),
            latitude: lat,
            longitude: lon,
            is_verified: false,
        }
    }

    fn record(id: &str, location: Option<Location>) -> OfferRecord {
        OfferRecord {
            id: id.to_string(),
            title: format!("Offer {}", id),
            specialty: "Médecine générale".to_string(),
            contract_type: ContractType::Permanent,
            is_full_time: true,
            salary_min: None,
            salary_max: None,
            description: None,
            created_at: None,
            location,
        }
    }

    #[test]
    fn test_groups_by_location_preserving_order() {
        let a = location("a", 48.86, 2.32);
        let b = location("b", 45.83, 1.26);
        let records = vec![
            record("p1", Some(a.clone())),
            record("p2", Some(b.clone())),
            record("p3", Some(a.clone())),
        ];

        let agg = aggregate(&records);

        assert_eq!(agg.len(), 2);
        assert_eq!(agg.posting_count(), 3);
        let ids: Vec<_> = agg.group("a").unwrap().postings.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p3"]);
        assert_eq!(agg.group("b").unwrap().len(), 1);
        assert_eq!(agg.group_of("p3").unwrap().location.id, "a");
    }

    #[test]
    fn test_missing_location_excluded() {
        let records = vec![
            record("p1", Some(location("a", 48.86, 2.32))),
            record("p2", None),
        ];

        let agg = aggregate(&records);

        assert_eq!(agg.posting_count(), 1);
        assert!(!agg.contains_posting("p2"));
        assert_eq!(
            agg.excluded(),
            &[ExcludedRecord {
                posting_id: "p2".to_string(),
                reason: ExclusionReason::MissingLocation
            }]
        );
    }

    #[test]
    fn test_invalid_coordinates_excluded() {
        let records = vec![record("p1", Some(location("a", 123.0, 2.0)))];

        let agg = aggregate(&records);

        assert!(agg.is_empty());
        assert_eq!(agg.excluded()[0].reason, ExclusionReason::InvalidCoordinates);
    }

    #[test]
    fn test_duplicate_posting_kept_once() {
        let a = location("a", 48.86, 2.32);
        let records = vec![record("p1", Some(a.clone())), record("p1", Some(a))];

        let agg = aggregate(&records);

        assert_eq!(agg.group("a").unwrap().len(), 1);
        assert_eq!(agg.excluded().len(), 1);
        assert_eq!(agg.excluded()[0].reason, ExclusionReason::DuplicatePosting);
    }

    #[test]
    fn test_shared_coordinates_stay_distinct() {
        // Both registered with the default Paris seed coordinates
        let records = vec![
            record("p1", Some(location("a", 48.8566, 2.3522))),
            record("p2", Some(location("b", 48.8566, 2.3522))),
        ];

        let agg = aggregate(&records);

        assert_eq!(agg.len(), 2);
        assert!(agg.group("a").unwrap().contains("p1"));
        assert!(agg.group("b").unwrap().contains("p2"));
    }

    #[test]
    fn test_ordering() {
        let records = vec![
            record("p1", Some(location("z", 48.39, -4.49))),
            record("p2", Some(location("m", 45.83, 1.26))),
            record("p3", Some(location("a", 48.86, 2.32))),
        ];
        let agg = aggregate(&records);

        let ids = |groups: Vec<&LocationGroup>| {
            groups.iter().map(|g| g.location.id.clone()).collect::<Vec<_>>()
        };

        assert_eq!(ids(agg.ordered(GroupOrder::Recency)), vec!["z", "m", "a"]);
        assert_eq!(ids(agg.ordered(GroupOrder::LocationId)), vec!["a", "m", "z"]);
        // From Paris: Paris, Limoges, Brest
        assert_eq!(
            ids(agg.ordered(GroupOrder::DistanceFrom { latitude: 48.8566, longitude: 2.3522 })),
            vec!["a", "m", "z"]
        );
    }

    #[test]
    fn test_empty_input() {
        let agg = aggregate(&[]);
        assert!(agg.is_empty());
        assert!(agg.excluded().is_empty());
        assert!(agg.ordered(GroupOrder::Recency).is_empty());
    }
}
