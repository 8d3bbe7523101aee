use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ContractType, Location, OfferRecord};

/// Errors that can occur when fetching offers
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Source of active offers for the map
///
/// Implementations return every active offer with its structure embedded,
/// newest first.
#[async_trait]
pub trait OfferStore: Send + Sync {
    async fn list_active_offers(&self) -> Result<Vec<OfferRecord>, StoreError>;
}

/// Fixed set of offers, used for local development and tests
#[derive(Debug, Clone, Default)]
pub struct StaticOfferStore {
    records: Vec<OfferRecord>,
}

impl StaticOfferStore {
    pub fn new(records: Vec<OfferRecord>) -> Self {
        Self { records }
    }

    /// Demo structures and offers
    pub fn seed() -> Self {
        let paris = Location {
            id: "structure-paris".to_string(),
            name: "Cabinet Médical Central".to_string(),
            city: "Paris".to_string(),
            latitude: 48.8656,
            longitude: 2.3212,
            is_verified: true,
        };
        let limoges = Location {
            id: "structure-limoges".to_string(),
            name: "Maison de Santé Rurale".to_string(),
            city: "Limoges".to_string(),
            latitude: 45.8336,
            longitude: 1.2611,
            is_verified: false,
        };
        let brest = Location {
            id: "structure-brest".to_string(),
            name: "Centre Médical Maritime".to_string(),
            city: "Brest".to_string(),
            latitude: 48.3905,
            longitude: -4.4860,
            is_verified: false,
        };

        let offer = |id: &str,
                     location: &Location,
                     title: &str,
                     specialty: &str,
                     contract_type: ContractType,
                     is_full_time: bool,
                     salary: (Option<i64>, Option<i64>),
                     description: &str| OfferRecord {
            id: id.to_string(),
            title: title.to_string(),
            specialty: specialty.to_string(),
            contract_type,
            is_full_time,
            salary_min: salary.0,
            salary_max: salary.1,
            description: Some(description.to_string()),
            created_at: None,
            location: Some(location.clone()),
        };

        // Newest first
        Self::new(vec![
            offer(
                "offer-4",
                &brest,
                "Médecin urgentiste - CDD 6 mois",
                "Médecine d'urgence",
                ContractType::FixedTerm,
                true,
                (Some(4500), Some(5500)),
                "CDD de 6 mois renouvelable pour un poste d'urgentiste.",
            ),
            offer(
                "offer-3",
                &paris,
                "Cardiologue - Libéral",
                "Cardiologie",
                ContractType::IndependentPractice,
                false,
                (None, None),
                "Installation en libéral au sein d'un cabinet pluridisciplinaire.",
            ),
            offer(
                "offer-2",
                &limoges,
                "Médecin généraliste - Remplacement",
                "Médecine générale",
                ContractType::TemporaryCover,
                true,
                (Some(5000), Some(7000)),
                "Remplacement de 3 mois dans une maison de santé rurale accueillante.",
            ),
            offer(
                "offer-1",
                &paris,
                "Médecin généraliste - CDI temps plein",
                "Médecine générale",
                ContractType::Permanent,
                true,
                (Some(60000), Some(80000)),
                "Nous recherchons un médecin généraliste pour rejoindre notre cabinet en plein centre de Paris.",
            ),
        ])
    }

    pub fn records(&self) -> &[OfferRecord] {
        &self.records
    }
}

#[async_trait]
impl OfferStore for StaticOfferStore {
    async fn list_active_offers(&self) -> Result<Vec<OfferRecord>, StoreError> {
        Ok(self.records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregate;

    #[tokio::test]
    async fn test_static_store_returns_records() {
        let store = StaticOfferStore::seed();
        let records = store.list_active_offers().await.unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].id, "offer-4");
    }

    #[test]
    fn test_seed_groups_into_three_structures() {
        let agg = aggregate(StaticOfferStore::seed().records());

        assert_eq!(agg.len(), 3);
        let paris = agg.group("structure-paris").unwrap();
        let ids: Vec<_> = paris.postings.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["offer-3", "offer-1"]);
    }
}
