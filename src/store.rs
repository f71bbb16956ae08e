//! Append-only footprint history behind an opaque store interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::estimate::{FootprintInput, FootprintResult};

/// One immutable footprint submission.
///
/// `created_at` is assigned by the server when the record is built and is
/// distinct from the result's own computation timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFootprint {
    pub id: Uuid,
    /// Opaque owner identity supplied by the caller's identity provider.
    pub owner: String,
    pub input: FootprintInput,
    pub result: FootprintResult,
    pub created_at: DateTime<Utc>,
}

impl StoredFootprint {
    /// Build a fresh record for `owner` with a server-assigned creation time.
    pub fn new(owner: impl Into<String>, input: FootprintInput, result: FootprintResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            input,
            result,
            created_at: Utc::now(),
        }
    }
}

/// Interface to the footprint document store.
///
/// Histories are append-only: implementations must never update or delete a
/// previously stored record.
#[async_trait]
pub trait FootprintStore: Send + Sync {
    /// Append a new record to its owner's history.
    async fn append(&self, record: &StoredFootprint) -> anyhow::Result<()>;

    /// Full history for an owner, insertion-ordered, oldest first.
    async fn history(&self, owner: &str) -> anyhow::Result<Vec<StoredFootprint>>;
}

/// In-memory implementation used by the daemon and tests. This does **not**
/// provide persistence but mimics the API.
#[derive(Default)]
pub struct InMemoryStore {
    records: std::sync::Mutex<Vec<StoredFootprint>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FootprintStore for InMemoryStore {
    async fn append(&self, record: &StoredFootprint) -> anyhow::Result<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn history(&self, owner: &str) -> anyhow::Result<Vec<StoredFootprint>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.owner == owner)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::{
        DietInput, DietType, EnergyInput, HeatingType, RecyclingFrequency, TransportInput,
        WasteInput,
    };

    fn record_for(owner: &str) -> StoredFootprint {
        let input = FootprintInput {
            transport: TransportInput {
                car_miles_per_week: 50.0,
                transit_rides_per_week: 3.0,
                flights_per_year: 1.0,
            },
            energy: EnergyInput {
                kwh_per_month: 400.0,
                heating_type: HeatingType::Electric,
            },
            diet: DietInput {
                diet_type: DietType::Vegetarian,
            },
            waste: WasteInput {
                recycling_frequency: RecyclingFrequency::Always,
                composting: false,
            },
        };
        let result = FootprintResult::compute(&input);
        StoredFootprint::new(owner, input, result)
    }

    #[tokio::test]
    async fn history_is_insertion_ordered_per_owner() {
        let store = InMemoryStore::new();
        let first = record_for("ana");
        let second = record_for("ana");
        let other = record_for("ben");
        store.append(&first).await.unwrap();
        store.append(&other).await.unwrap();
        store.append(&second).await.unwrap();

        let history = store.history("ana").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, first.id);
        assert_eq!(history[1].id, second.id);
        assert!(history[0].created_at <= history[1].created_at);
    }

    #[tokio::test]
    async fn unknown_owner_has_empty_history() {
        let store = InMemoryStore::new();
        assert!(store.history("nobody").await.unwrap().is_empty());
    }
}
