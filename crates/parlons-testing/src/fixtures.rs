//! Deterministic fixtures.

use chrono::{DateTime, Duration, TimeZone, Utc};
use parlons_core::{Catalog, Config, LearningItem, SessionOrchestrator};

/// Collection of deterministic test fixtures.
pub struct Fixtures;

impl Fixtures {
    /// Fixed clock origin: 2024-01-15 09:00:00 UTC.
    pub fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0)
            .single()
            .unwrap_or_default()
    }

    /// `secs` seconds after [`Fixtures::epoch`].
    pub fn at(secs: i64) -> DateTime<Utc> {
        Self::epoch() + Duration::seconds(secs)
    }

    /// Catalog holding only `a1_1` ("Bonjour").
    pub fn single_item_catalog() -> Catalog {
        Catalog::new(vec![LearningItem::new("a1_1", "Bonjour", "Hello", "salutations")
            .with_pronunciation("bohn-ZHOOR")
            .with_context("greeting")])
        .unwrap_or_default()
    }

    /// `n` distinct A1 items named `item_0..item_n`.
    pub fn numbered_catalog(n: usize) -> Catalog {
        let items = (0..n)
            .map(|i| LearningItem::new(format!("item_{i}"), format!("phrase {i}"), format!("phrase {i}"), "drill"))
            .collect();
        Catalog::new(items).unwrap_or_default()
    }

    /// Orchestrator over the bundled catalog, introduced at [`Fixtures::epoch`].
    pub fn orchestrator() -> SessionOrchestrator {
        SessionOrchestrator::from_config(Catalog::builtin(), Config::default(), Self::epoch())
    }

    /// Orchestrator over a custom catalog.
    pub fn orchestrator_with(catalog: Catalog) -> SessionOrchestrator {
        SessionOrchestrator::from_config(catalog, Config::default(), Self::epoch())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_is_fixed() {
        assert_eq!(Fixtures::epoch(), Fixtures::epoch());
        assert_eq!(Fixtures::at(30) - Fixtures::epoch(), Duration::seconds(30));
    }

    #[test]
    fn test_catalogs() {
        assert_eq!(Fixtures::single_item_catalog().len(), 1);
        assert_eq!(Fixtures::numbered_catalog(25).len(), 25);
    }
}
