//! Release lookups shared by the HTTP routes and the one-shot commands.

use std::sync::Arc;

use device_release_gateway::SlotSource;
use device_release_slots::{ReleaseSlotRegistry, SlotRecord};
use tracing::{debug, error, info};

use crate::error::ReleaseError;

#[derive(Clone)]
pub struct ReleaseApi {
    source: Arc<dyn SlotSource>,
}

impl ReleaseApi {
    pub fn new(source: Arc<dyn SlotSource>) -> Self {
        Self { source }
    }

    /// Fetch and normalize the registry as it is right now. Nothing is cached
    /// between calls.
    pub async fn snapshot(&self) -> Result<ReleaseSlotRegistry, ReleaseError> {
        let items = self.source.fetch_slots().await.map_err(|err| {
            error!("slot query failed: {err}");
            ReleaseError::Upstream(err)
        })?;
        let registry = ReleaseSlotRegistry::from_raw(items);
        let counts = registry.status_counts();
        debug!(
            total = counts.total(),
            proposed = counts.proposed,
            approved = counts.approved,
            rejected = counts.rejected,
            unknown = counts.unknown,
            "fetched slot snapshot"
        );
        Ok(registry)
    }

    pub async fn all_slots(&self) -> Result<Vec<SlotRecord>, ReleaseError> {
        Ok(self.snapshot().await?.into_slots())
    }

    pub async fn latest_release(&self) -> Result<SlotRecord, ReleaseError> {
        let registry = self.snapshot().await?;
        match registry.latest_approved() {
            Ok(slot) => {
                debug!(version = %slot.version, "selected latest approved release");
                Ok(slot.clone())
            }
            Err(_) => {
                info!(slots = registry.len(), "no approved release found");
                Err(ReleaseError::NoApprovedRelease)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use device_release_gateway::QueryError;
    use device_release_slots::{RawSlot, RawSlotItem, RawStatus, RawValue, StatusKind};
    use pretty_assertions::assert_eq;

    /// Serves a fixed listing, or a fixed failure.
    pub(crate) struct StaticSource(pub(crate) Option<Vec<RawSlotItem>>);

    #[async_trait]
    impl SlotSource for StaticSource {
        async fn fetch_slots(&self) -> device_release_gateway::Result<Vec<RawSlotItem>> {
            self.0.clone().ok_or_else(|| QueryError::InvalidResponse {
                reason: "gateway unavailable".to_string(),
            })
        }
    }

    pub(crate) fn slot(version: &str, status: &str) -> RawSlotItem {
        RawSlotItem::Pair {
            key: Some(RawValue::text(version)),
            record: Some(RawSlot {
                version: Some(RawValue::text(version)),
                hash: Some(RawValue::text(format!("hash-{version}"))),
                url: Some(RawValue::text(format!("https://cdn.example/{version}.bin"))),
                status: Some(RawStatus::named(status)),
                ..RawSlot::default()
            }),
        }
    }

    pub(crate) fn api(items: Option<Vec<RawSlotItem>>) -> ReleaseApi {
        ReleaseApi::new(Arc::new(StaticSource(items)))
    }

    #[tokio::test]
    async fn all_slots_keeps_every_entry_in_order() {
        let api = api(Some(vec![
            slot("1.0.0", "APPROVED"),
            RawSlotItem::Unrecognized,
            slot("0.9.0", "REJECTED"),
        ]));
        let slots = api.all_slots().await.unwrap_or_else(|e| panic!("{e}"));
        let summary: Vec<(&str, StatusKind)> =
            slots.iter().map(|s| (s.version.as_str(), s.status)).collect();
        assert_eq!(
            summary,
            vec![
                ("1.0.0", StatusKind::Approved),
                ("", StatusKind::Unknown),
                ("0.9.0", StatusKind::Rejected),
            ]
        );
    }

    #[tokio::test]
    async fn latest_release_is_the_highest_approved() {
        let api = api(Some(vec![
            slot("1.2.0", "APPROVED"),
            slot("1.10.0", "APPROVED"),
            slot("2.0.0", "PROPOSED"),
        ]));
        let latest = api.latest_release().await.unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(latest.version, "1.10.0");
        assert_eq!(latest.hash, "hash-1.10.0");
    }

    #[tokio::test]
    async fn not_found_and_upstream_failure_stay_distinct() {
        let none = api(Some(vec![slot("1.0.0", "PROPOSED")]))
            .latest_release()
            .await
            .err()
            .unwrap_or_else(|| panic!("expected an error"));
        assert!(matches!(none, ReleaseError::NoApprovedRelease));
        assert_eq!(none.status_code(), 404);

        let empty = api(Some(Vec::new()))
            .latest_release()
            .await
            .err()
            .unwrap_or_else(|| panic!("expected an error"));
        assert!(matches!(empty, ReleaseError::NoApprovedRelease));

        let upstream = api(None)
            .latest_release()
            .await
            .err()
            .unwrap_or_else(|| panic!("expected an error"));
        assert!(matches!(upstream, ReleaseError::Upstream(_)));
        assert_eq!(upstream.status_code(), 500);
        assert_eq!(upstream.public_message(), "Failed to decode contract response");
    }
}
