use bto_housing::config::AppConfig;
use bto_housing::error::AppError;
use bto_housing::workflows::housing::{
    EligibilityPolicy, HousingService, JsonFileSnapshotStore, SnapshotStore,
};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Snapshot file configured through `BTO_SNAPSHOT_PATH`, if any.
pub(crate) fn snapshot_store(config: &AppConfig) -> Option<JsonFileSnapshotStore> {
    config
        .storage
        .snapshot_path
        .as_ref()
        .map(JsonFileSnapshotStore::new)
}

/// Rebuild the service from the store, or start empty when nothing was saved yet.
pub(crate) fn load_service<S>(
    store: Option<&S>,
    policy: EligibilityPolicy,
) -> Result<HousingService, AppError>
where
    S: SnapshotStore + ?Sized,
{
    let Some(store) = store else {
        return Ok(HousingService::new(policy));
    };

    match store.load()? {
        Some(snapshot) => {
            let service = HousingService::restore(snapshot, policy)?;
            info!(
                projects = service.projects().len(),
                users = service.users().len(),
                "housing snapshot restored"
            );
            Ok(service)
        }
        None => Ok(HousingService::new(policy)),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
