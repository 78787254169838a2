use crate::model::HealthLog;
use async_trait::async_trait;

/// Read-only access to the persistent log store.
///
/// Sources only hand back everything they hold. Date slicing is done by the
/// cache coordinator.
#[async_trait]
pub trait LogSource: Send + Sync {
    async fn fetch_all(&self) -> anyhow::Result<Vec<HealthLog>>;
}
