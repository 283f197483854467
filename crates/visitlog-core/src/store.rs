use async_trait::async_trait;

use crate::error::StoreError;
use crate::visit::{NewVisit, Visit};

/// Persistence interface for visit records.
///
/// The server holds one instance for the process lifetime and hands it to
/// every handler through application state. Implementations only ever insert;
/// there is no update or delete path.
#[async_trait]
pub trait VisitStore: Send + Sync + 'static {
    /// Persist one visit, assigning an id and, when `visit.timestamp` is
    /// `None`, the current time. Returns the stored record.
    async fn save(&self, visit: NewVisit) -> Result<Visit, StoreError>;

    /// Every stored visit, newest first.
    async fn list_all(&self) -> Result<Vec<Visit>, StoreError>;

    /// Cheap reachability check used by `/health`.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Flush pending state before the process exits.
    async fn close(&self) -> Result<(), StoreError>;
}
