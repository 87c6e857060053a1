pub mod fetch;
pub mod list_sync;
pub mod reconcile;

pub use fetch::{FetchFailure, FetchReport, LibraryFetcher};
pub use list_sync::{ListSyncService, SnapshotReport};
pub use reconcile::{KeyedLocks, MatchedBy, ReconcileOutcome, ReconcileSummary, Reconciler};
