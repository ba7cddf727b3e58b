use async_trait::async_trait;

use crate::error::Result;

/// Source of the raw CSV payload.
///
/// A fetch either yields the whole payload or fails with
/// [`TrackerError::Fetch`](crate::error::TrackerError::Fetch); it is never
/// retried and never partially applied.
#[async_trait]
pub trait SheetSourcePort: Send + Sync {
    async fn fetch(&self) -> Result<String>;

    /// Human-readable location, for logs and the page footer
    fn describe(&self) -> String;
}
