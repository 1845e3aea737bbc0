use std::sync::Arc;

use seer_core::model::Reader;
use storage::repository::ReaderRepository;
use tracing::{debug, error};

use crate::error::ReaderServiceError;

/// Browsing the reader directory.
#[derive(Clone)]
pub struct ReaderService {
    readers: Arc<dyn ReaderRepository>,
}

impl ReaderService {
    #[must_use]
    pub fn new(readers: Arc<dyn ReaderRepository>) -> Self {
        Self { readers }
    }

    /// Readers ordered by ID, optionally only those online, capped at `limit`.
    ///
    /// # Errors
    ///
    /// Returns `ReaderServiceError::Storage` if repository access fails.
    pub async fn list_readers(
        &self,
        online_only: bool,
        limit: Option<usize>,
    ) -> Result<Vec<Reader>, ReaderServiceError> {
        let mut readers = self
            .readers
            .list_readers(online_only)
            .await
            .inspect_err(|e| error!(online_only, error = %e, "failed to list readers"))?;
        if let Some(limit) = limit {
            readers.truncate(limit);
        }
        debug!(online_only, count = readers.len(), "listed readers");
        Ok(readers)
    }
}
