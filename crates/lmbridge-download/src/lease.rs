//! Per-model acquisition lock.
//!
//! At most one acquisition per model id runs at a time. A second caller
//! gets [`DownloadError::AlreadyInProgress`] immediately instead of waiting.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use lmbridge_core::DownloadError;

/// Shared set of model ids currently being acquired.
#[derive(Debug, Clone, Default)]
pub struct AcquisitionLocks {
    active: Arc<Mutex<HashSet<String>>>,
}

impl AcquisitionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `model_id`, failing if it is already claimed.
    pub fn try_lease(&self, model_id: &str) -> Result<AcquisitionLease, DownloadError> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if !active.insert(model_id.to_string()) {
            return Err(DownloadError::already_in_progress(model_id));
        }
        Ok(AcquisitionLease {
            locks: self.clone(),
            model_id: model_id.to_string(),
        })
    }

    /// Whether `model_id` is being acquired right now.
    pub fn is_active(&self, model_id: &str) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(model_id)
    }

    /// Whether any acquisition is running.
    pub fn any_active(&self) -> bool {
        !self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

/// Releases its model id when dropped.
#[derive(Debug)]
pub struct AcquisitionLease {
    locks: AcquisitionLocks,
    model_id: String,
}

impl AcquisitionLease {
    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

impl Drop for AcquisitionLease {
    fn drop(&mut self) {
        self.locks
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.model_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_lease_fails_until_first_drops() {
        let locks = AcquisitionLocks::new();
        let lease = locks.try_lease("m").unwrap();
        assert_eq!(lease.model_id(), "m");
        assert!(locks.is_active("m"));

        assert!(matches!(
            locks.try_lease("m"),
            Err(DownloadError::AlreadyInProgress { .. })
        ));
        // Different models do not contend.
        let other = locks.try_lease("n").unwrap();

        drop(lease);
        assert!(!locks.is_active("m"));
        assert!(locks.try_lease("m").is_ok());
        drop(other);
        assert!(!locks.any_active());
    }
}
