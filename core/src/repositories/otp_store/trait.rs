use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::entities::OtpRecord;
use crate::errors::DomainError;

/// Backend currently holding OTP records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local storage
    Memory,
    /// Redis primary storage
    Redis,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Redis => write!(f, "redis"),
        }
    }
}

/// Outcome of charging one verification attempt to an issuance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptReservation {
    /// The attempt was counted; carries the new attempt count
    Reserved(u32),
    /// The issuance already used its whole budget; nothing was counted
    Exhausted,
    /// The record is gone or was replaced by a newer issuance
    Missing,
}

/// Keyed store of OTP records, at most one per contact.
///
/// Every operation is atomic per contact. The conditional operations match on
/// the record id so a caller holding a stale snapshot cannot touch a record that
/// a newer issuance has put in its place.
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Fetch the live record for a contact
    async fn get(&self, contact: &str) -> Result<Option<OtpRecord>, DomainError>;

    /// Insert or replace the record for `record.contact`
    async fn put(&self, record: OtpRecord) -> Result<(), DomainError>;

    /// Remove the record for a contact; returns whether one existed
    async fn delete(&self, contact: &str) -> Result<bool, DomainError>;

    /// Remove the record only if it is still the issuance identified by `id`
    async fn remove_if_current(&self, contact: &str, id: Uuid) -> Result<bool, DomainError>;

    /// Count one attempt against issuance `id`, only while its attempt count
    /// is below `max_attempts`. The check and the increment are one step.
    async fn reserve_attempt(
        &self,
        contact: &str,
        id: Uuid,
        max_attempts: u32,
    ) -> Result<AttemptReservation, DomainError>;

    /// Drop every record that expired before `now`; returns how many were removed
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError>;

    /// Which backend this store writes to
    fn backend(&self) -> StorageBackend;
}
