//! In-memory OTP record store for single instance deployments and tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::OtpRecord;
use crate::errors::DomainError;

use super::r#trait::{AttemptReservation, OtpStore, StorageBackend};

/// Process-local store keyed by normalized contact
#[derive(Clone, Default)]
pub struct InMemoryOtpStore {
    records: Arc<RwLock<HashMap<String, OtpRecord>>>,
}

impl InMemoryOtpStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, expired ones included
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl OtpStore for InMemoryOtpStore {
    async fn get(&self, contact: &str) -> Result<Option<OtpRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records.get(contact).cloned())
    }

    async fn put(&self, record: OtpRecord) -> Result<(), DomainError> {
        let mut records = self.records.write().await;
        records.insert(record.contact.clone(), record);
        Ok(())
    }

    async fn delete(&self, contact: &str) -> Result<bool, DomainError> {
        let mut records = self.records.write().await;
        Ok(records.remove(contact).is_some())
    }

    async fn remove_if_current(&self, contact: &str, id: Uuid) -> Result<bool, DomainError> {
        let mut records = self.records.write().await;
        match records.get(contact) {
            Some(record) if record.id == id => {
                records.remove(contact);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn reserve_attempt(
        &self,
        contact: &str,
        id: Uuid,
        max_attempts: u32,
    ) -> Result<AttemptReservation, DomainError> {
        let mut records = self.records.write().await;
        match records.get_mut(contact) {
            Some(record) if record.id == id => {
                if record.attempt_count >= max_attempts {
                    return Ok(AttemptReservation::Exhausted);
                }
                record.attempt_count += 1;
                Ok(AttemptReservation::Reserved(record.attempt_count))
            }
            _ => Ok(AttemptReservation::Missing),
        }
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| !record.is_expired_at(now));
        Ok(before - records.len())
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
