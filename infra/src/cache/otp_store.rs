//! Redis-backed OTP record store
//!
//! Each contact maps to one hash at `otp:record:{sha256(contact)}` holding the
//! record id, the base64 ciphertext, timestamps (unix millis) and the attempt
//! count. Redis expires the key at `expires_at`, so no sweeping is needed.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use redis::Script;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use otp_core::{
    AttemptReservation, DomainError, EncryptedCode, OtpRecord, OtpStore, StorageBackend,
};
use otp_shared::contact::mask_contact;

use super::redis_client::RedisClient;
use crate::InfrastructureError;

const RECORD_NAMESPACE: &str = "otp:record";

/// Delete the hash only while it still holds the given issuance
const REMOVE_IF_CURRENT: &str = r#"
if redis.call('HGET', KEYS[1], 'id') == ARGV[1] then
    return redis.call('DEL', KEYS[1])
end
return 0
"#;

/// Charge one attempt while the hash holds the given issuance and its budget
/// (ARGV[2]) is not used up. Returns the new count, 0 when exhausted and -1
/// when the issuance is gone.
const RESERVE_ATTEMPT: &str = r#"
if redis.call('HGET', KEYS[1], 'id') ~= ARGV[1] then
    return -1
end
local attempts = tonumber(redis.call('HGET', KEYS[1], 'attempts') or '0')
if attempts >= tonumber(ARGV[2]) then
    return 0
end
return redis.call('HINCRBY', KEYS[1], 'attempts', 1)
"#;

/// OTP store persisting records in Redis hashes
pub struct RedisOtpStore {
    client: Arc<RedisClient>,
    remove_script: Script,
    reserve_script: Script,
}

impl RedisOtpStore {
    pub fn new(client: Arc<RedisClient>) -> Self {
        Self {
            client,
            remove_script: Script::new(REMOVE_IF_CURRENT),
            reserve_script: Script::new(RESERVE_ATTEMPT),
        }
    }

    fn record_key(&self, contact: &str) -> String {
        self.client.hashed_key(RECORD_NAMESPACE, contact)
    }
}

#[async_trait]
impl OtpStore for RedisOtpStore {
    async fn get(&self, contact: &str) -> Result<Option<OtpRecord>, DomainError> {
        let key = self.record_key(contact);
        let mut conn = self.client.connection();

        let fields: HashMap<String, String> = redis::cmd("HGETALL")
            .arg(&key)
            .query_async(&mut conn)
            .await
            .map_err(InfrastructureError::from)?;

        if fields.is_empty() {
            return Ok(None);
        }

        Ok(Some(record_from_fields(contact, &fields)?))
    }

    async fn put(&self, record: OtpRecord) -> Result<(), DomainError> {
        let key = self.record_key(&record.contact);
        let mut conn = self.client.connection();

        let expires_at_ms = record.expires_at.timestamp_millis();
        let fields = [
            ("id", record.id.to_string()),
            ("code", record.encrypted_code.to_base64()),
            ("created_at", record.created_at.timestamp_millis().to_string()),
            ("expires_at", expires_at_ms.to_string()),
            ("attempts", record.attempt_count.to_string()),
        ];

        // Replace the previous issuance and set its expiry in one transaction
        redis::pipe()
            .atomic()
            .del(&key)
            .ignore()
            .hset_multiple(&key, &fields)
            .ignore()
            .cmd("PEXPIREAT")
            .arg(&key)
            .arg(expires_at_ms)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(InfrastructureError::from)?;

        debug!(
            contact = %mask_contact(&record.contact),
            record_id = %record.id,
            "Stored OTP record in Redis"
        );
        Ok(())
    }

    async fn delete(&self, contact: &str) -> Result<bool, DomainError> {
        let key = self.record_key(contact);
        let mut conn = self.client.connection();

        let removed: i64 = redis::cmd("DEL")
            .arg(&key)
            .query_async(&mut conn)
            .await
            .map_err(InfrastructureError::from)?;
        Ok(removed > 0)
    }

    async fn remove_if_current(&self, contact: &str, id: Uuid) -> Result<bool, DomainError> {
        let key = self.record_key(contact);
        let mut conn = self.client.connection();

        let removed: i64 = self
            .remove_script
            .key(&key)
            .arg(id.to_string())
            .invoke_async(&mut conn)
            .await
            .map_err(InfrastructureError::from)?;
        Ok(removed > 0)
    }

    async fn reserve_attempt(
        &self,
        contact: &str,
        id: Uuid,
        max_attempts: u32,
    ) -> Result<AttemptReservation, DomainError> {
        let key = self.record_key(contact);
        let mut conn = self.client.connection();

        let reply: i64 = self
            .reserve_script
            .key(&key)
            .arg(id.to_string())
            .arg(max_attempts)
            .invoke_async(&mut conn)
            .await
            .map_err(InfrastructureError::from)?;

        Ok(reservation_from_reply(reply))
    }

    async fn purge_expired(&self, _now: DateTime<Utc>) -> Result<usize, DomainError> {
        // Keys carry PEXPIREAT; Redis removes them itself
        Ok(0)
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Redis
    }
}

fn reservation_from_reply(reply: i64) -> AttemptReservation {
    match reply {
        r if r < 0 => AttemptReservation::Missing,
        0 => AttemptReservation::Exhausted,
        r => AttemptReservation::Reserved(u32::try_from(r).unwrap_or(u32::MAX)),
    }
}

fn record_from_fields(
    contact: &str,
    fields: &HashMap<String, String>,
) -> Result<OtpRecord, InfrastructureError> {
    let field = |name: &str| {
        fields
            .get(name)
            .ok_or_else(|| InfrastructureError::Serialization(format!("missing field '{}'", name)))
    };

    let id = Uuid::parse_str(field("id")?)
        .map_err(|e| InfrastructureError::Serialization(format!("invalid id: {}", e)))?;
    let encrypted_code = EncryptedCode::from_base64(field("code")?)
        .map_err(|e| InfrastructureError::Serialization(format!("invalid code: {}", e)))?;
    let attempt_count = field("attempts")?
        .parse::<u32>()
        .map_err(|e| InfrastructureError::Serialization(format!("invalid attempts: {}", e)))?;

    Ok(OtpRecord {
        id,
        contact: contact.to_string(),
        encrypted_code,
        created_at: parse_millis(field("created_at")?)?,
        expires_at: parse_millis(field("expires_at")?)?,
        attempt_count,
    })
}

fn parse_millis(raw: &str) -> Result<DateTime<Utc>, InfrastructureError> {
    raw.parse::<i64>()
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .ok_or_else(|| InfrastructureError::Serialization(format!("invalid timestamp: {}", raw)))
}
