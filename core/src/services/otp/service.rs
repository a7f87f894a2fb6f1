//! Main OTP manager implementation

use constant_time_eq::constant_time_eq;
use std::sync::Arc;

use crate::domain::entities::{OtpRecord, OtpState};
use crate::domain::value_objects::Contact;
use crate::errors::{DomainError, DomainResult, OtpError};
use crate::repositories::{AttemptReservation, OtpStore, StorageBackend};
use crate::services::clock::{Clock, SystemClock};
use crate::services::encryption::OtpCipher;
use crate::services::generator::{CodeGenerator, OsRngCodeGenerator};
use crate::services::rate_limit::{RateLimitDecision, RateLimiter};

use super::config::OtpServiceConfig;
use super::traits::DeliveryDispatcher;
use super::types::{IssueOtpResult, SweepResult};

/// OTP manager: owns no record state, every call goes through the store
pub struct OtpService {
    store: Arc<dyn OtpStore>,
    rate_limiter: Arc<dyn RateLimiter>,
    dispatcher: Arc<dyn DeliveryDispatcher>,
    cipher: Arc<dyn OtpCipher>,
    generator: Arc<dyn CodeGenerator>,
    clock: Arc<dyn Clock>,
    config: OtpServiceConfig,
}

impl OtpService {
    /// Create a new OTP manager using the OS random source and the wall clock
    ///
    /// # Arguments
    ///
    /// * `store` - OTP record store
    /// * `rate_limiter` - Issuance rate limiter
    /// * `dispatcher` - Delivery channel for issued codes
    /// * `cipher` - Cipher used to encrypt codes at rest
    /// * `config` - Service configuration
    pub fn new(
        store: Arc<dyn OtpStore>,
        rate_limiter: Arc<dyn RateLimiter>,
        dispatcher: Arc<dyn DeliveryDispatcher>,
        cipher: Arc<dyn OtpCipher>,
        config: OtpServiceConfig,
    ) -> Self {
        Self {
            store,
            rate_limiter,
            dispatcher,
            cipher,
            generator: Arc::new(OsRngCodeGenerator::new()),
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the code generator
    pub fn with_generator(mut self, generator: Arc<dyn CodeGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn config(&self) -> &OtpServiceConfig {
        &self.config
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.store.backend()
    }

    pub fn delivery_channel(&self) -> &str {
        self.dispatcher.channel_name()
    }

    /// Issue a new code for `contact`
    ///
    /// This method:
    /// 1. Checks the rate limiter for every configured key
    /// 2. Generates and encrypts a new code
    /// 3. Stores it, replacing any previous code for the contact
    /// 4. Hands the plaintext code to the delivery dispatcher
    ///
    /// A delivery failure does not roll back the stored record; it is
    /// reported through `IssueOtpResult::delivered`.
    pub async fn issue_otp(
        &self,
        contact: &Contact,
        source_ip: Option<&str>,
    ) -> DomainResult<IssueOtpResult> {
        for key in self.rate_limit_keys(contact, source_ip) {
            if let RateLimitDecision::Limited {
                retry_after_seconds,
            } = self.rate_limiter.check(&key).await?
            {
                tracing::warn!(
                    contact = %contact.masked(),
                    limit_key = key.split(':').next().unwrap_or("unknown"),
                    retry_after_seconds = retry_after_seconds,
                    event = "otp_rate_limited",
                    "OTP issuance rate limit exceeded"
                );
                return Err(OtpError::RateLimited {
                    retry_after_seconds,
                }
                .into());
            }
        }

        let code = self.generator.generate(self.config.code_length).map_err(|e| {
            tracing::error!(
                error = %e,
                event = "otp_generation_failed",
                "Failed to generate verification code"
            );
            e
        })?;
        let encrypted_code = self.cipher.encrypt(&code)?;

        let now = self.clock.now();
        let record = OtpRecord::new(contact, encrypted_code, now, self.config.ttl_seconds);
        let record_id = record.id;
        let expires_at = record.expires_at;

        self.store.put(record).await.map_err(|e| {
            tracing::error!(
                contact = %contact.masked(),
                error = %e,
                event = "otp_storage_failed",
                "Failed to store verification code"
            );
            e
        })?;

        tracing::info!(
            contact = %contact.masked(),
            record_id = %record_id,
            expires_at = %expires_at,
            event = "otp_issued",
            "Issued new verification code"
        );

        let (delivered, message_id) = match self.dispatcher.send(contact, &code).await {
            Ok(receipt) => {
                tracing::debug!(
                    contact = %contact.masked(),
                    channel = %receipt.channel,
                    message_id = %receipt.message_id,
                    "Verification code dispatched"
                );
                (true, Some(receipt.message_id))
            }
            Err(e) => {
                tracing::warn!(
                    contact = %contact.masked(),
                    channel = self.dispatcher.channel_name(),
                    error = %e,
                    event = "otp_delivery_failed",
                    "Failed to deliver verification code"
                );
                (false, None)
            }
        };

        Ok(IssueOtpResult {
            expires_at,
            expires_in_seconds: self.config.ttl_seconds,
            delivered,
            message_id,
        })
    }

    /// Verify a submitted code; `Ok(())` means the code was correct and is now consumed
    pub async fn verify_otp(&self, contact: &Contact, submitted: &str) -> DomainResult<()> {
        let result = self.verify_inner(contact, submitted).await;

        match &result {
            Ok(()) => tracing::info!(
                contact = %contact.masked(),
                event = "otp_verified",
                "Verification code accepted"
            ),
            Err(DomainError::Otp(e)) if e.is_verification_failure() => tracing::warn!(
                contact = %contact.masked(),
                reason = e.kind(),
                event = "otp_verification_failed",
                "Verification code rejected"
            ),
            Err(e) => tracing::error!(
                contact = %contact.masked(),
                error = %e,
                event = "otp_verification_error",
                "Verification could not be completed"
            ),
        }

        result
    }

    async fn verify_inner(&self, contact: &Contact, submitted: &str) -> DomainResult<()> {
        let key = contact.as_str();
        let max_attempts = self.config.max_attempts;

        let record = match self.store.get(key).await? {
            Some(record) => record,
            None => return Err(OtpError::NoActiveOtp.into()),
        };

        match record.state_at(self.clock.now(), max_attempts) {
            OtpState::Expired => {
                self.store.remove_if_current(key, record.id).await?;
                return Err(OtpError::Expired.into());
            }
            OtpState::Exhausted => {
                self.store.remove_if_current(key, record.id).await?;
                return Err(OtpError::Exhausted.into());
            }
            _ => {}
        }

        // Charge the attempt before comparing, so parallel guesses share one budget
        let attempts = match self
            .store
            .reserve_attempt(key, record.id, max_attempts)
            .await?
        {
            AttemptReservation::Reserved(attempts) => attempts,
            AttemptReservation::Exhausted => {
                self.store.remove_if_current(key, record.id).await?;
                return Err(OtpError::Exhausted.into());
            }
            // Consumed by a concurrent verification or replaced by a new issuance
            AttemptReservation::Missing => return Err(OtpError::NoActiveOtp.into()),
        };

        let expected = match self.cipher.decrypt(&record.encrypted_code) {
            Ok(code) => code,
            Err(e) => {
                // A record that cannot be decrypted can never verify
                self.store.remove_if_current(key, record.id).await?;
                return Err(e);
            }
        };

        if constant_time_compare(&expected, submitted) {
            if self.store.remove_if_current(key, record.id).await? {
                return Ok(());
            }
            return Err(OtpError::NoActiveOtp.into());
        }

        if attempts >= max_attempts {
            self.store.remove_if_current(key, record.id).await?;
            return Err(OtpError::Exhausted.into());
        }
        Err(OtpError::InvalidCode {
            remaining_attempts: max_attempts - attempts,
        }
        .into())
    }

    /// Whether a verifiable code is currently stored for `contact`
    pub async fn has_active_otp(&self, contact: &Contact) -> DomainResult<bool> {
        let record = self.store.get(contact.as_str()).await?;
        Ok(record.map_or(false, |r| {
            r.state_at(self.clock.now(), self.config.max_attempts) == OtpState::Pending
        }))
    }

    /// Purge expired records and idle rate limit windows
    pub async fn sweep_expired(&self) -> DomainResult<SweepResult> {
        let mut result = SweepResult::default();

        match self.store.purge_expired(self.clock.now()).await {
            Ok(count) => result.expired_records = count,
            Err(e) => result.errors.push(format!("record purge failed: {}", e)),
        }

        match self.rate_limiter.evict_expired().await {
            Ok(count) => result.rate_limit_keys = count,
            Err(e) => result.errors.push(format!("rate limit eviction failed: {}", e)),
        }

        if result.total_removed() > 0 {
            tracing::debug!(
                expired_records = result.expired_records,
                rate_limit_keys = result.rate_limit_keys,
                event = "otp_sweep_completed",
                "Swept expired OTP state"
            );
        }

        Ok(result)
    }

    /// Limiter keys for an issuance request.
    /// Without a known source address only the contact key applies.
    fn rate_limit_keys(&self, contact: &Contact, source_ip: Option<&str>) -> Vec<String> {
        let scope = self.config.rate_limit_scope;
        let mut keys = Vec::with_capacity(2);

        let ip = source_ip.map(str::trim).filter(|ip| !ip.is_empty());
        if scope.includes_ip() {
            if let Some(ip) = ip {
                keys.push(format!("ip:{}", ip));
            }
        }
        if scope.includes_contact() || (scope.includes_ip() && ip.is_none()) {
            keys.push(format!("contact:{}", contact.as_str()));
        }

        keys
    }
}

/// Constant-time code comparison; a length mismatch is a mismatch
fn constant_time_compare(expected: &str, submitted: &str) -> bool {
    if expected.len() != submitted.len() {
        return false;
    }
    constant_time_eq(expected.as_bytes(), submitted.as_bytes())
}
