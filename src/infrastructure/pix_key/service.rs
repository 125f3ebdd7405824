//! Pix key service
//!
//! Enforces the registration rules on top of a repository: format validation,
//! global uniqueness of key values and the per-account quota.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::pix_key::{
    AccountType, KeyType, KeyValidatorRegistry, PixKey, PixKeyId, PixKeyRepository,
};
use crate::domain::DomainError;

/// Default maximum number of keys linked to one agency/account pair
pub const DEFAULT_MAX_KEYS_PER_ACCOUNT: usize = 5;

const ALREADY_REGISTERED: &str = "key already registered for another account holder";
const LIMIT_REACHED: &str = "per-account key limit reached";
const ALREADY_INACTIVE: &str = "key already inactive";
const INACTIVE_NOT_UPDATABLE: &str = "key is inactive and cannot be updated";

/// A storage conflict on an existing key means it was inactivated concurrently
fn lost_to_inactivation(id: &PixKeyId, err: DomainError, rule: &str) -> DomainError {
    match err {
        DomainError::Conflict { .. } => {
            warn!(id = %id, "Pix key inactivated concurrently");
            DomainError::business_rule(rule)
        }
        other => other,
    }
}

/// Quota settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixKeyLimits {
    /// Keys of any status count against this limit
    pub max_keys_per_account: usize,
}

impl Default for PixKeyLimits {
    fn default() -> Self {
        Self {
            max_keys_per_account: DEFAULT_MAX_KEYS_PER_ACCOUNT,
        }
    }
}

/// Request to register a new key
#[derive(Debug, Clone)]
pub struct NewPixKey {
    pub key_type: KeyType,
    pub key_value: String,
    pub account_type: AccountType,
    pub agency: String,
    pub account: String,
    pub holder_name: String,
    pub holder_surname: Option<String>,
}

/// Request to move a key to another account or holder
#[derive(Debug, Clone)]
pub struct UpdatePixKeyAccount {
    pub account_type: AccountType,
    pub agency: String,
    pub account: String,
    pub holder_name: String,
    pub holder_surname: Option<String>,
}

/// Pix key service
pub struct PixKeyService {
    repository: Arc<dyn PixKeyRepository>,
    validators: Arc<KeyValidatorRegistry>,
    limits: PixKeyLimits,
}

impl fmt::Debug for PixKeyService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixKeyService")
            .field("validators", &self.validators.supported_types())
            .field("limits", &self.limits)
            .finish()
    }
}

impl PixKeyService {
    pub fn new(
        repository: Arc<dyn PixKeyRepository>,
        validators: Arc<KeyValidatorRegistry>,
    ) -> Self {
        Self {
            repository,
            validators,
            limits: PixKeyLimits::default(),
        }
    }

    /// Override the quota settings
    pub fn with_limits(mut self, limits: PixKeyLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> PixKeyLimits {
        self.limits
    }

    /// Probe the underlying storage
    pub async fn health_check(&self) -> Result<(), DomainError> {
        self.repository.health_check().await
    }

    /// Register a new key and return its id
    pub async fn create(&self, request: NewPixKey) -> Result<PixKeyId, DomainError> {
        let key_type = request.key_type;
        debug!(key_type = %key_type, "Creating pix key");

        if let Err(e) = self.validators.validate(key_type, &request.key_value) {
            warn!(key_type = %key_type, error = %e, "Rejected pix key format");
            return Err(e);
        }

        let key_value = request.key_value.trim();

        if self.repository.find_by_key_value(key_value).await?.is_some() {
            warn!(key_type = %key_type, "Pix key value already registered");
            return Err(DomainError::business_rule(ALREADY_REGISTERED));
        }

        self.ensure_below_limit(request.agency.trim(), request.account.trim())
            .await?;

        let key = PixKey::create(
            key_type,
            key_value,
            request.account_type,
            &request.agency,
            &request.account,
            &request.holder_name,
            request.holder_surname.as_deref(),
        )?;

        let saved = self.repository.save(key).await.map_err(|e| match e {
            DomainError::Conflict { .. } => {
                warn!(key_type = %key_type, "Pix key value registered concurrently");
                DomainError::business_rule(ALREADY_REGISTERED)
            }
            other => other,
        })?;

        info!(id = %saved.id(), key_type = %key_type, "Pix key created");

        Ok(*saved.id())
    }

    /// Get a key by id
    pub async fn find_by_id(&self, id: &PixKeyId) -> Result<PixKey, DomainError> {
        debug!(id = %id, "Looking up pix key");

        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("pix key not found: {}", id)))
    }

    /// Soft-delete a key
    ///
    /// The status check runs on a loaded snapshot; a concurrent inactivation
    /// that wins the race makes the storage reject this save, so
    /// `inactivated_at` is written once.
    pub async fn inactivate(&self, id: &PixKeyId) -> Result<PixKey, DomainError> {
        let current = self.find_by_id(id).await?;

        let inactive = current.inactivate().inspect_err(|e| {
            warn!(id = %id, error = %e, "Rejected pix key inactivation");
        })?;

        let saved = self
            .repository
            .save(inactive)
            .await
            .map_err(|e| lost_to_inactivation(id, e, ALREADY_INACTIVE))?;
        info!(id = %id, "Pix key inactivated");

        Ok(saved)
    }

    /// Relink a key to another account or holder
    pub async fn update_account(
        &self,
        id: &PixKeyId,
        request: UpdatePixKeyAccount,
    ) -> Result<PixKey, DomainError> {
        let current = self.find_by_id(id).await?;

        if current.is_inactive() {
            warn!(id = %id, "Rejected update of inactive pix key");
            return Err(DomainError::business_rule(INACTIVE_NOT_UPDATABLE));
        }

        let agency = request.agency.trim();
        let account = request.account.trim();

        // Moving within the same account does not change its key count
        if !current.is_linked_to(agency, account) {
            self.ensure_below_limit(agency, account).await?;
        }

        let updated = current.update_account(
            request.account_type,
            agency,
            account,
            &request.holder_name,
            request.holder_surname.as_deref(),
        )?;

        let saved = self
            .repository
            .save(updated)
            .await
            .map_err(|e| lost_to_inactivation(id, e, INACTIVE_NOT_UPDATABLE))?;
        info!(id = %id, agency, account, "Pix key account updated");

        Ok(saved)
    }

    async fn ensure_below_limit(&self, agency: &str, account: &str) -> Result<(), DomainError> {
        let count = self
            .repository
            .count_by_agency_and_account(agency, account)
            .await?;

        if count >= self.limits.max_keys_per_account {
            warn!(
                agency,
                account,
                count,
                limit = self.limits.max_keys_per_account,
                "Per-account pix key limit reached"
            );
            return Err(DomainError::business_rule(LIMIT_REACHED));
        }

        Ok(())
    }
}
