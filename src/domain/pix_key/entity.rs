//! Pix key entity and related types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::DomainError;

/// Pix key identifier (UUID v4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PixKeyId(Uuid);

impl PixKeyId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl FromStr for PixKeyId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl fmt::Display for PixKeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Syntactic class of a key value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyType {
    /// Individual taxpayer number, 11 digits with two check digits
    Cpf,
    /// Company taxpayer number, 14 digits with two check digits
    Cnpj,
    Email,
    Phone,
    /// Opaque random identifier
    Random,
}

impl KeyType {
    pub const ALL: [KeyType; 5] = [
        KeyType::Cpf,
        KeyType::Cnpj,
        KeyType::Email,
        KeyType::Phone,
        KeyType::Random,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cpf => "CPF",
            Self::Cnpj => "CNPJ",
            Self::Email => "EMAIL",
            Self::Phone => "PHONE",
            Self::Random => "RANDOM",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::validation(format!("invalid key type: {}", s)))
    }
}

/// Error returned when an account type label is not recognized
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid account type: {0}")]
pub struct InvalidAccountType(pub String);

/// Kind of bank account a key resolves to
///
/// Serialized as `"corrente"` / `"poupanca"`. Parsing ignores case,
/// surrounding whitespace and diacritics, so `"CORRENTE"` and `"poupança"`
/// are both accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AccountType {
    Checking,
    Savings,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checking => "corrente",
            Self::Savings => "poupanca",
        }
    }
}

impl FromStr for AccountType {
    type Err = InvalidAccountType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(fold_diacritic)
            .collect();

        match folded.as_str() {
            "corrente" => Ok(Self::Checking),
            "poupanca" => Ok(Self::Savings),
            _ => Err(InvalidAccountType(s.to_string())),
        }
    }
}

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        other => other,
    }
}

impl TryFrom<String> for AccountType {
    type Error = InvalidAccountType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AccountType> for String {
    fn from(account_type: AccountType) -> Self {
        account_type.as_str().to_string()
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyStatus {
    #[default]
    Active,
    /// Terminal: soft-deleted
    Inactive,
}

impl KeyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
        }
    }
}

impl FromStr for KeyStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(Self::Active),
            "INACTIVE" => Ok(Self::Inactive),
            _ => Err(DomainError::validation(format!("invalid key status: {}", s))),
        }
    }
}

/// Every stored field of a [`PixKey`], used by repositories to rehydrate
/// records without going through the creation rules.
#[derive(Debug, Clone)]
pub struct PixKeyParts {
    pub id: PixKeyId,
    pub key_type: KeyType,
    pub key_value: String,
    pub account_type: AccountType,
    pub agency: String,
    pub account: String,
    pub holder_name: String,
    pub holder_surname: String,
    pub status: KeyStatus,
    pub created_at: DateTime<Utc>,
    pub inactivated_at: Option<DateTime<Utc>>,
}

/// Pix key entity
///
/// Snapshots are immutable: `inactivate` and `update_account` return a new
/// value and leave `self` untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct PixKey {
    id: PixKeyId,
    key_type: KeyType,
    /// Trimmed key value, globally unique
    key_value: String,
    account_type: AccountType,
    agency: String,
    account: String,
    holder_name: String,
    /// Empty when the holder has no surname
    holder_surname: String,
    status: KeyStatus,
    created_at: DateTime<Utc>,
    inactivated_at: Option<DateTime<Utc>>,
}

impl PixKey {
    /// Create a new active key with a fresh id, normalizing every field
    pub fn create(
        key_type: KeyType,
        key_value: &str,
        account_type: AccountType,
        agency: &str,
        account: &str,
        holder_name: &str,
        holder_surname: Option<&str>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id: PixKeyId::generate(),
            key_type,
            key_value: require_trimmed("keyValue", key_value)?,
            account_type,
            agency: require_trimmed("agency", agency)?,
            account: require_trimmed("account", account)?,
            holder_name: require_trimmed("holderName", holder_name)?,
            holder_surname: sanitize_optional(holder_surname),
            status: KeyStatus::Active,
            created_at: Utc::now(),
            inactivated_at: None,
        })
    }

    /// Rehydrate a stored key
    pub fn from_parts(parts: PixKeyParts) -> Self {
        Self {
            id: parts.id,
            key_type: parts.key_type,
            key_value: parts.key_value,
            account_type: parts.account_type,
            agency: parts.agency,
            account: parts.account,
            holder_name: parts.holder_name,
            holder_surname: parts.holder_surname,
            status: parts.status,
            created_at: parts.created_at,
            inactivated_at: parts.inactivated_at,
        }
    }

    // Getters

    pub fn id(&self) -> &PixKeyId {
        &self.id
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn key_value(&self) -> &str {
        &self.key_value
    }

    pub fn account_type(&self) -> AccountType {
        self.account_type
    }

    pub fn agency(&self) -> &str {
        &self.agency
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn holder_name(&self) -> &str {
        &self.holder_name
    }

    pub fn holder_surname(&self) -> &str {
        &self.holder_surname
    }

    pub fn status(&self) -> KeyStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn inactivated_at(&self) -> Option<DateTime<Utc>> {
        self.inactivated_at
    }

    pub fn is_inactive(&self) -> bool {
        self.status == KeyStatus::Inactive
    }

    /// Whether this key is linked to the given agency/account pair
    pub fn is_linked_to(&self, agency: &str, account: &str) -> bool {
        self.agency == agency && self.account == account
    }

    // Transitions

    /// Soft-delete the key. Fails if it is already inactive.
    pub fn inactivate(&self) -> Result<Self, DomainError> {
        if self.is_inactive() {
            return Err(DomainError::business_rule("key already inactive"));
        }

        Ok(Self {
            status: KeyStatus::Inactive,
            inactivated_at: Some(Utc::now()),
            ..self.clone()
        })
    }

    /// Replace the linked account and holder. Fails if the key is inactive.
    pub fn update_account(
        &self,
        account_type: AccountType,
        agency: &str,
        account: &str,
        holder_name: &str,
        holder_surname: Option<&str>,
    ) -> Result<Self, DomainError> {
        if self.is_inactive() {
            return Err(DomainError::business_rule(
                "key is inactive and cannot be updated",
            ));
        }

        Ok(Self {
            account_type,
            agency: require_trimmed("agency", agency)?,
            account: require_trimmed("account", account)?,
            holder_name: require_trimmed("holderName", holder_name)?,
            holder_surname: sanitize_optional(holder_surname),
            ..self.clone()
        })
    }
}

fn require_trimmed(field: &str, value: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{} is required", field)));
    }

    Ok(trimmed.to_string())
}

fn sanitize_optional(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_key() -> PixKey {
        PixKey::create(
            KeyType::Email,
            "  ana@example.com ",
            AccountType::Checking,
            " 1234",
            "00001234 ",
            " Ana ",
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_create_normalizes_fields() {
        let key = create_test_key();

        assert_eq!(key.key_type(), KeyType::Email);
        assert_eq!(key.key_value(), "ana@example.com");
        assert_eq!(key.agency(), "1234");
        assert_eq!(key.account(), "00001234");
        assert_eq!(key.holder_name(), "Ana");
        assert_eq!(key.holder_surname(), "");
        assert_eq!(key.status(), KeyStatus::Active);
        assert!(key.inactivated_at().is_none());
    }

    #[test]
    fn test_create_trims_surname() {
        let key = PixKey::create(
            KeyType::Random,
            "abcdefghijklmnopqrstuvwxyz012345",
            AccountType::Savings,
            "1234",
            "00001234",
            "Ana",
            Some("  Silva "),
        )
        .unwrap();

        assert_eq!(key.holder_surname(), "Silva");
    }

    #[test]
    fn test_create_assigns_distinct_ids() {
        let a = create_test_key();
        let b = create_test_key();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_create_rejects_blank_required_fields() {
        let result = PixKey::create(
            KeyType::Email,
            "ana@example.com",
            AccountType::Checking,
            "1234",
            "00001234",
            "   ",
            None,
        );

        assert!(matches!(result, Err(DomainError::Validation { .. })));

        let result = PixKey::create(
            KeyType::Email,
            " ",
            AccountType::Checking,
            "1234",
            "00001234",
            "Ana",
            None,
        );

        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[test]
    fn test_inactivate_once() {
        let key = create_test_key();
        let inactive = key.inactivate().unwrap();

        assert_eq!(inactive.status(), KeyStatus::Inactive);
        assert!(inactive.inactivated_at().is_some());
        assert_eq!(inactive.id(), key.id());
        assert_eq!(inactive.key_value(), key.key_value());
        assert_eq!(inactive.created_at(), key.created_at());

        // the previous snapshot is untouched
        assert_eq!(key.status(), KeyStatus::Active);
    }

    #[test]
    fn test_inactivate_twice_fails() {
        let inactive = create_test_key().inactivate().unwrap();
        let result = inactive.inactivate();

        match result {
            Err(DomainError::BusinessRule { message }) => {
                assert_eq!(message, "key already inactive")
            }
            other => panic!("expected business rule violation, got {:?}", other),
        }
    }

    #[test]
    fn test_update_account_replaces_account_fields_only() {
        let key = create_test_key();
        let updated = key
            .update_account(
                AccountType::Savings,
                "4321",
                " 00009999",
                "Bia",
                Some("Souza"),
            )
            .unwrap();

        assert_eq!(updated.account_type(), AccountType::Savings);
        assert_eq!(updated.agency(), "4321");
        assert_eq!(updated.account(), "00009999");
        assert_eq!(updated.holder_name(), "Bia");
        assert_eq!(updated.holder_surname(), "Souza");

        assert_eq!(updated.id(), key.id());
        assert_eq!(updated.key_type(), key.key_type());
        assert_eq!(updated.key_value(), key.key_value());
        assert_eq!(updated.status(), key.status());
        assert_eq!(updated.created_at(), key.created_at());
        assert_eq!(updated.inactivated_at(), key.inactivated_at());
    }

    #[test]
    fn test_update_account_on_inactive_key_fails() {
        let inactive = create_test_key().inactivate().unwrap();
        let result = inactive.update_account(
            AccountType::Checking,
            "1234",
            "00001234",
            "Ana",
            None,
        );

        assert!(matches!(result, Err(DomainError::BusinessRule { .. })));
    }

    #[test]
    fn test_is_linked_to() {
        let key = create_test_key();
        assert!(key.is_linked_to("1234", "00001234"));
        assert!(!key.is_linked_to("1234", "00001235"));
    }

    #[test]
    fn test_account_type_serialization() {
        assert_eq!(
            serde_json::to_string(&AccountType::Checking).unwrap(),
            "\"corrente\""
        );
        assert_eq!(
            serde_json::to_string(&AccountType::Savings).unwrap(),
            "\"poupanca\""
        );
    }

    #[test]
    fn test_account_type_lenient_parsing() {
        let parse = |s: &str| serde_json::from_str::<AccountType>(s);

        assert_eq!(parse("\"CORRENTE\"").unwrap(), AccountType::Checking);
        assert_eq!(parse("\" corrente \"").unwrap(), AccountType::Checking);
        assert_eq!(parse("\"poupança\"").unwrap(), AccountType::Savings);
        assert_eq!(parse("\"Poupanca\"").unwrap(), AccountType::Savings);
        assert!(parse("\"investimento\"").is_err());
    }

    #[test]
    fn test_account_type_error_message() {
        let err = "investimento".parse::<AccountType>().unwrap_err();
        assert_eq!(err.to_string(), "invalid account type: investimento");
    }

    #[test]
    fn test_key_type_json_names() {
        assert_eq!(serde_json::to_string(&KeyType::Cpf).unwrap(), "\"CPF\"");
        assert_eq!(serde_json::to_string(&KeyType::Random).unwrap(), "\"RANDOM\"");
        assert_eq!(
            serde_json::from_str::<KeyType>("\"CNPJ\"").unwrap(),
            KeyType::Cnpj
        );
        assert_eq!("phone".parse::<KeyType>().unwrap(), KeyType::Phone);
    }

    #[test]
    fn test_key_status_round_trip() {
        assert_eq!(
            serde_json::to_string(&KeyStatus::Inactive).unwrap(),
            "\"INACTIVE\""
        );
        assert_eq!("ACTIVE".parse::<KeyStatus>().unwrap(), KeyStatus::Active);
        assert!("DELETED".parse::<KeyStatus>().is_err());
    }

    #[test]
    fn test_pix_key_id_parse() {
        let id = PixKeyId::generate();
        let parsed: PixKeyId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<PixKeyId>().is_err());
    }
}
