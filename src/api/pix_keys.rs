//! Pix key endpoints

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    routing::{get, post, put},
    Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::{Validate, ValidationError};

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::pix_key::{AccountType, KeyStatus, KeyType, PixKey, PixKeyId};
use crate::infrastructure::pix_key::{NewPixKey, UpdatePixKeyAccount};

static AGENCY_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{4}$").unwrap());
static ACCOUNT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{8}$").unwrap());

/// Routes mounted under `/pix-keys`
pub fn create_pix_keys_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_pix_key))
        .route("/{id}", get(get_pix_key).delete(delete_pix_key))
        .route("/{id}/inactivate", post(inactivate_pix_key))
        .route("/{id}/account", put(update_pix_key_account))
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("must not be blank".into());
        return Err(error);
    }

    Ok(())
}

/// Request to register a Pix key
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePixKeyRequest {
    #[validate(required(message = "is required"))]
    pub key_type: Option<KeyType>,
    #[validate(
        required(message = "is required"),
        length(max = 77, message = "must have at most 77 characters"),
        custom(function = "not_blank")
    )]
    pub key_value: Option<String>,
    #[validate(required(message = "is required"))]
    pub account_type: Option<AccountType>,
    #[validate(
        required(message = "is required"),
        regex(path = *AGENCY_PATTERN, message = "must have exactly 4 digits")
    )]
    pub agency: Option<String>,
    #[validate(
        required(message = "is required"),
        regex(path = *ACCOUNT_PATTERN, message = "must have exactly 8 digits")
    )]
    pub account: Option<String>,
    #[validate(
        required(message = "is required"),
        length(max = 30, message = "must have at most 30 characters"),
        custom(function = "not_blank")
    )]
    pub holder_name: Option<String>,
    #[validate(length(max = 45, message = "must have at most 45 characters"))]
    pub holder_surname: Option<String>,
}

/// Request to relink a Pix key to another account or holder
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePixKeyAccountRequest {
    #[validate(required(message = "is required"))]
    pub account_type: Option<AccountType>,
    #[validate(
        required(message = "is required"),
        regex(path = *AGENCY_PATTERN, message = "must have exactly 4 digits")
    )]
    pub agency: Option<String>,
    #[validate(
        required(message = "is required"),
        regex(path = *ACCOUNT_PATTERN, message = "must have exactly 8 digits")
    )]
    pub account: Option<String>,
    #[validate(
        required(message = "is required"),
        length(max = 30, message = "must have at most 30 characters"),
        custom(function = "not_blank")
    )]
    pub holder_name: Option<String>,
    #[validate(length(max = 45, message = "must have at most 45 characters"))]
    pub holder_surname: Option<String>,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::bad_request(format!("{} is required", field)).with_param(field))
}

impl TryFrom<CreatePixKeyRequest> for NewPixKey {
    type Error = ApiError;

    fn try_from(request: CreatePixKeyRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            key_type: required(request.key_type, "keyType")?,
            key_value: required(request.key_value, "keyValue")?,
            account_type: required(request.account_type, "accountType")?,
            agency: required(request.agency, "agency")?,
            account: required(request.account, "account")?,
            holder_name: required(request.holder_name, "holderName")?,
            holder_surname: request.holder_surname,
        })
    }
}

impl TryFrom<UpdatePixKeyAccountRequest> for UpdatePixKeyAccount {
    type Error = ApiError;

    fn try_from(request: UpdatePixKeyAccountRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            account_type: required(request.account_type, "accountType")?,
            agency: required(request.agency, "agency")?,
            account: required(request.account, "account")?,
            holder_name: required(request.holder_name, "holderName")?,
            holder_surname: request.holder_surname,
        })
    }
}

/// Body returned after a key is registered
#[derive(Debug, Clone, Serialize)]
pub struct CreatedPixKeyResponse {
    pub id: String,
}

/// Pix key as returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PixKeyResponse {
    pub id: String,
    pub key_type: KeyType,
    pub key_value: String,
    pub account_type: AccountType,
    pub agency: String,
    pub account: String,
    pub holder_name: String,
    pub holder_surname: String,
    pub status: KeyStatus,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactivated_at: Option<String>,
}

impl From<&PixKey> for PixKeyResponse {
    fn from(key: &PixKey) -> Self {
        Self {
            id: key.id().to_string(),
            key_type: key.key_type(),
            key_value: key.key_value().to_string(),
            account_type: key.account_type(),
            agency: key.agency().to_string(),
            account: key.account().to_string(),
            holder_name: key.holder_name().to_string(),
            holder_surname: key.holder_surname().to_string(),
            status: key.status(),
            created_at: key.created_at().to_rfc3339(),
            inactivated_at: key.inactivated_at().map(|at| at.to_rfc3339()),
        }
    }
}

/// Ids that do not parse cannot name a stored key
fn parse_id(raw: &str) -> Result<PixKeyId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::not_found(format!("pix key not found: {}", raw)))
}

/// POST /pix-keys
pub async fn create_pix_key(
    State(state): State<AppState>,
    Json(request): Json<CreatePixKeyRequest>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<CreatedPixKeyResponse>), ApiError>
{
    request.validate()?;
    let request = NewPixKey::try_from(request)?;

    debug!(key_type = %request.key_type, "Registering pix key");

    let id = state.pix_key_service.create(request).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/pix-keys/{}", id))],
        Json(CreatedPixKeyResponse { id: id.to_string() }),
    ))
}

/// GET /pix-keys/{id}
pub async fn get_pix_key(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PixKeyResponse>, ApiError> {
    let id = parse_id(&id)?;
    let key = state.pix_key_service.find_by_id(&id).await?;

    Ok(Json(PixKeyResponse::from(&key)))
}

/// POST /pix-keys/{id}/inactivate
pub async fn inactivate_pix_key(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PixKeyResponse>, ApiError> {
    let id = parse_id(&id)?;
    debug!(id = %id, "Inactivating pix key");

    let key = state.pix_key_service.inactivate(&id).await?;

    Ok(Json(PixKeyResponse::from(&key)))
}

/// PUT /pix-keys/{id}/account
pub async fn update_pix_key_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdatePixKeyAccountRequest>,
) -> Result<Json<PixKeyResponse>, ApiError> {
    let id = parse_id(&id)?;
    request.validate()?;
    let request = UpdatePixKeyAccount::try_from(request)?;

    debug!(id = %id, "Updating pix key account");

    let key = state.pix_key_service.update_account(&id, request).await?;

    Ok(Json(PixKeyResponse::from(&key)))
}

/// DELETE /pix-keys/{id}
///
/// Soft delete: the key is inactivated and stays queryable.
pub async fn delete_pix_key(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    debug!(id = %id, "Deleting pix key");

    state.pix_key_service.inactivate(&id).await?;

    Ok(StatusCode::NO_CONTENT)
}
