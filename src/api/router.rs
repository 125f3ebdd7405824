use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::health;
use super::pix_keys;
use super::state::AppState;

/// Create a minimal router without state (for probes only)
/// Note: /ready endpoint is not available without state
pub fn create_router() -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .layer(TraceLayer::new_for_http())
}

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Pix key registry
        .nest("/pix-keys", pix_keys::create_pix_keys_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::domain::pix_key::{KeyValidatorRegistry, PixKey, PixKeyId, PixKeyRepository};
    use crate::domain::DomainError;
    use crate::infrastructure::pix_key::{InMemoryPixKeyRepository, PixKeyService};

    fn test_state() -> AppState {
        state_with_repository(Arc::new(InMemoryPixKeyRepository::new()))
    }

    fn state_with_repository(repository: Arc<dyn PixKeyRepository>) -> AppState {
        let registry = Arc::new(KeyValidatorRegistry::standard().unwrap());
        AppState::new(Arc::new(PixKeyService::new(repository, registry)))
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn create_body(key_type: &str, key_value: &str) -> Value {
        json!({
            "keyType": key_type,
            "keyValue": key_value,
            "accountType": "corrente",
            "agency": "1234",
            "account": "00001234",
            "holderName": "Ana",
            "holderSurname": "Souza"
        })
    }

    async fn create_key(app: &Router, key_type: &str, key_value: &str) -> String {
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/pix-keys",
                create_body(key_type, key_value),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = create_router_with_state(test_state());

        for uri in ["/health", "/live", "/ready"] {
            let response = app
                .clone()
                .oneshot(empty_request(Method::GET, uri))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_stateless_router_serves_probes() {
        let response = create_router()
            .oneshot(empty_request(Method::GET, "/health"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_returns_location_and_key_is_readable() {
        let app = create_router_with_state(test_state());

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/pix-keys",
                create_body("EMAIL", "ana@example.com"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let location = response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();

        let id = body_json(response).await["id"].as_str().unwrap().to_string();
        assert_eq!(location, format!("/pix-keys/{}", id));

        let response = app
            .oneshot(empty_request(Method::GET, &location))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["keyType"], "EMAIL");
        assert_eq!(body["keyValue"], "ana@example.com");
        assert_eq!(body["accountType"], "corrente");
        assert_eq!(body["status"], "ACTIVE");
        assert!(body.get("inactivatedAt").is_none());
    }

    #[tokio::test]
    async fn test_invalid_key_is_unprocessable() {
        let app = create_router_with_state(test_state());

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/pix-keys",
                create_body("CPF", "529.982.247-24"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["type"], "unprocessable_entity");
        assert_eq!(body["error"]["code"], "invalid_key");
    }

    #[tokio::test]
    async fn test_duplicate_key_is_unprocessable() {
        let app = create_router_with_state(test_state());
        create_key(&app, "PHONE", "+5511987654321").await;

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/pix-keys",
                create_body("PHONE", "+5511987654321"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(
            body["error"]["message"],
            "key already registered for another account holder"
        );
    }

    #[tokio::test]
    async fn test_binding_errors_list_fields() {
        let app = create_router_with_state(test_state());

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/pix-keys",
                json!({ "keyType": "EMAIL", "agency": "12", "holderName": " " }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        let fields = body["error"]["fields"].as_object().unwrap();

        for field in ["keyValue", "accountType", "agency", "account", "holderName"] {
            assert!(fields.contains_key(field), "missing error for {}", field);
        }
        assert!(!fields.contains_key("keyType"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let app = create_router_with_state(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/pix-keys")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{\"keyType\":"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "json_parse_error");
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_ids_are_not_found() {
        let app = create_router_with_state(test_state());

        for uri in [
            format!("/pix-keys/{}", PixKeyId::generate()),
            "/pix-keys/not-a-uuid".to_string(),
        ] {
            let response = app
                .clone()
                .oneshot(empty_request(Method::GET, &uri))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_inactivate_then_again_is_unprocessable() {
        let app = create_router_with_state(test_state());
        let id = create_key(&app, "EMAIL", "ana@example.com").await;
        let uri = format!("/pix-keys/{}/inactivate", id);

        let response = app
            .clone()
            .oneshot(empty_request(Method::POST, &uri))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "INACTIVE");
        assert!(body["inactivatedAt"].is_string());

        let response = app
            .oneshot(empty_request(Method::POST, &uri))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_delete_soft_deletes() {
        let app = create_router_with_state(test_state());
        let id = create_key(&app, "EMAIL", "ana@example.com").await;

        let response = app
            .clone()
            .oneshot(empty_request(Method::DELETE, &format!("/pix-keys/{}", id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(empty_request(Method::GET, &format!("/pix-keys/{}", id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "INACTIVE");
    }

    #[tokio::test]
    async fn test_update_account() {
        let app = create_router_with_state(test_state());
        let id = create_key(&app, "EMAIL", "ana@example.com").await;

        let response = app
            .oneshot(json_request(
                Method::PUT,
                &format!("/pix-keys/{}/account", id),
                json!({
                    "accountType": "poupanca",
                    "agency": "4321",
                    "account": "00004321",
                    "holderName": "Bia"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["accountType"], "poupanca");
        assert_eq!(body["agency"], "4321");
        assert_eq!(body["holderName"], "Bia");
        assert_eq!(body["holderSurname"], "");
        assert_eq!(body["keyValue"], "ana@example.com");
    }

    /// Repository whose storage is unreachable
    struct FailingRepository;

    #[async_trait]
    impl PixKeyRepository for FailingRepository {
        async fn find_by_id(&self, _id: &PixKeyId) -> Result<Option<PixKey>, DomainError> {
            Err(DomainError::storage("connection refused"))
        }

        async fn find_by_key_value(&self, _value: &str) -> Result<Option<PixKey>, DomainError> {
            Err(DomainError::storage("connection refused"))
        }

        async fn count_by_agency_and_account(
            &self,
            _agency: &str,
            _account: &str,
        ) -> Result<usize, DomainError> {
            Err(DomainError::storage("connection refused"))
        }

        async fn save(&self, _key: PixKey) -> Result<PixKey, DomainError> {
            Err(DomainError::storage("connection refused"))
        }

        async fn health_check(&self) -> Result<(), DomainError> {
            Err(DomainError::storage("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces_as_server_error() {
        let app = create_router_with_state(state_with_repository(Arc::new(FailingRepository)));

        let response = app
            .clone()
            .oneshot(empty_request(Method::GET, "/ready"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/pix-keys",
                create_body("EMAIL", "ana@example.com"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
