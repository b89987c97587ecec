// src/services/api_server.rs
//! API Server for the eligibility attestor
//!
//! REST interface in front of the issuer and verifier:
//! - `GET  /` liveness and verifier address
//! - `POST /attest` evaluate eligibility and return a signed attestation
//! - `POST /verify` off-chain check of an attestation
//! - `GET  /audit-log` recent issuance decisions

use crate::error::AttestationError;
use crate::models::request::{AttestRequest, AttestResponse, VerifyRequest, VerifyResponse};
use crate::services::attestation_issuer::AttestationIssuer;
use crate::services::audit::{AuditRecord, AuditTrail};
use crate::services::verifier::Verifier;
use axum::{
    extract::{rejection::JsonRejection, Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use ethers::utils::to_checksum;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Upper bound for `GET /audit-log?limit=`.
const MAX_AUDIT_PAGE: usize = 200;

/// Response for the liveness probe
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    status: String,
    verifier_address: String,
    default_policy_id: String,
    audit_records: usize,
}

#[derive(Deserialize)]
struct AuditLogQuery {
    limit: Option<usize>,
}

/// Response containing recent issuance decisions
#[derive(Serialize, Deserialize)]
struct AuditLogResponse {
    logs: Vec<AuditRecord>,
}

/// API server state containing all service dependencies
#[derive(Clone)]
pub struct ApiServer {
    /// Service for issuing attestations
    issuer: Arc<AttestationIssuer>,

    /// Service for verifying attestations against our own address
    verifier: Verifier,

    audit: Arc<AuditTrail>,
}

impl ApiServer {
    /// Creates a new instance of the API server
    ///
    /// # Arguments
    /// * `issuer` - Attestation issuer
    /// * `verifier` - Verifier trusting the issuer's address
    /// * `audit` - Audit trail shared with the issuer
    pub fn new(issuer: AttestationIssuer, verifier: Verifier, audit: Arc<AuditTrail>) -> Self {
        ApiServer {
            issuer: Arc::new(issuer),
            verifier,
            audit,
        }
    }

    /// Builds the router with all routes and middleware.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(Self::status_handler))
            .route("/attest", post(Self::attest_handler))
            .route("/verify", post(Self::verify_handler))
            .route("/audit-log", get(Self::audit_log_handler))
            .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
            .with_state(Arc::new(self.clone()))
    }

    /// Starts the API server and serves until the listener fails.
    pub async fn run(&self, addr: SocketAddr) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        log::info!("attestor listening on http://{}", addr);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }

    /// Liveness check with the number of retained audit records
    ///
    /// # Endpoint
    /// GET /
    async fn status_handler(State(state): State<Arc<ApiServer>>) -> impl IntoResponse {
        Json(StatusResponse {
            status: "ok".into(),
            verifier_address: to_checksum(&state.issuer.verifier_address(), None),
            default_policy_id: state.issuer.default_policy_id().to_string(),
            audit_records: state.audit.len(),
        })
    }

    /// Evaluates eligibility and returns a signed attestation
    ///
    /// # Endpoint
    /// POST /attest
    ///
    /// # Responses
    /// - 200 OK: `{eligible, policyId, signature, verifierAddress}`
    /// - 400 Bad Request: missing/malformed field or unknown policy
    /// - 422 Unprocessable Entity: attribute out of range
    /// - 500 Internal Server Error: opaque, detail logged
    async fn attest_handler(
        State(state): State<Arc<ApiServer>>,
        payload: Result<Json<AttestRequest>, JsonRejection>,
    ) -> Result<Json<AttestResponse>, AttestationError> {
        let Json(payload) = payload.map_err(bad_body)?;
        match state.issuer.handle(&payload) {
            Ok(response) => {
                log::info!(
                    "attestation issued: policy={} eligible={}",
                    response.policy_id,
                    response.eligible
                );
                Ok(Json(response))
            }
            Err(e) => {
                log::warn!("attestation refused: {}", e);
                Err(e)
            }
        }
    }

    /// Verifies an attestation against this service's signer
    ///
    /// # Endpoint
    /// POST /verify
    ///
    /// # Responses
    /// - 200 OK: `{valid, verifierAddress}`; `valid: false` is a normal answer
    /// - 400 Bad Request: body is not a verify request
    async fn verify_handler(
        State(state): State<Arc<ApiServer>>,
        payload: Result<Json<VerifyRequest>, JsonRejection>,
    ) -> Result<impl IntoResponse, AttestationError> {
        let Json(payload) = payload.map_err(bad_body)?;
        let valid = state.verifier.verify_encoded(
            &payload.subject,
            &payload.policy_id,
            payload.eligible,
            &payload.signature,
        );
        Ok((
            StatusCode::OK,
            Json(VerifyResponse {
                valid,
                verifier_address: to_checksum(&state.verifier.trusted_verifier(), None),
            }),
        ))
    }

    /// Retrieves recent issuance decisions
    ///
    /// # Endpoint
    /// GET /audit-log?limit=N
    async fn audit_log_handler(
        State(state): State<Arc<ApiServer>>,
        Query(query): Query<AuditLogQuery>,
    ) -> impl IntoResponse {
        let limit = query.limit.unwrap_or(50).min(MAX_AUDIT_PAGE);
        Json(AuditLogResponse {
            logs: state.audit.recent(limit),
        })
    }
}

/// Unparseable or mistyped JSON is a client error like any missing field.
fn bad_body(rejection: JsonRejection) -> AttestationError {
    AttestationError::BadRequest(rejection.body_text())
}
