use crate::jwt::JwtService;
use crate::response;
use crate::state::AppState;
use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::Response,
};
use stockroom_core::prelude::*;

/// A wrapper struct indicating a request has been authenticated.
///
/// The wrapped principal is the only identity handlers act on; ids supplied in a
/// request body or query are never trusted in its place.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser(pub Principal);

impl<R, B, X, A> FromRequestParts<AppState<R, B, X, A>> for AuthenticatedUser
where
    R: AssetRepository,
    B: BlobStorage,
    X: RecordStore,
    A: AuthProvider,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<R, B, X, A>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|auth_header| auth_header.to_str().ok())
            .map(|header_str| {
                header_str
                    .strip_prefix("Bearer ")
                    .unwrap_or(header_str)
                    .trim()
            })
            .unwrap_or("");

        match state.auth.verify(token).await {
            Ok(principal) if !principal.id.trim().is_empty() => Ok(AuthenticatedUser(principal)),
            Ok(_) => Err(response::error("Unauthorized", StatusCode::UNAUTHORIZED)),
            Err(e) => Err(response::error_with_cause(
                "Unauthorized",
                StatusCode::UNAUTHORIZED,
                &e,
            )),
        }
    }
}

/// Accepts tokens minted by the server's [`JwtService`] and falls back to `provider`.
#[derive(Clone)]
pub struct JwtAuthProvider<P: AuthProvider> {
    jwt_service: JwtService,
    provider: P,
}

impl<P: AuthProvider> JwtAuthProvider<P> {
    pub fn new(jwt_service: JwtService, provider: P) -> Self {
        Self {
            jwt_service,
            provider,
        }
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }
}

impl<P: AuthProvider> AuthProvider for JwtAuthProvider<P> {
    async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        if let Ok(principal) = self.jwt_service.verify(token) {
            return Ok(principal);
        }

        self.provider.verify(token).await
    }
}
