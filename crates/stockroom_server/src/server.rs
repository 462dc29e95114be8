use crate::{api, prelude::*, response};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{get, post},
};
use stockroom_core::prelude::*;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// The builder for the Stockroom Server.
#[derive(Clone, Debug, Default)]
pub struct StockroomServer {
    config: StockroomServerConfig,
}

impl StockroomServer {
    pub fn new(config: StockroomServerConfig) -> Self {
        Self { config }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StockroomServerConfig {
    /// The secret used to verify JWT tokens.
    ///
    /// Defaults to `TOP_SECRET`.
    ///
    /// **NOTE:** This should be set to a secure value!
    pub jwt_secret: String,
    /// Who may read a single asset by id.
    ///
    /// Defaults to [`ReadPolicy::OwnerOnly`].
    pub read_policy: ReadPolicy,
    /// Largest accepted request body, image uploads included.
    ///
    /// Defaults to 10 MiB.
    pub max_upload_bytes: usize,
}

pub const DEFAULT_SECRET: &str = "TOP_SECRET";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

impl Default for StockroomServerConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_SECRET.to_string(),
            read_policy: ReadPolicy::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl StockroomServerConfig {
    /// Reads `STOCKROOM_READ_POLICY` and `STOCKROOM_MAX_UPLOAD_BYTES`.
    /// The JWT secret is left at its default; load it with [`CachedSecret`].
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup("STOCKROOM_READ_POLICY") {
            match ReadPolicy::from_name(&raw) {
                Some(policy) => config.read_policy = policy,
                None => warn!("Ignoring invalid STOCKROOM_READ_POLICY '{raw}'"),
            }
        }

        if let Some(raw) = lookup("STOCKROOM_MAX_UPLOAD_BYTES") {
            match raw.trim().parse::<usize>() {
                Ok(bytes) if bytes > 0 => config.max_upload_bytes = bytes,
                _ => warn!("Ignoring invalid STOCKROOM_MAX_UPLOAD_BYTES '{raw}'"),
            }
        }

        config
    }

    pub fn with_jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = secret.into();
        self
    }
}

fn routes<R, B, X, A>() -> Router<AppState<R, B, X, A>>
where
    R: AssetRepository,
    B: BlobStorage,
    X: RecordStore,
    A: AuthProvider,
{
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route(
            "/assets",
            post(api::create_asset::<R, B, X, A>).get(api::list_assets::<R, B, X, A>),
        )
        .route(
            "/assets/{id}",
            get(api::get_asset::<R, B, X, A>)
                .patch(api::update_asset::<R, B, X, A>)
                .delete(api::delete_asset::<R, B, X, A>),
        )
        .route(
            "/assets/{id}/image",
            post(api::upload_image::<R, B, X, A>).get(api::download_image::<R, B, X, A>),
        )
        .route(
            "/assets/{id}/records",
            post(api::create_record::<R, B, X, A>).get(api::list_records::<R, B, X, A>),
        )
        .fallback(|| async { response::error("Not Found", StatusCode::NOT_FOUND) })
}

impl StockroomServer {
    /// Builds the router. `assets` must already be open; the caller owns its lifecycle.
    pub fn build<R, B, X, A>(self, assets: R, blobs: B, records: X, auth: A) -> Router
    where
        R: AssetRepository,
        B: BlobStorage,
        X: RecordStore,
        A: AuthProvider,
    {
        let StockroomServerConfig {
            jwt_secret,
            read_policy,
            max_upload_bytes,
        } = self.config;
        if jwt_secret == DEFAULT_SECRET {
            warn!("Default JWT secret used. Consider setting `jwt_secret` to a secure value!")
        }
        if !assets.is_open() {
            warn!("Asset repository is not open; requests will fail until it is opened");
        }

        let jwt_service = JwtService::new(&jwt_secret);
        let state = AppState {
            assets,
            blobs,
            records,
            auth: JwtAuthProvider::new(jwt_service, auth),
            read_policy,
        };

        routes::<R, B, X, JwtAuthProvider<A>>()
            .layer(DefaultBodyLimit::max(max_upload_bytes))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
