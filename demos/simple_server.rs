use stockroom::prelude::*;
use stockroom::server::DEFAULT_SECRET;
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockroom_server=debug,tower_http=debug".into()),
        )
        .init();

    // Secrets are read once and reused for the lifetime of the process
    let secret = CachedSecret::new(EnvSecretSource, "STOCKROOM_JWT_SECRET");
    let jwt_secret = match secret.get().await {
        Ok(value) => value.to_string(),
        Err(e) => {
            warn!("{e}, falling back to the default secret");
            DEFAULT_SECRET.to_string()
        }
    };
    let config = StockroomServerConfig::from_env().with_jwt_secret(jwt_secret);

    // Providers
    let assets = InMemoryAssetRepository::new();
    assets.open().await?;
    let blobs = FileSystemBlobStorage::new("./stockroom_data");
    let records = InMemoryRecordStore::new();

    // Don't use this in production! Every request is accepted as `dev_user`
    let auth = AllowAllAuth;

    let app = StockroomServer::new(config).build(assets.clone(), blobs, records, auth);

    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    assets.close().await?;
    info!("Shut down");
    Ok(())
}
