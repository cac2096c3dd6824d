use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

type GenericError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> Result<(), GenericError> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // CORS on is the browser-facing variant; set CORS_ENABLED=false for
    // same-origin deployments.
    let cors_enabled = std::env::var("CORS_ENABLED")
        .map(|value| value != "false" && value != "0")
        .unwrap_or(true);

    let app = airtable_proxy::routes::router(cors_enabled);

    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()?;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
