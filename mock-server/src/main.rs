use mock_server::Persistence;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mock_server=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let persistence = Persistence::from_flag(std::env::var("SANDBOX_DURABLE").ok().as_deref());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    mock_server::run_with(listener, persistence).await
}
