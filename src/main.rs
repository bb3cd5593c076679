use clap::Parser;
use shotkit::server::{self, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Website screenshot service with simulated browser chrome
#[derive(Debug, Parser)]
#[command(name = "shotkit", version, about)]
struct Cli {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Root directory for batch capture output (served under /files)
    #[arg(long, env = "SHOTKIT_OUTPUT_DIR", default_value = "capturas")]
    output_dir: std::path::PathBuf,

    /// Base URL clients reach this server at, used for url_local links
    #[arg(long, env = "SHOTKIT_PUBLIC_BASE")]
    public_base: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    std::fs::create_dir_all(&cli.output_dir)?;
    let public_base = cli
        .public_base
        .unwrap_or_else(|| format!("http://localhost:{}", cli.port));

    let state = AppState {
        output_root: cli.output_dir.canonicalize()?,
        public_base,
    };
    let app = server::router(state);

    let addr = format!("{}:{}", cli.bind, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "shotkit listening");
    info!("POST /screenshot - single capture");
    info!("POST /capturar - batch capture");
    info!("GET /test?url=... - quick batch test");

    axum::serve(listener, app).await?;
    Ok(())
}
