use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kidsearch::api::{create_router, AppState};
use kidsearch::config::Config;
use kidsearch::elastic::ElasticClient;
use kidsearch::embeddings::EmbeddingProvider;
use kidsearch::models::SearchMethod;
use kidsearch::render;
use kidsearch::services::SearchService;

#[derive(Parser)]
#[command(name = "kidsearch")]
#[command(about = "Kids product search over Elasticsearch with hybrid retrieval and reranking")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the web UI and JSON API (default)
    Serve,
    /// Run one search method and print the results
    Search {
        /// Search query
        query: String,
        /// full-pipeline, hybrid-rrf, vector or bm25
        #[arg(short, long, default_value = "full-pipeline")]
        method: SearchMethod,
        /// Number of results (3-12)
        #[arg(short, long)]
        limit: Option<u32>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Run every method side by side
    Compare {
        /// Search query
        query: String,
        /// Number of results per method (3-12)
        #[arg(short, long)]
        limit: Option<u32>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kidsearch=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    config.validate()?;

    let elastic = ElasticClient::new(&config.elasticsearch)?;
    tracing::info!("Elasticsearch endpoint: {}", elastic.base_url());

    tracing::info!("Loading embedding model: {}...", config.embeddings.model);
    let embeddings = EmbeddingProvider::new(&config.embeddings)?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, elastic, embeddings).await,
        Command::Search {
            query,
            method,
            limit,
            json,
        } => {
            let service = SearchService::new(elastic, embeddings, &config);
            let outcome = service.search(method, &query, limit).await?;
            if json {
                println!("{}", render::outcome_json(outcome)?);
            } else {
                print!("{}", render::render_outcome(&outcome));
            }
            Ok(())
        }
        Command::Compare { query, limit, json } => {
            let service = SearchService::new(elastic, embeddings, &config);
            let comparison = service.compare(&query, limit).await?;
            if json {
                println!("{}", render::comparison_json(comparison)?);
            } else {
                print!("{}", render::render_comparison(&comparison));
            }
            Ok(())
        }
    }
}

async fn serve(
    config: Config,
    elastic: ElasticClient,
    embeddings: EmbeddingProvider,
) -> anyhow::Result<()> {
    if config.server.api_keys.is_empty() {
        tracing::warn!("KIDSEARCH_API_KEYS is not set - search endpoints are public");
    }

    match elastic.ping().await {
        Ok(info) => tracing::info!(
            cluster = %info.cluster_name,
            version = %info.version.number,
            "Connected to Elasticsearch"
        ),
        Err(e) => tracing::warn!(
            "Elasticsearch is unreachable: {} - searches will fail until it recovers",
            e
        ),
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, elastic, embeddings);
    let app = create_router(state);

    tracing::info!("Kidsearch starting on http://{}", addr);
    tracing::info!("  Web UI:       http://{}/", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);
    tracing::info!("  API docs:     http://{}/api/v1/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/v1/openapi.json", addr);

    let cancel_token = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel_token.clone()));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(cancel_token.cancelled_owned())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
    cancel_token.cancel();
}
