use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;

use greenprint::args::Args;
use greenprint::{
    AdviceGateway, AppState, GeminiClient, InMemoryStore, RetryPolicy, logger, router,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init();

    let gateway = match &args.api_key {
        Some(key) => {
            let http = reqwest::Client::new();
            let chat = Arc::new(GeminiClient::new(
                http.clone(),
                args.base_url.clone(),
                args.chat_model.clone(),
                key.clone(),
            ));
            let suggest = Arc::new(GeminiClient::new(
                http,
                args.base_url.clone(),
                args.suggest_model.clone(),
                key.clone(),
            ));
            AdviceGateway::new(chat, suggest, RetryPolicy::default())
        }
        None => {
            tracing::warn!("no API key configured, advice endpoints will answer 503");
            AdviceGateway::unconfigured()
        }
    };

    let state = AppState {
        gateway: Arc::new(gateway),
        store: Arc::new(InMemoryStore::new()),
    };
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "serving carbon coach API");
    axum::serve(listener, app).await?;
    Ok(())
}
