use anyhow::Context;
use blob_poster::PosterConfig;
use poster_studio::{ServerConfig, start_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Bind address from env or default
    let bind = std::env::var("BP_BIND").unwrap_or_else(|_| "127.0.0.1:3001".to_string());
    let poster = match std::env::var("BP_CONFIG") {
        Ok(path) => PosterConfig::from_json_file(&path).with_context(|| format!("loading {path}"))?,
        Err(_) => PosterConfig::default(),
    };
    let cfg = ServerConfig {
        bind_addr: bind,
        poster,
        ..ServerConfig::default()
    };

    let handle = start_server(cfg).await?;
    // Park forever
    handle.await.ok();
    Ok(())
}
