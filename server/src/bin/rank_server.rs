use clap::Parser;

use server::{run_server, ServerArgs, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = ServerArgs::parse();
    let config = ServerConfig::load(&args)?;
    log::info!(
        "config: bind={} port={} data_dir={} database={} pool_size={}",
        config.bind,
        config.port,
        config.data_dir.display(),
        config.database,
        config.pool_size
    );

    if let Err(e) = run_server(config).await {
        log::error!("rank-server stopped: {e:#}");
        return Err(e);
    }
    Ok(())
}
