use workdesk_server::core::{Config, Server};
use workdesk_server::utils::logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logger::init_logger();

    let config = Config::from_env();
    tracing::info!(
        work_dir = %config.work_dir,
        port = config.http_port,
        "workdesk server starting"
    );

    let server = Server::new(config);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e);
    }
    Ok(())
}
