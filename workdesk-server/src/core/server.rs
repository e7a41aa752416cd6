//! HTTP server lifecycle

use std::net::SocketAddr;
use std::time::Duration;

use crate::api;
use crate::core::{AppState, Config};

pub struct Server {
    config: Config,
    state: Option<AppState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Run over pre-built state (tests)
    pub fn with_state(config: Config, state: AppState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    /// Bind and serve until ctrl-c
    pub async fn run(&self) -> anyhow::Result<()> {
        let state = match &self.state {
            Some(state) => state.clone(),
            None => AppState::initialize(&self.config).await?,
        };

        let app = api::build_app(&state);
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));

        let handle = axum_server::Handle::new();
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown signal received");
                shutdown_handle.graceful_shutdown(Some(Duration::from_secs(10)));
            }
        });

        tracing::info!(%addr, environment = %self.config.environment, "workdesk server listening");

        axum_server::bind(addr)
            .handle(handle)
            .serve(app.into_make_service())
            .await?;

        tracing::info!("server stopped");
        Ok(())
    }
}
