use super::common::{CommonArgs, build_collector};
use crate::Result;
use crate::server::{AppState, serve, shutdown_signal};
use clap::Parser;
use core::net::SocketAddr;
use ohno::IntoAppError;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Parser, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Address to listen on, overriding `server.listen` from the configuration
    #[arg(long, value_name = "ADDR")]
    pub listen: Option<SocketAddr>,
}

/// Serve `/metrics` until Ctrl+C or SIGTERM.
pub async fn serve_metrics(args: &ServeArgs) -> Result<()> {
    let (config, collector) = build_collector(&args.common)?;

    let listen = args.listen.unwrap_or(config.server.listen);
    let listener = TcpListener::bind(listen)
        .await
        .into_app_err_with(|| format!("unable to listen on {listen}"))?;

    let state = AppState::new(Arc::new(collector), config.server.scrape_timeout);
    serve(listener, state, shutdown_signal()).await
}
