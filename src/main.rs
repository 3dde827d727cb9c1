use std::sync::Arc;
use std::time::Duration;
use tokenward::api;
use tokenward::logger::*;
use tokenward::server::*;
use tokenward::settings::*;
use tokio::signal;
use warp::Filter;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    info!(?project_settings);
    logger.reload_from_config(&LogConfig::from(&project_settings.log))?;

    if cli.check_config {
        info!("settings are valid");
        return Ok(());
    }

    let address: std::net::SocketAddr = project_settings.http.address.parse()?;

    let server = Arc::new(Server::try_new(&project_settings).await?);

    let api_v1 = warp::path("api")
        .and(warp::path("v1"))
        .and(api::v1::routes(server.auth_service.clone()))
        .recover(api::v1::recover_error);

    let bound = warp::serve(api_v1).try_bind_with_graceful_shutdown(address, async {
        if let Err(e) = signal::ctrl_c().await {
            error!("could not listen for SIGINT: {}", e);
        }
    });
    let (bound, serving) = match bound {
        Ok(bound) => bound,
        Err(e) => {
            error!(%address, "could not bind: {}", e);
            shutdown(&server).await;
            return Err(e.into());
        }
    };
    info!(%bound, "listening");
    serving.await;

    shutdown(&server).await;

    Ok(())
}

/// Waits at most `SHUTDOWN_TIMEOUT`. An expiry sweep still running at the
/// deadline is abandoned and reported.
async fn shutdown(server: &Server) {
    match tokio::time::timeout(SHUTDOWN_TIMEOUT, server.shutdown()).await {
        Ok(_) => info!("server shutdown successfully"),
        Err(_) => match server.sweep_running_since() {
            Some(started_at) => error!(
                %started_at,
                "server shutdown timed out; abandoning in-flight expiry sweep"
            ),
            None => error!("server shutdown timed out"),
        },
    }
}
