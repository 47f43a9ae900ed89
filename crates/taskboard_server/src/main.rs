use log::{error, info};
use std::process::ExitCode;
use std::sync::Arc;
use taskboard_core::{init_logging, open_db, open_db_in_memory, SystemClock};
use taskboard_server::{build_router, AppState, ServerConfig};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(&config.log_level, config.log_dir.as_deref()) {
        eprintln!("failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    let conn = match config.database_path.as_deref() {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    };
    let conn = match conn {
        Ok(conn) => conn,
        Err(err) => {
            error!("event=server_start module=http status=error error={err}");
            return ExitCode::FAILURE;
        }
    };

    let state = AppState::new(conn, Arc::new(SystemClock));
    let addr = config.socket_addr();
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("event=server_start module=http status=error addr={addr} error={err}");
            return ExitCode::FAILURE;
        }
    };

    info!("event=server_start module=http status=ok addr={addr}");
    if let Err(err) = axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("event=server_stop module=http status=error error={err}");
        return ExitCode::FAILURE;
    }

    info!("event=server_stop module=http status=ok");
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("event=shutdown_signal module=http status=error error={err}");
    }
}
