use anyhow::{Context, Result};
use posts_service::db::{ensure_schema, establish_pool};
use posts_service::handler::{serve, AppState};
use posts_service::settings::settings;
use posts_service::utils::{
    log_db_ready, log_db_status, log_server_starting, log_shutdown, log_startup_config,
};
use tokio::net::TcpListener;
use tracing::subscriber::set_global_default;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("posts_service=info".parse()?))
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        );
    set_global_default(subscriber).context("failed to set tracing subscriber")?;

    let s = settings();
    let address = s.socket_addr();

    log_startup_config(
        &address,
        &s.database.url,
        s.database.pool_size,
        s.likes.strategy,
    );

    log_db_status("opening SQLite connection pool...");
    let pool = establish_pool(&s.database).context("failed to create connection pool")?;
    {
        let mut conn = pool.get().context("failed to get initial connection")?;
        ensure_schema(&mut conn).context("failed to prepare posts table")?;
    }
    log_db_ready();

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    log_server_starting(&address);

    serve(listener, AppState::new(pool, s.likes.strategy), shutdown_signal()).await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // Without a signal handler there is nothing to wait for; keep serving.
        std::future::pending::<()>().await;
    }
    log_shutdown();
}
