//! # Rusty-Forum Binary
//!
//! The entry point that assembles the application based on compile-time features.

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use rf_api::{configure_routes, middleware, AppState};
use rf_config::{LogSettings, Settings};
use rf_core::{ForumService, ThreadStore, UserDirectory};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[cfg(feature = "db-sqlite")]
use rf_db_sqlite::SqliteForumRepo;

#[cfg(all(feature = "store-memory", not(feature = "db-sqlite")))]
use rf_store_memory::{MemoryThreadStore, MemoryUserDirectory};

#[cfg(not(any(feature = "db-sqlite", feature = "store-memory")))]
compile_error!("enable one of the `db-sqlite` or `store-memory` features");

type Ports = (Arc<dyn ThreadStore>, Arc<dyn UserDirectory>);

#[cfg(feature = "db-sqlite")]
async fn build_ports(settings: &Settings) -> anyhow::Result<Ports> {
    let repo = SqliteForumRepo::new(&settings.database.url, settings.database.max_connections)
        .await
        .context("failed to initialise SQLite store")?;
    let repo = Arc::new(repo);
    Ok((repo.clone(), repo))
}

#[cfg(all(feature = "store-memory", not(feature = "db-sqlite")))]
async fn build_ports(_settings: &Settings) -> anyhow::Result<Ports> {
    tracing::warn!("using the in-memory store; nothing will be persisted");
    Ok((Arc::new(MemoryThreadStore::new()), Arc::new(MemoryUserDirectory::new())))
}

/// `RUST_LOG` wins over the configured filter when set.
fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("invalid configuration")?;
    init_tracing(&settings.log);
    if let Some(path) = &settings.env_file {
        debug!(path = %path.display(), "loaded .env");
    }

    let (store, directory) = build_ports(&settings).await?;
    let state = web::Data::new(AppState {
        service: ForumService::new(store, directory, settings.service_options()),
    });

    let (host, port) = settings.bind_address();
    info!("Rusty-Forum starting on http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::standard_middleware())
            .wrap(middleware::cors_policy())
            .configure(configure_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    Ok(())
}
