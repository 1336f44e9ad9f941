use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use tracing::info;

use tourstore::config::Settings;
use tourstore::http;
use tourstore::repository::postgres::create_pool;
use tourstore::repository::PgTourRepository;
use tourstore::{init_logging, TourService};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let settings = Settings::from_env()?;
    let pool = create_pool(&settings.database_url, settings.pool_size)
        .context("Failed to create DB pool")?;
    let service = TourService::new(Arc::new(PgTourRepository::new(pool)), settings.altitude_mode);
    let max_body_bytes = settings.max_body_bytes;

    info!(
        "Listening on {} (altitude {}, body limit {} bytes)",
        settings.bind, settings.altitude_mode, max_body_bytes
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(service.clone()))
            .configure(http::configure::<PgTourRepository>(max_body_bytes))
    })
    .bind(&settings.bind)
    .with_context(|| format!("Failed to bind {}", settings.bind))?
    .run()
    .await?;

    Ok(())
}
