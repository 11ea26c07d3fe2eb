use std::sync::Arc;

use actix_web::{App, HttpServer};
use anyhow::Context;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront::config::Config;
use storefront::middleware::RequestId;
use storefront::notifications::{LogNotifier, Notifier, SmtpNotifier};
use storefront::orders::{InMemoryOrderRepository, MySqlOrderRepository, OrderRepository};
use storefront::payments::SimulatedProvider;
use storefront::AppServices;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "storefront=debug,actix_web=info".into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing();
    config.validate().context("Configuration validation failed")?;

    let clock = config.business_clock()?;

    tracing::info!("Starting storefront");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Business UTC offset: {}", clock.offset());

    let repo: Arc<dyn OrderRepository> = match &config.database {
        Some(database) => {
            let pool = database
                .create_pool()
                .await
                .context("Failed to create database pool")?;
            tracing::info!(
                "Database pool initialized ({} connections)",
                database.max_connections
            );

            let repo = MySqlOrderRepository::new(pool);
            repo.migrate().await?;
            Arc::new(repo)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, orders are kept in memory");
            Arc::new(InMemoryOrderRepository::new())
        }
    };

    let notifier: Arc<dyn Notifier> = match &config.mail.smtp {
        Some(smtp) => Arc::new(SmtpNotifier::new(&config.mail, smtp)?),
        None => {
            tracing::warn!("SMTP_HOST not set, notifications are only logged");
            Arc::new(LogNotifier)
        }
    };

    let services = AppServices::new(
        repo,
        Arc::new(SimulatedProvider::new()),
        notifier,
        clock,
        &config.scheduler,
    );

    let scheduler = services.scheduler(&config.scheduler)?;
    for (job, next) in scheduler.next_runs(chrono::Utc::now()) {
        if let Some(next) = next {
            tracing::info!(job = %job, next_run = %next, "Scheduled");
        }
    }
    let triggers = scheduler.start();

    // Start HTTP server
    let bind_address = config.server.bind_address();
    let app_services = services.clone();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestId)
            .wrap(TracingLogger::default())
            .configure(|cfg| app_services.configure(cfg))
    })
    .workers(config.server.workers)
    .bind(&bind_address)?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    let result = server.await;

    for trigger in triggers {
        trigger.abort();
    }
    services.notifications.flush().await;

    result.context("HTTP server failed")
}
