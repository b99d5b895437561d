use std::{process, sync::Arc};

use pemuda::{
    application::{error::AppError, repos::Repositories, services::Services},
    cache::{CacheConfig, CacheTrigger, TaggedCache},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, AppState},
        memory::InMemoryRepositories,
        telemetry,
        uploads::UploadStorage,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;

    let cache = Arc::new(TaggedCache::new(CacheConfig::from(&settings.cache)));
    let trigger = CacheTrigger::new(cache);
    let services = Services::new(&repositories, trigger);

    let uploads = Arc::new(
        UploadStorage::new(
            settings.uploads.directory.clone(),
            &settings.uploads.base_url,
            &settings.uploads.cdn_path,
            settings.uploads.max_request_bytes.get(),
        )
        .map_err(|err| AppError::from(InfraError::Io(err)))?,
    );

    if settings.captcha.secret.is_empty() {
        warn!(
            target = "pemuda::bootstrap",
            "captcha secret is not configured"
        );
    }

    let router = http::build_router(AppState { services, uploads });

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        target = "pemuda::bootstrap",
        addr = %settings.server.addr,
        cache_enabled = settings.cache.enabled,
        cache_ttl_secs = settings.cache.ttl.as_secs(),
        "listening"
    );

    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let database_url = postgres_url(&settings)?;
    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(target = "pemuda::bootstrap", "migrations applied");
    Ok(())
}

async fn init_repositories(settings: &config::Settings) -> Result<Repositories, AppError> {
    if settings.database.is_memory() {
        warn!(
            target = "pemuda::bootstrap",
            "using in-memory storage; data is lost on exit"
        );
        return Ok(Repositories::from_backend(Arc::new(
            InMemoryRepositories::new(),
        )));
    }

    let database_url = postgres_url(settings)?;
    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    let repositories = PostgresRepositories::new(pool);
    repositories
        .health_check()
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    Ok(Repositories::from_backend(Arc::new(repositories)))
}

fn postgres_url(settings: &config::Settings) -> Result<&str, AppError> {
    settings
        .database
        .url
        .as_deref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)
}
