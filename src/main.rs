use std::{process, sync::Arc};

use foglio::{
    application::{
        blogs::BlogService,
        error::AppError,
        repos::{BlogsRepo, BlogsWriteRepo, EngagementRepo, SessionsRepo, UsersRepo},
        sessions::{AdminDirectory, SessionService},
        users::UserService,
    },
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, AppState},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
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
    let (_cli, settings) = config::load_with_cli()
        .map_err(|err| AppError::config(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    let repositories = init_repositories(&settings).await?;
    let state = build_state(repositories.clone(), &settings);

    serve(&settings, state, repositories).await
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool =
        PostgresRepositories::connect(database_url, settings.database.max_connections.get())
            .await
            .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_state(repositories: Arc<PostgresRepositories>, settings: &config::Settings) -> AppState {
    let users_repo: Arc<dyn UsersRepo> = repositories.clone();
    let sessions_repo: Arc<dyn SessionsRepo> = repositories.clone();
    let blogs_repo: Arc<dyn BlogsRepo> = repositories.clone();
    let blogs_write_repo: Arc<dyn BlogsWriteRepo> = repositories.clone();
    let engagement_repo: Arc<dyn EngagementRepo> = repositories;

    let session_ttl = settings
        .auth
        .session_ttl
        .map(|ttl| time::Duration::try_from(ttl).unwrap_or(time::Duration::WEEK));

    AppState {
        blogs: Arc::new(BlogService::new(
            blogs_repo,
            blogs_write_repo,
            engagement_repo,
        )),
        users: Arc::new(UserService::new(users_repo.clone())),
        sessions: Arc::new(SessionService::new(sessions_repo, users_repo, session_ttl)),
        admins: Arc::new(AdminDirectory::new(&settings.auth.admin_emails)),
    }
}

async fn serve(
    settings: &config::Settings,
    state: AppState,
    repositories: Arc<PostgresRepositories>,
) -> Result<(), AppError> {
    let router = http::build_router(state).merge(http::health_router(repositories));

    let listener = tokio::net::TcpListener::bind(settings.server.listen_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "foglio::server",
        addr = %settings.server.listen_addr,
        "listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to install shutdown handler");
    }
}
