//! Application bootstrap.
//!
//! 1. Connect the repositories (`PostgreSQL` with migrations, or memory)
//! 2. Seed the configured admin
//! 3. Select the mail provider and build the geocoder
//! 4. Build the stores and the router state
//! 5. Serve until Ctrl+C, then drain the stores
//!
//! ```rust,ignore
//! let config = Config::from_env();
//! let services = Services::from_config(&config).await?;
//! let state = build_state(services, AppSettings::from_config(&config));
//! serve(&config, state).await?;
//! ```

use crate::admin::{DashboardEnvironment, DashboardReducer, DashboardState};
use crate::auth::setup::{build_auth_store, build_guard, memory_auth_environment, postgres_auth_environment};
use crate::checkout::{CheckoutEnvironment, CheckoutReducer, CheckoutRetention, CheckoutState};
use crate::config::{Config, StorageBackend};
use crate::geocoding::{GeocodeError, Geocoder, NominatimGeocoder};
use crate::map::MapConfig;
use crate::server::{build_router, AppState};
use crate::store::{EventRepository, InMemoryStore, PostgresStore, ReservationRepository};
use billetterie_auth::stores::InMemoryAdminDirectory;
use billetterie_auth::{AuthConfig, AuthEnvironment, AuthError};
use billetterie_core::environment::{Clock, SystemClock};
use billetterie_mail::{build_notifier, BookingNotifier, MailError};
use billetterie_runtime::Store;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Startup failures.
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database connection failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Admin seeding failed.
    #[error("Admin setup error: {0}")]
    Auth(#[from] AuthError),

    /// Mail provider could not be built.
    #[error("Mail setup error: {0}")]
    Mail(#[from] MailError),

    /// Geocoding client could not be built.
    #[error("Geocoder setup error: {0}")]
    Geocoder(#[from] GeocodeError),

    /// Listener could not be bound.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything the stores and handlers depend on.
#[derive(Clone)]
pub struct Services {
    /// Event storage
    pub events: Arc<dyn EventRepository>,
    /// Reservation storage
    pub reservations: Arc<dyn ReservationRepository>,
    /// Admin directory, sessions, clock and guard policy
    pub auth: AuthEnvironment,
    /// Booking confirmation sender
    pub notifier: Arc<dyn BookingNotifier>,
    /// Address lookup
    pub geocoder: Arc<dyn Geocoder>,
}

impl Services {
    /// Connect every collaborator described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError`] if a connection, migration, admin seed or
    /// provider setup fails.
    pub async fn from_config(config: &Config) -> Result<Self, BootstrapError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let policy = config.guard_policy().map_err(BootstrapError::Config)?;
        let auth_config = AuthConfig::new(policy).with_session_ttl(config.session_ttl());

        let notifier = build_notifier(&config.to_mail_config()?)?;
        let geocoder: Arc<dyn Geocoder> = Arc::new(NominatimGeocoder::new(
            config.geocoder.base_url.clone(),
            &config.geocoder.user_agent,
            Duration::from_secs(config.geocoder.timeout),
        )?);

        match config.storage {
            StorageBackend::Postgres => {
                tracing::info!("Connecting to database...");
                let pool = PgPoolOptions::new()
                    .max_connections(config.postgres.max_connections)
                    .acquire_timeout(Duration::from_secs(config.postgres.connect_timeout))
                    .connect(&config.postgres.url)
                    .await?;

                tracing::info!("Running migrations...");
                sqlx::migrate!("./migrations").run(&pool).await?;

                let auth = postgres_auth_environment(&pool, Arc::clone(&clock), auth_config);
                if let (Some(email), Some(password)) = (&config.admin.email, &config.admin.password) {
                    auth.directory.ensure_admin(email, password).await?;
                    tracing::info!(admin = %email, "Admin account ensured");
                }

                let store = Arc::new(PostgresStore::new(pool));
                Ok(Self {
                    events: store.clone(),
                    reservations: store,
                    auth,
                    notifier,
                    geocoder,
                })
            },
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage, data is lost on restart");
                let directory = match (&config.admin.email, &config.admin.password) {
                    (Some(email), Some(password)) => InMemoryAdminDirectory::with_admin(email, password)?,
                    _ => {
                        tracing::warn!("ADMIN_EMAIL/ADMIN_PASSWORD not set, admin login disabled");
                        InMemoryAdminDirectory::new()
                    },
                };

                let store = Arc::new(InMemoryStore::new(Arc::clone(&clock)));
                Ok(Self {
                    events: store.clone(),
                    reservations: store,
                    auth: memory_auth_environment(directory, clock, auth_config),
                    notifier,
                    geocoder,
                })
            },
        }
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("auth", &self.auth)
            .field("notifier", &self.notifier.name())
            .field("geocoder", &self.geocoder.name())
            .finish_non_exhaustive()
    }
}

/// Settings of the stores and handlers that are not collaborators.
#[derive(Debug, Clone)]
pub struct AppSettings {
    /// Map tiles
    pub map: MapConfig,
    /// How long a handler waits for a reducer's answer
    pub request_timeout: Duration,
    /// Checkout session lifetimes
    pub checkout_retention: CheckoutRetention,
}

impl AppSettings {
    /// Settings described by `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            map: config.map.clone(),
            request_timeout: config.request_timeout(),
            checkout_retention: config.checkout_retention(),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            map: MapConfig::default(),
            request_timeout: Duration::from_secs(10),
            checkout_retention: CheckoutRetention::default(),
        }
    }
}

/// Build the stores and the shared router state.
#[must_use]
pub fn build_state(services: Services, settings: AppSettings) -> AppState {
    let checkout = Store::new(
        CheckoutState::default(),
        CheckoutReducer::new(),
        CheckoutEnvironment::new(
            Arc::clone(&services.reservations),
            services.notifier,
            Arc::clone(&services.auth.clock),
        )
        .with_retention(settings.checkout_retention),
    );
    let dashboard = Store::new(
        DashboardState::default(),
        DashboardReducer::new(),
        DashboardEnvironment::new(Arc::clone(&services.events), Arc::clone(&services.reservations)),
    );
    let guard = build_guard(&services.auth);

    AppState {
        events: services.events,
        reservations: services.reservations,
        checkout: Arc::new(checkout),
        dashboard: Arc::new(dashboard),
        auth: build_auth_store(services.auth),
        guard,
        geocoder: services.geocoder,
        map: Arc::new(settings.map),
        request_timeout: settings.request_timeout,
    }
}

/// Serve HTTP until Ctrl+C, then drain the stores.
///
/// # Errors
///
/// Returns [`BootstrapError::Io`] if the listener cannot be bound or the
/// server fails.
pub async fn serve(config: &Config, state: AppState) -> Result<(), BootstrapError> {
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(addr = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, build_router(state.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped, draining stores...");
    state.shutdown(config.shutdown_timeout()).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %error, "Failed to listen for Ctrl+C");
        return;
    }
    tracing::info!("Shutdown signal received");
}
