//! Dependency wiring.
//!
//! All collaborators are constructed here and injected as trait objects (no
//! process-global singletons), so the API layer and the tests share one
//! composition path.

use std::sync::Arc;

use mealbridge_accounts::LifecycleManager;
use mealbridge_auth::TokenService;
use mealbridge_core::{AuditLog, UserDirectory};
use mealbridge_infra::{ensure_superadmin, InMemoryAuditLog, InMemoryDirectory};
use mealbridge_notify::{NoopNotifier, Notifier, SmtpNotifier};

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppServices {
    pub directory: Arc<dyn UserDirectory>,
    pub audit: Arc<dyn AuditLog>,
    pub notifier: Arc<dyn Notifier>,
    pub tokens: Arc<TokenService>,
    pub lifecycle: LifecycleManager,
}

impl AppServices {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        audit: Arc<dyn AuditLog>,
        notifier: Arc<dyn Notifier>,
        tokens: Arc<TokenService>,
    ) -> Self {
        let lifecycle = LifecycleManager::new(directory.clone(), audit.clone(), notifier.clone());
        Self {
            directory,
            audit,
            notifier,
            tokens,
            lifecycle,
        }
    }
}

/// Build the full service graph from configuration.
///
/// Fails (rather than falling back to an insecure default) when the token
/// secret is unusable.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let tokens = Arc::new(TokenService::new(&config.jwt_secret)?);

    let notifier: Arc<dyn Notifier> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpNotifier::new(smtp)?),
        None => {
            tracing::info!("no SMTP configuration; notifications will be logged and dropped");
            Arc::new(NoopNotifier)
        }
    };

    let (directory, audit) = build_stores(config).await?;

    let services = AppServices::new(directory, audit, notifier, tokens);

    if let Some(superadmin) = &config.superadmin {
        ensure_superadmin(
            services.directory.as_ref(),
            &superadmin.email,
            &superadmin.password,
        )
        .await?;
    } else {
        tracing::warn!("SUPERADMIN_EMAIL/SUPERADMIN_PASSWORD not set; no bootstrap account");
    }

    Ok(services)
}

#[cfg(feature = "postgres")]
async fn build_stores(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn UserDirectory>, Arc<dyn AuditLog>)> {
    use mealbridge_infra::{migrate, PgAuditLog, PgDirectory};

    match &config.database_url {
        Some(url) => {
            let pool = sqlx::postgres::PgPool::connect(url).await?;
            migrate(&pool).await?;
            tracing::info!("using postgres stores");
            Ok((
                Arc::new(PgDirectory::new(pool.clone())),
                Arc::new(PgAuditLog::new(pool)),
            ))
        }
        None => Ok(in_memory_stores()),
    }
}

#[cfg(not(feature = "postgres"))]
async fn build_stores(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn UserDirectory>, Arc<dyn AuditLog>)> {
    if config.database_url.is_some() {
        tracing::warn!(
            "DATABASE_URL set but the postgres feature is not enabled; using in-memory stores"
        );
    }
    Ok(in_memory_stores())
}

fn in_memory_stores() -> (Arc<dyn UserDirectory>, Arc<dyn AuditLog>) {
    tracing::info!("using in-memory stores; data will not survive a restart");
    (
        Arc::new(InMemoryDirectory::new()),
        Arc::new(InMemoryAuditLog::new()),
    )
}
