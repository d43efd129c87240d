//! Page Load - one authgate page load from the command line
//!
//! Runs the orchestrator against the configured identity provider and
//! backend, waits for it to settle and prints the render decision.
//!
//! Run with:
//!
//! ```text
//! AUTHGATE_IDENTITY_CLIENT_ID=... AUTHGATE_IDENTITY_TENANT_ID=... \
//!     cargo run --bin page-load -- "http://localhost:3000/#code=...&state=..."
//! ```
//!
//! Pass `--login` to start an interactive login once settled; the authorize
//! URL is printed instead of opened.

use anyhow::Context;
use authgate::providers::{HttpTokenEndpoint, InMemoryNavigation, RedirectIdentityClient};
use authgate::stores::{CachedSessionStore, HttpSessionBackend};
use authgate::{AppConfig, AuthOrchestrator, OrchestratorEnvironment, RenderDecision};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut login = false;
    let mut location = None;
    for arg in std::env::args().skip(1) {
        if arg == "--login" {
            login = true;
        } else {
            location = Some(arg);
        }
    }

    let config = AppConfig::from_env();
    let location = location.unwrap_or_else(|| config.identity.redirect_uri.clone());
    info!(location = %location, "Loading page");

    let navigation = InMemoryNavigation::at(location);
    let identity = RedirectIdentityClient::new(
        &config.identity,
        navigation.clone(),
        HttpTokenEndpoint::new(config.identity.authority.clone()),
    );
    let backend = HttpSessionBackend::new(&config.session).context("building session client")?;
    let sessions = CachedSessionStore::new(backend, &config.session);

    let environment = OrchestratorEnvironment::new(identity, sessions)
        .with_provider(config.identity.provider_identifiers())
        .with_config(&config.orchestrator);
    let orchestrator = AuthOrchestrator::new(environment);

    orchestrator.start().await.context("starting orchestrator")?;
    let state = tokio::time::timeout(SETTLE_TIMEOUT, orchestrator.settled())
        .await
        .context("auth state did not settle")??;

    match orchestrator.gate().decision() {
        RenderDecision::Ready(_) => println!("ready: {}", describe(&state)),
        RenderDecision::TransientError(error) => println!("error: {error}"),
        RenderDecision::Loading => println!("loading"),
    }
    println!("phases: {:?}", orchestrator.phase_history());

    if login {
        orchestrator.begin_login().await?;
        match navigation.visited().pop() {
            Some(url) => println!("login: {url}"),
            None => warn!("Identity provider not available; no login started"),
        }
    }

    orchestrator.teardown();
    Ok(())
}

fn describe(state: &authgate::ReconciledAuthState) -> String {
    let identity = state.identity.as_ref().map_or_else(
        || "none".to_string(),
        |identity| {
            identity
                .username
                .clone()
                .unwrap_or_else(|| identity.account_identifier.clone())
        },
    );
    let backend = state
        .backend
        .as_ref()
        .map_or_else(|| "none".to_string(), |backend| backend.subject_id.clone());
    format!("identity={identity} backend={backend}")
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "page_load=info,authgate=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
