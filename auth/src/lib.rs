//! # Authgate
//!
//! Dual-identity authentication for a single page load: an external identity
//! provider reached through browser redirects, and an application backend
//! session, reconciled into one state that gates protected UI.
//!
//! ## Features
//!
//! - **Ordered**: the identity client is initialized before any redirect
//!   response is completed
//! - **Single source of truth**: one [`ReconciledAuthState`], published after
//!   every transition
//! - **Never blocking forever**: a failed redirect shows a transient error,
//!   then settles unauthenticated after a bounded delay
//! - **Degraded modes**: missing provider identifiers or an unreachable
//!   backend both mean "absent", never a crash
//! - **Testable**: the orchestration is a pure reducer with scripted mocks
//!
//! ## Architecture
//!
//! The orchestrator is a reducer running in an authgate [`Store`](authgate_runtime::Store):
//!
//! ```text
//! Action → Reducer → (State, Effects) → Effect Execution → More Actions
//!                       │
//!                       └─► watch channel ─► AuthStateReader / RenderGate
//! ```
//!
//! ## Example: page load
//!
//! ```rust,ignore
//! use authgate::*;
//!
//! let config = AppConfig::from_env();
//! let environment = OrchestratorEnvironment::new(identity, sessions)
//!     .with_provider(config.identity.provider_identifiers())
//!     .with_config(&config.orchestrator);
//!
//! let orchestrator = AuthOrchestrator::new(environment);
//! orchestrator.start().await?;
//!
//! match orchestrator.gate().decision() {
//!     RenderDecision::Loading => render_nothing(),
//!     RenderDecision::TransientError(error) => show_banner(&error),
//!     RenderDecision::Ready(state) => render_protected(&state),
//! }
//! ```

// Public modules
pub mod actions;
pub mod config;
pub mod constants;
pub mod environment;
pub mod error;
pub mod gate;
pub mod orchestrator;
pub mod providers;
pub mod reducers;
pub mod state;
pub mod stores;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use actions::OrchestratorAction;
pub use config::{AppConfig, IdentityConfig, OrchestratorConfig, ProviderIdentifiers, SessionConfig};
pub use environment::OrchestratorEnvironment;
pub use error::{AuthError, ErrorDescriptor, ErrorKind, Result};
pub use gate::{AuthStateReader, RenderDecision, RenderGate};
pub use orchestrator::AuthOrchestrator;
pub use providers::{IdentityClient, SessionEvent, SessionStore};
pub use reducers::OrchestratorReducer;
pub use state::{
    AuthPhase, BackendSession, IdentitySession, OrchestratorState, ReconciledAuthState,
    RedirectOutcome,
};
