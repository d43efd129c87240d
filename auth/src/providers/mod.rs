//! Authentication collaborators.
//!
//! This module defines traits for everything the orchestrator talks to, plus
//! the concrete adapters used in production.
//!
//! # Architecture
//!
//! The reducer depends on the [`IdentityClient`] and [`SessionStore`]
//! traits only; concrete types are chosen where the environment is built.
//!
//! ```text
//! IdentityClient ◄── RedirectIdentityClient ──► Navigation     (InMemoryNavigation)
//!                                           └─► TokenEndpoint  (HttpTokenEndpoint)
//!
//! SessionStore   ◄── CachedSessionStore ──────► SessionBackend (HttpSessionBackend)
//! ```
//!
//! This enables:
//! - **Testing**: mocks with scripted outcomes (see `crate::mocks`)
//! - **Production**: the redirect client and the HTTP backend
//! - **Degraded setups**: a redirect client without identifiers runs as a no-op

pub mod identity;
pub mod navigation;
pub mod redirect;
pub mod session;
pub mod token_endpoint;

pub use identity::IdentityClient;
pub use navigation::{InMemoryNavigation, Navigation};
pub use redirect::RedirectIdentityClient;
pub use session::{SessionBackend, SessionEvent, SessionStore};
pub use token_endpoint::{CodeExchange, HttpTokenEndpoint, TokenClient, TokenEndpoint, TokenResponse};
