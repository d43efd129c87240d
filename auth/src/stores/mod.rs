//! Session store implementations.
//!
//! - [`CachedSessionStore`]: cache, retries and change events over any
//!   [`SessionBackend`](crate::providers::SessionBackend)
//! - [`HttpSessionBackend`]: the application backend over HTTP
//! - [`ListenerRegistry`] / [`Subscription`]: listener bookkeeping shared by
//!   every store, including the mocks

pub mod listeners;
pub mod session_cache;
pub mod session_http;

pub use listeners::{ListenerRegistry, Subscription};
pub use session_cache::CachedSessionStore;
pub use session_http::HttpSessionBackend;
