//! Mock collaborators for testing.
//!
//! In-memory, scripted implementations of every provider trait, for use in
//! unit and integration tests.

pub mod identity;
pub mod session;
pub mod session_backend;
pub mod token_endpoint;

pub use identity::{IdentityCall, MockIdentityClient};
pub use session::MockSessionStore;
pub use session_backend::MockSessionBackend;
pub use token_endpoint::MockTokenEndpoint;
