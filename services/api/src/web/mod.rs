pub mod auth;
pub mod challenges;
pub mod insight;
pub mod middleware;
pub mod profile;
pub mod protocol;
pub mod rest;
pub mod state;
pub mod validate;

// Re-export the router builder and validation entry points to make them easily
// accessible to the binaries and integration tests.
pub use middleware::require_auth;
pub use rest::{build_router, ApiDoc};
pub use validate::{validate, validate_body, RequestPart, ValidatedParams, ValidatedQuery};
