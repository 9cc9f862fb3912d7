pub mod auth;
pub mod routes;
pub mod server;
pub mod types;

pub use auth::{IdentityVerifier, StaticTokenVerifier, VerifiedIdentity};
pub use server::{build_router, serve, AppState};
