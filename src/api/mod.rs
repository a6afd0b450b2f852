//! # API Module
//!
//! HTTP endpoints served by the short-lived local server during
//! `likesync auth`.
//!
//! - [`callback`] - Receives the authorization code from Spotify and exchanges
//!   it, together with the PKCE code verifier, for an access token.
//! - [`health`] - Reports status and version, handy to check that the
//!   redirect URI points at the right address.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use likesync::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
