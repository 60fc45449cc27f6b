//! Authentication reducers.

pub mod auth;

pub use auth::AuthReducer;
