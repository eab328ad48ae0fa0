//! Client core for the iparental parental-control app.
//!
//! This crate owns the session: the authenticated parent, their child
//! profiles, and the selection state the UI renders from. Screens call the
//! [`store::SessionStore`] actions and re-render from its snapshots; the
//! remote backend, the OS keyring, the platform biometric sensor, and the
//! on-disk session blob are all reached through the collaborator seams in
//! [`gateway`], [`credentials`], [`biometric`], and [`persist`].

pub mod biometric;
pub mod config;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod models;
pub mod persist;
pub mod store;
pub mod validation;

pub use error::StoreError;
pub use store::{SessionState, SessionStore};
