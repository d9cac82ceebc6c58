//! Session persistence across two storage backends.
//!
//! A login either lands in the durable store ("remember me") or in the
//! ephemeral one, never both. Reads check durable first, then ephemeral.

mod store;

pub use store::{SESSION_KEYS, SessionStore, keys, normalize};
