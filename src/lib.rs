//! # Accounts (users and sessions)
//!
//! `accounts` is a small user-account service: registration, login and logout
//! through a signed session cookie, self-service profile updates, and
//! administrative user management.
//!
//! ## Credentials
//!
//! Passwords are hashed with **Argon2id** and a random per-record salt before
//! they reach the store. Hashes never leave the service: every response uses a
//! projection that omits the password column.
//!
//! ## Sessions
//!
//! Sessions are stateless. A successful registration or login issues an HS256
//! signed token carrying the user id and an expiry, delivered as an `HttpOnly`
//! cookie. Logout overwrites the cookie with an empty, already-expired value.
//!
//! ## Storage
//!
//! Users live in a single `users` table keyed by a store-assigned UUID. Email
//! addresses are normalized (trimmed, lowercased) and unique at the storage
//! layer, so concurrent registrations for the same address cannot both succeed.

pub mod api;
pub mod cli;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
