//! Credential and session lifecycle.
//!
//! Password hashing, signed access tokens, an opaque refresh-token ledger,
//! `Authorization` header parsing and the [`services::SessionService`] that
//! drives login, refresh, revocation and the billing webhook. HTTP routing is
//! left to the embedding application.

pub mod config;
pub mod db;
pub mod dtos;
pub mod models;
pub mod services;
pub mod utils;
