//! Plaza - community messaging core.
//!
//! Store-and-forward private mail between members plus real-time,
//! location-bound chat rooms, served over one HTTP process (REST API and
//! WebSocket gateway), with a client runtime that keeps UI state
//! consistent with both.

pub mod auth;
pub mod chat;
pub mod client;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod logging;
pub mod mail;
pub mod web;

pub use config::Config;
pub use db::{Database, DbPool, NewUser, User, UserRepository, UserSummary};
pub use error::{PlazaError, Result};
pub use web::WebServer;
