//! Core SPIMF library (backend client, session, editor, countdown, config).

pub mod auth;
pub mod client;
pub mod config;
pub mod countdown;
pub mod dashboard;
pub mod editor;
pub mod error;
pub mod logging;
pub mod member;
pub mod portal;
pub mod profile;
pub mod session;
