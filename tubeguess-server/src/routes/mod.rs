//! HTTP route handlers

pub mod config;
pub mod session;
pub mod status;
