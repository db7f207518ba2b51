//! # experience
//!
//! Registration server and admin CLI for the Transform 2026 executive track.
//!
//! The rules live in `experience-core`; this crate adds the HTTP API, the
//! terminal wizard, configuration and CRM sync.

pub mod api;
pub mod cli;
pub mod config;
pub mod crm;
