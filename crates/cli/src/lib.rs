//! certcheck CLI
//!
//! Commands for running verifications, aggregating their results and
//! delivering the health-check email.

pub mod commands;
pub mod mail;
pub mod output;
