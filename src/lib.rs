#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use
)]

pub mod access;
pub mod app;
pub mod channels;
pub mod cli;
pub mod config;
pub mod error;
pub mod paper;
pub mod pdf;
pub mod providers;
pub mod sessions;

pub use config::Config;
pub use error::BotError;
