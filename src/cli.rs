//! Command line interface
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Entryflow - onboarding and image feed client
#[derive(Parser)]
#[command(name = "entryflow")]
#[command(about = "Login, registration and image feed demo client")]
#[command(version)]
pub struct Cli {
    /// Configuration file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Screen to start on
    #[arg(long, value_enum, default_value_t = StartScreen::Login)]
    pub start: StartScreen,

    /// Tracing filter, e.g. "debug" or "entryflow=trace"
    #[arg(long)]
    pub log_filter: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StartScreen {
    Login,
    Registration,
    Feed,
}

impl StartScreen {
    pub fn destination(self) -> crate::navigation::AppDestination {
        match self {
            StartScreen::Login => crate::navigation::AppDestination::Login,
            StartScreen::Registration => crate::navigation::AppDestination::Registration,
            StartScreen::Feed => crate::navigation::AppDestination::Feed,
        }
    }
}
