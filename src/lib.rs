pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod demo;
pub mod domain;
pub mod error;
pub mod mvi;
pub mod navigation;
pub mod screens;
pub mod search;

pub use app::App;
