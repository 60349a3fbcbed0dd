//! Navigation command bus decoupling screens from the concrete router
pub mod command;
pub mod navigator;
pub mod router;

pub use command::{AppDestination, NavigationCommand, ResultValue, COUNTRY_CODE_RESULT};
pub use navigator::Navigator;
pub use router::Router;
