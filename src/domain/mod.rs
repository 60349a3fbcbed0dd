//! Domain value types and pure business rules
pub mod country;
pub mod image;
pub mod phone;
pub mod validation;

pub use country::Country;
pub use image::Image;
pub use phone::PhoneNumberVerifier;
pub use validation::ValidationResult;

use serde::{Deserialize, Serialize};

/// How the user authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthMethod {
    EmailPassword,
    Phone,
}

/// Coarse load status of a screen's primary data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Idle,
    Loading,
    Error(String),
}
