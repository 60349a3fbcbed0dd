//! Navigation vocabulary shared by screens and the router shell
use serde::{Deserialize, Serialize};

use crate::domain::Country;

/// Result-slot key used to hand a picked country back to the caller.
pub const COUNTRY_CODE_RESULT: &str = "COUNTRY_CODE";

/// Type-safe representation of every destination in the app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppDestination {
    Login,
    Registration,
    /// Picker opened with the currently selected ISO code, if any.
    CountryCodePicker { code: Option<String> },
    Feed,
    ImageDetails { id: i64 },
}

/// Value passed back to a previous screen through the result slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResultValue {
    Country(Country),
    Text(String),
}

/// A navigation intent published on the bus. The router shell translates
/// these into stack operations.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationCommand {
    NavigateTo(AppDestination),
    NavigateBack,
    NavigateAsRoot(AppDestination),
    NavigateBackWithResult { key: String, value: ResultValue },
}
