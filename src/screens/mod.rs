//! Screen modules: per-screen state, events, effects, reducer and async
//! event handling
//!
//! Each screen follows the same shape: a plain `*State` value, closed
//! `*Event`/`*Effect` enums, a [`Reducer`](crate::mvi::Reducer) impl for the
//! pure transitions, and a [`ScreenLogic`](crate::mvi::ScreenLogic) impl for
//! everything that touches collaborators.
pub mod country_picker;
pub mod details;
pub mod feed;
pub mod login;
pub mod registration;

pub use country_picker::CountryPickerScreen;
pub use details::ImageDetailsScreen;
pub use feed::FeedScreen;
pub use login::LoginScreen;
pub use registration::RegistrationScreen;
