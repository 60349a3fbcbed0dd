//! Data layer: repositories orchestrating local and remote sources
//!
//! Storage and transport drivers stay behind the source traits; the bundled
//! implementations are an in-memory cache, a canned remote country set, a
//! simulated auth backend, and a curated image library.
pub mod auth_repository;
pub mod country_repository;
pub mod image_repository;

pub use auth_repository::{AuthRepository, SimulatedAuthRepository};
pub use country_repository::{
    CountryLocalSource, CountryRemoteSource, CountryRepository, InMemoryCountryCache,
    StaticCountryApi,
};
pub use image_repository::{CuratedImageLibrary, ImageRepository};
