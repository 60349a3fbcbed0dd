//! Composition root wiring repositories, navigation and screens together
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::AppConfig;
use crate::data::{
    AuthRepository, CountryRepository, CuratedImageLibrary, ImageRepository, InMemoryCountryCache,
    SimulatedAuthRepository, StaticCountryApi,
};
use crate::domain::phone::DigitRuleVerifier;
use crate::domain::PhoneNumberVerifier;
use crate::mvi::StateContainer;
use crate::navigation::{AppDestination, Navigator, Router};
use crate::screens::country_picker::CountryPickerState;
use crate::screens::details::ImageDetailsState;
use crate::screens::feed::FeedState;
use crate::screens::login::LoginState;
use crate::screens::registration::RegistrationState;
use crate::screens::{
    CountryPickerScreen, FeedScreen, ImageDetailsScreen, LoginScreen, RegistrationScreen,
};

/// Owns the shared services and builds per-screen state containers on demand.
pub struct App {
    config: AppConfig,
    navigator: Arc<Navigator>,
    auth: Arc<dyn AuthRepository>,
    countries: Arc<CountryRepository>,
    images: Arc<dyn ImageRepository>,
    phone_verifier: Arc<dyn PhoneNumberVerifier>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let latency = config.network_latency();
        Self {
            config,
            navigator: Arc::new(Navigator::new()),
            auth: Arc::new(SimulatedAuthRepository::new(latency)),
            countries: Arc::new(CountryRepository::new(
                Arc::new(InMemoryCountryCache::new()),
                Arc::new(StaticCountryApi::new(latency)),
            )),
            images: Arc::new(CuratedImageLibrary::new(latency)),
            phone_verifier: Arc::new(DigitRuleVerifier),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn navigator(&self) -> Arc<Navigator> {
        Arc::clone(&self.navigator)
    }

    pub fn auth(&self) -> Arc<dyn AuthRepository> {
        Arc::clone(&self.auth)
    }

    pub fn countries(&self) -> Arc<CountryRepository> {
        Arc::clone(&self.countries)
    }

    pub fn images(&self) -> Arc<dyn ImageRepository> {
        Arc::clone(&self.images)
    }

    /// Run the router shell against the navigation bus on its own task.
    pub fn spawn_router(&self, root: AppDestination) -> JoinHandle<()> {
        let commands = self.navigator.commands();
        tokio::spawn(Router::new(root).run(commands))
    }

    pub fn login_screen(&self) -> StateContainer<LoginScreen> {
        StateContainer::with_keep_alive(
            LoginScreen::new(
                Arc::clone(&self.auth),
                Arc::clone(&self.phone_verifier),
                Arc::clone(&self.navigator),
            ),
            LoginState::default(),
            self.config.keep_alive(),
        )
    }

    pub fn registration_screen(&self) -> StateContainer<RegistrationScreen> {
        StateContainer::with_keep_alive(
            RegistrationScreen::new(
                Arc::clone(&self.auth),
                Arc::clone(&self.phone_verifier),
                Arc::clone(&self.navigator),
            ),
            RegistrationState::default(),
            self.config.keep_alive(),
        )
    }

    pub fn country_picker_screen(
        &self,
        initial_code: Option<String>,
    ) -> StateContainer<CountryPickerScreen> {
        StateContainer::with_keep_alive(
            CountryPickerScreen::with_debounce(
                initial_code,
                Arc::clone(&self.countries),
                Arc::clone(&self.navigator),
                self.config.debounce(),
            ),
            CountryPickerState::default(),
            self.config.keep_alive(),
        )
    }

    pub fn feed_screen(&self) -> StateContainer<FeedScreen> {
        StateContainer::with_keep_alive(
            FeedScreen::new(Arc::clone(&self.images), Arc::clone(&self.navigator)),
            FeedState::default(),
            self.config.keep_alive(),
        )
    }

    pub fn image_details_screen(&self, id: i64) -> StateContainer<ImageDetailsScreen> {
        StateContainer::with_keep_alive(
            ImageDetailsScreen::new(id, Arc::clone(&self.images), Arc::clone(&self.navigator)),
            ImageDetailsState::default(),
            self.config.keep_alive(),
        )
    }
}
