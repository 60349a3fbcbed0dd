//! Country picker screen: debounced search over the country directory
//!
//! The search pipeline runs off the container's raw state stream, so every
//! query edit restarts the settle window and at most one directory fetch is
//! in flight at a time. Picking a country resolves it to a full record and
//! hands it back to the caller through the navigation result slot.
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use tokio::time::Duration;

use crate::data::CountryRepository;
use crate::domain::{Country, Status};
use crate::mvi::{Reducer, ScreenLogic, StateContainer};
use crate::navigation::{Navigator, ResultValue, COUNTRY_CODE_RESULT};
use crate::search::{self, FetchAttempt, DEFAULT_DEBOUNCE};

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CountryPickerState {
    pub search_query: String,
    pub selected_country_code: Option<String>,
    pub status: Status,
    pub countries: Vec<Country>,
}

impl Default for CountryPickerState {
    fn default() -> Self {
        Self {
            search_query: String::new(),
            selected_country_code: None,
            status: Status::Loading,
            countries: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub enum CountryPickerEvent {
    SearchQueryChanged(String),
    /// User picked a country from the list, by ISO code.
    CountrySelected(String),
    /// Retry after a failed load.
    LoadCountries,
    BackButtonClicked,

    SelectedCodeInitialized(String),
    LoadCountriesSuccess(Vec<Country>),
    LoadCountriesFailed(String),
}

#[derive(Debug)]
pub enum CountryPickerEffect {}

pub struct CountryPickerScreen {
    initial_code: Option<String>,
    countries: Arc<CountryRepository>,
    navigator: Arc<Navigator>,
    debounce: Duration,
    latest_attempt: Arc<AtomicU64>,
}

impl CountryPickerScreen {
    pub fn new(
        initial_code: Option<String>,
        countries: Arc<CountryRepository>,
        navigator: Arc<Navigator>,
    ) -> Self {
        Self::with_debounce(initial_code, countries, navigator, DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(
        initial_code: Option<String>,
        countries: Arc<CountryRepository>,
        navigator: Arc<Navigator>,
        debounce: Duration,
    ) -> Self {
        Self {
            initial_code,
            countries,
            navigator,
            debounce,
            latest_attempt: Arc::new(AtomicU64::new(0)),
        }
    }
}

/// Forward every emission of one directory fetch into the container, unless a
/// newer attempt has superseded this one in the meantime.
async fn fetch_countries(
    repository: Arc<CountryRepository>,
    container: StateContainer<CountryPickerScreen>,
    query: String,
    attempt: FetchAttempt,
) {
    let mut results = repository.get_countries(&query);
    while let Some(result) = results.recv().await {
        if !attempt.is_current() {
            tracing::debug!(seq = attempt.seq(), "dropping result of superseded fetch");
            break;
        }
        match result {
            Ok(countries) => {
                container.set_state(CountryPickerEvent::LoadCountriesSuccess(countries))
            }
            Err(error) => {
                container.set_state(CountryPickerEvent::LoadCountriesFailed(error.to_string()))
            }
        }
    }
}

impl Reducer for CountryPickerScreen {
    type State = CountryPickerState;
    type Event = CountryPickerEvent;
    type Effect = CountryPickerEffect;

    fn reduce(
        &self,
        previous: &CountryPickerState,
        event: &CountryPickerEvent,
    ) -> (CountryPickerState, Option<CountryPickerEffect>) {
        let mut state = previous.clone();
        match event {
            CountryPickerEvent::SearchQueryChanged(query) => {
                state.search_query = query.clone();
                (state, None)
            }
            CountryPickerEvent::SelectedCodeInitialized(code)
            | CountryPickerEvent::CountrySelected(code) => {
                state.selected_country_code = Some(code.clone());
                (state, None)
            }
            CountryPickerEvent::LoadCountries => {
                state.status = Status::Loading;
                (state, None)
            }
            CountryPickerEvent::LoadCountriesSuccess(countries) => {
                state.countries = countries.clone();
                state.status = Status::Idle;
                (state, None)
            }
            CountryPickerEvent::LoadCountriesFailed(error) => {
                state.status = Status::Error(error.clone());
                (state, None)
            }
            CountryPickerEvent::BackButtonClicked => (state, None),
        }
    }
}

impl ScreenLogic for CountryPickerScreen {
    fn initial_load(&self, container: &StateContainer<Self>) {
        if let Some(code) = self.initial_code.clone() {
            container.set_state(CountryPickerEvent::SelectedCodeInitialized(code));
        }

        let repository = Arc::clone(&self.countries);
        let dispatcher = container.clone();
        let fetch = move |query: String, attempt: FetchAttempt| {
            fetch_countries(Arc::clone(&repository), dispatcher.clone(), query, attempt)
        };
        container.spawn_guarded(
            search::run_pipeline(
                container.state_watch(),
                self.debounce,
                Arc::clone(&self.latest_attempt),
                |state: &CountryPickerState| state.search_query.clone(),
                fetch,
            ),
            CountryPickerEvent::LoadCountriesFailed,
        );
    }

    fn handle_event(&self, container: &StateContainer<Self>, event: CountryPickerEvent) {
        match event {
            CountryPickerEvent::LoadCountries => {
                container.set_state(CountryPickerEvent::LoadCountries);
                let query = container.current_state().search_query;
                let attempt = FetchAttempt::begin(&self.latest_attempt);
                let repository = Arc::clone(&self.countries);
                let dispatcher = container.clone();
                container.spawn_guarded(
                    fetch_countries(repository, dispatcher, query, attempt),
                    CountryPickerEvent::LoadCountriesFailed,
                );
            }
            CountryPickerEvent::CountrySelected(code) => {
                container.set_state(CountryPickerEvent::CountrySelected(code.clone()));
                let repository = Arc::clone(&self.countries);
                let navigator = Arc::clone(&self.navigator);
                container.spawn(async move {
                    match repository.get_country(&code).await {
                        Ok(country) => navigator.navigate_back_with_result(
                            COUNTRY_CODE_RESULT,
                            ResultValue::Country(country),
                        ),
                        Err(error) => {
                            tracing::warn!(%error, %code, "picked country could not be resolved")
                        }
                    }
                });
            }
            CountryPickerEvent::BackButtonClicked => self.navigator.navigate_back(),
            other => container.set_state(other),
        }
    }
}
