//! Headless walkthrough of the main flows
//!
//! Drives the same state containers a UI shell would subscribe to: sign in
//! (with a country-picker round trip), then the feed and one details screen.
use anyhow::{Context, Result};
use tokio::time::{timeout, Duration};

use crate::app::App;
use crate::cli::StartScreen;
use crate::screens::country_picker::CountryPickerEvent;
use crate::screens::details::ImageDetailsEvent;
use crate::screens::feed::FeedEvent;
use crate::screens::login::LoginEvent;
use crate::screens::registration::RegistrationEvent;
use crate::domain::Status;

const STEP_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn run(app: &App, start: StartScreen) -> Result<()> {
    // Seed an account the login flow can use.
    let auth = app.auth();
    auth.register_with_email("demo@example.com", "demo-pass")
        .await
        .context("seeding the demo account")?;
    auth.clear_auth_token().await;

    match start {
        StartScreen::Login => login_flow(app).await?,
        StartScreen::Registration => registration_flow(app).await?,
        StartScreen::Feed => {}
    }
    feed_flow(app).await
}

async fn login_flow(app: &App) -> Result<()> {
    let login = app.login_screen();
    let mut states = login.subscribe();
    tracing::info!("login screen active");

    // Country picker round trip: search, pick, observe the result land back
    // in the login state through the navigation result slot.
    let code = states.current().selected_country.iso_code;
    login.dispatch(LoginEvent::CountryButtonClick);
    let picker = app.country_picker_screen(Some(code));
    let mut picker_states = picker.subscribe();
    picker.dispatch(CountryPickerEvent::SearchQueryChanged("gree".to_string()));
    timeout(STEP_TIMEOUT, async {
        loop {
            let state = picker_states.next().await?;
            if state.status == Status::Idle
                && state.countries.iter().any(|c| c.iso_code == "GR")
            {
                break Some(());
            }
        }
    })
    .await
    .ok()
    .flatten()
    .context("waiting for the country search to settle")?;
    picker.dispatch(CountryPickerEvent::CountrySelected("GR".to_string()));

    timeout(STEP_TIMEOUT, async {
        loop {
            let state = states.next().await?;
            if state.selected_country.iso_code == "GR" {
                break Some(());
            }
        }
    })
    .await
    .ok()
    .flatten()
    .context("waiting for the picked country to reach the login screen")?;
    drop(picker_states);
    tracing::info!("country picker round trip complete");

    login.dispatch(LoginEvent::EmailChanged("demo@example.com".to_string()));
    login.dispatch(LoginEvent::PasswordChanged("demo-pass".to_string()));
    anyhow::ensure!(
        login.current_state().is_login_enabled(),
        "login form should be submittable"
    );
    login.dispatch(LoginEvent::LoginClicked);

    wait_for_session(app).await?;
    tracing::info!("signed in");
    Ok(())
}

async fn registration_flow(app: &App) -> Result<()> {
    let registration = app.registration_screen();
    let _states = registration.subscribe();
    tracing::info!("registration screen active");

    registration.dispatch(RegistrationEvent::AuthMethodChanged(
        crate::domain::AuthMethod::EmailPassword,
    ));
    registration.dispatch(RegistrationEvent::FirstNameChanged("Demo".to_string()));
    registration.dispatch(RegistrationEvent::SurnameChanged("User".to_string()));
    registration.dispatch(RegistrationEvent::EmailChanged(
        "new-user@example.com".to_string(),
    ));
    registration.dispatch(RegistrationEvent::PasswordChanged("demo-pass".to_string()));
    registration.dispatch(RegistrationEvent::ConfirmPasswordChanged(
        "demo-pass".to_string(),
    ));
    anyhow::ensure!(
        registration.current_state().is_register_enabled(),
        "registration form should be submittable"
    );
    registration.dispatch(RegistrationEvent::RegisterClicked);

    wait_for_session(app).await?;
    tracing::info!("registered and signed in");
    Ok(())
}

async fn feed_flow(app: &App) -> Result<()> {
    let feed = app.feed_screen();
    let mut states = feed.subscribe();
    let loaded = timeout(STEP_TIMEOUT, async {
        loop {
            let state = states.next().await?;
            if !state.is_loading {
                break Some(state);
            }
        }
    })
    .await
    .ok()
    .flatten()
    .context("waiting for the feed to load")?;
    anyhow::ensure!(loaded.error.is_none(), "feed failed to load");
    tracing::info!(images = loaded.images.len(), "feed loaded");

    let Some(first) = loaded.images.first() else {
        return Ok(());
    };
    feed.dispatch(FeedEvent::ImageClicked(first.id));

    let details = app.image_details_screen(first.id);
    let mut detail_states = details.subscribe();
    let state = timeout(STEP_TIMEOUT, async {
        loop {
            let state = detail_states.next().await?;
            if !state.is_loading && !state.is_loading_similar {
                break Some(state);
            }
        }
    })
    .await
    .ok()
    .flatten()
    .context("waiting for image details")?;
    tracing::info!(
        image = ?state.current_image.as_ref().map(|i| i.id),
        similar = state.similar_images.len(),
        "image details loaded"
    );
    details.dispatch(ImageDetailsEvent::BackButtonClicked);

    if let Ok(history) = feed.history_json() {
        tracing::debug!(%history, "feed state history");
    }
    Ok(())
}

async fn wait_for_session(app: &App) -> Result<()> {
    let mut tokens = app.auth().auth_token();
    timeout(STEP_TIMEOUT, async {
        loop {
            if tokens.borrow_and_update().is_some() {
                break Some(());
            }
            tokens.changed().await.ok()?;
        }
    })
    .await
    .ok()
    .flatten()
    .context("waiting for a session token")
    .map(|_| ())
}
