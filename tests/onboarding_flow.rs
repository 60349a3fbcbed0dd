//! Cross-screen flows driven through the public composition root.

use entryflow::config::AppConfig;
use entryflow::navigation::{AppDestination, NavigationCommand, COUNTRY_CODE_RESULT};
use entryflow::screens::country_picker::CountryPickerEvent;
use entryflow::screens::login::LoginEvent;
use entryflow::screens::registration::RegistrationEvent;
use entryflow::App;
use tokio::time::{timeout, Duration};

fn test_app() -> App {
    App::new(AppConfig {
        debounce_ms: 50,
        keep_alive_ms: 5_000,
        network_latency_ms: 1,
        log_filter: "info".to_string(),
    })
}

async fn wait_for_command(
    commands: &mut tokio::sync::watch::Receiver<Option<NavigationCommand>>,
    expected: NavigationCommand,
) {
    timeout(Duration::from_secs(5), async {
        loop {
            if commands.borrow_and_update().as_ref() == Some(&expected) {
                break;
            }
            commands.changed().await.expect("navigator stays alive");
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {expected:?}"));
}

#[tokio::test]
async fn email_login_lands_on_the_feed() {
    let app = test_app();
    app.auth()
        .register_with_email("demo@example.com", "demo-pass")
        .await
        .unwrap();
    app.auth().clear_auth_token().await;

    let login = app.login_screen();
    let _states = login.subscribe();
    let mut commands = app.navigator().commands();

    login.dispatch(LoginEvent::EmailChanged("demo@example.com".to_string()));
    login.dispatch(LoginEvent::PasswordChanged("demo-pass".to_string()));
    assert!(login.current_state().is_login_enabled());
    login.dispatch(LoginEvent::LoginClicked);

    wait_for_command(
        &mut commands,
        NavigationCommand::NavigateAsRoot(AppDestination::Feed),
    )
    .await;
    assert!(app.auth().is_authenticated());
}

#[tokio::test]
async fn country_picked_on_the_picker_reaches_the_registration_screen() {
    let app = test_app();
    let registration = app.registration_screen();
    let mut states = registration.subscribe();
    let mut commands = app.navigator().commands();

    registration.dispatch(RegistrationEvent::CountryButtonClick);
    wait_for_command(
        &mut commands,
        NavigationCommand::NavigateTo(AppDestination::CountryCodePicker {
            code: Some("EG".to_string()),
        }),
    )
    .await;

    // The router would now construct the picker for that destination.
    let picker = app.country_picker_screen(Some("EG".to_string()));
    let mut picker_states = picker.subscribe();
    picker.dispatch(CountryPickerEvent::SearchQueryChanged("nig".to_string()));

    timeout(Duration::from_secs(5), async {
        loop {
            let state = picker_states.next().await.expect("picker stays active");
            if state.countries.iter().any(|c| c.iso_code == "NG") {
                break;
            }
        }
    })
    .await
    .expect("country search settles");
    picker.dispatch(CountryPickerEvent::CountrySelected("NG".to_string()));

    let state = timeout(Duration::from_secs(5), async {
        loop {
            let state = states.next().await.expect("registration stays active");
            if state.selected_country.iso_code == "NG" {
                break state;
            }
        }
    })
    .await
    .expect("picked country reaches the registration screen");
    assert_eq!(state.selected_country.name, "Nigeria");

    // The consuming screen clears the one-shot result slot.
    timeout(Duration::from_secs(5), async {
        while app.navigator().peek_result(COUNTRY_CODE_RESULT).is_some() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("result slot is consumed");
}

#[tokio::test]
async fn phone_registration_completes_with_the_simulated_code() {
    let app = test_app();
    let registration = app.registration_screen();
    let mut states = registration.subscribe();
    let mut commands = app.navigator().commands();

    registration.dispatch(RegistrationEvent::FirstNameChanged("Ada".to_string()));
    registration.dispatch(RegistrationEvent::SurnameChanged("Lovelace".to_string()));
    registration.dispatch(RegistrationEvent::PhoneChanged("1012345678".to_string()));
    registration.dispatch(RegistrationEvent::RegisterClicked);

    timeout(Duration::from_secs(5), async {
        loop {
            let state = states.next().await.expect("registration stays active");
            if state.verification_id.is_some() {
                break;
            }
        }
    })
    .await
    .expect("verification code is requested");

    registration.dispatch(RegistrationEvent::OtpChanged("123456".to_string()));
    registration.dispatch(RegistrationEvent::RegisterClicked);

    wait_for_command(
        &mut commands,
        NavigationCommand::NavigateAsRoot(AppDestination::Feed),
    )
    .await;
    assert!(app.auth().is_authenticated());
}
