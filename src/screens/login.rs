//! Login screen: email/password and phone-OTP sign-in
use std::sync::Arc;

use crate::data::AuthRepository;
use crate::domain::validation::{
    validate_email, validate_password, validate_phone, ValidationResult,
};
use crate::domain::{AuthMethod, Country, PhoneNumberVerifier};
use crate::mvi::{Reducer, ScreenLogic, StateContainer};
use crate::navigation::{AppDestination, Navigator, ResultValue, COUNTRY_CODE_RESULT};

const OTP_LENGTH: usize = 6;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LoginState {
    pub email: String,
    pub email_error: Option<String>,
    pub phone: String,
    pub phone_error: Option<String>,
    pub password: String,
    pub password_error: Option<String>,
    pub is_password_visible: bool,
    pub is_loading: bool,
    pub error: Option<String>,
    pub selected_country: Country,
    pub auth_method: AuthMethod,
    pub verification_id: Option<String>,
    pub otp: String,
    pub otp_length: usize,
}

impl Default for LoginState {
    fn default() -> Self {
        Self {
            email: String::new(),
            email_error: None,
            phone: String::new(),
            phone_error: None,
            password: String::new(),
            password_error: None,
            is_password_visible: false,
            is_loading: false,
            error: None,
            selected_country: Country::egypt(),
            auth_method: AuthMethod::EmailPassword,
            verification_id: None,
            otp: String::new(),
            otp_length: OTP_LENGTH,
        }
    }
}

impl LoginState {
    /// Derived, never stored: whether the primary button is actionable.
    pub fn is_login_enabled(&self) -> bool {
        if self.verification_id.is_some() {
            return self.otp.len() == self.otp_length && !self.is_loading;
        }
        match self.auth_method {
            AuthMethod::EmailPassword => {
                !self.email.is_empty()
                    && self.email_error.is_none()
                    && !self.password.is_empty()
                    && self.password_error.is_none()
                    && !self.is_loading
            }
            AuthMethod::Phone => {
                !self.phone.is_empty() && self.phone_error.is_none() && !self.is_loading
            }
        }
    }
}

#[derive(Debug)]
pub enum LoginEvent {
    EmailChanged(String),
    PhoneChanged(String),
    PasswordChanged(String),
    OtpChanged(String),
    TogglePasswordVisibility,
    LoginClicked,
    CountrySelected(Country),
    AuthMethodChanged(AuthMethod),

    EmailUpdated { value: String, result: ValidationResult },
    PhoneUpdated { value: String, result: ValidationResult },
    PasswordUpdated { value: String, result: ValidationResult },
    VerificationCodeSent(String),
    LoginSuccess,
    LoginFailed(String),

    BackButtonClicked,
    CountryButtonClick,
    CreateAccountClicked,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoginEffect {
    ShowToast(String),
}

pub struct LoginScreen {
    auth: Arc<dyn AuthRepository>,
    phone_verifier: Arc<dyn PhoneNumberVerifier>,
    navigator: Arc<Navigator>,
}

impl LoginScreen {
    pub fn new(
        auth: Arc<dyn AuthRepository>,
        phone_verifier: Arc<dyn PhoneNumberVerifier>,
        navigator: Arc<Navigator>,
    ) -> Self {
        Self {
            auth,
            phone_verifier,
            navigator,
        }
    }

    fn submit(&self, container: &StateContainer<Self>) {
        let state = container.current_state();
        let auth = Arc::clone(&self.auth);
        let dispatcher = container.clone();
        container.spawn_guarded(
            async move {
                match state.auth_method {
                    AuthMethod::EmailPassword => {
                        match auth.login_with_email(&state.email, &state.password).await {
                            Ok(_) => dispatcher.dispatch(LoginEvent::LoginSuccess),
                            Err(error) => {
                                dispatcher.dispatch(LoginEvent::LoginFailed(error.to_string()))
                            }
                        }
                    }
                    AuthMethod::Phone => match state.verification_id.as_deref() {
                        None => {
                            let full_number =
                                format!("{}{}", state.selected_country.dial_code, state.phone);
                            match auth.send_verification_code(&full_number).await {
                                Ok(id) => {
                                    dispatcher.dispatch(LoginEvent::VerificationCodeSent(id))
                                }
                                Err(error) => dispatcher
                                    .dispatch(LoginEvent::LoginFailed(error.to_string())),
                            }
                        }
                        Some(verification_id) => {
                            match auth.sign_in_with_phone(verification_id, &state.otp).await {
                                Ok(_) => dispatcher.dispatch(LoginEvent::LoginSuccess),
                                Err(error) => dispatcher
                                    .dispatch(LoginEvent::LoginFailed(error.to_string())),
                            }
                        }
                    },
                }
            },
            LoginEvent::LoginFailed,
        );
    }
}

impl Reducer for LoginScreen {
    type State = LoginState;
    type Event = LoginEvent;
    type Effect = LoginEffect;

    fn reduce(&self, previous: &LoginState, event: &LoginEvent) -> (LoginState, Option<LoginEffect>) {
        let mut state = previous.clone();
        match event {
            LoginEvent::EmailUpdated { value, result } => {
                state.email = value.clone();
                state.email_error = result.error_message.clone();
                (state, None)
            }
            LoginEvent::PhoneUpdated { value, result } => {
                state.phone = value.clone();
                state.phone_error = result.error_message.clone();
                (state, None)
            }
            LoginEvent::PasswordUpdated { value, result } => {
                state.password = value.clone();
                state.password_error = result.error_message.clone();
                (state, None)
            }
            LoginEvent::TogglePasswordVisibility => {
                state.is_password_visible = !state.is_password_visible;
                (state, None)
            }
            LoginEvent::CountrySelected(country) => {
                state.selected_country = country.clone();
                (state, None)
            }
            LoginEvent::LoginClicked => {
                state.is_loading = true;
                state.error = None;
                (state, None)
            }
            LoginEvent::LoginSuccess => {
                state.is_loading = false;
                (state, None)
            }
            LoginEvent::LoginFailed(error) => {
                state.is_loading = false;
                state.error = Some(error.clone());
                state.otp.clear();
                (state, Some(LoginEffect::ShowToast(error.clone())))
            }
            LoginEvent::AuthMethodChanged(method) => {
                state.auth_method = *method;
                state.error = None;
                (state, None)
            }
            LoginEvent::VerificationCodeSent(verification_id) => {
                state.is_loading = false;
                state.verification_id = Some(verification_id.clone());
                (state, None)
            }
            LoginEvent::OtpChanged(value) => {
                state.otp = value.clone();
                (state, None)
            }
            // Handled by the event layer; the reducer leaves state untouched.
            _ => (previous.clone(), None),
        }
    }
}

impl ScreenLogic for LoginScreen {
    fn initial_load(&self, container: &StateContainer<Self>) {
        // Pick up a country chosen on the picker screen.
        let navigator = Arc::clone(&self.navigator);
        let dispatcher = container.clone();
        container.spawn(async move {
            loop {
                let Some(value) = navigator.result_value(COUNTRY_CODE_RESULT).await else {
                    break;
                };
                if let ResultValue::Country(country) = value {
                    dispatcher.dispatch(LoginEvent::CountrySelected(country));
                }
                navigator.clear_result(COUNTRY_CODE_RESULT);
            }
        });

        // Leave the auth flow as soon as a session exists.
        let auth_tokens = self.auth.auth_token();
        let navigator = Arc::clone(&self.navigator);
        container.spawn(async move {
            let mut tokens = auth_tokens;
            loop {
                if tokens.borrow_and_update().is_some() {
                    navigator.navigate_as_root(AppDestination::Feed);
                    break;
                }
                if tokens.changed().await.is_err() {
                    break;
                }
            }
        });
    }

    fn handle_event(&self, container: &StateContainer<Self>, event: LoginEvent) {
        match event {
            LoginEvent::EmailChanged(value) => {
                let result = validate_email(&value);
                container.set_state(LoginEvent::EmailUpdated { value, result });
            }
            LoginEvent::PhoneChanged(value) => {
                let region = container.current_state().selected_country.iso_code;
                let result = validate_phone(self.phone_verifier.as_ref(), &value, &region);
                container.set_state(LoginEvent::PhoneUpdated { value, result });
            }
            LoginEvent::PasswordChanged(value) => {
                let result = validate_password(&value);
                container.set_state(LoginEvent::PasswordUpdated { value, result });
            }
            LoginEvent::LoginClicked => {
                // Publish the loading state before the auth task starts, so
                // an instant completion cannot be overtaken by it.
                container.set_state(LoginEvent::LoginClicked);
                self.submit(container);
            }
            LoginEvent::BackButtonClicked => self.navigator.navigate_back(),
            LoginEvent::CreateAccountClicked => {
                self.navigator.navigate(AppDestination::Registration);
            }
            LoginEvent::CountryButtonClick => {
                let code = container.current_state().selected_country.iso_code;
                self.navigator
                    .navigate(AppDestination::CountryCodePicker { code: Some(code) });
            }
            other => container.set_state(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SimulatedAuthRepository;
    use crate::domain::phone::DigitRuleVerifier;
    use crate::navigation::NavigationCommand;
    use tokio::time::Duration;

    fn screen() -> (LoginScreen, Arc<SimulatedAuthRepository>, Arc<Navigator>) {
        let auth = Arc::new(SimulatedAuthRepository::new(Duration::from_millis(1)));
        let navigator = Arc::new(Navigator::new());
        let screen = LoginScreen::new(
            auth.clone(),
            Arc::new(DigitRuleVerifier),
            navigator.clone(),
        );
        (screen, auth, navigator)
    }

    #[tokio::test]
    async fn password_validation_drives_submit_enablement() {
        let (screen, _, _) = screen();
        let container = StateContainer::new(screen, LoginState::default());
        let _sub = container.subscribe();

        container.dispatch(LoginEvent::EmailChanged("user@example.com".to_string()));
        container.dispatch(LoginEvent::PasswordChanged("12345".to_string()));

        let state = container.current_state();
        assert_eq!(
            state.password_error.as_deref(),
            Some("Password must be at least 6 characters long.")
        );
        assert!(!state.is_login_enabled());

        container.dispatch(LoginEvent::PasswordChanged("123456".to_string()));
        let state = container.current_state();
        assert!(state.password_error.is_none());
        assert!(state.is_login_enabled());
    }

    #[tokio::test]
    async fn failed_login_surfaces_error_and_toast() {
        let (screen, _, _) = screen();
        let container = StateContainer::new(screen, LoginState::default());
        let mut sub = container.subscribe();

        container.dispatch(LoginEvent::EmailChanged("ghost@example.com".to_string()));
        container.dispatch(LoginEvent::PasswordChanged("nopenope".to_string()));
        container.dispatch(LoginEvent::LoginClicked);
        assert!(container.current_state().is_loading);

        let failed = loop {
            let state = sub.next().await.expect("state stream stays open");
            if state.error.is_some() {
                break state;
            }
        };
        assert!(!failed.is_loading);

        let mut effects = container.effects().unwrap();
        assert!(matches!(
            effects.next().await,
            Some(LoginEffect::ShowToast(_))
        ));
    }

    #[tokio::test]
    async fn instant_failure_cannot_overtake_the_loading_state() {
        // A zero-latency backend finishes on another worker the moment the
        // auth task is spawned; the failure must still land after the
        // loading publication, leaving the form actionable again.
        let navigator = Arc::new(Navigator::new());
        let screen = LoginScreen::new(
            Arc::new(SimulatedAuthRepository::new(Duration::ZERO)),
            Arc::new(DigitRuleVerifier),
            navigator,
        );
        let container = StateContainer::new(screen, LoginState::default());
        let mut sub = container.subscribe();

        container.dispatch(LoginEvent::EmailChanged("ghost@example.com".to_string()));
        container.dispatch(LoginEvent::PasswordChanged("nopenope".to_string()));
        container.dispatch(LoginEvent::LoginClicked);

        let failed = loop {
            let state = sub.next().await.expect("state stream stays open");
            if state.error.is_some() {
                break state;
            }
        };
        assert!(!failed.is_loading);
        assert!(failed.is_login_enabled());
    }

    #[tokio::test]
    async fn successful_login_navigates_to_the_feed_as_root() {
        let (screen, auth, navigator) = screen();
        auth.register_with_email("user@example.com", "hunter22")
            .await
            .unwrap();
        auth.clear_auth_token().await;

        let container = StateContainer::new(screen, LoginState::default());
        let mut commands = navigator.commands();
        let _sub = container.subscribe();

        container.dispatch(LoginEvent::EmailChanged("user@example.com".to_string()));
        container.dispatch(LoginEvent::PasswordChanged("hunter22".to_string()));
        container.dispatch(LoginEvent::LoginClicked);

        loop {
            commands.changed().await.unwrap();
            let command = commands.borrow_and_update().clone();
            if command == Some(NavigationCommand::NavigateAsRoot(AppDestination::Feed)) {
                break;
            }
        }
    }

    #[tokio::test]
    async fn phone_login_goes_through_the_otp_round_trip() {
        let (screen, _, _) = screen();
        let container = StateContainer::new(screen, LoginState::default());
        let mut sub = container.subscribe();

        container.dispatch(LoginEvent::AuthMethodChanged(AuthMethod::Phone));
        container.dispatch(LoginEvent::PhoneChanged("1012345678".to_string()));
        assert!(container.current_state().is_login_enabled());

        container.dispatch(LoginEvent::LoginClicked);
        let with_verification = loop {
            let state = sub.next().await.expect("state stream stays open");
            if state.verification_id.is_some() {
                break state;
            }
        };
        assert!(!with_verification.is_login_enabled());

        container.dispatch(LoginEvent::OtpChanged(
            SimulatedAuthRepository::VERIFICATION_CODE.to_string(),
        ));
        assert!(container.current_state().is_login_enabled());
    }

    #[tokio::test]
    async fn country_picked_on_another_screen_lands_in_state() {
        let (screen, _, navigator) = screen();
        let container = StateContainer::new(screen, LoginState::default());
        let mut sub = container.subscribe();

        navigator.navigate_back_with_result(
            COUNTRY_CODE_RESULT,
            ResultValue::Country(Country::new("Greece", "+30", "GR", "🇬🇷")),
        );

        let state = loop {
            let state = sub.next().await.expect("state stream stays open");
            if state.selected_country.iso_code == "GR" {
                break state;
            }
        };
        assert_eq!(state.selected_country.name, "Greece");
    }
}
