//! Registration screen: create an account by email/password or phone OTP
use std::sync::Arc;

use crate::data::AuthRepository;
use crate::domain::validation::{
    validate_confirm_password, validate_email, validate_first_name, validate_password,
    validate_phone, validate_surname, ValidationResult,
};
use crate::domain::{AuthMethod, Country, PhoneNumberVerifier};
use crate::mvi::{Reducer, ScreenLogic, StateContainer};
use crate::navigation::{AppDestination, Navigator, ResultValue, COUNTRY_CODE_RESULT};

const OTP_LENGTH: usize = 6;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RegistrationState {
    pub first_name: String,
    pub first_name_error: Option<String>,
    pub surname: String,
    pub surname_error: Option<String>,
    pub email: String,
    pub email_error: Option<String>,
    pub phone: String,
    pub phone_error: Option<String>,
    pub password: String,
    pub password_error: Option<String>,
    pub confirm_password: String,
    pub confirm_password_error: Option<String>,
    pub is_password_visible: bool,
    pub is_loading: bool,
    pub error: Option<String>,
    pub selected_country: Country,
    pub auth_method: AuthMethod,
    pub verification_id: Option<String>,
    pub otp: String,
    pub otp_length: usize,
}

impl Default for RegistrationState {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            first_name_error: None,
            surname: String::new(),
            surname_error: None,
            email: String::new(),
            email_error: None,
            phone: String::new(),
            phone_error: None,
            password: String::new(),
            password_error: None,
            confirm_password: String::new(),
            confirm_password_error: None,
            is_password_visible: false,
            is_loading: false,
            error: None,
            selected_country: Country::egypt(),
            auth_method: AuthMethod::Phone,
            verification_id: None,
            otp: String::new(),
            otp_length: OTP_LENGTH,
        }
    }
}

impl RegistrationState {
    pub fn is_register_enabled(&self) -> bool {
        if self.is_loading {
            return false;
        }
        if self.verification_id.is_some() {
            return self.otp.len() == self.otp_length;
        }
        let names_ok = !self.first_name.is_empty()
            && self.first_name_error.is_none()
            && !self.surname.is_empty()
            && self.surname_error.is_none();
        if !names_ok {
            return false;
        }
        match self.auth_method {
            AuthMethod::EmailPassword => {
                !self.email.is_empty()
                    && self.email_error.is_none()
                    && !self.password.is_empty()
                    && self.password_error.is_none()
                    && !self.confirm_password.is_empty()
                    && self.confirm_password_error.is_none()
            }
            AuthMethod::Phone => !self.phone.is_empty() && self.phone_error.is_none(),
        }
    }
}

#[derive(Debug)]
pub enum RegistrationEvent {
    FirstNameChanged(String),
    SurnameChanged(String),
    EmailChanged(String),
    PhoneChanged(String),
    PasswordChanged(String),
    ConfirmPasswordChanged(String),
    OtpChanged(String),
    TogglePasswordVisibility,
    RegisterClicked,
    CountrySelected(Country),
    AuthMethodChanged(AuthMethod),

    FirstNameUpdated { value: String, result: ValidationResult },
    SurnameUpdated { value: String, result: ValidationResult },
    EmailUpdated { value: String, result: ValidationResult },
    PhoneUpdated { value: String, result: ValidationResult },
    PasswordUpdated { value: String, result: ValidationResult },
    ConfirmPasswordUpdated { value: String, result: ValidationResult },
    VerificationCodeSent(String),
    RegistrationSuccess,
    RegistrationFailed(String),

    BackButtonClicked,
    CountryButtonClick,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationEffect {
    ShowToast(String),
}

pub struct RegistrationScreen {
    auth: Arc<dyn AuthRepository>,
    phone_verifier: Arc<dyn PhoneNumberVerifier>,
    navigator: Arc<Navigator>,
}

impl RegistrationScreen {
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
                        match auth.register_with_email(&state.email, &state.password).await {
                            Ok(_) => dispatcher.dispatch(RegistrationEvent::RegistrationSuccess),
                            Err(error) => dispatcher
                                .dispatch(RegistrationEvent::RegistrationFailed(error.to_string())),
                        }
                    }
                    AuthMethod::Phone => match state.verification_id.as_deref() {
                        None => {
                            let full_number =
                                format!("{}{}", state.selected_country.dial_code, state.phone);
                            match auth.send_verification_code(&full_number).await {
                                Ok(id) => dispatcher
                                    .dispatch(RegistrationEvent::VerificationCodeSent(id)),
                                Err(error) => dispatcher.dispatch(
                                    RegistrationEvent::RegistrationFailed(error.to_string()),
                                ),
                            }
                        }
                        Some(verification_id) => {
                            match auth.sign_in_with_phone(verification_id, &state.otp).await {
                                Ok(_) => {
                                    dispatcher.dispatch(RegistrationEvent::RegistrationSuccess)
                                }
                                Err(error) => dispatcher.dispatch(
                                    RegistrationEvent::RegistrationFailed(error.to_string()),
                                ),
                            }
                        }
                    },
                }
            },
            RegistrationEvent::RegistrationFailed,
        );
    }
}

impl Reducer for RegistrationScreen {
    type State = RegistrationState;
    type Event = RegistrationEvent;
    type Effect = RegistrationEffect;

    fn reduce(
        &self,
        previous: &RegistrationState,
        event: &RegistrationEvent,
    ) -> (RegistrationState, Option<RegistrationEffect>) {
        let mut state = previous.clone();
        match event {
            RegistrationEvent::FirstNameUpdated { value, result } => {
                state.first_name = value.clone();
                state.first_name_error = result.error_message.clone();
                (state, None)
            }
            RegistrationEvent::SurnameUpdated { value, result } => {
                state.surname = value.clone();
                state.surname_error = result.error_message.clone();
                (state, None)
            }
            RegistrationEvent::EmailUpdated { value, result } => {
                state.email = value.clone();
                state.email_error = result.error_message.clone();
                (state, None)
            }
            RegistrationEvent::PhoneUpdated { value, result } => {
                state.phone = value.clone();
                state.phone_error = result.error_message.clone();
                (state, None)
            }
            RegistrationEvent::PasswordUpdated { value, result } => {
                state.password = value.clone();
                state.password_error = result.error_message.clone();
                (state, None)
            }
            RegistrationEvent::ConfirmPasswordUpdated { value, result } => {
                state.confirm_password = value.clone();
                state.confirm_password_error = result.error_message.clone();
                (state, None)
            }
            RegistrationEvent::TogglePasswordVisibility => {
                state.is_password_visible = !state.is_password_visible;
                (state, None)
            }
            RegistrationEvent::CountrySelected(country) => {
                state.selected_country = country.clone();
                (state, None)
            }
            RegistrationEvent::AuthMethodChanged(method) => {
                state.auth_method = *method;
                state.error = None;
                (state, None)
            }
            RegistrationEvent::RegisterClicked => {
                state.is_loading = true;
                state.error = None;
                (state, None)
            }
            RegistrationEvent::VerificationCodeSent(verification_id) => {
                state.is_loading = false;
                state.verification_id = Some(verification_id.clone());
                (state, None)
            }
            RegistrationEvent::OtpChanged(value) => {
                state.otp = value.clone();
                (state, None)
            }
            RegistrationEvent::RegistrationSuccess => (
                RegistrationState::default(),
                Some(RegistrationEffect::ShowToast(
                    "Registration successful".to_string(),
                )),
            ),
            RegistrationEvent::RegistrationFailed(error) => {
                state.is_loading = false;
                state.error = Some(error.clone());
                state.otp.clear();
                (state, Some(RegistrationEffect::ShowToast(error.clone())))
            }
            _ => (previous.clone(), None),
        }
    }
}

impl ScreenLogic for RegistrationScreen {
    fn initial_load(&self, container: &StateContainer<Self>) {
        let navigator = Arc::clone(&self.navigator);
        let dispatcher = container.clone();
        container.spawn(async move {
            loop {
                let Some(value) = navigator.result_value(COUNTRY_CODE_RESULT).await else {
                    break;
                };
                if let ResultValue::Country(country) = value {
                    dispatcher.dispatch(RegistrationEvent::CountrySelected(country));
                }
                navigator.clear_result(COUNTRY_CODE_RESULT);
            }
        });
    }

    fn handle_event(&self, container: &StateContainer<Self>, event: RegistrationEvent) {
        match event {
            RegistrationEvent::FirstNameChanged(value) => {
                let result = validate_first_name(&value);
                container.set_state(RegistrationEvent::FirstNameUpdated { value, result });
            }
            RegistrationEvent::SurnameChanged(value) => {
                let result = validate_surname(&value);
                container.set_state(RegistrationEvent::SurnameUpdated { value, result });
            }
            RegistrationEvent::EmailChanged(value) => {
                let result = validate_email(&value);
                container.set_state(RegistrationEvent::EmailUpdated { value, result });
            }
            RegistrationEvent::PhoneChanged(value) => {
                let region = container.current_state().selected_country.iso_code;
                let result = validate_phone(self.phone_verifier.as_ref(), &value, &region);
                container.set_state(RegistrationEvent::PhoneUpdated { value, result });
            }
            RegistrationEvent::PasswordChanged(value) => {
                let result = validate_password(&value);
                container.set_state(RegistrationEvent::PasswordUpdated { value, result });
            }
            RegistrationEvent::ConfirmPasswordChanged(value) => {
                let password = container.current_state().password;
                let result = validate_confirm_password(&password, &value);
                container.set_state(RegistrationEvent::ConfirmPasswordUpdated { value, result });
            }
            RegistrationEvent::RegisterClicked => {
                // Publish the loading state before the auth task starts, so
                // an instant completion cannot be overtaken by it.
                container.set_state(RegistrationEvent::RegisterClicked);
                self.submit(container);
            }
            RegistrationEvent::RegistrationSuccess => {
                self.navigator.navigate_as_root(AppDestination::Feed);
                container.set_state(RegistrationEvent::RegistrationSuccess);
            }
            RegistrationEvent::BackButtonClicked => self.navigator.navigate_back(),
            RegistrationEvent::CountryButtonClick => {
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

    fn screen() -> (RegistrationScreen, Arc<SimulatedAuthRepository>, Arc<Navigator>) {
        let auth = Arc::new(SimulatedAuthRepository::new(Duration::from_millis(1)));
        let navigator = Arc::new(Navigator::new());
        let screen = RegistrationScreen::new(
            auth.clone(),
            Arc::new(DigitRuleVerifier),
            navigator.clone(),
        );
        (screen, auth, navigator)
    }

    fn fill_email_form(container: &StateContainer<RegistrationScreen>) {
        container.dispatch(RegistrationEvent::AuthMethodChanged(
            AuthMethod::EmailPassword,
        ));
        container.dispatch(RegistrationEvent::FirstNameChanged("Ada".to_string()));
        container.dispatch(RegistrationEvent::SurnameChanged("Lovelace".to_string()));
        container.dispatch(RegistrationEvent::EmailChanged(
            "ada@example.com".to_string(),
        ));
        container.dispatch(RegistrationEvent::PasswordChanged("difference".to_string()));
        container.dispatch(RegistrationEvent::ConfirmPasswordChanged(
            "difference".to_string(),
        ));
    }

    #[tokio::test]
    async fn mismatched_confirm_password_blocks_submission() {
        let (screen, _, _) = screen();
        let container = StateContainer::new(screen, RegistrationState::default());
        let _sub = container.subscribe();

        fill_email_form(&container);
        assert!(container.current_state().is_register_enabled());

        container.dispatch(RegistrationEvent::ConfirmPasswordChanged(
            "differenze".to_string(),
        ));
        let state = container.current_state();
        assert_eq!(
            state.confirm_password_error.as_deref(),
            Some("Passwords do not match")
        );
        assert!(!state.is_register_enabled());
    }

    #[tokio::test]
    async fn successful_registration_resets_state_and_lands_on_the_feed() {
        let (screen, _, navigator) = screen();
        let container = StateContainer::new(screen, RegistrationState::default());
        let mut commands = navigator.commands();
        let mut sub = container.subscribe();

        fill_email_form(&container);
        container.dispatch(RegistrationEvent::RegisterClicked);

        let reset = loop {
            let state = sub.next().await.expect("state stream stays open");
            if !state.is_loading && state.email.is_empty() {
                break state;
            }
        };
        assert_eq!(reset, RegistrationState::default());

        let mut effects = container.effects().unwrap();
        assert_eq!(
            effects.next().await,
            Some(RegistrationEffect::ShowToast(
                "Registration successful".to_string()
            ))
        );

        loop {
            let command = commands.borrow_and_update().clone();
            if command == Some(NavigationCommand::NavigateAsRoot(AppDestination::Feed)) {
                break;
            }
            commands.changed().await.unwrap();
        }
    }

    #[tokio::test]
    async fn duplicate_email_surfaces_the_backend_error() {
        let (screen, auth, _) = screen();
        auth.register_with_email("ada@example.com", "difference")
            .await
            .unwrap();
        auth.clear_auth_token().await;

        let container = StateContainer::new(screen, RegistrationState::default());
        let mut sub = container.subscribe();

        fill_email_form(&container);
        container.dispatch(RegistrationEvent::RegisterClicked);

        let failed = loop {
            let state = sub.next().await.expect("state stream stays open");
            if state.error.is_some() {
                break state;
            }
        };
        assert!(!failed.is_loading);
        assert!(failed.error.as_deref().unwrap().contains("already exists"));
    }

    #[tokio::test]
    async fn instant_failure_cannot_overtake_the_loading_state() {
        let navigator = Arc::new(Navigator::new());
        let auth = Arc::new(SimulatedAuthRepository::new(Duration::ZERO));
        auth.register_with_email("ada@example.com", "difference")
            .await
            .unwrap();
        auth.clear_auth_token().await;

        let screen =
            RegistrationScreen::new(auth, Arc::new(DigitRuleVerifier), navigator);
        let container = StateContainer::new(screen, RegistrationState::default());
        let mut sub = container.subscribe();

        fill_email_form(&container);
        container.dispatch(RegistrationEvent::RegisterClicked);

        let failed = loop {
            let state = sub.next().await.expect("state stream stays open");
            if state.error.is_some() {
                break state;
            }
        };
        assert!(!failed.is_loading);
        assert!(failed.is_register_enabled());
    }

    #[tokio::test]
    async fn phone_registration_requests_a_verification_code_first() {
        let (screen, _, _) = screen();
        let container = StateContainer::new(screen, RegistrationState::default());
        let mut sub = container.subscribe();

        container.dispatch(RegistrationEvent::FirstNameChanged("Ada".to_string()));
        container.dispatch(RegistrationEvent::SurnameChanged("Lovelace".to_string()));
        container.dispatch(RegistrationEvent::PhoneChanged("1012345678".to_string()));
        assert!(container.current_state().is_register_enabled());

        container.dispatch(RegistrationEvent::RegisterClicked);
        let state = loop {
            let state = sub.next().await.expect("state stream stays open");
            if state.verification_id.is_some() {
                break state;
            }
        };
        assert!(!state.is_register_enabled());

        container.dispatch(RegistrationEvent::OtpChanged(
            SimulatedAuthRepository::VERIFICATION_CODE.to_string(),
        ));
        assert!(container.current_state().is_register_enabled());
    }
}
