//! Authentication backend contract and a simulated implementation
//!
//! The simulated backend keeps registered accounts and pending phone
//! verifications in memory and answers after an artificial delay, which is
//! enough to exercise every auth flow end to end without a network.
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{watch, Mutex};
use tokio::time::Duration;
use uuid::Uuid;

use crate::error::AuthError;

#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// Latest-value stream of the session token; `None` when signed out.
    fn auth_token(&self) -> watch::Receiver<Option<String>>;

    fn is_authenticated(&self) -> bool;

    async fn save_auth_token(&self, token: String);

    async fn clear_auth_token(&self);

    /// Start a phone sign-in. Returns the verification id the code must be
    /// confirmed against.
    async fn send_verification_code(&self, phone_number: &str) -> Result<String, AuthError>;

    async fn sign_in_with_phone(
        &self,
        verification_id: &str,
        code: &str,
    ) -> Result<String, AuthError>;

    async fn register_with_email(&self, email: &str, password: &str) -> Result<String, AuthError>;

    async fn login_with_email(&self, email: &str, password: &str) -> Result<String, AuthError>;
}

struct PendingVerification {
    phone_number: String,
    code: String,
}

pub struct SimulatedAuthRepository {
    latency: Duration,
    token_tx: watch::Sender<Option<String>>,
    accounts: Mutex<HashMap<String, String>>,
    pending: Mutex<HashMap<String, PendingVerification>>,
}

impl SimulatedAuthRepository {
    /// Verification code every simulated SMS carries.
    pub const VERIFICATION_CODE: &'static str = "123456";

    pub fn new(latency: Duration) -> Self {
        let (token_tx, _) = watch::channel(None);
        Self {
            latency,
            token_tx,
            accounts: Mutex::new(HashMap::new()),
            pending: Mutex::new(HashMap::new()),
        }
    }

    async fn simulate_round_trip(&self) {
        tokio::time::sleep(self.latency).await;
    }

    fn issue_token(&self) -> String {
        let token = Uuid::new_v4().to_string();
        self.token_tx.send_replace(Some(token.clone()));
        token
    }
}

#[async_trait]
impl AuthRepository for SimulatedAuthRepository {
    fn auth_token(&self) -> watch::Receiver<Option<String>> {
        self.token_tx.subscribe()
    }

    fn is_authenticated(&self) -> bool {
        self.token_tx.borrow().is_some()
    }

    async fn save_auth_token(&self, token: String) {
        self.token_tx.send_replace(Some(token));
    }

    async fn clear_auth_token(&self) {
        self.token_tx.send_replace(None);
    }

    async fn send_verification_code(&self, phone_number: &str) -> Result<String, AuthError> {
        self.simulate_round_trip().await;
        let verification_id = Uuid::new_v4().to_string();
        tracing::info!(%phone_number, %verification_id, "simulated SMS sent");
        self.pending.lock().await.insert(
            verification_id.clone(),
            PendingVerification {
                phone_number: phone_number.to_string(),
                code: Self::VERIFICATION_CODE.to_string(),
            },
        );
        Ok(verification_id)
    }

    async fn sign_in_with_phone(
        &self,
        verification_id: &str,
        code: &str,
    ) -> Result<String, AuthError> {
        self.simulate_round_trip().await;
        let mut pending = self.pending.lock().await;
        let verification = pending
            .get(verification_id)
            .ok_or(AuthError::UnknownVerification)?;
        if verification.code != code {
            return Err(AuthError::InvalidVerificationCode);
        }
        let verification = pending.remove(verification_id).expect("checked above");
        drop(pending);
        tracing::info!(phone_number = %verification.phone_number, "phone sign-in complete");
        Ok(self.issue_token())
    }

    async fn register_with_email(&self, email: &str, password: &str) -> Result<String, AuthError> {
        self.simulate_round_trip().await;
        let mut accounts = self.accounts.lock().await;
        if accounts.contains_key(email) {
            return Err(AuthError::EmailAlreadyRegistered);
        }
        accounts.insert(email.to_string(), password.to_string());
        drop(accounts);
        tracing::info!(%email, "account registered");
        Ok(self.issue_token())
    }

    async fn login_with_email(&self, email: &str, password: &str) -> Result<String, AuthError> {
        self.simulate_round_trip().await;
        let accounts = self.accounts.lock().await;
        match accounts.get(email) {
            Some(stored) if stored == password => {
                drop(accounts);
                Ok(self.issue_token())
            }
            _ => Err(AuthError::InvalidCredentials),
        }
    }
}
