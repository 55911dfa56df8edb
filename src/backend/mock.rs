#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rand::Rng;

use super::{AuthBackend, AuthResponse, TokenStatus};
use crate::{AuthError, BearerToken, User};

/// Scripted answer for the next validation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockValidation {
    /// Accept tokens this mock issued, reject everything else with 401.
    Issued,
    /// Answer every request with this status.
    Status(u16),
    /// Fail every request as if the backend were unreachable.
    NetworkError,
    /// Never answer.
    Hang,
}

#[derive(Clone)]
struct Account {
    password: String,
    user: User,
}

struct MockState {
    accounts: HashMap<String, Account>,
    google_accounts: HashMap<String, User>,
    issued: HashMap<String, User>,
    validation: MockValidation,
    validate_calls: usize,
    next_id: u64,
}

/// In-memory backend for tests.
///
/// Clones share state, so a test can keep a handle while the manager owns another.
#[derive(Clone)]
pub struct MockAuthBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockAuthBackend {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                accounts: HashMap::new(),
                google_accounts: HashMap::new(),
                issued: HashMap::new(),
                validation: MockValidation::Issued,
                validate_calls: 0,
                next_id: 1,
            })),
        }
    }

    /// Registers an email/password account and returns its user record.
    pub fn with_account(self, email: &str, password: &str) -> Self {
        let mut state = self.state.lock().unwrap();
        let user = User::new(state.next_id.to_string(), email);
        state.next_id += 1;
        state.accounts.insert(
            email.to_owned(),
            Account {
                password: password.to_owned(),
                user,
            },
        );
        drop(state);
        self
    }

    /// Registers a Google identity token that signs in as `email`.
    pub fn with_google_account(self, id_token: &str, email: &str) -> Self {
        let mut state = self.state.lock().unwrap();
        let user = User {
            is_google_user: Some(true),
            ..User::new(state.next_id.to_string(), email)
        };
        state.next_id += 1;
        state.google_accounts.insert(id_token.to_owned(), user);
        drop(state);
        self
    }

    /// Issues a token the mock will accept under [`MockValidation::Issued`].
    pub fn issue_token(&self, user: &User) -> BearerToken {
        let token = random_token();
        self.state
            .lock()
            .unwrap()
            .issued
            .insert(token.clone(), user.clone());
        BearerToken::new(token)
    }

    pub fn respond_to_validate_with(&self, validation: MockValidation) {
        self.state.lock().unwrap().validation = validation;
    }

    /// Number of validation requests received so far.
    pub fn validate_calls(&self) -> usize {
        self.state.lock().unwrap().validate_calls
    }
}

impl Default for MockAuthBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn random_token() -> String {
    rand::thread_rng()
        .sample_iter(rand::distributions::Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

#[async_trait]
impl AuthBackend for MockAuthBackend {
    async fn validate(&self, token: &BearerToken) -> Result<TokenStatus, AuthError> {
        let outcome = {
            let mut state = self.state.lock().unwrap();
            state.validate_calls += 1;
            match state.validation {
                MockValidation::Issued => Some(Ok(if state.issued.contains_key(token.expose()) {
                    TokenStatus::Valid
                } else {
                    TokenStatus::Rejected { status: 401 }
                })),
                MockValidation::Status(code) if (200..300).contains(&code) => {
                    Some(Ok(TokenStatus::Valid))
                }
                MockValidation::Status(code) => Some(Ok(TokenStatus::Rejected { status: code })),
                MockValidation::NetworkError => Some(Err(AuthError::NetworkError(
                    "connection refused".to_owned(),
                ))),
                MockValidation::Hang => None,
            }
        };

        match outcome {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let account = self.state.lock().unwrap().accounts.get(email).cloned();
        match account {
            Some(account) if account.password == password => {
                let token = self.issue_token(&account.user);
                Ok(AuthResponse::authenticated(token, account.user))
            }
            _ => Ok(AuthResponse::failure("Invalid email or password")),
        }
    }

    async fn signup(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let mut state = self.state.lock().unwrap();
        if state.accounts.contains_key(email) {
            return Ok(AuthResponse::failure("User already exists"));
        }

        let user = User::new(state.next_id.to_string(), email);
        state.next_id += 1;
        state.accounts.insert(
            email.to_owned(),
            Account {
                password: password.to_owned(),
                user: user.clone(),
            },
        );

        Ok(AuthResponse {
            success: true,
            user: Some(user),
            message: Some("Account created".to_owned()),
            ..Default::default()
        })
    }

    async fn google_sign_in(&self, id_token: &str) -> Result<AuthResponse, AuthError> {
        let user = self
            .state
            .lock()
            .unwrap()
            .google_accounts
            .get(id_token)
            .cloned();
        match user {
            Some(user) => {
                let token = self.issue_token(&user);
                Ok(AuthResponse::authenticated(token, user))
            }
            None => Ok(AuthResponse::failure("Invalid Google token")),
        }
    }
}
