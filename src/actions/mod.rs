//! Sign-in, sign-up and sign-out flows.
//!
//! Each action wraps a [`SessionManager`](crate::SessionManager) and is the
//! only place a session is created from backend credentials.

pub mod google_sign_in;
pub mod login;
pub mod logout;
pub mod signup;

pub use google_sign_in::GoogleSignInAction;
pub use login::LoginAction;
pub use logout::LogoutAction;
pub use signup::SignupAction;

use crate::AuthError;

fn require_credentials(email: &str, password: &str) -> Result<(), AuthError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AuthError::InvalidInput(
            "Email and password are required".to_owned(),
        ));
    }
    Ok(())
}
