use super::{AuthToken, AuthTokenValue, User, UserStore};
use anyhow::Result;
use std::{sync::Arc, time::SystemTime};
use thiserror::Error;
use tracing::{info, warn};

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_HANDLE_LENGTH: usize = 64;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("The user handle cannot be empty")]
    EmptyHandle,

    #[error("The user handle cannot be longer than {} characters", MAX_HANDLE_LENGTH)]
    HandleTooLong,

    #[error("The password must be at least {} characters long", MIN_PASSWORD_LENGTH)]
    PasswordTooShort,

    #[error("User handle already exists")]
    HandleTaken,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub struct UserManager {
    user_store: Arc<dyn UserStore>,
}

impl UserManager {
    pub fn new(user_store: Arc<dyn UserStore>) -> Self {
        Self { user_store }
    }

    /// Creates a user with password credentials and returns its id.
    pub fn register(
        &self,
        user_handle: &str,
        email: Option<&str>,
        password: &str,
    ) -> Result<usize, RegistrationError> {
        let user_handle = user_handle.trim();
        if user_handle.is_empty() {
            return Err(RegistrationError::EmptyHandle);
        }
        if user_handle.chars().count() > MAX_HANDLE_LENGTH {
            return Err(RegistrationError::HandleTooLong);
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(RegistrationError::PasswordTooShort);
        }

        let email = email.map(str::trim).filter(|e| !e.is_empty());
        let Some(user_id) = self
            .user_store
            .create_user_with_password(user_handle, email, password)?
        else {
            return Err(RegistrationError::HandleTaken);
        };
        info!("Registered user {} with id {}", user_handle, user_id);
        Ok(user_id)
    }

    /// Checks the password and issues a new session token.
    /// Returns Ok(None) when the handle is unknown or the password is wrong.
    pub fn login(&self, user_handle: &str, password: &str) -> Result<Option<AuthToken>> {
        let Some(credentials) = self.user_store.get_password_credentials(user_handle.trim())? else {
            return Ok(None);
        };
        if !credentials.verify(password)? {
            warn!("Failed login attempt for user {}", user_handle);
            return Ok(None);
        }
        self.user_store.mark_password_used(credentials.user_id)?;
        self.generate_auth_token(credentials.user_id).map(Some)
    }

    pub fn generate_auth_token(&self, user_id: usize) -> Result<AuthToken> {
        let token = AuthToken {
            user_id,
            value: AuthTokenValue::generate(),
            created: SystemTime::now(),
            last_used: None,
        };
        self.user_store.add_user_auth_token(&token)?;
        Ok(token)
    }

    /// Resolves a token value to its token, refreshing its last used time.
    pub fn get_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let token = self.user_store.get_user_auth_token(value)?;
        if token.is_some() {
            self.user_store
                .update_user_auth_token_last_used_timestamp(value)?;
        }
        Ok(token)
    }

    pub fn delete_auth_token(&self, value: &AuthTokenValue) -> Result<bool> {
        Ok(self.user_store.delete_user_auth_token(value)?.is_some())
    }

    pub fn get_user(&self, user_id: usize) -> Result<Option<User>> {
        self.user_store.get_user(user_id)
    }
}
