//! Registration, credential checks and self-service profile edits.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::validation::{max_chars, optional_email, required, username};
use super::require_login;
use crate::domain::User;
use crate::error::{DomainError, FieldErrors, RepoError};
use crate::ports::{PasswordService, UserRepository};

const MIN_PASSWORD_CHARS: usize = 8;
const NAME_MAX_CHARS: usize = 150;
const USERNAME_TAKEN: &str = "A user with that username already exists.";

/// A unique-username violation from the store is a form error, not a conflict.
fn username_taken(err: RepoError) -> DomainError {
    match err {
        RepoError::Constraint(reason) => {
            tracing::debug!(%reason, "Username claimed concurrently");
            DomainError::invalid("username", USERNAME_TAKEN)
        }
        other => other.into(),
    }
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Clone)]
pub struct ProfileChanges {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepository>, passwords: Arc<dyn PasswordService>) -> Self {
        Self { users, passwords }
    }

    pub async fn register(&self, registration: Registration) -> Result<User, DomainError> {
        let mut errors = FieldErrors::new();
        username(&mut errors, "username", &registration.username);
        optional_email(&mut errors, "email", &registration.email);
        if registration.password.chars().count() < MIN_PASSWORD_CHARS {
            errors.add(
                "password",
                format!(
                    "This password is too short. \
                     It must contain at least {MIN_PASSWORD_CHARS} characters."
                ),
            );
        }
        if registration.password != registration.password_confirmation {
            errors.add(
                "password_confirmation",
                "The two password fields didn't match.",
            );
        }
        if self
            .users
            .find_by_username(&registration.username)
            .await?
            .is_some()
        {
            errors.add("username", USERNAME_TAKEN);
        }
        errors.into_result()?;

        let password_hash = self
            .passwords
            .hash(&registration.password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let user = User::new(registration.username, registration.email, password_hash);
        let user = self.users.insert(user).await.map_err(username_taken)?;
        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Look up a user by username and check the password.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, DomainError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(DomainError::InvalidCredentials)?;

        let valid = self
            .passwords
            .verify(password, &user.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        if !valid {
            tracing::debug!(%username, "Rejected login: wrong password");
            return Err(DomainError::InvalidCredentials);
        }
        Ok(user)
    }

    /// The requester's own account.
    pub async fn current_user(&self, actor: Option<Uuid>) -> Result<User, DomainError> {
        let user_id = require_login(actor)?;
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", user_id))
    }

    pub async fn update_profile(
        &self,
        actor: Option<Uuid>,
        changes: ProfileChanges,
    ) -> Result<User, DomainError> {
        let mut user = self.current_user(actor).await?;

        let mut errors = FieldErrors::new();
        username(&mut errors, "username", &changes.username);
        max_chars(&mut errors, "first_name", &changes.first_name, NAME_MAX_CHARS);
        max_chars(&mut errors, "last_name", &changes.last_name, NAME_MAX_CHARS);
        optional_email(&mut errors, "email", &changes.email);
        required(&mut errors, "email", &changes.email);
        if changes.username != user.username {
            if let Some(other) = self.users.find_by_username(&changes.username).await? {
                if other.id != user.id {
                    errors.add("username", USERNAME_TAKEN);
                }
            }
        }
        errors.into_result()?;

        user.username = changes.username;
        user.first_name = changes.first_name;
        user.last_name = changes.last_name;
        user.email = changes.email;
        user.updated_at = Utc::now();

        let user = self.users.update(user).await.map_err(username_taken)?;
        tracing::info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }
}
