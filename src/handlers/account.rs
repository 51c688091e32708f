//! Login, sign-up and logout

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};

use crate::models::{CreateUserRequest, Role};
use crate::state::{AppContext, Route};
use crate::utils::errors::{EventHubError, Result};

const MIN_PASSWORD_LENGTH: usize = 6;

fn email_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok())
        .as_ref()
}

/// Whether `email` has the shape of an address
pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_some_and(|pattern| pattern.is_match(email.trim()))
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(EventHubError::Validation("Email and password are required".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
}

impl SignupForm {
    pub fn validate(&self) -> Result<CreateUserRequest> {
        let name = self.name.trim();
        let email = self.email.trim();
        if name.is_empty() || email.is_empty() || self.password.is_empty() {
            return Err(EventHubError::Validation("Name, email and password are required".to_string()));
        }
        if !is_valid_email(email) {
            return Err(EventHubError::Validation("Please enter a valid email address".to_string()));
        }
        if self.password != self.confirm_password {
            return Err(EventHubError::Validation("Passwords do not match".to_string()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(EventHubError::Validation(format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LENGTH
            )));
        }

        Ok(CreateUserRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: self.password.clone(),
            role: self.role,
        })
    }
}

pub async fn handle_login(ctx: &mut AppContext, form: &LoginForm) -> bool {
    ctx.navigate(Route::Login);
    if let Err(e) = form.validate() {
        ctx.notifications.error(e.user_message("Login failed"));
        return false;
    }

    match ctx.session.login(form.email.trim(), &form.password).await {
        Ok(user) => {
            info!(user_id = user.user_id, "Logged in");
            ctx.notifications.success("Login successful!");
            ctx.navigate(Route::Events);
            true
        }
        Err(e) => {
            debug!(error = %e, "Login rejected");
            ctx.notifications.error(e.user_message("Login failed"));
            false
        }
    }
}

pub async fn handle_signup(ctx: &mut AppContext, form: &SignupForm) -> bool {
    ctx.navigate(Route::Register);
    let request = match form.validate() {
        Ok(request) => request,
        Err(e) => {
            ctx.notifications.error(e.user_message("Registration failed"));
            return false;
        }
    };

    match ctx.session.register(&request).await {
        Ok(user) => {
            info!(user_id = user.user_id, "Account created");
            ctx.notifications.success("Registration successful! Welcome to EventHub!");
            ctx.navigate(Route::Events);
            true
        }
        Err(e) => {
            debug!(error = %e, "Sign-up rejected");
            ctx.notifications.error(e.user_message("Registration failed"));
            false
        }
    }
}

pub fn handle_logout(ctx: &mut AppContext) -> Result<()> {
    ctx.session.logout()?;
    ctx.notifications.info("Logged out");
    ctx.navigate(Route::Home);
    Ok(())
}
