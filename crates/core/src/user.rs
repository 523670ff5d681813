//! Account models and the client-side rules for account forms.
//!
//! Every form here is checked locally before any request is built; a
//! form that fails validation never reaches the backend.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match";
pub const NEW_PASSWORDS_DO_NOT_MATCH: &str = "New passwords do not match";
pub const NEW_PASSWORD_REQUIRED: &str = "Please enter a new password";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

/// A user record as returned by the profile and admin endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub profile: Option<UserProfile>,
}

impl User {
    /// "First Last", falling back to the username when both are blank.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// Login request; `username` may also be an email address.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err(CoreError::Validation(
                "Username and password are required".into(),
            ));
        }
        Ok(())
    }
}

/// Response of the login endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: DbId,
    #[serde(default)]
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub is_staff: bool,
}

/// Response of the register endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct RegisterForm {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    pub password2: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegisterForm {
    pub fn check(&self) -> Result<(), CoreError> {
        if self.password != self.password2 {
            return Err(CoreError::Validation(PASSWORDS_DO_NOT_MATCH.into()));
        }
        self.validate()?;
        Ok(())
    }
}

/// Change-password form; `new_password2` is the confirmation field.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChangePasswordForm {
    pub old_password: String,
    pub new_password: String,
    pub new_password2: String,
}

impl ChangePasswordForm {
    pub fn check(&self) -> Result<(), CoreError> {
        if self.new_password != self.new_password2 {
            return Err(CoreError::Validation(NEW_PASSWORDS_DO_NOT_MATCH.into()));
        }
        if self.new_password.is_empty() {
            return Err(CoreError::Validation(NEW_PASSWORD_REQUIRED.into()));
        }
        Ok(())
    }
}

/// Password-reset confirmation form reached from the emailed link.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResetPasswordConfirm {
    pub new_password1: String,
    pub new_password2: String,
}

impl ResetPasswordConfirm {
    pub fn check(&self) -> Result<(), CoreError> {
        if self.new_password1 != self.new_password2 {
            return Err(CoreError::Validation(PASSWORDS_DO_NOT_MATCH.into()));
        }
        if self.new_password1.is_empty() {
            return Err(CoreError::Validation(NEW_PASSWORD_REQUIRED.into()));
        }
        Ok(())
    }
}

/// Token-based reset: email, emailed token, and the new password.
#[derive(Debug, Clone, Serialize)]
pub struct PasswordResetVerify {
    pub email: String,
    pub token: String,
    pub new_password: String,
}

/// Editable profile fields (partial update).
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
}

/// Admin-editable user fields.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AdminUpdateUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_staff: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// A submission from the public contact form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub is_resolved: bool,
}

#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct ContactForm {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Subject is required"))]
    pub subject: String,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
}

impl ContactForm {
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn change_password_mismatch_is_rejected() {
        let form = ChangePasswordForm {
            old_password: "old".into(),
            new_password: "secret-1".into(),
            new_password2: "secret-2".into(),
        };
        assert_matches!(
            form.check(),
            Err(CoreError::Validation(msg)) if msg == NEW_PASSWORDS_DO_NOT_MATCH
        );
    }

    #[test]
    fn reset_confirm_mismatch_is_rejected() {
        let form = ResetPasswordConfirm {
            new_password1: "a".into(),
            new_password2: "b".into(),
        };
        assert_matches!(
            form.check(),
            Err(CoreError::Validation(msg)) if msg == PASSWORDS_DO_NOT_MATCH
        );
    }

    #[test]
    fn matching_passwords_pass() {
        let form = ResetPasswordConfirm {
            new_password1: "same".into(),
            new_password2: "same".into(),
        };
        assert!(form.check().is_ok());
    }

    #[test]
    fn register_checks_mismatch_before_field_rules() {
        let form = RegisterForm {
            username: String::new(),
            email: "not-an-email".into(),
            password: "x".into(),
            password2: "y".into(),
            ..Default::default()
        };
        assert_matches!(
            form.check(),
            Err(CoreError::Validation(msg)) if msg == PASSWORDS_DO_NOT_MATCH
        );
    }

    #[test]
    fn register_rejects_bad_email() {
        let form = RegisterForm {
            username: "ana".into(),
            email: "not-an-email".into(),
            password: "pw".into(),
            password2: "pw".into(),
            ..Default::default()
        };
        assert_matches!(
            form.check(),
            Err(CoreError::Validation(msg)) if msg.contains("valid email")
        );
    }

    #[test]
    fn contact_form_requires_every_field() {
        let err = ContactForm::default().check().unwrap_err();
        let msg = err.user_message();
        assert!(msg.contains("Name is required"));
        assert!(msg.contains("Message is required"));
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let mut user = User {
            id: 1,
            username: "ana".into(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            is_staff: false,
            is_active: None,
            profile: None,
        };
        assert_eq!(user.display_name(), "ana");
        user.first_name = "Ana".into();
        assert_eq!(user.display_name(), "Ana");
    }
}
