//! Authentication, profile, contact, and admin endpoints.

use reqwest::Method;
use serde_json::json;
use tripmate_core::user::{
    AdminUpdateUser, ChangePasswordForm, ContactForm, ContactSubmission, Credentials,
    LoginResponse, PasswordResetVerify, RegisterForm, RegisterResponse, ResetPasswordConfirm,
    UpdateProfile, User, NEW_PASSWORD_REQUIRED,
};
use tripmate_core::{error::CoreError, types::DbId};

use crate::api::TripMateApi;
use crate::error::ApiError;

impl TripMateApi {
    // ---- auth ----

    /// Register a new account. On success the returned token is
    /// installed on this client.
    pub async fn register(&self, form: &RegisterForm) -> Result<RegisterResponse, ApiError> {
        form.check()?;
        let response: RegisterResponse = self
            .send_json(Method::POST, "accounts/register/", form)
            .await?;
        self.set_token(Some(response.token.clone())).await;
        tracing::info!(username = %response.user.username, "Registered new account");
        Ok(response)
    }

    /// Log in by username or email. On success the token is installed on
    /// this client; persisting it is the caller's job.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        credentials.validate()?;
        let response: LoginResponse = self
            .send_json(Method::POST, "accounts/login/", credentials)
            .await?;
        self.set_token(Some(response.token.clone())).await;
        tracing::info!(user_id = response.user_id, "Logged in");
        Ok(response)
    }

    /// Invalidate the token server-side and drop it locally. The local
    /// token is dropped even when the backend call fails.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = self
            .send_unit::<()>(Method::POST, "accounts/logout/", None)
            .await;
        self.set_token(None).await;
        result
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<(), ApiError> {
        if email.trim().is_empty() {
            return Err(CoreError::Validation("Email is required".into()).into());
        }
        self.send_unit(
            Method::POST,
            "accounts/password-reset-request/",
            Some(&json!({ "email": email.trim() })),
        )
        .await
    }

    pub async fn verify_password_reset(&self, verify: &PasswordResetVerify) -> Result<(), ApiError> {
        if verify.new_password.is_empty() {
            return Err(CoreError::Validation(NEW_PASSWORD_REQUIRED.into()).into());
        }
        self.send_unit(
            Method::POST,
            "accounts/password-reset-verify/",
            Some(verify),
        )
        .await
    }

    /// Complete a reset from the emailed `uid`/`token` link.
    pub async fn confirm_password_reset(
        &self,
        uid: &str,
        token: &str,
        form: &ResetPasswordConfirm,
    ) -> Result<(), ApiError> {
        form.check()?;
        self.send_unit(
            Method::POST,
            &format!("accounts/reset/{uid}/{token}/"),
            Some(form),
        )
        .await
    }

    // ---- profile ----

    pub async fn get_profile(&self) -> Result<User, ApiError> {
        self.get_json("accounts/profile/", &[]).await
    }

    pub async fn update_profile(&self, form: &UpdateProfile) -> Result<User, ApiError> {
        self.send_json(Method::PATCH, "accounts/profile/", form)
            .await
    }

    pub async fn change_password(&self, form: &ChangePasswordForm) -> Result<(), ApiError> {
        form.check()?;
        self.send_unit(Method::PUT, "accounts/change-password/", Some(form))
            .await
    }

    // ---- contact ----

    pub async fn submit_contact(&self, form: &ContactForm) -> Result<(), ApiError> {
        form.check()?;
        self.send_unit(Method::POST, "accounts/contact/", Some(form))
            .await
    }

    // ---- admin ----

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.get_json("accounts/admin/users/", &[]).await
    }

    pub async fn get_user(&self, user_id: DbId) -> Result<User, ApiError> {
        self.get_json(&format!("accounts/admin/users/{user_id}/"), &[])
            .await
    }

    pub async fn update_user(&self, user_id: DbId, form: &AdminUpdateUser) -> Result<User, ApiError> {
        self.send_json(
            Method::PATCH,
            &format!("accounts/admin/users/{user_id}/"),
            form,
        )
        .await
    }

    pub async fn reset_user_password(&self, user_id: DbId, new_password: &str) -> Result<(), ApiError> {
        if new_password.is_empty() {
            return Err(CoreError::Validation(NEW_PASSWORD_REQUIRED.into()).into());
        }
        self.send_unit(
            Method::POST,
            &format!("accounts/admin/users/{user_id}/reset-password/"),
            Some(&json!({ "new_password": new_password })),
        )
        .await
    }

    pub async fn delete_user(&self, user_id: DbId) -> Result<(), ApiError> {
        self.delete(&format!("accounts/admin/users/{user_id}/"))
            .await
    }

    pub async fn list_contacts(&self) -> Result<Vec<ContactSubmission>, ApiError> {
        self.get_json("accounts/admin/contacts/", &[]).await
    }

    pub async fn update_contact_status(
        &self,
        contact_id: DbId,
        is_resolved: bool,
    ) -> Result<ContactSubmission, ApiError> {
        self.send_json(
            Method::PATCH,
            &format!("accounts/admin/contacts/{contact_id}/"),
            &json!({ "is_resolved": is_resolved }),
        )
        .await
    }
}
