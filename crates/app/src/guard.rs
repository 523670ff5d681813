//! Route guards and confirmation of destructive actions.

use tripmate_client::session::{SessionStore, StoredSession};

use crate::error::AppError;

/// Who may open a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Requires a stored token.
    Private,
    /// Requires a stored token for a staff user.
    Admin,
}

/// Check `access` against the stored session.
///
/// Returns the session when there is one. Private and admin routes fail
/// without a token; admin routes also fail for non-staff users.
pub fn authorize(
    store: &dyn SessionStore,
    access: Access,
) -> Result<Option<StoredSession>, AppError> {
    let Some(session) = store.load()?.filter(|s| !s.token.is_empty()) else {
        return match access {
            Access::Public => Ok(None),
            _ => Err(AppError::NotAuthenticated),
        };
    };
    if access == Access::Admin && !session.is_admin() {
        tracing::warn!(username = %session.user.username, "Non-staff user denied admin route");
        return Err(AppError::Forbidden);
    }
    Ok(Some(session))
}

pub const DELETE_TRIP_PROMPT: &str = "Are you sure you want to delete this trip?";
pub const DELETE_USER_PROMPT: &str = "Are you sure you want to delete this user?";

/// Asks the user to confirm a destructive action.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Ask `confirm` and turn a refusal into [`AppError::Declined`].
pub fn require_confirmation(confirm: &dyn Confirm, prompt: &str) -> Result<(), AppError> {
    if confirm.confirm(prompt) {
        Ok(())
    } else {
        tracing::debug!(prompt, "Action declined");
        Err(AppError::Declined)
    }
}

/// Confirms everything, for `--yes` and scripted use.
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Declines everything.
pub struct AssumeNo;

impl Confirm for AssumeNo {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use tripmate_client::session::MemorySessionStore;
    use tripmate_core::user::LoginResponse;

    use super::*;

    fn store(is_staff: bool) -> MemorySessionStore {
        MemorySessionStore::with_session(StoredSession::from_login(LoginResponse {
            token: "tok".into(),
            user_id: 1,
            email: "ana@example.com".into(),
            username: "ana".into(),
            is_staff,
        }))
    }

    #[test]
    fn public_routes_are_open() {
        let empty = MemorySessionStore::default();
        assert!(authorize(&empty, Access::Public).unwrap().is_none());
    }

    #[test]
    fn private_routes_need_a_token() {
        let empty = MemorySessionStore::default();
        assert_matches!(
            authorize(&empty, Access::Private),
            Err(AppError::NotAuthenticated)
        );
        assert!(authorize(&store(false), Access::Private).unwrap().is_some());
    }

    #[test]
    fn admin_routes_need_staff() {
        assert_matches!(
            authorize(&store(false), Access::Admin),
            Err(AppError::Forbidden)
        );
        let session = authorize(&store(true), Access::Admin).unwrap().unwrap();
        assert!(session.is_admin());
    }

    #[test]
    fn refusal_is_declined() {
        assert!(require_confirmation(&AssumeYes, DELETE_TRIP_PROMPT).is_ok());
        assert_matches!(
            require_confirmation(&AssumeNo, DELETE_TRIP_PROMPT),
            Err(AppError::Declined)
        );
    }
}
