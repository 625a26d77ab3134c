//! Credential checks, password hashing and role permissions.

use anyhow::{anyhow, Result};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::actions::failed;
use crate::error::{ActionError, ActionResult, FieldErrors};
use crate::models::{NewUser, RegisterInput, Role, UserSummary};
use crate::store::UserStore;
use crate::validation;

/// The signed-in user, as seen by every action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub user_id: Uuid,
    pub user_name: String,
    pub email: String,
    pub role: Role,
}

impl Role {
    fn rank(self) -> u8 {
        match self {
            Role::Owner => 3,
            Role::Editor => 2,
            Role::Viewer => 1,
        }
    }

    /// True when this role is at least as privileged as `required`.
    pub fn has_access(self, required: Role) -> bool {
        self.rank() >= required.rank()
    }

    pub fn can_create_project(self) -> bool {
        self.has_access(Role::Editor)
    }

    pub fn can_delete_project(self) -> bool {
        self == Role::Owner
    }

    pub fn can_manage_team(self) -> bool {
        self == Role::Owner
    }

    pub fn can_edit_task(self) -> bool {
        self.has_access(Role::Editor)
    }

    pub fn can_delete_task(self) -> bool {
        self.has_access(Role::Editor)
    }

    pub fn can_create_client(self) -> bool {
        self.has_access(Role::Editor)
    }
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("failed to hash password: {e}"))?;
    Ok(hash.to_string())
}

/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(e) => {
            warn!("stored password hash is malformed: {e}");
            false
        }
    }
}

pub async fn register_user<S: UserStore + ?Sized>(store: &S, input: RegisterInput) -> ActionResult<UserSummary> {
    validation::register(&input)?;
    let email = input.email.trim().to_lowercase();

    let existing = store
        .find_user_by_email(&email)
        .await
        .map_err(failed("register user"))?;
    if existing.is_some() {
        let mut errors = FieldErrors::new();
        errors.add("email", "This email is already in use");
        return Err(errors.into());
    }

    let password_hash = hash_password(&input.password).map_err(failed("register user"))?;
    let user = store
        .create_user(&NewUser {
            full_name: input.full_name.trim().to_string(),
            email,
            password_hash,
            role: input.role,
        })
        .await
        .map_err(failed("register user"))?;

    info!(user_id = %user.id, role = %user.role, "registered user");
    Ok(UserSummary {
        id: user.id,
        full_name: user.full_name,
    })
}

/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn authenticate<S: UserStore + ?Sized>(store: &S, email: &str, password: &str) -> ActionResult<Session> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || password.is_empty() {
        return Err(ActionError::Unauthorized);
    }
    let user = store
        .find_user_by_email(&email)
        .await
        .map_err(failed("sign in"))?;

    match user {
        Some(user) if verify_password(password, &user.password_hash) => {
            info!(user_id = %user.id, "signed in");
            Ok(Session {
                user_id: user.id,
                user_name: user.full_name,
                email: user.email,
                role: user.role,
            })
        }
        _ => {
            warn!("rejected sign-in attempt");
            Err(ActionError::Unauthorized)
        }
    }
}

/// Everyone who can be assigned work, by name.
pub async fn team_members<S: UserStore + ?Sized>(store: &S, _session: &Session) -> ActionResult<Vec<UserSummary>> {
    store.list_users().await.map_err(failed("load team members"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_are_ordered() {
        assert!(Role::Owner.has_access(Role::Editor));
        assert!(Role::Editor.has_access(Role::Viewer));
        assert!(Role::Editor.has_access(Role::Editor));
        assert!(!Role::Viewer.has_access(Role::Editor));
        assert!(!Role::Editor.has_access(Role::Owner));
    }

    #[test]
    fn owner_only_permissions() {
        assert!(Role::Owner.can_delete_project());
        assert!(!Role::Editor.can_delete_project());
        assert!(!Role::Editor.can_manage_team());
        assert!(Role::Editor.can_create_project());
        assert!(!Role::Viewer.can_create_client());
        assert!(!Role::Viewer.can_edit_task());
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("s3cret!").unwrap();
        assert_ne!(hash, "s3cret!");
        assert!(verify_password("s3cret!", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("s3cret!", "not-a-hash"));
    }
}
