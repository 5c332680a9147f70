//! Registration, login, and session authentication

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::access::Principal;
use crate::error::{Error, Result};
use crate::models::{Role, Session, User};
use crate::storage::UserRepository;

/// Session lifetime granted at login: one week
pub const SESSION_HOURS: i64 = 24 * 7;

/// Account and session operations over any user repository
pub struct AuthService<'a, R: UserRepository> {
    repo: &'a R,
}

impl<'a, R: UserRepository> AuthService<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Register a new account with the Student role
    #[instrument(skip(self, password))]
    pub fn register(&self, username: &str, email: &str, password: &str) -> Result<User> {
        self.register_with_role(username, email, password, Role::Student)
    }

    /// Register a new account with an explicit role (admin tooling)
    #[instrument(skip(self, password))]
    pub fn register_with_role(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<User> {
        if username.len() < 3 {
            return Err(Error::InvalidOperation(
                "Username must be at least 3 characters".into(),
            ));
        }
        if password.len() < 8 {
            return Err(Error::InvalidOperation(
                "Password must be at least 8 characters".into(),
            ));
        }
        if self.repo.find_user_by_username(username)?.is_some() {
            return Err(Error::InvalidOperation("Username already exists".into()));
        }
        if self.repo.find_user_by_email(email)?.is_some() {
            return Err(Error::InvalidOperation("Email already registered".into()));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| Error::Authentication(format!("Failed to hash password: {e}")))?
            .to_string();

        let user = User::new(username.to_string(), email.to_string(), password_hash, role);
        self.repo.create_user(&user)?;

        info!(user_id = %user.id, %role, "Registered new user");
        Ok(user)
    }

    /// Verify credentials and open a one-week session
    ///
    /// Failures are uniform `Authentication` errors so callers cannot probe
    /// which usernames exist.
    #[instrument(skip(self, password))]
    pub fn login(&self, username: &str, password: &str) -> Result<(User, Session)> {
        let user = self
            .repo
            .find_user_by_username(username)?
            .ok_or_else(|| Error::Authentication("Invalid username or password".into()))?;

        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|_| Error::Authentication("Invalid stored password".into()))?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| Error::Authentication("Invalid username or password".into()))?;

        self.repo.update_last_login(user.id)?;

        let session = Session::new(user.id, SESSION_HOURS);
        self.repo.create_session(&session)?;

        info!(user_id = %user.id, "User logged in");
        Ok((user, session))
    }

    /// End a session
    pub fn logout(&self, session_id: Uuid) -> Result<()> {
        self.repo.delete_session(session_id)
    }

    /// Resolve a session id into the acting principal
    #[instrument(skip(self))]
    pub fn authenticate(&self, session_id: Uuid) -> Result<Principal> {
        let session = self
            .repo
            .find_valid_session(session_id)?
            .ok_or_else(|| Error::Authentication("Session expired or unknown".into()))?;

        let user = self
            .repo
            .find_user_by_id(session.user_id)?
            .ok_or_else(|| Error::Authentication("Session user no longer exists".into()))?;

        Ok(Principal::new(user.id, user.role))
    }
}
