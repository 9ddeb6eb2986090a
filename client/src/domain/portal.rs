//! Session-aware facade over [`PortalApi`].
//!
//! [`Portal`] is what front ends talk to. It keeps the session cache in step
//! with login and logout, reads the role for role-scoped endpoints and drops
//! the cached user whenever the backend answers 401 to a session-bound call.

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::api::PortalApi;
use super::auth::{LoginCredentials, OtpRequest, OtpValidation};
use super::error::RequestError;
use super::gateway::Payload;
use super::ports::{HttpTransport, SnapshotStore};
use super::profile::{AdminRegistration, StaffRegistration, StudentRegistration};
use super::session::{SessionError, SessionState};
use super::students::{
    RollNumber, SpreadsheetExport, StudentFilter, StudentRecord, decode_student_list,
};
use super::user::{UserRole, UserSnapshot};

/// Backend API plus session cache.
pub struct Portal<T, S> {
    api: PortalApi<T>,
    session: SessionState<S>,
}

impl<T, S> Portal<T, S> {
    /// Combine an API client and a session cache.
    #[must_use]
    pub const fn new(api: PortalApi<T>, session: SessionState<S>) -> Self {
        Self { api, session }
    }

    /// Endpoint wrappers, for calls that need no session bookkeeping.
    #[must_use]
    pub const fn api(&self) -> &PortalApi<T> {
        &self.api
    }

    /// Session cache.
    #[must_use]
    pub const fn session(&self) -> &SessionState<S> {
        &self.session
    }
}

impl<T: HttpTransport, S: SnapshotStore> Portal<T, S> {
    /// Log in with email or phone and a password, then cache the user.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Request`] when the backend rejects the login
    /// or answers without a user, and [`SessionError::Store`] when the
    /// snapshot cannot be persisted.
    pub async fn login_with_password(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<UserSnapshot, SessionError> {
        let payload = self.api.login(credentials).await?;
        self.remember(payload)
    }

    /// Ask the backend to email a login passcode.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Request`] when the backend call fails.
    pub async fn request_otp(&self, email: &str) -> Result<(), SessionError> {
        let request = OtpRequest {
            email: email.trim().to_owned(),
        };
        self.api.generate_otp(&request).await?;
        Ok(())
    }

    /// Log in with an emailed passcode, then cache the user.
    ///
    /// # Errors
    ///
    /// Same as [`Portal::login_with_password`].
    pub async fn login_with_otp(
        &self,
        validation: &OtpValidation,
    ) -> Result<UserSnapshot, SessionError> {
        let payload = self.api.validate_otp(validation).await?;
        self.remember(payload)
    }

    /// End the session.
    ///
    /// Local state is cleared after the backend call, whatever its outcome:
    /// memory, the persisted snapshot and the transport credential. The
    /// backend failure, if any, is reported once clearing is done.
    ///
    /// # Errors
    ///
    /// Returns the backend failure if there was one, otherwise any storage
    /// failure met while clearing.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let outcome = self.api.logout().await;
        let cleared = self.session.clear();
        self.api.gateway().transport().clear_credentials();
        info!(backend_ok = outcome.is_ok(), "logged out");

        if let Err(err) = outcome {
            if let Err(store_err) = cleared {
                warn!(error = %store_err, "failed to remove session snapshot");
            }
            return Err(err.into());
        }
        cleared.map_err(SessionError::from)
    }

    /// Fetch the logged-in user's profile.
    ///
    /// Profiles wrapped in a `data` envelope are unwrapped.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotAuthenticated`] without a cached user, or
    /// [`SessionError::Request`] when the backend call fails.
    pub async fn profile(&self) -> Result<Value, SessionError> {
        let role = self.require_role()?;
        let result = self.api.get_profile(role).await;
        let payload = self.discard_on_unauthorized(result)?;
        Ok(unwrap_envelope(payload))
    }

    /// Apply a partial update to the logged-in user's profile.
    ///
    /// # Errors
    ///
    /// Same as [`Portal::profile`]; validation failures carry field errors.
    pub async fn update_profile<B>(&self, update: &B) -> Result<Option<Payload>, SessionError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let role = self.require_role()?;
        let result = self.api.update_profile(role, update).await;
        self.discard_on_unauthorized(result)
    }

    /// Delete the logged-in user's account, then log out.
    ///
    /// # Errors
    ///
    /// Returns the deletion failure, leaving the session untouched, or the
    /// logout outcome once deletion succeeded.
    pub async fn delete_account(&self) -> Result<(), SessionError> {
        let role = self.require_role()?;
        let result = self.api.delete_profile(role).await;
        self.discard_on_unauthorized(result)?;
        info!(%role, "account deleted");
        self.logout().await
    }

    /// Register a student account without logging in.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Request`] when the backend call fails.
    pub async fn register_student(
        &self,
        registration: &StudentRegistration,
    ) -> Result<Option<Payload>, SessionError> {
        Ok(self.api.register_student(registration).await?)
    }

    /// Register a staff account without logging in.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Request`] when the backend call fails.
    pub async fn register_staff(
        &self,
        registration: &StaffRegistration,
    ) -> Result<Option<Payload>, SessionError> {
        Ok(self.api.register_staff(registration).await?)
    }

    /// Register an administrator account without logging in.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Request`] when the backend call fails.
    pub async fn register_admin(
        &self,
        registration: &AdminRegistration,
    ) -> Result<Option<Payload>, SessionError> {
        Ok(self.api.register_admin(registration).await?)
    }

    /// Register a student on behalf of the logged-in administrator.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Request`] when the backend call fails.
    pub async fn admin_register_student(
        &self,
        registration: &StudentRegistration,
    ) -> Result<Option<Payload>, SessionError> {
        let result = self.api.admin_register_student(registration).await;
        self.discard_on_unauthorized(result)
    }

    /// Register a staff member on behalf of the logged-in administrator.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Request`] when the backend call fails.
    pub async fn admin_register_staff(
        &self,
        registration: &StaffRegistration,
    ) -> Result<Option<Payload>, SessionError> {
        let result = self.api.admin_register_staff(registration).await;
        self.discard_on_unauthorized(result)
    }

    /// Query the student directory.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Request`] when the backend call fails or a
    /// row cannot be decoded.
    pub async fn filter_students(
        &self,
        filter: &StudentFilter,
    ) -> Result<Vec<StudentRecord>, SessionError> {
        let result = self.api.filter_students(filter).await;
        let payload = self.discard_on_unauthorized(result)?;
        Ok(decode_student_list(payload)?)
    }

    /// Export the student directory as a spreadsheet.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Request`] when the backend call fails.
    pub async fn export_students(
        &self,
        filter: &StudentFilter,
    ) -> Result<SpreadsheetExport, SessionError> {
        let result = self.api.export_students(filter).await;
        self.discard_on_unauthorized(result)
    }

    /// Look up one student by roll number.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Request`] when the backend call fails.
    pub async fn student_by_roll_number(
        &self,
        roll_number: &RollNumber,
    ) -> Result<Value, SessionError> {
        let result = self.api.student_by_roll_number(roll_number).await;
        let payload = self.discard_on_unauthorized(result)?;
        Ok(payload.map_or(Value::Null, Payload::into_json))
    }

    fn remember(&self, payload: Option<Payload>) -> Result<UserSnapshot, SessionError> {
        let snapshot = payload
            .ok_or_else(|| RequestError::decode("login response carried no user"))?
            .decode::<UserSnapshot>()?;
        self.session.set(snapshot.clone())?;
        info!(role = %snapshot.role(), "logged in");
        Ok(snapshot)
    }

    fn require_role(&self) -> Result<UserRole, SessionError> {
        self.session.role().ok_or(SessionError::NotAuthenticated)
    }

    fn discard_on_unauthorized<X>(&self, result: Result<X, RequestError>) -> Result<X, SessionError> {
        result.map_err(|err| {
            if err.is_unauthorized() {
                warn!("backend rejected the session; discarding cached user");
                if let Err(store_err) = self.session.clear() {
                    warn!(error = %store_err, "failed to remove session snapshot");
                }
            }
            SessionError::from(err)
        })
    }
}

fn unwrap_envelope(payload: Option<Payload>) -> Value {
    match payload.map(Payload::into_json) {
        Some(Value::Object(mut object)) => match object.remove("data") {
            Some(inner) if !inner.is_null() => inner,
            Some(_) | None => Value::Object(object),
        },
        Some(other) => other,
        None => Value::Null,
    }
}
