//! One wrapper per backend endpoint.
//!
//! Wrappers are stateless: they serialize the payload, pick the method and
//! path, and return whatever the gateway parsed. Session bookkeeping lives
//! in [`crate::domain::Portal`].

use serde::Serialize;

use super::auth::{LoginCredentials, OtpRequest, OtpValidation};
use super::error::RequestError;
use super::gateway::{Payload, RequestGateway, RequestOptions};
use super::ports::{HttpMethod, HttpTransport};
use super::profile::{AdminRegistration, StaffRegistration, StudentRegistration};
use super::students::{RollNumber, SpreadsheetExport, StudentFilter};
use super::user::UserRole;

/// Password login.
pub const LOGIN_PATH: &str = "/auth/login-user";
/// Email passcode request.
pub const GENERATE_OTP_PATH: &str = "/auth/login/generate-otp";
/// Email passcode login.
pub const VALIDATE_OTP_PATH: &str = "/auth/login/validate-otp";
/// Session termination.
pub const LOGOUT_PATH: &str = "/auth/logout-user";
/// Student self-registration.
pub const REGISTER_STUDENT_PATH: &str = "/auth/register-student";
/// Staff self-registration.
pub const REGISTER_STAFF_PATH: &str = "/auth/register-staff";
/// Administrator registration.
pub const REGISTER_ADMIN_PATH: &str = "/auth/register-admin";
/// Student registration performed by an administrator.
pub const ADMIN_REGISTER_STUDENT_PATH: &str = "/admin/register-student";
/// Staff registration performed by an administrator.
pub const ADMIN_REGISTER_STAFF_PATH: &str = "/admin/register-staff";
/// Student directory query.
pub const FILTER_STUDENTS_PATH: &str = "/admin/students/filter";
/// Student directory spreadsheet export.
pub const EXPORT_STUDENTS_PATH: &str = "/admin/students/filter/export/excel";

/// Typed access to every portal endpoint.
pub struct PortalApi<T> {
    gateway: RequestGateway<T>,
}

impl<T> PortalApi<T> {
    /// Wrap a gateway.
    #[must_use]
    pub const fn new(gateway: RequestGateway<T>) -> Self {
        Self { gateway }
    }

    /// Underlying gateway.
    #[must_use]
    pub const fn gateway(&self) -> &RequestGateway<T> {
        &self.gateway
    }
}

impl<T: HttpTransport> PortalApi<T> {
    async fn post_json<B>(&self, path: &str, payload: &B) -> Result<Option<Payload>, RequestError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let options = RequestOptions::new(HttpMethod::Post).with_json(payload)?;
        self.gateway.request(path, options).await
    }

    /// `POST /auth/login-user`.
    ///
    /// # Errors
    ///
    /// Propagates the gateway's [`RequestError`].
    pub async fn login(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Option<Payload>, RequestError> {
        self.post_json(LOGIN_PATH, credentials).await
    }

    /// `POST /auth/login/generate-otp`.
    ///
    /// # Errors
    ///
    /// Propagates the gateway's [`RequestError`].
    pub async fn generate_otp(&self, request: &OtpRequest) -> Result<Option<Payload>, RequestError> {
        self.post_json(GENERATE_OTP_PATH, request).await
    }

    /// `POST /auth/login/validate-otp`.
    ///
    /// # Errors
    ///
    /// Propagates the gateway's [`RequestError`].
    pub async fn validate_otp(
        &self,
        validation: &OtpValidation,
    ) -> Result<Option<Payload>, RequestError> {
        self.post_json(VALIDATE_OTP_PATH, validation).await
    }

    /// `POST /auth/logout-user` with no body.
    ///
    /// # Errors
    ///
    /// Propagates the gateway's [`RequestError`].
    pub async fn logout(&self) -> Result<Option<Payload>, RequestError> {
        self.gateway
            .request(LOGOUT_PATH, RequestOptions::new(HttpMethod::Post))
            .await
    }

    /// `POST /auth/register-student`.
    ///
    /// # Errors
    ///
    /// Propagates the gateway's [`RequestError`].
    pub async fn register_student(
        &self,
        registration: &StudentRegistration,
    ) -> Result<Option<Payload>, RequestError> {
        self.post_json(REGISTER_STUDENT_PATH, registration).await
    }

    /// `POST /auth/register-staff`.
    ///
    /// # Errors
    ///
    /// Propagates the gateway's [`RequestError`].
    pub async fn register_staff(
        &self,
        registration: &StaffRegistration,
    ) -> Result<Option<Payload>, RequestError> {
        self.post_json(REGISTER_STAFF_PATH, registration).await
    }

    /// `POST /auth/register-admin`.
    ///
    /// # Errors
    ///
    /// Propagates the gateway's [`RequestError`].
    pub async fn register_admin(
        &self,
        registration: &AdminRegistration,
    ) -> Result<Option<Payload>, RequestError> {
        self.post_json(REGISTER_ADMIN_PATH, registration).await
    }

    /// `POST /admin/register-student`, performed by a logged-in admin.
    ///
    /// # Errors
    ///
    /// Propagates the gateway's [`RequestError`].
    pub async fn admin_register_student(
        &self,
        registration: &StudentRegistration,
    ) -> Result<Option<Payload>, RequestError> {
        self.post_json(ADMIN_REGISTER_STUDENT_PATH, registration)
            .await
    }

    /// `POST /admin/register-staff`, performed by a logged-in admin.
    ///
    /// # Errors
    ///
    /// Propagates the gateway's [`RequestError`].
    pub async fn admin_register_staff(
        &self,
        registration: &StaffRegistration,
    ) -> Result<Option<Payload>, RequestError> {
        self.post_json(ADMIN_REGISTER_STAFF_PATH, registration).await
    }

    /// `GET /{role}/profile`.
    ///
    /// # Errors
    ///
    /// Propagates the gateway's [`RequestError`].
    pub async fn get_profile(&self, role: UserRole) -> Result<Option<Payload>, RequestError> {
        let path = format!("/{}/profile", role.path_segment());
        self.gateway.request(&path, RequestOptions::default()).await
    }

    /// `PATCH /{role}/profile/update` with a partial update body.
    ///
    /// # Errors
    ///
    /// Propagates the gateway's [`RequestError`].
    pub async fn update_profile<B>(
        &self,
        role: UserRole,
        update: &B,
    ) -> Result<Option<Payload>, RequestError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let path = format!("/{}/profile/update", role.path_segment());
        let options = RequestOptions::new(HttpMethod::Patch).with_json(update)?;
        self.gateway.request(&path, options).await
    }

    /// `DELETE /{role}/delete`.
    ///
    /// # Errors
    ///
    /// Propagates the gateway's [`RequestError`].
    pub async fn delete_profile(&self, role: UserRole) -> Result<Option<Payload>, RequestError> {
        let path = format!("/{}/delete", role.path_segment());
        self.gateway
            .request(&path, RequestOptions::new(HttpMethod::Delete))
            .await
    }

    /// `GET /admin/students/filter?<query>`.
    ///
    /// # Errors
    ///
    /// Propagates the gateway's [`RequestError`].
    pub async fn filter_students(
        &self,
        filter: &StudentFilter,
    ) -> Result<Option<Payload>, RequestError> {
        let path = format!("{FILTER_STUDENTS_PATH}?{}", filter.to_query_string());
        self.gateway.request(&path, RequestOptions::default()).await
    }

    /// `GET /admin/students/filter/export/excel?<query>`.
    ///
    /// # Errors
    ///
    /// Propagates the gateway's [`RequestError`]; failures are normalized
    /// like any other call.
    pub async fn export_students(
        &self,
        filter: &StudentFilter,
    ) -> Result<SpreadsheetExport, RequestError> {
        let path = format!("{EXPORT_STUDENTS_PATH}?{}", filter.to_query_string());
        let download = self.gateway.download(&path).await?;
        Ok(SpreadsheetExport::from(download))
    }

    /// `GET /admin/student/{rollNo}`.
    ///
    /// # Errors
    ///
    /// Propagates the gateway's [`RequestError`].
    pub async fn student_by_roll_number(
        &self,
        roll_number: &RollNumber,
    ) -> Result<Option<Payload>, RequestError> {
        let path = format!("/admin/student/{roll_number}");
        self.gateway.request(&path, RequestOptions::default()).await
    }
}
