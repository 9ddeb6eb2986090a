//! Domain primitives, the request gateway and the session cache.
//!
//! Purpose: keep every backend interaction behind one gateway so that
//! callers see a single success contract and a single error shape, and keep
//! the cached user in step with login, logout and rejected sessions.
//!
//! Public surface:
//! - `RequestGateway`: the only path to the backend.
//! - `PortalApi`: one wrapper per endpoint.
//! - `SessionState`: in-memory user snapshot backed by a `SnapshotStore`.
//! - `Portal`: session-aware facade used by front ends.

pub mod api;
pub mod auth;
pub mod error;
pub mod gateway;
pub mod portal;
pub mod ports;
pub mod profile;
pub mod session;
pub mod students;
pub mod user;

pub use self::api::PortalApi;
pub use self::auth::{
    LoginCredentials, LoginIdentifier, LoginValidationError, OTP_LENGTH, OtpCode, OtpRequest,
    OtpValidation, OtpValidationError,
};
pub use self::error::{
    ApiError, FieldErrors, RequestError, VALIDATION_FAILED_MESSAGE, VALIDATION_FAILURE_MARKER,
};
pub use self::gateway::{DEFAULT_CONTENT_TYPE, Download, Payload, RequestGateway, RequestOptions};
pub use self::portal::Portal;
pub use self::profile::{
    AdminProfileUpdate, AdminRegistration, Department, Gender, StaffProfileUpdate,
    StaffRegistration, StudentProfileUpdate, StudentRegistration, UnknownVariantError,
};
pub use self::session::{RouteDecision, SessionError, SessionState};
pub use self::students::{
    DEFAULT_EXPORT_FILENAME, RollNumber, RollNumberError, SortDirection, SpreadsheetExport,
    StudentFilter, StudentRecord, StudentSortKey, decode_student_list,
};
pub use self::user::{UnknownRoleError, UserRole, UserSnapshot};
