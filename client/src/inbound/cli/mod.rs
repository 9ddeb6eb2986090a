//! `portal` command flow.
//!
//! The binary parses [`Cli`], builds a live [`Portal`] with [`connect`] and
//! hands both to [`execute`]. Keeping the flow here lets tests drive every
//! command against a scripted transport without spawning a process.

mod args;
mod error;

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use camino::Utf8PathBuf;
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

pub use self::args::{
    Cli, Command, FilterArgs, OtpCommand, PayloadArgs, ProfileCommand, RoleArg, StudentsCommand,
};
pub use self::error::CliError;
use crate::config::PortalSettings;
use crate::domain::ports::{HttpTransport, SnapshotStore};
use crate::domain::{
    AdminProfileUpdate, AdminRegistration, LoginCredentials, OtpCode, OtpValidation, Payload,
    Portal, PortalApi, RequestGateway, RollNumber, RouteDecision, SessionError, SessionState,
    StaffProfileUpdate, StaffRegistration, StudentFilter, StudentProfileUpdate,
    StudentRegistration, UserRole, UserSnapshot,
};
use crate::outbound::http::{ReqwestTransport, SessionCookies};
use crate::outbound::storage::{FileSnapshotStore, open_state_dir, write_atomic};

/// Portal wired to the network and the state directory.
pub type LivePortal = Portal<ReqwestTransport, FileSnapshotStore>;

/// Build a [`LivePortal`] from settings, restoring any saved session.
///
/// # Errors
///
/// Returns [`CliError::Config`] for unusable settings and [`CliError::Io`]
/// when the state directory cannot be opened.
pub fn connect(settings: &PortalSettings) -> Result<LivePortal, CliError> {
    let origin = settings.origin().map_err(|err| CliError::Config {
        message: err.to_string(),
    })?;
    let state_path = utf8_path(settings.state_dir())?;
    let dir = open_state_dir(&state_path)
        .map_err(|err| CliError::io(format!("open state directory '{state_path}'"), &err))?;
    let cookie_dir = dir
        .try_clone()
        .map_err(|err| CliError::io(format!("open state directory '{state_path}'"), &err))?;

    let cookies = Arc::new(SessionCookies::persistent(cookie_dir));
    let transport = ReqwestTransport::new(origin, cookies, settings.request_timeout())
        .map_err(|err| CliError::Config {
            message: err.to_string(),
        })?;
    let gateway = RequestGateway::new(transport, settings.api_base());
    let session = SessionState::restore(FileSnapshotStore::new(dir));
    Ok(Portal::new(PortalApi::new(gateway), session))
}

/// Run one command and write its JSON result to `out`.
///
/// # Errors
///
/// Returns [`CliError`] for invalid input, failed backend calls or local
/// I/O failures.
pub async fn execute<T, S, W>(
    portal: &Portal<T, S>,
    command: Command,
    out: &mut W,
) -> Result<(), CliError>
where
    T: HttpTransport,
    S: SnapshotStore,
    W: Write,
{
    let result = match command {
        Command::Login {
            identifier,
            password,
        } => {
            let credentials = LoginCredentials::from_identifier(&identifier, &password)
                .map_err(|err| CliError::invalid_input(err.to_string()))?;
            let snapshot = portal.login_with_password(&credentials).await?;
            signed_in(&snapshot)
        }
        Command::Otp(otp) => run_otp(portal, otp).await?,
        Command::Logout => {
            portal.logout().await?;
            json!({"loggedOut": true})
        }
        Command::Whoami { require } => whoami(portal, require.map(UserRole::from))?,
        Command::Register {
            role,
            payload,
            by_admin,
        } => register(portal, role, &read_payload(&payload)?, by_admin).await?,
        Command::Profile(profile) => run_profile(portal, profile).await?,
        Command::Students(students) => run_students(portal, students).await?,
    };
    write_json(out, &result)
}

async fn run_otp<T, S>(portal: &Portal<T, S>, command: OtpCommand) -> Result<Value, CliError>
where
    T: HttpTransport,
    S: SnapshotStore,
{
    match command {
        OtpCommand::Send { email } => {
            portal.request_otp(&email).await?;
            Ok(json!({"sent": email.trim()}))
        }
        OtpCommand::Verify { email, code } => {
            let otp =
                OtpCode::from_pasted(&code).map_err(|err| CliError::invalid_input(err.to_string()))?;
            let validation = OtpValidation {
                email: email.trim().to_owned(),
                otp,
            };
            let snapshot = portal.login_with_otp(&validation).await?;
            Ok(signed_in(&snapshot))
        }
    }
}

fn whoami<T, S>(portal: &Portal<T, S>, require: Option<UserRole>) -> Result<Value, CliError>
where
    T: HttpTransport,
    S: SnapshotStore,
{
    let session = portal.session();
    let snapshot = session.current().ok_or(SessionError::NotAuthenticated)?;
    if let Some(required) = require {
        if session.authorize(Some(required)) == RouteDecision::RedirectToLogin {
            return Err(CliError::AccessDenied { required });
        }
    }
    Ok(signed_in(&snapshot))
}

async fn register<T, S>(
    portal: &Portal<T, S>,
    role: RoleArg,
    payload: &Value,
    by_admin: bool,
) -> Result<Value, CliError>
where
    T: HttpTransport,
    S: SnapshotStore,
{
    let response = match (role, by_admin) {
        (RoleArg::Student, false) => {
            portal
                .register_student(&decode::<StudentRegistration>(payload)?)
                .await?
        }
        (RoleArg::Student, true) => {
            portal
                .admin_register_student(&decode::<StudentRegistration>(payload)?)
                .await?
        }
        (RoleArg::Staff, false) => {
            portal
                .register_staff(&decode::<StaffRegistration>(payload)?)
                .await?
        }
        (RoleArg::Staff, true) => {
            portal
                .admin_register_staff(&decode::<StaffRegistration>(payload)?)
                .await?
        }
        (RoleArg::Admin, false) => {
            portal
                .register_admin(&decode::<AdminRegistration>(payload)?)
                .await?
        }
        (RoleArg::Admin, true) => {
            return Err(CliError::invalid_input(
                "administrators register through the public endpoint; drop --by-admin",
            ));
        }
    };
    Ok(payload_json(response))
}

async fn run_profile<T, S>(portal: &Portal<T, S>, command: ProfileCommand) -> Result<Value, CliError>
where
    T: HttpTransport,
    S: SnapshotStore,
{
    match command {
        ProfileCommand::Show => Ok(portal.profile().await?),
        ProfileCommand::Update { payload } => {
            let body = read_payload(&payload)?;
            let role = portal
                .session()
                .role()
                .ok_or(SessionError::NotAuthenticated)?;
            let response = match role {
                UserRole::Student => {
                    portal
                        .update_profile(&decode::<StudentProfileUpdate>(&body)?)
                        .await?
                }
                UserRole::Staff => {
                    portal
                        .update_profile(&decode::<StaffProfileUpdate>(&body)?)
                        .await?
                }
                UserRole::Admin => {
                    portal
                        .update_profile(&decode::<AdminProfileUpdate>(&body)?)
                        .await?
                }
            };
            Ok(payload_json(response))
        }
        ProfileCommand::Delete { yes } => {
            if !yes {
                return Err(CliError::Unconfirmed);
            }
            portal.delete_account().await?;
            Ok(json!({"deleted": true}))
        }
    }
}

async fn run_students<T, S>(
    portal: &Portal<T, S>,
    command: StudentsCommand,
) -> Result<Value, CliError>
where
    T: HttpTransport,
    S: SnapshotStore,
{
    match command {
        StudentsCommand::Filter(args) => {
            let rows = portal.filter_students(&StudentFilter::from(args)).await?;
            to_value(&rows)
        }
        StudentsCommand::Export { filter, output_dir } => {
            let export = portal
                .export_students(&StudentFilter::from(filter))
                .await?;
            let dir_path = utf8_path(output_dir)?;
            let dir = open_state_dir(&dir_path)
                .map_err(|err| CliError::io(format!("open output directory '{dir_path}'"), &err))?;
            write_atomic(&dir, &export.filename, &export.bytes)
                .map_err(|err| CliError::io(format!("write '{}'", export.filename), &err))?;
            Ok(json!({
                "file": dir_path.join(&export.filename).as_str(),
                "bytes": export.bytes.len(),
            }))
        }
        StudentsCommand::Get { roll_no } => {
            let roll = RollNumber::parse(&roll_no)
                .map_err(|err| CliError::invalid_input(err.to_string()))?;
            Ok(portal.student_by_roll_number(&roll).await?)
        }
    }
}

fn signed_in(snapshot: &UserSnapshot) -> Value {
    json!({
        "user": snapshot.to_value(),
        "dashboard": snapshot.role().dashboard_path(),
    })
}

fn payload_json(payload: Option<Payload>) -> Value {
    payload.map_or(Value::Null, Payload::into_json)
}

fn decode<D: DeserializeOwned>(payload: &Value) -> Result<D, CliError> {
    serde_json::from_value(payload.clone()).map_err(|err| CliError::InvalidPayload {
        message: err.to_string(),
    })
}

fn to_value<V: Serialize>(value: &V) -> Result<Value, CliError> {
    serde_json::to_value(value).map_err(|err| CliError::InvalidPayload {
        message: err.to_string(),
    })
}

fn read_payload(args: &PayloadArgs) -> Result<Value, CliError> {
    let text = match (&args.json, &args.file) {
        (Some(inline), _) => inline.clone(),
        (None, Some(path)) => read_file(path)?,
        (None, None) => {
            return Err(CliError::InvalidPayload {
                message: "supply --json or --file".to_owned(),
            });
        }
    };
    serde_json::from_str(&text).map_err(|err| CliError::InvalidPayload {
        message: err.to_string(),
    })
}

fn read_file(path: &Path) -> Result<String, CliError> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().ok_or_else(|| CliError::InvalidPayload {
        message: format!("'{}' is not a file", path.display()),
    })?;
    Dir::open_ambient_dir(parent, ambient_authority())
        .and_then(|dir| dir.read_to_string(file_name))
        .map_err(|err| CliError::io(format!("read '{}'", path.display()), &err))
}

fn utf8_path(path: std::path::PathBuf) -> Result<Utf8PathBuf, CliError> {
    Utf8PathBuf::from_path_buf(path).map_err(|raw| CliError::Config {
        message: format!("'{}' is not valid UTF-8", raw.display()),
    })
}

fn write_json<W: Write>(out: &mut W, value: &Value) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *out, value)
        .map_err(std::io::Error::from)
        .and_then(|()| writeln!(out))
        .map_err(|err| CliError::io("write output", &err))
}
