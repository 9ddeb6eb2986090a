//! User roles and the cached identity snapshot.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Role assigned to a portal account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Enrolled student.
    Student,
    /// Teaching or administrative staff member.
    Staff,
    /// Portal administrator.
    Admin,
}

impl UserRole {
    /// Lower-case path segment used by role-scoped endpoints such as
    /// `/{role}/profile`.
    ///
    /// # Examples
    /// ```
    /// use portal_client::domain::UserRole;
    ///
    /// assert_eq!(UserRole::Staff.path_segment(), "staff");
    /// ```
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Staff => "staff",
            Self::Admin => "admin",
        }
    }

    /// Wire representation, as returned by the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "STUDENT",
            Self::Staff => "STAFF",
            Self::Admin => "ADMIN",
        }
    }

    /// Landing page for a freshly logged-in user of this role.
    #[must_use]
    pub fn dashboard_path(self) -> String {
        format!("/{}/dashboard", self.path_segment())
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a role name is not one of the portal roles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role '{value}'; expected student, staff or admin")]
pub struct UnknownRoleError {
    /// Rejected input.
    pub value: String,
}

impl FromStr for UserRole {
    type Err = UnknownRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        [Self::Student, Self::Staff, Self::Admin]
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownRoleError {
                value: trimmed.to_owned(),
            })
    }
}

/// Client-cached record of the logged-in user.
///
/// The backend owns the profile schema, so only `role` is typed. Every other
/// field is kept verbatim, which lets a snapshot be persisted and restored
/// without loss.
///
/// # Examples
/// ```
/// use portal_client::domain::{UserRole, UserSnapshot};
/// use serde_json::json;
///
/// let snapshot = UserSnapshot::from_value(json!({"role": "STUDENT", "id": 7}))
///     .expect("valid snapshot");
/// assert_eq!(snapshot.role(), UserRole::Student);
/// assert_eq!(snapshot.id(), Some(&json!(7)));
/// assert_eq!(snapshot.to_value(), json!({"role": "STUDENT", "id": 7}));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSnapshot {
    role: UserRole,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl UserSnapshot {
    /// Build a snapshot from a role and the remaining profile fields.
    ///
    /// A `role` key inside `fields` is discarded in favour of `role`.
    #[must_use]
    pub fn new(role: UserRole, mut fields: Map<String, Value>) -> Self {
        fields.remove("role");
        Self { role, fields }
    }

    /// Decode a snapshot from a backend login response.
    ///
    /// # Errors
    ///
    /// Fails when `value` is not an object or carries no recognised `role`.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Encode the snapshot back into its wire form.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut object = self.fields.clone();
        object.insert("role".to_owned(), Value::String(self.role.as_str().to_owned()));
        Value::Object(object)
    }

    /// Role of the logged-in user.
    #[must_use]
    pub const fn role(&self) -> UserRole {
        self.role
    }

    /// Backend identifier, when the login response carried one.
    #[must_use]
    pub fn id(&self) -> Option<&Value> {
        self.fields.get("id")
    }

    /// Any other profile field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Display name, falling back to email then phone.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        ["name", "email", "phone"]
            .into_iter()
            .find_map(|key| self.fields.get(key).and_then(Value::as_str))
            .filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for role parsing and snapshot round-trips.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("student", UserRole::Student)]
    #[case("STAFF", UserRole::Staff)]
    #[case("  Admin ", UserRole::Admin)]
    fn parses_roles_case_insensitively(#[case] raw: &str, #[case] expected: UserRole) {
        assert_eq!(raw.parse::<UserRole>(), Ok(expected));
    }

    #[test]
    fn rejects_unknown_roles() {
        let err = "lecturer".parse::<UserRole>().expect_err("unknown role");
        assert_eq!(err.value, "lecturer");
    }

    #[rstest]
    #[case(UserRole::Student, "/student/dashboard")]
    #[case(UserRole::Staff, "/staff/dashboard")]
    #[case(UserRole::Admin, "/admin/dashboard")]
    fn dashboard_paths_follow_role(#[case] role: UserRole, #[case] expected: &str) {
        assert_eq!(role.dashboard_path(), expected);
    }

    #[test]
    fn snapshot_round_trips_unknown_fields() {
        let wire = json!({
            "role": "ADMIN",
            "email": "root@example.com",
            "phone": "9876543210",
            "name": "Root",
            "nested": {"a": [1, 2, 3]}
        });
        let snapshot = UserSnapshot::from_value(wire.clone()).expect("decode");
        assert_eq!(snapshot.to_value(), wire);
        assert_eq!(snapshot.display_name(), Some("Root"));
        assert_eq!(snapshot.field("nested"), Some(&json!({"a": [1, 2, 3]})));
        assert_eq!(snapshot.field("role"), None);
        assert!(snapshot.id().is_none());
    }

    #[test]
    fn snapshot_requires_known_role() {
        assert!(UserSnapshot::from_value(json!({"role": "GUEST"})).is_err());
        assert!(UserSnapshot::from_value(json!({"id": 1})).is_err());
        assert!(UserSnapshot::from_value(json!("STUDENT")).is_err());
    }

    #[test]
    fn new_ignores_role_inside_fields() {
        let mut fields = Map::new();
        fields.insert("role".to_owned(), json!("ADMIN"));
        fields.insert("id".to_owned(), json!(3));
        let snapshot = UserSnapshot::new(UserRole::Staff, fields);
        assert_eq!(snapshot.to_value(), json!({"role": "STAFF", "id": 3}));
    }
}
