//! Registration and profile-update payloads for the three portal roles.
//!
//! Registration bodies send `null` for optional fields the user left empty;
//! update bodies are partial and omit untouched fields entirely.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when text does not name a known enumeration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariantError {
    /// Enumeration being parsed.
    pub kind: &'static str,
    /// Rejected input.
    pub value: String,
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$variant_meta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $( $(#[$variant_meta])* $variant ),+
        }

        impl $name {
            /// Every value, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Wire representation.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariantError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.as_str().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| UnknownVariantError {
                        kind: $kind,
                        value: trimmed.to_owned(),
                    })
            }
        }
    };
}

wire_enum! {
    /// Academic department.
    Department, "department" {
        /// Science.
        Science => "SCIENCE",
        /// Commerce.
        Commerce => "COMMERCE",
        /// Arts.
        Arts => "ARTS",
        /// Engineering.
        Engineering => "ENGINEERING",
    }
}

wire_enum! {
    /// Gender as recorded by the backend.
    Gender, "gender" {
        /// Male.
        Male => "MALE",
        /// Female.
        Female => "FEMALE",
        /// Other or undisclosed.
        Other => "OTHER",
    }
}

/// Self-registration or admin-created student account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRegistration {
    /// Login email.
    pub email: Option<String>,
    /// Ten-digit mobile number.
    pub phone: Option<String>,
    /// Full name.
    pub name: String,
    /// Initial password.
    pub password: String,
    /// Course the student enrols in.
    pub course_id: Option<u64>,
    /// Department.
    pub department: Option<Department>,
    /// Postal address.
    pub address: Option<String>,
    /// Age in years.
    pub age: Option<u32>,
    /// Gender.
    pub gender: Option<Gender>,
    /// Year of study.
    pub academic_year: Option<u32>,
    /// Current semester.
    pub semester: Option<u32>,
}

/// Staff account registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffRegistration {
    /// Login email.
    pub email: Option<String>,
    /// Ten-digit mobile number.
    pub phone: Option<String>,
    /// Full name.
    pub name: String,
    /// Initial password.
    pub password: String,
    /// Department.
    pub department: Option<Department>,
    /// Course the staff member teaches.
    pub course_id: Option<u64>,
    /// Postal address.
    pub address: Option<String>,
    /// Age in years.
    pub age: Option<u32>,
    /// Gender.
    pub gender: Option<Gender>,
    /// Staff role name; the backend owns the set of values.
    pub staff_role: Option<String>,
}

/// Administrator account registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRegistration {
    /// Full name.
    pub name: String,
    /// Login email.
    pub email: Option<String>,
    /// Ten-digit mobile number.
    pub phone: Option<String>,
    /// Initial password.
    pub password: String,
    /// Gender.
    pub gender: Option<Gender>,
}

/// Partial update of a student's own profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfileUpdate {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New course.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<u64>,
    /// New department.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<Department>,
    /// New address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// New age.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    /// New gender.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    /// New year of study.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub academic_year: Option<u32>,
    /// New semester.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester: Option<u32>,
    /// New password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Partial update of a staff member's own profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffProfileUpdate {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// New department.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<Department>,
    /// New staff role.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_role: Option<String>,
    /// New course.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<u64>,
    /// New address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// New gender.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    /// New age.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
}

/// Partial update of an administrator's own profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfileUpdate {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New gender.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    /// New password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}
