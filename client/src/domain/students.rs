//! Admin student directory: filter criteria, records and spreadsheet export.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::form_urlencoded;

use super::error::RequestError;
use super::gateway::{Download, Payload};
use super::profile::{Department, Gender, UnknownVariantError};
use super::user::UserRole;

/// File name used when the export response does not suggest one.
pub const DEFAULT_EXPORT_FILENAME: &str = "Students_Data.xlsx";

/// Column the directory can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StudentSortKey {
    /// Registration time.
    CreatedAt,
    /// Student name.
    Name,
    /// Email address.
    Email,
    /// Phone number.
    Phone,
    /// Course title.
    CourseTitle,
    /// Department.
    Department,
    /// Marks.
    Marks,
    /// Year of study.
    AcademicYear,
}

impl StudentSortKey {
    const ALL: [Self; 8] = [
        Self::CreatedAt,
        Self::Name,
        Self::Email,
        Self::Phone,
        Self::CourseTitle,
        Self::Department,
        Self::Marks,
        Self::AcademicYear,
    ];

    /// Query parameter value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "createdAt",
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::CourseTitle => "courseTitle",
            Self::Department => "department",
            Self::Marks => "marks",
            Self::AcademicYear => "academicYear",
        }
    }
}

impl fmt::Display for StudentSortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StudentSortKey {
    type Err = UnknownVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownVariantError {
                kind: "sort key",
                value: trimmed.to_owned(),
            })
    }
}

/// Sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    #[default]
    Desc,
}

impl SortDirection {
    /// Query parameter value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = UnknownVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(UnknownVariantError {
                kind: "sort direction",
                value: s.trim().to_owned(),
            }),
        }
    }
}

/// Filter criteria for the admin student directory.
///
/// Unset and empty criteria are left out of the query string.
///
/// # Examples
/// ```
/// use portal_client::domain::{Gender, StudentFilter};
///
/// let filter = StudentFilter {
///     name: Some("Asha Rao".into()),
///     gender: Some(Gender::Female),
///     ..StudentFilter::default()
/// };
/// assert_eq!(filter.to_query_string(), "name=Asha+Rao&Gender=FEMALE");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentFilter {
    /// Free-text search across several columns.
    pub keyword: Option<String>,
    /// Exact roll number.
    pub roll_no: Option<String>,
    /// Name.
    pub name: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Department.
    pub department: Option<Department>,
    /// Course title.
    pub course_name: Option<String>,
    /// Gender.
    pub gender: Option<Gender>,
    /// Year of study.
    pub academic_year: Option<u32>,
    /// Semester.
    pub semester: Option<u32>,
    /// Marks.
    pub marks: Option<f64>,
    /// Sort column.
    pub sort_by: Option<StudentSortKey>,
    /// Sort order.
    pub sort_dir: Option<SortDirection>,
}

impl StudentFilter {
    /// Encode the criteria as a form-urlencoded query string without the
    /// leading `?`.
    ///
    /// The backend reads gender from a capitalised `Gender` parameter.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let pairs = [
            ("keyword", self.keyword.clone()),
            ("rollNo", self.roll_no.clone()),
            ("name", self.name.clone()),
            ("email", self.email.clone()),
            ("department", self.department.map(|value| value.to_string())),
            ("courseName", self.course_name.clone()),
            ("Gender", self.gender.map(|value| value.to_string())),
            ("academicYear", self.academic_year.map(|value| value.to_string())),
            ("semester", self.semester.map(|value| value.to_string())),
            ("marks", self.marks.map(|value| value.to_string())),
            ("sortBy", self.sort_by.map(|value| value.to_string())),
            ("sortDir", self.sort_dir.map(|value| value.to_string())),
        ];

        let mut query = form_urlencoded::Serializer::new(String::new());
        for (key, value) in pairs {
            if let Some(text) = value.filter(|text| !text.is_empty()) {
                query.append_pair(key, &text);
            }
        }
        query.finish()
    }
}

/// One row of the student directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    /// Email address.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Full name.
    pub name: Option<String>,
    /// Account role.
    pub role: Option<UserRole>,
    /// Roll number.
    pub roll_no: Option<String>,
    /// Course title.
    pub course_title: Option<String>,
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
    /// Semester.
    pub semester: Option<u32>,
    /// Marks.
    pub marks: Option<f64>,
}

/// Extract student rows from a filter response.
///
/// Accepts a bare array or an object wrapping the array under `data` or
/// `content`. Anything else yields an empty list.
///
/// # Errors
///
/// Returns [`RequestError::Decode`] when an array element is not a student
/// record.
pub fn decode_student_list(payload: Option<Payload>) -> Result<Vec<StudentRecord>, RequestError> {
    let rows = match payload.map(Payload::into_json) {
        Some(Value::Array(rows)) => rows,
        Some(Value::Object(mut wrapper)) => ["data", "content"]
            .into_iter()
            .find_map(|key| match wrapper.remove(key) {
                Some(Value::Array(rows)) => Some(rows),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    };
    serde_json::from_value(Value::Array(rows)).map_err(|err| RequestError::decode(err.to_string()))
}

/// Error returned when a roll number cannot be used as a path segment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RollNumberError {
    /// Blank input.
    #[error("roll number must not be empty")]
    Empty,
    /// Input contains characters outside `[A-Za-z0-9_-]`.
    #[error("roll number '{value}' contains unsupported characters")]
    InvalidCharacters {
        /// Rejected input.
        value: String,
    },
}

/// Roll number that is safe to interpolate into an endpoint path.
///
/// # Examples
/// ```
/// use portal_client::domain::RollNumber;
///
/// assert!(RollNumber::parse("TSP-2024-001").is_ok());
/// assert!(RollNumber::parse("../profile").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RollNumber(String);

impl RollNumber {
    /// Validate a roll number.
    ///
    /// # Errors
    ///
    /// Returns [`RollNumberError`] for blank input or characters that would
    /// change the meaning of the request path.
    pub fn parse(raw: &str) -> Result<Self, RollNumberError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RollNumberError::Empty);
        }
        if !trimmed
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
        {
            return Err(RollNumberError::InvalidCharacters {
                value: trimmed.to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Roll number text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RollNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Spreadsheet returned by the export endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetExport {
    /// Workbook bytes.
    pub bytes: Vec<u8>,
    /// Bare file name to save under.
    pub filename: String,
}

impl From<Download> for SpreadsheetExport {
    fn from(download: Download) -> Self {
        let filename = download
            .filename
            .as_deref()
            .and_then(|name| name.rsplit(['/', '\\']).next())
            .filter(|name| !name.is_empty() && *name != "." && *name != "..")
            .unwrap_or(DEFAULT_EXPORT_FILENAME)
            .to_owned();
        Self {
            bytes: download.bytes,
            filename,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Query encoding, tolerant decoding and export naming.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn query_keeps_parameter_order() {
        let filter = StudentFilter {
            keyword: Some("rao".to_owned()),
            roll_no: Some("R1".to_owned()),
            name: Some("Asha".to_owned()),
            email: Some("a@x.com".to_owned()),
            department: Some(Department::Science),
            course_name: Some("Physics".to_owned()),
            gender: Some(Gender::Female),
            academic_year: Some(2),
            semester: Some(3),
            marks: Some(87.5),
            sort_by: Some(StudentSortKey::CourseTitle),
            sort_dir: Some(SortDirection::Asc),
        };
        assert_eq!(
            filter.to_query_string(),
            "keyword=rao&rollNo=R1&name=Asha&email=a%40x.com&department=SCIENCE\
             &courseName=Physics&Gender=FEMALE&academicYear=2&semester=3&marks=87.5\
             &sortBy=courseTitle&sortDir=asc"
        );
    }

    #[test]
    fn empty_criteria_are_omitted() {
        let filter = StudentFilter {
            keyword: Some(String::new()),
            marks: Some(90.0),
            ..StudentFilter::default()
        };
        assert_eq!(filter.to_query_string(), "marks=90");
        assert_eq!(StudentFilter::default().to_query_string(), "");
    }

    #[rstest]
    #[case("createdAt", StudentSortKey::CreatedAt)]
    #[case("ACADEMICYEAR", StudentSortKey::AcademicYear)]
    #[case("courseTitle", StudentSortKey::CourseTitle)]
    fn parses_sort_keys(#[case] raw: &str, #[case] expected: StudentSortKey) {
        assert_eq!(raw.parse::<StudentSortKey>(), Ok(expected));
    }

    #[test]
    fn rejects_unknown_sort_direction() {
        assert!("sideways".parse::<SortDirection>().is_err());
        assert_eq!("DESC".parse::<SortDirection>(), Ok(SortDirection::Desc));
    }

    #[rstest]
    #[case(Some(Payload::Json(json!([{"rollNo": "R1"}, {"rollNo": "R2"}]))), 2)]
    #[case(Some(Payload::Json(json!({"data": [{"rollNo": "R1"}]}))), 1)]
    #[case(Some(Payload::Json(json!({"content": [{"rollNo": "R1"}], "totalPages": 1}))), 1)]
    #[case(Some(Payload::Json(json!({"data": "nope", "content": [{}]}))), 1)]
    #[case(Some(Payload::Json(json!({"message": "ok"}))), 0)]
    #[case(Some(Payload::Text("ok".to_owned())), 0)]
    #[case(None, 0)]
    fn filter_responses_are_unwrapped(#[case] payload: Option<Payload>, #[case] expected: usize) {
        let rows = decode_student_list(payload).expect("decodable");
        assert_eq!(rows.len(), expected);
    }

    #[test]
    fn student_rows_decode_backend_fields() {
        let rows = decode_student_list(Some(Payload::Json(json!([{
            "rollNo": "R7",
            "name": "Asha",
            "role": "STUDENT",
            "department": "ARTS",
            "gender": "FEMALE",
            "marks": 91.25,
            "academicYear": 3
        }]))))
        .expect("decodable");
        let row = rows.first().expect("one row");
        assert_eq!(row.roll_no.as_deref(), Some("R7"));
        assert_eq!(row.role, Some(UserRole::Student));
        assert_eq!(row.department, Some(Department::Arts));
        assert_eq!(row.marks, Some(91.25));
    }

    #[rstest]
    #[case("R-001")]
    #[case("TSP_2024_9")]
    fn accepts_path_safe_roll_numbers(#[case] raw: &str) {
        assert_eq!(RollNumber::parse(raw).map(|roll| roll.to_string()), Ok(raw.to_owned()));
    }

    #[rstest]
    #[case("", RollNumberError::Empty)]
    #[case("a/b", RollNumberError::InvalidCharacters { value: "a/b".to_owned() })]
    #[case("R1?x=1", RollNumberError::InvalidCharacters { value: "R1?x=1".to_owned() })]
    fn rejects_unsafe_roll_numbers(#[case] raw: &str, #[case] expected: RollNumberError) {
        assert_eq!(RollNumber::parse(raw), Err(expected));
    }

    #[rstest]
    #[case(Some("Students_2024.xlsx"), "Students_2024.xlsx")]
    #[case(Some("../../etc/passwd"), "passwd")]
    #[case(Some(".."), DEFAULT_EXPORT_FILENAME)]
    #[case(None, DEFAULT_EXPORT_FILENAME)]
    fn export_names_are_bare_file_names(#[case] suggested: Option<&str>, #[case] expected: &str) {
        let export = SpreadsheetExport::from(Download {
            bytes: vec![1, 2, 3],
            content_type: None,
            filename: suggested.map(str::to_owned),
        });
        assert_eq!(export.filename, expected);
        assert_eq!(export.bytes, vec![1, 2, 3]);
    }
}
