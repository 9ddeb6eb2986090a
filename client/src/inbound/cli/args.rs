//! Command-line grammar for the `portal` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::{
    Department, Gender, SortDirection, StudentFilter, StudentSortKey, UserRole,
};

/// `portal` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "portal",
    about = "Talk to the student portal backend from the terminal",
    version
)]
pub struct Cli {
    /// Operation to perform.
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level operations.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Log in with an email or phone number and a password.
    Login {
        /// Email address or phone number.
        identifier: String,
        /// Account password.
        #[arg(long)]
        password: String,
    },
    /// Log in with a one-time passcode sent by email.
    #[command(subcommand)]
    Otp(OtpCommand),
    /// End the session; local state is always cleared.
    Logout,
    /// Show the cached user, optionally checking their role.
    Whoami {
        /// Fail unless the cached user has this role.
        #[arg(long, value_enum)]
        require: Option<RoleArg>,
    },
    /// Create an account.
    Register {
        /// Kind of account.
        #[arg(value_enum)]
        role: RoleArg,
        /// Registration payload.
        #[command(flatten)]
        payload: PayloadArgs,
        /// Register through the admin endpoints using the current session.
        #[arg(long)]
        by_admin: bool,
    },
    /// Read, change or delete the logged-in user's profile.
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Admin student directory.
    #[command(subcommand)]
    Students(StudentsCommand),
}

/// Passcode login steps.
#[derive(Debug, Clone, Subcommand)]
pub enum OtpCommand {
    /// Email a passcode.
    Send {
        /// Address to send the passcode to.
        email: String,
    },
    /// Log in with a received passcode.
    Verify {
        /// Address the passcode was sent to.
        email: String,
        /// Passcode; separators and extra digits are dropped.
        code: String,
    },
}

/// Profile operations for the logged-in user.
#[derive(Debug, Clone, Subcommand)]
pub enum ProfileCommand {
    /// Print the profile.
    Show,
    /// Apply a partial update.
    Update {
        /// Update payload.
        #[command(flatten)]
        payload: PayloadArgs,
    },
    /// Delete the account and log out.
    Delete {
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
}

/// Student directory operations.
#[derive(Debug, Clone, Subcommand)]
pub enum StudentsCommand {
    /// List students matching the filter.
    Filter(FilterArgs),
    /// Save matching students as a spreadsheet.
    Export {
        /// Filter criteria.
        #[command(flatten)]
        filter: FilterArgs,
        /// Directory the spreadsheet is written to.
        #[arg(long, value_name = "dir", default_value = ".")]
        output_dir: PathBuf,
    },
    /// Show one student.
    Get {
        /// Roll number.
        roll_no: String,
    },
}

/// Where a JSON payload comes from.
#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct PayloadArgs {
    /// Read the payload from a JSON file.
    #[arg(long, value_name = "path")]
    pub file: Option<PathBuf>,
    /// Inline JSON payload.
    #[arg(long, value_name = "json")]
    pub json: Option<String>,
}

/// Portal role as typed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    /// Student account.
    Student,
    /// Staff account.
    Staff,
    /// Administrator account.
    Admin,
}

impl From<RoleArg> for UserRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Student => Self::Student,
            RoleArg::Staff => Self::Staff,
            RoleArg::Admin => Self::Admin,
        }
    }
}

/// Student directory filter flags.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Free-text search.
    #[arg(long)]
    pub keyword: Option<String>,
    /// Roll number.
    #[arg(long)]
    pub roll_no: Option<String>,
    /// Name.
    #[arg(long)]
    pub name: Option<String>,
    /// Email address.
    #[arg(long)]
    pub email: Option<String>,
    /// Department, e.g. SCIENCE.
    #[arg(long)]
    pub department: Option<Department>,
    /// Course title.
    #[arg(long)]
    pub course: Option<String>,
    /// Gender, e.g. FEMALE.
    #[arg(long)]
    pub gender: Option<Gender>,
    /// Year of study.
    #[arg(long)]
    pub year: Option<u32>,
    /// Semester.
    #[arg(long)]
    pub semester: Option<u32>,
    /// Marks.
    #[arg(long)]
    pub marks: Option<f64>,
    /// Sort column, e.g. createdAt.
    #[arg(long)]
    pub sort_by: Option<StudentSortKey>,
    /// Sort order: asc or desc.
    #[arg(long)]
    pub sort_dir: Option<SortDirection>,
}

impl From<FilterArgs> for StudentFilter {
    fn from(args: FilterArgs) -> Self {
        Self {
            keyword: args.keyword,
            roll_no: args.roll_no,
            name: args.name,
            email: args.email,
            department: args.department,
            course_name: args.course,
            gender: args.gender,
            academic_year: args.year,
            semester: args.semester,
            marks: args.marks,
            sort_by: args.sort_by,
            sort_dir: args.sort_dir,
        }
    }
}
