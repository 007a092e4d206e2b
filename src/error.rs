use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid ISO week {week} for year {year}")]
    InvalidWeek { year: i32, week: u32 },

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("{0}")]
    Validation(String),

    #[error("unknown issuing bank code '{0}'")]
    UnknownBank(String),

    #[error("group '{0}' not found")]
    GroupNotFound(String),

    #[error("member '{0}' not found")]
    MemberNotFound(String),

    #[error("attendance record {0} not found")]
    AttendanceNotFound(String),

    #[error("session day {0} not found")]
    SessionDayNotFound(String),

    #[error("payment {0} not found")]
    PaymentNotFound(String),

    #[error("attendance already recorded for member {member} on {date}")]
    DuplicateAttendance { member: Uuid, date: NaiveDate },

    #[error("payment reference '{0}' already registered")]
    DuplicateReference(String),

    #[error("email '{0}' already registered")]
    DuplicateEmail(String),

    #[error("group name '{0}' already in use")]
    DuplicateGroup(String),

    #[error("session for group '{group}' on {date} is not active")]
    SessionInactive { group: String, date: NaiveDate },

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Response class an API layer maps onto its status codes. Expected
/// conditions always classify below `Internal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    Conflict,
    Unavailable,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidWeek { .. }
            | Error::InvalidDate(_)
            | Error::Validation(_)
            | Error::UnknownBank(_) => ErrorKind::BadRequest,
            Error::GroupNotFound(_)
            | Error::MemberNotFound(_)
            | Error::AttendanceNotFound(_)
            | Error::SessionDayNotFound(_)
            | Error::PaymentNotFound(_) => ErrorKind::NotFound,
            Error::DuplicateAttendance { .. }
            | Error::DuplicateReference(_)
            | Error::DuplicateEmail(_)
            | Error::DuplicateGroup(_) => ErrorKind::Conflict,
            Error::SessionInactive { .. } => ErrorKind::Unavailable,
            Error::Storage(_) | Error::Csv(_) | Error::Spreadsheet(_) | Error::Io(_) => {
                ErrorKind::Internal
            }
        }
    }
}
