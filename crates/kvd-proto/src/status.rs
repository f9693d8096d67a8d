//! Reply status codes.

/// Status codes carried in the response frame's `code` field.
///
/// Reference: status code space, §6.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(i32)]
pub enum Status {
    Ok = 0,
    DataError = 400,
    UnAuth = 401,
    NoDb = 402,
    NoDbSelected = 403,
    BadCommand = 404,
    NotFound = 405,
    IoError = 501,
    CreatFailed = 502,
    DbError = 503,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Status::Ok => "OK",
            Status::DataError => "DATA_ERROR",
            Status::UnAuth => "UN_AUTH",
            Status::NoDb => "NO_DB",
            Status::NoDbSelected => "NO_DB_SELECTED",
            Status::BadCommand => "BAD_COMMAND",
            Status::NotFound => "NOT_FOUND",
            Status::IoError => "IO_ERROR",
            Status::CreatFailed => "CREAT_FAILED",
            Status::DbError => "DB_ERROR",
        };
        write!(f, "{name} ({})", *self as i32)
    }
}

impl From<Status> for i32 {
    fn from(status: Status) -> Self {
        status as i32
    }
}
