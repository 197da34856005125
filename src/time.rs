use chrono::{Local, Utc};

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

pub fn now_unix_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Local time formatted for use in artifact file names
pub fn file_stamp() -> String {
    Local::now().format("%Y-%m-%d_%H-%M-%S").to_string()
}

/// Local UTC offset (e.g. `+01:00`)
pub fn local_offset() -> String {
    Local::now().format("%:z").to_string()
}
