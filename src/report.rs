// src/report.rs
use crate::aggregate::UserDepartmentMap;
use std::io::{self, Write};

/// Write one `user,department` line per entry, ascending by user. Fields are
/// written verbatim; a comma inside a department is not quoted.
pub fn write_report<W: Write>(map: &UserDepartmentMap, out: &mut W) -> io::Result<usize> {
    let mut lines = 0;
    for (user, department) in map {
        writeln!(out, "{},{}", user, department)?;
        lines += 1;
    }
    out.flush()?;
    Ok(lines)
}
