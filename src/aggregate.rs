// src/aggregate.rs
use crate::{error::ExtractError, source::Record};
use std::collections::{btree_map, BTreeMap};
use tracing::{debug, trace};

pub const ASSIGNED_TO: &str = "AssignedTo";
pub const DEPARTMENT: &str = "Department";

/// `AssignedTo` values that record a device status rather than a person.
pub const SENTINELS: [&str; 3] = ["active", "broken", "retired"];

/// Strip leading and trailing whitespace, counting the ASCII information
/// separators (`\x1c`..=`\x1f`) as whitespace too.
pub fn trim_field(value: &str) -> &str {
    value.trim_matches(|c: char| c.is_whitespace() || ('\x1c'..='\x1f').contains(&c))
}

/// Exact, case-sensitive match against [`SENTINELS`].
pub fn is_sentinel(value: &str) -> bool {
    SENTINELS.contains(&value)
}

/// A row that survived filtering: a real user and their (trimmed) department.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub user: String,
    pub department: String,
}

/// Why a row contributed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    Blank,
    Sentinel,
}

impl Assignment {
    /// Trim both fields and apply the filter. Absent fields read as "".
    pub fn classify(record: &Record) -> Result<Self, Skip> {
        let user = trim_field(record.get(ASSIGNED_TO).unwrap_or(""));
        let department = trim_field(record.get(DEPARTMENT).unwrap_or(""));

        if user.is_empty() {
            return Err(Skip::Blank);
        }
        if is_sentinel(user) {
            return Err(Skip::Sentinel);
        }
        Ok(Self {
            user: user.to_string(),
            department: department.to_string(),
        })
    }
}

/// User name → department, kept in ascending user order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UserDepartmentMap {
    inner: BTreeMap<String, String>,
}

impl UserDepartmentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write wins. Returns the department this replaced, if any.
    pub fn insert(&mut self, assignment: Assignment) -> Option<String> {
        self.inner.insert(assignment.user, assignment.department)
    }

    pub fn get(&self, user: &str) -> Option<&str> {
        self.inner.get(user).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Entries sorted ascending by user name (byte-wise, i.e. code-point order).
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.inner.iter(),
        }
    }
}

pub struct Iter<'a> {
    inner: btree_map::Iter<'a, String, String>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(u, d)| (u.as_str(), d.as_str()))
    }
}

impl<'a> IntoIterator for &'a UserDepartmentMap {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Assignment> for UserDepartmentMap {
    fn from_iter<I: IntoIterator<Item = Assignment>>(iter: I) -> Self {
        let mut map = Self::new();
        for a in iter {
            map.insert(a);
        }
        map
    }
}

/// Counters collected while folding, for logging only.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AggregateStats {
    pub rows: u64,
    pub kept: u64,
    pub skipped_blank: u64,
    pub skipped_sentinel: u64,
    /// Kept rows whose user had already been seen.
    pub overwritten: u64,
}

impl AggregateStats {
    pub fn skipped(&self) -> u64 {
        self.skipped_blank + self.skipped_sentinel
    }
}

/// Consume `records` one at a time into a [`UserDepartmentMap`]. The first
/// read error aborts the fold and is returned as-is.
#[tracing::instrument(level = "debug", skip(records))]
pub fn fold_records<I>(records: I) -> Result<(UserDepartmentMap, AggregateStats), ExtractError>
where
    I: IntoIterator<Item = Result<Record, ExtractError>>,
{
    let mut map = UserDepartmentMap::new();
    let mut stats = AggregateStats::default();

    for record in records {
        let record = record?;
        stats.rows += 1;

        match Assignment::classify(&record) {
            Ok(assignment) => {
                stats.kept += 1;
                if let Some(prev) = map.insert(assignment) {
                    stats.overwritten += 1;
                    trace!(line = ?record.line(), previous = %prev, "user seen again, department replaced");
                }
            }
            Err(Skip::Blank) => {
                stats.skipped_blank += 1;
                trace!(line = ?record.line(), "skipping row with blank AssignedTo");
            }
            Err(Skip::Sentinel) => {
                stats.skipped_sentinel += 1;
                trace!(line = ?record.line(), "skipping status row");
            }
        }
    }

    debug!(?stats, users = map.len(), "fold complete");
    Ok((map, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::RecordSource;
    use anyhow::Result;
    use std::io::Cursor;

    fn fold(content: &str) -> Result<(UserDepartmentMap, AggregateStats)> {
        let mut src =
            RecordSource::from_reader("inline.csv", Cursor::new(content.as_bytes().to_vec()))?;
        Ok(fold_records(src.records())?)
    }

    #[test]
    fn test_sentinels_are_exact() {
        for s in SENTINELS {
            assert!(is_sentinel(s));
        }
        assert!(!is_sentinel("Active"));
        assert!(!is_sentinel("RETIRED"));
        assert!(!is_sentinel(" broken"));
        assert!(!is_sentinel(""));
    }

    #[test]
    fn test_filters_sentinels_and_blanks() -> Result<()> {
        let (map, stats) = fold(
            "AssignedTo,Department\n\
             Alice,Eng\n\
             active,X\n\
             broken,Y\n\
             retired,Z\n\
             \"   \",Ops\n\
             ,Ops\n\
             Bob,Sales\n",
        )?;
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("Alice"), Some("Eng"));
        assert_eq!(map.get("Bob"), Some("Sales"));
        assert_eq!(
            stats,
            AggregateStats {
                rows: 7,
                kept: 2,
                skipped_blank: 2,
                skipped_sentinel: 3,
                overwritten: 0,
            }
        );
        assert_eq!(stats.skipped(), 5);
        Ok(())
    }

    #[test]
    fn test_last_write_wins() -> Result<()> {
        let (map, stats) = fold(
            "AssignedTo,Department\nAlice,Eng\nBob,Sales\nAlice,Marketing\n",
        )?;
        assert_eq!(map.get("Alice"), Some("Marketing"));
        assert_eq!(map.len(), 2);
        assert_eq!(stats.overwritten, 1);
        Ok(())
    }

    #[test]
    fn test_trims_both_fields() -> Result<()> {
        let (map, _) = fold("AssignedTo,Department\n  Carol \t,  Finance  \nretired  ,X\n")?;
        assert_eq!(map.get("Carol"), Some("Finance"));
        // trimmed value is a sentinel
        assert_eq!(map.len(), 1);
        Ok(())
    }

    #[test]
    fn test_separator_controls_are_trimmed() -> Result<()> {
        let (map, stats) = fold(
            "AssignedTo,Department\n\x1factive\x1f,X\n\x1cAlice,\x1dEng\x1e\n",
        )?;
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("Alice"), Some("Eng"));
        assert_eq!(stats.skipped_sentinel, 1);
        assert_eq!(trim_field("\u{a0}Bob\u{85}"), "Bob");
        Ok(())
    }

    #[test]
    fn test_classify_reports_skip_reason() -> Result<()> {
        let mut src = RecordSource::from_reader(
            "inline.csv",
            Cursor::new(b"AssignedTo,Department\n  Dana , Ops \nbroken,X\n \t,Y\n".to_vec()),
        )?;
        let outcomes: Vec<_> = src
            .records()
            .map(|r| r.map(|rec| Assignment::classify(&rec)))
            .collect::<Result<_, _>>()?;
        assert_eq!(
            outcomes,
            vec![
                Ok(Assignment {
                    user: "Dana".into(),
                    department: "Ops".into(),
                }),
                Err(Skip::Sentinel),
                Err(Skip::Blank),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_case_variant_of_sentinel_is_a_user() -> Result<()> {
        let (map, _) = fold("AssignedTo,Department\nActive,Eng\n")?;
        assert_eq!(map.get("Active"), Some("Eng"));
        Ok(())
    }

    #[test]
    fn test_missing_department_column() -> Result<()> {
        let (map, _) = fold("Serial,AssignedTo\nX1,Alice\n")?;
        assert_eq!(map.get("Alice"), Some(""));
        Ok(())
    }

    #[test]
    fn test_missing_assigned_to_column_keeps_nothing() -> Result<()> {
        let (map, stats) = fold("Serial,Department\nX1,Eng\nX2,Ops\n")?;
        assert!(map.is_empty());
        assert_eq!(stats.skipped_blank, 2);
        Ok(())
    }

    #[test]
    fn test_blank_department_overwrites() -> Result<()> {
        let (map, _) = fold("AssignedTo,Department\nAlice,Eng\nAlice,\n")?;
        assert_eq!(map.get("Alice"), Some(""));
        Ok(())
    }

    #[test]
    fn test_read_error_aborts_fold() {
        let records = vec![
            Err(ExtractError::FileAccess {
                path: "x.csv".into(),
                source: std::io::Error::other("boom"),
            }),
        ];
        assert!(fold_records(records).is_err());
    }

    #[test]
    fn test_from_iterator_last_wins() {
        let map: UserDepartmentMap = [("b", "1"), ("a", "2"), ("b", "3")]
            .into_iter()
            .map(|(u, d)| Assignment {
                user: u.into(),
                department: d.into(),
            })
            .collect();
        let entries: Vec<_> = map.iter().collect();
        assert_eq!(entries, vec![("a", "2"), ("b", "3")]);
    }
}
