//! Student file persistence
//!
//! One student per line: `<surname> <initials> <g1> ... <gk> ` followed by a
//! newline. Reading is token based, so line breaks are not significant.

use std::path::Path;
use std::sync::Arc;

use itertools::Itertools;
use tracing::{debug, info, instrument, warn};

use crate::application::{ApplicationResult, IoResultExt};
use crate::config::SaveOrder;
use crate::domain::{parse_grade, DomainError, GradeMultiset, StudentDirectory, StudentRecord};
use crate::infrastructure::traits::FileSystem;

/// Output from loading a student file.
#[derive(Debug, Clone)]
pub struct LoadOutput {
    /// Directory built from every complete record
    pub directory: StudentDirectory,
    /// Number of records read
    pub records: usize,
    /// Why reading stopped early, if it did
    pub truncated: Option<DomainError>,
}

/// Service for reading and writing student files.
#[derive(Clone)]
pub struct PersistenceService {
    fs: Arc<dyn FileSystem>,
}

impl PersistenceService {
    /// Create a new persistence service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Write every record of `directory` to `path`, replacing the file.
    ///
    /// Returns the number of records written.
    #[instrument(level = "debug", skip(self, directory))]
    pub fn save(
        &self,
        directory: &StudentDirectory,
        path: &Path,
        order: SaveOrder,
    ) -> ApplicationResult<usize> {
        let content = encode(directory, order);
        self.fs
            .ensure_parent(path)
            .with_path_context("create directory for", path)?;
        self.fs
            .write(path, &content)
            .with_path_context("write student file", path)?;
        info!("saved {} records to {}", directory.len(), path.display());
        Ok(directory.len())
    }

    /// Read a student file into a fresh directory.
    ///
    /// Reading stops at the first group that is incomplete or holds a
    /// non-numeric grade; everything before it is kept.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path, grades_per_student: usize) -> ApplicationResult<LoadOutput> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read student file", path)?;

        let (records, truncated) = parse_records(&content, grades_per_student);
        if let Some(reason) = &truncated {
            warn!("load of {} stopped early: {}", path.display(), reason);
        }
        let count = records.len();
        debug!("loaded {} records from {}", count, path.display());

        Ok(LoadOutput {
            directory: records.into_iter().collect(),
            records: count,
            truncated,
        })
    }

    /// Like `load`, but a missing file yields an empty directory.
    pub fn load_or_empty(
        &self,
        path: &Path,
        grades_per_student: usize,
    ) -> ApplicationResult<LoadOutput> {
        if !self.fs.exists(path) {
            debug!("{} does not exist, starting empty", path.display());
            return Ok(LoadOutput {
                directory: StudentDirectory::new(),
                records: 0,
                truncated: None,
            });
        }
        self.load(path, grades_per_student)
    }
}

/// Serialize a single record as one line of the student file.
pub fn format_record(record: &StudentRecord) -> String {
    format!(
        "{} {} {}\n",
        record.surname(),
        record.initials(),
        record.grades()
    )
}

/// Serialize the whole directory in the given traversal order.
pub fn encode(directory: &StudentDirectory, order: SaveOrder) -> String {
    match order {
        SaveOrder::InOrder => directory.iter().map(format_record).collect(),
        SaveOrder::PreOrder => directory.iter_preorder().map(format_record).collect(),
    }
}

/// Parse groups of `surname initials g1..gk` tokens.
///
/// Returns the records parsed before the first bad group together with the
/// reason parsing stopped.
pub fn parse_records(
    text: &str,
    grades_per_student: usize,
) -> (Vec<StudentRecord>, Option<DomainError>) {
    let mut records = Vec::new();
    let groups = text.split_whitespace().chunks(grades_per_student + 2);
    for group in &groups {
        let tokens: Vec<&str> = group.collect();
        match parse_record(&tokens, grades_per_student) {
            Ok(record) => records.push(record),
            Err(e) => return (records, Some(e)),
        }
    }
    (records, None)
}

fn parse_record(tokens: &[&str], grades_per_student: usize) -> Result<StudentRecord, DomainError> {
    match tokens {
        [surname, initials, grades @ ..] if grades.len() == grades_per_student => {
            let grades = grades
                .iter()
                .map(|token| parse_grade(token))
                .collect::<Result<GradeMultiset, _>>()?;
            Ok(StudentRecord::new(*surname, *initials, grades))
        }
        _ => Err(DomainError::IncompleteRecord {
            surname: tokens.first().map(|s| s.to_string()).unwrap_or_default(),
            expected: grades_per_student,
            found: tokens.len().saturating_sub(2),
        }),
    }
}
