use std::fmt;

use regex::Regex;

use crate::types::{CompilationDatabase, CompileCommand};

/// Predicate choosing which database records a run cares about.
#[derive(Debug, Clone)]
pub enum Selector {
    /// Substring match on the record's file path. The empty string matches
    /// every record, i.e. the whole tree is indexed.
    Subtree(String),
    /// Regex match on the record's file path.
    FilePattern(Regex),
}

impl Selector {
    pub fn matches(&self, record: &CompileCommand) -> bool {
        match self {
            Selector::Subtree(subtree) => record.file.contains(subtree.as_str()),
            Selector::FilePattern(pattern) => pattern.is_match(&record.file),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Subtree(subtree) if subtree.is_empty() => write!(f, "subtree \"\" (all records)"),
            Selector::Subtree(subtree) => write!(f, "subtree \"{subtree}\""),
            Selector::FilePattern(pattern) => write!(f, "file pattern /{pattern}/"),
        }
    }
}

/// Which records get processed: always the database prefix `[0, last_match]`.
///
/// Records before the last match are kept even when they do not themselves
/// match. Compilations may depend on artifacts produced by earlier records,
/// so dropping intermediate non-matching records could break the matching
/// ones; the processed set is therefore an inclusive prefix, never a sparse
/// subset.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SelectionPlan {
    /// Records in the database.
    pub total_records: usize,
    /// Records actually satisfying the selector.
    pub matching_records: usize,
    /// Index of the last matching record.
    pub last_match_index: usize,
    /// Records to process, i.e. `last_match_index + 1`.
    pub selected_count: usize,
}

impl SelectionPlan {
    /// The prefix of `db` this plan selects. `db` must be the database the
    /// plan was built from.
    pub fn selected<'a>(&self, db: &'a CompilationDatabase) -> &'a [CompileCommand] {
        &db[..self.selected_count.min(db.len())]
    }
}

pub fn plan_selection(
    db: &CompilationDatabase,
    selector: &Selector,
) -> Result<SelectionPlan, PlannerError> {
    let mut matching_records = 0usize;
    let mut last_match = None;
    for (index, record) in db.iter().enumerate() {
        if selector.matches(record) {
            matching_records += 1;
            last_match = Some(index);
        }
    }

    let Some(last_match_index) = last_match else {
        return Err(PlannerError::NoMatchingRecords {
            selector: selector.to_string(),
        });
    };

    Ok(SelectionPlan {
        total_records: db.len(),
        matching_records,
        last_match_index,
        selected_count: last_match_index + 1,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("no compilation database records match {selector}")]
    NoMatchingRecords { selector: String },
}
