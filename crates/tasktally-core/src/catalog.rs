//! Task catalog: display names, hierarchical codes and priority weights.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::code::TaskCode;
use crate::error::{CoreError, Result, ValidationError};

/// One stored catalog row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub task: String,
    pub code: TaskCode,
    pub priority: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Build a catalog from stored rows, enforcing the same rules as [`Catalog::add`].
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self> {
        let mut catalog = Catalog::default();
        for entry in entries {
            catalog.add(entry.task, entry.code, entry.priority)?;
        }
        Ok(catalog)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn codes(&self) -> impl Iterator<Item = &TaskCode> {
        self.entries.iter().map(|e| &e.code)
    }

    pub fn by_name(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.task == name)
    }

    pub fn by_code(&self, code: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.code.as_str() == code)
    }

    pub fn code_by_name(&self, name: &str) -> Option<&TaskCode> {
        self.by_name(name).map(|e| &e.code)
    }

    pub fn name_by_code(&self, code: &str) -> Option<&str> {
        self.by_code(code).map(|e| e.task.as_str())
    }

    /// Resolve a user-supplied task reference to a catalog entry.
    ///
    /// All-digit queries are row indices. Anything else is looked up as a
    /// task name, then as a code. A name that is also another entry's code
    /// is ambiguous.
    pub fn resolve(&self, query: &str) -> Result<&CatalogEntry> {
        let query = query.trim();
        if !query.is_empty() && query.bytes().all(|b| b.is_ascii_digit()) {
            return query
                .parse::<usize>()
                .ok()
                .and_then(|idx| self.entries.get(idx))
                .ok_or_else(|| CoreError::UnresolvedTask(query.to_string()));
        }

        match (self.by_name(query), self.by_code(query)) {
            (Some(named), Some(coded)) if named.code != coded.code => {
                Err(CoreError::AmbiguousTask(query.to_string()))
            }
            (Some(entry), _) | (None, Some(entry)) => Ok(entry),
            (None, None) => Err(CoreError::UnresolvedTask(query.to_string())),
        }
    }

    /// Register a task. Names and codes are unique; priority must be positive.
    pub fn add(&mut self, task: String, code: TaskCode, priority: f64) -> Result<&CatalogEntry> {
        let task = task.trim().to_string();
        if task.is_empty() {
            return Err(ValidationError::invalid("task", "name is empty").into());
        }
        if !priority.is_finite() || priority <= 0.0 {
            return Err(ValidationError::invalid(
                "priority",
                format!("{priority} is not a positive number"),
            )
            .into());
        }
        if self.by_name(&task).is_some() {
            return Err(ValidationError::Duplicate {
                field: "task".into(),
                value: task,
            }
            .into());
        }
        if self.by_code(code.as_str()).is_some() {
            return Err(ValidationError::Duplicate {
                field: "code".into(),
                value: code.to_string(),
            }
            .into());
        }

        self.entries.push(CatalogEntry {
            task,
            code,
            priority,
        });
        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn pop(&mut self) -> Option<CatalogEntry> {
        self.entries.pop()
    }
}

/// Table targeted by a drop-last-row request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    Ledger,
    Catalog,
}

impl FromStr for Table {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ledger" | "time" => Ok(Table::Ledger),
            "catalog" | "codes" => Ok(Table::Catalog),
            other => Err(ValidationError::invalid(
                "table",
                format!("'{other}' is neither 'ledger' nor 'catalog'"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        let mut c = Catalog::default();
        c.add("study".into(), TaskCode::new("0").unwrap(), 1.0).unwrap();
        c.add("python".into(), TaskCode::new("0_1").unwrap(), 2.0).unwrap();
        c.add("rust".into(), TaskCode::new("0_2").unwrap(), 1.5).unwrap();
        c
    }

    #[test]
    fn resolves_by_index_name_and_code() {
        let c = catalog();
        assert_eq!(c.resolve("1").unwrap().task, "python");
        assert_eq!(c.resolve("rust").unwrap().code.as_str(), "0_2");
        assert_eq!(c.resolve("0_1").unwrap().task, "python");
        assert_eq!(c.resolve(" rust ").unwrap().task, "rust");
    }

    #[test]
    fn digits_are_always_indices() {
        // "0" is also a code, but digits resolve as a row index first.
        let c = catalog();
        assert_eq!(c.resolve("0").unwrap().task, "study");
        assert!(matches!(c.resolve("7"), Err(CoreError::UnresolvedTask(q)) if q == "7"));
    }

    #[test]
    fn unknown_task_is_unresolved() {
        let c = catalog();
        assert!(matches!(
            c.resolve("haskell"),
            Err(CoreError::UnresolvedTask(q)) if q == "haskell"
        ));
        assert!(matches!(c.resolve(""), Err(CoreError::UnresolvedTask(_))));
    }

    #[test]
    fn name_shadowing_another_code_is_ambiguous() {
        let mut c = catalog();
        c.add("1_5".into(), TaskCode::new("1").unwrap(), 1.0).unwrap();
        c.add("other".into(), TaskCode::new("1_5").unwrap(), 1.0).unwrap();
        assert!(matches!(c.resolve("1_5"), Err(CoreError::AmbiguousTask(_))));
    }

    #[test]
    fn add_rejects_duplicates_and_bad_priority() {
        let mut c = catalog();
        assert!(c.add("python".into(), TaskCode::new("5").unwrap(), 1.0).is_err());
        assert!(c.add("go".into(), TaskCode::new("0_1").unwrap(), 1.0).is_err());
        assert!(c.add("go".into(), TaskCode::new("5").unwrap(), 0.0).is_err());
        assert!(c.add("go".into(), TaskCode::new("5").unwrap(), f64::INFINITY).is_err());
        assert!(c.add("  ".into(), TaskCode::new("5").unwrap(), 1.0).is_err());
        assert_eq!(c.len(), 3);
        assert!(c.add("go".into(), TaskCode::new("5").unwrap(), 0.5).is_ok());
    }

    #[test]
    fn lookups_by_name_and_code() {
        let c = catalog();
        assert_eq!(c.code_by_name("rust").map(|c| c.as_str()), Some("0_2"));
        assert_eq!(c.name_by_code("0_1"), Some("python"));
        assert_eq!(c.name_by_code("9"), None);
    }

    #[test]
    fn table_names() {
        assert_eq!("time".parse::<Table>().unwrap(), Table::Ledger);
        assert_eq!("Catalog".parse::<Table>().unwrap(), Table::Catalog);
        assert!("sessions".parse::<Table>().is_err());
    }
}
