//! Domain entities: roster records and manager relationships

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::error::RosterError;

/// One employee as supplied by the roster source.
///
/// Field aliases accept the column headers of the employee sheet export
/// (`EMP ID`, `EMP NAME`, ...) so CSV rosters load without remapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// Unique employee identifier
    #[serde(alias = "EMP ID", alias = "emp_code")]
    pub id: String,
    /// Display name
    #[serde(alias = "EMP NAME", alias = "emp_name")]
    pub name: String,
    #[serde(default, alias = "DEPARTMENT")]
    pub department: String,
    #[serde(default, alias = "GRADE", alias = "designation")]
    pub title: String,
    /// Avatar reference (URL or path), never interpreted here
    #[serde(
        default,
        alias = "IMAGE",
        alias = "image_url",
        deserialize_with = "empty_as_none"
    )]
    pub avatar: Option<String>,
    /// Reporting manager identifier declared by the roster source.
    /// Only consulted when seeding a hierarchy from the roster.
    #[serde(
        default,
        alias = "REPORTING MANAGER",
        alias = "reporting_manager",
        deserialize_with = "empty_as_none"
    )]
    pub manager: Option<String>,
}

impl EmployeeRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            department: String::new(),
            title: String::new(),
            avatar: None,
            manager: None,
        }
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_manager(mut self, manager: impl Into<String>) -> Self {
        self.manager = Some(manager.into());
        self
    }
}

/// CSV cells come through as empty strings when a column is blank.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

/// Read-only lookup from employee identifier to record, in roster order.
#[derive(Debug, Clone, Default)]
pub struct RosterIndex {
    records: IndexMap<String, EmployeeRecord>,
}

impl RosterIndex {
    /// Index a roster, rejecting duplicate identifiers.
    pub fn from_records(
        records: impl IntoIterator<Item = EmployeeRecord>,
    ) -> Result<Self, RosterError> {
        let mut index = IndexMap::new();
        for record in records {
            if index.contains_key(&record.id) {
                return Err(RosterError::DuplicateEmployee(record.id));
            }
            index.insert(record.id.clone(), record);
        }
        Ok(Self { records: index })
    }

    pub fn get(&self, id: &str) -> Option<&EmployeeRecord> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EmployeeRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A declared subordinate -> manager edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub subordinate_id: String,
    /// `None` places the subordinate as a root
    pub manager_id: Option<String>,
}

impl Relationship {
    pub fn new(subordinate_id: impl Into<String>, manager_id: Option<&str>) -> Self {
        Self {
            subordinate_id: subordinate_id.into(),
            manager_id: manager_id.map(str::to_string),
        }
    }
}
