//! Column discovery by header aliases
//!
//! Each semantic [`Role`] has an ordered list of acceptable header names.
//! Resolution happens once per run and yields integer offsets, so rows are
//! never searched by name again.

use std::collections::BTreeMap;

use hourperf_core::{date, parse_hour, Role, SchemaError, TaskCategory};
use serde::{Deserialize, Serialize};

/// Ordered header aliases per role
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnAliases {
    aliases: BTreeMap<Role, Vec<String>>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        let aliases = Role::ALL
            .into_iter()
            .map(|role| {
                let names: &[&str] = match role {
                    Role::FullName => &["full_name", "Full_Name", "FULL_NAME"],
                    Role::Hour => &["hour", "Hour", "HOUR"],
                    Role::Quantity => &["quantity", "Quantity", "QUANTITY"],
                    Role::OccupiedHours => &["occupied_hours", "Occupied_Hours", "OCCUPIED_HOURS"],
                    Role::PerformanceWithoutRotation => &["performance_without_rotation"],
                    Role::PerformanceWithRotation => &["performance_with_rotation"],
                    Role::TaskType => &["task_type", "Task_Type", "TASK_TYPE"],
                    Role::Date => &["date", "Date", "DATE"],
                    Role::Shift => &["Shift", "shift", "SHIFT"],
                };
                (role, names.iter().map(|n| n.to_string()).collect())
            })
            .collect();
        Self { aliases }
    }
}

impl ColumnAliases {
    /// Aliases for `role`, most preferred first
    pub fn get(&self, role: Role) -> &[String] {
        self.aliases.get(&role).map_or(&[], Vec::as_slice)
    }

    /// Replace the alias list of one role
    pub fn set(&mut self, role: Role, names: Vec<String>) {
        self.aliases.insert(role, names);
    }

    /// Replace the alias lists of the given roles, keeping the rest
    pub fn with_overrides(mut self, overrides: BTreeMap<Role, Vec<String>>) -> Self {
        for (role, names) in overrides {
            self.set(role, names);
        }
        self
    }
}

/// Resolved column offset of every role
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnMap {
    indices: [usize; Role::ALL.len()],
}

impl ColumnMap {
    pub fn index(&self, role: Role) -> usize {
        self.indices[role.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, usize)> + '_ {
        Role::ALL.into_iter().map(|role| (role, self.index(role)))
    }
}

/// Map the header row onto roles
///
/// For every role the first alias present in `headers` wins. All roles that
/// cannot be found are reported together.
pub fn resolve(headers: &[String], aliases: &ColumnAliases) -> Result<ColumnMap, SchemaError> {
    let mut indices = [0; Role::ALL.len()];
    let mut missing = Vec::new();

    for role in Role::ALL {
        let found = aliases
            .get(role)
            .iter()
            .find_map(|alias| headers.iter().position(|h| h == alias));
        match found {
            Some(index) => indices[role.index()] = index,
            None => missing.push(role),
        }
    }

    if missing.is_empty() {
        Ok(ColumnMap { indices })
    } else {
        Err(SchemaError::MissingColumns(missing))
    }
}

/// Borrowed view of one source row through a [`ColumnMap`]
#[derive(Clone, Copy, Debug)]
pub struct Record<'a> {
    cells: &'a [String],
    columns: &'a ColumnMap,
}

impl<'a> Record<'a> {
    pub fn new(cells: &'a [String], columns: &'a ColumnMap) -> Self {
        Self { cells, columns }
    }

    /// View every row of a table
    pub fn all(rows: &'a [Vec<String>], columns: &'a ColumnMap) -> Vec<Self> {
        rows.iter().map(|row| Self::new(row, columns)).collect()
    }

    /// Raw cell text; short rows read as empty
    pub fn field(&self, role: Role) -> &'a str {
        self.cells
            .get(self.columns.index(role))
            .map_or("", String::as_str)
    }

    /// First millisecond of the record's day
    pub fn day_start(&self) -> Option<i64> {
        date::day_start(self.field(Role::Date))
    }

    pub fn hour(&self) -> Option<i64> {
        parse_hour(self.field(Role::Hour))
    }

    pub fn shift(&self) -> &'a str {
        self.field(Role::Shift).trim()
    }

    pub fn category(&self) -> Option<TaskCategory> {
        TaskCategory::from_label(self.field(Role::TaskType))
    }
}
