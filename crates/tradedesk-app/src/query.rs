// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;
use std::fmt;

use crate::TableKind;
use crate::table::TableRecord;

/// Sentinel filter value meaning "no constraint".
pub const ALL_CHOICE: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    All,
    Only(String),
}

impl Choice {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(ALL_CHOICE) {
            Self::All
        } else {
            Self::Only(value.to_owned())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_CHOICE,
            Self::Only(value) => value,
        }
    }

    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    UnknownFilter { table: TableKind, key: String },
    UnknownChoice { key: &'static str, value: String },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFilter { table, key } => {
                write!(f, "{table} has no filter named {key:?}")
            }
            Self::UnknownChoice { key, value } => {
                write!(f, "{value:?} is not a valid {key} filter value")
            }
        }
    }
}

impl std::error::Error for QueryError {}

/// Active discrete filters for one table. Keys absent from the map are
/// unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    active: BTreeMap<&'static str, String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, table: TableKind, key: &str, choice: Choice) -> Result<(), QueryError> {
        let Some(spec) = table.filter(key) else {
            return Err(QueryError::UnknownFilter {
                table,
                key: key.to_owned(),
            });
        };
        match choice {
            Choice::All => {
                self.active.remove(spec.key);
            }
            Choice::Only(value) => {
                if !spec.choices.contains(&value.as_str()) {
                    return Err(QueryError::UnknownChoice {
                        key: spec.key,
                        value,
                    });
                }
                self.active.insert(spec.key, value);
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Choice {
        self.active
            .get(key)
            .map_or(Choice::All, |value| Choice::Only(value.clone()))
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn is_constrained(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.active.iter().map(|(key, value)| (*key, value.as_str()))
    }
}

/// Case-insensitive substring match against the record's searchable fields.
pub fn matches_query<R: TableRecord>(record: &R, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    record
        .search_text()
        .into_iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

pub fn matches_filters<R: TableRecord>(record: &R, filters: &FilterSet) -> bool {
    filters
        .iter()
        .all(|(key, expected)| record.filter_value(key) == Some(expected))
}

pub fn filter_records<'a, R: TableRecord>(
    records: &'a [R],
    query: &str,
    filters: &FilterSet,
) -> Vec<&'a R> {
    records
        .iter()
        .filter(|record| matches_filters(*record, filters) && matches_query(*record, query))
        .collect()
}
