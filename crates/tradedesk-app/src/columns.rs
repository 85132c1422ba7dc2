// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;

use crate::table::ColumnSpec;

/// Visibility flag for every declared column of one table.
///
/// The key set is fixed at construction; operations on keys that were never
/// declared are refused and leave the map unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnVisibility {
    order: Vec<&'static str>,
    visible: BTreeMap<&'static str, bool>,
}

impl ColumnVisibility {
    pub fn new(specs: &'static [ColumnSpec]) -> Self {
        Self {
            order: specs.iter().map(|spec| spec.key).collect(),
            visible: specs.iter().map(|spec| (spec.key, true)).collect(),
        }
    }

    pub fn toggle(&mut self, key: &str) -> Option<bool> {
        let flag = self.visible.get_mut(key)?;
        *flag = !*flag;
        Some(*flag)
    }

    pub fn set(&mut self, key: &str, visible: bool) -> bool {
        match self.visible.get_mut(key) {
            Some(flag) => {
                *flag = visible;
                true
            }
            None => false,
        }
    }

    pub fn show_all(&mut self) {
        self.visible.values_mut().for_each(|flag| *flag = true);
    }

    pub fn hide_all(&mut self) {
        self.visible.values_mut().for_each(|flag| *flag = false);
    }

    pub fn is_visible(&self, key: &str) -> bool {
        self.visible.get(key).copied().unwrap_or(false)
    }

    /// Every declared key, in declaration order.
    pub fn keys(&self) -> &[&'static str] {
        &self.order
    }

    pub fn visible_keys(&self) -> Vec<&'static str> {
        self.order
            .iter()
            .copied()
            .filter(|key| self.is_visible(key))
            .collect()
    }

    pub fn hidden_count(&self) -> usize {
        self.visible.values().filter(|flag| !**flag).count()
    }
}

#[cfg(test)]
mod tests {
    use super::ColumnVisibility;
    use crate::TableKind;

    #[test]
    fn starts_all_visible_in_declared_order() {
        let columns = ColumnVisibility::new(TableKind::Calls.columns());
        let declared = TableKind::Calls
            .columns()
            .iter()
            .map(|spec| spec.key)
            .collect::<Vec<_>>();
        assert_eq!(columns.keys(), declared.as_slice());
        assert_eq!(columns.visible_keys(), declared);
        assert_eq!(columns.hidden_count(), 0);
    }

    #[test]
    fn unknown_keys_are_refused() {
        let mut columns = ColumnVisibility::new(TableKind::Calls.columns());
        let before = columns.clone();
        assert!(!columns.set("ghost", false));
        assert_eq!(columns.toggle("ghost"), None);
        assert!(!columns.is_visible("ghost"));
        assert_eq!(columns, before);
    }

    #[test]
    fn toggle_show_all_and_hide_all() {
        let mut columns = ColumnVisibility::new(TableKind::Exchanges.columns());
        assert_eq!(columns.toggle("api_url"), Some(false));
        assert!(!columns.is_visible("api_url"));
        assert!(!columns.visible_keys().contains(&"api_url"));

        columns.hide_all();
        assert!(columns.visible_keys().is_empty());
        assert_eq!(columns.keys().len(), TableKind::Exchanges.columns().len());

        columns.show_all();
        assert_eq!(columns.hidden_count(), 0);
    }
}
