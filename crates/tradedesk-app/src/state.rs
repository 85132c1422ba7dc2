// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::Instant;

use crate::TableKind;
use crate::notify::{Notifier, ToastKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Nav,
    Search,
    Filters,
    Columns,
    Form(TableKind),
    Detail,
    ConfirmDelete,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub active_table: TableKind,
    pub toast: Notifier,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Nav,
            active_table: TableKind::BankAccounts,
            toast: Notifier::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextTable,
    PrevTable,
    SetActiveTable(TableKind),
    EnterSearch,
    OpenFilters,
    OpenColumns,
    OpenForm(TableKind),
    OpenDetail,
    OpenConfirmDelete,
    OpenHelp,
    ExitToNav,
    Notify {
        message: String,
        kind: ToastKind,
        now: Instant,
    },
    DismissToast,
    ExpireToast {
        token: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    TableChanged(TableKind),
    ToastShown { token: u64 },
    ToastCleared,
}

impl AppState {
    pub fn with_table(table: TableKind) -> Self {
        Self {
            active_table: table,
            ..Self::default()
        }
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextTable => self.rotate_table(1),
            AppCommand::PrevTable => self.rotate_table(-1),
            AppCommand::SetActiveTable(table) => {
                if table == self.active_table {
                    return Vec::new();
                }
                self.active_table = table;
                vec![AppEvent::TableChanged(table)]
            }
            AppCommand::EnterSearch => self.set_mode(AppMode::Search),
            AppCommand::OpenFilters => self.set_mode(AppMode::Filters),
            AppCommand::OpenColumns => self.set_mode(AppMode::Columns),
            AppCommand::OpenForm(kind) => self.set_mode(AppMode::Form(kind)),
            AppCommand::OpenDetail => self.set_mode(AppMode::Detail),
            AppCommand::OpenConfirmDelete => self.set_mode(AppMode::ConfirmDelete),
            AppCommand::OpenHelp => self.set_mode(AppMode::Help),
            AppCommand::ExitToNav => self.set_mode(AppMode::Nav),
            AppCommand::Notify { message, kind, now } => {
                let token = self.toast.notify(message, kind, now);
                vec![AppEvent::ToastShown { token }]
            }
            AppCommand::DismissToast => {
                if self.toast.current().is_none() {
                    return Vec::new();
                }
                self.toast.dismiss();
                vec![AppEvent::ToastCleared]
            }
            AppCommand::ExpireToast { token } => {
                if self.toast.expire(token) {
                    vec![AppEvent::ToastCleared]
                } else {
                    Vec::new()
                }
            }
        }
    }

    fn set_mode(&mut self, mode: AppMode) -> Vec<AppEvent> {
        self.mode = mode;
        vec![AppEvent::ModeChanged(mode)]
    }

    fn rotate_table(&mut self, delta: isize) -> Vec<AppEvent> {
        let tables = TableKind::ALL;
        let current = tables
            .iter()
            .position(|table| *table == self.active_table)
            .unwrap_or(0) as isize;
        let len = tables.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.active_table = tables[next];
        vec![AppEvent::TableChanged(self.active_table)]
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppMode, AppState};
    use crate::TableKind;
    use crate::notify::ToastKind;
    use std::time::Instant;

    #[test]
    fn table_rotation_wraps() {
        let mut state = AppState::with_table(TableKind::Transactions);

        let events = state.dispatch(AppCommand::NextTable);
        assert_eq!(state.active_table, TableKind::BankAccounts);
        assert_eq!(events, vec![AppEvent::TableChanged(TableKind::BankAccounts)]);

        state.dispatch(AppCommand::PrevTable);
        assert_eq!(state.active_table, TableKind::Transactions);
    }

    #[test]
    fn mode_transitions() {
        let mut state = AppState::default();

        state.dispatch(AppCommand::EnterSearch);
        assert_eq!(state.mode, AppMode::Search);

        state.dispatch(AppCommand::OpenForm(TableKind::Calls));
        assert_eq!(state.mode, AppMode::Form(TableKind::Calls));

        let events = state.dispatch(AppCommand::ExitToNav);
        assert_eq!(state.mode, AppMode::Nav);
        assert_eq!(events, vec![AppEvent::ModeChanged(AppMode::Nav)]);
    }

    #[test]
    fn stale_expiry_is_ignored() {
        let mut state = AppState::default();
        let now = Instant::now();
        let first = state.dispatch(AppCommand::Notify {
            message: "saved".to_owned(),
            kind: ToastKind::Success,
            now,
        });
        let [AppEvent::ToastShown { token: first }] = first.as_slice() else {
            panic!("expected toast event");
        };
        state.dispatch(AppCommand::Notify {
            message: "deleted".to_owned(),
            kind: ToastKind::Info,
            now,
        });

        assert!(state.dispatch(AppCommand::ExpireToast { token: *first }).is_empty());
        assert!(state.toast.current().is_some());
        assert_eq!(
            state.dispatch(AppCommand::DismissToast),
            vec![AppEvent::ToastCleared]
        );
    }
}
