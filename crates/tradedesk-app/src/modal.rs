// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use tracing::{debug, warn};

use crate::forms::{FieldErrors, FormState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormIntent {
    Create,
    Edit(String),
}

impl FormIntent {
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Create => "created",
            Self::Edit(_) => "updated",
        }
    }
}

/// What the modal hands to the save callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest<F> {
    pub intent: FormIntent,
    pub form: F,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<T> {
    NotOpen,
    Invalid(FieldErrors),
    Saved(T),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
struct OpenForm<F> {
    intent: FormIntent,
    form: F,
    errors: FieldErrors,
    save_error: Option<String>,
}

/// Create/edit dialog state machine: closed, or open over a private copy of
/// the form. Nothing outside the modal sees the copy until a save succeeds.
#[derive(Debug, Clone, PartialEq)]
pub struct ModalController<F> {
    open: Option<OpenForm<F>>,
}

impl<F> Default for ModalController<F> {
    fn default() -> Self {
        Self { open: None }
    }
}

impl<F: FormState> ModalController<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_create(&mut self, defaults: F) {
        self.open = Some(OpenForm {
            intent: FormIntent::Create,
            form: defaults,
            errors: FieldErrors::new(),
            save_error: None,
        });
    }

    pub fn open_edit(&mut self, id: impl Into<String>, form: F) {
        self.open = Some(OpenForm {
            intent: FormIntent::Edit(id.into()),
            form,
            errors: FieldErrors::new(),
            save_error: None,
        });
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn intent(&self) -> Option<&FormIntent> {
        self.open.as_ref().map(|open| &open.intent)
    }

    pub fn form(&self) -> Option<&F> {
        self.open.as_ref().map(|open| &open.form)
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        self.open.as_ref().map(|open| &open.errors)
    }

    pub fn save_error(&self) -> Option<&str> {
        self.open.as_ref().and_then(|open| open.save_error.as_deref())
    }

    /// Applies `edit` to the open form. Returns false when closed.
    pub fn update(&mut self, edit: impl FnOnce(&mut F)) -> bool {
        match self.open.as_mut() {
            Some(open) => {
                edit(&mut open.form);
                true
            }
            None => false,
        }
    }

    pub fn set_field(&mut self, key: &str, value: &str) -> bool {
        self.open
            .as_mut()
            .is_some_and(|open| open.form.set_field(key, value))
    }

    /// Re-runs validation and stores the result on the open form.
    pub fn validate(&mut self) -> FieldErrors {
        let Some(open) = self.open.as_mut() else {
            return FieldErrors::new();
        };
        open.errors = open.form.validate();
        open.errors.clone()
    }

    /// Validates, then hands the form to `on_save`. The modal closes only
    /// when `on_save` succeeds.
    pub fn submit<T>(
        &mut self,
        on_save: impl FnOnce(&SaveRequest<F>) -> Result<T>,
    ) -> SubmitOutcome<T> {
        let Some(open) = self.open.as_mut() else {
            return SubmitOutcome::NotOpen;
        };

        open.errors = open.form.validate();
        if !open.errors.is_empty() {
            debug!(fields = open.errors.len(), "form submit blocked by validation");
            return SubmitOutcome::Invalid(open.errors.clone());
        }

        let request = SaveRequest {
            intent: open.intent.clone(),
            form: open.form.clone(),
        };
        match on_save(&request) {
            Ok(value) => {
                self.open = None;
                SubmitOutcome::Saved(value)
            }
            Err(error) => {
                let message = format!("{error:#}");
                warn!(error = %message, "form save failed");
                open.save_error = Some(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }

    pub fn cancel(&mut self) {
        self.open = None;
    }
}

/// Two-step delete: ids are staged by `request` and only handed to the
/// delete callback by `confirm`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteConfirm {
    pending: Option<Vec<String>>,
}

impl DeleteConfirm {
    pub fn request(&mut self, ids: Vec<String>) -> bool {
        if ids.is_empty() {
            return false;
        }
        self.pending = Some(ids);
        true
    }

    pub fn pending(&self) -> Option<&[String]> {
        self.pending.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    /// Runs `on_delete` with the staged ids and closes. `None` when nothing
    /// was staged.
    pub fn confirm<T>(&mut self, on_delete: impl FnOnce(&[String]) -> T) -> Option<T> {
        let ids = self.pending.take()?;
        Some(on_delete(&ids))
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailView {
    record_id: Option<String>,
    scroll: u16,
}

impl DetailView {
    pub fn open(&mut self, id: impl Into<String>) {
        self.record_id = Some(id.into());
        self.scroll = 0;
    }

    pub fn record_id(&self) -> Option<&str> {
        self.record_id.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.record_id.is_some()
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn scroll_by(&mut self, delta: i16) {
        self.scroll = self.scroll.saturating_add_signed(delta);
    }

    pub fn close(&mut self) {
        self.record_id = None;
        self.scroll = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::{DeleteConfirm, DetailView, FormIntent, ModalController, SubmitOutcome};
    use crate::forms::{BotSettingFormInput, FormState};
    use anyhow::anyhow;
    use std::cell::Cell;

    fn valid_bot() -> BotSettingFormInput {
        BotSettingFormInput {
            name: "Grid ETH".to_owned(),
            trading_pair: "ETH/USDT".to_owned(),
            ..BotSettingFormInput::default()
        }
    }

    #[test]
    fn invalid_submit_stays_open_and_skips_save() {
        let mut modal = ModalController::new();
        modal.open_create(BotSettingFormInput::default());
        let called = Cell::new(false);

        let outcome = modal.submit(|_| {
            called.set(true);
            Ok(())
        });

        let SubmitOutcome::Invalid(errors) = outcome else {
            panic!("expected validation failure");
        };
        assert!(errors.get("name").is_some_and(|message| !message.is_empty()));
        assert!(!called.get());
        assert!(modal.is_open());
        assert_eq!(modal.errors(), Some(&errors));
    }

    #[test]
    fn successful_submit_closes_and_passes_the_form() {
        let mut modal = ModalController::new();
        modal.open_edit("BOT-0003", valid_bot());
        assert!(modal.set_field("name", "Grid ETH v2"));

        let outcome = modal.submit(|request| {
            assert_eq!(request.intent, FormIntent::Edit("BOT-0003".to_owned()));
            Ok(request.form.name.clone())
        });

        assert_eq!(outcome, SubmitOutcome::Saved("Grid ETH v2".to_owned()));
        assert!(!modal.is_open());
        assert!(modal.form().is_none());
    }

    #[test]
    fn failed_save_keeps_edits_for_retry() {
        let mut modal = ModalController::new();
        modal.open_create(valid_bot());

        let outcome: SubmitOutcome<()> = modal.submit(|_| Err(anyhow!("store unavailable")));

        assert_eq!(outcome, SubmitOutcome::Failed("store unavailable".to_owned()));
        assert!(modal.is_open());
        assert_eq!(modal.save_error(), Some("store unavailable"));
        assert_eq!(modal.form().map(|form| form.name.as_str()), Some("Grid ETH"));

        let retried = modal.submit(|_| Ok(7));
        assert_eq!(retried, SubmitOutcome::Saved(7));
    }

    #[test]
    fn cancel_discards_the_copy() {
        let original = valid_bot();
        let mut modal = ModalController::new();
        modal.open_edit("BOT-0001", original.clone());
        modal.update(|form| form.name.clear());
        assert!(!modal.validate().is_empty());
        modal.cancel();

        assert!(!modal.is_open());
        assert_eq!(original.name, "Grid ETH");
        assert!(original.validate().is_empty());
        assert_eq!(modal.submit(|_| Ok(())), SubmitOutcome::NotOpen);
    }

    #[test]
    fn delete_confirm_is_two_step() {
        let mut confirm = DeleteConfirm::default();
        assert!(!confirm.request(Vec::new()));
        assert!(confirm.request(vec!["CALL-0001".to_owned(), "CALL-0002".to_owned()]));
        confirm.cancel();
        assert_eq!(confirm.confirm(|ids| ids.len()), None);

        confirm.request(vec!["CALL-0001".to_owned()]);
        assert_eq!(confirm.confirm(|ids| ids.to_vec()), Some(vec!["CALL-0001".to_owned()]));
        assert!(!confirm.is_open());
    }

    #[test]
    fn detail_view_open_close() {
        let mut detail = DetailView::default();
        detail.open("TXN-0009");
        detail.scroll_by(-3);
        assert_eq!(detail.scroll(), 0);
        detail.scroll_by(2);
        assert_eq!(detail.record_id(), Some("TXN-0009"));
        detail.close();
        assert!(!detail.is_open());
        assert_eq!(detail.scroll(), 0);
    }
}
