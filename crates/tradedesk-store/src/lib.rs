// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, info};
use tradedesk_app::{
    BankAccount, BotSetting, Broker, Call, EmailTemplate, ExchangeSetting, FieldErrors,
    FormIntent, FormPayload, RecordForm, RecordKey, References, SaveRequest, TableKind,
    TableRecord, Transaction, sequence_of,
};

pub const APP_NAME: &str = "tradedesk";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    DuplicateId { table: TableKind, id: String },
    NotFound { table: TableKind, id: String },
    Invalid(FieldErrors),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { table, id } => {
                write!(f, "{} {id} already exists", table.noun())
            }
            Self::NotFound { table, id } => {
                write!(f, "{} {id} not found -- it may have been deleted", table.noun())
            }
            Self::Invalid(errors) => write!(f, "invalid form: {errors}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// In-memory list backing one table.
///
/// Every mutation builds a new vector and swaps it in, so an `Arc` handed out
/// by [`RecordStore::snapshot`] never changes underneath its holder.
#[derive(Debug, Clone)]
pub struct RecordStore<R> {
    records: Arc<Vec<R>>,
    next_seq: u64,
}

impl<R: TableRecord> Default for RecordStore<R> {
    fn default() -> Self {
        Self {
            records: Arc::new(Vec::new()),
            next_seq: 1,
        }
    }
}

impl<R: TableRecord> RecordStore<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<R>) -> Result<Self, StoreError> {
        let mut seen = BTreeSet::new();
        for record in &records {
            if !seen.insert(record.id().as_str()) {
                return Err(StoreError::DuplicateId {
                    table: R::KIND,
                    id: record.id().to_string(),
                });
            }
        }
        let next_seq = records
            .iter()
            .filter_map(|record| sequence_of(record.id().as_str()))
            .max()
            .map_or(1, |max| max + 1);
        Ok(Self {
            records: Arc::new(records),
            next_seq,
        })
    }

    pub fn snapshot(&self) -> Arc<Vec<R>> {
        Arc::clone(&self.records)
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.records.iter().find(|record| record.id().as_str() == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn insert(&mut self, record: R) -> Result<(), StoreError> {
        if self.get(record.id().as_str()).is_some() {
            return Err(StoreError::DuplicateId {
                table: R::KIND,
                id: record.id().to_string(),
            });
        }
        if let Some(seq) = sequence_of(record.id().as_str()) {
            self.next_seq = self.next_seq.max(seq + 1);
        }
        self.replace_with(|records| records.push(record));
        Ok(())
    }

    pub fn create_from<F>(&mut self, form: &F, now: OffsetDateTime) -> Result<R::Id, StoreError>
    where
        F: RecordForm<Record = R>,
    {
        let id = self.allocate_id();
        let record = form
            .build(id.clone(), None, now)
            .map_err(StoreError::Invalid)?;
        self.next_seq += 1;
        self.replace_with(|records| records.push(record));
        info!(table = %R::KIND, id = %id, "record created");
        Ok(id)
    }

    pub fn update_from<F>(&mut self, id: &str, form: &F, now: OffsetDateTime) -> Result<(), StoreError>
    where
        F: RecordForm<Record = R>,
    {
        let Some(index) = self.position(id) else {
            return Err(StoreError::NotFound {
                table: R::KIND,
                id: id.to_owned(),
            });
        };
        let base = &self.records[index];
        let record = form
            .build(base.id().clone(), Some(base), now)
            .map_err(StoreError::Invalid)?;
        self.replace_with(|records| records[index] = record);
        info!(table = %R::KIND, id, "record updated");
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<R, StoreError> {
        let Some(index) = self.position(id) else {
            return Err(StoreError::NotFound {
                table: R::KIND,
                id: id.to_owned(),
            });
        };
        let removed = self.records[index].clone();
        self.replace_with(|records| {
            records.remove(index);
        });
        info!(table = %R::KIND, id, "record deleted");
        Ok(removed)
    }

    /// Removes every listed id that exists; unknown ids are skipped.
    pub fn remove_many(&mut self, ids: &[String]) -> usize {
        let targets = ids.iter().map(String::as_str).collect::<BTreeSet<_>>();
        let before = self.records.len();
        if !self
            .records
            .iter()
            .any(|record| targets.contains(record.id().as_str()))
        {
            debug!(table = %R::KIND, requested = ids.len(), "nothing to delete");
            return 0;
        }
        self.replace_with(|records| {
            records.retain(|record| !targets.contains(record.id().as_str()));
        });
        let removed = before - self.records.len();
        info!(table = %R::KIND, removed, "records deleted");
        removed
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|record| record.id().as_str() == id)
    }

    fn allocate_id(&mut self) -> R::Id {
        loop {
            let id = R::Id::from_sequence(self.next_seq);
            if self.get(id.as_str()).is_none() {
                return id;
            }
            self.next_seq += 1;
        }
    }

    fn replace_with(&mut self, edit: impl FnOnce(&mut Vec<R>)) {
        let mut next = Vec::clone(&self.records);
        edit(&mut next);
        self.records = Arc::new(next);
    }
}

/// All six tables plus the broker reference list.
#[derive(Debug, Clone, Default)]
pub struct Desk {
    pub accounts: RecordStore<BankAccount>,
    pub bots: RecordStore<BotSetting>,
    pub calls: RecordStore<Call>,
    pub templates: RecordStore<EmailTemplate>,
    pub exchanges: RecordStore<ExchangeSetting>,
    pub transactions: RecordStore<Transaction>,
    pub brokers: Vec<Broker>,
}

impl Desk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a create or edit from the form modal and returns the record id.
    pub fn submit(&mut self, request: &SaveRequest<FormPayload>, now: OffsetDateTime) -> Result<String> {
        let id = match &request.form {
            FormPayload::BankAccount(form) => save(&mut self.accounts, &request.intent, form, now)?,
            FormPayload::BotSetting(form) => save(&mut self.bots, &request.intent, form, now)?,
            FormPayload::Call(form) => save(&mut self.calls, &request.intent, form, now)?,
            FormPayload::EmailTemplate(form) => {
                save(&mut self.templates, &request.intent, form, now)?
            }
            FormPayload::ExchangeSetting(form) => {
                save(&mut self.exchanges, &request.intent, form, now)?
            }
            FormPayload::Transaction(form) => {
                save(&mut self.transactions, &request.intent, form, now)?
            }
        };
        Ok(id)
    }

    pub fn delete(&mut self, kind: TableKind, ids: &[String]) -> usize {
        match kind {
            TableKind::BankAccounts => self.accounts.remove_many(ids),
            TableKind::BotSettings => self.bots.remove_many(ids),
            TableKind::Calls => self.calls.remove_many(ids),
            TableKind::EmailTemplates => self.templates.remove_many(ids),
            TableKind::Exchanges => self.exchanges.remove_many(ids),
            TableKind::Transactions => self.transactions.remove_many(ids),
        }
    }

    pub fn references(&self) -> References {
        References {
            brokers: self.brokers.clone(),
            accounts: self
                .accounts
                .records()
                .iter()
                .map(|account| (account.id.clone(), account.account_name.clone()))
                .collect(),
        }
    }

    pub fn len(&self, kind: TableKind) -> usize {
        match kind {
            TableKind::BankAccounts => self.accounts.len(),
            TableKind::BotSettings => self.bots.len(),
            TableKind::Calls => self.calls.len(),
            TableKind::EmailTemplates => self.templates.len(),
            TableKind::Exchanges => self.exchanges.len(),
            TableKind::Transactions => self.transactions.len(),
        }
    }

    pub fn counts(&self) -> Vec<(TableKind, usize)> {
        TableKind::ALL
            .into_iter()
            .map(|kind| (kind, self.len(kind)))
            .collect()
    }
}

fn save<F: RecordForm>(
    store: &mut RecordStore<F::Record>,
    intent: &FormIntent,
    form: &F,
    now: OffsetDateTime,
) -> Result<String, StoreError> {
    match intent {
        FormIntent::Create => store.create_from(form, now).map(|id| id.to_string()),
        FormIntent::Edit(id) => store.update_from(id, form, now).map(|()| id.clone()),
    }
}
