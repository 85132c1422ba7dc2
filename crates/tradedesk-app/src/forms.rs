// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;
use std::fmt;
use time::OffsetDateTime;

use crate::table::TableRecord;
use crate::validation::{
    ValidationError, ValidationResult, format_cents_plain, format_yes_no, is_valid_currency,
    is_valid_email, is_valid_phone, is_valid_trading_pair, is_valid_url, parse_cents,
    parse_int_in_range, parse_percent, parse_positive_cents, parse_yes_no, require_text,
    split_tags,
};
use crate::{
    AccountStatus, AccountType, BankAccount, BankAccountId, BotSetting, BotStatus, BotStrategy,
    BrokerId, CURRENCIES, Call, CallDirection, CallStatus, EmailTemplate, ExchangeSetting,
    ExchangeStatus, RiskLevel, TableKind, TemplateCategory, TemplateStatus, Transaction,
    TransactionKind, TransactionStatus,
};

pub const MAX_CALL_SECS: i64 = 86_400;
pub const MAX_RETRY_ATTEMPTS: i64 = 10;
pub const MAX_RATE_LIMIT: i64 = 100_000;

/// Field key to message. Empty means the form is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error for `key` unless one is already present.
    pub fn insert(&mut self, key: &'static str, message: impl Into<String>) {
        self.0.entry(key).or_insert_with(|| message.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(key, message)| (*key, message.as_str()))
    }

    /// First error in field declaration order.
    pub fn first_in(&self, specs: &[FieldSpec]) -> Option<&str> {
        specs
            .iter()
            .find_map(|spec| self.get(spec.key))
            .or_else(|| self.0.values().next().map(String::as_str))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut messages = self.0.values();
        match messages.next() {
            None => f.write_str("no errors"),
            Some(first) => {
                f.write_str(first)?;
                let rest = messages.count();
                if rest > 0 {
                    write!(f, " (+{rest} more)")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for FieldErrors {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Choice(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

const fn text(key: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec {
        key,
        label,
        kind: FieldKind::Text,
    }
}

const fn choice(key: &'static str, label: &'static str, choices: &'static [&'static str]) -> FieldSpec {
    FieldSpec {
        key,
        label,
        kind: FieldKind::Choice(choices),
    }
}

/// Editable form state plugged into the shared modal controller.
pub trait FormState: Clone + PartialEq + fmt::Debug {
    fn field_specs(&self) -> &'static [FieldSpec];

    fn field(&self, key: &str) -> Option<String>;

    /// Returns false for unknown keys and for values a choice field rejects.
    fn set_field(&mut self, key: &str, value: &str) -> bool;

    fn validate(&self) -> FieldErrors;
}

/// A form that seeds from and builds one record type.
pub trait RecordForm: FormState + Default {
    type Record: TableRecord;

    fn from_record(record: &Self::Record) -> Self;

    /// Builds the record to store. `base` is the record being edited; its
    /// `created_at` and aggregate fields carry over.
    fn build(
        &self,
        id: <Self::Record as TableRecord>::Id,
        base: Option<&Self::Record>,
        now: OffsetDateTime,
    ) -> Result<Self::Record, FieldErrors>;
}

struct Rules {
    specs: &'static [FieldSpec],
    errors: FieldErrors,
}

impl Rules {
    fn new(specs: &'static [FieldSpec]) -> Self {
        Self {
            specs,
            errors: FieldErrors::new(),
        }
    }

    fn fail(&mut self, key: &'static str, error: ValidationError) {
        let label = self
            .specs
            .iter()
            .find(|spec| spec.key == key)
            .map_or(key, |spec| spec.label);
        self.errors.insert(key, format!("{label} {error}"));
    }

    fn check<T>(&mut self, key: &'static str, result: ValidationResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.fail(key, error);
                None
            }
        }
    }

    fn required(&mut self, key: &'static str, value: &str) {
        self.check(key, require_text(value));
    }

    fn predicate(
        &mut self,
        key: &'static str,
        value: &str,
        valid: fn(&str) -> bool,
        error: ValidationError,
    ) {
        if value.trim().is_empty() {
            self.fail(key, ValidationError::Required);
        } else if !valid(value) {
            self.fail(key, error);
        }
    }

    fn finish(self) -> FieldErrors {
        self.errors
    }
}

fn set_choice<T: Copy>(slot: &mut T, value: &str, parse: fn(&str) -> Option<T>) -> bool {
    match parse(value) {
        Some(parsed) => {
            *slot = parsed;
            true
        }
        None => false,
    }
}

fn ensure_valid<F: FormState>(form: &F) -> Result<(), FieldErrors> {
    let errors = form.validate();
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankAccountFormInput {
    pub account_name: String,
    pub bank_name: String,
    pub holder_name: String,
    pub holder_email: String,
    pub account_number: String,
    pub currency: String,
    pub account_type: AccountType,
    pub status: AccountStatus,
}

const BANK_ACCOUNT_FIELDS: &[FieldSpec] = &[
    text("account_name", "Account name"),
    text("bank_name", "Bank"),
    text("holder_name", "Holder"),
    text("holder_email", "Holder email"),
    text("account_number", "Account number"),
    choice("currency", "Currency", &CURRENCIES),
    choice("account_type", "Type", AccountType::CHOICES),
    choice("status", "Status", AccountStatus::CHOICES),
];

impl Default for BankAccountFormInput {
    fn default() -> Self {
        Self {
            account_name: String::new(),
            bank_name: String::new(),
            holder_name: String::new(),
            holder_email: String::new(),
            account_number: String::new(),
            currency: "USD".to_owned(),
            account_type: AccountType::Checking,
            status: AccountStatus::Pending,
        }
    }
}

impl FormState for BankAccountFormInput {
    fn field_specs(&self) -> &'static [FieldSpec] {
        BANK_ACCOUNT_FIELDS
    }

    fn field(&self, key: &str) -> Option<String> {
        Some(match key {
            "account_name" => self.account_name.clone(),
            "bank_name" => self.bank_name.clone(),
            "holder_name" => self.holder_name.clone(),
            "holder_email" => self.holder_email.clone(),
            "account_number" => self.account_number.clone(),
            "currency" => self.currency.clone(),
            "account_type" => self.account_type.as_str().to_owned(),
            "status" => self.status.as_str().to_owned(),
            _ => return None,
        })
    }

    fn set_field(&mut self, key: &str, value: &str) -> bool {
        let slot = match key {
            "account_name" => &mut self.account_name,
            "bank_name" => &mut self.bank_name,
            "holder_name" => &mut self.holder_name,
            "holder_email" => &mut self.holder_email,
            "account_number" => &mut self.account_number,
            "currency" => &mut self.currency,
            "account_type" => return set_choice(&mut self.account_type, value, AccountType::parse),
            "status" => return set_choice(&mut self.status, value, AccountStatus::parse),
            _ => return false,
        };
        value.clone_into(slot);
        true
    }

    fn validate(&self) -> FieldErrors {
        let mut rules = Rules::new(BANK_ACCOUNT_FIELDS);
        rules.required("account_name", &self.account_name);
        rules.required("bank_name", &self.bank_name);
        rules.required("holder_name", &self.holder_name);
        rules.predicate(
            "holder_email",
            &self.holder_email,
            is_valid_email,
            ValidationError::InvalidEmail,
        );
        rules.required("account_number", &self.account_number);
        rules.predicate(
            "currency",
            &self.currency,
            is_valid_currency,
            ValidationError::InvalidCurrency,
        );
        rules.finish()
    }
}

impl RecordForm for BankAccountFormInput {
    type Record = BankAccount;

    fn from_record(record: &BankAccount) -> Self {
        Self {
            account_name: record.account_name.clone(),
            bank_name: record.bank_name.clone(),
            holder_name: record.holder_name.clone(),
            holder_email: record.holder_email.clone(),
            account_number: record.account_number.clone(),
            currency: record.currency.clone(),
            account_type: record.account_type,
            status: record.status,
        }
    }

    fn build(
        &self,
        id: BankAccountId,
        base: Option<&BankAccount>,
        now: OffsetDateTime,
    ) -> Result<BankAccount, FieldErrors> {
        ensure_valid(self)?;
        let created_at = base.map_or(now, |record| record.created_at);
        Ok(BankAccount {
            id,
            account_name: self.account_name.trim().to_owned(),
            bank_name: self.bank_name.trim().to_owned(),
            holder_name: self.holder_name.trim().to_owned(),
            holder_email: self.holder_email.trim().to_owned(),
            account_number: self.account_number.trim().to_owned(),
            currency: self.currency.trim().to_owned(),
            account_type: self.account_type,
            status: self.status,
            balance_cents: base.map_or(0, |record| record.balance_cents),
            created_at,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotSettingFormInput {
    pub name: String,
    pub description: String,
    pub trading_pair: String,
    pub strategy: BotStrategy,
    pub risk_level: RiskLevel,
    pub status: BotStatus,
    pub max_position_pct: String,
    pub stop_loss_pct: String,
    pub take_profit_pct: String,
    pub tags: String,
}

const BOT_SETTING_FIELDS: &[FieldSpec] = &[
    text("name", "Name"),
    text("description", "Description"),
    text("trading_pair", "Trading pair"),
    choice("strategy", "Strategy", BotStrategy::CHOICES),
    choice("risk_level", "Risk", RiskLevel::CHOICES),
    choice("status", "Status", BotStatus::CHOICES),
    text("max_position_pct", "Max position %"),
    text("stop_loss_pct", "Stop loss %"),
    text("take_profit_pct", "Take profit %"),
    text("tags", "Tags"),
];

impl Default for BotSettingFormInput {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            trading_pair: String::new(),
            strategy: BotStrategy::Grid,
            risk_level: RiskLevel::Medium,
            status: BotStatus::Paused,
            max_position_pct: "10".to_owned(),
            stop_loss_pct: "2".to_owned(),
            take_profit_pct: "5".to_owned(),
            tags: String::new(),
        }
    }
}

impl FormState for BotSettingFormInput {
    fn field_specs(&self) -> &'static [FieldSpec] {
        BOT_SETTING_FIELDS
    }

    fn field(&self, key: &str) -> Option<String> {
        Some(match key {
            "name" => self.name.clone(),
            "description" => self.description.clone(),
            "trading_pair" => self.trading_pair.clone(),
            "strategy" => self.strategy.as_str().to_owned(),
            "risk_level" => self.risk_level.as_str().to_owned(),
            "status" => self.status.as_str().to_owned(),
            "max_position_pct" => self.max_position_pct.clone(),
            "stop_loss_pct" => self.stop_loss_pct.clone(),
            "take_profit_pct" => self.take_profit_pct.clone(),
            "tags" => self.tags.clone(),
            _ => return None,
        })
    }

    fn set_field(&mut self, key: &str, value: &str) -> bool {
        let slot = match key {
            "name" => &mut self.name,
            "description" => &mut self.description,
            "trading_pair" => &mut self.trading_pair,
            "strategy" => return set_choice(&mut self.strategy, value, BotStrategy::parse),
            "risk_level" => return set_choice(&mut self.risk_level, value, RiskLevel::parse),
            "status" => return set_choice(&mut self.status, value, BotStatus::parse),
            "max_position_pct" => &mut self.max_position_pct,
            "stop_loss_pct" => &mut self.stop_loss_pct,
            "take_profit_pct" => &mut self.take_profit_pct,
            "tags" => &mut self.tags,
            _ => return false,
        };
        value.clone_into(slot);
        true
    }

    fn validate(&self) -> FieldErrors {
        let mut rules = Rules::new(BOT_SETTING_FIELDS);
        rules.required("name", &self.name);
        rules.predicate(
            "trading_pair",
            &self.trading_pair,
            is_valid_trading_pair,
            ValidationError::InvalidTradingPair,
        );
        rules.check("max_position_pct", parse_percent(&self.max_position_pct));
        rules.check("stop_loss_pct", parse_percent(&self.stop_loss_pct));
        rules.check("take_profit_pct", parse_percent(&self.take_profit_pct));
        rules.finish()
    }
}

impl RecordForm for BotSettingFormInput {
    type Record = BotSetting;

    fn from_record(record: &BotSetting) -> Self {
        Self {
            name: record.name.clone(),
            description: record.description.clone(),
            trading_pair: record.trading_pair.clone(),
            strategy: record.strategy,
            risk_level: record.risk_level,
            status: record.status,
            max_position_pct: record.max_position_pct.to_string(),
            stop_loss_pct: record.stop_loss_pct.to_string(),
            take_profit_pct: record.take_profit_pct.to_string(),
            tags: record.tags.join(", "),
        }
    }

    fn build(
        &self,
        id: crate::BotSettingId,
        base: Option<&BotSetting>,
        now: OffsetDateTime,
    ) -> Result<BotSetting, FieldErrors> {
        ensure_valid(self)?;
        let created_at = base.map_or(now, |record| record.created_at);
        Ok(BotSetting {
            id,
            name: self.name.trim().to_owned(),
            description: self.description.trim().to_owned(),
            trading_pair: self.trading_pair.trim().to_ascii_uppercase(),
            strategy: self.strategy,
            risk_level: self.risk_level,
            status: self.status,
            max_position_pct: parse_percent(&self.max_position_pct).unwrap_or_default(),
            stop_loss_pct: parse_percent(&self.stop_loss_pct).unwrap_or_default(),
            take_profit_pct: parse_percent(&self.take_profit_pct).unwrap_or_default(),
            success_rate_pct: base.map_or(0.0, |record| record.success_rate_pct),
            total_trades: base.map_or(0, |record| record.total_trades),
            tags: split_tags(&self.tags),
            created_at,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFormInput {
    pub client_name: String,
    pub phone_number: String,
    pub agent_name: String,
    pub direction: CallDirection,
    pub status: CallStatus,
    pub duration_secs: String,
    pub notes: String,
}

const CALL_FIELDS: &[FieldSpec] = &[
    text("client_name", "Client"),
    text("phone_number", "Phone"),
    text("agent_name", "Agent"),
    choice("direction", "Direction", CallDirection::CHOICES),
    choice("status", "Status", CallStatus::CHOICES),
    text("duration_secs", "Duration (s)"),
    text("notes", "Notes"),
];

impl Default for CallFormInput {
    fn default() -> Self {
        Self {
            client_name: String::new(),
            phone_number: String::new(),
            agent_name: String::new(),
            direction: CallDirection::Outbound,
            status: CallStatus::Scheduled,
            duration_secs: "0".to_owned(),
            notes: String::new(),
        }
    }
}

impl FormState for CallFormInput {
    fn field_specs(&self) -> &'static [FieldSpec] {
        CALL_FIELDS
    }

    fn field(&self, key: &str) -> Option<String> {
        Some(match key {
            "client_name" => self.client_name.clone(),
            "phone_number" => self.phone_number.clone(),
            "agent_name" => self.agent_name.clone(),
            "direction" => self.direction.as_str().to_owned(),
            "status" => self.status.as_str().to_owned(),
            "duration_secs" => self.duration_secs.clone(),
            "notes" => self.notes.clone(),
            _ => return None,
        })
    }

    fn set_field(&mut self, key: &str, value: &str) -> bool {
        let slot = match key {
            "client_name" => &mut self.client_name,
            "phone_number" => &mut self.phone_number,
            "agent_name" => &mut self.agent_name,
            "direction" => return set_choice(&mut self.direction, value, CallDirection::parse),
            "status" => return set_choice(&mut self.status, value, CallStatus::parse),
            "duration_secs" => &mut self.duration_secs,
            "notes" => &mut self.notes,
            _ => return false,
        };
        value.clone_into(slot);
        true
    }

    fn validate(&self) -> FieldErrors {
        let mut rules = Rules::new(CALL_FIELDS);
        rules.required("client_name", &self.client_name);
        rules.predicate(
            "phone_number",
            &self.phone_number,
            is_valid_phone,
            ValidationError::InvalidPhone,
        );
        rules.required("agent_name", &self.agent_name);
        rules.check(
            "duration_secs",
            parse_int_in_range(&self.duration_secs, 0, MAX_CALL_SECS),
        );
        rules.finish()
    }
}

impl RecordForm for CallFormInput {
    type Record = Call;

    fn from_record(record: &Call) -> Self {
        Self {
            client_name: record.client_name.clone(),
            phone_number: record.phone_number.clone(),
            agent_name: record.agent_name.clone(),
            direction: record.direction,
            status: record.status,
            duration_secs: record.duration_secs.to_string(),
            notes: record.notes.clone(),
        }
    }

    fn build(
        &self,
        id: crate::CallId,
        base: Option<&Call>,
        now: OffsetDateTime,
    ) -> Result<Call, FieldErrors> {
        ensure_valid(self)?;
        let created_at = base.map_or(now, |record| record.created_at);
        let duration = parse_int_in_range(&self.duration_secs, 0, MAX_CALL_SECS).unwrap_or(0);
        Ok(Call {
            id,
            client_name: self.client_name.trim().to_owned(),
            phone_number: self.phone_number.trim().to_owned(),
            agent_name: self.agent_name.trim().to_owned(),
            direction: self.direction,
            status: self.status,
            duration_secs: u32::try_from(duration).unwrap_or(0),
            notes: self.notes.trim().to_owned(),
            created_at,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailTemplateFormInput {
    pub name: String,
    pub subject: String,
    pub body: String,
    pub category: TemplateCategory,
    pub status: TemplateStatus,
    pub broker_id: String,
    pub sender_email: String,
    pub retry_attempts: String,
}

const EMAIL_TEMPLATE_FIELDS: &[FieldSpec] = &[
    text("name", "Name"),
    text("subject", "Subject"),
    text("body", "Body"),
    choice("category", "Category", TemplateCategory::CHOICES),
    choice("status", "Status", TemplateStatus::CHOICES),
    text("broker_id", "Broker ID"),
    text("sender_email", "Sender email"),
    text("retry_attempts", "Retry attempts"),
];

impl Default for EmailTemplateFormInput {
    fn default() -> Self {
        Self {
            name: String::new(),
            subject: String::new(),
            body: String::new(),
            category: TemplateCategory::Welcome,
            status: TemplateStatus::Draft,
            broker_id: String::new(),
            sender_email: String::new(),
            retry_attempts: "3".to_owned(),
        }
    }
}

impl FormState for EmailTemplateFormInput {
    fn field_specs(&self) -> &'static [FieldSpec] {
        EMAIL_TEMPLATE_FIELDS
    }

    fn field(&self, key: &str) -> Option<String> {
        Some(match key {
            "name" => self.name.clone(),
            "subject" => self.subject.clone(),
            "body" => self.body.clone(),
            "category" => self.category.as_str().to_owned(),
            "status" => self.status.as_str().to_owned(),
            "broker_id" => self.broker_id.clone(),
            "sender_email" => self.sender_email.clone(),
            "retry_attempts" => self.retry_attempts.clone(),
            _ => return None,
        })
    }

    fn set_field(&mut self, key: &str, value: &str) -> bool {
        let slot = match key {
            "name" => &mut self.name,
            "subject" => &mut self.subject,
            "body" => &mut self.body,
            "category" => return set_choice(&mut self.category, value, TemplateCategory::parse),
            "status" => return set_choice(&mut self.status, value, TemplateStatus::parse),
            "broker_id" => &mut self.broker_id,
            "sender_email" => &mut self.sender_email,
            "retry_attempts" => &mut self.retry_attempts,
            _ => return false,
        };
        value.clone_into(slot);
        true
    }

    fn validate(&self) -> FieldErrors {
        let mut rules = Rules::new(EMAIL_TEMPLATE_FIELDS);
        rules.required("name", &self.name);
        rules.required("subject", &self.subject);
        rules.required("body", &self.body);
        rules.required("broker_id", &self.broker_id);
        rules.predicate(
            "sender_email",
            &self.sender_email,
            is_valid_email,
            ValidationError::InvalidEmail,
        );
        rules.check(
            "retry_attempts",
            parse_int_in_range(&self.retry_attempts, 0, MAX_RETRY_ATTEMPTS),
        );
        rules.finish()
    }
}

impl RecordForm for EmailTemplateFormInput {
    type Record = EmailTemplate;

    fn from_record(record: &EmailTemplate) -> Self {
        Self {
            name: record.name.clone(),
            subject: record.subject.clone(),
            body: record.body.clone(),
            category: record.category,
            status: record.status,
            broker_id: record.broker_id.get().to_owned(),
            sender_email: record.sender_email.clone(),
            retry_attempts: record.retry_attempts.to_string(),
        }
    }

    fn build(
        &self,
        id: crate::EmailTemplateId,
        base: Option<&EmailTemplate>,
        now: OffsetDateTime,
    ) -> Result<EmailTemplate, FieldErrors> {
        ensure_valid(self)?;
        let created_at = base.map_or(now, |record| record.created_at);
        let retries = parse_int_in_range(&self.retry_attempts, 0, MAX_RETRY_ATTEMPTS).unwrap_or(0);
        Ok(EmailTemplate {
            id,
            name: self.name.trim().to_owned(),
            subject: self.subject.trim().to_owned(),
            body: self.body.clone(),
            category: self.category,
            status: self.status,
            broker_id: BrokerId::new(self.broker_id.trim()),
            sender_email: self.sender_email.trim().to_owned(),
            retry_attempts: u8::try_from(retries).unwrap_or(0),
            usage_count: base.map_or(0, |record| record.usage_count),
            created_at,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeSettingFormInput {
    pub exchange_name: String,
    pub api_url: String,
    pub api_key_label: String,
    pub status: ExchangeStatus,
    pub trading_enabled: bool,
    pub maker_fee_pct: String,
    pub taker_fee_pct: String,
    pub rate_limit_per_min: String,
}

const EXCHANGE_SETTING_FIELDS: &[FieldSpec] = &[
    text("exchange_name", "Exchange"),
    text("api_url", "API URL"),
    text("api_key_label", "API key label"),
    choice("status", "Status", ExchangeStatus::CHOICES),
    choice("trading_enabled", "Trading enabled", &["yes", "no"]),
    text("maker_fee_pct", "Maker fee %"),
    text("taker_fee_pct", "Taker fee %"),
    text("rate_limit_per_min", "Rate limit/min"),
];

impl Default for ExchangeSettingFormInput {
    fn default() -> Self {
        Self {
            exchange_name: String::new(),
            api_url: "https://".to_owned(),
            api_key_label: String::new(),
            status: ExchangeStatus::Disconnected,
            trading_enabled: false,
            maker_fee_pct: "0.1".to_owned(),
            taker_fee_pct: "0.1".to_owned(),
            rate_limit_per_min: "1200".to_owned(),
        }
    }
}

impl FormState for ExchangeSettingFormInput {
    fn field_specs(&self) -> &'static [FieldSpec] {
        EXCHANGE_SETTING_FIELDS
    }

    fn field(&self, key: &str) -> Option<String> {
        Some(match key {
            "exchange_name" => self.exchange_name.clone(),
            "api_url" => self.api_url.clone(),
            "api_key_label" => self.api_key_label.clone(),
            "status" => self.status.as_str().to_owned(),
            "trading_enabled" => format_yes_no(self.trading_enabled).to_owned(),
            "maker_fee_pct" => self.maker_fee_pct.clone(),
            "taker_fee_pct" => self.taker_fee_pct.clone(),
            "rate_limit_per_min" => self.rate_limit_per_min.clone(),
            _ => return None,
        })
    }

    fn set_field(&mut self, key: &str, value: &str) -> bool {
        let slot = match key {
            "exchange_name" => &mut self.exchange_name,
            "api_url" => &mut self.api_url,
            "api_key_label" => &mut self.api_key_label,
            "status" => return set_choice(&mut self.status, value, ExchangeStatus::parse),
            "trading_enabled" => {
                return set_choice(&mut self.trading_enabled, value, |raw| {
                    parse_yes_no(raw).ok()
                });
            }
            "maker_fee_pct" => &mut self.maker_fee_pct,
            "taker_fee_pct" => &mut self.taker_fee_pct,
            "rate_limit_per_min" => &mut self.rate_limit_per_min,
            _ => return false,
        };
        value.clone_into(slot);
        true
    }

    fn validate(&self) -> FieldErrors {
        let mut rules = Rules::new(EXCHANGE_SETTING_FIELDS);
        rules.required("exchange_name", &self.exchange_name);
        rules.predicate(
            "api_url",
            &self.api_url,
            is_valid_url,
            ValidationError::InvalidUrl,
        );
        rules.required("api_key_label", &self.api_key_label);
        rules.check("maker_fee_pct", parse_percent(&self.maker_fee_pct));
        rules.check("taker_fee_pct", parse_percent(&self.taker_fee_pct));
        rules.check(
            "rate_limit_per_min",
            parse_int_in_range(&self.rate_limit_per_min, 1, MAX_RATE_LIMIT),
        );
        rules.finish()
    }
}

impl RecordForm for ExchangeSettingFormInput {
    type Record = ExchangeSetting;

    fn from_record(record: &ExchangeSetting) -> Self {
        Self {
            exchange_name: record.exchange_name.clone(),
            api_url: record.api_url.clone(),
            api_key_label: record.api_key_label.clone(),
            status: record.status,
            trading_enabled: record.trading_enabled,
            maker_fee_pct: record.maker_fee_pct.to_string(),
            taker_fee_pct: record.taker_fee_pct.to_string(),
            rate_limit_per_min: record.rate_limit_per_min.to_string(),
        }
    }

    fn build(
        &self,
        id: crate::ExchangeSettingId,
        base: Option<&ExchangeSetting>,
        now: OffsetDateTime,
    ) -> Result<ExchangeSetting, FieldErrors> {
        ensure_valid(self)?;
        let created_at = base.map_or(now, |record| record.created_at);
        let rate = parse_int_in_range(&self.rate_limit_per_min, 1, MAX_RATE_LIMIT).unwrap_or(1);
        Ok(ExchangeSetting {
            id,
            exchange_name: self.exchange_name.trim().to_owned(),
            api_url: self.api_url.trim().to_owned(),
            api_key_label: self.api_key_label.trim().to_owned(),
            status: self.status,
            trading_enabled: self.trading_enabled,
            maker_fee_pct: parse_percent(&self.maker_fee_pct).unwrap_or_default(),
            taker_fee_pct: parse_percent(&self.taker_fee_pct).unwrap_or_default(),
            rate_limit_per_min: u32::try_from(rate).unwrap_or(1),
            created_at,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionFormInput {
    pub account_id: String,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub amount: String,
    pub currency: String,
    pub counterparty: String,
    pub reference: String,
    pub description: String,
}

const TRANSACTION_FIELDS: &[FieldSpec] = &[
    text("account_id", "Account ID"),
    choice("kind", "Kind", TransactionKind::CHOICES),
    choice("status", "Status", TransactionStatus::CHOICES),
    text("amount", "Amount"),
    choice("currency", "Currency", &CURRENCIES),
    text("counterparty", "Counterparty"),
    text("reference", "Reference"),
    text("description", "Description"),
];

impl Default for TransactionFormInput {
    fn default() -> Self {
        Self {
            account_id: String::new(),
            kind: TransactionKind::Deposit,
            status: TransactionStatus::Pending,
            amount: String::new(),
            currency: "USD".to_owned(),
            counterparty: String::new(),
            reference: String::new(),
            description: String::new(),
        }
    }
}

impl FormState for TransactionFormInput {
    fn field_specs(&self) -> &'static [FieldSpec] {
        TRANSACTION_FIELDS
    }

    fn field(&self, key: &str) -> Option<String> {
        Some(match key {
            "account_id" => self.account_id.clone(),
            "kind" => self.kind.as_str().to_owned(),
            "status" => self.status.as_str().to_owned(),
            "amount" => self.amount.clone(),
            "currency" => self.currency.clone(),
            "counterparty" => self.counterparty.clone(),
            "reference" => self.reference.clone(),
            "description" => self.description.clone(),
            _ => return None,
        })
    }

    fn set_field(&mut self, key: &str, value: &str) -> bool {
        let slot = match key {
            "account_id" => &mut self.account_id,
            "kind" => return set_choice(&mut self.kind, value, TransactionKind::parse),
            "status" => return set_choice(&mut self.status, value, TransactionStatus::parse),
            "amount" => &mut self.amount,
            "currency" => &mut self.currency,
            "counterparty" => &mut self.counterparty,
            "reference" => &mut self.reference,
            "description" => &mut self.description,
            _ => return false,
        };
        value.clone_into(slot);
        true
    }

    fn validate(&self) -> FieldErrors {
        let mut rules = Rules::new(TRANSACTION_FIELDS);
        rules.required("account_id", &self.account_id);
        rules.check("amount", parse_positive_cents(&self.amount));
        rules.predicate(
            "currency",
            &self.currency,
            is_valid_currency,
            ValidationError::InvalidCurrency,
        );
        rules.required("counterparty", &self.counterparty);
        rules.required("reference", &self.reference);
        rules.finish()
    }
}

impl RecordForm for TransactionFormInput {
    type Record = Transaction;

    fn from_record(record: &Transaction) -> Self {
        Self {
            account_id: record.account_id.get().to_owned(),
            kind: record.kind,
            status: record.status,
            amount: format_cents_plain(record.amount_cents),
            currency: record.currency.clone(),
            counterparty: record.counterparty.clone(),
            reference: record.reference.clone(),
            description: record.description.clone(),
        }
    }

    fn build(
        &self,
        id: crate::TransactionId,
        base: Option<&Transaction>,
        now: OffsetDateTime,
    ) -> Result<Transaction, FieldErrors> {
        ensure_valid(self)?;
        let created_at = base.map_or(now, |record| record.created_at);
        Ok(Transaction {
            id,
            account_id: BankAccountId::new(self.account_id.trim()),
            kind: self.kind,
            status: self.status,
            amount_cents: parse_cents(&self.amount).unwrap_or_default(),
            currency: self.currency.trim().to_owned(),
            counterparty: self.counterparty.trim().to_owned(),
            reference: self.reference.trim().to_owned(),
            description: self.description.trim().to_owned(),
            created_at,
            updated_at: now,
        })
    }
}

/// The per-table form the UI edits, tagged by table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPayload {
    BankAccount(BankAccountFormInput),
    BotSetting(BotSettingFormInput),
    Call(CallFormInput),
    EmailTemplate(EmailTemplateFormInput),
    ExchangeSetting(ExchangeSettingFormInput),
    Transaction(TransactionFormInput),
}

impl FormPayload {
    pub fn kind(&self) -> TableKind {
        match self {
            Self::BankAccount(_) => TableKind::BankAccounts,
            Self::BotSetting(_) => TableKind::BotSettings,
            Self::Call(_) => TableKind::Calls,
            Self::EmailTemplate(_) => TableKind::EmailTemplates,
            Self::ExchangeSetting(_) => TableKind::Exchanges,
            Self::Transaction(_) => TableKind::Transactions,
        }
    }

    pub fn blank_for(kind: TableKind) -> Self {
        match kind {
            TableKind::BankAccounts => Self::BankAccount(BankAccountFormInput::default()),
            TableKind::BotSettings => Self::BotSetting(BotSettingFormInput::default()),
            TableKind::Calls => Self::Call(CallFormInput::default()),
            TableKind::EmailTemplates => Self::EmailTemplate(EmailTemplateFormInput::default()),
            TableKind::Exchanges => Self::ExchangeSetting(ExchangeSettingFormInput::default()),
            TableKind::Transactions => Self::Transaction(TransactionFormInput::default()),
        }
    }

    fn inner(&self) -> &dyn FormStateDyn {
        match self {
            Self::BankAccount(form) => form,
            Self::BotSetting(form) => form,
            Self::Call(form) => form,
            Self::EmailTemplate(form) => form,
            Self::ExchangeSetting(form) => form,
            Self::Transaction(form) => form,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn FormStateDyn {
        match self {
            Self::BankAccount(form) => form,
            Self::BotSetting(form) => form,
            Self::Call(form) => form,
            Self::EmailTemplate(form) => form,
            Self::ExchangeSetting(form) => form,
            Self::Transaction(form) => form,
        }
    }
}

// Object-safe slice of `FormState` used to delegate from the tagged payload.
trait FormStateDyn {
    fn specs(&self) -> &'static [FieldSpec];
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> bool;
    fn check(&self) -> FieldErrors;
}

impl<F: FormState> FormStateDyn for F {
    fn specs(&self) -> &'static [FieldSpec] {
        self.field_specs()
    }

    fn get(&self, key: &str) -> Option<String> {
        self.field(key)
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        self.set_field(key, value)
    }

    fn check(&self) -> FieldErrors {
        self.validate()
    }
}

impl FormState for FormPayload {
    fn field_specs(&self) -> &'static [FieldSpec] {
        self.inner().specs()
    }

    fn field(&self, key: &str) -> Option<String> {
        self.inner().get(key)
    }

    fn set_field(&mut self, key: &str, value: &str) -> bool {
        self.inner_mut().set(key, value)
    }

    fn validate(&self) -> FieldErrors {
        self.inner().check()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        BankAccountFormInput, BotSettingFormInput, EmailTemplateFormInput, FieldErrors,
        FieldKind, FormPayload, FormState, RecordForm, TransactionFormInput,
    };
    use crate::{
        CURRENCIES, AccountStatus, AccountType, BankAccount, BankAccountId, BotSettingId, TableKind,
        TransactionId,
    };
    use time::macros::datetime;

    #[test]
    fn blank_payload_exists_for_every_table() {
        for kind in TableKind::ALL {
            let payload = FormPayload::blank_for(kind);
            assert_eq!(payload.kind(), kind);
            for spec in payload.field_specs() {
                assert!(payload.field(spec.key).is_some(), "{kind}.{}", spec.key);
            }
        }
    }

    #[test]
    fn empty_name_is_reported_against_the_name_field() {
        let errors = BotSettingFormInput::default().validate();
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert!(errors.contains("trading_pair"));
    }

    #[test]
    fn field_errors_keep_the_first_message() {
        let mut errors = FieldErrors::new();
        errors.insert("amount", "Amount is required");
        errors.insert("amount", "Amount is out of range");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("amount"), Some("Amount is required"));
        assert_eq!(errors.to_string(), "Amount is required");
    }

    #[test]
    fn choice_fields_reject_unknown_values() {
        let mut form = BankAccountFormInput::default();
        assert!(form.set_field("status", "suspended"));
        assert_eq!(form.status, AccountStatus::Suspended);
        assert!(!form.set_field("status", "frozen"));
        assert_eq!(form.status, AccountStatus::Suspended);
        assert!(!form.set_field("balance", "100"));
    }

    #[test]
    fn template_rules_cover_email_and_retry_range() {
        let mut form = EmailTemplateFormInput {
            name: "Deposit received".to_owned(),
            subject: "We got it".to_owned(),
            body: "Funds are in.".to_owned(),
            broker_id: "BRK-0001".to_owned(),
            sender_email: "not-an-email".to_owned(),
            retry_attempts: "11".to_owned(),
            ..EmailTemplateFormInput::default()
        };
        let errors = form.validate();
        assert_eq!(
            errors.get("sender_email"),
            Some("Sender email must be a valid email address")
        );
        assert_eq!(
            errors.get("retry_attempts"),
            Some("Retry attempts is out of range")
        );

        form.sender_email = "ops@desk.example".to_owned();
        form.retry_attempts = "10".to_owned();
        assert!(form.validate().is_empty());
    }

    #[test]
    fn edit_build_preserves_created_at_and_aggregates() -> anyhow::Result<()> {
        let original = BankAccount {
            id: BankAccountId::new("ACC-0001"),
            account_name: "Operating".to_owned(),
            bank_name: "First Harbor".to_owned(),
            holder_name: "Ada Park".to_owned(),
            holder_email: "ada@example.com".to_owned(),
            account_number: "0042-7781".to_owned(),
            currency: "USD".to_owned(),
            account_type: AccountType::Business,
            status: AccountStatus::Active,
            balance_cents: 1_250_000,
            created_at: datetime!(2025-01-02 03:04 UTC),
            updated_at: datetime!(2025-01-02 03:04 UTC),
        };
        let mut form = BankAccountFormInput::from_record(&original);
        form.account_name = "  Operating USD ".to_owned();

        let now = datetime!(2026-01-01 00:00 UTC);
        let updated = form.build(original.id.clone(), Some(&original), now)?;
        assert_eq!(updated.account_name, "Operating USD");
        assert_eq!(updated.balance_cents, 1_250_000);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.updated_at, now);
        Ok(())
    }

    #[test]
    fn create_build_starts_aggregates_at_zero() -> anyhow::Result<()> {
        let form = BotSettingFormInput {
            name: "Grid BTC".to_owned(),
            trading_pair: "btc/usdt".to_owned(),
            tags: "btc, grid".to_owned(),
            ..BotSettingFormInput::default()
        };
        let now = datetime!(2026-01-01 00:00 UTC);
        let bot = form.build(BotSettingId::new("BOT-0001"), None, now)?;
        assert_eq!(bot.trading_pair, "BTC/USDT");
        assert_eq!(bot.total_trades, 0);
        assert_eq!(bot.tags, vec!["btc", "grid"]);
        assert_eq!(bot.created_at, now);
        Ok(())
    }

    #[test]
    fn build_refuses_invalid_forms() {
        let form = TransactionFormInput {
            account_id: "ACC-0001".to_owned(),
            amount: "0".to_owned(),
            counterparty: "Acme".to_owned(),
            reference: "INV-1".to_owned(),
            ..TransactionFormInput::default()
        };
        let errors = form
            .build(TransactionId::new("TXN-0001"), None, datetime!(2026-01-01 00:00 UTC))
            .expect_err("zero amount should be rejected");
        assert_eq!(errors.get("amount"), Some("Amount is out of range"));
    }

    #[test]
    fn oversized_amount_is_a_field_error() {
        let form = TransactionFormInput {
            account_id: "ACC-0001".to_owned(),
            amount: "92233720368547758.99".to_owned(),
            counterparty: "Acme".to_owned(),
            reference: "INV-1".to_owned(),
            ..TransactionFormInput::default()
        };
        let errors = form.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains("amount"));
    }

    #[test]
    fn currency_is_limited_to_filterable_codes() {
        for specs in [
            BankAccountFormInput::default().field_specs(),
            TransactionFormInput::default().field_specs(),
        ] {
            let currency = specs
                .iter()
                .find(|spec| spec.key == "currency")
                .expect("currency field");
            assert_eq!(currency.kind, FieldKind::Choice(&CURRENCIES));
        }

        let form = BankAccountFormInput {
            account_name: "Payroll".to_owned(),
            bank_name: "Harbor Trust".to_owned(),
            holder_name: "Dana Ortiz".to_owned(),
            holder_email: "dana@example.com".to_owned(),
            account_number: "4400-1200".to_owned(),
            currency: "AUD".to_owned(),
            ..BankAccountFormInput::default()
        };
        let errors = form.validate();
        assert_eq!(
            errors.get("currency"),
            Some("Currency must be one of USD, EUR, GBP, CHF, JPY")
        );
    }

    #[test]
    fn transaction_form_round_trips_amount_text() {
        let mut form = TransactionFormInput::default();
        assert!(form.set_field("amount", "1,250.50"));
        assert_eq!(form.field("amount").as_deref(), Some("1,250.50"));
    }
}
