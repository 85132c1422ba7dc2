// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;
use std::fmt::Debug;
use time::OffsetDateTime;

use crate::ids::{RecordKey, compare_ids};
use crate::model::*;
use crate::validation::{
    format_cents, format_duration, format_percent, format_timestamp, format_yes_no,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub sortable: bool,
}

const fn col(key: &'static str, label: &'static str) -> ColumnSpec {
    ColumnSpec {
        key,
        label,
        sortable: true,
    }
}

const fn unsorted(key: &'static str, label: &'static str) -> ColumnSpec {
    ColumnSpec {
        key,
        label,
        sortable: false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub choices: &'static [&'static str],
}

const YES_NO: &[&str] = &["yes", "no"];

const ACCOUNT_COLUMNS: &[ColumnSpec] = &[
    col("id", "ID"),
    col("account_name", "Account"),
    col("bank_name", "Bank"),
    col("holder_name", "Holder"),
    col("holder_email", "Email"),
    unsorted("account_number", "Number"),
    col("currency", "Ccy"),
    col("account_type", "Type"),
    col("status", "Status"),
    col("balance", "Balance"),
    col("created_at", "Created"),
];

const ACCOUNT_FILTERS: &[FilterSpec] = &[
    FilterSpec {
        key: "status",
        label: "Status",
        choices: AccountStatus::CHOICES,
    },
    FilterSpec {
        key: "account_type",
        label: "Type",
        choices: AccountType::CHOICES,
    },
    FilterSpec {
        key: "currency",
        label: "Currency",
        choices: &CURRENCIES,
    },
];

const BOT_COLUMNS: &[ColumnSpec] = &[
    col("id", "ID"),
    col("name", "Name"),
    col("trading_pair", "Pair"),
    col("strategy", "Strategy"),
    col("risk_level", "Risk"),
    col("status", "Status"),
    col("max_position", "Max pos"),
    col("stop_loss", "Stop"),
    col("take_profit", "Take"),
    col("success_rate", "Success"),
    col("total_trades", "Trades"),
    unsorted("tags", "Tags"),
    col("updated_at", "Updated"),
];

const BOT_FILTERS: &[FilterSpec] = &[
    FilterSpec {
        key: "strategy",
        label: "Strategy",
        choices: BotStrategy::CHOICES,
    },
    FilterSpec {
        key: "risk_level",
        label: "Risk",
        choices: RiskLevel::CHOICES,
    },
    FilterSpec {
        key: "status",
        label: "Status",
        choices: BotStatus::CHOICES,
    },
];

const CALL_COLUMNS: &[ColumnSpec] = &[
    col("id", "ID"),
    col("client_name", "Client"),
    unsorted("phone_number", "Phone"),
    col("agent_name", "Agent"),
    col("direction", "Dir"),
    col("status", "Status"),
    col("duration", "Duration"),
    col("created_at", "When"),
];

const CALL_FILTERS: &[FilterSpec] = &[
    FilterSpec {
        key: "direction",
        label: "Direction",
        choices: CallDirection::CHOICES,
    },
    FilterSpec {
        key: "status",
        label: "Status",
        choices: CallStatus::CHOICES,
    },
];

const TEMPLATE_COLUMNS: &[ColumnSpec] = &[
    col("id", "ID"),
    col("name", "Name"),
    col("subject", "Subject"),
    col("category", "Category"),
    col("status", "Status"),
    col("broker", "Broker"),
    col("sender_email", "Sender"),
    col("retry_attempts", "Retries"),
    col("usage_count", "Used"),
    col("updated_at", "Updated"),
];

const TEMPLATE_FILTERS: &[FilterSpec] = &[
    FilterSpec {
        key: "category",
        label: "Category",
        choices: TemplateCategory::CHOICES,
    },
    FilterSpec {
        key: "status",
        label: "Status",
        choices: TemplateStatus::CHOICES,
    },
];

const EXCHANGE_COLUMNS: &[ColumnSpec] = &[
    col("id", "ID"),
    col("exchange_name", "Exchange"),
    unsorted("api_url", "API URL"),
    col("api_key_label", "Key"),
    col("status", "Status"),
    col("trading_enabled", "Trading"),
    col("maker_fee", "Maker"),
    col("taker_fee", "Taker"),
    col("rate_limit", "Rate/min"),
    col("updated_at", "Updated"),
];

const EXCHANGE_FILTERS: &[FilterSpec] = &[
    FilterSpec {
        key: "status",
        label: "Status",
        choices: ExchangeStatus::CHOICES,
    },
    FilterSpec {
        key: "trading_enabled",
        label: "Trading",
        choices: YES_NO,
    },
];

const TRANSACTION_COLUMNS: &[ColumnSpec] = &[
    col("id", "ID"),
    col("account", "Account"),
    col("kind", "Kind"),
    col("status", "Status"),
    col("amount", "Amount"),
    col("currency", "Ccy"),
    col("counterparty", "Counterparty"),
    col("reference", "Reference"),
    col("created_at", "Created"),
];

const TRANSACTION_FILTERS: &[FilterSpec] = &[
    FilterSpec {
        key: "kind",
        label: "Kind",
        choices: TransactionKind::CHOICES,
    },
    FilterSpec {
        key: "status",
        label: "Status",
        choices: TransactionStatus::CHOICES,
    },
    FilterSpec {
        key: "currency",
        label: "Currency",
        choices: &CURRENCIES,
    },
];

impl TableKind {
    pub const fn columns(self) -> &'static [ColumnSpec] {
        match self {
            Self::BankAccounts => ACCOUNT_COLUMNS,
            Self::BotSettings => BOT_COLUMNS,
            Self::Calls => CALL_COLUMNS,
            Self::EmailTemplates => TEMPLATE_COLUMNS,
            Self::Exchanges => EXCHANGE_COLUMNS,
            Self::Transactions => TRANSACTION_COLUMNS,
        }
    }

    pub const fn filters(self) -> &'static [FilterSpec] {
        match self {
            Self::BankAccounts => ACCOUNT_FILTERS,
            Self::BotSettings => BOT_FILTERS,
            Self::Calls => CALL_FILTERS,
            Self::EmailTemplates => TEMPLATE_FILTERS,
            Self::Exchanges => EXCHANGE_FILTERS,
            Self::Transactions => TRANSACTION_FILTERS,
        }
    }

    pub fn column(self, key: &str) -> Option<&'static ColumnSpec> {
        self.columns().iter().find(|spec| spec.key == key)
    }

    pub fn filter(self, key: &str) -> Option<&'static FilterSpec> {
        self.filters().iter().find(|spec| spec.key == key)
    }
}

/// A rendered table cell. Display and ordering are both derived from the
/// typed value so sorting never goes through the formatted text.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Id(String),
    Text(String),
    Label(&'static str),
    Money(i64),
    Percent(f64),
    Count(i64),
    Duration(u32),
    Timestamp(OffsetDateTime),
    Flag(bool),
    Empty,
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value)
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Id(value) | Self::Text(value) => value.clone(),
            Self::Label(value) => (*value).to_owned(),
            Self::Money(cents) => format_cents(*cents),
            Self::Percent(value) => format_percent(*value),
            Self::Count(value) => value.to_string(),
            Self::Duration(secs) => format_duration(*secs),
            Self::Timestamp(value) => format_timestamp(*value),
            Self::Flag(value) => format_yes_no(*value).to_owned(),
            Self::Empty => String::new(),
        }
    }

    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Empty cells sort after everything else in ascending order.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Empty, Self::Empty) => Ordering::Equal,
            (Self::Empty, _) => Ordering::Greater,
            (_, Self::Empty) => Ordering::Less,
            (Self::Id(a), Self::Id(b)) => compare_ids(a, b),
            (Self::Money(a), Self::Money(b)) | (Self::Count(a), Self::Count(b)) => a.cmp(b),
            (Self::Percent(a), Self::Percent(b)) => a.total_cmp(b),
            (Self::Duration(a), Self::Duration(b)) => a.cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.cmp(b),
            (Self::Flag(a), Self::Flag(b)) => a.cmp(b),
            _ => self
                .display()
                .to_lowercase()
                .cmp(&other.display().to_lowercase()),
        }
    }
}

/// A row type that can be shown in a table: it has a stable id, a set of
/// searchable text fields, discrete filter values, and a cell per column.
pub trait TableRecord: Clone + Debug + PartialEq {
    type Id: RecordKey;

    const KIND: TableKind;

    fn id(&self) -> &Self::Id;

    /// Text fields the free-text search looks at. Always includes the id.
    fn search_text(&self) -> Vec<&str>;

    /// Value of a discrete filter field, or `None` for undeclared keys.
    fn filter_value(&self, key: &str) -> Option<&str>;

    fn cell(&self, key: &str, refs: &References) -> CellValue;

    /// Long-form fields shown only in the detail view.
    fn long_text(&self) -> Vec<(&'static str, &str)> {
        Vec::new()
    }

    fn created_at(&self) -> OffsetDateTime;

    fn updated_at(&self) -> OffsetDateTime;
}

/// Label/value pairs for the read-only detail view.
pub fn detail_rows<R: TableRecord>(record: &R, refs: &References) -> Vec<(&'static str, String)> {
    let mut rows = R::KIND
        .columns()
        .iter()
        .map(|spec| (spec.label, record.cell(spec.key, refs).display()))
        .collect::<Vec<_>>();
    rows.extend(
        record
            .long_text()
            .into_iter()
            .map(|(label, value)| (label, value.to_owned())),
    );
    if !R::KIND.columns().iter().any(|spec| spec.key == "updated_at") {
        rows.push(("Updated", format_timestamp(record.updated_at())));
    }
    rows
}

impl TableRecord for BankAccount {
    type Id = crate::BankAccountId;

    const KIND: TableKind = TableKind::BankAccounts;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn search_text(&self) -> Vec<&str> {
        vec![
            self.id.get(),
            self.account_name.as_str(),
            self.bank_name.as_str(),
            self.holder_name.as_str(),
            self.holder_email.as_str(),
            self.account_number.as_str(),
        ]
    }

    fn filter_value(&self, key: &str) -> Option<&str> {
        match key {
            "status" => Some(self.status.as_str()),
            "account_type" => Some(self.account_type.as_str()),
            "currency" => Some(&self.currency),
            _ => None,
        }
    }

    fn cell(&self, key: &str, _refs: &References) -> CellValue {
        match key {
            "id" => CellValue::Id(self.id.get().to_owned()),
            "account_name" => CellValue::text(&self.account_name),
            "bank_name" => CellValue::text(&self.bank_name),
            "holder_name" => CellValue::text(&self.holder_name),
            "holder_email" => CellValue::text(&self.holder_email),
            "account_number" => CellValue::text(&self.account_number),
            "currency" => CellValue::text(&self.currency),
            "account_type" => CellValue::Label(self.account_type.as_str()),
            "status" => CellValue::Label(self.status.as_str()),
            "balance" => CellValue::Money(self.balance_cents),
            "created_at" => CellValue::Timestamp(self.created_at),
            _ => CellValue::Empty,
        }
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }
}

impl TableRecord for BotSetting {
    type Id = crate::BotSettingId;

    const KIND: TableKind = TableKind::BotSettings;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn search_text(&self) -> Vec<&str> {
        let mut fields = vec![
            self.id.get(),
            self.name.as_str(),
            self.description.as_str(),
            self.trading_pair.as_str(),
        ];
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }

    fn filter_value(&self, key: &str) -> Option<&str> {
        match key {
            "strategy" => Some(self.strategy.as_str()),
            "risk_level" => Some(self.risk_level.as_str()),
            "status" => Some(self.status.as_str()),
            _ => None,
        }
    }

    fn cell(&self, key: &str, _refs: &References) -> CellValue {
        match key {
            "id" => CellValue::Id(self.id.get().to_owned()),
            "name" => CellValue::text(&self.name),
            "trading_pair" => CellValue::text(&self.trading_pair),
            "strategy" => CellValue::Label(self.strategy.as_str()),
            "risk_level" => CellValue::Label(self.risk_level.as_str()),
            "status" => CellValue::Label(self.status.as_str()),
            "max_position" => CellValue::Percent(self.max_position_pct),
            "stop_loss" => CellValue::Percent(self.stop_loss_pct),
            "take_profit" => CellValue::Percent(self.take_profit_pct),
            "success_rate" => CellValue::Percent(self.success_rate_pct),
            "total_trades" => CellValue::Count(i64::from(self.total_trades)),
            "tags" => CellValue::text(self.tags.join(", ")),
            "updated_at" => CellValue::Timestamp(self.updated_at),
            _ => CellValue::Empty,
        }
    }

    fn long_text(&self) -> Vec<(&'static str, &str)> {
        vec![("Description", self.description.as_str())]
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }
}

impl TableRecord for Call {
    type Id = crate::CallId;

    const KIND: TableKind = TableKind::Calls;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn search_text(&self) -> Vec<&str> {
        vec![
            self.id.get(),
            self.client_name.as_str(),
            self.phone_number.as_str(),
            self.agent_name.as_str(),
            self.notes.as_str(),
        ]
    }

    fn filter_value(&self, key: &str) -> Option<&str> {
        match key {
            "direction" => Some(self.direction.as_str()),
            "status" => Some(self.status.as_str()),
            _ => None,
        }
    }

    fn cell(&self, key: &str, _refs: &References) -> CellValue {
        match key {
            "id" => CellValue::Id(self.id.get().to_owned()),
            "client_name" => CellValue::text(&self.client_name),
            "phone_number" => CellValue::text(&self.phone_number),
            "agent_name" => CellValue::text(&self.agent_name),
            "direction" => CellValue::Label(self.direction.as_str()),
            "status" => CellValue::Label(self.status.as_str()),
            "duration" => CellValue::Duration(self.duration_secs),
            "created_at" => CellValue::Timestamp(self.created_at),
            _ => CellValue::Empty,
        }
    }

    fn long_text(&self) -> Vec<(&'static str, &str)> {
        vec![("Notes", self.notes.as_str())]
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }
}

impl TableRecord for EmailTemplate {
    type Id = crate::EmailTemplateId;

    const KIND: TableKind = TableKind::EmailTemplates;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn search_text(&self) -> Vec<&str> {
        vec![
            self.id.get(),
            self.name.as_str(),
            self.subject.as_str(),
            self.sender_email.as_str(),
        ]
    }

    fn filter_value(&self, key: &str) -> Option<&str> {
        match key {
            "category" => Some(self.category.as_str()),
            "status" => Some(self.status.as_str()),
            _ => None,
        }
    }

    fn cell(&self, key: &str, refs: &References) -> CellValue {
        match key {
            "id" => CellValue::Id(self.id.get().to_owned()),
            "name" => CellValue::text(&self.name),
            "subject" => CellValue::text(&self.subject),
            "category" => CellValue::Label(self.category.as_str()),
            "status" => CellValue::Label(self.status.as_str()),
            "broker" => CellValue::text(refs.broker_name(&self.broker_id)),
            "sender_email" => CellValue::text(&self.sender_email),
            "retry_attempts" => CellValue::Count(i64::from(self.retry_attempts)),
            "usage_count" => CellValue::Count(i64::from(self.usage_count)),
            "updated_at" => CellValue::Timestamp(self.updated_at),
            _ => CellValue::Empty,
        }
    }

    fn long_text(&self) -> Vec<(&'static str, &str)> {
        vec![("Broker ID", self.broker_id.get()), ("Body", self.body.as_str())]
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }
}

impl TableRecord for ExchangeSetting {
    type Id = crate::ExchangeSettingId;

    const KIND: TableKind = TableKind::Exchanges;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn search_text(&self) -> Vec<&str> {
        vec![
            self.id.get(),
            self.exchange_name.as_str(),
            self.api_url.as_str(),
            self.api_key_label.as_str(),
        ]
    }

    fn filter_value(&self, key: &str) -> Option<&str> {
        match key {
            "status" => Some(self.status.as_str()),
            "trading_enabled" => Some(format_yes_no(self.trading_enabled)),
            _ => None,
        }
    }

    fn cell(&self, key: &str, _refs: &References) -> CellValue {
        match key {
            "id" => CellValue::Id(self.id.get().to_owned()),
            "exchange_name" => CellValue::text(&self.exchange_name),
            "api_url" => CellValue::text(&self.api_url),
            "api_key_label" => CellValue::text(&self.api_key_label),
            "status" => CellValue::Label(self.status.as_str()),
            "trading_enabled" => CellValue::Flag(self.trading_enabled),
            "maker_fee" => CellValue::Percent(self.maker_fee_pct),
            "taker_fee" => CellValue::Percent(self.taker_fee_pct),
            "rate_limit" => CellValue::Count(i64::from(self.rate_limit_per_min)),
            "updated_at" => CellValue::Timestamp(self.updated_at),
            _ => CellValue::Empty,
        }
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }
}

impl TableRecord for Transaction {
    type Id = crate::TransactionId;

    const KIND: TableKind = TableKind::Transactions;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn search_text(&self) -> Vec<&str> {
        vec![
            self.id.get(),
            self.account_id.get(),
            self.counterparty.as_str(),
            self.reference.as_str(),
            self.description.as_str(),
        ]
    }

    fn filter_value(&self, key: &str) -> Option<&str> {
        match key {
            "kind" => Some(self.kind.as_str()),
            "status" => Some(self.status.as_str()),
            "currency" => Some(&self.currency),
            _ => None,
        }
    }

    fn cell(&self, key: &str, refs: &References) -> CellValue {
        match key {
            "id" => CellValue::Id(self.id.get().to_owned()),
            "account" => CellValue::text(refs.account_name(&self.account_id)),
            "kind" => CellValue::Label(self.kind.as_str()),
            "status" => CellValue::Label(self.status.as_str()),
            "amount" => CellValue::Money(self.amount_cents),
            "currency" => CellValue::text(&self.currency),
            "counterparty" => CellValue::text(&self.counterparty),
            "reference" => CellValue::text(&self.reference),
            "created_at" => CellValue::Timestamp(self.created_at),
            _ => CellValue::Empty,
        }
    }

    fn long_text(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("Account ID", self.account_id.get()),
            ("Description", self.description.as_str()),
        ]
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::{CellValue, TableRecord, detail_rows};
    use crate::{
        AccountStatus, AccountType, BankAccount, BankAccountId, BotSetting, BotSettingId,
        BotStatus, BotStrategy, Broker, BrokerId, Call, CallDirection, CallId, CallStatus,
        EmailTemplate, EmailTemplateId, ExchangeSetting, ExchangeSettingId, ExchangeStatus,
        References, RiskLevel, TableKind, TemplateCategory, TemplateStatus, Transaction,
        TransactionId, TransactionKind, TransactionStatus,
    };
    use std::cmp::Ordering;
    use time::macros::datetime;

    fn template(broker: &str) -> EmailTemplate {
        EmailTemplate {
            id: EmailTemplateId::new("TPL-0001"),
            name: "Welcome".to_owned(),
            subject: "Welcome aboard".to_owned(),
            body: "Hello {{name}}".to_owned(),
            category: TemplateCategory::Welcome,
            status: TemplateStatus::Active,
            broker_id: BrokerId::new(broker),
            sender_email: "desk@example.com".to_owned(),
            retry_attempts: 3,
            usage_count: 41,
            created_at: datetime!(2025-11-02 09:30 UTC),
            updated_at: datetime!(2025-12-01 16:45 UTC),
        }
    }

    fn assert_every_column_renders<R: TableRecord>(record: &R, refs: &References) {
        for spec in R::KIND.columns() {
            assert!(
                !record.cell(spec.key, refs).is_empty(),
                "{}.{} rendered empty",
                R::KIND,
                spec.key
            );
        }
    }

    #[test]
    fn every_declared_column_has_a_cell_for_every_table() {
        let created_at = datetime!(2025-11-02 09:30 UTC);
        let updated_at = datetime!(2025-12-01 16:45 UTC);
        let refs = References {
            brokers: vec![Broker {
                id: BrokerId::new("BRK-0001"),
                name: "Harbor Prime".to_owned(),
            }],
            accounts: vec![(BankAccountId::new("ACC-0001"), "Payroll".to_owned())],
        };

        assert_every_column_renders(
            &BankAccount {
                id: BankAccountId::new("ACC-0001"),
                account_name: "Payroll".to_owned(),
                bank_name: "Lakeside Savings".to_owned(),
                holder_name: "Morgan Lee".to_owned(),
                holder_email: "morgan@example.com".to_owned(),
                account_number: "1111-2222".to_owned(),
                currency: "EUR".to_owned(),
                account_type: AccountType::Business,
                status: AccountStatus::Active,
                balance_cents: 125_000,
                created_at,
                updated_at,
            },
            &refs,
        );
        assert_every_column_renders(
            &BotSetting {
                id: BotSettingId::new("BOT-0001"),
                name: "Grid BTC".to_owned(),
                description: "Range grid on majors".to_owned(),
                trading_pair: "BTC/USDT".to_owned(),
                strategy: BotStrategy::Grid,
                risk_level: RiskLevel::Medium,
                status: BotStatus::Running,
                max_position_pct: 25.0,
                stop_loss_pct: 3.5,
                take_profit_pct: 8.0,
                success_rate_pct: 61.2,
                total_trades: 412,
                tags: vec!["btc".to_owned(), "grid".to_owned()],
                created_at,
                updated_at,
            },
            &refs,
        );
        assert_every_column_renders(
            &Call {
                id: CallId::new("CALL-0001"),
                client_name: "Rita Ng".to_owned(),
                phone_number: "+44 20 7946 0000".to_owned(),
                agent_name: "Sam".to_owned(),
                direction: CallDirection::Inbound,
                status: CallStatus::Completed,
                duration_secs: 95,
                notes: "Asked about withdrawal limits".to_owned(),
                created_at,
                updated_at,
            },
            &refs,
        );
        assert_every_column_renders(&template("BRK-0001"), &refs);
        assert_every_column_renders(
            &ExchangeSetting {
                id: ExchangeSettingId::new("EXC-0001"),
                exchange_name: "Kraken".to_owned(),
                api_url: "https://api.kraken.com".to_owned(),
                api_key_label: "desk-main".to_owned(),
                status: ExchangeStatus::Connected,
                trading_enabled: true,
                maker_fee_pct: 0.16,
                taker_fee_pct: 0.26,
                rate_limit_per_min: 900,
                created_at,
                updated_at,
            },
            &refs,
        );
        assert_every_column_renders(
            &Transaction {
                id: TransactionId::new("TXN-0001"),
                account_id: BankAccountId::new("ACC-0001"),
                kind: TransactionKind::Deposit,
                status: TransactionStatus::Completed,
                amount_cents: 50_000,
                currency: "EUR".to_owned(),
                counterparty: "Acme Ltd".to_owned(),
                reference: "INV-1042".to_owned(),
                description: "Quarterly top-up".to_owned(),
                created_at,
                updated_at,
            },
            &refs,
        );

        for kind in TableKind::ALL {
            assert_eq!(kind.columns()[0].key, "id", "{kind} leads with id");
            for filter in kind.filters() {
                assert!(!filter.choices.is_empty(), "{kind}.{}", filter.key);
            }
        }
    }

    #[test]
    fn id_cells_sort_by_sequence() {
        assert_eq!(
            CellValue::Id("ACC-10000".to_owned()).compare(&CellValue::Id("ACC-1001".to_owned())),
            Ordering::Greater
        );
    }

    #[test]
    fn broker_column_resolves_through_references() {
        let refs = References {
            brokers: vec![Broker {
                id: BrokerId::new("BRK-0001"),
                name: "Harbor Prime".to_owned(),
            }],
            accounts: Vec::new(),
        };
        assert_eq!(
            template("BRK-0001").cell("broker", &refs).display(),
            "Harbor Prime"
        );
        assert_eq!(template("BRK-0099").cell("broker", &refs).display(), "Unknown");
    }

    #[test]
    fn cells_compare_by_typed_value() {
        assert_eq!(
            CellValue::Money(900).compare(&CellValue::Money(10_000)),
            Ordering::Less
        );
        assert_eq!(
            CellValue::text("beta").compare(&CellValue::text("Alpha")),
            Ordering::Greater
        );
        assert_eq!(
            CellValue::Empty.compare(&CellValue::Count(1)),
            Ordering::Greater
        );
        assert_eq!(CellValue::Percent(2.5).display(), "2.50%");
    }

    #[test]
    fn detail_rows_include_long_text() {
        let rows = detail_rows(&template("BRK-0001"), &References::default());
        assert!(rows.contains(&("Body", "Hello {{name}}".to_owned())));
        assert!(rows.iter().any(|(label, value)| *label == "Updated" && value == "2025-12-01 16:45"));
        assert_eq!(template("BRK-0001").filter_value("status"), Some("active"));
        assert_eq!(template("BRK-0001").filter_value("broker"), None);
    }
}
