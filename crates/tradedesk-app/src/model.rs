// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

use crate::ids::*;

pub const UNKNOWN_REFERENCE: &str = "Unknown";

macro_rules! choice_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];
            pub const CHOICES: &'static [&'static str] = &[$($text),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }

            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

choice_enum!(AccountStatus {
    Active => "active",
    Inactive => "inactive",
    Pending => "pending",
    Suspended => "suspended",
    Closed => "closed",
});

choice_enum!(AccountType {
    Checking => "checking",
    Savings => "savings",
    Business => "business",
});

choice_enum!(RiskLevel {
    Low => "low",
    Medium => "medium",
    High => "high",
    Extreme => "extreme",
});

choice_enum!(BotStrategy {
    Scalping => "scalping",
    Grid => "grid",
    Trend => "trend",
    Arbitrage => "arbitrage",
    MarketMaking => "market_making",
});

choice_enum!(BotStatus {
    Running => "running",
    Paused => "paused",
    Stopped => "stopped",
});

choice_enum!(CallDirection {
    Inbound => "inbound",
    Outbound => "outbound",
});

choice_enum!(CallStatus {
    Completed => "completed",
    Missed => "missed",
    Voicemail => "voicemail",
    Scheduled => "scheduled",
});

choice_enum!(TemplateCategory {
    Welcome => "welcome",
    Deposit => "deposit",
    Withdrawal => "withdrawal",
    Verification => "verification",
    Marketing => "marketing",
});

choice_enum!(TemplateStatus {
    Active => "active",
    Draft => "draft",
    Archived => "archived",
});

choice_enum!(ExchangeStatus {
    Connected => "connected",
    Disconnected => "disconnected",
    Maintenance => "maintenance",
});

choice_enum!(TransactionKind {
    Deposit => "deposit",
    Withdrawal => "withdrawal",
    Transfer => "transfer",
    Fee => "fee",
});

choice_enum!(TransactionStatus {
    Completed => "completed",
    Pending => "pending",
    Failed => "failed",
    Reversed => "reversed",
});

pub const CURRENCIES: [&str; 5] = ["USD", "EUR", "GBP", "CHF", "JPY"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TableKind {
    BankAccounts,
    BotSettings,
    Calls,
    EmailTemplates,
    Exchanges,
    Transactions,
}

impl TableKind {
    pub const ALL: [Self; 6] = [
        Self::BankAccounts,
        Self::BotSettings,
        Self::Calls,
        Self::EmailTemplates,
        Self::Exchanges,
        Self::Transactions,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::BankAccounts => "accounts",
            Self::BotSettings => "bots",
            Self::Calls => "calls",
            Self::EmailTemplates => "templates",
            Self::Exchanges => "exchanges",
            Self::Transactions => "transactions",
        }
    }

    pub const fn noun(self) -> &'static str {
        match self {
            Self::BankAccounts => "bank account",
            Self::BotSettings => "bot setting",
            Self::Calls => "call",
            Self::EmailTemplates => "email template",
            Self::Exchanges => "exchange",
            Self::Transactions => "transaction",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Broker {
    pub id: BrokerId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    pub id: BankAccountId,
    pub account_name: String,
    pub bank_name: String,
    pub holder_name: String,
    pub holder_email: String,
    pub account_number: String,
    pub currency: String,
    pub account_type: AccountType,
    pub status: AccountStatus,
    pub balance_cents: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotSetting {
    pub id: BotSettingId,
    pub name: String,
    pub description: String,
    pub trading_pair: String,
    pub strategy: BotStrategy,
    pub risk_level: RiskLevel,
    pub status: BotStatus,
    pub max_position_pct: f64,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    pub success_rate_pct: f64,
    pub total_trades: u32,
    pub tags: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub id: CallId,
    pub client_name: String,
    pub phone_number: String,
    pub agent_name: String,
    pub direction: CallDirection,
    pub status: CallStatus,
    pub duration_secs: u32,
    pub notes: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub id: EmailTemplateId,
    pub name: String,
    pub subject: String,
    pub body: String,
    pub category: TemplateCategory,
    pub status: TemplateStatus,
    pub broker_id: BrokerId,
    pub sender_email: String,
    pub retry_attempts: u8,
    pub usage_count: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeSetting {
    pub id: ExchangeSettingId,
    pub exchange_name: String,
    pub api_url: String,
    pub api_key_label: String,
    pub status: ExchangeStatus,
    pub trading_enabled: bool,
    pub maker_fee_pct: f64,
    pub taker_fee_pct: f64,
    pub rate_limit_per_min: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub account_id: BankAccountId,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub amount_cents: i64,
    pub currency: String,
    pub counterparty: String,
    pub reference: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Name lookups for cross-table references.
///
/// Resolution is a linear scan with no integrity checks; a dangling id
/// resolves to [`UNKNOWN_REFERENCE`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct References {
    pub brokers: Vec<Broker>,
    pub accounts: Vec<(BankAccountId, String)>,
}

impl References {
    pub fn broker_name(&self, id: &BrokerId) -> &str {
        self.brokers
            .iter()
            .find(|broker| broker.id == *id)
            .map(|broker| broker.name.as_str())
            .unwrap_or(UNKNOWN_REFERENCE)
    }

    pub fn account_name(&self, id: &BankAccountId) -> &str {
        self.accounts
            .iter()
            .find(|(account_id, _)| account_id == id)
            .map(|(_, name)| name.as_str())
            .unwrap_or(UNKNOWN_REFERENCE)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AccountStatus, Broker, BotStrategy, References, TableKind, UNKNOWN_REFERENCE,
    };
    use crate::{BankAccountId, BrokerId};

    #[test]
    fn choice_enums_parse_their_own_labels() {
        for status in AccountStatus::ALL {
            assert_eq!(AccountStatus::parse(status.as_str()), Some(*status));
        }
        assert_eq!(BotStrategy::parse("market_making"), Some(BotStrategy::MarketMaking));
        assert_eq!(AccountStatus::parse("all"), None);
        assert_eq!(AccountStatus::CHOICES.len(), AccountStatus::ALL.len());
    }

    #[test]
    fn table_kind_parse_is_case_insensitive() {
        assert_eq!(TableKind::parse("Templates"), Some(TableKind::EmailTemplates));
        assert_eq!(TableKind::parse(" calls "), Some(TableKind::Calls));
        assert_eq!(TableKind::parse("ledger"), None);
    }

    #[test]
    fn dangling_references_resolve_to_unknown() {
        let refs = References {
            brokers: vec![Broker {
                id: BrokerId::new("BRK-0001"),
                name: "Northwind Markets".to_owned(),
            }],
            accounts: vec![(BankAccountId::new("ACC-0001"), "Treasury".to_owned())],
        };

        assert_eq!(refs.broker_name(&BrokerId::new("BRK-0001")), "Northwind Markets");
        assert_eq!(refs.broker_name(&BrokerId::new("BRK-0404")), UNKNOWN_REFERENCE);
        assert_eq!(refs.account_name(&BankAccountId::new("ACC-0001")), "Treasury");
        assert_eq!(refs.account_name(&BankAccountId::new("ACC-9999")), UNKNOWN_REFERENCE);
    }
}
