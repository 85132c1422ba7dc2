// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// String identity shared by every record type.
///
/// Ids are assigned by the store from a per-table sequence and never change
/// after creation.
pub trait RecordKey: Clone + Eq + Ord + fmt::Debug + fmt::Display {
    const PREFIX: &'static str;

    fn from_sequence(seq: u64) -> Self;

    fn as_str(&self) -> &str;
}

/// Numeric part of a `PREFIX-0042` id.
pub fn sequence_of(id: &str) -> Option<u64> {
    id.rsplit_once('-')
        .and_then(|(_, digits)| digits.parse::<u64>().ok())
}

/// Orders ids by prefix, then by sequence number, so `ACC-10000` follows
/// `ACC-9999`. Ids without a sequence fall back to text order.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.rsplit_once('-'), sequence_of(a), b.rsplit_once('-'), sequence_of(b)) {
        (Some((prefix_a, _)), Some(seq_a), Some((prefix_b, _)), Some(seq_b)) => prefix_a
            .cmp(prefix_b)
            .then(seq_a.cmp(&seq_b))
            .then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    }
}

macro_rules! record_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                compare_ids(&self.0, &other.0)
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn get(&self) -> &str {
                &self.0
            }
        }

        impl RecordKey for $name {
            const PREFIX: &'static str = $prefix;

            fn from_sequence(seq: u64) -> Self {
                Self(format!("{}-{seq:04}", $prefix))
            }

            fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

record_id!(BankAccountId, "ACC");
record_id!(BotSettingId, "BOT");
record_id!(CallId, "CALL");
record_id!(EmailTemplateId, "TPL");
record_id!(ExchangeSettingId, "EXC");
record_id!(TransactionId, "TXN");
record_id!(BrokerId, "BRK");
