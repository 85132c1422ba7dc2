// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};
use tradedesk_app::{
    AccountStatus, AccountType, BankAccount, BankAccountId, BotSetting, BotSettingId, BotStatus,
    BotStrategy, Broker, BrokerId, CURRENCIES, Call, CallDirection, CallId, CallStatus,
    EmailTemplate, EmailTemplateId, ExchangeSetting, ExchangeSettingId, ExchangeStatus,
    RecordKey, RiskLevel, TemplateCategory, TemplateStatus, Transaction, TransactionId,
    TransactionKind, TransactionStatus,
};
use tradedesk_store::{Desk, RecordStore};

pub const BROKER_COUNT: u64 = 6;

/// Every n-th template points at a broker id outside the broker list.
pub const DANGLING_BROKER_EVERY: u64 = 5;

const BROKER_NAMES: [&str; 8] = [
    "Northwind Markets",
    "Harbor Prime",
    "Blue Ridge Securities",
    "Meridian FX",
    "Keystone Brokerage",
    "Atlas Clearing",
    "Silverline Capital",
    "Orchid Trading",
];

const BANK_NAMES: [&str; 10] = [
    "First Harbor Bank",
    "Lakeside Savings",
    "Union Federal",
    "Granite Trust",
    "Pacific Commerce",
    "Riverbend Credit",
    "Crown Street Bank",
    "Alpine National",
    "Maple Mutual",
    "Westgate Bank",
];

const ACCOUNT_PURPOSES: [&str; 8] = [
    "Operating",
    "Client Funds",
    "Payroll",
    "Settlement",
    "Treasury",
    "Reserve",
    "Fees",
    "Escrow",
];

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];

const EMAIL_DOMAINS: [&str; 5] = [
    "example.com",
    "mail.example",
    "clients.example",
    "desk.example",
    "corp.example",
];

const BASE_ASSETS: [&str; 10] = [
    "BTC", "ETH", "SOL", "ADA", "XRP", "DOT", "AVAX", "LINK", "MATIC", "LTC",
];
const QUOTE_ASSETS: [&str; 4] = ["USDT", "USDC", "USD", "EUR"];

const BOT_TAGS: [&str; 10] = [
    "core", "experimental", "high-volume", "night", "hedge", "momentum", "mean-reversion",
    "low-latency", "paper", "prod",
];

const AGENT_NAMES: [&str; 8] = [
    "Sam Carter",
    "Nia Patel",
    "Leo Brandt",
    "Mara Quist",
    "Omar Haddad",
    "Ines Duarte",
    "Theo Lang",
    "Yuki Mori",
];

const EXCHANGES: [&str; 10] = [
    "Binance", "Kraken", "Coinbase", "Bitstamp", "Bybit", "OKX", "Gemini", "Bitfinex", "KuCoin",
    "Gate",
];
const KEY_ENVIRONMENTS: [&str; 3] = ["prod", "staging", "sandbox"];
const RATE_LIMITS: [u32; 5] = [300, 600, 1200, 2400, 6000];

const COUNTERPARTIES: [&str; 10] = [
    "Acme Holdings",
    "Globex Ltd",
    "Initech",
    "Umbrella Partners",
    "Stark Logistics",
    "Wayne Ventures",
    "Hooli",
    "Vandelay Imports",
    "Soylent Foods",
    "Tyrell Systems",
];

const SENTENCE_WORDS: [&str; 24] = [
    "review",
    "client",
    "deposit",
    "withdrawal",
    "verify",
    "limit",
    "margin",
    "position",
    "spread",
    "volume",
    "settlement",
    "confirm",
    "pending",
    "follow",
    "up",
    "compliance",
    "account",
    "transfer",
    "balance",
    "request",
    "update",
    "escalate",
    "approve",
    "schedule",
];

struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator for every record type on the desk. The same seed always
/// yields the same rows.
pub struct DeskFaker {
    rng: DeterministicRng,
    seed: u64,
}

impl DeskFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn broker(&mut self, seq: u64) -> Broker {
        let offset = self.rng.int_n(BROKER_NAMES.len());
        let index = (seq as usize + offset) % BROKER_NAMES.len();
        Broker {
            id: BrokerId::from_sequence(seq),
            name: BROKER_NAMES[index].to_owned(),
        }
    }

    pub fn bank_account(&mut self, seq: u64) -> BankAccount {
        let (first, last) = self.person();
        let currency = self.pick(&CURRENCIES).to_owned();
        let created_at = self.created_at();
        BankAccount {
            id: BankAccountId::from_sequence(seq),
            account_name: format!("{} {currency}", self.pick(&ACCOUNT_PURPOSES)),
            bank_name: self.pick(&BANK_NAMES).to_owned(),
            holder_email: self.email(first, last),
            holder_name: format!("{first} {last}"),
            account_number: format!(
                "{:04}-{:04}-{:04}",
                self.int_range_i64(0, 9999),
                self.int_range_i64(0, 9999),
                self.int_range_i64(0, 9999)
            ),
            currency,
            account_type: *self.pick_choice(AccountType::ALL),
            status: *self.pick_choice(AccountStatus::ALL),
            balance_cents: self.int_range_i64(0, 50_000_000),
            created_at,
            updated_at: self.updated_after(created_at),
        }
    }

    pub fn bot_setting(&mut self, seq: u64) -> BotSetting {
        let strategy = *self.pick_choice(BotStrategy::ALL);
        let base = self.pick(&BASE_ASSETS);
        let quote = self.pick(&QUOTE_ASSETS);
        let created_at = self.created_at();
        let mut tags = Vec::new();
        for _ in 0..self.int_range_i64(1, 3) {
            let tag = self.pick(&BOT_TAGS).to_owned();
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        BotSetting {
            id: BotSettingId::from_sequence(seq),
            name: format!("{} {base}", title_case(strategy.as_str())),
            description: self.sentence(5, 12),
            trading_pair: format!("{base}/{quote}"),
            strategy,
            risk_level: *self.pick_choice(RiskLevel::ALL),
            status: *self.pick_choice(BotStatus::ALL),
            max_position_pct: self.int_range_i64(1, 50) as f64,
            stop_loss_pct: self.int_range_i64(5, 100) as f64 / 10.0,
            take_profit_pct: self.int_range_i64(10, 250) as f64 / 10.0,
            success_rate_pct: self.int_range_i64(300, 850) as f64 / 10.0,
            total_trades: self.int_range_i64(0, 5_000) as u32,
            tags,
            created_at,
            updated_at: self.updated_after(created_at),
        }
    }

    pub fn call(&mut self, seq: u64) -> Call {
        let (first, last) = self.person();
        let status = *self.pick_choice(CallStatus::ALL);
        let duration_secs = match status {
            CallStatus::Missed | CallStatus::Scheduled => 0,
            CallStatus::Voicemail => self.int_range_i64(10, 90) as u32,
            CallStatus::Completed => self.int_range_i64(30, 1_800) as u32,
        };
        let created_at = self.created_at();
        Call {
            id: CallId::from_sequence(seq),
            client_name: format!("{first} {last}"),
            phone_number: format!(
                "+1 {:03}-{:03}-{:04}",
                self.int_range_i64(201, 989),
                self.int_range_i64(200, 999),
                self.int_range_i64(0, 9999)
            ),
            agent_name: self.pick(&AGENT_NAMES).to_owned(),
            direction: *self.pick_choice(CallDirection::ALL),
            status,
            duration_secs,
            notes: self.sentence(4, 10),
            created_at,
            updated_at: created_at,
        }
    }

    /// `broker_count` is the size of the broker list the template may point
    /// into; every [`DANGLING_BROKER_EVERY`]-th template points past it.
    pub fn email_template(&mut self, seq: u64, broker_count: u64) -> EmailTemplate {
        let category = *self.pick_choice(TemplateCategory::ALL);
        let broker_id = if seq % DANGLING_BROKER_EVERY == 0 || broker_count == 0 {
            BrokerId::from_sequence(broker_count + 900 + seq)
        } else {
            BrokerId::from_sequence(self.int_range_i64(1, broker_count as i64) as u64)
        };
        let (name, subject) = template_copy(category);
        let created_at = self.created_at();
        EmailTemplate {
            id: EmailTemplateId::from_sequence(seq),
            name: format!("{name} v{}", self.int_range_i64(1, 4)),
            subject: subject.to_owned(),
            body: format!("Hello {{{{client_name}}}}, {}", self.sentence(8, 16).to_lowercase()),
            category,
            status: *self.pick_choice(TemplateStatus::ALL),
            broker_id,
            sender_email: format!("notifications@{}", self.pick(&EMAIL_DOMAINS)),
            retry_attempts: self.int_range_i64(0, 5) as u8,
            usage_count: self.int_range_i64(0, 12_000) as u32,
            created_at,
            updated_at: self.updated_after(created_at),
        }
    }

    pub fn exchange_setting(&mut self, seq: u64) -> ExchangeSetting {
        let name = EXCHANGES[seq.saturating_sub(1) as usize % EXCHANGES.len()];
        let slug = name.to_lowercase();
        let status = *self.pick_choice(ExchangeStatus::ALL);
        let maker = self.int_range_i64(0, 20) as f64 / 100.0;
        let created_at = self.created_at();
        ExchangeSetting {
            id: ExchangeSettingId::from_sequence(seq),
            exchange_name: if seq as usize > EXCHANGES.len() {
                format!("{name} {}", seq as usize / EXCHANGES.len() + 1)
            } else {
                name.to_owned()
            },
            api_url: format!("https://api.{slug}.com"),
            api_key_label: format!("{slug}-{}-key", self.pick(&KEY_ENVIRONMENTS)),
            status,
            trading_enabled: status == ExchangeStatus::Connected && self.rng.bool(),
            maker_fee_pct: maker,
            taker_fee_pct: maker + self.int_range_i64(2, 10) as f64 / 100.0,
            rate_limit_per_min: RATE_LIMITS[self.rng.int_n(RATE_LIMITS.len())],
            created_at,
            updated_at: self.updated_after(created_at),
        }
    }

    /// Picks the owning account from `accounts`; an empty list yields an
    /// account id nothing resolves.
    pub fn transaction(&mut self, seq: u64, accounts: &[BankAccountId]) -> Transaction {
        let account_id = if accounts.is_empty() {
            BankAccountId::from_sequence(9_000 + seq)
        } else {
            accounts[self.rng.int_n(accounts.len())].clone()
        };
        let kind = *self.pick_choice(TransactionKind::ALL);
        let amount_cents = match kind {
            TransactionKind::Fee => self.int_range_i64(100, 25_000),
            _ => self.int_range_i64(1_000, 5_000_000),
        };
        let created_at = self.created_at();
        Transaction {
            id: TransactionId::from_sequence(seq),
            account_id,
            kind,
            status: *self.pick_choice(TransactionStatus::ALL),
            amount_cents,
            currency: self.pick(&CURRENCIES).to_owned(),
            counterparty: self.pick(&COUNTERPARTIES).to_owned(),
            reference: format!("REF-{}{seq:05}", created_at.year()),
            description: self.sentence(3, 8),
            created_at,
            updated_at: self.updated_after(created_at),
        }
    }

    fn person(&mut self) -> (&'static str, &'static str) {
        (self.pick(&FIRST_NAMES), self.pick(&LAST_NAMES))
    }

    fn email(&mut self, first: &str, last: &str) -> String {
        format!(
            "{}.{}@{}",
            first.to_lowercase(),
            last.to_lowercase(),
            self.pick(&EMAIL_DOMAINS)
        )
    }

    fn created_at(&mut self) -> OffsetDateTime {
        let now = reference_now();
        self.random_datetime_between(now - Duration::days(540), now - Duration::days(30))
    }

    fn updated_after(&mut self, created_at: OffsetDateTime) -> OffsetDateTime {
        self.random_datetime_between(created_at, created_at + Duration::days(30))
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn pick_choice<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.rng.int_n(items.len())]
    }

    fn int_range_i64(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }

    fn random_datetime_between(
        &mut self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> OffsetDateTime {
        let start_ts = start.unix_timestamp();
        let end_ts = end.unix_timestamp();
        if end_ts <= start_ts {
            return start;
        }
        let span = (end_ts - start_ts) as u64;
        let offset = self.rng.next_u64() % (span + 1);
        OffsetDateTime::from_unix_timestamp(start_ts + offset as i64).unwrap_or(start)
    }

    fn sentence(&mut self, min_words: usize, max_words: usize) -> String {
        let count = self.int_range_i64(min_words as i64, max_words as i64) as usize;
        let mut parts = Vec::with_capacity(count);
        for _ in 0..count {
            parts.push(self.pick(&SENTENCE_WORDS));
        }
        let mut sentence = parts.join(" ");
        if let Some(first) = sentence.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        sentence.push('.');
        sentence
    }
}

/// Fills every table of `desk` with `rows_per_table` generated rows and
/// replaces the broker list.
pub fn seed_desk(desk: &mut Desk, seed: u64, rows_per_table: usize) -> Result<()> {
    let mut faker = DeskFaker::new(seed);
    let rows = 1..=rows_per_table as u64;

    desk.brokers = (1..=BROKER_COUNT).map(|seq| faker.broker(seq)).collect();
    desk.accounts = RecordStore::from_records(rows.clone().map(|seq| faker.bank_account(seq)).collect())
        .context("seed bank accounts")?;
    desk.bots = RecordStore::from_records(rows.clone().map(|seq| faker.bot_setting(seq)).collect())
        .context("seed bot settings")?;
    desk.calls = RecordStore::from_records(rows.clone().map(|seq| faker.call(seq)).collect())
        .context("seed calls")?;
    desk.templates = RecordStore::from_records(
        rows.clone()
            .map(|seq| faker.email_template(seq, BROKER_COUNT))
            .collect(),
    )
    .context("seed email templates")?;
    desk.exchanges =
        RecordStore::from_records(rows.clone().map(|seq| faker.exchange_setting(seq)).collect())
            .context("seed exchange settings")?;

    let account_ids = desk
        .accounts
        .records()
        .iter()
        .map(|account| account.id.clone())
        .collect::<Vec<_>>();
    desk.transactions = RecordStore::from_records(
        rows.map(|seq| faker.transaction(seq, &account_ids))
            .collect(),
    )
    .context("seed transactions")?;
    Ok(())
}

pub fn demo_desk(seed: u64, rows_per_table: usize) -> Result<Desk> {
    let mut desk = Desk::new();
    seed_desk(&mut desk, seed, rows_per_table)?;
    Ok(desk)
}

/// Fixed "now" the generator dates records against.
pub fn reference_now() -> OffsetDateTime {
    datetime!(2026-01-01 00:00 UTC)
}

fn template_copy(category: TemplateCategory) -> (&'static str, &'static str) {
    match category {
        TemplateCategory::Welcome => ("Welcome", "Welcome to your trading account"),
        TemplateCategory::Deposit => ("Deposit received", "We received your deposit"),
        TemplateCategory::Withdrawal => ("Withdrawal sent", "Your withdrawal is on its way"),
        TemplateCategory::Verification => ("Verify identity", "Action needed: verify your identity"),
        TemplateCategory::Marketing => ("Monthly digest", "Your markets this month"),
    }
}

fn title_case(value: &str) -> String {
    value
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
