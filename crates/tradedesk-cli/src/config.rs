// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tradedesk_app::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MAX_TOAST_TTL, TableKind};

const CONFIG_VERSION: i64 = 1;
const DEFAULT_TOAST_TIMEOUT: &str = "4s";
const DEFAULT_START_TABLE: &str = "accounts";
const DEFAULT_LOG_LEVEL: &str = "info";
const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_ROWS_PER_TABLE: usize = 24;
pub const MAX_ROWS_PER_TABLE: usize = 10_000;
pub const CONFIG_PATH_ENV: &str = "TRADEDESK_CONFIG_PATH";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub data: Data,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            ui: Ui::default(),
            data: Data::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub page_size: Option<i64>,
    pub toast_timeout: Option<String>,
    pub start_table: Option<String>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            page_size: Some(DEFAULT_PAGE_SIZE as i64),
            toast_timeout: Some(DEFAULT_TOAST_TIMEOUT.to_owned()),
            start_table: Some(DEFAULT_START_TABLE.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Data {
    pub seed: Option<i64>,
    pub rows_per_table: Option<i64>,
    pub empty: Option<bool>,
}

impl Default for Data {
    fn default() -> Self {
        Self {
            seed: Some(DEFAULT_SEED as i64),
            rows_per_table: Some(DEFAULT_ROWS_PER_TABLE as i64),
            empty: Some(false),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;

        let app_dir = config_root.join(tradedesk_store::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version; add `version = 1` and put values under [ui], [data], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(page_size) = self.ui.page_size
            && !(1..=MAX_PAGE_SIZE as i64).contains(&page_size)
        {
            bail!(
                "ui.page_size in {} must be between 1 and {MAX_PAGE_SIZE}, got {page_size}",
                path.display()
            );
        }

        if let Some(timeout) = &self.ui.toast_timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "ui.toast_timeout in {} must be positive, got {timeout}",
                    path.display()
                );
            }
            if parsed > MAX_TOAST_TTL {
                bail!(
                    "ui.toast_timeout in {} must be at most {}s, got {timeout}",
                    path.display(),
                    MAX_TOAST_TTL.as_secs()
                );
            }
        }

        if let Some(table) = &self.ui.start_table
            && TableKind::parse(table).is_none()
        {
            let known = TableKind::ALL
                .iter()
                .map(|kind| kind.label())
                .collect::<Vec<_>>()
                .join(", ");
            bail!(
                "ui.start_table in {} is {table:?}; expected one of: {known}",
                path.display()
            );
        }

        if let Some(seed) = self.data.seed
            && seed < 0
        {
            bail!(
                "data.seed in {} must be non-negative, got {seed}",
                path.display()
            );
        }

        if let Some(rows) = self.data.rows_per_table
            && !(0..=MAX_ROWS_PER_TABLE as i64).contains(&rows)
        {
            bail!(
                "data.rows_per_table in {} must be between 0 and {MAX_ROWS_PER_TABLE}, got {rows}",
                path.display()
            );
        }

        if let Some(level) = &self.log.level
            && !LOG_LEVELS.contains(&level.as_str())
        {
            bail!(
                "log.level in {} is {level:?}; expected one of: {}",
                path.display(),
                LOG_LEVELS.join(", ")
            );
        }

        Ok(())
    }

    pub fn page_size(&self) -> usize {
        self.ui
            .page_size
            .and_then(|size| usize::try_from(size).ok())
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn toast_timeout(&self) -> Result<Duration> {
        parse_duration(
            self.ui
                .toast_timeout
                .as_deref()
                .unwrap_or(DEFAULT_TOAST_TIMEOUT),
        )
    }

    pub fn start_table(&self) -> TableKind {
        self.ui
            .start_table
            .as_deref()
            .and_then(TableKind::parse)
            .unwrap_or(TableKind::BankAccounts)
    }

    pub fn seed(&self) -> u64 {
        self.data
            .seed
            .and_then(|seed| u64::try_from(seed).ok())
            .unwrap_or(DEFAULT_SEED)
    }

    pub fn rows_per_table(&self) -> usize {
        self.data
            .rows_per_table
            .and_then(|rows| usize::try_from(rows).ok())
            .unwrap_or(DEFAULT_ROWS_PER_TABLE)
    }

    pub fn empty(&self) -> bool {
        self.data.empty.unwrap_or(false)
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(file) = &self.log.file {
            return Ok(PathBuf::from(file));
        }
        let data_root = dirs::data_local_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [log].file in the config")
        })?;
        Ok(data_root
            .join(tradedesk_store::APP_NAME)
            .join(format!("{}.log", tradedesk_store::APP_NAME)))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# tradedesk config\n# Place this file at: {}\n\nversion = 1\n\n[ui]\npage_size = {}\ntoast_timeout = \"{}\"\n# one of: accounts, bots, calls, templates, exchanges, transactions\nstart_table = \"{}\"\n\n[data]\nseed = {}\nrows_per_table = {}\nempty = false\n\n[log]\n# error, warn, info, debug or trace; TRADEDESK_LOG overrides\nlevel = \"{}\"\n# Optional. Default is the platform data dir (for example ~/.local/share/tradedesk/tradedesk.log)\n# file = \"/absolute/path/to/tradedesk.log\"\n",
            path.display(),
            DEFAULT_PAGE_SIZE,
            DEFAULT_TOAST_TIMEOUT,
            DEFAULT_START_TABLE,
            DEFAULT_SEED,
            DEFAULT_ROWS_PER_TABLE,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid toast duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid toast duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid toast duration {raw:?}"))?;
        let secs = mins
            .checked_mul(60)
            .ok_or_else(|| anyhow!("invalid toast duration {raw:?}; value is too large"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 4s)")
}
