// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use runtime::DeskRuntime;
use std::env;
use std::path::PathBuf;
use tracing::info;
use tradedesk_app::{AppState, Notifier, TableKind};
use tradedesk_store::Desk;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `tradedesk --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    let toast_timeout = config.toast_timeout()?;
    let seed = options.seed.unwrap_or_else(|| config.seed());
    let empty = options.empty || config.empty();

    let mut desk = build_desk(empty, seed, config.rows_per_table())?;

    if let Some(table) = options.export {
        println!("{}", export_table(&desk, table)?);
        return Ok(());
    }

    let log_file = config.log_file()?;
    if options.check_only {
        return Ok(());
    }

    logging::init(&log_file, config.log_level())?;
    info!(
        seed,
        empty,
        rows_per_table = config.rows_per_table(),
        config = %options.config_path.display(),
        "starting tradedesk"
    );

    let mut state = AppState {
        toast: Notifier::new(toast_timeout),
        ..AppState::with_table(config.start_table())
    };
    let mut runtime = DeskRuntime::new(&mut desk);
    tradedesk_tui::run_app(&mut state, &mut runtime, config.page_size())
}

fn build_desk(empty: bool, seed: u64, rows_per_table: usize) -> Result<Desk> {
    let mut desk = Desk::new();
    if !empty {
        tradedesk_testkit::seed_desk(&mut desk, seed, rows_per_table)
            .with_context(|| format!("seed mock data with seed {seed}"))?;
    }
    Ok(desk)
}

fn export_table(desk: &Desk, table: TableKind) -> Result<String> {
    let json = match table {
        TableKind::BankAccounts => serde_json::to_string_pretty(desk.accounts.records()),
        TableKind::BotSettings => serde_json::to_string_pretty(desk.bots.records()),
        TableKind::Calls => serde_json::to_string_pretty(desk.calls.records()),
        TableKind::EmailTemplates => serde_json::to_string_pretty(desk.templates.records()),
        TableKind::Exchanges => serde_json::to_string_pretty(desk.exchanges.records()),
        TableKind::Transactions => serde_json::to_string_pretty(desk.transactions.records()),
    };
    json.with_context(|| format!("encode {} as JSON", table.label()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    empty: bool,
    seed: Option<u64>,
    export: Option<TableKind>,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        empty: false,
        seed: None,
        export: None,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--empty" => {
                options.empty = true;
            }
            "--seed" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--seed requires a non-negative integer"))?;
                let seed = value.as_ref().parse::<u64>().map_err(|_| {
                    anyhow!(
                        "--seed expects a non-negative integer, got {:?}",
                        value.as_ref()
                    )
                })?;
                options.seed = Some(seed);
            }
            "--export" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--export requires a table name"))?;
                let table = TableKind::parse(value.as_ref()).ok_or_else(|| {
                    anyhow!(
                        "unknown table {:?} for --export; expected one of: {}",
                        value.as_ref(),
                        table_labels()
                    )
                })?;
                options.export = Some(table);
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn table_labels() -> String {
    TableKind::ALL
        .iter()
        .map(|kind| kind.label())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_help() {
    println!("tradedesk");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config and mock data, then exit");
    println!("  --empty                  Start with empty tables");
    println!("  --seed <n>               Seed for the generated mock data");
    println!("  --export <table>         Print a seeded table as JSON ({})", table_labels());
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, build_desk, export_table, parse_cli_args};
    use anyhow::Result;
    use std::path::PathBuf;
    use tradedesk_app::TableKind;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/tradedesk-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                print_config_path: false,
                print_example: false,
                check_only: false,
                empty: false,
                seed: None,
                export: None,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_config_value() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(!options.empty);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_reads_seed_and_empty() -> Result<()> {
        let options = parse_cli_args(vec!["--seed", "99", "--empty"], default_options_path())?;
        assert_eq!(options.seed, Some(99));
        assert!(options.empty);

        let error = parse_cli_args(vec!["--seed", "-3"], default_options_path())
            .expect_err("negative seed should fail");
        assert!(error.to_string().contains("non-negative integer"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_resolves_export_table() -> Result<()> {
        let options = parse_cli_args(vec!["--export", "calls"], default_options_path())?;
        assert_eq!(options.export, Some(TableKind::Calls));

        let error = parse_cli_args(vec!["--export", "ledger"], default_options_path())
            .expect_err("unknown table should fail");
        let message = error.to_string();
        assert!(message.contains("\"ledger\""));
        assert!(message.contains("transactions"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }

    #[test]
    fn empty_desk_has_no_rows() -> Result<()> {
        let desk = build_desk(true, 42, 24)?;
        assert!(desk.counts().iter().all(|(_, count)| *count == 0));
        Ok(())
    }

    #[test]
    fn export_emits_json_array_of_records() -> Result<()> {
        let desk = build_desk(false, 42, 3)?;
        let json = export_table(&desk, TableKind::BankAccounts)?;
        let value: serde_json::Value = serde_json::from_str(&json)?;
        let rows = value.as_array().expect("array of accounts");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["id"], "ACC-0001");
        Ok(())
    }
}
