// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use time::OffsetDateTime;
use tradedesk_app::{FormPayload, References, SaveRequest, TableKind};
use tradedesk_store::Desk;
use tradedesk_tui::TableSnapshot;

pub struct DeskRuntime<'a> {
    desk: &'a mut Desk,
    clock: fn() -> OffsetDateTime,
}

impl<'a> DeskRuntime<'a> {
    pub fn new(desk: &'a mut Desk) -> Self {
        Self::with_clock(desk, OffsetDateTime::now_utc)
    }

    pub fn with_clock(desk: &'a mut Desk, clock: fn() -> OffsetDateTime) -> Self {
        Self { desk, clock }
    }
}

impl tradedesk_tui::AppRuntime for DeskRuntime<'_> {
    fn load_snapshot(&mut self, table: TableKind) -> Result<TableSnapshot> {
        let snapshot = match table {
            TableKind::BankAccounts => TableSnapshot::BankAccounts(self.desk.accounts.snapshot()),
            TableKind::BotSettings => TableSnapshot::BotSettings(self.desk.bots.snapshot()),
            TableKind::Calls => TableSnapshot::Calls(self.desk.calls.snapshot()),
            TableKind::EmailTemplates => {
                TableSnapshot::EmailTemplates(self.desk.templates.snapshot())
            }
            TableKind::Exchanges => TableSnapshot::Exchanges(self.desk.exchanges.snapshot()),
            TableKind::Transactions => {
                TableSnapshot::Transactions(self.desk.transactions.snapshot())
            }
        };
        Ok(snapshot)
    }

    fn references(&mut self) -> Result<References> {
        Ok(self.desk.references())
    }

    fn submit_form(&mut self, request: &SaveRequest<FormPayload>) -> Result<String> {
        let now = (self.clock)();
        self.desk
            .submit(request, now)
            .with_context(|| format!("save {}", request.form.kind().noun()))
    }

    fn delete_records(&mut self, table: TableKind, ids: &[String]) -> Result<usize> {
        Ok(self.desk.delete(table, ids))
    }
}

#[cfg(test)]
mod tests {
    use super::DeskRuntime;
    use anyhow::Result;
    use time::OffsetDateTime;
    use time::macros::datetime;
    use tradedesk_app::{
        BankAccountFormInput, FormIntent, FormPayload, SaveRequest, TableKind,
    };
    use tradedesk_store::Desk;
    use tradedesk_testkit::demo_desk;
    use tradedesk_tui::AppRuntime;

    fn fixed_clock() -> OffsetDateTime {
        datetime!(2026-03-04 05:06 UTC)
    }

    #[test]
    fn submit_form_creates_account_with_runtime_clock() -> Result<()> {
        let mut desk = Desk::new();
        let id = {
            let mut runtime = DeskRuntime::with_clock(&mut desk, fixed_clock);
            runtime.submit_form(&SaveRequest {
                intent: FormIntent::Create,
                form: FormPayload::BankAccount(BankAccountFormInput {
                    account_name: "Ops float".to_owned(),
                    bank_name: "Harbor Trust".to_owned(),
                    holder_name: "Dana Ortiz".to_owned(),
                    holder_email: "dana@example.com".to_owned(),
                    account_number: "4400-1200".to_owned(),
                    ..BankAccountFormInput::default()
                }),
            })?
        };

        let account = desk.accounts.get(&id).expect("account saved");
        assert_eq!(account.account_name, "Ops float");
        assert_eq!(account.created_at, fixed_clock());
        Ok(())
    }

    #[test]
    fn failed_submit_names_the_action() -> Result<()> {
        let mut desk = Desk::new();
        let mut runtime = DeskRuntime::with_clock(&mut desk, fixed_clock);
        let error = runtime
            .submit_form(&SaveRequest {
                intent: FormIntent::Edit("ACC-0404".to_owned()),
                form: FormPayload::BankAccount(BankAccountFormInput::default()),
            })
            .expect_err("unknown record");
        let message = format!("{error:#}");
        assert!(message.starts_with("save bank account"), "{message}");
        Ok(())
    }

    #[test]
    fn snapshots_match_each_table() -> Result<()> {
        let mut desk = demo_desk(5, 4)?;
        let mut runtime = DeskRuntime::new(&mut desk);
        for kind in TableKind::ALL {
            let snapshot = runtime.load_snapshot(kind)?;
            assert_eq!(snapshot.kind(), kind);
            assert_eq!(snapshot.row_count(), 4);
        }
        Ok(())
    }

    #[test]
    fn delete_records_reports_removed_count() -> Result<()> {
        let mut desk = demo_desk(9, 3)?;
        let ids = desk
            .calls
            .records()
            .iter()
            .take(2)
            .map(|call| call.id.get().to_owned())
            .collect::<Vec<_>>();
        let mut runtime = DeskRuntime::new(&mut desk);

        assert_eq!(runtime.delete_records(TableKind::Calls, &ids)?, 2);
        assert_eq!(runtime.load_snapshot(TableKind::Calls)?.row_count(), 1);
        Ok(())
    }
}
