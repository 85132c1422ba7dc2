// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use time::macros::datetime;
use tradedesk_app::{
    BankAccountFormInput, CallFormInput, EmailTemplateFormInput, FormIntent, FormPayload,
    FormState, ModalController, RecordForm, SaveRequest, SubmitOutcome, TableKind,
    TransactionFormInput,
};
use tradedesk_store::{Desk, StoreError};
use tradedesk_testkit::{demo_desk, reference_now};

fn payroll_form() -> BankAccountFormInput {
    BankAccountFormInput {
        account_name: "Payroll".to_owned(),
        bank_name: "Lakeside Savings".to_owned(),
        holder_name: "Morgan Lee".to_owned(),
        holder_email: "morgan@example.com".to_owned(),
        account_number: "1111-2222".to_owned(),
        currency: "EUR".to_owned(),
        ..BankAccountFormInput::default()
    }
}

fn create(form: FormPayload) -> SaveRequest<FormPayload> {
    SaveRequest {
        intent: FormIntent::Create,
        form,
    }
}

fn edit(id: &str, form: FormPayload) -> SaveRequest<FormPayload> {
    SaveRequest {
        intent: FormIntent::Edit(id.to_owned()),
        form,
    }
}

#[test]
fn create_edit_delete_round_trip() -> Result<()> {
    let mut desk = Desk::new();
    let created = datetime!(2026-02-01 09:00 UTC);

    let id = desk.submit(&create(FormPayload::BankAccount(payroll_form())), created)?;
    assert_eq!(id, "ACC-0001");
    let account = desk.accounts.get(&id).expect("created account");
    assert_eq!(account.balance_cents, 0);
    assert_eq!(account.created_at, created);

    let mut form = BankAccountFormInput::from_record(account);
    form.account_name = "  Payroll EUR ".to_owned();
    let later = datetime!(2026-02-03 10:30 UTC);
    desk.submit(&edit(&id, FormPayload::BankAccount(form)), later)?;

    let account = desk.accounts.get(&id).expect("edited account");
    assert_eq!(account.account_name, "Payroll EUR");
    assert_eq!(account.created_at, created);
    assert_eq!(account.updated_at, later);

    assert_eq!(desk.delete(TableKind::BankAccounts, &[id.clone()]), 1);
    assert!(desk.accounts.get(&id).is_none());
    assert_eq!(desk.len(TableKind::BankAccounts), 0);
    Ok(())
}

#[test]
fn ids_are_not_reused_after_delete() -> Result<()> {
    let mut desk = Desk::new();
    let now = reference_now();
    let first = desk.submit(&create(FormPayload::BankAccount(payroll_form())), now)?;
    desk.delete(TableKind::BankAccounts, &[first.clone()]);

    let second = desk.submit(&create(FormPayload::BankAccount(payroll_form())), now)?;
    assert_ne!(first, second);
    assert_eq!(second, "ACC-0002");
    Ok(())
}

#[test]
fn editing_a_deleted_record_reports_not_found() -> Result<()> {
    let mut desk = demo_desk(3, 4)?;
    let call = desk.calls.records()[0].clone();
    let form = CallFormInput::from_record(&call);
    desk.delete(TableKind::Calls, &[call.id.get().to_owned()]);

    let error = desk
        .submit(&edit(call.id.get(), FormPayload::Call(form)), reference_now())
        .expect_err("record is gone");

    assert_eq!(
        error.downcast_ref::<StoreError>(),
        Some(&StoreError::NotFound {
            table: TableKind::Calls,
            id: call.id.get().to_owned(),
        })
    );
    assert!(error.to_string().contains("not found"));
    Ok(())
}

#[test]
fn invalid_form_is_refused_without_writing() -> Result<()> {
    let mut desk = demo_desk(4, 3)?;
    let before = desk.transactions.snapshot();
    let form = TransactionFormInput {
        amount: "-5".to_owned(),
        ..TransactionFormInput::default()
    };

    let error = desk
        .submit(&create(FormPayload::Transaction(form)), reference_now())
        .expect_err("negative amount");

    let Some(StoreError::Invalid(errors)) = error.downcast_ref::<StoreError>() else {
        panic!("expected validation error, got {error:#}");
    };
    assert!(errors.contains("amount"));
    assert_eq!(desk.transactions.records(), before.as_slice());
    Ok(())
}

#[test]
fn delete_skips_unknown_ids() -> Result<()> {
    let mut desk = demo_desk(8, 5)?;
    let keep = desk.bots.records()[1].id.get().to_owned();
    let drop = desk.bots.records()[0].id.get().to_owned();

    let removed = desk.delete(TableKind::BotSettings, &[drop.clone(), "BOT-9999".to_owned()]);

    assert_eq!(removed, 1);
    assert!(desk.bots.get(&drop).is_none());
    assert!(desk.bots.get(&keep).is_some());
    assert_eq!(desk.delete(TableKind::BotSettings, &[]), 0);
    Ok(())
}

#[test]
fn seeded_desk_counts_and_references() -> Result<()> {
    let desk = demo_desk(21, 7)?;

    for (kind, count) in desk.counts() {
        assert_eq!(count, 7, "{kind}");
    }

    let refs = desk.references();
    let template = &desk.templates.records()[0];
    assert_ne!(refs.broker_name(&template.broker_id), "Unknown");
    let dangling = desk
        .templates
        .get("TPL-0005")
        .expect("fifth template exists");
    assert_eq!(refs.broker_name(&dangling.broker_id), "Unknown");

    let txn = &desk.transactions.records()[0];
    let account = desk.accounts.get(txn.account_id.get()).expect("owner exists");
    assert_eq!(refs.account_name(&txn.account_id), account.account_name);
    Ok(())
}

#[test]
fn template_with_missing_broker_still_saves() -> Result<()> {
    let mut desk = demo_desk(2, 5)?;
    let template = desk.templates.get("TPL-0005").expect("dangling template").clone();
    let mut form = EmailTemplateFormInput::from_record(&template);
    form.subject = "Updated subject".to_owned();

    desk.submit(&edit("TPL-0005", FormPayload::EmailTemplate(form)), reference_now())?;

    let saved = desk.templates.get("TPL-0005").expect("template kept");
    assert_eq!(saved.subject, "Updated subject");
    assert_eq!(saved.broker_id, template.broker_id);
    Ok(())
}

#[test]
fn modal_edits_do_not_touch_the_store_until_saved() -> Result<()> {
    let mut desk = demo_desk(13, 3)?;
    let original = desk.accounts.records()[0].clone();
    let view_snapshot = desk.accounts.snapshot();

    let mut modal = ModalController::new();
    modal.open_edit(
        original.id.get(),
        FormPayload::BankAccount(BankAccountFormInput::from_record(&original)),
    );
    assert!(modal.set_field("account_name", "Renamed"));
    assert_eq!(desk.accounts.get(original.id.get()), Some(&original));

    modal.cancel();
    assert_eq!(desk.accounts.get(original.id.get()), Some(&original));

    modal.open_edit(
        original.id.get(),
        FormPayload::BankAccount(BankAccountFormInput::from_record(&original)),
    );
    modal.set_field("account_name", "Renamed");
    let outcome = modal.submit(|request| desk.submit(request, reference_now()));

    assert_eq!(outcome, SubmitOutcome::Saved(original.id.get().to_owned()));
    assert_eq!(
        desk.accounts
            .get(original.id.get())
            .map(|account| account.account_name.as_str()),
        Some("Renamed")
    );
    assert_eq!(view_snapshot[0], original);
    Ok(())
}

#[test]
fn failed_save_keeps_the_modal_open_with_the_error() -> Result<()> {
    let mut desk = demo_desk(17, 2)?;
    let call = desk.calls.records()[0].clone();
    let mut modal = ModalController::new();
    modal.open_edit(call.id.get(), FormPayload::Call(CallFormInput::from_record(&call)));
    desk.delete(TableKind::Calls, &[call.id.get().to_owned()]);

    let outcome = modal.submit(|request| desk.submit(request, reference_now()));

    let SubmitOutcome::Failed(message) = outcome else {
        panic!("save against a deleted record must fail");
    };
    assert!(message.contains(call.id.get()));
    assert!(modal.is_open());
    assert_eq!(modal.save_error(), Some(message.as_str()));
    assert!(modal.form().is_some_and(|form| form.validate().is_empty()));
    Ok(())
}
