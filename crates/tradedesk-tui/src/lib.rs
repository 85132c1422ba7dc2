// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};
use std::collections::BTreeMap;
use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use tradedesk_app::{
    AppCommand, AppEvent, AppMode, AppState, BankAccount, BankAccountFormInput, BotSetting,
    BotSettingFormInput, Call, CallFormInput, Choice, DEFAULT_PAGE_SIZE, DeleteConfirm,
    DetailView, EmailTemplate, EmailTemplateFormInput, ExchangeSetting, ExchangeSettingFormInput,
    FieldKind, FormIntent, FormPayload, FormState, MAX_PAGE_SIZE, ModalController, RecordForm,
    RecordKey, References, SaveRequest, SortDirection, SubmitOutcome, TableKind, TableRecord,
    TableView, ToastKind, Transaction, TransactionFormInput, detail_rows,
};

const PAGE_SIZE_STEPS: [usize; 6] = [5, 10, 25, 50, 100, MAX_PAGE_SIZE];
const SORT_MARK_ASC: &str = "▲";
const SORT_MARK_DESC: &str = "▼";
const SELECTED_MARK: &str = "*";
const DETAIL_SCROLL_STEP: i16 = 1;

/// One table's rows as the runtime last handed them out. The `Arc` is shared
/// with the store, so holding it never blocks a write.
#[derive(Debug, Clone, PartialEq)]
pub enum TableSnapshot {
    BankAccounts(Arc<Vec<BankAccount>>),
    BotSettings(Arc<Vec<BotSetting>>),
    Calls(Arc<Vec<Call>>),
    EmailTemplates(Arc<Vec<EmailTemplate>>),
    Exchanges(Arc<Vec<ExchangeSetting>>),
    Transactions(Arc<Vec<Transaction>>),
}

impl TableSnapshot {
    pub const fn kind(&self) -> TableKind {
        match self {
            Self::BankAccounts(_) => TableKind::BankAccounts,
            Self::BotSettings(_) => TableKind::BotSettings,
            Self::Calls(_) => TableKind::Calls,
            Self::EmailTemplates(_) => TableKind::EmailTemplates,
            Self::Exchanges(_) => TableKind::Exchanges,
            Self::Transactions(_) => TableKind::Transactions,
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            Self::BankAccounts(rows) => rows.len(),
            Self::BotSettings(rows) => rows.len(),
            Self::Calls(rows) => rows.len(),
            Self::EmailTemplates(rows) => rows.len(),
            Self::Exchanges(rows) => rows.len(),
            Self::Transactions(rows) => rows.len(),
        }
    }

    fn detail(&self, id: &str, refs: &References) -> Option<Vec<(&'static str, String)>> {
        match self {
            Self::BankAccounts(rows) => find_record(rows, id).map(|row| detail_rows(row, refs)),
            Self::BotSettings(rows) => find_record(rows, id).map(|row| detail_rows(row, refs)),
            Self::Calls(rows) => find_record(rows, id).map(|row| detail_rows(row, refs)),
            Self::EmailTemplates(rows) => find_record(rows, id).map(|row| detail_rows(row, refs)),
            Self::Exchanges(rows) => find_record(rows, id).map(|row| detail_rows(row, refs)),
            Self::Transactions(rows) => find_record(rows, id).map(|row| detail_rows(row, refs)),
        }
    }

    fn edit_form(&self, id: &str) -> Option<FormPayload> {
        match self {
            Self::BankAccounts(rows) => find_record(rows, id)
                .map(|row| FormPayload::BankAccount(BankAccountFormInput::from_record(row))),
            Self::BotSettings(rows) => find_record(rows, id)
                .map(|row| FormPayload::BotSetting(BotSettingFormInput::from_record(row))),
            Self::Calls(rows) => {
                find_record(rows, id).map(|row| FormPayload::Call(CallFormInput::from_record(row)))
            }
            Self::EmailTemplates(rows) => find_record(rows, id)
                .map(|row| FormPayload::EmailTemplate(EmailTemplateFormInput::from_record(row))),
            Self::Exchanges(rows) => find_record(rows, id).map(|row| {
                FormPayload::ExchangeSetting(ExchangeSettingFormInput::from_record(row))
            }),
            Self::Transactions(rows) => find_record(rows, id)
                .map(|row| FormPayload::Transaction(TransactionFormInput::from_record(row))),
        }
    }
}

fn find_record<'a, R: TableRecord>(rows: &'a [R], id: &str) -> Option<&'a R> {
    rows.iter().find(|row| row.id().as_str() == id)
}

/// Everything the UI needs from the data side.
pub trait AppRuntime {
    fn load_snapshot(&mut self, table: TableKind) -> Result<TableSnapshot>;
    fn references(&mut self) -> Result<References>;
    /// Applies a create or edit and returns the id of the saved record.
    fn submit_form(&mut self, request: &SaveRequest<FormPayload>) -> Result<String>;
    fn delete_records(&mut self, table: TableKind, ids: &[String]) -> Result<usize>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ExpireToast { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct PageRow {
    id: String,
    cells: Vec<String>,
}

/// The visible page of the active table, cells in column declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct PageModel {
    rows: Vec<PageRow>,
    page_index: usize,
    page_count: usize,
    total_matches: usize,
    total_records: usize,
}

#[derive(Debug, Clone, PartialEq)]
struct ViewData {
    page_size: usize,
    views: BTreeMap<TableKind, TableView>,
    snapshot: Option<TableSnapshot>,
    references: References,
    page: PageModel,
    modal: ModalController<FormPayload>,
    form_field: usize,
    delete: DeleteConfirm,
    detail: DetailView,
    filter_cursor: usize,
    column_cursor: usize,
}

impl Default for ViewData {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl ViewData {
    fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size,
            views: BTreeMap::new(),
            snapshot: None,
            references: References::default(),
            page: PageModel::default(),
            modal: ModalController::new(),
            form_field: 0,
            delete: DeleteConfirm::default(),
            detail: DetailView::default(),
            filter_cursor: 0,
            column_cursor: 0,
        }
    }

    fn view_mut(&mut self, kind: TableKind) -> &mut TableView {
        let page_size = self.page_size;
        self.views
            .entry(kind)
            .or_insert_with(|| TableView::with_page_size(kind, page_size))
    }

    fn view(&self, kind: TableKind) -> Option<&TableView> {
        self.views.get(&kind)
    }

    fn cursor_id(&self, kind: TableKind) -> Option<String> {
        let row = self.view(kind).map_or(0, TableView::cursor_row);
        self.page.rows.get(row).map(|row| row.id.clone())
    }
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R, page_size: usize) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::with_page_size(page_size);
    let (internal_tx, internal_rx) = mpsc::channel();

    if let Err(error) = refresh_view_data(state, runtime, &mut view_data) {
        emit_toast(
            state,
            &internal_tx,
            format!("load failed: {error:#}"),
            ToastKind::Error,
        );
    }
    info!(table = %state.active_table, "tui started");

    let mut result = Ok(());
    loop {
        process_internal_events(state, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if has_event {
            match event::read().context("read event") {
                Ok(Event::Key(key)) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    info!("tui stopped");
    result
}

fn process_internal_events(state: &mut AppState, rx: &Receiver<InternalEvent>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ExpireToast { token } => {
                state.dispatch(AppCommand::ExpireToast { token });
            }
        }
    }
}

fn schedule_toast_expiry(internal_tx: &Sender<InternalEvent>, token: u64, ttl: Duration) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(ttl);
        let _ = sender.send(InternalEvent::ExpireToast { token });
    });
}

fn emit_toast(
    state: &mut AppState,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
    kind: ToastKind,
) {
    let events = state.dispatch(AppCommand::Notify {
        message: message.into(),
        kind,
        now: Instant::now(),
    });
    for event in events {
        if let AppEvent::ToastShown { token } = event {
            schedule_toast_expiry(internal_tx, token, state.toast.ttl());
        }
    }
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    match state.mode {
        AppMode::Nav => {
            if handle_nav_key(state, runtime, view_data, internal_tx, key) {
                return true;
            }
        }
        AppMode::Search => handle_search_key(state, view_data, key),
        AppMode::Filters => handle_filters_key(state, view_data, internal_tx, key),
        AppMode::Columns => handle_columns_key(state, view_data, key),
        AppMode::Form(_) => handle_form_key(state, runtime, view_data, internal_tx, key),
        AppMode::Detail => handle_detail_key(state, view_data, key),
        AppMode::ConfirmDelete => handle_confirm_key(state, runtime, view_data, internal_tx, key),
        AppMode::Help => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?' | 'q')) {
                state.dispatch(AppCommand::ExitToNav);
            }
        }
    }

    reproject(state, view_data);
    false
}

fn handle_nav_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let kind = state.active_table;
    let rows_on_page = view_data.page.rows.len();
    let total = view_data.page.total_matches;

    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Tab, _) => switch_table(state, runtime, view_data, internal_tx, AppCommand::NextTable),
        (KeyCode::BackTab, _) => {
            switch_table(state, runtime, view_data, internal_tx, AppCommand::PrevTable);
        }
        (KeyCode::Char('j') | KeyCode::Down, _) => view_data.view_mut(kind).move_row(1, rows_on_page),
        (KeyCode::Char('k') | KeyCode::Up, _) => view_data.view_mut(kind).move_row(-1, rows_on_page),
        (KeyCode::Char('h') | KeyCode::Left, _) => view_data.view_mut(kind).move_column(-1),
        (KeyCode::Char('l') | KeyCode::Right, _) => view_data.view_mut(kind).move_column(1),
        (KeyCode::Char('n') | KeyCode::PageDown, _) => {
            if !view_data.view_mut(kind).next_page(total) {
                emit_toast(state, internal_tx, "already on the last page", ToastKind::Info);
            }
        }
        (KeyCode::Char('p') | KeyCode::PageUp, _) => {
            if !view_data.view_mut(kind).previous_page() {
                emit_toast(state, internal_tx, "already on the first page", ToastKind::Info);
            }
        }
        (KeyCode::Char('+'), _) => step_page_size(state, view_data, internal_tx, 1),
        (KeyCode::Char('-'), _) => step_page_size(state, view_data, internal_tx, -1),
        (KeyCode::Char('s'), KeyModifiers::NONE) => {
            let view = view_data.view_mut(kind);
            match view.cursor_column() {
                Some(column) if view.toggle_sort(column) => {}
                Some(column) => {
                    let label = kind.column(column).map_or(column, |spec| spec.label);
                    emit_toast(
                        state,
                        internal_tx,
                        format!("{label} is not sortable"),
                        ToastKind::Info,
                    );
                }
                None => {}
            }
        }
        (KeyCode::Char('S'), _) => view_data.view_mut(kind).clear_sort(),
        (KeyCode::Char('/'), _) => {
            state.dispatch(AppCommand::EnterSearch);
        }
        (KeyCode::Char('F'), _) => {
            view_data.filter_cursor = 0;
            state.dispatch(AppCommand::OpenFilters);
        }
        (KeyCode::Char('c'), KeyModifiers::NONE) => {
            view_data.column_cursor = 0;
            state.dispatch(AppCommand::OpenColumns);
        }
        (KeyCode::Char(' '), _) => {
            if let Some(id) = view_data.cursor_id(kind) {
                view_data.view_mut(kind).toggle_selected(&id);
            }
        }
        (KeyCode::Char('a'), KeyModifiers::NONE) => {
            view_data.modal.open_create(FormPayload::blank_for(kind));
            view_data.form_field = 0;
            state.dispatch(AppCommand::OpenForm(kind));
        }
        (KeyCode::Char('e'), KeyModifiers::NONE) => open_edit(state, view_data, internal_tx),
        (KeyCode::Enter, _) => {
            if let Some(id) = view_data.cursor_id(kind) {
                view_data.detail.open(id);
                state.dispatch(AppCommand::OpenDetail);
            }
        }
        (KeyCode::Char('d'), KeyModifiers::NONE) => request_delete(state, view_data, internal_tx),
        (KeyCode::Char('?'), _) => {
            state.dispatch(AppCommand::OpenHelp);
        }
        (KeyCode::Esc, _) => {
            state.dispatch(AppCommand::DismissToast);
        }
        _ => {}
    }
    false
}

fn switch_table<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    let events = state.dispatch(command);
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::TableChanged(_)))
    {
        reload_or_toast(state, runtime, view_data, internal_tx);
    }
}

fn step_page_size(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    direction: isize,
) {
    let view = view_data.view_mut(state.active_table);
    let current = view.pager.page_size();
    let next = if direction > 0 {
        PAGE_SIZE_STEPS.iter().copied().find(|size| *size > current)
    } else {
        PAGE_SIZE_STEPS.iter().rev().copied().find(|size| *size < current)
    };
    match next {
        Some(size) if view.set_page_size(size) => {
            emit_toast(state, internal_tx, format!("{size} rows per page"), ToastKind::Info);
        }
        _ => {}
    }
}

fn open_edit(state: &mut AppState, view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>) {
    let kind = state.active_table;
    let Some(id) = view_data.cursor_id(kind) else {
        emit_toast(state, internal_tx, "nothing to edit", ToastKind::Info);
        return;
    };
    let Some(form) = view_data
        .snapshot
        .as_ref()
        .and_then(|snapshot| snapshot.edit_form(&id))
    else {
        emit_toast(state, internal_tx, format!("{id} is no longer loaded"), ToastKind::Error);
        return;
    };
    view_data.modal.open_edit(id, form);
    view_data.form_field = 0;
    state.dispatch(AppCommand::OpenForm(kind));
}

fn request_delete(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let kind = state.active_table;
    let mut ids = view_data
        .view(kind)
        .map(TableView::selected_ids)
        .unwrap_or_default();
    if ids.is_empty() {
        ids.extend(view_data.cursor_id(kind));
    }
    if view_data.delete.request(ids) {
        state.dispatch(AppCommand::OpenConfirmDelete);
    } else {
        emit_toast(state, internal_tx, "nothing to delete", ToastKind::Info);
    }
}

fn handle_search_key(state: &mut AppState, view_data: &mut ViewData, key: KeyEvent) {
    let view = view_data.view_mut(state.active_table);
    match key.code {
        KeyCode::Esc => {
            view.set_query("");
            state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Enter => {
            state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Backspace => view.pop_query_char(),
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            view.push_query_char(ch);
        }
        _ => {}
    }
}

fn handle_filters_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let kind = state.active_table;
    let filters = kind.filters();
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('F' | 'q') => {
            state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Char('j') | KeyCode::Down => {
            view_data.filter_cursor =
                (view_data.filter_cursor + 1).min(filters.len().saturating_sub(1));
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.filter_cursor = view_data.filter_cursor.saturating_sub(1);
        }
        KeyCode::Char('h' | 'l') | KeyCode::Left | KeyCode::Right => {
            let step = if matches!(key.code, KeyCode::Char('h') | KeyCode::Left) {
                -1
            } else {
                1
            };
            let Some(spec) = filters.get(view_data.filter_cursor) else {
                return;
            };
            if let Err(error) = view_data.view_mut(kind).cycle_filter(spec.key, step) {
                warn!(%error, "filter change rejected");
                emit_toast(state, internal_tx, error.to_string(), ToastKind::Error);
            }
        }
        KeyCode::Char('x') => view_data.view_mut(kind).clear_filters(),
        _ => {}
    }
}

fn handle_columns_key(state: &mut AppState, view_data: &mut ViewData, key: KeyEvent) {
    let kind = state.active_table;
    let columns = kind.columns();
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('c' | 'q') => {
            state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Char('j') | KeyCode::Down => {
            view_data.column_cursor =
                (view_data.column_cursor + 1).min(columns.len().saturating_sub(1));
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.column_cursor = view_data.column_cursor.saturating_sub(1);
        }
        KeyCode::Char(' ') => {
            if let Some(spec) = columns.get(view_data.column_cursor) {
                view_data.view_mut(kind).columns.toggle(spec.key);
            }
        }
        KeyCode::Char('A') => view_data.view_mut(kind).columns.show_all(),
        KeyCode::Char('H') => view_data.view_mut(kind).columns.hide_all(),
        _ => {}
    }
}

fn handle_form_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(specs) = view_data.modal.form().map(FormState::field_specs) else {
        state.dispatch(AppCommand::ExitToNav);
        return;
    };
    let field_count = specs.len() as isize;
    let Some(spec) = specs.get(view_data.form_field).copied() else {
        view_data.form_field = 0;
        return;
    };

    match key.code {
        KeyCode::Esc => {
            view_data.modal.cancel();
            state.dispatch(AppCommand::ExitToNav);
            debug!(table = %state.active_table, "form cancelled");
        }
        KeyCode::Enter => submit_form(state, runtime, view_data, internal_tx),
        KeyCode::Tab | KeyCode::Down => {
            view_data.form_field = (view_data.form_field as isize + 1).rem_euclid(field_count) as usize;
        }
        KeyCode::BackTab | KeyCode::Up => {
            view_data.form_field = (view_data.form_field as isize - 1).rem_euclid(field_count) as usize;
        }
        KeyCode::Left | KeyCode::Right => {
            let FieldKind::Choice(choices) = spec.kind else {
                return;
            };
            let step = if key.code == KeyCode::Left { -1 } else { 1 };
            let current = view_data
                .modal
                .form()
                .and_then(|form| form.field(spec.key))
                .and_then(|value| choices.iter().position(|choice| *choice == value))
                .unwrap_or(0) as isize;
            let next = (current + step).rem_euclid(choices.len().max(1) as isize) as usize;
            if let Some(choice) = choices.get(next) {
                view_data.modal.set_field(spec.key, choice);
            }
        }
        KeyCode::Backspace => {
            if spec.kind == FieldKind::Text {
                edit_text_field(view_data, spec.key, |value| {
                    value.pop();
                });
            }
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if spec.kind == FieldKind::Text {
                edit_text_field(view_data, spec.key, |value| value.push(ch));
            }
        }
        _ => {}
    }
}

fn edit_text_field(view_data: &mut ViewData, key: &str, edit: impl FnOnce(&mut String)) {
    let Some(mut value) = view_data.modal.form().and_then(|form| form.field(key)) else {
        return;
    };
    edit(&mut value);
    view_data.modal.set_field(key, &value);
}

fn submit_form<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let kind = state.active_table;
    let verb = view_data
        .modal
        .intent()
        .map_or("saved", FormIntent::verb);
    let specs = view_data.modal.form().map(FormState::field_specs);

    match view_data.modal.submit(|request| runtime.submit_form(request)) {
        SubmitOutcome::Saved(id) => {
            info!(table = %kind, id, verb, "form saved");
            state.dispatch(AppCommand::ExitToNav);
            emit_toast(
                state,
                internal_tx,
                format!("{} {id} {verb}", kind.noun()),
                ToastKind::Success,
            );
            reload_or_toast(state, runtime, view_data, internal_tx);
        }
        SubmitOutcome::Invalid(errors) => {
            let message = specs
                .and_then(|specs| errors.first_in(specs))
                .map_or_else(|| errors.to_string(), str::to_owned);
            if let Some(index) = specs.and_then(|specs| {
                specs.iter().position(|spec| errors.contains(spec.key))
            }) {
                view_data.form_field = index;
            }
            emit_toast(state, internal_tx, message, ToastKind::Error);
        }
        SubmitOutcome::Failed(message) => {
            emit_toast(
                state,
                internal_tx,
                format!("save failed: {message}"),
                ToastKind::Error,
            );
        }
        SubmitOutcome::NotOpen => {
            state.dispatch(AppCommand::ExitToNav);
        }
    }
}

fn handle_detail_key(state: &mut AppState, view_data: &mut ViewData, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
            view_data.detail.close();
            state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Char('j') | KeyCode::Down => view_data.detail.scroll_by(DETAIL_SCROLL_STEP),
        KeyCode::Char('k') | KeyCode::Up => view_data.detail.scroll_by(-DETAIL_SCROLL_STEP),
        _ => {}
    }
}

fn handle_confirm_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let kind = state.active_table;
    match key.code {
        KeyCode::Char('y' | 'Y') => {
            let outcome = view_data
                .delete
                .confirm(|ids| runtime.delete_records(kind, ids));
            state.dispatch(AppCommand::ExitToNav);
            match outcome {
                Some(Ok(removed)) => {
                    view_data.view_mut(kind).clear_selection();
                    let noun = kind.noun();
                    let plural = if removed == 1 { "" } else { "s" };
                    emit_toast(
                        state,
                        internal_tx,
                        format!("deleted {removed} {noun}{plural}"),
                        ToastKind::Success,
                    );
                    reload_or_toast(state, runtime, view_data, internal_tx);
                }
                Some(Err(error)) => {
                    let message = format!("{error:#}");
                    warn!(table = %kind, error = %message, "delete failed");
                    emit_toast(
                        state,
                        internal_tx,
                        format!("delete failed: {message}"),
                        ToastKind::Error,
                    );
                }
                None => {}
            }
        }
        KeyCode::Char('n' | 'N' | 'q') | KeyCode::Esc => {
            view_data.delete.cancel();
            state.dispatch(AppCommand::ExitToNav);
        }
        _ => {}
    }
}

fn reload_or_toast<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if let Err(error) = refresh_view_data(state, runtime, view_data) {
        let message = format!("{error:#}");
        warn!(table = %state.active_table, error = %message, "reload failed");
        emit_toast(
            state,
            internal_tx,
            format!("load failed: {message}"),
            ToastKind::Error,
        );
    }
}

fn refresh_view_data<R: AppRuntime>(
    state: &AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
) -> Result<()> {
    let table = state.active_table;
    view_data.references = runtime.references().context("load references")?;
    let snapshot = runtime
        .load_snapshot(table)
        .with_context(|| format!("load {table}"))?;
    debug!(table = %table, rows = snapshot.row_count(), "snapshot loaded");
    view_data.snapshot = Some(snapshot);
    reproject(state, view_data);
    Ok(())
}

fn reproject(state: &AppState, view_data: &mut ViewData) {
    let Some(snapshot) = view_data.snapshot.clone() else {
        view_data.page = PageModel::default();
        return;
    };
    if snapshot.kind() != state.active_table {
        view_data.page = PageModel::default();
        return;
    }
    let references = view_data.references.clone();
    let view = view_data.view_mut(snapshot.kind());
    let page = match &snapshot {
        TableSnapshot::BankAccounts(rows) => project_rows(view, rows, &references),
        TableSnapshot::BotSettings(rows) => project_rows(view, rows, &references),
        TableSnapshot::Calls(rows) => project_rows(view, rows, &references),
        TableSnapshot::EmailTemplates(rows) => project_rows(view, rows, &references),
        TableSnapshot::Exchanges(rows) => project_rows(view, rows, &references),
        TableSnapshot::Transactions(rows) => project_rows(view, rows, &references),
    };
    view_data.page = page;
}

fn project_rows<R: TableRecord>(
    view: &mut TableView,
    records: &[R],
    references: &References,
) -> PageModel {
    let page = view.project(records, references);
    let rows = page
        .rows
        .iter()
        .map(|record| PageRow {
            id: record.id().as_str().to_owned(),
            cells: R::KIND
                .columns()
                .iter()
                .map(|spec| record.cell(spec.key, references).display())
                .collect(),
        })
        .collect();
    PageModel {
        rows,
        page_index: page.page_index,
        page_count: page.page_count,
        total_matches: page.total_matches,
        total_records: page.total_records,
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = TableKind::ALL
        .iter()
        .position(|table| *table == state.active_table)
        .unwrap_or(0);
    let titles = TableKind::ALL
        .iter()
        .map(|table| table.label().to_owned())
        .collect::<Vec<_>>();
    let tabs = Tabs::new(titles)
        .block(Block::default().title("tradedesk").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    render_table(frame, layout[1], state, view_data);

    let (status, status_style) = match state.toast.current() {
        Some(toast) => (toast.message.clone(), toast_style(toast.kind)),
        None => (status_text(state, view_data), Style::default().fg(Color::Yellow)),
    };
    let status_widget = Paragraph::new(status)
        .style(status_style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    let overlay = match state.mode {
        AppMode::Filters => Some(("filters", render_filter_popup_text(state, view_data), 50, 50)),
        AppMode::Columns => Some(("columns", render_column_popup_text(state, view_data), 44, 70)),
        AppMode::Form(kind) => Some((
            kind.noun(),
            render_form_text(view_data),
            70,
            80,
        )),
        AppMode::Detail => Some(("detail", render_detail_text(view_data), 70, 80)),
        AppMode::ConfirmDelete => Some((
            "delete",
            render_confirm_text(state, view_data),
            50,
            30,
        )),
        AppMode::Help => Some(("help", help_overlay_text().to_owned(), 70, 70)),
        AppMode::Nav | AppMode::Search => None,
    };
    if let Some((title, text, width, height)) = overlay {
        let area = centered_rect(width, height, frame.area());
        frame.render_widget(Clear, area);
        let scroll = if state.mode == AppMode::Detail {
            view_data.detail.scroll()
        } else {
            0
        };
        let popup = Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0))
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Cyan)),
            );
        frame.render_widget(popup, area);
    }
}

fn toast_style(kind: ToastKind) -> Style {
    match kind {
        ToastKind::Success => Style::default().fg(Color::Green),
        ToastKind::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ToastKind::Info => Style::default().fg(Color::Cyan),
    }
}

fn render_table(frame: &mut ratatui::Frame<'_>, area: Rect, state: &AppState, view_data: &ViewData) {
    let kind = state.active_table;
    let Some(view) = view_data.view(kind) else {
        let empty = Paragraph::new("loading")
            .block(Block::default().borders(Borders::ALL).title(kind.label()));
        frame.render_widget(empty, area);
        return;
    };
    let title = table_title(kind, view, &view_data.page);

    let visible = view.columns.visible_keys();
    if visible.is_empty() {
        let placeholder = Paragraph::new("all columns hidden; press c to choose columns")
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(placeholder, area);
        return;
    }
    if view_data.page.rows.is_empty() {
        let message = if view_data.page.total_records == 0 {
            format!("no {} yet; press a to add one", kind.label())
        } else {
            "no records match the current search and filters".to_owned()
        };
        let placeholder =
            Paragraph::new(message).block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(placeholder, area);
        return;
    }

    let indices = visible
        .iter()
        .filter_map(|key| kind.columns().iter().position(|spec| spec.key == *key))
        .collect::<Vec<_>>();
    let cursor_column = view.cursor_column();

    let header_cells = std::iter::once(Cell::from(" ")).chain(indices.iter().map(|index| {
        let spec = &kind.columns()[*index];
        Cell::from(header_label(spec.key, spec.label, view)).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));
    let header = Row::new(header_cells);

    let rows = view_data.page.rows.iter().enumerate().map(|(row_index, row)| {
        let cursor_row = row_index == view.cursor_row();
        let mark = if view.is_selected(&row.id) {
            SELECTED_MARK
        } else {
            " "
        };
        let cells = std::iter::once(Cell::from(mark)).chain(indices.iter().map(|index| {
            let key = kind.columns()[*index].key;
            let text = row.cells.get(*index).cloned().unwrap_or_default();
            let mut style = Style::default();
            if view.is_selected(&row.id) {
                style = style.fg(Color::Yellow);
            }
            if cursor_row {
                style = style.bg(Color::DarkGray);
            }
            if cursor_row && cursor_column == Some(key) {
                style = Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD);
            }
            Cell::from(text).style(style)
        }));
        Row::new(cells.collect::<Vec<_>>())
    });

    let widths = std::iter::once(Constraint::Length(1))
        .chain(indices.iter().map(|_| Constraint::Min(6)))
        .collect::<Vec<_>>();
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn header_label(key: &str, label: &str, view: &TableView) -> String {
    match view.sort() {
        Some(sort) if sort.column == key => {
            let mark = match sort.direction {
                SortDirection::Asc => SORT_MARK_ASC,
                SortDirection::Desc => SORT_MARK_DESC,
            };
            format!("{label} {mark}")
        }
        _ => label.to_owned(),
    }
}

fn table_title(kind: TableKind, view: &TableView, page: &PageModel) -> String {
    let mut parts = vec![
        kind.label().to_owned(),
        format!("{}/{}", page.total_matches, page.total_records),
    ];
    if page.page_count > 0 {
        parts.push(format!("page {}/{}", page.page_index + 1, page.page_count));
    }
    parts.push(format!("{} per page", view.pager.page_size()));
    if !view.query().is_empty() {
        parts.push(format!("search \"{}\"", view.query()));
    }
    let filters = view
        .filters()
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>();
    if !filters.is_empty() {
        parts.push(filters.join(" "));
    }
    let selected = view.selected_ids().len();
    if selected > 0 {
        parts.push(format!("{selected} selected"));
    }
    let hidden = view.columns.hidden_count();
    if hidden > 0 {
        parts.push(format!("{hidden} hidden"));
    }
    parts.join(" | ")
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    match state.mode {
        AppMode::Search => {
            let query = view_data
                .view(state.active_table)
                .map_or("", TableView::query);
            format!("SEARCH | /{query}_ | enter keep | esc clear")
        }
        AppMode::Filters => "FILTERS | j/k filter | h/l choice | x clear | esc close".to_owned(),
        AppMode::Columns => "COLUMNS | j/k column | space toggle | A all | H none | esc close".to_owned(),
        AppMode::Form(_) => {
            "FORM | tab/shift+tab field | type to edit | left/right choice | enter save | esc cancel"
                .to_owned()
        }
        AppMode::Detail => "DETAIL | j/k scroll | esc close".to_owned(),
        AppMode::ConfirmDelete => "DELETE | y confirm | n cancel".to_owned(),
        AppMode::Help => "HELP | esc close".to_owned(),
        AppMode::Nav => {
            "NAV | tab table | j/k row | h/l col | n/p page | +/- size | s/S sort | / search | F filters | c cols | space select | a add | e edit | enter view | d delete | ? help | q quit"
                .to_owned()
        }
    }
}

fn render_filter_popup_text(state: &AppState, view_data: &ViewData) -> String {
    let kind = state.active_table;
    let Some(view) = view_data.view(kind) else {
        return String::new();
    };
    kind.filters()
        .iter()
        .enumerate()
        .map(|(index, spec)| {
            let marker = if index == view_data.filter_cursor { ">" } else { " " };
            let current = view.filters().get(spec.key);
            let options = std::iter::once(Choice::All.as_str().to_owned())
                .chain(spec.choices.iter().map(|choice| (*choice).to_owned()))
                .map(|option| {
                    if option == current.as_str() {
                        format!("[{option}]")
                    } else {
                        option
                    }
                })
                .collect::<Vec<_>>()
                .join(" ");
            format!("{marker} {}: {options}", spec.label)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_column_popup_text(state: &AppState, view_data: &ViewData) -> String {
    let kind = state.active_table;
    let Some(view) = view_data.view(kind) else {
        return String::new();
    };
    kind.columns()
        .iter()
        .enumerate()
        .map(|(index, spec)| {
            let marker = if index == view_data.column_cursor { ">" } else { " " };
            let check = if view.columns.is_visible(spec.key) { "x" } else { " " };
            format!("{marker} [{check}] {}", spec.label)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_form_text(view_data: &ViewData) -> String {
    let modal = &view_data.modal;
    let Some(form) = modal.form() else {
        return String::new();
    };
    let heading = match modal.intent() {
        Some(FormIntent::Edit(id)) => format!("edit {} {id}", form.kind().noun()),
        _ => format!("new {}", form.kind().noun()),
    };
    let mut lines = vec![heading, String::new()];
    for (index, spec) in form.field_specs().iter().enumerate() {
        let marker = if index == view_data.form_field { ">" } else { " " };
        let value = form.field(spec.key).unwrap_or_default();
        let shown = match spec.kind {
            FieldKind::Text if index == view_data.form_field => format!("{value}_"),
            FieldKind::Text => value,
            FieldKind::Choice(_) => format!("< {value} >"),
        };
        lines.push(format!("{marker} {}: {shown}", spec.label));
        if let Some(error) = modal.errors().and_then(|errors| errors.get(spec.key)) {
            lines.push(format!("    ! {error}"));
        }
    }
    if let Some(error) = modal.save_error() {
        lines.push(String::new());
        lines.push(format!("save failed: {error}"));
        lines.push("enter to retry, esc to cancel".to_owned());
    }
    lines.join("\n")
}

fn render_detail_text(view_data: &ViewData) -> String {
    let Some(id) = view_data.detail.record_id() else {
        return String::new();
    };
    let Some(rows) = view_data
        .snapshot
        .as_ref()
        .and_then(|snapshot| snapshot.detail(id, &view_data.references))
    else {
        return format!("{id} is no longer available");
    };
    let width = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    rows.iter()
        .map(|(label, value)| format!("{label:<width$}  {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_confirm_text(state: &AppState, view_data: &ViewData) -> String {
    let ids = view_data.delete.pending().unwrap_or_default();
    let noun = state.active_table.noun();
    match ids {
        [] => String::new(),
        [id] => format!("delete {noun} {id}?\n\ny confirm | n cancel"),
        many => format!(
            "delete {} {noun}s?\n{}\n\ny confirm | n cancel",
            many.len(),
            many.join(", ")
        ),
    }
}

fn help_overlay_text() -> &'static str {
    "tables: tab/shift+tab switch\n\
rows: j/k move | space select | enter detail\n\
columns: h/l move | s sort (again to flip) | S clear sort | c show/hide\n\
pages: n/p next/previous | +/- page size\n\
find: / search | F filters\n\
edit: a add | e edit | d delete selected or current\n\
form: tab/shift+tab field | left/right choice | enter save | esc cancel\n\
global: esc dismiss toast | ? help | q or ctrl+q quit"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
