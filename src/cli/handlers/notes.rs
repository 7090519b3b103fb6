use std::io::Write;

use chrono::Local;

use crate::cli::commands::{AddArgs, EditArgs, ListArgs};
use crate::cli::output::{format_group_listing, groups_to_json, submit_to_json};
use crate::io::api::NotesApi;
use crate::io::worker::drive;
use crate::model::{AppConfig, NoteContext};
use crate::ops::modal::{NoteModal, SubmitOutcome};
use crate::ops::notify::Notice;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Open a modal on the record and wait for its first load. Returns the
/// load failure, if any, alongside the modal.
fn open_loaded<A: NotesApi + ?Sized>(
    config: &AppConfig,
    api: &A,
    context: NoteContext,
) -> (NoteModal, Option<String>) {
    let mut modal = NoteModal::new(&config.people);
    modal.open(context);
    drive(&mut modal, api);
    let load_error = modal
        .take_notices()
        .into_iter()
        .find(Notice::is_error)
        .map(|n| n.text());
    (modal, load_error)
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

pub fn run_list<A: NotesApi + ?Sized>(
    config: &AppConfig,
    api: &A,
    args: ListArgs,
    json: bool,
    out: &mut dyn Write,
) -> CmdResult {
    let context = NoteContext::new(
        args.id_input,
        args.table_source.clone().unwrap_or_default(),
    );
    let (modal, load_error) = open_loaded(config, api, context);
    if let Some(text) = load_error {
        return Err(text.into());
    }

    let groups: Vec<_> = modal
        .store()
        .groups()
        .into_iter()
        .filter(|g| {
            args.table_source
                .as_deref()
                .is_none_or(|ts| g.table_source == ts)
        })
        .collect();

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&groups_to_json(&groups))?)?;
    } else {
        for line in format_group_listing(&groups, &Local) {
            writeln!(out, "{}", line)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// add / edit
// ---------------------------------------------------------------------------

pub fn run_add<A: NotesApi + ?Sized>(
    config: &AppConfig,
    api: &A,
    args: AddArgs,
    json: bool,
    out: &mut dyn Write,
) -> CmdResult {
    let context = NoteContext::new(args.id_input, args.table_source);
    let (mut modal, load_error) = open_loaded(config, api, context);
    if let Some(text) = load_error {
        eprintln!("warning: {}", text);
    }

    set_title(&mut modal, &args.title);
    modal.content_mut().set(&args.content);
    choose_creator(&mut modal, &args.created_by)?;
    modal.pin_mut().set(&args.pin);

    submit_and_report(&mut modal, api, json, out)
}

pub fn run_edit<A: NotesApi + ?Sized>(
    config: &AppConfig,
    api: &A,
    args: EditArgs,
    json: bool,
    out: &mut dyn Write,
) -> CmdResult {
    let context = NoteContext::new(args.id_input, args.table_source);
    let (mut modal, load_error) = open_loaded(config, api, context);
    if let Some(text) = load_error {
        return Err(text.into());
    }

    if !modal.begin_edit(&args.note_id) {
        return Err(format!("note not found: {}", args.note_id).into());
    }
    if let Some(title) = &args.title {
        set_title(&mut modal, title);
    }
    if let Some(content) = &args.content {
        modal.content_mut().set(content);
    }
    if let Some(name) = &args.created_by {
        choose_creator(&mut modal, name)?;
    }
    modal.pin_mut().set(&args.pin);

    submit_and_report(&mut modal, api, json, out)
}

fn set_title(modal: &mut NoteModal, title: &str) {
    modal.edit_title(|field| field.set(title));
    modal.dismiss_mentions();
}

fn choose_creator(modal: &mut NoteModal, name: &str) -> CmdResult {
    if modal.select_creator(Some(name)) {
        return Ok(());
    }
    Err(format!(
        "unknown creator '{}' (expected one of: {})",
        name,
        modal.creators().join(", ")
    )
    .into())
}

/// Run the PIN check and write, then print what happened.
///
/// Success is decided by the write alone; a failed reload afterwards is
/// only a warning.
fn submit_and_report<A: NotesApi + ?Sized>(
    modal: &mut NoteModal,
    api: &A,
    json: bool,
    out: &mut dyn Write,
) -> CmdResult {
    modal.submit();
    drive(modal, api);
    let notices = modal.take_notices();
    let failure = match modal.take_outcome() {
        Some(SubmitOutcome::Saved) => None,
        Some(SubmitOutcome::Failed(text)) => Some(text),
        None => Some("submission did not complete".to_string()),
    };

    if json {
        let report = submit_to_json(failure.is_none(), &notices);
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        for notice in &notices {
            if !notice.is_error() {
                writeln!(out, "{}", notice.text())?;
            } else if failure.as_deref() != Some(notice.text().as_str()) {
                eprintln!("warning: {}", notice.text());
            }
        }
    }

    match failure {
        Some(text) => Err(text.into()),
        None => Ok(()),
    }
}
