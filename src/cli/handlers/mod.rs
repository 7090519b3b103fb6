mod notes;
pub use notes::{run_add, run_edit, run_list};

use std::sync::Arc;

use crate::cli::commands::*;
use crate::io::api::HttpNotesApi;
use crate::io::config_io;
use crate::io::logging::{LogSink, init_logging};
use crate::model::{AppConfig, NoteContext};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let config = load_config(&cli)?;

    let sink = match cli.command {
        Commands::Open(_) => LogSink::FileOnly,
        _ => LogSink::Stderr,
    };
    init_logging(&config.log, sink)
        .map_err(|e| format!("cannot open log file: {}", e))?;

    let api = HttpNotesApi::from_config(&config.api)?;
    let mut stdout = std::io::stdout();

    match cli.command {
        Commands::Open(args) => cmd_open(args, &config, api),
        Commands::List(args) => run_list(&config, &api, args, json, &mut stdout),
        Commands::Add(args) => run_add(&config, &api, args, json, &mut stdout),
        Commands::Edit(args) => run_edit(&config, &api, args, json, &mut stdout),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_config(cli: &Cli) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let mut config = config_io::load_config(cli.config.as_deref(), &cwd)?;
    config_io::apply_overrides(&mut config, cli.api_url.as_deref());
    Ok(config)
}

// ---------------------------------------------------------------------------
// Interactive
// ---------------------------------------------------------------------------

fn cmd_open(
    args: OpenArgs,
    config: &AppConfig,
    api: HttpNotesApi,
) -> Result<(), Box<dyn std::error::Error>> {
    let context = NoteContext::new(args.id_input, args.table_source);
    log::info!("opening notes modal for {}", context);
    crate::tui::run(config, context, Arc::new(api))
}
