//! Local terminal front-end.
//!
//! # Responsibility
//! - Drive the note service directly against a local JSON file.
//! - Keep output plain text so it can be piped and diffed.

mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use todonote_core::{
    core_version, init_logging, ping, JsonFileNoteRepository, LoggingConfig, NoteId, NoteService,
    NoteView,
};

#[derive(Debug, Parser)]
#[command(name = "todonote", version, about = "Personal to-do notes")]
struct Cli {
    /// JSON document holding every note.
    #[arg(long, env = "TODONOTE_DATA_FILE", default_value = "data.json")]
    data_file: PathBuf,

    /// Write rolling logs to this absolute directory.
    #[arg(long, env = "TODONOTE_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Log level used with --log-dir.
    #[arg(long, default_value_t = todonote_core::default_log_level().to_string())]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add a new active note.
    Add {
        title: String,
        #[arg(long, default_value = "")]
        body: String,
    },
    /// List notes in one view.
    List {
        #[arg(long, default_value = "active")]
        view: NoteView,
    },
    /// Show one note.
    Show { id: NoteId },
    /// Edit title and/or body.
    Edit {
        id: NoteId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
    },
    /// Mark a note as completed.
    Complete { id: NoteId },
    /// Move a completed note back to active.
    Uncomplete { id: NoteId },
    /// Soft-delete a note.
    Delete { id: NoteId },
    /// Restore a soft-deleted note.
    Restore { id: NoteId },
    /// Permanently remove a soft-deleted note.
    Purge { id: NoteId },
    /// Show the change history of a note.
    History { id: NoteId },
    /// Print core linkage info.
    Ping,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(log_dir) = &cli.log_dir {
        init_logging(&LoggingConfig::new(cli.log_level.clone(), log_dir.clone()))
            .map_err(anyhow::Error::msg)
            .context("failed to initialize logging")?;
    }

    info!(
        "event=cli_start module=cli status=ok data_file={}",
        cli.data_file.display()
    );
    let service = NoteService::new(JsonFileNoteRepository::new(&cli.data_file));
    let output = run(&service, cli.command)?;
    print!("{output}");
    Ok(())
}

fn run(service: &NoteService<JsonFileNoteRepository>, command: Command) -> Result<String> {
    let output = match command {
        Command::Add { title, body } => {
            let note = service.create(&title, body)?;
            format!("Created {}\n", note.id)
        }
        // Listing never fails: an unreadable file shows as an empty list.
        Command::List { view } => render::render_list(&service.list_or_empty(view), view),
        Command::Show { id } => render::render_note(&service.get(&id)?),
        Command::Edit { id, title, body } => {
            let before = service.get(&id)?.history.len();
            let note = service.update(&id, title.as_deref(), body.as_deref())?;
            if note.history.len() > before {
                format!("Updated {id}\n")
            } else {
                format!("No changes to {id}\n")
            }
        }
        Command::Complete { id } => {
            service.set_completed(&id, true)?;
            format!("Completed {id}\n")
        }
        Command::Uncomplete { id } => {
            service.set_completed(&id, false)?;
            format!("Marked {id} active\n")
        }
        Command::Delete { id } => {
            service.soft_delete(&id)?;
            format!("Deleted {id}\n")
        }
        Command::Restore { id } => {
            let note = service.restore(&id)?;
            format!("Restored {id} to {}\n", note.state())
        }
        Command::Purge { id } => {
            service.purge(&id)?;
            format!("Purged {id}\n")
        }
        Command::History { id } => render::render_history(&service.get(&id)?),
        Command::Ping => format!("todonote_core ping={} version={}\n", ping(), core_version()),
    };
    Ok(output)
}
