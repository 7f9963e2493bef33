//! Interactive converter session.
//!
//! Reads one command per line and applies it to a [`Session`]. Conversion
//! and note errors are printed inline and the loop carries on; only I/O
//! failures end the session early.

use super::{convert::render_conversion, rates::render_rates, ui};
use crate::core::config::AppConfig;
use crate::core::{Currency, CurrencyRateProvider, HistoryLog, NotesStore, Session};
use anyhow::{Context, Result, anyhow, bail};
use comfy_table::Cell;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

const HELP: &str = "\
Commands:
  convert <amount> [<from> <to>]  convert with the current or given currencies
  from <code>                     select the source currency
  to <code>                       select the target currency
  swap                            swap source and target
  rates                           show the loaded exchange rates
  refresh                         fetch exchange rates again
  history                         show recent conversions
  notes                           show notes
  note <text>                     save a note
  delete <id>                     delete a note
  help                            show this help
  quit                            leave the session";

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Convert {
        amount: String,
        pair: Option<(String, String)>,
    },
    From(Currency),
    To(Currency),
    Swap,
    Rates,
    Refresh,
    History,
    Notes,
    AddNote(String),
    DeleteNote(u64),
    Help,
    Quit,
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<SessionCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let args: Vec<&str> = rest.split_whitespace().collect();

    let command = match word.to_lowercase().as_str() {
        "convert" | "c" => match args.as_slice() {
            [amount] => SessionCommand::Convert {
                amount: amount.to_string(),
                pair: None,
            },
            [amount, from, to] => SessionCommand::Convert {
                amount: amount.to_string(),
                pair: Some((from.to_string(), to.to_string())),
            },
            _ => bail!("Usage: convert <amount> [<from> <to>]"),
        },
        "from" => SessionCommand::From(rest.parse()?),
        "to" => SessionCommand::To(rest.parse()?),
        "swap" => SessionCommand::Swap,
        "rates" => SessionCommand::Rates,
        "refresh" => SessionCommand::Refresh,
        "history" => SessionCommand::History,
        "notes" => SessionCommand::Notes,
        "note" => SessionCommand::AddNote(rest.to_string()),
        "delete" | "rm" => SessionCommand::DeleteNote(
            rest.parse()
                .map_err(|_| anyhow!("Usage: delete <id>"))?,
        ),
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" | "q" => SessionCommand::Quit,
        other => bail!("Unknown command '{}'. Type 'help' for a list of commands.", other),
    };
    Ok(Some(command))
}

pub fn render_history(history: &HistoryLog) -> String {
    if history.is_empty() {
        return ui::style_text("No conversion history yet", ui::StyleType::Subtle);
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell("Conversion"),
        ui::header_cell("Rate"),
        ui::header_cell("Time"),
    ]);
    for entry in history.list() {
        table.add_row(vec![
            Cell::new(entry.id),
            Cell::new(format!(
                "{} {} = {:.2} {}",
                entry.amount, entry.from, entry.result.converted_amount, entry.to
            )),
            ui::number_cell(format!("{:.4}", entry.result.display_rate)),
            Cell::new(entry.created_at.format("%Y-%m-%d %H:%M:%S")),
        ]);
    }
    table.to_string()
}

pub fn render_notes(notes: &NotesStore) -> String {
    if notes.is_empty() {
        return ui::style_text("No notes yet", ui::StyleType::Subtle);
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("ID"), ui::header_cell("Note")]);
    for note in notes.list() {
        table.add_row(vec![Cell::new(note.id), Cell::new(&note.text)]);
    }
    table.to_string()
}

fn render_selection(session: &Session) -> String {
    let (from, to) = session.selection();
    let rate = session
        .display_rate()
        .map_or("N/A".to_string(), |r| format!("{r:.4}"));
    format!("{from} -> {to} (1 {from} = {rate} {to})")
}

fn print_error<W: Write>(output: &mut W, message: &str) -> Result<()> {
    writeln!(output, "{}", ui::style_text(message, ui::StyleType::Error))?;
    Ok(())
}

/// Applies one command. Returns `false` when the session should end.
pub async fn execute<W: Write>(
    session: &mut Session,
    provider: &dyn CurrencyRateProvider,
    command: SessionCommand,
    output: &mut W,
) -> Result<bool> {
    debug!(?command, "Executing session command");
    match command {
        SessionCommand::Convert { amount, pair } => {
            let result = match pair {
                Some((from, to)) => session.convert_between(&amount, &from, &to),
                None => session.convert(&amount),
            };
            match result {
                Ok(entry) => writeln!(output, "{}", render_conversion(&entry))?,
                Err(e) => print_error(output, &e.to_string())?,
            }
        }
        SessionCommand::From(currency) => {
            session.select_from(currency);
            writeln!(output, "{}", render_selection(session))?;
        }
        SessionCommand::To(currency) => {
            session.select_to(currency);
            writeln!(output, "{}", render_selection(session))?;
        }
        SessionCommand::Swap => {
            session.swap();
            writeln!(output, "{}", render_selection(session))?;
        }
        SessionCommand::Rates => match session.current_rates() {
            Some(table) => writeln!(output, "{}", render_rates(table))?,
            None => print_error(
                output,
                "Exchange rates are unavailable. Type 'refresh' to try again.",
            )?,
        },
        SessionCommand::Refresh => match super::load_rates(session, provider).await {
            Ok(()) => writeln!(output, "Exchange rates updated")?,
            Err(e) => print_error(output, &e.to_string())?,
        },
        SessionCommand::History => writeln!(output, "{}", render_history(session.history()))?,
        SessionCommand::Notes => writeln!(output, "{}", render_notes(session.notes()))?,
        SessionCommand::AddNote(text) => match session.add_note(&text) {
            Some(note) => writeln!(output, "Saved note {}", note.id)?,
            None => print_error(output, "Note is empty")?,
        },
        SessionCommand::DeleteNote(id) => match session.remove_note(id) {
            Some(note) => writeln!(output, "Deleted note {}", note.id)?,
            None => print_error(output, &format!("No note with id {id}"))?,
        },
        SessionCommand::Help => writeln!(output, "{HELP}")?,
        SessionCommand::Quit => return Ok(false),
    }
    Ok(true)
}

/// Runs the command loop until `quit` or end of input.
pub async fn run_with_io<R, W>(
    session: &mut Session,
    provider: &dyn CurrencyRateProvider,
    input: R,
    output: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    loop {
        write!(output, "> ")?;
        output.flush()?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            writeln!(output)?;
            break;
        };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                print_error(output, &e.to_string())?;
                continue;
            }
        };

        if !execute(session, provider, command, output).await? {
            break;
        }
    }
    Ok(())
}

pub async fn run(config: &AppConfig, provider: &dyn CurrencyRateProvider) -> Result<()> {
    let mut session = Session::new(
        config.defaults.from,
        config.defaults.to,
        config.history_capacity,
    );
    let mut stdout = std::io::stdout();

    writeln!(
        stdout,
        "{}",
        ui::style_text("DiiFlip currency converter", ui::StyleType::Title)
    )?;
    if let Err(e) = super::load_rates(&mut session, provider).await {
        print_error(&mut stdout, &e.to_string())?;
    }
    writeln!(stdout, "{}", render_selection(&session))?;
    writeln!(stdout, "Type 'help' for a list of commands.")?;

    let input = BufReader::new(tokio::io::stdin());
    run_with_io(&mut session, provider, input, &mut stdout).await
}
