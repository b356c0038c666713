use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::ShellArgs,
    engine::{TableEngine, Trigger},
    input,
    paginate::{PageStep, RowsPerPage},
    table,
};

pub const PROMPT: &str = "> ";

const HELP: &str = "\
Commands:
  search [TEXT]   keep rows containing TEXT in any field (no TEXT clears the search)
  sort COLUMN     toggle sorting on COLUMN
  rows N          show N rows per page (10, 25, 50 or 100)
  next | prev     move one page forward or back
  show            print the current page again
  columns         list column names and labels
  help            print this message
  quit            leave the shell
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Apply(Trigger),
    Show,
    Columns,
    Help,
    Quit,
}

/// Parses one input line. `Ok(None)` means the line was blank.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let command = match word.to_ascii_lowercase().as_str() {
        "search" | "/" => ShellCommand::Apply(Trigger::Search(rest.to_string())),
        "sort" if rest.is_empty() => return Err("sort needs a column name".to_string()),
        "sort" => ShellCommand::Apply(Trigger::SortBy(rest.to_string())),
        "rows" => ShellCommand::Apply(Trigger::SetRowsPerPage(rest.parse::<RowsPerPage>()?)),
        "next" | "n" => ShellCommand::Apply(Trigger::GoToPage(PageStep::Next)),
        "prev" | "p" => ShellCommand::Apply(Trigger::GoToPage(PageStep::Previous)),
        "show" => ShellCommand::Show,
        "columns" => ShellCommand::Columns,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => return Err(format!("Unknown command '{other}'. Type 'help' for a list.")),
    };
    Ok(Some(command))
}

/// Drives `engine` from `input` until end of input or `quit`.
pub fn run_session<R: BufRead, W: Write>(
    engine: &mut TableEngine,
    input: R,
    output: &mut W,
) -> Result<usize> {
    write!(output, "{}", table::render_snapshot(&engine.snapshot()))?;
    let mut handled = 0;
    let mut lines = input.lines();
    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;
        let Some(line) = lines.next() else {
            writeln!(output)?;
            break;
        };
        let line = line.context("Reading shell command")?;
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writeln!(output, "{message}")?;
                continue;
            }
        };
        handled += 1;
        match command {
            ShellCommand::Apply(trigger) => {
                engine.apply(trigger);
                write!(output, "{}", table::render_snapshot(&engine.snapshot()))?;
            }
            ShellCommand::Show => {
                write!(output, "{}", table::render_snapshot(&engine.snapshot()))?
            }
            ShellCommand::Columns => match engine.schema() {
                Some(schema) => write!(output, "{}", table::render_columns(schema))?,
                None => writeln!(output, "{}", table::NO_DATA_MESSAGE)?,
            },
            ShellCommand::Help => write!(output, "{HELP}")?,
            ShellCommand::Quit => break,
        }
        output.flush()?;
    }
    Ok(handled)
}

pub fn execute(args: &ShellArgs) -> Result<()> {
    let (records, key_map) = input::load_source(&args.source)?;
    let mut engine = TableEngine::with_rows_per_page(args.rows);
    engine
        .ingest(&records, &key_map)
        .with_context(|| format!("Ingesting records from {:?}", args.source.input))?;

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    let handled = run_session(&mut engine, stdin.lock(), &mut stdout)?;
    info!("Shell closed after {handled} command(s)");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::FieldKeyMap;
    use serde_json::json;

    fn loaded_engine() -> TableEngine {
        let records: Vec<_> = (1..=12)
            .map(|n| {
                json!({"id": n, "name": format!("user{n:02}")})
                    .as_object()
                    .cloned()
                    .expect("object")
            })
            .collect();
        let mut engine = TableEngine::new();
        engine.ingest(&records, &FieldKeyMap::new()).expect("ingest");
        engine
    }

    #[test]
    fn parses_commands_and_arguments() {
        assert_eq!(
            parse_command("  sort  name "),
            Ok(Some(ShellCommand::Apply(Trigger::SortBy("name".into()))))
        );
        assert_eq!(
            parse_command("search"),
            Ok(Some(ShellCommand::Apply(Trigger::Search(String::new()))))
        );
        assert_eq!(
            parse_command("rows 50"),
            Ok(Some(ShellCommand::Apply(Trigger::SetRowsPerPage(RowsPerPage::Fifty))))
        );
        assert_eq!(parse_command(""), Ok(None));
        assert!(parse_command("rows 7").is_err());
        assert!(parse_command("sort").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[test]
    fn session_applies_commands_until_quit() {
        let mut engine = loaded_engine();
        let mut output = Vec::new();
        let script = "next\nbogus\nsort id\nquit\nnext\n";
        let handled = run_session(&mut engine, script.as_bytes(), &mut output).expect("session");
        assert_eq!(handled, 3);
        assert_eq!(engine.current_page_index(), 0);

        let text = String::from_utf8(output).expect("utf8");
        assert!(text.contains("Showing 11 to 12 of 12 entries"));
        assert!(text.contains("Unknown command 'bogus'"));
        assert!(text.contains("Id ▲"));
        assert_eq!(text.matches(PROMPT).count(), 4);
    }
}
