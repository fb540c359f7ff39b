use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use progress::{
    encode_record_pretty, save_age_label, save_dir_from_env, FileStorage, LoadOutcome,
    ProgressStore, SaveRecord, SkillId, SAVE_KEY,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Show,
    Export,
    Clear,
    Path,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonOptions {
    /// Overrides `QUESTFOLIO_SAVE_DIR` and the `./saves` default.
    pub save_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Help,
    Run(CommandKind, CommonOptions),
}

pub fn parse_args(args: &[String]) -> Result<Invocation, String> {
    if args.is_empty() {
        return Err(usage_text());
    }
    if args[0] == "-h" || args[0] == "--help" {
        return Ok(Invocation::Help);
    }

    let mut options = CommonOptions::default();
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "--dir" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --dir".to_string())?;
                options.save_dir = Some(PathBuf::from(value));
                index += 2;
            }
            _ => break,
        }
    }

    let command = args
        .get(index)
        .ok_or_else(|| "missing subcommand".to_string())?
        .as_str();
    let kind = match command {
        "show" => CommandKind::Show,
        "export" => CommandKind::Export,
        "clear" => CommandKind::Clear,
        "path" => CommandKind::Path,
        other => return Err(format!("unknown subcommand '{other}'")),
    };
    if args.len() > index + 1 {
        return Err(format!("{command} takes no arguments"));
    }
    Ok(Invocation::Run(kind, options))
}

/// `show`, `export` and `path` never write; none of the commands create the
/// save directory.
pub fn run<W: Write>(kind: CommandKind, opts: CommonOptions, stdout: &mut W) -> Result<(), String> {
    let save_dir = match opts.save_dir {
        Some(dir) => dir,
        None => save_dir_from_env().map_err(|error| error.to_string())?,
    };
    let storage = FileStorage::new(save_dir);

    match kind {
        CommandKind::Path => {
            let path = storage
                .path_for_key(SAVE_KEY)
                .map_err(|error| error.to_string())?;
            emit(stdout, &path.display().to_string())
        }
        CommandKind::Show => {
            let (record, outcome) = ProgressStore::inspect(&storage);
            for line in summary_lines(&record, &outcome, Utc::now()) {
                emit(stdout, &line)?;
            }
            Ok(())
        }
        CommandKind::Export => {
            let (record, _) = ProgressStore::inspect(&storage);
            if !record.has_save() {
                return emit(stdout, "no save");
            }
            let json = encode_record_pretty(&record)
                .map_err(|error| format!("failed to encode save: {error}"))?;
            emit(stdout, &json)
        }
        CommandKind::Clear => {
            let mut store = ProgressStore::new(storage);
            store
                .clear_save()
                .map_err(|error| format!("failed to clear save: {error}"))?;
            emit(stdout, "save cleared")
        }
    }
}

pub fn summary_lines(record: &SaveRecord, outcome: &LoadOutcome, now: DateTime<Utc>) -> Vec<String> {
    let mut lines = Vec::new();
    if matches!(outcome, LoadOutcome::Recovered) {
        lines.push("warning: stored save was unreadable, showing defaults".to_string());
    }
    if !record.has_save() {
        lines.push("no save".to_string());
        return lines;
    }

    lines.push(format!(
        "last_screen: {}",
        record.last_screen().map(|s| s.as_str()).unwrap_or("none")
    ));
    lines.push(format!("visited: {}", join(record.visited_locations())));
    lines.push(format!("play_time: {}s", record.play_time_seconds()));
    lines.push(format!(
        "skills: {}/{} [{}]",
        record.discovered_skills().len(),
        SkillId::ALL.len(),
        join(record.discovered_skills())
    ));
    lines.push(format!(
        "achievements: [{}]",
        join(record.unlocked_achievements())
    ));
    lines.push(format!("first_visit: {}", timestamp(record.first_visit())));
    lines.push(format!(
        "last_save: {}",
        record
            .last_save()
            .map(timestamp)
            .unwrap_or_else(|| "never".to_string())
    ));
    lines.push(format!(
        "Continue • {}",
        save_age_label(record.last_save(), now)
    ));
    lines
}

fn join<'a, T, I>(items: I) -> String
where
    T: std::fmt::Display + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items
        .into_iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn emit<W: Write>(stdout: &mut W, line: &str) -> Result<(), String> {
    writeln!(stdout, "{line}").map_err(|error| format!("failed to write output: {error}"))
}

pub fn usage_text() -> String {
    [
        "save_cli - inspect a file-backed portfolio save",
        "",
        "Usage:",
        "  save_cli [--dir <path>] show",
        "  save_cli [--dir <path>] export",
        "  save_cli [--dir <path>] clear",
        "  save_cli [--dir <path>] path",
        "",
        "Defaults:",
        "  --dir $QUESTFOLIO_SAVE_DIR or ./saves",
    ]
    .join("\n")
}
