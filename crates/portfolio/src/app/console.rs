use std::collections::HashMap;

use progress::{ScreenId, SkillId};

use super::session::SessionCommand;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ParsedCommand {
    Help,
    Session(SessionCommand),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CommandParseError {
    reason: String,
    usage: String,
}

impl CommandParseError {
    fn new(reason: impl Into<String>, usage: &str) -> Self {
        Self {
            reason: reason.into(),
            usage: usage.to_string(),
        }
    }
}

type ParseFn = fn(&[String]) -> Result<ParsedCommand, CommandParseError>;

struct CommandSpec {
    name: &'static str,
    help: &'static str,
    arg_schema: &'static str,
    parse: ParseFn,
}

/// Line-oriented front end that turns user input into session commands.
pub(crate) struct CommandConsole {
    specs: Vec<CommandSpec>,
    lookup_by_lower_name: HashMap<String, usize>,
}

impl CommandConsole {
    pub(crate) fn new() -> Self {
        let mut console = Self {
            specs: Vec::new(),
            lookup_by_lower_name: HashMap::new(),
        };
        console.register("help", "List commands", "", parse_help);
        console.register(
            "enter",
            "Show a screen and record progress",
            "<screen>",
            parse_enter,
        );
        console.register(
            "location",
            "Click a world-map location",
            "<screen>",
            parse_location,
        );
        console.register("back_to_menu", "Return to the title screen", "", parse_back_to_menu);
        console.register("back_to_map", "Return to the world map", "", parse_back_to_map);
        console.register("skill", "Open a skill entry", "<skill>", parse_skill);
        console.register("continue", "Press the continue button", "", parse_continue);
        console.register("new_game", "Start from the world map", "", parse_new_game);
        console.register("save", "Save the active screen", "", parse_save);
        console.register("tick", "Advance play time", "[seconds:u64]", parse_tick);
        console.register("pause", "Stop counting play time", "", parse_pause);
        console.register("resume", "Count play time again", "", parse_resume);
        console.register("mute", "Toggle audio", "<on|off>", parse_mute);
        console.register("status", "Show progress summary", "", parse_status);
        console.register("skills", "List skills and discovery state", "", parse_skills);
        console.register(
            "achievements",
            "List achievements and unlock state",
            "",
            parse_achievements,
        );
        console.register("clear_save", "Delete all progress", "", parse_clear_save);
        console.register("quit", "End the session", "", parse_quit);
        console
    }

    fn register(
        &mut self,
        name: &'static str,
        help: &'static str,
        arg_schema: &'static str,
        parse: ParseFn,
    ) {
        self.lookup_by_lower_name
            .insert(name.to_ascii_lowercase(), self.specs.len());
        self.specs.push(CommandSpec {
            name,
            help,
            arg_schema,
            parse,
        });
    }

    /// `Ok(None)` for blank lines; `Err` carries a ready-to-print message.
    pub(crate) fn parse_line(&self, raw_line: &str) -> Result<Option<ParsedCommand>, String> {
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }

        let tokens =
            tokenize_line(trimmed).map_err(|reason| format!("error: {reason}. usage: help"))?;
        let Some((command_name, args)) = tokens.split_first() else {
            return Ok(None);
        };
        let spec = self
            .lookup_by_lower_name
            .get(&command_name.to_ascii_lowercase())
            .and_then(|index| self.specs.get(*index))
            .ok_or_else(|| format!("error: unknown command '{command_name}'. try: help"))?;

        (spec.parse)(args)
            .map(Some)
            .map_err(|error| format!("error: {}. usage: {}", error.reason, error.usage))
    }

    /// Help output follows registration order.
    pub(crate) fn help_lines(&self) -> Vec<String> {
        self.specs
            .iter()
            .map(|spec| {
                if spec.arg_schema.is_empty() {
                    format!("{} - {}", spec.name, spec.help)
                } else {
                    format!("{} {} - {}", spec.name, spec.arg_schema, spec.help)
                }
            })
            .collect()
    }
}

fn tokenize_line(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut pending = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                pending = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if pending {
                    tokens.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            _ => {
                current.push(ch);
                pending = true;
            }
        }
    }

    if in_quotes {
        return Err("unterminated quoted string".to_string());
    }
    if pending {
        tokens.push(current);
    }
    Ok(tokens)
}

fn parse_help(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "help")?;
    Ok(ParsedCommand::Help)
}

fn parse_enter(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    let screen = single_id::<ScreenId>(args, "enter <screen>")?;
    Ok(ParsedCommand::Session(SessionCommand::Enter(screen)))
}

fn parse_location(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    let screen = single_id::<ScreenId>(args, "location <screen>")?;
    Ok(ParsedCommand::Session(SessionCommand::Location(screen)))
}

fn parse_back_to_menu(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    simple(args, "back_to_menu", SessionCommand::BackToMenu)
}

fn parse_back_to_map(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    simple(args, "back_to_map", SessionCommand::BackToMap)
}

fn parse_skill(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    let skill = single_id::<SkillId>(args, "skill <skill>")?;
    Ok(ParsedCommand::Session(SessionCommand::Skill(skill)))
}

fn parse_continue(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    simple(args, "continue", SessionCommand::Continue)
}

fn parse_new_game(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    simple(args, "new_game", SessionCommand::NewGame)
}

fn parse_save(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    simple(args, "save", SessionCommand::Save)
}

fn parse_tick(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    let seconds = match args {
        [] => 1,
        [value] => value.parse::<u64>().map_err(|_| {
            CommandParseError::new(
                format!("invalid seconds '{value}' (expected u64)"),
                "tick [seconds]",
            )
        })?,
        _ => {
            return Err(CommandParseError::new(
                "expected at most one argument [seconds]",
                "tick [seconds]",
            ))
        }
    };
    Ok(ParsedCommand::Session(SessionCommand::Tick(seconds)))
}

fn parse_pause(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    simple(args, "pause", SessionCommand::Pause)
}

fn parse_resume(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    simple(args, "resume", SessionCommand::Resume)
}

fn parse_mute(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    let muted = match args {
        [value] if value.eq_ignore_ascii_case("on") => true,
        [value] if value.eq_ignore_ascii_case("off") => false,
        _ => {
            return Err(CommandParseError::new(
                "expected exactly one argument on|off",
                "mute <on|off>",
            ))
        }
    };
    Ok(ParsedCommand::Session(SessionCommand::Mute(muted)))
}

fn parse_status(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    simple(args, "status", SessionCommand::Status)
}

fn parse_skills(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    simple(args, "skills", SessionCommand::Skills)
}

fn parse_achievements(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    simple(args, "achievements", SessionCommand::Achievements)
}

fn parse_clear_save(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    simple(args, "clear_save", SessionCommand::ClearSave)
}

fn parse_quit(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    simple(args, "quit", SessionCommand::Quit)
}

fn simple(
    args: &[String],
    usage: &str,
    command: SessionCommand,
) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, usage)?;
    Ok(ParsedCommand::Session(command))
}

fn single_id<T>(args: &[String], usage: &str) -> Result<T, CommandParseError>
where
    T: std::str::FromStr<Err = progress::UnknownIdError>,
{
    match args {
        [value] => value
            .parse::<T>()
            .map_err(|error| CommandParseError::new(error.to_string(), usage)),
        _ => Err(CommandParseError::new(
            "expected exactly one argument",
            usage,
        )),
    }
}

fn require_no_args(args: &[String], usage: &str) -> Result<(), CommandParseError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(CommandParseError::new("unexpected extra arguments", usage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Option<ParsedCommand>, String> {
        CommandConsole::new().parse_line(line)
    }

    #[test]
    fn help_lists_commands_in_registration_order() {
        let lines = CommandConsole::new().help_lines();

        assert_eq!(lines[0], "help - List commands");
        assert_eq!(lines[1], "enter <screen> - Show a screen and record progress");
        assert_eq!(lines[2], "location <screen> - Click a world-map location");
        assert_eq!(lines.last().map(String::as_str), Some("quit - End the session"));
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        assert_eq!(parse("   "), Ok(None));
        assert_eq!(parse("# warm-up"), Ok(None));
    }

    #[test]
    fn command_names_are_case_insensitive() {
        assert_eq!(
            parse("ENTER forest"),
            Ok(Some(ParsedCommand::Session(SessionCommand::Enter(
                ScreenId::Forest
            ))))
        );
    }

    #[test]
    fn unknown_command_reports_clear_error() {
        assert_eq!(
            parse("fly tower"),
            Err("error: unknown command 'fly'. try: help".to_string())
        );
    }

    #[test]
    fn unknown_skill_reports_usage_hint() {
        assert_eq!(
            parse("skill cooking"),
            Err(
                "error: unknown skill id 'cooking' (expected one of: frontend|backend|ux|leadership|devops). usage: skill <skill>"
                    .to_string()
            )
        );
    }

    #[test]
    fn tick_defaults_to_one_second() {
        assert_eq!(
            parse("tick"),
            Ok(Some(ParsedCommand::Session(SessionCommand::Tick(1))))
        );
        assert_eq!(
            parse("tick 30"),
            Ok(Some(ParsedCommand::Session(SessionCommand::Tick(30))))
        );
        assert!(parse("tick soon").is_err());
    }

    #[test]
    fn mute_accepts_on_and_off() {
        assert_eq!(
            parse("mute ON"),
            Ok(Some(ParsedCommand::Session(SessionCommand::Mute(true))))
        );
        assert!(parse("mute maybe").is_err());
    }

    #[test]
    fn extra_arguments_are_rejected() {
        assert_eq!(
            parse("continue now"),
            Err("error: unexpected extra arguments. usage: continue".to_string())
        );
    }

    #[test]
    fn tokenizer_handles_quotes_and_errors() {
        assert_eq!(
            tokenize_line("enter \"world-map\"  ").expect("tokens"),
            vec!["enter", "world-map"]
        );
        assert_eq!(tokenize_line("a \"\" b").expect("tokens"), vec!["a", "", "b"]);
        assert!(tokenize_line("enter \"oops").is_err());
    }
}
