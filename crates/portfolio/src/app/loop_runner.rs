use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::time::Instant;

use progress::SaveStorage;
use tracing::{error, info};

use super::bootstrap::AppWiring;
use super::console::{CommandConsole, ParsedCommand};
use super::session::{Session, SessionControl};

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let console = CommandConsole::new();
    let stdin = io::stdin();
    let stdout = io::stdout();
    match run_session(app.session, &console, stdin.lock(), stdout.lock()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "session_io_failed");
            ExitCode::FAILURE
        }
    }
}

/// Processes one command per input line until `quit` or end of input.
///
/// Wall time between lines is credited to the play clock before each command.
pub(crate) fn run_session<S, R, W>(
    mut session: Session<S>,
    console: &CommandConsole,
    input: R,
    mut output: W,
) -> io::Result<Session<S>>
where
    S: SaveStorage,
    R: BufRead,
    W: Write,
{
    write_lines(&mut output, session.drain_output())?;
    let mut last_input = Instant::now();

    for line in input.lines() {
        let line = line?;
        let now = Instant::now();
        session.advance_wall_time(now.saturating_duration_since(last_input));
        last_input = now;

        let control = match console.parse_line(&line) {
            Ok(None) => SessionControl::Continue,
            Ok(Some(ParsedCommand::Help)) => {
                write_lines(&mut output, console.help_lines())?;
                SessionControl::Continue
            }
            Ok(Some(ParsedCommand::Session(command))) => session.apply(command),
            Err(message) => {
                writeln!(output, "{message}")?;
                SessionControl::Continue
            }
        };
        write_lines(&mut output, session.drain_output())?;
        output.flush()?;

        if control == SessionControl::Quit {
            break;
        }
    }

    session.shutdown();
    info!(
        has_save = session.store().has_save(),
        play_time_seconds = session.store().record().play_time_seconds(),
        "session_ended"
    );
    Ok(session)
}

fn write_lines<W: Write>(output: &mut W, lines: Vec<String>) -> io::Result<()> {
    for line in lines {
        writeln!(output, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use progress::{FileStorage, MemoryStorage, PlayClock, ProgressStore, ScreenId};
    use std::io::Cursor;

    fn run_script<S: SaveStorage>(store: ProgressStore<S>, script: &str) -> (Session<S>, String) {
        let session = Session::new(store, PlayClock::default());
        let mut output = Vec::new();
        let session = run_session(
            session,
            &CommandConsole::new(),
            Cursor::new(script.to_string()),
            &mut output,
        )
        .expect("run session");
        (session, String::from_utf8(output).expect("utf8"))
    }

    #[test]
    fn script_drives_store_and_reports_errors() {
        let script = "\
# visit the forest
location forest
skill ux
skill ux
fly away
quit
enter tower
";
        let (session, output) = run_script(ProgressStore::new(MemoryStorage::new()), script);

        assert_eq!(session.active_screen(), ScreenId::Forest);
        assert_eq!(session.store().skill_progress(), (1, 5));
        assert_eq!(output.matches("Skills discovered: 1/5").count(), 1);
        assert!(output.contains("error: unknown command 'fly'. try: help"));
    }

    #[test]
    fn play_time_survives_quit_and_end_of_input() {
        let temp = tempfile::tempdir().expect("tempdir");

        run_script(
            ProgressStore::open(FileStorage::new(temp.path())).0,
            "enter forest\ntick 250\nback_to_menu\nquit\n",
        );
        let reopened = ProgressStore::open(FileStorage::new(temp.path())).0;
        assert_eq!(reopened.record().play_time_seconds(), 250);

        run_script(reopened, "tick 20\n");
        let reopened = ProgressStore::open(FileStorage::new(temp.path())).0;
        assert_eq!(reopened.record().play_time_seconds(), 270);
    }

    #[test]
    fn help_prints_registered_commands() {
        let (_, output) = run_script(ProgressStore::new(MemoryStorage::new()), "help\n");
        assert!(output.starts_with("help - List commands\n"));
    }

    #[test]
    fn progress_persists_across_sessions_on_disk() {
        let temp = tempfile::tempdir().expect("tempdir");

        let (_, _) = run_script(
            ProgressStore::open(FileStorage::new(temp.path())).0,
            "enter dungeon\nback_to_menu\nquit\n",
        );
        let (session, output) = run_script(
            ProgressStore::open(FileStorage::new(temp.path())).0,
            "continue\n",
        );

        assert!(output.starts_with("Continue • "));
        assert_eq!(session.active_screen(), ScreenId::Dungeon);
        assert!(output.contains("Achievement Unlocked! 👣 First Steps"));
    }
}
