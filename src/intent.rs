//! Parsing of interactive input-bar lines into intents.

use std::path::PathBuf;

use crate::aspect::find_aspect_ratio;
use crate::controller::Command;
use crate::error::ImageError;

/// What one line of interactive input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Controller commands to dispatch, in order.
    Dispatch(Vec<Command>),
    /// Save the current grid, optionally into a specific directory.
    Save(Option<PathBuf>),
    /// Show the command list.
    Help,
    /// End the session.
    Quit,
}

impl Intent {
    /// Whether this intent starts a network workflow.
    #[must_use]
    pub fn starts_workflow(&self) -> bool {
        match self {
            Self::Dispatch(commands) => {
                commands.iter().any(|c| matches!(c, Command::Generate | Command::Random))
            }
            _ => false,
        }
    }
}

/// Help text for interactive mode.
pub const HELP: &str = "\
<text>          set the prompt and generate
<empty line>    generate from the current prompt
/random         generate from a random idea
/ratio <token>  select aspect ratio (1:1, 9:16, 3:4, 16:9, 4:3)
/dictate        start or stop dictation
/save [dir]     save the current images
/help           show this list
/quit           exit";

/// Parse one input line.
///
/// # Errors
///
/// Returns an error for unknown slash commands and invalid arguments.
pub fn parse_line(line: &str) -> Result<Intent, ImageError> {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix('/') else {
        if trimmed.is_empty() {
            return Ok(Intent::Dispatch(vec![Command::Generate]));
        }
        return Ok(Intent::Dispatch(vec![
            Command::SetPrompt(trimmed.to_string()),
            Command::Generate,
        ]));
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name.to_ascii_lowercase().as_str() {
        "random" | "rastgele" => Ok(Intent::Dispatch(vec![Command::Random])),
        "ratio" | "oran" => {
            let option = find_aspect_ratio(arg)?;
            Ok(Intent::Dispatch(vec![Command::SelectAspectRatio(option)]))
        }
        "dictate" | "mic" => Ok(Intent::Dispatch(vec![Command::ToggleDictation])),
        "save" => Ok(Intent::Save((!arg.is_empty()).then(|| PathBuf::from(arg)))),
        "help" | "?" => Ok(Intent::Help),
        "quit" | "exit" | "q" => Ok(Intent::Quit),
        other => Err(ImageError::InvalidArgument(format!(
            "Unknown command '/{other}'. Type /help for the list."
        ))),
    }
}
