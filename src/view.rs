//! Text rendering of the session: header, ratio selector, spinner, grid, input bar.
//!
//! Every function here is a pure function of its arguments.

use std::fmt::Write as _;

use crate::aspect::AspectRatioOption;
use crate::controller::Session;
use crate::messages::Messages;
use crate::output::decode_data_uri;

/// Tiles shown while loading with nothing to show yet.
const SKELETON_TILES: usize = 4;

/// Tiles per grid row.
const GRID_COLUMNS: usize = 2;

const TILE_WIDTH: usize = 24;

/// Static branding line.
#[must_use]
pub fn header() -> String {
    "== imagegrid :: Gemini image studio ==".to_string()
}

/// All options on one line, the selected one in brackets.
#[must_use]
pub fn aspect_selector(options: &[AspectRatioOption], selected: AspectRatioOption) -> String {
    options
        .iter()
        .map(|option| {
            if *option == selected {
                format!("[{}]", option.label)
            } else {
                format!(" {} ", option.label)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Loading indicator, empty when idle.
#[must_use]
pub fn spinner(loading: bool, messages: &Messages) -> String {
    if loading {
        format!("... {}", messages.loading)
    } else {
        String::new()
    }
}

/// Grid of numbered tiles, or skeleton tiles while loading an empty grid.
#[must_use]
pub fn image_grid(images: &[String], loading: bool) -> String {
    let tiles: Vec<String> = if images.is_empty() && loading {
        vec!["░".repeat(TILE_WIDTH - 2); SKELETON_TILES]
    } else {
        images.iter().enumerate().map(|(i, image)| tile_label(i, image)).collect()
    };

    let mut out = String::new();
    for row in tiles.chunks(GRID_COLUMNS) {
        let border: Vec<String> =
            row.iter().map(|_| format!("+{}+", "-".repeat(TILE_WIDTH - 2))).collect();
        let _ = writeln!(out, "{}", border.join(" "));
        let cells: Vec<String> =
            row.iter().map(|t| format!("|{t:^width$}|", width = TILE_WIDTH - 2)).collect();
        let _ = writeln!(out, "{}", cells.join(" "));
        let _ = writeln!(out, "{}", border.join(" "));
    }
    out
}

fn tile_label(index: usize, image: &str) -> String {
    match decode_data_uri(image) {
        Ok((mime, bytes)) => {
            let kind = mime.strip_prefix("image/").unwrap_or(&mime).to_string();
            format!("#{} {} {}", index + 1, kind, human_size(bytes.len()))
        }
        Err(_) => format!("#{} ?", index + 1),
    }
}

#[allow(clippy::cast_precision_loss)]
fn human_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}

/// Prompt line plus the actions available right now.
#[must_use]
pub fn input_bar(
    prompt: &str,
    loading: bool,
    listening: bool,
    dictation_available: bool,
    messages: &Messages,
) -> String {
    let mut line = format!("{}> {prompt}", messages.prompt_label);
    if listening {
        let _ = write!(line, "  ({})", messages.listening);
    }

    let mut hint = messages.actions_hint.to_string();
    if dictation_available {
        hint.push_str("  /dictate");
    }
    if loading {
        hint = format!("({hint})");
    }
    format!("{line}\n{hint}")
}

/// The whole screen for one session snapshot.
#[must_use]
pub fn render(
    session: &Session,
    options: &[AspectRatioOption],
    messages: &Messages,
    dictation_available: bool,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", header());
    let _ = writeln!(out, "{}", aspect_selector(options, session.aspect_ratio));
    if session.loading {
        let _ = writeln!(out, "{}", spinner(true, messages));
    }
    if let Some(error) = &session.error {
        let _ = writeln!(out, "! {error}");
    }
    out.push_str(&image_grid(&session.images, session.loading));
    out.push_str(&input_bar(
        &session.prompt,
        session.loading,
        session.listening,
        dictation_available,
        messages,
    ));
    out
}
