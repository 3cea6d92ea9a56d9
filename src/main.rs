//! Imagegrid - prompt-to-image grid for the terminal.

mod adapters;
mod aspect;
mod cassette;
mod cli;
mod config;
mod context;
mod controller;
mod error;
mod intent;
mod messages;
mod model;
mod output;
mod ports;
mod view;

use std::path::Path;
use std::process;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::aspect::{find_aspect_ratio, ASPECT_RATIOS};
use crate::cli::Cli;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::controller::{Command, Controller, GenerationSettings, RANDOM_PROMPT_INSTRUCTION};
use crate::error::ImageError;
use crate::intent::{parse_line, Intent, HELP};
use crate::messages::{Locale, Messages};
use crate::model::{detect_image_api, resolve_model, validate_text_model};
use crate::output::{request_mime_type, save_grid, validate_format};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("imagegrid=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), ImageError> {
    // Load config
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path).map_err(ImageError::Config)?;

    let locale = match cli.locale.as_deref() {
        Some(code) => Locale::from_code(code).ok_or_else(|| {
            ImageError::InvalidArgument(format!("Unsupported locale '{code}'. Valid: tr, en"))
        })?,
        None => config.defaults.locale,
    };
    let messages = Messages::for_locale(locale);

    // Resolve and validate parameters, CLI flags over config defaults
    let image_model = resolve_model(cli.model.as_deref().unwrap_or(&config.defaults.image_model));
    detect_image_api(&image_model).map_err(ImageError::InvalidArgument)?;
    let text_model =
        resolve_model(cli.text_model.as_deref().unwrap_or(&config.defaults.text_model));
    validate_text_model(&text_model).map_err(ImageError::InvalidArgument)?;

    let aspect_ratio = cli
        .aspect_ratio
        .as_deref()
        .or(config.defaults.aspect_ratio.as_deref())
        .map(find_aspect_ratio)
        .transpose()?;

    let format = cli.format.clone().unwrap_or_else(|| config.defaults.format.clone());
    validate_format(&format)?;

    let count = cli.count.unwrap_or(config.defaults.count);
    if !(1..=4).contains(&count) {
        return Err(ImageError::InvalidArgument(format!(
            "Unsupported image count {count}. Valid: 1-4"
        )));
    }

    if cli.verbose {
        eprintln!("Image model: {image_model}");
        eprintln!("Text model: {text_model}");
    }

    let settings = GenerationSettings {
        image_model,
        text_model,
        count,
        mime_type: request_mime_type(&format).to_string(),
        random_instruction: RANDOM_PROMPT_INSTRUCTION.to_string(),
    };

    // Create context based on mode (live / recording / replaying)
    let replay_path = std::env::var("IMAGEGRID_REPLAY").ok();
    let is_recording = std::env::var("IMAGEGRID_REC").is_ok_and(|v| v == "true" || v == "1");

    let (ctx, recording_session) = if let Some(ref cassette_path) = replay_path {
        if cli.verbose {
            eprintln!("Replaying from: {cassette_path}");
        }
        (ServiceContext::replaying(Path::new(cassette_path), &config)?, None)
    } else if is_recording {
        if cli.verbose {
            eprintln!("Recording mode enabled");
        }
        let (ctx, session) = ServiceContext::recording(&config)?;
        (ctx, Some(session))
    } else {
        (ServiceContext::live(&config)?, None)
    };

    let controller = Controller::new(ctx.gateway, ctx.dictation, settings, messages);
    if let Some(option) = aspect_ratio {
        controller.dispatch(Command::SelectAspectRatio(option)).await;
    }
    if let Some(prompt) = &cli.prompt {
        controller.dispatch(Command::SetPrompt(prompt.clone())).await;
    }

    let output_dir = Path::new(&cli.output_dir);
    let outcome = if cli.is_interactive() {
        interactive(&controller, output_dir, &format).await
    } else {
        let command = if cli.random { Command::Random } else { Command::Generate };
        one_shot(&controller, command, output_dir, &format).await
    };

    // The recorder is shared with the gateway inside the controller.
    drop(controller);
    if let Some(session) = recording_session {
        match session.finish() {
            Ok(path) => eprintln!("Cassette saved: {}", path.display()),
            Err(e) => eprintln!("Warning: failed to save cassette: {e}"),
        }
    }

    outcome
}

/// Run one workflow, show the result, and save the images.
async fn one_shot(
    controller: &Controller,
    command: Command,
    output_dir: &Path,
    format: &str,
) -> Result<(), ImageError> {
    controller.dispatch(command).await;

    let session = controller.session();
    eprintln!("{}", screen(controller, &session));
    if let Some(error) = session.error {
        return Err(ImageError::Workflow(error));
    }

    save(controller, output_dir, format)
}

/// Read input-bar lines from stdin until EOF or `/quit`.
async fn interactive(
    controller: &Controller,
    output_dir: &Path,
    format: &str,
) -> Result<(), ImageError> {
    eprintln!("{}", screen(controller, &controller.session()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let intent = match parse_line(&line) {
            Ok(intent) => intent,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        let workflow = intent.starts_workflow();
        match intent {
            Intent::Dispatch(commands) => {
                for command in commands {
                    if workflow {
                        run_with_progress(controller, command).await;
                    } else {
                        controller.dispatch(command).await;
                    }
                }
                eprintln!("{}", screen(controller, &controller.session()));
            }
            Intent::Save(dir) => {
                let dir = dir.as_deref().unwrap_or(output_dir);
                if let Err(e) = save(controller, dir, format) {
                    eprintln!("Error: {e}");
                }
            }
            Intent::Help => eprintln!("{HELP}"),
            Intent::Quit => break,
        }
    }
    Ok(())
}

/// Dispatch a command, redrawing whenever a loading state is published.
///
/// Input is not read while this runs, so no second workflow can start
/// before the current one settles.
async fn run_with_progress(controller: &Controller, command: Command) {
    let mut updates = controller.subscribe();
    let _ = updates.borrow_and_update();
    let workflow = controller.dispatch(command);
    tokio::pin!(workflow);

    loop {
        tokio::select! {
            () = &mut workflow => break,
            Ok(()) = updates.changed() => {}
        }
        let session = updates.borrow_and_update().clone();
        if session.loading {
            eprintln!("{}", screen(controller, &session));
        }
    }
}

fn save(controller: &Controller, dir: &Path, format: &str) -> Result<(), ImageError> {
    let session = controller.session();
    for path in save_grid(&session.images, &session.prompt, format, dir)? {
        eprintln!("Saved: {}", path.display());
    }
    Ok(())
}

fn screen(controller: &Controller, session: &controller::Session) -> String {
    view::render(session, &ASPECT_RATIOS, controller.messages(), controller.dictation_available())
}
