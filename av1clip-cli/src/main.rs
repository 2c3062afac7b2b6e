// av1clip: create AV1/Opus .webm clips by driving mpv, SvtAv1EncApp and
// ffmpeg as external tools. This binary only parses arguments, sets up
// logging and interrupt cleanup, and hands off to av1clip-core.

use std::process::ExitCode;

use clap::Parser;
use console::style;

mod cli;

use cli::Cli;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Cli::parse();
    let config = match args.into_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{} {err}", style("error:").red().bold());
            return ExitCode::FAILURE;
        }
    };

    // Intermediate artifacts live in a session directory that must not
    // outlive the process, interrupts included. The running external tool
    // shares our foreground process group and receives the same SIGINT.
    let session = match av1clip_core::create_session_dir() {
        Ok(session) => session,
        Err(err) => {
            eprintln!("{} {err}", style("error:").red().bold());
            return ExitCode::FAILURE;
        }
    };
    let cleanup_path = session.path().to_path_buf();
    let handler = ctrlc::set_handler(move || {
        let _ = std::fs::remove_dir_all(&cleanup_path);
        // 130 = terminated by SIGINT
        std::process::exit(130);
    });
    if let Err(err) = handler {
        log::warn!("Could not install interrupt handler: {err}");
    }

    match av1clip_core::run_clip_in(&config, session.path()) {
        Ok(outcome) => {
            if outcome.burned_subtitles {
                log::debug!("Subtitles were burned into the video");
            }
            println!(
                "{} {}",
                style("Encode complete:").green().bold(),
                outcome.output_path.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{} {err}", style("error:").red().bold());
            ExitCode::FAILURE
        }
    }
}
