//! Interactive line commands driving one controller.

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use client_core::ViewStateController;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    task::JoinSet,
};
use tracing::{info, warn};

use crate::read_candidate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Open(PathBuf),
    Analyze,
    Reset,
    Tab(String),
    Help,
    Quit,
}

pub const HELP: &str = "commands: open <path> | analyze | reset | tab <description|symptoms|treatment> | help | quit";

pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let command = match (verb.to_ascii_lowercase().as_str(), rest) {
        ("open", "") => return Err("usage: open <path>".into()),
        ("open", path) => ShellCommand::Open(PathBuf::from(path)),
        ("analyze", _) => ShellCommand::Analyze,
        ("reset", _) => ShellCommand::Reset,
        ("tab", "") => return Err("usage: tab <description|symptoms|treatment>".into()),
        ("tab", name) => ShellCommand::Tab(name.to_string()),
        ("help" | "?", _) => ShellCommand::Help,
        ("quit" | "exit", _) => ShellCommand::Quit,
        (other, _) => return Err(format!("unknown command '{other}'; {HELP}")),
    };
    Ok(Some(command))
}

/// Reads commands until `quit` or end of input. Analysis runs in the
/// background so `reset` and `open` can supersede it; pending analyses are
/// awaited before returning.
pub async fn run_shell<R>(controller: Arc<ViewStateController>, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    println!("{HELP}");
    let mut lines = input.lines();
    let mut analyses = JoinSet::new();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        match command {
            ShellCommand::Open(path) => match read_candidate(&path).await {
                Ok(candidate) => {
                    if let Err(err) = controller.select_file(candidate).await {
                        println!("{err}");
                    }
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "could not read image");
                    println!("could not read {}: {err}", path.display());
                }
            },
            ShellCommand::Analyze => {
                let controller = Arc::clone(&controller);
                analyses.spawn(async move {
                    let outcome = controller.analyze().await;
                    info!(?outcome, "analyze finished");
                });
            }
            ShellCommand::Reset => controller.reset().await,
            ShellCommand::Tab(name) => {
                if let Err(err) = controller.switch_tab(&name).await {
                    println!("{err}");
                }
            }
            ShellCommand::Help => println!("{HELP}"),
            ShellCommand::Quit => break,
        }
    }

    while let Some(joined) = analyses.join_next().await {
        if let Err(err) = joined {
            warn!(error = %err, "analyze task failed");
        }
    }
    Ok(())
}
