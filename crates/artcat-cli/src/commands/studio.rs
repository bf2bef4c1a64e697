use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::thread;

use anyhow::Result;
use artcat_core::config::expand_tilde;
use artcat_core::encode;
use artcat_core::models::{AnalysisStatus, PreviewHandle};
use artcat_core::session::{Resolution, Session};
use artcat_core::worker::{self, Completion};
use colored::Colorize;

use super::{GENERIC_FAILURE, backend_for_request, load_config};
use crate::render;

/// Everything the studio loop reacts to arrives on one channel.
enum Event {
    Line(String),
    Eof,
    Done(Completion),
}

#[derive(Debug, PartialEq)]
enum Command {
    Quit,
    Reset,
    Status,
    Help,
    Select(PathBuf),
    Nothing,
}

fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    match trimmed {
        "" => Command::Nothing,
        "q" | "quit" | "exit" => Command::Quit,
        "r" | "reset" => Command::Reset,
        "s" | "status" => Command::Status,
        "h" | "help" | "?" => Command::Help,
        _ => {
            // Terminals quote dropped paths that contain spaces
            let unquoted = trimmed
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
                .or_else(|| trimmed.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
                .unwrap_or(trimmed);
            Command::Select(expand_tilde(unquoted))
        }
    }
}

fn spawn_stdin_reader(tx: Sender<Event>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(l) => {
                    if tx.send(Event::Line(l)).is_err() {
                        return;
                    }
                }
                Err(_) => break,
            }
        }
        let _ = tx.send(Event::Eof);
    });
}

fn prompt(session: &Session) -> Result<()> {
    let label = match session.status() {
        AnalysisStatus::Idle => "imagen".cyan(),
        AnalysisStatus::Analyzing => "analizando".yellow(),
        AnalysisStatus::Complete => "listo".green(),
        AnalysisStatus::Error => "error".red(),
    };
    print!("{} {} ", format!("artcat[{label}]").bold(), ">".dimmed());
    std::io::stdout().flush()?;
    Ok(())
}

fn print_help() {
    println!("{}", "Comandos:".white().bold());
    println!("  {}   analiza una imagen (arrástrala a la terminal)", "<ruta>".cyan());
    println!("  {}  descarta el análisis actual", "reset".cyan());
    println!("  {} muestra el estado actual", "status".cyan());
    println!("  {}   sal del estudio", "quit".cyan());
}

pub fn run(model: Option<String>) -> Result<()> {
    let config = load_config(model)?;
    let mut session = Session::new();

    let (tx, rx) = mpsc::channel::<Event>();
    spawn_stdin_reader(tx.clone());

    render::print_header(&session);
    println!(
        "{}",
        format!(
            "Formatos: {}. Escribe `help` para ver los comandos.",
            encode::supported_formats()
        )
        .dimmed()
    );
    prompt(&session)?;

    while let Ok(event) = rx.recv() {
        match event {
            Event::Eof => break,
            Event::Done(completion) => {
                match session.resolve(completion.ticket, completion.outcome) {
                    Resolution::Stale => continue,
                    Resolution::Applied(AnalysisStatus::Complete) => {
                        println!();
                        render::print_header(&session);
                        if let Some(analysis) = session.analysis() {
                            render::print_dashboard(analysis);
                        }
                        println!("{}", "Escribe `reset` para analizar otra obra.".dimmed());
                    }
                    Resolution::Applied(_) => {
                        println!();
                        render::print_header(&session);
                        println!("{}", "Error en el análisis".red().bold());
                        println!("{GENERIC_FAILURE}");
                        println!("{}", "Escribe `reset` para intentar de nuevo.".dimmed());
                    }
                }
            }
            Event::Line(line) => match parse_command(&line) {
                Command::Quit => break,
                Command::Nothing => {}
                Command::Help => print_help(),
                Command::Status => render::print_header(&session),
                Command::Reset => {
                    session.reset();
                    render::print_header(&session);
                }
                Command::Select(path) => {
                    if !session.can_select() {
                        let hint = if session.status() == AnalysisStatus::Analyzing {
                            "Un momento, sigo analizando la obra anterior."
                        } else {
                            "Escribe `reset` antes de subir otra obra."
                        };
                        println!("{}", hint.yellow());
                    } else if !encode::is_image_path(&path) {
                        println!(
                            "{} {}",
                            "No es una imagen:".yellow(),
                            path.display()
                        );
                    } else {
                        let ticket = session.select(PreviewHandle::for_path(&path))?;
                        render::print_header(&session);
                        match backend_for_request(&config) {
                            Ok(backend) => {
                                worker::spawn_analysis(
                                    backend,
                                    ticket,
                                    path,
                                    tx.clone(),
                                    Event::Done,
                                );
                            }
                            Err(e) => {
                                // Same path as a failed analysis
                                let _ = tx.send(Event::Done(Completion {
                                    ticket,
                                    outcome: Err(e),
                                }));
                            }
                        }
                    }
                }
            },
        }
        prompt(&session)?;
    }

    println!();
    println!("{}", "¡Hasta luego, humano! 🐾".dimmed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_keywords() {
        assert_eq!(parse_command("  "), Command::Nothing);
        assert_eq!(parse_command("q"), Command::Quit);
        assert_eq!(parse_command("reset"), Command::Reset);
        assert_eq!(parse_command("status\n"), Command::Status);
        assert_eq!(parse_command("?"), Command::Help);
    }

    #[test]
    fn test_parse_command_strips_drag_drop_quotes() {
        assert_eq!(
            parse_command("'/tmp/mi obra.png'"),
            Command::Select(PathBuf::from("/tmp/mi obra.png"))
        );
        assert_eq!(
            parse_command("\"/tmp/mi obra.png\""),
            Command::Select(PathBuf::from("/tmp/mi obra.png"))
        );
        assert_eq!(
            parse_command("/tmp/boceto.jpg"),
            Command::Select(PathBuf::from("/tmp/boceto.jpg"))
        );
    }
}
