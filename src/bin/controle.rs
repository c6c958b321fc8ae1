//! Line-oriented driver for the control-period flow.
//!
//! ```text
//! controle [BASE_DIR | CONFIG.json]
//! ```
//!
//! Without an argument the base directory is taken from `SEIGLA_CONTROLE_DIR`,
//! falling back to the current directory. Log level follows `RUST_LOG`.

use anyhow::{bail, Context, Result};
use seigla_controle::config::ControlConfig;
use seigla_controle::directory::ControlDirectory;
use seigla_controle::flow::{Event, Flow, Response};
use seigla_controle::storage::ParquetTableStorage;
use seigla_controle::{ErrorKind, Session};
use std::io::{self, BufRead, Write};
use tracing::info;

const HELP: &str = "commands: list | open <file> | new | session <MATIN|MIDI|SOIR> | \
                    add <lot> <snit> <normal> <pl> | finish | back | quit";

fn load_config() -> Result<ControlConfig> {
    let arg = std::env::args().nth(1);
    let config = match arg {
        Some(path) if path.ends_with(".json") => ControlConfig::from_json_file(&path)?,
        Some(dir) => ControlConfig::builder(dir).build()?,
        None => {
            let dir = std::env::var("SEIGLA_CONTROLE_DIR").unwrap_or_else(|_| ".".to_string());
            ControlConfig::builder(dir).build()?
        }
    };
    Ok(config)
}

fn parse_event(line: &str) -> Result<Option<Event>> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let event = match words.as_slice() {
        [] => return Ok(None),
        ["list"] => Event::Refresh,
        ["open", file] => Event::OpenPeriod((*file).to_string()),
        ["new"] => Event::NewPeriod(chrono::Local::now().date_naive()),
        ["session", name] => Event::ChooseSession(name.parse::<Session>().map_err(anyhow::Error::msg)?),
        ["add", lot, snit, normal, pl] => Event::Submit {
            lot: (*lot).to_string(),
            id_a: (*snit).to_string(),
            id_b: (*normal).to_string(),
            value: (*pl).to_string(),
        },
        ["finish"] => Event::Finish,
        ["back"] => Event::Back,
        _ => bail!("unrecognized command {line:?}\n{HELP}"),
    };
    Ok(Some(event))
}

fn render(response: &Response) -> String {
    match response {
        Response::Periods(periods) if periods.is_empty() => "Aucun contrôle trouvé".to_string(),
        Response::Periods(periods) => periods
            .iter()
            .map(|(file, display)| format!("{display}\t({file})"))
            .collect::<Vec<_>>()
            .join("\n"),
        Response::SessionMenu(title) => format!("{title}: choose MATIN, MIDI or SOIR"),
        Response::EntryOpened { title, records } => format!("{title} ({records} records)"),
        Response::Submitted(outcome) => outcome.status_message(),
        Response::Saved { filename, .. } => format!("Données sauvegardées dans {filename}"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = load_config().context("invalid configuration")?;
    let directory = ControlDirectory::new(config);
    directory.ensure_base_dir()?;
    info!(base_dir = %directory.config().base_dir().display(), "control directory ready");

    let mut flow = Flow::new(ParquetTableStorage::new(), directory);
    println!("{HELP}");
    if let Ok(response) = flow.handle(Event::Refresh) {
        println!("{}", render(&response));
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        if line.trim() == "quit" {
            break;
        }
        let event = match parse_event(&line) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        match flow.handle(event) {
            Ok(response) => println!("{}", render(&response)),
            Err(e) if e.kind() == ErrorKind::StorageAccess => {
                println!("Fichier inaccessible (ouvert ailleurs ?): {e}");
            }
            Err(e) => println!("{e}"),
        }
        stdout.flush().context("failed to flush stdout")?;
    }

    if flow.period().is_some_and(seigla_controle::period::ControlPeriod::is_dirty) {
        bail!("exited with unsaved changes");
    }
    Ok(())
}
