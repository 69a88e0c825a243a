use anyhow::Result;
use clap::Parser;
use client_core::{Gateway, HttpGateway, PdfDocument, Phase, SessionController, SessionState};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;

const HELP: &str = "\
commands:
  upload <path> [email]   upload a PDF and start a new session
  ask <question>          ask about the current PDF
  status                  show the current session
  help                    show this message
  quit                    exit";

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, env = "GATEWAY_URL", default_value = "http://localhost:3000")]
    gateway_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Upload { path: String, email: Option<String> },
    Ask(String),
    Status,
    Help,
    Quit,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut controller = SessionController::new(HttpGateway::new(args.gateway_url));
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
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
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::Status => println!("{}", render(controller.state())),
            command => {
                run(&mut controller, command).await;
                println!("{}", render(controller.state()));
            }
        }
    }

    Ok(())
}

async fn run<G: Gateway>(controller: &mut SessionController<G>, command: Command) {
    match command {
        Command::Upload { path, email } => {
            let document = match PdfDocument::from_path(&path).await {
                Ok(document) => Some(document),
                Err(error) => {
                    warn!(%path, error = ?error, "could not read document");
                    None
                }
            };
            controller.submit_upload(document, email.as_deref()).await;
        }
        Command::Ask(question) => {
            controller.submit_question(&question).await;
        }
        Command::Status | Command::Help | Command::Quit => {}
    }
}

fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb {
        "upload" => {
            let mut parts = rest.split_whitespace();
            let path = parts.next().ok_or("usage: upload <path> [email]")?;
            Command::Upload {
                path: path.to_string(),
                email: parts.next().map(str::to_string),
            }
        }
        "ask" => Command::Ask(rest.to_string()),
        "status" => Command::Status,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{other}'; type 'help'")),
    };
    Ok(Some(command))
}

fn render(state: &SessionState) -> String {
    let phase = match state.phase() {
        Phase::Idle => "idle",
        Phase::Uploading => "uploading",
        Phase::Ready => "ready",
        Phase::Asking => "asking",
    };

    let mut out = format!("[{phase}]");
    match (state.session_id(), state.num_chunks()) {
        (Some(id), Some(chunks)) => out.push_str(&format!(" session {id} ({chunks} chunks)")),
        (Some(id), None) => out.push_str(&format!(" session {id}")),
        (None, _) => out.push_str(" no document uploaded"),
    }
    if let Some(answer) = state.answer() {
        out.push_str(&format!("\nanswer: {answer}"));
    }
    if let Some(error) = state.error() {
        out.push_str(&format!("\nerror: {error}"));
    }
    out
}
