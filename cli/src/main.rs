use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    ServerError { status: u16, message: String },
    #[error("missing expected field `{0}`")]
    MissingField(&'static str),
    #[error("invalid session id in response: {0}")]
    InvalidSession(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("terminal io failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "orbitlen-cli", about = "Orbitlen dashboard and assistant CLI")]
struct Cli {
    #[arg(long, env = "ORBITLEN_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone)]
struct CliContext {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Subcommand, Debug)]
enum Command {
    Ping,
    /// Show bank share totals.
    Banks {
        /// Re-read both bank accounts before printing.
        #[arg(long, default_value_t = false)]
        refresh: bool,
    },
    Wallet,
    /// Talk to the assistant. Without MESSAGE, reads lines from stdin.
    Chat(ChatArgs),
    /// Submit the liquidity questionnaire.
    Survey(SurveyArgs),
    /// End a session on the server.
    Close { session: Uuid },
}

#[derive(Args, Debug)]
struct ChatArgs {
    /// Reuse an existing session instead of opening a new one.
    #[arg(long)]
    session: Option<Uuid>,

    message: Option<String>,
}

#[derive(Args, Debug)]
struct SurveyArgs {
    #[arg(long)]
    session: Option<Uuid>,

    #[arg(long, default_value = "")]
    managing_liquidity: String,

    #[arg(long, default_value = "")]
    liquidation_strategies: String,

    #[arg(long, default_value = "")]
    token_pledge: String,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let ctx = CliContext { base_url: cli.base_url.trim_end_matches('/').to_owned(), client: reqwest::Client::new() };

    match cli.command {
        Command::Ping => run_ping(&ctx).await,
        Command::Banks { refresh } => run_banks(&ctx, refresh).await,
        Command::Wallet => {
            let json = api_request(&ctx, reqwest::Method::GET, "/api/wallet", None).await?;
            print_json(&json)
        }
        Command::Chat(args) => run_chat(&ctx, args).await,
        Command::Survey(args) => run_survey(&ctx, args).await,
        Command::Close { session } => {
            let path = format!("/api/sessions/{session}");
            api_request(&ctx, reqwest::Method::DELETE, &path, None).await?;
            println!("closed {session}");
            Ok(())
        }
    }
}

async fn run_ping(cli: &CliContext) -> Result<(), CliError> {
    let url = format!("{}/healthz", cli.base_url);
    let response = cli.client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::ServerError { status: status.as_u16(), message: "health check failed".to_owned() });
    }
    println!("ok");
    Ok(())
}

async fn run_banks(cli: &CliContext, refresh: bool) -> Result<(), CliError> {
    let json = if refresh {
        api_request(cli, reqwest::Method::POST, "/api/banks/refresh", None).await?
    } else {
        api_request(cli, reqwest::Method::GET, "/api/banks", None).await?
    };
    print_json(&json)
}

async fn run_chat(cli: &CliContext, args: ChatArgs) -> Result<(), CliError> {
    let session = match args.session {
        Some(id) => id,
        None => {
            let created = open_session(cli).await?;
            if let Some(greeting) = created.pointer("/conversation/messages/0/content").and_then(Value::as_str) {
                println!("{greeting}");
            }
            session_id(&created)?
        }
    };

    if let Some(message) = args.message {
        let exchange = send_message(cli, session, &message).await?;
        return print_json(&exchange);
    }

    eprintln!("session {session}; empty line or EOF to quit");
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            break;
        }
        let exchange = send_message(cli, session, &line).await?;
        println!("{}", assistant_text(&exchange)?);
    }
    Ok(())
}

async fn run_survey(cli: &CliContext, args: SurveyArgs) -> Result<(), CliError> {
    let session = match args.session {
        Some(id) => id,
        None => session_id(&open_session(cli).await?)?,
    };
    let body = json!({
        "managing_liquidity": args.managing_liquidity,
        "liquidation_strategies": args.liquidation_strategies,
        "token_pledge": args.token_pledge,
    });
    let path = format!("/api/sessions/{session}/survey");
    let json = api_request(cli, reqwest::Method::POST, &path, Some(body)).await?;
    print_json(&json)
}

async fn open_session(cli: &CliContext) -> Result<Value, CliError> {
    api_request(cli, reqwest::Method::POST, "/api/sessions", None).await
}

async fn send_message(cli: &CliContext, session: Uuid, content: &str) -> Result<Value, CliError> {
    let path = format!("/api/sessions/{session}/messages");
    api_request(cli, reqwest::Method::POST, &path, Some(json!({ "content": content }))).await
}

async fn api_request(
    cli: &CliContext,
    method: reqwest::Method,
    path: &str,
    body: Option<Value>,
) -> Result<Value, CliError> {
    let url = format!("{}{}", cli.base_url, path);

    let request = cli.client.request(method, &url);
    let request = if let Some(json) = body { request.json(&json) } else { request };

    let response = request.send().await?;
    let status = response.status();
    let value = response.json::<Value>().await.unwrap_or_else(|_| Value::Null);

    if !status.is_success() {
        return Err(CliError::ServerError { status: status.as_u16(), message: error_message(&value) });
    }

    Ok(value)
}

/// Prefer the server's `message` field; fall back to the raw body.
fn error_message(body: &Value) -> String {
    match body.get("message").and_then(Value::as_str) {
        Some(message) => message.to_owned(),
        None => body.to_string(),
    }
}

fn session_id(created: &Value) -> Result<Uuid, CliError> {
    let raw = created.get("id").and_then(Value::as_str).ok_or(CliError::MissingField("id"))?;
    Uuid::parse_str(raw).map_err(|_| CliError::InvalidSession(raw.to_owned()))
}

fn assistant_text(exchange: &Value) -> Result<&str, CliError> {
    exchange
        .pointer("/assistant/content")
        .and_then(Value::as_str)
        .ok_or(CliError::MissingField("assistant.content"))
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
