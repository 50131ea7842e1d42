use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use salesdesk_core::{ClientConfig, McpExecutor, Operation, OperationKind};
use tokio::io::{AsyncBufReadExt as _, AsyncReadExt as _, BufReader};
use tracing::info;
use url::Url;

#[derive(Debug, Parser)]
#[command(
    name = "salesdesk-exec",
    version,
    about = "Run sales back-office MCP operations from decision records"
)]
struct Args {
    /// MCP endpoint of the back-office tool server, e.g. `https://host/mcp`.
    #[arg(long, env = "SALESDESK_MCP_URL", global = true)]
    endpoint: Option<Url>,

    /// Override the User-Agent sent with every request.
    #[arg(long, env = "SALESDESK_USER_AGENT", global = true)]
    user_agent: Option<String>,

    #[arg(
        long,
        env = "SALESDESK_HANDSHAKE_TIMEOUT_SECS",
        default_value_t = 30,
        global = true
    )]
    handshake_timeout_secs: u64,

    #[arg(
        long,
        env = "SALESDESK_CALL_TIMEOUT_SECS",
        default_value_t = 60,
        global = true
    )]
    call_timeout_secs: u64,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Execute one decision record and print the result.
    Run {
        /// Decision as JSON, e.g. `{"tool":"get-items","params":{"limit":5}}`. Read from stdin if omitted.
        #[arg(long)]
        decision: Option<String>,
        /// Original user question, passed through to the result.
        #[arg(long)]
        question: Option<String>,
    },
    /// Execute newline-delimited decision records from stdin over a single session.
    Batch {
        #[arg(long)]
        question: Option<String>,
    },
    /// Print the operation catalog as JSON.
    Catalog,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,hyper=warn,reqwest=warn".into()),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match &args.cmd {
        Command::Catalog => {
            println!("{}", serde_json::to_string_pretty(&catalog_json())?);
        }
        Command::Run { decision, question } => {
            let decision = match decision {
                Some(d) => d.clone(),
                None => {
                    let mut buf = String::new();
                    tokio::io::stdin()
                        .read_to_string(&mut buf)
                        .await
                        .context("read decision from stdin")?;
                    buf
                }
            };
            let mut exec = McpExecutor::connect(&client_config(&args)?)?;
            println!("{}", exec.execute(&decision, question.as_deref()).await);
        }
        Command::Batch { question } => {
            let mut exec = McpExecutor::connect(&client_config(&args)?)?;
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            let mut n = 0u64;
            while let Some(line) = lines.next_line().await.context("read stdin")? {
                if line.trim().is_empty() {
                    continue;
                }
                n += 1;
                println!("{}", exec.execute(&line, question.as_deref()).await);
            }
            info!(decisions = n, "batch finished");
        }
    }
    Ok(())
}

fn client_config(args: &Args) -> anyhow::Result<ClientConfig> {
    let endpoint = args
        .endpoint
        .clone()
        .context("missing MCP endpoint (--endpoint or SALESDESK_MCP_URL)")?;
    let mut cfg = ClientConfig::new(endpoint);
    if let Some(ua) = &args.user_agent {
        cfg.user_agent = ua.clone();
    }
    cfg.handshake_timeout = Duration::from_secs(args.handshake_timeout_secs);
    cfg.call_timeout = Duration::from_secs(args.call_timeout_secs);
    Ok(cfg)
}

fn catalog_json() -> serde_json::Value {
    let ops = Operation::ALL
        .iter()
        .map(|op| {
            let spec = op.spec();
            match op.kind() {
                OperationKind::Simple(_) => serde_json::json!({
                    "name": spec.name,
                    "kind": "simple",
                    "description": spec.description,
                    "required_params": spec.required_params,
                    "optional_params": spec.optional_params,
                }),
                OperationKind::Workflow(wf) => serde_json::json!({
                    "name": spec.name,
                    "kind": "workflow",
                    "workflow": wf.name,
                    "description": spec.description,
                    "required_params": wf.required_params,
                    "optional_params": spec.optional_params,
                }),
            }
        })
        .collect::<Vec<_>>();
    serde_json::Value::Array(ops)
}
