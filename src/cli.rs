use crate::model::{OperationStatus, PanelConfig, Phase, StatusRecord};
use crate::orchestrator::{Operation, Panel};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

/// Operations available to `--exec`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExecOp {
    Mint,
    MintTo,
    CheckOwner,
    Burn,
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "stylus-nft-panel",
    version,
    about = "Debug panel for a Stylus NFT contract with optional TUI"
)]
pub struct Cli {
    /// JSON-RPC endpoint of the node
    #[arg(long, env = "RPC_URL", default_value = "http://localhost:8547")]
    pub rpc_url: String,

    /// Hex private key of the signing account
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,

    /// Address of the NFT contract
    #[arg(
        long,
        env = "NFT_CONTRACT_ADDRESS",
        default_value = "0xa6e41ffd769491a42a6e5ce453259b93983a22ef"
    )]
    pub contract: String,

    /// How long a success or failure message stays visible
    #[arg(long, default_value = "5s")]
    pub status_ttl: humantime::Duration,

    /// Receipt polling interval while waiting for confirmation
    #[arg(long, default_value = "500ms")]
    pub confirm_poll: humantime::Duration,

    /// Write logs to this file while the TUI is running
    #[arg(long)]
    pub log_file: Option<std::path::PathBuf>,

    /// Run one operation without the TUI and exit
    #[arg(long, value_enum)]
    pub exec: Option<ExecOp>,

    /// Recipient address (mint-to) or token id (check-owner, burn)
    #[arg(long, requires = "exec")]
    pub arg: Option<String>,

    /// Print JSON lines instead of text (with --exec)
    #[arg(long, requires = "exec")]
    pub json: bool,
}

impl Cli {
    pub fn is_headless(&self) -> bool {
        self.exec.is_some() || !cfg!(feature = "tui")
    }
}

/// Runs the selected mode. Resolves to `false` when a headless operation failed.
pub async fn run(args: Cli) -> Result<bool> {
    if args.exec.is_none() {
        #[cfg(feature = "tui")]
        {
            crate::tui::run(args).await?;
            return Ok(true);
        }
        #[cfg(not(feature = "tui"))]
        {
            return Err(anyhow::anyhow!(
                "built without TUI support; pass --exec to run an operation"
            ));
        }
    }

    run_exec(args).await
}

/// Build a `PanelConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> PanelConfig {
    PanelConfig {
        rpc_url: args.rpc_url.clone(),
        private_key: args.private_key.clone(),
        contract: args.contract.clone(),
        status_ttl: Duration::from(args.status_ttl),
        confirm_poll: Duration::from(args.confirm_poll),
    }
}

fn build_operation(exec: ExecOp, arg: Option<String>) -> Operation {
    let arg = arg.unwrap_or_default();
    match exec {
        ExecOp::Mint => Operation::Mint,
        ExecOp::MintTo => Operation::MintTo(arg),
        ExecOp::CheckOwner => Operation::CheckOwner(arg),
        ExecOp::Burn => Operation::Burn(arg),
    }
}

fn exec_name(exec: ExecOp) -> String {
    exec.to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_default()
}

fn status_line(status: &OperationStatus, ttl: Duration, json: bool) -> Result<String> {
    let record = StatusRecord {
        timestamp_utc: crate::text_summary::timestamp_utc(),
        status,
        locked: status.locked(),
        expires_in: status.phase.is_terminal().then_some(ttl),
    };
    if json {
        Ok(serde_json::to_string(&record)?)
    } else {
        Ok(crate::text_summary::status_text(&record))
    }
}

/// One-shot headless mode: run a single operation and print every status transition.
async fn run_exec(args: Cli) -> Result<bool> {
    let exec = args
        .exec
        .context("--exec is required when the TUI is unavailable")?;
    let cfg = build_config(&args);
    let client = crate::chain::evm::connect(&cfg).context("failed to set up contract client")?;
    let panel = Panel::new(client, cfg.status_ttl);
    let (out_tx, out_handle) = spawn_output_writer();

    let res = exec_on(&panel, &args, exec, &out_tx).await;

    drop(out_tx);
    let _ = out_handle.await;
    res
}

/// Load contract info and balance, then run `exec` on `panel`, streaming lines to `out`.
async fn exec_on(
    panel: &Panel,
    args: &Cli,
    exec: ExecOp,
    out: &mpsc::UnboundedSender<OutputLine>,
) -> Result<bool> {
    let mut status_rx = panel.status().subscribe();
    let ttl = panel.status().ttl();
    let reads = panel.reads();

    reads.refresh_all().await;
    if !args.json {
        if let Some(meta) = reads.metadata().value() {
            let _ = out.send(OutputLine::Stderr(format!(
                "Contract: {} ({}) at {}",
                meta.name, meta.symbol, args.contract
            )));
        }
    }

    let op = build_operation(exec, args.arg.clone());
    tracing::info!(operation = %op.id(), "running headless");
    if let Some(work) = panel.start(op) {
        let mut work = tokio::spawn(work);
        loop {
            tokio::select! {
                changed = status_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let status = status_rx.borrow_and_update().clone();
                    let line = status_line(&status, ttl, args.json)?;
                    let _ = out.send(OutputLine::Stdout(line));
                }
                joined = &mut work => {
                    joined.context("operation task failed")?;
                    break;
                }
            }
        }
    }

    // Terminal transitions made after the last wakeup, or a synchronous rejection.
    if status_rx.has_changed().unwrap_or(false) {
        let status = status_rx.borrow_and_update().clone();
        let _ = out.send(OutputLine::Stdout(status_line(&status, ttl, args.json)?));
    }

    let final_status = panel.status().current();
    if exec == ExecOp::CheckOwner {
        if let Some(lookup) = reads.owner() {
            let line = crate::text_summary::owner_line(&lookup, args.json)?;
            let _ = out.send(OutputLine::Stdout(line));
        }
    } else if final_status.phase == Phase::Succeeded {
        let line = crate::text_summary::balance_line(&reads.balance(), args.json)?;
        let _ = out.send(OutputLine::Stdout(line));
    } else if !args.json {
        let _ = out.send(OutputLine::Stderr(format!("{} failed", exec_name(exec))));
    }

    Ok(final_status.phase != Phase::Failed)
}
