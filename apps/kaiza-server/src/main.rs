//! # kaiza-server
//!
//! The Kaiza MCP server daemon.
//!
//! Starts an MCP server on stdio that an agent runtime connects to. Every
//! tool call flows through the kernel's session gate, plan authority,
//! policy engine, intent validator, and hash-chained audit ledger. The
//! workspace root is bound by the client's `initialize` call, not by a
//! flag: the process serves exactly one session.
//!
//! ## Usage
//!
//! Typically started by the MCP client via `.mcp.json`:
//! ```json
//! {
//!   "mcpServers": {
//!     "kaiza": {
//!       "type": "stdio",
//!       "command": "cargo",
//!       "args": ["run", "-p", "kaiza-server"]
//!     }
//!   }
//! }
//! ```
//!
//! Exit codes: 0 on clean shutdown, 1 on any startup self-audit failure.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rmcp::ServiceExt;
use tracing_subscriber::EnvFilter;

use kaiza_kernel::tools::{execution_tools, planning_tools, tool_registry, MUTATION_TOOLS};
use kaiza_kernel::{KaizaConfig, KernelServer};
use kaiza_session::{report_to_error, run_self_audit, SelfAuditInput};

/// Kaiza policy-and-audit MCP server.
#[derive(Parser)]
#[command(name = "kaiza-server", about = "Kaiza policy-and-audit MCP server")]
struct Cli {
    /// Path to an optional kaiza.toml (defaults to ./kaiza.toml).
    #[arg(long, default_value = "kaiza.toml")]
    config: PathBuf,
}

/// The startup self-audit: structural checks on the tool
/// registry and role manifest, run before any tool is accepted. A single
/// failure terminates the process with exit code 1 and a structured
/// diagnostic on stderr; there is no partial-boot mode.
fn self_audit_or_exit() {
    let registry = tool_registry();
    let planning = planning_tools();
    let execution = execution_tools();
    let input = SelfAuditInput {
        tool_registry: &registry,
        planning_tools: &planning,
        execution_tools: &execution,
        mutation_tools: &MUTATION_TOOLS,
        // KaizaError::code is an exhaustive match: a variant without a
        // registered code cannot compile.
        error_codes_complete: true,
    };
    let report = run_self_audit(&input);
    if !report.is_pass() {
        let failures: Vec<serde_json::Value> = report
            .failures()
            .iter()
            .map(|c| serde_json::json!({ "check": c.name, "detail": c.detail }))
            .collect();
        eprintln!(
            "{}",
            serde_json::json!({
                "error_code": "SELF_AUDIT_FAILURE",
                "failures": failures,
            })
        );
        tracing::error!(error = %report_to_error(&report), "startup self-audit failed");
        std::process::exit(1);
    }
    tracing::info!(checks = report.checks.len(), "startup self-audit passed");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = KaizaConfig::load_or_default(&cli.config)?;

    // Logs go to stderr so they never interfere with MCP on stdout.
    let filter = match &config.log_filter {
        Some(directives) => EnvFilter::try_new(directives)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("starting Kaiza MCP server");
    self_audit_or_exit();

    let server = KernelServer::new(config);
    tracing::info!("kernel ready, waiting for client connection");

    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .inspect_err(|e| tracing::error!("serving error: {e:?}"))?;

    service.waiting().await?;

    tracing::info!("Kaiza MCP server shutting down");
    Ok(())
}
