//! `gwctl` — a manual smoke-test CLI for a configured syscall gateway
//! endpoint. Not part of the library's public contract; feature-gated
//! behind `cli`, off by default, in the spirit of the teacher's
//! `rust/src/bin/*` debug binaries.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use syscall_gateway::{CallContext, GatewayConfig, Params, SandboxLevel, SyscallGateway};

#[derive(Parser)]
#[command(name = "gwctl")]
#[command(about = "Manual smoke-test client for the syscall gateway")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override the kernel URL (defaults to SYSCALL_GATEWAY_KERNEL_URL / loopback).
    #[arg(long, env = "SYSCALL_GATEWAY_KERNEL_URL")]
    kernel_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a process and print its pid.
    CreateProcess {
        /// A human-readable key identifying this process.
        process_key: String,
    },
    /// Execute a single syscall against an existing pid.
    Call {
        pid: u32,
        call_name: String,
        /// JSON object of parameters, e.g. '{"path":"/etc/hostname"}'.
        #[arg(default_value = "{}")]
        params_json: String,
    },
    /// Submit an io_uring-style call and immediately wait for its completion.
    SubmitAndWait {
        pid: u32,
        call_name: String,
        #[arg(default_value = "{}")]
        params_json: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = GatewayConfig::from_env();
    if let Some(url) = cli.kernel_url {
        config.kernel_url = url;
    }

    let gateway = match SyscallGateway::connect_lazy(config) {
        Ok(gw) => gw,
        Err(e) => {
            eprintln!("failed to build gateway: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::CreateProcess { process_key } => {
            run_create_process(&gateway, &process_key).await
        }
        Commands::Call {
            pid,
            call_name,
            params_json,
        } => run_call(&gateway, pid, &call_name, &params_json).await,
        Commands::SubmitAndWait {
            pid,
            call_name,
            params_json,
        } => run_submit_and_wait(&gateway, pid, &call_name, &params_json).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run_create_process(gateway: &SyscallGateway, process_key: &str) -> anyhow::Result<()> {
    let pid = gateway
        .create_process(process_key, SandboxLevel::Standard)
        .await?;
    println!("{pid}");
    Ok(())
}

fn parse_params(params_json: &str) -> anyhow::Result<Params> {
    let value: serde_json::Value = serde_json::from_str(params_json)?;
    let object = value
        .as_object()
        .ok_or_else(|| anyhow::anyhow!("params must be a JSON object"))?;
    Ok(object
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect())
}

async fn run_call(
    gateway: &SyscallGateway,
    pid: u32,
    call_name: &str,
    params_json: &str,
) -> anyhow::Result<()> {
    let params = parse_params(params_json)?;
    let outcome = gateway
        .sync()
        .execute(&CallContext::new(), pid, call_name, &params)
        .await?;
    println!("{}", String::from_utf8_lossy(outcome.as_bytes()));
    Ok(())
}

async fn run_submit_and_wait(
    gateway: &SyscallGateway,
    pid: u32,
    call_name: &str,
    params_json: &str,
) -> anyhow::Result<()> {
    let params = parse_params(params_json)?;
    let outcome = gateway
        .completions()
        .submit_and_wait(&CallContext::new(), pid, call_name, &params)
        .await?;
    println!("{}", String::from_utf8_lossy(outcome.as_bytes()));
    Ok(())
}
