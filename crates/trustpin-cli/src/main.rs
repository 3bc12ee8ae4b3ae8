//! Command-line glue over the pinning engine.
//!
//! One-shot workflow: register credentials, fetch the signed policy, verify
//! a PEM certificate for a hostname, and exit with a stable code
//! (`PinningError::exit_code`).

use std::path::PathBuf;
use std::process::exit;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use trustpin_core::{CdnConfig, LogLevel, PinningMode, TrustPin};

#[derive(Debug, Parser)]
#[command(
    name = "trustpin",
    version,
    about = "Verify a server certificate against a signed pinning policy"
)]
struct Cli {
    /// Organization identifier issued with the pinning project.
    #[arg(long)]
    organization: String,

    /// Project identifier issued with the pinning project.
    #[arg(long)]
    project: String,

    /// Base64-encoded ECDSA P-256 public key (SPKI DER).
    #[arg(long = "public-key")]
    public_key: String,

    /// Stance for hosts absent from the policy.
    #[arg(long, value_enum, default_value_t = ModeArg::Strict)]
    mode: ModeArg,

    /// Diagnostic verbosity.
    #[arg(long, value_enum, default_value_t = LevelArg::Error)]
    log_level: LevelArg,

    /// Override the policy CDN base URL.
    #[arg(long)]
    cdn_url: Option<String>,

    /// Hostname presented by the server.
    host: String,

    /// Path to the server certificate in PEM form.
    certificate: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Strict,
    Permissive,
}

impl From<ModeArg> for PinningMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Strict => PinningMode::Strict,
            ModeArg::Permissive => PinningMode::Permissive,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LevelArg {
    None,
    Error,
    Info,
    Debug,
}

impl From<LevelArg> for LogLevel {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::None => LogLevel::None,
            LevelArg::Error => LogLevel::Error,
            LevelArg::Info => LogLevel::Info,
            LevelArg::Debug => LogLevel::Debug,
        }
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("trustpin=trace")),
        )
        .with_target(true)
        .init();

    exit(match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fatal: {e:?}");
            2
        }
    });
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let mut config = CdnConfig::from_env();
    if let Some(url) = &cli.cdn_url {
        config = config.with_url(url.as_str());
    }

    let engine = match TrustPin::new(config) {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("{err}");
            return Ok(err.exit_code());
        }
    };
    engine.set_log_level(cli.log_level.into());

    if let Err(err) = engine
        .setup(
            &cli.organization,
            &cli.project,
            &cli.public_key,
            cli.mode.into(),
        )
        .await
    {
        eprintln!("{err}");
        return Ok(err.exit_code());
    }

    let pem = std::fs::read_to_string(&cli.certificate)
        .with_context(|| format!("failed to read certificate {}", cli.certificate.display()))?;

    match engine.verify(&cli.host, &pem).await {
        Ok(()) => {
            println!("{}: certificate trusted", cli.host);
            Ok(0)
        }
        Err(err) => {
            eprintln!("{}: {err}", cli.host);
            Ok(err.exit_code())
        }
    }
}
