//! Translate a contract message into host chain messages.
//!
//! Usage: vmgate --config vmgate.yaml --contract cosmos1... message.json

use anyhow::{Context, Result};
use clap::Parser;
use commonware_utils::hex;
use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};
use tracing::info;
use vmgate_cli::Config;
use vmgate_execution::{BasicGasMeter, GasMeter, SimpleContext};
use vmgate_types::messages_digest;

#[derive(Parser, Debug)]
#[command(name = "vmgate")]
#[command(about = "Translate a contract message into host chain messages")]
struct Args {
    /// YAML configuration file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address of the contract that emitted the message
    #[arg(long)]
    contract: String,

    /// Channel port bound to the contract
    #[arg(long, default_value = "")]
    port: String,

    /// Block height reported to encoders
    #[arg(long, default_value_t = 1)]
    height: u64,

    /// JSON message file, or `-` for stdin
    message: PathBuf,
}

fn read_message(path: &PathBuf) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut raw = Vec::new();
        io::stdin()
            .read_to_end(&mut raw)
            .context("Could not read message from stdin")?;
        return Ok(raw);
    }
    fs::read(path).with_context(|| format!("Could not read message file {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Could not read config file {}", path.display()))?;
            serde_yaml::from_str::<Config>(&raw).context("Could not parse config file")?
        }
        None => Config::default(),
    };
    let config = config.validate().context("Invalid config")?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    let raw = read_message(&args.message)?;
    let encoders = config.build_encoders();
    let mut ctx = SimpleContext::new(BasicGasMeter::new(config.gas_limit), args.height);
    let msgs = encoders
        .encode_json(&mut ctx, &args.contract, &args.port, &raw)
        .context("Could not encode message")?;
    info!(
        messages = msgs.len(),
        gas = ctx.meter().gas_consumed(),
        "encoded contract message"
    );

    for msg in &msgs {
        println!("{}", msg.type_url());
        println!("{}", serde_json::to_string_pretty(msg)?);
    }
    println!("digest: {}", hex(messages_digest(&msgs).as_ref()));
    Ok(())
}
