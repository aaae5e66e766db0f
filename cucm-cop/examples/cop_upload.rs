//! Upload and install one COP file
//!
//! Reads the job parameters from a JSON file (the same upper-case names a
//! playbook passes) and runs a single upload against the node.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example cop_upload -- --params examples/params.example.json
//! ```
//!
//! Set `RUST_LOG=debug` to see every line sent and every prompt matched.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use cucm_cop::{CopUploadBuilder, HostKeyVerification, UpgradeParams};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let params: UpgradeParams = serde_json::from_str(&std::fs::read_to_string(&args.params)?)?;

    let mut builder = CopUploadBuilder::new(params)
        .port(args.port)
        .ssh_timeout(Duration::from_secs(args.timeout))
        .transcript_dir(&args.transcript_dir);
    if args.strict {
        builder = builder.host_key_verification(HostKeyVerification::Strict);
    }

    let outcome = builder.build()?.run().await;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    if !outcome.succeeded {
        std::process::exit(1);
    }
    Ok(())
}

/// Simple argument parser
struct Args {
    params: PathBuf,
    port: u16,
    timeout: u64,
    transcript_dir: PathBuf,
    strict: bool,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut params = PathBuf::from("params.json");
        let mut port = 22u16;
        let mut timeout = 25u64;
        let mut transcript_dir = PathBuf::from(".");
        let mut strict = false;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--params" => {
                    i += 1;
                    if i < args.len() {
                        params = PathBuf::from(&args[i]);
                    }
                }
                "--port" | "-p" => {
                    i += 1;
                    if i < args.len() {
                        port = args[i].parse().unwrap_or(22);
                    }
                }
                "--timeout" | "-t" => {
                    i += 1;
                    if i < args.len() {
                        timeout = args[i].parse().unwrap_or(25);
                    }
                }
                "--transcript-dir" => {
                    i += 1;
                    if i < args.len() {
                        transcript_dir = PathBuf::from(&args[i]);
                    }
                }
                "--strict-host-key" => strict = true,
                "--help" => {
                    Self::print_help();
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                }
            }
            i += 1;
        }

        Self {
            params,
            port,
            timeout,
            transcript_dir,
            strict,
        }
    }

    fn print_help() {
        println!(
            r#"cucm-cop cop_upload example

USAGE:
    cargo run --example cop_upload -- [OPTIONS]

OPTIONS:
    --params <PATH>          JSON parameter file [default: params.json]
    -p, --port <PORT>        SSH port [default: 22]
    -t, --timeout <SECS>     SSH connect timeout [default: 25]
    --transcript-dir <DIR>   Where DO_LOGGING transcripts go [default: .]
    --strict-host-key        Reject hosts missing from known_hosts
    --help                   Print this help message
"#
        );
    }
}
