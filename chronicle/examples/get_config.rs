//! Fetch a device configuration through the built-in drivers.
//!
//! The device is described on the command line and put into an in-memory
//! inventory, then fetched by nickname like any inventoried device.
//!
//! # Prerequisites
//!
//! - SSH server reachable with password authentication
//! - The host key present in `~/.ssh/known_hosts` (or `--known-hosts`),
//!   otherwise it is learned on first contact
//!
//! # Usage
//!
//! Against a plain Linux host (reads `~/.bashrc`):
//! ```bash
//! cargo run --example get_config -- --host localhost --user your_username --password your_password
//! ```
//!
//! Against a Catalyst 8000V:
//! ```bash
//! cargo run --example get_config -- --host 10.0.0.1 --user admin --password secret \
//!     --vendor Cisco --device CATALYST_8000V
//! ```

use std::env;
use std::path::PathBuf;

use chronicle::driver::{ChronicleBuilder, DeviceModel, DeviceRecord, InMemoryInventory};
use chronicle::transport::{ConnectionBuilder, EngineTimeouts};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (set RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut ssh = ConnectionBuilder::new(&args.host)
        .port(args.port)
        .username(&args.user)
        .password(&args.password)
        .verbosity(args.verbosity);
    if let Some(path) = &args.known_hosts {
        ssh = ssh.known_hosts_path(path);
    }

    let inventory = InMemoryInventory::new().with_device(DeviceRecord {
        nickname: "target".to_string(),
        device: DeviceModel {
            vendor_name: args.vendor.clone(),
            device_name: args.device.clone(),
        },
        ssh: ssh.build(),
    });

    let timeouts = EngineTimeouts::from_millis(args.idle_ms, args.total_ms);
    let engine = ChronicleBuilder::new(inventory, timeouts).build();

    // Ctrl-C stops the command in progress
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    println!(
        "Fetching {}/{} configuration from {}:{}...",
        args.vendor, args.device, args.host, args.port
    );
    println!("{}", "-".repeat(50));

    match engine.get_config("target", &cancel).await {
        Ok(lines) => {
            for line in &lines {
                println!("{line}");
            }
            println!("{}", "-".repeat(50));
            println!("{} lines", lines.len());
        }
        Err(e) => {
            eprintln!("Fetch failed with code {}: {e}", e.code());
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Simple argument parser (avoiding external dependencies)
struct Args {
    host: String,
    port: u16,
    user: String,
    password: String,
    vendor: String,
    device: String,
    known_hosts: Option<PathBuf>,
    idle_ms: u64,
    total_ms: u64,
    verbosity: u8,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut parsed = Self {
            host: "localhost".to_string(),
            port: 22,
            user: env::var("USER").unwrap_or_else(|_| "chronicle-runner".to_string()),
            password: String::new(),
            vendor: "Cisco".to_string(),
            device: "LINUX_TEST".to_string(),
            known_hosts: None,
            idle_ms: 1000,
            total_ms: 10_000,
            verbosity: 0,
        };

        let mut i = 1;
        while i < args.len() {
            let value = args.get(i + 1).cloned();
            match (args[i].as_str(), value) {
                ("--host" | "-h", Some(v)) => parsed.host = v,
                ("--port" | "-p", Some(v)) => parsed.port = v.parse().unwrap_or(22),
                ("--user" | "-u", Some(v)) => parsed.user = v,
                ("--password" | "-P", Some(v)) => parsed.password = v,
                ("--vendor", Some(v)) => parsed.vendor = v,
                ("--device", Some(v)) => parsed.device = v,
                ("--known-hosts", Some(v)) => parsed.known_hosts = Some(PathBuf::from(v)),
                ("--idle-ms", Some(v)) => parsed.idle_ms = v.parse().unwrap_or(1000),
                ("--total-ms", Some(v)) => parsed.total_ms = v.parse().unwrap_or(10_000),
                ("--verbosity" | "-v", Some(v)) => parsed.verbosity = v.parse().unwrap_or(0),
                ("--help", _) => {
                    Self::print_help();
                    std::process::exit(0);
                }
                (other, _) => {
                    eprintln!("Unknown or incomplete argument: {other}");
                    i += 1;
                    continue;
                }
            }
            i += 2;
        }

        parsed
    }

    fn print_help() {
        println!(
            r#"chronicle get_config example

USAGE:
    cargo run --example get_config -- [OPTIONS]

OPTIONS:
    -h, --host <HOST>          Target host [default: localhost]
    -p, --port <PORT>          SSH port [default: 22]
    -u, --user <USER>          Username [default: $USER]
    -P, --password <PASS>      Password for authentication
    --vendor <NAME>            Vendor name [default: Cisco]
    --device <NAME>            Device name [default: LINUX_TEST]
    --known-hosts <PATH>       known_hosts file [default: ~/.ssh/known_hosts]
    --idle-ms <MS>             Idle timeout per command [default: 1000]
    --total-ms <MS>            Total timeout per command [default: 10000]
    -v, --verbosity <LEVEL>    Session log verbosity 0-2 [default: 0]
    --help                     Print this help message
"#
        );
    }
}
