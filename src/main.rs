use clap::{Parser, Subcommand};
use port_channel::config::{get_default_config_path, Config, ConfigLoader};
use port_channel::encoding::EncodingKind;
use port_channel::logging::init_logging;
use port_channel::port::available_ports;
use port_channel::registry::{install_global, ChannelRegistry};
use port_channel::{OpenOutcome, PortChannel, ReadOutcome, WriteOutcome};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Pause between reads while waiting for data.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Exit code when no usable port is available.
const EXIT_NO_PORT: u8 = 2;

// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    name = "port-channel",
    version,
    about = "Send text to a serial port and print what comes back.",
    long_about = "Opens one serial port at a time with fixed 500 ms read/write timeouts. \
                  Defaults for the port, baud rate and encoding come from the configuration file."
)]
struct Args {
    /// Configuration file to use instead of the standard locations.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Serial port name or configured alias.
    #[arg(short, long, global = true)]
    port: Option<String>,

    /// Baud rate (0 to 128000).
    #[arg(short, long, global = true)]
    baud: Option<u32>,

    /// Outgoing text encoding: ascii or utf8.
    #[arg(short, long, global = true)]
    encoding: Option<EncodingKind>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List serial ports present on this system.
    List,
    /// Write a message, then print replies until the wait expires.
    Send {
        message: String,
        /// Append a carriage return to the message.
        #[arg(long)]
        cr: bool,
        /// How long to keep reading after the write.
        #[arg(long, default_value_t = 500)]
        wait_ms: u64,
    },
    /// Print whatever arrives on the port.
    Listen {
        #[arg(long, default_value_t = 5000)]
        duration_ms: u64,
    },
    /// Write a configuration file with default values.
    InitConfig {
        /// Destination; defaults to the platform config directory.
        #[arg(long)]
        path: Option<PathBuf>,
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let loader = match load_config(args.config.as_deref()) {
        Ok(loader) => loader,
        Err(e) => {
            eprintln!("Warning: Failed to load config, using defaults: {}", e);
            ConfigLoader::with_defaults()
        }
    };

    if let Err(e) = init_logging(&loader.config().logging) {
        eprintln!("Warning: logging not initialised: {}", e);
    }
    debug!(path = ?loader.config_path, "configuration loaded");

    match run(args, &loader) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> port_channel::ConfigResult<ConfigLoader> {
    match path {
        Some(path) => ConfigLoader::load_from(path),
        None => ConfigLoader::load(),
    }
}

fn run(args: Args, loader: &ConfigLoader) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = loader.config();
    match args.command {
        Command::List => list_ports(),
        Command::InitConfig { ref path, force } => init_config(path.clone(), force),
        Command::Send {
            ref message,
            cr,
            wait_ms,
        } => {
            let mut message = message.clone();
            if cr {
                message.push('\r');
            }
            with_channel(&args, config, |channel| {
                match channel.write(&message)? {
                    WriteOutcome::Written(n) => info!(bytes = n, "message sent"),
                    WriteOutcome::Suppressed(e) => warn!(error = %e, "device refused the write"),
                    other => warn!(outcome = ?other, "nothing was sent"),
                }
                pump(channel, Duration::from_millis(wait_ms))
            })
        }
        Command::Listen { duration_ms } => with_channel(&args, config, |channel| {
            pump(channel, Duration::from_millis(duration_ms))
        }),
    }
}

fn list_ports() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let ports = available_ports()?;
    if ports.is_empty() {
        println!("No serial ports found");
    }
    for name in ports {
        println!("{}", name);
    }
    Ok(ExitCode::SUCCESS)
}

fn init_config(path: Option<PathBuf>, force: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let Some(path) = path.or_else(get_default_config_path) else {
        return Err("no configuration directory available; pass --path".into());
    };
    if path.exists() && !force {
        return Err(format!("{} already exists; pass --force to overwrite", path.display()).into());
    }

    ConfigLoader {
        config_path: Some(path.clone()),
        config: Config::default(),
    }
    .save_to(&path)?;
    println!("Wrote {}", path.display());
    Ok(ExitCode::SUCCESS)
}

/// Open the configured port through the process-wide registry, run `body`,
/// and tear the channel down again.
fn with_channel<F>(args: &Args, config: &Config, body: F) -> Result<ExitCode, Box<dyn std::error::Error>>
where
    F: FnOnce(&PortChannel) -> Result<(), Box<dyn std::error::Error>>,
{
    let Some(port) = args.port.clone().or_else(|| config.serial.default_port.clone()) else {
        eprintln!("No port given; use --port or set serial.default_port");
        return Ok(ExitCode::from(EXIT_NO_PORT));
    };
    let port = config.serial.resolve_port(&port);
    let baud = args.baud.unwrap_or(config.serial.default_baud);
    let encoding = args.encoding.unwrap_or(config.serial.encoding);

    if install_global(ChannelRegistry::with_encoder(encoding.encoder())).is_err() {
        warn!("process-wide registry already initialised; keeping its encoder");
    }

    let channel = match PortChannel::open(&port, baud)? {
        OpenOutcome::Opened(channel) | OpenOutcome::Existing(channel) => channel,
        OpenOutcome::Unavailable(e) => {
            eprintln!("Port {} is unavailable: {}", port, e);
            return Ok(ExitCode::from(EXIT_NO_PORT));
        }
    };

    let result = body(&channel);
    PortChannel::close_global();
    result.map(|()| ExitCode::SUCCESS)
}

/// Print incoming text until `duration` has elapsed.
fn pump(channel: &PortChannel, duration: Duration) -> Result<(), Box<dyn std::error::Error>> {
    let deadline = Instant::now() + duration;
    let mut stdout = std::io::stdout();
    loop {
        match channel.read()? {
            ReadOutcome::Data(text) => {
                write!(stdout, "{}", text)?;
                stdout.flush()?;
            }
            ReadOutcome::TimedOut => debug!("read timed out"),
            ReadOutcome::Nothing => {}
        }
        if Instant::now() >= deadline {
            return Ok(());
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}
