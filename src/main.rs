use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use transceiver::config::build_schema;
use transceiver::config::schema::KEY_LOG_LEVEL;
use transceiver::lifecycle::service::SAMPLES_PER_SYMBOL;
use transceiver::lifecycle::{
    exit_status, prepare, ShutdownLatch, SignalOptions, StartupOptions,
    TransceiverLifecycle, EXIT_FAILURE, EXIT_SUCCESS,
};
use transceiver::observability::{logging, metrics};
use transceiver::radio::DummyLoad;
use transceiver::transceiver::PowerMeter;

/// Number of carriers served by this process.
const NUM_ARFCN: usize = 1;

#[derive(Parser)]
#[command(name = "transceiver")]
#[command(about = "Radio transceiver service", long_about = None)]
struct Cli {
    /// Device arguments, forwarded verbatim to the radio device
    device_args: Option<String>,

    /// TOML file with configuration overrides
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the configuration key schema as JSON and exit
    #[arg(long)]
    dump_schema: bool,

    /// Serve Prometheus metrics on this address
    #[arg(long)]
    metrics_address: Option<SocketAddr>,

    /// Exit immediately on a second SIGINT/SIGTERM
    #[arg(long)]
    force_exit_on_repeat: bool,
}

fn exit(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.dump_schema {
        return match serde_json::to_string_pretty(&build_schema()) {
            Ok(json) => {
                println!("{}", json);
                exit(EXIT_SUCCESS)
            }
            Err(e) => {
                eprintln!("Failed to serialize schema: {}", e);
                exit(EXIT_FAILURE)
            }
        };
    }

    let options = StartupOptions {
        config_path: cli.config,
        device_args: cli.device_args.unwrap_or_default(),
        signals: SignalOptions {
            force_exit_on_repeat: cli.force_exit_on_repeat,
        },
    };

    // Logging is not up yet; startup failures here go to stderr.
    let latch = ShutdownLatch::process();
    let prepared = match prepare(&options, &latch) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("ALERT: {}", e);
            return exit(e.exit_code());
        }
    };

    let level = prepared.store.get_str(KEY_LOG_LEVEL).unwrap_or("NOTICE");
    if let Err(e) = logging::init_logging(level) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    tracing::info!(
        num_arfcn = NUM_ARFCN,
        device_args = %options.device_args,
        "Starting transceiver"
    );

    if let Some(addr) = cli.metrics_address {
        if let Err(e) = metrics::init_metrics(addr) {
            tracing::error!(metrics_address = %addr, error = %e, "Failed to start metrics exporter");
        }
    }

    let lifecycle = TransceiverLifecycle::new(prepared.settings, latch);
    let result = lifecycle.run(
        Box::new(DummyLoad::new(SAMPLES_PER_SYMBOL)),
        Box::new(PowerMeter::default()),
    );

    if let Err(e) = &result {
        logging::alert(e);
    } else {
        tracing::info!("Shutdown complete");
    }

    exit(exit_status(&result))
}
