use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use trip_computer::{
    ConfigurationManager, CsvFormatter, DashboardReading, Fix, JsonFormatter,
    MockPermissionProvider, MockSampleSource, PermissionState, SourceError, TextFormatter,
    TripComputer, TripComputerConfig,
};

#[derive(Parser)]
#[command(name = "trip-computer", version, about = "Motorcycle trip computer telemetry replay")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format for each reading
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Litres in the tank before the ride
    #[arg(long, global = true)]
    fuel: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a JSON array of fixes
    Replay { track: PathBuf },
    /// Run a built-in synthetic ride
    Demo,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Compact,
    Json,
    Csv,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let mut manager = ConfigurationManager::new();
            manager.load_from_file(path)?;
            manager.config().clone()
        }
        None => TripComputerConfig::default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let events = match &cli.command {
        Command::Replay { track } => {
            let content = fs::read_to_string(track)?;
            let fixes: Vec<Fix> = serde_json::from_str(&content)?;
            info!(fixes = fixes.len(), track = %track.display(), "replaying track");
            fixes.into_iter().map(ReplayEvent::Fix).collect()
        }
        Command::Demo => demo_ride(),
    };

    let source = Arc::new(MockSampleSource::new());
    let permissions = Arc::new(MockPermissionProvider::new(PermissionState::Granted));
    let mut computer = TripComputer::new(source.clone(), permissions, &config)?;

    if let Some(litres) = cli.fuel {
        computer.add_fuel(litres)?;
    }

    if let Some(Err(error)) = computer.auto_start() {
        warn!(%error, "could not start tracking");
        return Err(error.into());
    }

    let printer = Printer::new(cli.format);
    printer.header();
    for event in events {
        match event {
            ReplayEvent::Fix(fix) => source.push_fix(fix),
            ReplayEvent::Error(error) => source.push_error(error),
        }
        printer.print(&computer.reading())?;
    }

    if let Some(trip) = computer.stop_ride() {
        info!(distance_km = trip.distance_km, "ride finished");
    }
    printer.print(&computer.reading())?;
    computer.shutdown();
    Ok(())
}

enum ReplayEvent {
    Fix(Fix),
    Error(SourceError),
}

/// A minute heading east along the equator at about 54 km/h, with a lost fix
/// halfway and device speed reported on every other sample.
fn demo_ride() -> Vec<ReplayEvent> {
    let mut events = Vec::new();
    for second in 0..=60i64 {
        if second == 30 {
            events.push(ReplayEvent::Error(SourceError::Timeout { timeout_ms: 10_000 }));
            continue;
        }
        let longitude = second as f64 * 0.000135;
        let mut fix = Fix::new(0.0, longitude, second * 1_000);
        if second % 2 == 0 {
            fix = fix.with_device_speed(15.0);
        }
        events.push(ReplayEvent::Fix(fix));
    }
    events
}

struct Printer {
    format: OutputFormat,
    text: TextFormatter,
    json: JsonFormatter,
    csv: CsvFormatter,
}

impl Printer {
    fn new(format: OutputFormat) -> Self {
        Self {
            format,
            text: TextFormatter {
                compact: matches!(format, OutputFormat::Compact),
            },
            json: JsonFormatter::new(),
            csv: CsvFormatter::new(),
        }
    }

    fn header(&self) {
        if matches!(self.format, OutputFormat::Csv) && self.csv.include_header {
            println!("{}", self.csv.header());
        }
    }

    fn print(&self, reading: &DashboardReading) -> Result<(), serde_json::Error> {
        match self.format {
            OutputFormat::Text | OutputFormat::Compact => println!("{}", self.text.format_text(reading)),
            OutputFormat::Json => println!("{}", self.json.format_json(reading)?),
            OutputFormat::Csv => println!("{}", self.csv.format_csv(reading)),
        }
        Ok(())
    }
}
