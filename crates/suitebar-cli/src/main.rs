mod events;
mod logging;
mod style;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use suitebar_config::{ColorChoice, ConfigError, SuitebarConfig};
use suitebar_core::{ProgressReporter, Reporter, RunSummary, Theme, format_duration};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("SUITEBAR_GIT_HASH"),
    " ",
    env!("SUITEBAR_BUILD_DATE"),
    ")"
);

#[derive(Parser)]
#[command(name = "suitebar", version, long_version = LONG_VERSION)]
struct Cli {
    /// Config file (defaults to ./suitebar.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// When to use colors
    #[arg(long, global = true, value_enum)]
    color: Option<ColorArg>,

    /// Number of bar cells
    #[arg(long, global = true)]
    width: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ColorArg {
    Auto,
    Always,
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => ColorChoice::Auto,
            ColorArg::Always => ColorChoice::Always,
            ColorArg::Never => ColorChoice::Never,
        }
    }
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Replay newline-delimited JSON runner events (stdin when FILE is omitted)
    Replay {
        file: Option<PathBuf>,
    },

    /// Format a millisecond count the way the run summary does
    Duration {
        ms: u64,
    },

    /// Drive the progress line with synthetic suites
    Simulate {
        #[arg(long, default_value_t = 20)]
        suites: u64,

        /// Pause after each suite
        #[arg(long, default_value_t = 100)]
        delay_ms: u64,

        /// How many of the suites fail
        #[arg(long, default_value_t = 0)]
        fail: u64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{} {e}", style::error_prefix());
            return ExitCode::from(1);
        }
    };
    logging::init(&config.logging);

    match cli.command {
        Commands::Duration { ms } => {
            println!("{}", format_duration(ms));
            ExitCode::SUCCESS
        }
        Commands::Replay { file } => {
            let input: Box<dyn BufRead> = match &file {
                Some(path) => match File::open(path) {
                    Ok(f) => Box::new(BufReader::new(f)),
                    Err(e) => {
                        eprintln!(
                            "{} could not read {}: {e}",
                            style::error_prefix(),
                            path.display()
                        );
                        return ExitCode::from(1);
                    }
                },
                None => Box::new(io::stdin().lock()),
            };

            let mut reporter = stdio_reporter(&config);
            match events::replay(input, &mut reporter, now_ms) {
                Ok(applied) => {
                    tracing::debug!(applied, "replay finished");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("{} failed to read events: {e}", style::error_prefix());
                    ExitCode::from(1)
                }
            }
        }
        Commands::Simulate {
            suites,
            delay_ms,
            fail,
        } => {
            let mut reporter = stdio_reporter(&config);
            simulate(&mut reporter, suites, fail, Duration::from_millis(delay_ms));
            ExitCode::SUCCESS
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<SuitebarConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => suitebar_config::load_file(path)?,
        None => suitebar_config::load(Path::new("."))?.unwrap_or_default(),
    };
    if let Some(color) = cli.color {
        config.color = color.into();
    }
    if let Some(width) = cli.width {
        config.bar.width = width;
    }
    suitebar_config::validate(&config)?;
    Ok(config)
}

fn colors_enabled(choice: ColorChoice) -> bool {
    match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::colors_enabled() && console::colors_enabled_stderr(),
    }
}

fn stdio_reporter(config: &SuitebarConfig) -> ProgressReporter<io::Stdout, io::Stderr> {
    let theme = Theme::from_config(config, colors_enabled(config.color));
    ProgressReporter::new(io::stdout(), io::stderr(), theme)
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn simulate<R: Reporter + ?Sized>(reporter: &mut R, suites: u64, fail: u64, delay: Duration) {
    let fail = fail.min(suites);
    let started = Instant::now();

    reporter.on_run_start(suites);
    let mut failure_messages = Vec::new();
    for index in 0..suites {
        reporter.on_unit_start();
        std::thread::sleep(delay);
        reporter.on_unit_finish();

        let failed = index >= suites - fail;
        failure_messages.push(failed.then(|| format!("FAIL suite-{}.spec", index + 1)));
    }

    reporter.on_run_complete(&RunSummary {
        passed: suites - fail,
        failed: fail,
        pending: 0,
        total_tests: suites,
        failure_messages,
        elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        snapshot_failure: false,
    });
}
