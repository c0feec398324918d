use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use eresources_nav::config::{
    default_config_path, find_config_file, get_config, load_config, read_config_file,
    write_config_file, Config, CONFIG_FILE_NAME,
};
use eresources_nav::models::{default_items, NavigationItem, RouteId};
use eresources_nav::rail::{
    spawn_rail, CuePolicy, PostActivationPolicy, RailSettings, RailSnapshot, RailView,
};
use eresources_nav::script::{Script, ScriptStep};
use eresources_nav::ui::{self, Status};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How long to wait for the rail to react to a scripted input
const SETTLE: Duration = Duration::from_millis(25);

/// eresources-nav - Drive the E-resources navigation rail from the terminal
#[derive(Parser, Debug)]
#[command(name = "eresources-nav")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Simulate the adaptive navigation rail of the E-resources search front end", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Human-readable
    Table,
    /// One JSON document per line
    Json,
}

impl OutputFormat {
    fn is_json(self) -> bool {
        match self {
            OutputFormat::Auto => !ui::is_terminal(),
            OutputFormat::Table => false,
            OutputFormat::Json => true,
        }
    }
}

/// Bounce cue policy
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum CueArg {
    /// Bounce until interrupted
    Indefinite,
    /// Bounce in bursts separated by a quiet period
    Heartbeat,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the navigation items
    Items,

    /// Run a scripted input sequence against a live rail
    #[command(alias = "sim")]
    Simulate {
        /// Script file ("-" reads stdin)
        script: PathBuf,

        /// Post-activation policy: collapse or restart (overrides the config file)
        #[arg(long, value_parser = PostActivationPolicy::from_str)]
        policy: Option<PostActivationPolicy>,

        /// Bounce cue policy (overrides the config file)
        #[arg(long, value_enum)]
        cue: Option<CueArg>,

        /// Oscillations per heartbeat burst
        #[arg(long)]
        repeats: Option<u32>,

        /// Route that is active when the rail mounts
        #[arg(long)]
        active: Option<String>,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Write a default configuration file
    Init {
        /// Where to write it (default: user config directory)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show {
        /// Show the file as written, ignoring ERESOURCES_NAV_* overrides
        #[arg(long)]
        no_env: bool,
    },
}

/// Something the simulator reports; one line of `simulate --output json`
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum SimulationEvent {
    Rail { elapsed_ms: u64, view: RailView },
    Navigate { elapsed_ms: u64, route: RouteId },
}

impl SimulationEvent {
    fn rail(
        items: &[NavigationItem],
        snapshot: &RailSnapshot,
        active_route: Option<&RouteId>,
        started: Instant,
    ) -> Self {
        let now = Instant::now();
        SimulationEvent::Rail {
            elapsed_ms: millis(now.duration_since(started)),
            view: RailView::build(items, snapshot, active_route, now),
        }
    }

    fn print(&self, json: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string(self)?);
            return Ok(());
        }
        match self {
            SimulationEvent::Rail { elapsed_ms, view } => {
                ui::print_rail(view, Duration::from_millis(*elapsed_ms))
            }
            SimulationEvent::Navigate { elapsed_ms, route } => {
                ui::print_navigation(route, Duration::from_millis(*elapsed_ms))
            }
        }
        Ok(())
    }
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

fn init_tracing(cli: &Cli, config: &Config) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => config.logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("eresources_nav={}", level)),
    );

    if config.logging.is_json() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Apply command-line overrides on top of the configured rail settings
fn resolve_settings(
    base: RailSettings,
    policy: Option<PostActivationPolicy>,
    cue: Option<CueArg>,
    repeats: Option<u32>,
) -> RailSettings {
    let post_activation = policy.unwrap_or(base.post_activation);

    let configured_repeats = match base.cue {
        CuePolicy::Heartbeat { repeats } => Some(repeats),
        CuePolicy::Indefinite => None,
    };
    let cue = match (cue, repeats) {
        (Some(CueArg::Indefinite), _) => CuePolicy::Indefinite,
        (Some(CueArg::Heartbeat), repeats) => CuePolicy::Heartbeat {
            repeats: repeats.or(configured_repeats).unwrap_or(3),
        },
        (None, Some(repeats)) if configured_repeats.is_some() => CuePolicy::Heartbeat { repeats },
        (None, _) => base.cue,
    };

    RailSettings {
        post_activation,
        cue,
    }
}

fn read_script(path: &PathBuf) -> Result<Script> {
    let source = if path.as_os_str() == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read script from stdin")?;
        source
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?
    };

    Ok(Script::parse(&source)?)
}

/// Play `script` against a live rail, handing every rail change and
/// navigation request to `emit`
async fn simulate<F>(
    script: &Script,
    settings: RailSettings,
    active: Option<RouteId>,
    mut emit: F,
) -> Result<()>
where
    F: FnMut(SimulationEvent) -> Result<()>,
{
    let items = default_items();
    let (routes, mut navigations) = mpsc::unbounded_channel::<RouteId>();
    let rail = spawn_rail(items.clone(), settings, move |route: &RouteId| {
        // The simulator plays the router: it only records the request
        let _ = routes.send(route.clone());
    });
    let mut snapshots = rail.subscribe();

    let started = Instant::now();
    let mut active_route = active;

    let snapshot = *snapshots.borrow_and_update();
    emit(SimulationEvent::rail(&items, &snapshot, active_route.as_ref(), started))?;

    for (line, step) in script.steps() {
        tracing::debug!("script line {}: {:?}", line, step);

        let wait = match step {
            ScriptStep::Input(input) => {
                rail.send(input.clone())?;
                SETTLE
            }
            ScriptStep::Wait(duration) => *duration,
        };

        let deadline = Instant::now() + wait;
        loop {
            tokio::select! {
                biased;
                Some(route) = navigations.recv() => {
                    emit(SimulationEvent::Navigate {
                        elapsed_ms: millis(started.elapsed()),
                        route: route.clone(),
                    })?;
                    active_route = Some(route);
                    // The highlight moves even when the rail itself did not change
                    let snapshot = *snapshots.borrow_and_update();
                    emit(SimulationEvent::rail(&items, &snapshot, active_route.as_ref(), started))?;
                }
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = *snapshots.borrow_and_update();
                    emit(SimulationEvent::rail(&items, &snapshot, active_route.as_ref(), started))?;
                }
                _ = tokio::time::sleep_until(deadline) => break,
            }
        }
    }

    rail.unmount().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration from file if specified or found in default locations
    let config_path = cli.config.clone().or_else(find_config_file);
    let config = match &config_path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => get_config(),
    };

    init_tracing(&cli, &config);
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    let json = cli.output.is_json();

    match cli.command {
        Some(Commands::Items) => {
            let items = default_items();
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                println!("{}", ui::items_table(&items));
            }
        }

        Some(Commands::Simulate {
            script,
            policy,
            cue,
            repeats,
            active,
        }) => {
            let script = read_script(&script)?;
            if script.is_empty() {
                if !cli.quiet {
                    ui::print_status(Status::Warning, "Script has no steps");
                }
                return Ok(());
            }
            let settings = resolve_settings(config.rail, policy, cue, repeats);

            if !json {
                ui::print_section(&format!(
                    "Simulating {} steps ({:.1}s scripted)",
                    script.steps().len(),
                    script.duration().as_secs_f64()
                ));
            }
            simulate(&script, settings, active.map(RouteId::new), |event| {
                event.print(json)
            })
            .await?;
            if !json {
                ui::print_divider();
                ui::print_status(Status::Success, "Simulation finished");
            }
        }

        Some(Commands::Config { command }) => match command {
            ConfigCommands::Init { path, force } => {
                let path = path
                    .or_else(default_config_path)
                    .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
                if path.exists() && !force {
                    bail!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    );
                }
                write_config_file(&get_config(), &path)?;
                if !cli.quiet {
                    ui::print_status(
                        Status::Success,
                        &format!("Wrote default configuration to {}", path.display()),
                    );
                }
            }
            ConfigCommands::Show { no_env } => {
                let shown = match (&config_path, no_env) {
                    (Some(path), true) => read_config_file(path)?,
                    (None, true) => get_config(),
                    (_, false) => config,
                };
                if json {
                    println!("{}", serde_json::to_string_pretty(&shown)?);
                } else {
                    print!("{}", toml::to_string_pretty(&shown)?);
                }
            }
        },

        Some(Commands::Completions { shell }) => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "eresources-nav", &mut std::io::stdout());
        }

        None => {
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
