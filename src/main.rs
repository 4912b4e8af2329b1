//! CLI entry point for netpin.
//!
//! Loads settings and the profiles file, resolves a profile against the
//! installed compiler, and reports the resulting build context.

use anyhow::{Context, Result};
use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use console::style;
use netpin::io::{ExitCode, JsonResponse, OutputFormat};
use netpin::profiles::local::LocalOverrides;
use netpin::profiles::{
    CommandProbe, CompilerProbe, PinnedProbe, ProfileName, ProfileStore, RawProfile, RawSelector,
    ResolvedContext, Resolver, Version, select_profile_name, write_starter_profiles,
};
use netpin::Settings;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Network & compiler profile resolver
#[derive(Parser)]
#[command(
    name = "netpin",
    version = env!("CARGO_PKG_VERSION"),
    about = "Resolve network and compiler profiles for build/deploy pipelines",
    next_line_help = true,
    styles = clap_cargo_style()
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the profiles file (overrides settings)
    #[arg(short, long, global = true)]
    profiles: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "netpin=trace" (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Initialize project
    #[command(about = "Set up .netpin with default settings and a development profile")]
    Init {
        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// List configured profiles
    #[command(about = "List profiles with their endpoints and compilers")]
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Validate every profile
    #[command(about = "Validate all profiles and report failures by field")]
    Check {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Resolve one profile into a build context
    #[command(
        about = "Resolve a profile against the installed compiler",
        after_help = concat!(
            "Examples:\n",
            "  netpin resolve\n",
            "  netpin resolve staging --json\n",
            "  netpin resolve --installed 0.8.0\n",
            "  netpin resolve --timeout-ms 500"
        )
    )]
    Resolve {
        /// Profile name (defaults to the configured or designated default profile)
        name: Option<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,

        /// Bound on the compiler version query (overrides settings)
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Treat this as the installed compiler version instead of running the compiler
        #[arg(long, value_name = "VERSION")]
        installed: Option<String>,
    },

    /// Show current configuration settings
    #[command(about = "Display active settings")]
    Config,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{} {e}", style("error:").red().bold());
            return ExitCode::ParseError.into();
        }
    };

    init_logging(cli.log_level.as_deref(), &settings.log_level);

    match run(cli.command, settings) {
        Ok(code) => {
            if !code.is_success() {
                debug!(exit_code = code as u8, "{}", code.description());
            }
            code.into()
        }
        Err(e) => {
            eprintln!("{} {e:#}", style("error:").red().bold());
            ExitCode::GeneralError.into()
        }
    }
}

fn load_settings(cli: &Cli) -> Result<Settings, Box<figment::Error>> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    if let Some(profiles) = &cli.profiles {
        settings.profiles_path = profiles.clone();
    }
    Ok(settings)
}

/// Log to stderr; CLI flag beats RUST_LOG beats settings
fn init_logging(cli_level: Option<&str>, configured: &str) {
    let filter = match cli_level {
        Some(level) => EnvFilter::try_new(level),
        None => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(configured)),
    }
    .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run(command: Commands, settings: Settings) -> Result<ExitCode> {
    match command {
        Commands::Init { force } => init(force),
        Commands::List { json } => list(&settings, OutputFormat::from_json_flag(json)),
        Commands::Check { json } => check(&settings, OutputFormat::from_json_flag(json)),
        Commands::Resolve {
            name,
            json,
            timeout_ms,
            installed,
        } => resolve(
            &settings,
            name,
            timeout_ms,
            installed,
            OutputFormat::from_json_flag(json),
        ),
        Commands::Config => {
            println!("Current Configuration:");
            println!("{}", "=".repeat(50));
            println!("{}", toml::to_string_pretty(&settings)?);
            Ok(ExitCode::Success)
        }
    }
}

fn init(force: bool) -> Result<ExitCode> {
    let workspace = std::env::current_dir().context("cannot determine current directory")?;

    let settings_path = match Settings::init_config_file(&workspace, force) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("{} {e}", style("error:").red().bold());
            return Ok(e.exit_code());
        }
    };
    println!("Created configuration file at: {}", settings_path.display());

    let profiles_path = workspace.join(Settings::default().profiles_path);
    match write_starter_profiles(&profiles_path, force) {
        Ok(path) => {
            println!("Created profiles file at: {}", path.display());
            println!("Edit it to add networks and pin your compiler version.");
            Ok(ExitCode::Success)
        }
        Err(e) => {
            eprintln!("{} {e}", style("error:").red().bold());
            Ok(e.exit_code())
        }
    }
}

/// Load the profiles file, printing the failure and its exit code on error
fn load_store(settings: &Settings) -> std::result::Result<ProfileStore, ExitCode> {
    ProfileStore::load(&settings.profiles_path).map_err(|e| {
        eprintln!("{} {e}", style("error:").red().bold());
        e.exit_code()
    })
}

#[derive(Serialize)]
struct ProfileSummary<'a> {
    name: &'a str,
    default: bool,
    #[serde(flatten)]
    profile: &'a RawProfile,
}

fn list(settings: &Settings, format: OutputFormat) -> Result<ExitCode> {
    let store = match load_store(settings) {
        Ok(store) => store,
        Err(code) => return Ok(code),
    };
    let default = store.default_profile_name();

    if format.is_json() {
        let summaries: Vec<ProfileSummary> = store
            .iter()
            .map(|(name, profile)| ProfileSummary {
                name: name.as_str(),
                default: name == default,
                profile,
            })
            .collect();
        let count = summaries.len();
        let response =
            JsonResponse::success(summaries).with_message(format!("{count} profile(s)"));
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(ExitCode::Success);
    }

    if store.is_empty() {
        println!("No profiles defined in {}", settings.profiles_path.display());
        return Ok(ExitCode::Success);
    }

    println!("Profiles ({}):", settings.profiles_path.display());
    for (name, profile) in store.iter() {
        let marker = if name == default { "*" } else { " " };
        let port = profile
            .port
            .map(|p| p.to_string())
            .unwrap_or_else(|| "?".to_string());
        let network = match &profile.network_id {
            Some(RawSelector::Id(id)) => id.to_string(),
            Some(RawSelector::Unsigned(id)) => id.to_string(),
            Some(RawSelector::Token(token)) => token.clone(),
            None => "?".to_string(),
        };
        let compiler = format!(
            "{} {}",
            profile.compiler.name.as_deref().unwrap_or("?"),
            profile.compiler.version.as_deref().unwrap_or("?")
        );
        println!(
            "{marker} {:<16} {}:{port:<6} network {network:<8} {compiler}",
            name.as_str(),
            profile.host
        );
    }
    Ok(ExitCode::Success)
}

#[derive(Serialize)]
struct CheckReport {
    profile: String,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

fn check(settings: &Settings, format: OutputFormat) -> Result<ExitCode> {
    let store = match load_store(settings) {
        Ok(store) => store,
        Err(code) => return Ok(code),
    };

    let reports: Vec<CheckReport> = store
        .validate_all()
        .into_iter()
        .map(|(name, result)| match result {
            Ok(_) => CheckReport {
                profile: name.to_string(),
                valid: true,
                field: None,
                reason: None,
            },
            Err(e) => CheckReport {
                profile: name.to_string(),
                valid: false,
                field: Some(e.field.to_string()),
                reason: Some(e.reason),
            },
        })
        .collect();

    let failures = reports.iter().filter(|r| !r.valid).count();
    let code = if failures == 0 {
        ExitCode::Success
    } else {
        ExitCode::ConfigError
    };

    if format.is_json() {
        let mut response = JsonResponse::success(&reports)
            .with_message(format!("{failures} of {} profile(s) invalid", reports.len()));
        if failures > 0 {
            response.status = "error".to_string();
            response.code = "INVALID_PROFILE".to_string();
            response.exit_code = code as u8;
        }
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(code);
    }

    for report in &reports {
        match (&report.field, &report.reason) {
            (Some(field), Some(reason)) => println!(
                "{} {}: {field}: {reason}",
                style("✗").red(),
                report.profile
            ),
            _ => println!("{} {}", style("✓").green(), report.profile),
        }
    }
    if failures > 0 {
        eprintln!("{failures} of {} profile(s) failed validation", reports.len());
    }
    Ok(code)
}

fn resolve(
    settings: &Settings,
    name: Option<String>,
    timeout_ms: Option<u64>,
    installed: Option<String>,
    format: OutputFormat,
) -> Result<ExitCode> {
    let store = match load_store(settings) {
        Ok(store) => store,
        Err(code) => return Ok(code),
    };

    let local = match LocalOverrides::load(&settings.local_overrides_path()) {
        Ok(local) => local,
        Err(e) => {
            eprintln!("{} {e}", style("error:").red().bold());
            return Ok(e.exit_code());
        }
    };

    let requested = select_profile_name(name, local.profile, settings.profile.clone())
        .map(ProfileName::new)
        .transpose()
        .context("invalid profile name")?;

    let probe: Box<dyn CompilerProbe> = match installed {
        Some(version) => {
            let version = Version::parse(&version)
                .with_context(|| format!("invalid --installed version '{version}'"))?;
            Box::new(PinnedProbe::any(version))
        }
        None => Box::new(CommandProbe::new().with_commands(settings.probe.commands.clone())),
    };

    let timeout = timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| settings.probe.timeout());

    let resolver = Resolver::new(&store, probe.as_ref()).with_timeout(timeout);
    match resolver.resolve(requested.as_ref()) {
        Ok(context) => {
            if format.is_json() {
                let response = JsonResponse::success(&context)
                    .with_message(format!("Resolved profile '{}'", context.profile()));
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print_context(&context);
            }
            Ok(ExitCode::Success)
        }
        Err(e) => {
            if format.is_json() {
                let response = JsonResponse::from_resolution_error(&e);
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                eprintln!("{} {e}", style("error:").red().bold());
                if e.exit_code().is_blocking() {
                    eprintln!("Do not build with this profile until the compiler matches.");
                }
            }
            Ok(e.exit_code())
        }
    }
}

fn print_context(context: &ResolvedContext) {
    let network = context.network();
    let selector = if network.selector.is_wildcard() {
        format!("{} (any)", network.selector)
    } else {
        network.selector.to_string()
    };

    println!(
        "Resolved profile '{}'",
        style(context.profile()).cyan().bold()
    );
    println!("  Endpoint:  {}", network.endpoint());
    println!("  Network:   {selector}");
    println!(
        "  Compiler:  {} (installed {})",
        context.compiler(),
        context.installed_version()
    );
    println!("  Resolved:  {}", context.resolved_at().to_rfc3339());
    if let Some(warning) = context.warning() {
        println!("  {} {warning}", style("Warning:").yellow().bold());
    }
}
