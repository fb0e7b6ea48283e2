use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use azposture::config::Config;
use azposture::error::PostureError;
use azposture::output::OutputFormat;
use azposture::rules::builtin::catalog;
use azposture::rules::Severity;
use azposture::{ScanOptions, DEFAULT_CONFIG_FILE};

#[derive(Parser)]
#[command(
    name = "azposture",
    about = "Posture scanner for Azure resources",
    version,
    author
)]
struct Cli {
    /// Log progress to stderr (overridden by RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a snapshot of ARM list responses
    Scan {
        /// Path to the snapshot directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Config file path
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output format (console, json, sarif)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,

        /// Minimum severity to fail (low, medium, high)
        #[arg(long)]
        fail_on: Option<String>,

        /// Write output to file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Subscription id recorded on every row
        #[arg(long, short = 's', env = "AZURE_SUBSCRIPTION_ID")]
        subscription: Option<String>,

        /// Resource group to review (repeatable; default: all in snapshot)
        #[arg(long = "resource-group", short = 'g')]
        resource_groups: Vec<String>,

        /// Service to review (repeatable; aks, plan, app, func, evh, sigr, cae, afd)
        #[arg(long = "service")]
        services: Vec<String>,

        /// Review services of a resource group concurrently
        #[arg(long)]
        parallel: bool,
    },

    /// List all available rules
    ListRules {
        /// Output format (table, json)
        #[arg(long, short = 'f', default_value = "table")]
        format: String,

        /// Only list rules of this service
        #[arg(long)]
        service: Option<String>,
    },

    /// Generate a starter .azposture.toml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "azposture=info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Scan {
            path,
            config,
            format,
            fail_on,
            output,
            subscription,
            resource_groups,
            services,
            parallel,
        } => {
            let options = ScanOptions {
                config_path: config,
                format: OutputFormat::Console,
                fail_on_override: None,
                subscription_id: subscription,
                resource_groups,
                services,
                parallel,
            };
            cmd_scan(path, options, format, fail_on, output)
        }
        Commands::ListRules { format, service } => cmd_list_rules(format, service),
        Commands::Init { force } => cmd_init(force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn cmd_scan(
    path: PathBuf,
    mut options: ScanOptions,
    format_str: String,
    fail_on_str: Option<String>,
    output_path: Option<PathBuf>,
) -> Result<i32, PostureError> {
    let format = OutputFormat::from_str_lenient(&format_str).unwrap_or_else(|| {
        eprintln!("Warning: unknown format '{}', using console", format_str);
        OutputFormat::Console
    });

    let fail_on = fail_on_str.and_then(|s| {
        let sev = Severity::from_str_lenient(&s);
        if sev.is_none() {
            eprintln!("Warning: unknown severity '{}', using config default", s);
        }
        sev
    });

    options.format = format;
    options.fail_on_override = fail_on;

    let report = azposture::scan(&path, &options)?;
    let rendered = azposture::render_report(&report, format)?;

    match output_path {
        Some(out) => std::fs::write(&out, &rendered)?,
        None => print!("{}", rendered),
    }

    // Exit code: 0 = pass, 1 = violations at or above threshold
    Ok(if report.verdict.pass { 0 } else { 1 })
}

fn cmd_list_rules(format_str: String, service: Option<String>) -> Result<i32, PostureError> {
    let mut rules = catalog(Config::default().rules.local_auth)?;

    if let Some(name) = service {
        let kind = azposture::resource::ServiceKind::from_str_lenient(&name)
            .ok_or_else(|| PostureError::Config(format!("unknown service '{name}'")))?;
        rules.retain(|(service, _)| *service == kind);
    }

    match format_str.as_str() {
        "json" => {
            let entries: Vec<serde_json::Value> = rules
                .iter()
                .map(|(service, rule)| {
                    serde_json::json!({
                        "service": service,
                        "id": rule.id,
                        "category": rule.category,
                        "subcategory": rule.subcategory,
                        "description": rule.description,
                        "severity": rule.severity,
                        "url": rule.url,
                    })
                })
                .collect();
            let json = serde_json::to_string_pretty(&entries)?;
            println!("{}", json);
        }
        _ => {
            println!(
                "{:<10} {:<28} {:<10} {:<14} DESCRIPTION",
                "ID", "SERVICE", "SEVERITY", "CATEGORY"
            );
            println!("{}", "-".repeat(100));
            for (service, rule) in &rules {
                println!(
                    "{:<10} {:<28} {:<10} {:<14} {}",
                    rule.id,
                    service.to_string(),
                    rule.severity.to_string(),
                    rule.category,
                    rule.description,
                );
            }
        }
    }

    Ok(0)
}

fn cmd_init(force: bool) -> Result<i32, PostureError> {
    let path = PathBuf::from(DEFAULT_CONFIG_FILE);

    if path.exists() && !force {
        eprintln!("{DEFAULT_CONFIG_FILE} already exists. Use --force to overwrite.");
        return Ok(1);
    }

    std::fs::write(&path, Config::starter_toml())?;
    println!("Created {}", DEFAULT_CONFIG_FILE);

    Ok(0)
}
