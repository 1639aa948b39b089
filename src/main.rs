/*!
# Lintbridge CLI

Command-line interface for importing external analyzer reports
into a project resource tree.
*/

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use lintbridge::cli_common::{ensure_dir_exists, format_duration};
use lintbridge::config::KNOWN_TOOLS;
use lintbridge::pipeline::find_report_files;
use lintbridge::reports::{ReportGenerator, TextReporter};
use lintbridge::{
    ImportPipeline, ImportResults, LintbridgeConfig, ReportConfig, ReportFormat, ReportManager,
    Severity,
};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(
    name = "lintbridge",
    version = env!("CARGO_PKG_VERSION"),
    about = "Imports XML reports of CppCheck, PHP_CodeSniffer and Gendarme into a project resource tree"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json, sarif)
    #[arg(short = 'f', long, default_value = "text")]
    format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Import analyzer reports and print the violations
    Import {
        /// Path to the project root
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        /// Path to configuration file (searched in the project root if not specified)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Import reports of a single tool only
        #[arg(long)]
        tool: Option<String>,

        /// Hide violations below this severity
        #[arg(long)]
        min_severity: Option<Severity>,

        /// Exit with code 1 when violations at or above this severity exist
        #[arg(long)]
        fail_on: Option<Severity>,
    },

    /// Build the resource tree of the project sources
    Scan {
        /// Path to the project root
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        /// Path to configuration file (searched in the project root if not specified)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Attach imported violations to the tree before printing
        #[arg(long)]
        with_violations: bool,
    },

    /// Write an example configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = "lintbridge.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show resolved configuration and report file matches
    Info {
        /// Path to the project root
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        /// Path to configuration file (searched in the project root if not specified)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("lintbridge={}", log_level))
        .init();

    match cli.command {
        Commands::Import {
            path,
            config,
            output,
            tool,
            min_severity,
            fail_on,
        } => {
            import_command(path, config, &cli.format, output, tool, min_severity, fail_on)?;
        }

        Commands::Scan {
            path,
            config,
            output,
            with_violations,
        } => {
            scan_command(path, config, &cli.format, output, with_violations)?;
        }

        Commands::Init { output, force } => {
            init_command(output, force)?;
        }

        Commands::Info { path, config } => {
            info_command(path, config)?;
        }
    }

    Ok(())
}

fn load_config(project_root: &Path, config_path: Option<&Path>) -> Result<LintbridgeConfig> {
    match config_path {
        Some(path) => LintbridgeConfig::load_from_file(path),
        None => LintbridgeConfig::load_or_default(project_root),
    }
}

/// Оставляет включенным только один инструмент.
fn restrict_to_tool(config: &mut LintbridgeConfig, tool: &str) -> Result<()> {
    if !KNOWN_TOOLS.contains(&tool) {
        anyhow::bail!("Unknown tool '{}', expected one of {:?}", tool, KNOWN_TOOLS);
    }
    for key in KNOWN_TOOLS {
        let entry = config.tools.entry(key.to_string()).or_default();
        entry.enabled = key == tool;
    }
    Ok(())
}

fn import_command(
    path: PathBuf,
    config_path: Option<PathBuf>,
    format: &str,
    output: Option<PathBuf>,
    tool: Option<String>,
    min_severity: Option<Severity>,
    fail_on: Option<Severity>,
) -> Result<()> {
    let term = Term::stdout();
    term.write_line(&format!(
        "📥 {} v{}",
        style("Lintbridge").bold().cyan(),
        env!("CARGO_PKG_VERSION")
    ))?;

    let start_time = Instant::now();

    // Show progress
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .context("Failed to set progress style")?,
    );
    pb.set_message("Loading configuration...");

    let mut config = load_config(&path, config_path.as_deref())?;
    if let Some(ref tool) = tool {
        restrict_to_tool(&mut config, tool)?;
    }

    pb.set_message("Scanning source roots...");
    let pipeline = ImportPipeline::with_default_importers(config);
    let (mut tree, registry) = pipeline.scan(&path)?;

    pb.set_message("Importing analyzer reports...");
    let results = pipeline.run_with_registry(&path, &registry)?;
    let attached = pipeline.apply_to_tree(&results, &mut tree)?;
    tree.compute();

    pb.finish_and_clear();

    let import_time = start_time.elapsed();

    // Output results
    let report_config = ReportConfig {
        format: format.parse().unwrap_or(ReportFormat::Text),
        output_path: output.as_ref().map(|p| p.to_string_lossy().to_string()),
        min_severity,
        include_stats: true,
    };

    if let Some(ref output_path) = output {
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                ensure_dir_exists(parent)?;
            }
        }
    }

    // Текстовый отчет дополняется деревом ресурсов со свернутыми мерами
    let report_content = match report_config.format {
        ReportFormat::Text => TextReporter::new()
            .with_tree(&tree)
            .generate_report(&results, &report_config),
        _ => ReportManager::new().generate_with_config(&results, &report_config),
    }
    .context("Failed to generate report")?;

    if let Some(output_path) = output {
        std::fs::write(&output_path, report_content)
            .with_context(|| format!("Failed to write to {}", output_path.display()))?;
        term.write_line(&format!("Results written to {}", output_path.display()))?;
    } else {
        println!("{}", report_content);
    }

    print_import_summary(&term, &results, attached, import_time)?;

    // Exit with error code if the failure threshold is reached
    if let Some(threshold) = fail_on {
        let over = results.count_at_least(threshold);
        if over > 0 {
            term.write_line(&format!(
                "❌ {} violation(s) at or above {}",
                style(over).red(),
                style(threshold).bold()
            ))?;
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_import_summary(
    term: &Term,
    results: &ImportResults,
    attached: usize,
    import_time: std::time::Duration,
) -> Result<()> {
    let metadata = results.metadata();
    let reports_parsed: usize = metadata.tools.values().map(|t| t.reports_parsed).sum();
    let skipped: usize = metadata.tools.values().map(|t| t.skipped).sum();

    term.write_line("")?;
    term.write_line(&format!("📊 {}", style("Import Summary").bold()))?;
    term.write_line(&format!("   Reports parsed: {}", style(reports_parsed).green()))?;
    term.write_line(&format!(
        "   Violations imported: {}",
        if results.has_violations() {
            style(results.total_violations()).yellow()
        } else {
            style(results.total_violations()).green()
        }
    ))?;

    let counts = results.count_by_severity();
    for severity in Severity::all_desc() {
        let count = counts.get(&severity).copied().unwrap_or(0);
        if count == 0 {
            continue;
        }
        let styled = match severity {
            Severity::Blocker | Severity::Critical => style(count).red(),
            Severity::Major | Severity::Minor => style(count).yellow(),
            Severity::Info => style(count).blue(),
        };
        term.write_line(&format!("   {}: {}", severity, styled))?;
    }

    term.write_line(&format!("   Attached to resources: {}", style(attached).green()))?;
    if skipped > 0 {
        term.write_line(&format!("   Rows skipped: {}", style(skipped).yellow()))?;
    }
    term.write_line(&format!(
        "   Import time: {}",
        style(format_duration(import_time)).dim()
    ))?;

    Ok(())
}

fn scan_command(
    path: PathBuf,
    config_path: Option<PathBuf>,
    format: &str,
    output: Option<PathBuf>,
    with_violations: bool,
) -> Result<()> {
    let term = Term::stdout();
    term.write_line(&format!("🌲 {}", style("Resource Tree").bold().cyan()))?;

    let config = load_config(&path, config_path.as_deref())?;
    let pipeline = ImportPipeline::with_default_importers(config);

    let (mut tree, registry) = pipeline.scan(&path)?;

    if with_violations {
        let results = pipeline.run_with_registry(&path, &registry)?;
        pipeline.apply_to_tree(&results, &mut tree)?;
    }
    tree.compute();

    let rendered = match format {
        "json" => serde_json::to_string_pretty(&tree.to_view())
            .context("Failed to serialize resource tree")?,
        _ => tree.to_string(),
    };

    if let Some(output_path) = output {
        std::fs::write(&output_path, &rendered)
            .with_context(|| format!("Failed to write to {}", output_path.display()))?;
        term.write_line(&format!("Tree written to {}", output_path.display()))?;
    } else {
        println!("{}", rendered);
    }

    term.write_line("")?;
    term.write_line(&format!("   Resources: {}", style(tree.len()).green()))?;
    term.write_line(&format!("   Registered types: {}", style(registry.len()).yellow()))?;

    Ok(())
}

fn init_command(output: PathBuf, force: bool) -> Result<()> {
    let term = Term::stdout();
    term.write_line(&format!("🔧 Creating configuration: {}", output.display()))?;

    if output.exists() && !force {
        term.write_line(&format!(
            "❌ {} already exists, use --force to overwrite",
            style(output.display()).red()
        ))?;
        std::process::exit(1);
    }

    LintbridgeConfig::create_example_config(&output)
        .with_context(|| format!("Failed to write configuration to {}", output.display()))?;
    term.write_line(&format!(
        "✅ Configuration created: {}",
        style(output.display()).green()
    ))?;

    Ok(())
}

fn info_command(path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let term = Term::stdout();
    term.write_line(&format!("📁 {}", style("Project Info").bold().cyan()))?;

    let config = load_config(&path, config_path.as_deref())?;

    term.write_line(&format!("   Project: {}", style(&config.project.name).green()))?;
    term.write_line(&format!(
        "   Source roots: {}",
        style(config.project.source_roots.join(", ")).green()
    ))?;
    term.write_line(&format!(
        "   Default severity: {}",
        style(config.import.default_severity).yellow()
    ))?;
    term.write_line(&format!("   Rule overrides: {}", style(config.rules.len()).yellow()))?;
    term.write_line(&format!("   Explicit types: {}", style(config.types.len()).yellow()))?;

    let pipeline = ImportPipeline::with_default_importers(config);

    term.write_line("")?;
    term.write_line("🔍 Importers:")?;
    for importer in pipeline.importers() {
        let pattern = pipeline
            .config()
            .report_glob_for(importer.tool_key())
            .unwrap_or_else(|| importer.default_report_glob())
            .to_string();
        let matches = find_report_files(&path, &pattern)?;
        term.write_line(&format!(
            "   {} [{}]: {} report file(s)",
            style(importer.tool_key()).bold(),
            style(&pattern).dim(),
            style(matches.len()).cyan()
        ))?;
    }

    if pipeline.importers().is_empty() {
        term.write_line(&format!("   {}", style("All importers disabled").yellow()))?;
    }

    Ok(())
}
