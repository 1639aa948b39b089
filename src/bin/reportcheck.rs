//! CLI утилита для проверки файлов отчетов внешних анализаторов
//!
//! Разбирает XML отчет каждым импортером и показывает, сколько
//! нарушений и пропущенных строк он дает, не привязывая их к
//! дереву ресурсов. Удобна для проверки отчета перед импортом.

use anyhow::Result;
use clap::Parser as ClapParser;
use lintbridge::cli_common::{
    format_duration, init_logging, print_error, print_header, print_info, print_success,
    print_warning, severity_badge, validate_path,
};
use lintbridge::config::KNOWN_TOOLS;
use lintbridge::core::fs_utils::read_text_file;
use lintbridge::core::violation::Severity;
use lintbridge::importers::{
    CodeSnifferImporter, CppcheckImporter, GendarmeImporter, ImportContext, ReportImporter,
    RuleTable,
};
use lintbridge::location::{SourceRoots, TypeRegistry};
use std::path::PathBuf;
use std::time::Instant;

#[derive(ClapParser, Debug)]
#[command(
    name = "reportcheck",
    about = "Проверяет, что XML отчет анализатора разбирается импортерами lintbridge"
)]
struct Args {
    /// Путь к файлу отчета XML
    #[arg(help = "Файл отчета CppCheck, PHP_CodeSniffer или Gendarme")]
    path: PathBuf,

    /// Проверить только одним инструментом (cppcheck, phpcs, gendarme)
    #[arg(short, long)]
    tool: Option<String>,

    /// Подробное логирование
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    print_header(
        "reportcheck",
        env!("CARGO_PKG_VERSION"),
        "Validates analyzer report files before import",
    );

    validate_path(&args.path, "Report file")?;

    let importers = build_importers(args.tool.as_deref())?;
    let content = read_text_file(&args.path)?;

    // Пустой контекст: проверяется только разбор, без привязки к ресурсам
    let source_roots = SourceRoots::new(Vec::new());
    let type_registry = TypeRegistry::new();
    let rules = RuleTable::new();
    let ctx = ImportContext {
        source_roots: &source_roots,
        type_registry: &type_registry,
        rules: &rules,
        default_severity: Severity::Major,
        default_message: "Rule violated",
    };

    let start = Instant::now();
    let mut parsed = false;

    for importer in &importers {
        match importer.parse_report(&content, &ctx) {
            Ok(batch) => {
                parsed = true;
                print_success(&format!(
                    "{}: {} violation(s), {} row(s) skipped",
                    importer.tool_key(),
                    batch.violations.len(),
                    batch.skipped
                ));
                if let Some(worst) = batch.violations.iter().map(|v| v.severity).max() {
                    print_info(&format!("  worst severity: {}", severity_badge(worst)));
                }
            }
            Err(e) if args.tool.is_some() => {
                print_error(&format!("{}: {}", importer.tool_key(), e));
            }
            Err(e) => {
                print_warning(&format!("{}: {}", importer.tool_key(), e));
            }
        }
    }

    println!("\nChecked in {}", format_duration(start.elapsed()));

    if !parsed {
        print_error("Report was not recognized by any importer");
        std::process::exit(1);
    }

    Ok(())
}

fn build_importers(tool: Option<&str>) -> Result<Vec<Box<dyn ReportImporter>>> {
    let all: Vec<Box<dyn ReportImporter>> = vec![
        Box::new(CppcheckImporter::new()),
        Box::new(CodeSnifferImporter::new()),
        Box::new(GendarmeImporter::new()),
    ];

    match tool {
        None => Ok(all),
        Some(tool) => {
            if !KNOWN_TOOLS.contains(&tool) {
                anyhow::bail!("Unknown tool '{}', expected one of {:?}", tool, KNOWN_TOOLS);
            }
            Ok(all.into_iter().filter(|i| i.tool_key() == tool).collect())
        }
    }
}
