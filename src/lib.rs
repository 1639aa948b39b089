/*!
# Lintbridge

Unified importer for XML reports of external static analyzers. Reads
CppCheck, PHP_CodeSniffer and Gendarme output, normalizes violations to
a single model and attaches them to a resource tree of the project
sources with aggregated measures.

## Core Features

- **Three report dialects** - CppCheck (v1 and v2), PHP_CodeSniffer, Gendarme
- **Tolerant parsing** - malformed reports and unresolvable rows are skipped, not fatal
- **Location resolution** - file paths against source roots, .NET type names via a type registry
- **Resource tree** - arena-based project/directory/file hierarchy with measure aggregation
- **Severity overrides** - per-rule severity, scope and message from configuration
- **Encoding detection** - UTF-8/UTF-16 BOM and Windows-1251 fallback for report files
- **SARIF export** - CI/CD integration with standardized reporting
- **CLI interface** - import, scan, init and info commands for batch use

## Architecture

```text
Lintbridge
├── Core        - Violation model, import results, errors, file reading
├── Importers   - CppCheck, PHP_CodeSniffer, Gendarme XML parsers
├── Location    - Source roots, type registry, location parser
├── Resources   - Resource tree, measures, source scanner
├── Pipeline    - Import orchestration and tree attachment
├── Config      - TOML/YAML configuration with rule overrides
└── Reports     - SARIF, JSON, Text output
```

## Usage

### CLI

```bash
# Import reports and print violations
lintbridge import --path ./my-project --format text

# Fail a CI job on critical findings
lintbridge import --path ./my-project --fail-on critical

# Inspect the resource tree with violation counts
lintbridge -f json scan --path ./my-project --with-violations

# Show resolved configuration and report file matches
lintbridge info --path ./my-project
```

### Library

```no_run
# fn main() -> anyhow::Result<()> {
use lintbridge::import_project;

let results = import_project("./my-project")?;
println!("{} violations imported", results.total_violations());
# Ok(())
# }
```
*/

pub mod cli_common;
pub mod config;
pub mod core;
pub mod importers;
pub mod location;
pub mod pipeline;
pub mod reports;
pub mod resources;

// Re-export main types for convenience
pub use config::LintbridgeConfig;
pub use core::{ImportError, ImportMetadata, ImportResult, ImportResults, Severity, ToolStats, Violation};
pub use pipeline::ImportPipeline;

// Re-export importers and their context
pub use importers::{
    CodeSnifferImporter, CppcheckImporter, GendarmeImporter, ImportBatch, ImportContext,
    ReportImporter, RuleOverride, RuleTable,
};

// Re-export location resolution
pub use location::{LocationParser, ParsedLocation, RuleScope, SourceRoots, TypeRegistry};

// Re-export resource tree functionality
pub use resources::{MeasureKind, Measures, ResourceKind, ResourceTree, SourceScanner};

// Re-export reports functionality
pub use reports::{ReportConfig, ReportFormat, ReportManager, SarifReporter, TextReporter};

use anyhow::Result;
use std::path::Path;

/// Imports analyzer reports found under a project directory.
///
/// Loads the configuration from the project root (or uses defaults),
/// composes the built-in importers and runs the pipeline.
pub fn import_project<P: AsRef<Path>>(project_root: P) -> Result<ImportResults> {
    let root = project_root.as_ref();
    let config = LintbridgeConfig::load_or_default(root)?;
    let pipeline = ImportPipeline::with_default_importers(config);
    pipeline.run(root)
}

/// Builds the resource tree of a project with imported violations
/// attached and measures aggregated bottom-up.
pub fn import_to_tree<P: AsRef<Path>>(project_root: P) -> Result<(ResourceTree, ImportResults)> {
    let root = project_root.as_ref();
    let config = LintbridgeConfig::load_or_default(root)?;
    let pipeline = ImportPipeline::with_default_importers(config);

    let (mut tree, registry) = pipeline.scan(root)?;
    let results = pipeline.run_with_registry(root, &registry)?;
    pipeline.apply_to_tree(&results, &mut tree)?;
    tree.compute();

    Ok((tree, results))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = LintbridgeConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_pipeline_composition() {
        let pipeline = ImportPipeline::with_default_importers(LintbridgeConfig::default());
        assert_eq!(pipeline.importers().len(), 3);
    }

    #[test]
    fn test_empty_tree() {
        let tree = ResourceTree::new("demo");
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.name(tree.root()), "demo");
    }
}
