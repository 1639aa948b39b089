/*!
# Import Pipeline

Оркестрация импорта: явная композиция импортеров, поиск файлов
отчетов по маскам, подготовка контекста (корни исходников, реестр
типов, таблица правил) и наложение нарушений на дерево ресурсов.

Состав импортеров задается вызывающим кодом, а не обнаруживается
автоматически: [`ImportPipeline::new`] принимает готовый список,
[`ImportPipeline::with_default_importers`] собирает встроенные
импортеры, пропуская выключенные конфигурацией.

Все операции синхронные и однопоточные: объемы отчетов такие, что
параллелизм не окупается, а порядок нарушений остается стабильным.
*/

use crate::config::LintbridgeConfig;
use crate::core::fs_utils::read_text_file;
use crate::core::results::ImportResults;
use crate::core::violation::Violation;
use crate::importers::{
    CodeSnifferImporter, CppcheckImporter, GendarmeImporter, ImportContext, ReportImporter,
};
use crate::location::{SourceRoots, TypeRegistry};
use crate::resources::measures::MeasureKind;
use crate::resources::scanner::{is_source_file, SourceScanner};
use crate::resources::tree::ResourceTree;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Конвейер импорта отчетов.
pub struct ImportPipeline {
    config: LintbridgeConfig,
    importers: Vec<Box<dyn ReportImporter>>,
}

impl ImportPipeline {
    /// Конвейер с явным списком импортеров.
    pub fn new(config: LintbridgeConfig, importers: Vec<Box<dyn ReportImporter>>) -> Self {
        Self { config, importers }
    }

    /// Конвейер со встроенными импортерами, кроме выключенных
    /// конфигурацией.
    pub fn with_default_importers(config: LintbridgeConfig) -> Self {
        let all: Vec<Box<dyn ReportImporter>> = vec![
            Box::new(CppcheckImporter::new()),
            Box::new(CodeSnifferImporter::new()),
            Box::new(GendarmeImporter::new()),
        ];
        let importers = all
            .into_iter()
            .filter(|importer| {
                let enabled = config.tool_enabled(importer.tool_key());
                if !enabled {
                    tracing::info!("Importer '{}' disabled by configuration", importer.tool_key());
                }
                enabled
            })
            .collect();
        Self::new(config, importers)
    }

    pub fn config(&self) -> &LintbridgeConfig {
        &self.config
    }

    pub fn importers(&self) -> &[Box<dyn ReportImporter>] {
        &self.importers
    }

    /// Полный прогон импорта: собирает реестр типов по исходникам и
    /// разбирает отчеты всех импортеров.
    ///
    /// Нечитаемый или битый файл отчета пропускается с
    /// предупреждением, остальные файлы обрабатываются.
    pub fn run(&self, project_root: &Path) -> Result<ImportResults> {
        let mut registry = self.config.type_registry();
        self.register_convention_types(project_root, &mut registry);
        self.run_with_registry(project_root, &registry)
    }

    /// Прогон импорта с готовым реестром типов (например, после
    /// сканирования исходников).
    pub fn run_with_registry(
        &self,
        project_root: &Path,
        registry: &TypeRegistry,
    ) -> Result<ImportResults> {
        let source_roots = self.import_source_roots(project_root);
        let rules = self.config.rule_table();
        let ctx = ImportContext {
            source_roots: &source_roots,
            type_registry: registry,
            rules: &rules,
            default_severity: self.config.import.default_severity,
            default_message: &self.config.import.default_message,
        };

        let mut results = ImportResults::new(&self.config.project.name);

        for importer in &self.importers {
            let tool = importer.tool_key();
            let pattern = self
                .config
                .report_glob_for(tool)
                .unwrap_or_else(|| importer.default_report_glob());

            let report_files = find_report_files(project_root, pattern)
                .with_context(|| format!("Bad report pattern for '{}': {}", tool, pattern))?;
            if report_files.is_empty() {
                tracing::info!("No {} reports matching '{}'", tool, pattern);
                continue;
            }

            for report_file in report_files {
                tracing::debug!("Parsing {} report: {}", tool, report_file.display());
                let content = match read_text_file(&report_file) {
                    Ok(content) => content,
                    Err(err) => {
                        tracing::warn!("Skipping unreadable report {}: {}", report_file.display(), err);
                        continue;
                    }
                };
                match importer.parse_report(&content, &ctx) {
                    Ok(batch) => {
                        tracing::info!(
                            "Imported {} violations from {} ({} rows skipped)",
                            batch.violations.len(),
                            report_file.display(),
                            batch.skipped
                        );
                        results.record_report(tool);
                        results.record_skipped(tool, batch.skipped);
                        for violation in batch.violations {
                            results.add_violation(violation);
                        }
                    }
                    Err(err) => {
                        tracing::warn!("Skipping malformed report {}: {}", report_file.display(), err);
                    }
                }
            }
        }

        results.sort_by_location();
        results.finish();
        Ok(results)
    }

    /// Сканирует исходники: дерево ресурсов и пополненный реестр типов.
    pub fn scan(&self, project_root: &Path) -> Result<(ResourceTree, TypeRegistry)> {
        let mut registry = self.config.type_registry();
        let scanner = SourceScanner::new();
        let tree = scanner.scan(
            project_root,
            &self.config.project.source_roots,
            &self.config.project.name,
            &mut registry,
        )?;
        Ok((tree, registry))
    }

    /// Накладывает импортированные нарушения на дерево ресурсов:
    /// метрика [`MeasureKind::Violations`] по файлам.
    ///
    /// Нарушение без ресурса или с файлом вне дерева учитывается на
    /// корневом узле проекта. Возвращает количество нарушений,
    /// привязанных к файлам.
    pub fn apply_to_tree(&self, results: &ImportResults, tree: &mut ResourceTree) -> Result<usize> {
        let mut attached = 0usize;
        for violation in results.violations() {
            let node = self.node_for(violation, tree);
            match node {
                Some(node) => {
                    tree.add_measure(node, MeasureKind::Violations, 1.0)?;
                    attached += 1;
                }
                None => {
                    tree.add_measure(tree.root(), MeasureKind::Violations, 1.0)?;
                }
            }
        }
        Ok(attached)
    }

    fn node_for(
        &self,
        violation: &Violation,
        tree: &ResourceTree,
    ) -> Option<crate::resources::tree::NodeId> {
        let path = violation.resource_path.as_deref()?;
        let node = tree.find_file(path);
        if node.is_none() {
            tracing::debug!("Violation file not in resource tree: {}", path);
        }
        node
    }

    /// Корни исходников для срезания префиксов: и абсолютные, и
    /// относительные формы, отчеты пишут пути по-разному.
    fn import_source_roots(&self, project_root: &Path) -> SourceRoots {
        let mut roots = Vec::new();
        for root in &self.config.project.source_roots {
            roots.push(project_root.join(root).to_string_lossy().to_string());
            roots.push(root.clone());
        }
        SourceRoots::new(roots)
    }

    /// Регистрирует типы по соглашению для всех исходников под
    /// корнями, не читая их содержимого.
    fn register_convention_types(&self, project_root: &Path, registry: &mut TypeRegistry) {
        for root in &self.config.project.source_roots {
            let root_dir = project_root.join(root);
            if !root_dir.is_dir() {
                continue;
            }
            for entry in WalkDir::new(&root_dir)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if !entry.file_type().is_file() || !is_source_file(entry.path()) {
                    continue;
                }
                if let Ok(relative) = entry.path().strip_prefix(&root_dir) {
                    registry.register_path(&relative.to_string_lossy().replace('\\', "/"));
                }
            }
        }
        tracing::debug!("Type registry holds {} entries", registry.len());
    }
}

/// Файлы отчетов по маске относительно корня проекта. Абсолютная
/// маска используется как есть. Порядок стабильный.
pub fn find_report_files(project_root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let full_pattern = if Path::new(pattern).is_absolute() {
        pattern.to_string()
    } else {
        project_root.join(pattern).to_string_lossy().to_string()
    };

    let mut files: Vec<PathBuf> = glob::glob(&full_pattern)
        .with_context(|| format!("Invalid glob pattern: {}", full_pattern))?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::violation::Severity;
    use std::fs;
    use tempfile::TempDir;

    fn write_cppcheck_report(dir: &Path, name: &str, body: &str) {
        let reports = dir.join("cppcheck-reports");
        fs::create_dir_all(&reports).unwrap();
        fs::write(reports.join(name), body).unwrap();
    }

    #[test]
    fn test_run_imports_matching_reports() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/main.cpp"), "int main() { return 0; }\n").unwrap();
        write_cppcheck_report(
            dir.path(),
            "cppcheck-result-1.xml",
            r#"<results>
  <error file="src/main.cpp" line="1" id="unusedFunction" severity="style" msg="Unused function"/>
</results>"#,
        );
        // Файл вне маски игнорируется
        fs::write(dir.path().join("cppcheck-reports/other.txt"), "not a report").unwrap();

        let pipeline = ImportPipeline::with_default_importers(LintbridgeConfig::default());
        let results = pipeline.run(dir.path()).unwrap();

        assert_eq!(results.total_violations(), 1);
        let violation = &results.violations()[0];
        assert_eq!(violation.resource_path.as_deref(), Some("main.cpp"));
        assert_eq!(violation.severity, Severity::Minor);
        assert_eq!(results.metadata().tools["cppcheck"].reports_parsed, 1);
    }

    #[test]
    fn test_run_tolerates_malformed_report_file() {
        let dir = TempDir::new().unwrap();
        write_cppcheck_report(dir.path(), "cppcheck-result-bad.xml", "<results><error");
        write_cppcheck_report(
            dir.path(),
            "cppcheck-result-good.xml",
            r#"<results>
  <error file="a.cpp" line="2" id="x" msg="m"/>
</results>"#,
        );

        let pipeline = ImportPipeline::with_default_importers(LintbridgeConfig::default());
        let results = pipeline.run(dir.path()).unwrap();

        // Битый файл пропущен, хороший импортирован
        assert_eq!(results.total_violations(), 1);
        assert_eq!(results.metadata().tools["cppcheck"].reports_parsed, 1);
    }

    #[test]
    fn test_disabled_tool_not_composed() {
        let mut config = LintbridgeConfig::default();
        config.tools.insert(
            "cppcheck".to_string(),
            crate::config::ToolConfig {
                enabled: false,
                report_path: None,
            },
        );

        let pipeline = ImportPipeline::with_default_importers(config);
        let keys: Vec<&str> = pipeline.importers().iter().map(|i| i.tool_key()).collect();
        assert!(!keys.contains(&"cppcheck"));
        assert!(keys.contains(&"phpcs"));
        assert!(keys.contains(&"gendarme"));
    }

    #[test]
    fn test_scan_and_apply_violations() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/core")).unwrap();
        fs::write(dir.path().join("src/core/main.cpp"), "int main() {}\n// c\n").unwrap();
        write_cppcheck_report(
            dir.path(),
            "cppcheck-result-1.xml",
            r#"<results>
  <error file="core/main.cpp" line="1" id="a" msg="first"/>
  <error file="core/missing.cpp" line="1" id="b" msg="second"/>
</results>"#,
        );

        let pipeline = ImportPipeline::with_default_importers(LintbridgeConfig::default());
        let (mut tree, registry) = pipeline.scan(dir.path()).unwrap();
        let results = pipeline.run_with_registry(dir.path(), &registry).unwrap();
        assert_eq!(results.total_violations(), 2);

        let attached = pipeline.apply_to_tree(&results, &mut tree).unwrap();
        assert_eq!(attached, 1);

        tree.compute();
        let root_violations = tree.measures(tree.root()).get(MeasureKind::Violations);
        // Нарушение без файла в дереве учтено на корне
        assert_eq!(root_violations, Some(2.0));

        let file = tree.find_file("core/main.cpp").unwrap();
        assert_eq!(tree.measures(file).get(MeasureKind::Violations), Some(1.0));
    }

    #[test]
    fn test_custom_report_path_from_config() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("build")).unwrap();
        fs::write(
            dir.path().join("build/analysis.xml"),
            r#"<results><error file="a.cpp" line="1" id="x" msg="m"/></results>"#,
        )
        .unwrap();

        let mut config = LintbridgeConfig::default();
        config.tools.insert(
            "cppcheck".to_string(),
            crate::config::ToolConfig {
                enabled: true,
                report_path: Some("build/analysis.xml".to_string()),
            },
        );

        let pipeline = ImportPipeline::with_default_importers(config);
        let results = pipeline.run(dir.path()).unwrap();
        assert_eq!(results.total_violations(), 1);
    }
}
