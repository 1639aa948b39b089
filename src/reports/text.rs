/*!
# Text Reporter

Генерация консольных текстовых отчетов по результатам импорта.

## Возможности:
- Цветной вывод в консоль (с поддержкой ANSI)
- Группировка нарушений по ресурсам
- Сводная статистика по серьезности и инструментам
- Фильтрация по уровню серьезности
- Совместимость с CI/CD (без цветов, NO_COLOR)

## Использование:

```rust,ignore
use lintbridge::reports::text::TextReporter;

let reporter = TextReporter::new();
let text_output = reporter.generate_report(&import_results, &config)?;
println!("{}", text_output);
```
*/

use super::{apply_min_severity, ReportConfig, ReportFormat, ReportGenerator};
use crate::core::results::ImportResults;
use crate::core::violation::{Severity, Violation};
use crate::resources::ResourceTree;
use anyhow::Result;
use std::collections::BTreeMap;

/// Текстовый репортер для консольного вывода
pub struct TextReporter {
    /// Использовать цветной вывод
    use_colors: bool,
    /// Группировать по ресурсам
    group_by_resources: bool,
    /// Готовый рендер дерева ресурсов
    tree_section: Option<String>,
}

/// Цвета для ANSI вывода
struct Colors;

impl Colors {
    const RESET: &'static str = "\x1b[0m";
    const BOLD: &'static str = "\x1b[1m";
    const RED: &'static str = "\x1b[31m";
    const YELLOW: &'static str = "\x1b[33m";
    const BLUE: &'static str = "\x1b[34m";
    const CYAN: &'static str = "\x1b[36m";
    const GRAY: &'static str = "\x1b[90m";
}

impl TextReporter {
    /// Создает новый текстовый репортер
    pub fn new() -> Self {
        Self {
            use_colors: Self::supports_colors(),
            group_by_resources: true,
            tree_section: None,
        }
    }

    /// Создает репортер с конфигурацией
    pub fn with_config(use_colors: bool, group_by_resources: bool) -> Self {
        Self {
            use_colors,
            group_by_resources,
            tree_section: None,
        }
    }

    /// Создает краткий репортер для CI/CD
    pub fn brief() -> Self {
        Self {
            use_colors: false,
            group_by_resources: false,
            tree_section: None,
        }
    }

    /// Добавляет в отчет секцию с деревом ресурсов и его мерами.
    pub fn with_tree(mut self, tree: &ResourceTree) -> Self {
        self.tree_section = Some(tree.to_string());
        self
    }

    /// Проверяет поддержку цветов в терминале
    fn supports_colors() -> bool {
        if std::env::var("NO_COLOR").is_ok() {
            return false;
        }

        if std::env::var("FORCE_COLOR").is_ok() {
            return true;
        }

        if let Ok(term) = std::env::var("TERM") {
            if term == "dumb" || term.is_empty() {
                return false;
            }
        }

        true
    }

    /// Генерирует текстовый отчет
    fn generate_text_report(&self, results: &ImportResults, config: &ReportConfig) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.generate_header(results));
        output.push_str(&self.generate_summary(results));

        if self.group_by_resources {
            output.push_str(&self.generate_violations_by_resource(results));
        } else {
            output.push_str(&self.generate_violations_list(results));
        }

        if config.include_stats {
            output.push_str(&self.generate_tool_stats(results));
        }

        if let Some(ref tree) = self.tree_section {
            output.push('\n');
            if self.use_colors {
                output.push_str(&format!("{}Resource Tree:{}\n", Colors::BOLD, Colors::RESET));
            } else {
                output.push_str("Resource Tree:\n");
            }
            output.push_str(tree);
            if !tree.ends_with('\n') {
                output.push('\n');
            }
        }

        Ok(output)
    }

    /// Генерирует заголовок отчета
    fn generate_header(&self, results: &ImportResults) -> String {
        let project = &results.metadata().project_name;
        let title = if self.use_colors {
            format!(
                "{}{}Import Report: {}{}\n",
                Colors::BOLD,
                Colors::CYAN,
                project,
                Colors::RESET
            )
        } else {
            format!("Import Report: {}\n", project)
        };

        let separator = if self.use_colors {
            format!("{}{}{}\n", Colors::GRAY, "=".repeat(50), Colors::RESET)
        } else {
            format!("{}\n", "=".repeat(50))
        };

        format!("{}{}\n", title, separator)
    }

    /// Генерирует сводную статистику по серьезности
    fn generate_summary(&self, results: &ImportResults) -> String {
        let counts = results.count_by_severity();
        let mut summary = String::new();

        if self.use_colors {
            summary.push_str(&format!("{}Summary:{}\n", Colors::BOLD, Colors::RESET));
        } else {
            summary.push_str("Summary:\n");
        }
        summary.push_str(&format!("  Total violations: {}\n", results.total_violations()));

        for severity in Severity::all_desc() {
            let count = counts.get(&severity).copied().unwrap_or(0);
            if count == 0 {
                continue;
            }
            if self.use_colors {
                let color = self.severity_color(severity);
                summary.push_str(&format!(
                    "  {}{}{}: {}\n",
                    color,
                    severity,
                    Colors::RESET,
                    count
                ));
            } else {
                summary.push_str(&format!("  {}: {}\n", severity, count));
            }
        }

        summary.push('\n');
        summary
    }

    /// Цвет для уровня серьезности
    fn severity_color(&self, severity: Severity) -> &'static str {
        match severity {
            Severity::Blocker | Severity::Critical => Colors::RED,
            Severity::Major | Severity::Minor => Colors::YELLOW,
            Severity::Info => Colors::BLUE,
        }
    }

    /// Нарушения, сгруппированные по ресурсам
    fn generate_violations_by_resource(&self, results: &ImportResults) -> String {
        let mut by_resource: BTreeMap<Option<&str>, Vec<&Violation>> = BTreeMap::new();
        for violation in results.violations() {
            by_resource
                .entry(violation.resource_path.as_deref())
                .or_default()
                .push(violation);
        }

        let mut output = String::new();
        for (resource, violations) in by_resource {
            let name = resource.unwrap_or("<project>");
            if self.use_colors {
                output.push_str(&format!("{}{}{}\n", Colors::BOLD, name, Colors::RESET));
            } else {
                output.push_str(&format!("{}\n", name));
            }

            let mut sorted = violations;
            sorted.sort_by_key(|v| v.line);
            for violation in sorted {
                output.push_str(&self.format_violation_line(violation));
            }
            output.push('\n');
        }
        output
    }

    /// Плоский список нарушений
    fn generate_violations_list(&self, results: &ImportResults) -> String {
        let mut output = String::new();
        for violation in results.violations() {
            output.push_str(&format!("{}\n", violation));
        }
        if !output.is_empty() {
            output.push('\n');
        }
        output
    }

    /// Одна строка нарушения внутри группы ресурса
    fn format_violation_line(&self, violation: &Violation) -> String {
        let line = match violation.line {
            Some(line) => format!("{}", line),
            None => "-".to_string(),
        };
        if self.use_colors {
            let color = self.severity_color(violation.severity);
            format!(
                "  {}{:>5}{} {}[{}]{} {} {}\n",
                Colors::GRAY,
                line,
                Colors::RESET,
                color,
                violation.severity,
                Colors::RESET,
                violation.qualified_rule(),
                violation.message
            )
        } else {
            format!(
                "  {:>5} [{}] {} {}\n",
                line,
                violation.severity,
                violation.qualified_rule(),
                violation.message
            )
        }
    }

    /// Статистика по инструментам
    fn generate_tool_stats(&self, results: &ImportResults) -> String {
        let tools = &results.metadata().tools;
        if tools.is_empty() {
            return String::new();
        }

        let mut output = String::new();
        if self.use_colors {
            output.push_str(&format!("{}Tools:{}\n", Colors::BOLD, Colors::RESET));
        } else {
            output.push_str("Tools:\n");
        }
        for (tool, stats) in tools {
            output.push_str(&format!(
                "  {}: {} reports parsed, {} imported, {} skipped\n",
                tool, stats.reports_parsed, stats.imported, stats.skipped
            ));
        }
        output
    }
}

impl ReportGenerator for TextReporter {
    fn generate_report(&self, results: &ImportResults, config: &ReportConfig) -> Result<String> {
        Self::validate_config(config)?;
        let filtered = apply_min_severity(results, config);
        self.generate_text_report(&filtered, config)
    }

    fn supported_format() -> ReportFormat {
        ReportFormat::Text
    }
}

impl Default for TextReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::MeasureKind;

    fn sample_results() -> ImportResults {
        let mut results = ImportResults::new("demo");
        results.add_violation(
            Violation::new("cppcheck", "nullPointer", "Null pointer dereference", Severity::Critical)
                .with_resource("src/main.cpp")
                .with_line(42),
        );
        results.add_violation(
            Violation::new("cppcheck", "unusedVariable", "Unused variable", Severity::Minor)
                .with_resource("src/main.cpp")
                .with_line(7),
        );
        results.add_violation(Violation::new(
            "gendarme",
            "AssemblyRule",
            "Assembly level issue",
            Severity::Major,
        ));
        results
    }

    #[test]
    fn test_plain_report_contains_summary_and_groups() {
        let reporter = TextReporter::with_config(false, true);
        let report = reporter
            .generate_report(&sample_results(), &ReportConfig::default())
            .unwrap();

        assert!(report.contains("Import Report: demo"));
        assert!(report.contains("Total violations: 3"));
        assert!(report.contains("critical: 1"));
        assert!(report.contains("src/main.cpp"));
        assert!(report.contains("<project>"));
        // Без цветов нет escape-последовательностей
        assert!(!report.contains("\x1b["));
    }

    #[test]
    fn test_violations_sorted_by_line_inside_group() {
        let reporter = TextReporter::with_config(false, true);
        let report = reporter
            .generate_report(&sample_results(), &ReportConfig::default())
            .unwrap();

        let pos_7 = report.find("unusedVariable").unwrap();
        let pos_42 = report.find("nullPointer").unwrap();
        assert!(pos_7 < pos_42);
    }

    #[test]
    fn test_min_severity_filters_rows() {
        let reporter = TextReporter::brief();
        let config = ReportConfig {
            min_severity: Some(Severity::Major),
            ..Default::default()
        };
        let report = reporter.generate_report(&sample_results(), &config).unwrap();

        assert!(report.contains("nullPointer"));
        assert!(!report.contains("unusedVariable"));
    }

    #[test]
    fn test_tree_section_appended() {
        let mut tree = ResourceTree::new("demo");
        let file = tree.add_file_path("src/main.cpp").unwrap();
        tree.add_measure(file, MeasureKind::Violations, 2.0).unwrap();
        tree.compute();

        let reporter = TextReporter::with_config(false, true).with_tree(&tree);
        let report = reporter
            .generate_report(&sample_results(), &ReportConfig::default())
            .unwrap();

        assert!(report.contains("Resource Tree:"));
        assert!(report.contains("-PACKAGE : src"));
        assert!(report.contains("violations=2"));

        // Без дерева секции нет
        let plain = TextReporter::with_config(false, true)
            .generate_report(&sample_results(), &ReportConfig::default())
            .unwrap();
        assert!(!plain.contains("Resource Tree:"));
    }

    #[test]
    fn test_stats_section_toggle() {
        let reporter = TextReporter::brief();
        let without = ReportConfig {
            include_stats: false,
            ..Default::default()
        };
        let report = reporter.generate_report(&sample_results(), &without).unwrap();
        assert!(!report.contains("Tools:"));

        let with = ReportConfig::default();
        let report = reporter.generate_report(&sample_results(), &with).unwrap();
        assert!(report.contains("Tools:"));
        assert!(report.contains("cppcheck: 0 reports parsed, 2 imported, 0 skipped"));
    }
}
