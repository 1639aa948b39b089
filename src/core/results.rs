/*!
# Import Results

Структуры для хранения и управления результатами импорта отчетов
внешних анализаторов. Используются репортерами для генерации
различных форматов вывода.
*/

use super::{Severity, Violation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Статистика по одному инструменту
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolStats {
    /// Количество разобранных файлов отчетов
    pub reports_parsed: usize,
    /// Количество импортированных нарушений
    pub imported: usize,
    /// Количество пропущенных строк отчета
    pub skipped: usize,
}

/// Метаданные импорта
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportMetadata {
    /// Время начала импорта
    pub start_time: Option<DateTime<Utc>>,
    /// Время окончания импорта
    pub end_time: Option<DateTime<Utc>>,
    /// Версия импортера
    pub importer_version: String,
    /// Имя проекта
    pub project_name: String,
    /// Статистика по инструментам
    pub tools: BTreeMap<String, ToolStats>,
}

/// Результаты импорта отчетов
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResults {
    /// Список импортированных нарушений
    violations: Vec<Violation>,
    /// Метаданные импорта
    metadata: ImportMetadata,
}

impl ImportResults {
    /// Создает новые пустые результаты импорта
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            violations: Vec::new(),
            metadata: ImportMetadata {
                start_time: Some(Utc::now()),
                end_time: None,
                importer_version: env!("CARGO_PKG_VERSION").to_string(),
                project_name: project_name.into(),
                tools: BTreeMap::new(),
            },
        }
    }

    /// Добавляет нарушение к результатам
    pub fn add_violation(&mut self, violation: Violation) {
        let stats = self.metadata.tools.entry(violation.tool.clone()).or_default();
        stats.imported += 1;
        self.violations.push(violation);
    }

    /// Отмечает пропущенную строку отчета инструмента
    pub fn record_skipped(&mut self, tool: &str, count: usize) {
        let stats = self.metadata.tools.entry(tool.to_string()).or_default();
        stats.skipped += count;
    }

    /// Отмечает успешно разобранный файл отчета
    pub fn record_report(&mut self, tool: &str) {
        let stats = self.metadata.tools.entry(tool.to_string()).or_default();
        stats.reports_parsed += 1;
    }

    /// Возвращает список нарушений
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Возвращает метаданные импорта
    pub fn metadata(&self) -> &ImportMetadata {
        &self.metadata
    }

    /// Возвращает общее количество нарушений
    pub fn total_violations(&self) -> usize {
        self.violations.len()
    }

    /// Проверяет, есть ли нарушения
    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    /// Количество нарушений не ниже заданной серьезности
    pub fn count_at_least(&self, min: Severity) -> usize {
        self.violations.iter().filter(|v| v.severity >= min).count()
    }

    /// Распределение нарушений по серьезности
    pub fn count_by_severity(&self) -> BTreeMap<Severity, usize> {
        let mut counts = BTreeMap::new();
        for violation in &self.violations {
            *counts.entry(violation.severity).or_insert(0) += 1;
        }
        counts
    }

    /// Объединяет результаты с другими результатами
    pub fn merge(&mut self, other: ImportResults) {
        self.violations.extend(other.violations);
        for (tool, stats) in other.metadata.tools {
            let entry = self.metadata.tools.entry(tool).or_default();
            entry.reports_parsed += stats.reports_parsed;
            entry.imported += stats.imported;
            entry.skipped += stats.skipped;
        }
    }

    /// Фильтрует результаты по минимальной серьезности
    pub fn filter_by_min_severity(&self, min: Severity) -> ImportResults {
        let mut filtered = self.clone();
        filtered.violations.retain(|v| v.severity >= min);
        filtered
    }

    /// Сортирует нарушения по ресурсу и строке для стабильного вывода
    pub fn sort_by_location(&mut self) {
        self.violations.sort_by(|a, b| {
            a.resource_path
                .cmp(&b.resource_path)
                .then(a.line.cmp(&b.line))
                .then(a.tool.cmp(&b.tool))
                .then(a.rule_key.cmp(&b.rule_key))
        });
    }

    /// Фиксирует время окончания импорта
    pub fn finish(&mut self) {
        self.metadata.end_time = Some(Utc::now());
    }

    /// Длительность импорта, если он завершен
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.metadata.start_time, self.metadata.end_time) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}

impl Default for ImportResults {
    fn default() -> Self {
        Self::new("project")
    }
}

impl fmt::Display for ImportResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Import results for '{}':", self.metadata.project_name)?;
        writeln!(f, "  Violations: {}", self.total_violations())?;
        for (severity, count) in self.count_by_severity().iter().rev() {
            writeln!(f, "    {}: {}", severity, count)?;
        }
        for (tool, stats) in &self.metadata.tools {
            writeln!(
                f,
                "  {}: {} reports, {} imported, {} skipped",
                tool, stats.reports_parsed, stats.imported, stats.skipped
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_violation(tool: &str, severity: Severity) -> Violation {
        Violation::new(tool, "rule", "message", severity).with_resource("src/a.cpp")
    }

    #[test]
    fn test_add_and_count() {
        let mut results = ImportResults::new("demo");
        results.add_violation(sample_violation("cppcheck", Severity::Major));
        results.add_violation(sample_violation("cppcheck", Severity::Blocker));
        results.add_violation(sample_violation("phpcs", Severity::Info));

        assert_eq!(results.total_violations(), 3);
        assert_eq!(results.count_at_least(Severity::Major), 2);
        assert_eq!(results.metadata().tools["cppcheck"].imported, 2);
    }

    #[test]
    fn test_merge_accumulates_tool_stats() {
        let mut left = ImportResults::new("demo");
        left.add_violation(sample_violation("cppcheck", Severity::Major));
        left.record_skipped("cppcheck", 2);

        let mut right = ImportResults::new("demo");
        right.add_violation(sample_violation("cppcheck", Severity::Minor));
        right.record_report("cppcheck");

        left.merge(right);
        let stats = &left.metadata().tools["cppcheck"];
        assert_eq!(stats.imported, 2);
        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.reports_parsed, 1);
        assert_eq!(left.total_violations(), 2);
    }

    #[test]
    fn test_sort_by_location() {
        let mut results = ImportResults::new("demo");
        results.add_violation(
            Violation::new("cppcheck", "b", "m", Severity::Major)
                .with_resource("src/z.cpp")
                .with_line(5),
        );
        results.add_violation(
            Violation::new("cppcheck", "a", "m", Severity::Major)
                .with_resource("src/a.cpp")
                .with_line(10),
        );
        results.add_violation(Violation::new("gendarme", "c", "m", Severity::Major));

        results.sort_by_location();
        // Нарушения уровня проекта (без ресурса) идут первыми
        assert!(results.violations()[0].resource_path.is_none());
        assert_eq!(results.violations()[1].resource_path.as_deref(), Some("src/a.cpp"));
        assert_eq!(results.violations()[2].resource_path.as_deref(), Some("src/z.cpp"));
    }

    #[test]
    fn test_filter_by_min_severity() {
        let mut results = ImportResults::new("demo");
        results.add_violation(sample_violation("cppcheck", Severity::Info));
        results.add_violation(sample_violation("cppcheck", Severity::Critical));

        let filtered = results.filter_by_min_severity(Severity::Major);
        assert_eq!(filtered.total_violations(), 1);
        assert_eq!(filtered.violations()[0].severity, Severity::Critical);
    }
}
