/*!
# SARIF Reporter

Генерация отчетов в формате SARIF 2.1.0 для интеграции с:
- GitHub Security tab
- Azure DevOps Security scanning
- GitLab Security Dashboard
- Другими CI/CD системами

SARIF (Static Analysis Results Interchange Format) - стандартный формат
для обмена результатами статического анализа.

## Возможности:
- Совместимость со схемой SARIF 2.1.0 (camelCase поля)
- Правила, дедуплицированные по ключу `инструмент:правило`
- Сопоставление нарушений с исходным кодом (uri + startLine)
- Метаданные запуска импорта

## Использование:

```rust,ignore
use lintbridge::reports::sarif::SarifReporter;

let reporter = SarifReporter::new("lintbridge", "0.3.0");
let sarif_output = reporter.export_results(&import_results)?;

// Сохранение для GitHub Actions
std::fs::write("lintbridge-results.sarif", sarif_output)?;
```
*/

use super::{apply_min_severity, ReportConfig, ReportFormat, ReportGenerator};
use crate::core::results::ImportResults;
use crate::core::violation::{Severity, Violation};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// SARIF 2.1.0 корневая структура
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarifReport {
    /// Версия схемы SARIF
    #[serde(rename = "$schema")]
    pub schema: String,
    /// Версия SARIF
    pub version: String,
    /// Массив запусков анализа
    pub runs: Vec<SarifRun>,
}

/// Информация об одном запуске
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRun {
    /// Информация об инструменте
    pub tool: SarifTool,
    /// Результаты импорта
    pub results: Vec<SarifResult>,
    /// Метаданные запуска
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invocations: Option<Vec<SarifInvocation>>,
}

/// Инструмент анализа
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarifTool {
    /// Драйвер инструмента
    pub driver: SarifDriver,
}

/// Драйвер инструмента анализа
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifDriver {
    /// Имя инструмента
    pub name: String,
    /// Версия инструмента
    pub version: String,
    /// Семантическая версия
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_version: Option<String>,
    /// URL инструмента
    #[serde(skip_serializing_if = "Option::is_none")]
    pub information_uri: Option<String>,
    /// Правила, встреченные в результатах
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<SarifRule>>,
}

/// Правило анализа
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRule {
    /// Идентификатор правила (`инструмент:правило`)
    pub id: String,
    /// Имя правила
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Краткое описание
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<SarifMultiformatMessageString>,
    /// Конфигурация правила по умолчанию
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_configuration: Option<SarifReportingConfiguration>,
}

/// Конфигурация отчетности для правила
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarifReportingConfiguration {
    /// Уровень серьезности
    pub level: SarifLevel,
    /// Включено ли правило
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Уровень серьезности в SARIF
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SarifLevel {
    /// Информация
    Note,
    /// Предупреждение
    Warning,
    /// Ошибка
    Error,
}

/// Один результат (нарушение)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifResult {
    /// Идентификатор правила
    pub rule_id: String,
    /// Сообщение о проблеме
    pub message: SarifMessage,
    /// Уровень серьезности
    pub level: SarifLevel,
    /// Места обнаружения; пусто для нарушений уровня проекта
    pub locations: Vec<SarifLocation>,
    /// Отпечаток результата для дедупликации
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_fingerprints: Option<HashMap<String, String>>,
}

/// Сообщение в SARIF
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarifMessage {
    /// Текст сообщения
    pub text: String,
}

/// Многоформатная строка сообщения
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarifMultiformatMessageString {
    /// Текстовая версия
    pub text: String,
}

/// Место обнаружения проблемы
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifLocation {
    /// Физическое место в файле
    pub physical_location: SarifPhysicalLocation,
}

/// Физическое место в файле
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifPhysicalLocation {
    /// Ссылка на артефакт (файл)
    pub artifact_location: SarifArtifactLocation,
    /// Регион в файле
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<SarifRegion>,
}

/// Ссылка на артефакт (файл)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifArtifactLocation {
    /// URI файла относительно корня проекта
    pub uri: String,
}

/// Регион в файле
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRegion {
    /// Начальная строка (1-based)
    pub start_line: u32,
    /// Конечная строка
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
}

/// Метаданные запуска импорта
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifInvocation {
    /// Успешность запуска
    pub execution_successful: bool,
    /// Время начала
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time_utc: Option<DateTime<Utc>>,
    /// Время окончания
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time_utc: Option<DateTime<Utc>>,
}

/// SARIF репортер для результатов импорта
pub struct SarifReporter {
    /// Имя инструмента
    tool_name: String,
    /// Версия инструмента
    tool_version: String,
    /// URL инструмента
    tool_uri: Option<String>,
}

impl SarifReporter {
    /// Создает новый SARIF репортер
    pub fn new(tool_name: &str, tool_version: &str) -> Self {
        Self {
            tool_name: tool_name.to_string(),
            tool_version: tool_version.to_string(),
            tool_uri: None,
        }
    }

    /// Устанавливает URL инструмента
    pub fn with_tool_uri(mut self, uri: String) -> Self {
        self.tool_uri = Some(uri);
        self
    }

    /// Экспортирует результаты импорта в SARIF формат
    pub fn export_results(&self, results: &ImportResults) -> Result<String> {
        let sarif_report = self.create_sarif_report(results);
        let json_output = serde_json::to_string_pretty(&sarif_report)
            .context("Failed to serialize SARIF report to JSON")?;
        Ok(json_output)
    }

    /// Создает структуру SARIF отчета
    fn create_sarif_report(&self, results: &ImportResults) -> SarifReport {
        SarifReport {
            schema: "https://json.schemastore.org/sarif-2.1.0.json".to_string(),
            version: "2.1.0".to_string(),
            runs: vec![self.create_sarif_run(results)],
        }
    }

    /// Создает запуск анализа
    fn create_sarif_run(&self, results: &ImportResults) -> SarifRun {
        let rules = self.create_rules_from_results(results);
        let sarif_results = results
            .violations()
            .iter()
            .map(|v| self.convert_violation(v))
            .collect();

        let metadata = results.metadata();
        SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: self.tool_name.clone(),
                    version: self.tool_version.clone(),
                    semantic_version: Some(self.tool_version.clone()),
                    information_uri: self.tool_uri.clone(),
                    rules: Some(rules),
                },
            },
            results: sarif_results,
            invocations: Some(vec![SarifInvocation {
                execution_successful: true,
                start_time_utc: metadata.start_time,
                end_time_utc: metadata.end_time,
            }]),
        }
    }

    /// Собирает уникальные правила из нарушений, в стабильном порядке
    fn create_rules_from_results(&self, results: &ImportResults) -> Vec<SarifRule> {
        let mut rules: BTreeMap<String, SarifRule> = BTreeMap::new();

        for violation in results.violations() {
            let id = violation.qualified_rule();
            rules.entry(id.clone()).or_insert_with(|| SarifRule {
                id,
                name: Some(violation.rule_key.clone()),
                short_description: None,
                default_configuration: Some(SarifReportingConfiguration {
                    level: SarifLevel::from(violation.severity),
                    enabled: Some(true),
                }),
            });
        }

        rules.into_values().collect()
    }

    /// Конвертирует нарушение в SARIF результат
    fn convert_violation(&self, violation: &Violation) -> SarifResult {
        let locations = match &violation.resource_path {
            Some(path) => vec![SarifLocation {
                physical_location: SarifPhysicalLocation {
                    artifact_location: SarifArtifactLocation { uri: path.clone() },
                    region: violation.line.map(|line| SarifRegion {
                        start_line: line,
                        end_line: None,
                    }),
                },
            }],
            // Нарушение уровня проекта не привязано к файлу
            None => Vec::new(),
        };

        let mut fingerprints = HashMap::new();
        fingerprints.insert(
            "lintbridge/v1".to_string(),
            format!(
                "{}:{}:{}",
                violation.qualified_rule(),
                violation.resource_path.as_deref().unwrap_or("<project>"),
                violation.line.unwrap_or(0)
            ),
        );

        SarifResult {
            rule_id: violation.qualified_rule(),
            message: SarifMessage {
                text: violation.message.clone(),
            },
            level: SarifLevel::from(violation.severity),
            locations,
            partial_fingerprints: Some(fingerprints),
        }
    }
}

impl ReportGenerator for SarifReporter {
    fn generate_report(&self, results: &ImportResults, config: &ReportConfig) -> Result<String> {
        Self::validate_config(config)?;
        let filtered = apply_min_severity(results, config);
        self.export_results(&filtered)
    }

    fn supported_format() -> ReportFormat {
        ReportFormat::Sarif
    }
}

impl From<Severity> for SarifLevel {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Info => SarifLevel::Note,
            Severity::Minor | Severity::Major => SarifLevel::Warning,
            Severity::Critical | Severity::Blocker => SarifLevel::Error,
        }
    }
}
