/*!
# Reports Module

Модуль для генерации отчетов импорта в различных форматах.
Поддерживает SARIF для интеграции с CI/CD системами.

## Поддерживаемые форматы:
- **SARIF 2.1.0** - для GitHub Security, Azure DevOps, других CI/CD
- **JSON** - структурированный отчет для API интеграции
- **Text** - человекочитаемый отчет для консоли

## Использование:

```rust,ignore
use lintbridge::reports::{ReportManager, ReportFormat};

let manager = ReportManager::new();
let sarif_output = manager.generate_report(&results, ReportFormat::Sarif)?;

// Сохранение для GitHub Actions
std::fs::write("lintbridge-results.sarif", sarif_output)?;
```
*/

pub mod sarif;
pub mod text;

pub use sarif::SarifReporter;
pub use text::TextReporter;

use crate::core::results::ImportResults;
use crate::core::violation::Severity;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Формат отчета
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    /// SARIF 2.1.0 для CI/CD интеграции
    Sarif,
    /// JSON для API интеграции
    Json,
    /// Текстовый отчет для консоли
    Text,
}

impl std::str::FromStr for ReportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sarif" => Ok(ReportFormat::Sarif),
            "json" => Ok(ReportFormat::Json),
            "text" | "txt" => Ok(ReportFormat::Text),
            _ => Err(anyhow::anyhow!("Unknown report format: {}", s)),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Sarif => write!(f, "SARIF"),
            ReportFormat::Json => write!(f, "JSON"),
            ReportFormat::Text => write!(f, "Text"),
        }
    }
}

/// Конфигурация отчета
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Формат отчета
    pub format: ReportFormat,
    /// Путь для сохранения отчета
    pub output_path: Option<String>,
    /// Фильтровать по минимальной серьезности
    pub min_severity: Option<Severity>,
    /// Включить статистику инструментов
    pub include_stats: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Text,
            output_path: None,
            min_severity: None,
            include_stats: true,
        }
    }
}

/// Трейт для генерации отчетов
pub trait ReportGenerator {
    /// Генерирует отчет на основе результатов импорта
    fn generate_report(&self, results: &ImportResults, config: &ReportConfig) -> Result<String>;

    /// Возвращает поддерживаемый формат отчета
    fn supported_format() -> ReportFormat;

    /// Валидирует конфигурацию отчета
    fn validate_config(config: &ReportConfig) -> Result<()> {
        if let Some(ref path) = config.output_path {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    return Err(anyhow::anyhow!(
                        "Output directory does not exist: {}",
                        parent.display()
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Применяет фильтр серьезности из конфигурации отчета.
fn apply_min_severity(results: &ImportResults, config: &ReportConfig) -> ImportResults {
    match config.min_severity {
        Some(min) => results.filter_by_min_severity(min),
        None => results.clone(),
    }
}

/// Менеджер отчетов для генерации в различных форматах
pub struct ReportManager {
    /// Конфигурация по умолчанию
    default_config: ReportConfig,
}

impl ReportManager {
    /// Создает новый менеджер отчетов
    pub fn new() -> Self {
        Self {
            default_config: ReportConfig::default(),
        }
    }

    /// Создает менеджер с конфигурацией
    pub fn with_config(config: ReportConfig) -> Self {
        Self {
            default_config: config,
        }
    }

    /// Генерирует отчет в указанном формате
    pub fn generate_report(&self, results: &ImportResults, format: ReportFormat) -> Result<String> {
        let mut config = self.default_config.clone();
        config.format = format;
        self.generate_with_config(results, &config)
    }

    /// Генерирует отчет с конфигурацией
    pub fn generate_with_config(
        &self,
        results: &ImportResults,
        config: &ReportConfig,
    ) -> Result<String> {
        match config.format {
            ReportFormat::Sarif => {
                let reporter = SarifReporter::new("lintbridge", env!("CARGO_PKG_VERSION"));
                reporter.generate_report(results, config)
            }
            ReportFormat::Json => {
                let filtered = apply_min_severity(results, config);
                let json_output = serde_json::to_string_pretty(&filtered)?;
                Ok(json_output)
            }
            ReportFormat::Text => {
                let reporter = TextReporter::new();
                reporter.generate_report(results, config)
            }
        }
    }

    /// Сохраняет отчет в файл
    pub fn save_report<P: AsRef<Path>>(
        &self,
        results: &ImportResults,
        format: ReportFormat,
        output_path: P,
    ) -> Result<()> {
        let report_content = self.generate_report(results, format)?;
        std::fs::write(output_path, report_content)?;
        Ok(())
    }

    /// Генерирует отчеты во всех поддерживаемых форматах
    pub fn generate_all_formats(&self, results: &ImportResults, output_dir: &Path) -> Result<()> {
        let formats = [
            (ReportFormat::Sarif, "import-results.sarif"),
            (ReportFormat::Json, "import-results.json"),
            (ReportFormat::Text, "import-results.txt"),
        ];

        for (format, filename) in &formats {
            let output_path = output_dir.join(filename);
            self.save_report(results, format.clone(), &output_path)
                .map_err(|e| anyhow::anyhow!("Failed to generate {} report: {}", format, e))?;

            tracing::info!("Generated {} report: {}", format, output_path.display());
        }

        Ok(())
    }
}

impl Default for ReportManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Вспомогательные функции для создания отчетов
pub mod utils {
    use super::*;

    /// Создает быстрый SARIF отчет для CI/CD
    pub fn quick_sarif_report(results: &ImportResults) -> Result<String> {
        let manager = ReportManager::new();
        manager.generate_report(results, ReportFormat::Sarif)
    }

    /// Создает консольный отчет с фильтрацией по серьезности
    pub fn console_report(results: &ImportResults, min_severity: Severity) -> Result<String> {
        let config = ReportConfig {
            format: ReportFormat::Text,
            min_severity: Some(min_severity),
            ..Default::default()
        };

        let manager = ReportManager::with_config(config);
        manager.generate_with_config(results, &manager.default_config)
    }
}
