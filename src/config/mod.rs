/*!
# Configuration

Конфигурация импортера: имя проекта и корни исходников, умолчания
импорта, настройки инструментов и переопределения правил.

Файл ищется в корне проекта (`lintbridge.toml`, `lintbridge.yaml`),
отсутствие файла не ошибка: действуют умолчания.

## Пример

```toml
[project]
name = "billing"
source_roots = ["src", "lib"]

[import]
default_severity = "major"
default_message = "Rule violated"

[tools.cppcheck]
enabled = true
report_path = "build/cppcheck-*.xml"

[rules."gendarme:AvoidLongMethodsRule"]
severity = "critical"
scope = "method"
message = "Method is too long"

[types]
"Example.Core.Money" = "Example.Core/Money.cs"
```
*/

use crate::core::violation::Severity;
use crate::importers::{RuleOverride, RuleTable};
use crate::location::{RuleScope, TypeRegistry};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Ключи встроенных импортеров.
pub const KNOWN_TOOLS: [&str; 3] = ["cppcheck", "phpcs", "gendarme"];

/// Имена файлов конфигурации в порядке поиска.
const CONFIG_FILE_NAMES: [&str; 3] = ["lintbridge.toml", "lintbridge.yaml", "lintbridge.yml"];

/// Полная конфигурация импортера.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LintbridgeConfig {
    /// Описание проекта
    #[serde(default)]
    pub project: ProjectConfig,

    /// Умолчания импорта
    #[serde(default)]
    pub import: ImportConfig,

    /// Настройки инструментов по ключу
    #[serde(default)]
    pub tools: HashMap<String, ToolConfig>,

    /// Переопределения правил, ключ — `инструмент:правило`
    #[serde(default)]
    pub rules: HashMap<String, RuleOverrideConfig>,

    /// Явные записи реестра типов: полное имя -> путь ресурса
    #[serde(default)]
    pub types: HashMap<String, String>,
}

/// Описание проекта.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Имя проекта (корень дерева ресурсов)
    #[serde(default = "default_project_name")]
    pub name: String,

    /// Корни исходников относительно корня проекта
    #[serde(default = "default_source_roots")]
    pub source_roots: Vec<String>,
}

fn default_project_name() -> String {
    "project".to_string()
}

fn default_source_roots() -> Vec<String> {
    vec!["src".to_string()]
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: default_project_name(),
            source_roots: default_source_roots(),
        }
    }
}

/// Умолчания импорта.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Серьезность, когда ни отчет, ни правила ее не задали
    #[serde(default = "default_severity")]
    pub default_severity: Severity,

    /// Текст нарушения, когда отчет его не содержит
    #[serde(default = "default_message")]
    pub default_message: String,
}

fn default_severity() -> Severity {
    Severity::Major
}

fn default_message() -> String {
    "Rule violated".to_string()
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            default_severity: default_severity(),
            default_message: default_message(),
        }
    }
}

/// Настройки одного инструмента.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Участвует ли инструмент в импорте
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Маска путей к отчетам, перекрывает маску импортера
    #[serde(default)]
    pub report_path: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            report_path: None,
        }
    }
}

/// Переопределение одного правила.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleOverrideConfig {
    #[serde(default)]
    pub severity: Option<Severity>,

    #[serde(default)]
    pub scope: Option<RuleScope>,

    #[serde(default)]
    pub message: Option<String>,
}

impl LintbridgeConfig {
    /// Загружает конфигурацию из TOML или YAML файла.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config from {}", path.display()))?,
            _ => toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config from {}", path.display()))?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Сохраняет конфигурацию в TOML файл.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {}", path.as_ref().display()))?;
        Ok(())
    }

    /// Ищет файл конфигурации в корне проекта. Отсутствие файла не
    /// ошибка: возвращаются умолчания.
    pub fn load_or_default(project_root: &Path) -> Result<Self> {
        for file_name in CONFIG_FILE_NAMES {
            let path = project_root.join(file_name);
            if path.exists() {
                tracing::info!("Loading configuration from {}", path.display());
                return Self::load_from_file(&path);
            }
        }
        tracing::debug!("No configuration file in {}, using defaults", project_root.display());
        Ok(Self::default())
    }

    /// Создает файл конфигурации с примерами настроек.
    pub fn create_example_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = Self::example();
        config.save_to_file(path)
    }

    /// Конфигурация с примерами записей для каждой секции.
    pub fn example() -> Self {
        let mut config = Self::default();
        config.tools.insert(
            "cppcheck".to_string(),
            ToolConfig {
                enabled: true,
                report_path: Some("cppcheck-reports/cppcheck-result-*.xml".to_string()),
            },
        );
        config.rules.insert(
            "gendarme:AvoidLongMethodsRule".to_string(),
            RuleOverrideConfig {
                severity: Some(Severity::Critical),
                scope: Some(RuleScope::Method),
                message: Some("Method is too long".to_string()),
            },
        );
        config.types.insert(
            "Example.Core.Money".to_string(),
            "Example.Core/Money.cs".to_string(),
        );
        config
    }

    /// Проверяет согласованность конфигурации.
    pub fn validate(&self) -> Result<()> {
        if self.project.source_roots.is_empty() {
            anyhow::bail!("Configuration error: project.source_roots must not be empty");
        }

        for tool in self.tools.keys() {
            if !KNOWN_TOOLS.contains(&tool.as_str()) {
                anyhow::bail!(
                    "Configuration error: unknown tool '{}', expected one of {:?}",
                    tool,
                    KNOWN_TOOLS
                );
            }
        }

        for rule_key in self.rules.keys() {
            match rule_key.split_once(':') {
                Some((tool, rule)) if !rule.is_empty() => {
                    if !KNOWN_TOOLS.contains(&tool) {
                        anyhow::bail!(
                            "Configuration error: rule '{}' references unknown tool '{}'",
                            rule_key,
                            tool
                        );
                    }
                }
                _ => anyhow::bail!(
                    "Configuration error: rule key '{}' must have the form 'tool:rule'",
                    rule_key
                ),
            }
        }

        Ok(())
    }

    /// Участвует ли инструмент в импорте.
    pub fn tool_enabled(&self, tool_key: &str) -> bool {
        self.tools.get(tool_key).map(|t| t.enabled).unwrap_or(true)
    }

    /// Маска путей к отчетам инструмента из конфигурации.
    pub fn report_glob_for(&self, tool_key: &str) -> Option<&str> {
        self.tools.get(tool_key)?.report_path.as_deref()
    }

    /// Собирает таблицу переопределений правил.
    pub fn rule_table(&self) -> RuleTable {
        let mut table = RuleTable::new();
        for (key, rule) in &self.rules {
            table.insert(
                key.clone(),
                RuleOverride {
                    severity: rule.severity,
                    scope: rule.scope,
                    message: rule.message.clone(),
                },
            );
        }
        table
    }

    /// Собирает реестр типов из явных записей конфигурации.
    pub fn type_registry(&self) -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        for (type_name, resource_path) in &self.types {
            registry.register(type_name, resource_path);
        }
        registry
    }
}
