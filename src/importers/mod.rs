/*!
# Report Importers

Импортеры отчетов внешних инструментов. Каждый импортер знает ключ
своего инструмента, маску путей к файлам отчетов по умолчанию и
умеет разобрать один файл отчета в пачку нарушений.

Терпимость к мусору: битая строка отчета пропускается с
предупреждением и учитывается в счетчике пропусков, остальные строки
импортируются. Ошибкой считается только нечитаемый XML целиком.
*/

pub mod codesniffer;
pub mod cppcheck;
pub mod gendarme;

pub use codesniffer::CodeSnifferImporter;
pub use cppcheck::CppcheckImporter;
pub use gendarme::GendarmeImporter;

use crate::core::errors::ImportResult;
use crate::core::violation::{Severity, Violation};
use crate::location::{LocationParser, RuleScope, SourceRoots, TypeRegistry};
use quick_xml::events::BytesStart;
use std::collections::HashMap;

/// Переопределение правила из конфигурации.
#[derive(Debug, Clone, Default)]
pub struct RuleOverride {
    pub severity: Option<Severity>,
    pub scope: Option<RuleScope>,
    pub message: Option<String>,
}

/// Таблица переопределений правил, ключ — `инструмент:правило`.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    overrides: HashMap<String, RuleOverride>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, qualified_key: impl Into<String>, rule: RuleOverride) {
        self.overrides.insert(qualified_key.into(), rule);
    }

    pub fn get(&self, tool: &str, rule: &str) -> Option<&RuleOverride> {
        self.overrides.get(&format!("{}:{}", tool, rule))
    }

    pub fn severity_for(&self, tool: &str, rule: &str) -> Option<Severity> {
        self.get(tool, rule).and_then(|r| r.severity)
    }

    pub fn scope_for(&self, tool: &str, rule: &str) -> Option<RuleScope> {
        self.get(tool, rule).and_then(|r| r.scope)
    }

    pub fn message_for(&self, tool: &str, rule: &str) -> Option<&str> {
        self.get(tool, rule).and_then(|r| r.message.as_deref())
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

/// Контекст импорта: все, что нужно импортеру помимо текста отчета.
pub struct ImportContext<'a> {
    pub source_roots: &'a SourceRoots,
    pub type_registry: &'a TypeRegistry,
    pub rules: &'a RuleTable,
    pub default_severity: Severity,
    pub default_message: &'a str,
}

impl<'a> ImportContext<'a> {
    pub fn location_parser(&self) -> LocationParser<'_> {
        LocationParser::new(self.source_roots, self.type_registry)
    }

    /// Серьезность нарушения: переопределение из конфигурации,
    /// затем значение из отчета, затем серьезность по умолчанию.
    pub fn severity_for(&self, tool: &str, rule: &str, reported: Option<Severity>) -> Severity {
        self.rules
            .severity_for(tool, rule)
            .or(reported)
            .unwrap_or(self.default_severity)
    }

    /// Текст нарушения: из отчета, иначе переопределение правила,
    /// иначе общий текст по умолчанию.
    pub fn message_or_default(&self, tool: &str, rule: &str, reported: &str) -> String {
        let reported = reported.trim();
        if !reported.is_empty() {
            return reported.to_string();
        }
        if let Some(message) = self.rules.message_for(tool, rule) {
            return message.to_string();
        }
        self.default_message.to_string()
    }
}

/// Результат разбора одного файла отчета.
#[derive(Debug, Default)]
pub struct ImportBatch {
    pub violations: Vec<Violation>,
    /// Количество пропущенных строк отчета
    pub skipped: usize,
}

impl ImportBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Импортер отчетов одного инструмента.
pub trait ReportImporter {
    /// Ключ инструмента в конфигурации и статистике.
    fn tool_key(&self) -> &'static str;

    /// Маска путей к файлам отчетов относительно корня проекта.
    fn default_report_glob(&self) -> &'static str;

    /// Разбирает содержимое одного файла отчета.
    fn parse_report(&self, content: &str, ctx: &ImportContext<'_>) -> ImportResult<ImportBatch>;
}

/// Значение атрибута элемента по имени, с разбором XML-сущностей.
pub(crate) fn attr_value(e: &BytesStart<'_>, name: &str) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == name.as_bytes() {
            return match attr.unescape_value() {
                Ok(value) => Some(value.to_string()),
                Err(_) => Some(String::from_utf8_lossy(&attr.value).to_string()),
            };
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_table_lookup() {
        let mut table = RuleTable::new();
        table.insert(
            "cppcheck:nullPointer",
            RuleOverride {
                severity: Some(Severity::Blocker),
                scope: None,
                message: None,
            },
        );

        assert_eq!(table.severity_for("cppcheck", "nullPointer"), Some(Severity::Blocker));
        assert_eq!(table.severity_for("cppcheck", "other"), None);
        assert_eq!(table.severity_for("phpcs", "nullPointer"), None);
    }

    #[test]
    fn test_context_severity_priority() {
        let roots = SourceRoots::default();
        let registry = TypeRegistry::new();
        let mut rules = RuleTable::new();
        rules.insert(
            "cppcheck:style",
            RuleOverride {
                severity: Some(Severity::Info),
                ..Default::default()
            },
        );
        let ctx = ImportContext {
            source_roots: &roots,
            type_registry: &registry,
            rules: &rules,
            default_severity: Severity::Major,
            default_message: "Rule violated",
        };

        // Конфигурация важнее отчета, отчет важнее умолчания
        assert_eq!(ctx.severity_for("cppcheck", "style", Some(Severity::Critical)), Severity::Info);
        assert_eq!(ctx.severity_for("cppcheck", "other", Some(Severity::Critical)), Severity::Critical);
        assert_eq!(ctx.severity_for("cppcheck", "other", None), Severity::Major);
    }

    #[test]
    fn test_message_fallback_chain() {
        let roots = SourceRoots::default();
        let registry = TypeRegistry::new();
        let mut rules = RuleTable::new();
        rules.insert(
            "gendarme:SomeRule",
            RuleOverride {
                message: Some("Configured message".to_string()),
                ..Default::default()
            },
        );
        let ctx = ImportContext {
            source_roots: &roots,
            type_registry: &registry,
            rules: &rules,
            default_severity: Severity::Major,
            default_message: "Rule violated",
        };

        assert_eq!(ctx.message_or_default("gendarme", "SomeRule", "From report"), "From report");
        assert_eq!(ctx.message_or_default("gendarme", "SomeRule", "  "), "Configured message");
        assert_eq!(ctx.message_or_default("gendarme", "Other", ""), "Rule violated");
    }
}
