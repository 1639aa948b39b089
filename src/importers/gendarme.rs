/*!
# Gendarme Importer

Разбор отчетов Mono Gendarme (`gendarme-output`). Формат двухчастный:
секция `rules` объявляет правила и их область применения (тип, метод
или сборка), секция `results` содержит дефекты, сгруппированные по
правилам и целям.

Место дефекта задается атрибутами `Source` (путь с номером строки,
иногда приблизительным: `Money.cs(≈56)`) и `Location` (полное имя
типа или члена). Когда путь не удается привязать, нарушение ищется
по имени типа в реестре, а для правил уровня сборки остается на
уровне проекта.
*/

use super::{attr_value, ImportBatch, ImportContext, ReportImporter};
use crate::core::errors::{ImportError, ImportResult};
use crate::core::violation::{Severity, Violation};
use crate::location::RuleScope;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;

const TOOL_KEY: &str = "gendarme";

/// Импортер отчетов Gendarme.
#[derive(Debug, Default, Clone)]
pub struct GendarmeImporter;

impl GendarmeImporter {
    pub fn new() -> Self {
        Self
    }
}

/// Накопленное состояние текущего дефекта.
#[derive(Debug, Default)]
struct DefectState {
    severity: Option<String>,
    location: String,
    source: String,
    text: String,
}

impl ReportImporter for GendarmeImporter {
    fn tool_key(&self) -> &'static str {
        TOOL_KEY
    }

    fn default_report_glob(&self) -> &'static str {
        "gendarme-reports/gendarme-result-*.xml"
    }

    fn parse_report(&self, content: &str, ctx: &ImportContext<'_>) -> ImportResult<ImportBatch> {
        let mut reader = Reader::from_str(content);
        reader.trim_text(true);
        reader.expand_empty_elements(true);

        let mut batch = ImportBatch::new();
        let mut buf = Vec::new();

        let mut saw_root = false;
        let mut depth = 0usize;
        let mut in_rules = false;
        let mut in_results = false;
        let mut in_problem = false;
        let mut in_defect = false;

        // Области применения правил из секции rules
        let mut scopes: HashMap<String, RuleScope> = HashMap::new();
        let mut current_rule: Option<String> = None;
        let mut current_problem = String::new();
        let mut current_target: Option<String> = None;
        let mut defect = DefectState::default();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    depth += 1;
                    let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    if !saw_root {
                        if tag_name != "gendarme-output" {
                            return Err(ImportError::InvalidReport(format!(
                                "expected <gendarme-output> root, found <{}>",
                                tag_name
                            )));
                        }
                        saw_root = true;
                        continue;
                    }
                    match tag_name.as_str() {
                        "rules" => in_rules = true,
                        "results" => in_results = true,
                        "rule" if in_rules => {
                            let name = attr_value(e, "Name").unwrap_or_default();
                            let scope = attr_value(e, "Type")
                                .and_then(|t| t.parse::<RuleScope>().ok())
                                .unwrap_or_default();
                            if !name.is_empty() {
                                scopes.insert(name, scope);
                            }
                        }
                        "rule" if in_results => {
                            current_rule = attr_value(e, "Name").filter(|n| !n.trim().is_empty());
                            current_problem.clear();
                        }
                        "problem" if in_results => in_problem = true,
                        "target" if in_results => {
                            current_target = attr_value(e, "Name");
                        }
                        "defect" if in_results => {
                            in_defect = true;
                            defect = DefectState {
                                severity: attr_value(e, "Severity"),
                                location: attr_value(e, "Location").unwrap_or_default(),
                                source: attr_value(e, "Source").unwrap_or_default(),
                                text: String::new(),
                            };
                        }
                        _ => {}
                    }
                }
                Ok(Event::Text(e)) => {
                    let text = match e.unescape() {
                        Ok(text) => text.to_string(),
                        Err(_) => String::from_utf8_lossy(e.as_ref()).to_string(),
                    };
                    if in_problem {
                        current_problem = text;
                    } else if in_defect {
                        defect.text.push_str(&text);
                    }
                }
                Ok(Event::End(ref e)) => {
                    depth = depth.saturating_sub(1);
                    match e.name().as_ref() {
                        b"rules" => in_rules = false,
                        b"results" => in_results = false,
                        b"problem" => in_problem = false,
                        b"target" => current_target = None,
                        b"defect" => {
                            in_defect = false;
                            finalize_defect(
                                std::mem::take(&mut defect),
                                current_rule.as_deref(),
                                current_target.as_deref(),
                                &current_problem,
                                &scopes,
                                ctx,
                                &mut batch,
                            );
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(e.into()),
                _ => {}
            }
            buf.clear();
        }

        if !saw_root {
            return Err(ImportError::InvalidReport("empty Gendarme report".to_string()));
        }
        // Обрыв отчета внутри элемента не дает события ошибки, только Eof
        if depth > 0 {
            return Err(ImportError::InvalidReport(
                "truncated Gendarme report: unclosed elements".to_string(),
            ));
        }
        Ok(batch)
    }
}

fn finalize_defect(
    defect: DefectState,
    rule: Option<&str>,
    target: Option<&str>,
    problem: &str,
    scopes: &HashMap<String, RuleScope>,
    ctx: &ImportContext<'_>,
    batch: &mut ImportBatch,
) {
    let rule = match rule {
        Some(rule) => rule,
        None => {
            tracing::warn!("Gendarme defect skipped, enclosing rule has no name");
            batch.skip();
            return;
        }
    };

    // Конфигурация может переопределить область применения правила
    let scope = ctx
        .rules
        .scope_for(TOOL_KEY, rule)
        .or_else(|| scopes.get(rule).copied())
        .unwrap_or_default();

    // Location точнее имени цели, но оба ведут к одному типу
    let location = defect.location.trim();
    let type_hint = if location.is_empty() {
        target.unwrap_or("")
    } else {
        location
    };

    let parsed = ctx.location_parser().parse(&defect.source, type_hint, scope);

    let severity = ctx.severity_for(TOOL_KEY, rule, defect.severity.as_deref().and_then(map_severity));
    let message = resolve_message(&defect.text, problem, rule, ctx);

    let mut violation = Violation::new(TOOL_KEY, rule, message, severity);
    if let Some(path) = parsed.resource_path {
        violation = violation.with_resource(path);
    }
    if let Some(line) = parsed.line {
        violation = violation.with_line(line);
    }
    batch.push(violation);
}

/// Текст нарушения: текст дефекта, затем переопределение правила из
/// конфигурации, затем описание проблемы из отчета, затем общий текст.
fn resolve_message(defect_text: &str, problem: &str, rule: &str, ctx: &ImportContext<'_>) -> String {
    let defect_text = defect_text.trim();
    if !defect_text.is_empty() {
        return defect_text.to_string();
    }
    if let Some(message) = ctx.rules.message_for(TOOL_KEY, rule) {
        return message.to_string();
    }
    let problem = problem.trim();
    if !problem.is_empty() {
        return problem.to_string();
    }
    ctx.default_message.to_string()
}

/// Серьезности дефектов Gendarme: Critical, High, Medium, Low, Audit.
fn map_severity(raw: &str) -> Option<Severity> {
    match raw.to_lowercase().as_str() {
        "critical" => Some(Severity::Blocker),
        "high" => Some(Severity::Critical),
        "medium" => Some(Severity::Major),
        "low" => Some(Severity::Minor),
        "audit" => Some(Severity::Info),
        _ => None,
    }
}
