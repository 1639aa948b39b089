/*!
# CppCheck Importer

Разбор XML-отчетов CppCheck. Поддерживаются обе версии формата:

* версия 1: `<results><error file=".." line=".." id=".." msg=".."/></results>`;
* версия 2: `<results version="2"><errors><error id=".." msg=".."><location
  file=".." line=".."/></error></errors></results>`.

Строка отчета без обязательных полей (файл, строка, правило, текст)
пропускается с предупреждением.
*/

use super::{attr_value, ImportBatch, ImportContext, ReportImporter};
use crate::core::errors::{ImportError, ImportResult};
use crate::core::violation::{Severity, Violation};
use quick_xml::events::Event;
use quick_xml::Reader;

const TOOL_KEY: &str = "cppcheck";

/// Импортер отчетов CppCheck.
#[derive(Debug, Default, Clone)]
pub struct CppcheckImporter;

impl CppcheckImporter {
    pub fn new() -> Self {
        Self
    }
}

/// Накопленные атрибуты текущего элемента `error`.
#[derive(Debug, Default)]
struct PendingError {
    id: String,
    severity: Option<String>,
    msg: String,
    file: Option<String>,
    line: Option<String>,
}

impl ReportImporter for CppcheckImporter {
    fn tool_key(&self) -> &'static str {
        TOOL_KEY
    }

    fn default_report_glob(&self) -> &'static str {
        "cppcheck-reports/cppcheck-result-*.xml"
    }

    fn parse_report(&self, content: &str, ctx: &ImportContext<'_>) -> ImportResult<ImportBatch> {
        let mut reader = Reader::from_str(content);
        reader.trim_text(true);
        reader.expand_empty_elements(true);

        let mut batch = ImportBatch::new();
        let mut buf = Vec::new();
        let mut saw_root = false;
        let mut depth = 0usize;
        let mut pending: Option<PendingError> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    depth += 1;
                    let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    if !saw_root {
                        if tag_name != "results" {
                            return Err(ImportError::InvalidReport(format!(
                                "expected <results> root, found <{}>",
                                tag_name
                            )));
                        }
                        saw_root = true;
                        continue;
                    }
                    match tag_name.as_str() {
                        "error" => {
                            pending = Some(PendingError {
                                id: attr_value(e, "id").unwrap_or_default(),
                                severity: attr_value(e, "severity"),
                                msg: attr_value(e, "msg").unwrap_or_default(),
                                file: attr_value(e, "file"),
                                line: attr_value(e, "line"),
                            });
                        }
                        "location" => {
                            // Формат 2: берется только первое место
                            if let Some(ref mut error) = pending {
                                if error.file.is_none() {
                                    error.file = attr_value(e, "file");
                                    error.line = attr_value(e, "line");
                                }
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::End(ref e)) => {
                    depth = depth.saturating_sub(1);
                    if e.name().as_ref() == b"error" {
                        if let Some(error) = pending.take() {
                            finalize_row(error, ctx, &mut batch);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(e.into()),
                _ => {}
            }
            buf.clear();
        }

        if !saw_root {
            return Err(ImportError::InvalidReport("empty CppCheck report".to_string()));
        }
        // Обрыв отчета внутри элемента не дает события ошибки, только Eof
        if depth > 0 {
            return Err(ImportError::InvalidReport(
                "truncated CppCheck report: unclosed elements".to_string(),
            ));
        }
        Ok(batch)
    }
}

/// Проверяет обязательные поля строки и превращает ее в нарушение.
fn finalize_row(error: PendingError, ctx: &ImportContext<'_>, batch: &mut ImportBatch) {
    let file = error.file.as_deref().unwrap_or("").trim();
    let line_raw = error.line.as_deref().unwrap_or("").trim();
    if error.id.trim().is_empty() || error.msg.trim().is_empty() || file.is_empty() || line_raw.is_empty() {
        tracing::warn!(
            "CppCheck row skipped, required attributes missing (id='{}', file='{}')",
            error.id,
            file
        );
        batch.skip();
        return;
    }

    let line = match line_raw.parse::<u32>() {
        // Нулевая строка означает нарушение на файл целиком
        Ok(0) => None,
        Ok(line) => Some(line),
        Err(_) => {
            tracing::warn!("CppCheck row skipped, bad line number '{}' (id='{}')", line_raw, error.id);
            batch.skip();
            return;
        }
    };

    let severity = ctx.severity_for(
        TOOL_KEY,
        &error.id,
        error.severity.as_deref().and_then(map_severity),
    );

    let mut violation = Violation::new(TOOL_KEY, error.id, error.msg, severity);
    match ctx.source_roots.resolve_or_relative(file) {
        Some(path) => violation = violation.with_resource(path),
        None => tracing::debug!("CppCheck file outside source roots: {}", file),
    }
    if let Some(line) = line {
        violation = violation.with_line(line);
    }
    batch.push(violation);
}

/// Серьезности CppCheck: error, warning, style, performance,
/// portability, information.
fn map_severity(raw: &str) -> Option<Severity> {
    match raw {
        "error" => Some(Severity::Critical),
        "warning" => Some(Severity::Major),
        "style" | "performance" | "portability" => Some(Severity::Minor),
        "information" | "debug" => Some(Severity::Info),
        _ => None,
    }
}
