/*!
# PHP_CodeSniffer Importer

Разбор XML-отчетов PHP_CodeSniffer в формате checkstyle: элементы
`file` с атрибутом `name`, внутри — строки `error` и `warning` с
атрибутами `line`, `message` и `source` (полное имя сниффа).

Ключ правила — значение `source`. Строка без него пропускается,
пустой текст заменяется текстом по умолчанию, отсутствующая или
нулевая строка превращает нарушение в файловое.
*/

use super::{attr_value, ImportBatch, ImportContext, ReportImporter};
use crate::core::errors::{ImportError, ImportResult};
use crate::core::violation::{Severity, Violation};
use quick_xml::events::Event;
use quick_xml::Reader;

const TOOL_KEY: &str = "phpcs";

/// Импортер отчетов PHP_CodeSniffer.
#[derive(Debug, Default, Clone)]
pub struct CodeSnifferImporter;

impl CodeSnifferImporter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportImporter for CodeSnifferImporter {
    fn tool_key(&self) -> &'static str {
        TOOL_KEY
    }

    fn default_report_glob(&self) -> &'static str {
        "phpcs-reports/phpcs-result-*.xml"
    }

    fn parse_report(&self, content: &str, ctx: &ImportContext<'_>) -> ImportResult<ImportBatch> {
        let mut reader = Reader::from_str(content);
        reader.trim_text(true);
        reader.expand_empty_elements(true);

        let mut batch = ImportBatch::new();
        let mut buf = Vec::new();
        let mut saw_root = false;
        let mut depth = 0usize;
        // Файл без атрибута name: строки внутри считаются пропущенными
        let mut current_file: Option<String> = None;
        let mut in_file = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    depth += 1;
                    let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    if !saw_root {
                        if tag_name != "checkstyle" && tag_name != "phpcs" {
                            return Err(ImportError::InvalidReport(format!(
                                "expected <checkstyle> or <phpcs> root, found <{}>",
                                tag_name
                            )));
                        }
                        saw_root = true;
                        continue;
                    }
                    match tag_name.as_str() {
                        "file" => {
                            in_file = true;
                            current_file = attr_value(e, "name").filter(|n| !n.trim().is_empty());
                            if current_file.is_none() {
                                tracing::warn!("PHP_CodeSniffer file element without name, rows will be skipped");
                            }
                        }
                        "error" | "warning" if in_file => {
                            finalize_row(&tag_name, e, current_file.as_deref(), ctx, &mut batch);
                        }
                        _ => {}
                    }
                }
                Ok(Event::End(ref e)) => {
                    depth = depth.saturating_sub(1);
                    if e.name().as_ref() == b"file" {
                        in_file = false;
                        current_file = None;
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(e.into()),
                _ => {}
            }
            buf.clear();
        }

        if !saw_root {
            return Err(ImportError::InvalidReport(
                "empty PHP_CodeSniffer report".to_string(),
            ));
        }
        // Обрыв отчета внутри элемента не дает события ошибки, только Eof
        if depth > 0 {
            return Err(ImportError::InvalidReport(
                "truncated PHP_CodeSniffer report: unclosed elements".to_string(),
            ));
        }
        Ok(batch)
    }
}

fn finalize_row(
    element: &str,
    e: &quick_xml::events::BytesStart<'_>,
    file: Option<&str>,
    ctx: &ImportContext<'_>,
    batch: &mut ImportBatch,
) {
    let file = match file {
        Some(file) => file,
        None => {
            batch.skip();
            return;
        }
    };

    let rule_key = attr_value(e, "source").unwrap_or_default();
    if rule_key.trim().is_empty() {
        tracing::warn!("PHP_CodeSniffer row skipped, source attribute missing (file='{}')", file);
        batch.skip();
        return;
    }

    let message = attr_value(e, "message").unwrap_or_default();
    let message = ctx.message_or_default(TOOL_KEY, &rule_key, &message);

    let reported = attr_value(e, "severity")
        .as_deref()
        .and_then(map_severity)
        .or_else(|| if element == "warning" { Some(Severity::Minor) } else { None });
    let severity = ctx.severity_for(TOOL_KEY, &rule_key, reported);

    let line = attr_value(e, "line")
        .and_then(|l| l.trim().parse::<u32>().ok())
        .filter(|&l| l > 0);

    let mut violation = Violation::new(TOOL_KEY, rule_key, message, severity);
    match ctx.source_roots.resolve_or_relative(file) {
        Some(path) => violation = violation.with_resource(path),
        None => tracing::debug!("PHP_CodeSniffer file outside source roots: {}", file),
    }
    if let Some(line) = line {
        violation = violation.with_line(line);
    }
    batch.push(violation);
}

/// Серьезности формата checkstyle.
fn map_severity(raw: &str) -> Option<Severity> {
    match raw {
        "error" => Some(Severity::Major),
        "warning" => Some(Severity::Minor),
        "info" => Some(Severity::Info),
        _ => None,
    }
}
