/*!
# Location Parser

Разбор "сырых" указаний места нарушения из отчетов инструментов.

Источник места имеет приоритет над именем цели: если инструмент
сообщил физический путь к файлу, он используется напрямую. Имя типа
или члена служит запасным вариантом, когда путь отсутствует или не
лежит под известными корнями исходников.
*/

use super::{RuleScope, SourceRoots, TypeRegistry};
use once_cell::sync::Lazy;
use regex::Regex;

/// Суффикс вида `(56)`, `(56,45)` или `(≈56)` в конце пути.
/// Gendarme помечает приблизительные строки знаком `≈`.
static LINE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\s*[≈~]?\s*(\d+)\s*(?:,\s*\d+\s*)?\)\s*$").expect("valid regex"));

/// Результат привязки нарушения к ресурсу.
///
/// `resource_path` пустой — нарушение остается на уровне проекта.
/// `line` пустой — нарушение относится к файлу или модулю целиком.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedLocation {
    pub resource_path: Option<String>,
    pub line: Option<u32>,
}

impl ParsedLocation {
    /// Место не удалось привязать ни к одному ресурсу.
    pub fn project_level() -> Self {
        Self::default()
    }

    pub fn is_resolved(&self) -> bool {
        self.resource_path.is_some()
    }
}

/// Преобразует указания места из отчета в путь ресурса проекта.
pub struct LocationParser<'a> {
    roots: &'a SourceRoots,
    registry: &'a TypeRegistry,
}

impl<'a> LocationParser<'a> {
    pub fn new(roots: &'a SourceRoots, registry: &'a TypeRegistry) -> Self {
        Self { roots, registry }
    }

    /// Привязывает нарушение к ресурсу.
    ///
    /// Порядок попыток:
    /// 1. `source` — физический путь, возможно со строкой в скобках;
    /// 2. `target` — полное имя типа или члена, по реестру типов;
    /// 3. уровень проекта, если оба шага не дали ресурса.
    pub fn parse(&self, source: &str, target: &str, scope: RuleScope) -> ParsedLocation {
        let source = source.trim();
        if !source.is_empty() {
            if let Some(location) = self.parse_source(source) {
                return location;
            }
            tracing::debug!("Source path outside known roots: {}", source);
        }

        let target = target.trim();
        if !target.is_empty() {
            if let Some(location) = self.parse_target(target, scope) {
                return location;
            }
            tracing::debug!("Target type not registered: {}", target);
        }

        ParsedLocation::project_level()
    }

    fn parse_source(&self, source: &str) -> Option<ParsedLocation> {
        let (path_part, line) = split_line_suffix(source);
        let resource_path = self.roots.resolve(path_part)?;
        Some(ParsedLocation {
            resource_path: Some(resource_path),
            line,
        })
    }

    fn parse_target(&self, target: &str, scope: RuleScope) -> Option<ParsedLocation> {
        let type_name = match scope {
            // Для сборки файла-ресурса нет
            RuleScope::Assembly => return None,
            RuleScope::Type => target.to_string(),
            RuleScope::Method => declaring_type_of(target),
        };
        let resource_path = self.registry.lookup(&type_name)?;
        Some(ParsedLocation {
            resource_path: Some(resource_path.to_string()),
            line: None,
        })
    }
}

/// Отделяет суффикс со строкой от пути: `Money.cs(56,45)` -> (`Money.cs`, 56).
/// Номер колонки отбрасывается. Строка `0` означает отсутствие строки.
fn split_line_suffix(raw: &str) -> (&str, Option<u32>) {
    if let Some(caps) = LINE_SUFFIX.captures(raw) {
        let whole = caps.get(0).map(|m| m.start()).unwrap_or(raw.len());
        let line = caps
            .get(1)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .filter(|&l| l > 0);
        return (raw[..whole].trim_end(), line);
    }
    (raw, None)
}

/// Извлекает объявляющий тип из полной сигнатуры члена:
/// `Example.Core.IMoney Example.Core.IMoney::AddMoney(...)` ->
/// `Example.Core.IMoney`.
fn declaring_type_of(member: &str) -> String {
    let before_sep = match member.split_once("::") {
        Some((head, _)) => head,
        // Без `::` считаем, что это уже имя типа
        None => return member.to_string(),
    };
    match before_sep.rsplit_once(' ') {
        Some((_ret, type_name)) => type_name.to_string(),
        None => before_sep.to_string(),
    }
}
