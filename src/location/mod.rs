/*!
# Location Resolution

Привязка находок внешних инструментов к ресурсам проекта.

Инструменты сообщают о месте нарушения двумя способами: физическим
путем к файлу (часто абсолютным, со строкой в скобках) и полным
именем типа или члена. Модуль сводит оба способа к относительному
пути ресурса внутри проекта.

## Использование

```rust,ignore
let roots = SourceRoots::new(vec!["C:\\Work\\Example".to_string()]);
let mut registry = TypeRegistry::new();
registry.register_path("Example.Core/Money.cs");

let parser = LocationParser::new(&roots, &registry);
let loc = parser.parse(
    "C:\\Work\\Example\\Example.Core\\Money.cs(56,45)",
    "",
    RuleScope::Type,
);
assert_eq!(loc.resource_path.as_deref(), Some("Example.Core/Money.cs"));
assert_eq!(loc.line, Some(56));
```
*/

pub mod parser;

pub use parser::{LocationParser, ParsedLocation};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Область применения правила внешнего инструмента.
///
/// Определяет, как трактовать имя цели нарушения: тип, член типа
/// или сборка целиком.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleScope {
    Type,
    Method,
    Assembly,
}

impl Default for RuleScope {
    fn default() -> Self {
        RuleScope::Type
    }
}

impl fmt::Display for RuleScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuleScope::Type => "type",
            RuleScope::Method => "method",
            RuleScope::Assembly => "assembly",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for RuleScope {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "type" => Ok(RuleScope::Type),
            "method" => Ok(RuleScope::Method),
            "assembly" => Ok(RuleScope::Assembly),
            _ => Err(anyhow::anyhow!("Unknown rule scope: {}", s)),
        }
    }
}

/// Корневые каталоги исходников проекта.
///
/// Хранит нормализованные префиксы (прямые слеши, без завершающего
/// слеша). Сравнение без учета регистра: отчеты Windows-инструментов
/// не гарантируют регистр букв в путях.
#[derive(Debug, Clone, Default)]
pub struct SourceRoots {
    roots: Vec<String>,
}

impl SourceRoots {
    pub fn new(roots: Vec<String>) -> Self {
        let roots = roots
            .into_iter()
            .map(|r| normalize_separators(&r).trim_end_matches('/').to_string())
            .filter(|r| !r.is_empty())
            .collect();
        Self { roots }
    }

    /// Срезает известный корневой префикс, возвращая относительный
    /// путь ресурса. `None`, если путь не лежит ни под одним корнем.
    pub fn resolve(&self, raw_path: &str) -> Option<String> {
        let normalized = normalize_separators(raw_path);
        for root in &self.roots {
            if let Some(relative) = strip_prefix_ignore_case(&normalized, root) {
                if !relative.is_empty() {
                    return Some(relative.to_string());
                }
            }
        }
        None
    }

    /// Как [`resolve`](Self::resolve), но относительный путь вне
    /// корней возвращается нормализованным как есть: инструменты
    /// нередко пишут пути от корня проекта.
    pub fn resolve_or_relative(&self, raw_path: &str) -> Option<String> {
        if let Some(path) = self.resolve(raw_path) {
            return Some(path);
        }
        let normalized = normalize_separators(raw_path);
        if is_relative(&normalized) {
            return Some(normalized);
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }
}

/// Абсолютные пути: юниксовый корень или буква диска Windows.
fn is_relative(path: &str) -> bool {
    if path.starts_with('/') {
        return false;
    }
    let bytes = path.as_bytes();
    !(bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic())
}

/// Реестр соответствий "полное имя типа -> путь ресурса".
///
/// Заполняется сканером исходников по соглашению "пространство имен
/// повторяет путь" и дополняется явными записями из конфигурации.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Явная регистрация типа.
    pub fn register(&mut self, type_name: impl Into<String>, resource_path: impl Into<String>) {
        self.types.insert(type_name.into(), resource_path.into());
    }

    /// Регистрирует тип по соглашению из относительного пути файла:
    /// `Example.Core/Money.cs` -> `Example.Core.Money`.
    ///
    /// Явные записи из [`register`](Self::register) не перекрываются.
    pub fn register_path(&mut self, relative_path: &str) {
        let normalized = normalize_separators(relative_path);
        // Расширение срезается только у последнего компонента пути
        let file_start = normalized.rfind('/').map_or(0, |i| i + 1);
        let without_ext = match normalized[file_start..].rfind('.') {
            Some(dot) if dot > 0 => &normalized[..file_start + dot],
            _ => normalized.as_str(),
        };
        let type_name = without_ext.replace('/', ".");
        if type_name.is_empty() {
            return;
        }
        self.types
            .entry(type_name)
            .or_insert_with(|| normalized.clone());
    }

    /// Ищет ресурс по полному имени типа. Вложенные типы вида
    /// `Ns.Outer/Inner` приводятся к точечной записи перед поиском.
    pub fn lookup(&self, type_name: &str) -> Option<&str> {
        let normalized = type_name.replace('/', ".");
        self.types.get(&normalized).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Приводит разделители пути к прямым слешам.
pub(crate) fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Срезает префикс без учета регистра ASCII, требуя границу `/`.
fn strip_prefix_ignore_case<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    // Длина префикса может попасть внутрь многобайтового символа пути
    if path.len() <= prefix.len() || !path.is_char_boundary(prefix.len()) {
        return None;
    }
    let (head, tail) = path.split_at(prefix.len());
    if head.eq_ignore_ascii_case(prefix) {
        return tail.strip_prefix('/');
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_windows_path() {
        let roots = SourceRoots::new(vec!["C:\\Work\\Example".to_string()]);
        assert_eq!(
            roots.resolve("C:\\Work\\Example\\Example.Core\\Money.cs"),
            Some("Example.Core/Money.cs".to_string())
        );
    }

    #[test]
    fn test_resolve_ignores_case() {
        let roots = SourceRoots::new(vec!["c:/work/example".to_string()]);
        assert_eq!(
            roots.resolve("C:/Work/Example/Money.cs"),
            Some("Money.cs".to_string())
        );
    }

    #[test]
    fn test_resolve_outside_roots() {
        let roots = SourceRoots::new(vec!["/home/ci/project".to_string()]);
        assert_eq!(roots.resolve("/tmp/other/Money.cs"), None);
        // Префикс должен совпадать по границе каталога
        assert_eq!(roots.resolve("/home/ci/project2/Money.cs"), None);
    }

    #[test]
    fn test_resolve_multibyte_path_midchar_prefix() {
        // Длина корня попадает внутрь 'é': не паника, а промах
        let roots = SourceRoots::new(vec!["/a".to_string()]);
        assert_eq!(roots.resolve("/é/f.cs"), None);
        assert_eq!(roots.resolve_or_relative("/é/f.cs"), None);

        // Совпадающий корень с не-ASCII символами срезается как обычно
        let roots = SourceRoots::new(vec!["/проект/src".to_string()]);
        assert_eq!(
            roots.resolve("/проект/src/Main.cs"),
            Some("Main.cs".to_string())
        );
    }

    #[test]
    fn test_resolve_or_relative() {
        let roots = SourceRoots::new(vec!["/project/src".to_string()]);
        assert_eq!(
            roots.resolve_or_relative("/project/src/main.cpp"),
            Some("main.cpp".to_string())
        );
        assert_eq!(
            roots.resolve_or_relative("lib\\util.cpp"),
            Some("lib/util.cpp".to_string())
        );
        assert_eq!(roots.resolve_or_relative("/elsewhere/main.cpp"), None);
        assert_eq!(roots.resolve_or_relative("D:\\elsewhere\\main.cpp"), None);
    }

    #[test]
    fn test_registry_path_convention() {
        let mut registry = TypeRegistry::new();
        registry.register_path("Example.Core/Money.cs");

        assert_eq!(registry.lookup("Example.Core.Money"), Some("Example.Core/Money.cs"));
        assert_eq!(registry.lookup("Example.Core.Missing"), None);
    }

    #[test]
    fn test_registry_nested_type_lookup() {
        let mut registry = TypeRegistry::new();
        registry.register("Example.Core.Money.InnerClass", "Example.Core/Money.cs");

        assert_eq!(
            registry.lookup("Example.Core.Money/InnerClass"),
            Some("Example.Core/Money.cs")
        );
    }

    #[test]
    fn test_explicit_registration_wins() {
        let mut registry = TypeRegistry::new();
        registry.register("Example.Core.Money", "legacy/Money.cs");
        registry.register_path("Example.Core/Money.cs");

        assert_eq!(registry.lookup("Example.Core.Money"), Some("legacy/Money.cs"));
    }

    #[test]
    fn test_rule_scope_parsing() {
        assert_eq!("Method".parse::<RuleScope>().unwrap(), RuleScope::Method);
        assert_eq!("ASSEMBLY".parse::<RuleScope>().unwrap(), RuleScope::Assembly);
        assert!("class".parse::<RuleScope>().is_err());
    }
}
