/*!
# Source Scanner

Обход каталогов исходников: строит дерево ресурсов проекта и
заполняет базовые метрики файлов. Попутно регистрирует типы в
реестре по соглашению "пространство имен повторяет путь", чтобы
привязка нарушений по имени типа работала без подсказок.

Подсчет комментариев нарочно простой: учитываются строки, целиком
начинающиеся с маркера комментария, и строки внутри блочных
комментариев. Код с комментарием в хвосте строки считается кодом.
*/

use super::measures::MeasureKind;
use super::tree::ResourceTree;
use crate::core::fs_utils::read_text_file;
use crate::location::TypeRegistry;
use anyhow::{Context, Result};
use std::path::Path;
use walkdir::WalkDir;

/// Маркеры комментариев для семейства языков.
#[derive(Debug, Clone, Copy)]
struct CommentStyle {
    line_markers: &'static [&'static str],
    block: Option<(&'static str, &'static str)>,
}

/// Сканер исходников проекта.
#[derive(Debug, Clone)]
pub struct SourceScanner {
    register_types: bool,
}

impl Default for SourceScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceScanner {
    pub fn new() -> Self {
        Self { register_types: true }
    }

    /// Отключает регистрацию типов (для повторного сканирования).
    pub fn with_type_registration(register_types: bool) -> Self {
        Self { register_types }
    }

    /// Сканирует корни исходников и строит дерево ресурсов.
    ///
    /// Нечитаемые файлы пропускаются с предупреждением, отсутствующий
    /// корень тоже не считается ошибкой. Файлы с неизвестным
    /// расширением в дерево не попадают.
    pub fn scan(
        &self,
        project_root: &Path,
        source_roots: &[String],
        project_name: &str,
        registry: &mut TypeRegistry,
    ) -> Result<ResourceTree> {
        let mut tree = ResourceTree::new(project_name);
        let mut files_scanned = 0usize;

        for root in source_roots {
            let root_dir = project_root.join(root);
            if !root_dir.is_dir() {
                tracing::warn!("Source root not found, skipping: {}", root_dir.display());
                continue;
            }

            for entry in WalkDir::new(&root_dir)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                let style = match comment_style_for(path) {
                    Some(style) => style,
                    None => continue,
                };

                let relative = path
                    .strip_prefix(&root_dir)
                    .with_context(|| format!("Path escapes source root: {}", path.display()))?
                    .to_string_lossy()
                    .replace('\\', "/");

                let content = match read_text_file(path) {
                    Ok(content) => content,
                    Err(err) => {
                        tracing::warn!("Skipping unreadable source file {}: {}", path.display(), err);
                        continue;
                    }
                };

                let (lines, comment_lines) = count_lines(&content, style);
                let file_node = tree.add_file_path(&relative)?;
                tree.set_measure(file_node, MeasureKind::Files, 1.0)?;
                tree.set_measure(file_node, MeasureKind::Lines, f64::from(lines))?;
                tree.set_measure(file_node, MeasureKind::CommentLines, f64::from(comment_lines))?;
                if lines > 0 {
                    tree.set_measure(
                        file_node,
                        MeasureKind::CommentDensity,
                        f64::from(comment_lines) / f64::from(lines),
                    )?;
                }

                if self.register_types {
                    registry.register_path(&relative);
                }
                files_scanned += 1;
            }
        }

        tracing::info!("Scanned {} source files into resource tree", files_scanned);
        Ok(tree)
    }
}

/// Считается ли файл исходником по расширению.
pub(crate) fn is_source_file(path: &Path) -> bool {
    comment_style_for(path).is_some()
}

/// Маркеры комментариев по расширению файла. `None` — файл не
/// считается исходником и в дерево не попадает.
fn comment_style_for(path: &Path) -> Option<CommentStyle> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    let style = match ext.as_str() {
        "c" | "h" | "cc" | "cpp" | "cxx" | "hpp" | "hh" | "cs" | "java" | "js" | "ts" | "go"
        | "rs" | "kt" | "scala" | "css" | "scss" | "less" => CommentStyle {
            line_markers: &["//"],
            block: Some(("/*", "*/")),
        },
        "php" => CommentStyle {
            line_markers: &["//", "#"],
            block: Some(("/*", "*/")),
        },
        "py" | "rb" | "sh" | "pl" | "yml" | "yaml" | "toml" => CommentStyle {
            line_markers: &["#"],
            block: None,
        },
        "sql" => CommentStyle {
            line_markers: &["--"],
            block: None,
        },
        "xml" | "html" | "htm" | "xhtml" => CommentStyle {
            line_markers: &[],
            block: Some(("<!--", "-->")),
        },
        _ => return None,
    };
    Some(style)
}

/// Считает непустые строки и строки комментариев.
fn count_lines(content: &str, style: CommentStyle) -> (u32, u32) {
    let mut lines = 0u32;
    let mut comment_lines = 0u32;
    let mut in_block = false;

    for raw_line in content.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        lines += 1;

        if in_block {
            comment_lines += 1;
            if let Some((_, end)) = style.block {
                if line.contains(end) {
                    in_block = false;
                }
            }
            continue;
        }

        if style.line_markers.iter().any(|m| line.starts_with(m)) {
            comment_lines += 1;
            continue;
        }

        if let Some((start, end)) = style.block {
            if let Some(rest) = line.strip_prefix(start) {
                comment_lines += 1;
                if !rest.contains(end) {
                    in_block = true;
                }
            }
        }
    }

    (lines, comment_lines)
}
