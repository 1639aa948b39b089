//! Общий модуль для CLI утилит lintbridge
//!
//! Инициализация логирования, цветной вывод статусных сообщений и
//! мелкие проверки путей, используемые обоими бинарниками.
//!
//! Логи и статусные сообщения идут в stderr: stdout остается чистым
//! для текста отчета, чтобы `lintbridge import > report.txt` и
//! конвейеры с `jq` работали без фильтрации.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use crate::core::violation::Severity;

/// Инициализирует логирование. `verbose` включает уровень DEBUG,
/// переменная `RUST_LOG` имеет приоритет над обоими уровнями.
pub fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    Ok(())
}

/// Выводит заголовок CLI утилиты
pub fn print_header(name: &str, version: &str, description: &str) {
    eprintln!(
        "{} {} - {}",
        "📥".blue(),
        name.bold().blue(),
        version.dimmed()
    );
    eprintln!("{}\n", description.dimmed());
}

/// Выводит успешное завершение операции
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✅".green(), message.green());
}

/// Выводит предупреждение
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠️".yellow(), message.yellow());
}

/// Выводит ошибку
pub fn print_error(message: &str) {
    eprintln!("{} {}", "❌".red(), message.red());
}

/// Выводит информационное сообщение
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ️".blue(), message);
}

/// Серьезность с цветом для консольных сводок: красный для
/// blocker/critical, желтый для major/minor, синий для info.
pub fn severity_badge(severity: Severity) -> String {
    let label = format!("[{}]", severity);
    match severity {
        Severity::Blocker | Severity::Critical => label.red().bold().to_string(),
        Severity::Major | Severity::Minor => label.yellow().to_string(),
        Severity::Info => label.blue().to_string(),
    }
}

/// Проверяет существование файла или директории
pub fn validate_path(path: &Path, description: &str) -> Result<()> {
    if !path.exists() {
        return Err(anyhow::anyhow!(
            "{} does not exist: {}",
            description,
            path.display()
        ));
    }
    Ok(())
}

/// Создает директорию если она не существует
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Форматирует продолжительность в человекочитаемый вид
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs == 0 {
        format!("{}ms", millis)
    } else if secs < 60 {
        format!("{}.{:03}s", secs, millis)
    } else {
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        use std::time::Duration;

        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(1)), "1.000s");
        assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
    }

    #[test]
    fn test_severity_badge_keeps_label() {
        // Цветовые коды опциональны, сам ярлык присутствует всегда
        assert!(severity_badge(Severity::Blocker).contains("[blocker]"));
        assert!(severity_badge(Severity::Info).contains("[info]"));
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path(Path::new("."), "Working directory").is_ok());
        assert!(validate_path(Path::new("no/such/path/here"), "Report").is_err());
    }

    #[test]
    fn test_ensure_dir_exists() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_dir_exists(&nested).unwrap();
        assert!(nested.is_dir());
        // Повторный вызов для существующей директории не ошибка
        ensure_dir_exists(&nested).unwrap();
    }
}
