/*!
# Report Format Tests

Генерация отчетов из результатов импорта: SARIF 2.1.0, JSON и текст.
*/

use lintbridge::{
    ImportResults, ReportConfig, ReportFormat, ReportManager, Severity, Violation,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn sample_results() -> ImportResults {
    let mut results = ImportResults::new("billing");
    results.record_report("cppcheck");
    results.add_violation(
        Violation::new("cppcheck", "nullPointer", "Null pointer dereference", Severity::Critical)
            .with_resource("native/payment.cpp")
            .with_line(42),
    );
    results.add_violation(
        Violation::new("cppcheck", "unusedVariable", "Unused variable: tmp", Severity::Minor)
            .with_resource("native/payment.cpp")
            .with_line(7),
    );
    results.add_violation(Violation::new(
        "gendarme",
        "AvoidSmallNamespaceRule",
        "Namespace has too few types",
        Severity::Info,
    ));
    results.sort_by_location();
    results.finish();
    results
}

#[test]
fn test_sarif_report_structure() {
    let manager = ReportManager::new();
    let sarif = manager
        .generate_report(&sample_results(), ReportFormat::Sarif)
        .unwrap();

    let value: serde_json::Value = serde_json::from_str(&sarif).unwrap();
    assert_eq!(value["version"], "2.1.0");

    let run = &value["runs"][0];
    assert_eq!(run["tool"]["driver"]["name"], "lintbridge");
    assert_eq!(run["results"].as_array().unwrap().len(), 3);

    let with_location = run["results"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["ruleId"] == "cppcheck:nullPointer")
        .unwrap();
    assert_eq!(with_location["level"], "error");
    let region = &with_location["locations"][0]["physicalLocation"];
    assert_eq!(region["artifactLocation"]["uri"], "native/payment.cpp");
    assert_eq!(region["region"]["startLine"], 42);

    // Нарушение уровня проекта остается без мест
    let project_level = run["results"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["ruleId"] == "gendarme:AvoidSmallNamespaceRule")
        .unwrap();
    assert_eq!(project_level["level"], "note");
    assert_eq!(project_level["locations"].as_array().unwrap().len(), 0);
}

#[test]
fn test_json_report_roundtrip() {
    let results = sample_results();
    let manager = ReportManager::new();
    let json = manager.generate_report(&results, ReportFormat::Json).unwrap();

    let restored: ImportResults = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.total_violations(), results.total_violations());
    assert_eq!(restored.violations()[0], results.violations()[0]);
    assert_eq!(restored.metadata().project_name, "billing");
}

#[test]
fn test_text_report_content() {
    let manager = ReportManager::new();
    let text = manager
        .generate_report(&sample_results(), ReportFormat::Text)
        .unwrap();

    assert!(text.contains("Import Report: billing"));
    assert!(text.contains("Total violations: 3"));
    assert!(text.contains("native/payment.cpp"));
    assert!(text.contains("cppcheck:nullPointer"));
}

#[test]
fn test_min_severity_applies_to_every_format() {
    let results = sample_results();
    let config = ReportConfig {
        format: ReportFormat::Sarif,
        output_path: None,
        min_severity: Some(Severity::Critical),
        include_stats: true,
    };

    let manager = ReportManager::new();
    let sarif = manager.generate_with_config(&results, &config).unwrap();
    let value: serde_json::Value = serde_json::from_str(&sarif).unwrap();
    assert_eq!(value["runs"][0]["results"].as_array().unwrap().len(), 1);

    let text = manager
        .generate_with_config(
            &results,
            &ReportConfig {
                format: ReportFormat::Text,
                ..config
            },
        )
        .unwrap();
    assert!(text.contains("Total violations: 1"));
    assert!(!text.contains("unusedVariable"));
}

#[test]
fn test_save_report_and_generate_all_formats() {
    let dir = TempDir::new().unwrap();
    let results = sample_results();
    let manager = ReportManager::new();

    let single = dir.path().join("report.sarif");
    manager
        .save_report(&results, ReportFormat::Sarif, &single)
        .unwrap();
    assert!(single.is_file());

    manager.generate_all_formats(&results, dir.path()).unwrap();
    assert!(dir.path().join("import-results.sarif").is_file());
    assert!(dir.path().join("import-results.json").is_file());
    assert!(dir.path().join("import-results.txt").is_file());
}
