/*!
# Integration Tests for Lintbridge

Полный цикл на временном проекте: конфигурация из файла, отчеты всех
трех инструментов, привязка нарушений к дереву ресурсов.
*/

use lintbridge::{
    ImportPipeline, LintbridgeConfig, MeasureKind, ResourceKind, Severity,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Проект с исходниками, конфигурацией и отчетами всех инструментов.
fn write_project(root: &Path) {
    write_file(
        root,
        "lintbridge.toml",
        r#"
[project]
name = "billing"
source_roots = ["src"]

[import]
default_severity = "major"
default_message = "Rule violated"

[rules."cppcheck:nullPointer"]
severity = "blocker"

[rules."gendarme:AvoidLongMethodsRule"]
severity = "critical"
scope = "method"

[types]
"Billing.Core.Invoice" = "dotnet/Billing.Core/Invoice.cs"
"#,
    );

    write_file(root, "src/native/payment.cpp", "int price;\n");
    write_file(root, "src/php/Gateway.php", "<?php\n");
    write_file(root, "src/dotnet/Billing.Core/Invoice.cs", "class Invoice {}\n");

    write_file(
        root,
        "cppcheck-reports/cppcheck-result-1.xml",
        r#"<?xml version="1.0" encoding="UTF-8"?>
<results version="2">
  <cppcheck version="2.12"/>
  <errors>
    <error id="nullPointer" severity="error" msg="Null pointer dereference: ptr" verbose="Null pointer dereference: ptr">
      <location file="src/native/payment.cpp" line="42"/>
    </error>
    <error id="unusedVariable" severity="style" msg="Unused variable: tmp">
      <location file="src/native/payment.cpp" line="7"/>
    </error>
  </errors>
</results>"#,
    );

    write_file(
        root,
        "phpcs-reports/phpcs-result-1.xml",
        r#"<?xml version="1.0" encoding="UTF-8"?>
<checkstyle version="3.7.2">
  <file name="src/php/Gateway.php">
    <error line="10" column="1" severity="error" message="Missing file doc comment" source="PEAR.Commenting.FileComment.Missing"/>
  </file>
</checkstyle>"#,
    );

    write_file(
        root,
        "gendarme-reports/gendarme-result-1.xml",
        r#"<?xml version="1.0" encoding="utf-8"?>
<gendarme-output date="2024-05-01">
  <rules>
    <rule Name="AvoidLongMethodsRule" Type="Method" Uri="http://example.org">Gendarme.Rules.Smells.AvoidLongMethodsRule</rule>
  </rules>
  <results>
    <rule Name="AvoidLongMethodsRule" Uri="http://example.org">
      <problem>Methods should stay short.</problem>
      <target Name="Billing.Core.Invoice">
        <defect Severity="Medium" Confidence="Normal" Location="Billing.Core.Invoice Billing.Core.Invoice::Total()">Method has 150 lines</defect>
      </target>
    </rule>
  </results>
</gendarme-output>"#,
    );
}

#[test]
fn test_full_import_with_configuration() {
    let dir = TempDir::new().unwrap();
    write_project(dir.path());

    let config = LintbridgeConfig::load_or_default(dir.path()).unwrap();
    assert_eq!(config.project.name, "billing");

    let pipeline = ImportPipeline::with_default_importers(config);
    let results = pipeline.run(dir.path()).unwrap();

    assert_eq!(results.total_violations(), 4);
    let metadata = results.metadata();
    assert_eq!(metadata.project_name, "billing");
    assert_eq!(metadata.tools["cppcheck"].reports_parsed, 1);
    assert_eq!(metadata.tools["cppcheck"].imported, 2);
    assert_eq!(metadata.tools["phpcs"].imported, 1);
    assert_eq!(metadata.tools["gendarme"].imported, 1);

    let by_rule = |rule: &str| {
        results
            .violations()
            .iter()
            .find(|v| v.rule_key == rule)
            .unwrap_or_else(|| panic!("no violation for rule {}", rule))
    };

    // Переопределение из конфигурации сильнее серьезности отчета
    let null_pointer = by_rule("nullPointer");
    assert_eq!(null_pointer.severity, Severity::Blocker);
    assert_eq!(null_pointer.resource_path.as_deref(), Some("native/payment.cpp"));
    assert_eq!(null_pointer.line, Some(42));
    assert_eq!(null_pointer.qualified_rule(), "cppcheck:nullPointer");

    let unused = by_rule("unusedVariable");
    assert_eq!(unused.severity, Severity::Minor);

    let phpcs = by_rule("PEAR.Commenting.FileComment.Missing");
    assert_eq!(phpcs.resource_path.as_deref(), Some("php/Gateway.php"));
    assert_eq!(phpcs.line, Some(10));

    // Дефект без Source привязывается по имени типа из конфигурации
    let gendarme = by_rule("AvoidLongMethodsRule");
    assert_eq!(
        gendarme.resource_path.as_deref(),
        Some("dotnet/Billing.Core/Invoice.cs")
    );
    assert_eq!(gendarme.severity, Severity::Critical);
    assert_eq!(gendarme.message, "Method has 150 lines");

    assert_eq!(results.count_at_least(Severity::Critical), 2);
}

#[test]
fn test_violations_attached_to_resource_tree() {
    let dir = TempDir::new().unwrap();
    write_project(dir.path());

    let config = LintbridgeConfig::load_or_default(dir.path()).unwrap();
    let pipeline = ImportPipeline::with_default_importers(config);

    let (mut tree, registry) = pipeline.scan(dir.path()).unwrap();
    let results = pipeline.run_with_registry(dir.path(), &registry).unwrap();
    let attached = pipeline.apply_to_tree(&results, &mut tree).unwrap();
    tree.compute();

    assert_eq!(attached, 4);
    assert_eq!(tree.name(tree.root()), "billing");

    // Счетчики свернуты снизу вверх
    let root_measures = tree.measures(tree.root());
    assert_eq!(root_measures.get(MeasureKind::Violations), Some(4.0));

    let cpp_file = tree.find_file("native/payment.cpp").unwrap();
    assert_eq!(tree.measures(cpp_file).get(MeasureKind::Violations), Some(2.0));

    let native_dir = tree.find("native", ResourceKind::Package).unwrap();
    assert_eq!(tree.measures(native_dir).get(MeasureKind::Violations), Some(2.0));

    let php_file = tree.find_file("php/Gateway.php").unwrap();
    assert_eq!(tree.measures(php_file).get(MeasureKind::Violations), Some(1.0));
}

#[test]
fn test_disabled_tool_is_not_imported() {
    let dir = TempDir::new().unwrap();
    write_project(dir.path());
    write_file(
        dir.path(),
        "lintbridge.toml",
        r#"
[project]
name = "billing"
source_roots = ["src"]

[tools.gendarme]
enabled = false
"#,
    );

    let config = LintbridgeConfig::load_or_default(dir.path()).unwrap();
    let pipeline = ImportPipeline::with_default_importers(config);
    let results = pipeline.run(dir.path()).unwrap();

    assert_eq!(results.total_violations(), 3);
    assert!(!results.metadata().tools.contains_key("gendarme"));
}

#[test]
fn test_import_convenience_function() {
    let dir = TempDir::new().unwrap();
    write_project(dir.path());

    let results = lintbridge::import_project(dir.path()).unwrap();
    assert_eq!(results.total_violations(), 4);
}

#[test]
fn test_import_to_tree_convenience_function() {
    let dir = TempDir::new().unwrap();
    write_project(dir.path());

    let (tree, results) = lintbridge::import_to_tree(dir.path()).unwrap();
    assert!(tree.is_computed());
    assert_eq!(results.total_violations(), 4);
    assert_eq!(
        tree.measures(tree.root()).get(MeasureKind::Violations),
        Some(4.0)
    );
}

#[test]
fn test_project_without_reports_is_empty() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "src/lib.rs", "fn main() {}\n");

    let results = lintbridge::import_project(dir.path()).unwrap();
    assert_eq!(results.total_violations(), 0);
    assert!(results.metadata().tools.is_empty());
}
