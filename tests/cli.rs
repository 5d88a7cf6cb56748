use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

const SCHEMA: &str = "type Project { tagline: String! } type Query { project: Project }";
const QUERY: &str = r#"{ project(name: "GraphQL") { tagline } }"#;

fn write_inputs(dir: &Path) -> (PathBuf, PathBuf) {
    let schema = dir.join("schema.graphql");
    let query = dir.join("query.graphql");
    fs::write(&schema, SCHEMA).unwrap();
    fs::write(&query, QUERY).unwrap();
    (schema, query)
}

fn querybridge() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("querybridge"))
}

#[test]
fn version_works() {
    querybridge()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("querybridge"));
}

#[test]
fn translates_with_banner_by_default() {
    let tmp = tempfile::tempdir().unwrap();
    let (schema, query) = write_inputs(tmp.path());

    querybridge()
        .arg(&schema)
        .arg(&query)
        .assert()
        .success()
        .stdout(predicate::str::contains("Translating GraphQL to XSB..."))
        .stdout(predicate::str::contains("Demand Transformation: Disabled"))
        .stdout(predicate::str::contains("ans(PROJECT_TAGLINE)"));
}

#[test]
fn quiet_prints_only_the_program() {
    let tmp = tempfile::tempdir().unwrap();
    let (schema, query) = write_inputs(tmp.path());

    querybridge()
        .args([schema.as_os_str(), query.as_os_str()])
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "% XSB Datalog generated from GraphQL query with root fields: project",
        ));
}

#[test]
fn demand_flag_emits_seed_facts() {
    let tmp = tempfile::tempdir().unwrap();
    let (schema, query) = write_inputs(tmp.path());

    querybridge()
        .args([schema.as_os_str(), query.as_os_str()])
        .args(["--demand", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("demand_project_B(\"GraphQL\")."))
        .stdout(predicate::str::contains("% With demand transformation"));
}

#[test]
fn json_report_is_well_formed() {
    let tmp = tempfile::tempdir().unwrap();
    let (schema, query) = write_inputs(tmp.path());

    let out = querybridge()
        .args([schema.as_os_str(), query.as_os_str()])
        .args(["--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(report["root_fields"], serde_json::json!(["project"]));
    assert_eq!(report["demand"], serde_json::json!(false));
    assert!(
        report["program"]
            .as_str()
            .unwrap()
            .contains("ans(PROJECT_TAGLINE)")
    );
}

#[test]
fn output_file_is_written_with_parents() {
    let tmp = tempfile::tempdir().unwrap();
    let (schema, query) = write_inputs(tmp.path());
    let out = tmp.path().join("generated").join("query.P");

    querybridge()
        .args([schema.as_os_str(), query.as_os_str()])
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let written = fs::read_to_string(&out).unwrap();
    assert!(written.contains("ans(PROJECT_TAGLINE)"));
}

#[test]
fn explain_renders_the_transformation_table() {
    let tmp = tempfile::tempdir().unwrap();
    let (schema, query) = write_inputs(tmp.path());

    querybridge()
        .args([schema.as_os_str(), query.as_os_str()])
        .args(["--demand", "--explain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("adornment"))
        .stdout(predicate::str::contains("it has 1 bound argument(s)"));
}

#[test]
fn missing_schema_file_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let (_, query) = write_inputs(tmp.path());

    querybridge()
        .arg(tmp.path().join("nope.graphql"))
        .arg(&query)
        .assert()
        .failure()
        .stderr(predicate::str::contains("reading schema"));
}

#[test]
fn fragment_only_query_fails_cleanly() {
    let tmp = tempfile::tempdir().unwrap();
    let (schema, _) = write_inputs(tmp.path());
    let query = tmp.path().join("bad.graphql");
    fs::write(&query, "fragment info on Project { tagline }").unwrap();

    querybridge()
        .arg(&schema)
        .arg(&query)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no query operation"));
}
