use assert_cmd::Command;
use assert_fs::prelude::*;
use form_spec::FormDocument;
use serde_json::Value;
use std::fs;
use std::io::Write;

const CONTACT_FORM: &str = include_str!("../../form-spec/tests/fixtures/contact_form.json");
const FLAT_FORM: &str = include_str!("../../form-spec/tests/fixtures/flat_form.json");

fn formpage() -> Command {
    Command::new(env!("CARGO_BIN_EXE_formpage"))
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).expect("utf8 stdout")
}

#[test]
fn visibility_command_prints_map() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = assert_fs::TempDir::new()?;
    let form = workspace.child("form.json");
    form.write_str(FLAT_FORM)?;
    let answers = workspace.child("answers.json");
    answers.write_str(r#"{"2": true}"#)?;

    let stdout = stdout_of(
        formpage()
            .arg("visibility")
            .arg("--form")
            .arg(form.path())
            .arg("--answers")
            .arg(answers.path()),
    );
    let map: Value = serde_json::from_str(&stdout)?;
    assert_eq!(map["3"], true);
    Ok(())
}

#[test]
fn paginate_command_renders_text_pages() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = assert_fs::TempDir::new()?;
    let form = workspace.child("contact.json");
    form.write_str(CONTACT_FORM)?;

    let stdout = stdout_of(
        formpage()
            .env_remove("FORMPAGE_CONFIG")
            .arg("paginate")
            .arg("--form")
            .arg(form.path())
            .arg("--profile")
            .arg("blank-pdf"),
    );
    assert!(stdout.contains("=== Page 1 ==="));
    assert!(stdout.contains("[ ] Weekly"));
    Ok(())
}

#[test]
fn paginate_reads_config_from_env() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = assert_fs::TempDir::new()?;
    let form = workspace.child("contact.json");
    form.write_str(CONTACT_FORM)?;
    let mut config = tempfile::NamedTempFile::new()?;
    write!(config, r#"{{"profile": "preview"}}"#)?;

    let stdout = stdout_of(
        formpage()
            .env("FORMPAGE_CONFIG", config.path())
            .arg("paginate")
            .arg("--form")
            .arg(form.path())
            .arg("--format")
            .arg("json"),
    );
    let response: Value = serde_json::from_str(&stdout)?;
    assert_eq!(response["profile"], "preview");
    Ok(())
}

#[test]
fn validate_command_fails_on_missing_answers() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = assert_fs::TempDir::new()?;
    let form = workspace.child("contact.json");
    form.write_str(CONTACT_FORM)?;
    let answers = workspace.child("answers.json");
    answers.write_str(r#"{"first_name": "Ann"}"#)?;

    formpage()
        .arg("validate")
        .arg("--form")
        .arg(form.path())
        .arg("--answers")
        .arg(answers.path())
        .assert()
        .failure();
    Ok(())
}

#[test]
fn import_template_writes_rows() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = assert_fs::TempDir::new()?;
    let form = workspace.child("flat.json");
    form.write_str(FLAT_FORM)?;
    let out = workspace.child("rows.json");

    formpage()
        .arg("import-template")
        .arg("--form")
        .arg(form.path())
        .arg("--out")
        .arg(out.path())
        .assert()
        .success();

    let written: FormDocument = serde_json::from_str(&fs::read_to_string(out.path())?)?;
    assert!(written.fields.is_empty());
    let columns: Vec<_> = written.rows.iter().map(|row| row.columns.count()).collect();
    assert_eq!(columns, vec![3, 2, 1]);
    Ok(())
}
