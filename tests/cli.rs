mod common;

use std::fs;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use serde_json::Value;

use common::{TRAINING_CSV, TestWorkspace};

fn csv_canon() -> Command {
    Command::cargo_bin("csv-canon").expect("binary exists")
}

#[test]
fn script_writes_one_statement_per_noisy_column() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("capacitacoes.csv", TRAINING_CSV);
    let output = workspace.path().join("update_script.sql");

    csv_canon()
        .args([
            "script",
            "-i",
            input.to_str().unwrap(),
            "-C",
            "modalidade,instituicao_promotora,gratuito_ou_pago",
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let script = fs::read_to_string(&output).expect("read script");
    assert!(script.starts_with("-- Update script generated by csv-canon\n"));
    assert_eq!(script.matches("UPDATE capacitacoes").count(), 2);
    assert!(script.contains("-- Corrections for column: modalidade"));
    assert!(script.contains("    WHEN 'ead' THEN 'EAD'\n"));
    assert!(script.contains("    WHEN 'presencial' THEN 'Presencial'\n"));
    assert!(script.contains("WHERE modalidade IN ('ead', 'presencial');"));
    assert!(script.contains(
        "    WHEN 'Instit. Nacional de Pesquisas' THEN 'Instituto Nacional'\n"
    ));
    assert!(script.contains("    WHEN 'd''ávila consultoria' THEN 'D''Ávila Consultoria'\n"));
    assert!(!script.contains("gratuito_ou_pago"));
    assert!(script.contains(";\n\n-- Corrections for column: instituicao_promotora"));
}

#[test]
fn script_uses_table_and_threshold_from_config() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("export.csv", TRAINING_CSV);
    let config = workspace.write(
        "job.yaml",
        "table: public.capacitacoes\ncolumns: [instituicao_promotora]\nthreshold: 80\n",
    );

    csv_canon()
        .args([
            "script",
            "-i",
            input.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(contains("UPDATE public.capacitacoes"))
        .stdout(contains("WHEN 'd''ávila consultoria'"))
        .stdout(contains("Instit. Nacional de Pesquisas").not());
}

#[test]
fn script_without_corrections_writes_nothing() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("capacitacoes.csv", TRAINING_CSV);
    let output = workspace.path().join("update_script.sql");

    csv_canon()
        .args([
            "script",
            "-i",
            input.to_str().unwrap(),
            "-C",
            "gratuito_ou_pago",
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    assert!(!output.exists());
}

#[test]
fn unknown_column_is_skipped() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("capacitacoes.csv", TRAINING_CSV);

    csv_canon()
        .args([
            "suggest",
            "-i",
            input.to_str().unwrap(),
            "-C",
            "mes,modalidade",
        ])
        .assert()
        .success()
        .stdout(contains("mes: skipped"))
        .stdout(contains("modalidade: 2 correction(s)"))
        .stdout(contains("  'ead' -> 'EAD'"));
}

#[test]
fn suggest_emits_json_corrections() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("capacitacoes.csv", TRAINING_CSV);

    let assert = csv_canon()
        .args([
            "suggest",
            "-i",
            input.to_str().unwrap(),
            "-C",
            "modalidade,gratuito_ou_pago",
            "--json",
        ])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf-8 stdout");
    let parsed: Value = serde_json::from_str(&stdout).expect("json output");
    let columns = parsed.as_array().expect("array");
    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0]["column"], "modalidade");
    assert_eq!(columns[0]["corrections"][0]["from"], "ead");
    assert_eq!(columns[0]["corrections"][0]["to"], "EAD");
}

#[test]
fn apply_rewrites_a_copy_of_the_input() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("capacitacoes.csv", TRAINING_CSV);
    let output = workspace.path().join("clean.csv");

    csv_canon()
        .args([
            "apply",
            "-i",
            input.to_str().unwrap(),
            "-C",
            "modalidade",
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let cleaned = fs::read_to_string(&output).expect("read output");
    let mut reader = csv::Reader::from_reader(cleaned.as_bytes());
    let rows = reader
        .records()
        .map(|record| record.expect("record"))
        .collect::<Vec<_>>();
    assert_eq!(rows.len(), 9);
    assert_eq!(&rows[2][1], "EAD");
    assert_eq!(&rows[5][1], "Presencial");
    assert_eq!(&rows[2][2], "Instit. Nacional de Pesquisas");
    assert_eq!(&rows[4][3], "");
}

#[test]
fn apply_refuses_stdin() {
    csv_canon()
        .args(["apply", "-i", "-", "-C", "modalidade", "-t", "t"])
        .write_stdin(TRAINING_CSV)
        .assert()
        .failure()
        .stderr(contains("cannot take stdin"));
}

#[test]
fn apply_refuses_to_overwrite_its_input() {
    let workspace = TestWorkspace::new();
    let mut contents = String::from("servidor,modalidade\n");
    for idx in 0..5000 {
        let modalidade = if idx % 7 == 0 { "ead" } else { "EAD" };
        contents.push_str(&format!("servidor{idx},{modalidade}\n"));
    }
    let input = workspace.write("cap.csv", &contents);

    csv_canon()
        .args([
            "apply",
            "-i",
            input.to_str().unwrap(),
            "-C",
            "modalidade",
            "-o",
            input.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("cannot overwrite its input"));

    let after = fs::read_to_string(&input).expect("read input");
    assert_eq!(after, contents);
}

#[test]
fn stdin_requires_a_table_name() {
    csv_canon()
        .args(["script", "-i", "-", "-C", "modalidade"])
        .write_stdin(TRAINING_CSV)
        .assert()
        .failure()
        .stderr(contains("--table"));

    csv_canon()
        .args(["script", "-i", "-", "-C", "modalidade", "-t", "capacitacoes"])
        .write_stdin(TRAINING_CSV)
        .assert()
        .success()
        .stdout(contains("UPDATE capacitacoes"));
}

#[test]
fn out_of_range_threshold_is_rejected() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("capacitacoes.csv", TRAINING_CSV);

    csv_canon()
        .args([
            "suggest",
            "-i",
            input.to_str().unwrap(),
            "-C",
            "modalidade",
            "--threshold",
            "120",
        ])
        .assert()
        .failure()
        .stderr(contains("outside the range 0-100"));
}

#[test]
fn missing_columns_fail_fast() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("capacitacoes.csv", TRAINING_CSV);

    csv_canon()
        .args(["suggest", "-i", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("No columns to clean"));
}
