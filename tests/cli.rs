mod common;

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use datalink_ingest::ingest::decode_bincode_records;
use predicates::str::contains;
use rust_decimal::Decimal;

use common::TestWorkspace;

const OPEC: &str = "date,value\n2024-01-12,80.18\nnot-a-date,5\n2024-01-11,79.02\n";

#[test]
fn parse_emits_json_lines_and_skips_bad_dates() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("opec.csv", OPEC);

    let output = cargo_bin_cmd!("datalink-ingest")
        .args(["parse", "-i", input.to_str().unwrap(), "-s", "QDL/OPEC"])
        .output()
        .expect("run parse");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    let records = stdout
        .lines()
        .map(|line| serde_json::from_str::<serde_json::Value>(line).expect("json line"))
        .collect::<Vec<_>>();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["symbol"], "QDL/OPEC");
    assert_eq!(records[0]["value"], "80.18");
    assert_eq!(records[1]["time"], "2024-01-11T00:00:00");
}

#[test]
fn parse_applies_value_column_and_limit() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "ibm.csv",
        "date,open,high,low,close,adj. close\n2021-12-02,100,101,100,101,999\n2021-12-03,101,102,100,102,998\n",
    );
    let output_path = workspace.path().join("ibm.bin");

    cargo_bin_cmd!("datalink-ingest")
        .args([
            "parse",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output_path.to_str().unwrap(),
            "--value-column",
            "Adj. Close",
            "--format",
            "bincode",
            "--limit",
            "1",
        ])
        .assert()
        .success();

    let bytes = fs::read(&output_path).expect("read output");
    let records = decode_bincode_records(&bytes).expect("decode records");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].value, Some(Decimal::from(999)));
}

#[test]
fn parse_reads_value_column_overrides_from_config() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "scf.csv",
        "Date,Open,High,Low,Close,Settle\n2020-03-02,300,310,299,305,306\n",
    );
    let config = workspace.write("ingest.yml", "value_columns:\n  SHFE/SCF2021: settle\n");

    cargo_bin_cmd!("datalink-ingest")
        .args([
            "parse",
            "-i",
            input.to_str().unwrap(),
            "-s",
            "SHFE/SCF2021",
            "-c",
            config.to_str().unwrap(),
            "--format",
            "table",
        ])
        .assert()
        .success()
        .stdout(contains("SHFE/SCF2021  2020-03-02 00:00:00    306"));
}

#[test]
fn parse_uses_fallback_time_without_a_date_column() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("abc.csv", "a,b,c\n2021-01-01,1,2\n");

    cargo_bin_cmd!("datalink-ingest")
        .args([
            "parse",
            "-i",
            input.to_str().unwrap(),
            "--fallback-time",
            "2023-05-17",
        ])
        .assert()
        .success()
        .stdout(contains("\"time\":\"2023-05-17T00:00:00\""))
        .stdout(contains("\"value\":null"));
}

#[test]
fn parse_fails_when_repeated_header_is_rejected() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("paged.csv", "date,value\n2024-01-12,1\ndate,value\n2024-01-13,2\n");

    cargo_bin_cmd!("datalink-ingest")
        .args([
            "parse",
            "-i",
            input.to_str().unwrap(),
            "--repeated-header",
            "reject",
        ])
        .assert()
        .failure()
        .stderr(contains("repeated header"));

    cargo_bin_cmd!("datalink-ingest")
        .args(["parse", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("2024-01-13"));
}

#[test]
fn schema_reports_yaml() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "wb.csv",
        "series_id,country_code,country_name,year,value\nVC.PKP.TOTL.UN,XKX,Kosovo,2017,357.0\n",
    );

    cargo_bin_cmd!("datalink-ingest")
        .args(["schema", "-i", input.to_str().unwrap(), "--yaml"])
        .assert()
        .success()
        .stdout(contains("field: year"))
        .stdout(contains("format: year"))
        .stdout(contains("primary_field: value"));
}

#[test]
fn source_prints_url_with_explicit_key() {
    cargo_bin_cmd!("datalink-ingest")
        .env_remove("NASDAQ_AUTH_TOKEN")
        .env_remove("QUANDL_AUTH_TOKEN")
        .args(["source", "QDL/BCHAIN", "--api-key", "k3y"])
        .assert()
        .success()
        .stdout(contains(
            "https://data.nasdaq.com/api/v3/datatables/QDL/BCHAIN.csv?api_key=k3y",
        ));
}

#[test]
fn source_falls_back_to_legacy_env_token() {
    cargo_bin_cmd!("datalink-ingest")
        .env_remove("NASDAQ_AUTH_TOKEN")
        .env("QUANDL_AUTH_TOKEN", "legacy")
        .args(["source", "ZILLOW/DATA"])
        .assert()
        .success()
        .stdout(contains("ZILLOW/DATA.csv?api_key=legacy"));
}

#[test]
fn source_without_credential_fails() {
    cargo_bin_cmd!("datalink-ingest")
        .env_remove("NASDAQ_AUTH_TOKEN")
        .env_remove("QUANDL_AUTH_TOKEN")
        .args(["source", "QDL/BCHAIN"])
        .assert()
        .failure()
        .stderr(contains("no API key configured"));
}
