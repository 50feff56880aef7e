//! End-to-end `submit` command tests
//!
//! Runs the built binary against a store address with nothing listening
//! and checks what reaches the terminal and what reaches the log file.

use std::fs;
use std::net::TcpListener;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn write_config(dir: &Path, port: u16) -> std::path::PathBuf {
    let path = dir.join("athus.toml");
    let log_file = dir.join("athus_form.log");
    fs::write(
        &path,
        format!(
            "[store]\nbackend = \"rest\"\nendpoint = \"http://127.0.0.1:{}\"\napi_key = \"secretkey\"\n\n\
             [logging]\nlevel = \"info\"\nfile = {:?}\ntimestamps = false\n",
            port,
            log_file.to_string_lossy()
        ),
    )
    .unwrap();
    path
}

fn run_submit(dir: &Path, config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_athus_form"))
        .arg("submit")
        .args(args)
        .arg("--config")
        .arg(config)
        .current_dir(dir)
        .env_remove("ATHUS_STORE_URL")
        .env_remove("ATHUS_STORE_KEY")
        .env_remove("ATHUS_TABLE")
        .env_remove("DATABASE_URL")
        .output()
        .expect("binary should run")
}

#[test]
fn test_failed_submit_shows_only_generic_notice_on_terminal() {
    let tmp = TempDir::new().expect("tmp");
    let config = write_config(tmp.path(), closed_port());

    let output = run_submit(tmp.path(), &config, &["1", "2024-04-30", "15.5"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("Terjadi kesalahan saat menyimpan data."), "stdout: {}", stdout);
    for terminal in [&stdout, &stderr] {
        assert!(!terminal.contains("Transport"), "detail leaked: {}", terminal);
        assert!(!terminal.contains("127.0.0.1"), "detail leaked: {}", terminal);
        assert!(!terminal.contains("GATEWAY"), "detail leaked: {}", terminal);
    }

    let log = fs::read_to_string(tmp.path().join("athus_form.log")).expect("log file");
    assert!(log.contains("insert failed [TRANSPORT]"), "log was:\n{}", log);
    assert!(log.contains("-6.9586756,110.2278471"), "log was:\n{}", log);
}

#[test]
fn test_invalid_submit_exits_with_field_errors_and_sends_nothing() {
    let tmp = TempDir::new().expect("tmp");
    let config = write_config(tmp.path(), closed_port());

    let output = run_submit(tmp.path(), &config, &["1", "1899-12-31", "15.5"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(3));
    assert!(stderr.contains("Tanggal terlalu awal."), "stderr: {}", stderr);
    let log = fs::read_to_string(tmp.path().join("athus_form.log")).unwrap_or_default();
    assert!(!log.contains("insert failed"));
}
