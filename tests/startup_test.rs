use std::path::{Path, PathBuf};
use std::process::Command;

const CREDENTIALS: [&str; 3] = ["BINANCE_API_KEY", "BINANCE_API_SECRET", "COINGECKO_API_KEY"];

/// Empty scratch directory so neither `.env` nor `solbot.toml` is picked up
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("solbot-startup-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn run_bot(missing: &str, dir: &Path) -> std::process::Output {
    run_bot_with(missing, dir, &[])
}

fn run_bot_with(missing: &str, dir: &Path, extra_env: &[(&str, &str)]) -> std::process::Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_solbot"));
    cmd.current_dir(dir)
        .env_clear()
        .env("SOLBOT_LOG_DIR", dir)
        // Unreachable endpoints: any network attempt would hang or fail loudly
        .env("SOLBOT_COINGECKO_BASE_URL", "http://127.0.0.1:9")
        .env("SOLBOT_BINANCE_BASE_URL", "http://127.0.0.1:9");

    for name in CREDENTIALS {
        if name != missing {
            cmd.env(name, "present");
        }
    }

    for (name, value) in extra_env {
        cmd.env(name, value);
    }

    cmd.output().expect("failed to run solbot binary")
}

#[test]
fn test_missing_credential_exits_non_zero() {
    for missing in CREDENTIALS {
        let output = run_bot(missing, &scratch_dir(missing));

        assert_eq!(output.status.code(), Some(1), "{} missing", missing);

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(
            stdout.contains(&format!("Environment variable {} is not set.", missing)),
            "log output did not name {}: {}",
            missing,
            stdout
        );
        assert!(!stdout.contains("SolBot starting"));
    }
}

#[test]
fn test_missing_credential_is_written_to_log_file() {
    let dir = scratch_dir("log-file");
    let output = run_bot("COINGECKO_API_KEY", &dir);
    assert_eq!(output.status.code(), Some(1));

    let log = std::fs::read_to_string(dir.join("trading-bot.log")).unwrap();
    assert!(log.contains("COINGECKO_API_KEY"));
}

#[test]
fn test_invalid_settings_exit_and_reach_log_file() {
    let dir = scratch_dir("invalid-settings");
    let output = run_bot_with("", &dir, &[("SOLBOT_AMOUNT", "-1")]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("amount must be positive"), "{}", stdout);
    assert!(!stdout.contains("SolBot starting"));

    // Settings never loaded, so the default log file in the working directory is used
    let log = std::fs::read_to_string(dir.join("trading-bot.log")).unwrap();
    assert!(log.contains("amount must be positive"));
}

#[test]
fn test_client_setup_failure_exits_through_logging() {
    let dir = scratch_dir("bad-url");
    let output = run_bot_with("", &dir, &[("SOLBOT_BINANCE_BASE_URL", "not a url")]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Invalid Binance base URL"), "{}", stdout);

    let log = std::fs::read_to_string(dir.join("trading-bot.log")).unwrap();
    assert!(log.contains("Invalid Binance base URL"));
}
