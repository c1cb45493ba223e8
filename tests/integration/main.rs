//! Integration tests for recym-cache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    /// Origin with nothing listening, so every fetch fails fast
    const DEAD_ORIGIN: &str = "http://127.0.0.1:9";

    fn recym() -> Command {
        cargo_bin_cmd!("recym-cache")
    }

    /// A command isolated in `dir`: its own config, store and state
    fn isolated(dir: &TempDir) -> Command {
        let config = dir.path().join("config.toml");
        if !config.exists() {
            write_config(&config, dir.path(), "1.0.0");
        }
        let mut cmd = recym();
        cmd.env("RECYM_CONFIG", &config)
            .env("XDG_DATA_HOME", dir.path().join("data"))
            .env("XDG_STATE_HOME", dir.path().join("state"))
            .env("XDG_CONFIG_HOME", dir.path().join("config"));
        cmd
    }

    fn write_config(path: &Path, root: &Path, version: &str) {
        let content = format!(
            r#"[general]
journal = false

[cache]
version = "{version}"
static_files = ["/", "/styles.css"]
store_dir = "{store}"

[network]
origin = "{DEAD_ORIGIN}"
timeout_secs = 2
"#,
            store = root.join("store").display().to_string().replace('\\', "/"),
        );
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn help_displays() {
        recym()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("offline resource cache manager"));
    }

    #[test]
    fn version_displays() {
        recym()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("recym-cache"));
    }

    #[test]
    fn route_classifies_requests() {
        let dir = TempDir::new().unwrap();
        isolated(&dir)
            .args(["route", "/styles.css", "/api/quote", "/Assets/new.glb", "/about"])
            .assert()
            .success()
            .stdout(predicate::str::contains("cache-first"))
            .stdout(predicate::str::contains("network-first"))
            .stdout(predicate::str::contains("stale-while-revalidate"));
    }

    #[test]
    fn get_version_reports_static_partition() {
        let dir = TempDir::new().unwrap();
        isolated(&dir)
            .args(["message", "get-version"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"{"version":"recym-static-v1.0.0"}"#));
    }

    #[test]
    fn skip_waiting_message() {
        let dir = TempDir::new().unwrap();
        isolated(&dir)
            .args(["message", "skip-waiting"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "recym-static-v1.0.0 takes over without waiting",
            ))
            .stdout(predicate::str::contains("recym-static-v1.0.0 active"));
    }

    #[test]
    fn skip_waiting_purges_old_version() {
        let dir = TempDir::new().unwrap();
        let old = dir.path().join("store").join("recym-dynamic-v0.9.0");
        std::fs::create_dir_all(&old).unwrap();
        std::fs::write(
            old.join(".partition.json"),
            r#"{"name":"recym-dynamic-v0.9.0","created_at":"2026-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        isolated(&dir)
            .args(["message", "skip-waiting"])
            .assert()
            .success()
            .stdout(predicate::str::contains("deleted recym-dynamic-v0.9.0"));

        assert!(!old.exists());
    }

    #[test]
    fn offline_api_request_is_network_error() {
        let dir = TempDir::new().unwrap();
        isolated(&dir)
            .args(["fetch", "/api/quote"])
            .assert()
            .success()
            .stdout(predicate::str::contains("503 Network error"));
    }

    #[test]
    fn offline_static_request_is_unavailable() {
        let dir = TempDir::new().unwrap();
        isolated(&dir)
            .args(["fetch", "/styles.css"])
            .assert()
            .success()
            .stdout(predicate::str::contains("503 Offline content not available"));
    }

    #[test]
    fn offline_page_request_is_offline() {
        let dir = TempDir::new().unwrap();
        isolated(&dir)
            .args(["fetch", "/about"])
            .assert()
            .success()
            .stdout(predicate::str::contains("503 Offline"));
    }

    #[test]
    fn install_continues_when_origin_is_down() {
        let dir = TempDir::new().unwrap();
        isolated(&dir)
            .arg("install")
            .assert()
            .success()
            .stdout(predicate::str::contains("cached 0 of 2 file(s)"))
            .stdout(predicate::str::contains("takes over without waiting"));
    }

    #[test]
    fn status_empty_store() {
        let dir = TempDir::new().unwrap();
        isolated(&dir)
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("No cache partitions found."));
    }

    #[test]
    fn activate_purges_old_version() {
        let dir = TempDir::new().unwrap();
        let old = dir.path().join("store").join("recym-static-v0.9.0");
        std::fs::create_dir_all(&old).unwrap();
        std::fs::write(
            old.join(".partition.json"),
            r#"{"name":"recym-static-v0.9.0","created_at":"2026-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        isolated(&dir)
            .arg("activate")
            .assert()
            .success()
            .stdout(predicate::str::contains("deleted recym-static-v0.9.0"));

        assert!(!old.exists());
    }

    #[test]
    fn push_shows_notification() {
        let dir = TempDir::new().unwrap();
        isolated(&dir)
            .args(["push", r#"{"title":"New model","body":"Rack v3 is live"}"#])
            .assert()
            .success()
            .stdout(predicate::str::contains("New model"))
            .stdout(predicate::str::contains("[explore] Ver en AR"));
    }

    #[test]
    fn push_without_payload() {
        let dir = TempDir::new().unwrap();
        isolated(&dir)
            .arg("push")
            .assert()
            .success()
            .stdout(predicate::str::contains("nothing to show"));
    }

    #[test]
    fn click_explore_opens_window() {
        let dir = TempDir::new().unwrap();
        isolated(&dir)
            .args(["click", "--action", "explore"])
            .assert()
            .success()
            .stdout(predicate::str::contains("open window /"));
    }

    #[test]
    fn click_close_opens_nothing() {
        let dir = TempDir::new().unwrap();
        isolated(&dir)
            .args(["click", "--action", "close"])
            .assert()
            .success()
            .stdout(predicate::str::contains("open window").not());
    }

    #[test]
    fn config_path() {
        let dir = TempDir::new().unwrap();
        isolated(&dir)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let dir = TempDir::new().unwrap();
        isolated(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"));
    }

    #[test]
    fn config_set_version() {
        let dir = TempDir::new().unwrap();
        isolated(&dir)
            .args(["config", "set", "cache.version", "1.1.0"])
            .assert()
            .success();

        isolated(&dir)
            .args(["message", "get-version"])
            .assert()
            .success()
            .stdout(predicate::str::contains("recym-static-v1.1.0"));
    }

    #[test]
    fn config_set_unknown_key() {
        let dir = TempDir::new().unwrap();
        isolated(&dir)
            .args(["config", "set", "cache.colour", "blue"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn invalid_config_fails_with_hint() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "[cache\nversion = ").unwrap();
        isolated(&dir)
            .arg("status")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn invalid_version_fails() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("config.toml");
        write_config(&config, dir.path(), "latest");
        isolated(&dir)
            .args(["message", "get-version"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error:"));
    }
}
