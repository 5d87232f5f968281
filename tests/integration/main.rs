//! Integration tests for Shelf

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    fn shelf() -> Command {
        cargo_bin_cmd!("shelf")
    }

    /// Point the binary at a throwaway config and data tree
    fn shelf_in(temp: &TempDir) -> Command {
        let mut cmd = shelf();
        cmd.args([
            "--config",
            temp.path().join("config.toml").to_str().unwrap(),
            "--data-dir",
            temp.path().join("data").to_str().unwrap(),
        ]);
        cmd
    }

    #[test]
    fn help_displays() {
        shelf()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Per-bot shared-library manager"));
    }

    #[test]
    fn version_displays() {
        shelf()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("shelf"));
    }

    #[test]
    fn init_creates_default_manifest() {
        let temp = TempDir::new().unwrap();

        shelf_in(&temp)
            .args(["init", "b1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Initialized libraries"));

        let manifest = temp.path().join("data/bots/b1/libraries/package.json");
        let content = std::fs::read_to_string(manifest).unwrap();
        assert!(content.contains("shared_libs"));
        assert!(content.contains("\"dependencies\": {}"));
    }

    #[test]
    fn init_is_idempotent() {
        let temp = TempDir::new().unwrap();

        shelf_in(&temp).args(["init", "b1"]).assert().success();
        shelf_in(&temp)
            .args(["init", "b1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already initialized"));
    }

    #[test]
    fn init_seeds_global_example() {
        let temp = TempDir::new().unwrap();

        shelf_in(&temp)
            .args(["init", "b1", "--example"])
            .assert()
            .success()
            .stdout(predicate::str::contains("example"));

        let example = temp.path().join("data/global/libraries/example.js");
        assert!(example.is_file());
    }

    #[test]
    fn list_uninitialized_bot() {
        let temp = TempDir::new().unwrap();

        shelf_in(&temp)
            .args(["list", "b1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("no libraries yet"));
    }

    #[test]
    fn list_empty_dependencies() {
        let temp = TempDir::new().unwrap();

        shelf_in(&temp).args(["init", "b1"]).assert().success();
        shelf_in(&temp)
            .args(["list", "b1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No dependencies"));
    }

    #[test]
    fn list_shows_declared_dependencies() {
        let temp = TempDir::new().unwrap();
        shelf_in(&temp).args(["init", "b1"]).assert().success();

        // Simulate a completed install by editing the stored manifest.
        let manifest = temp.path().join("data/bots/b1/libraries/package.json");
        let content = std::fs::read_to_string(&manifest)
            .unwrap()
            .replace("\"dependencies\": {}", "\"dependencies\": {\"left-pad\": \"^1.3.0\"}");
        std::fs::write(&manifest, content).unwrap();

        shelf_in(&temp)
            .args(["list", "b1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("left-pad"))
            .stdout(predicate::str::contains("^1.3.0"));
    }

    #[test]
    fn remove_missing_dependency_fails() {
        let temp = TempDir::new().unwrap();
        shelf_in(&temp).args(["init", "b1"]).assert().success();

        shelf_in(&temp)
            .args(["remove", "b1", "left-pad"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Dependency not found"));
    }

    #[test]
    fn remove_with_corrupt_manifest_fails_with_hint() {
        let temp = TempDir::new().unwrap();
        shelf_in(&temp).args(["init", "b1"]).assert().success();

        let manifest = temp.path().join("data/bots/b1/libraries/package.json");
        std::fs::write(&manifest, b"not json").unwrap();

        shelf_in(&temp)
            .args(["remove", "b1", "left-pad"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("manifest unreadable"));
    }

    #[test]
    fn sync_packaged_mode_reaches_npm_resolution() {
        let temp = TempDir::new().unwrap();

        // Packaged mode with an empty app data dir: the node alias step
        // runs first, and whatever its outcome the sync must continue to
        // npm resolution and fail there, not at the symlink.
        std::fs::write(
            temp.path().join("config.toml"),
            format!(
                "packaged = true\napp_data_dir = \"{}\"\n",
                temp.path().join("app").display()
            ),
        )
        .unwrap();

        shelf_in(&temp)
            .args(["sync", "b1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("npm implementation not found"))
            .stderr(predicate::str::contains("symlink").not());
    }

    #[test]
    fn add_rejects_malformed_range() {
        let temp = TempDir::new().unwrap();

        shelf_in(&temp)
            .args(["add", "b1", "left-pad@not a range"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid version range"));
    }
}
