//! Integration tests for Specforge

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    fn specforge() -> Command {
        cargo_bin_cmd!("specforge")
    }

    /// A temp project with a local config and a specs directory
    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        specforge()
            .current_dir(dir.path())
            .arg("init")
            .assert()
            .success();
        std::fs::create_dir_all(dir.path().join("specs")).unwrap();
        dir
    }

    fn write_spec(dir: &TempDir, name: &str, content: &str) {
        std::fs::write(dir.path().join(format!("specs/{}.json", name)), content).unwrap();
    }

    #[test]
    fn help_displays() {
        specforge()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("incremental artifact generation"));
    }

    #[test]
    fn version_displays() {
        specforge()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("specforge"));
    }

    #[test]
    fn init_creates_local_config() {
        let dir = TempDir::new().unwrap();
        specforge()
            .current_dir(dir.path())
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains(".specforge.toml"));
        assert!(dir.path().join(".specforge.toml").exists());

        // Second init without --force refuses
        specforge()
            .current_dir(dir.path())
            .arg("init")
            .assert()
            .failure()
            .stderr(predicate::str::contains("already exists"));
    }

    #[test]
    fn config_show_prints_effective_config() {
        let dir = project();
        specforge()
            .current_dir(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[generators]"));
    }

    #[test]
    fn config_path_points_at_local_config() {
        let dir = project();
        specforge()
            .current_dir(dir.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains(".specforge.toml"));
    }

    #[test]
    fn generate_without_specs_fails_with_hint() {
        let dir = project();
        specforge()
            .current_dir(dir.path())
            .arg("generate")
            .assert()
            .failure()
            .stderr(predicate::str::contains("No specifications found"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn generate_is_idempotent() {
        let dir = project();
        write_spec(
            &dir,
            "user",
            r#"{"entity": "User", "fields": {"id": "uuid", "age": "int"}}"#,
        );

        // init template enables openapi + rust + typescript + jsonschema
        specforge()
            .current_dir(dir.path())
            .arg("generate")
            .assert()
            .success()
            .stdout(predicate::str::contains("Wrote 4 file(s)"));

        assert!(dir.path().join("generated/sdk/rust/user/mod.rs").exists());
        assert!(dir.path().join("generated/sdk/typescript/user.ts").exists());
        assert!(dir.path().join("generated/openapi/user.json").exists());
        assert!(dir
            .path()
            .join("generated/specs/jsonschema/user.schema.json")
            .exists());
        assert!(dir.path().join(".specforge-manifest.json").exists());

        // Unchanged input: no bytes written, all steps cached
        specforge()
            .current_dir(dir.path())
            .arg("generate")
            .assert()
            .success()
            .stdout(predicate::str::contains("Wrote 0 file(s)"))
            .stdout(predicate::str::contains("4 cached"));
    }

    #[test]
    fn removing_a_spec_cleans_its_orphans() {
        let dir = project();
        write_spec(&dir, "user", r#"{"fields": {"id": "uuid"}}"#);
        write_spec(&dir, "order", r#"{"fields": {"id": "uuid"}}"#);

        specforge()
            .current_dir(dir.path())
            .arg("generate")
            .assert()
            .success();

        std::fs::remove_file(dir.path().join("specs/order.json")).unwrap();
        specforge()
            .current_dir(dir.path())
            .arg("generate")
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed 4 orphaned file(s)"));

        assert!(dir.path().join("generated/sdk/rust/user/mod.rs").exists());
        assert!(!dir.path().join("generated/sdk/rust/order").join("mod.rs").exists());
        assert!(!dir.path().join("generated/sdk/typescript/order.ts").exists());
    }

    #[test]
    fn no_clean_keeps_orphans() {
        let dir = project();
        write_spec(&dir, "user", r#"{"fields": {"id": "uuid"}}"#);
        write_spec(&dir, "order", r#"{"fields": {"id": "uuid"}}"#);

        specforge()
            .current_dir(dir.path())
            .arg("generate")
            .assert()
            .success();

        std::fs::remove_file(dir.path().join("specs/order.json")).unwrap();
        specforge()
            .current_dir(dir.path())
            .args(["generate", "--no-clean"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed").not());

        assert!(dir.path().join("generated/sdk/typescript/order.ts").exists());
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = project();
        write_spec(&dir, "user", r#"{"fields": {"id": "uuid"}}"#);

        specforge()
            .current_dir(dir.path())
            .args(["generate", "--dry-run"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Would write 4 file(s)"));

        assert!(!dir.path().join("generated").exists());
        assert!(!dir.path().join(".specforge-manifest.json").exists());
    }

    #[test]
    fn family_filter_limits_the_matrix() {
        let dir = project();
        write_spec(&dir, "user", r#"{"fields": {"id": "uuid"}}"#);

        specforge()
            .current_dir(dir.path())
            .args(["generate", "--family", "sdk"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Wrote 2 file(s)"));

        assert!(dir.path().join("generated/sdk/rust/user/mod.rs").exists());
        assert!(!dir.path().join("generated/openapi/user.json").exists());
    }

    #[test]
    fn plan_previews_without_writing() {
        let dir = project();
        write_spec(&dir, "user", r#"{"fields": {"id": "uuid"}}"#);

        specforge()
            .current_dir(dir.path())
            .arg("plan")
            .assert()
            .success()
            .stdout(predicate::str::contains("sdk:rust:user"))
            .stdout(predicate::str::contains("Would write 4 file(s)"));

        assert!(!dir.path().join("generated").exists());
    }

    #[test]
    fn audit_reports_drift_and_orphans() {
        let dir = project();
        write_spec(&dir, "user", r#"{"fields": {"id": "uuid"}}"#);
        specforge()
            .current_dir(dir.path())
            .arg("generate")
            .assert()
            .success();

        // Hand-edit one output, drop an untracked file next to it
        let drifted = dir.path().join("generated/sdk/typescript/user.ts");
        std::fs::write(&drifted, "// hand edited\n").unwrap();
        std::fs::write(dir.path().join("generated/scratch.txt"), "notes").unwrap();

        specforge()
            .current_dir(dir.path())
            .arg("audit")
            .assert()
            .success()
            .stdout(predicate::str::contains("drifted"))
            .stdout(predicate::str::contains("orphaned"))
            .stdout(predicate::str::contains("current"));
    }

    #[test]
    fn clean_removes_untracked_files() {
        let dir = project();
        write_spec(&dir, "user", r#"{"fields": {"id": "uuid"}}"#);
        specforge()
            .current_dir(dir.path())
            .arg("generate")
            .assert()
            .success();

        let scratch = dir.path().join("generated/scratch.txt");
        std::fs::write(&scratch, "notes").unwrap();

        specforge()
            .current_dir(dir.path())
            .args(["clean", "--dry-run"])
            .assert()
            .success()
            .stdout(predicate::str::contains("scratch.txt"));
        assert!(scratch.exists());

        specforge()
            .current_dir(dir.path())
            .args(["clean", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed 1 file(s)"));
        assert!(!scratch.exists());
        assert!(dir.path().join("generated/sdk/rust/user/mod.rs").exists());
    }

    #[test]
    fn routing_override_redirects_one_sdk() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(".specforge.toml"),
            r#"
[generators]
sdks = ["rust", "typescript"]

[output.sdks]
rust = "bindings/rust"
"#,
        )
        .unwrap();
        std::fs::create_dir_all(dir.path().join("specs")).unwrap();
        write_spec(&dir, "user", r#"{"fields": {"id": "uuid"}}"#);

        specforge()
            .current_dir(dir.path())
            .arg("generate")
            .assert()
            .success();

        // Override strips the sdk/rust prefix; typescript stays in the default tree
        assert!(dir.path().join("bindings/rust/user/mod.rs").exists());
        assert!(dir.path().join("generated/sdk/typescript/user.ts").exists());
        assert!(!dir.path().join("generated/sdk/rust").exists());
    }

    #[test]
    fn overlapping_overrides_are_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(".specforge.toml"),
            r#"
[generators]
targets = ["openapi"]
sdks = ["rust"]

[output.targets]
openapi = "shared"

[output.sdks]
rust = "shared"
"#,
        )
        .unwrap();
        std::fs::create_dir_all(dir.path().join("specs")).unwrap();
        write_spec(&dir, "user", r#"{"fields": {"id": "uuid"}}"#);

        specforge()
            .current_dir(dir.path())
            .arg("generate")
            .assert()
            .failure()
            .stderr(predicate::str::contains("overlaps"));
    }

    #[test]
    fn malformed_spec_is_skipped_with_warning() {
        let dir = project();
        write_spec(&dir, "user", r#"{"fields": {"id": "uuid"}}"#);
        std::fs::write(dir.path().join("specs/broken.json"), "{nope").unwrap();

        specforge()
            .current_dir(dir.path())
            .arg("generate")
            .assert()
            .success()
            .stderr(predicate::str::contains("broken.json"))
            .stdout(predicate::str::contains("Wrote 4 file(s)"));
    }

    #[test]
    fn force_reexecutes_but_writes_nothing_new() {
        let dir = project();
        write_spec(&dir, "user", r#"{"fields": {"id": "uuid"}}"#);

        specforge()
            .current_dir(dir.path())
            .arg("generate")
            .assert()
            .success();

        specforge()
            .current_dir(dir.path())
            .args(["generate", "--force"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Wrote 0 file(s)"))
            .stdout(predicate::str::contains("4 executed"));
    }

    #[test]
    fn kinds_shows_pipeline_graph() {
        let dir = project();
        specforge()
            .current_dir(dir.path())
            .arg("kinds")
            .assert()
            .success()
            .stdout(predicate::str::contains("SpecManifest"))
            .stdout(predicate::str::contains("sdk/rust"))
            .stdout(predicate::str::contains("produces"));
    }

    #[test]
    fn changed_spec_regenerates_only_its_files() {
        let dir = project();
        write_spec(&dir, "user", r#"{"fields": {"id": "uuid"}}"#);
        write_spec(&dir, "order", r#"{"fields": {"id": "uuid"}}"#);

        specforge()
            .current_dir(dir.path())
            .arg("generate")
            .assert()
            .success()
            .stdout(predicate::str::contains("Wrote 8 file(s)"));

        write_spec(&dir, "user", r#"{"fields": {"id": "uuid", "name": "string"}}"#);
        specforge()
            .current_dir(dir.path())
            .arg("generate")
            .assert()
            .success()
            .stdout(predicate::str::contains("Wrote 4 file(s)"))
            .stdout(predicate::str::contains("4 cached"));
    }
}
