use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn doctor_prints_resolved_profile() {
    let tmp = tempdir().unwrap();
    let vault = tmp.path().join("vault");
    fs::create_dir_all(vault.join("Templates")).unwrap();

    let cfg_path = tmp.path().join("config.toml");
    let toml = format!(
        r#"
version = 1
profile = "default"

[profiles.default]
vault_root = "{vault}"
templates_dir = "{{{{vault_root}}}}/Templates"
output_dir = "Inbox"

[logging]
level = "error"
"#,
        vault = vault.display(),
    );
    fs::write(&cfg_path, toml).unwrap();

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mdf"));
    cmd.env("NO_COLOR", "1");
    cmd.args(["--config", cfg_path.to_str().unwrap(), "doctor"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("OK   mdf doctor"))
        .stdout(predicate::str::contains("profile: default"))
        .stdout(predicate::str::contains("output_dir: Inbox"))
        .stdout(predicate::str::contains("template_property: note-from-form"))
        .stdout(predicate::str::contains("index: not built"))
        .stdout(predicate::str::contains("warning").not());
}

#[test]
fn doctor_reads_default_location_from_xdg() {
    let tmp = tempdir().unwrap();
    let xdg = tmp.path().join("xdg");
    let cfg_dir = xdg.join("mdform");
    fs::create_dir_all(&cfg_dir).unwrap();

    let toml = format!(
        r#"
version = 1

[profiles.default]
vault_root = "{vault}"
templates_dir = "{{{{vault_root}}}}/missing"

[logging]
level = "error"
"#,
        vault = tmp.path().display(),
    );
    fs::write(cfg_dir.join("config.toml"), toml).unwrap();

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mdf"));
    cmd.env("XDG_CONFIG_HOME", &xdg);
    cmd.arg("doctor");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("OK   mdf doctor"))
        .stdout(predicate::str::contains("warning: templates_dir does not exist"));
}
