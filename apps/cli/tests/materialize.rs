use std::error::Error;
use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cli(home: &Path, install_root: &Path) -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("nodezilla-workspace")?;
    cmd.env_remove("RUST_LOG").args([
        "--home",
        home.to_str().unwrap(),
        "--install-root",
        install_root.to_str().unwrap(),
    ]);
    Ok(cmd)
}

#[test]
fn materialize_populates_workspace() -> Result<(), Box<dyn Error>> {
    let home = tempdir()?;
    let bundle = tempdir()?;
    fs::create_dir_all(bundle.path().join("Examples/blinky"))?;
    fs::write(bundle.path().join("Examples/blinky/blinky.json"), "{}")?;
    fs::write(bundle.path().join("PL.txt"), "U1 NE555 8\n")?;

    cli(home.path(), bundle.path())?
        .arg("materialize")
        .assert()
        .success()
        .stdout(predicate::str::contains("examples: merged from"))
        .stdout(predicate::str::contains("portlist: copied from"))
        .stdout(predicate::str::contains("chips: not bundled"))
        .stdout(predicate::str::contains("Workspace ready at"));

    let root = home.path().join("Documents/NodeZilla");
    assert!(root.join("Projects").is_dir());
    assert!(root.join("Examples/blinky/blinky.json").is_file());
    assert_eq!(fs::read_to_string(root.join("PL.txt"))?, "U1 NE555 8\n");
    Ok(())
}

#[test]
fn materialize_succeeds_with_empty_bundle() -> Result<(), Box<dyn Error>> {
    let home = tempdir()?;
    let bundle = tempdir()?;

    cli(home.path(), bundle.path())?
        .args(["materialize", "--json"])
        .assert()
        .success();

    let root = home.path().join("Documents/NodeZilla");
    assert!(root.is_dir());
    assert!(!root.join("PL.txt").exists());
    Ok(())
}

#[test]
fn materialize_fails_when_root_cannot_be_created() -> Result<(), Box<dyn Error>> {
    let home = tempdir()?;
    let bundle = tempdir()?;
    fs::write(home.path().join("Documents"), "blocking file")?;

    cli(home.path(), bundle.path())?
        .arg("materialize")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to create workspace directory"));
    Ok(())
}

#[test]
fn config_enables_portlist_seeding_and_extra_roots() -> Result<(), Box<dyn Error>> {
    let home = tempdir()?;
    let bundle = tempdir()?;
    let shared = tempdir()?;
    fs::create_dir_all(shared.path().join("assets/symbols"))?;
    fs::write(shared.path().join("assets/symbols/led.svg"), "<svg/>")?;
    let config_path = home.path().join("materialize.json");
    fs::write(
        &config_path,
        serde_json::json!({
            "extra_search_roots": [shared.path()],
            "seed_empty_portlist": true,
            "normalize_ownership": false
        })
        .to_string(),
    )?;

    cli(home.path(), bundle.path())?
        .args(["--config", config_path.to_str().unwrap(), "materialize"])
        .assert()
        .success()
        .stdout(predicate::str::contains("portlist: seeded empty file"));

    let root = home.path().join("Documents/NodeZilla");
    assert!(root.join("assets/symbols/led.svg").is_file());
    assert_eq!(fs::read(root.join("PL.txt"))?, b"");
    Ok(())
}

#[test]
fn plan_does_not_touch_the_workspace() -> Result<(), Box<dyn Error>> {
    let home = tempdir()?;
    let bundle = tempdir()?;
    fs::create_dir_all(bundle.path().join("assets/chips"))?;
    fs::write(bundle.path().join("assets/chips/ne555.json"), "{}")?;

    cli(home.path(), bundle.path())?
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("chips (directory)"))
        .stdout(predicate::str::contains("1 new entries"))
        .stdout(predicate::str::contains("portlist (file): not found"));

    assert!(!home.path().join("Documents").exists());
    Ok(())
}

#[test]
fn portlist_reports_candidates_when_missing() -> Result<(), Box<dyn Error>> {
    let home = tempdir()?;
    let bundle = tempdir()?;

    cli(home.path(), bundle.path())?
        .env_remove("NODEZILLA_PL_PATH")
        .current_dir(bundle.path())
        .arg("portlist")
        .assert()
        .failure()
        .stderr(predicate::str::contains("portlist not found"))
        .stderr(predicate::str::contains("NODEZILLA_PL_PATH"));

    fs::write(bundle.path().join("PL.txt"), "U1")?;
    cli(home.path(), bundle.path())?
        .env_remove("NODEZILLA_PL_PATH")
        .arg("portlist")
        .assert()
        .success()
        .stdout(predicate::str::contains("PL.txt"));
    Ok(())
}

#[test]
fn portlist_write_honours_override() -> Result<(), Box<dyn Error>> {
    let home = tempdir()?;
    let bundle = tempdir()?;
    let custom = home.path().join("portlists/PL.txt");

    cli(home.path(), bundle.path())?
        .env("NODEZILLA_PL_PATH", &custom)
        .args(["portlist", "--write"])
        .assert()
        .success()
        .stdout(predicate::str::contains(custom.to_str().unwrap()));

    assert!(home.path().join("portlists").is_dir());
    Ok(())
}

#[test]
fn verbose_flag_logs_resolved_inputs() -> Result<(), Box<dyn Error>> {
    let home = tempdir()?;
    let bundle = tempdir()?;

    cli(home.path(), bundle.path())?
        .args(["-v", "plan"])
        .assert()
        .success()
        .stderr(predicate::str::contains("resolved workspace inputs"));

    cli(home.path(), bundle.path())?
        .arg("plan")
        .assert()
        .success()
        .stderr(predicate::str::contains("resolved workspace inputs").not());
    Ok(())
}

#[test]
fn plan_shows_portlist_seeding() -> Result<(), Box<dyn Error>> {
    let home = tempdir()?;
    let bundle = tempdir()?;
    let config_path = home.path().join("materialize.json");
    fs::write(&config_path, r#"{ "seed_empty_portlist": true }"#)?;

    cli(home.path(), bundle.path())?
        .args(["--config", config_path.to_str().unwrap(), "plan"])
        .assert()
        .success()
        .stdout(predicate::str::contains("portlist (file): not bundled -> will be seeded empty"));
    Ok(())
}
