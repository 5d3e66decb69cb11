use anyhow::Result;
use insta_cmd::assert_cmd_snapshot;

use crate::CliTest;

const SOURCE: &str = r#"#include <cmath>

double area(double r) { return 3.14159 * std::pow(r, 2); }
double volume(double r, int n) { return std::pow(r, 3) + std::pow(r, n); }
"#;

const REWRITTEN: &str = r#"#include <cmath>

double area(double r) { return 3.14159 * utils::pow<std::pow(r, 2)>(r); }
double volume(double r, int n) { return utils::pow<std::pow(r, 3)>(r) + std::pow(r, n); }
"#;

#[test]
fn test_fix_dry_run() -> Result<()> {
    let test = CliTest::with_file("src/shapes.cpp", SOURCE)?;

    assert_cmd_snapshot!(test.fix_command());

    // Nothing written.
    assert_eq!(test.read_file("src/shapes.cpp")?, SOURCE);
    Ok(())
}

#[test]
fn test_fix_apply() -> Result<()> {
    let test = CliTest::with_file("src/shapes.cpp", SOURCE)?;

    let mut cmd = test.fix_command();
    cmd.arg("--apply");
    assert_cmd_snapshot!(cmd);

    assert_eq!(test.read_file("src/shapes.cpp")?, REWRITTEN);
    Ok(())
}

#[test]
fn test_fix_apply_is_idempotent() -> Result<()> {
    let test = CliTest::with_file("src/shapes.cpp", SOURCE)?;

    let mut cmd = test.fix_command();
    cmd.arg("--apply");
    assert_cmd_snapshot!(cmd);

    // Calls inside the template argument are left alone.
    assert_cmd_snapshot!(test.check_command());

    let mut cmd = test.fix_command();
    cmd.arg("--apply");
    assert_cmd_snapshot!(cmd);

    assert_eq!(test.read_file("src/shapes.cpp")?, REWRITTEN);
    Ok(())
}

#[test]
fn test_fix_nested_calls_skip_inner() -> Result<()> {
    let test = CliTest::with_file(
        "main.cpp",
        "double y(double x) { return std::pow(std::pow(x, 2), 3); }\n",
    )?;

    let mut cmd = test.fix_command();
    cmd.arg("--apply");
    assert_cmd_snapshot!(cmd);

    assert_eq!(
        test.read_file("main.cpp")?,
        "double y(double x) { return utils::pow<std::pow(std::pow(x, 2), 3)>(std::pow(x, 2)); }\n"
    );
    Ok(())
}

#[test]
fn test_fix_nothing_to_do() -> Result<()> {
    let test = CliTest::with_file("main.cpp", "double y = std::pow(2.0, 0.5);\n")?;

    assert_cmd_snapshot!(test.fix_command());
    Ok(())
}
