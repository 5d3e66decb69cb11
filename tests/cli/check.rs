use anyhow::Result;
use insta_cmd::assert_cmd_snapshot;

use crate::CliTest;

#[test]
fn test_check_literal_exponent() -> Result<()> {
    let test = CliTest::with_file(
        "main.cpp",
        "#include <cmath>\ndouble y = std::pow(2.0, 3);\n",
    )?;

    assert_cmd_snapshot!(test.check_command());
    Ok(())
}

#[test]
fn test_check_runtime_exponent() -> Result<()> {
    let test = CliTest::with_file(
        "main.cpp",
        "#include <cmath>\ndouble f(double x, int n) { return std::pow(x, n); }\n",
    )?;

    assert_cmd_snapshot!(test.check_command());
    Ok(())
}

#[test]
fn test_check_floating_exponent() -> Result<()> {
    let test = CliTest::with_file("main.cpp", "double y = std::pow(2.0, 2.0);\n")?;

    assert_cmd_snapshot!(test.check_command());
    Ok(())
}

#[test]
fn test_check_header_only_call() -> Result<()> {
    let test = CliTest::with_file(
        "math.h",
        "#include <cmath>\ninline double cube(double x) { return std::pow(x, 3); }\n",
    )?;
    test.write_file(
        "main.cpp",
        "#include \"math.h\"\ndouble y = cube(2.0);\n",
    )?;

    assert_cmd_snapshot!(test.check_command());
    Ok(())
}

#[test]
fn test_check_two_calls_in_order() -> Result<()> {
    let test = CliTest::with_file(
        "main.cpp",
        "double a = std::pow(x, 2);\ndouble b = std::pow(y, 4);\n",
    )?;

    assert_cmd_snapshot!(test.check_command());
    Ok(())
}

#[test]
fn test_check_constexpr_exponent() -> Result<()> {
    let test = CliTest::with_file(
        "main.cpp",
        r#"#include <cmath>
namespace cfg {
constexpr int kOrder = 2;
}
enum Degree { Linear = 1, Cubic = 3 };

double a(double x) { return std::pow(x, cfg::kOrder + 1); }
double b(double x) { return std::pow(x, Cubic); }
double c(double x) { return std::pow(x, sizeof(int)); }
"#,
    )?;

    assert_cmd_snapshot!(test.check_command());
    Ok(())
}

#[test]
fn test_check_member_constants() -> Result<()> {
    // Only the static member is usable in a constant expression.
    let test = CliTest::with_file(
        "main.cpp",
        r#"#include <cmath>
struct Grid {
    const int dims = 3;
    static constexpr int kOrder = 2;
    double scale(double x) const { return std::pow(x, dims) * std::pow(x, kOrder); }
};
"#,
    )?;

    assert_cmd_snapshot!(test.check_command());
    Ok(())
}

#[test]
fn test_check_parenthesized_callee() -> Result<()> {
    let test = CliTest::with_file("main.cpp", "double y = (std::pow)(2.0, 3);\n")?;

    assert_cmd_snapshot!(test.check_command());
    Ok(())
}

#[test]
fn test_check_ignores_other_pow() -> Result<()> {
    let test = CliTest::with_file(
        "main.cpp",
        r#"namespace mylib { double pow(double, int); }
double y = mylib::pow(2.0, 3);
"#,
    )?;

    assert_cmd_snapshot!(test.check_command());
    Ok(())
}

#[test]
fn test_check_with_include_dir() -> Result<()> {
    let test = CliTest::with_file("include/consts.h", "constexpr int kPower = 5;\n")?;
    test.write_file(
        "src/main.cpp",
        "#include \"consts.h\"\ndouble y = std::pow(2.0, kPower);\n",
    )?;

    // Without the include dir the header is not found and kPower is unknown.
    assert_cmd_snapshot!(test.check_command());

    let mut cmd = test.check_command();
    cmd.args(["-I", "include"]);
    assert_cmd_snapshot!(cmd);
    Ok(())
}

#[test]
fn test_check_config_replacement() -> Result<()> {
    let test = CliTest::with_file(
        ".stdpowrc.json",
        r#"{ "replacement": "fast::ipow" }"#,
    )?;
    test.write_file("main.cpp", "double y = std::pow(2.0, 3);\n")?;

    assert_cmd_snapshot!(test.check_command());
    Ok(())
}

#[test]
fn test_check_json_format() -> Result<()> {
    let test = CliTest::with_file("main.cpp", "double y = std::pow(2.0, 3);\n")?;

    let mut cmd = test.check_command();
    cmd.args(["--format", "json"]);
    assert_cmd_snapshot!(cmd);
    Ok(())
}

#[test]
fn test_check_unreadable_file_fails() -> Result<()> {
    let test = CliTest::with_file("main.cpp", "double y = std::pow(2.0, 3);\n")?;
    std::fs::write(test.root().join("legacy.cpp"), [0x69, 0x6e, 0x74, 0x20, 0xe9, 0x3b])?;

    insta::with_settings!({
        filters => vec![(r"stream did not contain valid UTF-8", "[invalid UTF-8]")]
    }, {
        assert_cmd_snapshot!(test.check_command());
    });
    Ok(())
}

#[test]
fn test_check_invalid_config_is_internal_error() -> Result<()> {
    let test = CliTest::with_file(".stdpowrc.json", r#"{ "replacement": "not valid!" }"#)?;
    test.write_file("main.cpp", "double y = std::pow(2.0, 3);\n")?;

    assert_cmd_snapshot!(test.check_command());
    Ok(())
}
