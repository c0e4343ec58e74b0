use std::error::Error;

use pipewright::config::{validate_config, ConfigFile, ReloadKind};
use pipewright::errors::PipewrightError;
use pipewright::watch::build_watch_bindings;

type TestResult = Result<(), Box<dyn Error>>;

fn parse(toml: &str) -> Result<ConfigFile, toml::de::Error> {
    toml::from_str(toml)
}

#[test]
fn well_formed_config_validates() -> TestResult {
    let cfg = parse(
        r#"
[serve]
port = 3000
root = "app"
compile_task = "compile"

[build]
out_dir = "dist"
build_task = "build"

[stage.cssmin]
cmd = "cssnano"

[task.styles]
pipeline = { src = ["app/src/scss/*.scss"], dest = "app/src/css", concat = "style.min.css", stages = ["cssmin"] }
watch = ["app/src/scss/*.scss"]

[task.markup]
pipeline = { src = ["app/*.html"], dest = "dist" }
watch = ["app/*.html"]
reload = "full"

[task.compile]
parallel = ["styles"]

[task.build]
series = ["compile", "markup"]
"#,
    )?;

    validate_config(&cfg)?;
    Ok(())
}

#[test]
fn task_with_no_kind_is_rejected() -> TestResult {
    let cfg = parse(
        r#"
[build]
build_task = "empty"
[serve]
compile_task = "empty"
[task.empty]
watch = ["*.html"]
"#,
    )?;

    let err = validate_config(&cfg).unwrap_err();
    assert!(matches!(err, PipewrightError::Config(_)));
    Ok(())
}

#[test]
fn task_with_two_kinds_is_rejected() -> TestResult {
    let cfg = parse(
        r#"
[build]
build_task = "both"
[serve]
compile_task = "both"
[task.both]
pipeline = { src = ["a"], dest = "out" }
series = ["both"]
"#,
    )?;

    assert!(validate_config(&cfg).is_err());
    Ok(())
}

#[test]
fn unknown_child_reference_is_rejected() -> TestResult {
    let cfg = parse(
        r#"
[build]
build_task = "build"
[serve]
compile_task = "build"
[task.build]
series = ["nope"]
"#,
    )?;

    let err = validate_config(&cfg).unwrap_err();
    assert!(err.to_string().contains("unknown child task 'nope'"));
    Ok(())
}

#[test]
fn unknown_stage_reference_is_rejected() -> TestResult {
    let cfg = parse(
        r#"
[build]
build_task = "styles"
[serve]
compile_task = "styles"
[task.styles]
pipeline = { src = ["a.css"], dest = "out", stages = ["nope"] }
"#,
    )?;

    let err = validate_config(&cfg).unwrap_err();
    assert!(err.to_string().contains("unknown stage 'nope'"));
    Ok(())
}

#[test]
fn composition_cycle_is_rejected() -> TestResult {
    let cfg = parse(
        r#"
[build]
build_task = "a"
[serve]
compile_task = "a"
[task.a]
series = ["b"]
[task.b]
parallel = ["a"]
"#,
    )?;

    let err = validate_config(&cfg).unwrap_err();
    assert!(matches!(err, PipewrightError::Cycle(_)));
    Ok(())
}

#[test]
fn empty_src_list_is_rejected() -> TestResult {
    let cfg = parse(
        r#"
[build]
build_task = "styles"
[serve]
compile_task = "styles"
[task.styles]
pipeline = { src = [], dest = "out" }
"#,
    )?;

    assert!(validate_config(&cfg).is_err());
    Ok(())
}

#[test]
fn missing_entry_tasks_are_rejected() -> TestResult {
    // Default build_task is "build"; no such task exists here.
    let cfg = parse(
        r#"
[serve]
compile_task = "styles"
[task.styles]
pipeline = { src = ["a.css"], dest = "out" }
"#,
    )?;

    let err = validate_config(&cfg).unwrap_err();
    assert!(err.to_string().contains("build_task"));
    Ok(())
}

#[test]
fn zero_port_is_rejected() -> TestResult {
    let cfg = parse(
        r#"
[serve]
port = 0
compile_task = "styles"
[build]
build_task = "styles"
[task.styles]
pipeline = { src = ["a.css"], dest = "out" }
"#,
    )?;

    assert!(validate_config(&cfg).is_err());
    Ok(())
}

#[test]
fn bindings_follow_watch_and_default_merge_rules() -> TestResult {
    let cfg = parse(
        r#"
[serve]
compile_task = "styles"
[build]
build_task = "styles"

[default]
watch = ["app/**/*.html"]
exclude = ["**/_*.scss"]

[task.styles]
pipeline = { src = ["app/src/scss/*.scss"], dest = "app/src/css" }
watch = ["app/src/scss/*.scss"]

[task.markup]
pipeline = { src = ["app/*.html"], dest = "dist" }
reload = "full"

[task.silent]
pipeline = { src = ["app/fonts/*"], dest = "dist/fonts" }
watch = []
"#,
    )?;

    validate_config(&cfg)?;
    let bindings = build_watch_bindings(&cfg)?;

    // `silent` opts out with an empty list; `markup` inherits the default
    // watch patterns.
    assert_eq!(bindings.len(), 2);

    let markup = bindings.iter().find(|b| b.task() == "markup").unwrap();
    assert_eq!(markup.reload(), ReloadKind::Full);
    assert!(markup.matches("app/pages/index.html"));
    assert!(!markup.matches("app/src/scss/site.scss"));

    let styles = bindings.iter().find(|b| b.task() == "styles").unwrap();
    assert_eq!(styles.reload(), ReloadKind::Partial);
    assert!(styles.matches("app/src/scss/site.scss"));
    assert!(!styles.matches("app/pages/index.html"));
    // Default excludes still apply when the watch list is task-local.
    assert!(!styles.matches("app/src/scss/_partial.scss"));

    Ok(())
}
