//! 用例清单导出
//!
//! 读取运行器列表模式（或 `cargo test -- --list`）的输出，解析成 `{文件, 用例名}`，
//! 写成 `Test File, Test Case Name, Module` 三列的 CSV。
//!
//! 支持两种行格式：
//! - `[chromium] › src/scenarios/login.rs:12:5 › Admin Portal - Login Module › should ...`
//! - libtest：`workflow::pagination::tests::parses_showing_label: test`，
//!   文件取自前面最近一行 `Running ... (path)` 中的源文件

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, ExportError};

pub const SEPARATOR: &str = " › ";
pub const DEFAULT_LIST_COMMAND: &str = "cargo run --quiet --bin portal-e2e -- --list";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedTest {
    #[serde(rename = "Test File")]
    pub file: String,
    #[serde(rename = "Test Case Name")]
    pub test_name: String,
    #[serde(rename = "Module")]
    pub module: String,
}

impl ListedTest {
    pub fn new(file: impl Into<String>, test_name: impl Into<String>) -> Self {
        let test_name = test_name.into();
        Self {
            file: file.into(),
            module: module_of(&test_name),
            test_name,
        }
    }
}

fn admin_module_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Admin Portal - (.+?) Module").ok())
        .as_ref()
}

fn location_suffix_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r":\d+(?::\d+)?$").ok()).as_ref()
}

/// `Admin Portal - X Module` 中的 X，否则取用例名的第一段
pub fn module_of(test_name: &str) -> String {
    if let Some(caps) = admin_module_regex().and_then(|re| re.captures(test_name)) {
        return caps[1].trim().to_string();
    }
    test_name
        .split(SEPARATOR)
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn strip_location(file: &str) -> String {
    match location_suffix_regex() {
        Some(re) => re.replace(file.trim(), "").into_owned(),
        None => file.trim().to_string(),
    }
}

/// `Running tests/exporter.rs (target/debug/deps/exporter-1a2b)` → `tests/exporter.rs`
fn running_source(line: &str) -> Option<String> {
    let rest = line.trim().strip_prefix("Running ")?;
    let rest = rest.strip_prefix("unittests ").unwrap_or(rest);
    rest.split_whitespace().next().map(str::to_string)
}

/// 解析列表输出，无法识别的行忽略
pub fn parse_list_output(output: &str) -> Vec<ListedTest> {
    let mut tests = Vec::new();
    let mut current_source: Option<String> = None;

    for raw in output.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(source) = running_source(line) {
            current_source = Some(source);
            continue;
        }

        if line.starts_with('[') && line.contains(SEPARATOR) {
            let segments: Vec<&str> = line.split(SEPARATOR).collect();
            if segments.len() >= 3 {
                let test_name = segments[2..].join(SEPARATOR);
                tests.push(ListedTest::new(strip_location(segments[1]), test_name.trim()));
            } else {
                debug!("跳过无法识别的列表行: {}", line);
            }
            continue;
        }

        if let Some(path) = line.strip_suffix(": test") {
            let file = current_source.clone().unwrap_or_else(|| "unknown".to_string());
            tests.push(ListedTest::new(file, path.replace("::", SEPARATOR)));
        }
    }
    tests
}

/// 每个文件的用例数，按文件首次出现的顺序
pub fn summarize_by_file(tests: &[ListedTest]) -> Vec<(String, usize)> {
    let mut summary: Vec<(String, usize)> = Vec::new();
    for test in tests {
        match summary.iter_mut().find(|(file, _)| *file == test.file) {
            Some((_, count)) => *count += 1,
            None => summary.push((test.file.clone(), 1)),
        }
    }
    summary
}

pub fn write_csv(path: &Path, tests: &[ListedTest]) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::file_write_failed(parent.display().to_string(), e))?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    if tests.is_empty() {
        writer.write_record(["Test File", "Test Case Name", "Module"])?;
    }
    for test in tests {
        writer.serialize(test)?;
    }
    writer
        .flush()
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
    Ok(())
}

/// 通过 `sh -c` 执行列表命令，标准错误合并进标准输出
///
/// libtest 的 `Running ...` 行写在标准错误里，用例行写在标准输出里，
/// 合并成同一个管道才能保持两者的先后顺序。
pub async fn run_list_command(command: &str) -> AppResult<String> {
    if command.trim().is_empty() {
        return Err(AppError::Export(ExportError::EmptyCommand));
    }
    info!("▶️ 执行列表命令: {}", command);

    let output = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(format!("exec 2>&1\n{}", command))
        .output()
        .await
        .map_err(|e| {
            AppError::Export(ExportError::CommandFailed {
                command: command.to_string(),
                source: Box::new(e),
            })
        })?;
    if !output.status.success() {
        warn!("⚠️ 列表命令退出码: {:?}", output.status.code());
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

pub fn print_summary(tests: &[ListedTest], output: &Path) {
    info!("{}", "=".repeat(60));
    info!("📋 共导出 {} 个用例 → {}", tests.len(), output.display());
    for (file, count) in summarize_by_file(tests) {
        info!("  {:<50} {}", file, count);
    }
    info!("{}", "=".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_project_lines_and_strips_location() {
        let output = "\
Listing tests:
  [chromium] › src/scenarios/login.rs:14:9 › Admin Portal - Login Module › should login with valid credentials
  [chromium] › src/scenarios/login.rs › Partner Portal - Login Module › should login with valid credentials
Total: 2 tests in 1 file";
        let tests = parse_list_output(output);

        assert_eq!(tests.len(), 2);
        assert_eq!(tests[0].file, "src/scenarios/login.rs");
        assert_eq!(
            tests[0].test_name,
            "Admin Portal - Login Module › should login with valid credentials"
        );
        assert_eq!(tests[0].module, "Login");
        assert_eq!(tests[1].module, "Partner Portal - Login Module");
    }

    #[test]
    fn parses_libtest_lines_with_running_source() {
        let output = "\
     Running unittests src/lib.rs (target/debug/deps/portal_e2e-0f1e2d)
workflow::pagination::tests::parses_showing_label: test
     Running tests/exporter.rs (target/debug/deps/exporter-9a8b7c)
exports_every_listed_test: test

2 tests, 0 benchmarks";
        let tests = parse_list_output(output);

        assert_eq!(tests.len(), 2);
        assert_eq!(tests[0].file, "src/lib.rs");
        assert_eq!(tests[0].test_name, "workflow › pagination › tests › parses_showing_label");
        assert_eq!(tests[0].module, "workflow");
        assert_eq!(tests[1].file, "tests/exporter.rs");
    }

    #[test]
    fn module_capture_is_lazy() {
        assert_eq!(
            module_of("Admin Portal - Forgot Password Module › Module checks"),
            "Forgot Password"
        );
        assert_eq!(module_of("smoke"), "smoke");
    }

    #[test]
    fn summary_keeps_first_seen_order() {
        let tests = vec![
            ListedTest::new("b.rs", "x"),
            ListedTest::new("a.rs", "y"),
            ListedTest::new("b.rs", "z"),
        ];
        assert_eq!(
            summarize_by_file(&tests),
            vec![("b.rs".to_string(), 2), ("a.rs".to_string(), 1)]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn list_command_keeps_stderr_and_stdout_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("list.sh");
        std::fs::write(
            &script,
            "echo '     Running unittests src/lib.rs (target/debug/deps/portal_e2e-0f1e2d)' >&2\n\
             echo 'workflow::pagination::tests::parses_showing_label: test'\n\
             echo '     Running tests/exporter.rs (target/debug/deps/exporter-9a8b7c)' >&2\n\
             echo 'exports_every_listed_test: test'\n",
        )
        .unwrap();

        let listing = run_list_command(&format!("sh '{}'", script.display()))
            .await
            .unwrap();
        let tests = parse_list_output(&listing);

        assert_eq!(tests.len(), 2);
        assert_eq!(tests[0].file, "src/lib.rs");
        assert_eq!(tests[1].file, "tests/exporter.rs");
    }

    #[tokio::test]
    async fn blank_list_command_is_rejected() {
        let err = run_list_command("   ").await.unwrap_err();
        assert!(matches!(err, AppError::Export(ExportError::EmptyCommand)));
    }
}
