//! 场景层
//!
//! 每个场景是一串页面对象 / 流程调用加断言（`anyhow::ensure!`），第一个失败即结束场景。
//! 所有场景登记在 [`all_scenarios`] 中，带上所在文件、所属套件与门户，
//! 供运行器执行，也供列表模式输出 `[chromium] › 文件 › 套件 › 场景`。

pub mod dashboard;
pub mod forgot_password;
pub mod login;
pub mod subscription;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use futures::future::BoxFuture;

use crate::config::Portal;
use crate::pages::PageContext;
use crate::utils::artifacts::ArtifactStore;

/// 列表模式中的项目名
pub const PROJECT: &str = "chromium";

/// 场景函数：拿到独占的场景上下文，返回断言结果
pub type ScenarioFn = for<'a> fn(&'a mut ScenarioCtx) -> BoxFuture<'a, Result<()>>;

/// 场景运行时上下文：页面、截图目录与诊断记录
pub struct ScenarioCtx {
    page: PageContext,
    artifacts: ArtifactStore,
    name: String,
    notes: Vec<String>,
}

impl ScenarioCtx {
    pub fn new(page: PageContext, artifacts: ArtifactStore, name: impl Into<String>) -> Self {
        Self {
            page,
            artifacts,
            name: name.into(),
            notes: Vec::new(),
        }
    }

    pub fn page(&self) -> &PageContext {
        &self.page
    }

    /// 切换当前上下文（例如登录后换成目标门户）
    pub fn set_page(&mut self, page: PageContext) {
        self.page = page;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 记录一条诊断信息，写入运行摘要
    pub fn note(&mut self, note: impl Into<String>) {
        let note = note.into();
        tracing::info!("📝 {}", note);
        self.notes.push(note);
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn into_notes(self) -> Vec<String> {
        self.notes
    }

    pub async fn screenshot(&self, label: &str) -> Option<PathBuf> {
        self.artifacts
            .try_screenshot(self.page.dom(), &self.name, label)
            .await
    }
}

/// 已登记的场景
#[derive(Clone, Copy)]
pub struct ScenarioDef {
    pub name: &'static str,
    /// 套件标题，例如 `Admin Portal - Subscription Module`
    pub suite: &'static str,
    pub file: &'static str,
    pub portal: Portal,
    pub run: ScenarioFn,
}

impl ScenarioDef {
    /// `套件 › 场景`
    pub fn full_name(&self) -> String {
        format!("{} › {}", self.suite, self.name)
    }

    /// 列表模式的一行
    pub fn list_line(&self) -> String {
        format!("[{}] › {} › {}", PROJECT, self.file, self.full_name())
    }

    /// 过滤条件按子串匹配套件、场景名与文件（不区分大小写）
    pub fn matches(&self, filter: &str) -> bool {
        let filter = filter.to_lowercase();
        self.list_line().to_lowercase().contains(&filter)
    }
}

impl std::fmt::Debug for ScenarioDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioDef")
            .field("name", &self.name)
            .field("suite", &self.suite)
            .field("file", &self.file)
            .field("portal", &self.portal)
            .finish()
    }
}

/// 单个场景的运行结果
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub name: String,
    pub suite: String,
    pub passed: bool,
    pub diagnostics: Vec<String>,
    pub error: Option<String>,
    pub duration: Duration,
    pub screenshot: Option<PathBuf>,
}

impl ScenarioResult {
    pub fn summary_line(&self) -> String {
        let mut line = format!(
            "[{}] {} › {} ({} ms)",
            if self.passed { "PASS" } else { "FAIL" },
            self.suite,
            self.name,
            self.duration.as_millis()
        );
        if let Some(path) = &self.screenshot {
            line.push_str(&format!(" 截图: {}", path.display()));
        }
        line
    }
}

/// 全部场景，按套件顺序
pub fn all_scenarios() -> Vec<ScenarioDef> {
    let mut all = Vec::new();
    all.extend(login::scenarios());
    all.extend(forgot_password::scenarios());
    all.extend(subscription::scenarios());
    all.extend(dashboard::scenarios());
    all
}

/// 按过滤条件与门户筛选
pub fn select(filter: Option<&str>, portal: Option<Portal>) -> Vec<ScenarioDef> {
    all_scenarios()
        .into_iter()
        .filter(|def| filter.map_or(true, |f| def.matches(f)))
        .filter(|def| portal.map_or(true, |p| def.portal == p))
        .collect()
}
