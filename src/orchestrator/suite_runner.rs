//! 场景套件运行器 - 编排层
//!
//! ## 职责
//!
//! 1. **初始化**：连接/启动浏览器，准备产物目录与运行摘要
//! 2. **并发控制**：使用 Semaphore 限制同时运行的场景数量
//! 3. **资源隔离**：每个场景一个独立的标签页，结束后关闭
//! 4. **结果汇总**：失败时截图，结果写入运行摘要并输出统计

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tokio::sync::Semaphore;
use tracing::{error, warn};

use crate::browser::BrowserSession;
use crate::config::Config;
use crate::pages::PageContext;
use crate::scenarios::{ScenarioCtx, ScenarioDef, ScenarioResult};
use crate::utils::artifacts::ArtifactStore;
use crate::utils::logging;

pub const SUMMARY_FILE: &str = "run-summary.txt";

/// 运行统计
#[derive(Debug, Default)]
pub struct RunStats {
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
    pub results: Vec<ScenarioResult>,
}

impl RunStats {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    fn record(&mut self, result: ScenarioResult) {
        if result.passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(result);
    }
}

pub struct SuiteRunner {
    config: Arc<Config>,
    session: BrowserSession,
    artifacts: ArtifactStore,
    summary_path: PathBuf,
}

impl SuiteRunner {
    pub async fn initialize(config: Config) -> Result<Self> {
        let artifacts = ArtifactStore::new(config.artifacts_dir.clone());
        let summary_path = artifacts.dir().join(SUMMARY_FILE);
        logging::init_summary_file(&summary_path)?;

        let session = BrowserSession::start(&config).await?;
        Ok(Self {
            config: Arc::new(config),
            session,
            artifacts,
            summary_path,
        })
    }

    /// 运行给定场景并返回统计
    pub async fn run(&self, scenarios: Vec<ScenarioDef>) -> Result<RunStats> {
        let total = scenarios.len();
        let max_concurrent = self.config.max_concurrent_scenarios.max(1);
        logging::log_startup(total, max_concurrent);

        let semaphore = Arc::new(Semaphore::new(max_concurrent));
        let mut handles = Vec::with_capacity(total);

        for (idx, def) in scenarios.into_iter().enumerate() {
            let permit = semaphore.clone().acquire_owned().await?;
            logging::log_scenario_start(idx + 1, total, def.suite, def.name);

            let executor = match self.session.new_page().await {
                Ok(executor) => executor,
                Err(e) => {
                    error!("❌ 无法为场景 '{}' 创建页面: {}", def.name, e);
                    handles.push((def, None));
                    continue;
                }
            };
            let page = executor.page().clone();
            let ctx = PageContext::new(Arc::new(executor), self.config.clone(), def.portal);
            let artifacts = self.artifacts.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let result = run_scenario(def, ctx, artifacts).await;
                if let Err(e) = page.close().await {
                    warn!("⚠️ 关闭场景页面失败: {}", e);
                }
                result
            });
            handles.push((def, Some(handle)));
        }

        let mut stats = RunStats {
            total,
            ..Default::default()
        };
        for (def, handle) in handles {
            let result = match handle {
                Some(handle) => match handle.await {
                    Ok(result) => result,
                    Err(e) => failed_result(&def, format!("场景任务异常退出: {}", e)),
                },
                None => failed_result(&def, "无法创建页面".to_string()),
            };
            if let Err(e) = logging::append_result(&self.summary_path, &result) {
                warn!("⚠️ 写入运行摘要失败: {:#}", e);
            }
            stats.record(result);
        }

        logging::print_final_stats(stats.passed, stats.failed, stats.total, &self.summary_path);
        Ok(stats)
    }

    pub async fn shutdown(self) {
        self.session.close().await;
    }
}

/// 在给定页面上运行单个场景，失败时截图
pub async fn run_scenario(def: ScenarioDef, page: PageContext, artifacts: ArtifactStore) -> ScenarioResult {
    let started = Instant::now();
    let mut ctx = ScenarioCtx::new(page, artifacts, def.full_name());
    let outcome = (def.run)(&mut ctx).await;
    let duration = started.elapsed();

    let (error, screenshot) = match outcome {
        Ok(()) => (None, None),
        Err(e) => (Some(format!("{:#}", e)), ctx.screenshot("failure").await),
    };
    let result = ScenarioResult {
        name: def.name.to_string(),
        suite: def.suite.to_string(),
        passed: error.is_none(),
        diagnostics: ctx.into_notes(),
        error,
        duration,
        screenshot,
    };
    logging::log_scenario_result(&result);
    result
}

fn failed_result(def: &ScenarioDef, error: String) -> ScenarioResult {
    ScenarioResult {
        name: def.name.to_string(),
        suite: def.suite.to_string(),
        passed: false,
        diagnostics: Vec::new(),
        error: Some(error),
        duration: Default::default(),
        screenshot: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Portal;
    use crate::infrastructure::fake::FakeDom;
    use crate::pages::testing::context;
    use anyhow::ensure;
    use futures::future::BoxFuture;

    fn passes(ctx: &mut ScenarioCtx) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            ctx.note("dashboard loaded");
            Ok(())
        })
    }

    fn fails(ctx: &mut ScenarioCtx) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            ctx.note("submitted empty form");
            ensure!(false, "validation message missing");
            Ok(())
        })
    }

    fn def(name: &'static str, run: crate::scenarios::ScenarioFn) -> ScenarioDef {
        ScenarioDef {
            name,
            suite: "Admin Portal - Login Module",
            file: file!(),
            portal: Portal::Admin,
            run,
        }
    }

    #[tokio::test]
    async fn passing_scenario_keeps_notes_without_screenshot() {
        let dir = tempfile::tempdir().unwrap();
        let dom = Arc::new(FakeDom::new());

        let result = run_scenario(def("passes", passes), context(dom.clone()), ArtifactStore::new(dir.path())).await;

        assert!(result.passed);
        assert_eq!(result.diagnostics, vec!["dashboard loaded"]);
        assert!(result.screenshot.is_none());
        assert!(dom.screenshots().is_empty());
    }

    #[tokio::test]
    async fn failing_scenario_captures_error_and_screenshot() {
        let dir = tempfile::tempdir().unwrap();
        let dom = Arc::new(FakeDom::new());

        let result = run_scenario(def("fails", fails), context(dom.clone()), ArtifactStore::new(dir.path())).await;

        assert!(!result.passed);
        assert_eq!(result.error.as_deref(), Some("validation message missing"));
        let shot = result.screenshot.unwrap();
        assert!(shot.exists());
        assert!(shot
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("admin-portal-login-module-fails-failure-"));
    }

    #[test]
    fn stats_count_passes_and_failures() {
        let mut stats = RunStats::default();
        stats.record(failed_result(&def("a", passes), "boom".to_string()));
        assert!(!stats.all_passed());
        assert_eq!(stats.failed, 1);
    }
}
