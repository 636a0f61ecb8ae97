//! 截图产物
//!
//! 场景截图统一落在 `artifacts/` 目录，文件名带场景名、标签与时间戳。

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::infrastructure::Dom;

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 生成截图路径：`<场景>-<标签>-<时间戳>.png`
    pub fn screenshot_path(&self, scenario: &str, label: &str) -> PathBuf {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S%3f");
        self.dir
            .join(format!("{}-{}-{}.png", slugify(scenario), slugify(label), stamp))
    }

    /// 保存整页截图
    pub async fn screenshot(&self, dom: &dyn Dom, scenario: &str, label: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("无法创建产物目录: {}", self.dir.display()))?;
        let path = self.screenshot_path(scenario, label);
        dom.screenshot(&path).await?;
        info!("📸 截图已保存: {}", path.display());
        Ok(path)
    }

    /// 截图失败不影响场景结论
    pub async fn try_screenshot(&self, dom: &dyn Dom, scenario: &str, label: &str) -> Option<PathBuf> {
        match self.screenshot(dom, scenario, label).await {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("⚠️ 截图失败 ({}): {:#}", scenario, e);
                None
            }
        }
    }
}

/// 转成适合作为文件名的小写短横线形式
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut last_dash = true;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        "unnamed".to_string()
    } else {
        slug
    }
}
