//! DOM 驱动接口
//!
//! 页面对象与定位器只依赖 [`Dom`]；真实浏览器由 [`JsExecutor`] 实现，
//! 单元测试使用内存中的假实现。

use std::path::Path;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::infrastructure::scripts;
use crate::infrastructure::JsExecutor;
use crate::locator::{Resolved, Strategy};

/// 单个策略在当前 DOM 中的探测结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Probe {
    /// 已挂载的匹配数量
    pub attached: usize,
    /// 第一个可见匹配的下标
    pub visible_index: Option<usize>,
}

#[async_trait]
pub trait Dom: Send + Sync {
    async fn probe(&self, strategy: &Strategy) -> Result<Probe>;
    async fn click(&self, target: &Resolved) -> Result<()>;
    async fn fill(&self, target: &Resolved, value: &str) -> Result<()>;
    async fn press_key(&self, target: &Resolved, key: &str) -> Result<()>;
    async fn text(&self, target: &Resolved) -> Result<String>;
    async fn value(&self, target: &Resolved) -> Result<String>;
    async fn attribute(&self, target: &Resolved, name: &str) -> Result<Option<String>>;
    async fn is_enabled(&self, target: &Resolved) -> Result<bool>;
    /// 元素内匹配 `css` 的后代数量
    async fn child_count(&self, target: &Resolved, css: &str) -> Result<usize>;
    /// 最近的匹配 `container_css` 的祖先（含自身）的 class
    async fn container_class(&self, target: &Resolved, container_css: &str) -> Result<Option<String>>;
    /// 所有可见匹配的文本
    async fn texts(&self, strategy: &Strategy) -> Result<Vec<String>>;
    /// 可见行中每个单元格的文本
    async fn table_rows(&self, row: &Strategy, cell_css: &str) -> Result<Vec<Vec<String>>>;
    /// 把已挂载的匹配强制设为可见，返回之后是否可见
    async fn force_visible(&self, strategy: &Strategy, index: usize) -> Result<bool>;
    async fn goto(&self, url: &str) -> Result<()>;
    async fn current_url(&self) -> Result<String>;
    /// 页面是否稳定（加载完成、无新请求、无加载指示）
    async fn is_settled(&self) -> Result<bool>;
    async fn screenshot(&self, path: &Path) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct ElementReply<T> {
    ok: bool,
    value: Option<T>,
}

impl JsExecutor {
    async fn on_element<T>(&self, target: &Resolved, body: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned + Default,
    {
        let reply: ElementReply<T> = self.eval_as(scripts::on_element(target, body)).await?;
        if !reply.ok {
            bail!("元素 '{}' 已从页面移除 ({})", target.element, target.strategy);
        }
        Ok(reply.value.unwrap_or_default())
    }
}

#[async_trait]
impl Dom for JsExecutor {
    async fn probe(&self, strategy: &Strategy) -> Result<Probe> {
        self.eval_as(scripts::probe(strategy)).await
    }

    async fn click(&self, target: &Resolved) -> Result<()> {
        self.on_element::<bool>(target, scripts::CLICK).await?;
        Ok(())
    }

    async fn fill(&self, target: &Resolved, value: &str) -> Result<()> {
        self.on_element::<bool>(target, &scripts::fill(value)).await?;
        Ok(())
    }

    async fn press_key(&self, target: &Resolved, key: &str) -> Result<()> {
        self.on_element::<bool>(target, &scripts::press_key(key)).await?;
        Ok(())
    }

    async fn text(&self, target: &Resolved) -> Result<String> {
        self.on_element(target, scripts::TEXT).await
    }

    async fn value(&self, target: &Resolved) -> Result<String> {
        self.on_element(target, scripts::VALUE).await
    }

    async fn attribute(&self, target: &Resolved, name: &str) -> Result<Option<String>> {
        self.on_element(target, &scripts::attribute(name)).await
    }

    async fn is_enabled(&self, target: &Resolved) -> Result<bool> {
        self.on_element(target, scripts::ENABLED).await
    }

    async fn child_count(&self, target: &Resolved, css: &str) -> Result<usize> {
        self.on_element(target, &scripts::child_count(css)).await
    }

    async fn container_class(&self, target: &Resolved, container_css: &str) -> Result<Option<String>> {
        self.on_element(target, &scripts::container_class(container_css)).await
    }

    async fn texts(&self, strategy: &Strategy) -> Result<Vec<String>> {
        self.eval_as(scripts::visible_texts(strategy)).await
    }

    async fn table_rows(&self, row: &Strategy, cell_css: &str) -> Result<Vec<Vec<String>>> {
        self.eval_as(scripts::table_rows(row, cell_css)).await
    }

    async fn force_visible(&self, strategy: &Strategy, index: usize) -> Result<bool> {
        self.eval_as(scripts::force_visible(strategy, index)).await
    }

    async fn goto(&self, url: &str) -> Result<()> {
        JsExecutor::goto(self, url).await
    }

    async fn current_url(&self) -> Result<String> {
        self.url().await
    }

    async fn is_settled(&self) -> Result<bool> {
        self.eval_as(scripts::SETTLED).await
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        self.save_screenshot(path).await
    }
}
