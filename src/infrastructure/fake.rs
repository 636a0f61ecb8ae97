//! 内存中的 DOM 假实现，仅用于单元测试

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::time::Instant;

use crate::infrastructure::{Dom, Probe};
use crate::locator::{Resolved, Strategy};

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub visible: bool,
    pub text: String,
    pub value: String,
    pub enabled: bool,
    pub attrs: HashMap<String, String>,
    pub cells: Vec<String>,
    pub children: HashMap<String, usize>,
    pub visible_at: Option<Instant>,
    /// 强制显示无效（例如被遮罩层挡住）
    pub pinned_hidden: bool,
    /// 包裹该元素的容器的 class
    pub container_class: Option<String>,
}

impl FakeElement {
    pub fn visible(text: &str) -> Self {
        Self {
            visible: true,
            text: text.to_string(),
            enabled: true,
            ..Default::default()
        }
    }

    pub fn hidden(text: &str) -> Self {
        Self {
            visible: false,
            ..Self::visible(text)
        }
    }

    pub fn row(cells: &[&str]) -> Self {
        Self {
            cells: cells.iter().map(|c| c.to_string()).collect(),
            ..Self::visible(&cells.join(" "))
        }
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_children(mut self, css: &str, count: usize) -> Self {
        self.children.insert(css.to_string(), count);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn stays_hidden(mut self) -> Self {
        self.pinned_hidden = true;
        self
    }

    pub fn inside(mut self, container_class: &str) -> Self {
        self.container_class = Some(container_class.to_string());
        self
    }

    /// 延迟一段时间后才变为可见
    pub fn appears_after(mut self, delay: Duration) -> Self {
        self.visible_at = Some(Instant::now() + delay);
        self
    }

    fn is_visible_now(&self) -> bool {
        self.visible && self.visible_at.map_or(true, |at| Instant::now() >= at)
    }
}

/// 点击某个策略命中的元素后产生的效果
#[derive(Debug, Clone)]
pub enum ClickEffect {
    Show(Strategy, FakeElement),
    Remove(Strategy),
    Navigate(String),
}

#[derive(Default)]
struct FakeState {
    elements: HashMap<String, Vec<FakeElement>>,
    effects: HashMap<String, Vec<ClickEffect>>,
    clicks: Vec<String>,
    fills: Vec<(String, String)>,
    keys: Vec<(String, String)>,
    screenshots: Vec<PathBuf>,
    url: String,
    unsettled_polls: usize,
    failing: bool,
}

#[derive(Default)]
pub struct FakeDom {
    state: Mutex<FakeState>,
}

impl FakeDom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, strategy: Strategy, element: FakeElement) -> &Self {
        let mut state = self.state.lock().unwrap();
        state
            .elements
            .entry(strategy.to_string())
            .or_default()
            .push(element);
        drop(state);
        self
    }

    pub fn on_click(&self, strategy: Strategy, effect: ClickEffect) -> &Self {
        self.state
            .lock()
            .unwrap()
            .effects
            .entry(strategy.to_string())
            .or_default()
            .push(effect);
        self
    }

    pub fn set_url(&self, url: &str) {
        self.state.lock().unwrap().url = url.to_string();
    }

    /// 接下来 `polls` 次 `is_settled` 返回 false
    pub fn unsettled_for(&self, polls: usize) {
        self.state.lock().unwrap().unsettled_polls = polls;
    }

    /// 让所有脚本调用失败（模拟导航中的执行上下文丢失）
    pub fn fail_all(&self) {
        self.state.lock().unwrap().failing = true;
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().clicks.clone()
    }

    pub fn fills(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().fills.clone()
    }

    pub fn keys(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().keys.clone()
    }

    pub fn screenshots(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().screenshots.clone()
    }

    pub fn element(&self, strategy: &Strategy, index: usize) -> Option<FakeElement> {
        self.state
            .lock()
            .unwrap()
            .elements
            .get(&strategy.to_string())
            .and_then(|els| els.get(index).cloned())
    }

    fn with_target<T>(&self, target: &Resolved, f: impl FnOnce(&mut FakeElement) -> T) -> Result<T> {
        let mut state = self.state.lock().unwrap();
        if state.failing {
            return Err(anyhow!("执行上下文已销毁"));
        }
        state
            .elements
            .get_mut(&target.strategy.to_string())
            .and_then(|els| els.get_mut(target.index))
            .map(f)
            .ok_or_else(|| anyhow!("元素 '{}' 已从页面移除", target.element))
    }

    fn check(&self) -> Result<()> {
        if self.state.lock().unwrap().failing {
            return Err(anyhow!("执行上下文已销毁"));
        }
        Ok(())
    }
}

#[async_trait]
impl Dom for FakeDom {
    async fn probe(&self, strategy: &Strategy) -> Result<Probe> {
        self.check()?;
        let state = self.state.lock().unwrap();
        let els = state.elements.get(&strategy.to_string());
        Ok(Probe {
            attached: els.map_or(0, Vec::len),
            visible_index: els.and_then(|els| els.iter().position(FakeElement::is_visible_now)),
        })
    }

    async fn click(&self, target: &Resolved) -> Result<()> {
        self.with_target(target, |_| ())?;
        let mut state = self.state.lock().unwrap();
        state.clicks.push(target.element.clone());
        let effects = state
            .effects
            .get(&target.strategy.to_string())
            .cloned()
            .unwrap_or_default();
        for effect in effects {
            match effect {
                ClickEffect::Show(strategy, element) => {
                    state
                        .elements
                        .entry(strategy.to_string())
                        .or_default()
                        .push(element);
                }
                ClickEffect::Remove(strategy) => {
                    state.elements.remove(&strategy.to_string());
                }
                ClickEffect::Navigate(url) => state.url = url,
            }
        }
        Ok(())
    }

    async fn fill(&self, target: &Resolved, value: &str) -> Result<()> {
        self.with_target(target, |el| el.value = value.to_string())?;
        self.state
            .lock()
            .unwrap()
            .fills
            .push((target.element.clone(), value.to_string()));
        Ok(())
    }

    async fn press_key(&self, target: &Resolved, key: &str) -> Result<()> {
        self.with_target(target, |_| ())?;
        self.state
            .lock()
            .unwrap()
            .keys
            .push((target.element.clone(), key.to_string()));
        Ok(())
    }

    async fn text(&self, target: &Resolved) -> Result<String> {
        self.with_target(target, |el| el.text.clone())
    }

    async fn value(&self, target: &Resolved) -> Result<String> {
        self.with_target(target, |el| el.value.clone())
    }

    async fn attribute(&self, target: &Resolved, name: &str) -> Result<Option<String>> {
        self.with_target(target, |el| el.attrs.get(name).cloned())
    }

    async fn is_enabled(&self, target: &Resolved) -> Result<bool> {
        self.with_target(target, |el| el.enabled)
    }

    async fn child_count(&self, target: &Resolved, css: &str) -> Result<usize> {
        self.with_target(target, |el| el.children.get(css).copied().unwrap_or(0))
    }

    async fn container_class(&self, target: &Resolved, _container_css: &str) -> Result<Option<String>> {
        self.with_target(target, |el| el.container_class.clone())
    }

    async fn texts(&self, strategy: &Strategy) -> Result<Vec<String>> {
        self.check()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .elements
            .get(&strategy.to_string())
            .map(|els| {
                els.iter()
                    .filter(|el| el.is_visible_now())
                    .map(|el| el.text.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn table_rows(&self, row: &Strategy, _cell_css: &str) -> Result<Vec<Vec<String>>> {
        self.check()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .elements
            .get(&row.to_string())
            .map(|els| {
                els.iter()
                    .filter(|el| el.is_visible_now())
                    .map(|el| el.cells.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn force_visible(&self, strategy: &Strategy, index: usize) -> Result<bool> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        match state
            .elements
            .get_mut(&strategy.to_string())
            .and_then(|els| els.get_mut(index))
        {
            Some(el) => {
                if !el.pinned_hidden {
                    el.visible = true;
                    el.visible_at = None;
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn goto(&self, url: &str) -> Result<()> {
        self.check()?;
        self.state.lock().unwrap().url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        self.check()?;
        Ok(self.state.lock().unwrap().url.clone())
    }

    async fn is_settled(&self) -> Result<bool> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        if state.unsettled_polls > 0 {
            state.unsettled_polls -= 1;
            return Ok(false);
        }
        Ok(true)
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        self.check()?;
        std::fs::write(path, [0x89, b'P', b'N', b'G'])?;
        self.state.lock().unwrap().screenshots.push(path.to_path_buf());
        Ok(())
    }
}
