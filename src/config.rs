use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::error::{AppError, AppResult, ConfigError};
use crate::utils::wait::WaitConfig;

/// 被测门户
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Portal {
    Admin,
    Partner,
}

impl Portal {
    pub fn label(&self) -> &'static str {
        match self {
            Portal::Admin => "Admin Portal",
            Portal::Partner => "Partner Portal",
        }
    }
}

impl std::str::FromStr for Portal {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Portal::Admin),
            "partner" => Ok(Portal::Partner),
            other => Err(AppError::Config(ConfigError::UnknownPortal {
                value: other.to_string(),
            })),
        }
    }
}

/// 单个门户的地址与账号
#[derive(Clone, Debug, Deserialize)]
pub struct PortalConfig {
    pub url: String,
    pub email: String,
    pub password: String,
}

impl PortalConfig {
    /// 拼接门户内的路由，例如 `/subscriptions`
    pub fn route(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    pub admin: PortalConfig,
    pub partner: PortalConfig,
    /// 连接已打开浏览器的调试端口，为空时自行启动浏览器
    pub browser_debug_port: Option<u16>,
    /// 自行启动时是否使用无头模式
    pub headless: bool,
    /// 浏览器可执行文件路径，为空时由 chromiumoxide 自动查找
    pub chrome_executable: Option<PathBuf>,
    /// 截图与运行摘要目录
    pub artifacts_dir: PathBuf,
    /// 同时运行的场景数量
    pub max_concurrent_scenarios: usize,
    // --- 等待相关（毫秒） ---
    pub element_timeout_ms: u64,
    pub query_timeout_ms: u64,
    pub toast_timeout_ms: u64,
    pub settle_timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            admin: PortalConfig {
                url: "https://admin.subscriptions.local".to_string(),
                email: "admin@example.com".to_string(),
                password: "Admin@123".to_string(),
            },
            partner: PortalConfig {
                url: "https://partner.subscriptions.local".to_string(),
                email: "partner@example.com".to_string(),
                password: "Partner@123".to_string(),
            },
            browser_debug_port: None,
            headless: true,
            chrome_executable: None,
            artifacts_dir: PathBuf::from("artifacts"),
            max_concurrent_scenarios: 1,
            element_timeout_ms: 10_000,
            query_timeout_ms: 3_000,
            toast_timeout_ms: 5_000,
            settle_timeout_ms: 15_000,
            poll_interval_ms: 100,
        }
    }
}

/// TOML 配置文件结构，所有字段可选，缺省回落到默认值
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    admin: Option<PortalConfig>,
    partner: Option<PortalConfig>,
    browser_debug_port: Option<u16>,
    headless: Option<bool>,
    chrome_executable: Option<PathBuf>,
    artifacts_dir: Option<PathBuf>,
    max_concurrent_scenarios: Option<usize>,
    element_timeout_ms: Option<u64>,
    query_timeout_ms: Option<u64>,
    toast_timeout_ms: Option<u64>,
    settle_timeout_ms: Option<u64>,
    poll_interval_ms: Option<u64>,
}

impl Config {
    /// 加载配置：默认值 → `PORTAL_CONFIG` 指定的 TOML 文件 → 环境变量
    pub fn load() -> AppResult<Self> {
        let base = match std::env::var("PORTAL_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        let file: FileConfig = toml::from_str(content)?;
        let default = Self::default();
        Ok(Self {
            admin: file.admin.unwrap_or(default.admin),
            partner: file.partner.unwrap_or(default.partner),
            browser_debug_port: file.browser_debug_port.or(default.browser_debug_port),
            headless: file.headless.unwrap_or(default.headless),
            chrome_executable: file.chrome_executable.or(default.chrome_executable),
            artifacts_dir: file.artifacts_dir.unwrap_or(default.artifacts_dir),
            max_concurrent_scenarios: file
                .max_concurrent_scenarios
                .unwrap_or(default.max_concurrent_scenarios),
            element_timeout_ms: file.element_timeout_ms.unwrap_or(default.element_timeout_ms),
            query_timeout_ms: file.query_timeout_ms.unwrap_or(default.query_timeout_ms),
            toast_timeout_ms: file.toast_timeout_ms.unwrap_or(default.toast_timeout_ms),
            settle_timeout_ms: file.settle_timeout_ms.unwrap_or(default.settle_timeout_ms),
            poll_interval_ms: file.poll_interval_ms.unwrap_or(default.poll_interval_ms),
        })
    }

    fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// 用任意键值来源覆盖配置（环境变量或测试用的映射）
    pub fn with_overrides(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let portal = |prefix: &str, current: PortalConfig| PortalConfig {
            url: lookup(&format!("{prefix}_PORTAL_URL")).unwrap_or(current.url),
            email: lookup(&format!("{prefix}_EMAIL")).unwrap_or(current.email),
            password: lookup(&format!("{prefix}_PASSWORD")).unwrap_or(current.password),
        };
        Self {
            admin: portal("ADMIN", self.admin),
            partner: portal("PARTNER", self.partner),
            browser_debug_port: parse_var(&lookup, "BROWSER_DEBUG_PORT").or(self.browser_debug_port),
            headless: parse_var(&lookup, "HEADLESS").unwrap_or(self.headless),
            chrome_executable: lookup("CHROME_EXECUTABLE")
                .map(PathBuf::from)
                .or(self.chrome_executable),
            artifacts_dir: lookup("ARTIFACTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(self.artifacts_dir),
            max_concurrent_scenarios: parse_var(&lookup, "MAX_CONCURRENT_SCENARIOS")
                .unwrap_or(self.max_concurrent_scenarios),
            element_timeout_ms: parse_var(&lookup, "ELEMENT_TIMEOUT_MS").unwrap_or(self.element_timeout_ms),
            query_timeout_ms: parse_var(&lookup, "QUERY_TIMEOUT_MS").unwrap_or(self.query_timeout_ms),
            toast_timeout_ms: parse_var(&lookup, "TOAST_TIMEOUT_MS").unwrap_or(self.toast_timeout_ms),
            settle_timeout_ms: parse_var(&lookup, "SETTLE_TIMEOUT_MS").unwrap_or(self.settle_timeout_ms),
            poll_interval_ms: parse_var(&lookup, "POLL_INTERVAL_MS").unwrap_or(self.poll_interval_ms),
        }
    }

    pub fn portal(&self, portal: Portal) -> &PortalConfig {
        match portal {
            Portal::Admin => &self.admin,
            Portal::Partner => &self.partner,
        }
    }

    pub fn element_wait(&self) -> WaitConfig {
        WaitConfig::new(
            Duration::from_millis(self.element_timeout_ms),
            Duration::from_millis(self.poll_interval_ms),
        )
    }

    pub fn query_wait(&self) -> WaitConfig {
        WaitConfig::new(
            Duration::from_millis(self.query_timeout_ms),
            Duration::from_millis(self.poll_interval_ms),
        )
    }

    pub fn toast_wait(&self) -> WaitConfig {
        WaitConfig::new(
            Duration::from_millis(self.toast_timeout_ms),
            Duration::from_millis(self.poll_interval_ms),
        )
    }

    pub fn settle_wait(&self) -> WaitConfig {
        WaitConfig::new(
            Duration::from_millis(self.settle_timeout_ms),
            Duration::from_millis(self.poll_interval_ms),
        )
    }
}

/// 无法解析的值记一条警告并沿用原值
fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match parse_value(key, &raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("⚠️ {}，沿用原值", e);
            None
        }
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> AppResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::env_var_parse_failed(key, raw, std::any::type_name::<T>()))
}
