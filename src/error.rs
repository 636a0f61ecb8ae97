use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 元素定位错误
    #[error("定位错误: {0}")]
    Locate(#[from] LocateError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 用例导出错误
    #[error("导出错误: {0}")]
    Export(#[from] ExportError),
}

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed { port: u16, source: BoxedSource },
    /// 启动浏览器失败
    #[error("启动浏览器失败: {source}")]
    LaunchFailed { source: BoxedSource },
    /// 创建页面失败
    #[error("创建页面失败: {source}")]
    PageCreationFailed { source: BoxedSource },
    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    NavigationFailed { url: String, source: BoxedSource },
    /// 执行脚本失败
    #[error("执行脚本失败: {source}")]
    ScriptExecutionFailed { source: BoxedSource },
    /// 浏览器配置失败
    #[error("浏览器配置失败: {message}")]
    ConfigurationFailed { message: String },
    /// 截图失败
    #[error("截图失败 ({path}): {source}")]
    ScreenshotFailed { path: String, source: BoxedSource },
}

/// 元素定位错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocateError {
    /// 所有候选选择器在超时内都没有可见匹配
    #[error("未找到元素 '{element}' ({timeout_ms}ms 内尝试了: {tried:?})")]
    NotFound {
        element: String,
        tried: Vec<String>,
        timeout_ms: u64,
    },
    /// 元素在超时内没有消失
    #[error("元素 '{element}' 在 {timeout_ms}ms 内仍然可见")]
    StillVisible { element: String, timeout_ms: u64 },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed { path: String, source: BoxedSource },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed { path: String, source: BoxedSource },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed { path: String, source: BoxedSource },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 未知门户名称
    #[error("未知门户: '{value}' (可选: admin, partner)")]
    UnknownPortal { value: String },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

/// 用例导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    /// 列表命令执行失败
    #[error("执行列表命令失败 ({command}): {source}")]
    CommandFailed { command: String, source: BoxedSource },
    /// 列表命令为空
    #[error("列表命令为空")]
    EmptyCommand,
    /// CSV 写入失败
    #[error("CSV写入失败: {source}")]
    CsvFailed { source: BoxedSource },
}

// ========== 从常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: String::new(), // TOML错误不包含路径信息
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Export(ExportError::CsvFailed {
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建浏览器连接错误
    pub fn browser_connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed {
            port,
            source: Box::new(source),
        })
    }

    /// 创建浏览器启动错误
    pub fn browser_launch_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Browser(BrowserError::LaunchFailed {
            source: Box::new(source),
        })
    }

    /// 创建导航错误
    pub fn navigation_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::NavigationFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }

    /// 创建截图错误
    pub fn screenshot_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::ScreenshotFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建环境变量解析错误
    pub fn env_var_parse_failed(
        var_name: impl Into<String>,
        value: impl Into<String>,
        expected_type: impl Into<String>,
    ) -> Self {
        AppError::Config(ConfigError::EnvVarParseFailed {
            var_name: var_name.into(),
            value: value.into(),
            expected_type: expected_type.into(),
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 判断是否为元素定位失败
    pub fn is_locate_failure(&self) -> bool {
        matches!(self, AppError::Locate(_))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_lists_tried_strategies() {
        let err = LocateError::NotFound {
            element: "email input".to_string(),
            tried: vec!["css=input[type='email']".to_string(), "placeholder=Email".to_string()],
            timeout_ms: 500,
        };
        let text = AppError::from(err).to_string();
        assert!(text.contains("email input"));
        assert!(text.contains("placeholder=Email"));
        assert!(text.contains("500ms"));
    }

    #[test]
    fn locate_failures_are_recognisable_after_wrapping() {
        let err: AppError = LocateError::StillVisible {
            element: "dropdown panel".to_string(),
            timeout_ms: 100,
        }
        .into();
        assert!(err.is_locate_failure());
        assert!(!AppError::Export(ExportError::EmptyCommand).is_locate_failure());
    }

    #[test]
    fn navigation_and_screenshot_errors_carry_their_target() {
        let io = || std::io::Error::new(std::io::ErrorKind::Other, "target closed");
        let nav = AppError::navigation_failed("https://admin.example.test/login", io());
        assert!(matches!(nav, AppError::Browser(BrowserError::NavigationFailed { .. })));
        assert!(nav.to_string().contains("https://admin.example.test/login"));

        let shot = AppError::screenshot_failed("artifacts/login-failure.png", io());
        assert!(shot.to_string().contains("artifacts/login-failure.png"));
        assert!(shot.to_string().contains("target closed"));
    }
}
