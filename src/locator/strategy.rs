//! 选择器策略与候选集合

use std::fmt;

use serde::{Deserialize, Serialize};

/// 单个候选选择器
///
/// 序列化为 JSON 后交给页面内的辅助脚本求值，见 `infrastructure::scripts`。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    Css {
        value: String,
    },
    Xpath {
        value: String,
    },
    /// 按可见文本匹配，`scope` 为可选的 CSS 范围（如 `button`）
    Text {
        value: String,
        scope: Option<String>,
        exact: bool,
    },
    /// ARIA 角色（含隐式角色），可选按可访问名称过滤
    Role {
        role: String,
        name: Option<String>,
    },
    Placeholder {
        value: String,
    },
    /// 通过 `<label>` 文本找到对应控件
    Label {
        value: String,
    },
    TestId {
        value: String,
    },
}

impl Strategy {
    pub fn css(value: impl Into<String>) -> Self {
        Strategy::Css { value: value.into() }
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Strategy::Xpath { value: value.into() }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Strategy::Text {
            value: value.into(),
            scope: None,
            exact: false,
        }
    }

    pub fn text_in(scope: impl Into<String>, value: impl Into<String>) -> Self {
        Strategy::Text {
            value: value.into(),
            scope: Some(scope.into()),
            exact: false,
        }
    }

    pub fn exact_text_in(scope: impl Into<String>, value: impl Into<String>) -> Self {
        Strategy::Text {
            value: value.into(),
            scope: Some(scope.into()),
            exact: true,
        }
    }

    pub fn role(role: impl Into<String>) -> Self {
        Strategy::Role {
            role: role.into(),
            name: None,
        }
    }

    pub fn role_named(role: impl Into<String>, name: impl Into<String>) -> Self {
        Strategy::Role {
            role: role.into(),
            name: Some(name.into()),
        }
    }

    pub fn placeholder(value: impl Into<String>) -> Self {
        Strategy::Placeholder { value: value.into() }
    }

    pub fn label(value: impl Into<String>) -> Self {
        Strategy::Label { value: value.into() }
    }

    pub fn test_id(value: impl Into<String>) -> Self {
        Strategy::TestId { value: value.into() }
    }

    /// 页面内求值用的 JSON
    pub fn to_json(&self) -> String {
        // 枚举只含字符串与布尔字段，序列化不会失败
        serde_json::to_string(self).unwrap_or_else(|_| "null".to_string())
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Css { value } => write!(f, "css={}", value),
            Strategy::Xpath { value } => write!(f, "xpath={}", value),
            Strategy::Text { value, scope, exact } => {
                let op = if *exact { "==" } else { "~=" };
                match scope {
                    Some(scope) => write!(f, "text[{}]{}{}", scope, op, value),
                    None => write!(f, "text{}{}", op, value),
                }
            }
            Strategy::Role { role, name } => match name {
                Some(name) => write!(f, "role={}[name~={}]", role, name),
                None => write!(f, "role={}", role),
            },
            Strategy::Placeholder { value } => write!(f, "placeholder={}", value),
            Strategy::Label { value } => write!(f, "label={}", value),
            Strategy::TestId { value } => write!(f, "testid={}", value),
        }
    }
}

/// 候选全部没有可见匹配时的兜底方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Fallback {
    #[default]
    None,
    /// 接受已挂载但不可见的匹配（只读属性/文本时有用）
    DomAttached,
    /// 强制把已挂载的匹配及其祖先设为可见后再使用
    ForceVisible,
}

/// 一个逻辑元素的候选选择器集合，按顺序尝试
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub name: String,
    pub candidates: Vec<Strategy>,
    pub fallback: Fallback,
}

impl Locator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            candidates: Vec::new(),
            fallback: Fallback::None,
        }
    }

    pub fn with(mut self, strategy: Strategy) -> Self {
        if !self.candidates.contains(&strategy) {
            self.candidates.push(strategy);
        }
        self
    }

    pub fn css(self, value: impl Into<String>) -> Self {
        self.with(Strategy::css(value))
    }

    pub fn xpath(self, value: impl Into<String>) -> Self {
        self.with(Strategy::xpath(value))
    }

    pub fn text(self, value: impl Into<String>) -> Self {
        self.with(Strategy::text(value))
    }

    pub fn text_in(self, scope: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(Strategy::text_in(scope, value))
    }

    pub fn role(self, role: impl Into<String>) -> Self {
        self.with(Strategy::role(role))
    }

    pub fn role_named(self, role: impl Into<String>, name: impl Into<String>) -> Self {
        self.with(Strategy::role_named(role, name))
    }

    pub fn placeholder(self, value: impl Into<String>) -> Self {
        self.with(Strategy::placeholder(value))
    }

    pub fn label(self, value: impl Into<String>) -> Self {
        self.with(Strategy::label(value))
    }

    pub fn test_id(self, value: impl Into<String>) -> Self {
        self.with(Strategy::test_id(value))
    }

    pub fn fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// 候选的可读描述，用于错误信息
    pub fn describe_candidates(&self) -> Vec<String> {
        self.candidates.iter().map(ToString::to_string).collect()
    }
}

/// 定位结果：命中的策略、在该策略匹配中的下标，以及是否可见
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub element: String,
    pub strategy: Strategy,
    pub index: usize,
    pub visible: bool,
}
