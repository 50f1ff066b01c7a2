//! `config`：用户设置（是否启用、候选数量、点击策略、浮层尺寸等）。
//!
//! 配置文件是 TOML，所有键都可省略：
//!
//! ```toml
//! enabled = true
//! max-suggestions = 8
//! click-policy = "confirm-immediately"
//! debounce-ms = 30
//! ```

use std::{fs, io, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::filter::DEFAULT_LIMIT;

/// 候选数量上限的上界。
pub const MAX_LIMIT: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// 鼠标点击候选时的策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClickPolicy {
    /// 第一次点击高亮，再次点击同一行才写回；点击已高亮的行（包括自动高亮的
    /// 第一行）直接写回
    #[default]
    SelectThenConfirm,
    /// 点击即写回
    ConfirmImmediately,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SuggestionConfig {
    /// 输入时显示候选
    pub enabled: bool,
    /// 表格单元格编辑时显示候选。
    ///
    /// 引擎本身不读这个开关：带表格的 GUI 宿主据此决定单元格编辑时是否发
    /// `EditingStarted`。
    pub enabled_in_tables: bool,
    /// 候选数量（1-20）；0 或负数回退到默认值，超过 20 按 20 处理
    pub max_suggestions: i64,
    /// 新列表到达且没有选中行时，自动选中第一行
    pub highlight_first: bool,
    pub click_policy: ClickPolicy,
    /// 单行高度（含 1px 分隔线）
    pub row_height: f64,
    /// 浮层与输入框的间距
    pub gap: f64,
    /// 过滤请求在 worker 上延迟执行的毫秒数
    pub debounce_ms: u64,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            enabled_in_tables: true,
            max_suggestions: DEFAULT_LIMIT as i64,
            highlight_first: true,
            click_policy: ClickPolicy::default(),
            row_height: 21.0,
            gap: 5.0,
            debounce_ms: 0,
        }
    }
}

impl SuggestionConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let s = fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&s)?;
        tracing::info!(path = %path.as_ref().display(), "loaded suggestion config");
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.row_height.is_finite() && self.row_height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "row-height must be positive, got {}",
                self.row_height
            )));
        }
        if !(self.gap.is_finite() && self.gap >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "gap must not be negative, got {}",
                self.gap
            )));
        }
        Ok(())
    }

    /// 实际使用的候选数量上限。
    pub fn limit(&self) -> usize {
        match usize::try_from(self.max_suggestions) {
            Ok(0) | Err(_) => DEFAULT_LIMIT,
            Ok(n) => n.min(MAX_LIMIT),
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
