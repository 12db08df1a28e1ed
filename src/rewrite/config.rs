//! 重写配置
//!
//! 定义重写引擎的配置参数，支持从 TOML 片段加载。

use serde::{Deserialize, Serialize};

use crate::core::error::RewriteError;

/// 重写引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// 不动点迭代的最大轮数
    pub max_iteration_rounds: usize,
    /// 单个位置上连续应用规则的最大次数
    pub max_site_rounds: usize,
    /// 是否记录被拒绝的提案
    pub log_rejected_proposals: bool,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            max_iteration_rounds: 5,
            max_site_rounds: 128,
            log_rejected_proposals: true,
        }
    }
}

impl RewriteConfig {
    /// 从 TOML 片段加载配置，缺省字段使用默认值
    pub fn from_toml_str(input: &str) -> Result<Self, RewriteError> {
        toml::from_str(input).map_err(|e| RewriteError::Configuration(e.to_string()))
    }
}
