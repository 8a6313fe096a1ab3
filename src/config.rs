//! 方言配置模块：关键字拼写与字面量格式策略，可从JSON文件加载

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// 布尔字面量的输出策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BooleanStyle {
    /// `1` / `0`
    Numeric,
    /// `TRUE` / `FALSE`
    Keyword,
}

impl BooleanStyle {
    pub fn literal(&self, value: bool) -> &'static str {
        match (self, value) {
            (BooleanStyle::Numeric, true) => "1",
            (BooleanStyle::Numeric, false) => "0",
            (BooleanStyle::Keyword, true) => "TRUE",
            (BooleanStyle::Keyword, false) => "FALSE",
        }
    }
}

/// 日期字面量的构造形式，日期文本始终是 `YYYY-MM-DD`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateStyle {
    /// `TO_DATE('2024-01-31', 'YYYY-MM-DD')`
    ToDate,
    /// `DATE '2024-01-31'`
    Ansi,
}

/// `query` 模块生成 SELECT 语句时使用的后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    Postgres,
    Mysql,
    Sqlite,
}

/// 渲染策略，显式传给编译器而不是从全局状态读取
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dialect {
    /// 空过滤器（根组没有子节点）编译得到的"恒真"表达式
    pub always_true: String,
    pub boolean_style: BooleanStyle,
    pub date_style: DateStyle,
    /// 不等于运算符的拼写：`<>` 或 `!=`
    pub not_equal: String,
    /// 允许的最大组嵌套深度（根组为 1）
    pub max_depth: usize,
    pub backend: Backend,
}

pub const DEFAULT_MAX_DEPTH: usize = 64;

impl Default for Dialect {
    fn default() -> Self {
        Self {
            always_true: "1=1".to_string(),
            boolean_style: BooleanStyle::Numeric,
            date_style: DateStyle::ToDate,
            not_equal: "<>".to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            backend: Backend::Postgres,
        }
    }
}

impl Dialect {
    /// ANSI 风格：`TRUE` 作为恒真表达式，`TRUE`/`FALSE` 布尔值，`DATE '...'`
    pub fn ansi() -> Self {
        Self {
            always_true: "TRUE".to_string(),
            boolean_style: BooleanStyle::Keyword,
            date_style: DateStyle::Ansi,
            ..Default::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// 从JSON文件加载方言配置，缺失的字段使用默认值
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(ConfigError::NotFound(path_ref.display().to_string()));
        }

        let content = fs::read_to_string(path_ref).map_err(|source| ConfigError::Io {
            path: path_ref.display().to_string(),
            source,
        })?;

        Self::from_json_str(&content).map_err(|source| ConfigError::Json {
            path: path_ref.display().to_string(),
            source,
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// 加载配置文件，失败时记录警告并回退到默认方言
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_json_file(&path) {
            Ok(dialect) => {
                log::info!("loaded dialect from {}", path.as_ref().display());
                dialect
            }
            Err(e) => {
                log::warn!("{}, falling back to the default dialect", e);
                Self::default()
            }
        }
    }
}
