//! 过滤树校验与编译过程中的错误类型

use thiserror::Error;

/// Structural errors found while validating a filter tree.
///
/// Every variant is detected before rendering starts, so a compile call either
/// returns the full expression or one of these, never partial text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// Empty non-root group, duplicate sibling sequence, or an empty field.
    #[error("malformed filter tree: {reason}")]
    MalformedTree { reason: String },

    /// Operator and value kind cannot be combined.
    #[error("operator {operator} does not accept a {value_kind} value (field `{field}`)")]
    UnsupportedOperator {
        field: String,
        operator: String,
        value_kind: String,
    },

    /// `IN` / `NOT IN` with nothing to compare against.
    #[error("empty value list for IN operand on field `{field}`")]
    EmptyListOperand { field: String },

    #[error("filter tree depth {depth} exceeds the maximum of {max}")]
    TreeTooDeep { depth: usize, max: usize },
}

impl FilterError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        FilterError::MalformedTree {
            reason: reason.into(),
        }
    }
}

/// 方言配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("配置文件不存在: {0}")]
    NotFound(String),

    #[error("无法读取配置文件 {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("无法解析JSON配置文件 {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_offender() {
        let err = FilterError::UnsupportedOperator {
            field: "salary".to_string(),
            operator: "LIKE".to_string(),
            value_kind: "number".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "operator LIKE does not accept a number value (field `salary`)"
        );

        let err = FilterError::TreeTooDeep { depth: 65, max: 64 };
        assert_eq!(err.to_string(), "filter tree depth 65 exceeds the maximum of 64");
    }

    #[test]
    fn test_variants_are_distinguishable() {
        let empty = FilterError::EmptyListOperand {
            field: "status".to_string(),
        };
        assert!(matches!(empty, FilterError::EmptyListOperand { .. }));
        assert_ne!(empty, FilterError::malformed("x"));
    }
}
