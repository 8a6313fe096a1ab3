//! 过滤树的数据模型：`Group` 内部节点与 `Condition` 叶子节点

use std::fmt;

use chrono::NaiveDate;

use crate::error::FilterError;

/// 组内子节点之间的连接运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupOp {
    And,
    Or,
}

impl GroupOp {
    pub fn keyword(&self) -> &'static str {
        match self {
            GroupOp::And => "AND",
            GroupOp::Or => "OR",
        }
    }
}

impl fmt::Display for GroupOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// 叶子条件的比较运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,      // =
    NotEq,   // <> 或 !=
    Lt,      // <
    Lte,     // <=
    Gt,      // >
    Gte,     // >=
    Like,
    NotLike,
    In,
    NotIn,
    Between,
    IsNull,
    IsNotNull,
}

impl Operator {
    pub const ALL: [Operator; 13] = [
        Operator::Eq,
        Operator::NotEq,
        Operator::Lt,
        Operator::Lte,
        Operator::Gt,
        Operator::Gte,
        Operator::Like,
        Operator::NotLike,
        Operator::In,
        Operator::NotIn,
        Operator::Between,
        Operator::IsNull,
        Operator::IsNotNull,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "EQ",
            Operator::NotEq => "NEQ",
            Operator::Lt => "LT",
            Operator::Lte => "LTE",
            Operator::Gt => "GT",
            Operator::Gte => "GTE",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT_LIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT_IN",
            Operator::Between => "BETWEEN",
            Operator::IsNull => "IS_NULL",
            Operator::IsNotNull => "IS_NOT_NULL",
        }
    }

    /// 具有自然否定形式的运算符返回其否定形式，比较运算符返回 `None`
    ///
    /// 已经是否定形式的运算符（`NOT_IN` 等）否定后回到肯定形式，
    /// 因此两个 `NOT` 永远不会叠加。
    pub fn natural_negation(&self) -> Option<Operator> {
        match self {
            Operator::Like => Some(Operator::NotLike),
            Operator::NotLike => Some(Operator::Like),
            Operator::In => Some(Operator::NotIn),
            Operator::NotIn => Some(Operator::In),
            Operator::IsNull => Some(Operator::IsNotNull),
            Operator::IsNotNull => Some(Operator::IsNull),
            // NOT BETWEEN is only reachable through `negated`.
            Operator::Between => None,
            Operator::Eq
            | Operator::NotEq
            | Operator::Lt
            | Operator::Lte
            | Operator::Gt
            | Operator::Gte => None,
        }
    }

    /// 检查运算符与值类型是否兼容
    pub fn accepts(&self, value: &TypedValue) -> bool {
        match self {
            Operator::Eq | Operator::NotEq => {
                value.is_scalar_bound() || matches!(value, TypedValue::Boolean(_))
            }
            Operator::Lt | Operator::Lte | Operator::Gt | Operator::Gte => value.is_scalar_bound(),
            Operator::Like | Operator::NotLike => matches!(value, TypedValue::String(_)),
            Operator::In | Operator::NotIn => matches!(value, TypedValue::StringList(_)),
            Operator::Between => match value {
                TypedValue::Range { lower, upper } => {
                    lower.is_scalar_bound() && upper.is_scalar_bound()
                }
                _ => false,
            },
            Operator::IsNull | Operator::IsNotNull => matches!(value, TypedValue::None),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 数值字面量，保留输入本身的整数/小数形式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn is_finite(&self) -> bool {
        match self {
            Number::Int(_) => true,
            Number::Float(f) => f.is_finite(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(n) => write!(f, "{}", n),
            // 始终输出定点小数，不使用指数形式
            Number::Float(n) => {
                let text = n.to_string();
                if text.contains('.') {
                    f.write_str(&text)
                } else {
                    write!(f, "{}.0", text)
                }
            }
        }
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::Int(n)
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::Int(n.into())
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::Float(n)
    }
}

/// 条件比较的字面量值
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    String(String),
    Number(Number),
    Date(NaiveDate),
    Boolean(bool),
    StringList(Vec<String>),
    Range {
        lower: Box<TypedValue>,
        upper: Box<TypedValue>,
    },
    None,
}

impl TypedValue {
    pub fn string(s: impl Into<String>) -> Self {
        TypedValue::String(s.into())
    }

    pub fn number(n: impl Into<Number>) -> Self {
        TypedValue::Number(n.into())
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TypedValue::StringList(items.into_iter().map(Into::into).collect())
    }

    pub fn range(lower: TypedValue, upper: TypedValue) -> Self {
        TypedValue::Range {
            lower: Box::new(lower),
            upper: Box::new(upper),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TypedValue::String(_) => "string",
            TypedValue::Number(n) if !n.is_finite() => "non-finite number",
            TypedValue::Number(_) => "number",
            TypedValue::Date(_) => "date",
            TypedValue::Boolean(_) => "boolean",
            TypedValue::StringList(_) => "string list",
            TypedValue::Range { .. } => "range",
            TypedValue::None => "none",
        }
    }

    /// 可用于有序比较和 BETWEEN 边界的值
    fn is_scalar_bound(&self) -> bool {
        match self {
            TypedValue::String(_) | TypedValue::Date(_) => true,
            TypedValue::Number(n) => n.is_finite(),
            _ => false,
        }
    }
}

/// 叶子节点：`field operator value`
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// 左操作数，原样输出（可以是函数表达式，例如 `SUBSTR(first_name, 1, 3)`）
    ///
    /// 调用方必须传入单个操作数表达式：编译器不会解析或加括号，
    /// 像 `a OR b` 这样的文本会改变生成表达式的布尔结构。
    pub field: String,
    pub operator: Operator,
    pub value: TypedValue,
    pub negated: bool,
    /// 在兄弟节点中的渲染顺序
    pub sequence: i64,
}

impl Condition {
    /// 构造并立即校验条件；运算符与值类型不兼容时返回错误
    pub fn new(
        field: impl Into<String>,
        operator: Operator,
        value: TypedValue,
    ) -> Result<Self, FilterError> {
        let condition = Condition {
            field: field.into(),
            operator,
            value,
            negated: false,
            sequence: 0,
        };
        condition.check()?;
        Ok(condition)
    }

    pub fn is_null(field: impl Into<String>) -> Result<Self, FilterError> {
        Self::new(field, Operator::IsNull, TypedValue::None)
    }

    pub fn in_list<I, S>(field: impl Into<String>, items: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(field, Operator::In, TypedValue::list(items))
    }

    pub fn between(
        field: impl Into<String>,
        lower: TypedValue,
        upper: TypedValue,
    ) -> Result<Self, FilterError> {
        Self::new(field, Operator::Between, TypedValue::range(lower, upper))
    }

    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    pub fn with_sequence(mut self, sequence: i64) -> Self {
        self.sequence = sequence;
        self
    }

    /// 结构校验：字段非空、运算符与值兼容、IN 列表非空
    pub fn check(&self) -> Result<(), FilterError> {
        if self.field.trim().is_empty() {
            return Err(FilterError::malformed(format!(
                "condition #{} has an empty field",
                self.sequence
            )));
        }

        if !self.operator.accepts(&self.value) {
            return Err(FilterError::UnsupportedOperator {
                field: self.field.clone(),
                operator: self.operator.to_string(),
                value_kind: self.value.kind().to_string(),
            });
        }

        if let TypedValue::StringList(items) = &self.value {
            if items.is_empty() {
                return Err(FilterError::EmptyListOperand {
                    field: self.field.clone(),
                });
            }
        }

        Ok(())
    }
}

/// 过滤树节点
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Group(Group),
    Condition(Condition),
}

impl Node {
    pub fn sequence(&self) -> i64 {
        match self {
            Node::Group(g) => g.sequence,
            Node::Condition(c) => c.sequence,
        }
    }

    fn set_sequence(&mut self, sequence: i64) {
        match self {
            Node::Group(g) => g.sequence = sequence,
            Node::Condition(c) => c.sequence = sequence,
        }
    }
}

impl From<Group> for Node {
    fn from(group: Group) -> Self {
        Node::Group(group)
    }
}

impl From<Condition> for Node {
    fn from(condition: Condition) -> Self {
        Node::Condition(condition)
    }
}

/// 内部节点：用同一个运算符连接所有直接子节点
///
/// 需要混合 AND/OR 时，用子 `Group` 嵌套表达，树中不存在按对变化的运算符。
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub operator: GroupOp,
    pub children: Vec<Node>,
    pub sequence: i64,
}

impl Group {
    pub fn new(operator: GroupOp) -> Self {
        Self {
            operator,
            children: Vec::new(),
            sequence: 0,
        }
    }

    pub fn and() -> Self {
        Self::new(GroupOp::And)
    }

    pub fn or() -> Self {
        Self::new(GroupOp::Or)
    }

    /// 按列表位置为子节点分配 `sequence`
    pub fn ordered<I>(operator: GroupOp, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        let children = children
            .into_iter()
            .enumerate()
            .map(|(idx, child)| {
                let mut node = child.into();
                node.set_sequence(idx as i64);
                node
            })
            .collect();
        Self {
            operator,
            children,
            sequence: 0,
        }
    }

    /// 追加子节点，保留其自身的 `sequence`
    pub fn push(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.push(child);
        self
    }

    pub fn with_sequence(mut self, sequence: i64) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_construction_validates_value_kind() {
        let err = Condition::new("salary", Operator::Like, TypedValue::number(10)).unwrap_err();
        assert_eq!(
            err,
            FilterError::UnsupportedOperator {
                field: "salary".to_string(),
                operator: "LIKE".to_string(),
                value_kind: "number".to_string(),
            }
        );

        assert!(Condition::new("a", Operator::IsNull, TypedValue::string("x")).is_err());
        assert!(Condition::new("a", Operator::Between, TypedValue::number(1)).is_err());
        assert!(Condition::new("a", Operator::Gt, TypedValue::Boolean(true)).is_err());
        assert!(Condition::new("a", Operator::Eq, TypedValue::Boolean(true)).is_ok());
    }

    #[test]
    fn test_empty_in_list_rejected_at_construction() {
        let err = Condition::in_list("status", Vec::<String>::new()).unwrap_err();
        assert_eq!(
            err,
            FilterError::EmptyListOperand {
                field: "status".to_string()
            }
        );
    }

    #[test]
    fn test_empty_field_is_malformed() {
        let err = Condition::is_null("  ").unwrap_err();
        assert!(matches!(err, FilterError::MalformedTree { .. }));
    }

    #[test]
    fn test_non_finite_number_rejected() {
        for operator in [Operator::Eq, Operator::NotEq, Operator::Gt, Operator::Lte] {
            for n in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
                let err = Condition::new("x", operator, TypedValue::number(n)).unwrap_err();
                match err {
                    FilterError::UnsupportedOperator { value_kind, .. } => {
                        assert_eq!(value_kind, "non-finite number")
                    }
                    other => panic!("unexpected error: {:?}", other),
                }
            }
        }
    }

    #[test]
    fn test_float_display_keeps_decimal_point() {
        assert_eq!(Number::Float(1.0).to_string(), "1.0");
        assert_eq!(Number::Float(0.25).to_string(), "0.25");
        assert_eq!(Number::Float(1e16).to_string(), "10000000000000000.0");
        assert_eq!(Number::Float(-1e-7).to_string(), "-0.0000001");
        assert!(!Number::Float(1e300).to_string().contains('e'));
    }

    #[test]
    fn test_range_bounds_must_be_scalar() {
        assert!(Condition::between("age", TypedValue::number(18), TypedValue::number(65)).is_ok());
        assert!(Condition::between("age", TypedValue::None, TypedValue::number(65)).is_err());
        assert!(Condition::between(
            "age",
            TypedValue::list(["a"]),
            TypedValue::number(65)
        )
        .is_err());
    }

    #[test]
    fn test_negation_toggles() {
        let c = Condition::is_null("a").unwrap().negate();
        assert!(c.negated);
        assert!(!c.negate().negated);
    }

    #[test]
    fn test_natural_negation_is_an_involution() {
        for op in Operator::ALL {
            if let Some(neg) = op.natural_negation() {
                assert_eq!(neg.natural_negation(), Some(op));
            }
        }
    }

    #[test]
    fn test_ordered_assigns_positional_sequence() {
        let group = Group::ordered(
            GroupOp::And,
            vec![
                Condition::is_null("a").unwrap().with_sequence(9),
                Condition::is_null("b").unwrap().with_sequence(9),
            ],
        );
        let seqs: Vec<_> = group.children.iter().map(Node::sequence).collect();
        assert_eq!(seqs, vec![0, 1]);
    }

    #[test]
    fn test_number_display_preserves_representation() {
        assert_eq!(Number::Int(50000).to_string(), "50000");
        assert_eq!(Number::Float(50000.0).to_string(), "50000.0");
        assert_eq!(Number::Float(0.25).to_string(), "0.25");
        assert_eq!(Number::Int(-3).to_string(), "-3");
    }
}
