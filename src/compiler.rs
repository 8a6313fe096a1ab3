//! Filter compiler that turns a validated filter tree into a boolean expression string.
//!
//! Compilation runs in two passes over the tree: a validation pass that rejects
//! structural problems before any text is produced, then a post-order rendering
//! pass. A child group is wrapped in parentheses only when its rendered text has a
//! top-level connective different from the parent's; same-operator groups are
//! flattened and single-child groups are transparent.

use std::collections::HashSet;

use crate::ast::{Condition, Group, GroupOp, Node, Operator, TypedValue};
use crate::config::Dialect;
use crate::error::FilterError;
use crate::formatter::format_value;
use crate::query;

/// A structural rewrite applied while rendering
#[derive(Debug, Clone, PartialEq)]
pub enum Rewrite {
    /// A nested group was merged into a parent with the same operator.
    Flattened { depth: usize, operator: GroupOp },
    /// A non-root group with a single child rendered as that child.
    SingleChildUnwrapped { depth: usize },
    /// A negated condition used the operator's natural negated form.
    NegationFolded { field: String, rendered: Operator },
}

/// Result of compilation with the rewrites that shaped the text
#[derive(Debug, Clone, PartialEq)]
pub struct CompileResult {
    pub expression: String,
    pub rewrites: Vec<Rewrite>,
}

/// Rendered text of a subtree plus its top-level connective, if any.
struct Rendered {
    text: String,
    connective: Option<GroupOp>,
}

impl Rendered {
    fn leaf(text: String) -> Self {
        Self {
            text,
            connective: None,
        }
    }
}

/// Compiles filter trees for one dialect. Holds no state between calls.
#[derive(Debug, Clone, Default)]
pub struct FilterCompiler {
    dialect: Dialect,
}

impl FilterCompiler {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Compile a filter tree into a boolean expression string
    pub fn compile(&self, root: &Group) -> Result<String, FilterError> {
        self.compile_with_report(root).map(|result| result.expression)
    }

    /// Compile a filter tree and report the structural rewrites applied
    pub fn compile_with_report(&self, root: &Group) -> Result<CompileResult, FilterError> {
        self.validate(root)?;

        if root.is_empty() {
            log::debug!("empty filter, emitting `{}`", self.dialect.always_true);
            return Ok(CompileResult {
                expression: self.dialect.always_true.clone(),
                rewrites: Vec::new(),
            });
        }

        let mut rewrites = Vec::new();
        let rendered = self.render_group(root, 1, &mut rewrites)?;

        log::debug!(
            "compiled filter ({} rewrites): {}",
            rewrites.len(),
            rendered.text
        );

        Ok(CompileResult {
            expression: rendered.text,
            rewrites,
        })
    }

    /// Compile a filter tree and embed it in `SELECT * FROM <table> WHERE ...`
    pub fn compile_select(&self, table: &str, root: &Group) -> Result<String, FilterError> {
        let expression = self.compile(root)?;
        Ok(query::select_where(table, &expression, self.dialect.backend))
    }

    /// Check the whole tree for structural errors without rendering it
    pub fn validate(&self, root: &Group) -> Result<(), FilterError> {
        self.validate_group(root, 1, true)
    }

    fn validate_group(&self, group: &Group, depth: usize, is_root: bool) -> Result<(), FilterError> {
        if depth > self.dialect.max_depth {
            return Err(FilterError::TreeTooDeep {
                depth,
                max: self.dialect.max_depth,
            });
        }

        if !is_root && group.is_empty() {
            return Err(FilterError::malformed(format!(
                "group #{} at depth {} has no children",
                group.sequence, depth
            )));
        }

        let mut seen = HashSet::with_capacity(group.len());
        for child in &group.children {
            if !seen.insert(child.sequence()) {
                return Err(FilterError::malformed(format!(
                    "duplicate sequence {} among children of group #{} at depth {}",
                    child.sequence(),
                    group.sequence,
                    depth
                )));
            }
        }

        for child in &group.children {
            match child {
                Node::Group(g) => self.validate_group(g, depth + 1, false)?,
                Node::Condition(c) => c.check()?,
            }
        }

        Ok(())
    }

    fn render_group(
        &self,
        group: &Group,
        depth: usize,
        rewrites: &mut Vec<Rewrite>,
    ) -> Result<Rendered, FilterError> {
        let mut children: Vec<&Node> = group.children.iter().collect();
        children.sort_by_key(|node| node.sequence());

        if let [only] = children.as_slice() {
            if depth > 1 {
                rewrites.push(Rewrite::SingleChildUnwrapped { depth });
            }
            return self.render_node(only, depth, rewrites);
        }

        let mut parts = Vec::with_capacity(children.len());
        for child in children {
            let rendered = self.render_node(child, depth, rewrites)?;
            let text = match rendered.connective {
                Some(op) if op != group.operator => format!("({})", rendered.text),
                Some(op) => {
                    rewrites.push(Rewrite::Flattened {
                        depth: depth + 1,
                        operator: op,
                    });
                    rendered.text
                }
                None => rendered.text,
            };
            parts.push(text);
        }

        let separator = format!(" {} ", group.operator.keyword());
        Ok(Rendered {
            text: parts.join(&separator),
            connective: Some(group.operator),
        })
    }

    fn render_node(
        &self,
        node: &Node,
        depth: usize,
        rewrites: &mut Vec<Rewrite>,
    ) -> Result<Rendered, FilterError> {
        match node {
            Node::Group(g) => self.render_group(g, depth + 1, rewrites),
            Node::Condition(c) => self.render_condition(c, rewrites).map(Rendered::leaf),
        }
    }

    fn render_condition(
        &self,
        condition: &Condition,
        rewrites: &mut Vec<Rewrite>,
    ) -> Result<String, FilterError> {
        let mut operator = condition.operator;
        let mut negated = condition.negated;

        if negated {
            if let Some(flipped) = operator.natural_negation() {
                operator = flipped;
                negated = false;
                rewrites.push(Rewrite::NegationFolded {
                    field: condition.field.clone(),
                    rendered: flipped,
                });
            }
        }

        let keyword = match operator {
            Operator::Eq => "=",
            Operator::NotEq => self.dialect.not_equal.as_str(),
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Between if negated => {
                negated = false;
                rewrites.push(Rewrite::NegationFolded {
                    field: condition.field.clone(),
                    rendered: Operator::Between,
                });
                "NOT BETWEEN"
            }
            Operator::Between => "BETWEEN",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
        };

        let value = format_value(&condition.value, &self.dialect).map_err(|e| match e {
            FilterError::EmptyListOperand { .. } => FilterError::EmptyListOperand {
                field: condition.field.clone(),
            },
            other => other,
        })?;

        let body = match condition.value {
            TypedValue::None => format!("{} {}", condition.field, keyword),
            _ => format!("{} {} {}", condition.field, keyword, value),
        };

        log::trace!("rendered condition #{}: {}", condition.sequence, body);

        Ok(if negated { format!("NOT {}", body) } else { body })
    }
}
