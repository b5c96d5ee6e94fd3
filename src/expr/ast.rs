//! Expression AST produced by [`super::parser`].

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
/// Expression AST node.
pub enum ExprNode {
    /// `null`
    Null,
    /// `true` / `false`
    Bool { value: bool },
    /// Integer literal, decimal or hex.
    Int { value: i64 },
    /// Number literal with a fraction or an exponent.
    Float { value: f64 },
    /// String literal with `''` escapes already resolved.
    String { value: String },
    /// Bare identifier such as `github` or `matrix`.
    Variable { name: String },
    /// `receiver.property`
    ObjectDeref {
        receiver: Box<ExprNode>,
        property: String,
    },
    /// `receiver.*`
    ArrayDeref { receiver: Box<ExprNode> },
    /// `receiver[index]`
    IndexAccess {
        receiver: Box<ExprNode>,
        index: Box<ExprNode>,
    },
    /// `!operand`
    NotOp { operand: Box<ExprNode> },
    /// Comparison or equality.
    CompareOp {
        kind: CompareOpKind,
        left: Box<ExprNode>,
        right: Box<ExprNode>,
    },
    /// `&&` / `||`
    LogicalOp {
        kind: LogicalOpKind,
        left: Box<ExprNode>,
        right: Box<ExprNode>,
    },
    /// `name(args...)`; the name keeps the case it was written with.
    FuncCall { name: String, args: Vec<ExprNode> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOpKind {
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Eq,
    NotEq,
}

impl CompareOpKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOpKind::Less => "<",
            CompareOpKind::LessEq => "<=",
            CompareOpKind::Greater => ">",
            CompareOpKind::GreaterEq => ">=",
            CompareOpKind::Eq => "==",
            CompareOpKind::NotEq => "!=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOpKind {
    And,
    Or,
}

impl LogicalOpKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LogicalOpKind::And => "&&",
            LogicalOpKind::Or => "||",
        }
    }
}

impl ExprNode {
    /// Direct children in source order.
    pub fn children(&self) -> Vec<&ExprNode> {
        match self {
            ExprNode::Null
            | ExprNode::Bool { .. }
            | ExprNode::Int { .. }
            | ExprNode::Float { .. }
            | ExprNode::String { .. }
            | ExprNode::Variable { .. } => Vec::new(),
            ExprNode::ObjectDeref { receiver, .. } | ExprNode::ArrayDeref { receiver } => {
                vec![receiver.as_ref()]
            }
            ExprNode::IndexAccess { receiver, index } => vec![receiver.as_ref(), index.as_ref()],
            ExprNode::NotOp { operand } => vec![operand.as_ref()],
            ExprNode::CompareOp { left, right, .. } | ExprNode::LogicalOp { left, right, .. } => {
                vec![left.as_ref(), right.as_ref()]
            }
            ExprNode::FuncCall { args, .. } => args.iter().collect(),
        }
    }
}

/// Walks `node` depth first. `f` is called with `entering == true` before a
/// node's children and with `entering == false` after them; `parent` is `None`
/// only for the root.
///
/// The walk keeps its own stack, so long dereference chains do not grow the
/// call stack.
pub fn visit<'a, F>(node: &'a ExprNode, mut f: F)
where
    F: FnMut(&'a ExprNode, Option<&'a ExprNode>, bool),
{
    enum Step<'a> {
        Enter(&'a ExprNode, Option<&'a ExprNode>),
        Leave(&'a ExprNode, Option<&'a ExprNode>),
    }

    let mut stack = vec![Step::Enter(node, None)];
    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(n, parent) => {
                f(n, parent, true);
                stack.push(Step::Leave(n, parent));
                for child in n.children().into_iter().rev() {
                    stack.push(Step::Enter(child, Some(n)));
                }
            }
            Step::Leave(n, parent) => f(n, parent, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> ExprNode {
        ExprNode::Variable {
            name: name.to_string(),
        }
    }

    #[test]
    fn visit_enters_and_leaves_in_source_order() {
        let node = ExprNode::CompareOp {
            kind: CompareOpKind::Eq,
            left: Box::new(ExprNode::ObjectDeref {
                receiver: Box::new(var("a")),
                property: "b".to_string(),
            }),
            right: Box::new(var("c")),
        };

        let mut events = Vec::new();
        visit(&node, |n, parent, entering| {
            let label = match n {
                ExprNode::Variable { name } => name.clone(),
                ExprNode::ObjectDeref { property, .. } => format!(".{property}"),
                ExprNode::CompareOp { kind, .. } => kind.as_str().to_string(),
                _ => "?".to_string(),
            };
            events.push((label, parent.is_some(), entering));
        });

        let expected: Vec<(String, bool, bool)> = vec![
            ("==".into(), false, true),
            (".b".into(), true, true),
            ("a".into(), true, true),
            ("a".into(), true, false),
            (".b".into(), true, false),
            ("c".into(), true, true),
            ("c".into(), true, false),
            ("==".into(), false, false),
        ];
        assert_eq!(events, expected);
    }

    #[test]
    fn children_of_call_are_its_args() {
        let call = ExprNode::FuncCall {
            name: "contains".to_string(),
            args: vec![var("x"), ExprNode::Null],
        };
        assert_eq!(call.children(), vec![&var("x"), &ExprNode::Null]);
        assert!(ExprNode::Int { value: 1 }.children().is_empty());
    }
}
