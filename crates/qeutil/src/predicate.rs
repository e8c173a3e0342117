//! Single-column predicates.
//!
//! A [`Predicate`] is one `column <operator> value` condition. It is rendered two
//! ways from the same definition:
//!
//! - [`Predicate::to_condition`] lowers it into a [`Condition`] for the SQL builder
//! - [`Predicate::canonical`] produces the textual fingerprint used inside cache
//!   keys and invalidation patterns, e.g. `gt_comp>1` or `in_comp=[a,b,c]`
//!
//! Inside the fingerprint, key separators (`\ : & [ ] ,`) occurring in a column
//! or value are backslash-escaped, so a value can never spell out another clause.
//!
//! Operators form a closed set; unknown tokens are rejected when the predicate
//! is built instead of being dropped from the statement.
//!
//! # Example
//! ```ignore
//! use qeutil::{Operand, Predicate};
//!
//! let p = Predicate::in_list("in_comp", ["hello", "world", "!"])?;
//! assert_eq!(p.canonical(), "in_comp=[hello,world,!]");
//!
//! let p = Predicate::parse(">", "gt_comp", Operand::scalar(1))?;
//! assert_eq!(p.canonical(), "gt_comp>1");
//! # Ok::<(), qeutil::QeError>(())
//! ```

use crate::condition::{CompareOp, Condition};
use crate::error::{QeError, QeResult};
use crate::ident::Ident;
use crate::value::Value;
use std::fmt;
use std::str::FromStr;

/// Supported predicate operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`
    Eq,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Gte,
    /// `<=`
    Lte,
    /// `<>`
    Ne,
    /// `like`
    Like,
    /// `in`
    In,
}

impl Operator {
    /// Every supported operator.
    pub const ALL: [Operator; 8] = [
        Operator::Eq,
        Operator::Gt,
        Operator::Lt,
        Operator::Gte,
        Operator::Lte,
        Operator::Ne,
        Operator::Like,
        Operator::In,
    ];

    /// The operator token as written in canonical strings.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Gte => ">=",
            Operator::Lte => "<=",
            Operator::Ne => "<>",
            Operator::Like => "like",
            Operator::In => "in",
        }
    }

    /// Whether the operator takes a list operand.
    pub fn takes_list(self) -> bool {
        self == Operator::In
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = QeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s.trim().to_ascii_lowercase().as_str() {
            "=" => Operator::Eq,
            ">" => Operator::Gt,
            "<" => Operator::Lt,
            ">=" => Operator::Gte,
            "<=" => Operator::Lte,
            "<>" | "!=" => Operator::Ne,
            "like" => Operator::Like,
            "in" => Operator::In,
            _ => return Err(QeError::InvalidOperator(s.to_string())),
        };
        Ok(op)
    }
}

/// The right-hand side of a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Scalar(Value),
    List(Vec<Value>),
}

impl Operand {
    /// A single value.
    pub fn scalar(value: impl Into<Value>) -> Self {
        Operand::Scalar(value.into())
    }

    /// A sequence of values.
    pub fn list<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Operand::List(values.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Scalar(v) => f.write_str(&escape_key_part(&v.to_string())),
            Operand::List(values) => {
                f.write_str("[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    f.write_str(&escape_key_part(&v.to_string()))?;
                }
                f.write_str("]")
            }
        }
    }
}

/// One `column <operator> value` condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    operator: Operator,
    column: Ident,
    operand: Operand,
}

impl Predicate {
    /// Build a predicate, checking the column name and that the operand fits the operator.
    pub fn new(operator: Operator, column: &str, operand: Operand) -> QeResult<Self> {
        let column = Ident::parse(column)?;
        let mismatch = match (&operand, operator.takes_list()) {
            (Operand::Scalar(_), true) => Some("expects a list of values"),
            (Operand::List(_), false) => Some("expects a single value"),
            _ => None,
        };
        if let Some(message) = mismatch {
            return Err(QeError::InvalidOperand {
                operator: operator.to_string(),
                column: column.to_sql(),
                message: message.to_string(),
            });
        }
        Ok(Self {
            operator,
            column,
            operand,
        })
    }

    /// Build a predicate from a textual operator token (`=`, `>`, `like`, `in`, ...).
    ///
    /// Unknown tokens yield [`QeError::InvalidOperator`].
    pub fn parse(operator: &str, column: &str, operand: Operand) -> QeResult<Self> {
        Self::new(operator.parse()?, column, operand)
    }

    /// `column = value`
    pub fn eq(column: &str, value: impl Into<Value>) -> QeResult<Self> {
        Self::new(Operator::Eq, column, Operand::scalar(value))
    }

    /// `column > value`
    pub fn gt(column: &str, value: impl Into<Value>) -> QeResult<Self> {
        Self::new(Operator::Gt, column, Operand::scalar(value))
    }

    /// `column < value`
    pub fn lt(column: &str, value: impl Into<Value>) -> QeResult<Self> {
        Self::new(Operator::Lt, column, Operand::scalar(value))
    }

    /// `column >= value`
    pub fn gte(column: &str, value: impl Into<Value>) -> QeResult<Self> {
        Self::new(Operator::Gte, column, Operand::scalar(value))
    }

    /// `column <= value`
    pub fn lte(column: &str, value: impl Into<Value>) -> QeResult<Self> {
        Self::new(Operator::Lte, column, Operand::scalar(value))
    }

    /// `column <> value`
    pub fn ne(column: &str, value: impl Into<Value>) -> QeResult<Self> {
        Self::new(Operator::Ne, column, Operand::scalar(value))
    }

    /// `column LIKE pattern`
    pub fn like(column: &str, pattern: impl Into<Value>) -> QeResult<Self> {
        Self::new(Operator::Like, column, Operand::scalar(pattern))
    }

    /// `column IN (values...)`
    pub fn in_list<I>(column: &str, values: I) -> QeResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self::new(Operator::In, column, Operand::list(values))
    }

    /// Lower into the SQL builder's predicate fragment.
    pub fn to_condition(&self) -> Condition {
        let column = self.column.to_sql();
        let value = match &self.operand {
            Operand::List(values) => {
                return Condition::In {
                    column,
                    values: values.clone(),
                };
            }
            Operand::Scalar(v) => v.clone(),
        };
        let compare = |op| Condition::Compare {
            column: column.clone(),
            op,
            value: value.clone(),
        };
        match self.operator {
            // `in` always carries a list, so it was handled above.
            Operator::Eq | Operator::In => Condition::Eq {
                column: column.clone(),
                value: value.clone(),
            },
            Operator::Gt => compare(CompareOp::Gt),
            Operator::Lt => compare(CompareOp::Lt),
            Operator::Gte => compare(CompareOp::Gte),
            Operator::Lte => compare(CompareOp::Lte),
            Operator::Ne => compare(CompareOp::Ne),
            Operator::Like => Condition::Like {
                column: column.clone(),
                pattern: value.clone(),
            },
        }
    }

    /// Canonical string form: `<column><operator><value>`, or `<column>=[v1,v2,...]`
    /// for membership.
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    /// Wildcard pattern matching cache keys of `table` that contain this predicate.
    ///
    /// Shape: `<table>:*[:&]<predicate>*`, lower-cased like cache keys, with glob
    /// metacharacters in the table and predicate text escaped.
    pub fn invalidation_pattern(&self, table: &str) -> String {
        format!(
            "{}:*[:&]{}*",
            escape_pattern(&escape_key_part(table)),
            escape_pattern(&self.canonical())
        )
        .to_lowercase()
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let column = escape_key_part(&self.column.to_sql());
        match self.operator {
            Operator::In => write!(f, "{}={}", column, self.operand),
            op => write!(f, "{}{}{}", column, op, self.operand),
        }
    }
}

/// Backslash-escape cache-key separators (`\`, `:`, `&`, `[`, `]`, `,`).
pub(crate) fn escape_key_part(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | ':' | '&' | '[' | ']' | ',') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Backslash-escape Redis glob metacharacters (`*`, `?`, `[`, `]`, `\`).
pub fn escape_pattern(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_tokens_round_trip() {
        for op in Operator::ALL {
            assert_eq!(op.as_str().parse::<Operator>().unwrap(), op);
        }
        assert_eq!("LIKE".parse::<Operator>().unwrap(), Operator::Like);
        assert_eq!("In".parse::<Operator>().unwrap(), Operator::In);
        assert_eq!("!=".parse::<Operator>().unwrap(), Operator::Ne);
    }

    #[test]
    fn unknown_operator_is_rejected() {
        let err = Predicate::parse("between", "age", Operand::scalar(1)).unwrap_err();
        assert!(err.is_invalid_operator());
        assert!("".parse::<Operator>().is_err());
        assert!("==".parse::<Operator>().is_err());
    }

    #[test]
    fn operand_shape_must_fit_operator() {
        assert!(matches!(
            Predicate::new(Operator::In, "id", Operand::scalar(1)),
            Err(QeError::InvalidOperand { .. })
        ));
        assert!(matches!(
            Predicate::new(Operator::Eq, "id", Operand::list([1, 2])),
            Err(QeError::InvalidOperand { .. })
        ));
    }

    #[test]
    fn column_must_be_an_identifier() {
        assert!(Predicate::eq("id; DROP TABLE x", 1).is_err());
        assert!(Predicate::eq("", 1).is_err());
    }

    #[test]
    fn canonical_scalar_forms() {
        assert_eq!(Predicate::gt("gt_comp", 1).unwrap().canonical(), "gt_comp>1");
        assert_eq!(Predicate::lt("lt_comp", 2).unwrap().canonical(), "lt_comp<2");
        assert_eq!(Predicate::gte("a", 3).unwrap().canonical(), "a>=3");
        assert_eq!(Predicate::lte("a", 3).unwrap().canonical(), "a<=3");
        assert_eq!(Predicate::ne("a", "x").unwrap().canonical(), "a<>x");
        assert_eq!(Predicate::eq("name", "Bob").unwrap().canonical(), "name=Bob");
        assert_eq!(Predicate::like("name", "%bo%").unwrap().canonical(), "namelike%bo%");
    }

    #[test]
    fn canonical_membership_has_no_spaces() {
        let p = Predicate::in_list("in_comp", ["hello", "world", "!"]).unwrap();
        assert_eq!(p.canonical(), "in_comp=[hello,world,!]");
        assert_eq!(p.to_string(), p.canonical());
    }

    #[test]
    fn lowers_to_builder_conditions() {
        let p = Predicate::in_list("id", [1, 2]).unwrap();
        assert_eq!(
            p.to_condition(),
            Condition::In {
                column: "id".into(),
                values: vec![Value::Int(1), Value::Int(2)],
            }
        );

        let p = Predicate::ne("status", "gone").unwrap();
        assert_eq!(
            p.to_condition(),
            Condition::Compare {
                column: "status".into(),
                op: CompareOp::Ne,
                value: Value::from("gone"),
            }
        );

        let p = Predicate::like("name", "a%").unwrap();
        assert!(matches!(p.to_condition(), Condition::Like { .. }));
    }

    #[test]
    fn invalidation_pattern_shape() {
        let p = Predicate::eq("user_id", 7).unwrap();
        assert_eq!(p.invalidation_pattern("Orders"), "orders:*[:&]user_id=7*");

        let p = Predicate::in_list("tag", ["a", "b"]).unwrap();
        assert_eq!(p.invalidation_pattern("posts"), r"posts:*[:&]tag=\[a,b\]*");
    }

    #[test]
    fn canonical_escapes_key_separators() {
        let p = Predicate::eq("name", "alice:lim:10").unwrap();
        assert_eq!(p.canonical(), r"name=alice\:lim\:10");

        let p = Predicate::in_list("tag", ["a,b", "c]"]).unwrap();
        assert_eq!(p.canonical(), r"tag=[a\,b,c\]]");

        let p = Predicate::eq("path", r"a\b&c").unwrap();
        assert_eq!(p.canonical(), r"path=a\\b\&c");
    }

    #[test]
    fn escaped_value_pattern_escapes_twice() {
        let p = Predicate::eq("name", "a:b").unwrap();
        assert_eq!(p.invalidation_pattern("users"), r"users:*[:&]name=a\\:b*");
    }
}
