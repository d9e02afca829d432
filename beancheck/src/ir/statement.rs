//! Abstract statements and expressions.
//!
//! These carry every decision about values and coverage; an emitter only
//! turns them into concrete syntax.

use serde::{Deserialize, Serialize};

use crate::model::{CollectionKind, QualifiedName, TemporalKind};

/// Type appearing in a declaration or a helper's return position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TypeRef {
    /// A target type.
    Target(QualifiedName),

    /// A temporal library type.
    Temporal(TemporalKind),

    /// A collection library type.
    Collection(CollectionKind),
}

/// Literal value with its rendering style.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Literal {
    /// Quoted, escaped text.
    Str(String),

    /// Raw 32-bit integer.
    Int32(i32),

    /// Raw 64-bit integer.
    Int64(i64),
}

/// A fixed point or span of time, already resolved against the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemporalValue {
    /// Milliseconds since the Unix epoch.
    Instant { epoch_millis: i64 },

    /// Days since the Unix epoch.
    CalendarDate { epoch_day: i64 },

    /// Seconds since midnight.
    WallClockTime { second_of_day: u32 },

    /// Date and time of day.
    DateTime { epoch_day: i64, second_of_day: u32 },
}

impl TemporalValue {
    /// Kind of this value.
    pub fn kind(&self) -> TemporalKind {
        match self {
            TemporalValue::Instant { .. } => TemporalKind::Instant,
            TemporalValue::CalendarDate { .. } => TemporalKind::CalendarDate,
            TemporalValue::WallClockTime { .. } => TemporalKind::WallClockTime,
            TemporalValue::DateTime { .. } => TemporalKind::DateTime,
        }
    }
}

/// Expression tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expr {
    /// A literal.
    Literal(Literal),

    /// The absent value (`null`).
    Absent,

    /// A local variable.
    Var(String),

    /// Call of a zero-argument helper in the same suite.
    Call(String),

    /// Constructor invocation.
    New { ty: TypeRef, args: Vec<Expr> },

    /// Textual representation of the operand.
    Text(Box<Expr>),

    /// Hash code of the operand.
    Hash(Box<Expr>),

    /// A temporal value.
    Temporal(TemporalValue),

    /// An empty collection.
    EmptyCollection(CollectionKind),
}

impl Expr {
    /// Reference a local variable.
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    /// Textual representation of a local variable.
    pub fn text_of(name: impl Into<String>) -> Self {
        Expr::Text(Box::new(Expr::var(name)))
    }

    /// Hash code of a local variable.
    pub fn hash_of(name: impl Into<String>) -> Self {
        Expr::Hash(Box::new(Expr::var(name)))
    }

    /// Visit this expression and every sub-expression, outermost first.
    pub fn walk<'e>(&'e self, visit: &mut dyn FnMut(&'e Expr)) {
        visit(self);
        match self {
            Expr::New { args, .. } => args.iter().for_each(|arg| arg.walk(visit)),
            Expr::Text(inner) | Expr::Hash(inner) => inner.walk(visit),
            _ => {}
        }
    }
}

/// Assertion emitted into a test body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Assertion {
    /// Both sides are equal.
    Equal(Expr, Expr),

    /// The sides are not equal.
    NotEqual(Expr, Expr),

    /// The operand is not the absent value.
    NotAbsent(Expr),
}

/// One statement of a procedure body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Statement {
    /// Declare a local variable without initializing it.
    Declare { ty: TypeRef, name: String },

    /// Assign to a previously declared local.
    Assign { name: String, value: Expr },

    /// Call a setter on a local.
    Set {
        target: String,
        setter: String,
        value: Expr,
    },

    /// Assertion.
    Assert(Assertion),

    /// Return from a helper.
    Return(Expr),
}

impl Statement {
    /// Expressions directly held by this statement.
    pub fn exprs(&self) -> Vec<&Expr> {
        match self {
            Statement::Declare { .. } => Vec::new(),
            Statement::Assign { value, .. } | Statement::Set { value, .. } => vec![value],
            Statement::Assert(Assertion::Equal(a, b) | Assertion::NotEqual(a, b)) => vec![a, b],
            Statement::Assert(Assertion::NotAbsent(e)) | Statement::Return(e) => vec![e],
        }
    }

    /// Declared type, for declarations.
    pub fn declared_type(&self) -> Option<&TypeRef> {
        match self {
            Statement::Declare { ty, .. } => Some(ty),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_visits_nested_expressions() {
        let expr = Expr::New {
            ty: TypeRef::Target(QualifiedName::parse("sample.A")),
            args: vec![
                Expr::Literal(Literal::Str("a1".into())),
                Expr::Call("createB1".into()),
                Expr::Absent,
            ],
        };

        let mut calls = Vec::new();
        let mut count = 0;
        expr.walk(&mut |e| {
            count += 1;
            if let Expr::Call(name) = e {
                calls.push(name.as_str());
            }
        });

        assert_eq!(count, 4);
        assert_eq!(calls, vec!["createB1"]);
    }

    #[test]
    fn test_statement_exprs() {
        let stmt = Statement::Assert(Assertion::Equal(Expr::var("obj1"), Expr::var("obj2")));
        assert_eq!(stmt.exprs().len(), 2);

        let decl = Statement::Declare {
            ty: TypeRef::Collection(CollectionKind::List),
            name: "list".into(),
        };
        assert!(decl.exprs().is_empty());
        assert_eq!(
            decl.declared_type(),
            Some(&TypeRef::Collection(CollectionKind::List))
        );
    }

    #[test]
    fn test_temporal_value_kind() {
        let value = TemporalValue::DateTime {
            epoch_day: 1,
            second_of_day: 1000,
        };
        assert_eq!(value.kind(), TemporalKind::DateTime);
    }
}
