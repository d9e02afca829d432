//! Procedures and test suites handed to a source emitter.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::ir::statement::{Expr, Statement, TypeRef};
use crate::model::QualifiedName;

/// What a procedure is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcedureRole {
    /// A test case.
    Test,

    /// A zero-argument helper returning one value.
    Helper { returns: TypeRef },
}

/// A named procedure with an ordered body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Procedure {
    /// Procedure name, unique within its suite.
    pub name: String,

    /// Test or helper.
    pub role: ProcedureRole,

    /// Body statements.
    pub body: Vec<Statement>,
}

impl Procedure {
    /// Create a test procedure.
    pub fn test(name: impl Into<String>, body: Vec<Statement>) -> Self {
        Self {
            name: name.into(),
            role: ProcedureRole::Test,
            body,
        }
    }

    /// Create a helper procedure.
    pub fn helper(name: impl Into<String>, returns: TypeRef, body: Vec<Statement>) -> Self {
        Self {
            name: name.into(),
            role: ProcedureRole::Helper { returns },
            body,
        }
    }

    /// Check whether this is a test.
    pub fn is_test(&self) -> bool {
        matches!(self.role, ProcedureRole::Test)
    }

    /// Names of helpers this procedure calls.
    pub fn calls(&self) -> BTreeSet<&str> {
        let mut calls = BTreeSet::new();
        for stmt in &self.body {
            for expr in stmt.exprs() {
                expr.walk(&mut |e| {
                    if let Expr::Call(name) = e {
                        calls.insert(name.as_str());
                    }
                });
            }
        }
        calls
    }
}

/// Package and class name of a generated suite.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SuiteName {
    /// Package, shared with the target type.
    pub package: String,

    /// Class name of the suite.
    pub class: String,
}

impl fmt::Display for SuiteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            write!(f, "{}", self.class)
        } else {
            write!(f, "{}.{}", self.package, self.class)
        }
    }
}

/// Generated test suite for one target type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSuite {
    /// Suite name.
    pub name: SuiteName,

    /// Target type under test.
    pub target: QualifiedName,

    /// Test procedures, in emission order.
    pub tests: Vec<Procedure>,

    /// Helper factories referenced by the tests (and by each other).
    pub helpers: Vec<Procedure>,
}

impl TestSuite {
    /// Look up a test by name.
    pub fn test(&self, name: &str) -> Option<&Procedure> {
        self.tests.iter().find(|p| p.name == name)
    }

    /// Look up a helper by name.
    pub fn helper(&self, name: &str) -> Option<&Procedure> {
        self.helpers.iter().find(|p| p.name == name)
    }

    /// Tests followed by helpers.
    pub fn procedures(&self) -> impl Iterator<Item = &Procedure> {
        self.tests.iter().chain(self.helpers.iter())
    }

    /// Every type the suite declares, constructs or returns.
    pub fn referenced_types(&self) -> BTreeSet<TypeRef> {
        let mut types = BTreeSet::new();
        for procedure in self.procedures() {
            if let ProcedureRole::Helper { returns } = &procedure.role {
                types.insert(returns.clone());
            }
            for stmt in &procedure.body {
                if let Some(ty) = stmt.declared_type() {
                    types.insert(ty.clone());
                }
                for expr in stmt.exprs() {
                    expr.walk(&mut |e| match e {
                        Expr::New { ty, .. } => {
                            types.insert(ty.clone());
                        }
                        Expr::Temporal(value) => {
                            types.insert(TypeRef::Temporal(value.kind()));
                        }
                        Expr::EmptyCollection(kind) => {
                            types.insert(TypeRef::Collection(*kind));
                        }
                        _ => {}
                    });
                }
            }
        }
        types
    }
}
