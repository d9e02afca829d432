//! Abstract statement representation of generated suites.
//!
//! A [`TestSuite`] is the unit handed to a source emitter: test procedures
//! plus the helper factories they reference, each an ordered list of
//! [`Statement`]s.

pub mod statement;
pub mod suite;

pub use statement::{Assertion, Expr, Literal, Statement, TemporalValue, TypeRef};
pub use suite::{Procedure, ProcedureRole, SuiteName, TestSuite};
