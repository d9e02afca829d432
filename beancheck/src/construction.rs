//! Construction Strategy: turns an assignment into build statements.
//!
//! The statements assign a fresh instance to an already declared local.
//! Declaring the local is left to the caller so one declaration can serve
//! several builds.

use crate::catalog::SampleValue;
use crate::combination::Assignment;
use crate::error::{GenerateError, GenerateResult};
use crate::ir::{Expr, Literal, Statement, TypeRef};
use crate::model::{ConstructionStrategy, TargetType};
use crate::registry::FactoryRegistry;

/// Setter name for a field: `set` plus the name with its first letter
/// upper-cased.
pub fn setter_name(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => format!("set{}{}", first.to_uppercase(), chars.as_str()),
        None => "set".to_string(),
    }
}

/// Expression for one sample value.
///
/// Factory-backed values register their factory with `registry`.
pub fn render_value(value: &SampleValue, registry: &mut FactoryRegistry<'_>) -> GenerateResult<Expr> {
    Ok(match value {
        SampleValue::Text(text) => Expr::Literal(Literal::Str(text.clone())),
        SampleValue::Int32(n) => Expr::Literal(Literal::Int32(*n)),
        SampleValue::Int64(n) => Expr::Literal(Literal::Int64(*n)),
        SampleValue::Factory(key) => registry.call(key)?,
        SampleValue::Absent => Expr::Absent,
    })
}

/// Statements building one instance of `target` into `binding`.
pub fn build_instance(
    target: &TargetType,
    binding: &str,
    assignment: &Assignment,
    registry: &mut FactoryRegistry<'_>,
) -> GenerateResult<Vec<Statement>> {
    if assignment.len() != target.fields.len() {
        return Err(GenerateError::AssignmentArity {
            target: target.name.clone(),
            expected: target.fields.len(),
            actual: assignment.len(),
        });
    }

    let ty = TypeRef::Target(target.name.clone());

    match target.construction {
        ConstructionStrategy::FillConstructor => {
            let args = assignment
                .iter()
                .map(|value| render_value(value, registry))
                .collect::<GenerateResult<Vec<_>>>()?;
            Ok(vec![Statement::Assign {
                name: binding.to_string(),
                value: Expr::New { ty, args },
            }])
        }
        ConstructionStrategy::DefaultConstructThenSet => {
            let mut statements = Vec::with_capacity(assignment.len() + 1);
            statements.push(Statement::Assign {
                name: binding.to_string(),
                value: Expr::New {
                    ty,
                    args: Vec::new(),
                },
            });
            for (field, value) in target.fields.iter().zip(assignment) {
                statements.push(Statement::Set {
                    target: binding.to_string(),
                    setter: setter_name(&field.name),
                    value: render_value(value, registry)?,
                });
            }
            Ok(statements)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FactoryKey;
    use crate::model::{QualifiedName, TargetCatalog, TemporalKind, TypeKind};
    use crate::registry::TemporalAnchor;

    fn name(s: &str) -> QualifiedName {
        QualifiedName::parse(s)
    }

    #[test]
    fn test_setter_name() {
        assert_eq!(setter_name("name"), "setName");
        assert_eq!(setter_name("x"), "setX");
        assert_eq!(setter_name("URL"), "setURL");
        assert_eq!(setter_name(""), "set");
    }

    #[test]
    fn test_fill_constructor() {
        let target = TargetType::new(name("p.Point"))
            .with_field("label", TypeKind::String)
            .with_field("x", TypeKind::Integer64)
            .with_construction(ConstructionStrategy::FillConstructor);
        let catalog = TargetCatalog::new(vec![target.clone()]).unwrap();
        let mut registry = FactoryRegistry::new(&catalog, TemporalAnchor::now(), target.name.clone());

        let statements = build_instance(
            &target,
            "obj1",
            &vec![SampleValue::Absent, SampleValue::Int64(2)],
            &mut registry,
        )
        .unwrap();

        assert_eq!(
            statements,
            vec![Statement::Assign {
                name: "obj1".into(),
                value: Expr::New {
                    ty: TypeRef::Target(name("p.Point")),
                    args: vec![Expr::Absent, Expr::Literal(Literal::Int64(2))],
                },
            }]
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_default_construct_then_set_registers_factories() {
        let target = TargetType::new(name("p.Event"))
            .with_field("title", TypeKind::String)
            .with_field("when", TypeKind::Instant);
        let catalog = TargetCatalog::new(vec![target.clone()]).unwrap();
        let mut registry = FactoryRegistry::new(&catalog, TemporalAnchor::now(), target.name.clone());

        let statements = build_instance(
            &target,
            "obj",
            &vec![
                SampleValue::Text("title1".into()),
                SampleValue::Factory(FactoryKey::temporal(TemporalKind::Instant, 2)),
            ],
            &mut registry,
        )
        .unwrap();

        assert_eq!(statements.len(), 3);
        assert_eq!(
            statements[2],
            Statement::Set {
                target: "obj".into(),
                setter: "setWhen".into(),
                value: Expr::Call("createInstant2".into()),
            }
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_arity_mismatch() {
        let target = TargetType::new(name("p.T")).with_field("a", TypeKind::String);
        let catalog = TargetCatalog::new(vec![target.clone()]).unwrap();
        let mut registry = FactoryRegistry::new(&catalog, TemporalAnchor::now(), target.name.clone());

        let err = build_instance(&target, "obj", &Vec::new(), &mut registry).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::AssignmentArity {
                expected: 1,
                actual: 0,
                ..
            }
        ));
    }
}
