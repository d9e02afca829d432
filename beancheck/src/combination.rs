//! Equality combination generator.
//!
//! Produces the assignments the equals test builds pairwise. The set is a
//! bounded covering design rather than a cross product:
//!
//! - the baseline (every field at its first candidate) comes first;
//! - while every earlier field still holds its baseline, a field branches
//!   over all of its candidates;
//! - once a field has taken a non-baseline candidate, every later field is
//!   pinned to its baseline.
//!
//! So each non-baseline assignment differs from the baseline in exactly one
//! field, and any two assignments differ in at least one field. The size is
//! `1 + sum(len - 1)` over the candidate lists.

use crate::catalog::{FieldCandidates, SampleValue, PRIMARY_VARIANT};

/// One value per field, in declared order.
pub type Assignment = Vec<SampleValue>;

/// Covering set of assignments for the equals test, baseline first.
///
/// Pass candidate lists already restricted by the equality filter so that
/// excluded fields never vary.
pub fn equality_combinations(fields: &[FieldCandidates]) -> Vec<Assignment> {
    let mut result = Vec::with_capacity(combination_count(fields));
    let mut prefix = Vec::with_capacity(fields.len());
    expand(fields, &mut prefix, false, &mut result);
    result
}

/// Number of assignments [`equality_combinations`] yields.
pub fn combination_count(fields: &[FieldCandidates]) -> usize {
    1 + fields.iter().map(|f| f.len() - 1).sum::<usize>()
}

fn expand(
    fields: &[FieldCandidates],
    prefix: &mut Vec<SampleValue>,
    diverged: bool,
    result: &mut Vec<Assignment>,
) {
    let Some((head, rest)) = fields.split_first() else {
        result.push(prefix.clone());
        return;
    };

    if diverged {
        prefix.push(head.first().clone());
        expand(rest, prefix, true, result);
        prefix.pop();
        return;
    }

    for (position, value) in head.values().iter().enumerate() {
        prefix.push(value.clone());
        expand(rest, prefix, position > 0, result);
        prefix.pop();
    }
}

/// Assignment taking every field's last candidate.
///
/// With restricted lists this sets every equality field to absent (or to
/// its last literal for primitives) and leaves excluded fields at baseline.
pub fn absent_assignment(fields: &[FieldCandidates]) -> Assignment {
    fields.iter().map(|f| f.last().clone()).collect()
}

/// Fields at position `threshold` or later take their second candidate,
/// earlier fields their first.
pub fn threshold_assignment(fields: &[FieldCandidates], threshold: usize) -> Assignment {
    fields
        .iter()
        .enumerate()
        .map(|(position, f)| {
            if position >= threshold {
                f.alternate().clone()
            } else {
                f.first().clone()
            }
        })
        .collect()
}

/// Threshold used to build a helper instance of the given variant.
///
/// The primary variant switches no field; any later variant switches all of
/// them, so the two instances differ in every field that can vary.
pub fn variant_threshold(variant: u8) -> usize {
    if variant <= PRIMARY_VARIANT {
        usize::MAX
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{candidates_for, restricted_candidates};
    use crate::model::{
        EqualityFilter, QualifiedName, TargetCatalog, TargetType, TypeKind,
    };

    fn text(s: &str) -> SampleValue {
        SampleValue::Text(s.to_string())
    }

    fn strings(names: &[&str]) -> Vec<FieldCandidates> {
        let catalog = TargetCatalog::default();
        let owner = QualifiedName::parse("p.T");
        names
            .iter()
            .map(|n| FieldCandidates::new(*n, candidates_for(&TypeKind::String, n, &owner, &catalog)))
            .collect()
    }

    #[test]
    fn test_two_string_fields() {
        let combos = equality_combinations(&strings(&["name", "value"]));
        assert_eq!(
            combos,
            vec![
                vec![text("name1"), text("value1")],
                vec![text("name1"), text("value2")],
                vec![text("name1"), SampleValue::Absent],
                vec![text("name2"), text("value1")],
                vec![SampleValue::Absent, text("value1")],
            ]
        );
    }

    #[test]
    fn test_no_fields_yields_single_empty_assignment() {
        let combos = equality_combinations(&[]);
        assert_eq!(combos, vec![Vec::<SampleValue>::new()]);
    }

    #[test]
    fn test_count_matches_formula() {
        let fields = strings(&["a", "b", "c"]);
        let combos = equality_combinations(&fields);
        assert_eq!(combos.len(), 7);
        assert_eq!(combination_count(&fields), 7);
    }

    #[test]
    fn test_non_baseline_assignments_differ_from_baseline_in_one_field() {
        let combos = equality_combinations(&strings(&["a", "b", "c"]));
        let baseline = &combos[0];
        for combo in &combos[1..] {
            let differing = combo
                .iter()
                .zip(baseline.iter())
                .filter(|(x, y)| x != y)
                .count();
            assert_eq!(differing, 1);
        }
    }

    #[test]
    fn test_include_only_never_varies_excluded_field() {
        let target = TargetType::new(QualifiedName::parse("sample.MyHashEq"))
            .with_field("name", TypeKind::String)
            .with_field("value", TypeKind::String)
            .with_field("ignore", TypeKind::String)
            .with_equality(EqualityFilter::include_only(["name", "value"]));
        let catalog = TargetCatalog::new(vec![target.clone()]).unwrap();

        let fields = restricted_candidates(&target, &catalog);
        let combos = equality_combinations(&fields);

        assert_eq!(combos.len(), 5);
        for combo in &combos {
            assert_eq!(combo[2], text("ignore1"));
        }
    }

    #[test]
    fn test_absent_assignment_uses_last_candidates() {
        let target = TargetType::new(QualifiedName::parse("p.T"))
            .with_field("count", TypeKind::BoxedInteger32)
            .with_field("n", TypeKind::Integer32)
            .with_field("ignored", TypeKind::String)
            .with_equality(EqualityFilter::exclude_only(["ignored"]));
        let catalog = TargetCatalog::new(vec![target.clone()]).unwrap();

        let absent = absent_assignment(&restricted_candidates(&target, &catalog));
        assert_eq!(
            absent,
            vec![SampleValue::Absent, SampleValue::Int32(2), text("ignored1")]
        );
    }

    #[test]
    fn test_threshold_assignment() {
        let fields = strings(&["a", "b", "c"]);
        assert_eq!(
            threshold_assignment(&fields, 1),
            vec![text("a1"), text("b2"), text("c2")]
        );
        assert_eq!(
            threshold_assignment(&fields, variant_threshold(1)),
            vec![text("a1"), text("b1"), text("c1")]
        );
        assert_eq!(
            threshold_assignment(&fields, variant_threshold(2)),
            vec![text("a2"), text("b2"), text("c2")]
        );
    }

    #[test]
    fn test_threshold_keeps_single_candidate_fields() {
        let fields = vec![FieldCandidates::new("blob", vec![SampleValue::Absent])];
        assert_eq!(threshold_assignment(&fields, 0), vec![SampleValue::Absent]);
    }
}
