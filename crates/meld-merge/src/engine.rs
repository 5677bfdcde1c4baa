//! The N-way deep merge.
//!
//! Documents are folded strictly left to right. Object/object pairs merge
//! key by key; every other pairing is a leaf conflict settled by the
//! [`MergePolicy`]. Arrays are atomic values and are never concatenated or
//! merged by index.

use std::borrow::Cow;

use meld_types::MergePolicy;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{MergeError, MergeResult};
use crate::report::{LeafConflict, MergeReport, PathTracker, Resolution, ValueKind};

/// Smallest document set the engine accepts.
pub const MIN_DOCUMENTS: usize = meld_types::MIN_MERGE_DOCUMENTS;

/// Merge an ordered document set under `policy`.
///
/// Fails with [`MergeError::InvalidInput`] when fewer than
/// [`MIN_DOCUMENTS`] documents are supplied. The inputs are only borrowed
/// and are never modified.
pub fn merge(documents: &[Value], policy: MergePolicy) -> MergeResult<Value> {
    Merger::new(policy).merge(documents)
}

/// Merge two values. `later` is the higher-index document.
pub fn merge_two(earlier: &Value, later: &Value, policy: MergePolicy) -> Value {
    fold_into(earlier.clone(), later, policy, &mut Silent)
}

/// A merge engine bound to one policy.
///
/// `Merger` holds no state between calls; it is `Copy` and can be shared
/// freely across threads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Merger {
    policy: MergePolicy,
}

impl Merger {
    pub fn new(policy: MergePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Fold `documents` into a single value.
    pub fn merge(&self, documents: &[Value]) -> MergeResult<Value> {
        let (first, rest) = split_documents(documents)?;
        debug!(documents = documents.len(), policy = %self.policy, "merging documents");

        let mut sink = Silent;
        Ok(rest.iter().fold(first.clone(), |acc, doc| {
            fold_into(acc, doc, self.policy, &mut sink)
        }))
    }

    /// Like [`Self::merge`], but also returns every leaf conflict met on the
    /// way. The merged value is identical to what [`Self::merge`] returns.
    pub fn merge_with_report(&self, documents: &[Value]) -> MergeResult<(Value, MergeReport)> {
        let (first, rest) = split_documents(documents)?;
        debug!(
            documents = documents.len(),
            policy = %self.policy,
            "merging documents with conflict report"
        );

        let mut report = MergeReport::new(self.policy, documents.len());
        let mut acc = first.clone();
        for (offset, doc) in rest.iter().enumerate() {
            let mut recorder = Recorder {
                tracker: PathTracker::default(),
                report: &mut report,
                document: offset + 1,
                policy: self.policy,
            };
            acc = fold_into(acc, doc, self.policy, &mut recorder);
        }

        debug!(conflicts = report.conflict_count(), "merge complete");
        Ok((acc, report))
    }
}

fn split_documents(documents: &[Value]) -> MergeResult<(&Value, &[Value])> {
    match documents {
        [first, rest @ ..] if !rest.is_empty() => Ok((first, rest)),
        _ => Err(MergeError::invalid_input(format!(
            "at least {MIN_DOCUMENTS} documents are required, got {}",
            documents.len()
        ))),
    }
}

// ---------------------------------------------------------------------------
// Fold
// ---------------------------------------------------------------------------

/// Observer for the descent. Keeps path bookkeeping out of the plain merge.
trait ConflictSink {
    fn enter(&mut self, key: &str);
    fn leave(&mut self);
    fn conflict(&mut self, earlier: &Value, later: &Value);
}

struct Silent;

impl ConflictSink for Silent {
    fn enter(&mut self, _key: &str) {}

    fn leave(&mut self) {}

    fn conflict(&mut self, earlier: &Value, later: &Value) {
        trace!(
            earlier = %ValueKind::of(earlier),
            later = %ValueKind::of(later),
            "leaf conflict"
        );
    }
}

struct Recorder<'r> {
    tracker: PathTracker,
    report: &'r mut MergeReport,
    document: usize,
    policy: MergePolicy,
}

impl ConflictSink for Recorder<'_> {
    fn enter(&mut self, key: &str) {
        self.tracker.push(key);
    }

    fn leave(&mut self) {
        self.tracker.pop();
    }

    fn conflict(&mut self, earlier: &Value, later: &Value) {
        let conflict = LeafConflict {
            path: self.tracker.pointer(),
            document: self.document,
            earlier: ValueKind::of(earlier),
            later: ValueKind::of(later),
            resolution: Resolution::from(self.policy),
        };
        trace!(path = %conflict.path, document = conflict.document, "leaf conflict");
        self.report.conflicts.push(conflict);
    }
}

/// Merge `incoming` into the owned accumulator.
///
/// Keys already in the accumulator keep their position; keys new to it are
/// appended in `incoming`'s order.
fn fold_into<S: ConflictSink>(
    acc: Value,
    incoming: &Value,
    policy: MergePolicy,
    sink: &mut S,
) -> Value {
    match (acc, incoming) {
        (Value::Object(mut merged), Value::Object(later)) => {
            for (key, later_value) in later {
                match merged.get_mut(key) {
                    Some(slot) => {
                        sink.enter(key);
                        let earlier_value = std::mem::take(slot);
                        *slot = fold_into(earlier_value, later_value, policy, sink);
                        sink.leave();
                    }
                    None => {
                        merged.insert(key.clone(), later_value.clone());
                    }
                }
            }
            Value::Object(merged)
        }
        (earlier, later) => {
            if earlier != *later {
                sink.conflict(&earlier, later);
            }
            policy
                .pick(Cow::Owned(earlier), Cow::Borrowed(later))
                .into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(value: &Value) -> Vec<&str> {
        value
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect()
    }

    #[test]
    fn override_winner() {
        let docs = [json!({"a": 1}), json!({"a": 2})];
        assert_eq!(merge(&docs, MergePolicy::Override).unwrap(), json!({"a": 2}));
        assert_eq!(merge(&docs, MergePolicy::Preserve).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn disjoint_keys_union_regardless_of_policy() {
        let docs = [json!({"a": 1}), json!({"b": 2})];
        for policy in [MergePolicy::Override, MergePolicy::Preserve] {
            assert_eq!(merge(&docs, policy).unwrap(), json!({"a": 1, "b": 2}));
        }
    }

    #[test]
    fn recursive_descent() {
        let docs = [json!({"a": {"x": 1}}), json!({"a": {"y": 2}})];
        assert_eq!(
            merge(&docs, MergePolicy::Override).unwrap(),
            json!({"a": {"x": 1, "y": 2}})
        );
    }

    #[test]
    fn object_against_scalar_is_leaf_conflict() {
        let docs = [json!({"a": {"x": 1}}), json!({"a": 5})];
        assert_eq!(merge(&docs, MergePolicy::Override).unwrap(), json!({"a": 5}));
        assert_eq!(
            merge(&docs, MergePolicy::Preserve).unwrap(),
            json!({"a": {"x": 1}})
        );

        let reversed = [json!({"a": 5}), json!({"a": {"x": 1}})];
        assert_eq!(
            merge(&reversed, MergePolicy::Override).unwrap(),
            json!({"a": {"x": 1}})
        );
    }

    #[test]
    fn arrays_are_atomic() {
        let docs = [json!({"a": [1, 2]}), json!({"a": [3]})];
        assert_eq!(merge(&docs, MergePolicy::Override).unwrap(), json!({"a": [3]}));
        assert_eq!(
            merge(&docs, MergePolicy::Preserve).unwrap(),
            json!({"a": [1, 2]})
        );
    }

    #[test]
    fn arrays_of_objects_are_not_merged_by_index() {
        let docs = [json!({"a": [{"x": 1}]}), json!({"a": [{"y": 2}]})];
        assert_eq!(
            merge(&docs, MergePolicy::Override).unwrap(),
            json!({"a": [{"y": 2}]})
        );
    }

    #[test]
    fn rejects_fewer_than_two_documents() {
        let err = merge(&[json!({"a": 1})], MergePolicy::Override).unwrap_err();
        assert!(matches!(err, MergeError::InvalidInput { .. }));
        assert!(err.to_string().contains("got 1"));

        let err = merge(&[], MergePolicy::Preserve).unwrap_err();
        assert!(err.to_string().contains("got 0"));
    }

    #[test]
    fn order_sensitive() {
        let a = json!({"k": "a"});
        let b = json!({"k": "b"});
        let c = json!({"k": "c"});
        let forward = merge(&[a.clone(), b.clone(), c.clone()], MergePolicy::Override).unwrap();
        let backward = merge(&[c, b, a], MergePolicy::Override).unwrap();
        assert_eq!(forward, json!({"k": "c"}));
        assert_eq!(backward, json!({"k": "a"}));
    }

    #[test]
    fn last_containing_document_wins_under_override() {
        let docs = [
            json!({"k": 1, "only_first": true}),
            json!({"k": 2}),
            json!({"other": 3}),
        ];
        let merged = merge(&docs, MergePolicy::Override).unwrap();
        assert_eq!(merged, json!({"k": 2, "only_first": true, "other": 3}));
    }

    #[test]
    fn first_containing_document_wins_under_preserve() {
        let docs = [json!({"other": 0}), json!({"k": 1}), json!({"k": 2})];
        let merged = merge(&docs, MergePolicy::Preserve).unwrap();
        assert_eq!(merged, json!({"other": 0, "k": 1}));
    }

    #[test]
    fn key_order_is_left_then_new_right_keys() {
        let docs = [
            json!({"z": 1, "a": 1, "m": 1}),
            json!({"b": 2, "a": 2, "y": 2}),
            json!({"c": 3, "z": 3}),
        ];
        let merged = merge(&docs, MergePolicy::Override).unwrap();
        assert_eq!(keys(&merged), vec!["z", "a", "m", "b", "y", "c"]);
        assert_eq!(merged["z"], json!(3));
        assert_eq!(merged["a"], json!(2));
    }

    #[test]
    fn null_is_an_ordinary_leaf() {
        let docs = [json!({"a": 1}), json!({"a": null})];
        assert_eq!(merge(&docs, MergePolicy::Override).unwrap(), json!({"a": null}));
        assert_eq!(merge(&docs, MergePolicy::Preserve).unwrap(), json!({"a": 1}));

        let docs = [json!({"a": null}), json!({"a": {"x": 1}})];
        assert_eq!(
            merge(&docs, MergePolicy::Preserve).unwrap(),
            json!({"a": null})
        );
    }

    #[test]
    fn numbers_are_opaque() {
        let docs = [json!({"n": 1}), json!({"n": 1.0})];
        let merged = merge(&docs, MergePolicy::Override).unwrap();
        assert!(merged["n"].is_f64());
        let merged = merge(&docs, MergePolicy::Preserve).unwrap();
        assert!(merged["n"].is_u64());
    }

    #[test]
    fn keys_are_case_sensitive() {
        let docs = [json!({"Key": 1}), json!({"key": 2})];
        assert_eq!(
            merge(&docs, MergePolicy::Override).unwrap(),
            json!({"Key": 1, "key": 2})
        );
    }

    #[test]
    fn non_object_roots_are_leaf_conflicts() {
        let docs = [json!([1, 2]), json!({"a": 1})];
        assert_eq!(merge(&docs, MergePolicy::Override).unwrap(), json!({"a": 1}));
        assert_eq!(merge(&docs, MergePolicy::Preserve).unwrap(), json!([1, 2]));
    }

    #[test]
    fn deep_nesting_merges_at_every_level() {
        let docs = [
            json!({"a": {"b": {"c": 1, "d": 2}}, "keep": "x"}),
            json!({"a": {"b": {"d": 3, "e": 4}}}),
        ];
        assert_eq!(
            merge(&docs, MergePolicy::Override).unwrap(),
            json!({"a": {"b": {"c": 1, "d": 3, "e": 4}}, "keep": "x"})
        );
        assert_eq!(
            merge(&docs, MergePolicy::Preserve).unwrap(),
            json!({"a": {"b": {"c": 1, "d": 2, "e": 4}}, "keep": "x"})
        );
    }

    #[test]
    fn merge_two_leaves_inputs_untouched() {
        let a = json!({"a": {"x": 1}, "l": [1]});
        let b = json!({"a": {"x": 2}, "l": [2]});
        let (a_before, b_before) = (a.clone(), b.clone());
        let merged = merge_two(&a, &b, MergePolicy::Override);
        assert_eq!(merged, json!({"a": {"x": 2}, "l": [2]}));
        assert_eq!(a, a_before);
        assert_eq!(b, b_before);
    }

    #[test]
    fn report_records_conflict_paths() {
        let docs = [
            json!({"a": {"x": 1, "y": 1}, "same": 1}),
            json!({"a": {"x": 2}, "same": 1}),
            json!({"a": 7, "b/c": 1}),
            json!({"b/c": 2}),
        ];
        let merger = Merger::new(MergePolicy::Override);
        let (merged, report) = merger.merge_with_report(&docs).unwrap();

        assert_eq!(merged, merger.merge(&docs).unwrap());
        assert_eq!(report.documents, 4);
        assert_eq!(report.conflict_count(), 3);

        let x: Vec<_> = report.at("/a/x").collect();
        assert_eq!(x.len(), 1);
        assert_eq!(x[0].document, 1);
        assert_eq!(x[0].resolution, Resolution::TookLater);

        let a: Vec<_> = report.at("/a").collect();
        assert_eq!(a.len(), 1);
        assert!(a[0].is_type_mismatch());
        assert_eq!(a[0].earlier, ValueKind::Object);
        assert_eq!(a[0].later, ValueKind::Number);

        assert_eq!(report.at("/b~1c").count(), 1);
        assert_eq!(report.at("/same").count(), 0);
        assert_eq!(report.type_mismatches(), 1);
    }

    #[test]
    fn report_clean_for_disjoint_documents() {
        let docs = [json!({"a": 1}), json!({"b": 2})];
        let (_, report) = Merger::new(MergePolicy::Preserve)
            .merge_with_report(&docs)
            .unwrap();
        assert!(report.is_clean());
        assert_eq!(report.policy, MergePolicy::Preserve);
    }

    #[test]
    fn report_root_conflict_has_empty_pointer() {
        let docs = [json!(1), json!(2)];
        let (merged, report) = Merger::new(MergePolicy::Preserve)
            .merge_with_report(&docs)
            .unwrap();
        assert_eq!(merged, json!(1));
        assert_eq!(report.conflicts[0].path, "");
        assert_eq!(report.conflicts[0].resolution, Resolution::KeptEarlier);
    }

    #[test]
    fn report_rejects_singleton_too() {
        let merger = Merger::default();
        assert!(merger.merge_with_report(&[json!({})]).is_err());
    }
}
