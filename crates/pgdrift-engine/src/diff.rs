//! The generic three-way sorted merge
//!
//! One algorithm reconciles every metadata category. Both sides arrive
//! pre-sorted by the category's comparison key; the merge visits every
//! record on each side exactly once and never re-reads, so a run is
//! O(n + m) comparisons and always terminates.

use crate::object::SchemaObject;
use pgdrift_core::Script;
use std::cmp::Ordering;

/// Drive two schema objects of the same category to completion, emitting
/// create/drop/mutate DDL onto `script`.
///
/// The left side is the source of truth; the emitted script reconciles the
/// right side toward it. Exactly one side advances per iteration except on
/// a key match, which advances both.
pub fn diff(left: &mut dyn SchemaObject, right: &mut dyn SchemaObject, script: &mut Script) {
    let mut more_left = left.advance();
    let mut more_right = right.advance();

    while more_left || more_right {
        match left.compare(right, script) {
            Ordering::Equal => {
                // Same logical object on both sides; look for
                // non-identifying changes
                left.emit_mutate(right, script);
                more_left = left.advance();
                more_right = right.advance();
            }
            Ordering::Less => {
                // The right side is missing an object the left has
                if more_left {
                    left.emit_create(script);
                    more_left = left.advance();
                } else {
                    // Left is exhausted; its empty key sorted first
                    right.emit_drop(script);
                    more_right = right.advance();
                }
            }
            Ordering::Greater => {
                // The right side has an extra object we don't want
                if more_right {
                    right.emit_drop(script);
                    more_right = right.advance();
                } else {
                    // Right is exhausted; its empty key sorted first
                    left.emit_create(script);
                    more_left = left.advance();
                }
            }
        }
    }
}
