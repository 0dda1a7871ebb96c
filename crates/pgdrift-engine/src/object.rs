//! The comparable-schema-object contract
//!
//! One implementation exists per metadata category. All of them carry the
//! same machinery (a cursor, a done flag) and differ only in key derivation
//! and in what create/drop/mutate mean for their category.

use pgdrift_core::{Category, Script};
use std::any::Any;
use std::cmp::Ordering;

/// A database definition stream (tables, columns, indexes, roles, grants,
/// ...) that can be created, dropped, or changed to match a peer stream.
///
/// The five operations are uniform across every category. `compare` and
/// `emit_mutate` take the peer; `emit_create` and `emit_drop` act on the
/// receiver's current record alone. Objects are single-use: construct,
/// diff, discard.
pub trait SchemaObject: Any {
    /// The category this object reconciles; used in diagnostics
    fn category(&self) -> Category;

    /// Move to the next record; false once the source is exhausted
    fn advance(&mut self) -> bool;

    /// Order the receiver's current record against the peer's.
    ///
    /// `Ordering::Equal` means the two records denote the same logical
    /// object, not that their attributes match — attribute differences are
    /// `emit_mutate`'s concern. A peer of the wrong concrete category is a
    /// programmer error: it is reported on `script` and compares as
    /// maximally different so the merge still terminates.
    fn compare(&self, peer: &dyn SchemaObject, script: &mut Script) -> Ordering;

    /// Emit DDL bringing the current record's object into existence
    fn emit_create(&self, script: &mut Script);

    /// Emit DDL removing the current record's object
    fn emit_drop(&self, script: &mut Script);

    /// The keys matched; emit the narrowest change that reconciles any
    /// attribute difference, or nothing when the records agree
    fn emit_mutate(&self, peer: &dyn SchemaObject, script: &mut Script);

    /// Downcast support for `compare`/`emit_mutate` peers
    fn as_any(&self) -> &dyn Any;
}

/// Downcast a peer to the expected concrete category.
///
/// On mismatch, reports the defect and returns `None`; callers translate
/// that into `Ordering::Greater` (compare) or a skipped action (mutate).
pub(crate) fn expect_peer<'a, T: SchemaObject>(
    peer: &'a dyn SchemaObject,
    category: Category,
    script: &mut Script,
) -> Option<&'a T> {
    let found = peer.as_any().downcast_ref::<T>();
    if found.is_none() {
        script.error(format!(
            "{} diff was handed a {} peer; treating the records as maximally different",
            category,
            peer.category()
        ));
    }
    found
}
