//! Category reconciliation policies
//!
//! One module per metadata category, each implementing the `SchemaObject`
//! contract over the category's record field set. The engine drives them
//! all identically; everything category-specific lives here.

pub mod column;
pub mod foreign_key;
pub mod function;
pub mod grant_attribute;
pub mod grant_relationship;
pub mod index;
pub mod matview;
pub mod owner;
pub mod role;
pub mod schemata;
pub mod sequence;
pub mod table;
pub mod trigger;
pub mod view;

use crate::object::SchemaObject;
use pgdrift_core::{Category, DiffContext, Record};

/// Wrap pre-sorted rows in the category's schema object.
///
/// `ctx` carries the immutable comparison context (the two schema scopes);
/// only policies that qualify emitted DDL by schema consult it.
pub fn schema_object(
    category: Category,
    rows: Vec<Record>,
    ctx: &DiffContext,
) -> Box<dyn SchemaObject> {
    match category {
        Category::Schemata => Box::new(schemata::SchemataDiff::new(rows)),
        Category::Role => Box::new(role::RoleDiff::new(rows)),
        Category::Function => Box::new(function::FunctionDiff::new(rows)),
        Category::Sequence => Box::new(sequence::SequenceDiff::new(rows)),
        Category::Table => Box::new(table::TableDiff::new(rows)),
        Category::Column => Box::new(column::ColumnDiff::new(rows, ctx.clone())),
        Category::Index => Box::new(index::IndexDiff::new(rows)),
        Category::View => Box::new(view::ViewDiff::new(rows)),
        Category::MatView => Box::new(matview::MatViewDiff::new(rows)),
        Category::Owner => Box::new(owner::OwnerDiff::new(rows)),
        Category::ForeignKey => Box::new(foreign_key::ForeignKeyDiff::new(rows)),
        Category::GrantRelationship => {
            Box::new(grant_relationship::GrantRelationshipDiff::new(rows))
        }
        Category::GrantAttribute => Box::new(grant_attribute::GrantAttributeDiff::new(rows)),
        Category::Trigger => Box::new(trigger::TriggerDiff::new(rows)),
    }
}
