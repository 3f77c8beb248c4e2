//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random records and alias tables.

use proptest::prelude::*;
use repower_core::{FieldNameMap, Record};

/// Strategy for generating unmapped field names.
///
/// Names never start with `a` or `d`, keeping them apart from the aliases of
/// [`field_name_map_strategy`].
pub fn field_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[e-z][a-z0-9_]{0,15}").expect("Invalid regex")
}

/// Strategy for generating record ids.
pub fn record_id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[0-9]{1,4}(-[0-9]{1,3})?").expect("Invalid regex")
}

/// Strategy for generating field values, including empty strings.
pub fn value_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[ -~]{0,24}").expect("Invalid regex")
}

/// Strategy for generating records of up to `max_fields` fields.
pub fn record_strategy(max_fields: usize) -> impl Strategy<Value = Record> {
    prop::collection::btree_map(field_name_strategy(), value_strategy(), 0..=max_fields)
        .prop_map(Record::from)
}

/// Strategy for generating injective alias tables.
///
/// Application names start with `app_` and storage names with `db_`, so no
/// alias can collide with an unmapped name from [`field_name_strategy`].
pub fn field_name_map_strategy(max_aliases: usize) -> impl Strategy<Value = FieldNameMap> {
    prop::collection::btree_set("[a-z]{1,8}", 0..=max_aliases).prop_map(|stems| {
        FieldNameMap::new(
            stems
                .iter()
                .map(|s| (format!("app_{s}"), format!("db_{s}"))),
        )
        .expect("Distinct stems give an injective map")
    })
}
