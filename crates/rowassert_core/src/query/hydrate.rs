use crate::error::HelperResult;
use rusqlite::types::ValueRef;
use rusqlite::{Params, Statement};
use serde_json::{Map, Number, Value as JsonValue};

/// One result row keyed by result column name.
pub type HydratedRow = Map<String, JsonValue>;

/// Runs `stmt` and converts every row into a [`HydratedRow`].
///
/// When two result columns share a name, the first one wins. The root
/// entity's columns are selected first, so a joined alias cannot shadow them.
pub fn hydrate_rows<P: Params>(
    stmt: &mut Statement<'_>,
    params: P,
) -> HelperResult<Vec<HydratedRow>> {
    let column_names: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_owned)
        .collect();

    let mut rows = stmt.query(params)?;
    let mut hydrated = Vec::new();
    while let Some(row) = rows.next()? {
        let mut map = HydratedRow::new();
        for (index, name) in column_names.iter().enumerate() {
            if !map.contains_key(name) {
                map.insert(name.clone(), sqlite_value_to_json(row.get_ref(index)?));
            }
        }
        hydrated.push(map);
    }

    Ok(hydrated)
}

/// Maps a raw SQLite value onto its JSON counterpart.
///
/// Non-finite reals become `null`; blobs become arrays of byte values.
pub fn sqlite_value_to_json(value: ValueRef<'_>) -> JsonValue {
    match value {
        ValueRef::Null => JsonValue::Null,
        ValueRef::Integer(number) => JsonValue::from(number),
        ValueRef::Real(number) => Number::from_f64(number).map_or(JsonValue::Null, JsonValue::Number),
        ValueRef::Text(bytes) => JsonValue::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => {
            JsonValue::Array(bytes.iter().map(|byte| JsonValue::from(*byte)).collect())
        }
    }
}
