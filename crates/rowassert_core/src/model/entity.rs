use rusqlite::types::Value;
use rusqlite::Row;

/// A Rust type persisted as one row of [`Entity::TABLE`].
///
/// Implementors decide which columns are written on insert. Leave the primary
/// key out of [`Entity::to_values`] while it is unset so SQLite generates it;
/// the generated id is handed back through [`Entity::assign_id`] after flush.
///
/// ```
/// use rowassert_core::Entity;
/// use rusqlite::types::Value;
///
/// #[derive(Debug, Default)]
/// struct Tag {
///     id: Option<i64>,
///     label: String,
/// }
///
/// impl Entity for Tag {
///     const TABLE: &'static str = "tags";
///
///     fn to_values(&self) -> Vec<(&'static str, Value)> {
///         let mut values = vec![("label", Value::Text(self.label.clone()))];
///         if let Some(id) = self.id {
///             values.push(("id", Value::Integer(id)));
///         }
///         values
///     }
///
///     fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
///         Ok(Self {
///             id: row.get("id")?,
///             label: row.get("label")?,
///         })
///     }
///
///     fn assign_id(&mut self, id: i64) {
///         self.id = Some(id);
///     }
/// }
/// ```
pub trait Entity: Sized {
    /// Table backing this entity.
    const TABLE: &'static str;
    /// Column holding the SQLite row id alias.
    const PRIMARY_KEY: &'static str = "id";

    /// Column/value pairs written by an insert.
    fn to_values(&self) -> Vec<(&'static str, Value)>;

    /// Hydrates one entity from a result row.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Receives the generated row id once the insert has been flushed.
    fn assign_id(&mut self, _id: i64) {}

    /// Checked before the entity is queued for insertion.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}
