//! Load a [`StaticTable`] from PostgreSQL's `information_schema`.

use diesel::connection::LoadConnection;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Text};
use tracing::debug;

use crate::host::StaticTable;

#[derive(QueryableByName, Debug)]
struct TableExists {
    #[diesel(sql_type = Bool)]
    exists: bool,
}

#[derive(QueryableByName, Debug)]
struct ColumnName {
    #[diesel(sql_type = Text)]
    column_name: String,
}

/// Read the declared columns of `schema.table`. A table that does not exist comes
/// back as [`StaticTable::missing`] so installation reports it as unsupported.
pub fn load_table_definition<C>(conn: &mut C, schema: &str, table: &str) -> QueryResult<StaticTable>
where
    C: Connection<Backend = Pg> + LoadConnection,
{
    let exists = diesel::sql_query(
        "SELECT EXISTS(SELECT 1 FROM information_schema.tables \
         WHERE table_schema = $1 AND table_name = $2)",
    )
    .bind::<Text, _>(schema)
    .bind::<Text, _>(table)
    .get_result::<TableExists>(conn)?
    .exists;

    if !exists {
        debug!("Table {}.{} not found", schema, table);
        return Ok(StaticTable::missing(table));
    }

    let columns: Vec<ColumnName> = diesel::sql_query(
        "SELECT column_name::text AS column_name FROM information_schema.columns \
         WHERE table_schema = $1 AND table_name = $2 \
         ORDER BY ordinal_position",
    )
    .bind::<Text, _>(schema)
    .bind::<Text, _>(table)
    .load::<ColumnName>(conn)?;

    debug!("Loaded {} columns for {}.{}", columns.len(), schema, table);

    Ok(StaticTable::new(
        table,
        columns.into_iter().map(|c| c.column_name),
    ))
}
