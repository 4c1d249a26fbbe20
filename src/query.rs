//! Query expressions and a reference [`SelectQuery`] host that renders PostgreSQL text.

use std::fmt;

use crate::expression::DistanceExpression;
use crate::host::{IdentifierQuoter, QueryDescriptor, quote_pg_identifier};

/// A selectable, filterable or orderable expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Every column of the query's sources (`*`)
    AllColumns,
    /// A column referenced by name
    Column(String),
    /// A column qualified by its table or alias
    QualifiedColumn { table: String, column: String },
    Distance(DistanceExpression),
    Aliased { expr: Box<Expr>, alias: String },
    /// `expr <= limit`
    AtMost { expr: Box<Expr>, limit: f64 },
    /// Pre-rendered SQL, emitted verbatim
    Raw(String),
}

impl Expr {
    pub fn column(name: impl Into<String>) -> Self {
        Expr::Column(name.into())
    }

    pub fn raw(sql: impl Into<String>) -> Self {
        Expr::Raw(sql.into())
    }

    pub fn aliased(self, alias: impl Into<String>) -> Self {
        Expr::Aliased {
            expr: Box::new(self),
            alias: alias.into(),
        }
    }

    pub fn at_most(self, limit: f64) -> Self {
        Expr::AtMost {
            expr: Box::new(self),
            limit,
        }
    }

    pub fn to_sql<Q: IdentifierQuoter + ?Sized>(&self, quoter: &Q) -> String {
        match self {
            Expr::AllColumns => "*".to_string(),
            Expr::Column(name) => quoter.quote_identifier(name),
            Expr::QualifiedColumn { table, column } => format!(
                "{}.{}",
                quoter.quote_identifier(table),
                quoter.quote_identifier(column)
            ),
            Expr::Distance(distance) => distance.to_sql(quoter),
            Expr::Aliased { expr, alias } => {
                format!("{} AS {}", expr.to_sql(quoter), quoter.quote_identifier(alias))
            }
            Expr::AtMost { expr, limit } => format!("{} <= {}", expr.to_sql(quoter), limit),
            Expr::Raw(sql) => sql.clone(),
        }
    }
}

impl From<DistanceExpression> for Expr {
    fn from(distance: DistanceExpression) -> Self {
        Expr::Distance(distance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "ASC"),
            SortDirection::Descending => write!(f, "DESC"),
        }
    }
}

/// An immutable single-table SELECT
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    table: String,
    alias: Option<String>,
    selection: Option<Vec<Expr>>,
    filters: Vec<Expr>,
    order: Vec<(Expr, SortDirection)>,
    limit: Option<i64>,
}

impl SelectQuery {
    /// `SELECT * FROM table` with no explicit selection
    pub fn from_table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            alias: None,
            selection: None,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    /// Reference the table through an alias (`FROM table AS alias`)
    pub fn aliased(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Replace the selection with the named columns. No columns restores the
    /// implicit `*` selection.
    pub fn select_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<Expr> = columns.into_iter().map(Expr::column).collect();
        self.selection = (!columns.is_empty()).then_some(columns);
        self
    }

    pub fn filter(&self, predicate: Expr) -> Self {
        self.add_filter(predicate)
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn filters(&self) -> &[Expr] {
        &self.filters
    }

    pub fn ordering(&self) -> &[(Expr, SortDirection)] {
        &self.order
    }

    pub fn to_sql(&self) -> String {
        let selection = match &self.selection {
            None => "*".to_string(),
            Some(items) => items
                .iter()
                .map(|item| item.to_sql(self))
                .collect::<Vec<_>>()
                .join(", "),
        };

        let mut sql = format!("SELECT {} FROM {}", selection, quote_pg_identifier(&self.table));
        if let Some(alias) = &self.alias {
            sql.push_str(&format!(" AS {}", quote_pg_identifier(alias)));
        }

        if !self.filters.is_empty() {
            let predicates = self
                .filters
                .iter()
                .map(|f| format!("({})", f.to_sql(self)))
                .collect::<Vec<_>>()
                .join(" AND ");
            sql.push_str(&format!(" WHERE {}", predicates));
        }

        if !self.order.is_empty() {
            let terms = self
                .order
                .iter()
                .map(|(expr, direction)| format!("{} {}", expr.to_sql(self), direction))
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(&format!(" ORDER BY {}", terms));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        sql
    }
}

impl fmt::Display for SelectQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

impl IdentifierQuoter for SelectQuery {
    fn quote_identifier(&self, identifier: &str) -> String {
        quote_pg_identifier(identifier)
    }
}

impl QueryDescriptor for SelectQuery {
    fn current_selection(&self) -> Option<&[Expr]> {
        self.selection.as_deref()
    }

    fn add_selection(&self, items: Vec<Expr>) -> Self {
        let mut next = self.clone();
        next.selection.get_or_insert_with(Vec::new).extend(items);
        next
    }

    fn add_filter(&self, predicate: Expr) -> Self {
        let mut next = self.clone();
        next.filters.push(predicate);
        next
    }

    fn add_order(&self, expr: Expr, direction: SortDirection) -> Self {
        let mut next = self.clone();
        next.order.push((expr, direction));
        next
    }

    fn source_table_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implicit_selection_renders_star() {
        let query = SelectQuery::from_table("stores");
        assert_eq!(query.current_selection(), None);
        assert_eq!(query.to_sql(), "SELECT * FROM \"stores\"");
    }

    #[test]
    fn test_selecting_no_columns_keeps_implicit_selection() {
        let query = SelectQuery::from_table("stores")
            .select_columns(["id"])
            .select_columns(Vec::<String>::new());
        assert_eq!(query.current_selection(), None);
        assert_eq!(query.to_sql(), "SELECT * FROM \"stores\"");
    }

    #[test]
    fn test_adding_to_implicit_selection_narrows_it() {
        let query = SelectQuery::from_table("stores").add_selection(vec![Expr::column("id")]);
        assert_eq!(query.to_sql(), "SELECT \"id\" FROM \"stores\"");
    }

    #[test]
    fn test_filters_are_conjoined() {
        let query = SelectQuery::from_table("stores")
            .filter(Expr::raw("open = true"))
            .filter(Expr::column("rating").at_most(4.5));
        assert_eq!(
            query.to_sql(),
            "SELECT * FROM \"stores\" WHERE (open = true) AND (\"rating\" <= 4.5)"
        );
    }

    #[test]
    fn test_add_methods_do_not_mutate_the_receiver() {
        let base = SelectQuery::from_table("stores").select_columns(["id"]);
        let _ = base.add_selection(vec![Expr::column("name")]);
        let _ = base.add_filter(Expr::raw("1 = 1"));
        let _ = base.add_order(Expr::column("id"), SortDirection::Descending);
        assert_eq!(base.to_sql(), "SELECT \"id\" FROM \"stores\"");
    }

    #[test]
    fn test_alias_is_the_source_name() {
        let query = SelectQuery::from_table("stores").aliased("s").limit(5);
        assert_eq!(query.source_table_name(), "s");
        assert_eq!(query.to_sql(), "SELECT * FROM \"stores\" AS \"s\" LIMIT 5");
    }

    #[test]
    fn test_order_terms_render_in_sequence() {
        let query = SelectQuery::from_table("stores")
            .add_order(Expr::column("name"), SortDirection::Ascending)
            .add_order(
                Expr::QualifiedColumn {
                    table: "stores".to_string(),
                    column: "id".to_string(),
                },
                SortDirection::Descending,
            );
        assert_eq!(
            query.to_sql(),
            "SELECT * FROM \"stores\" ORDER BY \"name\" ASC, \"stores\".\"id\" DESC"
        );
    }
}
