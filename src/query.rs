//! Embeds a compiled filter expression in a SELECT statement using sea-query.

use sea_query::{
    Alias, Asterisk, Expr, MysqlQueryBuilder, PostgresQueryBuilder, Query, SelectStatement,
    SqliteQueryBuilder,
};

use crate::config::Backend;

/// Build `SELECT * FROM <table>` with the expression as its `WHERE` clause
pub fn select_statement(table: &str, expression: &str) -> SelectStatement {
    let mut select = Query::select();
    select
        .column(Asterisk)
        .from(Alias::new(table))
        .and_where(Expr::cust(expression.to_string()));
    select
}

/// Render the SELECT statement for the given backend
pub fn select_where(table: &str, expression: &str, backend: Backend) -> String {
    let select = select_statement(table, expression);
    match backend {
        Backend::Postgres => select.to_string(PostgresQueryBuilder),
        Backend::Mysql => select.to_string(MysqlQueryBuilder),
        Backend::Sqlite => select.to_string(SqliteQueryBuilder),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_quoting_follows_backend() {
        let expr = "status = 'Open'";
        let pg = select_where("issues", expr, Backend::Postgres);
        assert!(pg.starts_with(r#"SELECT * FROM "issues" WHERE"#));
        assert!(pg.contains(expr));

        let mysql = select_where("issues", expr, Backend::Mysql);
        assert!(mysql.starts_with("SELECT * FROM `issues` WHERE"));
        assert!(mysql.contains(expr));

        let sqlite = select_where("issues", expr, Backend::Sqlite);
        assert!(sqlite.contains("WHERE"));
        assert!(sqlite.contains(expr));
    }

    #[test]
    fn test_expression_is_embedded_verbatim() {
        let expr = "department = 'HR' AND (salary > 50000 OR SUBSTR(first_name, 1, 3) = 'Joh')";
        let sql = select_where("employees", expr, Backend::Postgres);
        assert!(sql.contains(expr));
    }
}
