use sqlx::{Database, Encode, QueryBuilder, Type};

pub fn like_pattern(term: &str) -> String {
    format!("%{}%", term.trim().to_lowercase())
}

/// Appends ` AND (LOWER(c1) LIKE $x OR LOWER(c2) LIKE $y ...)` with one bind per column.
pub fn push_search<'a, DB>(qb: &mut QueryBuilder<'a, DB>, columns: &[&str], term: &str)
where
    DB: Database,
    String: 'a + Encode<'a, DB> + Type<DB>,
{
    let pattern = like_pattern(term);
    qb.push(" AND (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push(format!("LOWER({}) LIKE ", column));
        qb.push_bind(pattern.clone());
    }
    qb.push(")");
}

/// Appends ` AND <column> = $x` when a value is present.
pub fn push_eq<'a, DB>(qb: &mut QueryBuilder<'a, DB>, column: &str, value: Option<&str>)
where
    DB: Database,
    String: 'a + Encode<'a, DB> + Type<DB>,
{
    if let Some(value) = value {
        qb.push(format!(" AND {} = ", column));
        qb.push_bind(value.to_string());
    }
}

pub fn push_page<'a, DB>(qb: &mut QueryBuilder<'a, DB>, limit: i64, offset: i64)
where
    DB: Database,
    i64: 'a + Encode<'a, DB> + Type<DB>,
{
    qb.push(" LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);
}
