use rusqlite::{params_from_iter, types::Value, Connection, OptionalExtension};
use uuid::Uuid;

/// What happened to one imported row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Created,
    Updated,
    /// Row already present under a create-if-absent policy; left untouched.
    Unchanged,
}

/// Per-entity upsert policy.
///
/// Reference and strict-fact entities use `CreateIfAbsent`: the first import
/// of an external id wins and reruns are no-ops. Reconciling fact entities
/// (enrollments, submissions, attendance) look up by external id, then by
/// their natural composite key, and overwrite every importable field on a
/// match.
pub(crate) enum Policy<'a> {
    CreateIfAbsent,
    ReconcileByIdThenKey { natural_key: &'a [(&'a str, Value)] },
}

/// One row bound for the store: table, external-id column/value, and the
/// importable fields. The surrogate primary key is generated on insert and
/// the external id is never rewritten afterwards.
pub(crate) struct RowSpec<'a> {
    pub table: &'a str,
    pub id_column: &'a str,
    pub id: &'a str,
    pub fields: Vec<(&'a str, Value)>,
}

pub(crate) fn upsert(conn: &Connection, spec: RowSpec, policy: Policy) -> anyhow::Result<Outcome> {
    let by_id = find_pk(
        conn,
        spec.table,
        &[(spec.id_column, Value::Text(spec.id.to_string()))],
    )?;

    match policy {
        Policy::CreateIfAbsent => {
            if by_id.is_some() {
                return Ok(Outcome::Unchanged);
            }
            insert_row(conn, &spec)?;
            Ok(Outcome::Created)
        }
        Policy::ReconcileByIdThenKey { natural_key } => {
            let matched = match by_id {
                Some(pk) => Some(pk),
                None => find_pk(conn, spec.table, natural_key)?,
            };
            match matched {
                Some(pk) => {
                    update_row(conn, &spec, &pk)?;
                    Ok(Outcome::Updated)
                }
                None => {
                    insert_row(conn, &spec)?;
                    Ok(Outcome::Created)
                }
            }
        }
    }
}

fn find_pk(
    conn: &Connection,
    table: &str,
    predicates: &[(&str, Value)],
) -> anyhow::Result<Option<String>> {
    if predicates.is_empty() {
        return Ok(None);
    }
    let clause = predicates
        .iter()
        .map(|(column, _)| format!("{} = ?", column))
        .collect::<Vec<_>>()
        .join(" AND ");
    let sql = format!("SELECT id FROM {} WHERE {}", table, clause);
    let mut stmt = conn.prepare(&sql)?;
    let pk = stmt
        .query_row(
            params_from_iter(predicates.iter().map(|(_, v)| v.clone())),
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(pk)
}

fn insert_row(conn: &Connection, spec: &RowSpec) -> anyhow::Result<()> {
    let mut columns = vec!["id", spec.id_column];
    let mut values = vec![
        Value::Text(Uuid::new_v4().to_string()),
        Value::Text(spec.id.to_string()),
    ];
    for (column, value) in &spec.fields {
        columns.push(column);
        values.push(value.clone());
    }
    let placeholders = vec!["?"; columns.len()].join(", ");
    let sql = format!(
        "INSERT INTO {}({}) VALUES({})",
        spec.table,
        columns.join(", "),
        placeholders
    );
    conn.execute(&sql, params_from_iter(values))?;
    Ok(())
}

fn update_row(conn: &Connection, spec: &RowSpec, pk: &str) -> anyhow::Result<()> {
    if spec.fields.is_empty() {
        return Ok(());
    }
    let assignments = spec
        .fields
        .iter()
        .map(|(column, _)| format!("{} = ?", column))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("UPDATE {} SET {} WHERE id = ?", spec.table, assignments);
    let mut values: Vec<Value> = spec.fields.iter().map(|(_, v)| v.clone()).collect();
    values.push(Value::Text(pk.to_string()));
    conn.execute(&sql, params_from_iter(values))?;
    Ok(())
}

pub(crate) fn text(s: String) -> Value {
    Value::Text(s)
}

pub(crate) fn opt_text(s: Option<String>) -> Value {
    match s {
        Some(v) => Value::Text(v),
        None => Value::Null,
    }
}

pub(crate) fn int(v: i64) -> Value {
    Value::Integer(v)
}

pub(crate) fn opt_int(v: Option<i64>) -> Value {
    match v {
        Some(n) => Value::Integer(n),
        None => Value::Null,
    }
}

pub(crate) fn real(v: f64) -> Value {
    Value::Real(v)
}

pub(crate) fn opt_real(v: Option<f64>) -> Value {
    match v {
        Some(n) => Value::Real(n),
        None => Value::Null,
    }
}
