use sql_wrapper::prelude::*;

fn people() -> TableSchema {
    TableSchema::new("people")
        .column(Column::builder("id", ColumnType::Integer).not_null().build())
        .column(
            Column::builder("name", ColumnType::Varchar)
                .type_data(["64"])
                .unwrap()
                .build(),
        )
}

#[test]
fn select_all_from_renders_star() {
    assert_eq!(
        Statement::new().select_all_from(&people()).sql(),
        "SELECT * FROM people"
    );
}

#[test]
fn descriptor_and_name_selects_differ_in_quoting() {
    let table = people();
    let id = table.get("id").unwrap();
    let name = table.get("name").unwrap();
    assert_eq!(
        Statement::new().select_columns_from(&table, &[id, name]).sql(),
        "SELECT 'id', 'name' FROM people"
    );
    assert_eq!(
        Statement::new().select_from(&table, &[id, name]).sql(),
        "SELECT id, name FROM people"
    );
}

#[test]
fn update_with_bound_set_and_condition() {
    let table = people();
    let stmt = Statement::new()
        .update(&table)
        .set(&["name"])
        .where_clause()
        .equals("id")
        .and()
        .lower_than("id")
        .replacements(params!["bo", 3, 10]);
    assert_eq!(
        stmt.sql(),
        "UPDATE people SET name = ? WHERE id = ? AND id < ?"
    );
    assert_eq!(
        stmt.parameters(),
        &[Value::Text("bo".into()), Value::Int(3), Value::Int(10)]
    );
}

#[test]
fn insert_with_placeholder_tuple() {
    let stmt = Statement::new()
        .insert_into(&people())
        .of(" (id, name)")
        .values(2);
    assert_eq!(stmt.sql(), "INSERT INTO people (id, name) VALUES (?, ?)");
    assert!(stmt.needs_binding());
}

#[test]
fn create_table_text_is_idempotent_form() {
    assert_eq!(
        sql_wrapper::schema::create_table_sql(&people()),
        "CREATE TABLE IF NOT EXISTS people(id INTEGER NOT NULL, name VARCHAR(64));"
    );
}

#[test]
fn translated_for_postgres() {
    let stmt = Statement::new()
        .delete_from(&people())
        .where_clause()
        .equals("id")
        .or()
        .equals_literal("name", "'?'");
    assert_eq!(
        sql_wrapper::translation::to_postgres_placeholders(stmt.sql()),
        "DELETE FROM people WHERE id = $1 OR name = '?'"
    );
}
