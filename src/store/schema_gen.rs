use crate::schema::TableSchema;

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema) -> String {
    let columns: Vec<String> = schema
        .columns
        .iter()
        .map(|col| format!("    {} {} NOT NULL", col.name, col.col_type.sql_type()))
        .collect();

    format!("CREATE TABLE {} (\n{}\n)", schema.name, columns.join(",\n"))
}

/// Generate CREATE INDEX statements for the schema's declared indexes
pub fn generate_indexes(schema: &TableSchema) -> Vec<String> {
    schema
        .indexes
        .iter()
        .map(|index| {
            format!(
                "CREATE INDEX idx_{}_{} ON {}({})",
                schema.name,
                index.columns.join("_").to_lowercase(),
                schema.name,
                index.columns.join(", ")
            )
        })
        .collect()
}

/// SELECT of every column in declaration order
pub fn generate_select(schema: &TableSchema) -> String {
    format!(
        "SELECT {} FROM {}",
        schema.column_names().join(", "),
        schema.name
    )
}

/// Parameterized INSERT of every column
pub fn generate_insert(schema: &TableSchema) -> String {
    let placeholders: Vec<&str> = schema.columns.iter().map(|_| "?").collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        schema.name,
        schema.column_names().join(", "),
        placeholders.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TRANSACTIONS;

    #[test]
    fn test_generate_create_table() {
        let sql = generate_create_table(&TRANSACTIONS);
        assert!(sql.contains("CREATE TABLE transactions"));
        assert!(sql.contains("State TEXT NOT NULL"));
        assert!(sql.contains("Year INTEGER NOT NULL"));
        assert!(sql.contains("Amount REAL NOT NULL"));
    }

    #[test]
    fn test_generate_indexes() {
        let indexes = generate_indexes(&TRANSACTIONS);
        assert!(indexes
            .iter()
            .any(|i| i == "CREATE INDEX idx_transactions_year_quarter ON transactions(Year, Quarter)"));
    }

    #[test]
    fn test_generate_insert() {
        assert_eq!(
            generate_insert(&TRANSACTIONS),
            "INSERT INTO transactions (State, Year, Quarter, Transaction_type, Count, Amount) \
             VALUES (?, ?, ?, ?, ?, ?)"
        );
    }
}
