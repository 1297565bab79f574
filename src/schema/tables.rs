//! Layout of the persisted flat table
//!
//! Column names are consumed verbatim by downstream tooling, so they keep the
//! mixed casing of the original CSV export.

use super::types::*;

pub const COL_STATE: &str = "State";
pub const COL_YEAR: &str = "Year";
pub const COL_QUARTER: &str = "Quarter";
pub const COL_TRANSACTION_TYPE: &str = "Transaction_type";
pub const COL_COUNT: &str = "Count";
pub const COL_AMOUNT: &str = "Amount";

pub static TRANSACTIONS: TableSchema = TableSchema {
    name: "transactions",
    columns: &[
        Column::new(COL_STATE, ColumnType::Text),
        Column::new(COL_YEAR, ColumnType::Integer),
        Column::new(COL_QUARTER, ColumnType::Integer),
        Column::new(COL_TRANSACTION_TYPE, ColumnType::Text),
        Column::new(COL_COUNT, ColumnType::Integer),
        Column::new(COL_AMOUNT, ColumnType::Real),
    ],
    indexes: &[Index::on(&[COL_YEAR, COL_QUARTER]), Index::on(&[COL_STATE])],
};
