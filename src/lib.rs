pub mod boundary;
pub mod canonical;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod dataset;
pub mod download;
pub mod error;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod query;
pub mod schema;
pub mod store;
pub mod ui;

pub use cli::{Cli, Commands};
pub use dataset::{Dataset, RunSummary};
pub use model::{AggregateRow, Metric, Period, TransactionRecord};
pub use query::Session;
pub use ui::{Phase, SilentUi, Ui, UiApp};
