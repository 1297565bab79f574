//! Read-only queries over the flat table
//!
//! Aggregations live on [`Dataset`](crate::dataset::Dataset) and never fail:
//! asking for a year, quarter, category or region that is not in the table
//! simply yields an empty result. [`Session`] adds the boundary join.

pub mod aggregate;
pub mod session;

pub use aggregate::*;
pub use session::*;
