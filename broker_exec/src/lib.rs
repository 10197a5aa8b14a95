//! Statement execution for the broker.
//!
//! [`ExecuteApi`] takes a parsed [`Statement`](broker_sql::Statement) and produces exactly one
//! outcome: an [`ExecuteResponse`] or an [`ExecuteError`]. Depending on what the statement asks
//! for it is answered from local broker state (the elected master), from the metadata store
//! (databases and storage clusters), or by the distributed query engines (metric data and
//! metadata queries). Creating a storage cluster is the one statement that mutates the metadata
//! store; it does so through a single conditional put.
//!
//! Errors fall in two classes, see [`ErrorKind`]: `NotFound` for statements that are understood
//! but have no handler, and `Internal` for everything else.

pub mod classify;
pub mod error;
pub mod executor;
pub mod fields;
pub mod limiter;

pub use classify::{Intent, classify};
pub use error::{ErrorKind, ExecuteError};
pub use executor::{ExecuteApi, ExecuteContext, ExecuteRequest, ExecuteResponse, ExecutorDeps};
pub use fields::{FieldDescriptor, HistogramField};
pub use limiter::QueryLimiter;
