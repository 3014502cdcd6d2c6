//! Output handlers for extracted article rows
//!
//! The engine hands a day's surviving rows to a [`RowSink`] and uploads
//! whatever bytes come back. The sink owns the artifact name and content
//! type so the serialization format can change without touching the engine.

mod rows;

pub use rows::{ArticleRow, JsonRowSink, OutputError, RowSink};
