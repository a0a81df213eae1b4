pub mod connection;
pub mod schema;
pub mod documents;
pub mod tasks;
pub mod decisions;
pub mod profiles;
pub mod reports;

pub use connection::Database;
pub use documents::{Collection, Direction, Document, DocumentStore, FilterOp, Query};
pub use tasks::TaskStore;
pub use decisions::DecisionLog;
pub use profiles::ProfileStore;
pub use reports::ReportStore;
