use serde::{Deserialize, Serialize};

/// Lifecycle of a diagnosis report as shown to the farmer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    Pending,
    Processing,
    Complete,
    Failed,
}
