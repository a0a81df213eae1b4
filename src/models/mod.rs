pub mod task;
pub mod decision;
pub mod profile;
pub mod report;

pub use task::*;
pub use decision::*;
pub use profile::*;
pub use report::*;
