//! Domain models shared by the weight engine and its collaborators.

pub mod record;
pub mod version;

pub use record::{ChangeAction, RecordChange, RecordType, RoutingRecord};
pub use version::{StackVersion, VersionId};
