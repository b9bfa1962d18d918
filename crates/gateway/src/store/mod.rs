//! File-backed state stores. Each store holds its records in an
//! `RwLock<HashMap>` and writes the whole collection to a JSON file
//! under the configured state directory on every mutation.

pub mod routines;
pub mod suggestions;
pub mod users;

pub use routines::{RoutineRecord, RoutineStore};
pub use suggestions::{Suggestion, SuggestionStore};
pub use users::{ProfilePatch, UserProfile, UserStore, VALID_CONCERNS, VALID_SKIN_TYPES};
