//! Enrollment domain module.
//!
//! Course entries, their origins and their status lifecycle.

mod entry;
mod origin;
mod status;

pub use entry::Entry;
pub use origin::EntryOrigin;
pub use status::EntryStatus;
