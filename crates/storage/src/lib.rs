//! Storage for the Kudos feedback wizard.
//!
//! Two layers:
//! - [`KeyValueStore`]: a string-keyed, string-valued slot store (the
//!   moral equivalent of browser local storage). [`MemoryStore`] and
//!   [`FileStore`] are the shipped backends.
//! - [`DraftStore`]: the single expiring draft record kept on top of any
//!   backend. Every failure at this layer is absorbed and logged; the wizard
//!   never sees a storage error.

mod clock;
pub mod conformance;
mod draft;
mod error;
mod file;
mod memory;
mod record;
mod traits;

pub use clock::{Clock, ManualClock, SystemClock};
pub use draft::{DraftStore, DEFAULT_DRAFT_KEY, DEFAULT_DRAFT_TTL};
pub use error::StorageError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use record::{DraftRecord, FormRecord};
pub use traits::{check_key, KeyValueStore};
