//! Identity index for face datasets.
//!
//! Parses CelebA-style `identity_*.txt` files (one `<filename> <person_id>`
//! record per line) into a person → filenames mapping plus the ordered list
//! of unique person ids used to address the dataset.

pub mod index;
pub mod types;

pub use index::IdentityIndex;
pub use types::{IndexError, IndexSummary, PersonId, SuffixRewrite};
