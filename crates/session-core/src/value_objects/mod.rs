//! Value objects - immutable identifiers used across the session domain

mod family_id;
mod subject_id;
mod token_id;

pub use family_id::FamilyId;
pub use subject_id::{IdParseError, SubjectId};
pub use token_id::TokenId;
