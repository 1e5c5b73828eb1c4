//! Process-local adapters for the driven ports.
//!
//! Used when the server starts without a database URL and by black-box
//! tests. State is lost on restart.

mod directory;
mod identity;
mod survey_responses;

pub use directory::MemoryDirectoryRepository;
pub use identity::MemoryIdentityProvider;
pub use survey_responses::MemorySurveyResponseRepository;
