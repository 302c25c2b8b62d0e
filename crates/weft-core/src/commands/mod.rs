//! Command dictionary
//!
//! Commands are grouped by package and addressed as `"package.name"`. Each
//! carries parameter/progress/result schemas, a [`CommandVisibility`] and a
//! minimal [`UserRole`].

mod definition;
mod dictionary;
mod user_role;
mod visibility;

pub use definition::CommandDefinition;
pub use dictionary::CommandDictionary;
pub use user_role::UserRole;
pub use visibility::CommandVisibility;
