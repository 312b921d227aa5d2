pub mod attendance;
pub mod auth;
pub mod channel;
pub mod leave;
pub(crate) mod macros;
pub mod media;
pub mod message;
pub mod organization;
pub mod project;
pub mod records;
pub mod todo;
pub mod user;

// Re-export all models for easy importing
pub use attendance::*;
pub use auth::*;
pub use channel::*;
pub use leave::*;
pub use media::*;
pub use message::*;
pub use organization::*;
pub use project::*;
pub use records::*;
pub use todo::*;
pub use user::*;
