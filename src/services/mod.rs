pub mod auth;
pub mod external;
pub mod media;
pub mod message_hub;
pub mod messaging;
pub mod organizations;
pub mod user_context;
pub mod video;

pub use auth::AuthService;
pub use external::{ExternalClients, NewsService};
pub use media::{MediaService, MediaStorage};
pub use message_hub::MessageHub;
pub use messaging::{Destination, MessagingService};
pub use organizations::OrganizationService;
pub use user_context::UserContext;
pub use video::VideoSessionIssuer;
