use std::sync::Arc;

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

pub use config::Config;
pub use database::repositories::Stores;
pub use error::AppError;

use middleware::RateLimitStore;

use services::{
    AuthService, ExternalClients, MediaService, MediaStorage, MessageHub, MessagingService,
    NewsService, OrganizationService, VideoSessionIssuer,
    external::{ChatbotClient, MeetingSummarizer},
};

/// Everything a handler needs, shared across workers as `web::Data<AppState>`.
pub struct AppState {
    pub config: Config,
    pub stores: Stores,
    pub auth_service: AuthService,
    pub media: MediaService,
    pub messaging: MessagingService,
    pub organizations: OrganizationService,
    pub video: VideoSessionIssuer,
    pub chatbot: Arc<dyn ChatbotClient>,
    pub summarizer: Arc<dyn MeetingSummarizer>,
    pub news: NewsService,
    /// Shared by every worker so auth limits hold per process.
    pub rate_limits: RateLimitStore,
}

impl AppState {
    pub fn new(
        config: Config,
        stores: Stores,
        media_storage: Arc<dyn MediaStorage>,
        external: ExternalClients,
    ) -> Self {
        let auth_service = AuthService::new(
            config.clone(),
            stores.users.clone(),
            stores.password_resets.clone(),
        );
        let media = MediaService::new(&config, media_storage);
        let messaging =
            MessagingService::new(stores.messages.clone(), media.clone(), MessageHub::new());
        let organizations = OrganizationService::new(
            stores.organizations.clone(),
            stores.invitations.clone(),
            stores.users.clone(),
            config.invite_scheme.clone(),
        );
        let video = VideoSessionIssuer::new(&config);
        let news = NewsService::new(external.news, config.news_cache_seconds);

        Self {
            config,
            stores,
            auth_service,
            media,
            messaging,
            organizations,
            video,
            chatbot: external.chatbot,
            summarizer: external.summarizer,
            news,
            rate_limits: RateLimitStore::new(),
        }
    }
}
