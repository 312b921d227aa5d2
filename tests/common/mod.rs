#![allow(dead_code)]

use std::sync::Arc;

use actix_web::{http::header, web};
use anyhow::{Result, bail};
use async_trait::async_trait;
use fake::{
    Fake,
    faker::{internet::en::SafeEmail, name::en::Name},
};
use uuid::Uuid;

use officecomms::database::models::{CreateUserInput, User};
use officecomms::services::external::{
    ChatbotClient, ExternalClients, MeetingSummarizer, NewsArticle, NewsProvider, NewsSource,
};
use officecomms::services::media::MemoryMediaStorage;
use officecomms::{AppState, Config, Stores};

/// Builds the full routed app around a `web::Data<AppState>`, the same way
/// `main` does, minus CORS and access logging.
#[macro_export]
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .app_data(officecomms::routes::json_config(&$state))
                .wrap(officecomms::middleware::RequestIdMiddleware)
                .configure(|cfg| officecomms::routes::configure(cfg, &$state)),
        )
        .await
    };
}

pub struct EchoChatbot;

#[async_trait]
impl ChatbotClient for EchoChatbot {
    async fn reply(&self, message: &str) -> Result<String> {
        if message == "fail" {
            bail!("chat-bot offline");
        }
        Ok(format!("You said: {}", message))
    }
}

pub struct LengthSummarizer;

#[async_trait]
impl MeetingSummarizer for LengthSummarizer {
    async fn summarize(&self, content_type: &str, recording: Vec<u8>) -> Result<String> {
        Ok(format!("{} bytes of {}", recording.len(), content_type))
    }
}

pub struct StaticNews;

#[async_trait]
impl NewsProvider for StaticNews {
    async fn top_headlines(&self, country: &str) -> Result<Vec<NewsArticle>> {
        if country == "zz" {
            bail!("news api rejected country");
        }
        Ok(vec![NewsArticle {
            source: Some(NewsSource {
                id: None,
                name: Some("Daily Test".to_string()),
            }),
            author: None,
            title: Some(format!("Headline for {}", country)),
            description: None,
            url: Some("https://news.test/1".to_string()),
            url_to_image: None,
            published_at: Some("2025-05-01T09:00:00Z".to_string()),
        }])
    }
}

/// Routes `log` output through the test harness.
pub fn setup_test_env() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn fake_clients() -> ExternalClients {
    ExternalClients {
        chatbot: Arc::new(EchoChatbot),
        summarizer: Arc::new(LengthSummarizer),
        news: Arc::new(StaticNews),
    }
}

pub struct TestUser {
    pub user: User,
    pub token: String,
}

impl TestUser {
    pub fn id(&self) -> Uuid {
        self.user.id
    }

    pub fn auth(&self) -> (header::HeaderName, String) {
        bearer(&self.token)
    }
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

pub struct TestContext {
    pub state: web::Data<AppState>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(Config::test_config())
    }

    pub fn with_config(config: Config) -> Self {
        setup_test_env();
        let state = AppState::new(
            config,
            Stores::in_memory(),
            Arc::new(MemoryMediaStorage::default()),
            fake_clients(),
        );
        Self {
            state: web::Data::new(state),
        }
    }

    /// Registers a user with a random name and address.
    pub async fn user(&self) -> TestUser {
        let email: String = SafeEmail().fake();
        let email = format!("{}.{}", Uuid::new_v4().simple(), email);
        let response = self
            .state
            .auth_service
            .register(CreateUserInput {
                email,
                password: "password123".to_string(),
                display_name: Name().fake(),
            })
            .await
            .expect("register test user");

        TestUser {
            user: response.user,
            token: response.token,
        }
    }

    /// Current stored copy of the user.
    pub async fn reload(&self, user: &TestUser) -> User {
        self.state
            .stores
            .users
            .find_by_id(user.id())
            .await
            .expect("load user")
            .expect("user exists")
    }

    /// Creates an organization owned by `owner` and returns its invitation link.
    pub async fn organization(&self, owner: &TestUser, name: &str) -> String {
        let owner = self.reload(owner).await;
        self.state
            .organizations
            .create(&owner, name)
            .await
            .expect("create organization")
            .invitation_link
    }

    pub async fn join(&self, user: &TestUser, link: &str) {
        let user = self.reload(user).await;
        self.state
            .organizations
            .accept_invitation(&user, link)
            .await
            .expect("accept invitation");
    }
}
