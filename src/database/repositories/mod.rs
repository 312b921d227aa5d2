use std::sync::Arc;

use sqlx::PgPool;

use crate::database::memory::MemoryStore;

pub mod attendance;
pub mod channel;
pub mod leave;
pub mod message;
pub mod organization;
pub mod password_reset;
pub mod project;
pub mod records;
pub mod todo;
pub mod user;

// Re-export all repositories for easy importing
pub use attendance::{AttendanceRepository, AttendanceStore};
pub use channel::{ChannelRepository, ChannelStore};
pub use leave::{LeaveRequestRepository, LeaveRequestStore};
pub use message::{MessageRepository, MessageStore};
pub use organization::{
    InvitationRepository, InvitationStore, OrganizationRepository, OrganizationStore,
};
pub use password_reset::{PasswordResetStore, PasswordResetTokenRepository};
pub use project::{ProjectRepository, ProjectStore};
pub use records::{
    DocumentRepository, DocumentStore, EventRepository, EventStore, TranscriptionRepository,
    TranscriptionStore,
};
pub use todo::{TodoRepository, TodoStore};
pub use user::{UserRepository, UserStore};

/// One handle per store trait, shared by every request.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub password_resets: Arc<dyn PasswordResetStore>,
    pub organizations: Arc<dyn OrganizationStore>,
    pub invitations: Arc<dyn InvitationStore>,
    pub channels: Arc<dyn ChannelStore>,
    pub messages: Arc<dyn MessageStore>,
    pub attendance: Arc<dyn AttendanceStore>,
    pub leave_requests: Arc<dyn LeaveRequestStore>,
    pub todos: Arc<dyn TodoStore>,
    pub projects: Arc<dyn ProjectStore>,
    pub documents: Arc<dyn DocumentStore>,
    pub events: Arc<dyn EventStore>,
    pub transcriptions: Arc<dyn TranscriptionStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            password_resets: Arc::new(PasswordResetTokenRepository::new(pool.clone())),
            organizations: Arc::new(OrganizationRepository::new(pool.clone())),
            invitations: Arc::new(InvitationRepository::new(pool.clone())),
            channels: Arc::new(ChannelRepository::new(pool.clone())),
            messages: Arc::new(MessageRepository::new(pool.clone())),
            attendance: Arc::new(AttendanceRepository::new(pool.clone())),
            leave_requests: Arc::new(LeaveRequestRepository::new(pool.clone())),
            todos: Arc::new(TodoRepository::new(pool.clone())),
            projects: Arc::new(ProjectRepository::new(pool.clone())),
            documents: Arc::new(DocumentRepository::new(pool.clone())),
            events: Arc::new(EventRepository::new(pool.clone())),
            transcriptions: Arc::new(TranscriptionRepository::new(pool)),
        }
    }

    /// Every store backed by one shared in-process `MemoryStore`.
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::default());
        Self {
            users: store.clone(),
            password_resets: store.clone(),
            organizations: store.clone(),
            invitations: store.clone(),
            channels: store.clone(),
            messages: store.clone(),
            attendance: store.clone(),
            leave_requests: store.clone(),
            todos: store.clone(),
            projects: store.clone(),
            documents: store.clone(),
            events: store.clone(),
            transcriptions: store,
        }
    }
}
