//! In-process store backing every repository trait. Selected with
//! `DATABASE_URL=memory` and used by the test suite.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::{
    AttendanceRecord, Channel, Conversation, Document, Event, InvitationLink, LeaveRequest,
    LeaveRequestInput, LeaveStatus, Message, NewChannel, NewDocument, NewEvent, NewMessage,
    NewProject, Organization, PasswordResetToken, Project, ProjectTask, ProjectWithTasks,
    TaskStatus, Todo, Transcription, User,
};
use crate::database::repositories::{
    AttendanceStore, ChannelStore, DocumentStore, EventStore, InvitationStore, LeaveRequestStore,
    MessageStore, OrganizationStore, PasswordResetStore, ProjectStore, TodoStore,
    TranscriptionStore, UserStore, password_reset::new_reset_token,
};

fn matches_search(value: &str, search: Option<&str>) -> bool {
    match search.map(str::trim) {
        Some(needle) if !needle.is_empty() => {
            value.to_lowercase().contains(&needle.to_lowercase())
        }
        _ => true,
    }
}

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    reset_tokens: RwLock<Vec<PasswordResetToken>>,
    organizations: RwLock<HashMap<String, Organization>>,
    invitations: RwLock<HashMap<String, InvitationLink>>,
    channels: RwLock<HashMap<Uuid, Channel>>,
    // Insertion order doubles as the tie-breaker for equal timestamps.
    messages: RwLock<Vec<Message>>,
    attendance: RwLock<Vec<AttendanceRecord>>,
    leave_requests: RwLock<Vec<LeaveRequest>>,
    todos: RwLock<Vec<Todo>>,
    projects: RwLock<HashMap<Uuid, Project>>,
    tasks: RwLock<Vec<ProjectTask>>,
    documents: RwLock<Vec<Document>>,
    events: RwLock<Vec<Event>>,
    transcriptions: RwLock<Vec<Transcription>>,
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: &User) -> Result<User> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email))
        {
            anyhow::bail!("duplicate email: {}", user.email);
        }
        users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        let users = self.users.read().await;
        let mut found: Vec<User> = ids.iter().filter_map(|id| users.get(id).cloned()).collect();
        found.sort_by(|a, b| (&a.display_name, a.id).cmp(&(&b.display_name, b.id)));
        found.dedup_by_key(|user| user.id);
        Ok(found)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        display_name: &str,
        photo_url: Option<&str>,
    ) -> Result<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            user.display_name = display_name.to_string();
            if let Some(url) = photo_url {
                user.photo_url = Some(url.to_string());
            }
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<()> {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.password_hash = password_hash.to_string();
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn add_organization(&self, id: Uuid, organization_name: &str) -> Result<()> {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            if !user.belongs_to(organization_name) {
                user.organizations.push(organization_name.to_string());
                user.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn remove_organization(&self, id: Uuid, organization_name: &str) -> Result<()> {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.organizations.retain(|name| name != organization_name);
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn add_direct_message_partner(&self, id: Uuid, partner_id: Uuid) -> Result<()> {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            if !user.direct_message_partners.contains(&partner_id) {
                user.direct_message_partners.push(partner_id);
                user.updated_at = Utc::now();
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PasswordResetStore for MemoryStore {
    async fn create_token(&self, user_id: Uuid) -> Result<PasswordResetToken> {
        let token = new_reset_token(user_id);
        self.reset_tokens.write().await.push(token.clone());
        Ok(token)
    }

    async fn find_valid_token(&self, token: &str) -> Result<Option<PasswordResetToken>> {
        Ok(self
            .reset_tokens
            .read()
            .await
            .iter()
            .find(|candidate| candidate.token == token && candidate.is_valid())
            .cloned())
    }

    async fn mark_used(&self, token_id: Uuid) -> Result<()> {
        let mut tokens = self.reset_tokens.write().await;
        if let Some(token) = tokens.iter_mut().find(|token| token.id == token_id) {
            token.used_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn invalidate_user_tokens(&self, user_id: Uuid) -> Result<()> {
        let now = Utc::now();
        for token in self.reset_tokens.write().await.iter_mut() {
            if token.user_id == user_id && token.used_at.is_none() {
                token.used_at = Some(now);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl OrganizationStore for MemoryStore {
    async fn create(&self, organization: &Organization) -> Result<Option<Organization>> {
        let mut organizations = self.organizations.write().await;
        if organizations.contains_key(&organization.name) {
            return Ok(None);
        }
        organizations.insert(organization.name.clone(), organization.clone());
        Ok(Some(organization.clone()))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Organization>> {
        Ok(self.organizations.read().await.get(name).cloned())
    }

    async fn add_member(&self, name: &str, user_id: Uuid) -> Result<()> {
        if let Some(organization) = self.organizations.write().await.get_mut(name) {
            if !organization.has_member(user_id) {
                organization.members.push(user_id);
            }
        }
        Ok(())
    }

    async fn remove_member(&self, name: &str, user_id: Uuid) -> Result<()> {
        if let Some(organization) = self.organizations.write().await.get_mut(name) {
            organization.members.retain(|member| *member != user_id);
        }
        Ok(())
    }
}

#[async_trait]
impl InvitationStore for MemoryStore {
    async fn create(&self, link: &InvitationLink) -> Result<InvitationLink> {
        let mut invitations = self.invitations.write().await;
        if invitations.contains_key(&link.id) {
            anyhow::bail!("duplicate invitation link id: {}", link.id);
        }
        invitations.insert(link.id.clone(), link.clone());
        Ok(link.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<InvitationLink>> {
        Ok(self.invitations.read().await.get(id).cloned())
    }
}

#[async_trait]
impl ChannelStore for MemoryStore {
    async fn create(&self, channel: NewChannel) -> Result<Channel> {
        let channel = Channel {
            id: Uuid::new_v4(),
            organization_name: channel.organization_name,
            name: channel.name,
            description: channel.description,
            visibility: channel.visibility,
            members: channel.members,
            created_by: channel.created_by,
            created_at: Utc::now(),
        };
        self.channels
            .write()
            .await
            .insert(channel.id, channel.clone());
        Ok(channel)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Channel>> {
        Ok(self.channels.read().await.get(&id).cloned())
    }

    async fn list_for_organization(
        &self,
        organization_name: &str,
        search: Option<&str>,
    ) -> Result<Vec<Channel>> {
        let mut channels: Vec<Channel> = self
            .channels
            .read()
            .await
            .values()
            .filter(|channel| channel.organization_name == organization_name)
            .filter(|channel| matches_search(&channel.name, search))
            .cloned()
            .collect();
        channels.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(channels)
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn insert(&self, message: NewMessage) -> Result<Message> {
        let message = Message {
            id: Uuid::new_v4(),
            channel_id: message.channel_id,
            recipient_id: message.recipient_id,
            sender_id: message.sender_id,
            author_name: message.author_name,
            author_photo: message.author_photo,
            text: message.text,
            media_url: message.media_url,
            media_type: message.media_type,
            created_at: Utc::now(),
        };
        self.messages.write().await.push(message.clone());
        Ok(message)
    }

    async fn list(&self, conversation: &Conversation) -> Result<Vec<Message>> {
        let mut messages: Vec<Message> = self
            .messages
            .read()
            .await
            .iter()
            .filter(|message| conversation.contains(message))
            .cloned()
            .collect();
        // Stable sort keeps insertion order for equal timestamps.
        messages.sort_by_key(|message| message.created_at);
        Ok(messages)
    }

    async fn list_received(&self, user_id: Uuid, limit: i64) -> Result<Vec<Message>> {
        let mut messages: Vec<Message> = self
            .messages
            .read()
            .await
            .iter()
            .filter(|message| message.recipient_id == Some(user_id))
            .cloned()
            .collect();
        messages.reverse();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        messages.truncate(limit.max(0) as usize);
        Ok(messages)
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn latest(&self, user_id: Uuid) -> Result<Option<AttendanceRecord>> {
        Ok(self
            .attendance
            .read()
            .await
            .iter()
            .filter(|record| record.user_id == user_id)
            .max_by_key(|record| record.clock_in)
            .cloned())
    }

    async fn clock_in(
        &self,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<AttendanceRecord>> {
        let mut records = self.attendance.write().await;
        if records
            .iter()
            .any(|record| record.user_id == user_id && record.is_open())
        {
            return Ok(None);
        }

        let record = AttendanceRecord {
            id: Uuid::new_v4(),
            user_id,
            clock_in: at,
            clock_out: None,
        };
        records.push(record.clone());
        Ok(Some(record))
    }

    async fn clock_out(
        &self,
        record_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<AttendanceRecord>> {
        let mut records = self.attendance.write().await;
        Ok(records
            .iter_mut()
            .find(|record| record.id == record_id && record.is_open())
            .map(|record| {
                record.clock_out = Some(at);
                record.clone()
            }))
    }

    async fn history(&self, user_id: Uuid, limit: i64) -> Result<Vec<AttendanceRecord>> {
        let mut records: Vec<AttendanceRecord> = self
            .attendance
            .read()
            .await
            .iter()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.clock_in.cmp(&a.clock_in));
        records.truncate(limit.max(0) as usize);
        Ok(records)
    }
}

#[async_trait]
impl LeaveRequestStore for MemoryStore {
    async fn create(&self, user_id: Uuid, input: &LeaveRequestInput) -> Result<LeaveRequest> {
        let request = LeaveRequest {
            id: Uuid::new_v4(),
            user_id,
            requested_at: Utc::now(),
            start_date: input.start_date,
            end_date: input.end_date,
            reason: input.reason.trim().to_string(),
            status: LeaveStatus::Pending,
        };
        self.leave_requests.write().await.push(request.clone());
        Ok(request)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<LeaveRequest>> {
        let mut requests: Vec<LeaveRequest> = self
            .leave_requests
            .read()
            .await
            .iter()
            .rev()
            .filter(|request| request.user_id == user_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
        Ok(requests)
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn create(&self, user_id: Uuid, title: &str, description: Option<&str>) -> Result<Todo> {
        let todo = Todo {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_string(),
            description: description.map(str::to_string),
            created_at: Utc::now(),
        };
        self.todos.write().await.push(todo.clone());
        Ok(todo)
    }

    async fn list_for_user(&self, user_id: Uuid, search: Option<&str>) -> Result<Vec<Todo>> {
        let mut todos: Vec<Todo> = self
            .todos
            .read()
            .await
            .iter()
            .rev()
            .filter(|todo| todo.user_id == user_id && matches_search(&todo.title, search))
            .cloned()
            .collect();
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(todos)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        let mut todos = self.todos.write().await;
        let before = todos.len();
        todos.retain(|todo| !(todo.id == id && todo.user_id == user_id));
        Ok(todos.len() < before)
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn create(&self, project: NewProject) -> Result<ProjectWithTasks> {
        let now = Utc::now();
        let created = Project {
            id: Uuid::new_v4(),
            organization_name: project.organization_name,
            name: project.name,
            description: project.description,
            owner_id: project.owner_id,
            members: project.members,
            created_at: now,
            updated_at: now,
        };
        let tasks: Vec<ProjectTask> = project
            .tasks
            .into_iter()
            .map(|task| ProjectTask {
                id: Uuid::new_v4(),
                project_id: created.id,
                title: task.title,
                description: task.description,
                assigned_to: task.assigned_to,
                due_date: task.due_date,
                status: TaskStatus::Pending,
                created_at: now,
                updated_at: now,
            })
            .collect();

        // Both locks are held together so readers never see a project without its tasks.
        let mut projects = self.projects.write().await;
        let mut all_tasks = self.tasks.write().await;
        projects.insert(created.id, created.clone());
        all_tasks.extend(tasks.iter().cloned());

        Ok(ProjectWithTasks {
            project: created,
            tasks,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>> {
        Ok(self.projects.read().await.get(&id).cloned())
    }

    async fn list_for_member(&self, user_id: Uuid) -> Result<Vec<Project>> {
        let mut projects: Vec<Project> = self
            .projects
            .read()
            .await
            .values()
            .filter(|project| project.members.contains(&user_id))
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    async fn list_owned(&self, owner_id: Uuid) -> Result<Vec<Project>> {
        let mut projects: Vec<Project> = self
            .projects
            .read()
            .await
            .values()
            .filter(|project| project.owner_id == owner_id)
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    async fn list_tasks(&self, project_id: Uuid) -> Result<Vec<ProjectTask>> {
        let mut tasks: Vec<ProjectTask> = self
            .tasks
            .read()
            .await
            .iter()
            .filter(|task| task.project_id == project_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|task| task.due_date);
        Ok(tasks)
    }

    async fn find_task(&self, task_id: Uuid) -> Result<Option<ProjectTask>> {
        Ok(self
            .tasks
            .read()
            .await
            .iter()
            .find(|task| task.id == task_id)
            .cloned())
    }

    async fn update_task_status(
        &self,
        task_id: Uuid,
        status: TaskStatus,
    ) -> Result<Option<ProjectTask>> {
        let mut tasks = self.tasks.write().await;
        Ok(tasks.iter_mut().find(|task| task.id == task_id).map(|task| {
            task.status = status;
            task.updated_at = Utc::now();
            task.clone()
        }))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, document: NewDocument) -> Result<Document> {
        let document = Document {
            id: Uuid::new_v4(),
            name: document.name,
            file_name: document.file_name,
            path: document.path,
            url: document.url,
            content_type: document.content_type,
            uploaded_by: document.uploaded_by,
            created_at: Utc::now(),
        };
        self.documents.write().await.push(document.clone());
        Ok(document)
    }

    async fn list(&self) -> Result<Vec<Document>> {
        let mut documents: Vec<Document> =
            self.documents.read().await.iter().rev().cloned().collect();
        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(documents)
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn create(&self, event: NewEvent) -> Result<Event> {
        let event = Event {
            id: Uuid::new_v4(),
            title: event.title,
            description: event.description,
            location: event.location,
            start_at: event.start_at,
            end_at: event.end_at,
            created_by: event.created_by,
            created_at: Utc::now(),
        };
        self.events.write().await.push(event.clone());
        Ok(event)
    }

    async fn list(&self) -> Result<Vec<Event>> {
        let mut events = self.events.read().await.clone();
        events.sort_by_key(|event| event.start_at);
        Ok(events)
    }
}

#[async_trait]
impl TranscriptionStore for MemoryStore {
    async fn create(
        &self,
        user_id: Uuid,
        meeting_id: &str,
        summary: &str,
    ) -> Result<Transcription> {
        let transcription = Transcription {
            id: Uuid::new_v4(),
            user_id,
            meeting_id: meeting_id.to_string(),
            summary: summary.to_string(),
            created_at: Utc::now(),
        };
        self.transcriptions
            .write()
            .await
            .push(transcription.clone());
        Ok(transcription)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Transcription>> {
        let mut transcriptions: Vec<Transcription> = self
            .transcriptions
            .read()
            .await
            .iter()
            .rev()
            .filter(|transcription| transcription.user_id == user_id)
            .cloned()
            .collect();
        transcriptions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(transcriptions)
    }
}
