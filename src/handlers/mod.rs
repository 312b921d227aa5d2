pub mod activity;
pub mod assistant;
pub mod attendance;
pub mod auth;
pub mod channels;
pub mod direct_messages;
pub mod documents;
pub mod events;
pub mod leave;
pub mod media;
pub mod meetings;
pub mod organizations;
pub mod projects;
pub mod shared;
pub mod todos;
