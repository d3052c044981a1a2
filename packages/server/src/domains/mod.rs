pub mod chat;
pub mod groups;
