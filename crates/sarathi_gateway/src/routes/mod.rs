pub mod analytics;
pub mod chat;
pub mod conversations;
pub mod health;
pub mod logs;
pub mod verses;
