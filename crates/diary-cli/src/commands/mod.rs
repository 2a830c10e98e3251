pub mod diaries;
pub mod maintenance;
pub mod notifications;
pub mod tasks;
pub mod users;
