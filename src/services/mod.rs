pub mod content;
pub mod dashboards;
pub mod dates;
pub mod meeting_webhook;
pub mod notifications;
pub mod uploads;
pub mod video;
