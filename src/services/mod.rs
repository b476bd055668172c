pub mod access;
pub mod interview_service;
pub mod notification_service;
pub mod question_service;
pub mod scoring;
pub mod snapshot;
pub mod template_resolver;
