pub mod actor;
pub mod candidate;
pub mod cbi_template;
pub mod competency_question;
pub mod interview_response;
pub mod interview_session;
pub mod notification;
pub mod record_status;
pub mod scope;
pub mod user;
