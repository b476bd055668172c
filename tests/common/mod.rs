#![allow(dead_code)]

use std::sync::Arc;

use cbi_backend::database::MemoryStore;
use cbi_backend::dto::interview_dto::{ResponseItem, SubmitInterviewRequest};
use cbi_backend::models::actor::{Actor, Role};
use cbi_backend::models::candidate::Candidate;
use cbi_backend::models::cbi_template::{CbiTemplate, TemplateCompetency};
use cbi_backend::models::competency_question::CompetencyQuestion;
use cbi_backend::models::record_status::RecordStatus;
use cbi_backend::models::scope::Scope;
use cbi_backend::models::user::User;
use cbi_backend::services::interview_service::InterviewService;
use cbi_backend::utils::time::ManualClock;
use chrono::{TimeZone, Utc};

pub const EXPLICIT_TEMPLATE: i64 = 1;
pub const COMPETENCY_TEMPLATE: i64 = 2;
pub const EMPTY_TEMPLATE: i64 = 3;
pub const UNMATCHED_TEMPLATE: i64 = 4;
pub const CANDIDATE: i64 = 5;
pub const INTERVIEWER: i64 = 11;

pub fn admin() -> Actor {
    Actor::new(1, Role::Admin, Scope::Global)
}

pub fn manager(tenant: i64) -> Actor {
    Actor::new(2, Role::OfficeManager, Scope::Tenant(tenant))
}

pub fn office_user(tenant: i64) -> Actor {
    Actor::new(3, Role::OfficeUser, Scope::Tenant(tenant))
}

fn question(id: i64, competency_id: i64, level: i32, name: &str, scope: Scope) -> CompetencyQuestion {
    let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    CompetencyQuestion {
        id,
        competency_id,
        competency_name: Some(name.to_string()),
        level,
        question: format!("Question {}", id),
        scope,
        status: RecordStatus::Active,
        created_at: at,
        updated_at: at,
    }
}

fn template(id: i64, name: &str, questions: Vec<i64>, competencies: Vec<(i64, i32)>) -> CbiTemplate {
    let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    CbiTemplate {
        id,
        name: name.to_string(),
        description: None,
        questions,
        competencies: competencies
            .into_iter()
            .map(|(competency_id, level)| TemplateCompetency {
                competency_id,
                level,
            })
            .collect(),
        scope: Scope::Global,
        status: RecordStatus::Active,
        created_at: at,
        updated_at: at,
    }
}

/// Question bank, templates, one candidate and one interviewer.
pub fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.insert_question(question(1, 10, 3, "Teamwork", Scope::Global));
    store.insert_question(question(2, 10, 3, "Teamwork", Scope::Tenant(4)));
    store.insert_question(question(3, 20, 2, "Ownership", Scope::Tenant(9)));

    store.insert_template(template(EXPLICIT_TEMPLATE, "Team lead", vec![2, 1], vec![]));
    store.insert_template(template(
        COMPETENCY_TEMPLATE,
        "Collaboration",
        vec![],
        vec![(10, 3), (30, 1)],
    ));
    store.insert_template(template(EMPTY_TEMPLATE, "Empty", vec![], vec![]));
    store.insert_template(template(UNMATCHED_TEMPLATE, "Unmatched", vec![], vec![(99, 1)]));

    store.insert_candidate(Candidate {
        id: CANDIDATE,
        name: "Ada".to_string(),
        surname: "Lovelace".to_string(),
        email: Some("ada@example.com".to_string()),
        phone: None,
        scope: Scope::Tenant(4),
        created_at: Utc::now(),
    });
    store.insert_user(User {
        id: INTERVIEWER,
        name: "Grace".to_string(),
        surname: "Hopper".to_string(),
        email: "grace@example.com".to_string(),
        role: Role::OfficeUser,
        scope: Scope::Tenant(4),
    });
    store
}

pub fn start_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

pub fn service(store: &MemoryStore, clock: Arc<ManualClock>) -> InterviewService {
    let store = Arc::new(store.clone());
    InterviewService::new(store.clone(), store.clone(), store, clock, 48)
}

pub fn answers(ratings: &[(i64, i64, Option<i32>)]) -> SubmitInterviewRequest {
    SubmitInterviewRequest {
        responses: ratings
            .iter()
            .map(|(question_id, competency_id, rating)| ResponseItem {
                question_id: *question_id,
                competency_id: *competency_id,
                rating: *rating,
                notes: None,
                behavioral_flags: None,
            })
            .collect(),
    }
}
