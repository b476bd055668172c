use uuid::Uuid;

/// Opaque, unguessable link token for public session access.
pub fn generate_session_token() -> String {
    Uuid::new_v4().to_string()
}
