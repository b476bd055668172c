//! Per-operation capability checks over the request's [`Actor`].
//!
//! Every function here is pure; services call them before touching storage.

use crate::error::{Error, Result};
use crate::models::actor::{Actor, Role};
use crate::models::scope::{Scope, Visibility};

/// Creating, cancelling and re-scoring sessions.
pub fn can_manage_sessions(actor: &Actor) -> bool {
    matches!(actor.role, Role::Admin | Role::OfficeManager)
}

pub fn ensure_can_manage_sessions(actor: &Actor) -> Result<()> {
    if can_manage_sessions(actor) {
        Ok(())
    } else {
        Err(Error::Forbidden(format!(
            "Role {} cannot manage interview sessions",
            actor.role
        )))
    }
}

pub fn can_view(actor: &Actor, owner: Scope) -> bool {
    actor.is_admin() || actor.scope == owner
}

/// Owner of a session the actor creates: administrators issue sessions in the
/// global scope, everyone else in their own tenant.
pub fn owner_for_new_session(actor: &Actor) -> Scope {
    if actor.is_admin() {
        Scope::Global
    } else {
        actor.scope
    }
}

/// `None` lists every tenant's sessions.
pub fn session_list_owner(actor: &Actor) -> Option<Scope> {
    if actor.is_admin() {
        None
    } else {
        Some(actor.scope)
    }
}

/// Administrators see every tenant's questions only while acting in the
/// global scope; an admin token bound to a tenant is treated like that tenant.
pub fn question_visibility(actor: &Actor) -> Visibility {
    if actor.is_admin() && actor.scope == Scope::Global {
        Visibility::Everything
    } else {
        Visibility::GlobalAnd(actor.scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Actor {
        Actor::new(1, Role::Admin, Scope::Tenant(5))
    }

    fn manager(tenant: i64) -> Actor {
        Actor::new(2, Role::OfficeManager, Scope::Tenant(tenant))
    }

    fn office_user(tenant: i64) -> Actor {
        Actor::new(3, Role::OfficeUser, Scope::Tenant(tenant))
    }

    #[test]
    fn only_admins_and_managers_manage_sessions() {
        assert!(can_manage_sessions(&admin()));
        assert!(can_manage_sessions(&manager(2)));
        assert!(!can_manage_sessions(&office_user(2)));
        assert!(matches!(
            ensure_can_manage_sessions(&office_user(2)),
            Err(Error::Forbidden(_))
        ));
    }

    #[test]
    fn admins_own_new_sessions_globally() {
        assert_eq!(owner_for_new_session(&admin()), Scope::Global);
        assert_eq!(owner_for_new_session(&manager(4)), Scope::Tenant(4));
    }

    #[test]
    fn tenants_only_view_their_own_sessions() {
        assert!(can_view(&manager(4), Scope::Tenant(4)));
        assert!(!can_view(&manager(4), Scope::Tenant(9)));
        assert!(!can_view(&manager(4), Scope::Global));
        assert!(can_view(&admin(), Scope::Tenant(9)));
        assert_eq!(session_list_owner(&admin()), None);
        assert_eq!(session_list_owner(&office_user(3)), Some(Scope::Tenant(3)));
    }

    #[test]
    fn question_visibility_follows_role_and_scope() {
        let global_admin = Actor::new(1, Role::Admin, Scope::Global);
        assert_eq!(question_visibility(&global_admin), Visibility::Everything);
        assert_eq!(
            question_visibility(&admin()),
            Visibility::GlobalAnd(Scope::Tenant(5))
        );
        assert_eq!(
            question_visibility(&manager(4)),
            Visibility::GlobalAnd(Scope::Tenant(4))
        );
    }
}
