use serde::{Deserialize, Serialize};

/// Client id reserved for data shared by every tenant. Only the persistence
/// layer and the wire format deal with the raw number; everything else goes
/// through [`Scope`].
pub const GLOBAL_CLIENT_ID: i64 = 1;

/// Owning scope of a record: shared system data or a single client tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Scope {
    Global,
    Tenant(i64),
}

impl Scope {
    pub fn from_client_id(client_id: i64) -> Self {
        if client_id == GLOBAL_CLIENT_ID {
            Scope::Global
        } else {
            Scope::Tenant(client_id)
        }
    }

    pub fn client_id(self) -> i64 {
        match self {
            Scope::Global => GLOBAL_CLIENT_ID,
            Scope::Tenant(id) => id,
        }
    }

    pub fn is_global(self) -> bool {
        matches!(self, Scope::Global)
    }
}

impl From<i64> for Scope {
    fn from(client_id: i64) -> Self {
        Scope::from_client_id(client_id)
    }
}

impl From<Scope> for i64 {
    fn from(scope: Scope) -> Self {
        scope.client_id()
    }
}

/// Which owners' shared-catalogue rows a reader may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Everything,
    /// Global rows plus the rows of one scope.
    GlobalAnd(Scope),
}

impl Visibility {
    pub fn admits(self, owner: Scope) -> bool {
        match self {
            Visibility::Everything => true,
            Visibility::GlobalAnd(scope) => owner.is_global() || owner == scope,
        }
    }

    /// The non-global client id to include alongside global rows, `None` when unrestricted.
    pub fn tenant_filter(self) -> Option<i64> {
        match self {
            Visibility::Everything => None,
            Visibility::GlobalAnd(scope) => Some(scope.client_id()),
        }
    }
}
