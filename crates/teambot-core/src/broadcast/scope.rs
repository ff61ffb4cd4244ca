use crate::domain::{OrgId, Role};

/// Fixed prefix prepended to global broadcasts so recipients can tell them
/// apart from their organization's.
pub const GLOBAL_BANNER: &str = "📢 *Global broadcast*\n\n";

const ORG_RECIPIENT_ROLES: &[Role] = &[Role::Member, Role::Trainer];
const GLOBAL_RECIPIENT_ROLES: &[Role] = &[Role::Member, Role::Trainer, Role::OrgAdmin];

/// Which of the two broadcast variants a flow entry asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Organization,
    Global,
}

/// Recipient-selection boundary for a broadcast.
///
/// The two variants share one state machine; the scope carries everything
/// that differs between them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BroadcastScope {
    Organization { org_id: OrgId, org_name: String },
    Global,
}

impl BroadcastScope {
    pub fn kind(&self) -> ScopeKind {
        match self {
            BroadcastScope::Organization { .. } => ScopeKind::Organization,
            BroadcastScope::Global => ScopeKind::Global,
        }
    }

    /// Role an actor must hold to open this flow.
    pub fn required_role(&self) -> Role {
        match self {
            BroadcastScope::Organization { .. } => Role::OrgAdmin,
            BroadcastScope::Global => Role::SuperAdmin,
        }
    }

    /// Roles eligible to receive this broadcast.
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            BroadcastScope::Organization { .. } => ORG_RECIPIENT_ROLES,
            BroadcastScope::Global => GLOBAL_RECIPIENT_ROLES,
        }
    }

    pub fn org_id(&self) -> Option<OrgId> {
        match self {
            BroadcastScope::Organization { org_id, .. } => Some(*org_id),
            BroadcastScope::Global => None,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            BroadcastScope::Organization { org_name, .. } => org_name,
            BroadcastScope::Global => "all organizations",
        }
    }

    /// How many characters of the draft the preview shows.
    pub fn preview_limit(&self) -> usize {
        match self {
            BroadcastScope::Organization { .. } => 300,
            BroadcastScope::Global => 500,
        }
    }

    /// The text as it actually goes out: global broadcasts carry the banner,
    /// organization broadcasts go out verbatim.
    pub fn outbound_text(&self, draft: &str) -> String {
        match self {
            BroadcastScope::Organization { .. } => draft.to_string(),
            BroadcastScope::Global => format!("{GLOBAL_BANNER}{draft}"),
        }
    }
}
