// src/services/access.rs
// Authorization decisions: a pure function of the caller, the requested action
// and the owner of the target resource. Handlers load the resource first when
// the rule needs an owner, then turn a Deny into a ServiceError.

use crate::models::UserRole;
use derive_more::Display;

// Authenticated identity attached to a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: String,
    pub role: UserRole,
}

impl Caller {
    pub fn new(id: impl Into<String>, role: UserRole) -> Self {
        Self { id: id.into(), role }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateApplication,
    ListOwnApplications,
    ViewProfile,
    EditProfile,
    ChangeRole,
    CreateProject,
    UpdateProject,
    DeleteProject,
    AddTeamMember,
    RemoveTeamMember,
    UpdateApplicationStatus,
    ListProjectApplications,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    #[display(fmt = "Authentication required")]
    AuthenticationRequired,
    #[display(fmt = "You do not have access to this profile")]
    ProfileAccessDenied,
    #[display(fmt = "You do not have access to this project")]
    ProjectAccessDenied,
    #[display(fmt = "You are not allowed to change the status of this application")]
    ApplicationAccessDenied,
    #[display(fmt = "Only team leads and clients can create projects")]
    ProjectCreationDenied,
    #[display(fmt = "Insufficient permissions")]
    InsufficientPermissions,
}

impl DenyReason {
    pub fn code(self) -> &'static str {
        match self {
            DenyReason::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            DenyReason::ProfileAccessDenied => "PROFILE_ACCESS_DENIED",
            DenyReason::ProjectAccessDenied => "PROJECT_ACCESS_DENIED",
            DenyReason::ApplicationAccessDenied => "APPLICATION_ACCESS_DENIED",
            DenyReason::ProjectCreationDenied => "PROJECT_CREATION_DENIED",
            DenyReason::InsufficientPermissions => "INSUFFICIENT_PERMISSIONS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> Result<(), DenyReason> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(reason),
        }
    }
}

// Whether the admin role short-circuits ownership and self checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    pub admin_override: bool,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self { admin_override: true }
    }
}

pub fn authorize(
    policy: AccessPolicy,
    caller: Option<&Caller>,
    action: Action,
    resource_owner: Option<&str>,
) -> Decision {
    let caller = match caller {
        Some(caller) => caller,
        None if action == Action::CreateApplication => return Decision::Allow,
        None => return Decision::Deny(DenyReason::AuthenticationRequired),
    };

    let admin_bypass = policy.admin_override && caller.role.is_admin();
    let owns = resource_owner == Some(caller.id.as_str());

    match action {
        Action::CreateApplication | Action::ListOwnApplications | Action::ViewProfile => {
            Decision::Allow
        }
        Action::ListProjectApplications | Action::ChangeRole => {
            if caller.role.is_admin() {
                Decision::Allow
            } else {
                Decision::Deny(DenyReason::InsufficientPermissions)
            }
        }
        Action::EditProfile => allow_if(admin_bypass || owns, DenyReason::ProfileAccessDenied),
        Action::CreateProject => allow_if(
            admin_bypass || caller.role.can_create_projects(),
            DenyReason::ProjectCreationDenied,
        ),
        Action::UpdateProject
        | Action::DeleteProject
        | Action::AddTeamMember
        | Action::RemoveTeamMember => allow_if(admin_bypass || owns, DenyReason::ProjectAccessDenied),
        Action::UpdateApplicationStatus => {
            allow_if(admin_bypass || owns, DenyReason::ApplicationAccessDenied)
        }
    }
}

fn allow_if(condition: bool, reason: DenyReason) -> Decision {
    if condition {
        Decision::Allow
    } else {
        Decision::Deny(reason)
    }
}
