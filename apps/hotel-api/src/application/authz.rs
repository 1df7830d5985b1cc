use hotel_core::domain::{Booking, Branch, Complaint, Entity, Room, User, UserRole};

use super::ApiError;
use super::middleware::Session;

#[derive(Debug, Clone)]
pub enum Requirement {
    DirectorOnly,
    /// Directors, or the admin assigned to this branch.
    BranchAccess { branch_id: String },
    /// Directors, or the account itself.
    SelfOrDirector { user_id: String },
}

pub fn authorize(session: &Session, req: Requirement) -> Result<(), ApiError> {
    if session.role == UserRole::Director {
        return Ok(());
    }
    match req {
        Requirement::DirectorOnly => Err(ApiError::Forbidden(format!(
            "only the director may do this, not {}",
            session.role
        ))),
        Requirement::BranchAccess { branch_id } => {
            if session.role == UserRole::Admin
                && session.branch_id.as_deref() == Some(branch_id.as_str())
            {
                return Ok(());
            }
            Err(ApiError::Forbidden(format!(
                "{} has no access to branch {}",
                session.email, branch_id
            )))
        }
        Requirement::SelfOrDirector { user_id } => {
            if session.user_id == user_id {
                return Ok(());
            }
            Err(ApiError::Forbidden(format!(
                "{} may not manage account {}",
                session.email, user_id
            )))
        }
    }
}

/// Who may create, change or delete records of a collection.
pub trait WriteAccess: Entity {
    /// Requirement for writing a record that belongs to `branch_id`.
    /// Branch-scoped records default to that branch's admin.
    fn write_requirement(branch_id: Option<&str>) -> Requirement {
        match branch_id {
            Some(branch_id) => Requirement::BranchAccess {
                branch_id: branch_id.to_string(),
            },
            None => Requirement::DirectorOnly,
        }
    }
}

impl WriteAccess for Room {}
impl WriteAccess for Booking {}
impl WriteAccess for Complaint {}

// Branches, accounts and roles are the director's
impl WriteAccess for Branch {
    fn write_requirement(_branch_id: Option<&str>) -> Requirement {
        Requirement::DirectorOnly
    }
}

impl WriteAccess for User {
    fn write_requirement(_branch_id: Option<&str>) -> Requirement {
        Requirement::DirectorOnly
    }
}
