//! Role-based authorization policy.
//!
//! Single source of truth for every role/ownership/department decision in
//! the API. The function is pure: no I/O, no clock, no database. Handlers
//! and services build an [`Actor`] from the verified claims and a [`Target`]
//! from the resource being acted on, and translate a [`Denial`] into a 403
//! at the HTTP boundary.
//!
//! Rules, in evaluation order:
//!
//! 1. Accounts with role `creator` can never be deleted, by anyone.
//! 2. Assigning a role when creating an account is gated per role:
//!    `creator`/`director`/`hod` may only be assigned by a `creator`;
//!    `professor` by `creator`, `director`, or an `hod` of the same
//!    department; `admin` by `creator`/`director`; `student` by
//!    `creator`/`director`/`admin`.
//! 3. `creator` and `director` bypass ownership and department checks.
//! 4. Any actor may act on a resource they own.
//! 5. `hod` is restricted to targets in their own department.
//! 6. `admin` passes the generic check; every admin surface is additionally
//!    role-gated at the route layer.
//! 7. Everything else is denied.

use uuid::Uuid;

use crate::modules::accounts::model::AccountRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

/// The authenticated principal, as carried in the verified token claims.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: Uuid,
    pub role: AccountRole,
    pub department: Option<String>,
}

/// The resource a decision is being made about.
///
/// All fields are optional; a field that is `None` simply makes the rules
/// that depend on it inapplicable.
#[derive(Debug, Clone, Default)]
pub struct Target {
    /// Owning account, for ownership checks.
    pub owner_id: Option<Uuid>,
    /// Department the resource belongs to, for `hod` scoping.
    pub department: Option<String>,
    /// When the target is an account: its role (existing, or being assigned).
    pub role: Option<AccountRole>,
}

impl Target {
    pub fn account(role: AccountRole, department: Option<String>) -> Self {
        Self {
            owner_id: None,
            department,
            role: Some(role),
        }
    }

    pub fn owned_by(owner_id: Uuid) -> Self {
        Self {
            owner_id: Some(owner_id),
            ..Self::default()
        }
    }
}

/// A denied decision, with the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Denial(&'static str);

impl Denial {
    pub fn reason(&self) -> &'static str {
        self.0
    }
}

pub fn authorize(actor: &Actor, action: Action, target: &Target) -> Result<(), Denial> {
    // Rule 1: creator accounts are permanent.
    if action == Action::Delete && target.role == Some(AccountRole::Creator) {
        return Err(Denial("creator accounts cannot be deleted"));
    }

    // Rule 2: role assignment gates are decisive, before any bypass.
    if action == Action::Create {
        if let Some(assigned) = target.role {
            return check_role_assignment(actor, assigned, target);
        }
    }

    // Rule 3: full bypass.
    if matches!(actor.role, AccountRole::Creator | AccountRole::Director) {
        return Ok(());
    }

    // Rule 4: ownership.
    if target.owner_id == Some(actor.id) {
        return Ok(());
    }

    // Rule 5: hod department scope.
    if actor.role == AccountRole::Hod {
        return if target.department.is_some() && target.department == actor.department {
            Ok(())
        } else {
            Err(Denial("hod may only act within their own department"))
        };
    }

    // Rule 6: admin surfaces are role-gated at the route layer.
    if actor.role == AccountRole::Admin {
        return Ok(());
    }

    Err(Denial("not permitted for this role"))
}

fn check_role_assignment(
    actor: &Actor,
    assigned: AccountRole,
    target: &Target,
) -> Result<(), Denial> {
    match assigned {
        AccountRole::Creator | AccountRole::Director | AccountRole::Hod => {
            if actor.role == AccountRole::Creator {
                Ok(())
            } else {
                Err(Denial("only the creator may assign this role"))
            }
        }
        AccountRole::Professor => match actor.role {
            AccountRole::Creator | AccountRole::Director => Ok(()),
            AccountRole::Hod => {
                if actor.department.is_some() && actor.department == target.department {
                    Ok(())
                } else {
                    Err(Denial("hod may only create professors in their own department"))
                }
            }
            _ => Err(Denial("not permitted to create professor accounts")),
        },
        AccountRole::Admin => match actor.role {
            AccountRole::Creator | AccountRole::Director => Ok(()),
            _ => Err(Denial("not permitted to create admin accounts")),
        },
        AccountRole::Student => match actor.role {
            AccountRole::Creator | AccountRole::Director | AccountRole::Admin => Ok(()),
            _ => Err(Denial("not permitted to create student accounts")),
        },
    }
}
