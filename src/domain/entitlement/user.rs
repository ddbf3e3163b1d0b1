//! Users and their role assignments.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId};

/// Marketplace roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Client,
    Publisher,
    Superadmin,
    Referral,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Publisher => "publisher",
            Role::Superadmin => "superadmin",
            Role::Referral => "referral",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "client" => Some(Role::Client),
            "publisher" => Some(Role::Publisher),
            "superadmin" => Some(Role::Superadmin),
            "referral" => Some(Role::Referral),
            _ => None,
        }
    }
}

/// One role grant on a user. Revocation keeps the row and flips `is_active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub role: Role,
    pub is_active: bool,
    pub assigned_at: Timestamp,
    pub assigned_by: String,
}

/// User as seen by the entitlement synchronizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub roles: Vec<RoleAssignment>,
    pub payment_account_connected: bool,
}

impl User {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            roles: Vec::new(),
            payment_account_connected: false,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.iter().any(|a| a.role == role && a.is_active)
    }

    /// Active roles, sorted.
    pub fn active_roles(&self) -> Vec<Role> {
        let mut roles: Vec<Role> = self
            .roles
            .iter()
            .filter(|a| a.is_active)
            .map(|a| a.role)
            .collect();
        roles.sort();
        roles.dedup();
        roles
    }

    /// Grants `role`. Returns false if it was already active.
    pub fn grant(&mut self, role: Role, assigned_by: &str, now: Timestamp) -> bool {
        if self.has_role(role) {
            return false;
        }
        match self.roles.iter_mut().find(|a| a.role == role) {
            Some(existing) => {
                existing.is_active = true;
                existing.assigned_at = now;
                existing.assigned_by = assigned_by.to_string();
            }
            None => self.roles.push(RoleAssignment {
                role,
                is_active: true,
                assigned_at: now,
                assigned_by: assigned_by.to_string(),
            }),
        }
        true
    }

    /// Revokes `role`. Returns false if it was not active.
    pub fn revoke(&mut self, role: Role) -> bool {
        let mut changed = false;
        for assignment in self.roles.iter_mut().filter(|a| a.role == role && a.is_active) {
            assignment.is_active = false;
            changed = true;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new(UserId::new("u1").unwrap())
    }

    #[test]
    fn grant_is_idempotent() {
        let mut user = user();
        assert!(user.grant(Role::Client, "system", Timestamp::now()));
        assert!(!user.grant(Role::Client, "system", Timestamp::now()));
        assert_eq!(user.roles.len(), 1);
    }

    #[test]
    fn revoke_then_grant_reuses_assignment() {
        let mut user = user();
        user.grant(Role::Publisher, "system", Timestamp::now());
        assert!(user.revoke(Role::Publisher));
        assert!(!user.has_role(Role::Publisher));
        assert!(!user.revoke(Role::Publisher));

        user.grant(Role::Publisher, "system", Timestamp::now());
        assert!(user.has_role(Role::Publisher));
        assert_eq!(user.roles.len(), 1);
    }

    #[test]
    fn active_roles_are_sorted() {
        let mut user = user();
        user.grant(Role::Publisher, "system", Timestamp::now());
        user.grant(Role::Client, "system", Timestamp::now());
        assert_eq!(user.active_roles(), vec![Role::Client, Role::Publisher]);
    }
}
