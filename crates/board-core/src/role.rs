//! Role policy — the ranked permission levels every other component consults.
//!
//! Roles are totally ordered; a lower rank means more privilege. All checks are
//! pure functions over the enum. Stored values that do not name a known role
//! resolve to [`Role::User`] so evaluation always fails closed.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// The privilege level of an employee.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
  /// Hospital director, IT lead.
  SuperAdmin,
  /// Head of a department.
  DepartmentAdmin,
  /// Board moderators (PR, education).
  Moderator,
  #[default]
  User,
}

impl Role {
  /// All roles, highest privilege first.
  pub const HIERARCHY: [Role; 4] =
    [Role::SuperAdmin, Role::DepartmentAdmin, Role::Moderator, Role::User];

  /// `0` is the highest privilege.
  pub fn rank(self) -> u8 {
    match self {
      Self::SuperAdmin => 0,
      Self::DepartmentAdmin => 1,
      Self::Moderator => 2,
      Self::User => 3,
    }
  }

  /// Resolve a stored role string, including the legacy lowercase vocabulary.
  /// Anything unrecognised is treated as [`Role::User`].
  pub fn parse_lossy(s: &str) -> Self {
    match s.trim().to_ascii_lowercase().as_str() {
      "super_admin" | "superadmin" => Self::SuperAdmin,
      "department_admin" | "departmentadmin" => Self::DepartmentAdmin,
      "moderator" | "board_admin" => Self::Moderator,
      _ => Self::User,
    }
  }

  pub fn as_str(self) -> &'static str { self.into() }

  /// `true` iff `self` meets or exceeds `required`.
  pub fn has_minimum_role(self, required: Role) -> bool {
    self.rank() <= required.rank()
  }

  pub fn is_admin(self) -> bool {
    matches!(self, Self::SuperAdmin | Self::DepartmentAdmin)
  }

  pub fn is_super_admin(self) -> bool { self == Self::SuperAdmin }

  pub fn is_department_admin(self) -> bool { self == Self::DepartmentAdmin }

  pub fn can_manage_posts(self) -> bool { self.has_minimum_role(Self::Moderator) }

  pub fn can_manage_employees(self) -> bool {
    self.has_minimum_role(Self::DepartmentAdmin)
  }

  pub fn can_manage_system(self) -> bool { self == Self::SuperAdmin }

  /// Gate for the `/admin` area of the front end.
  pub fn can_access_admin_pages(self) -> bool {
    self.has_minimum_role(Self::DepartmentAdmin)
  }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn ranks_follow_hierarchy_order() {
    for (i, role) in Role::HIERARCHY.iter().enumerate() {
      assert_eq!(role.rank() as usize, i);
    }
  }

  #[test]
  fn minimum_role_matches_rank_comparison() {
    for r in Role::HIERARCHY {
      for required in Role::HIERARCHY {
        assert_eq!(
          r.has_minimum_role(required),
          r.rank() <= required.rank(),
          "{r} vs {required}"
        );
      }
    }
  }

  #[test]
  fn predicates() {
    assert!(Role::SuperAdmin.can_manage_system());
    assert!(!Role::DepartmentAdmin.can_manage_system());

    assert!(Role::DepartmentAdmin.can_manage_employees());
    assert!(!Role::Moderator.can_manage_employees());

    assert!(Role::Moderator.can_manage_posts());
    assert!(!Role::User.can_manage_posts());

    assert!(Role::DepartmentAdmin.is_admin());
    assert!(!Role::Moderator.is_admin());
    assert!(Role::DepartmentAdmin.is_department_admin());
    assert!(Role::SuperAdmin.is_super_admin());

    assert!(Role::DepartmentAdmin.can_access_admin_pages());
    assert!(!Role::Moderator.can_access_admin_pages());
  }

  #[test]
  fn legacy_vocabulary_and_unknowns() {
    assert_eq!(Role::parse_lossy("super_admin"), Role::SuperAdmin);
    assert_eq!(Role::parse_lossy("SUPER_ADMIN"), Role::SuperAdmin);
    assert_eq!(Role::parse_lossy("department_admin"), Role::DepartmentAdmin);
    assert_eq!(Role::parse_lossy("board_admin"), Role::Moderator);
    assert_eq!(Role::parse_lossy("employee"), Role::User);
    assert_eq!(Role::parse_lossy(""), Role::User);
    assert_eq!(Role::parse_lossy("root"), Role::User);
  }

  #[test]
  fn strict_parse_and_display() {
    assert_eq!(Role::from_str("MODERATOR").unwrap(), Role::Moderator);
    assert!(Role::from_str("board_admin").is_err());
    assert_eq!(Role::DepartmentAdmin.to_string(), "DEPARTMENT_ADMIN");
    assert_eq!(Role::User.as_str(), "USER");
  }

  #[test]
  fn serde_uses_screaming_snake_case() {
    let json = serde_json::to_string(&Role::SuperAdmin).unwrap();
    assert_eq!(json, "\"SUPER_ADMIN\"");
    let back: Role = serde_json::from_str("\"DEPARTMENT_ADMIN\"").unwrap();
    assert_eq!(back, Role::DepartmentAdmin);
  }
}
