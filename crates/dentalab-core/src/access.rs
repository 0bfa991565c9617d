//! Permission evaluator.
//!
//! A static role → permission-set table plus pure lookups over it. Nothing
//! here has side effects; the table is never mutated at runtime.

use std::collections::BTreeSet;

use crate::models::{Permission, Role};

use Permission::*;

const SUPERADMIN: &[Permission] = &[
    UsersRead,
    UsersWrite,
    ClinicsRead,
    ClinicsWrite,
    DoctorsRead,
    DoctorsWrite,
    NursesRead,
    NursesWrite,
    OperationsRead,
    OperationsWrite,
    CategoriesRead,
    CategoriesWrite,
    OptionsRead,
    OptionsWrite,
    MaterialsRead,
    MaterialsWrite,
    ReportsRead,
    ReportsWrite,
    PatientsRead,
    PatientsWrite,
    RequestsRead,
    RequestsWrite,
];

const CLINICAL: &[Permission] = &[PatientsRead, PatientsWrite, RequestsRead, RequestsWrite];

/// Roles that have an entry in the permission table.
pub const PERMISSIONED_ROLES: [Role; 4] = [Role::Superadmin, Role::Doctor, Role::Nurse, Role::Staff];

/// The static table entry for a role.
///
/// The lab technician has no table entry and gets nothing.
pub fn role_permissions(role: Role) -> &'static [Permission] {
    match role {
        Role::Superadmin => SUPERADMIN,
        Role::Doctor | Role::Nurse | Role::Staff => CLINICAL,
        Role::LabTechnician => &[],
    }
}

/// Permission set granted to a role.
pub fn permissions_for_role(role: Role) -> BTreeSet<Permission> {
    role_permissions(role).iter().copied().collect()
}

/// Permission set for a raw role name; unknown names get the empty set.
pub fn permissions_for_role_name(name: &str) -> BTreeSet<Permission> {
    Role::parse(name)
        .map(permissions_for_role)
        .unwrap_or_default()
}

/// True iff the role holds every required permission. An empty requirement
/// is always satisfied.
pub fn has_permission(role: Role, required: &[Permission]) -> bool {
    let granted = role_permissions(role);
    required.iter().all(|p| granted.contains(p))
}

/// [`has_permission`] for an optional role; no role means no permissions.
pub fn role_has_permission(role: Option<Role>, required: &[Permission]) -> bool {
    match role {
        Some(role) => has_permission(role, required),
        None => required.is_empty(),
    }
}

/// True iff `role` is one of `allowed`.
pub fn has_role(role: Role, allowed: &[Role]) -> bool {
    allowed.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_superadmin_has_everything() {
        assert_eq!(permissions_for_role(Role::Superadmin).len(), Permission::ALL.len());
        assert!(has_permission(Role::Superadmin, Permission::ALL));
    }

    #[test]
    fn test_clinical_roles_share_set() {
        let doctor = permissions_for_role(Role::Doctor);
        assert_eq!(doctor, permissions_for_role(Role::Nurse));
        assert_eq!(doctor, permissions_for_role(Role::Staff));
        assert_eq!(doctor.len(), 4);
    }

    #[test]
    fn test_nurse_scenario() {
        assert!(has_permission(Role::Nurse, &[PatientsRead, RequestsWrite]));
        assert!(!has_permission(Role::Nurse, &[UsersWrite]));
    }

    #[test]
    fn test_all_of_semantics() {
        assert!(!has_permission(Role::Doctor, &[PatientsRead, ClinicsRead]));
    }

    #[test]
    fn test_empty_requirement() {
        for role in Role::ALL {
            assert!(has_permission(role, &[]));
        }
        assert!(role_has_permission(None, &[]));
        assert!(!role_has_permission(None, &[PatientsRead]));
    }

    #[test]
    fn test_lab_technician_fails_closed() {
        assert!(permissions_for_role(Role::LabTechnician).is_empty());
        assert!(!has_permission(Role::LabTechnician, &[MaterialsRead]));
    }

    #[test]
    fn test_unknown_role_name() {
        assert!(permissions_for_role_name("janitor").is_empty());
        assert_eq!(permissions_for_role_name("doctor").len(), 4);
    }

    #[test]
    fn test_has_role() {
        assert!(has_role(Role::Doctor, &[Role::Doctor]));
        assert!(has_role(Role::Nurse, &[Role::Doctor, Role::Nurse]));
        assert!(!has_role(Role::Staff, &[Role::Superadmin]));
        assert!(!has_role(Role::Staff, &[]));
    }
}
