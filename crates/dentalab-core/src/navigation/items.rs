//! The static navigation list.

use super::NavItem;
use crate::models::Role;

const EVERYONE: &[Role] = &[
    Role::Superadmin,
    Role::Doctor,
    Role::Nurse,
    Role::Staff,
    Role::LabTechnician,
];
const CLINICAL: &[Role] = &[Role::Superadmin, Role::Doctor, Role::Nurse, Role::Staff];
const LAB: &[Role] = &[Role::Superadmin, Role::LabTechnician];
const ADMIN: &[Role] = &[Role::Superadmin];

/// Every navigation entry, in display order.
pub static NAV_ITEMS: &[NavItem] = &[
    NavItem {
        icon: "dashboard",
        label: "Dashboard",
        route: "/",
        active_prefix: None,
        roles: EVERYONE,
        overflow: false,
        priority: 0,
    },
    NavItem {
        icon: "people",
        label: "Patients",
        route: "/patients",
        active_prefix: None,
        roles: CLINICAL,
        overflow: false,
        priority: 0,
    },
    NavItem {
        icon: "assignment",
        label: "Treatment requests",
        route: "/treatment-requests",
        active_prefix: None,
        roles: CLINICAL,
        overflow: false,
        priority: 0,
    },
    NavItem {
        icon: "science",
        label: "Lab requests",
        route: "/lab-requests",
        active_prefix: None,
        roles: LAB,
        overflow: false,
        priority: 0,
    },
    NavItem {
        icon: "receipt_long",
        label: "Laborzettel",
        route: "/laborzettel",
        active_prefix: None,
        roles: LAB,
        overflow: false,
        priority: 0,
    },
    NavItem {
        icon: "inventory",
        label: "Inventory",
        route: "/inventory/materials",
        active_prefix: Some("/inventory"),
        roles: LAB,
        overflow: false,
        priority: 0,
    },
    NavItem {
        icon: "local_hospital",
        label: "Clinics",
        route: "/clinics",
        active_prefix: None,
        roles: ADMIN,
        overflow: true,
        priority: 0,
    },
    NavItem {
        icon: "medical_services",
        label: "Doctors",
        route: "/doctors",
        active_prefix: None,
        roles: ADMIN,
        overflow: true,
        priority: 0,
    },
    NavItem {
        icon: "healing",
        label: "Nurses",
        route: "/nurses",
        active_prefix: None,
        roles: ADMIN,
        overflow: true,
        priority: 0,
    },
    NavItem {
        icon: "engineering",
        label: "Lab technicians",
        route: "/lab-technicians",
        active_prefix: None,
        roles: ADMIN,
        overflow: true,
        priority: 0,
    },
    NavItem {
        icon: "manage_accounts",
        label: "Users",
        route: "/users",
        active_prefix: None,
        roles: ADMIN,
        overflow: true,
        priority: 0,
    },
    NavItem {
        icon: "build",
        label: "Operations",
        route: "/operations",
        active_prefix: None,
        roles: ADMIN,
        overflow: true,
        priority: 0,
    },
    NavItem {
        icon: "category",
        label: "Categories",
        route: "/categories",
        active_prefix: None,
        roles: ADMIN,
        overflow: true,
        priority: 0,
    },
    NavItem {
        icon: "tune",
        label: "Options",
        route: "/options",
        active_prefix: None,
        roles: ADMIN,
        overflow: true,
        priority: 0,
    },
    NavItem {
        icon: "history",
        label: "Activity log",
        route: "/activity-logs",
        active_prefix: None,
        roles: ADMIN,
        overflow: true,
        priority: 0,
    },
    NavItem {
        icon: "person",
        label: "Profile",
        route: "/profile",
        active_prefix: None,
        roles: EVERYONE,
        overflow: true,
        priority: 0,
    },
];
