//! Roles and permissions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The category assigned to an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Superadmin,
    Doctor,
    Nurse,
    Staff,
    /// Only used for navigation gating; has no permission table entry.
    LabTechnician,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Superadmin,
        Role::Doctor,
        Role::Nurse,
        Role::Staff,
        Role::LabTechnician,
    ];

    /// Wire name, as sent by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Doctor => "doctor",
            Role::Nurse => "nurse",
            Role::Staff => "staff",
            Role::LabTechnician => "lab_technician",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Superadmin => "Superadmin",
            Role::Doctor => "Doctor",
            Role::Nurse => "Nurse",
            Role::Staff => "Staff",
            Role::LabTechnician => "Lab technician",
        }
    }

    /// Parse a wire name (case-insensitive). Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Role> {
        let name = name.trim().to_ascii_lowercase();
        Role::ALL.into_iter().find(|r| r.as_str() == name)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Read or write access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Read,
    Write,
}

macro_rules! permissions {
    ($( $variant:ident => $wire:literal, $resource:literal, $action:ident; )*) => {
        /// A capability token of the form `<resource>.<action>`.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum Permission {
            $(
                #[serde(rename = $wire)]
                $variant,
            )*
        }

        impl Permission {
            pub const ALL: &'static [Permission] = &[$(Permission::$variant),*];

            /// Wire form, e.g. `patients.write`.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Permission::$variant => $wire,)*
                }
            }

            /// Resource half of the token.
            pub fn resource(&self) -> &'static str {
                match self {
                    $(Permission::$variant => $resource,)*
                }
            }

            pub fn action(&self) -> Action {
                match self {
                    $(Permission::$variant => Action::$action,)*
                }
            }
        }
    };
}

permissions! {
    UsersRead => "users.read", "users", Read;
    UsersWrite => "users.write", "users", Write;
    ClinicsRead => "clinics.read", "clinics", Read;
    ClinicsWrite => "clinics.write", "clinics", Write;
    DoctorsRead => "doctors.read", "doctors", Read;
    DoctorsWrite => "doctors.write", "doctors", Write;
    NursesRead => "nurses.read", "nurses", Read;
    NursesWrite => "nurses.write", "nurses", Write;
    OperationsRead => "operations.read", "operations", Read;
    OperationsWrite => "operations.write", "operations", Write;
    CategoriesRead => "categories.read", "categories", Read;
    CategoriesWrite => "categories.write", "categories", Write;
    OptionsRead => "options.read", "options", Read;
    OptionsWrite => "options.write", "options", Write;
    MaterialsRead => "materials.read", "materials", Read;
    MaterialsWrite => "materials.write", "materials", Write;
    ReportsRead => "reports.read", "reports", Read;
    ReportsWrite => "reports.write", "reports", Write;
    PatientsRead => "patients.read", "patients", Read;
    PatientsWrite => "patients.write", "patients", Write;
    RequestsRead => "requests.read", "requests", Read;
    RequestsWrite => "requests.write", "requests", Write;
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown permission: {0}")]
pub struct UnknownPermission(pub String);

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Permission::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}
