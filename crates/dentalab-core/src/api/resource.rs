//! Backend resource table.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::models::Permission;

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// A REST collection exposed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    Patients,
    Clinics,
    Doctors,
    Nurses,
    LabTechnicians,
    Users,
    TreatmentRequests,
    LabRequests,
    Materials,
    Lots,
    Movements,
    Laborzettel,
    Options,
    Operations,
    Categories,
    ActivityLogs,
}

impl Resource {
    pub const ALL: [Resource; 16] = [
        Resource::Patients,
        Resource::Clinics,
        Resource::Doctors,
        Resource::Nurses,
        Resource::LabTechnicians,
        Resource::Users,
        Resource::TreatmentRequests,
        Resource::LabRequests,
        Resource::Materials,
        Resource::Lots,
        Resource::Movements,
        Resource::Laborzettel,
        Resource::Options,
        Resource::Operations,
        Resource::Categories,
        Resource::ActivityLogs,
    ];

    /// Collection path below the API base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Patients => "/patients",
            Resource::Clinics => "/clinics",
            Resource::Doctors => "/doctors",
            Resource::Nurses => "/nurses",
            Resource::LabTechnicians => "/lab-technicians",
            Resource::Users => "/users",
            Resource::TreatmentRequests => "/treatment-requests",
            Resource::LabRequests => "/lab-requests",
            Resource::Materials => "/inventory/materials",
            Resource::Lots => "/inventory/lots",
            Resource::Movements => "/inventory/movements",
            Resource::Laborzettel => "/laborzettel",
            Resource::Options => "/options",
            Resource::Operations => "/operations",
            Resource::Categories => "/categories",
            Resource::ActivityLogs => "/activity-logs",
        }
    }

    /// Path of a single record.
    pub fn item_path(&self, id: i64) -> String {
        format!("{}/{}", self.path(), id)
    }

    /// Canonical command-line name.
    pub fn name(&self) -> &'static str {
        match self {
            Resource::Patients => "patients",
            Resource::Clinics => "clinics",
            Resource::Doctors => "doctors",
            Resource::Nurses => "nurses",
            Resource::LabTechnicians => "lab-technicians",
            Resource::Users => "users",
            Resource::TreatmentRequests => "treatment-requests",
            Resource::LabRequests => "lab-requests",
            Resource::Materials => "materials",
            Resource::Lots => "lots",
            Resource::Movements => "movements",
            Resource::Laborzettel => "laborzettel",
            Resource::Options => "options",
            Resource::Operations => "operations",
            Resource::Categories => "categories",
            Resource::ActivityLogs => "activity-logs",
        }
    }

    fn singular(&self) -> &'static str {
        match self {
            Resource::Patients => "patient",
            Resource::Clinics => "clinic",
            Resource::Doctors => "doctor",
            Resource::Nurses => "nurse",
            Resource::LabTechnicians => "lab-technician",
            Resource::Users => "user",
            Resource::TreatmentRequests => "treatment-request",
            Resource::LabRequests => "lab-request",
            Resource::Materials => "material",
            Resource::Lots => "lot",
            Resource::Movements => "movement",
            Resource::Laborzettel => "laborzettel",
            Resource::Options => "option",
            Resource::Operations => "operation",
            Resource::Categories => "category",
            Resource::ActivityLogs => "activity-log",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Resource::Patients => "Patients",
            Resource::Clinics => "Clinics",
            Resource::Doctors => "Doctors",
            Resource::Nurses => "Nurses",
            Resource::LabTechnicians => "Lab technicians",
            Resource::Users => "Users",
            Resource::TreatmentRequests => "Treatment requests",
            Resource::LabRequests => "Lab requests",
            Resource::Materials => "Materials",
            Resource::Lots => "Lots",
            Resource::Movements => "Stock movements",
            Resource::Laborzettel => "Laborzettel",
            Resource::Options => "Options",
            Resource::Operations => "Operations",
            Resource::Categories => "Categories",
            Resource::ActivityLogs => "Activity log",
        }
    }

    /// Permission needed to view the collection.
    pub fn read_permission(&self) -> Permission {
        match self {
            Resource::Patients => Permission::PatientsRead,
            Resource::Clinics => Permission::ClinicsRead,
            Resource::Doctors => Permission::DoctorsRead,
            Resource::Nurses => Permission::NursesRead,
            Resource::LabTechnicians | Resource::Users => Permission::UsersRead,
            Resource::TreatmentRequests | Resource::LabRequests => Permission::RequestsRead,
            Resource::Materials | Resource::Lots | Resource::Movements => {
                Permission::MaterialsRead
            }
            Resource::Laborzettel | Resource::ActivityLogs => Permission::ReportsRead,
            Resource::Options => Permission::OptionsRead,
            Resource::Operations => Permission::OperationsRead,
            Resource::Categories => Permission::CategoriesRead,
        }
    }

    /// Permission needed to mutate the collection. `None` for read-only
    /// collections.
    pub fn write_permission(&self) -> Option<Permission> {
        let permission = match self {
            Resource::Patients => Permission::PatientsWrite,
            Resource::Clinics => Permission::ClinicsWrite,
            Resource::Doctors => Permission::DoctorsWrite,
            Resource::Nurses => Permission::NursesWrite,
            Resource::LabTechnicians | Resource::Users => Permission::UsersWrite,
            Resource::TreatmentRequests | Resource::LabRequests => Permission::RequestsWrite,
            Resource::Materials | Resource::Lots | Resource::Movements => {
                Permission::MaterialsWrite
            }
            Resource::Laborzettel => Permission::ReportsWrite,
            Resource::Options => Permission::OptionsWrite,
            Resource::Operations => Permission::OperationsWrite,
            Resource::Categories => Permission::CategoriesWrite,
            Resource::ActivityLogs => return None,
        };
        Some(permission)
    }

    pub fn is_read_only(&self) -> bool {
        self.write_permission().is_none()
    }

    /// Collections whose cached data embeds this one, and so must be
    /// refetched after a mutation here. The activity log is appended to by
    /// every mutation.
    pub fn dependents(&self) -> &'static [Resource] {
        match self {
            Resource::Patients => &[
                Resource::TreatmentRequests,
                Resource::LabRequests,
                Resource::Laborzettel,
                Resource::ActivityLogs,
            ],
            Resource::Clinics => &[
                Resource::Patients,
                Resource::Doctors,
                Resource::Nurses,
                Resource::Users,
                Resource::ActivityLogs,
            ],
            Resource::Doctors | Resource::Nurses => &[
                Resource::TreatmentRequests,
                Resource::LabRequests,
                Resource::ActivityLogs,
            ],
            Resource::LabTechnicians => &[
                Resource::LabRequests,
                Resource::Laborzettel,
                Resource::ActivityLogs,
            ],
            Resource::Users => &[
                Resource::Doctors,
                Resource::Nurses,
                Resource::LabTechnicians,
                Resource::ActivityLogs,
            ],
            Resource::TreatmentRequests => &[Resource::LabRequests, Resource::ActivityLogs],
            Resource::LabRequests => &[
                Resource::TreatmentRequests,
                Resource::Laborzettel,
                Resource::ActivityLogs,
            ],
            Resource::Materials => &[Resource::Lots, Resource::Movements, Resource::ActivityLogs],
            Resource::Lots => &[Resource::Materials, Resource::Movements, Resource::ActivityLogs],
            Resource::Movements => &[Resource::Materials, Resource::Lots, Resource::ActivityLogs],
            Resource::Laborzettel => &[Resource::LabRequests, Resource::ActivityLogs],
            Resource::Options | Resource::Operations | Resource::Categories => {
                &[Resource::ActivityLogs]
            }
            Resource::ActivityLogs => &[],
        }
    }

    /// Look up a resource by name. Accepts plural and singular forms with
    /// `-` or `_` separators, case-insensitively.
    pub fn from_name(name: &str) -> Result<Resource, UnknownResource> {
        let wanted = name.trim().to_ascii_lowercase().replace('_', "-");
        if let Some(resource) = Resource::ALL
            .iter()
            .find(|r| r.name() == wanted || r.singular() == wanted)
        {
            return Ok(*resource);
        }
        // "inventory/materials" style, as typed from the URL
        if let Some(resource) = Resource::ALL
            .iter()
            .find(|r| r.path().trim_start_matches('/') == wanted)
        {
            return Ok(*resource);
        }

        let suggestion = Resource::ALL
            .iter()
            .map(|r| (r.name(), strsim::jaro_winkler(&wanted, r.name())))
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(candidate, _)| candidate.to_string());

        Err(UnknownResource {
            name: name.to_string(),
            suggestion,
        })
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Resource {
    type Err = UnknownResource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::from_name(s)
    }
}

/// Returned for a resource name that is not in the table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown resource '{name}'{}", did_you_mean(.suggestion))]
pub struct UnknownResource {
    pub name: String,
    pub suggestion: Option<String>,
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{}'?)", s),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for resource in Resource::ALL {
            assert_eq!(Resource::from_name(resource.name()).unwrap(), resource);
            assert_eq!(Resource::from_name(resource.singular()).unwrap(), resource);
        }
    }

    #[test]
    fn test_name_variants() {
        assert_eq!(Resource::from_name("Lab_Technicians").unwrap(), Resource::LabTechnicians);
        assert_eq!(Resource::from_name("inventory/lots").unwrap(), Resource::Lots);
        assert_eq!(" patient ".parse::<Resource>().unwrap(), Resource::Patients);
    }

    #[test]
    fn test_suggestion() {
        let err = Resource::from_name("patiens").unwrap_err();
        assert_eq!(err.suggestion.as_deref(), Some("patients"));
        assert!(err.to_string().contains("did you mean 'patients'"));

        let err = Resource::from_name("zzzz").unwrap_err();
        assert_eq!(err.suggestion, None);
    }

    #[test]
    fn test_paths() {
        assert_eq!(Resource::Materials.path(), "/inventory/materials");
        assert_eq!(Resource::LabRequests.item_path(7), "/lab-requests/7");
    }

    #[test]
    fn test_activity_log_read_only() {
        assert!(Resource::ActivityLogs.is_read_only());
        assert_eq!(Resource::ActivityLogs.read_permission(), Permission::ReportsRead);
        assert!(Resource::ALL
            .iter()
            .filter(|r| **r != Resource::ActivityLogs)
            .all(|r| r.write_permission().is_some()));
    }

    #[test]
    fn test_dependents_never_self() {
        for resource in Resource::ALL {
            assert!(!resource.dependents().contains(&resource));
        }
    }
}
