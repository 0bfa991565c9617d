//! Route table: URL paths to pages, with per-page access requirements.

use std::fmt;

use crate::access;
use crate::api::Resource;
use crate::models::{Permission, Role};
use crate::session::{Session, TokenStore};

/// Roles that work the lab screens.
pub const LAB_ROLES: &[Role] = &[Role::Superadmin, Role::LabTechnician];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Login,
    Dashboard,
    Profile,
    List(Resource),
    Detail(Resource, i64),
    Create(Resource),
    Edit(Resource, i64),
}

/// What a user needs to open a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Reachable without logging in.
    pub public: bool,
    /// Allowed roles; empty means any role.
    pub roles: &'static [Role],
    pub permissions: Vec<Permission>,
}

impl Requirement {
    fn public() -> Self {
        Self {
            public: true,
            roles: &[],
            permissions: Vec::new(),
        }
    }

    fn authenticated() -> Self {
        Self {
            public: false,
            roles: &[],
            permissions: Vec::new(),
        }
    }

    /// Whether an authenticated user with `role` satisfies the role and
    /// permission parts.
    pub fn is_met_by(&self, role: Option<Role>) -> bool {
        let role_ok = self.roles.is_empty() || role.is_some_and(|r| access::has_role(r, self.roles));
        role_ok && access::role_has_permission(role, &self.permissions)
    }
}

/// Outcome of the route guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    Allow,
    RedirectToLogin,
    Forbidden,
}

fn is_lab_resource(resource: Resource) -> bool {
    matches!(
        resource,
        Resource::LabRequests
            | Resource::Laborzettel
            | Resource::Materials
            | Resource::Lots
            | Resource::Movements
    )
}

impl Page {
    pub fn path(&self) -> String {
        match self {
            Page::Login => "/login".to_string(),
            Page::Dashboard => "/".to_string(),
            Page::Profile => "/profile".to_string(),
            Page::List(r) => r.path().to_string(),
            Page::Detail(r, id) => r.item_path(*id),
            Page::Create(r) => format!("{}/new", r.path()),
            Page::Edit(r, id) => format!("{}/edit", r.item_path(*id)),
        }
    }

    pub fn resource(&self) -> Option<Resource> {
        match self {
            Page::List(r) | Page::Detail(r, _) | Page::Create(r) | Page::Edit(r, _) => Some(*r),
            _ => None,
        }
    }

    fn is_mutation(&self) -> bool {
        matches!(self, Page::Create(_) | Page::Edit(..))
    }

    pub fn requirement(&self) -> Requirement {
        let resource = match self {
            Page::Login => return Requirement::public(),
            Page::Dashboard | Page::Profile => return Requirement::authenticated(),
            _ => match self.resource() {
                Some(resource) => resource,
                None => return Requirement::authenticated(),
            },
        };

        if is_lab_resource(resource) {
            return Requirement {
                public: false,
                roles: LAB_ROLES,
                permissions: Vec::new(),
            };
        }

        let permission = if self.is_mutation() {
            resource.write_permission()
        } else {
            Some(resource.read_permission())
        };
        Requirement {
            public: false,
            roles: &[],
            permissions: permission.into_iter().collect(),
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Strip query, fragment and trailing slash.
pub fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Page for a URL path, `None` when nothing matches.
pub fn resolve(path: &str) -> Option<Page> {
    let path = normalize_path(path);
    match path {
        "/" => return Some(Page::Dashboard),
        "/login" => return Some(Page::Login),
        "/profile" => return Some(Page::Profile),
        "/inventory" => return Some(Page::List(Resource::Materials)),
        _ => {}
    }

    // Longest collection path first, so "/inventory/lots/3" is not taken
    // for a lot-less "/inventory".
    let mut candidates: Vec<Resource> = Resource::ALL.to_vec();
    candidates.sort_by_key(|r| std::cmp::Reverse(r.path().len()));

    for resource in candidates {
        let rest = match path.strip_prefix(resource.path()) {
            Some(rest) => rest,
            None => continue,
        };
        if rest.is_empty() {
            return Some(Page::List(resource));
        }
        let rest = match rest.strip_prefix('/') {
            Some(rest) => rest,
            None => continue,
        };
        let segments: Vec<&str> = rest.split('/').collect();
        return match segments.as_slice() {
            ["new"] if !resource.is_read_only() => Some(Page::Create(resource)),
            [id] => id.parse().ok().map(|id| Page::Detail(resource, id)),
            [id, "edit"] if !resource.is_read_only() => {
                id.parse().ok().map(|id| Page::Edit(resource, id))
            }
            _ => None,
        };
    }
    None
}

/// Guard a page for the given session.
pub fn authorize<S: TokenStore>(page: &Page, session: &Session<S>) -> Guard {
    guard(page, session.is_authenticated(), session.role())
}

/// [`authorize`] over plain session facts.
pub fn guard(page: &Page, authenticated: bool, role: Option<Role>) -> Guard {
    let requirement = page.requirement();
    if requirement.public {
        return Guard::Allow;
    }
    if !authenticated {
        return Guard::RedirectToLogin;
    }
    if requirement.is_met_by(role) {
        Guard::Allow
    } else {
        Guard::Forbidden
    }
}
