//! Role-aware site navigation.

use event_vibe_auth::Role;
use serde::Serialize;

/// One navigation link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavItem {
    /// Link text.
    pub title: &'static str,
    /// Target path.
    pub href: &'static str,
    /// Only shown to this role; `None` is shown to everyone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// The main navigation, in display order.
pub const MAIN_NAV: &[NavItem] = &[
    NavItem {
        title: "Explore",
        href: "/events",
        role: Some(Role::Participant),
    },
    NavItem {
        title: "Organize",
        href: "/organizer/dashboard",
        role: Some(Role::Organizer),
    },
    NavItem {
        title: "Features",
        href: "/features",
        role: None,
    },
    NavItem {
        title: "Demo",
        href: "/demo",
        role: None,
    },
    NavItem {
        title: "Contact",
        href: "/contact",
        role: None,
    },
];

/// Items visible to `role`; anonymous visitors see only public items.
#[must_use]
pub fn visible_items(role: Option<Role>) -> Vec<NavItem> {
    MAIN_NAV
        .iter()
        .filter(|item| item.role.is_none() || item.role == role)
        .copied()
        .collect()
}

/// Navigation payload for one visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    /// Visible links.
    pub items: Vec<NavItem>,
    /// Where "Dashboard" leads; absent for anonymous visitors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard: Option<&'static str>,
}

impl Navigation {
    /// Navigation for a visitor with `role`.
    #[must_use]
    pub fn for_role(role: Option<Role>) -> Self {
        Self {
            items: visible_items(role),
            dashboard: role.map(Role::dashboard_path),
        }
    }
}
