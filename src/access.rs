//! Capability and edit mode
//!
//! The admin fact is resolved once and passed down explicitly; views only
//! ever see a [`ViewMode`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the current session may do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    #[default]
    Visitor,
    Admin,
}

impl Capability {
    pub fn is_admin(self) -> bool {
        self == Capability::Admin
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Visitor => write!(f, "visitor"),
            Capability::Admin => write!(f, "admin"),
        }
    }
}

/// How a content view renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    ReadOnly,
    Editable,
}

impl ViewMode {
    pub fn is_editable(self) -> bool {
        self == ViewMode::Editable
    }
}

/// Edit-mode switch owned by the app instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditMode {
    capability: Capability,
    enabled: bool,
}

impl EditMode {
    pub fn new(capability: Capability) -> Self {
        Self {
            capability,
            enabled: false,
        }
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Replace the capability; losing admin also leaves edit mode
    pub fn set_capability(&mut self, capability: Capability) {
        self.capability = capability;
        if !capability.is_admin() {
            self.enabled = false;
        }
    }

    /// Flip edit mode. Returns false (and does nothing) for visitors.
    pub fn toggle(&mut self) -> bool {
        if !self.capability.is_admin() {
            return false;
        }
        self.enabled = !self.enabled;
        true
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn view_mode(&self) -> ViewMode {
        if self.enabled {
            ViewMode::Editable
        } else {
            ViewMode::ReadOnly
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visitor_cannot_enable_edit_mode() {
        let mut mode = EditMode::new(Capability::Visitor);
        assert!(!mode.toggle());
        assert!(!mode.is_enabled());
        assert_eq!(mode.view_mode(), ViewMode::ReadOnly);
    }

    #[test]
    fn test_admin_toggles_edit_mode() {
        let mut mode = EditMode::new(Capability::Admin);
        assert!(mode.toggle());
        assert_eq!(mode.view_mode(), ViewMode::Editable);
        assert!(mode.toggle());
        assert_eq!(mode.view_mode(), ViewMode::ReadOnly);
    }

    #[test]
    fn test_losing_admin_leaves_edit_mode() {
        let mut mode = EditMode::new(Capability::Admin);
        mode.toggle();
        mode.set_capability(Capability::Visitor);
        assert!(!mode.is_enabled());
        assert_eq!(mode.capability(), Capability::Visitor);
    }
}
