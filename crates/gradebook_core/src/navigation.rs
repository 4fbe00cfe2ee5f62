//! Screen registry and navigation state.
//!
//! # Responsibility
//! - Track the single visible screen.
//! - Report which on-enter action a transition triggers.
//!
//! # Invariants
//! - Exactly one screen is visible at any time; `Home` at startup.
//! - Any screen may be shown from any screen; there is no back stack.
//! - Showing the already visible screen changes nothing and triggers nothing.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Named, mutually exclusive application screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Screen {
    #[default]
    Home,
    StudentDirectory,
    ClassManagement,
    CourseManagement,
    GradeEntry,
    Reports,
}

/// Side effect a screen runs when it becomes visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterAction {
    /// Reload the student directory with the active-only filter.
    ReloadDirectory,
}

impl Screen {
    pub const ALL: [Screen; 6] = [
        Self::Home,
        Self::StudentDirectory,
        Self::ClassManagement,
        Self::CourseManagement,
        Self::GradeEntry,
        Self::Reports,
    ];

    /// Stable screen name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::StudentDirectory => "students",
            Self::ClassManagement => "classes",
            Self::CourseManagement => "courses",
            Self::GradeEntry => "grades",
            Self::Reports => "reports",
        }
    }

    /// User-facing title.
    pub fn title(self) -> &'static str {
        match self {
            Self::Home => "Welcome",
            Self::StudentDirectory => "Manage Students",
            Self::ClassManagement => "Manage Classes",
            Self::CourseManagement => "Manage Courses",
            Self::GradeEntry => "Enter Grades",
            Self::Reports => "Generate Reports",
        }
    }

    /// On-enter side table.
    pub fn on_enter(self) -> Option<EnterAction> {
        match self {
            Self::StudentDirectory => Some(EnterAction::ReloadDirectory),
            _ => None,
        }
    }

    /// Whether the screen has working behavior behind it.
    pub fn is_implemented(self) -> bool {
        matches!(self, Self::Home | Self::StudentDirectory)
    }
}

impl Display for Screen {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown screen name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownScreen(pub String);

impl Display for UnknownScreen {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown screen `{}`", self.0)
    }
}

impl std::error::Error for UnknownScreen {}

impl FromStr for Screen {
    type Err = UnknownScreen;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|screen| screen.as_str() == normalized)
            .ok_or(UnknownScreen(normalized))
    }
}

/// Flat one-level navigation state machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigator {
    current: Screen,
}

impl Navigator {
    /// Starts on the home screen.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Screen {
        self.current
    }

    pub fn is_visible(&self, screen: Screen) -> bool {
        self.current == screen
    }

    /// Makes `screen` visible.
    ///
    /// Returns the on-enter action when this call changed the visible
    /// screen; `None` when `screen` was already visible.
    pub fn show(&mut self, screen: Screen) -> Option<EnterAction> {
        if self.current == screen {
            return None;
        }
        self.current = screen;
        screen.on_enter()
    }
}
