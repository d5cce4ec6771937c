//! Break categories, statistics tags and custom break definitions.
//!
//! Three categories (regular, micro, water) have exactly one schedule each and
//! live in [`Config`](crate::libs::config::Config). `Custom` is only a tag:
//! every user-defined break carries its own schedule in a [`CustomBreak`] and
//! is keyed by its id.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use uuid::Uuid;

pub const MIN_CUSTOM_INTERVAL: u64 = 60;
pub const MAX_CUSTOM_INTERVAL: u64 = 43_200;
pub const MIN_CUSTOM_DURATION: u64 = 1;
pub const MAX_CUSTOM_DURATION: u64 = 3_600;

pub const DEFAULT_CUSTOM_ICON: &str = "star";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BreakCategory {
    Regular,
    Micro,
    Water,
    Custom,
}

impl BreakCategory {
    /// Categories with a fixed schedule of their own.
    pub const SCHEDULED: [BreakCategory; 3] = [BreakCategory::Regular, BreakCategory::Micro, BreakCategory::Water];

    pub fn is_schedulable(self) -> bool {
        self != BreakCategory::Custom
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BreakCategory::Regular => "regular",
            BreakCategory::Micro => "micro",
            BreakCategory::Water => "water",
            BreakCategory::Custom => "custom",
        }
    }

    /// Overlay headline. Custom breaks show their own name instead.
    pub fn title(self) -> &'static str {
        match self {
            BreakCategory::Regular => "Look away from the screen",
            BreakCategory::Micro => "Blink and check posture!",
            BreakCategory::Water => "Take a sip of water",
            BreakCategory::Custom => "Custom break",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            BreakCategory::Regular | BreakCategory::Micro => "eye",
            BreakCategory::Water => "drop",
            BreakCategory::Custom => DEFAULT_CUSTOM_ICON,
        }
    }
}

impl Display for BreakCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistics tag of a break. Custom breaks are counted by display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakTag {
    Regular,
    Micro,
    Water,
    Custom(String),
}

impl BreakTag {
    pub fn category(&self) -> BreakCategory {
        match self {
            BreakTag::Regular => BreakCategory::Regular,
            BreakTag::Micro => BreakCategory::Micro,
            BreakTag::Water => BreakCategory::Water,
            BreakTag::Custom(_) => BreakCategory::Custom,
        }
    }

    pub fn custom_name(&self) -> Option<&str> {
        match self {
            BreakTag::Custom(name) => Some(name),
            _ => None,
        }
    }

    /// Tag for one of the scheduled categories. `None` for `Custom`, which needs a name.
    pub fn for_category(category: BreakCategory) -> Option<BreakTag> {
        match category {
            BreakCategory::Regular => Some(BreakTag::Regular),
            BreakCategory::Micro => Some(BreakTag::Micro),
            BreakCategory::Water => Some(BreakTag::Water),
            BreakCategory::Custom => None,
        }
    }

    /// Rebuilds a tag from its stored columns.
    pub fn from_parts(category: &str, custom_name: Option<String>) -> Option<BreakTag> {
        match category {
            "regular" => Some(BreakTag::Regular),
            "micro" => Some(BreakTag::Micro),
            "water" => Some(BreakTag::Water),
            "custom" => Some(BreakTag::Custom(custom_name.unwrap_or_default())),
            _ => None,
        }
    }
}

impl Display for BreakTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BreakTag::Custom(name) => write!(f, "custom({})", name),
            other => f.write_str(other.category().as_str()),
        }
    }
}

/// A user-defined break with its own cadence.
///
/// `interval` and `duration` are seconds and are always stored clamped, see
/// [`normalize_custom_break`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomBreak {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    pub interval: u64,
    pub duration: u64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl CustomBreak {
    pub fn new(name: impl Into<String>, icon: impl Into<String>, interval: u64, duration: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            icon: icon.into(),
            interval,
            duration,
            enabled: true,
        }
    }

    pub fn tag(&self) -> BreakTag {
        BreakTag::Custom(self.name.clone())
    }

    /// Icon shown on the overlay, falling back to the star when none was picked.
    pub fn display_icon(&self) -> &str {
        if self.icon.trim().is_empty() {
            DEFAULT_CUSTOM_ICON
        } else {
            &self.icon
        }
    }
}

/// Clamps interval to 60..=43200 s and duration to 1..=3600 s.
///
/// Returns the clamped definition and whether anything changed. Normalizing
/// an already normalized definition returns it unchanged with `false`.
pub fn normalize_custom_break(definition: CustomBreak) -> (CustomBreak, bool) {
    let interval = definition.interval.clamp(MIN_CUSTOM_INTERVAL, MAX_CUSTOM_INTERVAL);
    let duration = definition.duration.clamp(MIN_CUSTOM_DURATION, MAX_CUSTOM_DURATION);
    let adjusted = interval != definition.interval || duration != definition.duration;

    (CustomBreak { interval, duration, ..definition }, adjusted)
}
