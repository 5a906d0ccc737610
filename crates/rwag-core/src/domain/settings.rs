//! The persisted user settings record.
//!
//! Stored as `SettingsConfigs.json` with PascalCase keys:
//!
//! ```json
//! {
//!   "AppColorTheme": "Dark",
//!   "BackgroundImagePath": "",
//!   "BackgroundImageStretch": "UniformToFill",
//!   "BackgroundType": "BingWallpaper"
//! }
//! ```
//!
//! Missing keys fall back to their defaults, but *unknown* keys are rejected.
//! That is what turns a renamed field into a parse failure, which in turn
//! lets the config store run a migration instead of silently dropping the
//! user's value.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::migration::mapping::{ConversionError, MigrationPlan, TypeMapping};

/// Colour theme of the application window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AppTheme {
    /// Follow the operating system setting.
    #[default]
    System,
    Light,
    Dark,
}

/// What is drawn behind the application pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BackgroundType {
    /// The theme's own page background.
    None,
    /// A local image picked by the user.
    Image,
    /// The remote wallpaper of the day.
    #[default]
    BingWallpaper,
}

/// How a background image is scaled to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Stretch {
    None,
    Fill,
    Uniform,
    #[default]
    UniformToFill,
}

impl AppTheme {
    pub const ALL: [AppTheme; 3] = [AppTheme::System, AppTheme::Light, AppTheme::Dark];

    /// Position in the settings page selector (and the numeric value older
    /// releases wrote to disk).
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Inverse of [`ordinal`](Self::ordinal); out-of-range values map to
    /// `None`.
    pub fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::ALL.get(ordinal).copied()
    }
}

impl BackgroundType {
    pub const ALL: [BackgroundType; 3] = [
        BackgroundType::None,
        BackgroundType::Image,
        BackgroundType::BingWallpaper,
    ];

    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::ALL.get(ordinal).copied()
    }
}

impl Stretch {
    pub const ALL: [Stretch; 4] = [
        Stretch::None,
        Stretch::Fill,
        Stretch::Uniform,
        Stretch::UniformToFill,
    ];

    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::ALL.get(ordinal).copied()
    }
}

/// The user settings as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default, deny_unknown_fields)]
pub struct SettingsRecord {
    pub app_color_theme: AppTheme,
    pub background_type: BackgroundType,
    /// Absolute path of the user's background image; empty when none was
    /// picked.
    pub background_image_path: String,
    pub background_image_stretch: Stretch,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self {
            app_color_theme: AppTheme::System,
            background_type: BackgroundType::BingWallpaper,
            background_image_path: String::new(),
            background_image_stretch: Stretch::UniformToFill,
        }
    }
}

/// Names of the observable settings, as carried by change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsProperty {
    AppColorTheme,
    BackgroundType,
    BackgroundImagePath,
    BackgroundImageStretch,
}

impl SettingsProperty {
    pub const ALL: [SettingsProperty; 4] = [
        SettingsProperty::AppColorTheme,
        SettingsProperty::BackgroundType,
        SettingsProperty::BackgroundImagePath,
        SettingsProperty::BackgroundImageStretch,
    ];

    /// The JSON key / property name.
    pub fn name(self) -> &'static str {
        match self {
            SettingsProperty::AppColorTheme => "AppColorTheme",
            SettingsProperty::BackgroundType => "BackgroundType",
            SettingsProperty::BackgroundImagePath => "BackgroundImagePath",
            SettingsProperty::BackgroundImageStretch => "BackgroundImageStretch",
        }
    }
}

impl fmt::Display for SettingsProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Migration plan for settings files written by earlier releases, which
/// stored the three enums as their numeric values.
///
/// Each converter turns an in-range number into the variant name and leaves
/// strings alone, so running the plan over an up-to-date file changes
/// nothing.
pub fn legacy_settings_plan() -> MigrationPlan {
    MigrationPlan::new().with_types(
        TypeMapping::new()
            .convert(SettingsProperty::AppColorTheme.name(), |v| {
                ordinal_to_name(v, AppTheme::from_ordinal)
            })
            .convert(SettingsProperty::BackgroundType.name(), |v| {
                ordinal_to_name(v, BackgroundType::from_ordinal)
            })
            .convert(SettingsProperty::BackgroundImageStretch.name(), |v| {
                ordinal_to_name(v, Stretch::from_ordinal)
            }),
    )
}

fn ordinal_to_name<T, F>(value: &Value, from_ordinal: F) -> Result<Value, ConversionError>
where
    T: Serialize,
    F: Fn(usize) -> Option<T>,
{
    match value {
        Value::String(_) => Ok(value.clone()),
        Value::Number(n) => {
            let variant = n
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .and_then(from_ordinal)
                .ok_or_else(|| ConversionError::Unsupported(value.clone()))?;
            serde_json::to_value(variant).map_err(|e| ConversionError::Custom(e.to_string()))
        }
        other => Err(ConversionError::Unsupported(other.clone())),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
