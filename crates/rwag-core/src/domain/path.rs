//! Config path validation.
//!
//! Every config read or write goes through [`PathValidator`] before the file
//! system is touched. A path is accepted only when it is absolute,
//! well-formed for the platform, and safe to hand to another process.
//!
//! # Two levels of checking
//!
//! - [`PathValidator::is_path_invalid`] is the cheap *basic* check: syntax,
//!   length, device prefixes, and whether an *existing* root volume is ready.
//!   A root that does not exist at all passes this check.
//! - [`PathValidator::is_valid_path`] is the *strict* check used by the
//!   config store. It runs the basic check, additionally requires the root to
//!   exist, and inspects every path segment (reserved device names and
//!   trailing dots/spaces on Windows, leading hyphens on POSIX).
//!
//! # Platform rules
//!
//! The rules are selected by [`Platform`], not by `cfg!`, so the Windows rule
//! set can be exercised from a Linux test run and vice versa.
//! [`PathValidator::new`] picks the host platform.
//!
//! # Encoding
//!
//! Windows paths must be valid Unicode; anything else is rejected as
//! [`PathRejection::NotUnicode`]. POSIX paths are arbitrary bytes, so there
//! invalid UTF-8 sequences are checked in their lossy form (each one reads as
//! `U+FFFD`, which no rule rejects). The POSIX length limit is then counted
//! on that lossy form, which can only overstate the length.

use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

/// Maximum path length accepted on Windows (classic `MAX_PATH`).
pub const WINDOWS_MAX_PATH: usize = 260;

/// Maximum path length accepted on POSIX hosts (`PATH_MAX` on Linux).
pub const POSIX_MAX_PATH: usize = 4096;

/// Device names Windows reserves in every directory, compared
/// case-insensitively against the extension-stripped segment.
const WINDOWS_RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Characters that may never appear in a Windows path (`:` is handled
/// separately because it is legal as the drive designator).
const WINDOWS_ILLEGAL_CHARS: [char; 6] = ['<', '>', '"', '|', '?', '*'];

/// Raw device / long-path prefixes rejected on Windows.
const WINDOWS_DEVICE_PREFIXES: [&str; 2] = [r"\\.\", r"\\?\"];

/// Which rule set the validator applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Drive letters or UNC roots, `\` and `/` separators, reserved names.
    Windows,
    /// Single `/` root, `/` separator, no leading-hyphen segments.
    Posix,
}

impl Platform {
    /// Returns the rule set matching the host operating system.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }
}

/// State of the volume a path is rooted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootState {
    /// The root exists and can be read.
    Ready,
    /// The root exists but cannot currently be used (e.g. an empty card
    /// reader or a disconnected network share).
    NotReady,
    /// No such root on this machine.
    Missing,
}

/// Answers whether a path root is usable.
///
/// The production implementation is [`SystemVolumeProbe`]; tests inject a
/// fixed answer.
pub trait VolumeProbe: Send + Sync {
    /// Classifies `root` (e.g. `"C:\"`, `"\\server\share"` or `"/"`).
    fn root_state(&self, root: &str) -> RootState;
}

/// [`VolumeProbe`] backed by `std::fs::metadata`.
///
/// A `NotFound` error means the root is missing; any other error (for
/// example `ERROR_NOT_READY` from an empty drive) means it exists but is not
/// ready.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemVolumeProbe;

impl VolumeProbe for SystemVolumeProbe {
    fn root_state(&self, root: &str) -> RootState {
        match std::fs::metadata(root) {
            Ok(meta) if meta.is_dir() => RootState::Ready,
            Ok(_) => RootState::NotReady,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => RootState::Missing,
            Err(e) => {
                warn!(root, error = %e, "volume probe failed; treating root as not ready");
                RootState::NotReady
            }
        }
    }
}

/// Why a path was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathRejection {
    #[error("path is not valid unicode")]
    NotUnicode,
    #[error("path contains a control character")]
    ControlCharacter,
    #[error("path is empty or whitespace")]
    Empty,
    #[error("path contains illegal character {0:?}")]
    IllegalCharacter(char),
    #[error("path is not fully qualified")]
    NotFullyQualified,
    #[error("path is {len} characters long (max {max})")]
    TooLong { len: usize, max: usize },
    #[error("raw device and long-path prefixes are not allowed")]
    DevicePrefix,
    #[error("root volume {0} is not ready")]
    RootNotReady(String),
    #[error("root volume {0} does not exist")]
    RootMissing(String),
    #[error("segment {0:?} ends with a dot or a space")]
    TrailingDotOrSpace(String),
    #[error("segment {0:?} is a reserved device name")]
    ReservedName(String),
    #[error("segment {0:?} starts with a hyphen")]
    LeadingHyphen(String),
}

/// Validates config file locations.
///
/// Cheap to clone; the probe is shared.
#[derive(Clone)]
pub struct PathValidator {
    platform: Platform,
    probe: Arc<dyn VolumeProbe>,
}

impl std::fmt::Debug for PathValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathValidator")
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}

impl Default for PathValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl PathValidator {
    /// Host platform rules with the real volume probe.
    pub fn new() -> Self {
        Self::with_probe(Platform::current(), Arc::new(SystemVolumeProbe))
    }

    /// Explicit rule set and probe.
    pub fn with_probe(platform: Platform, probe: Arc<dyn VolumeProbe>) -> Self {
        Self { platform, probe }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Strict check. Returns `true` when the path may be used as a config
    /// file location.
    ///
    /// Rejections are logged at debug level; the check never panics.
    pub fn is_valid_path(&self, path: impl AsRef<Path>) -> bool {
        match self.check(path.as_ref()) {
            Ok(()) => true,
            Err(reason) => {
                debug!(path = %path.as_ref().display(), %reason, "path rejected");
                false
            }
        }
    }

    /// Basic check, in the negative sense: `true` means the path is
    /// *invalid*.
    ///
    /// Unlike [`is_valid_path`](Self::is_valid_path), a root that does not
    /// exist is not a reason for rejection here, and segments are not
    /// inspected.
    pub fn is_path_invalid(&self, path: impl AsRef<Path>) -> bool {
        self.check_basic(path.as_ref()).is_err()
    }

    /// Strict check with the rejection reason.
    pub fn check(&self, path: &Path) -> Result<(), PathRejection> {
        let text = self.path_text(path)?;
        let root = self.check_syntax(&text)?;
        match self.probe.root_state(root) {
            RootState::Ready => {}
            RootState::NotReady => return Err(PathRejection::RootNotReady(root.to_string())),
            RootState::Missing => return Err(PathRejection::RootMissing(root.to_string())),
        }
        self.check_segments(&text)
    }

    /// Basic check with the rejection reason.
    pub fn check_basic(&self, path: &Path) -> Result<(), PathRejection> {
        let text = self.path_text(path)?;
        let root = self.check_syntax(&text)?;
        match self.probe.root_state(root) {
            RootState::NotReady => Err(PathRejection::RootNotReady(root.to_string())),
            RootState::Ready | RootState::Missing => Ok(()),
        }
    }

    fn path_text<'a>(&self, path: &'a Path) -> Result<Cow<'a, str>, PathRejection> {
        match self.platform {
            Platform::Windows => path.to_str().map(Cow::Borrowed).ok_or(PathRejection::NotUnicode),
            Platform::Posix => Ok(path.to_string_lossy()),
        }
    }

    /// Everything that can be decided from the string alone. Returns the
    /// root slice for the volume probe.
    fn check_syntax<'a>(&self, path: &'a str) -> Result<&'a str, PathRejection> {
        if path.chars().any(char::is_control) {
            return Err(PathRejection::ControlCharacter);
        }
        if path.trim().is_empty() {
            return Err(PathRejection::Empty);
        }

        match self.platform {
            Platform::Windows => {
                // Checked first: `\\?\C:\...` would otherwise trip the
                // illegal-character rule and hide the real reason.
                if WINDOWS_DEVICE_PREFIXES.iter().any(|p| path.starts_with(p)) {
                    return Err(PathRejection::DevicePrefix);
                }
                if let Some(c) = windows_illegal_char(path) {
                    return Err(PathRejection::IllegalCharacter(c));
                }
                // Windows counts UTF-16 code units.
                let len = path.encode_utf16().count();
                if len > WINDOWS_MAX_PATH {
                    return Err(PathRejection::TooLong {
                        len,
                        max: WINDOWS_MAX_PATH,
                    });
                }
                windows_root(path).ok_or(PathRejection::NotFullyQualified)
            }
            Platform::Posix => {
                if path.len() > POSIX_MAX_PATH {
                    return Err(PathRejection::TooLong {
                        len: path.len(),
                        max: POSIX_MAX_PATH,
                    });
                }
                if path.starts_with('/') {
                    Ok("/")
                } else {
                    Err(PathRejection::NotFullyQualified)
                }
            }
        }
    }

    fn check_segments(&self, path: &str) -> Result<(), PathRejection> {
        match self.platform {
            Platform::Windows => {
                for segment in path.split(['\\', '/']).filter(|s| !s.is_empty()) {
                    if segment.ends_with('.') || segment.ends_with(' ') {
                        return Err(PathRejection::TrailingDotOrSpace(segment.to_string()));
                    }
                    let stem = match segment.rfind('.') {
                        Some(idx) => &segment[..idx],
                        None => segment,
                    };
                    if WINDOWS_RESERVED_NAMES
                        .iter()
                        .any(|name| name.eq_ignore_ascii_case(stem))
                    {
                        return Err(PathRejection::ReservedName(segment.to_string()));
                    }
                }
            }
            Platform::Posix => {
                for segment in path.split('/').filter(|s| !s.is_empty()) {
                    if segment.starts_with('-') {
                        return Err(PathRejection::LeadingHyphen(segment.to_string()));
                    }
                }
            }
        }
        Ok(())
    }
}

/// First character that can never appear in a Windows path. A `:` is only
/// legal at index 1 of a drive-letter path.
fn windows_illegal_char(path: &str) -> Option<char> {
    let has_drive = has_drive_letter(path);
    path.char_indices().find_map(|(idx, c)| {
        if WINDOWS_ILLEGAL_CHARS.contains(&c) || (c == ':' && !(has_drive && idx == 1)) {
            Some(c)
        } else {
            None
        }
    })
}

fn has_drive_letter(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn is_separator(b: u8) -> bool {
    b == b'\\' || b == b'/'
}

/// Root of a fully qualified Windows path: `X:\` for drive paths or
/// `\\server\share` for UNC paths. `None` for relative and drive-relative
/// (`C:foo`) paths.
fn windows_root(path: &str) -> Option<&str> {
    let bytes = path.as_bytes();

    if has_drive_letter(path) {
        return if bytes.len() >= 3 && is_separator(bytes[2]) {
            Some(&path[..3])
        } else {
            None
        };
    }

    if bytes.len() >= 2 && is_separator(bytes[0]) && is_separator(bytes[1]) {
        let rest = &path[2..];
        let server_end = rest.find(['\\', '/'])?;
        if server_end == 0 {
            return None;
        }
        let after_server = &rest[server_end + 1..];
        let share_len = after_server.find(['\\', '/']).unwrap_or(after_server.len());
        if share_len == 0 {
            return None;
        }
        return Some(&path[..2 + server_end + 1 + share_len]);
    }

    None
}

// ── Tests ─────────────────────────────────────────────────────────────────────
