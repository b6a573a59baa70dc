// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::exec::EngineDefaults;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [defaults]
/// max_buffer = 20971520
/// strip_final_newline = false
/// reject = false
///
/// [helper]
/// path = "/usr/local/bin/cmdexec-helper"
/// ```
///
/// All sections are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    /// Engine defaults from `[defaults]`. Callers may still override these
    /// per request.
    #[serde(default)]
    pub defaults: EngineDefaults,

    /// Where to find the blocking helper binary, from `[helper]`.
    #[serde(default)]
    pub helper: HelperSection,
}

/// `[helper]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HelperSection {
    /// Explicit path to the `cmdexec-helper` binary.
    ///
    /// If `None`, `CMDEXEC_HELPER_PATH` and then the directory of the current
    /// executable are tried.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Validated configuration. Construct via `ConfigFile::try_from(raw)` or
/// [`crate::config::load_and_validate`].
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub defaults: EngineDefaults,
    pub helper: HelperSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(defaults: EngineDefaults, helper: HelperSection) -> Self {
        Self { defaults, helper }
    }
}
