// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{CmdexecError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = CmdexecError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.defaults, raw.helper))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_defaults(cfg)?;
    validate_helper(cfg)?;
    Ok(())
}

fn validate_defaults(cfg: &RawConfigFile) -> Result<()> {
    if cfg.defaults.max_buffer == 0 {
        return Err(CmdexecError::ConfigError(
            "[defaults].max_buffer must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_helper(cfg: &RawConfigFile) -> Result<()> {
    if let Some(path) = &cfg.helper.path {
        if path.as_os_str().is_empty() {
            return Err(CmdexecError::ConfigError(
                "[helper].path must not be empty when set".to_string(),
            ));
        }
    }
    Ok(())
}
