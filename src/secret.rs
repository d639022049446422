//! API key references resolved at client construction time.

use serde::{Deserialize, Serialize};

use crate::error::{LexfuseError, Result};

/// Where an API key comes from.
///
/// ```toml
/// [llm.api_key]
/// type = "env"
/// var = "YANDEX_API_KEY"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SecretRef {
    /// No API key.
    #[default]
    None,
    /// Inline literal key (discouraged; use env/command when possible).
    Literal { value: String },
    /// Resolve the key from an environment variable.
    Env { var: String },
    /// Resolve the key by running a local shell command.
    Command { cmd: String },
}

impl SecretRef {
    /// Resolve to the key value, or `None` when no key is configured.
    ///
    /// # Errors
    ///
    /// Returns [`LexfuseError::Config`] if the variable is missing or empty,
    /// or if the command fails or prints nothing.
    pub fn resolve(&self) -> Result<Option<String>> {
        match self {
            Self::None => Ok(None),
            Self::Literal { value } => Ok(Some(value.clone())),
            Self::Env { var } => {
                let value = std::env::var(var).map_err(|_| {
                    LexfuseError::Config(format!("secret env var is missing: {var}"))
                })?;
                if value.trim().is_empty() {
                    return Err(LexfuseError::Config(format!(
                        "secret env var is empty: {var}"
                    )));
                }
                Ok(Some(value))
            }
            Self::Command { cmd } => {
                if cmd.trim().is_empty() {
                    return Err(LexfuseError::Config("secret command is empty".to_owned()));
                }
                let output = std::process::Command::new("/bin/sh")
                    .arg("-c")
                    .arg(cmd)
                    .output()
                    .map_err(|e| LexfuseError::Config(format!("failed to run secret command: {e}")))?;

                if !output.status.success() {
                    return Err(LexfuseError::Config(format!(
                        "secret command failed with status {}",
                        output
                            .status
                            .code()
                            .map_or_else(|| "unknown".to_owned(), |c| c.to_string())
                    )));
                }

                let value = String::from_utf8_lossy(&output.stdout).trim().to_owned();
                if value.is_empty() {
                    return Err(LexfuseError::Config(
                        "secret command returned empty output".to_owned(),
                    ));
                }
                Ok(Some(value))
            }
        }
    }

    /// Like [`resolve`](Self::resolve), but a missing key is an error.
    ///
    /// # Errors
    ///
    /// Returns [`LexfuseError::Config`] naming `what` when no key is
    /// configured, or any error from [`resolve`](Self::resolve).
    pub fn require(&self, what: &str) -> Result<String> {
        self.resolve()?
            .ok_or_else(|| LexfuseError::Config(format!("{what} requires an API key")))
    }
}
