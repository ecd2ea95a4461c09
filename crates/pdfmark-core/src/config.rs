use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MarkError, Result};

/// Root configuration, loaded from `~/.config/pdfmark/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkConfig {
    pub packet: PacketConfig,
}

/// Layout of serialized XMP packets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacketConfig {
    /// Bytes of trailing whitespace so the packet can be edited in place.
    pub padding: usize,
    /// Spaces per nesting level; 0 writes everything on one line.
    pub indent: usize,
    /// Marks the packet `end="w"` instead of `end="r"`.
    pub writable: bool,
    /// Value of `rdf:about` on each description block.
    pub about: String,
}

impl Default for PacketConfig {
    fn default() -> Self {
        Self {
            padding: 2048,
            indent: 2,
            writable: true,
            about: String::new(),
        }
    }
}

const MAX_INDENT: usize = 16;

impl MarkConfig {
    /// Standard config file path: `~/.config/pdfmark/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("PDFMARK_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("pdfmark")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.packet.indent > MAX_INDENT {
            return Err(MarkError::Config(format!(
                "packet.indent must be at most {MAX_INDENT}, got {}",
                self.packet.indent
            )));
        }
        Ok(())
    }
}
