//! Configuration loading and validation for the service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any variable is present but invalid.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use sensitive::{
    AlgorithmMode, GeneratedKeySupply, KeyKind, KeyPair, KeySupply, SecretKey, StaticKeySupply,
};
use tracing::warn;

/// Validated service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Algorithm code used for new encryptions (`GM` or `MODERN`).
    #[serde(default = "default_active_mode")]
    pub active_mode: String,

    /// base64url 32-byte key for the Modern suite.
    #[serde(default)]
    pub modern_key: Option<String>,

    /// base64url 16-byte SM4 key for the GM suite.
    #[serde(default)]
    pub gm_encryption_key: Option<String>,

    /// base64url 32-byte HMAC-SM3 key for the GM suite.
    #[serde(default)]
    pub gm_mac_key: Option<String>,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// OTLP endpoint. Span export is disabled when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,
}

fn default_active_mode() -> String {
    AlgorithmMode::Modern.code().into()
}
fn default_listen_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        self.active_mode()?;
        if self.listen_port == 0 {
            anyhow::bail!("LISTEN_PORT must be > 0");
        }
        self.configured_pairs()?;
        Ok(())
    }

    /// The parsed `ACTIVE_MODE`.
    pub fn active_mode(&self) -> Result<AlgorithmMode> {
        AlgorithmMode::from_code(self.active_mode.trim()).context("ACTIVE_MODE is invalid")
    }

    /// Build the key supply: configured keys if any are set, otherwise
    /// process-local generated keys.
    pub fn key_supply(&self) -> Result<Arc<dyn KeySupply>> {
        match self.configured_pairs()? {
            Some(supply) => Ok(Arc::new(supply)),
            None => {
                warn!("no key variables set; falling back to generated keys");
                Ok(Arc::new(GeneratedKeySupply::new()))
            }
        }
    }

    /// Decode whichever keys are set. `None` if no key variable is set.
    fn configured_pairs(&self) -> Result<Option<StaticKeySupply>> {
        let modern = decode_key(&self.modern_key, KeyKind::ModernEncryption, "MODERN_KEY")?;
        let gm_enc = decode_key(&self.gm_encryption_key, KeyKind::GmEncryption, "GM_ENCRYPTION_KEY")?;
        let gm_mac = decode_key(&self.gm_mac_key, KeyKind::GmMac, "GM_MAC_KEY")?;

        if modern.is_none() && gm_enc.is_none() && gm_mac.is_none() {
            return Ok(None);
        }

        let mut supply = StaticKeySupply::new();
        if let Some(key) = modern {
            supply = supply.with_pair(AlgorithmMode::Modern, KeyPair::modern(key));
        }
        if gm_enc.is_some() || gm_mac.is_some() {
            supply = supply.with_pair(AlgorithmMode::Gm, KeyPair::new(gm_enc, gm_mac));
        }
        Ok(Some(supply))
    }
}

fn decode_key(value: &Option<String>, kind: KeyKind, name: &str) -> Result<Option<SecretKey>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(encoded) => SecretKey::from_base64(kind, encoded)
            .map(Some)
            .with_context(|| format!("{name} is invalid")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Config {
        Config {
            active_mode: default_active_mode(),
            modern_key: None,
            gm_encryption_key: None,
            gm_mac_key: None,
            listen_port: default_listen_port(),
            log_level: default_log_level(),
            otel_exporter_otlp_endpoint: None,
        }
    }

    // 32 and 16 bytes of 0x01, base64url without padding.
    const KEY_32: &str = "AQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQE";
    const KEY_16: &str = "AQEBAQEBAQEBAQEBAQEBAQ";

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_active_mode(), "MODERN");
        assert_eq!(default_listen_port(), 8080);
        assert_eq!(default_log_level(), "info");
        assert!(base().validate().is_ok());
    }

    #[test]
    fn validate_rejects_unknown_mode() {
        let cfg = Config {
            active_mode: "modern".into(),
            ..base()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_port() {
        let cfg = Config {
            listen_port: 0,
            ..base()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_wrong_key_length() {
        let cfg = Config {
            gm_encryption_key: Some(KEY_32.into()),
            ..base()
        };
        let err = cfg.validate().unwrap_err();
        assert!(format!("{err:#}").contains("GM_ENCRYPTION_KEY"));
    }

    #[test]
    fn validate_rejects_bad_encoding() {
        let cfg = Config {
            modern_key: Some("not base64!".into()),
            ..base()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn no_keys_means_generated_supply() {
        let cfg = Config {
            modern_key: Some("  ".into()),
            ..base()
        };
        assert!(cfg.configured_pairs().unwrap().is_none());
        let supply = cfg.key_supply().unwrap();
        assert!(supply.pair_for(AlgorithmMode::Gm).unwrap().mac_key().is_some());
    }

    #[test]
    fn configured_keys_are_used() {
        let cfg = Config {
            modern_key: Some(KEY_32.into()),
            gm_encryption_key: Some(KEY_16.into()),
            gm_mac_key: Some(KEY_32.into()),
            ..base()
        };
        let supply = cfg.configured_pairs().unwrap().unwrap();
        assert_eq!(supply.modes(), vec![AlgorithmMode::Gm, AlgorithmMode::Modern]);

        let gm = supply.pair_for(AlgorithmMode::Gm).unwrap();
        assert_eq!(gm.encryption_key().unwrap().as_bytes(), &[1u8; 16]);
        assert_eq!(gm.mac_key().unwrap().as_bytes(), &[1u8; 32]);
    }

    #[test]
    fn partial_keys_leave_other_mode_empty() {
        let cfg = Config {
            modern_key: Some(KEY_32.into()),
            ..base()
        };
        let supply = cfg.key_supply().unwrap();
        let gm = supply.pair_for(AlgorithmMode::Gm).unwrap();
        assert!(gm.encryption_key().is_none());
        assert!(gm.mac_key().is_none());
    }
}
