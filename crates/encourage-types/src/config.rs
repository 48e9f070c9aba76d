//! Configuration for an encouragement contract instance.

use std::net::{Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};

use crate::{Amount, EncourageError, Messages, Result, constants};

/// Terms a contract is started with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Basic and premium encouragement texts.
    pub messages: Messages,
    /// Allocation keyword tips are escrowed under.
    pub tip_keyword: String,
    /// Minimum tip, in whole units, that earns the premium message.
    pub premium_threshold: u64,
    /// Connection front door. `None` means no listener is set up.
    pub listener: Option<ListenerConfig>,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            messages: Messages::default(),
            tip_keyword: constants::TIP_KEYWORD.to_string(),
            premium_threshold: constants::DEFAULT_PREMIUM_THRESHOLD,
            listener: None,
        }
    }
}

impl ContractConfig {
    /// Parse and validate a JSON config document.
    ///
    /// # Errors
    /// Returns [`EncourageError::Configuration`] on malformed or invalid input.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| EncourageError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    /// Returns [`EncourageError::Configuration`] if a message or the keyword is
    /// empty, or the premium threshold is zero.
    pub fn validate(&self) -> Result<()> {
        if self.messages.basic.trim().is_empty() || self.messages.premium.trim().is_empty() {
            return Err(EncourageError::Configuration(
                "encouragement messages must not be empty".into(),
            ));
        }
        if self.tip_keyword.trim().is_empty() {
            return Err(EncourageError::Configuration(
                "tip keyword must not be empty".into(),
            ));
        }
        if self.premium_threshold == 0 {
            return Err(EncourageError::Configuration(
                "premium threshold must be at least one unit".into(),
            ));
        }
        Ok(())
    }

    /// The threshold as an [`Amount`].
    #[must_use]
    pub fn premium_threshold_amount(&self) -> Amount {
        Amount::of(self.premium_threshold)
    }
}

/// Where the connection front door listens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerConfig {
    pub listen_addr: SocketAddr,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, constants::DEFAULT_LISTEN_PORT)),
        }
    }
}
