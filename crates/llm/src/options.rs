//! Sampling options for a completion

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Default completion token budget.
pub const DEFAULT_MAX_TOKENS: u32 = 512;

/// Default stop sequence.
///
/// A blank line ends the reply, which keeps single-turn answers from
/// rambling into a fake follow-up exchange.
pub const DEFAULT_STOP: &str = "\n\n";

/// Sampling options for a completion
///
/// Every field has a serde default, so a partial config map such as
/// `{"temperature": 0.2}` deserializes cleanly.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Options {
    /// Sampling temperature, in `[0, 1]`
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// The maximum number of tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sequences that end generation
    #[serde(default = "default_stop_sequences")]
    pub stop_sequences: BTreeSet<String>,
}

impl Options {
    /// Create options with the given temperature
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Create options with the given token budget
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Create options with the given stop sequences
    pub fn with_stop(mut self, stop: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.stop_sequences = stop.into_iter().map(Into::into).collect();
        self
    }

    /// Check the bounds, returning the first violation.
    ///
    /// Rejected requests must not reach the collaborator, so the session
    /// calls this before any history write.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(format!(
                "temperature {} out of range [0, 1]",
                self.temperature
            ));
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be positive".into());
        }
        Ok(())
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            stop_sequences: default_stop_sequences(),
        }
    }
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_stop_sequences() -> BTreeSet<String> {
    BTreeSet::from([DEFAULT_STOP.to_owned()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = Options::default();
        assert_eq!(options.temperature, 0.7);
        assert_eq!(options.max_tokens, 512);
        assert_eq!(options.stop_sequences, BTreeSet::from(["\n\n".to_owned()]));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let options: Options = serde_json::from_str(r#"{"temperature": 0.2}"#).unwrap();
        assert_eq!(options.temperature, 0.2);
        assert_eq!(options.max_tokens, 512);
        assert!(options.stop_sequences.contains("\n\n"));
    }

    #[test]
    fn builders_apply() {
        let options = Options::default()
            .with_temperature(0.0)
            .with_max_tokens(64)
            .with_stop(["###"]);
        assert_eq!(options.temperature, 0.0);
        assert_eq!(options.max_tokens, 64);
        assert_eq!(options.stop_sequences, BTreeSet::from(["###".to_owned()]));
    }

    #[test]
    fn temperature_out_of_range_rejected() {
        assert!(Options::default().with_temperature(1.5).validate().is_err());
        assert!(Options::default().with_temperature(-0.1).validate().is_err());
        assert!(Options::default().with_temperature(1.0).validate().is_ok());
        assert!(Options::default().with_temperature(0.0).validate().is_ok());
    }

    #[test]
    fn zero_max_tokens_rejected() {
        assert!(Options::default().with_max_tokens(0).validate().is_err());
    }
}
