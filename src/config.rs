/*!
Runtime configuration.

The only machine-wide knob is the emulated clock speed: the number of
`step()` calls that make up one emulated second. Devices scale every
time-based behavior (clock ticks, display power-up, floppy seeks, line
display rotation) by it.
*/

use crate::error::ConfigError;

/// Default emulated clock speed in cycles per second.
pub const DEFAULT_CLOCK_SPEED: u32 = 100_000;

const CLOCK_SPEED_ENV: &str = "SATURN_CLOCK_SPEED";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Cycles per emulated second. Always non-zero.
    pub clock_speed: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clock_speed: DEFAULT_CLOCK_SPEED,
        }
    }
}

impl Config {
    /// Configuration with an explicit clock speed (clamped to at least 1).
    pub fn with_clock_speed(clock_speed: u32) -> Self {
        Self {
            clock_speed: clock_speed.max(1),
        }
    }

    /// Read configuration from the process environment, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CLOCK_SPEED_ENV) {
            Ok(raw) => Self::parse_clock_speed(&raw).map(Self::with_clock_speed),
            Err(_) => Ok(Self::default()),
        }
    }

    fn parse_clock_speed(raw: &str) -> Result<u32, ConfigError> {
        match raw.trim().parse::<u32>() {
            Ok(0) | Err(_) => Err(ConfigError::InvalidEnv(CLOCK_SPEED_ENV)),
            Ok(v) => Ok(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_clock_speed() {
        assert_eq!(Config::default().clock_speed, DEFAULT_CLOCK_SPEED);
    }

    #[test]
    fn clock_speed_parsing() {
        assert_eq!(Config::parse_clock_speed(" 60 "), Ok(60));
        assert_eq!(
            Config::parse_clock_speed("0"),
            Err(ConfigError::InvalidEnv(CLOCK_SPEED_ENV))
        );
        assert_eq!(
            Config::parse_clock_speed("fast"),
            Err(ConfigError::InvalidEnv(CLOCK_SPEED_ENV))
        );
    }

    #[test]
    fn explicit_clock_speed_is_never_zero() {
        assert_eq!(Config::with_clock_speed(0).clock_speed, 1);
    }
}
