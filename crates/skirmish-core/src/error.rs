//! Error types for the simulation core.
//!
//! The tick itself never fails: stale references, exhausted placement and
//! full populations are all handled as no-ops or reschedules. Errors only
//! surface at the edges, when a configuration is loaded or a player joins.

use thiserror::Error;

use crate::actor::PowerUpKind;

/// A configuration that cannot drive a simulation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed into a [`GameConfig`](crate::config::GameConfig).
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Arena dimensions must be positive and finite.
    #[error("arena size {width}x{height} must be positive")]
    ArenaSize {
        /// Configured width.
        width: f32,
        /// Configured height.
        height: f32,
    },

    /// The tick rate must be non-zero.
    #[error("tick rate must be non-zero")]
    TickRate,

    /// More players than the color palette can distinguish.
    #[error("max_players {max_players} must be between 1 and {palette}")]
    MaxPlayers {
        /// Configured player cap.
        max_players: usize,
        /// Size of the color palette.
        palette: usize,
    },

    /// A player-count-indexed table has no entries.
    #[error("table `{0}` must not be empty")]
    EmptyTable(&'static str),

    /// The asteroid hp table must cover every asteroid type.
    #[error("asteroid table `{name}` needs {required} entries, got {got}")]
    AsteroidTable {
        /// Table name.
        name: &'static str,
        /// Required length.
        required: usize,
        /// Actual length.
        got: usize,
    },

    /// The same power-up kind was configured twice.
    #[error("power-up slot {0:?} configured more than once")]
    DuplicateSlot(PowerUpKind),

    /// A bomb must pulse at least once.
    #[error("bomb pulse count must be at least 1")]
    BombPulses,
}

/// Reasons a player cannot enter the arena.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    /// All player slots are taken.
    #[error("arena is full ({max_players} players)")]
    ArenaFull {
        /// The configured cap.
        max_players: usize,
    },

    /// Players must carry a visible name.
    #[error("player name must not be empty")]
    EmptyName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_render_readably() {
        let err = ConfigError::MaxPlayers {
            max_players: 9,
            palette: 7,
        };
        assert_eq!(err.to_string(), "max_players 9 must be between 1 and 7");

        let err = ConfigError::DuplicateSlot(PowerUpKind::Bomb);
        assert!(err.to_string().contains("Bomb"));
    }

    #[test]
    fn parse_errors_convert() {
        let parse = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: ConfigError = parse.into();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn join_error_display() {
        let err = JoinError::ArenaFull { max_players: 5 };
        assert_eq!(err.to_string(), "arena is full (5 players)");
    }
}
