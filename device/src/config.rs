use clap::Parser;
use common::{Mark, PlayMode};
use std::fmt;
use std::path::PathBuf;

/// Runs a phone and a wearable side by side over an in-memory data layer,
/// driven by script lines on stdin.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// Play both marks on each device and never message the peer
    #[arg(long)]
    pub hot_seat: bool,

    /// Directory for the daily rolling JSON log
    #[arg(long, default_value = "./logs")]
    pub log_dir: PathBuf,

    /// Filter directive for the log, e.g. `info` or `device=debug`
    #[arg(long, default_value = "info")]
    pub log_filter: String,

    /// Print snapshots as JSON instead of a drawn board
    #[arg(long)]
    pub json: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Role {
    // The phone
    Primary,
    // The wearable
    Companion,
}

impl Role {
    pub fn local_mark(self) -> Mark {
        match self {
            Role::Primary => Mark::O,
            Role::Companion => Mark::X,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Primary => write!(f, "primary"),
            Role::Companion => write!(f, "companion"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceConfig {
    pub role: Role,
    pub mode: PlayMode,
    // Tell the peer to reset when the local player resets
    pub broadcast_reset: bool,
    // Send the end-of-game status text to the peer
    pub announce_outcome: bool,
}

impl DeviceConfig {
    pub fn primary() -> Self {
        DeviceConfig {
            role: Role::Primary,
            mode: PlayMode::Paired {
                local: Role::Primary.local_mark(),
            },
            broadcast_reset: true,
            announce_outcome: false,
        }
    }

    pub fn companion() -> Self {
        DeviceConfig {
            role: Role::Companion,
            mode: PlayMode::Paired {
                local: Role::Companion.local_mark(),
            },
            broadcast_reset: true,
            announce_outcome: true,
        }
    }

    pub fn hot_seat(role: Role) -> Self {
        DeviceConfig {
            role,
            mode: PlayMode::HotSeat,
            broadcast_reset: false,
            announce_outcome: false,
        }
    }

    pub fn for_role(role: Role, hot_seat: bool) -> Self {
        match (role, hot_seat) {
            (_, true) => DeviceConfig::hot_seat(role),
            (Role::Primary, false) => DeviceConfig::primary(),
            (Role::Companion, false) => DeviceConfig::companion(),
        }
    }

    pub fn is_paired(&self) -> bool {
        matches!(self.mode, PlayMode::Paired { .. })
    }
}
