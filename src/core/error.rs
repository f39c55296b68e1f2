/*!
 * Error taxonomy for the attack core
 *
 * Everything here is recoverable at some level: an invalid target is
 * discarded, a failed strategy yields to the next one in the queue, and a
 * cracking-engine spawn failure is charged against the coordinator's error
 * budget. The only globally fatal path is an explicit user abort, which is
 * modeled as a return value rather than an error.
 */

use thiserror::Error;

/// A scan record that does not describe a real, attackable access point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTargetError {
    #[error("target has no channel (-1 sentinel)")]
    NoChannel,

    #[error("broadcast BSSID {0} is a scanner artifact")]
    BroadcastBssid(String),

    #[error("multicast BSSID {0} is a scanner artifact")]
    MulticastBssid(String),

    #[error("malformed scan record: {0}")]
    MalformedRecord(String),
}

/// A single attack strategy failed or was interrupted. Failures are logged
/// and the next queued strategy is tried; interrupts bubble up to the
/// orchestrator's prompt.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("attack execution failed: {0}")]
    Execution(String),

    #[error("required tool missing: {0}")]
    MissingTool(String),

    #[error("interrupted by user")]
    Interrupted,
}

impl StrategyError {
    pub fn is_interrupt(&self) -> bool {
        matches!(self, StrategyError::Interrupted)
    }
}
