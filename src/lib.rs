/*!
 * wifistrike library
 *
 * Automated wireless AP attack orchestration with an opportunistic
 * real-time cracking session running alongside capture work.
 */

pub mod cli;
pub mod config;
pub mod core;

pub use crate::config::AttackConfig;
pub use crate::core::{
    AttackOrchestrator, CrackResultRecord, RealtimeCrackManager, Target, ToolCapabilities,
};
