// Core library modules
pub mod attack;
pub mod deps;
pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod realtime;
pub mod result;
pub mod target;
pub mod toolkit;
pub mod wordlist;

// Re-exports
pub use attack::{
    build_strategy_queue, AttackKind, AttackStrategy, AttackTools, CaptureArtifact, WpsCredentials,
};
pub use deps::{command_exists, ToolCapabilities};
pub use engine::{
    parse_outfile_password, CrackEngine, CrackSession, HashType, HashcatEngine, HashcatSession,
    SessionOutput,
};
pub use error::{InvalidTargetError, StrategyError};
pub use orchestrator::{AttackOrchestrator, InterruptChoice, Prompter, StdinPrompter};
pub use realtime::RealtimeCrackManager;
pub use result::CrackResultRecord;
pub use target::{parse_scan_csv, Encryption, Target, WifiStandard, WpsState};
pub use toolkit::{parse_aircrack_key, parse_reaver_output, SystemTools};
pub use wordlist::load_wordlist_queue;
