/*!
 * Attack run configuration
 *
 * A single immutable snapshot of every tunable the orchestrator and the
 * real-time crack coordinator consult. Built once at startup (defaults,
 * optional JSON config file, CLI overrides) and passed by reference into
 * constructors instead of being read from ambient global state.
 */

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default budget of consecutive cracking-engine start failures before the
/// coordinator abandons a target.
pub const DEFAULT_MAX_ENGINE_ERRORS: u32 = 3;

/// Configuration snapshot for one attack run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackConfig {
    /// Wireless interface in monitor mode (e.g. "wlan0mon")
    pub interface: String,

    /// Scratch root: files under this directory may be deleted automatically.
    /// Files anywhere else are never removed by this tool.
    pub temp_dir: PathBuf,

    /// JSON file that accumulates crack results
    pub cracked_file: PathBuf,

    /// Enable the real-time cracking coordinator
    pub realtime: bool,

    /// Single wordlist for real-time cracking (takes precedence over the dir)
    pub realtime_wordlist_file: Option<PathBuf>,

    /// Directory of wordlists for real-time cracking, consumed in
    /// lexicographic order
    pub realtime_wordlist_dir: Option<PathBuf>,

    /// Extra raw options appended to the hashcat command line
    pub realtime_options: Vec<String>,

    /// Force CPU-only cracking
    pub realtime_force_cpu: bool,

    /// OpenCL device ids for GPU cracking (e.g. "1,2")
    pub realtime_gpu_devices: Option<String>,

    /// Consecutive engine start failures tolerated before giving up on a
    /// target
    pub max_engine_errors: u32,

    /// Path to the hashcat binary
    pub hashcat_path: PathBuf,

    /// Queue WPS Pixie-Dust attacks
    pub wps_pixie: bool,

    /// Queue WPS PIN attacks
    pub wps_pin: bool,

    /// Only run WPS attacks (skip PMKID and handshake capture)
    pub wps_only: bool,

    /// Only run PMKID attacks (skip WPS and handshake capture)
    pub pmkid_only: bool,

    /// Output verbosity, 0 = quiet narrative. At 3+ every engine status
    /// line is echoed.
    pub verbose: u8,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            interface: "wlan0".to_string(),
            temp_dir: std::env::temp_dir().join("wifistrike"),
            cracked_file: PathBuf::from("cracked.json"),
            realtime: false,
            realtime_wordlist_file: None,
            realtime_wordlist_dir: None,
            realtime_options: Vec::new(),
            realtime_force_cpu: false,
            realtime_gpu_devices: None,
            max_engine_errors: DEFAULT_MAX_ENGINE_ERRORS,
            hashcat_path: PathBuf::from("hashcat"),
            wps_pixie: true,
            wps_pin: false,
            wps_only: false,
            pmkid_only: false,
            verbose: 0,
        }
    }
}

impl AttackConfig {
    /// Load a configuration snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self, String> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;
        serde_json::from_str(&json)
            .map_err(|e| format!("Failed to parse config file {}: {}", path.display(), e))
    }

    /// True when `path` lives under the scratch root and is therefore
    /// eligible for automatic cleanup.
    pub fn is_scratch_path(&self, path: &Path) -> bool {
        let canonical_root = self
            .temp_dir
            .canonicalize()
            .unwrap_or_else(|_| self.temp_dir.clone());
        let canonical_path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        canonical_path.starts_with(&canonical_root)
    }

    /// Path helper for files inside the scratch root.
    pub fn temp_path(&self, name: &str) -> PathBuf {
        self.temp_dir.join(name)
    }
}
