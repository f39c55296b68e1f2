/*!
 * Command-line interface
 *
 * Flags override values from the optional JSON config file, which in turn
 * overrides the built-in defaults.
 */

use clap::Parser;
use std::path::PathBuf;

use crate::config::AttackConfig;

#[derive(Parser, Debug)]
#[command(
    name = "wifistrike",
    version,
    about = "Automated wireless AP attack orchestrator with real-time cracking"
)]
pub struct Cli {
    /// airodump-ng CSV export listing the targets to attack
    #[arg(short, long)]
    pub scan_file: PathBuf,

    /// Monitor-mode wireless interface
    #[arg(short, long)]
    pub interface: Option<String>,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Crack captured hashes in real time while attacks continue
    #[arg(long)]
    pub realtime: bool,

    /// Single wordlist for real-time cracking
    #[arg(short, long)]
    pub wordlist: Option<PathBuf>,

    /// Directory of wordlists, consumed in lexicographic order
    #[arg(long)]
    pub wordlist_dir: Option<PathBuf>,

    /// Path to the hashcat binary
    #[arg(long)]
    pub hashcat: Option<PathBuf>,

    /// Extra option passed through to hashcat (repeatable)
    #[arg(long = "hashcat-option", allow_hyphen_values = true)]
    pub hashcat_options: Vec<String>,

    /// Force CPU-only cracking
    #[arg(long)]
    pub force_cpu: bool,

    /// OpenCL GPU device ids, e.g. "1,2"
    #[arg(long)]
    pub gpu_devices: Option<String>,

    /// Scratch directory for captures and cracking artifacts
    #[arg(long)]
    pub temp_dir: Option<PathBuf>,

    /// JSON file crack results are appended to
    #[arg(long)]
    pub cracked_file: Option<PathBuf>,

    /// Also run WPS PIN brute-force attacks
    #[arg(long)]
    pub wps_pin: bool,

    /// Skip WPS Pixie-Dust attacks
    #[arg(long)]
    pub no_wps_pixie: bool,

    /// Only run WPS attacks
    #[arg(long, conflicts_with = "pmkid_only")]
    pub wps_only: bool,

    /// Only run PMKID attacks
    #[arg(long)]
    pub pmkid_only: bool,

    /// Consecutive engine start failures tolerated per target
    #[arg(long)]
    pub max_engine_errors: Option<u32>,

    /// Increase verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Fold defaults, config file, and flags into one snapshot.
    pub fn into_config(self) -> Result<AttackConfig, String> {
        let mut config = match &self.config {
            Some(path) => AttackConfig::load(path)?,
            None => AttackConfig::default(),
        };

        if let Some(interface) = self.interface {
            config.interface = interface;
        }
        if self.realtime {
            config.realtime = true;
        }
        if let Some(wordlist) = self.wordlist {
            config.realtime_wordlist_file = Some(wordlist);
        }
        if let Some(dir) = self.wordlist_dir {
            config.realtime_wordlist_dir = Some(dir);
        }
        if let Some(hashcat) = self.hashcat {
            config.hashcat_path = hashcat;
        }
        if !self.hashcat_options.is_empty() {
            config.realtime_options = self.hashcat_options;
        }
        if self.force_cpu {
            config.realtime_force_cpu = true;
        }
        if let Some(devices) = self.gpu_devices {
            config.realtime_gpu_devices = Some(devices);
        }
        if let Some(dir) = self.temp_dir {
            config.temp_dir = dir;
        }
        if let Some(file) = self.cracked_file {
            config.cracked_file = file;
        }
        if self.wps_pin {
            config.wps_pin = true;
        }
        if self.no_wps_pixie {
            config.wps_pixie = false;
        }
        if self.wps_only {
            config.wps_only = true;
        }
        if self.pmkid_only {
            config.pmkid_only = true;
        }
        if let Some(budget) = self.max_engine_errors {
            config.max_engine_errors = budget;
        }
        config.verbose = self.verbose;

        Ok(config)
    }
}
