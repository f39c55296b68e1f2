/*!
 * External tool detection
 *
 * Probes the system once at startup for the binaries each attack class
 * needs. The orchestrator reads the resulting capability flags to decide
 * which strategies can be queued and which advisories to print.
 */

use colored::Colorize;
use std::process::{Command, Stdio};

/// Capability flags for the external toolchain.
#[derive(Debug, Clone, Default)]
pub struct ToolCapabilities {
    /// reaver present: WPS Pixie-Dust and PIN attacks possible
    pub wps: bool,
    /// aircrack-ng suite present: WEP attacks and handshake capture
    pub aircrack: bool,
    /// hcxdumptool + hcxpcapngtool present: PMKID capture possible
    pub pmkid: bool,
    /// hashcat present: real-time and foreground dictionary cracking
    pub hashcat: bool,
}

/// True when `name` resolves to an executable on PATH.
pub fn command_exists(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

impl ToolCapabilities {
    /// Probe the system for every tool the attack classes depend on.
    pub fn detect() -> Self {
        Self {
            wps: command_exists("reaver"),
            aircrack: command_exists("aircrack-ng") && command_exists("airodump-ng"),
            pmkid: command_exists("hcxdumptool") && command_exists("hcxpcapngtool"),
            hashcat: command_exists("hashcat"),
        }
    }

    /// Print advisories for missing optional tooling. Missing tools shrink
    /// the strategy queue; they never abort the run.
    pub fn print_advisories(&self) {
        if !self.wps {
            println!(
                "{} reaver not found, skipping WPS attacks on WPS-capable targets",
                "[!]".yellow()
            );
        }
        if !self.pmkid {
            println!(
                "{} hcxdumptool/hcxpcapngtool not found, skipping PMKID capture",
                "[!]".yellow()
            );
        }
        if !self.hashcat {
            println!(
                "{} hashcat not found, captured hashes will not be cracked",
                "[!]".yellow()
            );
        }
    }
}
