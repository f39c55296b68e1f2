/*!
 * Attack strategies
 *
 * One strategy is one attack type bound to one target, with a uniform
 * `run()` contract. The orchestrator decides queueing order from the kind
 * tag only; execution mechanics are shared. Capture and WPS tooling sit
 * behind the `AttackTools` trait so the whole layer runs against mocks in
 * tests.
 */

use colored::Colorize;
use std::path::PathBuf;

use crate::config::AttackConfig;
use crate::core::engine::HashType;
use crate::core::error::StrategyError;
use crate::core::realtime::RealtimeCrackManager;
use crate::core::result::CrackResultRecord;
use crate::core::target::Target;

/// Hash artifact produced by the capture subsystem.
#[derive(Debug, Clone)]
pub struct CaptureArtifact {
    pub hash_file: PathBuf,
    pub hash_type: HashType,
}

/// Credentials recovered by a WPS attack.
#[derive(Debug, Clone)]
pub struct WpsCredentials {
    pub pin: Option<String>,
    pub psk: Option<String>,
}

/// Boundary to the capture/attack tooling (airodump, hcxdumptool, reaver).
///
/// Every method is blocking for the duration of one attack phase and
/// returns `Ok(None)` when the attack completed without a result.
/// Implementations return `StrategyError::Interrupted` when the user hit
/// Ctrl+C mid-attack.
pub trait AttackTools {
    /// Attempt WEP key recovery. Returns the hex key on success.
    fn crack_wep(&self, target: &Target) -> Result<Option<String>, StrategyError>;

    /// Capture a PMKID record for the target.
    fn capture_pmkid(&self, target: &Target) -> Result<Option<CaptureArtifact>, StrategyError>;

    /// Capture a four-way handshake and convert it for cracking.
    fn capture_handshake(&self, target: &Target)
        -> Result<Option<CaptureArtifact>, StrategyError>;

    /// Dictionary-crack a captured artifact in the foreground. Used only
    /// when no real-time coordinator is running.
    fn crack_hash_blocking(
        &self,
        target: &Target,
        artifact: &CaptureArtifact,
    ) -> Result<Option<String>, StrategyError>;

    /// WPS Pixie-Dust attack.
    fn run_wps_pixie(&self, target: &Target) -> Result<Option<WpsCredentials>, StrategyError>;

    /// WPS PIN brute-force attack.
    fn run_wps_pin(&self, target: &Target) -> Result<Option<WpsCredentials>, StrategyError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackKind {
    Wep,
    WpaHandshake,
    Pmkid,
    WpsPixieDust,
    WpsPin,
}

impl AttackKind {
    pub fn label(&self) -> &'static str {
        match self {
            AttackKind::Wep => "WEP",
            AttackKind::WpaHandshake => "WPA",
            AttackKind::Pmkid => "PMKID",
            AttackKind::WpsPixieDust => "WPS Pixie-Dust",
            AttackKind::WpsPin => "WPS PIN",
        }
    }
}

pub struct AttackStrategy {
    pub kind: AttackKind,
    pub target: Target,
    pub success: bool,
    pub crack_result: Option<CrackResultRecord>,
}

impl AttackStrategy {
    pub fn new(kind: AttackKind, target: &Target) -> Self {
        Self {
            kind,
            target: target.clone(),
            success: false,
            crack_result: None,
        }
    }

    /// Execute the attack. On success, `self.success` is set and
    /// `self.crack_result` carries the recovered credential. A captured
    /// hash that is not cracked on the spot is handed to the real-time
    /// coordinator instead; that is not a strategy success by itself.
    pub fn run(
        &mut self,
        tools: &dyn AttackTools,
        realtime: Option<&mut RealtimeCrackManager>,
    ) -> Result<bool, StrategyError> {
        println!(
            "{} {} attack against {} ({})",
            "[+]".green(),
            self.kind.label().cyan(),
            self.target.bssid.cyan(),
            self.target.display_essid()
        );
        match self.kind {
            AttackKind::Wep => self.run_wep(tools),
            AttackKind::Pmkid => self.run_capture(tools, realtime, AttackKind::Pmkid),
            AttackKind::WpaHandshake => self.run_capture(tools, realtime, AttackKind::WpaHandshake),
            AttackKind::WpsPixieDust | AttackKind::WpsPin => self.run_wps(tools),
        }
    }

    fn run_wep(&mut self, tools: &dyn AttackTools) -> Result<bool, StrategyError> {
        if let Some(key) = tools.crack_wep(&self.target)? {
            self.record_success(&key, "WEP", None);
            return Ok(true);
        }
        Ok(false)
    }

    fn run_capture(
        &mut self,
        tools: &dyn AttackTools,
        realtime: Option<&mut RealtimeCrackManager>,
        kind: AttackKind,
    ) -> Result<bool, StrategyError> {
        if kind == AttackKind::WpaHandshake && self.target.encryption.is_wpa3() {
            // SAE has no four-way handshake to capture
            println!(
                "{} {} uses WPA3-SAE, skipping handshake capture",
                "[!]".yellow(),
                self.target.bssid.cyan()
            );
            return Ok(false);
        }

        let artifact = match kind {
            AttackKind::Pmkid => tools.capture_pmkid(&self.target)?,
            _ => tools.capture_handshake(&self.target)?,
        };
        let artifact = match artifact {
            Some(a) => a,
            None => {
                println!(
                    "{} No {} captured for {}",
                    "[!]".red(),
                    self.kind.label(),
                    self.target.bssid.cyan()
                );
                return Ok(false);
            }
        };

        if let Some(manager) = realtime {
            // Hand the hash to the coordinator and move on; cracking
            // continues in the background while other attacks run
            manager.start_target_session(
                &self.target.bssid,
                self.target.essid.as_deref(),
                &artifact.hash_file,
                artifact.hash_type,
            );
            return Ok(false);
        }

        if let Some(password) = tools.crack_hash_blocking(&self.target, &artifact)? {
            let label = self.kind.label().to_string();
            self.record_success(&password, &label, Some(&artifact));
            return Ok(true);
        }
        Ok(false)
    }

    fn run_wps(&mut self, tools: &dyn AttackTools) -> Result<bool, StrategyError> {
        let creds = match self.kind {
            AttackKind::WpsPixieDust => tools.run_wps_pixie(&self.target)?,
            _ => tools.run_wps_pin(&self.target)?,
        };
        if let Some(creds) = creds {
            let key = creds
                .psk
                .or(creds.pin)
                .unwrap_or_else(|| "(unknown)".to_string());
            self.record_success(&key, "WPS", None);
            return Ok(true);
        }
        Ok(false)
    }

    fn record_success(&mut self, key: &str, label: &str, artifact: Option<&CaptureArtifact>) {
        println!(
            "{} Cracked {} ({}): {}",
            "[+]".green(),
            self.target.bssid.cyan(),
            self.target.display_essid(),
            key.red().bold()
        );
        self.success = true;
        self.crack_result = Some(CrackResultRecord::new(
            &self.target.bssid,
            self.target.essid.as_deref(),
            artifact.map(|a| a.hash_file.as_path()),
            key,
            label,
        ));
    }
}

/// Build the ordered strategy queue for one target.
///
/// WEP targets get a single WEP strategy. WPA-family targets get WPS
/// strategies first (when enabled, supported, and not WPA3-only), then
/// PMKID, then handshake capture, subject to the wps-only/pmkid-only
/// restrictions. Open/OWE targets get nothing.
pub fn build_strategy_queue(
    target: &Target,
    config: &AttackConfig,
    wps_toolchain_available: bool,
) -> Vec<AttackStrategy> {
    let mut queue = Vec::new();

    if target.encryption == crate::core::target::Encryption::Wep {
        queue.push(AttackStrategy::new(AttackKind::Wep, target));
        return queue;
    }

    if !target.encryption.is_wpa_family() {
        return queue;
    }

    let wps_applicable = wps_toolchain_available
        && target.wps_possible()
        && !target.encryption.is_wpa3()
        && !config.pmkid_only;
    if wps_applicable {
        if config.wps_pixie {
            queue.push(AttackStrategy::new(AttackKind::WpsPixieDust, target));
        }
        if config.wps_pin {
            queue.push(AttackStrategy::new(AttackKind::WpsPin, target));
        }
    }

    if !config.wps_only {
        queue.push(AttackStrategy::new(AttackKind::Pmkid, target));
        if !config.pmkid_only {
            queue.push(AttackStrategy::new(AttackKind::WpaHandshake, target));
        }
    }

    queue
}
