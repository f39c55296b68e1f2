/*!
 * Cracking-engine boundary
 *
 * The coordinator drives an external hashcat process through two small
 * traits: `CrackEngine` launches a session, `CrackSession` is the handle
 * to one running process bound to one hash file and one wordlist.
 *
 * The real implementation spawns hashcat in its own process group so the
 * whole group can be signaled on teardown, and drains its output through
 * background reader threads feeding channels, keeping every status check
 * non-blocking.
 */

use colored::Colorize;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::config::AttackConfig;

/// Hashcat mode tag for a captured artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashType {
    /// PMKID record (hashcat -m 16800)
    Pmkid,
    /// Four-way handshake converted to hccapx (hashcat -m 2500)
    Hccapx,
}

impl HashType {
    pub fn mode(&self) -> u32 {
        match self {
            HashType::Pmkid => 16800,
            HashType::Hccapx => 2500,
        }
    }

    /// Attack label recorded with a real-time crack result.
    pub fn realtime_label(&self) -> &'static str {
        match self {
            HashType::Pmkid => "PMKID-Realtime",
            HashType::Hccapx => "WPA-Realtime",
        }
    }
}

/// Buffered process output drained during one poll.
#[derive(Debug, Default)]
pub struct SessionOutput {
    pub status_lines: Vec<String>,
    pub error_lines: Vec<String>,
}

/// Handle to one running cracking process.
pub trait CrackSession {
    fn target_bssid(&self) -> &str;
    fn hash_file_path(&self) -> &Path;
    fn wordlist_path(&self) -> &Path;

    /// Drain any buffered stdout/stderr without blocking.
    fn drain_output(&mut self) -> SessionOutput;

    /// Check the result artifact for a recovered credential.
    fn cracked_password(&self) -> Option<String>;

    /// True once the process has exited.
    fn is_complete(&mut self) -> bool;

    /// Terminate the process (graceful, then forced) and remove the
    /// session's own output/pot artifacts. Never touches the hash file.
    fn shutdown(&mut self);
}

/// Launcher for cracking sessions.
pub trait CrackEngine {
    /// Spawn a cracking process for one (hash file, wordlist) pair.
    /// Returns `None` when the process cannot be started; the caller
    /// counts that against its error budget.
    fn start_session(
        &self,
        target_bssid: &str,
        hash_file: &Path,
        hash_type: HashType,
        wordlist: &Path,
    ) -> Option<Box<dyn CrackSession>>;
}

/// Parse a hashcat outfile line (`hash[:salt...]:password`). Colons inside
/// the password cannot be distinguished from field separators, so the last
/// field is taken as the password.
pub fn parse_outfile_password(outfile: &Path) -> Option<String> {
    let contents = std::fs::read_to_string(outfile).ok()?;
    let line = contents.lines().find(|l| !l.trim().is_empty())?;
    let password = line.rsplit(':').next()?.trim();
    if password.is_empty() {
        None
    } else {
        Some(password.to_string())
    }
}

/// Real hashcat launcher.
pub struct HashcatEngine {
    config: AttackConfig,
}

impl HashcatEngine {
    pub fn new(config: &AttackConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn build_command(
        &self,
        hash_file: &Path,
        hash_type: HashType,
        wordlist: &Path,
        outfile: &Path,
        potfile: &Path,
        session_name: &str,
    ) -> Command {
        let mut cmd = Command::new(&self.config.hashcat_path);
        cmd.arg("-m")
            .arg(hash_type.mode().to_string())
            .arg(hash_file)
            .arg(wordlist)
            .arg("--outfile")
            .arg(outfile)
            .arg("--potfile-path")
            .arg(potfile)
            .arg("--status")
            .arg("--status-timer")
            .arg("5")
            .arg("--session")
            .arg(session_name);

        for opt in &self.config.realtime_options {
            cmd.arg(opt);
        }
        if self.config.realtime_force_cpu {
            cmd.arg("--force").arg("--opencl-device-types").arg("1");
        } else if let Some(devices) = &self.config.realtime_gpu_devices {
            cmd.arg("--opencl-device-types").arg("2");
            cmd.arg("--opencl-device-ids").arg(devices);
        }
        cmd
    }
}

impl CrackEngine for HashcatEngine {
    fn start_session(
        &self,
        target_bssid: &str,
        hash_file: &Path,
        hash_type: HashType,
        wordlist: &Path,
    ) -> Option<Box<dyn CrackSession>> {
        if !hash_file.exists() {
            println!(
                "{} Hash file not found: {}",
                "[!]".red(),
                hash_file.display()
            );
            return None;
        }
        if !wordlist.exists() {
            println!("{} Wordlist not found: {}", "[!]".red(), wordlist.display());
            return None;
        }
        if let Err(e) = std::fs::create_dir_all(&self.config.temp_dir) {
            println!("{} Cannot create scratch directory: {}", "[!]".red(), e);
            return None;
        }

        let safe_bssid = target_bssid.replace(':', "").to_lowercase();
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let session_name = format!("wifistrike_realtime_{}_{}", safe_bssid, stamp);
        let outfile = self.config.temp_path(&format!("{}.out", session_name));
        let potfile = self.config.temp_path(&format!("{}.pot", session_name));

        let mut cmd = self.build_command(
            hash_file,
            hash_type,
            wordlist,
            &outfile,
            &potfile,
            &session_name,
        );
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        // Own process group so teardown can signal hashcat and any children
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                println!("{} Failed to start hashcat: {}", "[!]".red(), e);
                return None;
            }
        };

        println!(
            "{} Starting hashcat session {} for {}",
            "[+]".green(),
            session_name.cyan(),
            target_bssid.cyan()
        );

        let stdout_rx = child.stdout.take().map(spawn_line_reader);
        let stderr_rx = child.stderr.take().map(spawn_line_reader);

        Some(Box::new(HashcatSession {
            child,
            target_bssid: target_bssid.to_string(),
            hash_file_path: hash_file.to_path_buf(),
            wordlist_path: wordlist.to_path_buf(),
            outfile_path: outfile,
            potfile_path: potfile,
            stdout_rx,
            stderr_rx,
        }))
    }
}

/// Forward lines from a child pipe into a channel so polls never block.
fn spawn_line_reader<R: std::io::Read + Send + 'static>(pipe: R) -> Receiver<String> {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let reader = BufReader::new(pipe);
        for line in reader.lines().map_while(Result::ok) {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn drain_channel(rx: &Option<Receiver<String>>, out: &mut Vec<String>) {
    if let Some(rx) = rx {
        loop {
            match rx.try_recv() {
                Ok(line) => out.push(line.trim().to_string()),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }
}

/// One running hashcat process.
pub struct HashcatSession {
    child: Child,
    target_bssid: String,
    hash_file_path: PathBuf,
    wordlist_path: PathBuf,
    outfile_path: PathBuf,
    potfile_path: PathBuf,
    stdout_rx: Option<Receiver<String>>,
    stderr_rx: Option<Receiver<String>>,
}

impl HashcatSession {
    fn signal_group(&self, signal: i32) -> Result<(), String> {
        let pid = self.child.id() as libc::pid_t;
        let rc = unsafe { libc::killpg(pid, signal) };
        if rc == 0 {
            Ok(())
        } else {
            Err(std::io::Error::last_os_error().to_string())
        }
    }

    fn wait_for_exit(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            match self.child.try_wait() {
                Ok(Some(_)) => return true,
                Ok(None) => std::thread::sleep(Duration::from_millis(100)),
                Err(_) => return true,
            }
        }
        false
    }

    fn remove_artifact(path: &Path) {
        if path.exists() {
            if let Err(e) = std::fs::remove_file(path) {
                println!(
                    "{} Could not remove {}: {}",
                    "[!]".yellow(),
                    path.display(),
                    e
                );
            }
        }
    }
}

impl CrackSession for HashcatSession {
    fn target_bssid(&self) -> &str {
        &self.target_bssid
    }

    fn hash_file_path(&self) -> &Path {
        &self.hash_file_path
    }

    fn wordlist_path(&self) -> &Path {
        &self.wordlist_path
    }

    fn drain_output(&mut self) -> SessionOutput {
        let mut output = SessionOutput::default();
        drain_channel(&self.stdout_rx, &mut output.status_lines);
        drain_channel(&self.stderr_rx, &mut output.error_lines);
        output
    }

    fn cracked_password(&self) -> Option<String> {
        parse_outfile_password(&self.outfile_path)
    }

    fn is_complete(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(Some(_)) => true,
            Ok(None) => false,
            Err(_) => true,
        }
    }

    fn shutdown(&mut self) {
        if !self.is_complete() {
            match self.signal_group(libc::SIGTERM) {
                Ok(()) => {
                    if !self.wait_for_exit(Duration::from_secs(3)) {
                        println!(
                            "{} Hashcat session for {} ignored SIGTERM, sending SIGKILL",
                            "[!]".yellow(),
                            self.target_bssid
                        );
                        if let Err(e) = self.signal_group(libc::SIGKILL) {
                            println!("{} Error sending SIGKILL: {}", "[!]".red(), e);
                        }
                        self.wait_for_exit(Duration::from_secs(1));
                    }
                }
                Err(e) => {
                    // Best effort: the group may already be gone
                    println!(
                        "{} Could not signal hashcat group for {}: {}",
                        "[!]".yellow(),
                        self.target_bssid,
                        e
                    );
                    let _ = self.child.kill();
                    let _ = self.child.wait();
                }
            }
        }

        Self::remove_artifact(&self.outfile_path);
        Self::remove_artifact(&self.potfile_path);
    }
}
