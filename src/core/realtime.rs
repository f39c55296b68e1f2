/*!
 * Real-time crack coordinator
 *
 * Owns at most one active cracking session at a time. For the current
 * target it keeps a queue of wordlists, rotating to the next one whenever
 * the running process exhausts its list, and charging spawn failures
 * against a consecutive-error budget so a broken engine can never loop
 * forever. Recovered passwords land in an append-only per-run ledger the
 * orchestrator consults to skip already-resolved targets.
 */

use colored::Colorize;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use crate::config::AttackConfig;
use crate::core::engine::{CrackEngine, CrackSession, HashType, HashcatEngine};
use crate::core::result::CrackResultRecord;
use crate::core::wordlist::load_wordlist_queue;

/// Status line keywords worth echoing at normal verbosity.
const STATUS_KEYWORDS: [&str; 6] = [
    "STATUS",
    "SPEED",
    "PROGRESS",
    "RECOVERED",
    "REJECTED",
    "EXHAUSTED",
];

pub struct RealtimeCrackManager {
    config: AttackConfig,
    engine: Box<dyn CrackEngine>,
    active_session: Option<Box<dyn CrackSession>>,
    current_target_bssid: Option<String>,
    current_target_essid: Option<String>,
    current_hash_file: Option<PathBuf>,
    current_hash_type: Option<HashType>,
    current_wordlist: Option<PathBuf>,
    wordlist_queue: VecDeque<PathBuf>,
    consecutive_engine_errors: u32,
    cracked_passwords: HashMap<String, String>,
}

impl RealtimeCrackManager {
    pub fn new(config: &AttackConfig) -> Self {
        Self::with_engine(config, Box::new(HashcatEngine::new(config)))
    }

    /// Construct with an alternate engine implementation (used by tests).
    pub fn with_engine(config: &AttackConfig, engine: Box<dyn CrackEngine>) -> Self {
        Self {
            config: config.clone(),
            engine,
            active_session: None,
            current_target_bssid: None,
            current_target_essid: None,
            current_hash_file: None,
            current_hash_type: None,
            current_wordlist: None,
            wordlist_queue: VecDeque::new(),
            consecutive_engine_errors: 0,
            cracked_passwords: HashMap::new(),
        }
    }

    /// Begin a cracking session for a freshly captured hash.
    ///
    /// A session already running for a *different* target is stopped first
    /// (cleaning its scratch-owned hash file). An empty wordlist queue
    /// aborts the session before any process is spawned.
    pub fn start_target_session(
        &mut self,
        target_bssid: &str,
        essid: Option<&str>,
        hash_file: &Path,
        hash_type: HashType,
    ) {
        if !self.config.realtime {
            return;
        }

        if self.active_session.is_some()
            && self.current_target_bssid.as_deref() == Some(target_bssid)
        {
            println!(
                "{} Real-time: session already active for {}",
                "[+]".green(),
                target_bssid.cyan()
            );
            return;
        }

        if self.active_session.is_some() {
            println!(
                "{} Real-time: stopping previous session for {} to start one for {}",
                "[+]".green(),
                self.current_target_bssid.as_deref().unwrap_or("?").cyan(),
                target_bssid.cyan()
            );
            self.stop_current_attempt(true);
        }

        println!(
            "{} Real-time: initiating crack session for {} ({}) using hash file {}",
            "[+]".green(),
            target_bssid.cyan(),
            essid.unwrap_or("ESSID unknown"),
            hash_file.display().to_string().cyan()
        );
        self.current_target_bssid = Some(target_bssid.to_string());
        self.current_target_essid = essid.map(|e| e.to_string());
        self.current_hash_file = Some(hash_file.to_path_buf());
        self.current_hash_type = Some(hash_type);

        self.wordlist_queue = load_wordlist_queue(&self.config);
        if self.wordlist_queue.is_empty() {
            self.clear_target_binding();
            return;
        }

        self.consecutive_engine_errors = 0;
        self.try_next_wordlist();
    }

    /// Pop wordlists and spawn the engine until one attempt sticks.
    ///
    /// Bounded by the queue length and the consecutive-error budget, so it
    /// always terminates: each pass either pops one wordlist or detects an
    /// empty queue.
    fn try_next_wordlist(&mut self) {
        if self.active_session.is_some() {
            // Caller bug; stop the stray session but keep the main hash
            println!(
                "{} Real-time: wordlist rotation requested while a session is active",
                "[!]".red()
            );
            self.stop_current_attempt(false);
        }

        let (bssid, hash_file, hash_type) = match (
            self.current_target_bssid.clone(),
            self.current_hash_file.clone(),
            self.current_hash_type,
        ) {
            (Some(b), Some(h), Some(t)) => (b, h, t),
            _ => return,
        };

        loop {
            if self.consecutive_engine_errors >= self.config.max_engine_errors {
                println!(
                    "{} Real-time: exceeded {} consecutive engine start failures for {}, abandoning real-time crack",
                    "[!]".red(),
                    self.config.max_engine_errors,
                    bssid.cyan()
                );
                self.abandon_target();
                return;
            }

            let wordlist = match self.wordlist_queue.pop_front() {
                Some(wl) => wl,
                None => {
                    println!(
                        "{} Real-time: all wordlists exhausted for {}",
                        "[+]".green(),
                        bssid.cyan()
                    );
                    self.abandon_target();
                    return;
                }
            };

            println!(
                "{} Real-time: trying wordlist {} for {} ({} remaining)",
                "[+]".green(),
                wordlist
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("?")
                    .cyan(),
                bssid.cyan(),
                self.wordlist_queue.len()
            );

            match self
                .engine
                .start_session(&bssid, &hash_file, hash_type, &wordlist)
            {
                Some(session) => {
                    self.active_session = Some(session);
                    self.current_wordlist = Some(wordlist);
                    return;
                }
                None => {
                    self.consecutive_engine_errors += 1;
                    println!(
                        "{} Real-time: failed to start engine with wordlist {} for {}",
                        "[!]".red(),
                        wordlist
                            .file_name()
                            .and_then(|n| n.to_str())
                            .unwrap_or("?"),
                        bssid.cyan()
                    );
                }
            }
        }
    }

    /// Give up on the current target: tear down the session, cleaning the
    /// main hash file only when it is scratch-owned, and clear binding
    /// state so a later session starts fresh.
    fn abandon_target(&mut self) {
        let cleanup_main_hash = self
            .current_hash_file
            .as_deref()
            .map(|p| self.config.is_scratch_path(p))
            .unwrap_or(false);
        self.stop_current_attempt(cleanup_main_hash);
        self.clear_target_binding();
    }

    fn clear_target_binding(&mut self) {
        self.current_target_bssid = None;
        self.current_target_essid = None;
        self.current_hash_file = None;
        self.current_hash_type = None;
        self.current_wordlist = None;
    }

    /// Non-blocking status check. Returns `(bssid, password)` when the
    /// running session recovered a credential this cycle; safe to call
    /// with no session active.
    pub fn poll_status(&mut self) -> Option<(String, String)> {
        if !self.config.realtime {
            return None;
        }
        let session = self.active_session.as_mut()?;

        let wordlist_name = self
            .current_wordlist
            .as_deref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("?")
            .to_string();

        let output = session.drain_output();
        for line in &output.status_lines {
            let upper = line.to_uppercase();
            if self.config.verbose > 2 || STATUS_KEYWORDS.iter().any(|kw| upper.contains(kw)) {
                println!(
                    "{} Real-time engine ({}): {}",
                    "[+]".green(),
                    wordlist_name,
                    line
                );
            }
        }
        for line in &output.error_lines {
            println!(
                "{} Real-time engine ERROR ({}): {}",
                "[!]".red(),
                wordlist_name,
                line
            );
        }

        if let Some(password) = session.cracked_password() {
            let bssid = self.current_target_bssid.clone().unwrap_or_default();
            let essid = self.current_target_essid.clone();
            println!(
                "{} SUCCESS: real-time crack for {} ({})! Password: {}",
                "[+]".green(),
                bssid.cyan(),
                essid.as_deref().unwrap_or("ESSID unknown"),
                password.red().bold()
            );

            let label = self
                .current_hash_type
                .map(|t| t.realtime_label())
                .unwrap_or("WPA-Realtime");
            let record = CrackResultRecord::new(
                &bssid,
                essid.as_deref(),
                Some(session.hash_file_path()),
                &password,
                label,
            );
            if let Err(e) = record.save(&self.config.cracked_file) {
                println!("{} Could not save crack result: {}", "[!]".red(), e);
            }

            self.cracked_passwords.insert(bssid.clone(), password.clone());
            let cleanup_main_hash = self
                .current_hash_file
                .as_deref()
                .map(|p| self.config.is_scratch_path(p))
                .unwrap_or(false);
            self.stop_current_attempt(cleanup_main_hash);
            return Some((bssid, password));
        }

        if session.is_complete() {
            println!(
                "{} Real-time: wordlist {} exhausted for {}",
                "[+]".green(),
                wordlist_name.cyan(),
                self.current_target_bssid.as_deref().unwrap_or("?").cyan()
            );
            // Tear down this wordlist attempt only; the main hash file is
            // still needed for the next rotation
            if let Some(mut finished) = self.active_session.take() {
                finished.shutdown();
            }
            self.current_wordlist = None;
            self.try_next_wordlist();
        }

        None
    }

    /// Stop the running session, if any. Idempotent.
    ///
    /// The session's own output/pot artifacts are always removed. The main
    /// hash file is removed only when `cleanup_hash_file` is set AND the
    /// file is scratch-owned; user-supplied hashes are never deleted.
    /// Target-binding state is cleared only on `cleanup_hash_file`.
    pub fn stop_current_attempt(&mut self, cleanup_hash_file: bool) {
        if let Some(mut session) = self.active_session.take() {
            println!(
                "{} Real-time: stopping session for {}",
                "[+]".green(),
                self.current_target_bssid.as_deref().unwrap_or("?").cyan()
            );
            session.shutdown();
        }

        if cleanup_hash_file {
            if let Some(hash_path) = self.current_hash_file.clone() {
                if hash_path.exists() {
                    if self.config.is_scratch_path(&hash_path) {
                        if let Err(e) = std::fs::remove_file(&hash_path) {
                            println!(
                                "{} Could not remove temp hash file {}: {}",
                                "[!]".yellow(),
                                hash_path.display(),
                                e
                            );
                        }
                    } else {
                        println!(
                            "{} Skipping cleanup of non-scratch hash file: {}",
                            "[!]".yellow(),
                            hash_path.display()
                        );
                    }
                }
            }
            self.clear_target_binding();
        }
        self.current_wordlist = None;
    }

    /// Ledger lookup: password recovered for `bssid` earlier in this run.
    pub fn get_cracked_password(&self, bssid: &str) -> Option<&str> {
        self.cracked_passwords.get(bssid).map(|s| s.as_str())
    }

    /// With `Some(bssid)`: is a session running for that target. With
    /// `None`: is any session running.
    pub fn is_actively_cracking(&self, bssid: Option<&str>) -> bool {
        match bssid {
            None => self.active_session.is_some(),
            Some(b) => {
                self.active_session.is_some() && self.current_target_bssid.as_deref() == Some(b)
            }
        }
    }
}
