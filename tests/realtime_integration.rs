/*!
 * Real-Time Crack Coordinator Integration Tests
 *
 * Exercises the coordinator through its public API with a scripted mock
 * engine: wordlist rotation, the consecutive-error budget, scratch-owned
 * hash cleanup, and the cracked-password ledger.
 */

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use wifistrike::config::AttackConfig;
use wifistrike::core::{
    CrackEngine, CrackSession, HashType, RealtimeCrackManager, SessionOutput,
};

// =============================================================================
// Mock engine
// =============================================================================

struct ScriptedSession {
    bssid: String,
    hash_file: PathBuf,
    wordlist: PathBuf,
    password: Option<String>,
    complete: bool,
    output: SessionOutput,
}

impl CrackSession for ScriptedSession {
    fn target_bssid(&self) -> &str {
        &self.bssid
    }
    fn hash_file_path(&self) -> &Path {
        &self.hash_file
    }
    fn wordlist_path(&self) -> &Path {
        &self.wordlist
    }
    fn drain_output(&mut self) -> SessionOutput {
        std::mem::take(&mut self.output)
    }
    fn cracked_password(&self) -> Option<String> {
        self.password.clone()
    }
    fn is_complete(&mut self) -> bool {
        self.complete
    }
    fn shutdown(&mut self) {}
}

/// Per-call spawn outcomes; once the script runs dry every spawn succeeds.
struct ScriptedEngine {
    outcomes: Mutex<VecDeque<bool>>,
    spawn_attempts: Arc<AtomicU32>,
    password: Option<String>,
    complete: bool,
}

impl ScriptedEngine {
    fn new(outcomes: &[bool]) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.iter().copied().collect()),
            spawn_attempts: Arc::new(AtomicU32::new(0)),
            password: None,
            complete: false,
        }
    }
}

impl CrackEngine for ScriptedEngine {
    fn start_session(
        &self,
        target_bssid: &str,
        hash_file: &Path,
        _hash_type: HashType,
        wordlist: &Path,
    ) -> Option<Box<dyn CrackSession>> {
        self.spawn_attempts.fetch_add(1, Ordering::Relaxed);
        let ok = self.outcomes.lock().unwrap().pop_front().unwrap_or(true);
        if !ok {
            return None;
        }
        Some(Box::new(ScriptedSession {
            bssid: target_bssid.to_string(),
            hash_file: hash_file.to_path_buf(),
            wordlist: wordlist.to_path_buf(),
            password: self.password.clone(),
            complete: self.complete,
            output: SessionOutput::default(),
        }))
    }
}

// =============================================================================
// Test fixtures
// =============================================================================

struct Fixture {
    config: AttackConfig,
    dir: PathBuf,
}

impl Fixture {
    fn new(name: &str, wordlists: &[&str]) -> Self {
        let dir = PathBuf::from(format!("/tmp/wifistrike_it_rt_{}", name));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("wordlists")).unwrap();
        for wl in wordlists {
            std::fs::write(dir.join("wordlists").join(wl), "password\n123456\n").unwrap();
        }
        let config = AttackConfig {
            realtime: true,
            temp_dir: dir.clone(),
            cracked_file: dir.join("cracked.json"),
            realtime_wordlist_dir: Some(dir.join("wordlists")),
            ..Default::default()
        };
        Self { config, dir }
    }

    fn scratch_hash(&self, name: &str) -> PathBuf {
        let path = self.dir.join(name);
        std::fs::write(&path, "hash*aabbccddeeff*001122334455*net\n").unwrap();
        path
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

const BSSID: &str = "AA:BB:CC:DD:EE:FF";

// =============================================================================
// Wordlist rotation & error budget
// =============================================================================

#[test]
fn test_spawn_failure_then_success_binds_second_wordlist() {
    let fixture = Fixture::new("rotation", &["a.txt", "b.txt"]);
    let hash = fixture.scratch_hash("pmkid.16800");

    let engine = ScriptedEngine::new(&[false, true]);
    let attempts = engine.spawn_attempts.clone();
    let mut manager = RealtimeCrackManager::with_engine(&fixture.config, Box::new(engine));

    manager.start_target_session(BSSID, Some("HomeNet"), &hash, HashType::Pmkid);

    // One failure charged, session bound on the second wordlist
    assert_eq!(attempts.load(Ordering::Relaxed), 2);
    assert!(manager.is_actively_cracking(Some(BSSID)));
}

#[test]
fn test_three_spawn_failures_abandon_the_target() {
    let fixture = Fixture::new("budget", &["a.txt", "b.txt", "c.txt", "d.txt", "e.txt"]);
    let hash = fixture.scratch_hash("pmkid.16800");

    let engine = ScriptedEngine::new(&[false, false, false]);
    let attempts = engine.spawn_attempts.clone();
    let mut manager = RealtimeCrackManager::with_engine(&fixture.config, Box::new(engine));

    manager.start_target_session(BSSID, Some("HomeNet"), &hash, HashType::Pmkid);

    // Default budget is 3: exactly 3 attempts, then no more spawns even
    // though wordlists remain queued
    assert_eq!(attempts.load(Ordering::Relaxed), 3);
    assert!(!manager.is_actively_cracking(None));

    // A later poll stays inert: the binding is gone
    assert!(manager.poll_status().is_none());
    assert_eq!(attempts.load(Ordering::Relaxed), 3);
}

#[test]
fn test_exhausted_wordlists_tear_the_session_down() {
    let fixture = Fixture::new("exhaustion", &["a.txt", "b.txt"]);
    let hash = fixture.scratch_hash("pmkid.16800");

    let mut engine = ScriptedEngine::new(&[]);
    engine.complete = true;
    let attempts = engine.spawn_attempts.clone();
    let mut manager = RealtimeCrackManager::with_engine(&fixture.config, Box::new(engine));

    manager.start_target_session(BSSID, Some("HomeNet"), &hash, HashType::Pmkid);
    assert_eq!(attempts.load(Ordering::Relaxed), 1);

    // Each poll retires one exhausted wordlist and rotates
    assert!(manager.poll_status().is_none());
    assert_eq!(attempts.load(Ordering::Relaxed), 2);
    assert!(manager.poll_status().is_none());
    assert!(!manager.is_actively_cracking(None));
}

// =============================================================================
// Ledger round trip
// =============================================================================

#[test]
fn test_cracked_password_round_trip() {
    let fixture = Fixture::new("round_trip", &["a.txt"]);
    let hash = fixture.scratch_hash("pmkid.16800");

    let mut engine = ScriptedEngine::new(&[]);
    engine.password = Some("correct horse".to_string());
    let mut manager = RealtimeCrackManager::with_engine(&fixture.config, Box::new(engine));

    manager.start_target_session(BSSID, Some("HomeNet"), &hash, HashType::Pmkid);
    let found = manager.poll_status();

    assert_eq!(
        found,
        Some((BSSID.to_string(), "correct horse".to_string()))
    );
    assert_eq!(manager.get_cracked_password(BSSID), Some("correct horse"));
    assert!(!manager.is_actively_cracking(Some(BSSID)));
}

#[test]
fn test_poll_status_is_idempotent_without_a_session() {
    let fixture = Fixture::new("idle", &[]);
    let mut manager =
        RealtimeCrackManager::with_engine(&fixture.config, Box::new(ScriptedEngine::new(&[])));
    for _ in 0..10 {
        assert!(manager.poll_status().is_none());
    }
    assert!(manager.get_cracked_password(BSSID).is_none());
}

// =============================================================================
// Scratch-ownership cleanup
// =============================================================================

#[test]
fn test_stop_with_cleanup_removes_scratch_hash() {
    let fixture = Fixture::new("scratch", &["a.txt"]);
    let hash = fixture.scratch_hash("pmkid.16800");

    let mut manager =
        RealtimeCrackManager::with_engine(&fixture.config, Box::new(ScriptedEngine::new(&[])));
    manager.start_target_session(BSSID, Some("HomeNet"), &hash, HashType::Pmkid);
    assert!(hash.exists());

    manager.stop_current_attempt(true);
    assert!(!hash.exists());
    assert!(!manager.is_actively_cracking(None));
}

#[test]
fn test_stop_with_cleanup_preserves_user_hash() {
    let fixture = Fixture::new("user_owned", &["a.txt"]);
    let user_hash = PathBuf::from("/tmp/wifistrike_it_user_hash.16800");
    std::fs::write(&user_hash, "hash*a*b*c\n").unwrap();

    let mut manager =
        RealtimeCrackManager::with_engine(&fixture.config, Box::new(ScriptedEngine::new(&[])));
    manager.start_target_session(BSSID, Some("HomeNet"), &user_hash, HashType::Hccapx);

    manager.stop_current_attempt(true);
    // Outside the scratch root: never deleted
    assert!(user_hash.exists());
    let _ = std::fs::remove_file(&user_hash);
}

#[test]
fn test_switching_targets_replaces_the_session() {
    let fixture = Fixture::new("switch", &["a.txt"]);
    let hash_one = fixture.scratch_hash("one.16800");
    let hash_two = fixture.scratch_hash("two.16800");

    let mut manager =
        RealtimeCrackManager::with_engine(&fixture.config, Box::new(ScriptedEngine::new(&[])));
    manager.start_target_session("AA:BB:CC:DD:EE:01", Some("One"), &hash_one, HashType::Pmkid);
    assert!(manager.is_actively_cracking(Some("AA:BB:CC:DD:EE:01")));

    manager.start_target_session("AA:BB:CC:DD:EE:02", Some("Two"), &hash_two, HashType::Pmkid);

    assert!(manager.is_actively_cracking(Some("AA:BB:CC:DD:EE:02")));
    assert!(!manager.is_actively_cracking(Some("AA:BB:CC:DD:EE:01")));
    // The first session's scratch-owned hash was cleaned on replacement
    assert!(!hash_one.exists());
    assert!(hash_two.exists());
}

#[test]
fn test_empty_wordlist_queue_never_spawns() {
    let fixture = Fixture::new("no_wordlists", &[]);
    let hash = fixture.scratch_hash("pmkid.16800");

    let engine = ScriptedEngine::new(&[]);
    let attempts = engine.spawn_attempts.clone();
    let mut manager = RealtimeCrackManager::with_engine(&fixture.config, Box::new(engine));

    manager.start_target_session(BSSID, Some("HomeNet"), &hash, HashType::Pmkid);
    assert_eq!(attempts.load(Ordering::Relaxed), 0);
    assert!(!manager.is_actively_cracking(None));
}
