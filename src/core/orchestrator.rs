/*!
 * Attack orchestrator
 *
 * Drives the sequential attack loop: one target at a time, one strategy at
 * a time, early-exit on success. Between strategies it polls the real-time
 * crack coordinator so a password recovered in the background cancels
 * redundant foreground work, and a foreground success cancels the
 * background session for the same target.
 */

use colored::Colorize;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::AttackConfig;
use crate::core::attack::{build_strategy_queue, AttackTools};
use crate::core::deps::ToolCapabilities;
use crate::core::realtime::RealtimeCrackManager;
use crate::core::target::Target;

/// Answer to the Ctrl+C prompt mid-attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptChoice {
    /// Retry the current strategy against the current target
    ContinueTarget,
    /// Give up on this target, move to the next one
    SkipTarget,
    /// Stop the whole run
    AbortRun,
}

pub trait Prompter {
    fn interrupt_choice(&self, target: &Target, remaining: usize) -> InterruptChoice;
}

/// Interactive prompt on stdin.
pub struct StdinPrompter;

/// Read one answer. A zero-byte read means stdin is closed and no answer
/// can ever arrive, so it aborts just like a read error.
fn read_interrupt_choice(input: &mut dyn std::io::BufRead) -> InterruptChoice {
    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(0) | Err(_) => InterruptChoice::AbortRun,
        Ok(_) => match answer.trim().chars().next() {
            Some('s') | Some('S') => InterruptChoice::SkipTarget,
            Some('e') | Some('E') => InterruptChoice::AbortRun,
            _ => InterruptChoice::ContinueTarget,
        },
    }
}

impl Prompter for StdinPrompter {
    fn interrupt_choice(&self, target: &Target, remaining: usize) -> InterruptChoice {
        println!(
            "\n{} Interrupted while attacking {} ({} targets remain)",
            "[!]".yellow(),
            target.bssid.cyan(),
            remaining
        );
        print!(
            "{} {}ontinue / {}kip target / {}xit: ",
            "[?]".cyan(),
            "c".green(),
            "s".yellow(),
            "e".red()
        );
        let _ = std::io::stdout().flush();

        read_interrupt_choice(&mut std::io::stdin().lock())
    }
}

pub struct AttackOrchestrator {
    config: AttackConfig,
    capabilities: ToolCapabilities,
    tools: Box<dyn AttackTools>,
    prompter: Box<dyn Prompter>,
    interrupt: Arc<AtomicBool>,
}

impl AttackOrchestrator {
    pub fn new(
        config: &AttackConfig,
        capabilities: &ToolCapabilities,
        tools: Box<dyn AttackTools>,
        prompter: Box<dyn Prompter>,
        interrupt: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config: config.clone(),
            capabilities: capabilities.clone(),
            tools,
            prompter,
            interrupt,
        }
    }

    /// Attack every target in input order. Returns the number of targets
    /// processed (attacked or reported as already cracked).
    pub fn run_all(
        &mut self,
        targets: &[Target],
        mut coordinator: Option<&mut RealtimeCrackManager>,
    ) -> usize {
        if !self.capabilities.wps && targets.iter().any(|t| t.wps_possible()) {
            println!(
                "{} Some targets advertise WPS but reaver is missing, WPS attacks will be skipped",
                "[!]".yellow()
            );
        }

        let mut processed = 0;
        for (index, target) in targets.iter().enumerate() {
            // Surface background finds for other targets promptly
            if let Some(manager) = coordinator.as_deref_mut() {
                manager.poll_status();

                if let Some(password) = manager
                    .get_cracked_password(&target.bssid)
                    .map(|p| p.to_string())
                {
                    println!(
                        "{} {} ({}) already cracked in real time: {}",
                        "[+]".green(),
                        target.bssid.cyan(),
                        target.display_essid(),
                        password.red().bold()
                    );
                    // Safety net: no session should survive its own
                    // success. The hash file stays put.
                    if manager.is_actively_cracking(Some(&target.bssid)) {
                        manager.stop_current_attempt(false);
                    }
                    processed += 1;
                    continue;
                }
            }

            processed += 1;
            let remaining = targets.len() - index - 1;
            if !self.run_single(target, remaining, coordinator.as_deref_mut()) {
                println!("{} Aborting attack run", "[!]".red());
                break;
            }
        }

        if let Some(manager) = coordinator.as_deref_mut() {
            manager.poll_status();
            if manager.is_actively_cracking(None) {
                println!(
                    "{} Run finished, stopping leftover real-time session",
                    "[+]".green()
                );
                manager.stop_current_attempt(true);
            }
        }
        processed
    }

    /// Attack one target. Returns false when the user asked to abort the
    /// whole run.
    pub fn run_single(
        &mut self,
        target: &Target,
        remaining: usize,
        mut coordinator: Option<&mut RealtimeCrackManager>,
    ) -> bool {
        let mut queue = build_strategy_queue(target, &self.config, self.capabilities.wps);
        if queue.is_empty() {
            println!(
                "{} No applicable attacks for {} ({}, {}), skipping",
                "[!]".yellow(),
                target.bssid.cyan(),
                target.display_essid(),
                target.encryption.label()
            );
            return true;
        }

        println!(
            "{} Attacking {} ({}) with {} queued strateg{}",
            "[+]".green(),
            target.bssid.cyan(),
            target.display_essid(),
            queue.len(),
            if queue.len() == 1 { "y" } else { "ies" }
        );

        let mut index = 0;
        while index < queue.len() {
            if let Some(manager) = coordinator.as_deref_mut() {
                manager.poll_status();
                if manager.get_cracked_password(&target.bssid).is_some() {
                    println!(
                        "{} {} resolved by the real-time session, skipping remaining attacks",
                        "[+]".green(),
                        target.bssid.cyan()
                    );
                    return true;
                }
            }

            if self.interrupt.swap(false, Ordering::Relaxed) {
                match self.prompter.interrupt_choice(target, remaining) {
                    InterruptChoice::ContinueTarget => continue,
                    InterruptChoice::SkipTarget => return true,
                    InterruptChoice::AbortRun => return false,
                }
            }

            let strategy = &mut queue[index];
            match strategy.run(self.tools.as_ref(), coordinator.as_deref_mut()) {
                Ok(true) => {
                    // Foreground win: the background session for this
                    // target is wasted compute now. Keep its hash file.
                    if let Some(manager) = coordinator.as_deref_mut() {
                        if manager.is_actively_cracking(Some(&target.bssid)) {
                            manager.stop_current_attempt(false);
                        }
                    }
                    if let Some(result) = &strategy.crack_result {
                        if let Err(e) = result.save(&self.config.cracked_file) {
                            println!("{} Could not save crack result: {}", "[!]".red(), e);
                        }
                    }
                    return true;
                }
                Ok(false) => {
                    index += 1;
                }
                Err(e) if e.is_interrupt() => {
                    match self.prompter.interrupt_choice(target, remaining) {
                        InterruptChoice::ContinueTarget => {
                            self.interrupt.store(false, Ordering::Relaxed);
                        }
                        InterruptChoice::SkipTarget => return true,
                        InterruptChoice::AbortRun => return false,
                    }
                }
                Err(e) => {
                    println!(
                        "{} {} attack on {} failed: {}",
                        "[!]".red(),
                        strategy.kind.label(),
                        target.bssid.cyan(),
                        e
                    );
                    index += 1;
                }
            }
        }

        println!(
            "{} All attacks against {} ({}) exhausted without success",
            "[!]".red(),
            target.bssid.cyan(),
            target.display_essid()
        );
        true
    }
}
