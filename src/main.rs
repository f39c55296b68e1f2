/*!
 * wifistrike
 *
 * Automated wireless AP attack tool:
 * - Parses an airodump-ng scan export into attackable targets
 * - Queues the applicable attacks per target (WEP, WPS, PMKID, handshake)
 * - Optionally cracks captured hashes in real time while attacks continue
 */

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use wifistrike::cli::Cli;
use wifistrike::core::{
    parse_scan_csv, AttackOrchestrator, RealtimeCrackManager, StdinPrompter, SystemTools,
    ToolCapabilities,
};

static INTERRUPT: OnceLock<Arc<AtomicBool>> = OnceLock::new();

extern "C" fn handle_sigint(_: libc::c_int) {
    if let Some(flag) = INTERRUPT.get() {
        flag.store(true, Ordering::Relaxed);
    }
}

/// Check if the application is running with root privileges
#[cfg(unix)]
fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
fn is_root() -> bool {
    false
}

fn install_interrupt_handler() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let _ = INTERRUPT.set(flag.clone());
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGINT, handle_sigint as libc::sighandler_t);
    }
    flag
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let scan_file = cli.scan_file.clone();
    let config = cli
        .into_config()
        .map_err(|e| anyhow::anyhow!(e))
        .context("invalid configuration")?;

    if !is_root() {
        eprintln!(
            "\n{} Not running as root. Capture and injection will fail without it.",
            "[!]".yellow()
        );
        eprintln!("    Re-run with: sudo wifistrike ...\n");
    }

    let contents = std::fs::read_to_string(&scan_file)
        .with_context(|| format!("cannot read scan file {}", scan_file.display()))?;
    let targets = parse_scan_csv(&contents);
    if targets.is_empty() {
        bail!("no valid targets in {}", scan_file.display());
    }
    println!(
        "{} Loaded {} target{} from {}",
        "[+]".green(),
        targets.len(),
        if targets.len() == 1 { "" } else { "s" },
        scan_file.display().to_string().cyan()
    );

    let capabilities = ToolCapabilities::detect();
    capabilities.print_advisories();

    std::fs::create_dir_all(&config.temp_dir).with_context(|| {
        format!(
            "cannot create scratch directory {}",
            config.temp_dir.display()
        )
    })?;

    let interrupt = install_interrupt_handler();
    let mut coordinator = if config.realtime {
        if !capabilities.hashcat {
            bail!("--realtime requires hashcat on PATH");
        }
        println!("{} Real-time cracking enabled", "[+]".green());
        Some(RealtimeCrackManager::new(&config))
    } else {
        None
    };

    let tools = SystemTools::new(&config, &capabilities, interrupt.clone());
    let mut orchestrator = AttackOrchestrator::new(
        &config,
        &capabilities,
        Box::new(tools),
        Box::new(StdinPrompter),
        interrupt,
    );

    let processed = orchestrator.run_all(&targets, coordinator.as_mut());

    println!(
        "\n{} Finished: {} of {} target{} processed",
        "[+]".green(),
        processed,
        targets.len(),
        if targets.len() == 1 { "" } else { "s" }
    );
    println!(
        "{} Crack results are in {}",
        "[+]".green(),
        config.cracked_file.display().to_string().cyan()
    );
    Ok(())
}
