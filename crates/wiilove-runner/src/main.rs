//! WiiLÖVE desktop runner
//!
//! Drives the event pump the way a game's main loop does and shows the result
//! as a pad monitor in the terminal.
//!
//! Frame loop:
//! 1. `love.event.pump()` (exits here if RESET / POWER was requested)
//! 2. drain `love.event.poll()`; HOME quits, `quit` ends the loop
//! 3. `love.timer.step()`, draw, sleep out the rest of the frame
//!
//! Set `WIILOVE_INPUT_SCRIPT` to a TOML input script to run without a
//! terminal, e.g. in CI.

mod keyboard;
mod monitor;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use keyboard::KeyboardSampler;
use monitor::{Monitor, PadSnapshot};
use wiilove::{Event, FramePump, Love, WiiLoveConfig};
use wiilove_hal::mock::MockSampler;
use wiilove_hal::{ProcessReset, ShutdownReason, Slot, TerminationFlag};

/// Environment variable naming a scripted input session
const INPUT_SCRIPT_ENV: &str = "WIILOVE_INPUT_SCRIPT";

/// Termination flag as seen by the signal handlers
static TERMINATION: OnceLock<Arc<TerminationFlag>> = OnceLock::new();

fn main() -> Result<()> {
    let config = WiiLoveConfig::load_default().context("Failed to load configuration")?;

    setup_logging(&config.logging.filter);

    info!("WiiLÖVE runner starting...");

    let termination = Arc::new(TerminationFlag::new());
    setup_signal_handlers(Arc::clone(&termination))?;

    match std::env::var_os(INPUT_SCRIPT_ENV) {
        Some(path) => run_headless(config, termination, PathBuf::from(path)),
        None => run_terminal(config, termination),
    }
}

/// Setup logging to stderr; `RUST_LOG` overrides the configured filter
fn setup_logging(filter: &str) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(io::stderr),
        )
        .init();
}

/// Route SIGINT to RESET and SIGTERM / SIGHUP to POWER
fn setup_signal_handlers(flag: Arc<TerminationFlag>) -> Result<()> {
    use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};

    if TERMINATION.set(flag).is_err() {
        warn!("Signal handlers already installed");
        return Ok(());
    }

    let action = SigAction::new(
        SigHandler::Handler(handle_signal),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );

    unsafe {
        sigaction(Signal::SIGINT, &action)?;
        sigaction(Signal::SIGTERM, &action)?;
        sigaction(Signal::SIGHUP, &action)?;
    }

    Ok(())
}

/// Signal handler: record the request, nothing else
extern "C" fn handle_signal(sig: i32) {
    let reason = match sig {
        libc::SIGINT => ShutdownReason::ReturnToMenu,
        libc::SIGTERM | libc::SIGHUP => ShutdownReason::PowerOff,
        _ => return,
    };
    if let Some(flag) = TERMINATION.get() {
        flag.request(reason);
    }
}

/// React to one polled event the way the default boot script does
fn dispatch(love: &mut Love, event: &Event) -> ControlFlow<()> {
    match event {
        Event::HomePressed { slot } => {
            info!("HOME pressed on slot {}, quitting", slot);
            love.event().quit();
        }
        Event::Quit => return ControlFlow::Break(()),
        _ => {}
    }
    ControlFlow::Continue(())
}

/// Sleep out the remainder of the frame
fn pace(love: &mut Love, frame_start: std::time::Duration) {
    let frame_time = love.config().runtime.frame_duration();
    let timer = love.timer();
    let elapsed = timer.time().saturating_sub(frame_start);
    if let Some(rest) = frame_time.checked_sub(elapsed) {
        timer.sleep(rest);
    }
}

/// Replay an input script without a terminal
fn run_headless(
    config: WiiLoveConfig,
    termination: Arc<TerminationFlag>,
    script: PathBuf,
) -> Result<()> {
    info!("Running headless with input script {}", script.display());

    let sampler = MockSampler::from_script_file(&script)
        .with_context(|| format!("Failed to load input script {}", script.display()))?;
    for id in &config.input.connected_at_start {
        match Slot::try_from(*id) {
            Ok(slot) => sampler.connect(slot),
            Err(e) => warn!("Ignoring start slot: {}", e),
        }
    }

    let pump = FramePump::new(Box::new(sampler.clone()), Box::new(ProcessReset))
        .with_termination(termination);
    let mut love = Love::new(config, pump);

    loop {
        let frame_start = love.timer().time();

        love.event().pump();
        while let Some(event) = love.event().poll() {
            info!("event: {}", event);
            if dispatch(&mut love, &event).is_break() {
                info!("WiiLÖVE runner exiting");
                return Ok(());
            }
        }

        if sampler.script_finished() {
            info!("Input script finished");
            return Ok(());
        }

        love.timer().step();
        pace(&mut love, frame_start);
    }
}

/// Restore terminal state; safe to call more than once
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show)
}

/// Raw mode plus alternate screen
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

/// Run `setup`; if it fails part way, undo whatever it already changed
fn setup_or_restore<T>(
    setup: impl FnOnce() -> io::Result<T>,
    restore: impl FnOnce() -> io::Result<()>,
) -> io::Result<T> {
    setup().inspect_err(|_| {
        if let Err(e) = restore() {
            warn!("Failed to restore terminal: {}", e);
        }
    })
}

/// Interactive pad monitor
fn run_terminal(config: WiiLoveConfig, termination: Arc<TerminationFlag>) -> Result<()> {
    let sampler = KeyboardSampler::new(&config.input, Arc::clone(&termination));

    let mut terminal = setup_or_restore(setup_terminal, restore_terminal)
        .context("Failed to set up terminal")?;

    let pump = FramePump::new(Box::new(sampler), Box::new(ProcessReset))
        .with_termination(termination);
    let mut love = Love::new(config, pump);

    // RESET / POWER leave through the pump; put the terminal back first
    love.event().on_teardown(|| {
        if let Err(e) = restore_terminal() {
            warn!("Failed to restore terminal: {}", e);
        }
    });

    let mut monitor = Monitor::new();

    let result = run_monitor_loop(&mut love, &mut monitor, &mut terminal);

    restore_terminal()?;
    info!("WiiLÖVE runner exiting");
    result
}

fn run_monitor_loop(
    love: &mut Love,
    monitor: &mut Monitor,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<()> {
    loop {
        let frame_start = love.timer().time();

        love.event().pump();
        let generation = love.event().generation();
        while let Some(event) = love.event().poll() {
            debug!("event: {}", event);
            monitor.record(generation, &event);
            if dispatch(love, &event).is_break() {
                return Ok(());
            }
            if let Event::HomePressed { .. } = event {
                monitor.set_status("Quitting...");
            }
        }

        love.timer().step();

        let snapshot = PadSnapshot::capture(love);
        terminal.draw(|f| monitor.draw(f, &snapshot))?;

        pace(love, frame_start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiilove_hal::mock::MockReset;

    fn love() -> Love {
        let pump = FramePump::new(Box::new(MockSampler::new()), Box::new(MockReset::new()));
        Love::new(WiiLoveConfig::default(), pump)
    }

    #[test]
    fn test_home_leads_to_quit() {
        let mut love = love();
        love.event().pump();

        let home = Event::HomePressed { slot: Slot::FIRST };
        assert!(dispatch(&mut love, &home).is_continue());

        let next = love.event().poll().unwrap();
        assert_eq!(next, Event::Quit);
        assert!(dispatch(&mut love, &next).is_break());
    }

    #[test]
    fn test_other_events_continue() {
        let mut love = love();
        love.event().pump();

        let connected = Event::WiimoteConnected { slot: Slot::FIRST };
        assert!(dispatch(&mut love, &connected).is_continue());
        assert_eq!(love.event().poll(), None);
    }

    #[test]
    fn test_failed_setup_restores_terminal() {
        let restored = std::cell::Cell::new(false);
        let result: io::Result<()> = setup_or_restore(
            || Err(io::Error::other("no alternate screen")),
            || {
                restored.set(true);
                Ok(())
            },
        );
        assert!(result.is_err());
        assert!(restored.get());
    }

    #[test]
    fn test_successful_setup_keeps_terminal() {
        let restored = std::cell::Cell::new(false);
        let result = setup_or_restore(
            || Ok(7),
            || {
                restored.set(true);
                Ok(())
            },
        );
        assert_eq!(result.unwrap(), 7);
        assert!(!restored.get());
    }

    #[test]
    fn test_unrouted_signal_is_ignored() {
        handle_signal(libc::SIGUSR1);
        if let Some(flag) = TERMINATION.get() {
            assert!(!flag.is_requested());
        }
    }
}
