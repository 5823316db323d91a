//! Frame pump
//!
//! `love.event.pump()` is WiiLÖVE's per-frame update: it checks for a pending
//! RESET/POWER request, samples the controllers once and turns what changed
//! into a fresh queue generation. Scripts then drain it with `poll()`.
//!
//! Events of a generation are delivered in a fixed order:
//!
//! 1. `homepressed` (at most one, lowest slot)
//! 2. per slot, ascending: `wiimotedisconnected`, then `wiimoteconnected`
//! 3. anything the script pushes afterwards

use crate::event::{Event, EventError, Value};
use crate::queue::EventQueue;
use std::sync::Arc;
use wiilove_config::QuitMode;
use wiilove_hal::{
    InputSampler, ShutdownReason, Slot, SlotTransitions, SystemReset, TerminationFlag, Wiimotes,
};

type TeardownHook = Box<dyn FnMut()>;

pub struct FramePump {
    queue: EventQueue,
    wiimotes: Wiimotes,
    sampler: Box<dyn InputSampler>,
    reset: Box<dyn SystemReset>,
    termination: Arc<TerminationFlag>,
    quit_mode: QuitMode,
    teardown: Vec<TeardownHook>,
}

impl FramePump {
    pub fn new(sampler: Box<dyn InputSampler>, reset: Box<dyn SystemReset>) -> Self {
        tracing::debug!("Event pump using {} input backend", sampler.name());
        Self {
            queue: EventQueue::new(),
            wiimotes: Wiimotes::new(),
            sampler,
            reset,
            termination: Arc::new(TerminationFlag::new()),
            quit_mode: QuitMode::default(),
            teardown: Vec::new(),
        }
    }

    /// Share an existing termination flag (e.g. one wired to signal handlers)
    pub fn with_termination(mut self, flag: Arc<TerminationFlag>) -> Self {
        self.termination = flag;
        self
    }

    pub fn with_quit_mode(mut self, mode: QuitMode) -> Self {
        self.quit_mode = mode;
        self
    }

    /// Handle for the callbacks that request termination
    pub fn termination(&self) -> Arc<TerminationFlag> {
        Arc::clone(&self.termination)
    }

    /// Register cleanup run before the process goes away, in registration order
    pub fn on_teardown(&mut self, hook: impl FnMut() + 'static) {
        self.teardown.push(Box::new(hook));
    }

    /// Advance one generation
    ///
    /// Does not return if termination has been requested.
    pub fn pump(&mut self) {
        if let Some(reason) = self.termination.observe() {
            // Scripts cannot intercept this: it is the way out when nothing else works
            self.terminate(reason);
        }

        self.queue.reset();

        let transitions = self.wiimotes.update(self.sampler.as_mut());
        self.push_transitions(&transitions);
    }

    fn push_transitions(&mut self, transitions: &SlotTransitions) {
        if let Some(slot) = transitions.home_pressed() {
            self.enqueue(Event::HomePressed { slot });
        }

        for slot in Slot::ALL {
            if transitions.disconnected(slot) {
                tracing::info!("Wii Remote disconnected from slot {}", slot);
                self.enqueue(Event::WiimoteDisconnected { slot });
            }
            if transitions.connected(slot) {
                tracing::info!("Wii Remote connected to slot {}", slot);
                self.enqueue(Event::WiimoteConnected { slot });
            }
        }
    }

    /// Next event of the current generation
    pub fn poll(&mut self) -> Option<Event> {
        self.queue.poll()
    }

    /// Drain the current generation
    pub fn poll_iter(&mut self) -> impl Iterator<Item = Event> + '_ {
        std::iter::from_fn(move || self.poll())
    }

    /// Append an event to the current generation
    ///
    /// Hand-built `Custom` events are held to the same rules as `push_named`.
    pub fn push(&mut self, event: Event) -> Result<(), EventError> {
        event.validate()?;
        self.enqueue(event);
        Ok(())
    }

    /// Append an event given as script arguments
    pub fn push_named(&mut self, name: &str, values: Vec<Value>) -> Result<(), EventError> {
        let event = Event::from_parts(name, values)?;
        self.enqueue(event);
        Ok(())
    }

    fn enqueue(&mut self, event: Event) {
        tracing::debug!("Queued event {}", event);
        self.queue.push(event);
    }

    /// `love.event.quit()`
    pub fn quit(&mut self) {
        match self.quit_mode {
            QuitMode::Event => self.enqueue(Event::Quit),
            QuitMode::Immediate => self.terminate(ShutdownReason::Quit),
        }
    }

    fn terminate(&mut self, reason: ShutdownReason) -> ! {
        tracing::info!(
            "Terminating ({}), running {} teardown hook(s)",
            reason.as_str(),
            self.teardown.len()
        );

        for mut hook in self.teardown.drain(..) {
            hook();
        }
        self.sampler.shutdown();

        self.reset.reset_system(reason)
    }

    /// Controller state as of the last pump
    pub fn wiimotes(&self) -> &Wiimotes {
        &self.wiimotes
    }

    /// `love.wiimote.setRumble()`: whether the backend accepted the change
    pub fn set_rumble(&mut self, slot: Slot, on: bool) -> bool {
        match self.wiimotes.set_rumble(self.sampler.as_mut(), slot, on) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("Rumble on slot {} refused: {}", slot, e);
                false
            }
        }
    }

    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    pub fn generation(&self) -> u64 {
        self.queue.generation()
    }

    pub fn quit_mode(&self) -> QuitMode {
        self.quit_mode
    }
}
