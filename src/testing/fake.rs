//! In-memory implementations of the probe, controller and sink traits.

use serenity::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::{
    error::{
        command::CommandError,
        control::ControlError,
        display::{DisplayError, PlatformError},
        probe::ProbeUnavailable,
    },
    model::{
        membership::Notification,
        server_state::ServerState,
        status::{Presence, RenderedStatus},
    },
    monitor::{ServerControl, ServerStateSource},
    service::{
        live_status::{DisplaySink, SurfaceId},
        membership::NotificationSink,
        presence::{CounterSink, PresenceSink},
    },
};

fn scripted_failure() -> PlatformError {
    PlatformError::Discord(Box::new(serenity::Error::Other("scripted failure")))
}

fn control_failure() -> ControlError {
    ControlError::Command(CommandError::Failed {
        program: "systemctl".to_string(),
        status: "exit status: 1".to_string(),
        stderr: "scripted failure".to_string(),
    })
}

/// Probe returning a scripted state or error until changed.
pub struct FakeProbe {
    scripted: Mutex<Result<ServerState, ProbeUnavailable>>,
    fetches: AtomicUsize,
}

impl FakeProbe {
    pub fn with_state(state: ServerState) -> Self {
        Self {
            scripted: Mutex::new(Ok(state)),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn set_state(&self, state: ServerState) {
        *self.scripted.lock().unwrap() = Ok(state);
    }

    pub fn set_error(&self, error: ProbeUnavailable) {
        *self.scripted.lock().unwrap() = Err(error);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ServerStateSource for FakeProbe {
    async fn fetch(&self) -> Result<ServerState, ProbeUnavailable> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        match &*self.scripted.lock().unwrap() {
            Ok(state) => Ok(state.clone()),
            Err(ProbeUnavailable::TimedOut(timeout)) => Err(ProbeUnavailable::TimedOut(*timeout)),
            Err(ProbeUnavailable::Parse(reason)) => Err(ProbeUnavailable::Parse(reason.clone())),
            Err(ProbeUnavailable::Metrics(reason)) => {
                Err(ProbeUnavailable::Metrics(reason.clone()))
            }
            Err(other) => Err(ProbeUnavailable::Parse(other.to_string())),
        }
    }
}

/// Controller recording restarts and log requests.
#[derive(Default)]
pub struct FakeController {
    restarts: AtomicUsize,
    log_requests: Mutex<Vec<usize>>,
    failing: AtomicBool,
}

impl FakeController {
    pub fn restarts(&self) -> usize {
        self.restarts.load(Ordering::SeqCst)
    }

    pub fn log_requests(&self) -> Vec<usize> {
        self.log_requests.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl ServerControl for FakeController {
    async fn restart(&self) -> Result<(), ControlError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(control_failure());
        }
        self.restarts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn tail_logs(&self, lines: usize) -> Result<Vec<String>, ControlError> {
        self.log_requests.lock().unwrap().push(lines);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ControlError::LogsUnavailable("scripted failure".to_string()));
        }
        Ok((0..lines).map(|i| format!("log line {}", i)).collect())
    }
}

#[derive(Default)]
struct DisplayState {
    live: HashSet<u64>,
    adoptable: Option<SurfaceId>,
    next_id: u64,
    creates: usize,
    edits: usize,
    failing: bool,
    lookup_failing: bool,
}

/// Display keeping track of which status messages exist.
#[derive(Default)]
pub struct FakeDisplay {
    state: Mutex<DisplayState>,
}

impl FakeDisplay {
    /// A display that already holds a status message from a previous run.
    pub fn with_existing(surface: SurfaceId) -> Self {
        let display = Self::default();
        {
            let mut state = display.state.lock().unwrap();
            state.live.insert(surface.0);
            state.adoptable = Some(surface);
        }
        display
    }

    pub fn creates(&self) -> usize {
        self.state.lock().unwrap().creates
    }

    pub fn edits(&self) -> usize {
        self.state.lock().unwrap().edits
    }

    /// Deletes every status message, as a moderator would.
    pub fn delete_all(&self) {
        let mut state = self.state.lock().unwrap();
        state.live.clear();
        state.adoptable = None;
    }

    pub fn set_failing(&self, failing: bool) {
        self.state.lock().unwrap().failing = failing;
    }

    /// Makes only the lookup of a previous status message fail, as when the bot
    /// cannot read the channel's pins.
    pub fn set_lookup_failing(&self, failing: bool) {
        self.state.lock().unwrap().lookup_failing = failing;
    }
}

#[async_trait]
impl DisplaySink for FakeDisplay {
    async fn find_existing(&self, _title: &str) -> Result<Option<SurfaceId>, DisplayError> {
        let state = self.state.lock().unwrap();
        if state.failing || state.lookup_failing {
            return Err(scripted_failure().into());
        }
        Ok(state.adoptable)
    }

    async fn create(&self, _status: &RenderedStatus) -> Result<SurfaceId, DisplayError> {
        let mut state = self.state.lock().unwrap();
        if state.failing {
            return Err(scripted_failure().into());
        }
        state.next_id += 1;
        let id = 1000 + state.next_id;
        state.live.insert(id);
        state.creates += 1;
        Ok(SurfaceId(id))
    }

    async fn edit(&self, surface: SurfaceId, _status: &RenderedStatus) -> Result<(), DisplayError> {
        let mut state = self.state.lock().unwrap();
        if !state.live.contains(&surface.0) {
            return Err(DisplayError::SurfaceInvalid);
        }
        if state.failing {
            return Err(scripted_failure().into());
        }
        state.edits += 1;
        Ok(())
    }
}

/// Presence sink recording every applied presence.
#[derive(Default)]
pub struct FakePresence {
    applied: Mutex<Vec<Presence>>,
    failing: AtomicBool,
    disconnected: AtomicBool,
}

impl FakePresence {
    pub fn set_connected(&self, connected: bool) {
        self.disconnected.store(!connected, Ordering::SeqCst);
    }

    pub fn applied(&self) -> Vec<Presence> {
        self.applied.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl PresenceSink for FakePresence {
    async fn set_presence(&self, presence: &Presence) -> Result<(), PlatformError> {
        if self.disconnected.load(Ordering::SeqCst) {
            return Err(PlatformError::NotConnected);
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(scripted_failure());
        }
        self.applied.lock().unwrap().push(presence.clone());
        Ok(())
    }
}

/// Counter channel recording every rename.
#[derive(Default)]
pub struct FakeCounter {
    names: Mutex<Vec<String>>,
}

impl FakeCounter {
    pub fn names(&self) -> Vec<String> {
        self.names.lock().unwrap().clone()
    }
}

#[async_trait]
impl CounterSink for FakeCounter {
    async fn rename(&self, name: &str) -> Result<(), PlatformError> {
        self.names.lock().unwrap().push(name.to_string());
        Ok(())
    }
}

/// Notification channel recording every posted notification.
#[derive(Default)]
pub struct FakeNotifier {
    posted: Mutex<Vec<Notification>>,
    failing: AtomicBool,
}

impl FakeNotifier {
    pub fn posted(&self) -> Vec<Notification> {
        self.posted.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl NotificationSink for FakeNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), PlatformError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(scripted_failure());
        }
        self.posted.lock().unwrap().push(notification.clone());
        Ok(())
    }
}
