//! Bot presence and the optional user counter channel.

use serenity::async_trait;
use std::sync::Arc;

use crate::{
    error::display::PlatformError,
    model::status::Presence,
    monitor::ServerStateSource,
    service::{
        health::{ComponentHealth, Phase, TickOutcome},
        renderer::StatusRenderer,
    },
};

/// Sets the bot's presence.
#[async_trait]
pub trait PresenceSink: Send + Sync {
    async fn set_presence(&self, presence: &Presence) -> Result<(), PlatformError>;
}

/// Renames the channel used as a user counter.
#[async_trait]
pub trait CounterSink: Send + Sync {
    async fn rename(&self, name: &str) -> Result<(), PlatformError>;
}

/// Keeps the bot's presence in line with the server state.
///
/// The presence is only sent when it differs from the last one applied. Discord
/// drops the presence on reconnect, so the gateway layer calls `invalidate` on
/// every ready event to force the next tick to resend it. Ticks before the first
/// connection are skipped without counting as a failure.
pub struct PresenceUpdater {
    source: Arc<dyn ServerStateSource>,
    sink: Arc<dyn PresenceSink>,
    renderer: Arc<StatusRenderer>,
    health: ComponentHealth,
    last_applied: Option<Presence>,
}

impl PresenceUpdater {
    pub fn new(
        source: Arc<dyn ServerStateSource>,
        sink: Arc<dyn PresenceSink>,
        renderer: Arc<StatusRenderer>,
    ) -> Self {
        Self {
            source,
            sink,
            renderer,
            health: ComponentHealth::new("Presence"),
            last_applied: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.health.phase()
    }

    /// Forgets the last applied presence so the next tick sends it again.
    pub fn invalidate(&mut self) {
        self.last_applied = None;
    }

    pub async fn tick(&mut self) -> TickOutcome {
        let state = match self.source.fetch().await {
            Ok(state) => state,
            Err(e) => return TickOutcome::skipped(self.health.failed(&e)),
        };

        let presence = self.renderer.presence(&state);
        if self.last_applied.as_ref() == Some(&presence) {
            return TickOutcome::skipped(self.health.succeeded());
        }

        match self.sink.set_presence(&presence).await {
            Ok(()) => {
                tracing::debug!("Presence set to {:?} \"{}\"", presence.activity, presence.text);
                self.last_applied = Some(presence);
                TickOutcome::pushed(self.health.succeeded())
            }
            // The connection handler resends once the gateway is ready.
            Err(PlatformError::NotConnected) => {
                tracing::debug!("Gateway not connected yet, presence deferred");
                TickOutcome::skipped(None)
            }
            Err(e) => TickOutcome::skipped(self.health.failed(&e)),
        }
    }
}

/// Renames the counter channel to the current number of users.
///
/// Discord rate limits channel renames heavily, so the name is only sent when it
/// changed and the updater runs on a slow interval.
pub struct CounterChannelUpdater {
    source: Arc<dyn ServerStateSource>,
    sink: Arc<dyn CounterSink>,
    renderer: Arc<StatusRenderer>,
    health: ComponentHealth,
    last_name: Option<String>,
}

impl CounterChannelUpdater {
    pub fn new(
        source: Arc<dyn ServerStateSource>,
        sink: Arc<dyn CounterSink>,
        renderer: Arc<StatusRenderer>,
    ) -> Self {
        Self {
            source,
            sink,
            renderer,
            health: ComponentHealth::new("Counter channel"),
            last_name: None,
        }
    }

    pub async fn tick(&mut self) -> TickOutcome {
        let state = match self.source.fetch().await {
            Ok(state) => state,
            Err(e) => return TickOutcome::skipped(self.health.failed(&e)),
        };

        let name = self.renderer.counter_name(&state);
        if self.last_name.as_deref() == Some(name.as_str()) {
            return TickOutcome::skipped(self.health.succeeded());
        }

        match self.sink.rename(&name).await {
            Ok(()) => {
                tracing::debug!("Counter channel renamed to \"{}\"", name);
                self.last_name = Some(name);
                TickOutcome::pushed(self.health.succeeded())
            }
            Err(e) => TickOutcome::skipped(self.health.failed(&e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{server_state::ServerState, status::Availability};
    use crate::service::health::Transition;
    use crate::testing::{fixed_time, group, online_state, FakeCounter, FakePresence, FakeProbe};
    use std::time::Duration;

    fn renderer() -> Arc<StatusRenderer> {
        Arc::new(StatusRenderer::new("Zero", Duration::from_secs(60)))
    }

    /// Tests that an unchanged presence is sent only once.
    #[tokio::test]
    async fn unchanged_presence_is_sent_once() {
        let probe = Arc::new(FakeProbe::with_state(online_state(vec![], 1.0)));
        let sink = Arc::new(FakePresence::default());
        let mut updater = PresenceUpdater::new(probe.clone(), sink.clone(), renderer());

        assert!(updater.tick().await.pushed);
        assert!(!updater.tick().await.pushed);
        assert_eq!(sink.applied().len(), 1);
    }

    /// Tests that a reconnect forces the presence to be resent.
    ///
    /// Expected: the same presence applied twice after invalidate
    #[tokio::test]
    async fn invalidate_resends_presence() {
        let probe = Arc::new(FakeProbe::with_state(online_state(vec![], 1.0)));
        let sink = Arc::new(FakePresence::default());
        let mut updater = PresenceUpdater::new(probe.clone(), sink.clone(), renderer());

        updater.tick().await;
        updater.invalidate();
        let outcome = updater.tick().await;

        assert!(outcome.pushed);
        let applied = sink.applied();
        assert_eq!(applied.len(), 2);
        assert_eq!(applied[0], applied[1]);
    }

    /// Tests presence for an offline server.
    #[tokio::test]
    async fn offline_server_sets_do_not_disturb() {
        let probe = Arc::new(FakeProbe::with_state(ServerState::offline(fixed_time())));
        let sink = Arc::new(FakePresence::default());
        let mut updater = PresenceUpdater::new(probe.clone(), sink.clone(), renderer());

        updater.tick().await;

        assert_eq!(sink.applied()[0].status, Availability::DoNotDisturb);
    }

    /// Tests that a presence failure degrades and is retried on the next tick.
    #[tokio::test]
    async fn failed_presence_is_retried() {
        let probe = Arc::new(FakeProbe::with_state(online_state(vec![], 1.0)));
        let sink = Arc::new(FakePresence::default());
        sink.set_failing(true);
        let mut updater = PresenceUpdater::new(probe.clone(), sink.clone(), renderer());

        let outcome = updater.tick().await;
        assert_eq!(outcome.transition, Some(Transition::Degraded));
        assert_eq!(updater.phase(), Phase::Degraded);

        sink.set_failing(false);
        let outcome = updater.tick().await;
        assert!(outcome.pushed);
        assert_eq!(outcome.transition, Some(Transition::Recovered));
    }

    /// Tests that ticks before the gateway connects are not failures.
    ///
    /// Verifies that the updater stays uninitialized while disconnected and sends
    /// the presence once connected.
    ///
    /// Expected: no transition while disconnected, Initialized on the first send
    #[tokio::test]
    async fn disconnected_tick_is_deferred() {
        let probe = Arc::new(FakeProbe::with_state(online_state(vec![], 1.0)));
        let sink = Arc::new(FakePresence::default());
        sink.set_connected(false);
        let mut updater = PresenceUpdater::new(probe.clone(), sink.clone(), renderer());

        let outcome = updater.tick().await;
        assert!(!outcome.pushed);
        assert_eq!(outcome.transition, None);
        assert_eq!(updater.phase(), Phase::Uninitialized);

        sink.set_connected(true);
        let outcome = updater.tick().await;
        assert!(outcome.pushed);
        assert_eq!(outcome.transition, Some(Transition::Initialized));
        assert_eq!(sink.applied().len(), 1);
    }

    /// Tests that the counter channel is renamed only when the count changes.
    ///
    /// Expected: two renames across three ticks with counts 0, 0, 2
    #[tokio::test]
    async fn counter_renames_on_change() {
        let probe = Arc::new(FakeProbe::with_state(online_state(vec![], 1.0)));
        let sink = Arc::new(FakeCounter::default());
        let mut updater = CounterChannelUpdater::new(probe.clone(), sink.clone(), renderer());

        updater.tick().await;
        updater.tick().await;
        probe.set_state(online_state(vec![group("band", &["a", "b"])], 1.0));
        updater.tick().await;

        assert_eq!(
            sink.names(),
            vec!["👥 Users Online: 0", "👥 Users Online: 2"]
        );
    }
}
