//! Keeps one pinned status message up to date.

use serenity::async_trait;
use std::sync::Arc;

use crate::{
    error::display::DisplayError,
    model::status::RenderedStatus,
    monitor::ServerStateSource,
    service::{
        health::{ComponentHealth, Phase, TickOutcome},
        renderer::StatusRenderer,
    },
};

/// Identifier of the message the live status is rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// Where the live status is shown.
#[async_trait]
pub trait DisplaySink: Send + Sync {
    /// Looks for a status message left behind by a previous run.
    ///
    /// # Arguments
    /// - `title` - Title of the live status embed
    ///
    /// # Returns
    /// - `Ok(Some(SurfaceId))` - A reusable message was found
    /// - `Ok(None)` - No previous message exists
    /// - `Err(DisplayError)` - The lookup itself failed
    async fn find_existing(&self, title: &str) -> Result<Option<SurfaceId>, DisplayError>;

    /// Posts a new status message.
    async fn create(&self, status: &RenderedStatus) -> Result<SurfaceId, DisplayError>;

    /// Edits an existing status message in place.
    ///
    /// Returns `DisplayError::SurfaceInvalid` when the message no longer exists.
    async fn edit(&self, surface: SurfaceId, status: &RenderedStatus) -> Result<(), DisplayError>;
}

/// Periodically renders the server state into one status message.
///
/// Pushes only when the rendered content differs from the last successful push.
/// A deleted message is recreated once per tick; any other failure leaves the
/// updater degraded until a later tick succeeds.
pub struct LiveStatusUpdater {
    source: Arc<dyn ServerStateSource>,
    display: Arc<dyn DisplaySink>,
    renderer: Arc<StatusRenderer>,
    health: ComponentHealth,
    surface: Option<SurfaceId>,
    last_pushed: Option<RenderedStatus>,
    searched_existing: bool,
}

impl LiveStatusUpdater {
    pub fn new(
        source: Arc<dyn ServerStateSource>,
        display: Arc<dyn DisplaySink>,
        renderer: Arc<StatusRenderer>,
    ) -> Self {
        Self {
            source,
            display,
            renderer,
            health: ComponentHealth::new("Live status"),
            surface: None,
            last_pushed: None,
            searched_existing: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.health.phase()
    }

    pub fn surface(&self) -> Option<SurfaceId> {
        self.surface
    }

    /// Runs one refresh.
    ///
    /// A probe failure skips the push and keeps the last pushed content on screen.
    pub async fn tick(&mut self) -> TickOutcome {
        let state = match self.source.fetch().await {
            Ok(state) => state,
            Err(e) => return TickOutcome::skipped(self.health.failed(&e)),
        };

        let rendered = self.renderer.render(&state);

        if self.surface.is_some() && self.last_pushed.as_ref() == Some(&rendered) {
            tracing::debug!("Live status unchanged, skipping push");
            return TickOutcome::skipped(self.health.succeeded());
        }

        match self.push(&rendered).await {
            Ok(()) => {
                self.last_pushed = Some(rendered);
                TickOutcome::pushed(self.health.succeeded())
            }
            Err(e) => TickOutcome::skipped(self.health.failed(&e)),
        }
    }

    async fn push(&mut self, rendered: &RenderedStatus) -> Result<(), DisplayError> {
        if self.surface.is_none() && !self.searched_existing {
            self.searched_existing = true;

            match self.display.find_existing(&rendered.title).await {
                Ok(Some(surface)) => {
                    tracing::info!("Reusing existing live status message {}", surface.0);
                    self.surface = Some(surface);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        "Failed to look up a previous live status message, posting a new one: {}",
                        e
                    );
                }
            }
        }

        let Some(surface) = self.surface else {
            return self.recreate(rendered).await;
        };

        match self.display.edit(surface, rendered).await {
            Ok(()) => Ok(()),
            Err(DisplayError::SurfaceInvalid) => {
                tracing::warn!(
                    "Live status message {} no longer exists, recreating it",
                    surface.0
                );
                self.surface = None;
                self.recreate(rendered).await
            }
            Err(e) => Err(e),
        }
    }

    async fn recreate(&mut self, rendered: &RenderedStatus) -> Result<(), DisplayError> {
        let surface = self.display.create(rendered).await?;
        tracing::info!("Posted live status message {}", surface.0);
        self.surface = Some(surface);
        Ok(())
    }
}
