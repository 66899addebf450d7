//! Wiring of the bot: builds every component from the configuration, starts the
//! service tasks and the Discord client, and shuts them down on a signal.

use serenity::all::{ChannelId, GuildId};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;

use crate::{
    bot::{
        self,
        admin::DiscordAdminCheck,
        command::{run_command_worker, DiscordReplies},
        display::DiscordDisplay,
        handler::Handler,
        notify::DiscordNotifier,
        presence::{DiscordCounterChannel, DiscordPresence},
    },
    config::Config,
    error::AppError,
    monitor::{controller::SystemdController, probe::SystemdProbe, ServerStateSource},
    scheduler::{self, tick_channel, worker, TickJob},
    service::{
        command::CommandDispatcher,
        group_watch::GroupWatcher,
        live_status::LiveStatusUpdater,
        membership::MembershipNotifier,
        presence::{CounterChannelUpdater, PresenceUpdater},
        renderer::StatusRenderer,
    },
};

const COMMAND_QUEUE_CAPACITY: usize = 16;
const MEMBERSHIP_QUEUE_CAPACITY: usize = 256;

/// Installs the global tracing subscriber.
///
/// Defaults to `info`; override with `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

/// Runs the bot until Ctrl-C or SIGTERM.
///
/// # Arguments
/// - `config` - Validated configuration
///
/// # Returns
/// - `Ok(())` - Shut down on a signal
/// - `Err(AppError)` - The Discord client or the scheduler could not be started,
///   or the client stopped with an error
pub async fn run(config: Config) -> Result<(), AppError> {
    let probe: Arc<dyn ServerStateSource> = Arc::new(SystemdProbe::new(&config));
    let control = Arc::new(SystemdController::new(&config));
    let renderer = Arc::new(StatusRenderer::new(
        config.server_name.clone(),
        config.status_interval,
    ));

    let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
    let (membership_tx, membership_rx) = mpsc::channel(MEMBERSHIP_QUEUE_CAPACITY);
    let (shard_tx, shard_rx) = watch::channel(None);

    let notifications = config.notification_channel_id.map(ChannelId::new);
    let handler = Handler::new(
        &config,
        command_tx,
        notifications.map(|_| membership_tx.clone()),
        shard_tx,
    );

    let mut client = bot::start::init_bot(&config, handler).await?;
    let http = client.http.clone();
    let shard_manager = client.shard_manager.clone();

    let mut jobs = Vec::new();

    let (sender, ticks) = tick_channel();
    jobs.push(TickJob {
        name: "Live status",
        interval: config.status_interval,
        sender,
    });
    let display = Arc::new(DiscordDisplay::new(
        http.clone(),
        ChannelId::new(config.live_status_channel_id),
    ));
    tokio::spawn(worker::run_live_status(
        LiveStatusUpdater::new(probe.clone(), display, renderer.clone()),
        ticks,
    ));

    let (sender, ticks) = tick_channel();
    jobs.push(TickJob {
        name: "Presence",
        interval: config.presence_interval,
        sender,
    });
    tokio::spawn(worker::run_presence(
        PresenceUpdater::new(
            probe.clone(),
            Arc::new(DiscordPresence::new(shard_rx.clone())),
            renderer.clone(),
        ),
        ticks,
        shard_rx,
    ));

    if let Some(channel_id) = config.counter_channel_id {
        let (sender, ticks) = tick_channel();
        jobs.push(TickJob {
            name: "Counter channel",
            interval: config.counter_interval,
            sender,
        });
        tokio::spawn(worker::run_counter(
            CounterChannelUpdater::new(
                probe.clone(),
                Arc::new(DiscordCounterChannel::new(
                    http.clone(),
                    ChannelId::new(channel_id),
                )),
                renderer.clone(),
            ),
            ticks,
        ));
    }

    match notifications {
        Some(channel_id) => {
            let (sender, ticks) = tick_channel();
            jobs.push(TickJob {
                name: "Group watcher",
                interval: config.membership_poll_interval,
                sender,
            });
            tokio::spawn(worker::run_group_watch(
                GroupWatcher::new(probe.clone()),
                ticks,
                membership_tx,
            ));
            tokio::spawn(worker::run_membership(
                MembershipNotifier::new(Arc::new(DiscordNotifier::new(http.clone(), channel_id))),
                membership_rx,
            ));
        }
        None => {
            tracing::info!("No notification channel configured, join/leave notifications disabled");
        }
    }

    tokio::spawn(run_command_worker(
        CommandDispatcher::new(probe, control, renderer, config.command_prefix.clone()),
        Arc::new(DiscordAdminCheck::new(
            http.clone(),
            GuildId::new(config.guild_id),
            config.admin_user_ids.clone(),
        )),
        Arc::new(DiscordReplies::new(http)),
        command_rx,
    ));

    let mut scheduler = scheduler::start_scheduler(jobs).await?;

    tracing::info!("Starting Discord bot...");
    let mut bot_task = tokio::spawn(async move { client.start().await });

    let outcome = tokio::select! {
        signal = wait_for_shutdown() => signal,
        result = &mut bot_task => match result {
            Ok(Ok(())) => {
                tracing::warn!("Discord client stopped");
                Ok(())
            }
            Ok(Err(e)) => Err(AppError::from(e)),
            Err(e) => {
                tracing::error!("Discord client task failed: {}", e);
                Ok(())
            }
        },
    };

    tracing::info!("Shutting down");
    shard_manager.shutdown_all().await;
    if let Err(e) = scheduler.shutdown().await {
        tracing::warn!("Failed to stop tick scheduler: {}", e);
    }

    outcome
}

/// Waits for Ctrl-C, or SIGTERM on Unix.
async fn wait_for_shutdown() -> Result<(), AppError> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate()).map_err(AppError::SignalErr)?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result.map_err(AppError::SignalErr)?,
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await.map_err(AppError::SignalErr)?;

    Ok(())
}
