use std::time::Duration;

use postergrid::HintPriority;
use ratatui::DefaultTerminal;
use ratatui_image::picker::Picker;
use tokio::sync::mpsc;

use super::App;
use crate::app::event_handlers::EventHandlers;
use crate::app::poster_loader::PosterMessage;

/// How often the loop wakes up to poll the keyboard
const INPUT_POLL_INTERVAL_MS: u64 = 10;

/// Result of querying the terminal for graphics support
enum CapabilityMessage {
    Loaded(Picker),
    Failed(String),
}

/// Trait for main application loop
pub trait AppMainLoop {
    async fn run(
        self,
        terminal: DefaultTerminal,
        poster_rx: mpsc::Receiver<PosterMessage>,
    ) -> color_eyre::Result<()>
    where
        Self: Sized;
}

impl AppMainLoop for App {
    /// Run the application's main loop.
    async fn run(
        mut self,
        mut terminal: DefaultTerminal,
        mut poster_rx: mpsc::Receiver<PosterMessage>,
    ) -> color_eyre::Result<()> {
        self.running = true;

        // The picker query reads replies from stdin, so keyboard polling and
        // periodic redraws stay off until it reports back
        let (capability_tx, mut capability_rx) = mpsc::channel::<CapabilityMessage>(1);
        spawn_capability_loader(capability_tx);

        #[cfg(unix)]
        let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;
        #[cfg(unix)]
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

        log::info!("Entering event-driven main loop");

        while self.running {
            let mut missing = Vec::new();
            terminal.draw(|frame| {
                missing = crate::ui::render(frame, &mut self);
            })?;
            self.request_visible_posters(missing);

            let input_enabled = self.capability.is_ready();

            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(INPUT_POLL_INTERVAL_MS)), if input_enabled => {
                    if crossterm::event::poll(Duration::from_millis(0))? {
                        self.handle_crossterm_events()?;
                    }
                }

                Some(msg) = poster_rx.recv() => {
                    self.on_poster_message(msg);
                }

                Some(msg) = capability_rx.recv(), if !input_enabled => {
                    self.on_capability_message(msg);
                }

                else => {
                    log::error!("All event sources closed");
                    self.quit();
                }
            }

            // Signals are checked outside select! to keep the cfg out of the macro
            #[cfg(unix)]
            {
                use std::pin::Pin;
                use std::task::Poll;

                let waker = futures::task::noop_waker();
                let mut cx = std::task::Context::from_waker(&waker);

                if let Poll::Ready(Some(())) = Pin::new(&mut sigint).poll_recv(&mut cx) {
                    log::info!("Received SIGINT, shutting down gracefully");
                    self.quit();
                }

                if let Poll::Ready(Some(())) = Pin::new(&mut sigterm).poll_recv(&mut cx) {
                    log::info!("Received SIGTERM, shutting down gracefully");
                    self.quit();
                }
            }
        }

        self.posters.log_stats();
        log::info!("Exiting main loop");
        Ok(())
    }
}

impl App {
    fn on_poster_message(&mut self, msg: PosterMessage) {
        match msg {
            PosterMessage::Loaded {
                path,
                image,
                priority,
            } => {
                log::debug!(
                    "Poster {} for {} ({:?})",
                    if image.is_some() { "loaded" } else { "missing" },
                    path,
                    priority
                );
                self.posters.insert(path, image);
            }
        }
    }

    fn on_capability_message(&mut self, msg: CapabilityMessage) {
        let picker = match msg {
            CapabilityMessage::Loaded(picker) => {
                log::info!(
                    "Terminal graphics: {:?}, font size {:?}",
                    picker.protocol_type(),
                    picker.font_size()
                );
                picker
            }
            CapabilityMessage::Failed(e) => {
                log::warn!("Terminal graphics query failed, using halfblocks: {}", e);
                Picker::from_fontsize(self.config.layout.cell_size())
            }
        };
        self.capability.resolve(picker);
        // Cell size may have changed
        self.observed = None;
    }

    /// Queue low-priority loads for posters that are on screen but not cached
    fn request_visible_posters(&mut self, paths: Vec<String>) {
        for path in paths {
            if !self.posters.needs_load(&path) {
                continue;
            }
            // False when a preload hint already queued it; pending either way
            self.loader.request(&path, HintPriority::Low);
            self.posters.mark_pending(&path);
        }
    }
}

/// Query the terminal for its graphics protocol on the blocking pool
fn spawn_capability_loader(tx: mpsc::Sender<CapabilityMessage>) {
    tokio::spawn(async move {
        let msg = match tokio::task::spawn_blocking(Picker::from_query_stdio).await {
            Ok(Ok(mut picker)) => {
                picker.set_background_color([0, 0, 0, 0]);
                CapabilityMessage::Loaded(picker)
            }
            Ok(Err(e)) => CapabilityMessage::Failed(format!("{:?}", e)),
            Err(e) => CapabilityMessage::Failed(e.to_string()),
        };

        // Send result back (ignore error if receiver dropped)
        let _ = tx.send(msg).await;
    });
}
