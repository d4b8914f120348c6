use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use xenolexia_core::state::AppState;
use xenolexia_types::AppEvent;

use crate::events::event_loop;
use crate::state::Services;

/// Centralized channel management
pub struct ChannelSet {
    pub app_to_ui: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    pub ui_to_app: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            app_to_ui: kanal::bounded_async(256), // progress bursts
            ui_to_app: kanal::bounded_async(64),  // gestures and commands
        }
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    services: Arc<Services>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>, services: Arc<Services>) -> Self {
        Self {
            channels: ChannelSet::new(),
            state,
            services,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Where the front end sends its events
    pub fn sender(&self) -> AsyncSender<AppEvent> {
        self.channels.ui_to_app.0.clone()
    }

    /// What the app sends back to the front end
    pub fn receiver(&self) -> AsyncReceiver<AppEvent> {
        self.channels.app_to_ui.1.clone()
    }

    pub fn spawn_tasks(&self) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        tasks.spawn(event_loop(
            self.state.clone(),
            self.services.clone(),
            self.channels.ui_to_app.1.clone(),
            self.channels.app_to_ui.0.clone(),
            self.cancel_token.child_token(),
        ));

        tasks
    }

    pub fn shutdown(&self) {
        self.services.session.cancel();
        self.cancel_token.cancel();
    }
}
