use bevy::prelude::Resource;
use crossbeam_channel::Receiver;
use std::time::Duration;

use crate::bridge::GraphBridge;
use crate::interact::{Clock, SystemClock};
use crate::net::Incoming;
use crate::util::config::ViewerConfig;

#[derive(Resource)]
pub struct NetRx(pub Receiver<Incoming>);

/// Whatever hosts the viewer: socket, file or nothing.
#[derive(Resource)]
pub struct Bridge(pub Box<dyn GraphBridge>);

/// Monotonic time fed to taps, zoom debounce and notices.
#[derive(Resource, Default)]
pub struct AppClock(pub SystemClock);

impl AppClock {
    pub fn now(&self) -> Duration {
        self.0.now()
    }
}

/// Config as loaded, updated when settings are saved from the panel.
#[derive(Resource, Clone)]
pub struct ActiveConfig(pub ViewerConfig);
