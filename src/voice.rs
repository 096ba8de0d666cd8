//! Voice navigation: transcript → command → route.
//!
//! The speech engine itself lives outside this crate. It feeds final transcripts
//! and error codes into a [`VoiceHub`], which interprets them and notifies
//! whoever is subscribed (normally the active screen).
//!
//! [`VoiceHub`] and [`CommandSlot`] are the hooks for the speech engine's callback: the
//! engine publishes into the hub, and each screen's listener feeds its own slot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

/// Symbolic navigation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Home,
    Purchases,
    Dishes,
    Graphs,
    Settings,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Home => "home",
            Route::Purchases => "purchases",
            Route::Dishes => "dishes",
            Route::Graphs => "graphs",
            Route::Settings => "settings",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceCommand {
    NavigateToPurchases,
    NavigateToDishes,
    NavigateToGraphs,
    NavigateToHome,
    NavigateToSettings,
    Unknown,
}

impl VoiceCommand {
    pub fn route(&self) -> Option<Route> {
        match self {
            VoiceCommand::NavigateToPurchases => Some(Route::Purchases),
            VoiceCommand::NavigateToDishes => Some(Route::Dishes),
            VoiceCommand::NavigateToGraphs => Some(Route::Graphs),
            VoiceCommand::NavigateToHome => Some(Route::Home),
            VoiceCommand::NavigateToSettings => Some(Route::Settings),
            VoiceCommand::Unknown => None,
        }
    }
}

const PHRASES: &[(&str, VoiceCommand)] = &[
    ("список покупок", VoiceCommand::NavigateToPurchases),
    ("список блюд", VoiceCommand::NavigateToDishes),
    ("графики", VoiceCommand::NavigateToGraphs),
    ("домашняя страница", VoiceCommand::NavigateToHome),
    ("настройки", VoiceCommand::NavigateToSettings),
];

/// Exact phrase match after trimming and lowercasing.
pub fn interpret(transcript: &str) -> VoiceCommand {
    let normalized = transcript.trim().to_lowercase();
    PHRASES
        .iter()
        .find(|(phrase, _)| *phrase == normalized)
        .map(|(_, command)| *command)
        .unwrap_or(VoiceCommand::Unknown)
}

/// Last recognised command for the active screen.
///
/// Empty means "nothing said yet", which is not the same as [`VoiceCommand::Unknown`].
#[derive(Debug, Default)]
pub struct CommandSlot {
    last: Option<VoiceCommand>,
}

impl CommandSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&mut self, transcript: &str) -> VoiceCommand {
        let command = interpret(transcript);
        self.last = Some(command);
        command
    }

    pub fn is_idle(&self) -> bool {
        self.last.is_none()
    }

    /// Hands out the pending command once.
    pub fn take(&mut self) -> Option<VoiceCommand> {
        self.last.take()
    }

    pub fn screen_changed(&mut self) {
        self.last = None;
    }
}

/// Recognizer error code that is not reported to the user (no match).
pub const SUPPRESSED_RECOGNIZER_ERROR: i32 = 7;

fn recognizer_message(code: i32) -> String {
    let text = match code {
        1 => "network timeout",
        2 => "network error",
        3 => "audio recording error",
        4 => "recognition server error",
        5 => "client side error",
        6 => "no speech input",
        8 => "recognition service busy",
        9 => "insufficient permissions",
        _ => return format!("speech recognition failed (code {})", code),
    };
    text.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerEvent {
    Transcript(String),
    Error(i32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceOutcome {
    Navigate(Route),
    /// Heard something that is not a command; show a notice instead of navigating.
    UnknownCommand(String),
    RecognizerFailure(String),
}

pub fn outcome_of(event: &RecognizerEvent) -> Option<VoiceOutcome> {
    match event {
        RecognizerEvent::Transcript(text) => Some(match interpret(text).route() {
            Some(route) => VoiceOutcome::Navigate(route),
            None => VoiceOutcome::UnknownCommand(text.clone()),
        }),
        RecognizerEvent::Error(code) if *code == SUPPRESSED_RECOGNIZER_ERROR => {
            log::debug!("ignoring recognizer error {}", code);
            None
        }
        RecognizerEvent::Error(code) => {
            log::warn!("speech recognizer reported error {}", code);
            Some(VoiceOutcome::RecognizerFailure(recognizer_message(*code)))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&VoiceOutcome) + Send>;

/// Fan-out point between the speech engine and the screens listening to it.
#[derive(Default)]
pub struct VoiceHub {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
}

impl VoiceHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn listeners(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Listener)>> {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&VoiceOutcome) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners().push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners();
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners().len()
    }

    /// Interprets `event` and notifies every subscriber. Suppressed errors notify nobody.
    pub fn publish(&self, event: RecognizerEvent) -> Option<VoiceOutcome> {
        let outcome = outcome_of(&event)?;
        for (_, listener) in self.listeners().iter() {
            listener(&outcome);
        }
        Some(outcome)
    }
}
