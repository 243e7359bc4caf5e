//! User-visible notices

use std::sync::{Arc, Mutex};

use log::{error, info};

/// Kind of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Shown while work is running, cleared when it ends
    Progress,
    Info,
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn progress(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Progress,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Host surface for notices.
pub trait Notifier {
    fn notify(&self, notice: Notice);

    /// Remove the current progress notice, if any.
    fn clear_progress(&self) {}
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice);
    }

    fn clear_progress(&self) {
        (**self).clear_progress();
    }
}

/// Notifier writing to the log, for hosts without a notice surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => error!("{}", notice.message),
            NoticeLevel::Progress | NoticeLevel::Info => info!("{}", notice.message),
        }
    }
}

/// Notifier keeping every notice, for hosts that poll.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<Notice>>,
    progress: Mutex<Option<Notice>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notice received so far, oldest first.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }

    /// The progress notice still showing.
    pub fn progress(&self) -> Option<Notice> {
        self.progress.lock().ok().and_then(|progress| progress.clone())
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notice: Notice) {
        if notice.level == NoticeLevel::Progress {
            if let Ok(mut progress) = self.progress.lock() {
                *progress = Some(notice.clone());
            }
        }
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }

    fn clear_progress(&self) {
        if let Ok(mut progress) = self.progress.lock() {
            *progress = None;
        }
    }
}
