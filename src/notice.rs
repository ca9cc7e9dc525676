//! User-facing notices
//!
//! Contained failures such as a missing search backend are reported to the
//! user rather than returned as errors. The host decides how: the CLI prints
//! to stderr, an embedding UI can buffer notices for a toast area.

use colored::Colorize;
use std::cell::RefCell;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Sink for user notices
///
/// ```
/// use hometab::notice::{ConsoleNotifier, Notifier};
///
/// let notifier = ConsoleNotifier::new();
/// notifier.warning("Full-text search is not available");
/// ```
pub trait Notifier {
    fn notice(&self, level: NoticeLevel, message: &str);

    fn info(&self, message: &str) {
        self.notice(NoticeLevel::Info, message);
    }

    fn warning(&self, message: &str) {
        self.notice(NoticeLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.notice(NoticeLevel::Error, message);
    }
}

/// Colored notices on stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Notifier for ConsoleNotifier {
    fn notice(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Info => eprintln!("{}", message.dimmed()),
            NoticeLevel::Warning => eprintln!("{} {}", "⚠️".yellow(), message),
            NoticeLevel::Error => eprintln!("{} {}", "❌".red(), message),
        }
    }
}

/// Buffered notices that expire after a while
pub struct NoticeLog {
    notices: RefCell<Vec<(NoticeLevel, String, Instant)>>,
    ttl: Duration,
}

impl NoticeLog {
    /// Notices stay visible for five seconds
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(5))
    }

    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            notices: RefCell::new(Vec::new()),
            ttl,
        }
    }

    /// Notices that have not expired, oldest first
    #[must_use]
    pub fn recent(&self) -> Vec<(NoticeLevel, String)> {
        let now = Instant::now();
        self.notices
            .borrow()
            .iter()
            .filter(|(_, _, at)| now.duration_since(*at) < self.ttl)
            .map(|(level, msg, _)| (*level, msg.clone()))
            .collect()
    }

    #[must_use]
    pub fn latest(&self) -> Option<(NoticeLevel, String)> {
        self.recent().pop()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.recent().len()
    }

    pub fn clear(&self) {
        self.notices.borrow_mut().clear();
    }
}

impl Default for NoticeLog {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for NoticeLog {
    fn notice(&self, level: NoticeLevel, message: &str) {
        let mut notices = self.notices.borrow_mut();
        notices.push((level, message.to_string(), Instant::now()));

        // Keep only the last 100
        if notices.len() > 100 {
            notices.drain(0..50);
        }
    }
}
