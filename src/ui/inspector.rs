use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Most recent driver notification, as shown by the inspector
#[derive(Default)]
pub struct EventFeed {
    last_event: String,
    events_seen: u64,
}

impl EventFeed {
    pub fn record(&mut self, event: String) {
        self.last_event = event;
        self.events_seen += 1;
    }

    pub fn last_event(&self) -> &str {
        &self.last_event
    }

    pub fn events_seen(&self) -> u64 {
        self.events_seen
    }
}

pub type SharedEventFeed = Arc<Mutex<EventFeed>>;

pub fn create_event_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.dim} {spinner} {wide_msg}")
            .unwrap(),
    );
    pb.set_prefix("Events");
    pb
}

/// Spawns the inspector refresh loop; the spinner message tracks the feed
pub fn run_event_inspector(feed: SharedEventFeed) -> JoinHandle<()> {
    thread::spawn(move || {
        let spinner = create_event_spinner();
        loop {
            thread::sleep(Duration::from_millis(100));
            if let Ok(feed) = feed.lock() {
                if feed.events_seen() == 0 {
                    spinner.set_message("waiting for events...");
                } else {
                    spinner.set_message(format!(
                        "{} events | {}",
                        feed.events_seen(),
                        feed.last_event()
                    ));
                }
            }
            spinner.tick();
        }
    })
}
