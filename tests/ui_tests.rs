use midishimrs::ui::{create_event_spinner, run_event_inspector, EventFeed, SharedEventFeed};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[test]
fn test_event_spinner_creation() {
    let spinner = create_event_spinner();
    assert!(spinner.length().is_none()); // Spinners don't have length
    assert_eq!(spinner.position(), 0);
}

#[test]
fn test_event_feed_records_latest_event() {
    let mut feed = EventFeed::default();
    assert_eq!(feed.events_seen(), 0);
    assert!(feed.last_event().is_empty());

    feed.record("source port 0 added".to_string());
    feed.record("source 0 -> [F8]".to_string());

    assert_eq!(feed.events_seen(), 2);
    assert_eq!(feed.last_event(), "source 0 -> [F8]");
}

#[test]
fn test_event_inspector_thread() {
    let feed: SharedEventFeed = Arc::new(Mutex::new(EventFeed::default()));
    let handle = run_event_inspector(feed.clone());

    // Let it run briefly
    thread::sleep(Duration::from_millis(100));
    assert!(!handle.is_finished());

    // Feed an event and verify the thread keeps running
    {
        let mut feed = feed.lock().unwrap();
        feed.record("destination port 1 removed".to_string());
    }

    thread::sleep(Duration::from_millis(100));
    assert!(!handle.is_finished());
}
