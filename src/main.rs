use clap::Parser;
use midishimrs::{
    cli::{validate_destination, Args},
    collect_port_list, logging,
    midi::{DefaultMidiDriver, MidiDriver, PortInfo},
    ui::{run_event_inspector, EventFeed, SharedEventFeed},
};
use std::sync::{Arc, Mutex};
use std::{thread, time::Duration};

const NOTE_ON_MIDDLE_C: [u8; 3] = [0x90, 60, 100];
const NOTE_OFF_MIDDLE_C: [u8; 3] = [0x80, 60, 0];

fn main() {
    initialize_logging();
    let args = Args::parse();

    let driver = match DefaultMidiDriver::new() {
        Ok(driver) => driver,
        Err(err) => {
            let error_msg = format!("Error starting MIDI driver: {}", err);
            log::error!("{}", error_msg);
            eprintln!("{}", error_msg);
            std::process::exit(1);
        }
    };

    if args.send_test_note {
        send_test_note(driver, args.destination, args.deltatime);
        return;
    }

    if args.monitor {
        run_monitor(driver);
        return;
    }

    list_ports(&driver);
}

fn initialize_logging() {
    logging::init_logger().expect("Logger initialization failed");
    log::info!("midishimrs starting");
}

fn list_ports(driver: &DefaultMidiDriver) {
    match collect_port_list(driver) {
        Ok((sources, destinations)) => {
            println!("MIDI sources:");
            print_port_list(&sources);
            println!("MIDI destinations:");
            print_port_list(&destinations);
        }
        Err(err) => {
            let error_msg = format!("Error listing ports: {}", err);
            log::error!("{}", error_msg);
            eprintln!("{}", error_msg);
            std::process::exit(1);
        }
    }
}

fn print_port_list(ports: &[PortInfo]) {
    if ports.is_empty() {
        println!("  (none)");
        return;
    }
    for (index, info) in ports.iter().enumerate() {
        println!("  {}: {} [{}]", index, info.name, info.id);
    }
}

fn send_test_note(mut driver: DefaultMidiDriver, destination: usize, deltatime_ms: f64) {
    if let Err(error_msg) = validate_destination(destination, driver.number_of_destinations()) {
        log::error!("{}", error_msg);
        eprintln!("{}", error_msg);
        std::process::exit(1);
    }

    log::info!(
        "sending test note to destination {} with deltatime {}ms",
        destination,
        deltatime_ms
    );
    println!("Sending test note (Middle C) to destination {}", destination);

    let result = driver
        .send_message(&NOTE_ON_MIDDLE_C, destination, deltatime_ms)
        .and_then(|_| driver.send_message(&NOTE_OFF_MIDDLE_C, destination, deltatime_ms + 500.0));
    if let Err(err) = result {
        let error_msg = format!("Error sending test note: {}", err);
        log::error!("{}", error_msg);
        eprintln!("{}", error_msg);
        std::process::exit(1);
    }

    // dropping the driver discards scheduled sends, so wait out the note off
    thread::sleep(Duration::from_millis(deltatime_ms.max(0.0) as u64 + 600));
}

fn run_monitor(mut driver: DefaultMidiDriver) {
    let feed: SharedEventFeed = Arc::new(Mutex::new(EventFeed::default()));
    register_monitor_callbacks(&mut driver, &feed);

    println!(
        "Monitoring {} sources and {} destinations. Press Ctrl+C to exit...",
        driver.number_of_sources(),
        driver.number_of_destinations()
    );

    let inspector = run_event_inspector(feed);
    let _ = inspector.join();
}

fn register_monitor_callbacks(driver: &mut DefaultMidiDriver, feed: &SharedEventFeed) {
    let message_feed = Arc::clone(feed);
    driver.set_on_message_received(Some(Box::new(move |index, data, timestamp| {
        log::debug!("message on source {}: {:02X?} at {}", index, data, timestamp);
        record_event(&message_feed, format!("source {} -> {:02X?}", index, data));
    })));

    let added_feed = Arc::clone(feed);
    driver.set_on_source_port_added(Some(Box::new(move |index| {
        record_event(&added_feed, format!("source port {} added", index));
    })));

    let removed_feed = Arc::clone(feed);
    driver.set_on_source_port_removed(Some(Box::new(move |index| {
        record_event(&removed_feed, format!("source port {} removed", index));
    })));

    let dest_added_feed = Arc::clone(feed);
    driver.set_on_destination_port_added(Some(Box::new(move |index| {
        record_event(&dest_added_feed, format!("destination port {} added", index));
    })));

    let dest_removed_feed = Arc::clone(feed);
    driver.set_on_destination_port_removed(Some(Box::new(move |index| {
        record_event(&dest_removed_feed, format!("destination port {} removed", index));
    })));
}

fn record_event(feed: &SharedEventFeed, event: String) {
    log::info!("{}", event);
    if let Ok(mut feed) = feed.lock() {
        feed.record(event);
    }
}
