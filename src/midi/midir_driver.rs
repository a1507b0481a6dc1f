use crate::midi::driver::{
    CallbackSlots, MessageCallback, MidiDriver, MidiError, PortCallback, PortDirection, PortIndex,
    PortInfo, Result,
};
use crate::midi::schedule::OutputQueue;
use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, error, info, warn};
use midir::{
    Ignore, MidiInput, MidiInputConnection, MidiInputPort, MidiOutput, MidiOutputConnection,
    MidiOutputPort,
};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const CLIENT_NAME: &str = "midishimrs";
const HOTPLUG_POLL_INTERVAL: Duration = Duration::from_millis(250);
const OUTPUT_IDLE_TIMEOUT: Duration = Duration::from_millis(500);

struct SourcePort {
    info: PortInfo,
    connection: Option<MidiInputConnection<()>>,
}

struct Ports {
    sources: Vec<SourcePort>,
    destinations: Vec<PortInfo>,
}

enum OutputCommand {
    Send {
        port_id: String,
        data: Vec<u8>,
        due: Instant,
    },
    Clear {
        port_id: String,
    },
    Shutdown,
}

#[derive(Clone, Copy)]
enum PortEvent {
    SourceAdded,
    SourceRemoved,
    DestinationAdded,
    DestinationRemoved,
}

/// [`MidiDriver`] backend over midir.
///
/// Ports discovered at construction fire no notifications. A watcher thread
/// polls the port set for hotplug changes; an output thread delivers
/// scheduled sends when their deltatime elapses. Inbound messages and port
/// notifications arrive on those backend threads.
pub struct MidirDriver {
    ports: Arc<Mutex<Ports>>,
    callbacks: Arc<Mutex<CallbackSlots>>,
    running: Arc<AtomicBool>,
    command_tx: Sender<OutputCommand>,
    watcher: Option<JoinHandle<()>>,
    output: Option<JoinHandle<()>>,
}

impl MidirDriver {
    pub fn new() -> Result<Self> {
        let ports = Arc::new(Mutex::new(Ports {
            sources: Vec::new(),
            destinations: Vec::new(),
        }));
        let callbacks = Arc::new(Mutex::new(CallbackSlots::default()));

        populate_initial_ports(&ports, &callbacks)?;

        let (command_tx, command_rx) = unbounded();
        let running = Arc::new(AtomicBool::new(true));

        let watcher = {
            let ports = Arc::clone(&ports);
            let callbacks = Arc::clone(&callbacks);
            let running = Arc::clone(&running);
            thread::spawn(move || run_hotplug_watcher(ports, callbacks, running))
        };
        let output = thread::spawn(move || run_output_loop(command_rx));

        Ok(MidirDriver {
            ports,
            callbacks,
            running,
            command_tx,
            watcher: Some(watcher),
            output: Some(output),
        })
    }

    fn lock_ports(&self) -> Result<MutexGuard<'_, Ports>> {
        self.ports
            .lock()
            .map_err(|_| MidiError::BackendUnavailable("driver state poisoned".to_string()))
    }

    fn destination_id(&self, index: PortIndex) -> Result<String> {
        let guard = self.lock_ports()?;
        guard
            .destinations
            .get(index)
            .map(|info| info.id.clone())
            .ok_or(MidiError::InvalidPortIndex {
                direction: PortDirection::Destination,
                index,
                count: guard.destinations.len(),
            })
    }

    fn set_slot(&mut self, assign: impl FnOnce(&mut CallbackSlots)) {
        if let Ok(mut slots) = self.callbacks.lock() {
            assign(&mut slots);
        }
    }
}

impl MidiDriver for MidirDriver {
    fn send_message(
        &mut self,
        data: &[u8],
        destination: PortIndex,
        deltatime_ms: f64,
    ) -> Result<()> {
        let port_id = self.destination_id(destination)?;
        let due = Instant::now() + Duration::from_secs_f64(deltatime_ms.max(0.0) / 1000.0);
        self.command_tx
            .send(OutputCommand::Send {
                port_id,
                data: data.to_vec(),
                due,
            })
            .map_err(|_| MidiError::SendError("output thread is not running".to_string()))
    }

    fn clear(&mut self, destination: PortIndex) -> Result<()> {
        let port_id = self.destination_id(destination)?;
        self.command_tx
            .send(OutputCommand::Clear { port_id })
            .map_err(|_| MidiError::SendError("output thread is not running".to_string()))
    }

    fn destination_port_info(&self, index: PortIndex) -> Result<PortInfo> {
        let guard = self.lock_ports()?;
        guard
            .destinations
            .get(index)
            .cloned()
            .ok_or(MidiError::InvalidPortIndex {
                direction: PortDirection::Destination,
                index,
                count: guard.destinations.len(),
            })
    }

    fn source_port_info(&self, index: PortIndex) -> Result<PortInfo> {
        let guard = self.lock_ports()?;
        guard
            .sources
            .get(index)
            .map(|source| source.info.clone())
            .ok_or(MidiError::InvalidPortIndex {
                direction: PortDirection::Source,
                index,
                count: guard.sources.len(),
            })
    }

    fn number_of_sources(&self) -> usize {
        self.ports.lock().map(|guard| guard.sources.len()).unwrap_or(0)
    }

    fn number_of_destinations(&self) -> usize {
        self.ports
            .lock()
            .map(|guard| guard.destinations.len())
            .unwrap_or(0)
    }

    fn set_on_message_received(&mut self, callback: Option<MessageCallback>) {
        self.set_slot(|slots| slots.on_message_received = callback);
    }

    fn set_on_source_port_added(&mut self, callback: Option<PortCallback>) {
        self.set_slot(|slots| slots.on_source_port_added = callback);
    }

    fn set_on_source_port_removed(&mut self, callback: Option<PortCallback>) {
        self.set_slot(|slots| slots.on_source_port_removed = callback);
    }

    fn set_on_destination_port_added(&mut self, callback: Option<PortCallback>) {
        self.set_slot(|slots| slots.on_destination_port_added = callback);
    }

    fn set_on_destination_port_removed(&mut self, callback: Option<PortCallback>) {
        self.set_slot(|slots| slots.on_destination_port_removed = callback);
    }
}

impl Drop for MidirDriver {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        let _ = self.command_tx.send(OutputCommand::Shutdown);
        if let Some(handle) = self.watcher.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.output.take() {
            let _ = handle.join();
        }
        // close input connections outside the ports lock; their closures own
        // Arc clones of it, so leaving them open would also leak the state
        let connections: Vec<_> = match self.ports.lock() {
            Ok(mut guard) => guard
                .sources
                .iter_mut()
                .map(|source| source.connection.take())
                .collect(),
            Err(_) => Vec::new(),
        };
        drop(connections);
    }
}

fn source_info(midi_in: &MidiInput, port: &MidiInputPort) -> PortInfo {
    // midir exposes no manufacturer or version fields
    PortInfo {
        id: port.id(),
        name: midi_in.port_name(port).unwrap_or_default(),
        manufacturer: String::new(),
        version: String::new(),
    }
}

fn destination_info(midi_out: &MidiOutput, port: &MidiOutputPort) -> PortInfo {
    PortInfo {
        id: port.id(),
        name: midi_out.port_name(port).unwrap_or_default(),
        manufacturer: String::new(),
        version: String::new(),
    }
}

fn populate_initial_ports(
    ports: &Arc<Mutex<Ports>>,
    callbacks: &Arc<Mutex<CallbackSlots>>,
) -> Result<()> {
    let midi_in = MidiInput::new(CLIENT_NAME)?;
    let midi_out = MidiOutput::new(CLIENT_NAME)?;

    let mut sources = Vec::new();
    for port in midi_in.ports() {
        let info = source_info(&midi_in, &port);
        let connection = match connect_source(ports, callbacks, &port, info.id.clone()) {
            Ok(connection) => Some(connection),
            Err(err) => {
                warn!("could not open source port {}: {}", info.name, err);
                None
            }
        };
        sources.push(SourcePort { info, connection });
    }

    let destinations = midi_out
        .ports()
        .iter()
        .map(|port| destination_info(&midi_out, port))
        .collect();

    let mut guard = ports
        .lock()
        .map_err(|_| MidiError::BackendUnavailable("driver state poisoned".to_string()))?;
    guard.sources = sources;
    guard.destinations = destinations;
    debug!(
        "initial port set: {} sources, {} destinations",
        guard.sources.len(),
        guard.destinations.len()
    );
    Ok(())
}

fn connect_source(
    ports: &Arc<Mutex<Ports>>,
    callbacks: &Arc<Mutex<CallbackSlots>>,
    port: &MidiInputPort,
    port_id: String,
) -> Result<MidiInputConnection<()>> {
    let mut midi_in = MidiInput::new(CLIENT_NAME)?;
    midi_in.ignore(Ignore::None);

    let ports = Arc::clone(ports);
    let callbacks = Arc::clone(callbacks);
    let connection = midi_in.connect(
        port,
        "midishimrs-input",
        move |timestamp, bytes, _| {
            dispatch_inbound(&ports, &callbacks, &port_id, bytes, timestamp);
        },
        (),
    )?;
    Ok(connection)
}

fn dispatch_inbound(
    ports: &Arc<Mutex<Ports>>,
    callbacks: &Arc<Mutex<CallbackSlots>>,
    port_id: &str,
    bytes: &[u8],
    timestamp: u64,
) {
    // the port's index can have shifted since connect, so resolve it per event
    let index = match ports.lock() {
        Ok(guard) => guard.sources.iter().position(|s| s.info.id == port_id),
        Err(_) => None,
    };
    let Some(index) = index else { return };
    if let Ok(mut slots) = callbacks.lock() {
        if let Some(callback) = slots.on_message_received.as_mut() {
            callback(index, bytes, timestamp);
        }
    }
}

fn fire_port_callback(callbacks: &Arc<Mutex<CallbackSlots>>, event: PortEvent, index: PortIndex) {
    let Ok(mut slots) = callbacks.lock() else { return };
    let slot = match event {
        PortEvent::SourceAdded => &mut slots.on_source_port_added,
        PortEvent::SourceRemoved => &mut slots.on_source_port_removed,
        PortEvent::DestinationAdded => &mut slots.on_destination_port_added,
        PortEvent::DestinationRemoved => &mut slots.on_destination_port_removed,
    };
    if let Some(callback) = slot.as_mut() {
        callback(index);
    }
}

fn run_hotplug_watcher(
    ports: Arc<Mutex<Ports>>,
    callbacks: Arc<Mutex<CallbackSlots>>,
    running: Arc<AtomicBool>,
) {
    info!("hotplug watcher started");
    while running.load(Ordering::SeqCst) {
        poll_source_ports(&ports, &callbacks);
        poll_destination_ports(&ports, &callbacks);
        thread::sleep(HOTPLUG_POLL_INTERVAL);
    }
    info!("hotplug watcher stopping");
}

fn poll_source_ports(ports: &Arc<Mutex<Ports>>, callbacks: &Arc<Mutex<CallbackSlots>>) {
    let midi_in = match MidiInput::new(CLIENT_NAME) {
        Ok(midi_in) => midi_in,
        Err(err) => {
            warn!("source port poll failed: {}", err);
            return;
        }
    };
    let live_ports = midi_in.ports();
    let live_ids: Vec<String> = live_ports.iter().map(|port| port.id()).collect();

    // removals first; each removal fires with the port's index at the time
    // it is dropped, and every later port shifts down one
    loop {
        let removed = {
            let Ok(mut guard) = ports.lock() else { return };
            match guard
                .sources
                .iter()
                .position(|s| !live_ids.contains(&s.info.id))
            {
                Some(index) => Some((index, guard.sources.remove(index))),
                None => None,
            }
        };
        let Some((index, port)) = removed else { break };
        info!("source port removed: {} (index {})", port.info.name, index);
        // the connection must drop outside the ports lock: its callback
        // thread may be blocked on that same lock
        drop(port.connection);
        fire_port_callback(callbacks, PortEvent::SourceRemoved, index);
    }

    // additions append at the end
    for port in &live_ports {
        let id = port.id();
        let known = match ports.lock() {
            Ok(guard) => guard.sources.iter().any(|s| s.info.id == id),
            Err(_) => return,
        };
        if known {
            continue;
        }
        let info = source_info(&midi_in, port);
        let connection = match connect_source(ports, callbacks, port, id) {
            Ok(connection) => Some(connection),
            Err(err) => {
                warn!("could not open source port {}: {}", info.name, err);
                None
            }
        };
        let index = {
            let Ok(mut guard) = ports.lock() else { return };
            guard.sources.push(SourcePort {
                info: info.clone(),
                connection,
            });
            guard.sources.len() - 1
        };
        info!("source port added: {} (index {})", info.name, index);
        fire_port_callback(callbacks, PortEvent::SourceAdded, index);
    }
}

fn poll_destination_ports(ports: &Arc<Mutex<Ports>>, callbacks: &Arc<Mutex<CallbackSlots>>) {
    let midi_out = match MidiOutput::new(CLIENT_NAME) {
        Ok(midi_out) => midi_out,
        Err(err) => {
            warn!("destination port poll failed: {}", err);
            return;
        }
    };
    let live_ports = midi_out.ports();
    let live_ids: Vec<String> = live_ports.iter().map(|port| port.id()).collect();

    loop {
        let removed = {
            let Ok(mut guard) = ports.lock() else { return };
            match guard
                .destinations
                .iter()
                .position(|info| !live_ids.contains(&info.id))
            {
                Some(index) => Some((index, guard.destinations.remove(index))),
                None => None,
            }
        };
        let Some((index, info)) = removed else { break };
        info!("destination port removed: {} (index {})", info.name, index);
        fire_port_callback(callbacks, PortEvent::DestinationRemoved, index);
    }

    for port in &live_ports {
        let id = port.id();
        let known = match ports.lock() {
            Ok(guard) => guard.destinations.iter().any(|info| info.id == id),
            Err(_) => return,
        };
        if known {
            continue;
        }
        let info = destination_info(&midi_out, port);
        let index = {
            let Ok(mut guard) = ports.lock() else { return };
            guard.destinations.push(info.clone());
            guard.destinations.len() - 1
        };
        info!("destination port added: {} (index {})", info.name, index);
        fire_port_callback(callbacks, PortEvent::DestinationAdded, index);
    }
}

fn run_output_loop(command_rx: Receiver<OutputCommand>) {
    info!("output thread started");
    let mut queue = OutputQueue::new();
    let mut connections: HashMap<String, MidiOutputConnection> = HashMap::new();

    loop {
        let timeout = queue
            .next_due()
            .map(|due| due.saturating_duration_since(Instant::now()))
            .unwrap_or(OUTPUT_IDLE_TIMEOUT);
        match command_rx.recv_timeout(timeout) {
            Ok(OutputCommand::Send { port_id, data, due }) => queue.push(port_id, data, due),
            Ok(OutputCommand::Clear { port_id }) => {
                let dropped = queue.clear_port(&port_id);
                debug!("cleared {} pending sends for {}", dropped, port_id);
            }
            Ok(OutputCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        let now = Instant::now();
        while let Some(send) = queue.pop_due(now) {
            if let Err(err) = deliver(&mut connections, &send.port_id, &send.data) {
                error!("failed to send to {}: {}", send.port_id, err);
                // stale connections are reopened on the next send
                connections.remove(&send.port_id);
            }
        }
    }
    info!("output thread stopping");
}

fn deliver(
    connections: &mut HashMap<String, MidiOutputConnection>,
    port_id: &str,
    data: &[u8],
) -> Result<()> {
    let connection = match connections.entry(port_id.to_string()) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => entry.insert(open_destination(port_id)?),
    };
    connection.send(data)?;
    Ok(())
}

fn open_destination(port_id: &str) -> Result<MidiOutputConnection> {
    let midi_out = MidiOutput::new(CLIENT_NAME)?;
    let out_ports = midi_out.ports();
    let port = out_ports
        .iter()
        .find(|port| port.id() == port_id)
        .ok_or_else(|| MidiError::ConnectionError(format!("destination port {} is gone", port_id)))?;
    let name = midi_out.port_name(port).unwrap_or_default();
    info!("connecting to MIDI output port: {}", name);
    Ok(midi_out.connect(port, "midishimrs-output")?)
}
