use crate::midi::driver::{
    CallbackSlots, MessageCallback, MidiDriver, MidiError, PortCallback, PortDirection, PortIndex,
    PortInfo, Result,
};

/// Handler observing outbound sends on the test double: bytes, destination
/// index, deltatime in milliseconds
pub type SendObserver = Box<dyn FnMut(&[u8], PortIndex, f64) + Send>;

/// One recorded `send_message` call
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub data: Vec<u8>,
    pub destination: PortIndex,
    pub deltatime_ms: f64,
}

/// Test double satisfying [`MidiDriver`] without touching real hardware.
///
/// The simulated port counts are plain fields: tests either set them
/// directly or drive them through the `simulate_*` port calls. Every
/// outbound `send_message`/`clear` is recorded and reported through the
/// observation hooks, and the `simulate_*` methods fire the same
/// notification paths a real backend would.
///
/// Receive timestamps come from an internal microsecond counter advanced by
/// each simulated deltatime, so tests see deterministic values.
pub struct MockMidiDriver {
    num_input_ports: usize,
    num_output_ports: usize,
    callbacks: CallbackSlots,
    on_send_message_called: Option<SendObserver>,
    on_clear_called: Option<PortCallback>,
    sent_messages: Vec<SentMessage>,
    cleared_ports: Vec<PortIndex>,
    clock_us: u64,
}

impl Default for MockMidiDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMidiDriver {
    pub fn new() -> Self {
        MockMidiDriver {
            num_input_ports: 0,
            num_output_ports: 0,
            callbacks: CallbackSlots::default(),
            on_send_message_called: None,
            on_clear_called: None,
            sent_messages: Vec::new(),
            cleared_ports: Vec::new(),
            clock_us: 0,
        }
    }

    /// Sets the simulated source count without firing notifications
    pub fn set_num_input_ports(&mut self, count: usize) {
        self.num_input_ports = count;
    }

    /// Sets the simulated destination count without firing notifications
    pub fn set_num_output_ports(&mut self, count: usize) {
        self.num_output_ports = count;
    }

    /// Every `send_message` call recorded so far, in order
    pub fn sent_messages(&self) -> &[SentMessage] {
        &self.sent_messages
    }

    /// Every `clear` call recorded so far, in order
    pub fn cleared_ports(&self) -> &[PortIndex] {
        &self.cleared_ports
    }

    /// Registers the observer fired on each `send_message` call
    pub fn set_on_send_message_called(&mut self, callback: Option<SendObserver>) {
        self.on_send_message_called = callback;
    }

    /// Registers the observer fired on each `clear` call
    pub fn set_on_clear_called(&mut self, callback: Option<PortCallback>) {
        self.on_clear_called = callback;
    }

    /// Fires `on_message_received` as if `data` arrived on source port
    /// `source`, `deltatime_ms` after the previous simulated event.
    pub fn simulate_receiving_message(
        &mut self,
        data: &[u8],
        source: PortIndex,
        deltatime_ms: f64,
    ) {
        debug_assert!(
            source < self.num_input_ports,
            "simulated receive on unknown source port {}",
            source
        );
        self.clock_us = self
            .clock_us
            .saturating_add((deltatime_ms.max(0.0) * 1000.0) as u64);
        let timestamp = self.clock_us;
        if let Some(callback) = self.callbacks.on_message_received.as_mut() {
            callback(source, data, timestamp);
        }
    }

    /// Adds a simulated source port and fires `on_source_port_added`
    pub fn simulate_adding_input_port(&mut self, index: PortIndex) {
        debug_assert!(
            index <= self.num_input_ports,
            "simulated input port {} added beyond count {}",
            index,
            self.num_input_ports
        );
        self.num_input_ports += 1;
        if let Some(callback) = self.callbacks.on_source_port_added.as_mut() {
            callback(index);
        }
    }

    /// Removes a simulated source port and fires `on_source_port_removed`
    pub fn simulate_removing_input_port(&mut self, index: PortIndex) {
        debug_assert!(
            index < self.num_input_ports,
            "simulated removal of unknown input port {}",
            index
        );
        self.num_input_ports = self.num_input_ports.saturating_sub(1);
        if let Some(callback) = self.callbacks.on_source_port_removed.as_mut() {
            callback(index);
        }
    }

    /// Adds a simulated destination port and fires `on_destination_port_added`
    pub fn simulate_adding_output_port(&mut self, index: PortIndex) {
        debug_assert!(
            index <= self.num_output_ports,
            "simulated output port {} added beyond count {}",
            index,
            self.num_output_ports
        );
        self.num_output_ports += 1;
        if let Some(callback) = self.callbacks.on_destination_port_added.as_mut() {
            callback(index);
        }
    }

    /// Removes a simulated destination port and fires
    /// `on_destination_port_removed`
    pub fn simulate_removing_output_port(&mut self, index: PortIndex) {
        debug_assert!(
            index < self.num_output_ports,
            "simulated removal of unknown output port {}",
            index
        );
        self.num_output_ports = self.num_output_ports.saturating_sub(1);
        if let Some(callback) = self.callbacks.on_destination_port_removed.as_mut() {
            callback(index);
        }
    }

    fn port_info(direction: PortDirection, index: PortIndex) -> PortInfo {
        match direction {
            PortDirection::Source => PortInfo {
                id: format!("mock-in-{}", index),
                name: format!("Mock Input {}", index),
                manufacturer: "midishimrs".to_string(),
                version: "0.1.0".to_string(),
            },
            PortDirection::Destination => PortInfo {
                id: format!("mock-out-{}", index),
                name: format!("Mock Output {}", index),
                manufacturer: "midishimrs".to_string(),
                version: "0.1.0".to_string(),
            },
        }
    }
}

impl MidiDriver for MockMidiDriver {
    fn send_message(
        &mut self,
        data: &[u8],
        destination: PortIndex,
        deltatime_ms: f64,
    ) -> Result<()> {
        if destination >= self.num_output_ports {
            return Err(MidiError::InvalidPortIndex {
                direction: PortDirection::Destination,
                index: destination,
                count: self.num_output_ports,
            });
        }
        self.sent_messages.push(SentMessage {
            data: data.to_vec(),
            destination,
            deltatime_ms,
        });
        if let Some(callback) = self.on_send_message_called.as_mut() {
            callback(data, destination, deltatime_ms);
        }
        Ok(())
    }

    fn clear(&mut self, destination: PortIndex) -> Result<()> {
        if destination >= self.num_output_ports {
            return Err(MidiError::InvalidPortIndex {
                direction: PortDirection::Destination,
                index: destination,
                count: self.num_output_ports,
            });
        }
        self.cleared_ports.push(destination);
        if let Some(callback) = self.on_clear_called.as_mut() {
            callback(destination);
        }
        Ok(())
    }

    fn destination_port_info(&self, index: PortIndex) -> Result<PortInfo> {
        if index >= self.num_output_ports {
            return Err(MidiError::InvalidPortIndex {
                direction: PortDirection::Destination,
                index,
                count: self.num_output_ports,
            });
        }
        Ok(Self::port_info(PortDirection::Destination, index))
    }

    fn source_port_info(&self, index: PortIndex) -> Result<PortInfo> {
        if index >= self.num_input_ports {
            return Err(MidiError::InvalidPortIndex {
                direction: PortDirection::Source,
                index,
                count: self.num_input_ports,
            });
        }
        Ok(Self::port_info(PortDirection::Source, index))
    }

    fn number_of_sources(&self) -> usize {
        self.num_input_ports
    }

    fn number_of_destinations(&self) -> usize {
        self.num_output_ports
    }

    fn set_on_message_received(&mut self, callback: Option<MessageCallback>) {
        self.callbacks.on_message_received = callback;
    }

    fn set_on_source_port_added(&mut self, callback: Option<PortCallback>) {
        self.callbacks.on_source_port_added = callback;
    }

    fn set_on_source_port_removed(&mut self, callback: Option<PortCallback>) {
        self.callbacks.on_source_port_removed = callback;
    }

    fn set_on_destination_port_added(&mut self, callback: Option<PortCallback>) {
        self.callbacks.on_destination_port_added = callback;
    }

    fn set_on_destination_port_removed(&mut self, callback: Option<PortCallback>) {
        self.callbacks.on_destination_port_removed = callback;
    }
}
