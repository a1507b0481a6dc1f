use midishimrs::midi::{
    MessageCallback, MidiDriver, MidiError, PortCallback, PortDirection, PortIndex, PortInfo,
};
use std::error::Error;

#[test]
fn test_invalid_port_index_display() {
    let error = MidiError::InvalidPortIndex {
        direction: PortDirection::Destination,
        index: 3,
        count: 2,
    };
    assert_eq!(
        error.to_string(),
        "invalid destination port index 3 (current count: 2)"
    );

    let error = MidiError::InvalidPortIndex {
        direction: PortDirection::Source,
        index: 0,
        count: 0,
    };
    assert_eq!(
        error.to_string(),
        "invalid source port index 0 (current count: 0)"
    );
}

#[test]
fn test_midi_error_display() {
    let backend_error = MidiError::BackendUnavailable("no MIDI services".to_string());
    let send_error = MidiError::SendError("Failed to send".to_string());
    let conn_error = MidiError::ConnectionError("Failed to connect".to_string());

    assert_eq!(
        backend_error.to_string(),
        "MIDI backend unavailable: no MIDI services"
    );
    assert_eq!(send_error.to_string(), "MIDI send error: Failed to send");
    assert_eq!(
        conn_error.to_string(),
        "MIDI connection error: Failed to connect"
    );
}

#[test]
fn test_midi_error_debug() {
    let error = MidiError::SendError("test error".to_string());
    let debug_str = format!("{:?}", error);
    assert!(debug_str.contains("SendError"));
    assert!(debug_str.contains("test error"));
}

#[test]
fn test_midi_error_as_error() {
    let error = MidiError::BackendUnavailable("test".to_string());
    let _: &dyn Error = &error; // Verify it implements Error trait
}

#[test]
fn test_port_info_defaults_to_empty_fields() {
    let info = PortInfo::default();
    assert!(info.id.is_empty());
    assert!(info.name.is_empty());
    assert!(info.manufacturer.is_empty());
    assert!(info.version.is_empty());
}

#[test]
fn test_port_info_clone_and_equality() {
    let info = PortInfo {
        id: "port-0".to_string(),
        name: "Test Port".to_string(),
        manufacturer: "Test Maker".to_string(),
        version: "1.0".to_string(),
    };
    let cloned = info.clone();
    assert_eq!(info, cloned);

    let other = PortInfo {
        name: "Other Port".to_string(),
        ..cloned
    };
    assert_ne!(info, other);
}

// Minimal implementation for exercising the contract as a trait object
struct NullDriver {
    sources: usize,
    destinations: usize,
    on_message_received: Option<MessageCallback>,
}

impl NullDriver {
    fn new(sources: usize, destinations: usize) -> Self {
        Self {
            sources,
            destinations,
            on_message_received: None,
        }
    }

    fn invalid(direction: PortDirection, index: PortIndex, count: usize) -> MidiError {
        MidiError::InvalidPortIndex {
            direction,
            index,
            count,
        }
    }
}

impl MidiDriver for NullDriver {
    fn send_message(
        &mut self,
        _data: &[u8],
        destination: PortIndex,
        _deltatime_ms: f64,
    ) -> midishimrs::midi::Result<()> {
        if destination >= self.destinations {
            return Err(Self::invalid(
                PortDirection::Destination,
                destination,
                self.destinations,
            ));
        }
        Ok(())
    }

    fn clear(&mut self, destination: PortIndex) -> midishimrs::midi::Result<()> {
        if destination >= self.destinations {
            return Err(Self::invalid(
                PortDirection::Destination,
                destination,
                self.destinations,
            ));
        }
        Ok(())
    }

    fn destination_port_info(&self, index: PortIndex) -> midishimrs::midi::Result<PortInfo> {
        if index >= self.destinations {
            return Err(Self::invalid(
                PortDirection::Destination,
                index,
                self.destinations,
            ));
        }
        Ok(PortInfo::default())
    }

    fn source_port_info(&self, index: PortIndex) -> midishimrs::midi::Result<PortInfo> {
        if index >= self.sources {
            return Err(Self::invalid(PortDirection::Source, index, self.sources));
        }
        Ok(PortInfo::default())
    }

    fn number_of_sources(&self) -> usize {
        self.sources
    }

    fn number_of_destinations(&self) -> usize {
        self.destinations
    }

    fn set_on_message_received(&mut self, callback: Option<MessageCallback>) {
        self.on_message_received = callback;
    }

    fn set_on_source_port_added(&mut self, _callback: Option<PortCallback>) {}

    fn set_on_source_port_removed(&mut self, _callback: Option<PortCallback>) {}

    fn set_on_destination_port_added(&mut self, _callback: Option<PortCallback>) {}

    fn set_on_destination_port_removed(&mut self, _callback: Option<PortCallback>) {}
}

#[test]
fn test_contract_usable_as_trait_object() {
    let mut driver: Box<dyn MidiDriver> = Box::new(NullDriver::new(1, 2));

    assert_eq!(driver.number_of_sources(), 1);
    assert_eq!(driver.number_of_destinations(), 2);
    assert!(driver.send_message(&[0x90, 60, 100], 1, 0.0).is_ok());
    assert!(driver.clear(0).is_ok());
    driver.set_on_message_received(Some(Box::new(|_, _, _| {})));
}

#[test]
fn test_out_of_range_indices_are_rejected() {
    let mut driver = NullDriver::new(1, 1);

    let result = driver.send_message(&[0xF8], 1, 0.0);
    match result {
        Err(MidiError::InvalidPortIndex {
            direction,
            index,
            count,
        }) => {
            assert_eq!(direction, PortDirection::Destination);
            assert_eq!(index, 1);
            assert_eq!(count, 1);
        }
        other => panic!("Expected InvalidPortIndex, got {:?}", other),
    }

    assert!(driver.source_port_info(1).is_err());
    assert!(driver.destination_port_info(1).is_err());
    assert!(driver.source_port_info(0).is_ok());
    assert!(driver.destination_port_info(0).is_ok());
}
