use std::error::Error;
use std::fmt;

/// Positional identifier of a port within the current source or destination
/// list. Indices are contiguous; removing index `i` shifts every later port
/// down by one.
pub type PortIndex = usize;

/// Receipt time of an inbound message, in backend-defined units. The midir
/// backend reports microseconds since an unspecified epoch.
pub type Timestamp = u64;

/// Whether a port is a message source (input) or destination (output)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    Source,
    Destination,
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortDirection::Source => write!(f, "source"),
            PortDirection::Destination => write!(f, "destination"),
        }
    }
}

/// Immutable snapshot describing one MIDI port.
///
/// Fields a backend cannot fill are left empty rather than omitted, so a
/// valid index always yields a fully-formed record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PortInfo {
    pub id: String,
    pub name: String,
    pub manufacturer: String,
    pub version: String,
}

/// Custom error type for driver operations
#[derive(Debug)]
pub enum MidiError {
    /// A port index at or beyond the current port count
    InvalidPortIndex {
        direction: PortDirection,
        index: PortIndex,
        count: usize,
    },
    /// The underlying MIDI services could not be reached
    BackendUnavailable(String),
    /// Error when sending a MIDI message
    SendError(String),
    /// Error when opening a port connection
    ConnectionError(String),
}

impl fmt::Display for MidiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MidiError::InvalidPortIndex {
                direction,
                index,
                count,
            } => write!(
                f,
                "invalid {} port index {} (current count: {})",
                direction, index, count
            ),
            MidiError::BackendUnavailable(msg) => write!(f, "MIDI backend unavailable: {}", msg),
            MidiError::SendError(msg) => write!(f, "MIDI send error: {}", msg),
            MidiError::ConnectionError(msg) => write!(f, "MIDI connection error: {}", msg),
        }
    }
}

impl Error for MidiError {}

impl From<midir::InitError> for MidiError {
    fn from(err: midir::InitError) -> Self {
        MidiError::BackendUnavailable(err.to_string())
    }
}

impl<T> From<midir::ConnectError<T>> for MidiError {
    fn from(err: midir::ConnectError<T>) -> Self {
        MidiError::ConnectionError(err.to_string())
    }
}

impl From<midir::SendError> for MidiError {
    fn from(err: midir::SendError) -> Self {
        MidiError::SendError(err.to_string())
    }
}

/// Result type for driver operations
pub type Result<T> = std::result::Result<T, MidiError>;

/// Handler for inbound messages: source port index, raw bytes, receipt time
pub type MessageCallback = Box<dyn FnMut(PortIndex, &[u8], Timestamp) + Send>;

/// Handler for port add/remove notifications
pub type PortCallback = Box<dyn FnMut(PortIndex) + Send>;

/// The single-slot notification handlers shared by driver implementations.
/// Assigning a slot overwrites the previous handler; `None` clears it.
#[derive(Default)]
pub(crate) struct CallbackSlots {
    pub on_message_received: Option<MessageCallback>,
    pub on_source_port_added: Option<PortCallback>,
    pub on_source_port_removed: Option<PortCallback>,
    pub on_destination_port_added: Option<PortCallback>,
    pub on_destination_port_removed: Option<PortCallback>,
}

/// Trait defining the contract any MIDI driver backend must satisfy.
///
/// A consumer enumerates ports, sends timestamped messages, and registers
/// handlers for asynchronous port/message notifications without knowing
/// whether the backend talks to real hardware or is a test double.
///
/// Backends may invoke handlers from an internal I/O thread; handler
/// assignment is synchronized by the implementation.
pub trait MidiDriver: Send {
    /// Queues `data` for the given destination, `deltatime_ms` milliseconds
    /// from now. Zero means send immediately. A queued send cannot be
    /// retracted except via [`MidiDriver::clear`].
    fn send_message(&mut self, data: &[u8], destination: PortIndex, deltatime_ms: f64)
        -> Result<()>;

    /// Drops any pending scheduled output for the given destination.
    fn clear(&mut self, destination: PortIndex) -> Result<()>;

    /// Port details for a destination index
    fn destination_port_info(&self, index: PortIndex) -> Result<PortInfo>;

    /// Port details for a source index
    fn source_port_info(&self, index: PortIndex) -> Result<PortInfo>;

    /// Current count of live source ports
    fn number_of_sources(&self) -> usize;

    /// Current count of live destination ports
    fn number_of_destinations(&self) -> usize;

    /// Registers the inbound-message handler
    fn set_on_message_received(&mut self, callback: Option<MessageCallback>);

    /// Registers the source-port-added handler
    fn set_on_source_port_added(&mut self, callback: Option<PortCallback>);

    /// Registers the source-port-removed handler
    fn set_on_source_port_removed(&mut self, callback: Option<PortCallback>);

    /// Registers the destination-port-added handler
    fn set_on_destination_port_added(&mut self, callback: Option<PortCallback>);

    /// Registers the destination-port-removed handler
    fn set_on_destination_port_removed(&mut self, callback: Option<PortCallback>);
}
