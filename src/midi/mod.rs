//! MIDI driver layer for the Web MIDI shim
//!
//! This module provides the driver-facing contract and its implementations:
//! - Port enumeration and port info queries
//! - Timestamped message output with per-destination clearing
//! - Asynchronous port add/remove and message notifications
//!
//! The main components are:
//! - [`MidiDriver`] trait: the contract any backend must satisfy
//! - [`MidirDriver`] for real MIDI device communication
//! - [`MockMidiDriver`] for testing consumers without hardware
//!
mod driver;
mod schedule;
pub mod midir_driver;
pub mod mock_driver;

// Re-export the contract types
pub use driver::{
    MessageCallback, MidiDriver, MidiError, PortCallback, PortDirection, PortIndex, PortInfo,
    Result, Timestamp,
};

// Re-export concrete implementations
pub use midir_driver::MidirDriver;
pub use mock_driver::{MockMidiDriver, SendObserver, SentMessage};

// Set default driver type
pub type DefaultMidiDriver = MidirDriver;
