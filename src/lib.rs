pub mod cli;
pub mod logging;
pub mod midi;
pub mod ui;

use midi::{MidiDriver, PortInfo};

/// Snapshots the current source and destination port lists of a driver
pub fn collect_port_list(driver: &dyn MidiDriver) -> midi::Result<(Vec<PortInfo>, Vec<PortInfo>)> {
    let mut sources = Vec::with_capacity(driver.number_of_sources());
    for index in 0..driver.number_of_sources() {
        sources.push(driver.source_port_info(index)?);
    }

    let mut destinations = Vec::with_capacity(driver.number_of_destinations());
    for index in 0..driver.number_of_destinations() {
        destinations.push(driver.destination_port_info(index)?);
    }

    Ok((sources, destinations))
}
