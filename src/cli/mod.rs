use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// List current MIDI sources and destinations
    #[arg(long)]
    pub port_list: bool,

    /// Watch port and message events until interrupted
    #[arg(long)]
    pub monitor: bool,

    /// Send a middle C test note
    #[arg(long)]
    pub send_test_note: bool,

    /// Destination port index for --send-test-note
    #[arg(long, default_value_t = 0)]
    pub destination: usize,

    /// Scheduling offset in milliseconds for --send-test-note
    #[arg(long, default_value_t = 0.0)]
    pub deltatime: f64,
}

pub fn validate_destination(index: usize, count: usize) -> Result<(), String> {
    if index >= count {
        return Err(format!(
            "Error: Destination index {} is out of range ({} destination{} available)",
            index,
            count,
            if count == 1 { "" } else { "s" }
        ));
    }
    Ok(())
}
