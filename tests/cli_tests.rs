#[cfg(test)]
mod tests {
    use clap::Parser;
    use midishimrs::cli::{validate_destination, Args};
    use midishimrs::collect_port_list;
    use midishimrs::midi::{MidiDriver, MockMidiDriver};

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["test"]);
        assert!(!args.port_list);
        assert!(!args.monitor);
        assert!(!args.send_test_note);
        assert_eq!(args.destination, 0);
        assert_eq!(args.deltatime, 0.0);
    }

    #[test]
    fn test_args_port_list() {
        let args = Args::parse_from(["test", "--port-list"]);
        assert!(args.port_list);
    }

    #[test]
    fn test_args_monitor() {
        let args = Args::parse_from(["test", "--monitor"]);
        assert!(args.monitor);
    }

    #[test]
    fn test_args_send_test_note_with_destination_and_deltatime() {
        let args = Args::parse_from([
            "test",
            "--send-test-note",
            "--destination",
            "2",
            "--deltatime",
            "125.5",
        ]);
        assert!(args.send_test_note);
        assert_eq!(args.destination, 2);
        assert_eq!(args.deltatime, 125.5);
    }

    #[test]
    fn test_valid_destination_index() {
        assert!(validate_destination(0, 1).is_ok());
        assert!(validate_destination(2, 3).is_ok());
    }

    #[test]
    fn test_invalid_destination_index() {
        let error_msg = validate_destination(1, 1).expect_err("index 1 of 1 should be rejected");
        assert!(error_msg.contains("out of range"));
        assert!(error_msg.contains('1'));

        assert!(validate_destination(0, 0).is_err());
    }

    #[test]
    fn test_collect_port_list_snapshots_mock_ports() {
        let mut driver = MockMidiDriver::new();
        driver.set_num_input_ports(2);
        driver.set_num_output_ports(1);

        let (sources, destinations) =
            collect_port_list(&driver).expect("mock ports should enumerate");

        assert_eq!(sources.len(), 2);
        assert_eq!(destinations.len(), 1);
        assert_eq!(sources[0].name, "Mock Input 0");
        assert_eq!(sources[1].name, "Mock Input 1");
        assert_eq!(destinations[0].name, "Mock Output 0");
    }

    #[test]
    fn test_collect_port_list_empty_driver() {
        let driver = MockMidiDriver::new();
        let (sources, destinations) = collect_port_list(&driver).expect("empty lists are fine");
        assert!(sources.is_empty());
        assert!(destinations.is_empty());
        assert_eq!(driver.number_of_sources(), 0);
    }
}
