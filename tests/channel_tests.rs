//! Behaviour of a channel obtained from a registry, end to end over mock
//! devices.

mod common;

use common::{busy_device, counting_opener, missing_device, mock_opener};
use port_channel::port::{MockSerialPort, PortError};
use port_channel::{
    ChannelError, ChannelRegistry, CloseOutcome, OpenOutcome, ReadOutcome, Utf8Encoder,
    WriteOutcome, LINE_SEPARATOR,
};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

// ============================================================================
// Open
// ============================================================================

mod open_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_open_reports_unavailable_device() {
        let registry = ChannelRegistry::new();

        let outcome = registry.open_with("COM42", 9600, missing_device).unwrap();
        assert!(matches!(outcome, OpenOutcome::Unavailable(PortError::NotFound(ref name)) if name == "COM42"));

        let outcome = registry.open_with("COM42", 9600, busy_device).unwrap();
        assert!(outcome.into_channel().is_none());
        assert!(registry.current().is_none());
    }

    #[test]
    fn test_first_caller_parameters_win() {
        let registry = ChannelRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let first = registry
            .open_with("MOCK0", 9600, counting_opener(&MockSerialPort::new("MOCK0"), &counter))
            .unwrap()
            .into_channel()
            .unwrap();
        let second = registry
            .open_with("MOCK1", 115_200, counting_opener(&MockSerialPort::new("MOCK1"), &counter))
            .unwrap()
            .into_channel()
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.port_name(), "MOCK0");
        assert_eq!(second.baud_rate(), 9600);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_open_constructs_one_device() {
        let registry = Arc::new(ChannelRegistry::new());
        let counter = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                let counter = Arc::clone(&counter);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let mock = MockSerialPort::new(format!("MOCK{i}"));
                    barrier.wait();
                    registry
                        .open_with("MOCK", 9600, counting_opener(&mock, &counter))
                        .unwrap()
                        .into_channel()
                        .unwrap()
                })
            })
            .collect();

        let channels: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(channels.iter().all(|c| Arc::ptr_eq(c, &channels[0])));
    }

    #[test]
    fn test_slot_is_reusable_after_teardown() {
        let registry = ChannelRegistry::new();
        let first_device = MockSerialPort::new("MOCK0");
        let first = registry
            .open_with("MOCK0", 9600, mock_opener(&first_device))
            .unwrap()
            .into_channel()
            .unwrap();

        assert_eq!(registry.close(), CloseOutcome::Closed);
        assert!(first_device.is_closed());
        assert!(!first.is_open());

        let outcome = registry
            .open_with("MOCK1", 38_400, mock_opener(&MockSerialPort::new("MOCK1")))
            .unwrap();
        let second = match outcome {
            OpenOutcome::Opened(channel) => channel,
            other => panic!("Expected a fresh channel, got: {:?}", other),
        };
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.baud_rate(), 38_400);
    }

    #[test]
    fn test_teardown_without_channel_is_guarded() {
        let registry = ChannelRegistry::new();
        assert_eq!(registry.close(), CloseOutcome::NothingOpen);
    }

    proptest! {
        #[test]
        fn prop_baud_above_limit_is_out_of_range(baud in 128_001u32..=u32::MAX) {
            let registry = ChannelRegistry::new();
            let result = registry.open_with("COM1", baud, mock_opener(&MockSerialPort::new("COM1")));
            let is_out_of_range = matches!(
                result,
                Err(ChannelError::OutOfRange { param: "baud_rate", value, max: 128_000 }) if value == u64::from(baud)
            );
            prop_assert!(is_out_of_range);
            prop_assert!(registry.current().is_none());
        }

        #[test]
        fn prop_baud_within_limit_is_accepted(baud in 0u32..=128_000) {
            let registry = ChannelRegistry::new();
            let outcome = registry
                .open_with("COM1", baud, mock_opener(&MockSerialPort::new("COM1")))
                .unwrap();
            prop_assert_eq!(outcome.into_channel().map(|c| c.baud_rate()), Some(baud));
        }

        #[test]
        fn prop_blank_port_name_is_invalid(name in "[ \t\r\n]{0,8}") {
            let registry = ChannelRegistry::new();
            let result = registry.open_with(&name, 9600, mock_opener(&MockSerialPort::new("X")));
            let is_invalid = matches!(result, Err(ChannelError::InvalidArgument { param: "port_name" }));
            prop_assert!(is_invalid);
        }
    }
}

// ============================================================================
// Write / Read
// ============================================================================

mod io_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn open_loopback(registry: &ChannelRegistry) -> (MockSerialPort, Arc<port_channel::PortChannel>) {
        let device = MockSerialPort::loopback("LOOP0");
        let channel = registry
            .open_with("LOOP0", 9600, mock_opener(&device))
            .unwrap()
            .into_channel()
            .unwrap();
        (device, channel)
    }

    #[test]
    fn test_round_trip_through_echoing_device() {
        let registry = ChannelRegistry::new();
        let (_device, channel) = open_loopback(&registry);

        let message = "AT+CSQ\rAT+CREG?\r";
        assert_eq!(channel.write(message).unwrap().bytes_written(), message.len());

        let echoed = channel.read().unwrap().into_text().unwrap();
        assert_eq!(echoed, message.replace('\r', LINE_SEPARATOR));
    }

    #[test]
    fn test_blank_messages_are_rejected() {
        let registry = ChannelRegistry::new();
        let (device, channel) = open_loopback(&registry);

        for message in ["", "   ", "\t\r\n"] {
            assert!(matches!(
                channel.write(message),
                Err(ChannelError::InvalidArgument { param: "message" })
            ));
        }
        assert!(device.get_write_log().is_empty());
    }

    #[test]
    fn test_write_after_teardown_is_a_no_op() {
        let registry = ChannelRegistry::new();
        let (device, channel) = open_loopback(&registry);
        registry.close();

        assert!(matches!(channel.write("AT").unwrap(), WriteOutcome::NotOpen));
        assert!(device.get_write_log().is_empty());
        // Argument checks still apply on a closed channel.
        assert!(channel.write(" ").is_err());
    }

    #[test]
    fn test_read_without_pending_bytes_is_nothing() {
        let registry = ChannelRegistry::new();
        let (_device, channel) = open_loopback(&registry);

        let outcome = channel.read().unwrap();
        assert_eq!(outcome, ReadOutcome::Nothing);
        assert_eq!(outcome.into_text(), None);
    }

    #[test]
    fn test_read_timeout_yields_empty_text() {
        let registry = ChannelRegistry::new();
        let (device, channel) = open_loopback(&registry);
        device.enqueue_read(b"OK\r");
        device.set_should_timeout(true);

        assert_eq!(channel.read().unwrap().into_text(), Some(String::new()));
        // The bytes are still there for the next read.
        assert_eq!(
            channel.read().unwrap(),
            ReadOutcome::Data(format!("OK{LINE_SEPARATOR}"))
        );
    }

    #[test]
    fn test_suppressed_write_is_visible_but_not_an_error() {
        let registry = ChannelRegistry::new();
        let (device, channel) = open_loopback(&registry);
        device.fail_next(PortError::NotOpen);

        let outcome = channel.write("AT").unwrap();
        assert!(matches!(outcome, WriteOutcome::Suppressed(PortError::NotOpen)));
        assert_eq!(outcome.bytes_written(), 0);
    }

    #[test]
    fn test_registry_encoder_reaches_channels() {
        let registry = ChannelRegistry::with_encoder(Arc::new(Utf8Encoder));
        let device = MockSerialPort::new("MOCK0");
        let channel = registry
            .open_with("MOCK0", 9600, mock_opener(&device))
            .unwrap()
            .into_channel()
            .unwrap();

        channel.write("µ").unwrap();
        assert_eq!(device.get_write_log(), vec!["µ".as_bytes().to_vec()]);
    }
}
