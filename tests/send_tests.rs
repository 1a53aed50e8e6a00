mod common;

use common::*;
use rfm69::frame::{encode, Control, MAX_PAYLOAD_LEN};
use rfm69::{Error, RadioMode};

#[test]
fn can_send_in_standby_ignores_rssi() {
    let (mut radio, sim) = node(5, 100);
    sim.set_rssi(0);

    assert_eq!(radio.can_send(), Ok(true));
    assert_eq!(radio.mode(), RadioMode::Standby);
}

#[test]
fn can_send_is_false_while_transmitting() {
    let (mut radio, _sim) = node(5, 100);
    radio.set_mode(RadioMode::Transmit).unwrap();

    assert_eq!(radio.can_send(), Ok(false));
}

#[test]
fn can_send_from_receive_depends_on_channel() {
    let (mut radio, sim) = node(5, 100);
    radio.set_mode(RadioMode::Receive).unwrap();

    // -90 dBm is not below the limit
    sim.set_rssi(180);
    assert_eq!(radio.can_send(), Ok(false));
    assert_eq!(radio.mode(), RadioMode::Receive);

    sim.set_rssi(182);
    assert_eq!(radio.can_send(), Ok(true));
    assert_eq!(radio.mode(), RadioMode::Standby);
}

#[test]
fn can_send_waits_for_unread_frame() {
    let (mut radio, sim) = node(5, 100);
    radio.receive_done().unwrap();
    assert!(sim.deliver(encode(5, 9, Control::empty(), &[1]).as_bytes()));
    radio.handle_interrupt().unwrap();

    assert_eq!(radio.can_send(), Ok(false));
}

#[test]
fn send_puts_frame_on_air_and_returns_to_standby() {
    let (mut radio, sim) = node(5, 100);

    radio.send(9, &[1, 2, 3], true).unwrap();

    assert_eq!(sim.last_transmitted(), vec![6, 9, 5, 0x40, 1, 2, 3]);
    assert_eq!(radio.mode(), RadioMode::Standby);
    assert_eq!(sim.mode(), MODE_STANDBY);
    assert_eq!(sim.reg(REG_DIOMAPPING1) >> 6, 0b00);
}

#[test]
fn send_without_ack_request_has_empty_control() {
    let (mut radio, sim) = node(5, 100);

    radio.send(9, &[], false).unwrap();

    assert_eq!(sim.last_transmitted(), vec![3, 9, 5, 0x00]);
}

#[test]
fn send_truncates_long_payload() {
    let (mut radio, sim) = node(5, 100);

    radio.send(9, &[0xEE; 80], false).unwrap();

    let frame = sim.last_transmitted();
    assert_eq!(frame.len(), 4 + MAX_PAYLOAD_LEN);
    assert_eq!(frame[0] as usize, 3 + MAX_PAYLOAD_LEN);
}

#[test]
fn send_from_receive_mode_restarts_receiver() {
    let (mut radio, sim) = node(5, 100);
    radio.receive_done().unwrap();
    let restarts = sim.rx_restarts();

    radio.send(9, &[1], false).unwrap();

    assert_eq!(sim.rx_restarts(), restarts + 1);
    assert_eq!(sim.transmitted().len(), 1);
}

#[test]
fn send_times_out_when_packet_sent_never_comes() {
    let (mut radio, sim) = node(5, 100);
    sim.stall_tx(true);

    assert_eq!(radio.send(9, &[1], false), Err(Error::Timeout));
    assert_eq!(radio.mode(), RadioMode::Standby);
}

#[test]
fn retries_are_exhausted_without_ack() {
    let (mut radio, sim) = node(5, 100);

    assert_eq!(radio.send_with_retry(9, &[1], 2, 30), Ok(false));

    let transmitted = sim.transmitted();
    assert_eq!(transmitted.len(), 3);
    for frame in transmitted {
        assert_eq!(frame, vec![4, 9, 5, 0x40, 1]);
    }
}

#[test]
fn zero_retries_sends_once() {
    let (mut radio, sim) = node(5, 100);

    assert_eq!(radio.send_with_retry(9, &[1], 0, 10), Ok(false));
    assert_eq!(sim.transmitted().len(), 1);
}

#[test]
fn ack_without_received_frame_goes_to_broadcast() {
    let (mut radio, sim) = node(9, 100);

    radio.send_ack(&[7]).unwrap();

    assert_eq!(sim.last_transmitted(), vec![4, 0, 9, 0x80, 7]);
}

#[test]
fn ack_carries_payload_back_to_sender() {
    let (mut radio, sim) = node(9, 100);
    radio.receive_done().unwrap();
    assert!(sim.deliver(encode(9, 5, Control::ACK_REQUEST, &[1]).as_bytes()));
    radio.handle_interrupt().unwrap();
    assert!(radio.receive_done().unwrap());

    radio.send_ack(&[0xAA, 0xBB]).unwrap();

    assert_eq!(sim.last_transmitted(), vec![5, 5, 9, 0x80, 0xAA, 0xBB]);
}
