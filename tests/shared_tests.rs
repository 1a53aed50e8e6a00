mod common;

use std::thread;
use std::time::{Duration, Instant};

use common::*;
use rfm69::frame::{encode, Control};
use rfm69::{Error, RadioMode, SharedRadio};

type SharedSim = SharedRadio<SimPort, SimPin, StdClock>;

static RADIO: SharedSim = SharedRadio::new();

fn nap() {
    thread::sleep(Duration::from_micros(50));
}

/// Plays the DIO0 interrupt: once the node has transmitted `after` frames and
/// is listening, each frame is put on the air and the handler runs right away.
fn answer(shared: &SharedSim, air: &Sim, after: usize, frames: &[Vec<u8>]) {
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut pending = frames.iter().peekable();

    while let Some(frame) = pending.peek() {
        assert!(Instant::now() < deadline, "node never listened for the ACK");

        let delivered = critical_section::with(|_| {
            if air.transmitted().len() < after || !air.deliver(frame) {
                return false;
            }
            shared.on_interrupt();
            true
        });

        if delivered {
            pending.next();
        }
        thread::sleep(Duration::from_micros(200));
    }
}

#[test]
fn operations_before_install_fail() {
    let shared = SharedSim::new();

    assert_eq!(shared.receive_done(), Err(Error::Uninitialized));
    assert_eq!(shared.send(9, &[1], false), Err(Error::Uninitialized));
    shared.on_interrupt();
}

#[test]
fn install_and_take_back() {
    let (radio, _air) = node_with_clock(5, 100, StdClock::default());
    let shared = SharedSim::new();

    assert!(shared.install(radio).is_none());
    assert_eq!(shared.mode(), Ok(RadioMode::Standby));

    let radio = shared.take().unwrap();
    assert_eq!(radio.identity().address, 5);
    assert_eq!(shared.mode(), Err(Error::Uninitialized));
}

#[test]
fn interrupt_handler_publishes_frame() {
    let (radio, air) = node_with_clock(9, 100, StdClock::default());
    assert!(RADIO.install(radio).is_none());

    assert_eq!(RADIO.receive_done(), Ok(false));
    assert!(air.deliver(encode(9, 5, Control::ACK_REQUEST, &[4, 2]).as_bytes()));
    RADIO.on_interrupt();

    assert_eq!(RADIO.receive_done(), Ok(true));
    assert_eq!(RADIO.ack_requested(), Ok(true));
    let received = RADIO.received().unwrap().unwrap();
    assert_eq!(received.sender(), 5);
    assert_eq!(received.payload(), &[4, 2]);

    RADIO.send_ack(&[]).unwrap();
    assert_eq!(air.last_transmitted(), vec![3, 5, 9, 0x80]);
}

#[test]
fn retry_succeeds_when_ack_arrives_by_interrupt() {
    let (radio, air) = node_with_clock(5, 100, StdClock::default());
    let shared = SharedSim::with_idle(nap);
    shared.install(radio);
    let ack = encode(5, 9, Control::ACK_REPLY, &[]).as_bytes().to_vec();

    let acked = thread::scope(|scope| {
        scope.spawn(|| answer(&shared, &air, 1, &[ack]));
        shared.send_with_retry(9, &[42], 3, 5_000)
    });

    assert_eq!(acked, Ok(true));
    assert_eq!(air.transmitted(), vec![vec![4, 9, 5, 0x40, 42]]);
}

#[test]
fn retry_recovers_after_a_missed_ack() {
    let (radio, air) = node_with_clock(5, 100, StdClock::default());
    let shared = SharedSim::with_idle(nap);
    shared.install(radio);
    let ack = encode(5, 9, Control::ACK_REPLY, &[]).as_bytes().to_vec();

    let acked = thread::scope(|scope| {
        scope.spawn(|| answer(&shared, &air, 2, &[ack]));
        shared.send_with_retry(9, &[42], 3, 200)
    });

    assert_eq!(acked, Ok(true));
    assert_eq!(
        air.transmitted(),
        vec![vec![4, 9, 5, 0x40, 42], vec![4, 9, 5, 0x40, 42]]
    );
}

#[test]
fn unrelated_frames_do_not_end_the_ack_wait() {
    let (radio, air) = node_with_clock(5, 100, StdClock::default());
    let shared = SharedSim::with_idle(nap);
    shared.install(radio);
    let frames = [
        encode(5, 8, Control::ACK_REPLY, &[]).as_bytes().to_vec(),
        encode(5, 9, Control::empty(), &[1]).as_bytes().to_vec(),
        encode(5, 9, Control::ACK_REPLY, &[]).as_bytes().to_vec(),
    ];

    let acked = thread::scope(|scope| {
        scope.spawn(|| answer(&shared, &air, 1, &frames));
        shared.send_with_retry(9, &[42], 0, 5_000)
    });

    assert_eq!(acked, Ok(true));
    assert_eq!(air.transmitted().len(), 1);
}
