mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use common::{eventually, radio, ScriptedSelector};
use nrf24_reactor::{
    Config, InterruptKind, IrqLine, Mode, Nrf24, Reactor, ReactorConfig, ReactorError, ReactorState,
};

fn config() -> ReactorConfig {
    ReactorConfig::default().with_interval(Duration::ZERO)
}

fn scripted() -> (Reactor, ScriptedSelector) {
    let selector = ScriptedSelector::default();
    let reactor = Reactor::with_selector(config(), Box::new(selector.clone()));
    (reactor, selector)
}

fn counter() -> (Arc<AtomicUsize>, impl FnMut() -> Result<(), nrf24_reactor::CallbackError> + Send + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let handle = Arc::clone(&count);
    (count, move || {
        handle.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
}

#[test]
fn poller_fires_once_after_its_condition_holds() {
    let reactor = Reactor::new(config());
    let iteration = Arc::new(AtomicUsize::new(0));
    let fired_at = Arc::new(Mutex::new(Vec::new()));

    let seen = Arc::clone(&iteration);
    let predicate = move || {
        let n = seen.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(n == 6)
    };
    let current = Arc::clone(&iteration);
    let log = Arc::clone(&fired_at);
    let callback = move || {
        log.lock().unwrap().push(current.load(Ordering::SeqCst));
        Ok(())
    };
    reactor.poll(predicate, callback).unwrap();

    for _ in 0..5 {
        reactor.run_once().unwrap();
    }
    assert!(fired_at.lock().unwrap().is_empty());

    for _ in 0..10 {
        reactor.run_once().unwrap();
    }
    assert_eq!(*fired_at.lock().unwrap(), [6]);
}

#[test]
fn registration_wake_is_not_dispatched() {
    let (reactor, selector) = scripted();
    let (count, callback) = counter();

    reactor.select(7, callback).unwrap();
    assert_eq!(selector.registered(), [7]);
    for _ in 0..3 {
        reactor.run_once().unwrap();
    }
    assert_eq!(count.load(Ordering::SeqCst), 0);

    selector.fire(7);
    reactor.run_once().unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);

    reactor.run_once().unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn registration_drain_keeps_edges_of_other_handles() {
    let (reactor, selector) = scripted();
    let (first, first_callback) = counter();
    let (second, second_callback) = counter();

    reactor.select(7, first_callback).unwrap();
    selector.fire(7);
    reactor.select(8, second_callback).unwrap();

    reactor.run_once().unwrap();
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 0);
}

#[test]
fn duplicate_handle_is_rejected() {
    let (reactor, _selector) = scripted();
    reactor.select(7, || Ok(())).unwrap();
    assert!(matches!(
        reactor.select(7, || Ok(())),
        Err(ReactorError::AlreadyRegistered(7))
    ));
}

#[test]
fn failed_registration_drain_keeps_the_source() {
    let (reactor, selector) = scripted();
    let (count, callback) = counter();

    selector.fail_next_wait();
    assert!(matches!(reactor.select(7, callback), Err(ReactorError::Io(_))));
    assert_eq!(selector.registered(), [7]);
    assert!(matches!(
        reactor.select(7, || Ok(())),
        Err(ReactorError::AlreadyRegistered(7))
    ));

    // the registration wake was never drained and is dispatched once
    reactor.run_once().unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);
    selector.fire(7);
    reactor.run_once().unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn callbacks_can_register_on_their_own_reactor() {
    let reactor = Arc::new(Reactor::new(config()));
    let (count, nested) = counter();
    let mut nested = Some(nested);

    let weak: Weak<Reactor> = Arc::downgrade(&reactor);
    reactor
        .poll(|| Ok(true), move || {
            if let (Some(reactor), Some(callback)) = (weak.upgrade(), nested.take()) {
                reactor.poll(|| Ok(true), callback)?;
                reactor.set_interval(Duration::ZERO)?;
            }
            Ok(())
        })
        .unwrap();

    // the queued poller joins once the registering iteration ends
    reactor.run_once().unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 0);
    reactor.run_once().unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn callbacks_can_register_edges_on_their_own_reactor() {
    let selector = ScriptedSelector::default();
    let reactor = Arc::new(Reactor::with_selector(config(), Box::new(selector.clone())));
    let (count, nested) = counter();
    let mut nested = Some(nested);

    let weak = Arc::downgrade(&reactor);
    reactor
        .poll(|| Ok(true), move || {
            if let (Some(reactor), Some(callback)) = (weak.upgrade(), nested.take()) {
                reactor.select(9, callback)?;
            }
            Ok(())
        })
        .unwrap();

    reactor.run_once().unwrap();
    assert_eq!(selector.registered(), [9]);
    reactor.run_once().unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 0);

    selector.fire(9);
    reactor.run_once().unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn nested_iteration_is_rejected() {
    let reactor = Arc::new(Reactor::new(config()));
    let outcome = Arc::new(Mutex::new(None));

    let weak = Arc::downgrade(&reactor);
    let seen = Arc::clone(&outcome);
    reactor
        .poll(|| Ok(true), move || {
            if let Some(reactor) = weak.upgrade() {
                *seen.lock().unwrap() = Some(reactor.run_once().map_err(|e| e.to_string()));
            }
            Ok(())
        })
        .unwrap();

    reactor.run_once().unwrap();
    let outcome = outcome.lock().unwrap().take().unwrap();
    assert_eq!(outcome, Err(ReactorError::Reentrant.to_string()));
}

#[test]
fn pollers_run_before_edge_callbacks() {
    let (reactor, selector) = scripted();
    let log = Arc::new(Mutex::new(Vec::new()));

    let edge_log = Arc::clone(&log);
    reactor
        .select(3, move || {
            edge_log.lock().unwrap().push("edge");
            Ok(())
        })
        .unwrap();
    let poll_log = Arc::clone(&log);
    reactor
        .poll(|| Ok(true), move || {
            poll_log.lock().unwrap().push("poll");
            Ok(())
        })
        .unwrap();

    selector.fire(3);
    reactor.run_once().unwrap();
    assert_eq!(*log.lock().unwrap(), ["poll", "edge"]);
}

#[test]
fn start_and_join() {
    let mut reactor = Reactor::new(config());
    let (count, callback) = counter();
    reactor.poll(|| Ok(true), callback).unwrap();
    assert_eq!(reactor.state(), ReactorState::Idle);

    reactor.start().unwrap();
    assert_eq!(reactor.state(), ReactorState::Running);
    assert!(eventually(|| count.load(Ordering::SeqCst) > 0));

    reactor.join().unwrap();
    assert_eq!(reactor.state(), ReactorState::Stopped);
    assert!(!reactor.is_running());

    let after_join = count.load(Ordering::SeqCst);
    std::thread::sleep(Duration::from_millis(10));
    assert_eq!(count.load(Ordering::SeqCst), after_join);
}

#[test]
fn start_restarts_a_running_loop() {
    let mut reactor = Reactor::new(config());
    let (count, callback) = counter();
    reactor.poll(|| Ok(true), callback).unwrap();

    reactor.start().unwrap();
    reactor.start().unwrap();
    assert!(reactor.is_running());

    let before = count.load(Ordering::SeqCst);
    assert!(eventually(|| count.load(Ordering::SeqCst) > before));
    reactor.join().unwrap();
}

#[test]
fn sources_registered_while_running_are_evaluated() {
    let mut reactor = Reactor::new(config());
    reactor.start().unwrap();

    let (count, callback) = counter();
    reactor.poll(|| Ok(true), callback).unwrap();
    assert!(eventually(|| count.load(Ordering::SeqCst) > 0));
    reactor.join().unwrap();
}

#[test]
fn failing_callback_faults_the_loop() {
    let mut reactor = Reactor::new(config());
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    reactor
        .poll(|| Ok(true), move || {
            if seen.fetch_add(1, Ordering::SeqCst) == 2 {
                return Err("boom".into());
            }
            Ok(())
        })
        .unwrap();

    reactor.start().unwrap();
    assert!(eventually(|| !reactor.is_running()));
    assert_eq!(reactor.state(), ReactorState::Faulted("boom".into()));
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    match reactor.join() {
        Err(ReactorError::Faulted(message)) => assert_eq!(message, "boom"),
        other => panic!("unexpected join result {other:?}"),
    }
}

#[test]
fn polled_radio_interrupts_dispatch_once_per_event() {
    let (mut radio, spi, _ce) = radio();
    radio.set_config(Config::default().with_mode(Mode::Receive)).unwrap();
    let count = Arc::new(AtomicUsize::new(0));
    let handled = Arc::clone(&count);
    radio.on_interrupt(InterruptKind::RxDataReady, move |radio, _| {
        let mut buffer = [0u8; 1];
        radio.receive_packet(&mut buffer, 1)?;
        handled.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    let radio = Arc::new(Mutex::new(radio));
    let reactor = Reactor::new(config());
    Nrf24::attach(&radio, &reactor, IrqLine::Polled).unwrap();

    reactor.run_once().unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 0);

    spi.chip().inject_packet(0, b"x");
    reactor.run_once().unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(spi.chip().pending_interrupts(), 0);

    reactor.run_once().unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn edge_attached_radio_handles_the_irq_line() {
    let (mut radio, spi, _ce) = radio();
    let count = Arc::new(AtomicUsize::new(0));
    let handled = Arc::clone(&count);
    radio.on_interrupt(InterruptKind::TxDataSent, move |_, _| {
        handled.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    let radio = Arc::new(Mutex::new(radio));
    let (reactor, selector) = scripted();
    Nrf24::attach(&radio, &reactor, IrqLine::Edge(11)).unwrap();
    reactor.run_once().unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 0);

    spi.chip().raise(0x20);
    selector.fire(11);
    reactor.run_once().unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(spi.chip().pending_interrupts(), 0);
}

#[test]
fn radio_errors_fault_the_reactor() {
    let (mut radio, spi, _ce) = radio();
    // receive while powered down fails with a state error
    radio.on_interrupt(InterruptKind::RxDataReady, |radio, _| {
        let mut buffer = [0u8; 1];
        radio.receive_packet(&mut buffer, 1)?;
        Ok(())
    });

    let radio = Arc::new(Mutex::new(radio));
    let mut reactor = Reactor::new(config());
    Nrf24::attach(&radio, &reactor, IrqLine::Polled).unwrap();
    spi.chip().inject_packet(0, b"x");

    reactor.start().unwrap();
    assert!(eventually(|| !reactor.is_running()));
    assert!(matches!(reactor.state(), ReactorState::Faulted(message) if message.contains("receive mode")));
    assert!(reactor.join().is_err());
}
