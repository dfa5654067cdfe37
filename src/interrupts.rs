//! Interrupt subscriptions
//!
//! Handlers are kept in one list per interrupt kind and run in a fixed
//! order for every interrupt: all "any interrupt" handlers (run on every
//! dispatch, even when no bit is pending), then receive
//! ready, then transmit sent, then transmit retry failed. Within a kind,
//! handlers run in subscription order. The three interrupt bits are
//! independent, so one dispatch may run several kinds.

use log::trace;

use crate::registers::{Interrupt, Status};

/// Interrupt handler run against the device `D`
pub type Handler<D, E> = Box<dyn FnMut(&mut D, Status) -> Result<(), E> + Send>;

/// Interrupt kind a handler subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptKind {
    /// Every interrupt, whatever its source
    Any,
    RxDataReady,
    TxDataSent,
    TxRetryFailed,
}

pub struct Handlers<D, E> {
    any: Vec<Handler<D, E>>,
    rx_data_ready: Vec<Handler<D, E>>,
    tx_data_sent: Vec<Handler<D, E>>,
    tx_retry_failed: Vec<Handler<D, E>>,
}

impl<D, E> Default for Handlers<D, E> {
    fn default() -> Self {
        Self {
            any: Vec::new(),
            rx_data_ready: Vec::new(),
            tx_data_sent: Vec::new(),
            tx_retry_failed: Vec::new(),
        }
    }
}

impl<D, E> Handlers<D, E> {
    pub fn subscribe(&mut self, kind: InterruptKind, handler: Handler<D, E>) {
        self.list_mut(kind).push(handler);
    }

    /// Runs the handlers matching `status`. The first failing handler
    /// stops the dispatch and its error is returned.
    pub fn dispatch(&mut self, device: &mut D, status: Status) -> Result<(), E> {
        let pending = status.interrupts();
        trace!("dispatching interrupts {:?}", pending);

        let kinds = [
            (InterruptKind::Any, true),
            (InterruptKind::RxDataReady, pending.contains(Interrupt::RX_DATA_READY)),
            (InterruptKind::TxDataSent, pending.contains(Interrupt::TX_DATA_SENT)),
            (InterruptKind::TxRetryFailed, pending.contains(Interrupt::TX_RETRY_FAILED)),
        ];
        for (kind, fired) in kinds {
            if !fired {
                continue;
            }
            for handler in self.list_mut(kind).iter_mut() {
                handler(&mut *device, status)?;
            }
        }
        Ok(())
    }

    /// Appends the handlers of `later` after the existing ones, kind by kind
    pub fn append(&mut self, later: &mut Self) {
        self.any.append(&mut later.any);
        self.rx_data_ready.append(&mut later.rx_data_ready);
        self.tx_data_sent.append(&mut later.tx_data_sent);
        self.tx_retry_failed.append(&mut later.tx_retry_failed);
    }

    fn list_mut(&mut self, kind: InterruptKind) -> &mut Vec<Handler<D, E>> {
        match kind {
            InterruptKind::Any => &mut self.any,
            InterruptKind::RxDataReady => &mut self.rx_data_ready,
            InterruptKind::TxDataSent => &mut self.tx_data_sent,
            InterruptKind::TxRetryFailed => &mut self.tx_retry_failed,
        }
    }
}
