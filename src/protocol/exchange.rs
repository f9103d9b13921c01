use tokio::sync::mpsc;

use crate::error::PocketError;
use crate::protocol::messages::{Inbound, Outbound};

/// Application side of one exchange.
#[derive(Debug)]
pub struct Exchange {
    inbound: mpsc::Receiver<Inbound>,
    outbound: mpsc::Sender<Outbound>,
}

/// Host side of one exchange.
#[derive(Debug)]
pub struct Peer {
    inbound: mpsc::Sender<Inbound>,
    outbound: mpsc::Receiver<Outbound>,
}

/// Open a bounded exchange and return both ends.
pub fn channel(capacity: usize) -> (Exchange, Peer) {
    let (in_tx, in_rx) = mpsc::channel(capacity.max(1));
    let (out_tx, out_rx) = mpsc::channel(capacity.max(1));
    (
        Exchange {
            inbound: in_rx,
            outbound: out_tx,
        },
        Peer {
            inbound: in_tx,
            outbound: out_rx,
        },
    )
}

impl Exchange {
    /// Next inbound message; `ExchangeClosed` once the host hangs up.
    pub async fn receive(&mut self) -> Result<Inbound, PocketError> {
        self.inbound.recv().await.ok_or(PocketError::ExchangeClosed)
    }

    pub async fn send(&self, message: Outbound) -> Result<(), PocketError> {
        self.outbound
            .send(message)
            .await
            .map_err(|_| PocketError::ExchangeClosed)
    }
}

impl Peer {
    pub async fn send(&self, message: Inbound) -> Result<(), PocketError> {
        self.inbound
            .send(message)
            .await
            .map_err(|_| PocketError::ExchangeClosed)
    }

    /// Next outbound message, `None` once the application side is dropped.
    pub async fn receive(&mut self) -> Option<Outbound> {
        self.outbound.recv().await
    }
}
