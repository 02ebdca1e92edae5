//! In-process [`Transport`] over crossbeam channels.
//!
//! One channel per ordered pair of ranks keeps messages from different
//! peers apart and ordered per pair, which is all the exchange protocols
//! require. With capacity zero every send is a rendezvous, the strictest
//! blocking model the protocols are written for.

use crossbeam_channel::{bounded, Receiver, Sender};
use lifegrid_core::{ExchangeError, Rank, Tag, Transport};
use tracing::trace;

/// One message on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Envelope {
    tag: Tag,
    payload: Vec<bool>,
}

/// Builder for a fully connected set of [`MeshEndpoint`]s.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mesh {
    size: usize,
    capacity: usize,
}

impl Mesh {
    /// A mesh of `size` ranks whose sends block until received.
    pub fn rendezvous(size: usize) -> Self {
        Self { size, capacity: 0 }
    }

    /// A mesh of `size` ranks with `capacity` messages of buffering per
    /// ordered pair.
    pub fn buffered(size: usize, capacity: usize) -> Self {
        Self { size, capacity }
    }

    /// Ranks in the mesh.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Create every channel and hand out one endpoint per rank, in rank
    /// order.
    pub fn connect(self) -> Vec<MeshEndpoint> {
        let n = self.size;
        let mut senders: Vec<Vec<Option<Sender<Envelope>>>> =
            (0..n).map(|_| (0..n).map(|_| None).collect()).collect();
        let mut receivers: Vec<Vec<Option<Receiver<Envelope>>>> =
            (0..n).map(|_| (0..n).map(|_| None).collect()).collect();
        for from in 0..n {
            for to in 0..n {
                if from == to {
                    continue;
                }
                let (tx, rx) = bounded(self.capacity);
                senders[from][to] = Some(tx);
                receivers[to][from] = Some(rx);
            }
        }
        senders
            .into_iter()
            .zip(receivers)
            .enumerate()
            .map(|(rank, (outgoing, incoming))| MeshEndpoint {
                rank: Rank(rank),
                outgoing,
                incoming,
            })
            .collect()
    }
}

/// One rank's view of a [`Mesh`].
///
/// Dropping an endpoint disconnects it: peers blocked on it get
/// [`ExchangeError::Disconnected`] instead of hanging.
#[derive(Debug)]
pub struct MeshEndpoint {
    rank: Rank,
    outgoing: Vec<Option<Sender<Envelope>>>,
    incoming: Vec<Option<Receiver<Envelope>>>,
}

impl Transport for MeshEndpoint {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.outgoing.len()
    }

    fn send(&mut self, dest: Rank, tag: Tag, payload: &[bool]) -> Result<(), ExchangeError> {
        let tx = self
            .outgoing
            .get(dest.0)
            .and_then(Option::as_ref)
            .ok_or(ExchangeError::UnknownPeer { peer: dest })?;
        trace!(from = %self.rank, to = %dest, %tag, len = payload.len(), "send");
        tx.send(Envelope {
            tag,
            payload: payload.to_vec(),
        })
        .map_err(|_| ExchangeError::Disconnected { peer: dest })
    }

    fn receive(&mut self, source: Rank, tag: Tag, buf: &mut [bool]) -> Result<(), ExchangeError> {
        let rx = self
            .incoming
            .get(source.0)
            .and_then(Option::as_ref)
            .ok_or(ExchangeError::UnknownPeer { peer: source })?;
        let msg = rx
            .recv()
            .map_err(|_| ExchangeError::Disconnected { peer: source })?;
        if msg.tag != tag {
            return Err(ExchangeError::TagMismatch {
                peer: source,
                expected: tag,
                actual: msg.tag,
            });
        }
        if msg.payload.len() != buf.len() {
            return Err(ExchangeError::SizeMismatch {
                peer: source,
                tag,
                expected: buf.len(),
                actual: msg.payload.len(),
            });
        }
        buf.copy_from_slice(&msg.payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn endpoints_know_their_rank() {
        let eps = Mesh::rendezvous(3).connect();
        assert_eq!(eps.len(), 3);
        for (i, ep) in eps.iter().enumerate() {
            assert_eq!(ep.rank(), Rank(i));
            assert_eq!(ep.size(), 3);
        }
    }

    #[test]
    fn rendezvous_round_trip() {
        let mut eps = Mesh::rendezvous(2).connect();
        let mut b = eps.pop().unwrap();
        let mut a = eps.pop().unwrap();
        let handle = thread::spawn(move || {
            let mut buf = [false; 3];
            b.receive(Rank(0), Tag::HaloRow, &mut buf).unwrap();
            b.send(Rank(0), Tag::HaloRow, &[buf[2], buf[1], buf[0]])
                .unwrap();
        });
        a.send(Rank(1), Tag::HaloRow, &[true, false, false]).unwrap();
        let mut back = [false; 3];
        a.receive(Rank(1), Tag::HaloRow, &mut back).unwrap();
        assert_eq!(back, [false, false, true]);
        handle.join().unwrap();
    }

    #[test]
    fn buffered_send_does_not_block() {
        let mut eps = Mesh::buffered(2, 2).connect();
        eps[0].send(Rank(1), Tag::BlockRow, &[true]).unwrap();
        eps[0].send(Rank(1), Tag::BlockRow, &[false]).unwrap();
        let mut buf = [false];
        eps[1].receive(Rank(0), Tag::BlockRow, &mut buf).unwrap();
        assert!(buf[0]);
        eps[1].receive(Rank(0), Tag::BlockRow, &mut buf).unwrap();
        assert!(!buf[0]);
    }

    #[test]
    fn wrong_length_is_reported() {
        let mut eps = Mesh::buffered(2, 1).connect();
        eps[0].send(Rank(1), Tag::HaloRow, &[true; 4]).unwrap();
        let mut buf = [false; 5];
        assert_eq!(
            eps[1].receive(Rank(0), Tag::HaloRow, &mut buf),
            Err(ExchangeError::SizeMismatch {
                peer: Rank(0),
                tag: Tag::HaloRow,
                expected: 5,
                actual: 4
            })
        );
    }

    #[test]
    fn wrong_tag_is_reported() {
        let mut eps = Mesh::buffered(2, 1).connect();
        eps[1].send(Rank(0), Tag::ReturnColumn, &[true]).unwrap();
        let mut buf = [false];
        assert_eq!(
            eps[0].receive(Rank(1), Tag::ColumnBundle, &mut buf),
            Err(ExchangeError::TagMismatch {
                peer: Rank(1),
                expected: Tag::ColumnBundle,
                actual: Tag::ReturnColumn
            })
        );
    }

    #[test]
    fn self_and_unknown_peers_are_rejected() {
        let mut eps = Mesh::rendezvous(2).connect();
        assert_eq!(
            eps[0].send(Rank(0), Tag::HaloRow, &[]),
            Err(ExchangeError::UnknownPeer { peer: Rank(0) })
        );
        assert_eq!(
            eps[0].receive(Rank(9), Tag::HaloRow, &mut []),
            Err(ExchangeError::UnknownPeer { peer: Rank(9) })
        );
    }

    #[test]
    fn dropped_peer_disconnects() {
        let mut eps = Mesh::rendezvous(2).connect();
        drop(eps.pop());
        let mut buf = [false];
        assert_eq!(
            eps[0].send(Rank(1), Tag::HaloRow, &buf),
            Err(ExchangeError::Disconnected { peer: Rank(1) })
        );
        assert_eq!(
            eps[0].receive(Rank(1), Tag::HaloRow, &mut buf),
            Err(ExchangeError::Disconnected { peer: Rank(1) })
        );
    }
}
