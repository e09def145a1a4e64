//! In-process transport: one thread per rank, channels between them.
//!
//! Runs a whole universe inside a single process so the distribution scheme
//! can be exercised without an MPI launcher. Each collective is lock-step:
//! the root sends payloads, non-roots acknowledge, and the root releases
//! everybody once all ranks have arrived, so no rank leaves a collective
//! before every rank has entered it.

use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use log::{debug, error};

use super::{check_partition, Collective, COORDINATOR_RANK};
use crate::error::{MatmulError, TransportError};
use crate::matrix::Element;
use crate::partition::Partition;

enum Payload {
    Data(Vec<Element>),
    Ack,
    Abort(i32),
}

impl Payload {
    fn kind(&self) -> &'static str {
        match self {
            Payload::Data(_) => "data",
            Payload::Ack => "ack",
            Payload::Abort(_) => "abort",
        }
    }
}

struct Envelope {
    source: usize,
    payload: Payload,
}

/// Factory for a fixed-size set of in-process ranks.
#[derive(Debug, Clone)]
pub struct LocalUniverse {
    size: usize,
    timeout: Option<Duration>,
}

impl LocalUniverse {
    pub fn new(size: usize) -> Self {
        LocalUniverse {
            size,
            timeout: None,
        }
    }

    /// Fail a blocked receive after `timeout` instead of waiting forever.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Create one connected world handle per rank, ordered by rank.
    pub fn worlds(&self) -> Vec<LocalWorld> {
        let (senders, inboxes): (Vec<_>, Vec<_>) = (0..self.size).map(|_| channel()).unzip();
        inboxes
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| LocalWorld {
                rank,
                size: self.size,
                peers: senders.clone(),
                inbox,
                timeout: self.timeout,
            })
            .collect()
    }

    /// Run `f` on every rank concurrently and collect the results by rank.
    pub fn run<F, R>(&self, f: F) -> Result<Vec<R>, MatmulError>
    where
        F: Fn(LocalWorld) -> R + Sync,
        R: Send,
    {
        let worlds = self.worlds();
        thread::scope(|scope| {
            let handles: Vec<_> = worlds
                .into_iter()
                .map(|world| {
                    let f = &f;
                    scope.spawn(move || f(world))
                })
                .collect();
            handles
                .into_iter()
                .enumerate()
                .map(|(rank, handle)| handle.join().map_err(|_| MatmulError::RankPanicked(rank)))
                .collect()
        })
    }
}

/// One rank's endpoint in a [`LocalUniverse`].
pub struct LocalWorld {
    rank: usize,
    size: usize,
    peers: Vec<Sender<Envelope>>,
    inbox: Receiver<Envelope>,
    timeout: Option<Duration>,
}

impl LocalWorld {
    fn send(&self, dest: usize, payload: Payload) -> Result<(), TransportError> {
        self.peers[dest]
            .send(Envelope {
                source: self.rank,
                payload,
            })
            .map_err(|_| TransportError::Disconnected(self.rank))
    }

    fn receive(&self, op: &'static str) -> Result<Envelope, TransportError> {
        let envelope = match self.timeout {
            Some(timeout) => self.inbox.recv_timeout(timeout).map_err(|e| match e {
                RecvTimeoutError::Timeout => TransportError::Timeout {
                    rank: self.rank,
                    op,
                    millis: timeout.as_millis(),
                },
                RecvTimeoutError::Disconnected => TransportError::Disconnected(self.rank),
            })?,
            None => self
                .inbox
                .recv()
                .map_err(|_| TransportError::Disconnected(self.rank))?,
        };
        if let Payload::Abort(code) = envelope.payload {
            return Err(TransportError::Aborted {
                source_rank: envelope.source,
                code,
            });
        }
        Ok(envelope)
    }

    fn unexpected(&self, op: &'static str, envelope: &Envelope) -> TransportError {
        TransportError::Protocol {
            rank: self.rank,
            from: envelope.source,
            op,
            got: envelope.payload.kind(),
        }
    }

    /// Non-root side: wait for a data message from the root.
    fn receive_from_root(&self, op: &'static str) -> Result<Vec<Element>, TransportError> {
        let envelope = self.receive(op)?;
        match envelope.payload {
            Payload::Data(data) if envelope.source == COORDINATOR_RANK => Ok(data),
            _ => Err(self.unexpected(op, &envelope)),
        }
    }

    /// Closing handshake of every collective. The root waits for an ack from
    /// each peer (unless it already heard from all of them) and then releases
    /// them; peers ack (unless they already sent data) and wait for release.
    fn finish(&self, op: &'static str, peers_heard: bool) -> Result<(), TransportError> {
        if self.is_root() {
            if !peers_heard {
                for _ in 1..self.size {
                    let envelope = self.receive(op)?;
                    if !matches!(envelope.payload, Payload::Ack) {
                        return Err(self.unexpected(op, &envelope));
                    }
                }
            }
            for dest in 1..self.size {
                self.send(dest, Payload::Ack)?;
            }
        } else {
            if !peers_heard {
                self.send(COORDINATOR_RANK, Payload::Ack)?;
            }
            let envelope = self.receive(op)?;
            if envelope.source != COORDINATOR_RANK || !matches!(envelope.payload, Payload::Ack) {
                return Err(self.unexpected(op, &envelope));
            }
        }
        Ok(())
    }

    fn copy_checked(
        &self,
        op: &'static str,
        data: &[Element],
        recv: &mut [Element],
    ) -> Result<(), TransportError> {
        if data.len() != recv.len() {
            return Err(TransportError::BufferMismatch {
                op,
                rank: self.rank,
                expected: recv.len(),
                got: data.len(),
            });
        }
        recv.copy_from_slice(data);
        Ok(())
    }
}

impl Collective for LocalWorld {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn broadcast(&self, buf: &mut [Element]) -> Result<(), TransportError> {
        const OP: &str = "broadcast";
        if self.is_root() {
            for dest in 1..self.size {
                self.send(dest, Payload::Data(buf.to_vec()))?;
            }
        } else {
            let data = self.receive_from_root(OP)?;
            self.copy_checked(OP, &data, buf)?;
        }
        self.finish(OP, false)
    }

    fn scatter_varcount(
        &self,
        send: Option<&[Element]>,
        partition: &Partition,
        recv: &mut [Element],
    ) -> Result<(), TransportError> {
        const OP: &str = "scatter";
        check_partition(
            OP,
            self.rank,
            self.size,
            partition,
            recv.len(),
            send.map(<[Element]>::len),
        )?;

        match send {
            Some(send) if self.is_root() => {
                for dest in 1..self.size {
                    let start = partition.offset(dest);
                    let block = send[start..start + partition.count(dest)].to_vec();
                    debug!("[local] scatter {} elements to rank {}", block.len(), dest);
                    self.send(dest, Payload::Data(block))?;
                }
                let start = partition.offset(self.rank);
                recv.copy_from_slice(&send[start..start + recv.len()]);
            }
            _ => {
                let data = self.receive_from_root(OP)?;
                self.copy_checked(OP, &data, recv)?;
            }
        }
        self.finish(OP, false)
    }

    fn gather_varcount(
        &self,
        send: &[Element],
        partition: &Partition,
        recv: Option<&mut [Element]>,
    ) -> Result<(), TransportError> {
        const OP: &str = "gather";
        check_partition(
            OP,
            self.rank,
            self.size,
            partition,
            send.len(),
            recv.as_ref().map(|r| r.len()),
        )?;

        match recv {
            Some(recv) if self.is_root() => {
                let own = partition.offset(self.rank);
                recv[own..own + send.len()].copy_from_slice(send);

                let mut heard = vec![false; self.size];
                heard[self.rank] = true;
                for _ in 1..self.size {
                    let envelope = self.receive(OP)?;
                    let source = envelope.source;
                    let block = match envelope.payload {
                        Payload::Data(block) if !heard[source] => block,
                        _ => return Err(self.unexpected(OP, &envelope)),
                    };
                    if block.len() != partition.count(source) {
                        return Err(TransportError::BufferMismatch {
                            op: OP,
                            rank: source,
                            expected: partition.count(source),
                            got: block.len(),
                        });
                    }
                    let start = partition.offset(source);
                    recv[start..start + block.len()].copy_from_slice(&block);
                    heard[source] = true;
                    debug!("[local] gathered {} elements from rank {}", block.len(), source);
                }
            }
            _ => self.send(COORDINATOR_RANK, Payload::Data(send.to_vec()))?,
        }
        self.finish(OP, true)
    }

    fn abort(&self, code: i32) {
        error!("[local] rank {} aborting run with code {}", self.rank, code);
        for dest in (0..self.size).filter(|&dest| dest != self.rank) {
            // Peers that already finished have dropped their inbox.
            let _ = self.send(dest, Payload::Abort(code));
        }
    }
}

impl Drop for LocalWorld {
    fn drop(&mut self) {
        if thread::panicking() {
            self.abort(-1);
        }
    }
}
