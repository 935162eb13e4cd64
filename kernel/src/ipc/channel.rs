/*!
 * Context Channel
 *
 * Per-process pair of half-duplex endpoints. Outbound (process to kernel)
 * carries one [`SyscallContext`] per syscall, written before the syscall is
 * signalled. Inbound (kernel to process) carries a single resume point,
 * written before the process is resumed and drained by the process without
 * blocking.
 */

use super::context::{self, Frame, SyscallContext};
use crate::core::errors::ProtocolViolation;
use crate::core::types::{ProcessIndex, ResumePoint};
use flume::{Receiver, Sender, TryRecvError};
use thiserror::Error;
use tracing::warn;

/// Errors seen by the process side of a channel
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("Kernel side of channel {0} is closed")]
    Disconnected(ProcessIndex),

    #[error("Failed to encode frame: {0}")]
    Encode(String),
}

/// Create the channel pair for process slot `index`
pub fn context_channel(index: ProcessIndex) -> (KernelEndpoint, ProcessEndpoint) {
    let (inbound_tx, inbound_rx) = flume::unbounded();
    let (outbound_tx, outbound_rx) = flume::unbounded();

    (
        KernelEndpoint {
            index,
            inbound_tx,
            outbound_rx,
        },
        ProcessEndpoint {
            index,
            inbound_rx,
            outbound_tx,
        },
    )
}

/// Kernel half: reads syscall contexts, writes resume points
#[derive(Debug)]
pub struct KernelEndpoint {
    index: ProcessIndex,
    inbound_tx: Sender<Frame>,
    outbound_rx: Receiver<Frame>,
}

impl KernelEndpoint {
    pub fn index(&self) -> ProcessIndex {
        self.index
    }

    /// Read exactly one pending syscall context without blocking
    pub fn read_syscall_context(&self) -> Result<SyscallContext, ProtocolViolation> {
        let frame = match self.outbound_rx.try_recv() {
            Ok(frame) => frame,
            // A dropped sender may still leave frames queued; those are
            // returned above before Disconnected is reported.
            Err(TryRecvError::Empty) => return Err(ProtocolViolation::NoContext(self.index)),
            Err(TryRecvError::Disconnected) => {
                return Err(ProtocolViolation::Disconnected(self.index))
            }
        };

        context::decode(&frame).map_err(|e| ProtocolViolation::MalformedContext {
            index: self.index,
            reason: e.to_string(),
        })
    }

    pub fn deliver_resume_point(&self, resume_point: ResumePoint) -> Result<(), ProtocolViolation> {
        let frame = context::encode(&resume_point).map_err(|e| {
            ProtocolViolation::MalformedContext {
                index: self.index,
                reason: e.to_string(),
            }
        })?;

        self.inbound_tx
            .send(frame)
            .map_err(|_| ProtocolViolation::Disconnected(self.index))
    }

    /// Number of undelivered frames waiting for the process
    pub fn inbound_backlog(&self) -> usize {
        self.inbound_tx.len()
    }
}

/// Process half: writes syscall contexts, drains resume points
#[derive(Debug, Clone)]
pub struct ProcessEndpoint {
    index: ProcessIndex,
    inbound_rx: Receiver<Frame>,
    outbound_tx: Sender<Frame>,
}

impl ProcessEndpoint {
    pub fn index(&self) -> ProcessIndex {
        self.index
    }

    pub fn send_syscall_context(&self, ctx: SyscallContext) -> Result<(), ChannelError> {
        let frame = context::encode(&ctx).map_err(|e| ChannelError::Encode(e.to_string()))?;
        self.send_frame(frame)
    }

    /// Write a raw frame to the kernel
    pub fn send_frame(&self, frame: Frame) -> Result<(), ChannelError> {
        self.outbound_tx
            .send(frame)
            .map_err(|_| ChannelError::Disconnected(self.index))
    }

    /// Drain the inbound side, returning the most recent resume point if any
    pub fn try_recv_resume_point(&self) -> Option<ResumePoint> {
        let mut latest = None;
        for frame in self.inbound_rx.try_iter() {
            match context::decode::<ResumePoint>(&frame) {
                Ok(point) => latest = Some(point),
                Err(e) => warn!(index = self.index, error = %e, "Dropping malformed resume frame"),
            }
        }
        latest
    }
}
