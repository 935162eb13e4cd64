/*!
 * I/O Controller Interface
 * Kernel-side handle used to start device service for a blocked process
 */

use super::types::IoRequest;
use crate::core::types::ProcessIndex;
use tokio::sync::mpsc;
use tracing::warn;

/// External controller that services one I/O request at a time
pub trait IoController: Send + Sync {
    /// Begin service for `index`; exactly one `IoComplete` follows
    fn start_io(&self, index: ProcessIndex);
}

/// Forwards I/O-start requests to a controller task over a channel
#[derive(Debug, Clone)]
pub struct ChannelIoController {
    tx: mpsc::UnboundedSender<IoRequest>,
}

impl ChannelIoController {
    pub fn new(tx: mpsc::UnboundedSender<IoRequest>) -> Self {
        Self { tx }
    }

    /// Controller handle plus the receiver a controller task drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<IoRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl IoController for ChannelIoController {
    fn start_io(&self, index: ProcessIndex) {
        if self.tx.send(IoRequest { index }).is_err() {
            warn!(index, "I/O controller is gone, request dropped");
        }
    }
}
