//! Buffered message transport.
//!
//! Network I/O happens at arbitrary times, game and render loops run at a
//! fixed cadence. Outgoing frames are queued in a [`SendBuffer`] and flushed
//! once per tick; incoming frames land in the front half of a
//! [`ReceiveBuffer`] and become visible only after the next swap.

use log::{debug, warn};
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error, PartialEq)]
pub enum TransportError {
    #[error("connection closed")]
    Closed,
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Anything that can carry a text frame to the peer.
pub trait FrameSink {
    fn send_frame(&mut self, frame: String) -> Result<(), TransportError>;
}

impl FrameSink for mpsc::UnboundedSender<String> {
    fn send_frame(&mut self, frame: String) -> Result<(), TransportError> {
        self.send(frame).map_err(|_| TransportError::Closed)
    }
}

impl<K: FrameSink + ?Sized> FrameSink for Box<K> {
    fn send_frame(&mut self, frame: String) -> Result<(), TransportError> {
        (**self).send_frame(frame)
    }
}

pub type BoxedSink = Box<dyn FrameSink + Send>;

/// Ordered queue of outgoing frames.
#[derive(Debug, Default)]
pub struct SendBuffer {
    frames: Vec<String>,
}

impl SendBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: String) {
        self.frames.push(frame);
    }

    pub fn frames(&self) -> impl Iterator<Item = &String> {
        self.frames.iter()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn drain(&mut self) -> std::vec::Drain<'_, String> {
        self.frames.drain(..)
    }

    fn clear(&mut self) {
        self.frames.clear();
    }
}

/// Two alternating inbound queues. Arrivals go to the front slot; `swap`
/// turns the front into the batch for this tick and reuses the previous
/// batch's storage as the new front.
#[derive(Debug, Default)]
pub struct ReceiveBuffer {
    buffers: [Vec<String>; 2],
    front: usize,
}

impl ReceiveBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: String) {
        self.buffers[self.front].push(frame);
    }

    pub fn swap(&mut self) {
        self.front ^= 1;
        self.buffers[self.front].clear();
    }

    /// Frames received before the last swap, in arrival order.
    pub fn batch(&self) -> &[String] {
        &self.buffers[self.front ^ 1]
    }

    pub fn pending(&self) -> usize {
        self.buffers[self.front].len()
    }
}

type CloseCallback = Box<dyn FnOnce() + Send>;

/// One connection's transport: the sink, the inbound double buffer and the
/// close notification.
pub struct Transport<K> {
    sink: K,
    inbound: ReceiveBuffer,
    closed: bool,
    on_close: Option<CloseCallback>,
}

impl<K: FrameSink> Transport<K> {
    pub fn new(sink: K) -> Self {
        Self {
            sink,
            inbound: ReceiveBuffer::new(),
            closed: false,
            on_close: None,
        }
    }

    pub fn push_incoming(&mut self, frame: String) {
        self.inbound.push(frame);
    }

    pub fn swap(&mut self) {
        self.inbound.swap();
    }

    pub fn incoming(&self) -> &[String] {
        self.inbound.batch()
    }

    /// Registers the close callback. It fires at most once; registering on an
    /// already closed transport fires it immediately.
    pub fn set_on_close<F>(&mut self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.closed {
            callback();
        } else {
            self.on_close = Some(Box::new(callback));
        }
    }

    /// Sends every queued frame in order and clears the queue. After the
    /// transport has closed the queue is only cleared.
    pub fn flush(&mut self, outbox: &mut SendBuffer) {
        if self.closed {
            outbox.clear();
            return;
        }

        let mut failed = None;
        for frame in outbox.drain() {
            if failed.is_some() {
                continue;
            }
            if let Err(e) = self.sink.send_frame(frame) {
                failed = Some(e);
            }
        }

        if let Some(e) = failed {
            warn!("Transport send failed, closing: {}", e);
            self.close();
        }
    }

    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        debug!("Transport closed");

        if let Some(callback) = self.on_close.take() {
            callback();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_swap_hides_late_arrivals_until_next_tick() {
        let mut buffer = ReceiveBuffer::new();
        buffer.push("a".to_string());
        buffer.push("b".to_string());
        buffer.swap();

        buffer.push("late".to_string());
        assert_eq!(buffer.batch(), &["a".to_string(), "b".to_string()]);
        assert_eq!(buffer.pending(), 1);

        buffer.swap();
        assert_eq!(buffer.batch(), &["late".to_string()]);
        assert_eq!(buffer.pending(), 0);
    }

    #[test]
    fn test_swap_without_arrivals_yields_empty_batch() {
        let mut buffer = ReceiveBuffer::new();
        buffer.push("a".to_string());
        buffer.swap();
        buffer.swap();
        assert!(buffer.batch().is_empty());
    }

    #[test]
    fn test_flush_sends_in_order_and_clears() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut transport = Transport::new(tx);
        let mut outbox = SendBuffer::new();
        outbox.push("1".to_string());
        outbox.push("2".to_string());

        transport.flush(&mut outbox);

        assert!(outbox.is_empty());
        assert_eq!(rx.try_recv().unwrap(), "1");
        assert_eq!(rx.try_recv().unwrap(), "2");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_close_callback_fires_once_on_send_failure() {
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        drop(rx);

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let mut transport = Transport::new(tx);
        transport.set_on_close(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut outbox = SendBuffer::new();
        outbox.push("x".to_string());
        transport.flush(&mut outbox);
        assert!(transport.is_closed());

        outbox.push("y".to_string());
        transport.flush(&mut outbox);
        transport.close();

        assert!(outbox.is_empty());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_boxed_sink_forwards_frames() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut transport: Transport<BoxedSink> = Transport::new(Box::new(tx));
        let mut outbox = SendBuffer::new();
        outbox.push("boxed".to_string());
        transport.flush(&mut outbox);
        assert_eq!(rx.try_recv().unwrap(), "boxed");
    }
}
