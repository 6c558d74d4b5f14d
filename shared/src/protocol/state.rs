//! Generic state holder with a single-waiter "wait until state X" primitive.

use super::error::ProtocolError;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

/// Handshake state shared by the client and server protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Unconnected,
    Connected,
}

struct Waiter<S, V> {
    expected: S,
    sender: oneshot::Sender<Option<V>>,
}

/// Holds the current state token and at most one pending waiter.
pub struct StateMachine<S, V> {
    state: S,
    value: Option<V>,
    waiter: Option<Waiter<S, V>>,
}

impl<S, V> StateMachine<S, V>
where
    S: Copy + PartialEq,
    V: Clone,
{
    pub fn new(initial: S) -> Self {
        Self {
            state: initial,
            value: None,
            waiter: None,
        }
    }

    pub fn current_state(&self) -> S {
        self.state
    }

    /// Returns a wait that resolves once the machine is in `expected`.
    ///
    /// Resolves immediately (with the value of the last transition) when the
    /// machine is already there. Otherwise registers the single waiter; a
    /// second registration while the first is still alive fails with
    /// [`ProtocolError::AlreadyWaiting`]. A wait that was dropped no longer
    /// counts as outstanding.
    pub fn await_state(&mut self, expected: S) -> Result<StateWait<V>, ProtocolError> {
        if self.state == expected {
            return Ok(StateWait::ready(self.value.clone()));
        }

        if let Some(waiter) = &self.waiter {
            if !waiter.sender.is_closed() {
                return Err(ProtocolError::AlreadyWaiting);
            }
        }

        let (sender, receiver) = oneshot::channel();
        self.waiter = Some(Waiter { expected, sender });
        Ok(StateWait::pending(receiver))
    }

    /// Sets the state. A waiter registered for exactly this state is resolved
    /// with `value` and cleared.
    pub fn transition_to(&mut self, state: S, value: Option<V>) {
        self.state = state;
        self.value = value.clone();

        if self
            .waiter
            .as_ref()
            .is_some_and(|waiter| waiter.expected == state)
        {
            if let Some(waiter) = self.waiter.take() {
                // The waiter may have given up already; nothing to resolve then.
                let _ = waiter.sender.send(value);
            }
        }
    }

    pub fn has_waiter(&self) -> bool {
        self.waiter
            .as_ref()
            .is_some_and(|waiter| !waiter.sender.is_closed())
    }
}

enum WaitInner<V> {
    Ready(Option<V>),
    Pending(oneshot::Receiver<Option<V>>),
    Done,
}

/// Outstanding "wait for state" request. Can be awaited, or polled without
/// blocking from a tick loop via [`StateWait::try_take`].
pub struct StateWait<V> {
    inner: WaitInner<V>,
}

impl<V> StateWait<V> {
    fn ready(value: Option<V>) -> Self {
        Self {
            inner: WaitInner::Ready(value),
        }
    }

    fn pending(receiver: oneshot::Receiver<Option<V>>) -> Self {
        Self {
            inner: WaitInner::Pending(receiver),
        }
    }

    /// Non-blocking check. `None` while the transition has not happened yet.
    pub fn try_take(&mut self) -> Option<Result<Option<V>, ProtocolError>> {
        let inner = std::mem::replace(&mut self.inner, WaitInner::Done);
        match inner {
            WaitInner::Ready(value) => Some(Ok(value)),
            WaitInner::Pending(mut receiver) => match receiver.try_recv() {
                Ok(value) => Some(Ok(value)),
                Err(TryRecvError::Empty) => {
                    self.inner = WaitInner::Pending(receiver);
                    None
                }
                Err(TryRecvError::Closed) => Some(Err(ProtocolError::WaitAbandoned)),
            },
            WaitInner::Done => Some(Err(ProtocolError::WaitAbandoned)),
        }
    }
}

impl<V: Unpin> Future for StateWait<V> {
    type Output = Result<Option<V>, ProtocolError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        match &mut this.inner {
            WaitInner::Ready(value) => {
                let value = value.take();
                this.inner = WaitInner::Done;
                Poll::Ready(Ok(value))
            }
            WaitInner::Pending(receiver) => match Pin::new(receiver).poll(cx) {
                Poll::Ready(result) => {
                    this.inner = WaitInner::Done;
                    Poll::Ready(result.map_err(|_| ProtocolError::WaitAbandoned))
                }
                Poll::Pending => Poll::Pending,
            },
            WaitInner::Done => Poll::Ready(Err(ProtocolError::WaitAbandoned)),
        }
    }
}
