// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-shot "please stop, reason = X" rendezvous.

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Kind};
use crate::response::Reason;

enum State {
    Created,
    Initialized { sender: oneshot::Sender<Reason>, ctx: CancellationToken },
    Spent,
}

/// A stopper goes through `Created -> Initialize -> Spent` exactly once.
pub struct Stopper {
    state: Mutex<State>,
}

impl Stopper {
    pub fn new() -> Self {
        Self { state: Mutex::new(State::Created) }
    }

    /// Captures the daemon-scoped cancellation token and returns the
    /// one-shot receiver that yields the eventual stop reason.
    pub fn initialize(&self, ctx: CancellationToken) -> crate::error::Result<oneshot::Receiver<Reason>> {
        let mut state = self.state.lock();
        match &*state {
            State::Created => {
                let (sender, receiver) = oneshot::channel();
                *state = State::Initialized { sender, ctx };
                Ok(receiver)
            }
            State::Initialized { .. } => {
                Err(Error::new(Kind::InvalidItem, "stopper already initialized"))
            }
            State::Spent => Err(Error::new(Kind::InvalidItem, "stopper already spent")),
        }
    }

    /// Delivers `reason` to the one-shot receiver, unless the captured
    /// context was already cancelled, in which case the context's
    /// cancellation is reported instead. Either way, the stopper is spent.
    pub fn stop(&self, reason: Reason) -> crate::error::Result<()> {
        let mut state = self.state.lock();
        match std::mem::replace(&mut *state, State::Spent) {
            State::Created => {
                *state = State::Created;
                Err(Error::new(Kind::InvalidItem, "stop called before initialize"))
            }
            State::Initialized { sender, ctx } => {
                if ctx.is_cancelled() {
                    return Err(Error::new(Kind::InvalidItem, "context cancelled before stop"));
                }
                let _ = sender.send(reason);
                Ok(())
            }
            State::Spent => {
                *state = State::Spent;
                Err(Error::new(Kind::InvalidItem, "stopper already stopped"))
            }
        }
    }
}

impl Default for Stopper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_before_initialize_fails() {
        let s = Stopper::new();
        assert!(s.stop(Reason::Requested).is_err());
    }

    #[test]
    fn initialize_twice_fails() {
        let s = Stopper::new();
        let _rx = s.initialize(CancellationToken::new()).unwrap();
        assert!(s.initialize(CancellationToken::new()).is_err());
    }

    #[test]
    fn stop_twice_fails() {
        let s = Stopper::new();
        let _rx = s.initialize(CancellationToken::new()).unwrap();
        assert!(s.stop(Reason::Requested).is_ok());
        assert!(s.stop(Reason::Idle).is_err());
    }

    #[tokio::test]
    async fn successful_stop_delivers_reason() {
        let s = Stopper::new();
        let rx = s.initialize(CancellationToken::new()).unwrap();
        s.stop(Reason::Canceled).unwrap();
        assert_eq!(rx.await.unwrap(), Reason::Canceled);
    }

    #[test]
    fn cancelled_context_before_stop_is_reported() {
        let s = Stopper::new();
        let ctx = CancellationToken::new();
        let _rx = s.initialize(ctx.clone()).unwrap();
        ctx.cancel();
        assert!(s.stop(Reason::Requested).is_err());
    }
}
