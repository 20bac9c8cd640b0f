//! Row-producer protocol.
//!
//! The engine calls a set-returning function repeatedly, one row per call,
//! and keeps the function's state for it between calls. `FuncCallContext`
//! is that engine-managed storage; `RowProducer` is the function side.
//! State lives exactly as long as the logical request: it is dropped when the
//! producer reports `Done`, when the engine ends the request early, or when
//! the context itself goes away.

use tracing::{debug, trace};

use crate::error::GembedError;

/// Result of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum SrfStep<R> {
    /// One row is available
    Next(R),
    /// No more rows
    Done,
}

impl<R> SrfStep<R> {
    pub fn is_done(&self) -> bool {
        matches!(self, SrfStep::Done)
    }

    pub fn into_row(self) -> Option<R> {
        match self {
            SrfStep::Next(row) => Some(row),
            SrfStep::Done => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    FirstCall,
    Active,
    Done,
}

/// Per-request storage the engine keeps between invocations.
#[derive(Debug)]
pub struct FuncCallContext<S> {
    state: Option<S>,
    phase: Phase,
    call_count: u64,
}

impl<S> Default for FuncCallContext<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> FuncCallContext<S> {
    pub fn new() -> Self {
        Self {
            state: None,
            phase: Phase::FirstCall,
            call_count: 0,
        }
    }

    /// Record one invocation. Called by the producer on entry.
    pub fn begin_call(&mut self) {
        self.call_count += 1;
    }

    /// True until the producer stores its state or finishes.
    pub fn is_first_call(&self) -> bool {
        self.phase == Phase::FirstCall
    }

    /// True once the producer finished or the request was ended.
    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Invocations so far.
    pub fn call_count(&self) -> u64 {
        self.call_count
    }

    /// Store the producer's state after a successful first call.
    pub fn init(&mut self, state: S) -> &mut S {
        self.phase = Phase::Active;
        self.state.insert(state)
    }

    pub fn state(&self) -> Option<&S> {
        self.state.as_ref()
    }

    pub fn state_mut(&mut self) -> Option<&mut S> {
        self.state.as_mut()
    }

    /// Producer is exhausted (or failed); release its state.
    pub fn finish(&mut self) {
        self.phase = Phase::Done;
        if self.state.take().is_some() {
            trace!(calls = self.call_count, "Multi-call state released");
        }
    }

    /// Engine ends the request before the producer is exhausted.
    pub fn end(&mut self) {
        if self.phase == Phase::Active {
            debug!(calls = self.call_count, "Request ended before exhaustion");
        }
        self.finish();
    }
}

impl<S> Drop for FuncCallContext<S> {
    fn drop(&mut self) {
        if self.state.is_some() {
            debug!(calls = self.call_count, "Releasing abandoned multi-call state");
        }
    }
}

/// A function returning rows one invocation at a time.
pub trait RowProducer {
    /// State kept between invocations.
    type State;
    /// Row produced by each invocation.
    type Row;

    /// Produce the next row.
    ///
    /// Once `Done` has been returned, every later call returns `Done`.
    fn produce(
        &self,
        ctx: &mut FuncCallContext<Self::State>,
    ) -> Result<SrfStep<Self::Row>, GembedError>;
}

/// Engine-side driver: one context, one invocation per `next`.
pub struct ValuePerCall<P: RowProducer> {
    producer: P,
    ctx: FuncCallContext<P::State>,
    // Stops iteration after an error even if the producer left its context open
    failed: bool,
}

impl<P: RowProducer> ValuePerCall<P> {
    pub fn new(producer: P) -> Self {
        Self {
            producer,
            ctx: FuncCallContext::new(),
            failed: false,
        }
    }

    /// Invoke the producer once.
    pub fn call(&mut self) -> Result<SrfStep<P::Row>, GembedError> {
        self.producer.produce(&mut self.ctx)
    }

    /// End the request now, releasing any state.
    pub fn end(&mut self) {
        self.ctx.end();
    }

    pub fn context(&self) -> &FuncCallContext<P::State> {
        &self.ctx
    }
}

impl<P: RowProducer> Iterator for ValuePerCall<P> {
    type Item = Result<P::Row, GembedError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.call() {
            Ok(SrfStep::Next(row)) => Some(Ok(row)),
            Ok(SrfStep::Done) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
