//! Fetch sequencing: every committed intent gets a number, and only the
//! response to the most recently issued number may touch the view.

/// A fetch the caller should dispatch for the enclosed intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest<Q> {
    pub seq: u64,
    pub query: Q,
}

/// What happened to a settled fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was current and replaced the cached page.
    Applied,
    /// The request was current and failed; the previous page stays.
    Failed(String),
    /// A newer request was issued; the response was dropped unseen.
    Stale,
}

impl FetchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, FetchOutcome::Applied)
    }
}

/// Per-view issuance counter.
#[derive(Debug, Default, Clone)]
pub struct FetchSequencer {
    latest: u64,
    settled: u64,
}

impl FetchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next sequence number.
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn latest(&self) -> u64 {
        self.latest
    }

    /// True while the most recently issued fetch has not settled.
    pub fn is_pending(&self) -> bool {
        self.settled < self.latest
    }

    /// Settle `seq`. Returns true only for the most recently issued number;
    /// anything older is stale and must be ignored by the caller.
    pub fn settle(&mut self, seq: u64) -> bool {
        if seq == self.latest && seq > self.settled {
            self.settled = seq;
            true
        } else {
            tracing::debug!(seq, latest = self.latest, "discarding stale fetch response");
            false
        }
    }
}
