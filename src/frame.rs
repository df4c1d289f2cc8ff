// ============================================================================
// Frame Request Bookkeeping
// ============================================================================

use std::sync::atomic::{AtomicU64, Ordering};

/// Handle for one requested animation frame.
///
/// Carries the animation generation it was issued under; once the
/// generation moves on, the token is stale and its frame must be dropped.
/// The sequence number tells apart successive frames of one generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameToken {
    generation: u64,
    sequence: u64,
}

impl FrameToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// Tracks the single outstanding frame request of an animation.
#[derive(Debug, Default)]
pub struct FrameRequests {
    /// Bumped whenever a run starts or is cancelled
    generation: AtomicU64,
    /// Bumped on every request
    sequence: u64,
    outstanding: Option<FrameToken>,
}

impl FrameRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current animation generation
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Request the next frame. Returns `None` when a frame of the current
    /// generation is already outstanding.
    pub fn request(&mut self) -> Option<FrameToken> {
        let generation = self.generation();
        if self
            .outstanding
            .is_some_and(|token| token.generation == generation)
        {
            return None;
        }
        self.sequence += 1;
        let token = FrameToken {
            generation,
            sequence: self.sequence,
        };
        self.outstanding = Some(token);
        Some(token)
    }

    /// Invalidate every token issued so far.
    pub fn cancel(&mut self) {
        let previous = self.generation.fetch_add(1, Ordering::AcqRel);
        if self.outstanding.take().is_some() {
            log::trace!("Cancelled frame request of generation {}", previous);
        }
    }

    /// Consume `token` if it is the outstanding request of the current
    /// generation. Stale or duplicate tokens are rejected.
    pub fn accept(&mut self, token: FrameToken) -> bool {
        if self.outstanding == Some(token) && token.generation == self.generation() {
            self.outstanding = None;
            true
        } else {
            log::trace!(
                "Dropping stale frame (token {}/{}, current generation {})",
                token.generation,
                token.sequence,
                self.generation()
            );
            false
        }
    }

    pub fn pending(&self) -> Option<FrameToken> {
        self.outstanding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_one_outstanding_request() {
        let mut frames = FrameRequests::new();
        let token = frames.request().unwrap();
        assert_eq!(frames.request(), None);
        assert_eq!(frames.pending(), Some(token));

        assert!(frames.accept(token));
        assert_eq!(frames.pending(), None);
        // A consumed token cannot fire twice
        assert!(!frames.accept(token));

        let next = frames.request().unwrap();
        assert_eq!(next.generation(), token.generation());
        assert_ne!(next, token);
    }

    #[test]
    fn test_consumed_token_rejected_after_rerequest() {
        let mut frames = FrameRequests::new();
        let first = frames.request().unwrap();
        assert!(frames.accept(first));
        let second = frames.request().unwrap();

        assert!(!frames.accept(first));
        assert_eq!(frames.pending(), Some(second));
        assert!(frames.accept(second));
    }

    #[test]
    fn test_cancel_makes_tokens_stale() {
        let mut frames = FrameRequests::new();
        let old = frames.request().unwrap();
        frames.cancel();
        assert_eq!(frames.pending(), None);

        let new = frames.request().unwrap();
        assert_ne!(old, new);
        assert!(new.generation() > old.generation());
        assert!(!frames.accept(old));
        assert!(frames.accept(new));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut frames = FrameRequests::new();
        frames.cancel();
        frames.cancel();
        assert_eq!(frames.pending(), None);
        assert!(frames.request().is_some());
    }
}
