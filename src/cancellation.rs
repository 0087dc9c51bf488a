use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::error::Error;

/// Cooperative abort flag shared between a controller and the loop doing the work.
///
/// Clones share the same flag. Long running loops call [`CancellationToken::check`] at every
/// iteration boundary. The first check after [`CancellationToken::cancel`] clears the flag and
/// returns [`Error::Cancelled`], so the token is ready for the next run once the loop unwinds.
///
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests an abort. Idempotent, and a no-op when nothing polls the token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clears a pending request without observing it.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    /// Polls the token.
    ///
    /// # Errors
    /// Returns [`Error::Cancelled`] if an abort was requested. The request is consumed.
    ///
    pub fn check(&self) -> Result<(), Error> {
        if self.flag.swap(false, Ordering::SeqCst) {
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_consumes_request() {
        let token = CancellationToken::new();
        assert!(token.check().is_ok());

        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
        assert_eq!(token.check(), Err(Error::Cancelled));
        assert!(!token.is_cancelled());
        assert!(token.check().is_ok());
    }

    #[test]
    fn test_clones_share_flag() {
        let token = CancellationToken::new();
        let controller = token.clone();
        controller.cancel();
        assert!(token.is_cancelled());
        token.reset();
        assert!(!controller.is_cancelled());
    }
}
