//! Scanner sessions: scoped acquisition of a code source.
//!
//! Optical decoding happens elsewhere; a [`CodeSource`] only hands over
//! already-decoded strings. What this module guarantees is the lifetime
//! discipline: a source acquired through [`ScanSession::start`] is released
//! when the session is dropped, whichever way the holder exits.

use crate::{Error, Result};

/// A device or stream that yields decoded code strings.
pub trait CodeSource {
  /// Claim the underlying device. Failures surface as
  /// [`Error::ScannerUnavailable`].
  fn acquire(&mut self) -> Result<()>;

  /// Release the device. Must tolerate being called when not acquired.
  fn release(&mut self);

  /// Block until the next decoded code arrives; `None` at end of stream.
  fn next_code(&mut self) -> Result<Option<String>>;
}

impl<S: CodeSource + ?Sized> CodeSource for &mut S {
  fn acquire(&mut self) -> Result<()> { (**self).acquire() }

  fn release(&mut self) { (**self).release() }

  fn next_code(&mut self) -> Result<Option<String>> { (**self).next_code() }
}

/// An acquired [`CodeSource`]. Dropping the session releases the source.
///
/// The session either owns its source or borrows it as `&mut S`.
pub struct ScanSession<S: CodeSource> {
  source: S,
}

impl<S: CodeSource> ScanSession<S> {
  /// Acquire `source`. If acquisition fails nothing is held and the source is
  /// released again before the error is returned.
  pub fn start(mut source: S) -> Result<Self> {
    if let Err(e) = source.acquire() {
      source.release();
      tracing::warn!(error = %e, "scanner acquisition failed");
      return Err(match e {
        Error::ScannerUnavailable(_) => e,
        other => Error::ScannerUnavailable(other.to_string()),
      });
    }
    tracing::debug!("scan session started");
    Ok(Self { source })
  }

  pub fn next_code(&mut self) -> Result<Option<String>> { self.source.next_code() }

  pub fn source(&self) -> &S { &self.source }

  pub fn source_mut(&mut self) -> &mut S { &mut self.source }
}

impl<S: CodeSource> Iterator for ScanSession<S> {
  type Item = Result<String>;

  fn next(&mut self) -> Option<Self::Item> { self.next_code().transpose() }
}

impl<S: CodeSource> Drop for ScanSession<S> {
  fn drop(&mut self) {
    self.source.release();
    tracing::debug!("scan session released");
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, collections::VecDeque, rc::Rc};

  use super::*;

  #[derive(Default)]
  struct FakeCamera {
    deny:     bool,
    held:     bool,
    acquired: usize,
    released: usize,
    queued:   VecDeque<String>,
  }

  impl CodeSource for FakeCamera {
    fn acquire(&mut self) -> Result<()> {
      if self.deny {
        return Err(Error::ScannerUnavailable("permission denied".into()));
      }
      self.held = true;
      self.acquired += 1;
      Ok(())
    }

    fn release(&mut self) {
      if self.held {
        self.released += 1;
      }
      self.held = false;
    }

    fn next_code(&mut self) -> Result<Option<String>> { Ok(self.queued.pop_front()) }
  }

  #[test]
  fn drop_releases_the_source() {
    let mut cam = FakeCamera::default();
    {
      let _session = ScanSession::start(&mut cam).unwrap();
    }
    assert_eq!((cam.acquired, cam.released), (1, 1));
    assert!(!cam.held);
  }

  #[test]
  fn early_return_still_releases() {
    fn scan_until_stop(cam: &mut FakeCamera) -> Result<usize> {
      let session = ScanSession::start(cam)?;
      let mut seen = 0;
      for code in session {
        if code? == "STOP" {
          return Ok(seen);
        }
        seen += 1;
      }
      Ok(seen)
    }

    let mut cam = FakeCamera {
      queued: ["a", "b", "STOP", "c"].into_iter().map(String::from).collect(),
      ..Default::default()
    };
    assert_eq!(scan_until_stop(&mut cam).unwrap(), 2);
    assert!(!cam.held);
    assert_eq!(cam.released, 1);
    assert_eq!(cam.queued.len(), 1);
  }

  #[test]
  fn panics_release_during_unwind() {
    let mut cam = FakeCamera::default();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
      let _session = ScanSession::start(&mut cam).unwrap();
      panic!("renderer crashed");
    }));
    assert!(result.is_err());
    assert!(!cam.held);
    assert_eq!(cam.released, 1);
  }

  /// An owned source that reports its releases through a shared counter.
  struct Tally(Rc<Cell<usize>>);

  impl CodeSource for Tally {
    fn acquire(&mut self) -> Result<()> { Ok(()) }

    fn release(&mut self) { self.0.set(self.0.get() + 1); }

    fn next_code(&mut self) -> Result<Option<String>> { Ok(Some("ACC-1".into())) }
  }

  #[test]
  fn owned_sources_are_released_on_drop() {
    let releases = Rc::new(Cell::new(0));
    let mut session = ScanSession::start(Tally(releases.clone())).unwrap();
    assert_eq!(session.next_code().unwrap().as_deref(), Some("ACC-1"));
    assert_eq!(releases.get(), 0);

    drop(session);
    assert_eq!(releases.get(), 1);
  }

  #[test]
  fn denied_acquisition_leaves_scanning_off() {
    let mut cam = FakeCamera { deny: true, ..Default::default() };
    let err = ScanSession::start(&mut cam).err().unwrap();
    assert!(matches!(err, Error::ScannerUnavailable(_)));
    assert!(!cam.held);
    assert_eq!(cam.acquired, 0);
  }
}
