//! Code sources for the terminal: piped lines and keyboard-wedge scanners.

use std::{
  collections::VecDeque,
  fs::File,
  io::{self, BufRead, BufReader},
  path::PathBuf,
};

use turnstile_core::{Error, Result, scanner::CodeSource};

// ─── Lines ────────────────────────────────────────────────────────────────────

/// Decoded codes read one per line from a file, or stdin when no path is set.
///
/// Blank lines are skipped and surrounding whitespace is trimmed.
pub struct LineSource {
  path:   Option<PathBuf>,
  reader: Option<Box<dyn BufRead>>,
}

impl LineSource {
  /// `None` or `-` reads stdin.
  pub fn new(path: Option<PathBuf>) -> Self {
    let path = path.filter(|p| p.as_os_str() != "-");
    Self { path, reader: None }
  }

  #[cfg(test)]
  fn from_reader(reader: impl BufRead + 'static) -> Self {
    Self { path: None, reader: Some(Box::new(reader)) }
  }
}

impl CodeSource for LineSource {
  fn acquire(&mut self) -> Result<()> {
    if self.reader.is_some() {
      return Ok(());
    }
    let reader: Box<dyn BufRead> = match &self.path {
      Some(path) => {
        let file = File::open(path)
          .map_err(|e| Error::ScannerUnavailable(format!("{}: {e}", path.display())))?;
        Box::new(BufReader::new(file))
      }
      None => Box::new(io::stdin().lock()),
    };
    self.reader = Some(reader);
    Ok(())
  }

  fn release(&mut self) { self.reader = None; }

  fn next_code(&mut self) -> Result<Option<String>> {
    let reader = self
      .reader
      .as_mut()
      .ok_or_else(|| Error::ScannerUnavailable("source not acquired".into()))?;
    let mut line = String::new();
    loop {
      line.clear();
      let read = reader
        .read_line(&mut line)
        .map_err(|e| Error::ScannerUnavailable(e.to_string()))?;
      if read == 0 {
        return Ok(None);
      }
      let code = line.trim();
      if !code.is_empty() {
        return Ok(Some(code.to_owned()));
      }
    }
  }
}

// ─── Keyboard wedge ───────────────────────────────────────────────────────────

/// A handheld scanner that types each code followed by Enter.
///
/// The terminal feeds keystrokes in with [`push`](Self::push) and
/// [`submit`](Self::submit); keystrokes are ignored while the wedge is not
/// acquired. [`next_code`](CodeSource::next_code) never blocks: it returns
/// `None` when no complete code is pending.
#[derive(Debug, Default)]
pub struct KeyboardWedge {
  armed:   bool,
  buffer:  String,
  pending: VecDeque<String>,
}

impl KeyboardWedge {
  pub fn new() -> Self { Self::default() }

  pub fn is_armed(&self) -> bool { self.armed }

  /// Characters typed since the last Enter.
  pub fn buffer(&self) -> &str { &self.buffer }

  pub fn push(&mut self, c: char) {
    if self.armed {
      self.buffer.push(c);
    }
  }

  pub fn backspace(&mut self) { self.buffer.pop(); }

  pub fn clear(&mut self) { self.buffer.clear(); }

  /// Enter: queue the buffered code. Returns `false` if nothing was typed.
  pub fn submit(&mut self) -> bool {
    let code = self.buffer.trim().to_owned();
    self.buffer.clear();
    if !self.armed || code.is_empty() {
      return false;
    }
    self.pending.push_back(code);
    true
  }
}

impl CodeSource for KeyboardWedge {
  fn acquire(&mut self) -> Result<()> {
    self.armed = true;
    self.buffer.clear();
    Ok(())
  }

  fn release(&mut self) {
    self.armed = false;
    self.buffer.clear();
    self.pending.clear();
  }

  fn next_code(&mut self) -> Result<Option<String>> { Ok(self.pending.pop_front()) }
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use turnstile_core::scanner::ScanSession;

  use super::*;

  #[test]
  fn lines_are_trimmed_and_blanks_skipped() {
    let source = LineSource::from_reader(Cursor::new("ACC-1\n\n  ACC-2  \r\n"));
    let codes: Vec<String> = ScanSession::start(source)
      .unwrap()
      .collect::<Result<_>>()
      .unwrap();
    assert_eq!(codes, ["ACC-1", "ACC-2"]);
  }

  #[test]
  fn missing_file_is_unavailable() {
    let source = LineSource::new(Some("/nonexistent/codes.txt".into()));
    let err = ScanSession::start(source).err().unwrap();
    assert!(matches!(err, Error::ScannerUnavailable(_)));
  }

  #[test]
  fn wedge_ignores_keys_until_acquired() {
    let mut wedge = KeyboardWedge::new();
    wedge.push('x');
    assert!(!wedge.submit());

    let mut session = ScanSession::start(&mut wedge).unwrap();
    for c in "ACC-001".chars() {
      session.source_mut().push(c);
    }
    assert!(session.source_mut().submit());
    assert_eq!(session.next_code().unwrap().as_deref(), Some("ACC-001"));
    assert_eq!(session.next_code().unwrap(), None);
  }

  #[test]
  fn leaving_the_session_disarms_the_wedge() {
    let mut wedge = KeyboardWedge::new();
    {
      let mut session = ScanSession::start(&mut wedge).unwrap();
      session.source_mut().push('A');
      assert!(session.source().is_armed());
    }
    assert!(!wedge.is_armed());
    assert_eq!(wedge.buffer(), "");
  }
}
