// src/core/cursor.rs
//
// Odometer over the cartesian product `alphabet^len`, in lexicographic order
// of the alphabet as given (not of the code points). The whole state is one
// index per position, so a checkpointed tag is enough to reposition the
// cursor without replaying anything before it.

#[derive(Clone, Debug)]
pub struct TagCursor {
    alphabet: Vec<char>,
    digits: Vec<usize>,
    done: bool,
}

impl TagCursor {
    /// Cursor on the first candidate of length `len`.
    pub fn new(alphabet: &str, len: usize) -> Self {
        let alphabet: Vec<char> = alphabet.chars().collect();
        let done = len == 0 || alphabet.is_empty();
        Self { alphabet, digits: vec![0; len], done }
    }

    /// Cursor that yields nothing.
    pub fn exhausted(alphabet: &str, len: usize) -> Self {
        let mut c = Self::new(alphabet, len);
        c.done = true;
        c
    }

    /// Cursor on the candidate right after `last` (a bare body, no `#`).
    /// `None` when `last` is not a length-`len` word over the alphabet.
    pub fn after(alphabet: &str, len: usize, last: &str) -> Option<Self> {
        let mut c = Self::new(alphabet, len);
        if last.chars().count() != len {
            return None;
        }
        for (slot, ch) in c.digits.iter_mut().zip(last.chars()) {
            *slot = c.alphabet.iter().position(|&a| a == ch)?;
        }
        c.advance();
        Some(c)
    }

    pub fn tag_len(&self) -> usize { self.digits.len() }

    pub fn is_done(&self) -> bool { self.done }

    /// Number of candidates of this length (saturating).
    pub fn total(&self) -> u64 {
        (self.alphabet.len() as u64)
            .checked_pow(self.digits.len() as u32)
            .unwrap_or(u64::MAX)
    }

    /// Index of the next candidate in product order; `total()` once done.
    pub fn position(&self) -> u64 {
        if self.done {
            return self.total();
        }
        let base = self.alphabet.len() as u64;
        self.digits
            .iter()
            .fold(0u64, |acc, &d| acc.saturating_mul(base).saturating_add(d as u64))
    }

    fn current(&self) -> String {
        self.digits.iter().map(|&d| self.alphabet[d]).collect()
    }

    fn advance(&mut self) {
        let base = self.alphabet.len();
        for d in self.digits.iter_mut().rev() {
            *d += 1;
            if *d < base {
                return;
            }
            *d = 0;
        }
        // every position wrapped
        self.done = true;
    }
}

impl Iterator for TagCursor {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }
        let out = self.current();
        self.advance();
        Some(out)
    }
}
