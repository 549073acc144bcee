//! Scanner for the interior of a single bracketed construct.
//!
//! Grammar accepted between `[` and `]`:
//! - a tag name: a run of bytes other than ASCII whitespace, `=` and `]`
//!   (closers keep their leading `/`);
//! - an optional shorthand value, `name=value`, stored under the tag name;
//! - any number of `key=value` clauses, or bare `key`s (stored with an empty
//!   value), separated by whitespace.
//!
//! Values are unquoted (ending at whitespace or `]`) or quoted with `"` or
//! `'`, in which case they end at the next occurrence of the same quote.
//! There is no escape processing. ASCII whitespace around `=` is tolerated.
//!
//! Anything else is malformed: a missing `]`, an unterminated quote or a
//! stray `=`. Malformed constructs are reported as `None` and the tokenizer
//! keeps the opening `[` as literal text.
use crate::types::Attributes;

/// A well-formed construct found by [`ConstructScanner::scan`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ScannedTag {
    /// Byte index one past the closing `]`.
    pub(crate) end: usize,
    pub(crate) name: String,
    pub(crate) attributes: Attributes,
}

/// Parses the interior of a construct (the text between `[` and `]`) into a
/// tag name and its attributes.
///
/// Returns `None` when the interior is malformed or does not span the whole
/// input (e.g. it contains an unquoted `]`).
pub fn scan_tag(interior: &str) -> Option<(String, Attributes)> {
    let wrapped = format!("[{interior}]");
    let scanned = ConstructScanner::new(&wrapped).scan(0)?;
    if scanned.end != wrapped.len() {
        return None;
    }
    Some((scanned.name, scanned.attributes))
}

fn is_name_byte(b: u8) -> bool {
    !b.is_ascii_whitespace() && b != b'=' && b != b']'
}

fn is_unquoted_value_byte(b: u8) -> bool {
    !b.is_ascii_whitespace() && b != b']'
}

/// Grammar position of a scan while it walks over a byte. Each variant is one
/// bit of a byte in the scanner's walked set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
enum ScanState {
    /// Tag name or attribute key.
    Name = 1,
    /// Whitespace after a name, before an optional `=`.
    AfterName = 1 << 1,
    /// Whitespace after `=`.
    ValueStart = 1 << 2,
    Unquoted = 1 << 3,
    DoubleQuoted = 1 << 4,
    SingleQuoted = 1 << 5,
    /// Whitespace before the next clause or the closing `]`.
    Clause = 1 << 6,
}

/// Scans the constructs of one input.
///
/// How a scan continues from a byte depends only on that byte's position and
/// the scan's [`ScanState`], never on where the scan started. The scanner
/// records every (byte, state) pair it walks; a scan reaching a pair an
/// earlier scan already walked ends the same way that scan did, which for a
/// later `open` can only be a failure. Rejecting overlapping malformed
/// constructs therefore costs linear time over the whole input.
///
/// `scan` must be called with increasing `open`s, each at or past the end of
/// the last construct that scanned successfully.
#[derive(Debug)]
pub(crate) struct ConstructScanner<'a> {
    input: &'a str,
    walked: Vec<u8>,
}

impl<'a> ConstructScanner<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            input,
            walked: Vec::new(),
        }
    }

    /// Scans the construct whose `[` sits at `open`.
    ///
    /// Slice endpoints are only ever placed next to ASCII structural bytes, so
    /// they stay on UTF-8 boundaries.
    pub(crate) fn scan(&mut self, open: usize) -> Option<ScannedTag> {
        let input = self.input;
        let bytes = input.as_bytes();
        let len = bytes.len();
        debug_assert!(open < len && bytes[open] == b'[');
        if self.walked.len() != len {
            self.walked = vec![0; len];
        }

        let name_start = open + 1;
        if !bytes.get(name_start).copied().is_some_and(is_name_byte) {
            return None;
        }
        let mut k = name_start;
        self.walk(&mut k, ScanState::Name, is_name_byte)?;
        let name = &input[name_start..k];
        let mut attributes = Attributes::new();
        if let Some(value) = self.optional_value(&mut k)? {
            attributes.insert(name, value);
        }

        loop {
            self.walk(&mut k, ScanState::Clause, |b| b.is_ascii_whitespace())?;
            match bytes.get(k) {
                None | Some(b'=') => return None,
                Some(b']') => {
                    return Some(ScannedTag {
                        end: k + 1,
                        name: name.to_string(),
                        attributes,
                    });
                }
                Some(_) => {}
            }
            let key_start = k;
            self.walk(&mut k, ScanState::Name, is_name_byte)?;
            let key = &input[key_start..k];
            let value = self.optional_value(&mut k)?;
            attributes.insert(key, value.unwrap_or(""));
        }
    }

    /// Walks the whitespace after a name and, when `=` follows, the value.
    /// The outer `None` means the construct is malformed.
    fn optional_value(&mut self, k: &mut usize) -> Option<Option<&'a str>> {
        let input = self.input;
        let bytes = input.as_bytes();
        let mut after_name = *k;
        self.walk(&mut after_name, ScanState::AfterName, |b| b.is_ascii_whitespace())?;
        if bytes.get(after_name) != Some(&b'=') {
            *k = after_name;
            return Some(None);
        }
        *k = after_name + 1;
        self.value(k).map(Some)
    }

    /// Scans a value starting at `*k` (just past `=`), leaving `*k` after it.
    fn value(&mut self, k: &mut usize) -> Option<&'a str> {
        let input = self.input;
        let bytes = input.as_bytes();
        self.walk(k, ScanState::ValueStart, |b| b.is_ascii_whitespace())?;
        let quote = *bytes.get(*k)?;
        let state = match quote {
            b'"' => ScanState::DoubleQuoted,
            b'\'' => ScanState::SingleQuoted,
            _ => {
                let value_start = *k;
                self.walk(k, ScanState::Unquoted, is_unquoted_value_byte)?;
                return Some(&input[value_start..*k]);
            }
        };
        let value_start = *k + 1;
        *k = value_start;
        self.walk(k, state, |b| b != quote)?;
        if *k >= bytes.len() {
            return None;
        }
        let value = &input[value_start..*k];
        *k += 1;
        Some(value)
    }

    /// Advances `*k` over the bytes `accept` takes, marking each as walked in
    /// `state`. `None` when an earlier scan already walked one of them in the
    /// same state.
    fn walk(
        &mut self,
        k: &mut usize,
        state: ScanState,
        accept: impl Fn(u8) -> bool,
    ) -> Option<()> {
        let input = self.input;
        let bytes = input.as_bytes();
        let bit = state as u8;
        while *k < bytes.len() && accept(bytes[*k]) {
            let seen = &mut self.walked[*k];
            if *seen & bit != 0 {
                return None;
            }
            *seen |= bit;
            *k += 1;
        }
        Some(())
    }
}
