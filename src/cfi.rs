//! EPUB canonical fragment identifiers (CFI).
//!
//! A CFI addresses a point (or range) inside a publication:
//!
//! ```text
//! epubcfi(/6/4[chap01ref]!/4[body01]/10[para05]/3:10)
//! ```
//!
//! - `/N` — child step (spine position, element index)
//! - `[assertion]` — id or text assertion, `^`-escapable, `;`-parameters
//! - `!` — indirection into the referenced document
//! - `:N` — character offset at the final step
//! - `~N` / `@N:N` — temporal/spatial offsets (accepted, ignored)
//! - `,start,end` — range form sharing a common parent path
//!
//! Malformed input parses to `None`, never a panic. The comparator orders
//! CFIs by document position and is the backbone of the TOC binary search.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// One step of a CFI path: a child index plus optional assertion and
/// character offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Child position (even for elements, odd for text, per the CFI scheme;
    /// the engine treats it as an opaque ordering key).
    pub index: u32,
    /// Bracketed assertion text, parameters stripped.
    pub assertion: Option<String>,
    /// Character offset; meaningful on the final step only.
    pub offset: Option<u32>,
}

impl Step {
    fn new(index: u32) -> Self {
        Self {
            index,
            assertion: None,
            offset: None,
        }
    }
}

/// Range tails: the paths from the shared parent to the range's two ends.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CfiRange {
    start: Vec<Vec<Step>>,
    end: Vec<Vec<Step>>,
}

/// A parsed CFI: indirection-separated step paths, optionally a range.
///
/// For a range CFI, `parts` holds the shared parent path and `range` the
/// start/end tails; [`Cfi::collapse`] resolves it to a point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cfi {
    parts: Vec<Vec<Step>>,
    range: Option<CfiRange>,
}

impl Cfi {
    /// Parse a CFI string, with or without the `epubcfi(…)` wrapper.
    ///
    /// Returns `None` on malformed input.
    pub fn parse(input: &str) -> Option<Cfi> {
        let trimmed = input.trim();
        let body = trimmed
            .strip_prefix("epubcfi(")
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(trimmed);
        if body.is_empty() {
            return None;
        }

        let segments = split_top_level(body, ',');
        match segments.len() {
            1 => Some(Cfi {
                parts: parse_parts(segments[0])?,
                range: None,
            }),
            3 => Some(Cfi {
                parts: parse_parts(segments[0])?,
                range: Some(CfiRange {
                    start: parse_parts(segments[1])?,
                    end: parse_parts(segments[2])?,
                }),
            }),
            _ => None,
        }
    }

    /// Whether this CFI is a range rather than a point.
    pub fn is_range(&self) -> bool {
        self.range.is_some()
    }

    /// Resolve a range CFI to one of its end points (start when `to_end` is
    /// false). Point CFIs are returned unchanged.
    pub fn collapse(&self, to_end: bool) -> Cfi {
        match &self.range {
            None => self.clone(),
            Some(range) => Cfi {
                parts: join_parts(&self.parts, if to_end { &range.end } else { &range.start }),
                range: None,
            },
        }
    }

    /// Three-way comparison by document position.
    ///
    /// Ranges collapse to their start point. Paths compare part by part and
    /// step by step on child indices; a path that runs out of steps orders
    /// before a longer one. Character offsets break ties only when both
    /// sides carry one at the final step. Assertions never participate.
    ///
    /// This is deliberately not an `Ord` impl: two distinct CFIs (differing
    /// only in assertions or one-sided offsets) can compare equal.
    pub fn compare(&self, other: &Cfi) -> Ordering {
        let a = self.start_parts();
        let b = other.start_parts();

        for i in 0..a.len().max(b.len()) {
            let p = a.get(i).map(Vec::as_slice).unwrap_or(&[]);
            let q = b.get(i).map(Vec::as_slice).unwrap_or(&[]);
            let steps = p.len().max(q.len());

            for j in 0..steps {
                let x = match p.get(j) {
                    Some(step) => step,
                    None => return Ordering::Less,
                };
                let y = match q.get(j) {
                    Some(step) => step,
                    None => return Ordering::Greater,
                };
                match x.index.cmp(&y.index) {
                    Ordering::Equal => {}
                    unequal => return unequal,
                }
                if j + 1 == steps
                    && let (Some(xo), Some(yo)) = (x.offset, y.offset)
                {
                    match xo.cmp(&yo) {
                        Ordering::Equal => {}
                        unequal => return unequal,
                    }
                }
            }
        }

        Ordering::Equal
    }

    /// Synthesize the conventional spine-item CFI `/6/{2·(i+1)}` for spine
    /// position `index`.
    ///
    /// Formats without native CFIs (plain text, some PDFs) use these so
    /// their sections still participate in CFI-keyed lookups.
    pub fn from_spine_index(index: usize) -> Cfi {
        let child = 2u64.saturating_mul(index as u64 + 1);
        let child = u32::try_from(child).unwrap_or(u32::MAX);
        Cfi {
            parts: vec![vec![Step::new(6), Step::new(child)]],
            range: None,
        }
    }

    /// The parts of the start point: borrowed for point CFIs, joined with
    /// the start tail for ranges.
    fn start_parts(&self) -> Cow<'_, [Vec<Step>]> {
        match &self.range {
            None => Cow::Borrowed(self.parts.as_slice()),
            Some(range) => Cow::Owned(join_parts(&self.parts, &range.start)),
        }
    }
}

/// Concatenate a parent path with a range tail: the tail's first part
/// continues the parent's last part, remaining tail parts follow whole.
fn join_parts(parent: &[Vec<Step>], tail: &[Vec<Step>]) -> Vec<Vec<Step>> {
    let mut joined: Vec<Vec<Step>> = parent.to_vec();
    let mut remaining = tail.iter();
    if let Some(first) = remaining.next() {
        match joined.last_mut() {
            Some(last) => last.extend(first.iter().cloned()),
            None => joined.push(first.clone()),
        }
    }
    joined.extend(remaining.cloned());
    joined
}

/// Split at top-level occurrences of `separator`, ignoring occurrences
/// inside `[…]` assertions and after `^` escapes.
fn split_top_level(body: &str, separator: char) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut escaped = false;
    let mut segment_start = 0;

    for (pos, c) in body.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '^' => escaped = true,
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                segments.push(&body[segment_start..pos]);
                segment_start = pos + c.len_utf8();
            }
            _ => {}
        }
    }
    segments.push(&body[segment_start..]);
    segments
}

/// Parse one segment into its `!`-separated local paths.
fn parse_parts(segment: &str) -> Option<Vec<Vec<Step>>> {
    let mut parts = Vec::new();
    for local in split_top_level(segment, '!') {
        parts.push(parse_local_path(local)?);
    }
    Some(parts)
}

/// Parse a single local path like `/6/4[chap01ref]/10:3`.
fn parse_local_path(local: &str) -> Option<Vec<Step>> {
    let mut steps: Vec<Step> = Vec::new();
    let mut chars = local.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '/' => {
                let index = parse_number(&mut chars)?;
                steps.push(Step::new(index));
            }
            '[' => {
                let assertion = parse_assertion(&mut chars)?;
                let step = steps.last_mut()?;
                step.assertion = Some(assertion);
            }
            ':' => {
                let offset = parse_number(&mut chars)?;
                let step = steps.last_mut()?;
                step.offset = Some(offset);
            }
            // Temporal (~1.5) and spatial (@10:20) offsets: consumed, ignored.
            '~' | '@' => {
                while matches!(chars.peek(), Some('0'..='9' | '.' | ':')) {
                    chars.next();
                }
            }
            _ => return None,
        }
    }

    if steps.is_empty() { None } else { Some(steps) }
}

/// Parse an unsigned decimal number from the stream.
fn parse_number(chars: &mut Peekable<Chars>) -> Option<u32> {
    let mut value: u32 = 0;
    let mut digits = 0;
    while let Some(c) = chars.peek().copied() {
        let Some(digit) = c.to_digit(10) else { break };
        value = value.checked_mul(10)?.checked_add(digit)?;
        digits += 1;
        chars.next();
    }
    if digits == 0 { None } else { Some(value) }
}

/// Parse an assertion body after `[`, consuming through the matching `]`.
///
/// `^` escapes the next character; everything from the first unescaped `;`
/// (assertion parameters like `;s=b`) is dropped.
fn parse_assertion(chars: &mut Peekable<Chars>) -> Option<String> {
    let mut text = String::new();
    let mut in_params = false;

    loop {
        match chars.next()? {
            ']' => return Some(text),
            '^' => {
                let escaped = chars.next()?;
                if !in_params {
                    text.push(escaped);
                }
            }
            ';' => in_params = true,
            c if !in_params => text.push(c),
            _ => {}
        }
    }
}

// ============================================================================
// Canonical serialization
// ============================================================================

impl fmt::Display for Cfi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epubcfi(")?;
        write_parts(f, &self.parts)?;
        if let Some(range) = &self.range {
            write!(f, ",")?;
            write_parts(f, &range.start)?;
            write!(f, ",")?;
            write_parts(f, &range.end)?;
        }
        write!(f, ")")
    }
}

fn write_parts(f: &mut fmt::Formatter<'_>, parts: &[Vec<Step>]) -> fmt::Result {
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            write!(f, "!")?;
        }
        for step in part {
            write!(f, "/{}", step.index)?;
            if let Some(assertion) = &step.assertion {
                write!(f, "[")?;
                for c in assertion.chars() {
                    if matches!(c, '^' | '[' | ']' | '(' | ')' | ',' | ';') {
                        write!(f, "^")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, "]")?;
            }
            if let Some(offset) = step.offset {
                write!(f, ":{offset}")?;
            }
        }
    }
    Ok(())
}
