// ABOUTME: Text segmentation module for the carousel-slides application
// ABOUTME: Splits pasted prose into a fixed number of balanced slide records

use crate::types::{SlideContent, SlideLayout, SlideStyle};
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

pub const MIN_SLIDES: usize = 3;
pub const MAX_SLIDES: usize = 9;

/// A single numbered line is not a list.
const MIN_NUMBERED_ITEMS: usize = 2;
const MIN_PARAGRAPHS: usize = 2;
/// Floor for the per-slide character budget.
const MIN_TARGET_CHARS: usize = 220;
/// Buckets shorter than this keep absorbing units regardless of the budget.
const MIN_BUCKET_CHARS: usize = 90;
/// Longest first line that is still promoted to a title.
pub const MAX_TITLE_CHARS: usize = 72;
pub const MAX_BULLETS: usize = 6;

static TRAILING_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+\n").expect("valid trailing whitespace regex"));
static EXCESS_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid blank line regex"));
static NUMBERED_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\n)\s*\d{1,2}\s*[).\-:]\s+").expect("valid numbered marker regex")
});
static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid paragraph break regex"));

/// A unit-splitting strategy. Returns `None` when its acceptance guard fails.
type Strategy = fn(&str) -> Option<Vec<String>>;

/// Tried in order; the first strategy that accepts the text wins.
const STRATEGIES: [(&str, Strategy); 4] = [
    ("numbered", split_numbered),
    ("paragraphs", split_paragraphs),
    ("sentences", split_sentence_units),
    ("whole", whole_text),
];

/// Clamp a requested slide count into the supported range.
pub fn clamp_slide_count(requested: i64) -> usize {
    requested.clamp(MIN_SLIDES as i64, MAX_SLIDES as i64) as usize
}

/// Split raw text into exactly `clamp(desired_count, 3, 9)` slides.
///
/// Never fails: empty or exhausted input produces `Part {i}` placeholders.
/// The result depends only on the arguments.
pub fn segment(raw_text: &str, desired_count: usize) -> Vec<SlideContent> {
    let count = desired_count.clamp(MIN_SLIDES, MAX_SLIDES);
    let text = normalize_text(raw_text);

    if text.is_empty() {
        debug!("Empty input, producing {} placeholder slides", count);
        return (1..=count).map(SlideContent::placeholder).collect();
    }

    let (strategy, units) = extract_units(&text);
    debug!(
        "Segmenting {} chars into {} slides using {} strategy ({} units)",
        char_count(&text),
        count,
        strategy,
        units.len()
    );

    let buckets = fill_by_splitting(pack_units(&units, count), count);
    let chunks = force_count(buckets.iter().map(Bucket::text).collect(), count);

    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| decompose(i + 1, chunk))
        .collect()
}

/// Unify line endings, drop trailing blanks and collapse runs of empty lines.
pub fn normalize_text(input: &str) -> String {
    let unified = input.replace("\r\n", "\n").replace('\r', "\n");
    let stripped = TRAILING_WHITESPACE.replace_all(&unified, "\n");
    let collapsed = EXCESS_BLANK_LINES.replace_all(&stripped, "\n\n");
    collapsed.trim().to_string()
}

fn extract_units(text: &str) -> (&'static str, Vec<String>) {
    STRATEGIES
        .iter()
        .find_map(|(name, strategy)| strategy(text).map(|units| (*name, units)))
        .unwrap_or_else(|| ("whole", vec![text.to_string()]))
}

fn split_numbered(text: &str) -> Option<Vec<String>> {
    let markers: Vec<_> = NUMBERED_MARKER.find_iter(text).collect();
    if markers.len() < MIN_NUMBERED_ITEMS {
        return None;
    }

    let mut units: Vec<String> = markers
        .iter()
        .enumerate()
        .filter_map(|(i, marker)| {
            let end = markers.get(i + 1).map_or(text.len(), |next| next.start());
            let item = text[marker.end()..end].trim();
            (!item.is_empty()).then(|| item.to_string())
        })
        .collect();

    // Text ahead of the first marker rides along with the first item
    let preamble = text[..markers[0].start()].trim();
    if let Some(first) = units.first_mut().filter(|_| !preamble.is_empty()) {
        debug!("Keeping {} chars before the first numbered item", char_count(preamble));
        *first = format!("{}\n{}", preamble, first);
    }

    (!units.is_empty()).then_some(units)
}

fn split_paragraphs(text: &str) -> Option<Vec<String>> {
    let parts: Vec<String> = PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();

    (parts.len() >= MIN_PARAGRAPHS).then_some(parts)
}

fn split_sentence_units(text: &str) -> Option<Vec<String>> {
    let sentences = split_sentences(text);
    (!sentences.is_empty()).then_some(sentences)
}

fn whole_text(text: &str) -> Option<Vec<String>> {
    Some(vec![text.to_string()])
}

/// Split after `.`, `!` or `?` followed by whitespace, keeping the punctuation.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        if let Some(&(next, following)) = chars.peek() {
            if following.is_whitespace() {
                sentences.push(text[start..i + c.len_utf8()].trim().to_string());
                start = next;
            }
        }
    }
    sentences.push(text[start..].trim().to_string());

    sentences.retain(|s| !s.is_empty());
    sentences
}

fn char_count(s: &str) -> usize {
    s.chars().count()
}

/// Units grouped for one slide, joined by newlines when rendered.
#[derive(Debug, Default, Clone)]
struct Bucket<'a> {
    units: Vec<&'a str>,
    chars: usize,
}

impl<'a> Bucket<'a> {
    fn from_units(units: &[&'a str]) -> Self {
        let mut bucket = Bucket::default();
        for unit in units {
            bucket.push(unit);
        }
        bucket
    }

    fn len_with(&self, unit: &str) -> usize {
        if self.units.is_empty() {
            char_count(unit)
        } else {
            self.chars + 1 + char_count(unit)
        }
    }

    fn push(&mut self, unit: &'a str) {
        self.chars = self.len_with(unit);
        self.units.push(unit);
    }

    fn text(&self) -> String {
        self.units.join("\n").trim().to_string()
    }

    /// Split at the unit boundary that minimizes the longer half.
    fn split_balanced(&self) -> (Bucket<'a>, Bucket<'a>) {
        let at = (1..self.units.len())
            .min_by_key(|&k| {
                let left = Bucket::from_units(&self.units[..k]);
                let right = Bucket::from_units(&self.units[k..]);
                left.chars.max(right.chars)
            })
            .unwrap_or(1);

        (
            Bucket::from_units(&self.units[..at]),
            Bucket::from_units(&self.units[at..]),
        )
    }
}

#[derive(Debug, Default)]
struct Packing<'a> {
    closed: Vec<Bucket<'a>>,
    current: Bucket<'a>,
}

/// Greedy pass: fill each bucket up to the per-slide budget.
fn pack_units(units: &[String], count: usize) -> Vec<Bucket<'_>> {
    // Count the newline joins so full buckets add up to the whole text
    let total_chars: usize =
        units.iter().map(|u| char_count(u)).sum::<usize>() + units.len().saturating_sub(1);
    let target = MIN_TARGET_CHARS.max(total_chars / count);

    let packing = units.iter().fold(Packing::default(), |mut acc, unit| {
        if acc.current.len_with(unit) <= target || acc.current.chars < MIN_BUCKET_CHARS {
            acc.current.push(unit);
        } else {
            let mut next = Bucket::default();
            next.push(unit);
            acc.closed.push(std::mem::replace(&mut acc.current, next));
        }
        acc
    });

    let mut buckets = packing.closed;
    if !packing.current.units.is_empty() {
        buckets.push(packing.current);
    }
    buckets
}

/// Split multi-unit buckets until there are enough to fill every slide.
fn fill_by_splitting(mut buckets: Vec<Bucket<'_>>, count: usize) -> Vec<Bucket<'_>> {
    while buckets.len() < count {
        let widest = buckets
            .iter()
            .enumerate()
            .filter(|(_, b)| b.units.len() >= 2)
            .max_by_key(|(i, b)| (b.chars, std::cmp::Reverse(*i)))
            .map(|(i, _)| i);

        let Some(pos) = widest else {
            break;
        };

        let (left, right) = buckets.remove(pos).split_balanced();
        buckets.insert(pos, right);
        buckets.insert(pos, left);
    }
    buckets
}

/// Pad with empty chunks or merge trailing chunks until exactly `count` remain.
fn force_count(mut chunks: Vec<String>, count: usize) -> Vec<String> {
    while chunks.len() < count {
        chunks.push(String::new());
    }
    while chunks.len() > count {
        let last = chunks.pop().unwrap_or_default();
        if let Some(tail) = chunks.last_mut() {
            *tail = format!("{}\n{}", tail, last).trim().to_string();
        }
    }
    chunks
}

fn decompose(index: usize, chunk: &str) -> SlideContent {
    let cleaned = chunk.trim();
    let lines: Vec<&str> = cleaned
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let (title, body) = match lines.split_first() {
        Some((first, rest)) if !rest.is_empty() && char_count(first) <= MAX_TITLE_CHARS => {
            (first.to_string(), rest.join("\n"))
        }
        _ => (SlideContent::fallback_title(index), cleaned.to_string()),
    };

    let bullets = derive_bullets(&body);
    SlideContent {
        index,
        title,
        subtitle: String::new(),
        body,
        bullets,
        layout: SlideLayout::for_index(index),
        image_data_url: None,
        style: SlideStyle::default(),
    }
}

/// Turn a body into at most six bullet lines.
///
/// Explicit `-`/`•` markers win, then plain lines, then sentences.
pub fn derive_bullets(body: &str) -> Vec<String> {
    let lines: Vec<&str> = body
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let marked: Vec<String> = lines
        .iter()
        .filter_map(|l| l.strip_prefix('-').or_else(|| l.strip_prefix('•')))
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();

    if marked.len() >= 2 {
        return marked.into_iter().take(MAX_BULLETS).collect();
    }
    if lines.len() >= 3 {
        return lines
            .into_iter()
            .take(MAX_BULLETS)
            .map(str::to_string)
            .collect();
    }
    split_sentences(body).into_iter().take(MAX_BULLETS).collect()
}
