//! Clause segmentation of raw card text

use regex::Regex;
use std::sync::OnceLock;

fn bracket_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\[([^\]]+)\]").unwrap())
}

/// Collapse every whitespace run to one space and trim
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Bracketed timing marker that opens a clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingMarker {
    OnPlay,
    WhenAttacking,
    WhenBlocking,
    OnOpponentsAttack,
    OnKo,
    ActivateMain,
    Main,
    YourTurn,
    OpponentsTurn,
    EndOfYourTurn,
    Trigger,
    Counter,
}

impl TimingMarker {
    /// Recognize the text between the brackets
    pub fn parse(inner: &str) -> Option<Self> {
        let key = normalize_whitespace(inner)
            .replace('’', "'")
            .to_lowercase();
        let marker = match key.as_str() {
            "on play" => TimingMarker::OnPlay,
            "when attacking" => TimingMarker::WhenAttacking,
            "when blocking" => TimingMarker::WhenBlocking,
            "on your opponent's attack" | "on opponent's attack" => {
                TimingMarker::OnOpponentsAttack
            }
            "on k.o." | "on ko" => TimingMarker::OnKo,
            "activate: main" | "activate:main" => TimingMarker::ActivateMain,
            "main" => TimingMarker::Main,
            "your turn" => TimingMarker::YourTurn,
            "opponent's turn" => TimingMarker::OpponentsTurn,
            "end of your turn" => TimingMarker::EndOfYourTurn,
            "trigger" => TimingMarker::Trigger,
            "counter" => TimingMarker::Counter,
            _ => return None,
        };
        Some(marker)
    }

    /// Mechanic token this marker contributes to its clause
    pub fn mechanic(&self) -> &'static str {
        match self {
            TimingMarker::OnPlay => "OnPlay",
            TimingMarker::WhenAttacking => "WhenAttacking",
            TimingMarker::WhenBlocking => "WhenBlocking",
            TimingMarker::OnOpponentsAttack => "OnOppAttack",
            TimingMarker::OnKo => "OnKO",
            TimingMarker::ActivateMain => "ActivateMain",
            TimingMarker::Main => "Main",
            TimingMarker::YourTurn => "YourTurn",
            TimingMarker::OpponentsTurn => "OppTurn",
            TimingMarker::EndOfYourTurn => "EndOfYourTurn",
            TimingMarker::Trigger => "Trigger",
            TimingMarker::Counter => "Counter",
        }
    }
}

/// One segment of card text, with the timing markers that open it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub text: String,
    pub markers: Vec<TimingMarker>,
}

impl Clause {
    pub fn new(text: &str, markers: Vec<TimingMarker>) -> Self {
        Clause {
            text: text.trim().to_string(),
            markers,
        }
    }

    pub fn mechanics(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.markers.iter().map(TimingMarker::mechanic)
    }
}

/// Split card text into clauses
///
/// Timing markers open a new clause and stay attached to it. Markers that
/// follow only other bracketed tokens (`[DON!! x1] [When Attacking]`,
/// `[Your Turn] [On Play]`) join the clause already being built. A marker
/// quoted inside a sentence ("a card with a [Trigger]") opens nothing. Without
/// any opening marker the text splits at sentence boundaries.
pub fn split_clauses(text: &str) -> Vec<Clause> {
    let normalized = normalize_whitespace(text);
    if normalized.is_empty() {
        return Vec::new();
    }

    let markers: Vec<(usize, TimingMarker)> = bracket_regex()
        .captures_iter(&normalized)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            if !opens_clause(&normalized[..whole.start()]) {
                return None;
            }
            TimingMarker::parse(&caps[1]).map(|marker| (whole.start(), marker))
        })
        .collect();

    if markers.is_empty() {
        return split_sentences(&normalized)
            .into_iter()
            .map(|sentence| Clause::new(sentence, Vec::new()))
            .collect();
    }

    let mut starts = vec![0usize];
    let mut current = 0usize;
    for (start, _) in &markers {
        if only_brackets(&normalized[current..*start]) {
            continue;
        }
        starts.push(*start);
        current = *start;
    }

    let mut clauses = Vec::new();
    for (idx, start) in starts.iter().enumerate() {
        let end = starts.get(idx + 1).copied().unwrap_or(normalized.len());
        let segment = &normalized[*start..end];
        if segment.trim().is_empty() {
            continue;
        }
        let own_markers = markers
            .iter()
            .filter(|(pos, _)| *pos >= *start && *pos < end)
            .map(|(_, marker)| *marker)
            .collect();
        clauses.push(Clause::new(segment, own_markers));
    }
    clauses
}

/// A marker opens a clause at the start of the text or after a sentence end or
/// another bracket
fn opens_clause(preceding: &str) -> bool {
    match preceding.trim_end().chars().last() {
        None => true,
        Some(ch) => matches!(ch, '.' | ')' | ']' | '!'),
    }
}

fn only_brackets(segment: &str) -> bool {
    bracket_regex().replace_all(segment, "").trim().is_empty()
}

/// Split at `.` followed by whitespace or end of text, keeping abbreviations
/// such as `K.O.` intact unless the next word starts a new sentence
fn split_sentences(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut sentences = Vec::new();
    let mut start = 0usize;

    for (idx, ch) in text.char_indices() {
        if ch != '.' {
            continue;
        }
        let at_boundary = bytes
            .get(idx + 1)
            .map_or(true, |next| next.is_ascii_whitespace());
        let abbreviation =
            idx >= 2 && bytes[idx - 2] == b'.' && !starts_sentence(&text[idx + 1..]);
        if at_boundary && !abbreviation {
            let sentence = text[start..=idx].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = idx + 1;
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

/// Whitespace then an uppercase letter
fn starts_sentence(rest: &str) -> bool {
    let trimmed = rest.trim_start();
    trimmed.len() < rest.len() && trimmed.chars().next().is_some_and(char::is_uppercase)
}
