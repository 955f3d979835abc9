//! Text search over task descriptions and tags
//!
//! Substring hits always rank above fuzzy hits. Fuzzy hits are scored by
//! normalized Levenshtein distance against the whole text, each word, and
//! each run of as many words as the query has, keeping the best score.

use std::cmp::Ordering;

use serde::Serialize;

use crate::domain::Task;

/// Default number of results
pub const DEFAULT_LIMIT: usize = 10;

/// How a task matched the query
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Substring,
    Fuzzy,
}

/// A task with its match score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTask {
    pub task: Task,
    pub kind: MatchKind,
    /// 0.0 for substring hits, otherwise in `(0.0, 1.0]`
    pub distance: f64,
    /// The description or tag that produced the score
    pub matched: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    pub limit: usize,
    /// Drop fuzzy hits scoring above this
    pub max_distance: Option<f64>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            max_distance: None,
        }
    }
}

/// Ranks tasks against a query
///
/// An empty query matches nothing.
pub fn search(tasks: &[Task], query: &str, options: &SearchOptions) -> Vec<RankedTask> {
    let query = query.trim().to_lowercase();
    if query.is_empty() || options.limit == 0 {
        return Vec::new();
    }
    let query_words = words(&query).len().max(1);

    let mut ranked: Vec<RankedTask> = tasks
        .iter()
        .filter_map(|task| {
            let candidates = std::iter::once(task.description.as_str())
                .chain(task.tags.iter().map(String::as_str));

            let mut best: Option<(MatchKind, f64, &str)> = None;
            for text in candidates {
                let lower = text.to_lowercase();
                let scored = if lower.contains(&query) {
                    (MatchKind::Substring, 0.0)
                } else {
                    (MatchKind::Fuzzy, best_distance(&query, &lower, query_words))
                };
                if best.map_or(true, |(kind, distance, _)| (scored.0, scored.1) < (kind, distance))
                {
                    best = Some((scored.0, scored.1, text));
                }
            }

            let (kind, distance, matched) = best?;
            if kind == MatchKind::Fuzzy
                && options.max_distance.is_some_and(|max| distance > max)
            {
                return None;
            }
            Some(RankedTask {
                task: task.clone(),
                kind,
                distance,
                matched: matched.to_string(),
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.kind
            .cmp(&b.kind)
            .then_with(|| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal))
            .then_with(|| a.task.position.cmp(&b.task.position))
    });
    ranked.truncate(options.limit);
    ranked
}

/// Lowest normalized distance between the query and any part of `text`
fn best_distance(query: &str, text: &str, window: usize) -> f64 {
    let mut best = normalized_distance(query, text);

    let words = words(text);
    for w in &words {
        best = best.min(normalized_distance(query, w));
    }
    if window > 1 && words.len() >= window {
        for run in words.windows(window) {
            best = best.min(normalized_distance(query, &run.join(" ")));
        }
    }
    best
}

fn words(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Edit distance divided by the longer string's length, in characters
pub fn normalized_distance(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 0.0;
    }
    levenshtein(a, b) as f64 / longest as f64
}

/// Character-level Levenshtein distance
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
