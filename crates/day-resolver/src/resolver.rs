//! Deterministic resolution of relative day expressions.
//!
//! Maps short natural-language phrases ("today", "5 days ago", "in 3 days")
//! to calendar dates. Resolution is a pure function of the phrase and the
//! caller-supplied "today". There is no clock access and no shared mutable
//! state, so every function here is safe to call from any number of threads.
//!
//! An unrecognized phrase is an expected outcome, reported as `None`. It is
//! never an error and never a panic.
//!
//! # Grammar
//!
//! Input is trimmed and lower-cased, then tried against an ordered rule
//! table. The first matching rule wins.
//!
//! | Phrase               | Offset |
//! |----------------------|--------|
//! | `today`              | 0      |
//! | `yesterday`          | −1     |
//! | `tomorrow`           | +1     |
//! | `N day(s) ago`       | −N     |
//! | `in N day(s)`        | +N     |
//! | `N day(s) before`    | −N     |
//! | `after N day(s)`     | +N     |
//!
//! Keywords must match the whole phrase. Count phrases are anchored at the
//! start; under [`MatchMode::Prefix`] (the default) trailing text after a
//! match is ignored, so `"5 days ago and more"` resolves like `"5 days ago"`.
//! [`MatchMode::Strict`] requires the pattern to cover the whole phrase.
//!
//! `N` is any run of Unicode decimal digits (`"٣ days ago"` is three days
//! back). Whitespace is Unicode `White_Space` plus the ASCII information
//! separators U+001C–U+001F, both for trimming and between words.
//!
//! Dates are only produced for years 1 through 9999, so every result has a
//! plain `YYYY-MM-DD` form. Anything further out is unrecognized.

use std::fmt;
use std::sync::LazyLock;

use chrono::{Datelike, Days, NaiveDate};
use regex::Regex;
use serde::Serialize;

use crate::clock::Clock;

// ── Options ─────────────────────────────────────────────────────────────────

/// How much of the phrase a count pattern must cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Anchored at the start; trailing text is ignored.
    #[default]
    Prefix,
    /// The pattern must match the entire phrase.
    Strict,
}

/// Options for [`DateExpressionResolver`] and [`resolve_date_with_options`].
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub match_mode: MatchMode,
}

// ── Rule table ──────────────────────────────────────────────────────────────

/// The recognition rule that produced a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Today,
    Yesterday,
    Tomorrow,
    DaysAgo,
    InDays,
    DaysBefore,
    AfterDays,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Past,
    Future,
}

impl Direction {
    fn apply(self, count: i64) -> i64 {
        match self {
            Direction::Past => -count,
            Direction::Future => count,
        }
    }
}

/// Whole-phrase keywords and their fixed offsets.
const KEYWORDS: &[(&str, Rule, i64)] = &[
    ("today", Rule::Today, 0),
    ("yesterday", Rule::Yesterday, -1),
    ("tomorrow", Rule::Tomorrow, 1),
];

/// Count phrases. Each pattern has exactly one capture group: the day count.
/// A literal space stands for one or more whitespace characters.
const COUNT_RULES: &[(Rule, &str, Direction)] = &[
    (Rule::DaysAgo, r"(\d+) days? ago", Direction::Past),
    (Rule::InDays, r"in (\d+) days?", Direction::Future),
    (Rule::DaysBefore, r"(\d+) days? before", Direction::Past),
    (Rule::AfterDays, r"after (\d+) days?", Direction::Future),
];

const WHITESPACE: &str = r"[\s\x1C-\x1F]+";

const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

struct CompiledRule {
    rule: Rule,
    direction: Direction,
    prefix: Regex,
    strict: Regex,
}

impl CompiledRule {
    fn pattern(&self, mode: MatchMode) -> &Regex {
        match mode {
            MatchMode::Prefix => &self.prefix,
            MatchMode::Strict => &self.strict,
        }
    }
}

static COMPILED_RULES: LazyLock<Vec<CompiledRule>> = LazyLock::new(|| {
    COUNT_RULES
        .iter()
        .map(|&(rule, pattern, direction)| {
            let pattern = pattern.replace(' ', WHITESPACE);
            CompiledRule {
                rule,
                direction,
                prefix: Regex::new(&format!("^(?:{pattern})")).expect("Invalid count rule regex"),
                strict: Regex::new(&format!("^(?:{pattern})$")).expect("Invalid count rule regex"),
            }
        })
        .collect()
});

static DECIMAL_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d$").expect("Invalid digit regex"));

// ── Resolution ──────────────────────────────────────────────────────────────

/// A successfully resolved expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedDate {
    /// The calendar date (`today + offset_days`).
    pub date: NaiveDate,
    /// Signed number of days from today.
    pub offset_days: i64,
    /// Which rule matched.
    pub rule: Rule,
}

impl ResolvedDate {
    /// The date as `YYYY-MM-DD`.
    pub fn to_iso_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for ResolvedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date.format("%Y-%m-%d"))
    }
}

/// Resolves relative day expressions against a supplied "today".
///
/// Stateless apart from its options; construct once and share freely.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use day_resolver::DateExpressionResolver;
///
/// let today = NaiveDate::from_ymd_opt(2025, 7, 5).unwrap();
/// let resolver = DateExpressionResolver::default();
///
/// let resolved = resolver.resolve("5 days ago", today).unwrap();
/// assert_eq!(resolved.to_iso_string(), "2025-06-30");
/// assert_eq!(resolved.offset_days, -5);
///
/// assert!(resolver.resolve("maybe later", today).is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DateExpressionResolver {
    options: ResolveOptions,
}

impl DateExpressionResolver {
    pub fn new(options: ResolveOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Resolve `input` relative to `today`.
    ///
    /// Returns `None` when no rule recognizes the phrase, or when the result
    /// falls outside years 1 through 9999.
    pub fn resolve(&self, input: &str, today: NaiveDate) -> Option<ResolvedDate> {
        let normalized = normalize_expression(input);

        try_keyword(&normalized, today)
            .or_else(|| try_count_rule(&normalized, today, self.options.match_mode))
    }

    /// Resolve `input` relative to the date reported by `clock`.
    pub fn resolve_with_clock<C: Clock + ?Sized>(
        &self,
        input: &str,
        clock: &C,
    ) -> Option<ResolvedDate> {
        self.resolve(input, clock.today())
    }
}

/// Resolve a relative day expression to a date using prefix matching.
///
/// For strict matching, use [`resolve_date_with_options`].
pub fn resolve_date(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    resolve_date_with_options(input, today, &ResolveOptions::default())
}

/// Resolve a relative day expression to a date with options.
pub fn resolve_date_with_options(
    input: &str,
    today: NaiveDate,
    options: &ResolveOptions,
) -> Option<NaiveDate> {
    DateExpressionResolver::new(options.clone())
        .resolve(input, today)
        .map(|resolved| resolved.date)
}

// ── Internal helpers ────────────────────────────────────────────────────────

fn is_space(c: char) -> bool {
    c.is_whitespace() || ('\u{1C}'..='\u{1F}').contains(&c)
}

fn normalize_expression(s: &str) -> String {
    s.trim_matches(is_space).to_lowercase()
}

fn try_keyword(s: &str, today: NaiveDate) -> Option<ResolvedDate> {
    let &(_, rule, offset_days) = KEYWORDS.iter().find(|(keyword, _, _)| *keyword == s)?;
    Some(ResolvedDate {
        date: offset_date(today, offset_days)?,
        offset_days,
        rule,
    })
}

fn try_count_rule(s: &str, today: NaiveDate, mode: MatchMode) -> Option<ResolvedDate> {
    let (compiled, captures) = COMPILED_RULES.iter().find_map(|compiled| {
        compiled
            .pattern(mode)
            .captures(s)
            .map(|captures| (compiled, captures))
    })?;

    let count = parse_count(captures.get(1)?.as_str())?;
    let offset_days = compiled.direction.apply(count);

    Some(ResolvedDate {
        date: offset_date(today, offset_days)?,
        offset_days,
        rule: compiled.rule,
    })
}

/// Parse a run of decimal digits from any script. `None` on overflow.
fn parse_count(digits: &str) -> Option<i64> {
    digits.chars().try_fold(0i64, |count, c| {
        count.checked_mul(10)?.checked_add(i64::from(decimal_value(c)?))
    })
}

/// Numeric value of a Unicode decimal digit (general category Nd).
///
/// Nd characters come in contiguous runs of ten, zero through nine, so the
/// value is the distance from the start of the run, modulo ten.
fn decimal_value(c: char) -> Option<u32> {
    if let Some(value) = c.to_digit(10) {
        return Some(value);
    }
    if !is_decimal_digit(c) {
        return None;
    }

    let mut zero = u32::from(c);
    while let Some(prev) = zero.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        zero -= 1;
    }
    Some((u32::from(c) - zero) % 10)
}

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    DECIMAL_DIGIT.is_match(c.encode_utf8(&mut buf))
}

/// `today + offset_days`, or `None` outside years 1 through 9999.
fn offset_date(today: NaiveDate, offset_days: i64) -> Option<NaiveDate> {
    let magnitude = Days::new(offset_days.unsigned_abs());
    let date = if offset_days >= 0 {
        today.checked_add_days(magnitude)
    } else {
        today.checked_sub_days(magnitude)
    }?;
    (MIN_YEAR..=MAX_YEAR).contains(&date.year()).then_some(date)
}

// ── Tests ───────────────────────────────────────────────────────────────────
