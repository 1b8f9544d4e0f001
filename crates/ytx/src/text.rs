// ai
//! 🧽 Text -- HTML goes in, words come out, URLs get their %-encoded makeover.
//!
//! YouTrack stores descriptions and comments as rich text. Danswer wants
//! plain text. Somewhere between the two, a `<p>` tag has to die.
//!
//! Order is always strip, then encode. Encode first and the `<` in
//! `<a href="https://...">` ends up as `%3C`, which nobody asked for.
//!
//! ## Knowledge Graph 🧠
//! - Used by: `transforms::ingestion` (strip + encode), `transforms::file_record` (strip only)
//! - HTML parsing: `scraper` (html5ever underneath). It never refuses a document;
//!   broken markup gets best-effort text, there is no parse-error path to propagate.
//! - URL detection: `regex`, compiled once behind a `OnceLock`
//! - Timestamps live here too, because "turn a number into a string" is text work
//!
//! ⚠️ KNOWN DEFECT, PRESERVED: `epoch_millis_to_naive_z` formats LOCAL wall-clock
//! time and then glues a `Z` on the end. `Z` means UTC. Local time is not UTC
//! unless you live in Reykjavik. Danswer has been fed these strings for a while
//! now and downstream consumers compare against them, so the lie stays. 🦆

use std::fmt::Display;
use std::sync::OnceLock;

use chrono::{DateTime, Local, TimeZone};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use scraper::Html;

/// 🔒 Everything except alphanumerics, `_ . - ~` and the two we promised to keep: `:` and `/`.
const URL_ESCAPE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b':')
    .remove(b'/');

/// 🔍 `http://` or `https://`, then a run of "URL-ish" characters.
///
/// `$-_` is a RANGE (0x24..=0x5F), not three characters. It quietly swallows
/// digits, uppercase, `?`, `=`, `;`, `[`, `]` and friends. This is the pattern
/// the existing exports were produced with, so it stays exactly this greedy.
fn embedded_url_re() -> &'static Regex {
    static EMBEDDED_URL_RE: OnceLock<Regex> = OnceLock::new();
    EMBEDDED_URL_RE.get_or_init(|| {
        Regex::new(r"https?://(?:[a-zA-Z0-9$-_@.&+!*(),]|%[0-9a-fA-F]{2})+")
            .expect("valid embedded url regex")
    })
}

fn whitespace_re() -> &'static Regex {
    static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"))
}

/// 🧽 Strip markup, keep the words.
///
/// Every text node is trimmed, empty nodes are dropped, survivors are joined
/// by a single space. Entities come back decoded (`&amp;` → `&`).
/// `None` or `""` in, `None` out.
pub fn strip_markup(html: Option<&str>) -> Option<String> {
    let html = html.filter(|h| !h.is_empty())?;
    let the_soup = Html::parse_fragment(html);
    let the_words: Vec<&str> = the_soup
        .root_element()
        .text()
        .map(str::trim)
        .filter(|node| !node.is_empty())
        .collect();
    Some(the_words.join(" "))
}

/// 🔒 Percent-encode every embedded http(s) URL, leave the prose alone.
///
/// `"see https://x.io/?q=1"` → `"see https://x.io/%3Fq%3D1"`.
/// `None` or `""` in, `None` out.
pub fn encode_embedded_urls(text: Option<&str>) -> Option<String> {
    let text = text.filter(|t| !t.is_empty())?;
    let the_encoded = embedded_url_re().replace_all(text, |caps: &regex::Captures<'_>| {
        utf8_percent_encode(&caps[0], URL_ESCAPE_SET).to_string()
    });
    Some(the_encoded.into_owned())
}

/// 🔄 strip, then encode. Never the other way around.
pub fn normalize(html: Option<&str>) -> Option<String> {
    encode_embedded_urls(strip_markup(html).as_deref())
}

/// 🌬️ Collapse whitespace runs to one space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    whitespace_re().replace_all(text, " ").trim().to_string()
}

/// ⏰ Epoch millis → `YYYY-MM-DDTHH:MM:SSZ` in LOCAL time. See the module docs. Yes, really.
///
/// `None` when the millis are outside what chrono can represent.
pub fn epoch_millis_to_naive_z(epoch_millis: i64) -> Option<String> {
    epoch_millis_to_naive_z_in(epoch_millis, &Local)
}

/// Same thing, with the timezone spelled out. Tests use `Utc` so they pass on any laptop.
pub fn epoch_millis_to_naive_z_in<Tz>(epoch_millis: i64, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let the_instant = DateTime::from_timestamp_millis(epoch_millis)?;
    Some(
        the_instant
            .with_timezone(tz)
            .format("%Y-%m-%dT%H:%M:%SZ")
            .to_string(),
    )
}

/// ⏱️ Right now, local wall clock, microseconds, and the same fake `Z`.
pub fn now_naive_z() -> String {
    format!(
        "{}Z",
        Local::now().naive_local().format("%Y-%m-%dT%H:%M:%S%.6f")
    )
}
