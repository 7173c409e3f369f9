//! RFC 5322 header handling: unfolding, encoded-words (RFC 2047), and date parsing.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use mail_parser::decoders::quoted_printable::quoted_printable_decode;
use tracing::warn;

/// Decode raw header bytes to a string.
///
/// Tries UTF-8 first, then falls back to Windows-1252 (which accepts every byte).
pub(crate) fn decode_header_bytes(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Unfold a header block: continuation lines (starting with space or tab)
/// are joined to the previous header.
///
/// Returns `(name, raw_value)` pairs in order. Names keep their original case.
pub(crate) fn unfold_headers(text: &str) -> Vec<(String, String)> {
    let mut result: Vec<(String, String)> = Vec::new();

    for line in text.lines() {
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some(last) = result.last_mut() {
                if !last.1.is_empty() {
                    last.1.push(' ');
                }
                last.1.push_str(line.trim());
            }
        } else if let Some(colon_pos) = line.find(':') {
            let name = line[..colon_pos].trim().to_string();
            let value = line[colon_pos + 1..].trim().to_string();
            result.push((name, value));
        }
        // Lines without a colon and not a continuation are silently skipped
    }

    result
}

/// Decode RFC 2047 encoded-words in a header value.
///
/// Consecutive encoded-words in one charset are joined before the charset
/// is applied, so a character split across words survives. Whitespace
/// between encoded-words is dropped. Anything that does not decode is kept
/// as written.
///
/// Example: `"=?UTF-8?B?SG9sYQ==?= =?UTF-8?B?IG11bmRv?="` → `"Hola mundo"`
pub fn decode_encoded_words(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut run: Option<(&str, Vec<u8>)> = None;
    let mut gap = "";

    for token in tokenize(input) {
        match token {
            Token::Word { charset, bytes } => {
                match &mut run {
                    Some((current, pending)) if current.eq_ignore_ascii_case(charset) => {
                        pending.extend(bytes)
                    }
                    _ => {
                        flush_run(&mut out, run.take());
                        run = Some((charset, bytes));
                    }
                }
                gap = "";
            }
            Token::Text(text) if run.is_some() && text.trim().is_empty() => gap = text,
            Token::Text(text) => {
                flush_run(&mut out, run.take());
                out.push_str(gap);
                out.push_str(text);
                gap = "";
            }
        }
    }
    flush_run(&mut out, run.take());
    out.push_str(gap);
    out
}

enum Token<'a> {
    Text(&'a str),
    Word { charset: &'a str, bytes: Vec<u8> },
}

/// Split a header value into literal text and decoded encoded-words.
fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut literal_from = 0;
    let mut pos = 0;

    while let Some(found) = input[pos..].find("=?") {
        let start = pos + found;
        match parse_word(&input[start..]) {
            Some((token, len)) => {
                if literal_from < start {
                    tokens.push(Token::Text(&input[literal_from..start]));
                }
                tokens.push(token);
                pos = start + len;
                literal_from = pos;
            }
            None => pos = start + 2,
        }
    }
    if literal_from < input.len() {
        tokens.push(Token::Text(&input[literal_from..]));
    }
    tokens
}

/// Parse `=?charset?encoding?text?=` at the start of `s`, returning the
/// decoded word and its length in `s`.
fn parse_word(s: &str) -> Option<(Token<'_>, usize)> {
    let inner = s.strip_prefix("=?")?;
    let (charset, inner) = inner.split_once('?')?;
    let (encoding, inner) = inner.split_once('?')?;
    let end = inner.find("?=")?;
    let text = &inner[..end];
    if charset.is_empty() || text.contains(char::is_whitespace) {
        return None;
    }

    let bytes = match encoding {
        "B" | "b" => decode_base64_lenient(text.as_bytes())?,
        // Q is quoted-printable with `_` standing for a space
        "Q" | "q" => quoted_printable_decode(text.replace('_', " ").as_bytes())?,
        _ => return None,
    };
    // RFC 2231 allows a language suffix: `utf-8*en`
    let charset = charset.split('*').next().unwrap_or(charset);
    let len = s.len() - inner.len() + end + 2;
    Some((Token::Word { charset, bytes }, len))
}

fn flush_run(out: &mut String, run: Option<(&str, Vec<u8>)>) {
    if let Some((charset, bytes)) = run {
        out.push_str(&decode_charset(charset, &bytes));
    }
}

/// Base64-decode, ignoring embedded whitespace and tolerating missing padding.
pub(crate) fn decode_base64_lenient(input: &[u8]) -> Option<Vec<u8>> {
    let mut compact: Vec<u8> = input
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    while compact.len() % 4 != 0 {
        compact.push(b'=');
    }
    STANDARD.decode(&compact).ok()
}

/// Decode bytes using a named charset, falling back to lossy UTF-8.
pub(crate) fn decode_charset(charset: &str, bytes: &[u8]) -> String {
    if charset.is_empty()
        || charset.eq_ignore_ascii_case("utf-8")
        || charset.eq_ignore_ascii_case("utf8")
    {
        return String::from_utf8_lossy(bytes).into_owned();
    }
    match encoding_rs::Encoding::for_label(charset.as_bytes()) {
        Some(encoding) => {
            let (decoded, _, _) = encoding.decode(bytes);
            decoded.into_owned()
        }
        None => {
            warn!(charset, "Unknown charset, falling back to UTF-8 lossy");
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

/// Strip one pair of surrounding angle brackets (Content-ID, Message-ID).
pub(crate) fn strip_angle_brackets(s: &str) -> &str {
    let trimmed = s.trim();
    trimmed
        .strip_prefix('<')
        .and_then(|inner| inner.strip_suffix('>'))
        .unwrap_or(trimmed)
}

/// Parse an RFC 2822 date, tolerating common real-world deviations.
///
/// Returns `None` (and logs) if nothing matches.
pub fn parse_date(date_str: &str) -> Option<DateTime<Utc>> {
    let trimmed = date_str.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    // A doubled or misspelled weekday makes chrono reject the whole string
    let no_dow = strip_day_of_week(trimmed);
    let with_offset = replace_named_tz(&no_dow);

    let formats = [
        "%d %b %Y %H:%M:%S %z",
        "%d %b %Y %H:%M %z",
        "%d %b %Y %H:%M:%S",
        "%Y-%m-%d %H:%M:%S %z",
        "%Y-%m-%d %H:%M:%S",
    ];

    for candidate in [&no_dow, &with_offset] {
        for fmt in &formats {
            if let Ok(dt) = DateTime::parse_from_str(candidate, fmt) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(ndt) = NaiveDateTime::parse_from_str(candidate, fmt) {
                return Some(Utc.from_utc_datetime(&ndt));
            }
        }
    }

    if let Some(dt) = mail_parser_date(trimmed) {
        return Some(dt);
    }

    warn!(date = trimmed, "Could not parse date");
    None
}

/// Attempt to parse a date using `mail-parser`'s built-in parser.
fn mail_parser_date(input: &str) -> Option<DateTime<Utc>> {
    use mail_parser::MessageParser;

    let fake_msg = format!("Date: {input}\n\n");
    let parsed = MessageParser::default().parse(fake_msg.as_bytes())?;
    let dt = parsed.date()?.to_rfc3339();
    DateTime::parse_from_rfc3339(&dt)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// Strip every leading day-of-week prefix (e.g. "Thu, " or "Thu ").
fn strip_day_of_week(s: &str) -> String {
    const DAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
    let mut rest = s.trim();
    loop {
        let Some(day) = DAYS.iter().find(|d| rest.starts_with(*d)) else {
            break;
        };
        rest = rest[day.len()..].trim_start_matches(',').trim_start();
    }
    rest.to_string()
}

/// Replace well-known timezone abbreviations with numeric offsets.
fn replace_named_tz(s: &str) -> String {
    const TZS: [(&str, &str); 11] = [
        ("EST", "-0500"),
        ("EDT", "-0400"),
        ("CST", "-0600"),
        ("CDT", "-0500"),
        ("PST", "-0800"),
        ("PDT", "-0700"),
        ("GMT", "+0000"),
        ("UTC", "+0000"),
        ("CEST", "+0200"),
        ("CET", "+0100"),
        ("JST", "+0900"),
    ];
    let mut result = s.to_string();
    for (name, offset) in TZS {
        if result.ends_with(name) {
            let pos = result.len() - name.len();
            result.replace_range(pos.., offset);
            return result;
        }
    }
    result
}
