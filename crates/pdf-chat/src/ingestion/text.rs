//! Plain-text normalization and language detection for extracted PDF text

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::document::UNKNOWN_LANGUAGE;

static HYPHENATED_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"-\n").unwrap());
static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n+").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static NON_PRINTABLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\x20-\x7E]+").unwrap());
static SPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());

/// Normalize raw extracted text into the canonical stored form
///
/// Steps run in order:
/// 1. join words hyphenated across a line break (`-\n` is removed)
/// 2. collapse runs of line breaks
/// 3. collapse every whitespace run (including the remaining line breaks) to one space
/// 4. drop characters outside printable ASCII
/// 5. trim
///
/// Step 4 can leave two spaces side by side where a non-ASCII word sat between them,
/// so space runs are collapsed once more before trimming. That keeps the function
/// idempotent.
pub fn normalize(raw: &str) -> String {
    let text = HYPHENATED_BREAK.replace_all(raw, "");
    let text = LINE_BREAKS.replace_all(&text, "\n");
    let text = WHITESPACE.replace_all(&text, " ");
    let text = NON_PRINTABLE.replace_all(&text, "");
    let text = SPACE_RUNS.replace_all(&text, " ");
    text.trim().to_string()
}

/// Detect the language of normalized text as an ISO-639-1 code
///
/// Detection is trigram based and involves no sampling, so the same text always
/// yields the same code. Returns `"unknown"` when nothing can be detected.
pub fn detect_language(text: &str) -> String {
    whatlang::detect(text)
        .and_then(|info| iso_639_1(info.lang().code()))
        .unwrap_or(UNKNOWN_LANGUAGE)
        .to_string()
}

/// Map the ISO-639-3 codes produced by the detector to ISO-639-1
fn iso_639_1(code: &str) -> Option<&'static str> {
    let two_letter = match code {
        "afr" => "af",
        "aka" => "ak",
        "amh" => "am",
        "ara" => "ar",
        "aze" => "az",
        "bel" => "be",
        "ben" => "bn",
        "bul" => "bg",
        "cat" => "ca",
        "ces" => "cs",
        "cmn" => "zh",
        "dan" => "da",
        "deu" => "de",
        "ell" => "el",
        "eng" => "en",
        "epo" => "eo",
        "est" => "et",
        "fin" => "fi",
        "fra" => "fr",
        "guj" => "gu",
        "heb" => "he",
        "hin" => "hi",
        "hrv" => "hr",
        "hun" => "hu",
        "hye" => "hy",
        "ind" => "id",
        "ita" => "it",
        "jav" => "jv",
        "jpn" => "ja",
        "kan" => "kn",
        "kat" => "ka",
        "khm" => "km",
        "kor" => "ko",
        "lat" => "la",
        "lav" => "lv",
        "lit" => "lt",
        "mal" => "ml",
        "mar" => "mr",
        "mkd" => "mk",
        "mya" => "my",
        "nep" => "ne",
        "nld" => "nl",
        "nob" => "nb",
        "ori" => "or",
        "pan" => "pa",
        "pes" => "fa",
        "pol" => "pl",
        "por" => "pt",
        "ron" => "ro",
        "rus" => "ru",
        "sin" => "si",
        "slk" => "sk",
        "slv" => "sl",
        "sna" => "sn",
        "spa" => "es",
        "srp" => "sr",
        "swe" => "sv",
        "tam" => "ta",
        "tel" => "te",
        "tgl" => "tl",
        "tha" => "th",
        "tuk" => "tk",
        "tur" => "tr",
        "ukr" => "uk",
        "urd" => "ur",
        "uzb" => "uz",
        "vie" => "vi",
        "yid" => "yi",
        "zul" => "zu",
        _ => return None,
    };
    Some(two_letter)
}
