//! Topic classifier: decides whether a message is about Gemora.
//!
//! A flat keyword list (tractates, commentators, technical terms) checked by
//! substring, then one loose pattern for transliterations of "Gemora".

use std::sync::LazyLock;

use regex::Regex;

/// Lowercase terms whose presence anywhere in the message marks it in-domain.
pub const GEMORA_KEYWORDS: &[&str] = &[
    "gemora",
    "gemara",
    "talmud",
    "mishnah",
    "mishna",
    "sugya",
    "daf",
    "rashi",
    "tosafot",
    "tosfos",
    "halacha",
    "halakhah",
    "rabbi",
    "chazal",
    "beit din",
    "bava",
    "berakhot",
    "shabbat",
    "eruvin",
    "pesachim",
    "yoma",
    "sukkah",
    "beitzah",
    "rosh hashanah",
    "taanit",
    "megillah",
    "moed",
    "ketubot",
    "gittin",
    "kiddushin",
    "sanhedrin",
    "avodah zarah",
    "horayot",
    "zevachim",
    "menachot",
    "chullin",
    "bekhorot",
    "arachin",
    "temurah",
    "keritot",
    "meilah",
    "niddah",
];

/// gemora, gemara, gmara, gemarah, gemoro, ...
static GEMORA_VARIANTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bg[ae]?m[aeo]?r[aeo]h?\b").expect("gemora variant pattern is valid")
});

/// Whether `text` looks like a Gemora question.
///
/// Pure function of the input; empty text is never in-domain.
pub fn is_gemora_question(text: &str) -> bool {
    let input = text.to_lowercase();
    if input.trim().is_empty() {
        return false;
    }

    GEMORA_KEYWORDS.iter().any(|keyword| input.contains(keyword))
        || GEMORA_VARIANTS.is_match(&input)
}
