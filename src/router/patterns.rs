//! Intent Pattern Module
//!
//! Data-driven table of tagged regexes. Each family can be matched and
//! counted on its own, which keeps the decision table testable.

use std::fmt;
use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};
use serde::Serialize;

// == Intent ==
/// Pattern family a command can match. Also reported as a detected intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Greetings, thanks, farewells, short acknowledgements
    Simple,
    /// Definition or how-to questions that are worth caching
    Faq,
    /// Comparison, recommendation, planning, prediction, trends
    Complex,
    /// Needs structured lookups: search, list, stats, grades
    ToolRequired,
    /// People, programs, faculty, research, locations
    Knowledge,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple => write!(f, "simple"),
            Self::Faq => write!(f, "faq"),
            Self::Complex => write!(f, "complex"),
            Self::ToolRequired => write!(f, "tool_required"),
            Self::Knowledge => write!(f, "knowledge"),
        }
    }
}

/// Built-in patterns. Simple patterns are anchored and run against the
/// normalized command so a greeting prefix does not make a real question social.
const BUILTIN_PATTERNS: &[(Intent, &str)] = &[
    // greetings
    (
        Intent::Simple,
        r"^(hai|hi|hello|helo|hey|salam|assalamualaikum|selamat (pagi|petang|malam|datang)|good (morning|afternoon|evening))( (semua|there|all|everyone|bot))?$",
    ),
    // thanks
    (
        Intent::Simple,
        r"^(terima kasih|thanks|thank you|tq|ty|thx)( (banyak|very much|so much|a lot))?$",
    ),
    // farewells
    (
        Intent::Simple,
        r"^(bye|goodbye|selamat tinggal|jumpa lagi|see you( later)?|take care)$",
    ),
    // acknowledgements
    (
        Intent::Simple,
        r"^(ok|okay|okey|baik|noted|faham|alright|sure|yes|ya|no|tidak|cool|great|nice)$",
    ),
    // FAQ shapes
    (
        Intent::Faq,
        r"^\s*(apa itu|apakah|what is|what are|what's|bagaimana|how do i|how to|how can i|bila|when is|when does|di mana|where is|where can i)\b",
    ),
    // complex / analytical
    (
        Intent::Complex,
        r"\b(analy[sz]e|analysis|analisis|analisa|compare|comparison|bandingkan|banding|perbandingan|versus|vs)\b",
    ),
    (
        Intent::Complex,
        r"\b(recommend|recommendation|cadangkan|cadangan|saranan|suggest|advise|nasihat)\b",
    ),
    (
        Intent::Complex,
        r"\b(plan|planning|rancang|perancangan|strategy|strategi|roadmap)\b",
    ),
    (
        Intent::Complex,
        r"\b(predict|prediction|ramal|ramalan|forecast|jangkaan|unjuran)\b",
    ),
    (
        Intent::Complex,
        r"\b(trend|trends|tren|trending|corak|pattern|patterns|perkembangan)\b",
    ),
    (
        Intent::Complex,
        r"\b(explain in detail|terangkan secara terperinci|huraikan|elaborate|mengapa|why)\b",
    ),
    // tool-requiring
    (
        Intent::ToolRequired,
        r"\b(cari|carikan|search|find|lookup|look up|senarai|senaraikan|list|show|tunjuk|tunjukkan|papar|paparkan)\b",
    ),
    (
        Intent::ToolRequired,
        r"\b(berapa|how many|jumlah|count|total|statistik|statistics|stats|purata|average)\b",
    ),
    (
        Intent::ToolRequired,
        r"\b(cgpa|gpa|gred|grade|grades|markah|marks|keputusan|result|results|transkrip|transcript)\b",
    ),
    // knowledge-base
    (
        Intent::Knowledge,
        r"\b(siapa|who|ketua|dekan|dean|timbalan|pensyarah|lecturer|profesor|professor|staf|staff|penyelia|supervisor)\b",
    ),
    (
        Intent::Knowledge,
        r"\b(fakulti|faculty|fsktm|jabatan|department|program|programme|kursus|course|courses|subjek|subject)\b",
    ),
    (
        Intent::Knowledge,
        r"\b(penyelidikan|research|makmal|lab|laboratory|lokasi|location|alamat|address|bangunan|building|di mana|where)\b",
    ),
];

/// Conjunctions that add to the complexity score.
const CONJUNCTION_PATTERN: &str = r"\b(dan|and|atau|or|serta|kemudian|then|tetapi|but|juga|also|selepas|after)\b";

// == Pattern Table ==
#[derive(Debug, Clone)]
pub struct PatternTable {
    patterns: Vec<(Intent, Regex)>,
    conjunctions: Regex,
}

impl PatternTable {
    /// Compiles a table from `(family, pattern)` pairs, case-insensitively.
    pub fn new(specs: &[(Intent, &str)], conjunctions: &str) -> Result<Self, regex::Error> {
        let patterns = specs
            .iter()
            .map(|(intent, pattern)| compile(pattern).map(|re| (*intent, re)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            patterns,
            conjunctions: compile(conjunctions)?,
        })
    }

    /// Process-wide table built from the built-in patterns.
    pub fn builtin() -> &'static PatternTable {
        static TABLE: OnceLock<PatternTable> = OnceLock::new();
        TABLE.get_or_init(|| {
            PatternTable::new(BUILTIN_PATTERNS, CONJUNCTION_PATTERN)
                .expect("built-in intent patterns must compile")
        })
    }

    /// True when any pattern of `family` matches.
    pub fn matches(&self, family: Intent, text: &str) -> bool {
        self.family(family).any(|re| re.is_match(text))
    }

    /// Total number of matches across all patterns of `family`.
    pub fn count(&self, family: Intent, text: &str) -> usize {
        self.family(family).map(|re| re.find_iter(text).count()).sum()
    }

    pub fn conjunction_count(&self, text: &str) -> usize {
        self.conjunctions.find_iter(text).count()
    }

    fn family(&self, family: Intent) -> impl Iterator<Item = &Regex> {
        self.patterns
            .iter()
            .filter(move |(intent, _)| *intent == family)
            .map(|(_, re)| re)
    }
}

fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> &'static PatternTable {
        PatternTable::builtin()
    }

    #[test]
    fn test_simple_family_is_anchored() {
        assert!(table().matches(Intent::Simple, "hai"));
        assert!(table().matches(Intent::Simple, "terima kasih banyak"));
        assert!(table().matches(Intent::Simple, "ok"));
        assert!(!table().matches(Intent::Simple, "hai siapa ketua fsktm"));
        assert!(!table().matches(Intent::Simple, "okay so what is my cgpa"));
    }

    #[test]
    fn test_faq_family() {
        assert!(table().matches(Intent::Faq, "Apa itu FSKTM?"));
        assert!(table().matches(Intent::Faq, "How to apply for a transcript"));
        assert!(!table().matches(Intent::Faq, "Siapa ketua FSKTM?"));
    }

    #[test]
    fn test_complex_family() {
        let text = "Analyze prestasi pelajar dan bandingkan dengan jabatan lain";
        assert!(table().matches(Intent::Complex, text));
        assert_eq!(table().count(Intent::Complex, text), 2);
        assert!(!table().matches(Intent::Complex, "Cari pelajar dengan CGPA 3.5 ke atas"));
    }

    #[test]
    fn test_tool_family() {
        assert!(table().matches(Intent::ToolRequired, "Cari pelajar dengan CGPA 3.5 ke atas"));
        assert!(table().matches(Intent::ToolRequired, "How many students failed?"));
        assert!(!table().matches(Intent::ToolRequired, "Siapa ketua FSKTM?"));
    }

    #[test]
    fn test_knowledge_family() {
        assert!(table().matches(Intent::Knowledge, "Siapa ketua FSKTM?"));
        assert!(table().matches(Intent::Knowledge, "Where is the AI research lab"));
        assert!(!table().matches(Intent::Knowledge, "Cari pelajar dengan CGPA 3.5 ke atas"));
    }

    #[test]
    fn test_conjunction_count() {
        assert_eq!(table().conjunction_count("a dan b atau c and d"), 3);
        assert_eq!(table().conjunction_count("Andaman"), 0);
    }

    #[test]
    fn test_custom_table() {
        let table = PatternTable::new(&[(Intent::ToolRequired, r"\bquery\b")], r"\bplus\b").unwrap();
        assert!(table.matches(Intent::ToolRequired, "QUERY this"));
        assert!(!table.matches(Intent::Knowledge, "query"));
        assert!(PatternTable::new(&[(Intent::Faq, "(")], "x").is_err());
    }
}
