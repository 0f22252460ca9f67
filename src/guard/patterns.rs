//! Suspicious Pattern Module
//!
//! Case-insensitive patterns that reject a command outright.

use std::sync::OnceLock;

use regex::RegexSet;

/// Markup, script, SQL, traversal and shell shapes that never belong in a query.
const SUSPICIOUS_PATTERNS: &[&str] = &[
    // script tags and URIs
    r"<\s*/?\s*script\b",
    r"javascript\s*:",
    r"vbscript\s*:",
    r"data\s*:\s*text/html",
    // inline event handlers
    r"\bon(load|error|click|dblclick|mouse\w*|key\w*|focus|blur|submit|change|input|abort)\s*=",
    r"\beval\s*\(",
    // SQL keyword clusters
    r"\b(drop|truncate|alter)\s+(table|database|schema)\b",
    r"\bdelete\s+from\b",
    r"\binsert\s+into\b",
    r"\bupdate\s+\w+\s+set\b",
    r"\bunion\s+(all\s+)?select\b",
    r"\bselect\s+(\*|[\w.,\s]+?)\s+from\s+\w+\s*(\bwhere\b|;|$)",
    r";\s*(drop|delete|insert|update|select|exec)\b",
    r"'\s*or\s+'?\d+'?\s*=\s*'?\d+",
    r#"['";]\s*--"#,
    // path traversal
    r"\.\./",
    r"\.\.\\",
    r"%2e%2e(%2f|%5c|/|\\)",
    // shell invocation
    r"\$\([^)]*\)",
    r"`[^`]*`",
    r"[;&|]\s*(rm|curl|wget|bash|sh|nc|chmod|python|perl)\b",
    r"\brm\s+-[rf]+\b",
    r"/bin/(ba)?sh\b",
];

/// Compiled, process-wide suspicious pattern set.
pub fn suspicious_patterns() -> &'static RegexSet {
    static SET: OnceLock<RegexSet> = OnceLock::new();
    SET.get_or_init(|| {
        let patterns = SUSPICIOUS_PATTERNS.iter().map(|p| format!("(?i){p}"));
        RegexSet::new(patterns).expect("built-in suspicious patterns must compile")
    })
}

/// Returns true when `text` matches any suspicious pattern.
pub fn is_suspicious(text: &str) -> bool {
    suspicious_patterns().is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_and_script_detected() {
        assert!(is_suspicious("<script>alert(1)</script>"));
        assert!(is_suspicious("click <SCRIPT src=x>"));
        assert!(is_suspicious("JavaScript:alert(1)"));
        assert!(is_suspicious("<img src=x onerror=alert(1)>"));
        assert!(is_suspicious("eval (atob('x'))"));
    }

    #[test]
    fn test_sql_clusters_detected() {
        assert!(is_suspicious("DROP TABLE students"));
        assert!(is_suspicious("1; delete from users"));
        assert!(is_suspicious("x' OR '1'='1"));
        assert!(is_suspicious("name UNION ALL SELECT password"));
        assert!(is_suspicious("SELECT * FROM users"));
        assert!(is_suspicious("select name, cgpa from students where id = 1"));
        assert!(is_suspicious("admin' --"));
    }

    #[test]
    fn test_traversal_and_shell_detected() {
        assert!(is_suspicious("../../etc/passwd"));
        assert!(is_suspicious("..\\windows\\system32"));
        assert!(is_suspicious("%2E%2E%2Fetc"));
        assert!(is_suspicious("hello; rm -rf /"));
        assert!(is_suspicious("$(whoami)"));
        assert!(is_suspicious("run `id` now"));
        assert!(is_suspicious("| bash"));
    }

    #[test]
    fn test_ordinary_queries_pass() {
        for query in [
            "Hai",
            "Cari pelajar dengan CGPA 3.5 ke atas",
            "Siapa ketua FSKTM?",
            "Analyze prestasi pelajar dan bandingkan dengan jabatan lain",
            "Which courses should I select for next semester?",
            "Update me on my grades please",
            "What is the deadline for dropping a course?",
            "Can I select two courses from FSKTM next semester?",
            "Which subjects can I select from the elective list?",
            "Semester 1 -- is registration open?",
        ] {
            assert!(!is_suspicious(query), "false positive on {query:?}");
        }
    }
}
