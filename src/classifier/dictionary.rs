//! Technology keyword dictionary
//!
//! Each entry maps a set of spelling variants to one canonical token, so
//! "NodeJS", "node.js" and "Node JS" all tag a posting with `node.js`.

use crate::config::KeywordEntry;
use regex::Regex;
use std::collections::BTreeSet;

/// Built-in technology terms: (canonical, variants)
const BUILTIN_KEYWORDS: &[(&str, &[&str])] = &[
    ("python", &["python", "python3"]),
    ("javascript", &["javascript", "java script", "ecmascript"]),
    ("typescript", &["typescript"]),
    ("java", &["java"]),
    ("go", &["golang", "go"]),
    ("rust", &["rust", "rustlang"]),
    ("c++", &["c++", "cpp"]),
    ("c#", &["c#", "csharp"]),
    ("ruby", &["ruby"]),
    ("php", &["php"]),
    ("kotlin", &["kotlin"]),
    ("swift", &["swift"]),
    ("scala", &["scala"]),
    ("node.js", &["node.js", "nodejs", "node js"]),
    ("react", &["react", "react.js", "reactjs", "react native"]),
    ("vue", &["vue", "vue.js", "vuejs"]),
    ("angular", &["angular", "angularjs", "angular.js"]),
    ("django", &["django"]),
    ("flask", &["flask"]),
    ("spring", &["spring", "spring boot"]),
    ("rails", &["rails", "ruby on rails", "ror"]),
    (".net", &[".net", "dotnet", "asp.net"]),
    ("aws", &["aws", "amazon web services"]),
    ("gcp", &["gcp", "google cloud"]),
    ("azure", &["azure"]),
    ("docker", &["docker"]),
    ("kubernetes", &["kubernetes", "k8s"]),
    ("terraform", &["terraform"]),
    ("sql", &["sql"]),
    ("postgresql", &["postgresql", "postgres"]),
    ("mysql", &["mysql"]),
    ("mongodb", &["mongodb", "mongo"]),
    ("redis", &["redis"]),
    ("kafka", &["kafka"]),
    ("spark", &["spark", "pyspark"]),
    ("graphql", &["graphql"]),
    ("machine learning", &["machine learning", "ml"]),
    ("ai", &["ai", "artificial intelligence"]),
    ("data science", &["data science"]),
    ("devops", &["devops", "dev ops"]),
    ("ios", &["ios"]),
    ("android", &["android"]),
    ("frontend", &["frontend", "front-end", "front end"]),
    ("backend", &["backend", "back-end", "back end"]),
    ("full stack", &["full stack", "full-stack", "fullstack"]),
];

/// One canonical keyword and the pattern matching any of its variants
#[derive(Debug, Clone)]
struct DictionaryEntry {
    canonical: String,
    pattern: Regex,
}

/// Immutable keyword dictionary, built once at startup
#[derive(Debug, Clone)]
pub struct KeywordDictionary {
    entries: Vec<DictionaryEntry>,
}

impl KeywordDictionary {
    /// Builds the dictionary of built-in technology terms
    pub fn builtin() -> Result<Self, regex::Error> {
        Self::from_pairs(
            BUILTIN_KEYWORDS
                .iter()
                .map(|(canonical, variants)| (*canonical, variants.iter().copied())),
        )
    }

    /// Builds the built-in dictionary extended with configured entries
    ///
    /// Configured entries are appended as separate entries. One whose
    /// canonical name matches a built-in entry leaves the built-in untouched
    /// and tags its own variants with the same canonical keyword.
    pub fn with_entries(extra: &[KeywordEntry]) -> Result<Self, regex::Error> {
        let mut dictionary = Self::builtin()?;
        let additional = Self::from_pairs(extra.iter().map(|entry| {
            (
                entry.canonical.as_str(),
                entry.variants.iter().map(String::as_str),
            )
        }))?;
        dictionary.entries.extend(additional.entries);
        Ok(dictionary)
    }

    /// Builds a dictionary from (canonical, variants) pairs
    pub fn from_pairs<'a, I, V>(pairs: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = (&'a str, V)>,
        V: IntoIterator<Item = &'a str>,
    {
        let mut entries = Vec::new();

        for (canonical, variants) in pairs {
            let canonical = canonical.trim().to_lowercase();
            let variants: Vec<String> = variants
                .into_iter()
                .map(|v| v.trim().to_lowercase())
                .filter(|v| !v.is_empty())
                .collect();

            if canonical.is_empty() || variants.is_empty() {
                continue;
            }

            entries.push(DictionaryEntry {
                canonical,
                pattern: variant_pattern(&variants)?,
            });
        }

        Ok(Self { entries })
    }

    /// Returns the canonical tokens of every entry found in `text`
    pub fn matches(&self, text: &str) -> BTreeSet<String> {
        self.entries
            .iter()
            .filter(|entry| entry.pattern.is_match(text))
            .map(|entry| entry.canonical.clone())
            .collect()
    }

    /// Number of entries in the dictionary
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compiles a case-insensitive whole-word pattern for a set of variants
///
/// `\b` can't anchor terms that start or end in punctuation (`c++`, `.net`),
/// so the variants are bounded by "not a word character" instead.
fn variant_pattern(variants: &[String]) -> Result<Regex, regex::Error> {
    let alternation = variants
        .iter()
        .map(|v| regex::escape(v))
        .collect::<Vec<_>>()
        .join("|");

    Regex::new(&format!(r"(?i)(?:^|[^\w])(?:{})(?:[^\w]|$)", alternation))
}
