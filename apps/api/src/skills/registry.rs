//! Skill registry and matcher: the canonical skill vocabulary.
//!
//! Each entry carries a canonical name, one or more case-insensitive
//! word-boundary patterns for scanning free text, and a list of synonyms for
//! folding already-tokenized skill strings. The builtin table is compiled once
//! at first use and never mutated.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Duplicate canonical skill name: {0}")]
    DuplicateName(String),

    #[error("Synonym '{synonym}' maps to both '{first}' and '{second}'")]
    SynonymCollision {
        synonym: String,
        first: String,
        second: String,
    },

    #[error("Invalid pattern for skill '{skill}': {source}")]
    InvalidPattern {
        skill: String,
        #[source]
        source: regex::Error,
    },
}

/// Static definition of one registry row: (canonical name, patterns, synonyms).
pub type SkillDefinition = (&'static str, &'static [&'static str], &'static [&'static str]);

/// A compiled registry entry.
#[derive(Debug, Clone)]
pub struct SkillEntry {
    pub canonical_name: String,
    pub patterns: Vec<Regex>,
    pub synonyms: Vec<String>,
}

impl SkillEntry {
    /// Byte offset of the earliest match of any pattern in `text`.
    fn first_match(&self, text: &str) -> Option<usize> {
        self.patterns
            .iter()
            .filter_map(|re| re.find(text).map(|m| m.start()))
            .min()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Builtin vocabulary
// ────────────────────────────────────────────────────────────────────────────

// Patterns are compiled with `(?i)`. Short aliases that commonly appear as a
// suffix ("Node.js", "Vue.js") must not be preceded by a dot.
const BUILTIN_SKILLS: &[SkillDefinition] = &[
    ("python", &[r"\bpython\b"], &[]),
    ("java", &[r"\bjava\b"], &[]),
    ("javascript", &[r"\bjavascript\b", r"(?:^|[^\w.])js\b"], &["js"]),
    ("typescript", &[r"\btypescript\b", r"(?:^|[^\w.])ts\b"], &["ts"]),
    ("react", &[r"\breact(?:\.?js)?\b"], &["reactjs", "react.js"]),
    ("react native", &[r"\breact[\s-]*native\b"], &["react-native", "reactnative"]),
    ("angular", &[r"\bangular(?:\.?js)?\b"], &["angularjs", "angular.js"]),
    ("vue", &[r"\bvue(?:\.?js)?\b"], &["vuejs", "vue.js"]),
    ("svelte", &[r"\bsvelte\b"], &[]),
    ("node", &[r"\bnode(?:\.?js)?\b"], &["nodejs", "node.js"]),
    ("express", &[r"\bexpress(?:\.js)?\b"], &["expressjs", "express.js"]),
    ("django", &[r"\bdjango\b"], &[]),
    ("flask", &[r"\bflask\b"], &[]),
    ("spring", &[r"\bspring\b", r"\bspring\s*boot\b"], &["spring boot"]),
    ("rails", &[r"\bruby\s*on\s*rails\b", r"\brails\b"], &["ror", "ruby on rails"]),
    ("laravel", &[r"\blaravel\b"], &[]),
    ("html", &[r"\bhtml5?\b"], &["html5"]),
    ("css", &[r"\bcss3?\b"], &["css3"]),
    ("sql", &[r"\bsql\b"], &[]),
    ("mysql", &[r"\bmysql\b"], &[]),
    ("postgres", &[r"\bpostgres(?:ql)?\b"], &["postgresql"]),
    ("mongodb", &[r"\bmongo(?:db)?\b"], &["mongo"]),
    ("sqlite", &[r"\bsqlite\b"], &[]),
    ("redis", &[r"\bredis\b"], &[]),
    ("aws", &[r"\baws\b", r"\bamazon\s*web\s*services\b"], &["amazon web services"]),
    ("azure", &[r"\bazure\b"], &[]),
    ("gcp", &[r"\bgcp\b", r"\bgoogle\s*cloud\b"], &["google cloud"]),
    ("docker", &[r"\bdocker\b"], &[]),
    ("kubernetes", &[r"\bkubernetes\b", r"\bk8s\b"], &["k8s"]),
    ("git", &[r"\bgit\b"], &[]),
    ("linux", &[r"\blinux\b"], &[]),
    ("graphql", &[r"\bgraphql\b"], &[]),
    ("rest", &[r"\brestful\b", r"\brest\s*apis?\b"], &["restful", "rest api"]),
    ("terraform", &[r"\bterraform\b"], &[]),
    ("ci", &[r"\bci\b", r"\bcontinuous\s*integration\b"], &["continuous integration"]),
    (
        "cd",
        &[r"\bcd\b", r"\bcontinuous\s*delivery\b", r"\bcontinuous\s*deployment\b"],
        &["continuous delivery", "continuous deployment"],
    ),
    ("tensorflow", &[r"\btensorflow\b"], &[]),
    ("pytorch", &[r"\bpytorch\b"], &[]),
    ("sklearn", &[r"\bscikit\s*-?learn\b", r"\bsklearn\b"], &["scikit-learn"]),
    ("numpy", &[r"\bnumpy\b"], &[]),
    ("pandas", &[r"\bpandas\b"], &[]),
    ("nlp", &[r"\bnlp\b", r"\bnatural\s*language\s*processing\b"], &["natural language processing"]),
    ("cv", &[r"\bcomputer\s*vision\b"], &["computer vision"]),
    ("swift", &[r"\bswift\b"], &[]),
    ("kotlin", &[r"\bkotlin\b"], &[]),
    ("android", &[r"\bandroid\b"], &[]),
    ("ios", &[r"\bios\b"], &[]),
    ("flutter", &[r"\bflutter\b"], &[]),
    ("figma", &[r"\bfigma\b"], &[]),
    ("photoshop", &[r"\bphotoshop\b"], &[]),
    ("c#", &[r"\bc#", r"\bc\s*sharp\b"], &["c sharp", "csharp"]),
    ("c++", &[r"\bc\+\+"], &["cpp"]),
    ("next.js", &[r"\bnext\.?js\b"], &["nextjs", "next js"]),
    ("nestjs", &[r"\bnest\.?js\b"], &["nest.js"]),
    ("redux", &[r"\bredux\b"], &[]),
    ("webpack", &[r"\bwebpack\b"], &[]),
    ("babel", &[r"\bbabel\b"], &[]),
    ("jest", &[r"\bjest\b"], &[]),
    ("mocha", &[r"\bmocha\b"], &[]),
    ("chai", &[r"\bchai\b"], &[]),
    ("storybook", &[r"\bstorybook\b"], &[]),
    ("tailwind", &[r"\btailwind(?:\s*css)?\b"], &["tailwind css", "tailwindcss"]),
    ("sass", &[r"\bsass\b", r"\bscss\b"], &["scss"]),
    ("less", &[r"\bless\s*css\b", r"\bless\.js\b"], &["less css"]),
    ("apollo", &[r"\bapollo\b"], &[]),
    ("prisma", &[r"\bprisma\b"], &[]),
    ("sequelize", &[r"\bsequelize\b"], &[]),
    ("typeorm", &[r"\btype\s*orm\b"], &["type orm"]),
    ("grpc", &[r"\bgrpc\b"], &[]),
    ("microservices", &[r"\bmicroservices?\b"], &["microservice"]),
    ("elasticsearch", &[r"\belastic\s*search\b"], &["elastic search"]),
    ("kafka", &[r"\bkafka\b"], &[]),
    ("rabbitmq", &[r"\brabbit\s*mq\b"], &["rabbit mq"]),
    ("ansible", &[r"\bansible\b"], &[]),
    ("puppet", &[r"\bpuppet\b"], &[]),
    ("chef", &[r"\bchef\b"], &[]),
    ("bash", &[r"\bbash\b"], &["shell"]),
    ("shell scripting", &[r"\bshell\s*scripting\b"], &["bash scripting"]),
    ("postman", &[r"\bpostman\b"], &[]),
    ("swagger", &[r"\bswagger\b"], &[]),
    ("openapi", &[r"\bopenapi\b"], &[]),
    ("snowflake", &[r"\bsnowflake\b"], &[]),
    ("hadoop", &[r"\bhadoop\b"], &[]),
    ("spark", &[r"\bspark\b"], &["apache spark"]),
    ("airflow", &[r"\bairflow\b"], &[]),
    ("tableau", &[r"\btableau\b"], &[]),
    ("power bi", &[r"\bpower\s*bi\b"], &["powerbi"]),
    ("gitlab", &[r"\bgitlab\b"], &[]),
    ("github actions", &[r"\bgithub\s*actions\b"], &[]),
    ("bitbucket", &[r"\bbitbucket\b"], &[]),
    ("vite", &[r"\bvite\b"], &[]),
];

static BUILTIN: Lazy<SkillRegistry> =
    Lazy::new(|| SkillRegistry::new(BUILTIN_SKILLS).expect("builtin skill registry is valid"));

// ────────────────────────────────────────────────────────────────────────────
// Registry
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SkillRegistry {
    entries: Vec<SkillEntry>,
    by_name: HashMap<String, usize>,
    by_synonym: HashMap<String, usize>,
}

impl SkillRegistry {
    /// Compiles a registry, rejecting duplicate names and ambiguous synonyms.
    pub fn new(definitions: &[SkillDefinition]) -> Result<Self, RegistryError> {
        let mut entries = Vec::with_capacity(definitions.len());
        let mut by_name = HashMap::new();
        let mut by_synonym: HashMap<String, usize> = HashMap::new();

        for (index, (name, patterns, synonyms)) in definitions.iter().enumerate() {
            let canonical_name = name.to_lowercase();
            if by_name.insert(canonical_name.clone(), index).is_some() {
                return Err(RegistryError::DuplicateName(canonical_name));
            }

            let compiled = patterns
                .iter()
                .map(|p| Regex::new(&format!("(?i){p}")))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| RegistryError::InvalidPattern {
                    skill: canonical_name.clone(),
                    source,
                })?;

            let synonyms: Vec<String> = synonyms.iter().map(|s| s.to_lowercase()).collect();
            for synonym in &synonyms {
                if let Some(&other) = by_synonym.get(synonym) {
                    if other != index {
                        let first: &SkillEntry = &entries[other];
                        return Err(RegistryError::SynonymCollision {
                            synonym: synonym.clone(),
                            first: first.canonical_name.clone(),
                            second: canonical_name,
                        });
                    }
                }
                by_synonym.insert(synonym.clone(), index);
            }

            entries.push(SkillEntry {
                canonical_name,
                patterns: compiled,
                synonyms,
            });
        }

        Ok(Self {
            entries,
            by_name,
            by_synonym,
        })
    }

    /// The process-wide builtin vocabulary.
    pub fn builtin() -> &'static SkillRegistry {
        &BUILTIN
    }

    pub fn entries(&self) -> &[SkillEntry] {
        &self.entries
    }

    /// Resolves one raw skill string to its canonical name. Exact canonical
    /// names win over synonyms.
    pub fn lookup(&self, raw: &str) -> Option<&str> {
        let key = raw.trim().to_lowercase();
        self.by_name
            .get(&key)
            .or_else(|| self.by_synonym.get(&key))
            .map(|&i| self.entries[i].canonical_name.as_str())
    }

    /// Canonical names of every entry with a pattern hit in `text`, ordered by
    /// first occurrence in the text (registry order breaks ties).
    pub fn match_in_text(&self, text: &str) -> Vec<String> {
        let mut hits: Vec<(usize, usize)> = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| entry.first_match(text).map(|pos| (pos, index)))
            .collect();
        hits.sort();
        hits.into_iter()
            .map(|(_, index)| self.entries[index].canonical_name.clone())
            .collect()
    }

    /// Maps raw strings to canonical names, passing unknown skills through
    /// lowercased. Blank strings are dropped; first occurrence wins.
    pub fn canonicalize<S: AsRef<str>>(&self, list: &[S]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for raw in list {
            let value = raw.as_ref().trim().to_lowercase();
            if value.is_empty() {
                continue;
            }
            let canonical = self
                .lookup(&value)
                .map(str::to_string)
                .unwrap_or(value);
            if seen.insert(canonical.clone()) {
                out.push(canonical);
            }
        }
        out
    }
}

/// Scans free text against the builtin registry.
pub fn match_skills_in_text(text: &str) -> Vec<String> {
    SkillRegistry::builtin().match_in_text(text)
}

/// Canonicalizes a raw skill list against the builtin registry.
pub fn canonicalize_skills<S: AsRef<str>>(list: &[S]) -> Vec<String> {
    SkillRegistry::builtin().canonicalize(list)
}
