use serde::{Deserialize, Serialize};

/// Product catalog: the channel-specific extraction rules as loaded from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    /// Ordered concrete products an "assorted" quantity is spread across.
    pub assorted: Vec<String>,
    pub generic: PatternSetDef,
    pub iwon: PatternSetDef,
    pub naver: PatternSetDef,
    pub paldogam: PatternSetDef,
    /// Type keyword -> product, tried in order (kakao option cells).
    pub kakao_types: Vec<TypeAliasDef>,
    /// Type keyword -> product, tried in order (naver option cells).
    pub naver_types: Vec<TypeAliasDef>,
}

/// Ordered product patterns for one channel, plus how to read pack counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternSetDef {
    /// Regex whose first capture group is the pack count.
    pub pack_regex: String,
    /// Pack count used when the pack regex does not match.
    #[serde(default = "default_pack")]
    pub default_pack: u32,
    #[serde(default)]
    pub case_insensitive: bool,
    pub rules: Vec<PatternRuleDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternRuleDef {
    pub pattern: String,
    pub product: String,
    /// Overrides the set's pack regex.
    #[serde(default)]
    pub pack_regex: Option<String>,
    /// Overrides the set's default pack count.
    #[serde(default)]
    pub default_pack: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeAliasDef {
    pub keyword: String,
    pub product: String,
}

/// Product-name rewrite used when consolidating shipping rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameMapping {
    /// Substring to look for in the original product text.
    pub pattern: String,
    #[serde(rename = "shortName", alias = "short_name")]
    pub short_name: String,
    #[serde(default)]
    pub priority: i64,
}

fn default_pack() -> u32 {
    1
}
