use regex::{Regex, RegexBuilder};

use crate::error::ChoolgoError;
use crate::rules::schema::{CatalogDef, PatternSetDef, TypeAliasDef};

/// Compiled, immutable product catalog shared by all parsers.
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    pub name: String,
    pub version: String,
    pub assorted: Vec<String>,
    pub generic: PatternSet,
    pub iwon: PatternSet,
    pub naver: PatternSet,
    pub paldogam: PatternSet,
    pub kakao_types: Vec<TypeAlias>,
    pub naver_types: Vec<TypeAlias>,
}

#[derive(Debug, Clone)]
pub struct PatternSet {
    pack_regex: Regex,
    default_pack: u32,
    rules: Vec<PatternRule>,
}

#[derive(Debug, Clone)]
pub struct PatternRule {
    pub regex: Regex,
    pub product: String,
    pack_regex: Option<Regex>,
    default_pack: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct TypeAlias {
    pub keyword: String,
    pub product: String,
}

impl ProductCatalog {
    pub fn compile(def: &CatalogDef) -> Result<Self, ChoolgoError> {
        Ok(ProductCatalog {
            name: def.name.clone(),
            version: def.version.clone(),
            assorted: def.assorted.clone(),
            generic: PatternSet::compile(&def.generic)?,
            iwon: PatternSet::compile(&def.iwon)?,
            naver: PatternSet::compile(&def.naver)?,
            paldogam: PatternSet::compile(&def.paldogam)?,
            kakao_types: compile_aliases(&def.kakao_types),
            naver_types: compile_aliases(&def.naver_types),
        })
    }
}

impl PatternSet {
    fn compile(def: &PatternSetDef) -> Result<Self, ChoolgoError> {
        let pack_regex = compile_pack_regex(&def.pack_regex)?;
        let rules = def
            .rules
            .iter()
            .map(|r| {
                Ok(PatternRule {
                    regex: compile_regex(&r.pattern, def.case_insensitive)?,
                    product: r.product.clone(),
                    pack_regex: r.pack_regex.as_deref().map(compile_pack_regex).transpose()?,
                    default_pack: r.default_pack,
                })
            })
            .collect::<Result<Vec<_>, ChoolgoError>>()?;

        Ok(PatternSet {
            pack_regex,
            default_pack: def.default_pack,
            rules,
        })
    }

    /// First rule whose pattern matches the text.
    pub fn find(&self, text: &str) -> Option<&PatternRule> {
        self.rules.iter().find(|r| r.regex.is_match(text))
    }

    /// Pack count for a matched rule, falling back to the configured default
    /// (never below 1).
    pub fn pack_count(&self, rule: &PatternRule, text: &str) -> u32 {
        let regex = rule.pack_regex.as_ref().unwrap_or(&self.pack_regex);
        let fallback = rule.default_pack.unwrap_or(self.default_pack).max(1);

        regex
            .captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(fallback)
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }
}

/// Resolve a free-text type keyword to a product via the first alias it contains.
pub fn resolve_type<'a>(aliases: &'a [TypeAlias], text: &str) -> Option<&'a str> {
    aliases
        .iter()
        .find(|a| text.contains(&a.keyword))
        .map(|a| a.product.as_str())
}

fn compile_aliases(defs: &[TypeAliasDef]) -> Vec<TypeAlias> {
    defs.iter()
        .map(|d| TypeAlias {
            keyword: d.keyword.clone(),
            product: d.product.clone(),
        })
        .collect()
}

fn compile_regex(pattern: &str, case_insensitive: bool) -> Result<Regex, ChoolgoError> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|source| ChoolgoError::Pattern {
            pattern: pattern.to_string(),
            source,
        })
}

fn compile_pack_regex(pattern: &str) -> Result<Regex, ChoolgoError> {
    let regex = compile_regex(pattern, false)?;
    // captures_len counts the implicit whole-match group
    if regex.captures_len() < 2 {
        return Err(ChoolgoError::CatalogInvalid(format!(
            "pack regex '{pattern}' has no capture group"
        )));
    }
    Ok(regex)
}
