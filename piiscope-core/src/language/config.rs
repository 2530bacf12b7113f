use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconConfig {
    pub metadata: MetadataConfig,
    pub honorifics: WordListConfig,
    pub job_titles: JobTitleConfig,
    pub company_suffixes: WordListConfig,
    pub filler_words: WordListConfig,
    pub departments: DepartmentConfig,
    pub locations: LocationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WordListConfig {
    #[serde(default)]
    pub words: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobTitleConfig {
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub modifiers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepartmentConfig {
    #[serde(default)]
    pub prefixes: Vec<String>,
    #[serde(default)]
    pub suffixes: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(flatten)]
    pub categories: BTreeMap<String, Vec<String>>,
}
