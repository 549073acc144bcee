//! Golden fixture files: TOML documents holding named cases with an input and
//! the expected token and tree snapshot lines.
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum FixtureStatus {
    #[default]
    Active,
    Xfail,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GoldenCase {
    pub name: String,
    pub input: String,
    #[serde(default)]
    pub status: FixtureStatus,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub tokens: Option<Vec<String>>,
    #[serde(default)]
    pub tree: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct GoldenFile {
    #[serde(default, rename = "case")]
    cases: Vec<GoldenCase>,
}

pub fn parse_golden_cases(content: &str, origin: &str) -> Vec<GoldenCase> {
    let file: GoldenFile = toml::from_str(content)
        .unwrap_or_else(|err| panic!("failed to parse golden fixtures {origin}: {err}"));
    for case in &file.cases {
        assert!(
            case.tokens.is_some() || case.tree.is_some(),
            "golden case '{}' in {origin} has neither tokens nor tree",
            case.name
        );
        if case.status == FixtureStatus::Xfail {
            assert!(
                case.reason.is_some(),
                "xfail golden case '{}' in {origin} needs a reason",
                case.name
            );
        }
    }
    file.cases
}

pub fn load_golden_cases(path: &Path) -> Vec<GoldenCase> {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read golden fixtures {path:?}: {err}"));
    parse_golden_cases(&content, &path.display().to_string())
}
