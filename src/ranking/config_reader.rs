use crate::ranking::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "rankingName")]
    pub ranking_name: String,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "rankingDate")]
    pub ranking_date: Option<String>,
}

impl OutputSettings {
    /// The location of the JSON summary when an output directory is configured.
    pub fn summary_path(&self, root_dir: &Path) -> Option<String> {
        self.output_directory.as_ref().map(|dir| {
            let file_name: String = self
                .ranking_name
                .chars()
                .map(|c| if c.is_alphanumeric() { c } else { '_' })
                .collect();
            let p: PathBuf = root_dir
                .join(dir)
                .join(format!("{}_summary.json", file_name));
            p.display().to_string()
        })
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub ranking: String,
    pub date: Option<String>,
    pub method: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RatingSource {
    pub provider: String,
    pub directory: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RankCandidate {
    pub id: String,
    pub name: Option<String>,
    #[serde(rename = "yearPublished")]
    pub year_published: Option<i32>,
    #[serde(rename = "catalogId")]
    pub catalog_id: Option<u64>,
    pub excluded: Option<bool>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankRules {
    pub method: Option<String>,
    #[serde(rename = "maxCandidates")]
    pub max_candidates: Option<u32>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RankConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "ratingSource")]
    pub rating_source: RatingSource,
    #[serde(default)]
    pub candidates: Vec<RankCandidate>,
    #[serde(default)]
    pub rules: RankRules,
}

impl RankConfig {
    /// The configuration used without a configuration file: every game of the directory is
    /// ranked with the default rules.
    pub fn for_directory(directory: &str) -> RankConfig {
        RankConfig {
            output_settings: OutputSettings {
                ranking_name: "bgrank".to_string(),
                output_directory: None,
                ranking_date: None,
            },
            rating_source: RatingSource {
                provider: CSV_PROVIDER.to_string(),
                directory: directory.to_string(),
            },
            candidates: vec![],
            rules: RankRules::default(),
        }
    }
}

pub const CSV_PROVIDER: &str = "csv";
pub const JSON_PROVIDER: &str = "json";

pub const CONDORCET_IRV: &str = "condorcetIrv";
pub const COMMON_RATER_AVERAGE: &str = "commonRaterAverage";

pub fn read_config(path: &str) -> RankResult<RankConfig> {
    let config_str = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: RankConfig = serde_json::from_str(&config_str).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> RankResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

pub fn parse_method(method: &str) -> RankResult<RankingMethod> {
    match method {
        CONDORCET_IRV => Ok(RankingMethod::CondorcetIrv),
        COMMON_RATER_AVERAGE => Ok(RankingMethod::CommonRaterAverage),
        x => {
            whatever!("unknown ranking method: {}", x)
        }
    }
}

pub fn method_name(method: RankingMethod) -> &'static str {
    match method {
        RankingMethod::CondorcetIrv => CONDORCET_IRV,
        RankingMethod::CommonRaterAverage => COMMON_RATER_AVERAGE,
    }
}

pub fn validate_rules(rules: &RankRules) -> RankResult<RankingRules> {
    let res = RankingRules {
        method: match rules.method.as_deref() {
            Some(m) => parse_method(m)?,
            None => RankingRules::DEFAULT_RULES.method,
        },
        max_candidates: match rules.max_candidates {
            Some(0) => {
                whatever!("maxCandidates must be at least 1")
            }
            x => x,
        },
    };
    Ok(res)
}

/// A game to rank, as resolved from the configuration.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct GameEntry {
    pub id: String,
    pub name: String,
    pub year_published: i32,
    pub catalog_id: u64,
}

fn catalog_id_of(id: &str, catalog_id: Option<u64>) -> RankResult<u64> {
    match (catalog_id, id.parse::<u64>()) {
        (Some(x), _) => Ok(x),
        (None, Ok(x)) => Ok(x),
        (None, Err(_)) => {
            whatever!(
                "game {:?} needs a catalogId since its id is not a number",
                id
            )
        }
    }
}

/// The games to rank, in order. Without any game in the configuration, all the games
/// available in the store are ranked.
pub fn resolve_games(
    candidates: &[RankCandidate],
    store: &dyn RatingStore,
) -> RankResult<Vec<GameEntry>> {
    let mut res: Vec<GameEntry> = Vec::new();
    if candidates.is_empty() {
        let keys = store.keys()?;
        warn!(
            "No game listed, ranking all the {} games with ratings. Their publication year is unknown.",
            keys.len()
        );
        for key in keys {
            res.push(GameEntry {
                catalog_id: catalog_id_of(&key, None)?,
                name: key.clone(),
                id: key,
                year_published: 0,
            });
        }
        return Ok(res);
    }

    for c in candidates.iter() {
        if c.excluded.unwrap_or(false) {
            info!("resolve_games: excluding game {}", c.id);
            continue;
        }
        if c.year_published.is_none() {
            warn!("resolve_games: no publication year for game {}", c.id);
        }
        res.push(GameEntry {
            id: c.id.clone(),
            name: c.name.clone().unwrap_or_else(|| c.id.clone()),
            year_published: c.year_published.unwrap_or(0),
            catalog_id: catalog_id_of(&c.id, c.catalog_id)?,
        });
    }
    Ok(res)
}
