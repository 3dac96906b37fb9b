use log::{debug, info, warn};

use condorcet_irv::builder::Builder;
use condorcet_irv::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::ranking::config_reader::*;
use crate::ranking::io_common::create_parent_dir;
use crate::ranking::io_csv::write_table_csv;
use crate::ranking::store::{FileRatingStore, RatingStore, StoreFormat};

mod config_reader;
mod io_common;
mod io_csv;
mod io_json;
mod store;

#[derive(Debug, Snafu)]
pub enum RankError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON: {source}"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error listing directory {path}"))]
    ListingDirectory {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing {path} at line {lineno}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Line {lineno} of {path} has no rating"))]
    CsvLineTooShort { path: String, lineno: usize },
    #[snafu(display("Error writing CSV record"))]
    CsvWrite { source: csv::Error },
    #[snafu(display("Invalid rating {content:?} from {voter} in {path}"))]
    InvalidRating {
        path: String,
        voter: String,
        content: String,
    },
    #[snafu(display("No ratings found for game {id} in {directory}"))]
    MissingRatings { id: String, directory: String },
    #[snafu(display("Ranking error: {source}"))]
    Ranking { source: RankingErrors },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type RankResult<T> = Result<T, RankError>;

fn ranking_stats_to_json(rr: &RankingResult) -> Vec<JSValue> {
    rr.rank_stats
        .iter()
        .map(|rs| {
            json!({
                "rank": rs.rank,
                "id": rs.id,
                "name": rs.name,
                "setAside": rs.set_aside,
                "topChoiceCount": rs.tiebreak.top_choice_count,
                "voteCount": rs.tiebreak.vote_count,
                "yearPublished": rs.tiebreak.publication_year,
            })
        })
        .collect()
}

fn build_summary_js(
    settings: &OutputSettings,
    rules: &RankingRules,
    games: &[GameEntry],
    outcome: &RankingOutcome,
) -> JSValue {
    let c = OutputConfig {
        ranking: settings.ranking_name.clone(),
        date: settings.ranking_date.clone(),
        method: method_name(rules.method).to_string(),
    };
    match outcome {
        RankingOutcome::Condorcet(rr) => json!({
            "config": c,
            "results": ranking_stats_to_json(rr) }),
        RankingOutcome::Average(ar) => {
            let results: Vec<JSValue> = ar
                .averages
                .iter()
                .map(|(id, avg)| {
                    json!({
                        "id": id,
                        "name": game_name(games, id),
                        "averageRating": avg,
                    })
                })
                .collect();
            json!({
                "config": c,
                "commonRaters": ar.common_raters,
                "results": results })
        }
    }
}

fn game_name<'a>(games: &'a [GameEntry], id: &'a str) -> &'a str {
    games
        .iter()
        .find(|g| g.id == id)
        .map(|g| g.name.as_str())
        .unwrap_or(id)
}

const TABLE_HEADER: [&str; 4] = ["Rank", "ID", "Game", "Tiebreak"];

fn ranking_table(rr: &RankingResult) -> Vec<Vec<String>> {
    rr.rank_stats
        .iter()
        .map(|rs| {
            vec![
                rs.rank.to_string(),
                rs.id.clone(),
                rs.name.clone(),
                rs.set_aside.len().to_string(),
            ]
        })
        .collect()
}

fn average_table(ar: &AverageResult, games: &[GameEntry]) -> Vec<Vec<String>> {
    ar.averages
        .iter()
        .map(|(id, avg)| {
            vec![
                id.clone(),
                game_name(games, id).to_string(),
                format!("{:.2}", avg),
            ]
        })
        .collect()
}

fn print_outcome(outcome: &RankingOutcome, games: &[GameEntry]) {
    match outcome {
        RankingOutcome::Condorcet(rr) => {
            println!("{}", TABLE_HEADER.join("\t"));
            for row in ranking_table(rr) {
                println!("{}", row.join("\t"));
            }
        }
        RankingOutcome::Average(ar) => {
            println!("Common raters: {}", ar.common_raters);
            for row in average_table(ar, games) {
                println!("Average rating for {}: {}", row[1], row[2]);
            }
        }
    }
}

fn write_outcome_csv(path: &Path, outcome: &RankingOutcome, games: &[GameEntry]) -> RankResult<()> {
    match outcome {
        RankingOutcome::Condorcet(rr) => write_table_csv(path, &TABLE_HEADER, &ranking_table(rr)),
        RankingOutcome::Average(ar) => write_table_csv(
            path,
            &["ID", "Game", "Average rating"],
            &average_table(ar, games),
        ),
    }
}

fn write_summary(path: &str, pretty_js: &str) -> RankResult<()> {
    let p = Path::new(path);
    create_parent_dir(p)?;
    fs::write(p, pretty_js).context(WritingFileSnafu { path })?;
    info!("Summary written to {}", path);
    Ok(())
}

/// Loads the games and their ratings, ranks them and reports the result.
pub fn run_ranking(args: &Args) -> RankResult<()> {
    let (config, root_p): (RankConfig, PathBuf) = match (&args.config, &args.input) {
        (Some(config_path), _) => {
            let config = read_config(config_path)?;
            let root_p = Path::new(config_path)
                .parent()
                .context(MissingParentDirSnafu {})?
                .to_path_buf();
            (config, root_p)
        }
        (None, Some(input)) => (RankConfig::for_directory(input), PathBuf::new()),
        (None, None) => {
            whatever!("Either a configuration file or an input directory is required")
        }
    };
    info!("config: {:?}", config);

    // Validate the rules, then apply the overrides from the command line.
    let mut rules = validate_rules(&config.rules)?;
    if let Some(m) = &args.method {
        rules.method = parse_method(m)?;
    }
    if let Some(limit) = args.limit {
        if limit == 0 {
            whatever!("The limit must be at least 1");
        }
        rules.max_candidates = Some(limit);
    }

    let ratings_dir: PathBuf = match &args.input {
        Some(input) => PathBuf::from(input),
        None => root_p.join(&config.rating_source.directory),
    };
    let provider = args
        .input_type
        .clone()
        .unwrap_or_else(|| config.rating_source.provider.clone());
    let store = FileRatingStore::new(ratings_dir, StoreFormat::from_provider(&provider)?);

    let mut games = resolve_games(&config.candidates, &store)?;
    if let Some(k) = rules.max_candidates {
        if (k as usize) < games.len() {
            info!("Keeping the first {} of {} games", k, games.len());
            games.truncate(k as usize);
        }
    }

    let mut save_store: Option<FileRatingStore> = args
        .save_ratings
        .as_ref()
        .map(|dir| FileRatingStore::new(PathBuf::from(dir), StoreFormat::Json));

    let mut builder = Builder::new(&rules).context(RankingSnafu {})?;
    for game in games.iter() {
        builder
            .candidate(&game.id, &game.name, game.year_published, game.catalog_id)
            .context(RankingSnafu {})?;
        let ratings = store.get(&game.id)?.context(MissingRatingsSnafu {
            id: game.id.clone(),
            directory: store.directory().display().to_string(),
        })?;
        debug!("Game {}: {} ratings", game.id, ratings.len());
        builder
            .add_ratings(&game.id, &ratings)
            .context(RankingSnafu {})?;
        if let Some(s) = save_store.as_mut() {
            s.put(&game.id, &ratings)?;
        }
    }

    let outcome = builder.run().context(RankingSnafu {})?;
    info!("outcome: {:?}", outcome);

    print_outcome(&outcome, &games);

    // Assemble the final json
    let result_js = build_summary_js(&config.output_settings, &rules, &games, &outcome);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    let out_path = match &args.out {
        Some(out) => Some(out.clone()),
        None => config.output_settings.summary_path(&root_p),
    };
    match out_path.as_deref() {
        Some("stdout") => {
            println!("{}", pretty_js_stats);
        }
        Some(p) if p.ends_with(".csv") => {
            write_outcome_csv(Path::new(p), &outcome, &games)?;
        }
        Some(p) => {
            write_summary(p, &pretty_js_stats)?;
        }
        None => {}
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &args.reference {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary")
        }
    }

    Ok(())
}
