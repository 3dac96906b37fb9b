use clap::Parser;

/// This is a board game ranking program.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file containing the description of the ranking (JSON).
    /// For more information about the file format, read the documentation of the `manual` module.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the outcome of a ranking in JSON format. If provided, bgrank will
    /// check that the computed output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the ranking will be written to the given
    /// location: as a CSV table if the path ends with .csv, in JSON format otherwise. Setting this option
    /// overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (directory path or empty) The directory containing one ratings file per game. Setting this option
    /// overrides the directory that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The format of the ratings files: csv or json.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default condorcetIrv) The ranking method: condorcetIrv or commonRaterAverage.
    #[clap(long, value_parser)]
    pub method: Option<String>,

    /// (number or not specified) If specified, only the first games of the list are ranked.
    #[clap(long, value_parser)]
    pub limit: Option<u32>,

    /// (directory path or empty) If specified, the ratings that were read are also saved in this directory
    /// in JSON format.
    #[clap(long, value_parser)]
    pub save_ratings: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
