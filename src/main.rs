use anyhow::Result;
use clap::{CommandFactory, Parser, error::ErrorKind};
use h5p_stage::commands::{self, ReplaceSource};
use h5p_stage::error::PackageError;
use h5p_stage::stage::{DEFAULT_IFRAME_HEIGHT, DEFAULT_IFRAME_WIDTH, IframeEmbed};
use std::path::PathBuf;

/// h5p-stage - edit the stages of an unpacked H5P GameMap package
///
/// Operates on `h5p-folder/` in the working directory unless --package
/// (or H5P_PACKAGE) points elsewhere.
///
/// Examples:
///   h5p-stage list
///   h5p-stage replace --index 3 --wordwall "https://wordwall.net/embed/..."
///   h5p-stage replace --stage "Animals quiz" --h5p _tmp_speak
///   h5p-stage rename  --stage "Old" --to "New"
///   h5p-stage move    --stage "New" --x 36.2 --y 34.1
#[derive(Parser, Debug)]
#[command(author, version = env!("H5P_STAGE_VERSION"), about, verbatim_doc_comment)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Package directory (defaults to h5p-folder; also via H5P_PACKAGE)
    #[arg(
        long = "package",
        short = 'p',
        env = "H5P_PACKAGE",
        value_name = "DIR",
        global = true
    )]
    pub package_dir: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// List stages with their position and current library
    List,

    /// Replace a stage's content with an iframe embed or an exported H5P package
    Replace(ReplaceArgs),

    /// Rename a stage
    Rename(RenameArgs),

    /// Move a stage on the map
    Move(MoveArgs),

    /// Show what a stage currently embeds
    Check(StageArgs),

    /// Report malformed library fields in content.json
    Audit,

    /// Declare missing libraries in h5p.json and drop incomplete entries
    Repair,
}

#[derive(clap::Args, Debug)]
pub struct StageArgs {
    /// Stage label (exact match, surrounding whitespace ignored)
    #[arg(long, value_name = "LABEL", conflicts_with = "index")]
    pub stage: Option<String>,

    /// Stage position, starting at 1
    #[arg(long, value_name = "N")]
    pub index: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct ReplaceArgs {
    #[command(flatten)]
    pub target: StageArgs,

    /// Embed URL to show through an iframe
    #[arg(long, value_name = "URL", conflicts_with = "h5p")]
    pub wordwall: Option<String>,

    /// Iframe width
    #[arg(long, default_value_t = DEFAULT_IFRAME_WIDTH)]
    pub width: u32,

    /// Iframe height
    #[arg(long, default_value_t = DEFAULT_IFRAME_HEIGHT)]
    pub height: u32,

    /// Unpacked .h5p export to import
    #[arg(long, value_name = "FOLDER")]
    pub h5p: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct RenameArgs {
    #[command(flatten)]
    pub target: StageArgs,

    /// New label
    #[arg(long, value_name = "LABEL")]
    pub to: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct MoveArgs {
    #[command(flatten)]
    pub target: StageArgs,

    #[arg(long, value_name = "NUM", allow_hyphen_values = true)]
    pub x: Option<String>,

    #[arg(long, value_name = "NUM", allow_hyphen_values = true)]
    pub y: Option<String>,
}

impl ReplaceArgs {
    fn source(&self) -> Result<ReplaceSource, PackageError> {
        if let Some(url) = self.wordwall.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            return Ok(ReplaceSource::Iframe(IframeEmbed {
                url: url.to_string(),
                width: self.width,
                height: self.height,
            }));
        }
        match &self.h5p {
            Some(folder) => Ok(ReplaceSource::Import(folder.clone())),
            None => Err(PackageError::MissingArgument(
                "replace requires --wordwall <url> or --h5p <folder>".into(),
            )),
        }
    }
}

/// Exit code for a failed parse. Help and version requests succeed; any
/// other usage error is reported like a runtime error.
fn parse_error_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 0,
        _ => 1,
    }
}

fn print_usage() -> Result<()> {
    Cli::command().print_help()?;
    println!();
    Ok(())
}

fn run(command: Commands, package_dir: Option<PathBuf>) -> Result<()> {
    let runtime = h5p_stage::runtime::RealRuntime;

    match command {
        Commands::List => commands::list(runtime, package_dir)?,
        Commands::Replace(args) => {
            let selector = commands::stage_selector(args.target.stage.clone(), args.target.index)?;
            let source = args.source()?;
            commands::replace(runtime, package_dir, selector, source)?
        }
        Commands::Rename(args) => {
            let selector = commands::stage_selector(args.target.stage, args.target.index)?;
            let to = args
                .to
                .ok_or_else(|| PackageError::MissingArgument("--to <new label> is required".into()))?;
            commands::rename(runtime, package_dir, selector, &to)?
        }
        Commands::Move(args) => {
            let selector = commands::stage_selector(args.target.stage, args.target.index)?;
            let (Some(x), Some(y)) = (args.x, args.y) else {
                return Err(PackageError::MissingArgument(
                    "--x and --y are required (numbers)".into(),
                )
                .into());
            };
            commands::move_to(runtime, package_dir, selector, &x, &y)?
        }
        Commands::Check(args) => {
            let selector = commands::stage_selector(args.stage, args.index)?;
            commands::check(runtime, package_dir, selector)?
        }
        Commands::Audit => commands::audit(runtime, package_dir)?,
        Commands::Repair => commands::repair(runtime, package_dir)?,
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::InvalidSubcommand => return print_usage(),
        Err(e) => {
            e.print()?;
            std::process::exit(parse_error_exit_code(e.kind()));
        }
    };

    match cli.command {
        Some(command) => run(command, cli.package_dir),
        None => print_usage(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_list_parsing() {
        let cli = Cli::try_parse_from(["h5p-stage", "list"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::List)));
        assert_eq!(cli.package_dir, None);
    }

    #[test]
    fn test_cli_no_subcommand_is_ok() {
        let cli = Cli::try_parse_from(["h5p-stage"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_unknown_subcommand_kind() {
        let err = Cli::try_parse_from(["h5p-stage", "explode"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
    }

    #[test]
    fn test_parse_error_exit_codes() {
        let err = Cli::try_parse_from(["h5p-stage", "check", "--index", "abc"]).unwrap_err();
        assert_eq!(parse_error_exit_code(err.kind()), 1);

        let err = Cli::try_parse_from(["h5p-stage", "rename", "--stage"]).unwrap_err();
        assert_eq!(parse_error_exit_code(err.kind()), 1);

        let err = Cli::try_parse_from(["h5p-stage", "--help"]).unwrap_err();
        assert_eq!(parse_error_exit_code(err.kind()), 0);

        let err = Cli::try_parse_from(["h5p-stage", "--version"]).unwrap_err();
        assert_eq!(parse_error_exit_code(err.kind()), 0);
    }

    #[test]
    fn test_cli_global_package_parsing() {
        let cli = Cli::try_parse_from(["h5p-stage", "list", "--package", "/tmp/map"]).unwrap();
        assert_eq!(cli.package_dir, Some(PathBuf::from("/tmp/map")));

        let cli = Cli::try_parse_from(["h5p-stage", "-p", "/tmp/map", "audit"]).unwrap();
        assert_eq!(cli.package_dir, Some(PathBuf::from("/tmp/map")));
    }

    #[test]
    fn test_cli_replace_wordwall_defaults() {
        let cli = Cli::try_parse_from([
            "h5p-stage",
            "replace",
            "--index",
            "3",
            "--wordwall",
            "https://example.test",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Replace(args)) => {
                assert_eq!(args.target.index, Some(3));
                assert_eq!(
                    args.source().unwrap(),
                    ReplaceSource::Iframe(IframeEmbed::new("https://example.test"))
                );
            }
            _ => panic!("Expected Replace command"),
        }
    }

    #[test]
    fn test_cli_replace_h5p() {
        let cli =
            Cli::try_parse_from(["h5p-stage", "replace", "--stage", "Quiz A", "--h5p", "_tmp_speak"])
                .unwrap();
        match cli.command {
            Some(Commands::Replace(args)) => {
                assert_eq!(args.target.stage.as_deref(), Some("Quiz A"));
                assert_eq!(
                    args.source().unwrap(),
                    ReplaceSource::Import(PathBuf::from("_tmp_speak"))
                );
            }
            _ => panic!("Expected Replace command"),
        }
    }

    #[test]
    fn test_cli_replace_without_source() {
        let cli = Cli::try_parse_from(["h5p-stage", "replace", "--index", "1"]).unwrap();
        match cli.command {
            Some(Commands::Replace(args)) => assert!(args.source().is_err()),
            _ => panic!("Expected Replace command"),
        }
    }

    #[test]
    fn test_cli_stage_and_index_conflict() {
        let result =
            Cli::try_parse_from(["h5p-stage", "check", "--stage", "A", "--index", "1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_move_negative_coordinates() {
        let cli =
            Cli::try_parse_from(["h5p-stage", "move", "--index", "2", "--x", "-3.5", "--y", "10"])
                .unwrap();
        match cli.command {
            Some(Commands::Move(args)) => {
                assert_eq!(args.x.as_deref(), Some("-3.5"));
                assert_eq!(args.y.as_deref(), Some("10"));
            }
            _ => panic!("Expected Move command"),
        }
    }
}
