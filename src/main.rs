//! Command-line interface for the ghcard binary.
//!
//! The CLI renders the profile card, or prints the intermediate language
//! ranking and contribution list as JSON for inspection.

use std::{
    fs, io,
    path::{Path, PathBuf},
    process,
    time::Duration,
};

use clap::{ArgAction, Args, Parser, Subcommand};
use ghcard::{
    CardConfig, Credential, Error, GitHubClient, LanguagePalette, collect_card_data,
    collect_ranking, fetch_contributed_repositories, io_error, load_config, render_card,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command line interface for rendering GitHub profile cards.
#[derive(Debug, Parser,)]
#[command(name = "ghcard", version, about = "Render GitHub statistics into a profile card")]
struct Cli
{
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand,)]
/// Supported commands exposed by the CLI.
enum Command
{
    /// Fetch statistics and write the card PNG.
    Render(RenderArgs,),
    /// Print the ranked language shares as JSON.
    Languages(QueryArgs,),
    /// Print the contributed repositories as JSON.
    Contributions(QueryArgs,),
}

#[derive(Debug, Args, Default,)]
/// Sources of the GitHub personal access token.
struct TokenArgs
{
    /// File containing the personal access token. Takes precedence over
    /// --token.
    #[arg(long = "token-file", value_name = "PATH")]
    token_file: Option<PathBuf,>,

    /// Personal access token.
    #[arg(long = "token", env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String,>,
}

#[derive(Debug, Args,)]
/// Arguments accepted by the `render` subcommand.
struct RenderArgs
{
    /// Path to the YAML card configuration.
    #[arg(long = "config", value_name = "PATH")]
    config: PathBuf,

    #[command(flatten)]
    token: TokenArgs,

    /// Destination PNG, overriding `render.output` from the configuration.
    #[arg(long = "output", value_name = "PATH")]
    output: Option<PathBuf,>,
}

#[derive(Debug, Args,)]
/// Arguments accepted by the JSON-printing subcommands.
struct QueryArgs
{
    /// Path to the YAML card configuration.
    #[arg(long = "config", value_name = "PATH")]
    config: PathBuf,

    #[command(flatten)]
    token: TokenArgs,

    /// Output formatted JSON for easier inspection.
    #[arg(long = "pretty", action = ArgAction::SetTrue)]
    pretty: bool,
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main]
async fn main()
{
    init_tracing();

    if let Err(error,) = run().await {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

fn init_tracing()
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info",),);
    tracing_subscriber::fmt().with_env_filter(filter,).with_writer(io::stderr,).init();
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates configuration, network and rendering errors.
async fn run() -> Result<(), Error,>
{
    let cli = Cli::parse();

    match cli.command {
        Command::Render(args,) => run_render(args,).await,
        Command::Languages(args,) => run_languages(args,).await,
        Command::Contributions(args,) => run_contributions(args,).await,
    }
}

fn spinner() -> ProgressBar
{
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.yellow} [{elapsed_precise}] {msg}",)
            .expect("valid template",),
    );
    pb.enable_steady_tick(Duration::from_millis(100,),);
    pb
}

/// Reads the token from `--token-file` or falls back to `--token` /
/// `GITHUB_TOKEN`.
///
/// # Errors
///
/// Returns [`Error::Io`] when the token file cannot be read and
/// [`Error::Validation`] when no non-empty token is available.
fn resolve_token(args: &TokenArgs,) -> Result<String, Error,>
{
    let token = match (&args.token_file, &args.token,) {
        (Some(path,), _,) => read_token_file(path,)?,
        (None, Some(token,),) => token.trim().to_owned(),
        (None, None,) => String::new(),
    };

    if token.is_empty() {
        return Err(Error::validation(
            "missing GitHub token: pass --token-file <PATH> or set GITHUB_TOKEN",
        ),);
    }

    Ok(token,)
}

fn read_token_file(path: &Path,) -> Result<String, Error,>
{
    let contents = fs::read_to_string(path,).map_err(|source| io_error(path, source,),)?;
    Ok(contents.trim().to_owned(),)
}

fn connect(config: &CardConfig, token: &TokenArgs,) -> Result<GitHubClient, Error,>
{
    let credential = Credential::new(config.account.clone(), &resolve_token(token,)?,);
    GitHubClient::new(&config.network, &credential,)
}

async fn run_render(args: RenderArgs,) -> Result<(), Error,>
{
    let config = load_config(&args.config,)?;
    let client = connect(&config, &args.token,)?;

    let pb = spinner();
    pb.set_message(format!("Collecting statistics for {}...", config.account),);
    let data = collect_card_data(&client, &config,).await?;

    pb.set_message("Rendering card...",);
    let palette = LanguagePalette::with_overrides(&config.colors,);
    let canvas = render_card(&config.render, &palette, &data,)?;

    let output = args.output.unwrap_or_else(|| config.render.output.clone(),);
    pb.set_message(format!("Writing {}...", output.display()),);
    canvas.save(&output,)?;

    pb.finish_and_clear();
    info!("Wrote {}x{} card to {}", canvas.width(), canvas.height(), output.display());
    Ok((),)
}

async fn run_languages(args: QueryArgs,) -> Result<(), Error,>
{
    let config = load_config(&args.config,)?;
    let client = connect(&config, &args.token,)?;

    let pb = spinner();
    pb.set_message(format!("Aggregating languages for {}...", config.account),);
    let ranking = collect_ranking(&client, &config,).await?;
    pb.finish_and_clear();

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, &ranking, args.pretty,)
}

async fn run_contributions(args: QueryArgs,) -> Result<(), Error,>
{
    let config = load_config(&args.config,)?;
    let client = connect(&config, &args.token,)?;

    let pb = spinner();
    pb.set_message("Collecting contributed repositories...",);
    let repositories = fetch_contributed_repositories(&client,).await?;
    pb.finish_and_clear();

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, &repositories, args.pretty,)
}

fn write_json<W: io::Write, T: Serialize + ?Sized,>(
    writer: &mut W,
    value: &T,
    pretty: bool,
) -> Result<(), Error,>
{
    if pretty {
        serde_json::to_writer_pretty(writer, value,)?;
    } else {
        serde_json::to_writer(writer, value,)?;
    }

    Ok((),)
}

#[cfg(test)]
mod tests
{
    use std::{fs, path::Path};

    use clap::Parser;
    use ghcard::{Error, RankedEntry};
    use tempfile::tempdir;

    use super::{Cli, Command, TokenArgs, resolve_token, write_json};

    #[test]
    fn render_subcommand_accepts_token_file_and_output()
    {
        let cli = Cli::try_parse_from([
            env!("CARGO_PKG_NAME"),
            "render",
            "--config",
            "card.yaml",
            "--token-file",
            "GH_TOKEN",
            "--output",
            "out/card.png",
        ],)
        .expect("failed to parse CLI",);

        match cli.command {
            Command::Render(args,) => {
                assert_eq!(args.config, Path::new("card.yaml"));
                assert_eq!(args.token.token_file.as_deref(), Some(Path::new("GH_TOKEN")));
                assert_eq!(args.output.as_deref(), Some(Path::new("out/card.png")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn languages_subcommand_pretty_flag()
    {
        let cli = Cli::try_parse_from([
            env!("CARGO_PKG_NAME"),
            "languages",
            "--config",
            "card.yaml",
            "--token",
            "ghp_example",
            "--pretty",
        ],)
        .expect("failed to parse CLI",);

        match cli.command {
            Command::Languages(args,) => {
                assert!(args.pretty);
                assert_eq!(args.token.token.as_deref(), Some("ghp_example"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn contributions_subcommand_defaults_to_compact_output()
    {
        let cli = Cli::try_parse_from([
            env!("CARGO_PKG_NAME"),
            "contributions",
            "--config",
            "card.yaml",
        ],)
        .expect("failed to parse CLI",);

        assert!(matches!(cli.command, Command::Contributions(ref args) if !args.pretty));
    }

    #[test]
    fn subcommand_is_required()
    {
        assert!(Cli::try_parse_from([env!("CARGO_PKG_NAME")]).is_err());
    }

    #[test]
    fn token_file_is_trimmed_and_preferred()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let path = temp.path().join("GH_TOKEN",);
        fs::write(&path, "ghp_from_file\n",).expect("failed to write token",);

        let args = TokenArgs {
            token_file: Some(path,),
            token:      Some("ghp_from_env".to_owned(),),
        };

        assert_eq!(resolve_token(&args).expect("token resolves"), "ghp_from_file");
    }

    #[test]
    fn missing_token_is_a_validation_error()
    {
        let error = resolve_token(&TokenArgs::default(),).expect_err("expected validation error",);
        assert!(matches!(error, Error::Validation { .. }));

        let blank = TokenArgs {
            token_file: None,
            token:      Some("  ".to_owned(),),
        };
        assert!(matches!(resolve_token(&blank), Err(Error::Validation { .. })));
    }

    #[test]
    fn unreadable_token_file_is_an_io_error()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let args = TokenArgs {
            token_file: Some(temp.path().join("absent",),),
            token:      None,
        };

        assert!(matches!(resolve_token(&args), Err(Error::Io { .. })));
    }

    #[test]
    fn json_writer_supports_pretty_output()
    {
        let ranking = vec![RankedEntry {
            language:   "Go".to_owned(),
            percentage: 0.75,
        }];

        let mut compact = Vec::new();
        write_json(&mut compact, &ranking, false,).expect("compact JSON",);
        assert_eq!(String::from_utf8(compact).unwrap(), r#"[{"language":"Go","percentage":0.75}]"#);

        let mut pretty = Vec::new();
        write_json(&mut pretty, &ranking, true,).expect("pretty JSON",);
        assert!(String::from_utf8(pretty).unwrap().contains("\n  {\n"));
    }
}
