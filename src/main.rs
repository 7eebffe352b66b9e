use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use mdchat::{Config, Error, Text, TextStyler};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mdchat")]
#[command(about = "Render chat markdown as styled text")]
struct Cli {
    /// Input file; reads standard input when omitted or "-"
    input: Option<PathBuf>,

    /// Config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// JSON text component
    Json,
    /// Text without styling
    Plain,
    /// Terminal colors
    Ansi,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("MDCHAT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> mdchat::Result<String> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::compiled_default(),
    };
    let markdown = read_input(cli.input.as_deref())?;

    let styler = TextStyler::from_config(&config);
    let text = styler.apply(&markdown);
    format_output(text.as_ref(), cli.format, cli.pretty)
}

fn read_input(path: Option<&Path>) -> mdchat::Result<String> {
    match path {
        Some(path) if path != Path::new("-") => {
            fs::read_to_string(path).map_err(|source| Error::Input {
                path: path.to_path_buf(),
                source,
            })
        }
        _ => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(Error::Stdin)?;
            Ok(buffer)
        }
    }
}

fn format_output(text: Option<&Text>, format: Format, pretty: bool) -> mdchat::Result<String> {
    let output = match format {
        Format::Json if pretty => serde_json::to_string_pretty(&text)?,
        Format::Json => serde_json::to_string(&text)?,
        Format::Plain => text.map(Text::to_plain_string).unwrap_or_default(),
        Format::Ansi => text
            .map(|text| mdchat::terminal::to_ansi(text, None))
            .unwrap_or_default(),
    };
    Ok(output)
}
