use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::output::Destination;

#[derive(Debug, Parser)]
#[command(
    name = "gencli",
    version,
    about = "A CLI tool to interact with the Gemini API.",
    long_about = "A CLI tool to interact with the Gemini API.\n\nDo all your tedious tasks with a single command"
)]
pub struct Cli {
    /// `None` when invoked bare; the caller prints help and exits cleanly.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ask a question and get a response (put your question in quotes)
    Search(SearchArgs),
    /// Ask a question about an image
    Image(ImageArgs),
    /// Select a different GenAI model
    Model,
    /// Show the installed version of gencli
    Version,
    /// Update gencli to the latest version
    Update,
}

#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Output language
    #[arg(short, long, default_value = "english")]
    pub language: String,

    /// Response creativity (0.0-1.0)
    #[arg(short, long, default_value_t = 0.5, allow_negative_numbers = true)]
    pub temperature: f32,

    /// Save the output to a file
    #[arg(short, long)]
    pub save: bool,

    /// Output file name
    #[arg(short, long, default_value = "output.txt")]
    pub output: PathBuf,
}

impl OutputArgs {
    pub fn destination(&self) -> Destination {
        Destination::from_flags(self.save, &self.output)
    }
}

#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    /// Your question
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Number of words in the response
    #[arg(short, long, default_value = "150")]
    pub words: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Clone, Args)]
pub struct ImageArgs {
    /// Your question about the image
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Path of the image
    #[arg(short, long)]
    pub path: PathBuf,

    /// Image format (jpeg, png, ...)
    #[arg(short, long, default_value = "jpeg")]
    pub format: String,

    #[command(flatten)]
    pub output: OutputArgs,
}
