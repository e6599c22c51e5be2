//! Command Line Interface
//!
//! Document lifecycle commands run against the configured corpus:
//! creating it, importing and uploading documents, inspecting it, deleting
//! documents and running test queries. The `agents` command inspects the
//! exported agent definitions and runs session tools locally.

pub mod add_documents;
pub mod agents;
pub mod check_corpus;
pub mod corpus_info;
pub mod manage_documents;
pub mod prompt;
pub mod query_corpus;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use console::style;

use crate::config::Config;
use crate::corpus::CorpusService;
use crate::vertex::VertexRagClient;

pub use prompt::{Prompt, TerminalPrompt};

#[derive(Parser, Debug)]
#[command(
    name = "report-card-rag",
    version,
    about = "Corpus tooling and admin UI for the student report card assistant"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List corpora and create the configured corpus if it is missing
    CheckCorpus,
    /// Add documents from local files or Cloud Storage
    AddDocuments(add_documents::AddArgs),
    /// Show corpus statistics and configuration
    CorpusInfo(corpus_info::InfoArgs),
    /// List, inspect and delete documents
    ManageDocuments(manage_documents::ManageArgs),
    /// Run test queries against the corpus
    QueryCorpus(query_corpus::QueryArgs),
    /// Start the admin web UI
    Serve,
    /// Inspect agent definitions and run session tools
    Agents(agents::AgentsArgs),
}

/// Corpus service talking to Vertex AI with the given configuration.
pub fn corpus_service(config: &Config) -> CorpusService {
    let backend = Arc::new(VertexRagClient::new(&config.vertex));
    CorpusService::new(backend, &config.vertex, config.upload.clone())
}

/// Runs every command except `serve`, which needs the server runtime.
pub async fn run(command: Command, config: &Config, prompt: &dyn Prompt) -> anyhow::Result<()> {
    match command {
        Command::CheckCorpus => check_corpus::run(&corpus_service(config)).await,
        Command::AddDocuments(args) => add_documents::run(&corpus_service(config), config, &args).await,
        Command::CorpusInfo(args) => corpus_info::run(&corpus_service(config), config, &args).await,
        Command::ManageDocuments(args) => {
            manage_documents::run(&corpus_service(config), &args, prompt).await
        }
        Command::QueryCorpus(args) => query_corpus::run(&corpus_service(config), &args, prompt).await,
        Command::Agents(args) => agents::run(&config.agent, &args),
        Command::Serve => anyhow::bail!("serve is handled by the binary entry point"),
    }
}

pub(crate) fn print_header(title: &str) {
    let rule = "=".repeat(60);
    println!("{}", rule);
    println!("{}", style(title).bold());
    println!("{}", rule);
}

pub(crate) fn print_success(msg: &str) {
    println!("  {} {}", style("✓").green(), msg);
}

pub(crate) fn print_warning(msg: &str) {
    println!("  {} {}", style("!").yellow(), msg);
}

pub(crate) fn print_failure(msg: &str) {
    println!("  {} {}", style("✗").red(), style(msg).red());
}

pub(crate) fn print_info(msg: &str) {
    println!("{}", style(msg).cyan());
}
