// manage-documents: list, inspect and delete documents

use anyhow::{bail, Context};
use clap::Args;

use crate::corpus::CorpusService;
use crate::models::{BulkDeleteReport, DeleteTarget, Document};
use crate::utils::format::{bytes_to_mb, format_date};

use super::prompt::Prompt;
use super::{print_failure, print_header, print_info, print_success, print_warning};

const DELETE_ALL_PHRASE: &str = "DELETE ALL";

#[derive(Args, Debug)]
pub struct ManageArgs {
    /// Corpus display name or resource path (default: configured corpus)
    #[arg(long)]
    pub corpus: Option<String>,
    /// List all documents and exit
    #[arg(long, conflicts_with_all = ["delete", "delete_all"])]
    pub list: bool,
    /// Delete the document with this number (as shown by --list)
    #[arg(long, conflicts_with = "delete_all")]
    pub delete: Option<usize>,
    /// Delete every document in the corpus
    #[arg(long)]
    pub delete_all: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuChoice {
    /// Zero-based index of the document to show
    Details(usize),
    /// Zero-based index of the document to delete
    Delete(usize),
    DeleteAll,
    Refresh,
    Quit,
    Invalid(String),
}

/// Parses a menu entry against a list of `count` documents.
pub fn parse_choice(input: &str, count: usize) -> MenuChoice {
    let choice = input.trim().to_lowercase();
    let index = |raw: &str| -> MenuChoice {
        match raw.parse::<usize>() {
            Ok(n) if n >= 1 && n <= count => MenuChoice::Details(n - 1),
            Ok(_) => MenuChoice::Invalid("Invalid document number.".to_string()),
            Err(_) => MenuChoice::Invalid("Invalid input. Use 'd1', 'd2', etc.".to_string()),
        }
    };

    match choice.as_str() {
        "q" => MenuChoice::Quit,
        "r" => MenuChoice::Refresh,
        "dall" => MenuChoice::DeleteAll,
        c if c.starts_with('d') && c.len() > 1 => match index(&c[1..]) {
            MenuChoice::Details(i) => MenuChoice::Delete(i),
            other => other,
        },
        c if !c.is_empty() && c.chars().all(|ch| ch.is_ascii_digit()) => index(c),
        _ => MenuChoice::Invalid("Invalid choice. Please try again.".to_string()),
    }
}

fn print_documents(documents: &[Document]) {
    if documents.is_empty() {
        println!("  No documents found in corpus.");
        return;
    }
    println!("  Found {} documents:", documents.len());
    for (i, doc) in documents.iter().enumerate() {
        println!("\n  [{}] {}", i + 1, doc.display_name);
        println!("      Resource: {}", doc.name);
        if doc.size_bytes > 0 {
            println!("      Size: {:.2} MB", bytes_to_mb(doc.size_bytes));
        }
        if doc.create_time.is_some() {
            println!("      Created: {}", format_date(doc.create_time.as_ref()));
        }
    }
}

fn print_details(doc: &Document) {
    print_info("\nDocument Details");
    println!("{}", "=".repeat(60));
    println!("Display Name: {}", doc.display_name);
    println!("Resource Name: {}", doc.name);
    if doc.size_bytes > 0 {
        println!("Size: {} bytes ({:.2} MB)", doc.size_bytes, bytes_to_mb(doc.size_bytes));
    }
    println!("Created: {}", format_date(doc.create_time.as_ref()));
    println!("Updated: {}", format_date(doc.update_time.as_ref()));
    println!("{}", "=".repeat(60));
}

/// Deletes one document after a y/N confirmation. Returns whether it was deleted.
pub async fn delete_one(
    service: &CorpusService,
    prompt: &dyn Prompt,
    doc: &Document,
) -> anyhow::Result<bool> {
    if !prompt.confirm(&format!("Are you sure you want to delete '{}'?", doc.display_name))? {
        println!("  Deletion cancelled.");
        return Ok(false);
    }
    match service.delete_document(&doc.name).await {
        Ok(()) => {
            print_success(&format!("Deleted: {}", doc.display_name));
            Ok(true)
        }
        Err(e) => {
            print_failure(&format!("Error deleting {}: {}", doc.display_name, e));
            Ok(false)
        }
    }
}

/// Deletes every listed document after a y/N confirmation and the typed phrase.
/// Returns `None` when the operator backs out.
pub async fn delete_all(
    service: &CorpusService,
    prompt: &dyn Prompt,
    documents: &[Document],
) -> anyhow::Result<Option<BulkDeleteReport>> {
    if documents.is_empty() {
        println!("  No documents to delete.");
        return Ok(Some(BulkDeleteReport::default()));
    }

    print_warning(&format!("Preparing to delete ALL {} documents:", documents.len()));
    for doc in documents {
        println!("   - {}", doc.display_name);
    }

    let sure = prompt.confirm(&format!(
        "Are you sure you want to delete ALL {} documents?",
        documents.len()
    ))?;
    if !sure {
        println!("  Bulk deletion cancelled.");
        return Ok(None);
    }
    let typed = prompt.input(&format!(
        "This action cannot be undone. Type '{}' to confirm",
        DELETE_ALL_PHRASE
    ))?;
    if typed != DELETE_ALL_PHRASE {
        println!("  Bulk deletion cancelled.");
        return Ok(None);
    }

    let targets: Vec<DeleteTarget> = documents.iter().map(DeleteTarget::from).collect();
    let report = service.bulk_delete_documents(&targets).await;

    println!("\nDeletion Summary:");
    print_success(&format!("Successfully deleted: {}", report.deleted));
    for failure in &report.failures {
        print_failure(&format!("Failed to delete {}: {}", failure.display_name, failure.error));
    }
    Ok(Some(report))
}

async fn interactive(service: &CorpusService, corpus: &str, prompt: &dyn Prompt) -> anyhow::Result<()> {
    loop {
        print_header("Student Report Card RAG - Document Management");
        let documents = service.list_documents(corpus).await?;
        print_documents(&documents);
        if documents.is_empty() {
            println!("\n  Add documents with: report-card-rag add-documents");
            return Ok(());
        }

        println!("\nManagement Options:");
        println!("  [1-{}] View details for document", documents.len());
        println!("  [d1-d{}] Delete specific document", documents.len());
        println!("  [dall] Delete ALL documents");
        println!("  [r] Refresh document list");
        println!("  [q] Quit");

        let input = prompt.input("Enter your choice")?;
        match parse_choice(&input, documents.len()) {
            MenuChoice::Quit => {
                println!("Exiting document management.");
                return Ok(());
            }
            MenuChoice::Refresh => continue,
            MenuChoice::Details(i) => print_details(&documents[i]),
            MenuChoice::Delete(i) => {
                delete_one(service, prompt, &documents[i]).await?;
            }
            MenuChoice::DeleteAll => {
                if let Some(report) = delete_all(service, prompt, &documents).await? {
                    if report.all_deleted() {
                        print_success("All documents deleted successfully.");
                    } else {
                        print_failure("Some documents could not be deleted.");
                    }
                }
            }
            MenuChoice::Invalid(message) => print_failure(&message),
        }
    }
}

pub async fn run(service: &CorpusService, args: &ManageArgs, prompt: &dyn Prompt) -> anyhow::Result<()> {
    let corpus = match &args.corpus {
        Some(name) => service.find_corpus(name).await,
        None => service.resolve().await,
    }
    .context("corpus not found")?;

    if args.list {
        print_header("Student Report Card RAG - Documents");
        print_documents(&service.list_documents(&corpus).await?);
        return Ok(());
    }

    if let Some(number) = args.delete {
        let documents = service.list_documents(&corpus).await?;
        let doc = number
            .checked_sub(1)
            .and_then(|i| documents.get(i))
            .with_context(|| format!("invalid document number {} (corpus has {})", number, documents.len()))?;
        if !delete_one(service, prompt, doc).await? {
            bail!("document '{}' was not deleted", doc.display_name);
        }
        return Ok(());
    }

    if args.delete_all {
        let documents = service.list_documents(&corpus).await?;
        return match delete_all(service, prompt, &documents).await? {
            Some(report) if report.all_deleted() => Ok(()),
            Some(report) => bail!("{} of {} documents could not be deleted", report.failed, report.total),
            None => Ok(()),
        };
    }

    interactive(service, &corpus, prompt).await
}
