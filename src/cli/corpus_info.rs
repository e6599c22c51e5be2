// corpus-info: statistics and configuration of a corpus

use anyhow::Context;
use clap::Args;

use crate::config::Config;
use crate::corpus::{get_corpus_stats, CorpusService};
use crate::models::{CorpusStats, Document};
use crate::utils::format::{bytes_to_mb, format_count_with_label, format_date, pluralize};

use super::{print_header, print_info, print_success, print_warning};

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Corpus display name or resource path (default: configured corpus)
    #[arg(long)]
    pub corpus: Option<String>,
    /// List every corpus in the project and exit
    #[arg(long)]
    pub list_all: bool,
    /// Print every document with its size and timestamps
    #[arg(long)]
    pub detailed: bool,
}

/// Statistics block printed for a corpus.
pub fn stats_lines(stats: &CorpusStats) -> Vec<String> {
    let mut lines = vec![format!("Document Count: {}", stats.total_documents)];
    if stats.total_documents == 0 {
        return lines;
    }

    lines.push(format!("Total Size: {:.2} MB", bytes_to_mb(stats.total_size)));
    lines.push(format!("Average File Size: {:.2} MB", stats.average_size / (1024.0 * 1024.0)));
    lines.push(format!("Latest Upload: {}", format_date(stats.latest_upload.as_ref())));
    lines.push("File Types:".to_string());
    for (ext, count) in &stats.file_types {
        lines.push(format!("  {}: {}", ext, format_count_with_label(*count, "file")));
    }
    lines
}

fn print_detailed(documents: &[Document]) {
    print_info("\nDetailed File Information");
    println!("{}", "=".repeat(80));
    for (i, doc) in documents.iter().enumerate() {
        println!("\nFile #{}: {}", i + 1, doc.display_name);
        println!("   Resource ID: {}", doc.name);
        if doc.size_bytes > 0 {
            println!("   Size: {} bytes ({:.2} MB)", doc.size_bytes, bytes_to_mb(doc.size_bytes));
        }
        println!("   Created: {}", format_date(doc.create_time.as_ref()));
        println!("   Updated: {}", format_date(doc.update_time.as_ref()));
        println!("{}", "-".repeat(80));
    }
}

pub async fn run(service: &CorpusService, config: &Config, args: &InfoArgs) -> anyhow::Result<()> {
    print_header("Student Report Card RAG - Corpus Information");

    let corpora = service.list_corpora().await?;
    if args.list_all {
        if corpora.is_empty() {
            print_warning("No corpora found in this project.");
            println!("  Create one with: report-card-rag check-corpus");
        } else {
            println!(
                "\nFound {} {} in project '{}'",
                corpora.len(),
                pluralize(corpora.len(), "corpus", Some("corpora")),
                config.vertex.project_id
            );
            for corpus in &corpora {
                println!("\n  {}", corpus.display_name);
                println!("     Resource: {}", corpus.name);
            }
        }
        return Ok(());
    }

    let target = args.corpus.as_deref().unwrap_or(service.corpus_name());
    let resource = match service.find_corpus(target).await {
        Ok(resource) => resource,
        Err(e) => {
            if !corpora.is_empty() {
                println!("  Available corpora:");
                for corpus in &corpora {
                    println!("    - {}", corpus.display_name);
                }
            }
            return Err(e).context(format!("cannot inspect corpus '{}'", target));
        }
    };

    print_info(&format!("\nInspecting corpus: {}", target));
    let documents = service.list_documents(&resource).await?;
    let stats = get_corpus_stats(&documents);

    println!("\nCorpus Statistics");
    println!("{}", "=".repeat(50));
    println!("Display Name: {}", target);
    println!("Resource Name: {}", resource);
    println!("Project: {}", config.vertex.project_id);
    println!("Location: {}", config.vertex.location);
    for line in stats_lines(&stats) {
        println!("{}", line);
    }

    let chunking = service.chunking();
    println!("\nConfiguration:");
    println!("  Embedding Model: {}", config.vertex.embedding_model);
    println!("  Chunk Size: {} tokens", chunking.chunk_size);
    println!("  Chunk Overlap: {} tokens", chunking.chunk_overlap);
    println!("  Max File Size: {} MB", config.upload.max_file_size_mb);
    println!("  Supported Types: {}", config.upload.supported_file_types.join(", "));

    if args.detailed {
        print_detailed(&documents);
    }

    if documents.is_empty() {
        print_warning("Corpus is empty - no documents indexed");
        println!("  Add documents: report-card-rag add-documents --source local --paths ./sample-data");
    } else {
        print_success(&format!("Corpus contains {}", format_count_with_label(documents.len(), "document")));
    }
    Ok(())
}
