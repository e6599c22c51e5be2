// check-corpus: list corpora and create the configured one if missing

use crate::corpus::CorpusService;

use super::{print_header, print_info, print_success};

pub async fn run(service: &CorpusService) -> anyhow::Result<()> {
    print_header("Student Report Card RAG - Corpus Check");

    print_info("\nChecking for existing RAG corpora...");
    let corpora = service.list_corpora().await?;
    if corpora.is_empty() {
        println!("  No existing corpora found.");
    } else {
        println!("  Found {} existing corpora:", corpora.len());
        for corpus in &corpora {
            println!("  - Display Name: {}", corpus.display_name);
            println!("    Resource Name: {}", corpus.name);
        }
    }

    let ensured = service.ensure_corpus(service.corpus_name()).await?;
    if ensured.created {
        print_success(&format!("Created corpus '{}'", ensured.corpus.display_name));
    } else {
        print_success(&format!("Corpus '{}' already exists", ensured.corpus.display_name));
    }
    println!("  Resource Name: {}", ensured.corpus.name);

    println!("\nNext steps:");
    println!("  1. Add documents: report-card-rag add-documents --source local --paths ./sample-data");
    println!("  2. Inspect the corpus: report-card-rag corpus-info");
    Ok(())
}
