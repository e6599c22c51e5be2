// query-corpus: test retrieval against the corpus

use anyhow::Context;
use clap::Args;

use crate::corpus::CorpusService;
use crate::models::{QueryParams, RetrievedContext};

use super::prompt::Prompt;
use super::{print_failure, print_header, print_info, print_warning};

pub const SNIPPET_LENGTH: usize = 300;

pub const SAMPLE_QUERIES: [&str; 5] = [
    "What does 'approaching standard' mean in math?",
    "How can parents help with reading comprehension?",
    "Explain the grading scale used in elementary school",
    "What are the benchmarks for first grade students?",
    "How is social studies performance measured?",
];

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Single query to run
    #[arg(long)]
    pub query: Option<String>,
    #[arg(long, default_value_t = 5)]
    pub top_k: u32,
    #[arg(long, default_value_t = 0.5)]
    pub distance_threshold: f64,
    /// Read queries until 'quit'
    #[arg(long)]
    pub interactive: bool,
}

/// Trims `text` and cuts it to `max` characters, marking the cut with `...`.
pub fn truncate_snippet(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}...", cut)
}

fn display_results(results: &[RetrievedContext]) {
    if results.is_empty() {
        print_warning("No results found for this query.");
        println!("  Try:");
        println!("    - Different keywords");
        println!("    - A higher distance threshold");
        println!("    - Adding more documents to the corpus");
        return;
    }

    println!("\nFound {} results:", results.len());
    println!("{}", "=".repeat(80));
    for result in results {
        println!("\nResult #{} (Score: {:.3})", result.rank, result.score);
        if !result.source_name.is_empty() {
            println!("   Source: {}", result.source_name);
        }
        if !result.source_uri.is_empty() {
            println!("   URI: {}", result.source_uri);
        }
        println!("   Content:");
        println!("      {}", truncate_snippet(&result.text, SNIPPET_LENGTH));
        println!("{}", "-".repeat(80));
    }
}

async fn run_query(
    service: &CorpusService,
    corpus: &str,
    text: &str,
    params: QueryParams,
) -> anyhow::Result<Vec<RetrievedContext>> {
    print_info(&format!("\nQuerying corpus: {}", service.corpus_name()));
    println!("  Query: '{}'", text);
    println!("  Top K: {}", params.top_k);
    println!("  Distance threshold: {}", params.distance_threshold);

    let results = service.query(corpus, text, params).await?;
    display_results(&results);
    Ok(results)
}

fn print_samples(samples: &[&str]) {
    println!("\nSample queries to try:");
    for (i, sample) in samples.iter().enumerate() {
        println!("  {}. {}", i + 1, sample);
    }
}

/// Reads queries until `quit`, `exit` or `q`. Failed queries are reported and the loop continues.
pub async fn interactive(
    service: &CorpusService,
    corpus: &str,
    params: QueryParams,
    prompt: &dyn Prompt,
) -> anyhow::Result<usize> {
    print_info("\nInteractive Query Mode");
    println!("  Type 'quit' to exit");
    println!("  Type 'help' for sample queries");
    println!("{}", "-".repeat(60));

    let mut answered = 0;
    loop {
        let query = prompt.input("Enter your query")?;
        let query = query.trim();
        match query.to_lowercase().as_str() {
            "quit" | "exit" | "q" => {
                println!("  Goodbye!");
                return Ok(answered);
            }
            "help" => print_samples(&SAMPLE_QUERIES),
            "" => continue,
            _ => match run_query(service, corpus, query, params).await {
                Ok(_) => answered += 1,
                Err(e) => print_failure(&format!("Error: {}", e)),
            },
        }
    }
}

pub async fn run(service: &CorpusService, args: &QueryArgs, prompt: &dyn Prompt) -> anyhow::Result<()> {
    print_header("Student Report Card RAG - Query Testing");

    let corpus = service
        .resolve()
        .await
        .context("corpus not found, create it first with: report-card-rag check-corpus")?;
    let params = QueryParams {
        top_k: args.top_k,
        distance_threshold: args.distance_threshold,
    };

    if let Some(query) = &args.query {
        run_query(service, &corpus, query, params).await?;
    } else if args.interactive {
        interactive(service, &corpus, params, prompt).await?;
    } else {
        print_samples(&SAMPLE_QUERIES[..4]);
        print_info("\nTesting with sample query...");
        run_query(service, &corpus, SAMPLE_QUERIES[0], params).await?;
        if prompt.confirm("Enter interactive mode?")? {
            interactive(service, &corpus, params, prompt).await?;
        }
    }

    println!("\nQuery testing completed!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::prompt::ScriptedPrompt;
    use crate::testing::{app_state, FakeBackend, TEST_CORPUS};
    use std::sync::Arc;

    fn context(rank: usize, text: &str) -> RetrievedContext {
        RetrievedContext {
            rank,
            source_uri: format!("gs://bucket/q{}.pdf", rank),
            source_name: format!("q{}.pdf", rank),
            text: text.to_string(),
            score: 0.2,
        }
    }

    #[test]
    fn test_truncate_snippet() {
        assert_eq!(truncate_snippet("  short  ", 300), "short");
        let long = "é".repeat(301);
        let cut = truncate_snippet(&long, 300);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 303);
        assert_eq!(truncate_snippet(&"a".repeat(300), 300).len(), 300);
    }

    #[tokio::test]
    async fn test_interactive_loop() {
        let backend = Arc::new(FakeBackend::new());
        backend.add_corpus(TEST_CORPUS);
        backend.set_contexts(vec![context(1, "Math: 2 (making progress)")]);
        let state = app_state(backend);
        let corpus = state.corpus.resolve().await.unwrap();

        let prompt = ScriptedPrompt::new(&["help", "", "math scores", "EXIT"]);
        let answered = interactive(&state.corpus, &corpus, QueryParams::default(), &prompt)
            .await
            .unwrap();
        assert_eq!(answered, 1);
    }

    #[tokio::test]
    async fn test_invalid_params_fail_single_query() {
        let backend = Arc::new(FakeBackend::new());
        backend.add_corpus(TEST_CORPUS);
        let state = app_state(backend);
        let args = QueryArgs {
            query: Some("reading".to_string()),
            top_k: 0,
            distance_threshold: 0.5,
            interactive: false,
        };
        let prompt = ScriptedPrompt::new(&[]);
        assert!(run(&state.corpus, &args, &prompt).await.is_err());
    }

    #[tokio::test]
    async fn test_default_mode_runs_sample_and_declines_interactive() {
        let backend = Arc::new(FakeBackend::new());
        backend.add_corpus(TEST_CORPUS);
        let state = app_state(backend);
        let args = QueryArgs {
            query: None,
            top_k: 5,
            distance_threshold: 0.5,
            interactive: false,
        };
        let prompt = ScriptedPrompt::new(&["n"]);
        run(&state.corpus, &args, &prompt).await.unwrap();
        assert_eq!(prompt.asked.borrow().as_slice(), ["Enter interactive mode?"]);
    }
}
