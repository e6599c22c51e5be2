// add-documents: import from Cloud Storage or upload local files

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, ValueEnum};
use tracing::warn;

use crate::config::Config;
use crate::corpus::CorpusService;
use crate::vertex::GcsUploader;

use super::{print_failure, print_header, print_info, print_success, print_warning};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Source {
    /// Stage local files in Cloud Storage, then import them
    Local,
    /// Import existing gs:// objects
    Gcs,
    /// Upload local files straight to the corpus
    Upload,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(long, value_enum)]
    pub source: Source,
    /// File paths, directories or gs:// URIs
    #[arg(long, num_args = 1.., required = true)]
    pub paths: Vec<String>,
    /// Wildcard applied to file names inside the given directories (e.g. '*.pdf')
    #[arg(long)]
    pub pattern: Option<String>,
    /// Corpus display name or resource path (default: configured corpus)
    #[arg(long)]
    pub corpus: Option<String>,
}

/// Expands `paths` into files. Directories contribute their direct children
/// matching `pattern` (every child when no pattern is given). Missing paths are
/// reported and skipped; an invalid pattern is an error.
pub fn collect_local_files(paths: &[String], pattern: Option<&str>) -> anyhow::Result<Vec<PathBuf>> {
    let pattern = pattern.unwrap_or("*");
    glob::Pattern::new(pattern).with_context(|| format!("invalid file pattern '{}'", pattern))?;

    let mut files = Vec::new();
    for raw in paths {
        let path = Path::new(raw);
        if path.is_dir() {
            let full = format!("{}/{}", glob::Pattern::escape(&path.to_string_lossy()), pattern);
            let mut children = Vec::new();
            for entry in glob::glob(&full)? {
                match entry {
                    Ok(child) if child.is_file() => children.push(child),
                    Ok(_) => {}
                    Err(e) => warn!(path = %path.display(), error = %e, "Cannot read directory entry"),
                }
            }
            children.sort();
            files.extend(children);
        } else if path.is_file() {
            files.push(path.to_path_buf());
        } else {
            print_warning(&format!("File not found: {}", path.display()));
        }
    }
    Ok(files)
}

// Files the corpus would reject are skipped before any network traffic
fn accepted_files(service: &CorpusService, files: Vec<PathBuf>) -> Vec<(PathBuf, String, String)> {
    files
        .into_iter()
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?.to_string();
            let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            match service.validate_upload(&name, size) {
                Ok(content_type) => Some((path, name, content_type)),
                Err(e) => {
                    print_warning(&format!("Skipping {}: {}", path.display(), e));
                    None
                }
            }
        })
        .collect()
}

pub async fn run(service: &CorpusService, config: &Config, args: &AddArgs) -> anyhow::Result<()> {
    print_header("Student Report Card RAG - Add Documents");

    let corpus = match &args.corpus {
        Some(name) => service.find_corpus(name).await,
        None => service.resolve().await,
    }
    .context("corpus not found, create it first with: report-card-rag check-corpus")?;

    let processed = match args.source {
        Source::Gcs => {
            print_info(&format!("\nProcessing {} Cloud Storage paths...", args.paths.len()));
            let summary = service.import_documents(&corpus, &args.paths).await?;
            print_success(&format!("Imported {} files into the corpus", summary.imported));
            if summary.failed > 0 {
                print_warning(&format!("{} files failed to import", summary.failed));
            }
            if summary.skipped > 0 {
                print_warning(&format!("{} paths skipped", summary.skipped));
            }
            summary.imported
        }
        Source::Local => {
            let files = collect_local_files(&args.paths, args.pattern.as_deref())?;
            print_info(&format!("\nProcessing {} local files...", files.len()));
            let files = accepted_files(service, files);

            let uploader = GcsUploader::new(&config.vertex)?;
            let mut uris = Vec::new();
            for (path, name, content_type) in files {
                let data = tokio::fs::read(&path).await?;
                match uploader
                    .upload(&GcsUploader::staging_object(&name), &content_type, data)
                    .await
                {
                    Ok(uri) => {
                        print_success(&format!("Uploaded {} to {}", path.display(), uri));
                        uris.push(uri);
                    }
                    Err(e) => print_failure(&format!("Error uploading {}: {}", path.display(), e)),
                }
            }
            if uris.is_empty() {
                bail!("no local files could be staged");
            }
            let summary = service.import_documents(&corpus, &uris).await?;
            print_success(&format!("Imported {} files into the corpus", summary.imported));
            summary.imported
        }
        Source::Upload => {
            let files = collect_local_files(&args.paths, args.pattern.as_deref())?;
            print_info(&format!("\nUploading {} local files...", files.len()));
            let mut uploaded = 0;
            for (path, _, _) in accepted_files(service, files) {
                match service.upload_path(&corpus, &path).await {
                    Ok(doc) => {
                        print_success(&format!("Uploaded {} as {}", doc.display_name, doc.name));
                        uploaded += 1;
                    }
                    Err(e) => print_failure(&format!("Error uploading {}: {}", path.display(), e)),
                }
            }
            uploaded
        }
    };

    if processed == 0 {
        bail!("no documents were added");
    }

    let chunking = service.chunking();
    println!("  Chunk size: {} tokens", chunking.chunk_size);
    println!("  Chunk overlap: {} tokens", chunking.chunk_overlap);
    println!("\nNext steps:");
    println!("  1. Test queries with: report-card-rag query-corpus");
    println!("  2. Check corpus info: report-card-rag corpus-info");
    Ok(())
}
