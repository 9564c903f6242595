use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use metadata_copier::{CopierData, DataCopier, ProcessReport, RuleOutcome, StructureNode};
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "metadata-copier")]
#[command(about = "Rule-driven metadata propagation across document structure trees", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a rule program and print its canonical rule list
    Check {
        /// Rule program, e.g. '/@Foo = /@Bar; /@Baz ""= "default"'
        program: String,
    },

    /// Apply a rule program to a JSON document structure tree
    Apply {
        /// Rule program to apply
        program: String,

        /// Path to the JSON document tree
        #[arg(short, long)]
        document: PathBuf,

        /// Diagnostic identifier for the dataset (defaults to the file name)
        #[arg(short, long)]
        identifier: Option<String>,

        /// Dry run - report what would change without writing the file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of the document changes
        #[arg(long)]
        diff: bool,
    },

    /// Apply a rule program to every .json document under a directory
    Batch {
        /// Rule program to apply
        program: String,

        /// Directory holding the document trees
        #[arg(short, long)]
        dir: PathBuf,

        /// Dry run - report what would change without writing any file
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { program } => cmd_check(&program),

        Commands::Apply {
            program,
            document,
            identifier,
            dry_run,
            diff,
        } => cmd_apply(&program, &document, identifier, dry_run, diff),

        Commands::Batch {
            program,
            dir,
            dry_run,
        } => cmd_batch(&program, &dir, dry_run),
    }
}

fn cmd_check(program: &str) -> Result<()> {
    match DataCopier::new(program) {
        Ok(copier) => {
            println!("{} {} rule(s)", "✓".green(), copier.rules().len());
            for rule in copier.rules() {
                println!("  {rule}");
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("{} {err}", "✗".red());
            anyhow::bail!("program failed to compile")
        }
    }
}

fn cmd_apply(
    program: &str,
    document: &Path,
    identifier: Option<String>,
    dry_run: bool,
    show_diff: bool,
) -> Result<()> {
    let copier = DataCopier::new(program).context("program failed to compile")?;

    let identifier = identifier.unwrap_or_else(|| display_name(document));
    let mut root = load_document(document)?;
    let before = render_document(&root)?;

    if dry_run {
        println!("{}", "[DRY RUN - no files will be written]".cyan());
    }

    let report = {
        let mut data = CopierData::new(&mut root, identifier);
        copier.process(&mut data)
    };
    print_report(&report);

    let after = render_document(&root)?;
    let changed = before != after;

    if show_diff && changed {
        display_diff(document, &before, &after);
    }

    if changed && !dry_run {
        write_document(document, &after)?;
        println!("Updated {}", document.display());
    } else if !changed {
        println!("{}", "Document unchanged".dimmed());
    }

    if report.has_failures() {
        anyhow::bail!("{} rule(s) failed", report.failures().count());
    }
    Ok(())
}

fn cmd_batch(program: &str, dir: &Path, dry_run: bool) -> Result<()> {
    let copier = DataCopier::new(program).context("program failed to compile")?;
    let documents = discover_documents(dir)?;

    if dry_run {
        println!("{}", "[DRY RUN - no files will be written]".cyan());
    }

    let mut failed_documents = 0;
    for document in &documents {
        println!("{}", format!("Processing {}...", document.display()).bold());

        // One broken document must not abort the rest of the batch, the
        // same way one broken rule must not abort the rest of a program.
        let outcome = apply_to_document(&copier, document, dry_run);
        match outcome {
            Ok(report) if report.has_failures() => failed_documents += 1,
            Ok(_) => {}
            Err(err) => {
                eprintln!("  {} {err:#}", "✗".red());
                failed_documents += 1;
            }
        }
    }

    println!();
    println!(
        "Processed {} document(s), {} with failures",
        documents.len(),
        failed_documents
    );
    if failed_documents > 0 {
        anyhow::bail!("{failed_documents} document(s) had failures");
    }
    Ok(())
}

fn apply_to_document(copier: &DataCopier, document: &Path, dry_run: bool) -> Result<ProcessReport> {
    let mut root = load_document(document)?;
    let before = render_document(&root)?;

    let report = {
        let mut data = CopierData::new(&mut root, display_name(document));
        copier.process(&mut data)
    };
    print_report(&report);

    let after = render_document(&root)?;
    if before != after && !dry_run {
        write_document(document, &after)?;
    }
    Ok(report)
}

/// Helper: Discover all .json documents under a directory, sorted for
/// deterministic batch order.
fn discover_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|s| s.to_str()) == Some("json")
        {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No .json documents found under {}", dir.display());
    }
    Ok(files)
}

fn load_document(path: &Path) -> Result<StructureNode> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a valid document tree", path.display()))
}

fn render_document(root: &StructureNode) -> Result<String> {
    let mut json = serde_json::to_string_pretty(root)?;
    json.push('\n');
    Ok(json)
}

/// Helper: Atomic document write (tempfile + fsync + rename), so a crash
/// mid-write never leaves a truncated document behind.
fn write_document(path: &Path, content: &str) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut temp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to create tempfile next to {}", path.display()))?;
    temp.write_all(content.as_bytes())?;
    temp.as_file().sync_all()?;
    temp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

fn print_report(report: &ProcessReport) {
    for outcome in report.outcomes() {
        match outcome {
            RuleOutcome::Applied { rule } => {
                println!("  {} {rule}", "✓".green());
            }
            RuleOutcome::NothingToCopy { rule } => {
                println!("  {} {rule} {}", "-".dimmed(), "(nothing to copy)".dimmed());
            }
            RuleOutcome::Failed { rule, reason } => {
                println!(
                    "  {} [{}] {rule}: {}",
                    "✗".red(),
                    report.identifier(),
                    reason.red()
                );
            }
        }
    }
}

/// Helper: Show unified diff between original and modified document text.
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (copied)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
