//! pagesplit CLI - split PDF files into single-page PDFs

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pagesplit::chat::{AzureChatClient, ChatConfig, ChatSession, Conversation, REQUIRED_VARS};
use pagesplit::{PageSelection, PageSplitter, SplitEvent, SplitOptions, SplitReport, DEFAULT_SUBDIR};

/// How many written files the summary lists before collapsing the rest.
const SUMMARY_LIMIT: usize = 5;

#[derive(Parser)]
#[command(name = "pagesplit")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Split PDF files into one PDF per page", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Destination directory (defaults to the source's directory)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a PDF into single-page PDFs
    Split {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Destination directory (defaults to the source's directory)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Subdirectory created under the destination ("" for none)
        #[arg(long, value_name = "NAME", default_value = DEFAULT_SUBDIR)]
        subdir: String,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Publish outputs only after every page was written
        #[arg(long)]
        atomic: bool,

        /// Print the split report as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Chat with the manual guide backed by Azure OpenAI
    Chat {
        /// Show which environment variables are configured, then exit
        #[arg(long)]
        status: bool,

        /// Send a greeting to verify the connection, then exit
        #[arg(long)]
        check: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Split {
            input,
            output,
            subdir,
            pages,
            atomic,
            json,
        }) => cmd_split(&input, output, &subdir, pages.as_deref(), atomic, json),
        Some(Commands::Info { input, json }) => cmd_info(&input, json),
        Some(Commands::Chat { status, check }) => cmd_chat(status, check),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: split if input is provided
            if let Some(input) = cli.input {
                cmd_split(&input, cli.output, DEFAULT_SUBDIR, None, false, false)
            } else {
                println!("{}", "Usage: pagesplit <FILE> [OUTPUT]".yellow());
                println!("       pagesplit --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_split(
    input: &Path,
    output: Option<PathBuf>,
    subdir: &str,
    pages: Option<&str>,
    atomic: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let page_selection = if let Some(p) = pages {
        PageSelection::parse(p)?
    } else {
        PageSelection::All
    };

    let mut options = SplitOptions::new()
        .with_subdir(subdir)
        .with_pages(page_selection)
        .atomic(atomic);
    if let Some(dir) = output {
        options = options.with_destination(dir);
    }

    // Keep stdout clean for JSON output.
    let pb = if json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(0)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message("Opening PDF...");

    let result = PageSplitter::new(options).split_with_progress(input, |event| match event {
        SplitEvent::Started { selected, .. } => {
            pb.set_length(*selected as u64);
            pb.set_message("Splitting...");
        }
        SplitEvent::PageWritten(artifact) => {
            pb.set_message(artifact.file_name.clone());
            pb.inc(1);
        }
        SplitEvent::Finished { .. } => pb.finish_with_message("Done!"),
    });

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            pb.abandon();
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    Ok(())
}

fn print_summary(report: &SplitReport) {
    if report.is_empty() {
        println!("\n{}", "No pages to write.".yellow());
        return;
    }

    println!(
        "\n{} {} of {} pages written to {}",
        "Done!".green().bold(),
        report.len(),
        report.page_count,
        report.output_dir.display()
    );

    let shown = report.artifacts.len().min(SUMMARY_LIMIT);
    for (i, artifact) in report.artifacts.iter().take(shown).enumerate() {
        let branch = if i + 1 == shown && report.len() <= SUMMARY_LIMIT {
            "└─"
        } else {
            "├─"
        };
        println!("  {} {}", branch.dimmed(), artifact.file_name);
    }
    if report.len() > SUMMARY_LIMIT {
        println!(
            "  {} ... and {} more",
            "└─".dimmed(),
            report.len() - SUMMARY_LIMIT
        );
    }
}

fn cmd_info(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let info = pagesplit::inspect_file(input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), info.pdf_version);
    println!("{}: {}", "Pages".bold(), info.page_count);
    println!(
        "{}: {}",
        "Encrypted".bold(),
        if info.encrypted { "Yes" } else { "No" }
    );

    if let Some(ref title) = info.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = info.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref subject) = info.subject {
        println!("{}: {}", "Subject".bold(), subject);
    }
    if let Some(ref creator) = info.creator {
        println!("{}: {}", "Creator".bold(), creator);
    }
    if let Some(ref producer) = info.producer {
        println!("{}: {}", "Producer".bold(), producer);
    }

    Ok(())
}

fn cmd_chat(status: bool, check: bool) -> Result<(), Box<dyn std::error::Error>> {
    if status {
        print_env_status();
        return Ok(());
    }

    let config = ChatConfig::from_env()?;
    let client = AzureChatClient::new(&config)?;

    let rt = tokio::runtime::Runtime::new()?;

    if check {
        println!("{}", "Checking connection...".cyan());
        let reply = rt.block_on(client.check_connection())?;
        println!("{} {}", "Connected:".green().bold(), reply);
        return Ok(());
    }

    let conversation = Conversation::default().with_window(config.history_window);
    let mut session = ChatSession::new(client, conversation);

    for message in session.conversation().visible() {
        println!("{} {}", "assistant>".cyan().bold(), message.content);
    }
    println!("{}", "Type /quit or press Ctrl-D to leave.".dimmed());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{} ", "you>".green().bold());
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let prompt = line?;
        let prompt = prompt.trim();
        if prompt.is_empty() {
            continue;
        }
        if prompt == "/quit" {
            break;
        }

        match rt.block_on(session.ask(prompt)) {
            Ok(reply) => println!("{} {}", "assistant>".cyan().bold(), reply),
            Err(e) => eprintln!("{}: {}", "Error".red().bold(), e),
        }
    }

    Ok(())
}

fn print_env_status() {
    let statuses = ChatConfig::env_status();
    let configured = statuses.iter().filter(|s| s.configured).count();

    println!("{}", "Chat Configuration".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for status in &statuses {
        let mark = if status.configured {
            "✓".green()
        } else {
            "✗".red()
        };
        println!("  {} {}", mark, status.name);
    }
    println!();
    println!("{}/{} configured", configured, REQUIRED_VARS.len());
}

fn cmd_version() {
    println!("{} {}", "pagesplit".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF page splitting tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/pagesplit".dimmed());
    println!("License: MIT");
}
