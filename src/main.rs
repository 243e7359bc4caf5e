//! richcopy - command line host
//!
//! Reads Markdown from a file or stdin and copies it to the clipboard as
//! style-inlined HTML.
//!
//! ```text
//! richcopy [--print] [--vault DIR] [FILE]
//! ```

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use richcopy::config::load_config;
use richcopy::export::{ClipboardContent, ClipboardSink, Converter, LogNotifier, SystemClipboard};
use richcopy::style::SnippetDirectory;

#[derive(Parser, Debug)]
#[command(name = "richcopy")]
#[command(version, about = "Copy Markdown as style-inlined HTML", long_about = None)]
#[command(after_help = "EXAMPLES:
    richcopy note.md                    Copy note.md to the clipboard
    richcopy --vault ~/notes note.md    Inline snippets from ~/notes
    cat note.md | richcopy --print      Print the HTML instead")]
struct Args {
    /// Markdown file to convert (reads stdin when omitted)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Vault whose .obsidian/snippets are inlined (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    vault: Option<PathBuf>,

    /// Print the HTML instead of copying it
    #[arg(short, long)]
    print: bool,
}

fn read_input(path: Option<&PathBuf>) -> io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Sink printing the HTML instead of touching the clipboard.
struct Stdout;

impl ClipboardSink for Stdout {
    fn write(&mut self, content: ClipboardContent) -> richcopy::Result<()> {
        if let ClipboardContent::Html(payload) = content {
            println!("{}", payload.html);
        }
        Ok(())
    }
}

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let markdown = match read_input(args.input.as_ref()) {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to read input: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let config = load_config();
    let vault = args
        .vault
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_default();
    info!("Using snippets from {}", vault.display());
    let converter = Converter::new(SnippetDirectory::for_vault(&vault), LogNotifier);

    let result = if args.print {
        converter.copy_html(&markdown, &config, &mut Stdout)
    } else {
        converter.copy_html(&markdown, &config, &mut SystemClipboard::new())
    };

    match result {
        Ok(payload) => {
            info!("Converted {} bytes of HTML", payload.html.len());
            ExitCode::SUCCESS
        }
        Err(_) => ExitCode::FAILURE,
    }
}
