// html2term — read HTML on stdin, write a terminal-friendly text rendering
// on stdout. With -x, a TYPE\tURL resource manifest is written to file
// descriptor 3 as references are discovered.

use std::io::{self, BufWriter, Read, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use html2term::Options;

#[derive(Parser, Debug)]
#[command(
    name = "html2term",
    about = "Dump HTML from stdin as plain text for a fixed-width terminal"
)]
struct Cli {
    /// Toggle the UTF-8 glyph set (on by default; toggling selects the
    /// ASCII fallback: "* " bullets, "-" rulers, no section signs)
    #[arg(short = '8')]
    glyph_toggle: bool,

    /// Emit ANSI styling (bold/italic/underline/…)
    #[arg(short = 'a')]
    ansi: bool,

    /// Base URL used to make relative links absolute; must have a scheme
    #[arg(short = 'b', value_name = "URL")]
    base: Option<String>,

    /// Number unique references only (deduplicate by URL)
    #[arg(short = 'd')]
    dedup: bool,

    /// Show link reference numbers inline ("[n]")
    #[arg(short = 'i')]
    inline_refs: bool,

    /// Show full link references inline ("[type: url]")
    #[arg(short = 'I')]
    inline_urls: bool,

    /// Show link references at the bottom of the document
    #[arg(short = 'l')]
    references: bool,

    /// Word-wrap lines at the terminal width
    #[arg(short = 'r')]
    wrap: bool,

    /// Reader mode: only render content matching this selector list
    #[arg(short = 's', value_name = "SELECTOR")]
    show: Option<String>,

    /// Hide content matching this selector list
    #[arg(short = 'u', value_name = "SELECTOR")]
    hide: Option<String>,

    /// Terminal width in cells
    #[arg(short = 'w', value_name = "WIDTH", default_value_t = 77)]
    width: usize,

    /// Write a TYPE\tURL resource manifest to file descriptor 3
    #[arg(short = 'x')]
    resources: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Usage and argument errors exit 1, before any rendering.
            let _ = err.print();
            return ExitCode::FAILURE;
        }
    };

    let mut options = Options::new()
        .with_width(cli.width)
        .with_ansi(cli.ansi)
        .with_wrap(cli.wrap)
        .with_ascii(cli.glyph_toggle)
        .with_dedup_references(cli.dedup)
        .with_inline_references(cli.inline_refs)
        .with_inline_urls(cli.inline_urls)
        .with_references_section(cli.references);
    if let Some(base) = cli.base {
        options = options.with_base(base);
    }
    if let Some(show) = cli.show {
        options = options.with_show(show);
    }
    if let Some(hide) = cli.hide {
        options = options.with_hide(hide);
    }

    let mut input = Vec::new();
    if let Err(err) = io::stdin().read_to_end(&mut input) {
        eprintln!("html2term: read stdin: {err}");
        return ExitCode::FAILURE;
    }
    let html = String::from_utf8_lossy(&input);

    let resources = if cli.resources {
        match manifest_sink() {
            Some(sink) => Some(sink),
            None => {
                eprintln!("html2term: the resource manifest needs file descriptor 3");
                return ExitCode::FAILURE;
            }
        }
    } else {
        None
    };

    let stdout = io::stdout().lock();
    let out = BufWriter::new(stdout);
    match html2term::render_to(&html, &options, out, resources) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("html2term: {err}");
            ExitCode::FAILURE
        }
    }
}

/// The inherited file descriptor 3, as the manifest sink.
#[cfg(unix)]
fn manifest_sink() -> Option<Box<dyn Write>> {
    use std::fs::File;
    use std::os::unix::io::FromRawFd;

    // SAFETY: ownership of fd 3 is taken exactly once, here. If the caller
    // did not provide the descriptor, writes fail and surface as an I/O
    // error at the end of rendering.
    let file = unsafe { File::from_raw_fd(3) };
    Some(Box::new(file))
}

#[cfg(not(unix))]
fn manifest_sink() -> Option<Box<dyn Write>> {
    None
}
