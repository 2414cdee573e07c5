//! folio - Reading location and TOC index inspector

use std::process::ExitCode;

use clap::Parser;

use folio::manifest::{IndexReport, Manifest};
use folio::{Cfi, LocationIndex, TocId};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version, about = "Reading location and TOC index inspector", long_about = None)]
#[command(after_help = "EXAMPLES:
    folio book.json                      Show the location index
    folio book.json --json               Emit the index as JSON
    folio book.json --cfi '/6/10!/4/2'   Resolve the chapter at a position")]
struct Cli {
    /// Manifest file (JSON)
    #[arg(value_name = "MANIFEST")]
    manifest: String,

    /// Resolve the chapter containing this CFI
    #[arg(long, value_name = "CFI")]
    cfi: Option<String>,

    /// Emit the full index as JSON
    #[arg(long)]
    json: bool,

    /// Sort top-level TOC entries into document order
    #[arg(long)]
    sort_toc: bool,

    /// Override the manifest's bytes-per-location unit
    #[arg(long, value_name = "BYTES")]
    unit: Option<usize>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let manifest = Manifest::from_path(&cli.manifest).map_err(|e| e.to_string())?;

    let mut options = manifest.options().with_sort_toc(cli.sort_toc);
    if let Some(unit) = cli.unit {
        options = options.with_size_per_location(unit);
    }

    let Some(index) = manifest.index(&options) else {
        println!("File: {}", cli.manifest);
        println!("Layout: pre-paginated (not indexed)");
        return Ok(());
    };

    if let Some(cfi) = &cli.cfi {
        return resolve_position(&index, cfi);
    }

    if cli.json {
        let report = IndexReport::from_index(&index);
        let json = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{json}");
        return Ok(());
    }

    show_index(&cli.manifest, &index);
    Ok(())
}

fn show_index(path: &str, index: &LocationIndex) {
    println!("File: {path}");
    println!("Sections: {}", index.section_roots().len());
    println!("TOC entries: {}", index.toc_roots().len());
    println!("Total locations: {}", index.total_locations());

    if !index.section_roots().is_empty() {
        println!();
        println!("Sections:");
        for &id in index.section_roots() {
            let Some(section) = index.section(id) else {
                continue;
            };
            match section.location {
                Some(location) => println!(
                    "  {:>6}..{:<6} {}",
                    location.current, location.next, section.id
                ),
                None => println!("  {:>6}..{:<6} {}", "-", "-", section.id),
            }
        }
    }

    if !index.toc_roots().is_empty() {
        println!();
        println!("TOC:");
        for &id in index.toc_roots() {
            print_toc_entry(index, id, 1);
        }
    }
}

fn print_toc_entry(index: &LocationIndex, id: TocId, depth: usize) {
    let Some(node) = index.toc_node(id) else {
        return;
    };
    let indent = "  ".repeat(depth);
    match node.location {
        Some(location) => println!("{indent}{} (loc {})", node.label, location.current),
        None => println!("{indent}{}", node.label),
    }
    for &kid in &node.subitems {
        print_toc_entry(index, kid, depth + 1);
    }
}

fn resolve_position(index: &LocationIndex, cfi: &str) -> Result<(), String> {
    let target = Cfi::parse(cfi).ok_or_else(|| format!("invalid CFI: {cfi}"))?;
    let found = index.find_by_cfi(&target).and_then(|id| index.toc_node(id));
    match found {
        Some(node) => {
            println!("Chapter: {}", node.label);
            println!("TOC id: {}", node.id);
            if let Some(location) = node.location {
                println!("Location: {} of {}", location.current, location.total);
                println!("Progress: {:.1}%", location.fraction() * 100.0);
            }
        }
        None => println!("No chapter contains {cfi}"),
    }
    Ok(())
}
