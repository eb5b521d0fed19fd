//! Application entry point — Voice List.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Load the grocery catalog (built-in fallback when no file exists).
//! 4. Build the [`ItemPipeline`].
//! 5. Run the interactive loop: each line of input is parsed as one
//!    utterance and merged into the in-memory list.
//!
//! Speech input needs a platform recognition engine; the binary runs the
//! typed-entry path, which exercises the identical parsing pipeline.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use voice_list::{
    catalog::{CatalogLookup, GroceryCatalog},
    config::AppConfig,
    pipeline::{ItemPipeline, ShoppingItem},
};

// ---------------------------------------------------------------------------
// Interactive loop
// ---------------------------------------------------------------------------

fn run_loop(pipeline: &ItemPipeline) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut items: Vec<ShoppingItem> = Vec::new();

    println!("Type what you need (e.g. \"2 apples, a dozen eggs and some milk\").");
    println!("Commands: /list  /clear  /quit");

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim();

        match line {
            "" => continue,
            "/quit" | "/q" => break,
            "/clear" => {
                items.clear();
                println!("List cleared.");
            }
            "/list" => print_list(&items),
            _ => {
                let outcome = pipeline.parse_utterance(line, &items);

                if outcome.recognized_none {
                    println!("Didn't catch any items in that.");
                    continue;
                }
                for item in &outcome.added {
                    println!("  + {}", item.display_line());
                }
                if outcome.duplicate_count > 0 {
                    println!(
                        "  ({} item{} already on the list)",
                        outcome.duplicate_count,
                        if outcome.duplicate_count == 1 { "" } else { "s" }
                    );
                }
                items.extend(outcome.added);
            }
        }
    }

    print_list(&items);
    Ok(())
}

fn print_list(items: &[ShoppingItem]) {
    if items.is_empty() {
        println!("The list is empty.");
        return;
    }
    println!("Shopping list ({} items):", items.len());
    for item in items {
        println!("  {}", item.display_line());
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> io::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Voice List starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Catalog
    let pipeline = if config.catalog.enabled {
        let catalog = match &config.catalog.catalog_path {
            Some(path) => GroceryCatalog::load_from(path),
            None => GroceryCatalog::load_or_builtin(),
        };
        log::info!("Catalog loaded: {} entries", catalog.len());
        ItemPipeline::new(
            Arc::new(catalog) as Arc<dyn CatalogLookup>,
            config.catalog.require_catalog_match,
        )
    } else {
        log::info!("Catalog disabled; item names pass through verbatim");
        ItemPipeline::without_catalog()
    };

    // 4–5. Interactive loop
    run_loop(&pipeline)
}
