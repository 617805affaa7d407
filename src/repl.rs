use anyhow::Result;
use picker_core::catalog::Catalog;
use picker_core::chat;
use picker_core::config::AppConfig;
use picker_core::conversation::EntryKind;
use picker_core::session::PickerSession;
use picker_server::AppState;
use rustyline::error::ReadlineError;
use rustyline::{Config as RlConfig, DefaultEditor};

const BANNER: &str = r#"
  ╔═══════════════════════════════════════════╗
  ║          beauty-picker v0.1.0             ║
  ║   Product picker & routine assistant      ║
  ╚═══════════════════════════════════════════╝

  Type a question and press Enter to chat.
  Commands:
    /categories        — List product categories
    /filter <category> — Show one category
    /products          — Show the current product list
    /toggle <name>     — Select or unselect a product
    /remove <name>     — Unselect a product
    /selected          — Show selected products
    /clear             — Clear the selection
    /routine           — Generate a routine for the selection
    /help              — Show this help
    /exit              — Quit
"#;

/// Run the interactive REPL.
pub async fn run(config: AppConfig) -> Result<()> {
    println!("{}", BANNER);
    println!(
        "  Model: {}  |  Endpoint: {}",
        config.assistant.model, config.assistant.endpoint
    );
    println!();

    let state = AppState::new(config).await?;
    {
        let session = state.session.read().await;
        if session.view().is_some() {
            print_products(&session);
        }
    }

    let rl_config = RlConfig::builder().auto_add_history(true).build();
    let history_path = AppConfig::data_dir().join("repl_history.txt");
    let mut rl = DefaultEditor::with_config(rl_config)?;
    let _ = rl.load_history(&history_path);

    loop {
        let selected = state.session.read().await.selection().len();
        let prompt = format!("\x1b[1;36m{} selected\x1b[0m \x1b[1;32m❯\x1b[0m ", selected);

        match rl.readline(&prompt) {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }

                let seen = state.session.read().await.transcript().len();

                if input.starts_with('/') {
                    let handled = handle_command(input, &state).await;
                    if !handled {
                        break; // /exit
                    }
                } else {
                    chat::submit_chat(&state.session, state.assistant.as_ref(), input).await;
                }

                print_transcript_since(&*state.session.read().await, seen);
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(e) => {
                eprintln!("Input error: {}", e);
                break;
            }
        }
    }

    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let _ = rl.save_history(&history_path);

    Ok(())
}

/// Handle a slash command. Returns `true` to continue the loop, `false` to exit.
/// Failures are printed; none of them end the session.
async fn handle_command(input: &str, state: &AppState) -> bool {
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/exit" | "/quit" | "/q" => {
            println!("Goodbye!");
            return false;
        }
        "/categories" | "/cats" => {
            let session = state.session.read().await;
            let categories = session.catalog().categories();
            if categories.is_empty() {
                println!("  No products loaded.");
            }
            for category in categories {
                println!("  • {}", category);
            }
        }
        "/filter" => {
            if arg.is_empty() {
                println!("Usage: /filter <category>");
            } else {
                match state.catalog_source.load().await {
                    Ok(products) => {
                        let mut session = state.session.write().await;
                        session.apply_filter(arg, Catalog::new(products));
                        print_products(&session);
                    }
                    Err(e) => {
                        print_error("Failed to load products", &e);
                    }
                }
            }
        }
        "/products" | "/ls" => {
            print_products(&*state.session.read().await);
        }
        "/toggle" | "/t" => {
            if arg.is_empty() {
                println!("Usage: /toggle <product name>");
            } else {
                match state.session.write().await.toggle(arg) {
                    Ok(true) => println!("  Selected {}", arg),
                    Ok(false) => println!("  Unselected {}", arg),
                    Err(e) => print_error("Failed to save selection", &e),
                }
            }
        }
        "/remove" | "/rm" => {
            if arg.is_empty() {
                println!("Usage: /remove <product name>");
            } else {
                match state.session.write().await.remove(arg) {
                    Ok(true) => println!("  Removed {}", arg),
                    Ok(false) => println!("  {} was not selected", arg),
                    Err(e) => print_error("Failed to save selection", &e),
                }
            }
        }
        "/selected" => {
            print_tray(&*state.session.read().await);
        }
        "/clear" => {
            match state.session.write().await.clear() {
                Ok(()) => println!("Cleared selection."),
                Err(e) => print_error("Failed to clear selection", &e),
            }
        }
        "/routine" => {
            if let Err(e) = chat::generate_routine(&state.session, state.assistant.as_ref()).await {
                print_error("Failed to build routine request", &e);
            }
        }
        "/help" | "/?" => {
            println!("{}", BANNER.trim_start_matches('\n'));
        }
        _ => {
            println!(
                "Unknown command: {}. Type /help for available commands.",
                cmd
            );
        }
    }

    true
}

fn print_error(context: &str, err: &dyn std::fmt::Display) {
    eprintln!("\x1b[0;31m{}: {}\x1b[0m", context, err);
}

fn print_products(session: &PickerSession) {
    match session.view() {
        None => println!("  Select a category to view products (/categories, /filter)."),
        Some([]) => println!("  No products in this view."),
        Some(products) => {
            for product in products {
                let marker = if session.selection().contains(&product.name) {
                    "\x1b[1;32m[x]\x1b[0m"
                } else {
                    "[ ]"
                };
                println!("  {} {} — {}", marker, product.name, product.brand);
            }
        }
    }
}

fn print_tray(session: &PickerSession) {
    let tray = session.tray();
    if tray.is_empty() {
        println!("  No products selected.");
        return;
    }
    for product in tray {
        if product.brand.is_empty() {
            println!("  • {}", product.name);
        } else {
            println!("  • {} — {}", product.name, product.brand);
        }
    }
}

fn print_transcript_since(session: &PickerSession, seen: usize) {
    for entry in session.transcript().entries().iter().skip(seen) {
        match entry.kind {
            // The prompt line already shows what the user typed.
            EntryKind::User | EntryKind::Pending => {}
            EntryKind::Error => println!("\x1b[0;31m{}\x1b[0m", entry.text),
            EntryKind::Notice => println!("\x1b[1;33m{}\x1b[0m", entry.text),
            EntryKind::Assistant | EntryKind::Routine => {
                let label = entry.kind.label().unwrap_or_default();
                println!("\x1b[1;33m{}\x1b[0m {}", label, entry.text);
            }
        }
    }
}
