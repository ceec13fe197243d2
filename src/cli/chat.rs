// src/cli/chat.rs — Interactive design chat REPL

use std::path::Path;
use std::sync::Arc;

use base64::Engine;
use inquire::{CustomType, MultiSelect, Select};

use crate::agent::client::HttpDesignAgent;
use crate::auth::AuthStore;
use crate::core::turn::{RenderOutcome, TurnEngine, TurnOutcome};
use crate::flow::{Advance, FlowState, FlowStep, INSPIRATION_STYLES, ROOM_TYPES};
use crate::infra::config::Config;
use crate::infra::paths;
use crate::session::repository::SessionRepository;
use crate::session::store::FileKvStore;
use crate::session::{ChatSession, Product};
use crate::util::format_usd;

/// Mutable REPL state. One prompt is in flight at a time: the loop awaits
/// each turn before reading the next line, which is what guarantees the
/// single-writer-per-session ordering.
struct ChatState {
    current_session_id: String,
    /// Data-URL image attached to the next prompt (/image, or the intake
    /// flow's space photo for the first prompt).
    pending_image: Option<String>,
}

/// Run the interactive chat.
pub async fn run_chat(config: &Config, quiet: bool) -> anyhow::Result<()> {
    let repo = SessionRepository::new(Arc::new(FileKvStore::new(paths::sessions_dir())));
    let gallery = crate::gallery::GalleryManager::open(&paths::gallery_db_path())?;

    let auth = AuthStore::load().unwrap_or_default();
    let token = auth.bearer_token().ok();
    let backend = Arc::new(HttpDesignAgent::new(config.backend.clone(), token)?);
    let engine = TurnEngine::new(repo.clone(), gallery, backend);

    if !quiet {
        eprintln!(
            "decora v{} | {} | {} session(s)\n",
            env!("CARGO_PKG_VERSION"),
            config.backend.base_url,
            repo.all().len(),
        );
        if !auth.is_signed_in() {
            eprintln!("  Not signed in. Run `decora login` before chatting.\n");
        }
    }

    let mut flow = FlowState::new(config.flow.clone());

    // Resume the most recent session, or walk the intake flow for a first one.
    let mut state = match repo.all().into_iter().next() {
        Some(session) => {
            print_resume(&session);
            ChatState {
                current_session_id: session.session_id,
                pending_image: None,
            }
        }
        None => {
            let session = run_intake(&mut flow, &repo)?;
            print_welcome(&session);
            ChatState {
                current_session_id: session.session_id,
                pending_image: flow.space_image().map(str::to_string),
            }
        }
    };

    while let Some(input) = read_input() {
        let trimmed = input.trim();

        if trimmed == "quit" || trimmed == "exit" || trimmed == "/quit" {
            break;
        }

        if trimmed.starts_with('/') {
            if handle_slash_command(trimmed, &mut state, &mut flow, &engine, config).await? {
                break;
            }
            continue;
        }

        if trimmed.is_empty() {
            continue;
        }

        let image = state.pending_image.take();
        match engine
            .send_prompt(&state.current_session_id, trimmed, image)
            .await
        {
            Ok(TurnOutcome::Replied {
                assistant_text,
                products,
            }) => {
                println!("\n{assistant_text}\n");
                print_products(&products);
            }
            Ok(TurnOutcome::Discarded) => {
                eprintln!("  (response arrived for a closed session, ignored)");
            }
            Err(e) if e.is_auth() => {
                eprintln!("  Authentication required. Run `decora login` to sign in.");
            }
            Err(e) => {
                tracing::error!("Design agent call failed: {e}");
                eprintln!("  Sorry, something went wrong. Please try again.");
            }
        }
    }

    Ok(())
}

/// Walk the intake flow: room -> space photo -> inspiration -> budget.
/// Returns the freshly created session. Esc steps back one stage; Ctrl-C
/// aborts the intake.
fn run_intake(flow: &mut FlowState, repo: &SessionRepository) -> anyhow::Result<ChatSession> {
    use inquire::InquireError::OperationCanceled;

    flow.new_chat();

    loop {
        match flow.step() {
            FlowStep::RoomSelection => {
                let labels: Vec<String> = ROOM_TYPES
                    .iter()
                    .map(|r| format!("{:<16} {}", r.name, r.description))
                    .collect();
                match Select::new("What are we designing?", labels).raw_prompt() {
                    Ok(choice) => {
                        flow.select_room(ROOM_TYPES[choice.index].name)?;
                    }
                    Err(OperationCanceled) => continue, // nowhere to go back to; re-ask
                    Err(e) => return Err(e.into()),
                }
            }
            FlowStep::SpaceUpload => {
                let path = match inquire::Text::new("Photo of your space (path):").prompt() {
                    Ok(path) => path,
                    Err(OperationCanceled) => {
                        flow.back();
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                };
                match read_image_as_data_url(Path::new(path.trim())) {
                    Ok(data_url) => {
                        flow.attach_space_image(data_url);
                        flow.next(repo)?;
                    }
                    Err(e) => eprintln!("  Could not read that image: {e}"),
                }
            }
            FlowStep::Inspiration => {
                let options: Vec<&str> = INSPIRATION_STYLES.to_vec();
                match MultiSelect::new("Pick inspiration styles (optional):", options)
                    .raw_prompt()
                {
                    Ok(selection) => {
                        for item in selection {
                            flow.toggle_inspiration(item.index);
                        }
                        flow.next(repo)?;
                    }
                    Err(OperationCanceled) => {
                        flow.back();
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            FlowStep::Budget => {
                let amount = match CustomType::<u32>::new("What's your budget (USD)?")
                    .with_default(flow.budget())
                    .with_help_message("300 minimum; enter any amount")
                    .prompt()
                {
                    Ok(amount) => amount,
                    Err(OperationCanceled) => {
                        flow.back();
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                };
                flow.set_budget(amount);
                if let Advance::ChatReady(session) = flow.next(repo)? {
                    return Ok(session);
                }
            }
            FlowStep::Chat => {
                // Steady state is handled by the REPL; restart the intake.
                flow.new_chat();
            }
        }
    }
}

async fn handle_slash_command(
    input: &str,
    state: &mut ChatState,
    flow: &mut FlowState,
    engine: &TurnEngine,
    config: &Config,
) -> anyhow::Result<bool> {
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/new" => {
            let session = run_intake(flow, engine.repo())?;
            state.pending_image = flow.space_image().map(str::to_string);
            state.current_session_id = session.session_id.clone();
            print_welcome(&session);
        }

        "/sessions" => {
            let sessions = engine.repo().all();
            let labels: Vec<String> = sessions
                .iter()
                .map(|s| {
                    format!(
                        "{} ({} messages, {})",
                        s.title,
                        s.conversation.len(),
                        s.created_at.format("%Y-%m-%d")
                    )
                })
                .collect();
            if let Ok(choice) = Select::new("Switch to:", labels).raw_prompt() {
                state.current_session_id = sessions[choice.index].session_id.clone();
                state.pending_image = None;
                print_resume(&sessions[choice.index]);
            }
        }

        "/delete" => {
            engine.delete_session(&state.current_session_id);
            match engine.repo().all().into_iter().next() {
                Some(session) => {
                    state.current_session_id = session.session_id.clone();
                    print_resume(&session);
                }
                None => {
                    let session = run_intake(flow, engine.repo())?;
                    state.pending_image = flow.space_image().map(str::to_string);
                    state.current_session_id = session.session_id.clone();
                    print_welcome(&session);
                }
            }
        }

        "/clear" => {
            engine.clear_all();
            let session = run_intake(flow, engine.repo())?;
            state.pending_image = flow.space_image().map(str::to_string);
            state.current_session_id = session.session_id.clone();
            print_welcome(&session);
        }

        "/image" => {
            if arg.is_empty() {
                eprintln!("  Usage: /image <path>");
            } else {
                match read_image_as_data_url(Path::new(arg)) {
                    Ok(data_url) => {
                        state.pending_image = Some(data_url);
                        eprintln!("  Image attached to your next message.");
                    }
                    Err(e) => eprintln!("  Could not read that image: {e}"),
                }
            }
        }

        "/render" => {
            let Some(session) = engine.repo().get(&state.current_session_id) else {
                eprintln!("  Current session is gone; use /new.");
                return Ok(false);
            };
            let references = default_reference_images(session.products.as_deref());
            if references.is_empty() {
                eprintln!("  No recommended products yet. Ask for product ideas first.");
                return Ok(false);
            }
            eprintln!(
                "  Generating a furnished-room render from {} product(s)... \
                 this can take 30-60 seconds.",
                references.len()
            );
            match engine.render(&state.current_session_id, &references).await {
                Ok(RenderOutcome::Rendered(render)) => {
                    let durability = if render.durable {
                        "saved to gallery"
                    } else {
                        "kept in memory only (gallery unavailable)"
                    };
                    println!("\n  Render #{} ready ({durability}).", render.id);
                    println!(
                        "  Export it with: decora gallery export {} --output room.png\n",
                        render.id
                    );
                }
                Ok(RenderOutcome::Discarded) => {
                    eprintln!("  (render arrived for a closed session, ignored)");
                }
                Err(e) if e.is_auth() => {
                    eprintln!("  Authentication required. Run `decora login` to sign in.");
                }
                Err(e) => {
                    tracing::error!("Render failed: {e}");
                    eprintln!("  Sorry, something went wrong. Please try again.");
                }
            }
        }

        "/gallery" => {
            match engine
                .gallery()
                .store
                .images_by_session(&state.current_session_id)
            {
                Ok(renders) if renders.is_empty() => eprintln!("  No renders yet."),
                Ok(renders) => {
                    eprintln!("  Renders for this session:");
                    for render in renders {
                        eprintln!(
                            "    #{} - {} ({} KiB)",
                            render.id,
                            render.created_at,
                            render.base64_image.len() / 1024,
                        );
                    }
                }
                Err(e) => eprintln!("  Gallery unavailable: {e}"),
            }
        }

        "/budget" => {
            eprintln!(
                "  Intake budget: {} ({})",
                format_usd(flow.budget()),
                crate::flow::budget_range_label(flow.budget(), &config.flow),
            );
        }

        "/help" => {
            eprintln!("Slash commands:");
            eprintln!("  /new               Start a new chat (runs the intake flow)");
            eprintln!("  /sessions          Switch between saved sessions");
            eprintln!("  /delete            Delete the current session and its renders");
            eprintln!("  /clear             Delete every session and render");
            eprintln!("  /image <path>      Attach a photo to your next message");
            eprintln!("  /render            Generate a furnished-room image from products");
            eprintln!("  /gallery           List renders for this session");
            eprintln!("  /budget            Show the intake budget");
            eprintln!("  /help              Show this help");
            eprintln!("  /quit, quit, exit  Leave");
        }

        _ => {
            eprintln!("Unknown command: {cmd}. Type /help for commands.");
        }
    }

    Ok(false)
}

/// Default reference selection: the first purchasable option of every
/// product that has one.
fn default_reference_images(products: Option<&[Product]>) -> Vec<String> {
    products
        .unwrap_or_default()
        .iter()
        .filter_map(|p| p.shopping_search.shopping_results.first())
        .map(|item| item.thumbnail.clone())
        .collect()
}

fn print_welcome(session: &ChatSession) {
    if let Some(entry) = session.conversation.first() {
        println!("\n{}\n", entry.content.display_text());
    }
}

fn print_resume(session: &ChatSession) {
    eprintln!(
        "  Resuming \"{}\" ({} messages).",
        session.title,
        session.conversation.len()
    );
}

fn print_products(products: &[Product]) {
    let selectable: Vec<&Product> = products.iter().filter(|p| p.has_results()).collect();
    if selectable.is_empty() {
        return;
    }
    println!("  Recommended products:");
    for (i, product) in selectable.iter().enumerate() {
        let name = product.name.as_deref().unwrap_or("Product");
        println!(
            "    {}. {} ({} options)",
            i + 1,
            name,
            product.shopping_search.shopping_results.len()
        );
        for item in product.shopping_search.shopping_results.iter().take(3) {
            println!("       {} - {} <{}>", item.name, item.price, item.link);
        }
    }
    println!("  Generate a furnished-room image with /render.\n");
}

/// Read an image file and wrap it as a data URL for the backend.
fn read_image_as_data_url(path: &Path) -> anyhow::Result<String> {
    let bytes = std::fs::read(path)?;
    let mime = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/png",
    };
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:{mime};base64,{encoded}"))
}

fn read_input() -> Option<String> {
    use std::io::{self, BufRead, Write};

    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();
    let mut line = String::new();
    match stdin.lock().read_line(&mut line) {
        Ok(0) => None, // EOF
        Ok(_) => Some(line),
        Err(_) => None,
    }
}
