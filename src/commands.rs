use anyhow::{Context, Result};
use console::style;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::chat::{Role, Session};
use crate::config::settings::resolve_api_key;
use crate::config::{Config, get_config_dir};
use crate::pipeline::{Chatbot, CorpusState};

fn load_chatbot() -> Result<Chatbot> {
    let config_dir = get_config_dir()?;
    let config = Config::load(&config_dir).context("Failed to load configuration")?;
    let api_key = resolve_api_key()?;
    let chatbot = Chatbot::new(&config, api_key)?;
    Ok(chatbot)
}

fn load_corpus_with_progress(chatbot: &Chatbot, force: bool) -> Result<CorpusState> {
    let bar = ProgressBar::new(100).with_style(
        ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {percent}%")
            .expect("progress template is valid")
            .progress_chars("=> "),
    );
    bar.set_message("Embedding listings");

    let state = chatbot.load_corpus(force, |fraction| {
        bar.set_position((fraction * 100.0) as u64);
    })?;
    bar.finish_and_clear();

    Ok(state)
}

/// Ensure the embedded corpus exists, rebuilding it when `force` is set.
#[inline]
pub fn refresh(force: bool) -> Result<()> {
    let chatbot = load_chatbot()?;

    info!("Refreshing embeddings (force={})", force);
    let state = load_corpus_with_progress(&chatbot, force)?;

    println!(
        "✅ Embeddings ready: {} listings (last updated {})",
        state.texts.len(),
        state.timestamp
    );

    Ok(())
}

/// Answer a single question against the current corpus.
#[inline]
pub fn ask(question: &str) -> Result<()> {
    let chatbot = load_chatbot()?;
    let state = load_corpus_with_progress(&chatbot, false)?;

    let answer = chatbot.answer(&state, question)?;
    println!("{}", answer);

    Ok(())
}

/// Interactive chat loop. Each exchange is independent; only the transcript
/// accumulates. A failed exchange is reported and the loop continues so the
/// user can simply retry.
#[inline]
pub fn chat() -> Result<()> {
    let chatbot = load_chatbot()?;
    let state = load_corpus_with_progress(&chatbot, false)?;

    println!(
        "💬 Social Map Chatbot ({} listings, embeddings from {})",
        state.texts.len(),
        state.timestamp
    );
    println!("Leere Eingabe beendet den Chat.");
    println!();

    let mut session = Session::new();

    loop {
        let question: String = Input::new()
            .with_prompt("Du")
            .allow_empty(true)
            .interact_text()?;
        if question.trim().is_empty() {
            break;
        }

        session.push_user(question.clone());

        match chatbot.answer(&state, &question) {
            Ok(answer) => {
                println!("{} {}", style("Chatbot:").bold().magenta(), answer);
                println!();
                session.push_bot(answer);
            }
            Err(e) => {
                eprintln!("{} {}", style("Fehler:").bold().red(), e);
                eprintln!("Bitte versuche es erneut.");
                eprintln!();
            }
        }
    }

    let exchanges = session
        .turns()
        .iter()
        .filter(|turn| turn.role == Role::User)
        .count();
    println!("Auf Wiedersehen! ({} Fragen in dieser Sitzung)", exchanges);

    Ok(())
}

/// Show configuration, cache, and corpus status.
#[inline]
pub fn show_status() -> Result<()> {
    let config_dir = get_config_dir()?;
    let config = Config::load(&config_dir).unwrap_or_default();

    println!("📊 Social Map Chatbot Status");
    println!("{}", "=".repeat(50));
    println!();

    println!("🤖 OpenAI Settings:");
    println!("   API Base: {}", config.openai.api_base);
    println!("   Embedding Model: {}", config.openai.embedding_model);
    println!("   Chat Model: {}", config.openai.chat_model);
    println!("   Batch Size: {}", config.openai.batch_size);
    match resolve_api_key() {
        Ok(_) => println!("   ✅ API Key: set"),
        Err(e) => println!("   ❌ API Key: {}", e),
    }

    println!();
    println!("🔍 Retrieval Settings:");
    println!("   Dataset URL: {}", config.retrieval.dataset_url);
    println!("   Top K: {}", config.retrieval.top_k);
    println!(
        "   Context Token Budget: {}",
        config.retrieval.context_token_budget
    );

    println!();
    println!("💾 Embedding Cache:");
    // Inspecting the cache needs no API key; read the store directly.
    let store = crate::cache::CacheStore::new(
        config.cache_blob_path(),
        config.cache_timestamp_path(),
    );
    match store.probe() {
        crate::cache::CacheProbe::Fresh => match store.load() {
            Ok((record, timestamp)) => {
                println!("   ✅ Cached corpus: {} listings", record.texts.len());
                println!("   🕒 Last updated: {}", timestamp);
            }
            Err(e) => {
                println!("   ❌ Cache unreadable: {}", e);
                println!("   Use 'socialmap-chat refresh --force' to rebuild it.");
            }
        },
        crate::cache::CacheProbe::Missing => {
            println!("   📭 No cached corpus yet");
            println!("   Use 'socialmap-chat refresh' to build it.");
        }
    }

    println!();
    println!("💡 Next Steps:");
    println!("   • Use 'socialmap-chat refresh --force' to re-embed the dataset");
    println!("   • Use 'socialmap-chat ask <frage>' for a one-off question");
    println!("   • Use 'socialmap-chat chat' for an interactive session");

    Ok(())
}
