
use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input};

use super::settings::resolve_api_key;
use super::{Config, ConfigError, OpenAiConfig, RetrievalConfig};

#[inline]
pub fn run_interactive_config() -> Result<()> {
    eprintln!(
        "{}",
        style("🔧 Social Map Chatbot Configuration Setup").bold().cyan()
    );
    eprintln!();

    let mut config = load_existing_config()?;

    eprintln!("{}", style("OpenAI Configuration").bold().yellow());
    eprintln!("Configure the embedding and completion endpoints.");
    eprintln!();

    configure_openai(&mut config.openai)?;

    eprintln!();
    eprintln!("{}", style("Retrieval Configuration").bold().yellow());
    configure_retrieval(&mut config.retrieval)?;

    eprintln!();
    eprintln!("{}", style("Testing configuration...").yellow());

    if resolve_api_key().is_err() {
        eprintln!(
            "{}",
            style("⚠ Warning: OPENAI_API_KEY is not set").yellow()
        );
        eprintln!("You can continue, but embedding and chat calls will fail without it.");
    } else if test_api_connection(&config.openai) {
        eprintln!("{}", style("✓ API endpoint reachable!").green());
    } else {
        eprintln!(
            "{}",
            style("⚠ Warning: Could not reach the API endpoint").yellow()
        );
        eprintln!("You can continue, but make sure the endpoint is reachable before refreshing.");
    }

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config() -> Result<()> {
    let config_dir = super::get_config_dir()?;
    let config = Config::load(&config_dir).context("Failed to load configuration")?;

    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("OpenAI Settings:").bold().yellow());
    eprintln!("  API Base: {}", style(&config.openai.api_base).cyan());
    eprintln!(
        "  Embedding Model: {}",
        style(&config.openai.embedding_model).cyan()
    );
    eprintln!("  Chat Model: {}", style(&config.openai.chat_model).cyan());
    eprintln!("  Batch Size: {}", style(config.openai.batch_size).cyan());
    eprintln!(
        "  API Key: {}",
        if resolve_api_key().is_ok() {
            style("set (from environment)").green()
        } else {
            style("missing").red()
        }
    );

    eprintln!();
    eprintln!("{}", style("Retrieval Settings:").bold().yellow());
    eprintln!(
        "  Dataset URL: {}",
        style(&config.retrieval.dataset_url).cyan()
    );
    eprintln!("  Top K: {}", style(config.retrieval.top_k).cyan());
    eprintln!(
        "  Context Token Budget: {}",
        style(config.retrieval.context_token_budget).cyan()
    );

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );

    Ok(())
}

fn load_existing_config() -> Result<Config> {
    let config_dir = super::get_config_dir()?;
    Config::load(&config_dir).map_or_else(
        |_| {
            eprintln!(
                "{}",
                style("No existing configuration found. Using defaults.").yellow()
            );
            Ok(Config {
                base_dir: config_dir.clone(),
                ..Default::default()
            })
        },
        |config| {
            eprintln!("{}", style("Found existing configuration.").green());
            Ok(config)
        },
    )
}

fn configure_openai(openai: &mut OpenAiConfig) -> Result<()> {
    let api_base: String = Input::new()
        .with_prompt("API base URL")
        .default(openai.api_base.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            let temp_config = OpenAiConfig {
                api_base: input.clone(),
                ..OpenAiConfig::default()
            };
            temp_config.validate()?;
            Ok(())
        })
        .interact_text()?;

    let embedding_model: String = Input::new()
        .with_prompt("Embedding model")
        .default(openai.embedding_model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let chat_model: String = Input::new()
        .with_prompt("Chat model")
        .default(openai.chat_model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let batch_size: u32 = Input::new()
        .with_prompt("Batch size for embedding generation")
        .default(openai.batch_size)
        .validate_with(|input: &u32| -> Result<(), &str> {
            if *input == 0 {
                Err("Batch size must be greater than 0")
            } else if *input > 1000 {
                Err("Batch size must be 1000 or less")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    openai.set_api_base(api_base)?;
    openai.set_embedding_model(embedding_model)?;
    openai.set_chat_model(chat_model)?;
    openai.set_batch_size(batch_size)?;

    Ok(())
}

fn configure_retrieval(retrieval: &mut RetrievalConfig) -> Result<()> {
    let dataset_url: String = Input::new()
        .with_prompt("Dataset URL")
        .default(retrieval.dataset_url.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if url::Url::parse(input).is_ok() {
                Ok(())
            } else {
                Err("Must be a valid URL")
            }
        })
        .interact_text()?;

    let top_k: usize = Input::new()
        .with_prompt("Number of context texts to retrieve (top_k)")
        .default(retrieval.top_k)
        .validate_with(|input: &usize| -> Result<(), &str> {
            if *input == 0 || *input > 50 {
                Err("top_k must be between 1 and 50")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    retrieval.dataset_url = dataset_url;
    retrieval.top_k = top_k;
    retrieval.validate()?;

    Ok(())
}

fn test_api_connection(openai: &OpenAiConfig) -> bool {
    let Ok(base) = openai.api_base_url() else {
        return false;
    };
    let url = format!("{}/models", base.as_str().trim_end_matches('/'));

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(std::time::Duration::from_secs(5)))
        .build()
        .into();

    match agent.get(&url).call() {
        Ok(_) => true,
        // An auth rejection still proves the endpoint is reachable.
        Err(ureq::Error::StatusCode(code)) if (400..500).contains(&code) => true,
        Err(_) => false,
    }
}
