use clap::{Parser, Subcommand};
use socialmap_chat::Result;
use socialmap_chat::commands::{ask, chat, refresh, show_status};
use socialmap_chat::config::{run_interactive_config, show_config};

#[derive(Parser)]
#[command(name = "socialmap-chat")]
#[command(about = "A retrieval-augmented chatbot over the Social Map Berlin listings")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure API endpoints and retrieval settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Fetch, embed, and cache the listings corpus
    Refresh {
        /// Rebuild even if a cached corpus exists
        #[arg(long)]
        force: bool,
    },
    /// Ask a single question
    Ask {
        /// The question to answer from the Social Map data
        question: String,
    },
    /// Start an interactive chat session
    Chat,
    /// Show configuration and embedding cache status
    Status,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Refresh { force } => {
            refresh(force)?;
        }
        Commands::Ask { question } => {
            ask(&question)?;
        }
        Commands::Chat => {
            chat()?;
        }
        Commands::Status => {
            show_status()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn cli_parsing() {
        let cli = Cli::try_parse_from(["socialmap-chat", "status"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            matches!(parsed.command, Commands::Status);
        }
    }

    #[test]
    fn ask_command_with_question() {
        let cli = Cli::try_parse_from(["socialmap-chat", "ask", "Wo bekomme ich Essen?"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Ask { question } = parsed.command {
                assert_eq!(question, "Wo bekomme ich Essen?");
            }
        }
    }

    #[test]
    fn refresh_force_flag() {
        let cli = Cli::try_parse_from(["socialmap-chat", "refresh", "--force"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Refresh { force } = parsed.command {
                assert!(force);
            }
        }
    }

    #[test]
    fn refresh_defaults_to_non_forced() {
        let cli = Cli::try_parse_from(["socialmap-chat", "refresh"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Refresh { force } = parsed.command {
                assert!(!force);
            }
        }
    }

    #[test]
    fn config_show_flag() {
        let cli = Cli::try_parse_from(["socialmap-chat", "config", "--show"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Config { show } = parsed.command {
                assert!(show);
            }
        }
    }

    #[test]
    fn invalid_command() {
        let cli = Cli::try_parse_from(["socialmap-chat", "invalid"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        }
    }
}
