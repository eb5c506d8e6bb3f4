use super::*;
use tempfile::TempDir;

#[test]
fn default_config() {
    let config = Config::default();
    assert_eq!(config.openai.api_base, "https://api.openai.com/v1");
    assert_eq!(config.openai.embedding_model, "text-embedding-ada-002");
    assert_eq!(config.openai.chat_model, "gpt-4o-mini");
    assert_eq!(config.openai.batch_size, 20);
    assert_eq!(
        config.retrieval.dataset_url,
        "https://public.socialmap-berlin.de/items"
    );
    assert_eq!(config.retrieval.top_k, 3);
    assert_eq!(config.retrieval.context_token_budget, 3000);
}

#[test]
fn config_validation() {
    let config = Config::default();
    assert!(config.validate().is_ok());

    let mut invalid_config = config.clone();
    invalid_config.openai.api_base = "not a url".to_string();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.openai.api_base = "ftp://api.example.com".to_string();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.openai.embedding_model = String::new();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.openai.batch_size = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.openai.batch_size = 1001;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.retrieval.top_k = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config;
    invalid_config.retrieval.context_token_budget = 1;
    assert!(invalid_config.validate().is_err());
}

#[test]
fn api_base_url_generation() {
    let config = Config::default();
    let url = config
        .openai
        .api_base_url()
        .expect("should generate API base url successfully");
    assert_eq!(url.as_str(), "https://api.openai.com/v1");
}

#[test]
fn toml_serialization() {
    let config = Config::default();
    let toml_str = toml::to_string(&config).expect("should serialize toml correctly");
    let parsed_config: Config = toml::from_str(&toml_str).expect("should parse toml correctly");
    assert_eq!(config, parsed_config);
}

#[test]
fn setter_validation() {
    let mut config = OpenAiConfig::default();

    assert!(config.set_api_base("http://localhost:8080/v1".to_string()).is_ok());
    assert!(config.set_embedding_model("text-embedding-3-small".to_string()).is_ok());
    assert!(config.set_chat_model("gpt-4o".to_string()).is_ok());
    assert!(config.set_batch_size(64).is_ok());

    assert!(config.set_api_base("not a url".to_string()).is_err());
    assert!(config.set_embedding_model(String::new()).is_err());
    assert!(config.set_chat_model("   ".to_string()).is_err());
    assert!(config.set_batch_size(0).is_err());
    assert!(config.set_batch_size(1001).is_err());
}

#[test]
fn load_missing_config_returns_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let config = Config::load(temp_dir.path()).expect("should load default config");
    assert_eq!(config.openai, OpenAiConfig::default());
    assert_eq!(config.retrieval, RetrievalConfig::default());
    assert_eq!(config.base_dir, temp_dir.path());
}

#[test]
fn save_and_reload_round_trip() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let mut config = Config {
        base_dir: temp_dir.path().to_path_buf(),
        ..Default::default()
    };
    config.openai.batch_size = 50;
    config.retrieval.top_k = 5;
    config.save().expect("should save config");

    let reloaded = Config::load(temp_dir.path()).expect("should reload config");
    assert_eq!(reloaded, config);
}

#[test]
fn load_rejects_invalid_persisted_config() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    std::fs::write(
        temp_dir.path().join("config.toml"),
        "[openai]\nbatch_size = 0\n",
    )
    .expect("should write config file");

    assert!(Config::load(temp_dir.path()).is_err());
}

#[test]
fn cache_paths_live_under_base_dir() {
    let config = Config {
        base_dir: PathBuf::from("/tmp/socialmap-test"),
        ..Default::default()
    };

    assert_eq!(
        config.cache_blob_path(),
        PathBuf::from("/tmp/socialmap-test/embeddings_cache.bin")
    );
    assert_eq!(
        config.cache_timestamp_path(),
        PathBuf::from("/tmp/socialmap-test/embeddings_timestamp.txt")
    );
}
