use {
    std::{env, fs::read_to_string, path::Path},
    tracing::warn,
    serde::Deserialize,
};

#[derive(Deserialize, Debug, Default)]
pub struct Config {
    youtube: Option<YoutubeConfig>,
    pipeline: Option<PipelineConfig>,
    scorer: Option<ScorerConfig>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct YoutubeConfig {
    api_key: Option<String>,
    request_timeout_secs: Option<u64>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct PipelineConfig {
    include_replies: Option<bool>,
    top: Option<usize>,
    max_comment_len: Option<usize>,
    max_chunk_size: Option<usize>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct ScorerConfig {
    neutral_threshold: Option<f64>,
}

impl Config {
    pub fn load() -> Self {
        read_to_string("./config.toml")
            .or_else(|_| read_to_string("/config/config.toml"))
            .map_err(|err| err.to_string())
            .and_then(|v| toml::from_str(&v).map_err(|err| err.to_string()))
            .unwrap_or_else(|err| {
                warn!("failed to read config: {}", err);
                Config::default()
            })
    }

    pub fn load_from(path: &Path) -> Self {
        read_to_string(path)
            .map_err(|err| err.to_string())
            .and_then(|v| toml::from_str(&v).map_err(|err| err.to_string()))
            .unwrap_or_else(|err| {
                warn!("failed to read config from {}: {}", path.display(), err);
                Config::default()
            })
    }

    pub fn youtube(&self) -> YoutubeConfig {
        self.youtube.as_ref().cloned().unwrap_or_default()
    }

    pub fn pipeline(&self) -> PipelineConfig {
        self.pipeline.as_ref().cloned().unwrap_or_default()
    }

    pub fn scorer(&self) -> ScorerConfig {
        self.scorer.as_ref().cloned().unwrap_or_default()
    }
}

impl YoutubeConfig {
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .as_ref()
            .cloned()
            .or_else(|| env::var("YOUTUBE_API_KEY").ok())
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs.unwrap_or(30)
    }
}

impl PipelineConfig {
    pub fn include_replies(&self) -> bool {
        self.include_replies.unwrap_or(false)
    }

    pub fn top(&self) -> usize {
        self.top.unwrap_or(20)
    }

    pub fn max_comment_len(&self) -> usize {
        self.max_comment_len.unwrap_or(250)
    }

    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size.unwrap_or(4096)
    }
}

impl ScorerConfig {
    pub fn neutral_threshold(&self) -> Option<f64> {
        self.neutral_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config: Config = toml::from_str(
            r#"
            [youtube]
            api_key = "k"
            request_timeout_secs = 5

            [pipeline]
            include_replies = true
            top = 40
            max_comment_len = 100
            max_chunk_size = 2048

            [scorer]
            neutral_threshold = 0.6
            "#,
        )
        .unwrap();

        assert_eq!(config.youtube().api_key().as_deref(), Some("k"));
        assert_eq!(config.youtube().request_timeout_secs(), 5);
        assert!(config.pipeline().include_replies());
        assert_eq!(config.pipeline().top(), 40);
        assert_eq!(config.pipeline().max_comment_len(), 100);
        assert_eq!(config.pipeline().max_chunk_size(), 2048);
        assert_eq!(config.scorer().neutral_threshold(), Some(0.6));
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.youtube().request_timeout_secs(), 30);
        assert!(!config.pipeline().include_replies());
        assert_eq!(config.pipeline().top(), 20);
        assert_eq!(config.pipeline().max_comment_len(), 250);
        assert_eq!(config.pipeline().max_chunk_size(), 4096);
        assert_eq!(config.scorer().neutral_threshold(), None);
    }
}
