#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub tmdb_api_key: String,
    pub tmdb_base_url: String,
    pub tmdb_image_base_url: String,
    pub tmdb_rps: u32,
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://cinelog.db?mode=rwc".to_string(),
            tmdb_api_key: String::new(),
            tmdb_base_url: "https://api.themoviedb.org/3".to_string(),
            tmdb_image_base_url: "https://image.tmdb.org/t/p/w500".to_string(),
            tmdb_rps: 4,
            http_timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Ok(Self::from_lookup(|key| std::env::var(key).ok()))
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let database_url = get("DATABASE_URL").unwrap_or(defaults.database_url);
        let tmdb_api_key = get("TMDB_API_KEY").unwrap_or(defaults.tmdb_api_key);
        let tmdb_base_url = get("TMDB_BASE_URL").unwrap_or(defaults.tmdb_base_url);
        let tmdb_image_base_url =
            get("TMDB_IMAGE_BASE_URL").unwrap_or(defaults.tmdb_image_base_url);

        let tmdb_rps: u32 = get("TMDB_RPS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.tmdb_rps)
            .max(1);

        let http_timeout_secs: u64 = get("HTTP_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.http_timeout_secs);

        Self {
            database_url,
            tmdb_api_key,
            tmdb_base_url,
            tmdb_image_base_url,
            tmdb_rps,
            http_timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn falls_back_to_defaults() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config.database_url, "sqlite://cinelog.db?mode=rwc");
        assert_eq!(config.tmdb_base_url, "https://api.themoviedb.org/3");
        assert_eq!(config.tmdb_rps, 4);
        assert!(config.tmdb_api_key.is_empty());
    }

    #[test]
    fn reads_overrides_and_ignores_garbage_numbers() {
        let config = Config::from_lookup(lookup(&[
            ("TMDB_API_KEY", "secret"),
            ("TMDB_RPS", "0"),
            ("HTTP_TIMEOUT_SECS", "soon"),
        ]));
        assert_eq!(config.tmdb_api_key, "secret");
        assert_eq!(config.tmdb_rps, 1);
        assert_eq!(config.http_timeout_secs, 30);
    }
}
