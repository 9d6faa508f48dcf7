use config::{Config, ConfigError, Environment, File, FileFormat};
use once_cell::sync::OnceCell;
use std::env;
use std::path::PathBuf;
use tracing::debug;

pub mod models;
pub use models::*;

/// Prefix for environment overrides, e.g. `STUDYPLAN_SCHEDULING__DEFAULT_YEAR=2026`.
pub const ENV_PREFIX: &str = "STUDYPLAN";

/// Loads the application configuration.
///
/// Sources, later ones winning:
/// 1. `{config_dir}/default.toml`
/// 2. `{config_dir}/{RUN_ENV}.toml` (`RUN_ENV` defaults to `debug`)
/// 3. environment variables prefixed with `STUDYPLAN_`, nested keys separated by `__`
///
/// Both files are optional; every field has a default, so an empty setup yields
/// a usable `AppConfig`. `config_dir` is `STUDYPLAN_CONFIG_DIR` or `./config`.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let config_dir = env::var("STUDYPLAN_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));

    let default_path = config_dir.join("default");
    let env_path = config_dir.join(&run_env);

    debug!(
        "Loading config from {} and {}",
        default_path.display(),
        env_path.display()
    );

    let builder = Config::builder()
        .add_source(File::from(default_path).required(false))
        .add_source(File::from(env_path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );

    builder.build()?.try_deserialize()
}

/// Parses a TOML document into an `AppConfig`, filling in defaults.
pub fn load_config_from_toml(toml: &str) -> Result<AppConfig, ConfigError> {
    Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?
        .try_deserialize()
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the dotenv file into the process environment, once.
///
/// `DOTENV_OVERRIDE` selects the file, otherwise `.env` is used. A missing
/// file is not an error. Returns the path that was consulted.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = std::env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = load_config_from_toml("").expect("empty config should parse");

        assert_eq!(config.server.port, 8086);
        assert_eq!(config.gcal.provider, ProviderKind::Google);
        assert_eq!(config.scheduling.default_time_zone, "Asia/Jakarta");
        assert_eq!(config.scheduling.default_year, 2025);
        assert_eq!(config.scheduling.business_hours, [9, 17]);
        assert_eq!(config.scheduling.overlap_check, OverlapCheck::StartOnly);
        assert_eq!(
            config.scheduling.on_busy_query_failure,
            BusyQueryFailurePolicy::TreatAsFree
        );
        assert_eq!(config.store.event_page_size, 250);
        assert_eq!(
            config.store.on_delete_failure,
            DeleteFailurePolicy::ReportBoolean
        );
    }

    #[test]
    fn policies_are_read_in_snake_case() {
        let config = load_config_from_toml(
            r#"
            [gcal]
            provider = "memory"

            [scheduling]
            overlap_check = "full_span"
            on_busy_query_failure = "propagate"
            business_hours = [8, 20]

            [store]
            on_delete_failure = "propagate"
            event_capacity = 5
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.gcal.provider, ProviderKind::Memory);
        assert_eq!(config.scheduling.overlap_check, OverlapCheck::FullSpan);
        assert_eq!(
            config.scheduling.on_busy_query_failure,
            BusyQueryFailurePolicy::Propagate
        );
        assert_eq!(config.scheduling.business_hours, [8, 20]);
        assert_eq!(config.store.on_delete_failure, DeleteFailurePolicy::Propagate);
        assert_eq!(config.store.event_capacity, 5);
        // untouched sections keep their defaults
        assert_eq!(config.store.calendar_capacity, 200);
    }

    #[test]
    fn shipped_default_file_matches_the_defaults() {
        let config = load_config_from_toml(include_str!("../../../config/default.toml"))
            .expect("config/default.toml should parse");
        let defaults = AppConfig::default();

        assert_eq!(config.gcal.provider, defaults.gcal.provider);
        assert_eq!(config.scheduling.days_before, defaults.scheduling.days_before);
        assert_eq!(config.store.event_page_size, defaults.store.event_page_size);
        assert_eq!(config.server.port, defaults.server.port);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let result = load_config_from_toml(
            r#"
            [scheduling]
            overlap_check = "sometimes"
            "#,
        );
        assert!(result.is_err());
    }
}
