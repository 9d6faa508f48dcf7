// --- File: crates/studyplan_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8086
}

// --- Logging Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

// --- Google Calendar Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Google Calendar v3 through a service account.
    #[default]
    Google,
    /// Process-local calendar, useful offline and in tests.
    Memory,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GcalConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    pub key_path: Option<String>, // service account JSON, required for the google provider
}

// --- Scheduling Config ---
/// How a study slot candidate is tested against busy intervals.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverlapCheck {
    /// Only the candidate start instant must lie outside every busy interval.
    /// A slot may still run into a busy interval that begins mid-slot.
    #[default]
    StartOnly,
    /// The whole candidate span must be disjoint from every busy interval.
    FullSpan,
}

/// What the busy index reports when the free/busy query fails.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BusyQueryFailurePolicy {
    /// Return an empty busy set: the window is assumed free.
    #[default]
    TreatAsFree,
    Propagate,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchedulingConfig {
    /// IANA zone attached to timed events that arrive without one.
    #[serde(default = "default_time_zone")]
    pub default_time_zone: String,
    /// Year used when a date is inferred from text without a year.
    #[serde(default = "default_year")]
    pub default_year: i32,
    /// Zone in which business hours are evaluated.
    #[serde(default = "default_slot_time_zone")]
    pub slot_time_zone: String,
    #[serde(default = "default_slot_duration_hours")]
    pub slot_duration_hours: i64,
    #[serde(default = "default_step_minutes")]
    pub step_minutes: i64,
    /// Inclusive `[first, last]` hour of day a slot may start in.
    #[serde(default = "default_business_hours")]
    pub business_hours: [u32; 2],
    #[serde(default = "default_days_before")]
    pub days_before: i64,
    #[serde(default)]
    pub overlap_check: OverlapCheck,
    #[serde(default)]
    pub on_busy_query_failure: BusyQueryFailurePolicy,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            default_time_zone: default_time_zone(),
            default_year: default_year(),
            slot_time_zone: default_slot_time_zone(),
            slot_duration_hours: default_slot_duration_hours(),
            step_minutes: default_step_minutes(),
            business_hours: default_business_hours(),
            days_before: default_days_before(),
            overlap_check: OverlapCheck::default(),
            on_busy_query_failure: BusyQueryFailurePolicy::default(),
        }
    }
}

fn default_time_zone() -> String {
    "Asia/Jakarta".to_string()
}

fn default_year() -> i32 {
    2025
}

fn default_slot_time_zone() -> String {
    "UTC".to_string()
}

fn default_slot_duration_hours() -> i64 {
    2
}

fn default_step_minutes() -> i64 {
    60
}

fn default_business_hours() -> [u32; 2] {
    [9, 17]
}

fn default_days_before() -> i64 {
    7
}

// --- Event Store Config ---
/// What `delete_event` does when the provider refuses the deletion.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeleteFailurePolicy {
    /// Log and return `false`.
    #[default]
    ReportBoolean,
    Propagate,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_calendar_capacity")]
    pub calendar_capacity: u32,
    #[serde(default = "default_event_capacity")]
    pub event_capacity: u32,
    /// Largest page the provider serves for calendar listings.
    #[serde(default = "default_calendar_page_size")]
    pub calendar_page_size: u32,
    /// Largest page the provider serves for event listings.
    #[serde(default = "default_event_page_size")]
    pub event_page_size: u32,
    #[serde(default)]
    pub on_delete_failure: DeleteFailurePolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            calendar_capacity: default_calendar_capacity(),
            event_capacity: default_event_capacity(),
            calendar_page_size: default_calendar_page_size(),
            event_page_size: default_event_page_size(),
            on_delete_failure: DeleteFailurePolicy::default(),
        }
    }
}

fn default_calendar_capacity() -> u32 {
    200
}

fn default_event_capacity() -> u32 {
    20
}

fn default_calendar_page_size() -> u32 {
    200
}

fn default_event_page_size() -> u32 {
    250
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub gcal: GcalConfig,
    #[serde(default)]
    pub scheduling: SchedulingConfig,
    #[serde(default)]
    pub store: StoreConfig,
}
