// --- File: crates/studyplan_gcal/src/lib.rs ---
pub mod auth;
pub mod busy;
pub mod doc;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod normalize;
#[cfg(test)]
mod normalize_test;
pub mod pagination;
pub mod routes;
pub mod service;
pub mod slots;
#[cfg(test)]
mod slots_proptest;
#[cfg(test)]
mod slots_test;
pub mod store;

pub use busy::BusyIntervalIndex;
pub use handlers::GcalState;
pub use memory::InMemoryCalendarProvider;
pub use models::{CalendarEvent, CalendarRef, EventDraft, EventPatch, EventTime, StudySlot};
pub use normalize::{DateInferenceStrategy, DateNormalizer, RegexDateInference};
pub use pagination::{Capacity, PageFetcher};
pub use slots::{SlotAllocator, SlotPolicy, SlotWalk, StudyDemand};
pub use store::EventStore;
