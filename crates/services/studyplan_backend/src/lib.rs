// --- File: crates/services/studyplan_backend/src/lib.rs ---

pub mod exam_week; // reset_exam_week batch logic
