pub mod extraction;
pub mod google_events;
pub mod slot_csv;
