pub mod memory;
pub mod state;

pub use memory::{AppointmentFilter, DoctorLease, MemoryStore, StoreError};
pub use state::AppState;
