use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::time::timeout;
use tracing::debug;
use uuid::Uuid;

use shared_models::scheduling::{Appointment, AppointmentStatus, DoctorAvailability};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store operation timed out")]
    Timeout,
}

/// Holding a lease serializes all booking writes for one doctor. Writes
/// for different doctors never contend.
#[derive(Debug)]
pub struct DoctorLease {
    _guard: OwnedMutexGuard<()>,
}

/// Filter for appointment listings. All fields are conjunctive; `from`/`to`
/// select appointments whose start falls inside the closed range.
#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub doctor_id: Option<String>,
    pub patient_id: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl AppointmentFilter {
    fn matches(&self, appointment: &Appointment) -> bool {
        if let Some(doctor_id) = &self.doctor_id {
            if &appointment.doctor_id != doctor_id {
                return false;
            }
        }
        if let Some(patient_id) = &self.patient_id {
            if &appointment.patient_id != patient_id {
                return false;
            }
        }
        if let Some(status) = self.status {
            if appointment.status != status {
                return false;
            }
        }
        if let Some(from) = self.from {
            if appointment.start_time < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if appointment.start_time > to {
                return false;
            }
        }
        true
    }
}

/// In-memory persistence for availability records and appointments.
///
/// Every operation is bounded by the configured timeout and fails with
/// `StoreError::Timeout` rather than blocking indefinitely; callers treat
/// that as retryable.
pub struct MemoryStore {
    availability: RwLock<HashMap<String, DoctorAvailability>>,
    appointments: RwLock<HashMap<Uuid, Appointment>>,
    doctor_locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
    op_timeout: Duration,
}

impl MemoryStore {
    pub fn new(op_timeout: Duration) -> Self {
        Self {
            availability: RwLock::new(HashMap::new()),
            appointments: RwLock::new(HashMap::new()),
            doctor_locks: StdMutex::new(HashMap::new()),
            op_timeout,
        }
    }

    /// Acquire the per-doctor booking lease. The read-check-insert unit of
    /// a booking must run entirely while the lease is held.
    pub async fn lock_doctor(&self, doctor_id: &str) -> Result<DoctorLease, StoreError> {
        let lock = {
            let mut locks = self
                .doctor_locks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            Arc::clone(
                locks
                    .entry(doctor_id.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };

        let guard = timeout(self.op_timeout, lock.lock_owned())
            .await
            .map_err(|_| StoreError::Timeout)?;

        debug!("Acquired booking lease for doctor {}", doctor_id);
        Ok(DoctorLease { _guard: guard })
    }

    // ==========================================================================
    // AVAILABILITY
    // ==========================================================================

    pub async fn availability(
        &self,
        doctor_id: &str,
    ) -> Result<Option<DoctorAvailability>, StoreError> {
        let records = self.read_availability().await?;
        Ok(records.get(doctor_id).cloned())
    }

    /// All availability records, ordered by doctor id for stable output.
    pub async fn all_availability(&self) -> Result<Vec<DoctorAvailability>, StoreError> {
        let records = self.read_availability().await?;
        let mut all: Vec<DoctorAvailability> = records.values().cloned().collect();
        all.sort_by(|a, b| a.doctor_id.cmp(&b.doctor_id));
        Ok(all)
    }

    /// Insert a record unless one already exists for the doctor. Returns
    /// the stored record and whether this call created it.
    pub async fn insert_availability_if_absent(
        &self,
        record: DoctorAvailability,
    ) -> Result<(DoctorAvailability, bool), StoreError> {
        let mut records = self.write_availability().await?;
        if let Some(existing) = records.get(&record.doctor_id) {
            return Ok((existing.clone(), false));
        }
        records.insert(record.doctor_id.clone(), record.clone());
        Ok((record, true))
    }

    /// Overwrite an existing record in full. Returns false if the doctor
    /// has no record yet.
    pub async fn update_availability(
        &self,
        record: DoctorAvailability,
    ) -> Result<bool, StoreError> {
        let mut records = self.write_availability().await?;
        if !records.contains_key(&record.doctor_id) {
            return Ok(false);
        }
        records.insert(record.doctor_id.clone(), record);
        Ok(true)
    }

    // ==========================================================================
    // APPOINTMENTS
    // ==========================================================================

    pub async fn insert_appointment(&self, appointment: Appointment) -> Result<(), StoreError> {
        let mut records = self.write_appointments().await?;
        records.insert(appointment.id, appointment);
        Ok(())
    }

    pub async fn appointment(&self, id: Uuid) -> Result<Option<Appointment>, StoreError> {
        let records = self.read_appointments().await?;
        Ok(records.get(&id).cloned())
    }

    /// Rewrite an existing appointment in place. Returns false if unknown.
    pub async fn update_appointment(&self, appointment: Appointment) -> Result<bool, StoreError> {
        let mut records = self.write_appointments().await?;
        if !records.contains_key(&appointment.id) {
            return Ok(false);
        }
        records.insert(appointment.id, appointment);
        Ok(true)
    }

    /// A doctor's `Scheduled` appointments ordered by start time. Canceled
    /// and completed appointments never appear here.
    pub async fn scheduled_for_doctor(
        &self,
        doctor_id: &str,
    ) -> Result<Vec<Appointment>, StoreError> {
        self.search(&AppointmentFilter {
            doctor_id: Some(doctor_id.to_string()),
            status: Some(AppointmentStatus::Scheduled),
            ..Default::default()
        })
        .await
    }

    pub async fn search(
        &self,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>, StoreError> {
        let records = self.read_appointments().await?;
        let mut matched: Vec<Appointment> = records
            .values()
            .filter(|appointment| filter.matches(appointment))
            .cloned()
            .collect();
        matched.sort_by_key(|appointment| appointment.start_time);
        Ok(matched)
    }

    // ==========================================================================
    // BOUNDED LOCK HELPERS
    // ==========================================================================

    async fn read_availability(
        &self,
    ) -> Result<RwLockReadGuard<'_, HashMap<String, DoctorAvailability>>, StoreError> {
        timeout(self.op_timeout, self.availability.read())
            .await
            .map_err(|_| StoreError::Timeout)
    }

    async fn write_availability(
        &self,
    ) -> Result<RwLockWriteGuard<'_, HashMap<String, DoctorAvailability>>, StoreError> {
        timeout(self.op_timeout, self.availability.write())
            .await
            .map_err(|_| StoreError::Timeout)
    }

    async fn read_appointments(
        &self,
    ) -> Result<RwLockReadGuard<'_, HashMap<Uuid, Appointment>>, StoreError> {
        timeout(self.op_timeout, self.appointments.read())
            .await
            .map_err(|_| StoreError::Timeout)
    }

    async fn write_appointments(
        &self,
    ) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, Appointment>>, StoreError> {
        timeout(self.op_timeout, self.appointments.write())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    fn appointment(doctor: &str, hour: u32, status: AppointmentStatus) -> Appointment {
        let start = Utc.with_ymd_and_hms(2024, 11, 11, hour, 0, 0).unwrap();
        Appointment {
            id: Uuid::new_v4(),
            doctor_id: doctor.to_string(),
            patient_id: "patient-1".to_string(),
            created_by: "reception-1".to_string(),
            start_time: start,
            end_time: start + chrono::Duration::minutes(30),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn scheduled_listing_excludes_terminal_statuses() {
        let store = MemoryStore::new(Duration::from_secs(1));
        store
            .insert_appointment(appointment("doc-1", 9, AppointmentStatus::Scheduled))
            .await
            .unwrap();
        store
            .insert_appointment(appointment("doc-1", 10, AppointmentStatus::Canceled))
            .await
            .unwrap();
        store
            .insert_appointment(appointment("doc-1", 11, AppointmentStatus::Completed))
            .await
            .unwrap();

        let scheduled = store.scheduled_for_doctor("doc-1").await.unwrap();
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].status, AppointmentStatus::Scheduled);
    }

    #[tokio::test]
    async fn search_orders_by_start_time() {
        let store = MemoryStore::new(Duration::from_secs(1));
        store
            .insert_appointment(appointment("doc-1", 14, AppointmentStatus::Scheduled))
            .await
            .unwrap();
        store
            .insert_appointment(appointment("doc-1", 9, AppointmentStatus::Scheduled))
            .await
            .unwrap();

        let all = store.search(&AppointmentFilter::default()).await.unwrap();
        assert!(all[0].start_time < all[1].start_time);
    }

    #[tokio::test]
    async fn doctor_lease_is_exclusive_and_times_out() {
        let store = MemoryStore::new(Duration::from_millis(50));

        let held = store.lock_doctor("doc-1").await.unwrap();
        let second = store.lock_doctor("doc-1").await;
        assert_matches!(second, Err(StoreError::Timeout));

        // A different doctor never contends.
        let other = store.lock_doctor("doc-2").await;
        assert!(other.is_ok());

        drop(held);
        let reacquired = store.lock_doctor("doc-1").await;
        assert!(reacquired.is_ok());
    }
}
