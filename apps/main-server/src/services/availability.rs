//! Remaining-slot computation.

use booking_store::{BookingFilter, BookingStore, StoreResult};
use entities::{Booking, TreatmentName, TreatmentOption};

/// Removes booked slots from every catalog entry.
///
/// For each treatment, the slots of bookings on `date` for that treatment
/// are removed from its slot list; the remaining slots keep their catalog
/// order. Bookings for treatments missing from the catalog are ignored and
/// never produce an entry.
pub fn compute_availability(
    date: &str,
    catalog: Vec<TreatmentOption>,
    bookings: &[Booking],
) -> Vec<TreatmentOption> {
    catalog
        .into_iter()
        .map(|mut option| {
            let booked: Vec<&str> = bookings
                .iter()
                .filter(|b| b.appointment_date == date && b.treatment_name == option.name)
                .map(|b| b.slot.as_str())
                .collect();
            option.slots.retain(|slot| !booked.contains(&slot.as_str()));
            option
        })
        .collect()
}

/// Loads the catalog and the bookings on `date` and computes what is left.
pub async fn options_for_date<S: BookingStore + ?Sized>(
    store: &S,
    date: &str,
) -> StoreResult<Vec<TreatmentOption>> {
    let catalog = store.list_treatment_options().await?;
    let bookings = store.list_bookings(&BookingFilter::on_date(date)).await?;

    tracing::debug!(
        date,
        treatments = catalog.len(),
        bookings = bookings.len(),
        "Computing availability"
    );

    Ok(compute_availability(date, catalog, &bookings))
}

/// Lists the catalog as name-only entries.
pub async fn treatment_names<S: BookingStore + ?Sized>(
    store: &S,
) -> StoreResult<Vec<TreatmentName>> {
    let catalog = store.list_treatment_options().await?;
    Ok(catalog.iter().map(TreatmentName::from).collect())
}
