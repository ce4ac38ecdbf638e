//! Parking service: spot inventory, active tickets and fee settlement

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::domain::{
    FeeTable, Location, ParkingError, ParkingResult, Receipt, SpotCounts, SpotInventory, Ticket,
    VehicleType,
};
use crate::notifications::{
    Event, ParkingRejectedEvent, SharedEventBus, VehicleParkedEvent, VehicleUnparkedEvent,
};
use crate::support::clock::{Clock, SystemClock};
use crate::support::ids::IdGenerator;

pub const DEFAULT_CURRENCY: &str = "USD";

/// Everything park and unpark read-then-write, guarded as one unit
struct LotState {
    inventory: SpotInventory,
    active: HashMap<String, Ticket>,
    ids: IdGenerator,
}

/// Issues tickets on entry and settles them on exit.
///
/// All mutable state sits behind a single lock, so the service can be shared
/// through an `Arc`. A failed call leaves spot counts and active tickets
/// exactly as they were.
pub struct ParkingService {
    state: Mutex<LotState>,
    fee_table: FeeTable,
    currency: String,
    clock: Arc<dyn Clock>,
    event_bus: Option<SharedEventBus>,
}

impl ParkingService {
    pub fn new(capacity: &SpotCounts, fee_table: FeeTable) -> Self {
        for (location, vehicle_type, issue) in fee_table.validate() {
            warn!(
                location = location.as_str(),
                %vehicle_type,
                %issue,
                "Fee tiers do not cover every duration exactly once"
            );
        }

        let inventory = SpotInventory::new(capacity);
        info!(
            motorcycle = inventory.capacity(VehicleType::Motorcycle),
            car = inventory.capacity(VehicleType::Car),
            bus = inventory.capacity(VehicleType::Bus),
            "Parking lot opened"
        );

        Self {
            state: Mutex::new(LotState {
                inventory,
                active: HashMap::new(),
                ids: IdGenerator::new(),
            }),
            fee_table,
            currency: DEFAULT_CURRENCY.to_string(),
            clock: Arc::new(SystemClock),
            event_bus: None,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.lot.capacity, config.fees.clone()).with_currency(&config.lot.currency)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_id_generator(self, ids: IdGenerator) -> Self {
        self.lock().ids = ids;
        self
    }

    pub fn with_event_bus(mut self, event_bus: SharedEventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Take a spot for `vehicle_type` and issue a ticket for it
    pub fn park(&self, vehicle_type: &str, location: &str) -> ParkingResult<Ticket> {
        let result = self.try_park(vehicle_type, location);
        match &result {
            Ok((ticket, remaining_spots)) => {
                info!(
                    ticket_number = ticket.ticket_number.as_str(),
                    vehicle_type = %ticket.vehicle_type,
                    location = ticket.location.as_str(),
                    spot_number = ticket.spot_number,
                    remaining_spots,
                    "Vehicle parked"
                );
                self.publish(Event::VehicleParked(VehicleParkedEvent {
                    ticket_number: ticket.ticket_number.clone(),
                    vehicle_type: ticket.vehicle_type,
                    location: ticket.location.clone(),
                    spot_number: ticket.spot_number,
                    remaining_spots: *remaining_spots,
                    timestamp: ticket.entry_date_time,
                }));
            }
            Err(err) => self.rejected(err, None),
        }
        result.map(|(ticket, _)| ticket)
    }

    fn try_park(&self, vehicle_type: &str, location: &str) -> ParkingResult<(Ticket, u32)> {
        let vehicle_type: VehicleType = vehicle_type.parse()?;
        let location = Location::new(location);

        let mut state = self.lock();
        let spot_number = state
            .inventory
            .assign(vehicle_type)
            .ok_or(ParkingError::NoAvailableSpots(vehicle_type))?;

        let LotState { active, ids, .. } = &mut *state;
        let ticket_number = ids.next_unique(|id| active.contains_key(id));
        let ticket = Ticket::new(
            ticket_number.clone(),
            vehicle_type,
            spot_number,
            self.clock.now(),
            location,
        );
        active.insert(ticket_number, ticket.clone());

        Ok((ticket, state.inventory.available(vehicle_type)))
    }

    /// Close the session for `ticket_number`, charge it and free its spot.
    ///
    /// The fee is computed before anything changes, so a `NoFeeModel` failure
    /// keeps the ticket active and the spot taken.
    pub fn unpark(&self, ticket_number: &str) -> ParkingResult<Receipt> {
        let result = self.try_unpark(ticket_number);
        match &result {
            Ok(receipt) => {
                info!(
                    ticket_number,
                    receipt_number = receipt.receipt_number.as_str(),
                    vehicle_type = %receipt.vehicle_type,
                    location = receipt.location.as_str(),
                    duration_minutes = receipt.duration_minutes,
                    fees = receipt.fees,
                    currency = receipt.currency.as_str(),
                    "Vehicle unparked"
                );
                self.publish(Event::VehicleUnparked(VehicleUnparkedEvent {
                    ticket_number: receipt.ticket_number.clone(),
                    receipt_number: receipt.receipt_number.clone(),
                    vehicle_type: receipt.vehicle_type,
                    location: receipt.location.clone(),
                    spot_number: receipt.spot_number,
                    duration_minutes: receipt.duration_minutes,
                    fees: receipt.fees,
                    timestamp: receipt.exit_date_time,
                }));
            }
            Err(err) => self.rejected(err, Some(ticket_number)),
        }
        result
    }

    fn try_unpark(&self, ticket_number: &str) -> ParkingResult<Receipt> {
        let mut state = self.lock();
        let LotState {
            inventory,
            active,
            ids,
        } = &mut *state;
        let Entry::Occupied(entry) = active.entry(ticket_number.to_string()) else {
            return Err(ParkingError::InvalidTicket(ticket_number.to_string()));
        };

        let exit_date_time = self.clock.now();
        let ticket = entry.get();
        let duration_minutes = ticket.duration_minutes(exit_date_time);
        let fees =
            self.fee_table
                .calculate_fees(ticket.vehicle_type, duration_minutes, &ticket.location)?;

        let ticket = entry.remove();
        if !inventory.release(ticket.vehicle_type) {
            warn!(
                ticket_number,
                vehicle_type = %ticket.vehicle_type,
                "Released spot would exceed capacity; count left unchanged"
            );
        }

        Ok(Receipt {
            receipt_number: ids.next_id(),
            ticket_number: ticket.ticket_number,
            vehicle_type: ticket.vehicle_type,
            location: ticket.location,
            spot_number: ticket.spot_number,
            entry_date_time: ticket.entry_date_time,
            exit_date_time,
            duration_minutes,
            fees,
            currency: self.currency.clone(),
        })
    }

    /// Fee `ticket_number` would be charged if it were unparked now
    pub fn quote(&self, ticket_number: &str) -> ParkingResult<u64> {
        let state = self.lock();
        let ticket = state
            .active
            .get(ticket_number)
            .ok_or_else(|| ParkingError::InvalidTicket(ticket_number.to_string()))?;
        let duration_minutes = ticket.duration_minutes(self.clock.now());
        self.fee_table
            .calculate_fees(ticket.vehicle_type, duration_minutes, &ticket.location)
    }

    /// Free spots per vehicle type.
    ///
    /// Every location draws from the same pool, so `location` does not change
    /// the answer.
    pub fn available_spots(&self, location: &str) -> SpotCounts {
        debug!(location, "Available spots requested");
        self.lock().inventory.snapshot()
    }

    pub fn active_ticket(&self, ticket_number: &str) -> Option<Ticket> {
        self.lock().active.get(ticket_number).cloned()
    }

    pub fn active_count(&self) -> usize {
        self.lock().active.len()
    }

    fn lock(&self) -> MutexGuard<'_, LotState> {
        // Every critical section validates before it mutates, so a panic
        // inside one cannot leave the state half-written.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn rejected(&self, err: &ParkingError, ticket_number: Option<&str>) {
        warn!(reason = err.kind(), ticket_number, error = %err, "Parking request rejected");
        self.publish(Event::ParkingRejected(ParkingRejectedEvent {
            reason: err.kind().to_string(),
            message: err.to_string(),
            ticket_number: ticket_number.map(String::from),
            timestamp: self.clock.now(),
        }));
    }

    fn publish(&self, event: Event) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeeTier;
    use crate::notifications::EventBus;
    use crate::support::clock::ManualClock;
    use crate::support::ids::is_well_formed;
    use chrono::{Duration, TimeZone, Utc};

    fn counts(motorcycle: u32, car: u32, bus: u32) -> SpotCounts {
        SpotCounts::from([
            (VehicleType::Motorcycle, motorcycle),
            (VehicleType::Car, car),
            (VehicleType::Bus, bus),
        ])
    }

    fn mall_fees() -> FeeTable {
        FeeTable::new().with_tiers(
            Location::MALL,
            VehicleType::Car,
            vec![
                FeeTier::new(0, 60, 10),
                FeeTier::new(60, 180, 15),
                FeeTier::open_ended(180, 20),
            ],
        )
    }

    fn service_with_clock(capacity: SpotCounts) -> (ParkingService, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
        ));
        let service = ParkingService::new(&capacity, mall_fees())
            .with_clock(clock.clone())
            .with_id_generator(IdGenerator::seeded(1));
        (service, clock)
    }

    #[test]
    fn park_issues_ticket_and_takes_spot() {
        let (service, clock) = service_with_clock(counts(0, 5, 0));
        let ticket = service.park("Car", "Mall").unwrap();

        assert!(is_well_formed(&ticket.ticket_number));
        assert_eq!(ticket.spot_number, 5);
        assert_eq!(ticket.vehicle_type, VehicleType::Car);
        assert_eq!(ticket.location.as_str(), "Mall");
        assert_eq!(ticket.entry_date_time, clock.now());
        assert_eq!(service.available_spots("Mall")[&VehicleType::Car], 4);
        assert_eq!(service.active_ticket(&ticket.ticket_number), Some(ticket));
    }

    #[test]
    fn capacity_one_scenario() {
        let (service, _) = service_with_clock(SpotCounts::from([(VehicleType::Car, 1)]));

        let first = service.park("Car", "Mall").unwrap();
        assert_eq!(first.spot_number, 1);
        assert_eq!(service.available_spots("Mall")[&VehicleType::Car], 0);

        assert_eq!(
            service.park("Car", "Mall").unwrap_err(),
            ParkingError::NoAvailableSpots(VehicleType::Car)
        );

        service.unpark(&first.ticket_number).unwrap();
        assert_eq!(service.available_spots("Mall")[&VehicleType::Car], 1);

        let again = service.park("Car", "Mall").unwrap();
        assert_eq!(again.spot_number, 1);
        assert_ne!(again.ticket_number, first.ticket_number);
    }

    #[test]
    fn no_spots_leaves_state_unchanged() {
        let (service, _) = service_with_clock(counts(0, 1, 0));
        let before = service.available_spots("Airport");

        for location in ["Airport", "Stadium", "Mall", "Nowhere"] {
            assert_eq!(
                service.park("Motorcycle", location).unwrap_err(),
                ParkingError::NoAvailableSpots(VehicleType::Motorcycle)
            );
        }
        assert_eq!(service.available_spots("Airport"), before);
        assert_eq!(service.active_count(), 0);
    }

    #[test]
    fn invalid_vehicle_type_mutates_nothing() {
        let (service, _) = service_with_clock(counts(1, 1, 1));
        assert_eq!(
            service.park("SUV", "Mall").unwrap_err(),
            ParkingError::InvalidVehicleType("SUV".to_string())
        );
        assert_eq!(service.available_spots("Mall"), counts(1, 1, 1));
        assert_eq!(service.active_count(), 0);
    }

    #[test]
    fn non_canonical_vehicle_names_are_rejected() {
        let (service, _) = service_with_clock(SpotCounts::from([(VehicleType::Car, 1)]));

        for name in ["car", "CAR", " Car "] {
            assert_eq!(
                service.park(name, "Mall").unwrap_err(),
                ParkingError::InvalidVehicleType(name.to_string())
            );
        }
        assert_eq!(service.available_spots("Mall")[&VehicleType::Car], 1);
        assert_eq!(service.active_count(), 0);

        let ticket = service.park("Car", "Mall").unwrap();
        assert_eq!(ticket.spot_number, 1);
        service.unpark(&ticket.ticket_number).unwrap();
        assert_eq!(service.available_spots("Mall")[&VehicleType::Car], 1);
    }

    #[test]
    fn round_trip_conserves_counts() {
        let (service, clock) = service_with_clock(counts(2, 3, 0));
        let before = service.available_spots("Mall");

        let a = service.park("Car", "Mall").unwrap();
        let b = service.park("Car", "Mall").unwrap();
        clock.advance(Duration::minutes(5));
        service.unpark(&b.ticket_number).unwrap();
        service.unpark(&a.ticket_number).unwrap();

        assert_eq!(service.available_spots("Mall"), before);
        assert_eq!(service.active_count(), 0);
    }

    #[test]
    fn unpark_computes_fee_from_elapsed_time() {
        let (service, clock) = service_with_clock(counts(0, 2, 0));

        let ticket = service.park("Car", "Mall").unwrap();
        clock.advance(Duration::milliseconds(59 * 60_000));
        let receipt = service.unpark(&ticket.ticket_number).unwrap();
        assert_eq!(receipt.duration_minutes, 59);
        assert_eq!(receipt.fees, 10);

        let ticket = service.park("Car", "Mall").unwrap();
        clock.advance(Duration::milliseconds(59 * 60_000 + 1));
        let receipt = service.unpark(&ticket.ticket_number).unwrap();
        assert_eq!(receipt.duration_minutes, 60);
        assert_eq!(receipt.fees, 15);
    }

    #[test]
    fn receipt_carries_session_details() {
        let (service, clock) = service_with_clock(counts(0, 2, 0));
        let ticket = service.park("Car", "Mall").unwrap();
        clock.advance(Duration::seconds(61));

        let receipt = service.unpark(&ticket.ticket_number).unwrap();
        assert!(is_well_formed(&receipt.receipt_number));
        assert_ne!(receipt.receipt_number, ticket.ticket_number);
        assert_eq!(receipt.ticket_number, ticket.ticket_number);
        assert_eq!(receipt.spot_number, ticket.spot_number);
        assert_eq!(receipt.entry_date_time, ticket.entry_date_time);
        assert_eq!(receipt.exit_date_time, clock.now());
        assert_eq!(receipt.duration_minutes, 2);
        assert_eq!(receipt.currency, DEFAULT_CURRENCY);
    }

    #[test]
    fn unknown_or_closed_ticket_is_invalid() {
        let (service, _) = service_with_clock(counts(0, 1, 0));
        assert_eq!(
            service.unpark("123456").unwrap_err(),
            ParkingError::InvalidTicket("123456".to_string())
        );

        let ticket = service.park("Car", "Mall").unwrap();
        service.unpark(&ticket.ticket_number).unwrap();
        assert_eq!(
            service.unpark(&ticket.ticket_number).unwrap_err(),
            ParkingError::InvalidTicket(ticket.ticket_number.clone())
        );
        assert_eq!(service.available_spots("Mall")[&VehicleType::Car], 1);
    }

    #[test]
    fn missing_fee_model_keeps_ticket_active() {
        let (service, _) = service_with_clock(counts(0, 0, 1));
        let ticket = service.park("Bus", "Mall").unwrap();

        let err = service.unpark(&ticket.ticket_number).unwrap_err();
        assert_eq!(
            err,
            ParkingError::NoFeeModel {
                vehicle_type: VehicleType::Bus,
                location: "Mall".to_string(),
            }
        );
        assert_eq!(service.available_spots("Mall")[&VehicleType::Bus], 0);
        assert!(service.active_ticket(&ticket.ticket_number).is_some());

        // A retry still finds the ticket
        assert_eq!(service.unpark(&ticket.ticket_number).unwrap_err(), err);
        assert_eq!(service.active_count(), 1);
    }

    #[test]
    fn unknown_location_fails_only_at_unpark() {
        let (service, _) = service_with_clock(counts(0, 1, 0));
        let ticket = service.park("Car", "Harbor").unwrap();
        assert!(matches!(
            service.unpark(&ticket.ticket_number),
            Err(ParkingError::NoFeeModel { .. })
        ));
        assert_eq!(service.active_count(), 1);
    }

    #[test]
    fn location_does_not_partition_availability() {
        let (service, _) = service_with_clock(counts(1, 2, 3));
        service.park("Car", "Airport").unwrap();
        assert_eq!(service.available_spots("Mall"), counts(1, 1, 3));
        assert_eq!(service.available_spots("Stadium"), counts(1, 1, 3));
    }

    #[test]
    fn quote_does_not_close_the_ticket() {
        let (service, clock) = service_with_clock(counts(0, 1, 0));
        let ticket = service.park("Car", "Mall").unwrap();
        clock.advance(Duration::minutes(200));

        assert_eq!(service.quote(&ticket.ticket_number).unwrap(), 20);
        assert_eq!(service.active_count(), 1);
        assert!(matches!(
            service.quote("nope"),
            Err(ParkingError::InvalidTicket(_))
        ));
    }

    #[test]
    fn events_are_published_for_each_outcome() {
        let bus = Arc::new(EventBus::new());
        let mut subscriber = bus.subscribe();
        let (service, _) = service_with_clock(counts(0, 1, 0));
        let service = service.with_event_bus(bus.clone());

        let ticket = service.park("Car", "Mall").unwrap();
        let _ = service.park("Car", "Mall");
        service.unpark(&ticket.ticket_number).unwrap();

        let types: Vec<_> = std::iter::from_fn(|| subscriber.try_recv())
            .map(|m| m.event.event_type())
            .collect();
        assert_eq!(
            types,
            vec!["vehicle_parked", "parking_rejected", "vehicle_unparked"]
        );
    }

    #[test]
    fn from_config_uses_lot_settings() {
        let mut config = AppConfig::default();
        config.lot.currency = "EUR".to_string();
        config.lot.capacity = SpotCounts::from([(VehicleType::Bus, 2)]);

        let service = ParkingService::from_config(&config);
        assert_eq!(service.currency(), "EUR");
        assert_eq!(service.available_spots("Mall"), counts(0, 0, 2));
    }

    #[test]
    fn shared_across_threads() {
        let service = Arc::new(ParkingService::new(&counts(0, 100, 0), FeeTable::standard()));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let service = service.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        let ticket = service.park("Car", "Airport").unwrap();
                        service.unpark(&ticket.ticket_number).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(service.available_spots("Airport")[&VehicleType::Car], 100);
    }
}
