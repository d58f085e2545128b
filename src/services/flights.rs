use super::RefreshSlot;
use crate::clients::FlightSource;
use crate::domain::{FlightRecord, Snapshot};
use crate::errors::ApiResult;
use crate::repo::FlightStore;
use crate::utils::num;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

static NULL: Value = Value::Null;

// State-vector positions
const CALLSIGN: usize = 1;
const ORIGIN_COUNTRY: usize = 2;
const LONGITUDE: usize = 5;
const LATITUDE: usize = 6;
const BARO_ALTITUDE: usize = 7;
const VELOCITY: usize = 9;
const TRUE_TRACK: usize = 10;

/// Flight tracking service
pub struct FlightService {
    source: Arc<dyn FlightSource>,
    store: Option<Arc<dyn FlightStore>>,
    limit: usize,
    slot: RefreshSlot<Vec<FlightRecord>>,
}

impl FlightService {
    pub fn new(
        source: Arc<dyn FlightSource>,
        store: Option<Arc<dyn FlightStore>>,
        limit: usize,
    ) -> Self {
        Self {
            source,
            store,
            limit,
            slot: RefreshSlot::new("flights"),
        }
    }

    /// Fetch state vectors and reshape them into at most `limit` records
    pub async fn fetch_flights(&self) -> ApiResult<Vec<FlightRecord>> {
        let states = self.source.state_vectors().await?;
        let flights = flights_from_states(&states, self.limit);
        info!(
            "Fetched {} state vectors, kept {} flights",
            states.len(),
            flights.len()
        );

        if let Some(store) = &self.store {
            match store.insert_flights(&flights).await {
                Ok(written) => info!("Stored {} flight rows", written),
                Err(e) => warn!("Flight write-through failed: {}", e),
            }
        }

        Ok(flights)
    }

    /// Run one refresh cycle and publish the result
    pub async fn refresh(&self) -> ApiResult<Vec<FlightRecord>> {
        let token = self.slot.begin();
        let flights = self.fetch_flights().await?;
        self.slot.commit(token, flights.clone()).await;
        Ok(flights)
    }

    pub async fn latest(&self) -> Option<Snapshot<Vec<FlightRecord>>> {
        self.slot.latest().await
    }
}

/// Keep the first `limit` vectors that carry a position and a velocity, in source order
pub fn flights_from_states(states: &[Vec<Value>], limit: usize) -> Vec<FlightRecord> {
    states
        .iter()
        .filter_map(|s| flight_from_state(s))
        .take(limit)
        .collect()
}

/// Position and velocity are required. Numbers and numeric strings such as `"12.5"`
/// are read; null, a missing slot or a non-numeric value such as `"abc"` counts as absent.
fn flight_from_state(state: &[Value]) -> Option<FlightRecord> {
    let field = |i: usize| state.get(i).unwrap_or(&NULL);

    let longitude = num(field(LONGITUDE))?;
    let latitude = num(field(LATITUDE))?;
    let velocity = num(field(VELOCITY))?;

    let callsign = field(CALLSIGN)
        .as_str()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or("Unknown")
        .to_string();

    Some(FlightRecord {
        callsign,
        origin_country: field(ORIGIN_COUNTRY).as_str().map(String::from),
        longitude,
        latitude,
        altitude: num(field(BARO_ALTITUDE)).unwrap_or(0.0),
        velocity,
        heading: num(field(TRUE_TRACK)).unwrap_or(0.0),
    })
}
