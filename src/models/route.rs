//! Route and visit types.

use serde::{Deserialize, Serialize};

use super::customer::{CustomerId, DEPOT_ID};

/// Timing and state of a single stop, as replayed by the evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    /// Customer being visited.
    pub customer_id: CustomerId,
    /// Arrival time at the customer.
    pub arrival_time: f64,
    /// Service start (arrival, or the window's ready time when early).
    pub service_start: f64,
    /// Service start plus service duration.
    pub departure_time: f64,
    /// Cumulative load after this stop.
    pub load_after: f64,
    /// Remaining battery on arrival.
    pub battery_after: f64,
}

/// An ordered sequence of customers served by one vehicle.
///
/// The depot is implicit at both ends and never stored.
///
/// # Examples
///
/// ```
/// use ev_routing::models::Route;
///
/// let route = Route::new(1, vec![4, 2]);
/// assert_eq!(route.vehicle(), 1);
/// assert_eq!(route.len(), 2);
/// assert_eq!(route.nodes(), vec![0, 4, 2, 0]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    vehicle: usize,
    customers: Vec<CustomerId>,
}

impl Route {
    /// Creates a route for the vehicle at index `vehicle`.
    pub fn new(vehicle: usize, customers: Vec<CustomerId>) -> Self {
        Self { vehicle, customers }
    }

    /// Creates an empty route.
    pub fn empty(vehicle: usize) -> Self {
        Self::new(vehicle, Vec::new())
    }

    /// Index of the vehicle serving this route.
    pub fn vehicle(&self) -> usize {
        self.vehicle
    }

    /// Customers in visit order.
    pub fn customers(&self) -> &[CustomerId] {
        &self.customers
    }

    pub(crate) fn customers_mut(&mut self) -> &mut Vec<CustomerId> {
        &mut self.customers
    }

    /// Number of customer stops.
    pub fn len(&self) -> usize {
        self.customers.len()
    }

    /// Returns `true` if the route serves nobody.
    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    /// Returns `true` if the route serves `customer`.
    pub fn contains(&self, customer: CustomerId) -> bool {
        self.customers.contains(&customer)
    }

    /// Node sequence with the depot (`0`) as first and last element.
    pub fn nodes(&self) -> Vec<CustomerId> {
        let mut nodes = Vec::with_capacity(self.customers.len() + 2);
        nodes.push(DEPOT_ID);
        nodes.extend_from_slice(&self.customers);
        nodes.push(DEPOT_ID);
        nodes
    }

    /// Returns a copy with `customer` inserted at `position`.
    pub fn with_inserted(&self, position: usize, customer: CustomerId) -> Self {
        let mut customers = self.customers.clone();
        customers.insert(position, customer);
        Self::new(self.vehicle, customers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_empty() {
        let r = Route::empty(3);
        assert!(r.is_empty());
        assert_eq!(r.vehicle(), 3);
        assert_eq!(r.nodes(), vec![0, 0]);
    }

    #[test]
    fn test_with_inserted_leaves_original() {
        let r = Route::new(0, vec![1, 3]);
        let r2 = r.with_inserted(1, 2);
        assert_eq!(r.customers(), &[1, 3]);
        assert_eq!(r2.customers(), &[1, 2, 3]);
        assert_eq!(r2.with_inserted(3, 4).customers(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_contains() {
        let r = Route::new(0, vec![5, 7]);
        assert!(r.contains(7));
        assert!(!r.contains(6));
    }
}
