//! Candidate solutions: a set of routes over the fleet.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::customer::CustomerId;
use super::route::Route;

/// Structural defects rejected when building an [`Assignment`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignmentError {
    #[error("route references vehicle {vehicle} but the fleet has {num_vehicles} vehicles")]
    UnknownVehicle { vehicle: usize, num_vehicles: usize },
    #[error("vehicle {0} has more than one route")]
    DuplicateVehicle(usize),
    #[error("customer {0} does not exist")]
    UnknownCustomer(CustomerId),
    #[error("customer {0} is served more than once")]
    DuplicateCustomer(CustomerId),
}

/// A candidate solution: at most one route per vehicle, each customer served
/// at most once. Customers absent from every route are unserved.
///
/// Customers placed by last-resort forced insertion during construction are
/// tagged so evaluation can penalize the routes that carry them. Operators
/// that rebuild routes clear the tags.
///
/// # Examples
///
/// ```
/// use ev_routing::models::{Assignment, AssignmentError, Route};
///
/// let a = Assignment::new(vec![Route::new(0, vec![1, 3]), Route::new(1, vec![2])], 4, 2)
///     .unwrap();
/// assert_eq!(a.num_served(), 3);
/// assert_eq!(a.unserved(4), vec![4]);
///
/// let dup = Assignment::new(vec![Route::new(0, vec![1]), Route::new(1, vec![1])], 4, 2);
/// assert_eq!(dup.unwrap_err(), AssignmentError::DuplicateCustomer(1));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    routes: Vec<Route>,
    #[serde(default)]
    forced: Vec<CustomerId>,
}

impl Assignment {
    /// Builds a validated assignment for a problem with `num_customers`
    /// customers (ids `1..=num_customers`) and `num_vehicles` vehicles.
    pub fn new(
        routes: Vec<Route>,
        num_customers: usize,
        num_vehicles: usize,
    ) -> Result<Self, AssignmentError> {
        let assignment = Self::from_routes(routes);
        assignment.validate(num_customers, num_vehicles)?;
        Ok(assignment)
    }

    /// An assignment with no routes.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wraps routes produced by an operator that already upholds the invariants.
    pub(crate) fn from_routes(routes: Vec<Route>) -> Self {
        Self {
            routes,
            forced: Vec::new(),
        }
    }

    /// Checks the structural invariants.
    pub fn validate(&self, num_customers: usize, num_vehicles: usize) -> Result<(), AssignmentError> {
        let mut vehicle_seen = vec![false; num_vehicles];
        let mut customer_seen = vec![false; num_customers + 1];

        for route in &self.routes {
            let vehicle = route.vehicle();
            let slot = vehicle_seen
                .get_mut(vehicle)
                .ok_or(AssignmentError::UnknownVehicle {
                    vehicle,
                    num_vehicles,
                })?;
            if *slot {
                return Err(AssignmentError::DuplicateVehicle(vehicle));
            }
            *slot = true;

            for &customer in route.customers() {
                if customer == 0 || customer > num_customers {
                    return Err(AssignmentError::UnknownCustomer(customer));
                }
                if customer_seen[customer] {
                    return Err(AssignmentError::DuplicateCustomer(customer));
                }
                customer_seen[customer] = true;
            }
        }
        Ok(())
    }

    /// Routes in order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub(crate) fn routes_mut(&mut self) -> &mut Vec<Route> {
        &mut self.routes
    }

    /// The route driven by `vehicle`, if any.
    pub fn route_for_vehicle(&self, vehicle: usize) -> Option<&Route> {
        self.routes.iter().find(|r| r.vehicle() == vehicle)
    }

    /// Served customers, route by route.
    pub fn served(&self) -> impl Iterator<Item = CustomerId> + '_ {
        self.routes.iter().flat_map(|r| r.customers().iter().copied())
    }

    /// Number of served customers.
    pub fn num_served(&self) -> usize {
        self.routes.iter().map(Route::len).sum()
    }

    /// Returns `true` if some route serves `customer`.
    pub fn contains(&self, customer: CustomerId) -> bool {
        self.routes.iter().any(|r| r.contains(customer))
    }

    /// Customer ids in `1..=num_customers` that no route serves, ascending.
    pub fn unserved(&self, num_customers: usize) -> Vec<CustomerId> {
        let mut seen = vec![false; num_customers + 1];
        for customer in self.served() {
            if let Some(slot) = seen.get_mut(customer) {
                *slot = true;
            }
        }
        (1..=num_customers).filter(|&c| !seen[c]).collect()
    }

    /// Number of vehicles with a non-empty route.
    pub fn vehicles_used(&self) -> usize {
        self.routes.iter().filter(|r| !r.is_empty()).count()
    }

    /// Vehicle indices that have no non-empty route, out of `num_vehicles`.
    pub fn idle_vehicles(&self, num_vehicles: usize) -> Vec<usize> {
        (0..num_vehicles)
            .filter(|&v| self.route_for_vehicle(v).is_none_or(Route::is_empty))
            .collect()
    }

    /// Customers placed by forced insertion.
    pub fn forced(&self) -> &[CustomerId] {
        &self.forced
    }

    /// Returns `true` if `route` carries a forced placement.
    pub fn has_forced(&self, route: &Route) -> bool {
        route.customers().iter().any(|c| self.forced.contains(c))
    }

    pub(crate) fn mark_forced(&mut self, customer: CustomerId) {
        self.forced.push(customer);
    }

    pub(crate) fn clear_forced(&mut self) {
        self.forced.clear();
    }

    /// Drops empty routes and orders the rest by vehicle index.
    pub(crate) fn normalize(&mut self) {
        self.routes.retain(|r| !r.is_empty());
        self.routes.sort_by_key(Route::vehicle);
    }
}
