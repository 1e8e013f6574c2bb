//! Customer, depot, and time window types.

use serde::{Deserialize, Serialize};

/// Identifier of a customer. `0` is reserved for the depot.
pub type CustomerId = usize;

/// Id of the depot in node sequences and distance matrices.
pub const DEPOT_ID: CustomerId = 0;

/// A service time window `[ready, due]`.
///
/// A vehicle must arrive no later than `due`. Arriving before `ready` is
/// allowed; the vehicle waits.
///
/// # Examples
///
/// ```
/// use ev_routing::models::TimeWindow;
///
/// let tw = TimeWindow::new(100.0, 200.0).unwrap();
/// assert!(tw.contains(150.0));
/// assert!(!tw.contains(250.0));
/// assert!(TimeWindow::new(200.0, 200.0).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    ready: f64,
    due: f64,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// Returns `None` unless `ready < due` and both values are finite.
    pub fn new(ready: f64, due: f64) -> Option<Self> {
        let window = Self { ready, due };
        window.is_valid().then_some(window)
    }

    /// A window open from time zero with no practical deadline.
    pub fn unbounded() -> Self {
        Self {
            ready: 0.0,
            due: f64::MAX,
        }
    }

    /// Earliest service start.
    pub fn ready(&self) -> f64 {
        self.ready
    }

    /// Latest allowable arrival.
    pub fn due(&self) -> f64 {
        self.due
    }

    /// Width of the window.
    pub fn span(&self) -> f64 {
        self.due - self.ready
    }

    /// Returns `true` if the given time falls within this window.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.ready && time <= self.due
    }

    /// Time spent waiting when arriving at `arrival`.
    pub fn waiting_time(&self, arrival: f64) -> f64 {
        (self.ready - arrival).max(0.0)
    }

    /// Returns `true` if arriving at the given time misses the window.
    pub fn is_violated(&self, arrival: f64) -> bool {
        arrival > self.due
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.ready.is_finite() && self.due.is_finite() && self.ready < self.due
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// A customer to be served.
///
/// Ids are expected to be contiguous from 1 in input order, so a customer's
/// id doubles as its row in the distance matrix.
///
/// # Examples
///
/// ```
/// use ev_routing::models::{Customer, TimeWindow};
///
/// let c = Customer::new(1, 41.0, 49.0, 10.0, 10.0)
///     .with_time_window(TimeWindow::new(0.0, 1000.0).unwrap());
/// assert_eq!(c.id(), 1);
/// assert_eq!(c.demand(), 10.0);
/// assert_eq!(c.time_window().due(), 1000.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    id: CustomerId,
    x: f64,
    y: f64,
    demand: f64,
    service_duration: f64,
    #[serde(default)]
    time_window: TimeWindow,
}

impl Customer {
    /// Creates a customer with an unbounded time window.
    pub fn new(id: CustomerId, x: f64, y: f64, demand: f64, service_duration: f64) -> Self {
        Self {
            id,
            x,
            y,
            demand,
            service_duration,
            time_window: TimeWindow::unbounded(),
        }
    }

    /// Sets the time window for this customer.
    pub fn with_time_window(mut self, tw: TimeWindow) -> Self {
        self.time_window = tw;
        self
    }

    /// Customer id (1..=N).
    pub fn id(&self) -> CustomerId {
        self.id
    }

    /// X-coordinate.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Y-coordinate.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Planar position.
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Mass to deliver.
    pub fn demand(&self) -> f64 {
        self.demand
    }

    /// Time spent serving this customer.
    pub fn service_duration(&self) -> f64 {
        self.service_duration
    }

    /// Service time window.
    pub fn time_window(&self) -> &TimeWindow {
        &self.time_window
    }
}

/// The single depot every route starts and ends at.
///
/// # Examples
///
/// ```
/// use ev_routing::models::{Depot, TimeWindow};
///
/// let depot = Depot::new(50.0, 50.0)
///     .with_time_window(TimeWindow::new(0.0, 2304.0).unwrap());
/// assert_eq!(depot.position(), (50.0, 50.0));
/// assert_eq!(depot.time_window().ready(), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Depot {
    x: f64,
    y: f64,
    #[serde(default)]
    time_window: TimeWindow,
}

impl Depot {
    /// Creates a depot with an unbounded time window.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            time_window: TimeWindow::unbounded(),
        }
    }

    /// Sets the depot's operating window.
    pub fn with_time_window(mut self, tw: TimeWindow) -> Self {
        self.time_window = tw;
        self
    }

    /// Planar position.
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Operating window. Routes depart at its ready time.
    pub fn time_window(&self) -> &TimeWindow {
        &self.time_window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_window_valid() {
        let tw = TimeWindow::new(10.0, 20.0).expect("valid");
        assert_eq!(tw.ready(), 10.0);
        assert_eq!(tw.due(), 20.0);
        assert_eq!(tw.span(), 10.0);
    }

    #[test]
    fn test_time_window_invalid() {
        assert!(TimeWindow::new(20.0, 10.0).is_none());
        assert!(TimeWindow::new(10.0, 10.0).is_none());
        assert!(TimeWindow::new(f64::NAN, 10.0).is_none());
        assert!(TimeWindow::new(10.0, f64::INFINITY).is_none());
    }

    #[test]
    fn test_time_window_waiting() {
        let tw = TimeWindow::new(10.0, 20.0).expect("valid");
        assert!((tw.waiting_time(5.0) - 5.0).abs() < 1e-10);
        assert_eq!(tw.waiting_time(10.0), 0.0);
        assert_eq!(tw.waiting_time(15.0), 0.0);
    }

    #[test]
    fn test_time_window_violated() {
        let tw = TimeWindow::new(10.0, 20.0).expect("valid");
        assert!(!tw.is_violated(20.0));
        assert!(tw.is_violated(20.1));
    }

    #[test]
    fn test_customer_defaults_to_unbounded_window() {
        let c = Customer::new(3, 1.0, 2.0, 5.0, 3.0);
        assert_eq!(c.position(), (1.0, 2.0));
        assert_eq!(c.time_window(), &TimeWindow::unbounded());
        assert!(c.time_window().is_valid());
    }

    #[test]
    fn test_depot_window() {
        let tw = TimeWindow::new(5.0, 100.0).expect("valid");
        let d = Depot::new(0.0, 0.0).with_time_window(tw);
        assert_eq!(d.time_window().ready(), 5.0);
    }
}
