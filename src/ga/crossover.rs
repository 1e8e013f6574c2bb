//! Order-preserving route-merge crossover.

use std::collections::HashSet;

use crate::models::{Assignment, CustomerId, Route};

/// Merges two parents into one child.
///
/// The child takes the first half of `a`'s routes (rounded up), then every
/// route of `b` whose vehicle is still free. Customers already placed are
/// stripped as routes are copied, so visit order within each route is
/// preserved and nobody is served twice. Customers served by either parent
/// but lost in the merge are appended to the child's first route, so the
/// child covers exactly the union of both parents.
///
/// # Examples
///
/// ```
/// use ev_routing::ga::crossover;
/// use ev_routing::models::{Assignment, Route};
///
/// let a = Assignment::new(vec![Route::new(0, vec![1, 2]), Route::new(1, vec![3, 4])], 5, 3).unwrap();
/// let b = Assignment::new(vec![Route::new(1, vec![2, 5]), Route::new(2, vec![4, 1])], 5, 3).unwrap();
///
/// let child = crossover(&a, &b);
/// let routes: Vec<Vec<usize>> = child.routes().iter().map(|r| r.customers().to_vec()).collect();
/// assert_eq!(routes, vec![vec![1, 2, 3], vec![5], vec![4]]);
/// ```
pub fn crossover(a: &Assignment, b: &Assignment) -> Assignment {
    let half = a.routes().len().div_ceil(2);
    let mut used: HashSet<CustomerId> = HashSet::new();
    let mut taken_vehicles: HashSet<usize> = HashSet::new();
    let mut routes: Vec<Route> = Vec::with_capacity(a.routes().len().max(b.routes().len()));

    let donors = a.routes()[..half].iter().chain(b.routes());
    for route in donors {
        if !taken_vehicles.insert(route.vehicle()) {
            continue;
        }
        let kept: Vec<CustomerId> = route
            .customers()
            .iter()
            .copied()
            .filter(|&c| used.insert(c))
            .collect();
        routes.push(Route::new(route.vehicle(), kept));
    }

    let missing: Vec<CustomerId> = a
        .served()
        .chain(b.served())
        .filter(|&c| used.insert(c))
        .collect();

    if !missing.is_empty() {
        match routes.first_mut() {
            Some(first) => first.customers_mut().extend(missing),
            None => routes.push(Route::new(0, missing)),
        }
    }

    let mut child = Assignment::from_routes(routes);
    child.normalize();
    child
}
