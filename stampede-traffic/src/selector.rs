//! Weighted endpoint selection

use rand::Rng;
use stampede_config::EndpointSpec;

/// Weight-expanded pool of endpoints for uniform draws.
///
/// Each endpoint occupies exactly `weight` slots, in the order endpoints were
/// given, so a uniform draw over the slots picks an endpoint with probability
/// proportional to its weight. The pool is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionPool {
    endpoints: Vec<EndpointSpec>,
    /// Index into `endpoints`, one entry per unit of weight
    slots: Vec<usize>,
}

impl SelectionPool {
    /// Expand `endpoints` by weight.
    ///
    /// An empty list, or one whose weights expand to nothing, yields the
    /// single fallback entry `GET /`.
    pub fn build(endpoints: &[EndpointSpec]) -> Self {
        let slots: Vec<usize> = endpoints
            .iter()
            .enumerate()
            .flat_map(|(index, endpoint)| {
                let copies = usize::try_from(endpoint.weight).unwrap_or(0);
                std::iter::repeat(index).take(copies)
            })
            .collect();

        if slots.is_empty() {
            return Self {
                endpoints: vec![EndpointSpec::root()],
                slots: vec![0],
            };
        }

        Self {
            endpoints: endpoints.to_vec(),
            slots,
        }
    }

    /// Draw one endpoint uniformly from the expanded pool
    pub fn next<R: Rng + ?Sized>(&self, rng: &mut R) -> &EndpointSpec {
        let slot = rng.random_range(0..self.slots.len());
        &self.endpoints[self.slots[slot]]
    }

    /// Number of slots in the expanded pool
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the pool has no slots; `build` always leaves at least one
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The expanded pool, one item per slot
    pub fn iter(&self) -> impl Iterator<Item = &EndpointSpec> {
        self.slots.iter().map(|index| &self.endpoints[*index])
    }

    /// Distinct endpoints backing the pool
    pub fn endpoints(&self) -> &[EndpointSpec] {
        &self.endpoints
    }
}
