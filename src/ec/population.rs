//! Fixed-size populations with exclusive ownership of their members.

use super::individual::Individual;
use crate::error::{EvolveError, Result};

/// An ordered, fixed-size collection of individuals.
///
/// Each slot exclusively owns its occupant. Replacing a slot moves the new
/// individual in and hands the previous one back to the caller, so the old
/// value is dropped as soon as the caller lets go of it. The number of slots
/// never changes after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    slots: Vec<Option<Individual>>,
}

impl Population {
    /// Creates a population with `size` empty slots.
    ///
    /// Fails with [`EvolveError::InvalidArgument`] when `size` is zero.
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(EvolveError::invalid("population size must be positive"));
        }
        Ok(Self {
            slots: vec![None; size],
        })
    }

    /// Creates a fully occupied population.
    pub fn from_individuals(individuals: Vec<Individual>) -> Result<Self> {
        if individuals.is_empty() {
            return Err(EvolveError::invalid("population size must be positive"));
        }
        Ok(Self {
            slots: individuals.into_iter().map(Some).collect(),
        })
    }

    /// Number of slots, occupied or not.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the occupant of slot `index` (`None` if the slot is unset).
    pub fn get(&self, index: usize) -> Result<Option<&Individual>> {
        let len = self.slots.len();
        self.slots
            .get(index)
            .map(Option::as_ref)
            .ok_or(EvolveError::IndexOutOfRange { index, len })
    }

    pub fn get_mut(&mut self, index: usize) -> Result<Option<&mut Individual>> {
        let len = self.slots.len();
        self.slots
            .get_mut(index)
            .map(Option::as_mut)
            .ok_or(EvolveError::IndexOutOfRange { index, len })
    }

    /// Returns the occupant of slot `index`, treating an unset slot as a
    /// runtime failure.
    pub fn member(&self, index: usize) -> Result<&Individual> {
        self.get(index)?
            .ok_or_else(|| EvolveError::runtime(format!("population slot {index} is empty")))
    }

    /// Moves `individual` into slot `index` and returns the previous
    /// occupant.
    pub fn set(&mut self, index: usize, individual: Individual) -> Result<Option<Individual>> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(EvolveError::IndexOutOfRange { index, len })?;
        Ok(slot.replace(individual))
    }

    /// Drops every occupant, leaving all slots unset. Idempotent.
    pub fn release(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }

    /// Whether every slot is occupied.
    pub fn is_filled(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Iterates over occupied slots in order.
    pub fn iter(&self) -> impl Iterator<Item = &Individual> {
        self.slots.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Individual> {
        self.slots.iter_mut().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            Population::new(0),
            Err(EvolveError::InvalidArgument(_))
        ));
        assert!(matches!(
            Population::from_individuals(Vec::new()),
            Err(EvolveError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_new_slots_are_unset() {
        let pop = Population::new(3).unwrap();
        assert_eq!(pop.len(), 3);
        assert!(!pop.is_filled());
        for i in 0..3 {
            assert!(pop.get(i).unwrap().is_none());
        }
        assert_eq!(pop.iter().count(), 0);
    }

    #[test]
    fn test_set_returns_previous_occupant() {
        let mut pop = Population::new(2).unwrap();
        assert!(pop.set(0, Individual::from_genes(vec![1.0])).unwrap().is_none());
        let old = pop.set(0, Individual::from_genes(vec![2.0])).unwrap();
        assert_eq!(old.unwrap().genes(), &[1.0]);
        assert_eq!(pop.member(0).unwrap().genes(), &[2.0]);
    }

    #[test]
    fn test_out_of_range_access() {
        let mut pop = Population::new(2).unwrap();
        assert_eq!(
            pop.get(2).unwrap_err(),
            EvolveError::IndexOutOfRange { index: 2, len: 2 }
        );
        assert!(pop.get_mut(9).is_err());
        assert!(pop.set(2, Individual::new(1)).is_err());
    }

    #[test]
    fn test_member_of_empty_slot_is_runtime_error() {
        let pop = Population::new(2).unwrap();
        assert!(matches!(pop.member(1), Err(EvolveError::Runtime(_))));
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut pop =
            Population::from_individuals(vec![Individual::new(2), Individual::new(2)]).unwrap();
        assert!(pop.is_filled());
        pop.release();
        assert_eq!(pop.len(), 2);
        assert_eq!(pop.iter().count(), 0);
        pop.release();
        assert_eq!(pop.len(), 2);
    }

    #[test]
    fn test_get_mut_writes_through() {
        let mut pop = Population::from_individuals(vec![Individual::new(1)]).unwrap();
        pop.get_mut(0).unwrap().unwrap().set_fitness(3.0);
        assert_eq!(pop.member(0).unwrap().fitness(), Some(3.0));
    }
}
