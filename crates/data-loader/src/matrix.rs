//! Dense user-destination interaction matrix.
//!
//! Cell values are positive engagement signals (a visit recorded in a user's
//! travel history loads as 1.0) or 0.0 for "no interaction". Row order
//! matches the dense user index, column order the dense destination index.
//!
//! The matrix is never mutated while scoring. Hold-out evaluation works on a
//! masked copy produced by [`InteractionMatrix::masked`], so there is no
//! restore step to get wrong.

use serde::{Deserialize, Serialize};

/// Dense `num_users x num_destinations` matrix of engagement signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionMatrix {
    num_users: usize,
    num_destinations: usize,
    /// Row-major cell data, length num_users * num_destinations
    data: Vec<f32>,
}

impl InteractionMatrix {
    /// All-zero matrix of the given shape
    pub fn zeros(num_users: usize, num_destinations: usize) -> Self {
        Self {
            num_users,
            num_destinations,
            data: vec![0.0; num_users * num_destinations],
        }
    }

    pub fn num_users(&self) -> usize {
        self.num_users
    }

    pub fn num_destinations(&self) -> usize {
        self.num_destinations
    }

    /// Value at (user_idx, dest_idx). Panics on out-of-range indices.
    pub fn get(&self, user_idx: usize, dest_idx: usize) -> f32 {
        assert!(dest_idx < self.num_destinations, "dest index out of range");
        self.data[user_idx * self.num_destinations + dest_idx]
    }

    /// Set the value at (user_idx, dest_idx). Panics on out-of-range indices.
    pub fn set(&mut self, user_idx: usize, dest_idx: usize, value: f32) {
        assert!(dest_idx < self.num_destinations, "dest index out of range");
        self.data[user_idx * self.num_destinations + dest_idx] = value;
    }

    /// One user's full interaction row
    pub fn row(&self, user_idx: usize) -> &[f32] {
        let start = user_idx * self.num_destinations;
        &self.data[start..start + self.num_destinations]
    }

    /// Destination indices this user has a nonzero signal for
    pub fn visited_indices(&self, user_idx: usize) -> Vec<usize> {
        self.row(user_idx)
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v > 0.0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Whether this user has any recorded interaction at all
    pub fn has_interactions(&self, user_idx: usize) -> bool {
        self.row(user_idx).iter().any(|&v| v > 0.0)
    }

    /// Mean engagement per destination across all users.
    ///
    /// Used as the cold-start fallback: a user without history is scored by
    /// overall population interest.
    pub fn column_means(&self) -> Vec<f32> {
        let mut means = vec![0.0f32; self.num_destinations];
        if self.num_users == 0 {
            return means;
        }
        for user_idx in 0..self.num_users {
            for (dest_idx, &value) in self.row(user_idx).iter().enumerate() {
                means[dest_idx] += value;
            }
        }
        for mean in &mut means {
            *mean /= self.num_users as f32;
        }
        means
    }

    /// A copy of the matrix with the given cells zeroed.
    ///
    /// This is how evaluation hides held-out interactions: the original
    /// matrix stays untouched, so the pre-call state is preserved on every
    /// exit path by construction.
    pub fn masked(&self, hidden_cells: &[(usize, usize)]) -> InteractionMatrix {
        let mut copy = self.clone();
        for &(user_idx, dest_idx) in hidden_cells {
            copy.set(user_idx, dest_idx, 0.0);
        }
        copy
    }
}
