//! Ready queue of admitted, not-yet-dispatched jobs.
//!
//! A max-first priority queue: the job with the highest score is popped
//! first. Exact score ties are broken by an explicit [`TieBreaker`] and,
//! finally, by admission order, so dispatch order never depends on heap
//! internals.

use std::cmp::Ordering;
use std::collections::HashMap;

use priority_queue::PriorityQueue;
use serde::{Deserialize, Serialize};

use super::RuleScore;
use crate::error::{SimError, SimResult};
use crate::models::Job;

/// How exact score ties are broken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreaker {
    /// Earlier admission first.
    #[default]
    ArrivalOrder,
    /// Smaller job ID first, then earlier admission.
    ById,
}

/// Dispatch ordering key.
///
/// `Ord` is "more urgent is greater": a higher score wins, then a smaller
/// tie-break value, then an earlier admission sequence number.
#[derive(Debug, Clone, Copy)]
pub struct DispatchKey {
    /// Priority score of the job.
    pub score: RuleScore,
    tie: u64,
    seq: u64,
}

impl DispatchKey {
    /// Admission sequence number (0-based).
    pub fn sequence(&self) -> u64 {
        self.seq
    }
}

impl Ord for DispatchKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .partial_cmp(&other.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.tie.cmp(&self.tie))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for DispatchKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for DispatchKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DispatchKey {}

/// Max-first ready queue.
///
/// `insert` and `pop` are O(log n).
#[derive(Debug)]
pub struct ReadyQueue {
    // PriorityQueue(admission seq, key)
    heap: PriorityQueue<u64, DispatchKey>,
    jobs: HashMap<u64, Job>,
    tie_breaker: TieBreaker,
    next_seq: u64,
}

impl ReadyQueue {
    /// Creates an empty queue.
    pub fn new(tie_breaker: TieBreaker) -> Self {
        Self {
            heap: PriorityQueue::new(),
            jobs: HashMap::new(),
            tie_breaker,
            next_seq: 0,
        }
    }

    /// Inserts a job with its score and returns the assigned key.
    pub fn insert(&mut self, job: Job, score: RuleScore) -> DispatchKey {
        let seq = self.next_seq;
        self.next_seq += 1;

        let tie = match self.tie_breaker {
            TieBreaker::ArrivalOrder => 0,
            TieBreaker::ById => job.id,
        };
        let key = DispatchKey { score, tie, seq };

        self.heap.push(seq, key);
        self.jobs.insert(seq, job);
        key
    }

    /// Removes and returns the most urgent job.
    ///
    /// # Errors
    /// `SimError::InternalInvariant` if the heap entry has no stored job.
    pub fn pop(&mut self) -> SimResult<Option<(Job, DispatchKey)>> {
        let Some((seq, key)) = self.heap.pop() else {
            return Ok(None);
        };
        let job = self.jobs.remove(&seq).ok_or_else(|| {
            SimError::invariant(format!("ready queue entry {seq} has no stored job"))
        })?;
        Ok(Some((job, key)))
    }

    /// The most urgent job, without removing it.
    pub fn peek(&self) -> Option<(&Job, &DispatchKey)> {
        let (seq, key) = self.heap.peek()?;
        self.jobs.get(seq).map(|job| (job, key))
    }

    /// Number of queued jobs.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Total number of jobs ever inserted.
    pub fn admitted(&self) -> u64 {
        self.next_seq
    }
}

impl Default for ReadyQueue {
    fn default() -> Self {
        Self::new(TieBreaker::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatching::PriorityFunction;
    use crate::models::JobId;

    fn drain(queue: &mut ReadyQueue) -> Vec<JobId> {
        std::iter::from_fn(|| queue.pop().unwrap().map(|(job, _)| job.id)).collect()
    }

    #[test]
    fn test_highest_score_first() {
        let mut queue = ReadyQueue::default();
        queue.insert(Job::new(1), 1.0);
        queue.insert(Job::new(2), 10.0);
        queue.insert(Job::new(3), -5.0);
        queue.insert(Job::new(4), 3.5);

        assert_eq!(drain(&mut queue), vec![2, 4, 1, 3]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_negated_key_example() {
        // A scores 5 - 10 + 2 = -3, B scores 1 - 1 + 1 = 1 → B first.
        let function = PriorityFunction::default();
        let a = Job::new(1)
            .with_priority(5.0)
            .with_deadline(10.0)
            .with_estimate(2.0);
        let b = Job::new(2)
            .with_priority(1.0)
            .with_deadline(1.0)
            .with_estimate(1.0);

        let mut queue = ReadyQueue::default();
        let score_a = function.score(&a);
        let score_b = function.score(&b);
        queue.insert(a, score_a);
        queue.insert(b, score_b);

        assert_eq!(drain(&mut queue), vec![2, 1]);
    }

    #[test]
    fn test_ties_by_arrival_order() {
        let mut queue = ReadyQueue::new(TieBreaker::ArrivalOrder);
        for id in [30, 10, 20] {
            queue.insert(Job::new(id), 1.0);
        }
        assert_eq!(drain(&mut queue), vec![30, 10, 20]);
    }

    #[test]
    fn test_ties_by_id() {
        let mut queue = ReadyQueue::new(TieBreaker::ById);
        for id in [30, 10, 20] {
            queue.insert(Job::new(id), 1.0);
        }
        queue.insert(Job::new(99), 2.0);
        assert_eq!(drain(&mut queue), vec![99, 10, 20, 30]);
    }

    #[test]
    fn test_peek_matches_pop() {
        let mut queue = ReadyQueue::default();
        assert!(queue.peek().is_none());
        queue.insert(Job::new(1), 0.0);
        queue.insert(Job::new(2), 2.0);

        assert_eq!(queue.peek().map(|(job, _)| job.id), Some(2));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop().unwrap().map(|(job, _)| job.id), Some(2));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_sequence_numbers() {
        let mut queue = ReadyQueue::default();
        let k0 = queue.insert(Job::new(5), 0.0);
        let k1 = queue.insert(Job::new(6), 0.0);
        assert_eq!(k0.sequence(), 0);
        assert_eq!(k1.sequence(), 1);
        assert!(k0 > k1);
        assert_eq!(queue.admitted(), 2);
    }

    #[test]
    fn test_bulk_descending_priority() {
        let function = PriorityFunction::default();
        let mut queue = ReadyQueue::default();
        // Shuffled insertion order.
        for i in 0..1000u64 {
            let id = (i * 7919) % 1000;
            let job = Job::new(id).with_priority(id as f64);
            let score = function.score(&job);
            queue.insert(job, score);
        }

        let order = drain(&mut queue);
        assert_eq!(order.len(), 1000);
        assert!(order.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_pop_without_stored_job_is_invariant_error() {
        let mut queue = ReadyQueue::default();
        queue.insert(Job::new(1), 1.0);
        queue.jobs.clear();

        let err = queue.pop().unwrap_err();
        assert!(matches!(err, SimError::InternalInvariant { .. }));
    }

    #[test]
    fn test_pop_empty() {
        assert!(ReadyQueue::default().pop().unwrap().is_none());
    }
}
