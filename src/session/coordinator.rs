//! Single-flight guard shared by every caller that needs a fresh access token.
//!
//! The first caller claims the slot under a short synchronous lock, releases the lock, and drives
//! the refresh. Callers arriving while the slot is occupied clone the same handle and wait for
//! its outcome. The leader records the outcome first and clears the slot second, so every waiter
//! observes the result of the cycle it joined while the next caller starts a new cycle. A cycle
//! whose leader is dropped mid-flight is taken over by the first waiter that notices.

// self
use crate::{_prelude::*, auth::TokenSecret, error::RefreshError};

/// Result every participant of a refresh cycle observes.
pub type RefreshOutcome = Result<TokenSecret, RefreshError>;

struct RefreshHandle {
	outcome: AsyncOnceCell<RefreshOutcome>,
}
impl RefreshHandle {
	fn new() -> Self {
		Self { outcome: AsyncOnceCell::new() }
	}
}

enum Claim {
	Leader(Arc<RefreshHandle>),
	Follower(Arc<RefreshHandle>),
}

/// Mutex-guarded optional handle to the refresh currently in flight.
#[derive(Default)]
pub struct RefreshCoordinator {
	in_flight: Mutex<Option<Arc<RefreshHandle>>>,
}
impl RefreshCoordinator {
	/// Returns `true` while a refresh cycle is running.
	pub fn is_in_flight(&self) -> bool {
		self.in_flight.lock().is_some()
	}

	/// Runs `start` unless a cycle is already in flight, in which case the caller awaits that
	/// cycle's outcome instead.
	///
	/// `start` is invoked by at most one caller per cycle. If the leading future is dropped before
	/// `start` completes, its waiters claim the slot again and one of them drives a fresh cycle, so
	/// [`RefreshError::Abandoned`] is never returned from here.
	pub async fn run<F, Fut>(&self, start: F) -> RefreshOutcome
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = RefreshOutcome>,
	{
		loop {
			match self.claim() {
				Claim::Follower(handle) => match handle.outcome.wait().await {
					Err(RefreshError::Abandoned) => self.release(&handle),
					outcome => return outcome.clone(),
				},
				Claim::Leader(handle) => {
					let lease = RefreshLease { coordinator: self, handle, settled: false };
					let outcome = start().await;

					return lease.settle(outcome).await;
				},
			}
		}
	}

	fn claim(&self) -> Claim {
		let mut slot = self.in_flight.lock();

		if let Some(handle) = slot.as_ref() {
			return Claim::Follower(handle.clone());
		}

		let handle = Arc::new(RefreshHandle::new());

		*slot = Some(handle.clone());

		Claim::Leader(handle)
	}

	fn release(&self, handle: &Arc<RefreshHandle>) {
		let mut slot = self.in_flight.lock();

		if slot.as_ref().is_some_and(|current| Arc::ptr_eq(current, handle)) {
			*slot = None;
		}
	}
}
impl Debug for RefreshCoordinator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshCoordinator")
			.field("in_flight", &self.is_in_flight())
			.finish()
	}
}

// Leader-side ownership of the slot; settles the cycle on every exit path.
struct RefreshLease<'a> {
	coordinator: &'a RefreshCoordinator,
	handle: Arc<RefreshHandle>,
	settled: bool,
}
impl RefreshLease<'_> {
	async fn settle(mut self, outcome: RefreshOutcome) -> RefreshOutcome {
		let _ = self.handle.outcome.set(outcome.clone()).await;

		self.settled = true;
		self.coordinator.release(&self.handle);

		outcome
	}
}
impl Drop for RefreshLease<'_> {
	fn drop(&mut self) {
		if !self.settled {
			let _ = self.handle.outcome.set_blocking(Err(RefreshError::Abandoned));

			self.coordinator.release(&self.handle);
		}
	}
}
