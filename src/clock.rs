use embassy_time::Instant;

/// Monotonic time source with a "sleep until" primitive.
///
/// The control loop never reads the time any other way, so the same code runs
/// against the embassy time driver on target and a simulated clock in tests.
#[allow(async_fn_in_trait)]
pub trait Clock {
    fn now(&self) -> Instant;

    /// Returns immediately if `deadline` has already passed.
    async fn sleep_until(&mut self, deadline: Instant);
}
