//! Host callback scheduling
//!
//! While playing, the controller keeps exactly one tick request outstanding
//! with the host. Each request carries a [`TickTicket`]; leaving `Playing`
//! cancels the outstanding ticket and bumps the controller generation, so a
//! callback that still arrives for an old ticket is ignored.

/// Handle for one scheduled host callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickTicket {
    /// Controller generation the ticket was issued in
    pub generation: u64,
    /// Issue sequence number, unique per controller
    pub seq: u64,
}

/// Host-side scheduler of per-frame callbacks
///
/// `request` arranges for [`PlaybackController::tick`](crate::PlaybackController::tick)
/// to be called with the ticket on the host's next animation callback.
pub trait TickScheduler {
    /// Schedule the next callback
    fn request(&mut self, ticket: TickTicket);

    /// Cancel a callback that has not fired yet
    fn cancel(&mut self, _ticket: TickTicket) {}
}

impl<T: TickScheduler + ?Sized> TickScheduler for Box<T> {
    fn request(&mut self, ticket: TickTicket) {
        (**self).request(ticket)
    }

    fn cancel(&mut self, ticket: TickTicket) {
        (**self).cancel(ticket)
    }
}

/// Scheduler for hosts that poll: the host loop takes the pending ticket
/// and delivers it with the current timestamp
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    pending: Option<TickTicket>,
    requested: u64,
    cancelled: u64,
}

impl ManualScheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the pending ticket for delivery
    pub fn take(&mut self) -> Option<TickTicket> {
        self.pending.take()
    }

    /// Peek at the pending ticket
    pub fn pending(&self) -> Option<TickTicket> {
        self.pending
    }

    /// Total number of requests received
    pub fn requested(&self) -> u64 {
        self.requested
    }

    /// Total number of cancellations received
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl TickScheduler for ManualScheduler {
    fn request(&mut self, ticket: TickTicket) {
        self.pending = Some(ticket);
        self.requested += 1;
    }

    fn cancel(&mut self, ticket: TickTicket) {
        if self.pending == Some(ticket) {
            self.pending = None;
        }
        self.cancelled += 1;
    }
}
