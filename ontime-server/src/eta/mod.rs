//! ETA providers.
//!
//! An ETA provider reports, as of the moment it is asked, how many minutes
//! until the next vehicles of a route reach a stop. Providers are consulted
//! once per target when a [`WaitSnapshot`](crate::oracle::WaitSnapshot) is
//! captured and never by the solver itself.
//!
//! Live adapters (bus arrival feeds, subway position feeds) live outside this
//! crate and plug in through [`EtaProvider`]. [`StaticEtaProvider`] serves
//! arrivals from a JSON file for development and tests.

mod error;
mod mock;

use std::future::Future;

pub use error::EtaError;
pub use mock::StaticEtaProvider;

/// Source of upcoming arrival estimates.
pub trait EtaProvider: Send + Sync {
    /// Short name identifying this provider in logs.
    fn name(&self) -> &str;

    /// Minutes until the next `route` vehicle reaches `stop`.
    ///
    /// `Ok(None)` means the provider has no data for the pair; errors are
    /// reserved for failures of the provider itself.
    fn eta_minutes(
        &self,
        stop: &str,
        route: &str,
    ) -> impl Future<Output = Result<Option<u32>, EtaError>> + Send;

    /// Minutes until each of the next `max_results` vehicles, ascending.
    ///
    /// Providers that only know the next vehicle return at most one entry.
    fn next_arrivals(
        &self,
        stop: &str,
        route: &str,
        max_results: usize,
    ) -> impl Future<Output = Result<Vec<u32>, EtaError>> + Send {
        async move {
            let next = self.eta_minutes(stop, route).await?;
            Ok(next.into_iter().take(max_results).collect())
        }
    }
}
