use std::sync::Arc;

use beacon_config::BeaconConfig;
use beacon_protocol::{Category, PollSource};

use super::{
    ActionClient, CountFetcher, LogActivityFetcher, ReportFreshnessFetcher, ReturnsFetcher,
    SharedVerdict, SnapshotFetcher,
};

/// One fetcher per poll source, configured from `config`.
///
/// Reports and system updates ask the same question. They keep separate
/// cursors and timers but share one answer per half of the shorter period.
pub fn default_fetchers(
    config: &BeaconConfig,
    client: Arc<dyn ActionClient>,
) -> Vec<Arc<dyn SnapshotFetcher>> {
    let reuse_for = config
        .polling
        .period(Category::Reports.into())
        .min(config.polling.period(PollSource::SystemUpdates))
        / 2;
    let verdict = Arc::new(SharedVerdict::new(reuse_for));
    PollSource::all()
        .filter_map(|source| fetcher_for(source, config, client.clone(), &verdict))
        .collect()
}

fn fetcher_for(
    source: PollSource,
    config: &BeaconConfig,
    client: Arc<dyn ActionClient>,
    verdict: &Arc<SharedVerdict>,
) -> Option<Arc<dyn SnapshotFetcher>> {
    let fetcher: Arc<dyn SnapshotFetcher> = match source {
        PollSource::Category(Category::Returns) => {
            let fetcher = ReturnsFetcher::new(client, config.returns.limit());
            if config.returns.group_by_reason() {
                Arc::new(fetcher.with_reason_groups())
            } else {
                Arc::new(fetcher)
            }
        }
        PollSource::Category(Category::Reports) => {
            Arc::new(
                ReportFreshnessFetcher::for_reports(client, &config.reports)
                    .sharing(Arc::clone(verdict)),
            )
        }
        PollSource::Category(Category::Logs) => Arc::new(LogActivityFetcher::new(
            client,
            config.reports.window_hours(),
        )),
        PollSource::Category(category) => Arc::new(CountFetcher::new(client, category)?),
        PollSource::SystemUpdates => Arc::new(
            ReportFreshnessFetcher::for_system_updates(client, &config.reports)
                .sharing(Arc::clone(verdict)),
        ),
    };
    Some(fetcher)
}
