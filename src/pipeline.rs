//! One collection run: every configured theater, then aggregation and
//! rendering. Any theater failing aborts the run before anything is written.

use crate::aggregate::aggregate;
use crate::config::Config;
use crate::{Fetcher, ScrapeError, Show, SiteAdapter, report};
use chrono::NaiveDateTime;
use futures::future::try_join_all;
use tracing::{Instrument, error, info, info_span};

/// Run all adapters concurrently and concatenate their shows in adapter order.
pub async fn collect_shows(
    adapters: &[Box<dyn SiteAdapter>],
    fetcher: &dyn Fetcher,
) -> Result<Vec<Show>, ScrapeError> {
    let runs = adapters.iter().map(|adapter| {
        let span = info_span!("theater", cinema = %adapter.cinema());
        async move {
            let shows = adapter
                .get_shows(fetcher)
                .await
                .inspect_err(|e| error!(error = %e, "collection failed"))?;
            info!(shows = shows.len(), "collected");
            Ok::<_, ScrapeError>(shows)
        }
        .instrument(span)
    });

    let per_theater = try_join_all(runs).await?;
    Ok(per_theater.into_iter().flatten().collect())
}

/// Collect, aggregate and render the full report document.
///
/// `now` stamps the report and anchors the year for sites that omit it.
pub async fn build_report(
    config: &Config,
    fetcher: &dyn Fetcher,
    now: NaiveDateTime,
) -> Result<Vec<u8>, ScrapeError> {
    let adapters = config.adapters(now.date());
    let shows = collect_shows(&adapters, fetcher).await?;

    let programme = aggregate(&shows);
    info!(
        theaters = adapters.len(),
        shows = shows.len(),
        weeks = programme.weeks.len(),
        "aggregated"
    );

    let html = report::render(&programme, now)?;
    Ok(html.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StaticFetcher;
    use chrono::NaiveDate;

    const CONFIG: &str = r#"
        [[theater]]
        name = "Filmhaus"
        kind = "flat-list"
        url = "https://filmhaus.test/"

        [[theater]]
        name = "Lichtspiele"
        kind = "json-feed-a"
        url = "https://lichtspiele.test/api"
    "#;

    const FLAT: &str = r#"<div class="vorstellung"><span class="datum">07.03.2025</span>
        <span class="uhrzeit">20:00</span><span class="titel">Flow</span></div>"#;

    const FEED: &str = r#"[{"title":"Flow","showtimes":[{"start":"2025-03-06T18:00","attributes":["OV"]}]}]"#;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 5)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn concatenates_in_configuration_order() {
        let config = Config::from_toml_str(CONFIG).unwrap();
        let fetcher = StaticFetcher::default()
            .with("https://filmhaus.test/", FLAT)
            .with("https://lichtspiele.test/api", FEED);

        let shows = collect_shows(&config.adapters(now().date()), &fetcher)
            .await
            .unwrap();
        let cinemas: Vec<_> = shows.iter().map(|s| s.cinema.as_str()).collect();
        assert_eq!(cinemas, vec!["Filmhaus", "Lichtspiele"]);
    }

    #[tokio::test]
    async fn one_failing_theater_aborts_the_run() {
        let config = Config::from_toml_str(CONFIG).unwrap();
        let fetcher = StaticFetcher::default().with("https://filmhaus.test/", FLAT);

        let result = build_report(&config, &fetcher, now()).await;
        assert!(matches!(result, Err(ScrapeError::Fetch(_))));
    }

    #[tokio::test]
    async fn report_contains_both_editions() {
        let config = Config::from_toml_str(CONFIG).unwrap();
        let fetcher = StaticFetcher::default()
            .with("https://filmhaus.test/", FLAT)
            .with("https://lichtspiele.test/api", FEED);

        let html = String::from_utf8(build_report(&config, &fetcher, now()).await.unwrap()).unwrap();
        assert!(html.contains("Stand: 05.03.2025 08:00"));
        assert_eq!(html.matches("<table class=\"film\"").count(), 2);
        assert!(html.contains("<span class=\"extra\">(OV)</span>"));
    }
}
