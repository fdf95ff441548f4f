use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use popscope::config::DashboardConfig;
use popscope::data::filter::{FilterUpdate, YearRange};
use popscope::data::model::{Feature, HitFlag, Row};
use popscope::data::store::RowStore;
use popscope::error::ViewError;
use popscope::state::Dashboard;
use popscope::views::{HitCount, Trigger, ViewKind, ViewSet};

fn scenario_rows() -> Vec<Row> {
    vec![
        Row::new("pop", "dance pop")
            .with_year(2019)
            .with_popularity(75.0)
            .with_feature(Feature::Energy, 0.8)
            .with_feature(Feature::Danceability, 0.7),
        Row::new("pop", "dance pop")
            .with_year(2019)
            .with_popularity(60.0)
            .with_feature(Feature::Energy, 0.6)
            .with_feature(Feature::Danceability, 0.5),
        Row::new("rock", "classic rock")
            .with_year(2005)
            .with_popularity(40.0)
            .with_feature(Feature::Energy, 0.5)
            .with_feature(Feature::Danceability, 0.4),
    ]
}

fn dashboard(rows: Vec<Row>) -> Dashboard {
    Dashboard::new(Arc::new(RowStore::from_rows(rows)), &DashboardConfig::default())
}

/// JSON form of every view, so sets from different passes can be compared.
fn snapshot(set: &ViewSet) -> Vec<String> {
    ViewKind::ALL
        .into_iter()
        .map(|kind| serde_json::to_string(set.view(kind).unwrap()).unwrap())
        .collect()
}

#[tokio::test]
async fn load_builds_every_view() {
    let mut dash = dashboard(scenario_rows());
    let set = dash.load().await;

    assert_eq!(set.trigger, Trigger::Load);
    assert!(set.filters.is_empty());
    assert_eq!(set.results().count(), ViewKind::ALL.len());
    assert!(set.results().all(|(_, result)| result.is_ok()));

    let counts = set.track_counts().unwrap();
    assert_eq!(counts.total, 3);
    assert_eq!(counts.filtered, 3);
}

#[tokio::test]
async fn hit_filter_scenario() {
    let mut dash = dashboard(scenario_rows());
    dash.load().await;
    let set = dash.set_filter(FilterUpdate::Hit(Some(HitFlag::Hit))).await;

    assert_eq!(set.trigger, Trigger::FilterChange);
    assert_eq!(set.filters.hit(), Some(HitFlag::Hit));
    assert_eq!(
        set.hit_distribution().unwrap(),
        &[
            HitCount { key: HitFlag::Hit, count: 1 },
            HitCount { key: HitFlag::NonHit, count: 2 },
        ]
    );
    assert_eq!(set.track_counts().unwrap().filtered, 1);
}

#[tokio::test]
async fn year_range_then_clear_restores_baseline() {
    let mut dash = dashboard(scenario_rows());
    let baseline = dash.load().await;

    let narrowed = dash
        .set_filter(FilterUpdate::YearRange(Some(YearRange::new(2010, 2023))))
        .await;
    let rollup = narrowed.genre_rollup().unwrap();
    assert_eq!(rollup.len(), 1);
    assert_eq!(rollup[0].genre, "pop");
    assert_eq!(rollup[0].track_count, 2);
    assert_eq!(rollup[0].avg_popularity, 67.5);

    let cleared = dash.clear_all().await;
    assert!(dash.filters().is_empty());
    assert_eq!(snapshot(&cleared), snapshot(&baseline));
}

#[tokio::test]
async fn toggling_a_genre_twice_clears_the_axis() {
    let mut dash = dashboard(scenario_rows());
    dash.load().await;

    let on = dash.toggle_genre(" Pop ").await;
    assert!(on.filters.genre_selected("pop"));
    let rollup = on.genre_rollup().unwrap();
    assert_eq!(rollup.len(), 2);
    assert!(rollup.iter().any(|g| g.genre == "pop" && g.selected));

    let off = dash.toggle_genre("pop").await;
    assert!(off.filters.genres().is_none());
    assert!(dash.filters().is_empty());
}

#[tokio::test]
async fn repeated_filters_give_identical_views() {
    let mut dash = dashboard(scenario_rows());
    dash.load().await;

    let first = dash.toggle_subgenre("dance pop").await;
    let second = dash
        .set_filter(FilterUpdate::Subgenres(Some(vec!["dance pop".to_string()])))
        .await;

    assert!(second.pass > first.pass);
    assert_eq!(first.filters, second.filters);
    assert_eq!(snapshot(&first), snapshot(&second));
}

#[tokio::test]
async fn published_views_match_returned_views() {
    let mut dash = dashboard(scenario_rows());
    let mut rx = dash.subscribe();
    assert_eq!(rx.borrow_and_update().pass, 0);

    let set = dash.toggle_genre("rock").await;
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().pass, set.pass);
    assert_eq!(dash.views().pass, set.pass);
}

#[tokio::test]
async fn file_backed_store_fetches_once() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(
        file,
        "track_name,playlist_genre,playlist_subgenre,track_album_release_date,track_popularity,energy,danceability"
    )
    .unwrap();
    writeln!(file, "a,Pop,Dance Pop,2019-06-01,75,0.8,0.7").unwrap();
    writeln!(file, "b,pop,dance pop,2019,60,0.6,0.5").unwrap();
    writeln!(file, "c,rock,classic rock,2005-01-01,40,0.5,0.4").unwrap();
    file.flush().unwrap();

    let store = Arc::new(RowStore::from_path(file.path()));
    let mut dash = Dashboard::new(Arc::clone(&store), &DashboardConfig::default());

    let set = dash.load().await;
    assert_eq!(set.track_counts().unwrap().total, 3);
    dash.toggle_genre("pop").await;
    dash.clear_all().await;

    assert_eq!(store.fetch_count(), 1);
}

#[tokio::test]
async fn load_failure_marks_every_view() {
    let store = Arc::new(RowStore::from_path("/nonexistent/tracks.csv"));
    let mut dash = Dashboard::new(Arc::clone(&store), &DashboardConfig::default());

    let set = dash.load().await;
    assert_eq!(set.results().count(), ViewKind::ALL.len());
    for (kind, result) in set.results() {
        assert!(matches!(result, Err(ViewError::Load(_))), "{kind}");
    }
    assert_eq!(store.fetch_count(), 1);

    dash.toggle_genre("pop").await;
    assert_eq!(store.fetch_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn resize_burst_runs_one_pass() {
    let mut dash = dashboard(scenario_rows());
    let loaded = dash.load().await;

    dash.resize();
    tokio::time::sleep(Duration::from_millis(100)).await;
    dash.resize();
    tokio::time::sleep(Duration::from_millis(100)).await;
    dash.resize();

    // Still inside the quiet window of the last resize.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(dash.views().pass, loaded.pass);

    tokio::time::sleep(Duration::from_millis(500)).await;
    let resized = dash.views();
    assert_eq!(resized.trigger, Trigger::Resize);
    assert_eq!(resized.pass, loaded.pass + 1);
    assert_eq!(snapshot(&resized), snapshot(&loaded));
}

#[tokio::test(start_paused = true)]
async fn resize_keeps_current_filters() {
    let mut dash = dashboard(scenario_rows());
    dash.load().await;
    dash.resize();
    let filtered = dash.set_filter(FilterUpdate::Hit(Some(HitFlag::NonHit))).await;

    tokio::time::sleep(Duration::from_secs(1)).await;
    let latest = dash.views();
    assert_eq!(latest.trigger, Trigger::Resize);
    assert_eq!(latest.filters, filtered.filters);
    assert_eq!(latest.track_counts().unwrap().filtered, 2);
}
