use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value as JsonValue};

use popscope::config::DashboardConfig;
use popscope::data::filter::{FilterUpdate, YearRange};
use popscope::data::model::HitFlag;
use popscope::data::store::RowStore;
use popscope::state::Dashboard;
use popscope::views::{ViewKind, ViewSet};

#[derive(Parser, Debug)]
#[command(name = "popscope", version, about = "Chart-ready views over a music track table")]
struct Cli {
    /// TOML configuration file
    #[arg(long, env = "POPSCOPE_CONFIG", default_value = "popscope.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print views as JSON
    Views {
        #[command(flatten)]
        filters: FilterArgs,
        /// Only print this view (e.g. genre_rollup)
        #[arg(long)]
        view: Option<ViewKind>,
    },
    /// Write one JSON file per view
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Track table (.csv, .json, .parquet); falls back to the config's data_path
    data: Option<PathBuf>,
    #[arg(long = "genre")]
    genres: Vec<String>,
    #[arg(long = "subgenre")]
    subgenres: Vec<String>,
    /// Inclusive year range, e.g. 2010-2023
    #[arg(long, value_parser = parse_year_range)]
    years: Option<YearRange>,
    /// Hit or Non-Hit
    #[arg(long)]
    hit: Option<HitFlag>,
}

impl FilterArgs {
    fn updates(&self) -> Vec<FilterUpdate> {
        let mut updates = Vec::new();
        if !self.genres.is_empty() {
            updates.push(FilterUpdate::Genres(Some(self.genres.clone())));
        }
        if !self.subgenres.is_empty() {
            updates.push(FilterUpdate::Subgenres(Some(self.subgenres.clone())));
        }
        if let Some(range) = self.years {
            updates.push(FilterUpdate::YearRange(Some(range)));
        }
        if let Some(flag) = self.hit {
            updates.push(FilterUpdate::Hit(Some(flag)));
        }
        updates
    }
}

fn parse_year_range(s: &str) -> Result<YearRange, String> {
    let (a, b) = s
        .split_once('-')
        .ok_or_else(|| format!("expected MIN-MAX, got '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<i32>()
            .map_err(|e| format!("bad year '{v}': {e}"))
    };
    Ok(YearRange::new(parse(a)?, parse(b)?))
}

fn view_json(set: &ViewSet, kind: ViewKind) -> JsonValue {
    match set.view(kind) {
        Ok(view) => serde_json::to_value(view).unwrap_or(JsonValue::Null),
        Err(e) => json!({ "error": e.to_string() }),
    }
}

async fn build_views(config: &DashboardConfig, filters: &FilterArgs) -> Result<Arc<ViewSet>> {
    let Some(path) = filters.data.clone().or_else(|| config.data_path.clone()) else {
        bail!("no track table given and no data_path in config");
    };
    let store = Arc::new(RowStore::from_path(path));
    let mut dashboard = Dashboard::new(store, config);

    let mut views = dashboard.load().await;
    for update in filters.updates() {
        views = dashboard.set_filter(update).await;
    }
    Ok(views)
}

fn export(set: &ViewSet, out: &Path) -> Result<()> {
    std::fs::create_dir_all(out).with_context(|| format!("creating {}", out.display()))?;
    for kind in ViewKind::ALL {
        let path = out.join(format!("{}.json", kind.name()));
        let text = serde_json::to_string_pretty(&view_json(set, kind))?;
        std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
        log::info!("wrote {}", path.display());
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = DashboardConfig::read(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let found = loaded.is_some();
    let config = loaded.unwrap_or_default();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();
    if !found {
        log::warn!("config {} not found, using defaults", cli.config.display());
    }

    match cli.command {
        Command::Views { filters, view } => {
            let set = build_views(&config, &filters).await?;
            let output = match view {
                Some(kind) => view_json(&set, kind),
                None => JsonValue::Object(
                    ViewKind::ALL
                        .into_iter()
                        .map(|k| (k.name().to_string(), view_json(&set, k)))
                        .collect(),
                ),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Export { filters, out } => {
            let set = build_views(&config, &filters).await?;
            export(&set, &out)?;
        }
    }
    Ok(())
}
