use crate::{
    guard::{GuardConfig, NavigationGuard},
    navigation::{BasePath, Location, Navigation, Navigator},
    routes::{RouteTable, View},
    storage::{FileStore, TokenAuth},
};
use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use std::{collections::BTreeMap, path::PathBuf, sync::Arc};
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub to: String,
    pub from: String,
    pub storage: PathBuf,
    pub public_paths: Vec<String>,
    pub redirect_to: String,
    pub base: String,
}

/// Where a navigation landed, as browser URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirected_from: Option<String>,
    pub views: Vec<View>,
    pub params: BTreeMap<String, String>,
}

impl Report {
    fn new(navigation: &Navigation, base: &BasePath) -> Self {
        let (views, params) = navigation
            .route
            .as_ref()
            .map(|route| (route.views.clone(), route.params.clone()))
            .unwrap_or_default();

        Self {
            from: base.href(&navigation.from),
            to: base.href(&navigation.to),
            redirected_from: navigation
                .redirected_from
                .as_ref()
                .map(|location| base.href(location)),
            views,
            params,
        }
    }
}

/// Execute the navigate action and print the report as JSON.
/// # Errors
/// Returns an error if a URL lies outside the base path or the navigation fails.
pub fn execute(args: &Args) -> Result<()> {
    let report = run(args)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Run one navigation against the storage file.
/// # Errors
/// Returns an error if a URL lies outside the base path or the navigation fails.
pub fn run(args: &Args) -> Result<Report> {
    let base = BasePath::new(&args.base);
    let from = route_location(&base, &args.from)?;
    let to = route_location(&base, &args.to)?;

    let auth = TokenAuth::new(FileStore::new(args.storage.clone()));
    let guard = NavigationGuard::new(
        GuardConfig::new(args.public_paths.iter(), args.redirect_to.as_str()),
        Arc::new(auth),
    );
    debug!("{guard:?}");

    let routes = Arc::new(RouteTable::wasatext().context("invalid route table")?);
    let mut navigator = Navigator::new(routes, guard).starting_at(from);

    let navigation = navigator.push(&to.full_path())?;

    Ok(Report::new(&navigation, &base))
}

// Browser URL to route location, stripping the base prefix.
fn route_location(base: &BasePath, url: &str) -> Result<Location> {
    let mut location = Location::parse(url);
    location.path = base
        .strip(&location.path)
        .ok_or_else(|| anyhow!("{url} is outside the base path {}", base.as_str()))?;
    Ok(location)
}
