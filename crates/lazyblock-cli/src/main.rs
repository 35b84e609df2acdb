use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::Level;

use lazyblock_core::LoaderBuilder;
use lazyblock_core::app::{ActivationCounts, InitReport};
use lazyblock_core::domain::{ActivationState, Config, Element, InvocationError, NodeId};
use lazyblock_core::impls::{
    InMemoryDocument, ManualViewport, RecordingStylesheetFetcher, StaticModuleFetcher,
};
use lazyblock_core::ports::{BlockContext, BlockModule, CriticalCssSet};

/// Dry-run the lazy loader against a page fixture.
#[derive(Debug, Parser)]
#[command(name = "lazyblock", version)]
struct Args {
    /// Loader options (JSON). Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Page fixture (JSON) with the elements to scan.
    #[arg(long)]
    page: PathBuf,

    /// Nodes to report as visible after init. Defaults to every candidate.
    #[arg(long, value_delimiter = ',')]
    visible: Option<Vec<u64>>,

    /// Pretend the runtime has no intersection primitive.
    #[arg(long)]
    no_observer: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageFixture {
    elements: Vec<Element>,
    /// Keys whose CSS the page already inlines.
    critical_config: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct Summary {
    report: InitReport,
    counts: ActivationCounts,
    /// Nodes the watcher was still waiting on at shutdown.
    still_watching: usize,
    nodes: Vec<NodeSummary>,
    modules_fetched: Vec<String>,
    stylesheets_fetched: Vec<String>,
}

#[derive(Debug, Serialize)]
struct NodeSummary {
    id: NodeId,
    key: String,
    state: ActivationState,
    classes: Vec<String>,
}

/// Stand-in for a real block: logs the call.
struct LoggingBlock;

impl BlockModule for LoggingBlock {
    fn init(&self, ctx: BlockContext) -> Result<(), InvocationError> {
        tracing::info!(node = %ctx.node.id, key = %ctx.node.key, css = ctx.css, "block initializer called");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_json_str(&std::fs::read_to_string(path)?)?,
        None => Config::default(),
    };
    let level = if config.debug_log_messages {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let fixture: PageFixture = serde_json::from_str(&std::fs::read_to_string(&args.page)?)?;
    let critical = match fixture.critical_config {
        Some(keys) => CriticalCssSet::new(keys),
        None => CriticalCssSet::absent(),
    };

    let document = Arc::new(InMemoryDocument::new(fixture.elements));
    let viewport = Arc::new(if args.no_observer {
        ManualViewport::unavailable()
    } else {
        ManualViewport::new()
    });
    let modules = Arc::new(StaticModuleFetcher::new().with_fallback(Arc::new(LoggingBlock)));
    let stylesheets = Arc::new(RecordingStylesheetFetcher::new());

    let loader = LoaderBuilder::new(config)
        .document(document.clone())
        .viewport(viewport.clone())
        .modules(modules.clone())
        .stylesheets(stylesheets.clone())
        .critical_css(Arc::new(critical))
        .build()?;

    let session = loader.init().await;
    tracing::info!(report = ?session.report(), "init complete");

    let visible: Vec<NodeId> = match args.visible {
        Some(ids) => ids.into_iter().map(NodeId::new).collect(),
        None => session.candidates().iter().map(|n| n.id).collect(),
    };
    viewport.scroll_into_view(&visible);

    let report = session.report().clone();
    let candidates = session.candidates().to_vec();
    let controller = Arc::clone(session.controller());
    let still_watching = session.watcher().map_or(0, |w| w.pending());
    session.shutdown().await;

    let summary = Summary {
        report,
        counts: controller.counts(),
        still_watching,
        nodes: candidates
            .iter()
            .map(|n| NodeSummary {
                id: n.id,
                key: n.key.to_string(),
                state: controller.state(n.id),
                classes: document.classes(n.id),
            })
            .collect(),
        modules_fetched: modules.fetches(),
        stylesheets_fetched: stylesheets.fetched(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
