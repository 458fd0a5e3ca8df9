//! Folio CLI
//!
//! Simulate the portfolio's scroll choreography headlessly: lay out the page,
//! scroll it, resolve snaps, and render `llms.txt`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use folio_app::{to_css, PortfolioPage, Route};
use folio_core::render_llms_txt;
use folio_scroll::{ScrollHost, SnapResolver};

mod config;

use config::FolioConfig;

const FRAME: f32 = 1.0 / 60.0;
const MAX_SETTLE_FRAMES: usize = 600;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Folio scroll choreography CLI", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./folio.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mount the page, scroll it in steps, and report what happens
    Simulate {
        /// Route to mount
        #[arg(short, long, default_value = "/")]
        route: String,

        /// Number of scroll steps from top to bottom
        #[arg(short, long, default_value = "12")]
        steps: usize,

        /// Print every element's final style
        #[arg(long)]
        styles: bool,
    },

    /// Resolve scroll fractions against the laid-out page
    Snap {
        /// Fractions of the scrollable distance, 0..=1
        #[arg(required = true)]
        fractions: Vec<f32>,
    },

    /// Validate config, content and section bindings
    Check,

    /// Print llms.txt for the configured content
    Llms,

    /// Show the page layout and pinned intervals
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = FolioConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::Simulate {
            route,
            steps,
            styles,
        } => cmd_simulate(&config, &route, steps, styles),
        Commands::Snap { fractions } => cmd_snap(&config, &fractions),
        Commands::Check => cmd_check(&config),
        Commands::Llms => cmd_llms(&config),
        Commands::Info => cmd_info(&config),
    }
}

/// Build the page and mount `route`, waiting out the mount barrier
fn mount(config: &FolioConfig, route: Route) -> Result<PortfolioPage> {
    let content = config.load_content()?;
    let mut page = PortfolioPage::new(content, config.viewport_size(), config.page_options());

    let now = Instant::now();
    let summary = page.navigate(route, now);
    for (id, err) in &summary.failed {
        warn!("Section {} was not mounted: {}", id, err);
    }

    // Sections that failed never report ready; let the deadline pass
    if !page.coordinator().state().is_installed() {
        page.poll(now + config.snap.settle_delay() + Duration::from_millis(1));
    }
    Ok(page)
}

fn cmd_simulate(config: &FolioConfig, route: &str, steps: usize, show_styles: bool) -> Result<()> {
    let route: Route = route.parse().context("Invalid route")?;
    let page = mount(config, route)?;
    let max_scroll = page.layout().max_scroll();

    info!(
        "Simulating {} at {}x{} ({} sections, max scroll {:.0}px)",
        route,
        config.viewport.width,
        config.viewport.height,
        page.sections().len(),
        max_scroll
    );

    println!("{:>6}  {:>9}  {:>9}  {:>9}  {:>4}", "step", "scrolled", "snap", "rest", "nav");
    let steps = steps.max(1);
    for step in 0..=steps {
        let offset = max_scroll * step as f32 / steps as f32;
        page.scroll_to(offset);
        let snap = page.release();
        page.viewport().settle(FRAME, MAX_SETTLE_FRAMES);
        // Let lagging timelines catch up
        for _ in 0..60 {
            page.tick(FRAME);
        }

        println!(
            "{:>6}  {:>9.1}  {:>9}  {:>9.1}  {:>4}",
            step,
            offset,
            snap.map_or_else(|| "-".to_string(), |target| format!("{target:.1}")),
            page.viewport().offset(),
            if page.nav_visible() { "yes" } else { "no" }
        );
    }

    println!();
    println!("Section progress at {:.1}px:", page.viewport().offset());
    for section in page.sections() {
        for (id, progress) in section.progress() {
            println!("  {:<32} {:>5.1}%", id, progress * 100.0);
        }
    }

    if show_styles {
        println!();
        println!("Element styles:");
        for (element, properties) in page.styles().snapshot() {
            println!("  {:<32} {}", element, to_css(&properties));
        }
    }
    Ok(())
}

fn cmd_snap(config: &FolioConfig, fractions: &[f32]) -> Result<()> {
    let page = mount(config, Route::Home)?;
    let coordinator = page.coordinator();
    if !coordinator.state().is_installed() {
        warn!("No snap rule installed; fractions resolve to themselves");
    }

    for &fraction in fractions {
        if !(0.0..=1.0).contains(&fraction) {
            anyhow::bail!("Fraction {} is outside 0..=1", fraction);
        }
        let resolved = coordinator.resolve(fraction);
        let pinned = coordinator.resolver().in_pinned(fraction);
        println!(
            "{:.4} -> {:.4}{}",
            fraction,
            resolved,
            if pinned { "  (pinned)" } else { "" }
        );
    }
    Ok(())
}

fn cmd_check(config: &FolioConfig) -> Result<()> {
    let content = config.load_content()?;
    info!(
        "Content: {} experiences, {} projects, {} skill categories, {} publications",
        content.experiences.len(),
        content.projects.len(),
        content.skill_categories.len(),
        content.publications.len()
    );

    let mut page = PortfolioPage::new(content, config.viewport_size(), config.page_options());
    let summary = page.navigate(Route::Home, Instant::now());
    if !summary.is_complete() {
        for (id, err) in &summary.failed {
            eprintln!("  {id}: {err}");
        }
        anyhow::bail!("{} section(s) failed to mount", summary.failed.len());
    }

    let bindings: usize = page.sections().iter().map(|s| s.player_count()).sum();
    println!(
        "OK: {} sections, {} bindings, {} pins, snap rule {}",
        summary.mounted.len(),
        bindings,
        summary.pins,
        if page.coordinator().state().is_installed() {
            "installed"
        } else {
            "not installed"
        }
    );
    Ok(())
}

fn cmd_llms(config: &FolioConfig) -> Result<()> {
    let content = config.load_content()?;
    print!("{}", render_llms_txt(&content));
    Ok(())
}

fn cmd_info(config: &FolioConfig) -> Result<()> {
    let page = mount(config, Route::Home)?;
    let layout = page.layout();
    let max_scroll = layout.max_scroll();

    println!("Folio");
    println!("=====");
    println!();
    println!(
        "Viewport: {}x{}  content height: {:.0}px  max scroll: {:.0}px",
        config.viewport.width,
        config.viewport.height,
        layout.content_height(),
        max_scroll
    );
    println!();
    println!(
        "{:<14} {:>9} {:>9} {:>9}  {}",
        "section", "top", "height", "pin", "anchor"
    );
    for section in layout.sections() {
        println!(
            "{:<14} {:>9.1} {:>9.1} {:>9.1}  {}",
            section.kind,
            section.top,
            section.height,
            section.pin_spacing,
            section.kind.anchor().unwrap_or("-")
        );
    }

    let snapshot = page.registry().snapshot();
    let resolver = SnapResolver::from_snapshot(&snapshot, max_scroll, config.snap.buffer);
    println!();
    println!("Snap intervals (buffer {}):", config.snap.buffer);
    for (entry, interval) in snapshot.iter().zip(resolver.intervals()) {
        println!(
            "  {:<12} [{:.4}, {:.4}] center {:.4}",
            entry.id, interval.start, interval.end, interval.center
        );
    }
    println!();
    println!(
        "Snap rule: {}",
        page.viewport().snap_rule_name().unwrap_or_else(|| "none".to_string())
    );
    Ok(())
}
