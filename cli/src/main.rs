use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use process_tree::config::{Theme, ViewOptions, load_config, options::DEFAULT_CONFIG_PATH};
use process_tree::events::load_batch_file;
use process_tree::monitoring::view_engine::provider_labels;
use process_tree::render::{NO_DATA_MESSAGE, canvas_geometry, node_color, row_line, status_color};
use process_tree::view::{ALL, ColorMode, Command, Layout, ProcessTreeView};
use shared::ProcessStatus;
use std::path::{Path, PathBuf};

const RULE: &str = "═══════════════════════════════════════════════════════";

#[derive(Parser)]
#[command(name = "edr-cli")]
#[command(about = "Render EDR process trees from hunt results", long_about = None)]
struct Cli {
    /// Batch file: JSON array, {"results": [...]} export, or JSON Lines
    #[arg(short, long)]
    file: PathBuf,

    /// Configuration file with view options
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the visible process tree
    Tree(TreeArgs),

    /// Show batch statistics
    Stats,

    /// Show everything known about one process
    Details {
        /// Process id
        id: String,
    },
}

#[derive(Args)]
struct TreeArgs {
    /// Providers to keep (crowdstrike, sentinelone, defender, ...)
    #[arg(short, long, value_delimiter = ',')]
    provider: Vec<String>,

    /// Statuses to keep (normal, terminated, suspicious, malicious)
    #[arg(short, long, value_delimiter = ',')]
    status: Vec<String>,

    /// Highlight matches and reveal their ancestors
    #[arg(long)]
    search: Option<String>,

    #[arg(long, conflicts_with = "collapse_all")]
    expand_all: bool,

    #[arg(long)]
    collapse_all: bool,

    /// Expand or collapse these ids after loading
    #[arg(long, value_delimiter = ',')]
    toggle: Vec<String>,

    #[arg(long)]
    select: Option<String>,

    /// status | provider
    #[arg(long)]
    color: Option<ColorMode>,

    /// horizontal | vertical
    #[arg(long)]
    layout: Option<Layout>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let options = load_config(&cli.config).options;
    let view = load_view(&cli.file, options)?;

    match cli.command {
        Commands::Tree(args) => show_tree(view, args),
        Commands::Stats => show_stats(&view),
        Commands::Details { id } => show_details(&view, &id),
    }

    Ok(())
}

fn load_view(path: &Path, options: ViewOptions) -> Result<ProcessTreeView> {
    let records = load_batch_file(path)
        .with_context(|| format!("loading batch from {}", path.display()))?;
    let mut view = ProcessTreeView::new(options);
    view.load_batch(&records);
    Ok(view)
}

fn selection(values: Vec<String>) -> Vec<String> {
    if values.is_empty() {
        vec![ALL.to_string()]
    } else {
        values
    }
}

fn commands_for(args: TreeArgs) -> Vec<Command> {
    let mut commands = Vec::new();
    if let Some(layout) = args.layout {
        commands.push(Command::SetLayout(layout));
    }
    if let Some(mode) = args.color {
        commands.push(Command::SetColorMode(mode));
    }
    if args.expand_all {
        commands.push(Command::ExpandAll);
    }
    if args.collapse_all {
        commands.push(Command::CollapseAll);
    }
    commands.extend(args.toggle.into_iter().map(Command::ToggleExpand));
    if !args.provider.is_empty() || !args.status.is_empty() {
        commands.push(Command::ApplyFilter {
            providers: selection(args.provider),
            statuses: selection(args.status),
        });
    }
    if let Some(term) = args.search {
        commands.push(Command::SetSearch(term));
    }
    if let Some(id) = args.select {
        commands.push(Command::Select(id));
    }
    commands
}

fn header(title: &str, theme: Theme) {
    let (rule, title) = match theme {
        Theme::Dark => (RULE.cyan(), title.bright_cyan().bold()),
        Theme::Light => (RULE.blue(), title.blue().bold()),
    };
    println!("\n{}", rule);
    println!("{}", title);
    println!("{}\n", rule);
}

fn paint(text: &str, hex: &str) -> ColoredString {
    match hex_to_rgb(hex) {
        Some((r, g, b)) => text.truecolor(r, g, b),
        None => text.normal(),
    }
}

fn highlight(text: ColoredString, hex: &str) -> ColoredString {
    match hex_to_rgb(hex) {
        Some((r, g, b)) => text.on_truecolor(r, g, b),
        None => text.on_bright_black(),
    }
}

fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

fn show_tree(mut view: ProcessTreeView, args: TreeArgs) {
    for command in commands_for(args) {
        view.dispatch(command);
    }

    header("Process Tree", view.options().theme);

    let layout = view.state().layout;
    let mode = view.state().color_mode;
    let mut count = 0;
    for row in view.visible_nodes() {
        let line = row_line(&row, view.options(), layout);
        let painted = paint(&line, node_color(&row.node.process, mode));
        let painted = if row.selected { painted.bold().underline() } else { painted };
        if row.highlighted {
            println!("{}", highlight(painted, &view.options().search_highlight_color));
        } else {
            println!("{}", painted);
        }
        count += 1;
    }

    if count == 0 {
        println!("{}", NO_DATA_MESSAGE.yellow());
    } else {
        println!("\n{} {}", "Visible:".bright_blue(), count.to_string().bright_white().bold());
        println!(
            "{} {}",
            "Canvas:".bright_blue(),
            canvas_geometry(count, view.options(), layout)
        );
    }

    if let Some(details) = view.selected_details() {
        println!();
        print_fields(&details.fields());
    }
}

fn show_stats(view: &ProcessTreeView) {
    let stats = view.stats();

    header("Process Tree Statistics", view.options().theme);

    println!("{} {}", "Processes:".bright_blue(), stats.total.to_string().bright_white().bold());
    println!("{} {}", "Trees:".bright_blue(), stats.roots);
    println!("{} {}", "Without id:".bright_blue(), stats.unlinked);
    println!("{} {}", "Visible:".bright_blue(), stats.visible);
    println!("{} {}", "Providers:".bright_blue(), provider_labels(&stats.providers));
    for status in ProcessStatus::ALL {
        let label = format!("{}:", status.as_str().to_uppercase());
        let label = paint(&label, status_color(status)).bold();
        println!("{} {}", label, stats.count(status));
    }
    println!();
}

fn show_details(view: &ProcessTreeView, id: &str) {
    header("Process Details", view.options().theme);
    match view.details(id) {
        Some(details) => print_fields(&details.fields()),
        None => println!("{}", format!("No process with id '{}'.", id).yellow()),
    }
    println!();
}

fn print_fields(fields: &[(&'static str, String)]) {
    for (label, value) in fields {
        println!("  {} {}", format!("{}:", label).bright_blue(), value);
    }
}
