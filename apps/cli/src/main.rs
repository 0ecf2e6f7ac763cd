mod logging;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use nodezilla_workspace::{
    AssetOutcome, AssetReport, MaterializeConfig, MaterializeOptions, MaterializeReport,
    Materializer, PlannedAsset, PortlistLocator, PORTLIST_ENV,
};

#[derive(Parser)]
#[command(
    name = "nodezilla-workspace",
    about = "Prepare the NodeZilla user workspace from bundled assets",
    author,
    version
)]
struct Cli {
    /// 使用者家目錄；預設為目前使用者。 / User home directory (defaults to the current user's).
    #[arg(long, global = true, value_name = "PATH")]
    home: Option<PathBuf>,

    /// 應用程式安裝根目錄；預設為執行檔所在目錄。 / Application install root (defaults to the executable's directory).
    #[arg(long, global = true, value_name = "PATH")]
    install_root: Option<PathBuf>,

    /// 物化設定檔（JSON）。 / Materializer config file (JSON).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// 提高記錄詳細程度（可重複）。 / Increase log verbosity (repeatable).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// 額外將記錄寫入此資料夾。 / Also write logs to this directory.
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 建立工作區並補齊缺少的資產。 / Create the workspace and fill in missing assets.
    Materialize(MaterializeArgs),
    /// 預覽將被複製的內容，不寫入檔案。 / Preview what would be copied without writing.
    Plan(PlanArgs),
    /// 顯示 Portlist（PL.txt）的位置。 / Show where the portlist (PL.txt) is read from.
    Portlist(PortlistArgs),
}

#[derive(Args)]
struct MaterializeArgs {
    /// 打包內容缺少 PL.txt 時建立空白檔案。 / Create an empty PL.txt when the bundle ships none.
    #[arg(long)]
    seed_empty_portlist: bool,

    /// 不調整工作區擁有者。 / Leave workspace ownership untouched.
    #[arg(long)]
    skip_ownership: bool,

    /// 以 JSON 輸出報告。 / Print the report as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct PlanArgs {
    /// 以 JSON 輸出。 / Print the plan as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct PortlistArgs {
    /// 顯示寫入位置而非讀取位置。 / Show the write location instead of the read location.
    #[arg(long)]
    write: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let log_dir = cli.log_dir.as_deref().map(resolve_input_path).transpose()?;
    let _guard = logging::init_logging(cli.verbose, log_dir.as_deref())?;

    let home = resolve_home(cli.home.as_deref())?;
    let install_root = resolve_install_root(cli.install_root.as_deref())?;
    let config = load_config(cli.config.as_deref())?;
    tracing::info!(
        home = %home.display(),
        install_root = %install_root.display(),
        "resolved workspace inputs"
    );

    match cli.command {
        Commands::Materialize(args) => execute_materialize(args, &install_root, &home, &config),
        Commands::Plan(args) => execute_plan(args, &install_root, &home, &config),
        Commands::Portlist(args) => execute_portlist(args, &install_root, &home),
    }
}

fn execute_materialize(
    args: MaterializeArgs,
    install_root: &Path,
    home: &Path,
    config: &MaterializeConfig,
) -> Result<()> {
    let mut options = MaterializeOptions::from(config);
    if args.seed_empty_portlist {
        options.seed_empty_portlist = true;
    }
    if args.skip_ownership {
        options.normalize_ownership = false;
    }

    let report = Materializer::new(install_root, home)
        .with_options(options)
        .run()
        .context("workspace materialization failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn execute_plan(
    args: PlanArgs,
    install_root: &Path,
    home: &Path,
    config: &MaterializeConfig,
) -> Result<()> {
    let materializer =
        Materializer::new(install_root, home).with_options(MaterializeOptions::from(config));
    let plan = materializer.plan();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }
    println!("Workspace: {}", materializer.layout().root().display());
    for asset in &plan {
        print_planned(asset);
    }
    Ok(())
}

fn execute_portlist(args: PortlistArgs, install_root: &Path, home: &Path) -> Result<()> {
    let locator = PortlistLocator::from_env(home).with_install_root(install_root);
    if args.write {
        let target = locator
            .resolve_for_write()
            .context("failed to prepare portlist location")?;
        println!("{}", target.display());
        return Ok(());
    }
    match locator.resolve_for_read() {
        Some(path) => {
            println!("{}", path.display());
            Ok(())
        }
        None => {
            let tried = locator
                .read_candidates()
                .iter()
                .map(|path| format!("  {}", path.display()))
                .collect::<Vec<_>>()
                .join("\n");
            bail!(
                "portlist not found. Expected PL.txt in one of:\n{tried}\nSet {PORTLIST_ENV} to override."
            )
        }
    }
}

fn print_report(report: &MaterializeReport) {
    for asset in &report.assets {
        println!("{}", describe_asset(asset));
    }
    if let Some(ownership) = &report.ownership {
        if !ownership.failed.is_empty() {
            println!(
                "ownership: {} changed, {} could not be changed",
                ownership.changed,
                ownership.failed.len()
            );
        }
    }
    println!("Workspace ready at {}", report.workspace_root.display());
}

fn describe_asset(asset: &AssetReport) -> String {
    let detail = match &asset.outcome {
        AssetOutcome::Merged { source, stats } => format!(
            "merged from {} ({} copied, {} kept, {} failed)",
            source.display(),
            stats.files_copied,
            stats.skipped_existing,
            stats.failures.len()
        ),
        AssetOutcome::Copied { source } => format!("copied from {}", source.display()),
        AssetOutcome::Seeded => "seeded empty file".to_string(),
        AssetOutcome::AlreadyPresent => "already present".to_string(),
        AssetOutcome::NotFound { tried } => {
            format!("not bundled (checked {} locations)", tried.len())
        }
        AssetOutcome::Failed { reason, .. } => format!("failed: {reason}"),
    };
    format!("{}: {}", asset.name, detail)
}

fn print_planned(asset: &PlannedAsset) {
    match &asset.source {
        Some(source) => println!(
            "  {} ({}): {} -> {} new entries",
            asset.name,
            asset.kind.label(),
            source.display(),
            asset.pending.len()
        ),
        None if !asset.pending.is_empty() => println!(
            "  {} ({}): not bundled -> will be seeded empty",
            asset.name,
            asset.kind.label()
        ),
        None => println!("  {} ({}): not found", asset.name, asset.kind.label()),
    }
}

fn load_config(path: Option<&Path>) -> Result<MaterializeConfig> {
    match path {
        Some(path) => {
            let path = resolve_input_path(path)?;
            tracing::debug!(path = %path.display(), "loading materializer config");
            MaterializeConfig::load(&path)
                .with_context(|| format!("failed to load config {}", path.display()))
        }
        None => Ok(MaterializeConfig::default()),
    }
}

fn resolve_home(home: Option<&Path>) -> Result<PathBuf> {
    match home {
        Some(path) => resolve_input_path(path),
        None => dirs::home_dir().ok_or_else(|| anyhow!("unable to determine home directory")),
    }
}

fn resolve_install_root(root: Option<&Path>) -> Result<PathBuf> {
    match root {
        Some(path) => resolve_input_path(path),
        None => {
            let exe = std::env::current_exe().context("determine executable path")?;
            exe.parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| anyhow!("executable {} has no parent directory", exe.display()))
        }
    }
}

fn resolve_input_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()
            .context("determine current directory")?
            .join(path))
    }
}
