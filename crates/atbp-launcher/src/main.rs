//! OpenATBP 客户端启动器。
//!
//! 职责：
//! - 启动前确认 Unity Web Player 插件已就绪（检测、必要时静默安装或补齐 bundle）
//! - 首次运行时写入默认用户配置
//! - 插件就绪后将游戏地址交给宿主加载；未就绪时给出提示并停止启动
//!
//! 作者：OpenATBP 启动器项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use atbp_core::config::LauncherConfig;
use atbp_core::fingerprint::{self, WEBPLAYER_WIN_KNOWN_GOOD};
use atbp_core::macho;
use atbp_core::paths;
use atbp_core::platform::PlatformVariant;
use atbp_platform::installer::{PlatformInstaller, PresenceCheck};
use atbp_platform::notify::{LogNotifier, Notifier};
use atbp_platform::readiness::PluginReadinessController;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

/// 命令行参数。
///
/// 说明：
/// - `config` 为用户配置文件（默认位于用户数据目录）
/// - `defaults` 为首次运行时复制的配置模板（默认 `<resources>/defaults/config.json`）
/// - `resources` 为随程序分发资源所在目录（默认按可执行文件位置推导）
#[derive(Debug, Parser)]
#[command(name = "atbp-launcher", version)]
struct Cli {
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    defaults: Option<PathBuf>,

    #[arg(long)]
    resources: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// 启动器支持的子命令。
#[derive(Debug, Subcommand)]
enum Commands {
    /// 确认插件就绪后输出游戏地址（未就绪则提示并以非零状态退出）。
    Launch,
    /// 仅检测插件状态并输出结果（不做系统修改）。
    Check,
    /// 环境自检（平台、路径、插件指纹与架构）。
    Doctor,
}

/// 启动时解析出的环境（平台与各路径只确定一次）。
struct Env {
    platform: PlatformVariant,
    resources_dir: PathBuf,
    config_path: PathBuf,
    template_path: PathBuf,
}

/// 程序入口：初始化日志、解析参数并分发子命令。
///
/// 异常处理：
/// - 任意子命令执行失败会返回 `Err`，进程以非零状态退出。
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let env = resolve_env(&cli)?;
    match cli.command {
        Commands::Launch => launch(&env).await,
        Commands::Check => check(&env).await,
        Commands::Doctor => doctor(&env).await,
    }
}

/// 测试时可通过 `ATBP_TEST_PLATFORM` 指定平台。
fn resolve_platform() -> Result<PlatformVariant> {
    match std::env::var("ATBP_TEST_PLATFORM") {
        Ok(v) if !v.is_empty() => v.parse().map_err(|e: String| anyhow!(e)),
        _ => Ok(PlatformVariant::current()),
    }
}

fn allow_temp_dir_for_tests() -> bool {
    matches!(std::env::var("ATBP_TEST_ALLOW_TEMP").as_deref(), Ok("1"))
}

fn resolve_env(cli: &Cli) -> Result<Env> {
    let platform = resolve_platform()?;
    let resources_dir = match &cli.resources {
        Some(dir) => dir.clone(),
        None => paths::resources_dir(platform, &paths::install_dir()?),
    };
    let config_path = match &cli.config {
        Some(p) => p.clone(),
        None => paths::user_config_file(platform)?,
    };
    let template_path = cli
        .defaults
        .clone()
        .unwrap_or_else(|| paths::default_config_template(&resources_dir));
    Ok(Env {
        platform,
        resources_dir,
        config_path,
        template_path,
    })
}

/// 读取用于插件检测的配置。
///
/// 首次运行（用户配置不存在）时使用配置模板；模板也不存在则使用内置默认值。
fn load_effective_config(env: &Env) -> Result<LauncherConfig> {
    if env.config_path.exists() {
        return LauncherConfig::load(&env.config_path);
    }
    if env.template_path.exists() {
        return LauncherConfig::load(&env.template_path);
    }
    warn!("未找到配置与配置模板，使用内置默认值");
    Ok(LauncherConfig::default())
}

/// 启动流程。
///
/// 主要步骤：
/// 1) 非 macOS 平台检查是否从临时目录运行（未解压的压缩包）
/// 2) 确认插件就绪（检测 + 必要时安装）
/// 3) 首次运行时复制默认配置
/// 4) 读取游戏地址并交给宿主
///
/// 异常处理：
/// - 插件未就绪（需人工处理或安装失败）时已向用户提示，返回错误以停止启动
async fn launch(env: &Env) -> Result<()> {
    let notifier = LogNotifier;
    if env.platform != PlatformVariant::MacOS && !allow_temp_dir_for_tests() {
        let exe = std::env::current_exe().context("读取当前可执行文件路径失败")?;
        if paths::is_under_temp_dir(&exe) {
            notifier.error(
                "错误",
                "检测到 OpenATBPClient 正在从临时目录运行。\n\n请先将整个客户端文件夹解压到任意位置，再启动 OpenATBPClient。",
            );
            return Err(anyhow!("程序位于临时目录: {}", exe.display()));
        }
    }

    let first_time = !env.config_path.exists();
    if first_time {
        info!("未找到配置文件，执行首次初始化: {}", env.config_path.display());
    }
    let effective = load_effective_config(env)?;
    let installer = PlatformInstaller::from_config(env.platform, &effective.plugin, &env.resources_dir)?;

    let mut ready = false;
    let state = PluginReadinessController::new(installer, notifier)
        .with_reverify_after_install(effective.plugin.reverify_after_install)
        .ensure_ready(|| ready = true)
        .await;
    if !ready {
        return Err(anyhow!("Unity Web Player 未就绪 ({state})，停止启动"));
    }

    if first_time {
        seed_user_config(&env.template_path, &env.config_path)?;
    }
    let config = LauncherConfig::load(&env.config_path)?;
    let url = config.game_url()?;
    info!("Game URL: {url}");
    println!("game_url = {url}");
    Ok(())
}

/// 首次运行：将配置模板复制到用户配置路径。
///
/// 异常处理：
/// - 模板不存在、目录创建失败或复制失败返回错误
fn seed_user_config(template: &Path, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        ensure_dir(parent)?;
    }
    std::fs::copy(template, target)
        .with_context(|| format!("复制默认配置失败: {} -> {}", template.display(), target.display()))?;
    info!("已写入默认配置: {}", target.display());
    Ok(())
}

fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("创建目录失败: {}", dir.display()))
}

/// 仅检测插件状态并输出。
async fn check(env: &Env) -> Result<()> {
    let config = load_effective_config(env)?;
    let installer = PlatformInstaller::from_config(env.platform, &config.plugin, &env.resources_dir)?;
    let line = match installer.check().await {
        PresenceCheck::Present => "present".to_string(),
        PresenceCheck::Missing => "missing".to_string(),
        PresenceCheck::Unsupported(reason) => format!("unsupported: {}", reason.to_string().replace('\n', " ")),
    };
    println!("platform = {}", env.platform);
    println!("plugin = {line}");
    Ok(())
}

/// 环境自检（用于排障）。
///
/// 输出：
/// - 平台与资源目录、配置路径
/// - Windows：插件库指纹与参考值
/// - macOS：基础插件的容器布局与架构、bundle 是否存在
async fn doctor(env: &Env) -> Result<()> {
    println!("platform = {}", env.platform);
    println!("resources = {}", env.resources_dir.display());
    println!("config = {} (exists = {})", env.config_path.display(), env.config_path.exists());

    let config = load_effective_config(env)?;
    match PlatformInstaller::from_config(env.platform, &config.plugin, &env.resources_dir)? {
        PlatformInstaller::Windows(w) => {
            println!("plugin_library = {}", w.plugin_library().display());
            println!("installer = {} {}", w.installer().path, w.installer().args.join(" "));
            let library = w.plugin_library().to_path_buf();
            let line = tokio::task::spawn_blocking(move || {
                match fingerprint::fingerprint(&library, WEBPLAYER_WIN_KNOWN_GOOD.algorithm) {
                    Ok(digest) => format!(
                        "{digest} (known_good = {})",
                        fingerprint::digest_matches(&digest, WEBPLAYER_WIN_KNOWN_GOOD.hex)
                    ),
                    Err(e) => format!("<{e}>"),
                }
            })
            .await
            .context("指纹计算任务异常退出")?;
            println!("fingerprint = {line}");
        }
        PlatformInstaller::MacOS(m) => {
            let exe = m.plugin_executable();
            println!("plugin_executable = {}", exe.display());
            let line = tokio::task::spawn_blocking(move || match std::fs::read(&exe) {
                Ok(buf) => match macho::inspect_container(&buf) {
                    Ok(format) => format!("{format:?}"),
                    Err(e) => format!("<{e}>"),
                },
                Err(e) => format!("<{e}>"),
            })
            .await
            .context("架构检测任务异常退出")?;
            println!("container = {line}");
            println!("player_bundle = {} (exists = {})", m.player_bundle().display(), m.player_bundle().exists());
            println!("bundle_source = {}", m.bundle_source().display());
        }
        PlatformInstaller::Unsupported => println!("plugin = not applicable"),
    }
    Ok(())
}
