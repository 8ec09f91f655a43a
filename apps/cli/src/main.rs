//! # Romi CLI
//!
//! 在仿真 Romi 上运行周期控制程序。
//!
//! ```bash
//! # 默认计划：禁用 0.5 秒，自动 3 秒
//! romi-cli run
//!
//! # 手动遥控 5 秒，手柄前推一半
//! romi-cli run --autonomous 0 --teleop 5 --stick-y 0.5
//!
//! # 打印默认配置 / 生成配置文件
//! romi-cli config show
//! romi-cli config init romi.toml
//! ```
//!
//! 日志级别通过 `RUST_LOG` 调整（默认 `romi_cli=info`）。

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod validation;

use commands::{ConfigCommand, RunCommand};

/// Romi CLI - 差速机器人控制程序
#[derive(Parser, Debug)]
#[command(name = "romi-cli")]
#[command(about = "Run the Romi control routine against the simulated robot", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 运行控制循环
    Run {
        #[command(flatten)]
        args: RunCommand,
    },

    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("romi_cli=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { args } => args.execute(),
        Commands::Config(cmd) => cmd.execute(),
    }
}
