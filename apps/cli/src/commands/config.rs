//! 配置管理命令
//!
//! 打印、生成、检查 TOML 配置文件

use anyhow::{Context, Result};
use clap::Subcommand;
use romi_hal::SimEndpoint;
use romi_robot::RobotConfig;
use std::path::{Path, PathBuf};

/// 加载配置（未指定路径时使用默认值）
pub fn load_config(path: Option<&Path>) -> Result<RobotConfig> {
    match path {
        Some(path) => RobotConfig::load(path)
            .with_context(|| format!("加载配置文件失败: {}", path.display())),
        None => Ok(RobotConfig::default()),
    }
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 打印配置（默认值或指定文件）
    Show {
        /// 配置文件路径
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// 生成默认配置文件
    Init {
        /// 输出路径
        path: PathBuf,

        /// 覆盖已存在的文件
        #[arg(long)]
        force: bool,
    },

    /// 检查配置文件并显示生效的仿真端点
    Check {
        /// 配置文件路径
        path: PathBuf,
    },
}

impl ConfigCommand {
    pub fn execute(self) -> Result<()> {
        match self {
            ConfigCommand::Show { config } => Self::show_(config.as_deref()),
            ConfigCommand::Init { path, force } => Self::init_(&path, force),
            ConfigCommand::Check { path } => Self::check_(&path),
        }
    }

    fn show_(path: Option<&Path>) -> Result<()> {
        let config = load_config(path)?;
        print!("{}", config.to_toml_string()?);
        Ok(())
    }

    fn init_(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            anyhow::bail!("{} 已存在（使用 --force 覆盖）", path.display());
        }
        RobotConfig::default().save(path)?;
        println!("✅ 已写入默认配置: {}", path.display());
        Ok(())
    }

    fn check_(path: &Path) -> Result<()> {
        let config = load_config(Some(path))?;
        let endpoint = SimEndpoint::from_env_or(&config.sim.endpoint())?;

        println!("配置文件: {}", path.display());
        println!("  控制周期: {} ms", config.timing.period_ms);
        println!(
            "  自动程序: {:.2} 秒, forward={:.2} rotation={:.2}",
            config.autonomous.drive_seconds, config.autonomous.forward, config.autonomous.rotation
        );
        println!("  仿真端点: {}", endpoint);
        println!("✅ 配置有效");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_default_without_path() {
        let config = load_config(None).unwrap();
        assert_eq!(config, RobotConfig::default());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(err.to_string().contains("missing.toml"));
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("romi.toml");

        ConfigCommand::Init { path: path.clone(), force: false }.execute().unwrap();
        assert!(ConfigCommand::Init { path: path.clone(), force: false }.execute().is_err());
        ConfigCommand::Init { path: path.clone(), force: true }.execute().unwrap();

        assert_eq!(load_config(Some(&path)).unwrap(), RobotConfig::default());
    }
}
