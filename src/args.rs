use clap::Parser;
use std::path::PathBuf;

/// modular - 模块化依赖注入示例与检查工具
#[derive(Parser, Debug)]
#[command(name = "modular")]
#[command(about = "模块化依赖注入：运行示例应用或检查模块依赖")]
pub struct Args {
    /// 子命令
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Parser, Debug)]
pub enum Command {
    /// 组装并运行示例应用
    Run,
    /// 检查示例应用的依赖声明
    Inspect {
        /// 配置文件（默认 ~/.config/modular/inspector.toml）
        #[arg(long)]
        config: Option<PathBuf>,
        /// 视为已使用的服务名（可重复）
        #[arg(long = "ignore", value_name = "KEY")]
        ignore: Vec<String>,
        /// 以 JSON 输出报告
        #[arg(long)]
        json: bool,
        /// 把警告视为失败
        #[arg(long)]
        deny_warnings: bool,
    },
}
