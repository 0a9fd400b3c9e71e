//! `generate_image` 命令行入口
//!
//! 成功时向标准输出打印保存的文件路径（仅一行），失败时向标准错误打印原因并以状态码 1 退出。

use clap::Parser;
use nanoimage::{Config, ImageRequester};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "generate_image")]
#[command(about = "Generate an image from a text prompt with Gemini and save it to disk")]
#[command(version)]
struct Cli {
    /// The text prompt describing the image
    prompt: String,

    /// Model to use instead of GEMINI_MODEL / the default
    #[arg(long)]
    model: Option<String>,

    /// Directory to write the image into (defaults to the current directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help / --version 正常退出，其余参数错误统一返回 1
            let code = if e.use_stderr() { 1 } else { 0 };
            e.print().ok();
            process::exit(code);
        }
    };

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> nanoimage::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(model) = cli.model {
        config = config.with_model(model);
    }
    if let Some(dir) = cli.output_dir {
        config = config.with_output_dir(dir);
    }

    let saved = ImageRequester::new(config)?.generate(&cli.prompt).await?;
    println!("{}", saved.path.display());
    Ok(())
}
