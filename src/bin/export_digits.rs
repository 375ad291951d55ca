//! 导出已收集的手写数字，供机器学习训练使用：
//! - `--format json`：带重新归一化图片的 JSON 数组
//! - `--format numpy`：`.npz`（images / labels / usernames）

use std::env;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use digit_collector::AppError;
use digit_collector::config::{AppConfig, DatabaseConfig};
use digit_collector::features::drawing::DrawingStore;
use digit_collector::features::export::{
    DEFAULT_OUTPUT, ExportFormat, ExportOptions, ExportOutcome, resolve_output_path,
    run_export,
};
use digit_collector::features::image::TargetSize;

#[derive(Debug, Clone)]
struct Args {
    help: bool,
    output: PathBuf,
    format: ExportFormat,
    size: TargetSize,
    database: Option<String>,
}

#[derive(Debug)]
enum CliError {
    Args(String),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Args(msg) => write!(f, "参数错误: {msg}"),
        }
    }
}

impl std::error::Error for CliError {}

impl Args {
    fn parse(argv: Vec<String>) -> Result<Self, CliError> {
        let mut help = false;
        let mut output = PathBuf::from(DEFAULT_OUTPUT);
        let mut format = ExportFormat::Json;
        let mut size = TargetSize::Small;
        let mut database = None;
        let mut idx = 0usize;

        while idx < argv.len() {
            match argv[idx].as_str() {
                "-h" | "--help" => {
                    help = true;
                    idx += 1;
                }
                "--output" => {
                    idx += 1;
                    output = PathBuf::from(take_value(&argv, idx, "--output")?);
                    idx += 1;
                }
                "--format" => {
                    idx += 1;
                    format = take_value(&argv, idx, "--format")?
                        .parse()
                        .map_err(CliError::Args)?;
                    idx += 1;
                }
                "--resize" => {
                    idx += 1;
                    size = take_value(&argv, idx, "--resize")?
                        .parse()
                        .map_err(CliError::Args)?;
                    idx += 1;
                }
                "--database" => {
                    idx += 1;
                    database = Some(take_value(&argv, idx, "--database")?.to_string());
                    idx += 1;
                }
                other => return Err(CliError::Args(format!("未知参数 {other}"))),
            }
        }

        Ok(Self {
            help,
            output,
            format,
            size,
            database,
        })
    }
}

fn take_value<'a>(argv: &'a [String], idx: usize, flag: &str) -> Result<&'a str, CliError> {
    argv.get(idx)
        .map(String::as_str)
        .ok_or_else(|| CliError::Args(format!("缺少 {flag} 的值")))
}

fn default_database_path() -> String {
    if AppConfig::init_global().is_ok() {
        return AppConfig::global().database.sqlite_path.clone();
    }
    DatabaseConfig::default().sqlite_path
}

/// numpy 导出会补 `.npz` 后缀，提示中显示实际写入的路径
fn start_banner(opts: &ExportOptions) -> String {
    format!(
        "Exporting digits to {}...",
        resolve_output_path(&opts.output, opts.format).display()
    )
}

fn print_help() {
    println!(
        r#"export_digits（导出手写数字数据集）

参数：
  --output PATH             输出文件路径（默认 digits_export.json；numpy 格式会补 .npz 后缀）
  --format FORMAT           json|numpy（默认 json）
  --resize N                图片边长，28|280（默认 28）
  --database PATH           SQLite 文件（默认取配置 database.sqlite_path）
  -h, --help                显示帮助
"#
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let args = match Args::parse(env::args().skip(1).collect()) {
        Ok(a) => a,
        Err(err) => {
            eprintln!("{err}");
            print_help();
            std::process::exit(2);
        }
    };
    if args.help {
        print_help();
        return Ok(());
    }

    let database = args.database.unwrap_or_else(default_database_path);
    let store = DrawingStore::connect_sqlite(&database, false).await?;
    store.init_schema().await?;

    let opts = ExportOptions {
        output: args.output,
        format: args.format,
        size: args.size,
    };
    println!("{}", start_banner(&opts));

    let outcome = run_export(&store, &opts, |done, total| {
        println!("Processing {done}/{total}...");
    })
    .await;

    match outcome {
        Ok(ExportOutcome::Empty) => println!("No digits found in database."),
        Ok(ExportOutcome::Written { path, count, shape }) => {
            if let Some((n, h, w)) = shape {
                println!("Saved {n} images with shape ({n}, {h}, {w})");
            }
            tracing::info!("输出文件: {}", path.display());
            println!("Successfully exported {count} digits!");
        }
        Err(AppError::MissingCapability(msg)) => {
            eprintln!("{msg}");
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_match_documented_values() {
        let args = Args::parse(vec![]).unwrap();
        assert!(!args.help);
        assert_eq!(args.output, PathBuf::from("digits_export.json"));
        assert_eq!(args.format, ExportFormat::Json);
        assert_eq!(args.size, TargetSize::Small);
        assert!(args.database.is_none());
    }

    #[test]
    fn parses_all_flags() {
        let args = Args::parse(argv(&[
            "--output",
            "digits.npz",
            "--format",
            "numpy",
            "--resize",
            "280",
            "--database",
            "/tmp/d.db",
        ]))
        .unwrap();
        assert_eq!(args.output, PathBuf::from("digits.npz"));
        assert_eq!(args.format, ExportFormat::Numpy);
        assert_eq!(args.size, TargetSize::Large);
        assert_eq!(args.database.as_deref(), Some("/tmp/d.db"));
    }

    #[test]
    fn banner_shows_path_actually_written() {
        let numpy = ExportOptions {
            output: PathBuf::from("out/digits"),
            format: ExportFormat::Numpy,
            size: TargetSize::Small,
        };
        assert_eq!(start_banner(&numpy), "Exporting digits to out/digits.npz...");

        let json = ExportOptions {
            output: PathBuf::from("out/digits"),
            ..ExportOptions::default()
        };
        assert_eq!(start_banner(&json), "Exporting digits to out/digits...");
    }

    #[test]
    fn rejects_bad_values_and_unknown_flags() {
        assert!(Args::parse(argv(&["--resize", "64"])).is_err());
        assert!(Args::parse(argv(&["--format", "csv"])).is_err());
        assert!(Args::parse(argv(&["--output"])).is_err());
        assert!(Args::parse(argv(&["--verbose"])).is_err());
    }
}
