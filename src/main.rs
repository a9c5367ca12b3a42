// ==========================================
// 库存盘点对账系统 - 命令行主入口
// ==========================================
// 子命令: check / template / finalize
// 结果输出到 stdout（--json 时为 JSON），日志输出到 stderr
// ==========================================

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use moulinette::config::{ConfigManager, ReconcileConfigReader};
use moulinette::i18n::{self, t, t_with_args};
use moulinette::{logging, ApiError, ReconcileApi};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "moulinette")]
#[command(version, about = "Sage X3 inventory mask reconciliation", long_about = None)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Message language (fr, en, zh-CN)
    #[arg(long, global = true)]
    locale: Option<String>,

    /// Configuration file (overrides MOULINETTE_CONFIG_PATH)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a mask against the depot type without writing files
    Check {
        /// Sage X3 mask (.csv)
        mask: PathBuf,

        /// Depot type (Conforme | Non-Conforme)
        #[arg(long)]
        depot: String,
    },

    /// Generate the entry template for physical counts
    Template {
        /// Sage X3 mask (.csv)
        mask: PathBuf,

        /// Depot type (Conforme | Non-Conforme)
        #[arg(long)]
        depot: String,

        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Distribute counted quantities over lots and write the final mask
    Finalize {
        /// Sage X3 mask (.csv)
        mask: PathBuf,

        /// Filled entry template (.csv, .xlsx, .xls)
        filled: PathBuf,

        /// Depot type (Conforme | Non-Conforme)
        #[arg(long)]
        depot: String,

        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => ConfigManager::from_file(path)
            .with_context(|| format!("config: {}", path.display()))?,
        None => ConfigManager::load().context("config")?,
    };

    let locale = cli
        .locale
        .clone()
        .unwrap_or_else(|| config.get_default_locale());
    if !i18n::set_locale(&locale) {
        tracing::warn!(locale = %locale, "不支持的语言，使用默认语言");
    }

    tracing::info!(version = moulinette::VERSION, "{} 启动", moulinette::APP_NAME);

    let api = ReconcileApi::new(&config);

    match cli.cmd {
        Commands::Check { mask, depot } => {
            let response = unwrap_api(api.check(&mask, &depot), cli.json)?;
            if cli.json {
                print_json(&response)?;
            } else if response.passed {
                println!(
                    "{}",
                    t_with_args(
                        "cli.check_passed",
                        &[
                            ("lines", &response.stats.total_lines.to_string()),
                            ("products", &response.stats.total_products.to_string()),
                            ("lots", &response.stats.total_lots.to_string()),
                        ],
                    )
                );
            } else {
                println!("{}", t("cli.check_failed"));
                for message in &response.messages {
                    println!("  - {}", message);
                }
            }
            Ok(if response.passed {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            })
        }

        Commands::Template { mask, depot, out } => {
            let response = unwrap_api(api.prepare_template(&mask, &depot, &out), cli.json)?;
            if cli.json {
                print_json(&response)?;
            } else {
                println!(
                    "{}",
                    t_with_args(
                        "cli.template_written",
                        &[
                            ("path", &response.template_path),
                            ("rows", &response.template_rows.to_string()),
                        ],
                    )
                );
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Finalize {
            mask,
            filled,
            depot,
            out,
        } => {
            let response = unwrap_api(api.finalize(&mask, &filled, &depot, &out), cli.json)?;
            if cli.json {
                print_json(&response)?;
            } else {
                let s = &response.summary;
                println!(
                    "{}",
                    t_with_args("cli.final_written", &[("path", &response.final_path)])
                );
                println!(
                    "{}",
                    t_with_args(
                        "cli.summary",
                        &[
                            ("processed", &s.entries_processed.to_string()),
                            ("skipped", &s.entries_skipped.to_string()),
                            ("positive", &s.positive_gaps.to_string()),
                            ("negative", &s.negative_gaps.to_string()),
                            ("unmatched", &s.unmatched_lots.to_string()),
                            ("exceptions", &s.exception_rows.to_string()),
                        ],
                    )
                );
                for message in &response.warning_messages {
                    println!("  ! {}", message);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// 业务规则违规在 --json 模式下输出结构化错误
fn unwrap_api<T>(result: Result<T, ApiError>, json: bool) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(ApiError::BusinessRuleViolation {
            violations,
            message,
        }) if json => {
            print_json(&serde_json::json!({
                "status": "error",
                "message": message,
                "violations": violations,
            }))?;
            Err(anyhow::anyhow!(message))
        }
        Err(err) => Err(err.into()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
