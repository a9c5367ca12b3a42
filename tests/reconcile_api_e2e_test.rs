// ==========================================
// ReconcileApi 端到端测试
// ==========================================
// 流程: 掩码 → 校验 → 实盘模板 → 回填 → 最终文件
// ==========================================


use calamine::{open_workbook_auto, Data, Reader};
use moulinette::config::config_keys;
use moulinette::domain::{DepotType, LotStatus};
use moulinette::exporter::TEMPLATE_SHEET_NAME;
use moulinette::{ApiError, ConfigManager, ReconcileApi, ReconcileWarning, RuleViolation};
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;
use test_helpers::{mask_text, read_rows, write_file, StockLine};

fn api() -> ReconcileApi {
    moulinette::logging::init_test();
    ReconcileApi::new(&ConfigManager::new())
}

fn api_with(settings: &[(&str, &str)]) -> ReconcileApi {
    moulinette::logging::init_test();
    let mut config = ConfigManager::new();
    for (key, value) in settings {
        config.set_config_value(key, value);
    }
    ReconcileApi::new(&config)
}

fn sample_mask() -> String {
    mask_text(&[
        StockLine::new("ART1", "LOT010124", "10"),
        StockLine::new("ART1", "LOT150124", "5"),
        StockLine::new("ART2", "ABCD020224001", "7").location("LOC2"),
    ])
}

/// 将模板中每行的实盘数量替换为给定值（按模板行顺序）
fn fill_template(template_path: &std::path::Path, real_qtys: &[&str]) -> String {
    let content = std::fs::read_to_string(template_path).expect("read template");
    let mut lines = content.lines();
    let mut filled = String::new();
    filled.push_str(lines.next().expect("template header"));
    filled.push('\n');
    for (line, qty) in lines.zip(real_qtys) {
        let mut fields: Vec<&str> = line.split(';').collect();
        fields[4] = qty;
        filled.push_str(&fields.join(";"));
        filled.push('\n');
    }
    filled
}

// ==========================================
// 测试1: 完整流程
// ==========================================

#[test]
fn test_full_round_trip() {
    let dir = TempDir::new().unwrap();
    let mask_path = write_file(&dir, "mask.csv", &sample_mask());
    let out_dir = dir.path().join("out");
    let api = api_with(&[(config_keys::TEMPLATE_FORMAT, "csv")]);

    let check = api.check(&mask_path, "Conforme").unwrap();
    assert!(check.passed);
    assert_eq!(check.stats.total_lines, 3);
    assert_eq!(check.stats.total_products, 2);
    assert_eq!(check.stats.total_lots, 3);
    assert_eq!(check.metadata.session_num, "SESS1");
    assert_eq!(check.metadata.inventory_num, "INV1");
    assert_eq!(check.metadata.site, "SITE1");

    let template = api.prepare_template(&mask_path, "Conforme", &out_dir).unwrap();
    assert_eq!(template.template_rows, 2);
    assert!(template.template_path.ends_with("INV1_SITE1_TEMPLATE.csv"));

    let template_rows = read_rows(std::path::Path::new(&template.template_path));
    assert_eq!(
        template_rows[0],
        vec![
            "NUMERO_SESSION",
            "NUMERO_INVENTAIRE",
            "CODE_ARTICLE",
            "QUANTITE_THEORIQUE",
            "QUANTITE_REELLE",
            "DEPOT",
            "EMPLACEMENT",
            "UNITE"
        ]
    );
    assert_eq!(
        template_rows[1],
        vec!["SESS1", "INV1", "ART1", "15", "0", "SITE1", "LOC1", "UN"]
    );
    assert_eq!(
        template_rows[2],
        vec!["SESS1", "INV1", "ART2", "7", "0", "SITE1", "LOC2", "UN"]
    );

    let filled = fill_template(std::path::Path::new(&template.template_path), &["3", "9"]);
    let filled_path = write_file(&dir, "filled.csv", &filled);

    let response = api
        .finalize(&mask_path, &filled_path, "Conforme", &out_dir)
        .unwrap();
    assert!(!response.run_id.is_empty());
    assert!(response.final_path.ends_with("INV1_SITE1_FINAL.csv"));
    assert_eq!(response.summary.entries_processed, 2);
    assert_eq!(response.summary.negative_gaps, 1);
    assert_eq!(response.summary.positive_gaps, 1);
    assert_eq!(response.summary.exception_rows, 1);
    assert!(response.warnings.is_empty());

    let rows = read_rows(std::path::Path::new(&response.final_path));
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0], vec!["E", "SESS1", "Inventaire annuel"]);
    assert_eq!(rows[1], vec!["L", "SESS1", "INV1", "2024"]);

    // 最老批次扣减至 0
    assert_eq!(rows[2][5], "10");
    assert_eq!(rows[2][6], "0");
    assert_eq!(rows[2][7], "2");
    assert_eq!(rows[2][14], "LOT010124");

    // 剩余盘亏由较新批次承担
    assert_eq!(rows[3][5], "5");
    assert_eq!(rows[3][6], "3");
    assert_eq!(rows[3][7], "1");

    // 盘盈加到唯一批次
    assert_eq!(rows[4][5], "7");
    assert_eq!(rows[4][6], "9");
    assert_eq!(rows[4][14], "ABCD020224001");
}

#[test]
fn test_xlsx_template_round_trip() {
    let dir = TempDir::new().unwrap();
    let mask_path = write_file(&dir, "mask.csv", &sample_mask());
    let out_dir = dir.path().join("out");
    let api = api();

    let template = api.prepare_template(&mask_path, "Conforme", &out_dir).unwrap();
    assert!(template.template_path.ends_with("INV1_SITE1_TEMPLATE.xlsx"));

    // 读取生成的模板
    let mut workbook = open_workbook_auto(&template.template_path).unwrap();
    assert_eq!(workbook.sheet_names(), vec![TEMPLATE_SHEET_NAME.to_string()]);
    let range = workbook.worksheet_range(TEMPLATE_SHEET_NAME).unwrap();
    let cells: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect();
    assert_eq!(cells.len(), 3);
    assert_eq!(cells[0][4], "QUANTITE_REELLE");
    assert_eq!(
        cells[1],
        vec!["SESS1", "INV1", "ART1", "15", "0", "SITE1", "LOC1", "UN"]
    );
    assert_eq!(range.get_value((1, 3)), Some(&Data::Float(15.0)));

    // 回填实盘数量后另存
    let mut filled = Workbook::new();
    let sheet = filled.add_worksheet();
    sheet.set_name(TEMPLATE_SHEET_NAME).unwrap();
    for (row_num, (row, real)) in (0u32..).zip(cells.iter().zip(["", "3", "9"])) {
        for (col, value) in (0u16..).zip(row) {
            if row_num > 0 && col == 4 {
                sheet.write_number(row_num, col, real.parse::<f64>().unwrap()).unwrap();
            } else {
                sheet.write_string(row_num, col, value).unwrap();
            }
        }
    }
    let filled_path = dir.path().join("filled.xlsx");
    filled.save(&filled_path).unwrap();

    let response = api
        .finalize(&mask_path, &filled_path, "Conforme", &out_dir)
        .unwrap();
    assert_eq!(response.summary.entries_processed, 2);
    assert_eq!(response.summary.negative_gaps, 1);
    assert_eq!(response.summary.positive_gaps, 1);

    let rows = read_rows(std::path::Path::new(&response.final_path));
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[2][6], "0");
    assert_eq!(rows[3][6], "3");
    assert_eq!(rows[4][6], "9");
}

#[test]
fn test_final_file_keeps_mask_delimiter_with_comma_template() {
    let dir = TempDir::new().unwrap();
    let mask_path = write_file(&dir, "mask.csv", &sample_mask());
    let out_dir = dir.path().join("out");
    let api = api_with(&[
        (config_keys::TEMPLATE_FORMAT, "csv"),
        (config_keys::TEMPLATE_DELIMITER, ","),
    ]);

    let template = api.prepare_template(&mask_path, "Conforme", &out_dir).unwrap();
    let content = std::fs::read_to_string(&template.template_path).unwrap();
    assert!(content.starts_with("NUMERO_SESSION,NUMERO_INVENTAIRE,"));

    let filled = content.replacen(",0,SITE1,LOC2,", ",9,SITE1,LOC2,", 1);
    let filled_path = write_file(&dir, "filled.csv", &filled);

    let response = api
        .finalize(&mask_path, &filled_path, "Conforme", &out_dir)
        .unwrap();

    assert_eq!(response.summary.positive_gaps, 1);
    let content = std::fs::read_to_string(&response.final_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "E;SESS1;Inventaire annuel");
    assert_eq!(lines[1], "L;SESS1;INV1;2024");
    assert!(lines[2..].iter().all(|l| l.starts_with("S;")));
    assert!(!content.contains(','));
}

#[test]
fn test_finalize_with_new_stock_and_unknown_entry() {
    let dir = TempDir::new().unwrap();
    let mask_path = write_file(
        &dir,
        "mask.csv",
        &mask_text(&[StockLine::new("ART1", "LOT010124", "0")]),
    );
    let filled_path = write_file(
        &dir,
        "filled.csv",
        "numero_inventaire;code_article;quantite_reelle;depot;emplacement\n\
         INV1;ART1;40;SITE1;LOC1\n\
         INV1;ART404;2;SITE1;LOC1\n",
    );

    let response = api()
        .finalize(&mask_path, &filled_path, "Conforme", dir.path())
        .unwrap();

    assert_eq!(response.summary.unmatched_lots, 1);
    assert_eq!(response.summary.entries_skipped, 1);
    assert!(matches!(
        response.warnings.as_slice(),
        [ReconcileWarning::UnmatchedRealEntry { row_number: 2, .. }]
    ));
    assert_eq!(response.warning_messages.len(), 1);

    let rows = read_rows(std::path::Path::new(&response.final_path));
    let stock = &rows[2];
    assert_eq!(stock[5], "0");
    assert_eq!(stock[6], "40");
    assert_eq!(stock[7], "2");
    assert_eq!(stock[14], "LOECART");
}

#[test]
fn test_finalize_reads_comma_delimited_template() {
    let dir = TempDir::new().unwrap();
    let mask_path = write_file(&dir, "mask.csv", &sample_mask());
    let filled_path = write_file(
        &dir,
        "filled.csv",
        "NUMERO_INVENTAIRE,CODE_ARTICLE,QUANTITE_REELLE,DEPOT,EMPLACEMENT\n\
         INV1,ART2,\"7,6\",SITE1,LOC2\n",
    );

    let response = api()
        .finalize(&mask_path, &filled_path, "Conforme", dir.path())
        .unwrap();

    let rows = read_rows(std::path::Path::new(&response.final_path));
    // 7,6 → 7.6 → 8（取整）
    assert_eq!(rows[4][6], "8");
    assert_eq!(response.summary.positive_gaps, 1);
}

// ==========================================
// 测试2: 业务规则
// ==========================================

#[test]
fn test_check_reports_quarantine_and_incompatible_status() {
    let dir = TempDir::new().unwrap();
    let mask_path = write_file(
        &dir,
        "mask.csv",
        &mask_text(&[
            StockLine::new("ART1", "LOT010124", "10").status("Q"),
            StockLine::new("ART2", "LOT010124", "10").status("RM"),
        ]),
    );

    let response = api().check(&mask_path, "Conforme").unwrap();

    assert!(!response.passed);
    assert_eq!(
        response.violations,
        vec![
            RuleViolation::QuarantinePresent,
            RuleViolation::DepotStatusIncompatible {
                depot_type: DepotType::Conforme,
                found: vec![LotStatus::RejectedModified],
            },
        ]
    );
    assert_eq!(response.messages.len(), 2);
}

#[test]
fn test_template_refused_for_non_conforme_with_accepted_lots() {
    let dir = TempDir::new().unwrap();
    let mask_path = write_file(&dir, "mask.csv", &sample_mask());

    let result = api().prepare_template(&mask_path, "Non-Conforme", dir.path());

    match result {
        Err(ApiError::BusinessRuleViolation { violations, .. }) => {
            assert_eq!(
                violations,
                vec![RuleViolation::DepotStatusIncompatible {
                    depot_type: DepotType::NonConforme,
                    found: vec![LotStatus::Accepted],
                }]
            );
        }
        other => panic!("unexpected result: {:?}", other.map(|r| r.template_path)),
    }
    assert!(!dir.path().join("INV1_SITE1_TEMPLATE.xlsx").exists());
}

#[test]
fn test_finalize_refused_when_mask_violates_rules() {
    let dir = TempDir::new().unwrap();
    let mask_path = write_file(
        &dir,
        "mask.csv",
        &mask_text(&[StockLine::new("ART1", "LOT010124", "10").status("Q")]),
    );
    let filled_path = write_file(
        &dir,
        "filled.csv",
        "NUMERO_INVENTAIRE;CODE_ARTICLE;QUANTITE_REELLE;DEPOT;EMPLACEMENT\nINV1;ART1;5;SITE1;LOC1\n",
    );

    let result = api().finalize(&mask_path, &filled_path, "Conforme", dir.path());

    assert!(matches!(result, Err(ApiError::BusinessRuleViolation { .. })));
    assert!(!dir.path().join("INV1_SITE1_FINAL.csv").exists());
}

#[test]
fn test_invalid_depot_type() {
    let dir = TempDir::new().unwrap();
    let mask_path = write_file(&dir, "mask.csv", &sample_mask());

    let result = api().check(&mask_path, "Mixte");

    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
}

// ==========================================
// 测试3: 文件与结构错误
// ==========================================

#[test]
fn test_missing_template_columns() {
    let dir = TempDir::new().unwrap();
    let mask_path = write_file(&dir, "mask.csv", &sample_mask());
    let filled_path = write_file(
        &dir,
        "filled.csv",
        "NUMERO_INVENTAIRE;CODE_ARTICLE;DEPOT\nINV1;ART1;SITE1\n",
    );

    let result = api().finalize(&mask_path, &filled_path, "Conforme", dir.path());

    match result {
        Err(ApiError::ValidationError(message)) => {
            assert!(message.contains("QUANTITE_REELLE"));
            assert!(message.contains("EMPLACEMENT"));
        }
        other => panic!("unexpected result: {:?}", other.map(|r| r.final_path)),
    }
}

#[test]
fn test_mask_extension_and_existence() {
    let dir = TempDir::new().unwrap();
    let txt_path = write_file(&dir, "mask.txt", &sample_mask());
    let api = api();

    assert!(matches!(
        api.check(&txt_path, "Conforme"),
        Err(ApiError::ValidationError(_))
    ));
    assert!(matches!(
        api.check(dir.path().join("absent.csv"), "Conforme"),
        Err(ApiError::NotFound(_))
    ));
}

#[test]
fn test_mask_too_large() {
    let dir = TempDir::new().unwrap();
    let mask_path = write_file(&dir, "mask.csv", &sample_mask());
    let mut config = ConfigManager::new();
    config.set_config_value(config_keys::MAX_FILE_SIZE_BYTES, "16");

    let result = ReconcileApi::new(&config).check(&mask_path, "Conforme");

    assert!(matches!(result, Err(ApiError::ValidationError(_))));
}

#[test]
fn test_mask_without_stock_lines() {
    let dir = TempDir::new().unwrap();
    let mask_path = write_file(
        &dir,
        "mask.csv",
        "E;SESS1;Inventaire annuel\nL;SESS1;INV1;;;;;;;;;;;;\n",
    );

    let result = api().check(&mask_path, "Conforme");

    assert!(matches!(result, Err(ApiError::ValidationError(_))));
}

#[test]
fn test_mask_too_few_columns() {
    let dir = TempDir::new().unwrap();
    let mask_path = write_file(&dir, "mask.csv", "E;SESS1\nS;SESS1;INV1;;SITE1;10\n");

    let result = api().check(&mask_path, "Conforme");

    assert!(matches!(result, Err(ApiError::ValidationError(_))));
}
