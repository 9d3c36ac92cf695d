//! # Catalog Seeder
//!
//! Populates the module catalog with the standard kiosk modules.
//!
//! ## Usage
//! ```bash
//! # Seed ./quotemaker_dev.db (default)
//! cargo run -p quote-db --bin seed
//!
//! # Specify database path
//! cargo run -p quote-db --bin seed -- --db ./data/quotes.db
//! ```
//!
//! `QUOTE_DB_PATH` is used when `--db` is not given. An already populated
//! catalog is left untouched.

use std::env;
use quote_core::{ModuleCategory, NewModule, PricingEngine, PricingRequest, ScreenStep};
use quote_db::{Database, DbConfig};

/// `(code, name, category, description, base_price, auto_included)`, in display order.
const CATALOG: &[(&str, &str, ModuleCategory, &str, i64, bool)] = &[
    (
        "UI_BASIC",
        "키오스크 UI 개발",
        ModuleCategory::Common,
        "키오스크 화면 UI 디자인 및 개발 (스플래시, 메인, 결과 화면)",
        200_000,
        false,
    ),
    (
        "PRINT_LOGIC",
        "인쇄/출력 로직",
        ModuleCategory::Common,
        "카드/사진/티켓 인쇄 출력 로직 개발",
        150_000,
        false,
    ),
    (
        "SDK_SMART51",
        "Printer SDK 연동",
        ModuleCategory::Common,
        "행사 프로그램에 맞는 Printer SDK 연동",
        100_000,
        false,
    ),
    (
        "CAM_PHOTO",
        "카메라/촬영 기능",
        ModuleCategory::Camera,
        "웹캠 연동 사진 촬영 및 미리보기 기능",
        150_000,
        false,
    ),
    (
        "QR_UPLOAD",
        "QR코드 업로드",
        ModuleCategory::Qr,
        "QR코드 스캔을 통한 이미지/데이터 업로드",
        150_000,
        false,
    ),
    (
        "TEXT_INPUT",
        "텍스트 입력 기능",
        ModuleCategory::Text,
        "이름, 닉네임 등 텍스트 입력 및 키보드 UI",
        150_000,
        false,
    ),
    (
        "SERVER_SYNC",
        "서버 연동/데이터 저장",
        ModuleCategory::Server,
        "서버 연동을 통한 실시간 데이터 저장 및 통계",
        500_000,
        false,
    ),
    (
        "AI_STYLE",
        "AI 화풍변환",
        ModuleCategory::Ai,
        "자사 서버를 통한 AI 화풍변환. 장당 인쇄 또는 행사 기간별로 과금될 수 있습니다",
        0,
        false,
    ),
    (
        "AI_FEE",
        "외부 API 사용",
        ModuleCategory::Ai,
        "인쇄 장수 또는 행사 날짜별로 추가금이 과금될 수 있습니다",
        500_000,
        false,
    ),
    (
        "TEST_QA",
        "테스트 및 유지보수",
        ModuleCategory::Common,
        "개발 완료 후 테스트, 현장 리허설 및 행사 당일 유지보수",
        100_000,
        true,
    ),
    (
        "SELECT_PRINT",
        "선택 인쇄 기능",
        ModuleCategory::Common,
        "업로드 이미지 선택 출력",
        150_000,
        false,
    ),
    (
        "KSNET_PAY",
        "KSNET 결제 시스템 연동",
        ModuleCategory::Payment,
        "KSNET 실결제 연동, 카드 결제 테스트 및 검증, 실결제 환경 적용",
        300_000,
        false,
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = env::var("QUOTE_DB_PATH").unwrap_or_else(|_| String::from("./quotemaker_dev.db"));

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("QuoteMaker Catalog Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./quotemaker_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 QuoteMaker Catalog Seeder");
    println!("============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.modules().count().await?;
    if existing > 0 {
        println!("⚠ Catalog already has {} modules", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    for (index, (code, name, category, description, base_price, auto)) in CATALOG.iter().enumerate() {
        let module = NewModule {
            code: code.to_string(),
            name: name.to_string(),
            category: *category,
            description: Some(description.to_string()),
            base_price: *base_price,
            is_auto_included: *auto,
            sort_order: index as i64 + 1,
        };
        module.validate()?;

        if let Err(e) = db.modules().insert(&module).await {
            eprintln!("Failed to insert {}: {}", code, e);
            continue;
        }
        println!("  {:<14} {:>10}", code, quote_core::Money::from_won(*base_price));
    }

    // Price a typical rental so a broken catalog shows up here, not at the kiosk
    println!();
    println!("Verifying catalog...");
    let catalog = db.modules().list_active().await?;
    let request = PricingRequest {
        quote_type: "rental".to_string(),
        selected_modules: vec!["UI_BASIC".to_string(), "CAM_PHOTO".to_string()],
        screen_composition: vec![ScreenStep::Splash, ScreenStep::Camera, ScreenStep::Printing],
        ..Default::default()
    };
    let breakdown = PricingEngine::default().price(&catalog, &request)?;
    println!(
        "  Rental UI+camera: {} items, total {}",
        breakdown.items().len(),
        breakdown.total_amount()
    );

    println!();
    println!("✓ Seeded {} modules", catalog.len());

    Ok(())
}
