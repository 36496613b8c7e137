//! End-to-end: load a catalog, check out, verify at the exit, reprint.

use std::io::Write;

use checkout_core::{ExitPass, Money};
use checkout_db::{Database, DbConfig};
use kiosk::cli::{AdminAction, CheckoutArgs, VerifyArgs};
use kiosk::commands::{admin, checkout, verify};
use kiosk::config::KioskConfig;
use kiosk::services::{hash_password, AdminGate, CheckoutService, ExitVerifier};

const CATALOG: &str = "\
product_id,barcode,product_name,brand,category,price,stock_quantity
1,8901262150101,Taaza Toned Milk 500ml,Amul,Dairy,49.00,40
2,8901725133597,Aashirvaad Atta 5kg,ITC,Staples,120.00,
3,8906007280048,Tata Salt 1kg,,Staples,not-a-price,10
";

async fn stocked_store(config: &KioskConfig) -> Database {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("products.csv");
    std::fs::File::create(&csv_path)
        .unwrap()
        .write_all(CATALOG.as_bytes())
        .unwrap();

    let session = AdminGate::from_config(config)
        .unlock(db.clone(), "letmein")
        .unwrap();
    let mut out = Vec::new();
    admin::run_admin(
        &session,
        AdminAction::LoadCatalog { csv: csv_path },
        config.currency_symbol(),
        &mut out,
    )
    .await
    .unwrap();

    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("Loaded 2 products"), "{}", out);
    assert!(out.contains("Skipped row 3 (3):"), "{}", out);
    db
}

fn config() -> KioskConfig {
    let mut config = KioskConfig::default();
    config.admin.password_hash = Some(hash_password("letmein").unwrap());
    config
}

#[tokio::test]
async fn test_checkout_verify_reprint() {
    let config = config();
    let db = stocked_store(&config).await;
    let service = CheckoutService::new(db.clone(), config.clone());
    let out_dir = tempfile::tempdir().unwrap();

    // Checkout: milk twice, atta once, plus one unknown code
    let args = CheckoutArgs {
        customer: Some("Asha".to_string()),
        utr: "412345678901".to_string(),
        scans: vec![
            "8901262150101".to_string(),
            "0000000000000".to_string(),
            "8901262150101".to_string(),
            "8901725133597".to_string(),
        ],
        images: Vec::new(),
        out: None,
    };
    let mut out = Vec::new();
    checkout::run_checkout(&service, args, out_dir.path(), &mut out)
        .await
        .unwrap();
    let printed = String::from_utf8(out).unwrap();

    assert!(printed.contains("! Product not found: 0000000000000"));
    assert!(printed.contains("Tax (18%): Rs. 39.24"));
    assert!(printed.contains("Total: Rs. 257.24"));
    assert!(printed.contains("Rs. 257.24\n"));

    let recent = db.transactions().recent(1).await.unwrap();
    let txn = recent.first().unwrap().clone();
    assert_eq!(txn.total, Money::from_paise(25724));
    assert_eq!(txn.customer_name, "Asha");

    let invoice_path = out_dir.path().join(format!("invoice_{}.txt", txn.trans_id));
    let saved = std::fs::read_to_string(&invoice_path).unwrap();
    assert!(saved.contains(&format!("Transaction ID: {}", txn.trans_id)));

    // Exit: bare code with stray whitespace, then the full pass payload
    let verifier = ExitVerifier::new(db.clone());
    for code in [
        format!("  {}\n", txn.exit_code),
        ExitPass::for_transaction(&txn).payload(),
    ] {
        let mut out = Vec::new();
        let approved = verify::run_verify(
            &verifier,
            VerifyArgs {
                code: Some(code),
                image: None,
                json: false,
            },
            "Rs.",
            &mut out,
        )
        .await
        .unwrap();
        assert!(approved);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains(&format!("APPROVED {}", txn.exit_code)));
        assert!(printed.contains("Taaza Toned Milk 500ml (Amul) x2"));
    }

    // Unknown code is denied, as JSON
    let mut out = Vec::new();
    let approved = verify::run_verify(
        &verifier,
        VerifyArgs {
            code: Some("EXIT-19990101000000".to_string()),
            image: None,
            json: true,
        },
        "Rs.",
        &mut out,
    )
    .await
    .unwrap();
    assert!(!approved);
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json[0]["outcome"], "denied");

    // Reprint rewrites the same text invoice
    std::fs::remove_file(&invoice_path).unwrap();
    let mut out = Vec::new();
    checkout::run_reprint(&service, &txn.exit_code, out_dir.path(), &mut out)
        .await
        .unwrap();
    assert_eq!(std::fs::read_to_string(&invoice_path).unwrap(), saved);
}

#[tokio::test]
async fn test_failed_payment_writes_nothing() {
    let config = config();
    let db = stocked_store(&config).await;
    let service = CheckoutService::new(db.clone(), config);
    let out_dir = tempfile::tempdir().unwrap();

    let args = CheckoutArgs {
        customer: None,
        utr: "   ".to_string(),
        scans: vec!["8901262150101".to_string()],
        images: Vec::new(),
        out: None,
    };
    let mut out = Vec::new();
    let err = checkout::run_checkout(&service, args, out_dir.path(), &mut out)
        .await
        .unwrap_err();

    assert_eq!(err.code, kiosk::ErrorCode::ValidationError);
    assert_eq!(db.transactions().sales_stats().await.unwrap().transaction_count, 0);
    assert_eq!(std::fs::read_dir(out_dir.path()).unwrap().count(), 0);
}
