//! 账号同步演示
//!
//! 用法：cargo run --example account_sync_demo -- <data_dir> <account_id> <access_token>
//!
//! 演示流程：初始化 SDK → 保存凭据 → 切换活跃账号 → 按有效期同步 → 强制刷新

use journal_sdk::{AccessToken, JournalConfig, JournalSDK};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let mut args = std::env::args().skip(1);
    let data_dir = args.next().unwrap_or_else(|| "/tmp/data/journal_demo".to_string());
    let account_id: i64 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(1);
    let token = args.next();

    println!("========================================");
    println!("账号同步演示 (SDK {})", journal_sdk::SDK_VERSION);
    println!("========================================\n");

    let config = JournalConfig::builder()
        .data_dir(&data_dir)
        .accounts_lifespan(Duration::from_secs(24 * 60 * 60))
        .debug_mode(true)
        .build();
    let sdk = JournalSDK::initialize(config).await?;
    println!("✅ SDK 初始化完成: {}\n", data_dir);

    let account = match sdk.set_active_account(account_id).await {
        Ok(account) => account,
        Err(e) => {
            println!("❌ 找不到账号 {}: {}", account_id, e);
            sdk.shutdown().await?;
            return Ok(());
        }
    };

    if let (Some(token), Some(login)) = (token, account.login.as_ref()) {
        sdk.credentials()
            .save_token(login.id, &AccessToken { token, expires_at: None })
            .await?;
        println!("🔑 已保存登录 {} 的凭据", login.id);
    }

    let report = sdk.sync_accounts_if_required().await?;
    if report.skipped {
        println!("⏭️  仍在有效期内，跳过同步");
    } else {
        println!(
            "✅ 同步完成: {} 个登录, 更新 {} 个账号, 学期替换 {}",
            report.groups, report.updated, report.periods_replaced
        );
    }

    println!("\n🔄 强制刷新...");
    let report = sdk.refresh_accounts().await?;
    println!("✅ 刷新完成: 更新 {} 个账号", report.updated);

    if let Some(active) = sdk.active_account() {
        let current = active.periods.iter().find(|p| p.current);
        println!(
            "👤 活跃账号 {}: {} {}, 当前学期 {:?}",
            active.id,
            active.pupil.first_name,
            active.pupil.last_name,
            current.map(|p| p.id)
        );
    }

    sdk.shutdown().await?;
    Ok(())
}
