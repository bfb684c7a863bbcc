use rbatis::rbdc::datetime::DateTime;
use rbatis::RBatis;

use common::utils::hash_password;
use orm::entities::config::FeatureWeight;
use orm::entities::system::SysUser;
use scoring::default_weight_rows;

/// 首次启动初始化: 默认账户 + 默认特征权重
///
/// 任何失败只记日志, 不阻断启动
pub async fn run(rb: &RBatis) {
    seed_default_users(rb).await;
    seed_default_weights(rb).await;
}

async fn seed_default_users(rb: &RBatis) {
    let superadmin_count: i64 = match rb
        .query_decode(
            "select count(*) as total from sys_user where role = ?",
            vec!["superadmin".into()],
        )
        .await
    {
        Ok(n) => n,
        Err(e) => {
            log::warn!("⚠️  检查默认账户失败, 跳过账户初始化: {}", e);
            return;
        }
    };

    let now = DateTime::now();
    if superadmin_count == 0 {
        let superadmin = SysUser {
            id: None,
            username: Some("superadmin".to_string()),
            email: Some("admin@loanapproval.com".to_string()),
            full_name: Some("Super Administrator".to_string()),
            password: Some(hash_password("admin123")),
            role: Some("superadmin".to_string()),
            is_active: Some(true),
            is_disabled: Some(false),
            created_by_id: None,
            last_login: None,
            create_time: Some(now.clone()),
            update_time: Some(now.clone()),
        };
        match SysUser::insert(rb, &superadmin).await {
            Ok(_) => {
                log::warn!("⚠️  已创建默认超级管理员 superadmin/admin123, 请立即修改密码")
            }
            Err(e) => log::error!("❌ 创建默认超级管理员失败: {}", e),
        }
    }

    match SysUser::select_by_username(rb, "bankmanager").await {
        Ok(Some(_)) => {}
        Ok(None) => {
            let bank_manager = SysUser {
                id: None,
                username: Some("bankmanager".to_string()),
                email: Some("bm@loanapproval.com".to_string()),
                full_name: Some("Bank Manager Demo".to_string()),
                password: Some(hash_password("bm123")),
                role: Some("bank_manager".to_string()),
                is_active: Some(true),
                is_disabled: Some(false),
                created_by_id: None,
                last_login: None,
                create_time: Some(now.clone()),
                update_time: Some(now),
            };
            match SysUser::insert(rb, &bank_manager).await {
                Ok(_) => log::warn!("⚠️  已创建演示账户 bankmanager/bm123, 请立即修改密码"),
                Err(e) => log::error!("❌ 创建演示账户失败: {}", e),
            }
        }
        Err(e) => log::warn!("⚠️  检查演示账户失败: {}", e),
    }
}

async fn seed_default_weights(rb: &RBatis) {
    let count: i64 = match rb
        .query_decode("select count(*) as total from feature_weight", vec![])
        .await
    {
        Ok(n) => n,
        Err(e) => {
            log::warn!("⚠️  检查特征权重失败, 跳过权重初始化: {}", e);
            return;
        }
    };
    if count > 0 {
        return;
    }

    let now = DateTime::now();
    let mut seeded = 0;
    for (feature_name, weight, description) in default_weight_rows() {
        let row = FeatureWeight {
            id: None,
            feature_name: Some(feature_name.to_string()),
            weight: Some(weight),
            description: Some(description.to_string()),
            is_active: Some(true),
            updated_by: None,
            created_at: Some(now.clone()),
            updated_at: Some(now.clone()),
        };
        match FeatureWeight::insert(rb, &row).await {
            Ok(_) => seeded += 1,
            Err(e) => log::error!("❌ 写入默认权重失败: {} ({})", feature_name, e),
        }
    }
    log::info!("🌱 已初始化 {} 条默认特征权重", seeded);
}
