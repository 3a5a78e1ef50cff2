//! 角色蕴含层级缓存
//! 进程级单例：角色 → 其蕴含的 authority 集（扁平，不做角色间传递）。
//! 任何角色结构性变更后整体重建；重建完成早于触发调用返回，
//! 因此其后的授权决策读到的快照不旧于最近一次已提交的存储变更。

use crate::{error::AppError, repository::store::RoleStore};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use tokio::sync::Mutex;

/// 不可变快照，读者要么看到旧版要么看到新版，不会看到半成品
#[derive(Debug, Default)]
struct Snapshot {
    version: u64,
    implied: HashMap<String, HashSet<String>>,
}

/// 进程级层级缓存
///
/// 重建经由 `rebuild_gate` 串行化（单写者）；快照交换在写锁内一次完成。
/// 不持久化，进程启动后按需重建。
#[derive(Debug, Default)]
pub struct RoleHierarchy {
    snapshot: RwLock<Snapshot>,
    rebuild_gate: Mutex<()>,
}

impl RoleHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从角色存储整体重建，返回新版本号
    ///
    /// 读取全部角色发生在门锁内，并发的重建不会交错；
    /// 读者在交换完成前继续看到旧快照。
    pub async fn rebuild(&self, store: &dyn RoleStore) -> Result<u64, AppError> {
        let _gate = self.rebuild_gate.lock().await;

        let roles = store.all().await?;
        let implied: HashMap<String, HashSet<String>> = roles
            .iter()
            .map(|role| (role.name.clone(), role.authorities()))
            .collect();

        let mut snapshot = self.snapshot.write().unwrap_or_else(|e| e.into_inner());
        snapshot.version += 1;
        snapshot.implied = implied;
        let version = snapshot.version;
        drop(snapshot);

        tracing::debug!(version, "Role hierarchy rebuilt");
        metrics::gauge!("role_hierarchy.version").set(version as f64);

        Ok(version)
    }

    /// 角色蕴含的 authority 集；未知角色返回空集
    pub fn authorities_for(&self, role: &str) -> HashSet<String> {
        let snapshot = self.snapshot.read().unwrap_or_else(|e| e.into_inner());
        snapshot.implied.get(role).cloned().unwrap_or_default()
    }

    /// 角色是否蕴含某 authority
    ///
    /// 角色名本身即是一个 authority，即使该角色尚未进入快照。
    pub fn implies(&self, role: &str, authority: &str) -> bool {
        if role == authority {
            return true;
        }
        let snapshot = self.snapshot.read().unwrap_or_else(|e| e.into_inner());
        snapshot
            .implied
            .get(role)
            .is_some_and(|set| set.contains(authority))
    }

    /// 当前快照版本，0 表示尚未重建过
    pub fn version(&self) -> u64 {
        let snapshot = self.snapshot.read().unwrap_or_else(|e| e.into_inner());
        snapshot.version
    }
}
