//! 账户聚合

use tasker_auth_core::HashedPassword;
use tasker_common::{AccountId, AuditInfo, Role};

use crate::{AggregateRoot, Entity, Username};

/// 用户名重复
pub const DUPLICATE_USERNAME: &str = "username already exists";

/// 并发注册时初始管理员已被他人创建
pub const BOOTSTRAP_CONFLICT: &str =
    "initial administrator already provisioned, retry registration";

pub const ACCOUNT_NOT_FOUND: &str = "account not found";

/// 账户实体
///
/// 存储中第一个成功创建的账户是初始管理员（`bootstrap = true`），
/// 存储层保证这样的记录最多一条
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub username: Username,
    pub password_hash: HashedPassword,
    pub role: Role,
    pub bootstrap: bool,
    pub audit_info: AuditInfo,
}

impl Account {
    /// 注册新账户
    ///
    /// `existing_accounts` 为注册前存储中的账户数量，为 0 时成为初始管理员
    pub fn register(
        username: Username,
        password_hash: HashedPassword,
        existing_accounts: u64,
    ) -> Self {
        let bootstrap = existing_accounts == 0;
        let role = if bootstrap {
            Role::Administrator
        } else {
            Role::Member
        };

        Self {
            id: AccountId::new(),
            username,
            password_hash,
            role,
            bootstrap,
            audit_info: AuditInfo::default(),
        }
    }

    /// 提升为管理员，已是管理员时返回 false
    pub fn promote(&mut self) -> bool {
        if self.role.is_administrator() {
            return false;
        }
        self.role = Role::Administrator;
        self.touch();
        true
    }

    pub fn is_administrator(&self) -> bool {
        self.role.is_administrator()
    }
}

impl Entity for Account {
    type Id = AccountId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Account {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}
