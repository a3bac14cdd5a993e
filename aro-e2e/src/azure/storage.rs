//! Microsoft.Storage accounts

use aro_e2e_common::storage::StorageAccount;

use super::arm::ArmClient;
use super::error::ArmResult;

pub const STORAGE_API_VERSION: &str = "2021-09-01";

#[derive(Debug, Clone)]
pub struct StorageAccountsClient {
    arm: ArmClient,
}

impl StorageAccountsClient {
    pub fn new(arm: ArmClient) -> Self {
        Self { arm }
    }

    pub async fn get_properties(
        &self,
        resource_group: &str,
        account: &str,
    ) -> ArmResult<StorageAccount> {
        let path = self.arm.resource_path(
            resource_group,
            &format!(
                "Microsoft.Storage/storageAccounts/{}",
                urlencoding::encode(account)
            ),
        );
        self.arm.get(&path, STORAGE_API_VERSION).await
    }
}
